//=========================================================================
// Loop Errors
//=========================================================================

use thiserror::Error;

use crate::core::platform_bridge::PlatformError;

/// Reasons `GameLoop::start` refuses to start.
#[derive(Debug, Error)]
pub enum LoopError {
    /// The loop was disposed and cannot be restarted.
    #[error("game loop already disposed")]
    Disposed,

    /// A platform source could not be registered.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The physics timer thread could not be spawned.
    #[error("failed to spawn physics timer thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
