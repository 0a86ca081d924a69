//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Contracts for the platform notification sources the game loop drives:
//
// - `RenderSource`: one-shot "next frame" requests, re-armed every frame
// - `TimerSource`: a repeating tick stream at a requested period
//
// Visibility/focus arrive as plain setter calls on the game loop and need
// no trait. Implementations live in the platform layer (winit) or in tests.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, tick, Receiver};
use thiserror::Error;

//=== PlatformError =======================================================

/// Failures reported by platform notification sources.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The frame notification API is not available (no window, no context).
    #[error("render source unavailable: {0}")]
    RenderSourceUnavailable(String),

    /// The fixed-interval timer could not be created.
    #[error("timer source unavailable: {0}")]
    TimerUnavailable(String),

    /// The platform rejected or could not complete unregistration.
    #[error("render source unregistration failed: {0}")]
    Unregister(String),

    /// Event loop creation failed (OS-level issue).
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(String),

    /// Event loop execution error.
    #[error("event loop error: {0}")]
    EventLoopExecution(String),
}

//=== Completion ==========================================================

/// Receiver that yields the outcome of an asynchronous platform request.
pub type Completion = Receiver<Result<(), PlatformError>>;

/// Builds an already-resolved [`Completion`] for synchronous sources.
pub fn completed(result: Result<(), PlatformError>) -> Completion {
    let (tx, rx) = bounded(1);
    // Capacity 1 and a fresh channel: the send cannot block or fail.
    let _ = tx.send(result);
    rx
}

//=== RenderSource ========================================================

/// Display-synchronised frame notifications.
///
/// The platform delivers each requested frame by calling
/// `GameLoop::on_animation_frame` with a monotonic timestamp in
/// milliseconds. Requests do not repeat: the loop calls `request_frame`
/// again after every frame it handles.
pub trait RenderSource {
    /// Attaches to the platform's frame notifications.
    fn register(&mut self) -> Result<(), PlatformError>;

    /// Asks for exactly one more frame notification.
    fn request_frame(&mut self);

    /// Detaches from frame notifications.
    ///
    /// The returned completion may resolve later (or never, if the
    /// platform context is already gone); the loop waits on it with a
    /// bounded timeout.
    fn unregister(&mut self) -> Completion;
}

//=== TimerSource =========================================================

/// Repeating fixed-interval notifications.
pub trait TimerSource {
    /// Starts a tick stream with the given period.
    ///
    /// Dropping the returned receiver cancels the stream.
    fn start(&mut self, period: Duration) -> Result<Receiver<Instant>, PlatformError>;
}

//=== IntervalTimer =======================================================

/// [`TimerSource`] backed by `crossbeam_channel::tick`.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntervalTimer;

impl TimerSource for IntervalTimer {
    fn start(&mut self, period: Duration) -> Result<Receiver<Instant>, PlatformError> {
        if period.is_zero() {
            return Err(PlatformError::TimerUnavailable(
                "timer period must be non-zero".to_string(),
            ));
        }
        Ok(tick(period))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_resolves_immediately() {
        let completion = completed(Ok(()));
        assert!(matches!(completion.try_recv(), Ok(Ok(()))));
    }

    #[test]
    fn completed_carries_errors() {
        let completion = completed(Err(PlatformError::Unregister("gone".into())));
        match completion.try_recv() {
            Ok(Err(PlatformError::Unregister(reason))) => assert_eq!(reason, "gone"),
            other => panic!("Expected Unregister error, got {:?}", other),
        }
    }

    #[test]
    fn interval_timer_ticks() {
        let mut timer = IntervalTimer;
        let ticks = timer.start(Duration::from_millis(5)).unwrap();
        assert!(ticks.recv_timeout(Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn interval_timer_rejects_zero_period() {
        let mut timer = IntervalTimer;
        assert!(matches!(
            timer.start(Duration::ZERO),
            Err(PlatformError::TimerUnavailable(_))
        ));
    }

    #[test]
    fn platform_error_display_format() {
        let error = PlatformError::RenderSourceUnavailable("no window".into());
        assert_eq!(error.to_string(), "render source unavailable: no window");
    }
}
