//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use blockfall_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine facade
pub use crate::engine::{Engine, EngineBuilder, EngineError};

// Game loop
pub use crate::core::events::{HandlerResult, Subscription};
pub use crate::core::game_loop::{GameLoop, LoopConfig, LoopError, LoopState};

// Input
pub use crate::core::input::{InputEvent, KeyCode, KeyboardHandle};

// Pieces
pub use crate::core::shapes::{ActivePiece, PieceSupply, Shape, ShapeCatalog, TetrominoType};
