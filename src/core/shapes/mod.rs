//=========================================================================
// Piece / Shape Model
//=========================================================================
//
// Architecture:
//   ShapeCatalog (static tables)
//        ↑ derives shapes
//   ActivePiece (type + rotation index)
//        ↑ owned by
//   PieceSupply (injected RNG, spawn / rotate)
//
//=========================================================================

//=== Module Declarations =================================================

mod catalog;
mod piece;
mod supply;

//=== Public API ==========================================================

pub use catalog::{Shape, ShapeCatalog, TetrominoType};
pub use piece::ActivePiece;
pub use supply::PieceSupply;
