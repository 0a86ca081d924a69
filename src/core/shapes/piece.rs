//=========================================================================
// Active Piece
//=========================================================================
//
// "Current piece + rotation index" state machine.
//
// The shape is always derived from the catalog; only the rotation index
// moves, one step per `advance_rotation()`, wrapping at the type's
// rotation count. The type changes only through a new spawn.
//
//=========================================================================

//=== External Dependencies ===============================================

use rand::Rng;

//=== Internal Dependencies ===============================================

use super::catalog::{Shape, TetrominoType};

//=== ActivePiece =========================================================

/// The falling piece: a tetromino type plus its current rotation index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    kind: TetrominoType,
    rotation: usize,
}

impl ActivePiece {
    //--- Construction -----------------------------------------------------

    /// Creates a piece of the given type at rotation 0.
    pub fn new(kind: TetrominoType) -> Self {
        Self { kind, rotation: 0 }
    }

    /// Creates a piece with a uniformly random type at rotation 0.
    ///
    /// The random source is injected so a seeded generator reproduces the
    /// same spawn sequence.
    pub fn spawn_random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let index = rng.gen_range(0..TetrominoType::COUNT);
        let kind = TetrominoType::ALL[index];
        Self::new(kind)
    }

    //--- Queries ----------------------------------------------------------

    pub fn kind(&self) -> TetrominoType {
        self.kind
    }

    pub fn type_index(&self) -> usize {
        self.kind.index()
    }

    pub fn rotation_index(&self) -> usize {
        self.rotation
    }

    /// Rotation index the next `advance_rotation()` would produce.
    pub fn next_rotation_index(&self) -> usize {
        (self.rotation + 1) % self.kind.rotation_count()
    }

    /// Shape for the current rotation.
    pub fn current_shape(&self) -> Shape {
        self.kind.shapes()[self.rotation]
    }

    /// Shape the piece would have after one rotation. Does not mutate.
    ///
    /// Game logic uses this to test a rotation for collisions before
    /// committing it.
    pub fn peek_next_shape(&self) -> Shape {
        self.kind.shapes()[self.next_rotation_index()]
    }

    //--- Mutation ---------------------------------------------------------

    /// Commits exactly one rotation step, wrapping at the rotation count.
    pub fn advance_rotation(&mut self) {
        self.rotation = self.next_rotation_index();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
