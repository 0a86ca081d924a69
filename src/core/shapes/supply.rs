//=========================================================================
// Piece Supply
//=========================================================================
//
// Sole owner of the active piece and of the random source used to spawn
// pieces. Game logic rotates and respawns through here; nothing else
// holds a mutable piece.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;
use rand::Rng;

//=== Internal Dependencies ===============================================

use super::catalog::Shape;
use super::piece::ActivePiece;

//=== PieceSupply =========================================================

/// Owns the active piece and an injected random generator.
pub struct PieceSupply<R: Rng> {
    rng: R,
    current: ActivePiece,
    spawned: u64,
}

impl<R: Rng> PieceSupply<R> {
    /// Takes ownership of `rng` and spawns the first piece from it.
    pub fn new(mut rng: R) -> Self {
        let current = ActivePiece::spawn_random(&mut rng);
        debug!(target: "pieces", "First piece: {:?}", current.kind());
        Self {
            rng,
            current,
            spawned: 1,
        }
    }

    pub fn current(&self) -> &ActivePiece {
        &self.current
    }

    /// Shape after one rotation, without committing it.
    pub fn peek_rotation(&self) -> Shape {
        self.current.peek_next_shape()
    }

    /// Commits one rotation step and returns the new shape.
    pub fn rotate(&mut self) -> Shape {
        self.current.advance_rotation();
        self.current.current_shape()
    }

    /// Replaces the active piece with a fresh random one.
    pub fn respawn(&mut self) -> &ActivePiece {
        self.current = ActivePiece::spawn_random(&mut self.rng);
        self.spawned += 1;
        debug!(
            target: "pieces",
            "Spawned {:?} (#{})",
            self.current.kind(),
            self.spawned
        );
        &self.current
    }

    /// Number of pieces spawned so far, including the first.
    pub fn spawned(&self) -> u64 {
        self.spawned
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
