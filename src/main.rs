//=========================================================================
// Blockfall Demo
//
// Opens a window and drives a single falling piece from the game loop:
//
// - physics ticks apply gravity (one row per `FALL_INTERVAL`, faster while
//   ArrowDown is held)
// - ArrowUp rotates, Space spawns a new random piece
// - pause/resume requests are logged
//
// Run with `RUST_LOG=debug` to see loop and scheduler logs.
//
//=========================================================================

use std::cell::RefCell;
use std::rc::Rc;

use blockfall_engine::prelude::*;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seconds per row under normal gravity.
const FALL_INTERVAL: f64 = 0.5;
const SOFT_DROP_FACTOR: f64 = 8.0;
const BOARD_HEIGHT: u32 = 20;

//=== Falling Piece =======================================================

struct Playfield {
    supply: PieceSupply<StdRng>,
    row: u32,
    fall_timer: f64,
}

impl Playfield {
    fn new() -> Self {
        let supply = PieceSupply::new(StdRng::from_entropy());
        info!("Spawned {:?}", supply.current().kind());
        Self {
            supply,
            row: 0,
            fall_timer: 0.0,
        }
    }

    fn step(&mut self, dt: f64, soft_drop: bool) {
        let rate = if soft_drop { SOFT_DROP_FACTOR } else { 1.0 };
        self.fall_timer += dt * rate;

        while self.fall_timer >= FALL_INTERVAL {
            self.fall_timer -= FALL_INTERVAL;
            self.row += 1;

            let height = self.supply.current().current_shape().height() as u32;
            if self.row + height > BOARD_HEIGHT {
                self.respawn();
            }
        }
    }

    fn rotate(&mut self) {
        let shape = self.supply.rotate();
        let piece = self.supply.current();
        info!(
            "Rotated {:?} to {} ({}x{})",
            piece.kind(),
            piece.rotation_index(),
            shape.width(),
            shape.height()
        );
    }

    fn respawn(&mut self) {
        self.row = 0;
        self.fall_timer = 0.0;
        let piece = self.supply.respawn();
        info!("Spawned {:?} (#{})", piece.kind(), self.supply.spawned());
    }
}

//=== Entry Point =========================================================

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = EngineBuilder::new()
        .with_title("Blockfall")
        .build()
        .run(|game_loop, keyboard| {
            let field = Rc::new(RefCell::new(Playfield::new()));

            let physics_field = Rc::clone(&field);
            let keys = keyboard.clone();
            game_loop.on_physics_tick(move |dt| {
                let soft_drop = keys.is_key_down(KeyCode::ArrowDown);
                physics_field.borrow_mut().step(*dt, soft_drop);
                Ok(())
            });

            let input_field = Rc::clone(&field);
            game_loop.on_input(move |event| {
                match event {
                    InputEvent::KeyDown(KeyCode::ArrowUp) => input_field.borrow_mut().rotate(),
                    InputEvent::KeyDown(KeyCode::Space) => input_field.borrow_mut().respawn(),
                    _ => {}
                }
                Ok(())
            });

            game_loop.on_pause_requested(|_| {
                info!("Paused (window hidden or unfocused)");
                Ok(())
            });
            game_loop.on_resume_requested(|_| {
                info!("Resumed");
                Ok(())
            });
        });

    if let Err(e) = result {
        error!("Engine error: {}", e);
        std::process::exit(1);
    }
}
