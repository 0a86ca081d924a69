//=========================================================================
// Blockfall Engine Library Root
//
// Game loop and timing engine for a falling-block puzzle game.
//
// Responsibilities:
// - Expose the engine facade (`EngineBuilder`, `Engine`)
// - Expose the platform-independent core (game loop, timing, shapes)
// - Keep the winit integration (`platform`) internal
//
// Typical usage:
// ```no_run
// use blockfall_engine::EngineBuilder;
//
// fn main() {
//     EngineBuilder::new()
//         .build()
//         .run(|game_loop, _keyboard| {
//             game_loop.on_physics_tick(|_dt| Ok(()));
//         })
//         .unwrap();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the game loop, timing primitives, tetromino catalog and
// input types. It has no windowing dependency and can be driven headless
// through the `platform_bridge` traits.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` owns the winit window and event translation.
// `engine` wires the game loop to the platform.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder, EngineError};
