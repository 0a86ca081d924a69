//=========================================================================
// Core
//
// Platform-independent engine systems.
//
// Layout:
// - `shapes`: tetromino catalog, active piece rotation and random supply
// - `timing`: frame clock, fixed-step scheduler, visibility gate
// - `events`: subscriber lists used for every loop stream
// - `platform_bridge`: contract for render and timer sources
// - `game_loop`: orchestrator tying timing, sources and streams together
// - `input`: keyboard events and state
//
// Nothing in here depends on winit; the `platform` module adapts it.
//
//=========================================================================

pub mod events;
pub mod game_loop;
pub mod input;
pub mod platform_bridge;
pub mod shapes;
pub mod timing;
