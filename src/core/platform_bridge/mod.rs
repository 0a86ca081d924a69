//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges platform notification sources (winit, test doubles) with the
// game loop.
//
// This module defines the contract between platform implementations and
// the loop, so a backend can be swapped without touching core code.
//
//=========================================================================

//=== Module Declarations =================================================

mod interface;

//=== Public API ==========================================================

pub use interface::{
    completed, Completion, IntervalTimer, PlatformError, RenderSource, TimerSource,
};
