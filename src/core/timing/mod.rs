//=========================================================================
// Timing
//=========================================================================
//
// Platform-independent timing primitives driven by the game loop:
//
// - `FrameClock`: variable render deltas from frame timestamps
// - `FixedStepScheduler`: fixed simulation steps from timer ticks
// - `VisibilityGate`: system pause flag from visibility/focus signals
//
// None of these own threads or callbacks; the orchestrator feeds them.
//
//=========================================================================

//=== Module Declarations =================================================

mod fixed_step;
mod frame_clock;
mod visibility;

//=== Public API ==========================================================

pub use fixed_step::{
    FixedStepScheduler, TickOutcome, DEFAULT_FIXED_STEP, DEFAULT_MAX_STEPS_PER_TICK,
};
pub use frame_clock::{FrameClock, DEFAULT_MAX_FRAME_DELTA};
pub use visibility::{GateTransition, VisibilityGate};
