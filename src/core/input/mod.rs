//=========================================================================
// Input
//=========================================================================
//
// Keyboard events and state shared between the platform layer and game
// logic.
//
// - `InputEvent`: key transitions, the payload of the loop's input stream
// - `StateTracker`: held keys plus pressed/released deltas per frame
// - `KeyboardHandle`: shared tracker handed to game code
//
//=========================================================================

//=== Module Declarations =================================================

mod event;
mod keyboard;
mod state_tracker;

//=== Public API ==========================================================

pub use event::{InputEvent, KeyCode};
pub use keyboard::KeyboardHandle;
pub use state_tracker::StateTracker;
