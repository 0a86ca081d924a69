//=========================================================================
// Keyboard Handle
//=========================================================================
//
// Shared, read-mostly view of keyboard state for game logic.
//
// The platform layer records transitions into the handle before they are
// forwarded to the loop's input stream, and ends the frame after each
// animation frame. Game code holds clones and queries it from its tick
// subscribers. Everything lives on the UI context.
//
//=========================================================================

use std::cell::RefCell;
use std::rc::Rc;

use super::event::{InputEvent, KeyCode};
use super::state_tracker::StateTracker;

/// Cloneable handle to the keyboard [`StateTracker`].
#[derive(Debug, Clone, Default)]
pub struct KeyboardHandle {
    tracker: Rc<RefCell<StateTracker>>,
}

impl KeyboardHandle {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Platform Side ----------------------------------------------------

    pub(crate) fn record(&self, event: &InputEvent) {
        self.tracker.borrow_mut().process_event(event);
    }

    pub(crate) fn end_frame(&self) {
        self.tracker.borrow_mut().clear();
    }

    pub(crate) fn release_all(&self) {
        self.tracker.borrow_mut().release_all();
    }

    //--- Queries ----------------------------------------------------------

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.tracker.borrow().is_key_down(key)
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.tracker.borrow().is_key_pressed(key)
    }

    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.tracker.borrow().is_key_released(key)
    }

    /// Snapshot of the keys currently held.
    pub fn keys_down(&self) -> Vec<KeyCode> {
        self.tracker.borrow().keys_down().copied().collect()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
