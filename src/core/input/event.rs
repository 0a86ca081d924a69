//=========================================================================
// Input Event Types
//=========================================================================
//
// Portable keyboard events forwarded from the platform layer to the
// game loop's input stream.
//
// Event Flow:
// ```text
// Platform Layer (winit KeyboardInput, repeats dropped)
//         ↓
//    InputEvent (this module)
//         ↓
//    StateTracker (held / pressed / released)
//         ↓
//    GameLoop::dispatch_input_event → input subscribers
// ```
//
//=========================================================================

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
/// `KeyA` is the same physical key on QWERTY and AZERTY layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    /// Number row: 0-9
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    /// Letter keys: A-Z (physical location, not character)
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,

    /// Any key the platform reports that is not listed above.
    Unidentified,
}

//=== InputEvent ==========================================================

/// Key transition reported by the platform.
///
/// Auto-repeat is filtered out before events are built, so a `KeyDown`
/// always marks a real UP → DOWN transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
}

impl InputEvent {
    /// The key this event refers to.
    pub fn key(&self) -> KeyCode {
        match self {
            InputEvent::KeyDown(key) | InputEvent::KeyUp(key) => *key,
        }
    }

    pub fn is_down(&self) -> bool {
        matches!(self, InputEvent::KeyDown(_))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
