//=========================================================================
// Visibility Gate
//=========================================================================
//
// Derives the system pause flag from page visibility and window focus.
//
//   paused = !page_visible || !window_focused
//
//   Running ──paused flips true──> Paused      (GateTransition::Paused)
//   Paused  ──paused flips false─> Running     (GateTransition::Resumed)
//
// Input changes that leave the derived flag as it was produce nothing.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== GateTransition ======================================================

/// Edge of the derived pause flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTransition {
    /// The system asked the game to pause.
    Paused,

    /// The system allows the game to run again.
    Resumed,
}

//=== VisibilityGate ======================================================

#[derive(Debug, Clone)]
pub struct VisibilityGate {
    page_visible: bool,
    window_focused: bool,
    paused: bool,
}

impl VisibilityGate {
    /// Creates a gate assuming a visible, focused page.
    pub fn new() -> Self {
        Self {
            page_visible: true,
            window_focused: true,
            paused: false,
        }
    }

    /// Returns to the visible-and-focused assumption without notifying.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn page_visible(&self) -> bool {
        self.page_visible
    }

    pub fn window_focused(&self) -> bool {
        self.window_focused
    }

    pub fn set_page_visible(&mut self, visible: bool) -> Option<GateTransition> {
        self.page_visible = visible;
        self.reevaluate()
    }

    pub fn set_window_focused(&mut self, focused: bool) -> Option<GateTransition> {
        self.window_focused = focused;
        self.reevaluate()
    }

    fn reevaluate(&mut self) -> Option<GateTransition> {
        let paused = !self.page_visible || !self.window_focused;
        if paused == self.paused {
            return None;
        }

        self.paused = paused;
        debug!(
            target: "visibility",
            "visible={} focused={} → paused={}",
            self.page_visible,
            self.window_focused,
            paused
        );

        Some(if paused {
            GateTransition::Paused
        } else {
            GateTransition::Resumed
        })
    }
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
