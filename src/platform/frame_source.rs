//=========================================================================
// Window Frame Source
//=========================================================================
//
// RenderSource backed by a winit window. Frames are requested with
// `Window::request_redraw` and delivered back to the loop by the platform
// as `WindowEvent::RedrawRequested`.
//
// The window is created lazily in `resumed()`, so the source shares a slot
// with the platform and refuses registration until the slot is filled.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, trace};
use winit::window::Window;

//=== Internal Dependencies ===============================================

use crate::core::platform_bridge::{completed, Completion, PlatformError, RenderSource};

/// Window shared between the platform and its frame source.
pub(crate) type WindowSlot = Rc<RefCell<Option<Window>>>;

//=== WindowFrameSource ===================================================

pub(crate) struct WindowFrameSource {
    window: WindowSlot,
    registered: bool,
}

impl WindowFrameSource {
    pub(crate) fn new(window: WindowSlot) -> Self {
        Self {
            window,
            registered: false,
        }
    }
}

impl RenderSource for WindowFrameSource {
    fn register(&mut self) -> Result<(), PlatformError> {
        if self.window.borrow().is_none() {
            return Err(PlatformError::RenderSourceUnavailable(
                "window has not been created".to_string(),
            ));
        }
        self.registered = true;
        debug!(target: "platform", "Window frame source registered");
        Ok(())
    }

    fn request_frame(&mut self) {
        if !self.registered {
            trace!(target: "platform", "Frame requested while unregistered");
            return;
        }
        if let Some(window) = self.window.borrow().as_ref() {
            window.request_redraw();
        }
    }

    fn unregister(&mut self) -> Completion {
        // Redraws already queued by winit are ignored by the stopped loop
        self.registered = false;
        debug!(target: "platform", "Window frame source unregistered");
        completed(Ok(()))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
