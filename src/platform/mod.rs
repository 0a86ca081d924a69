//=========================================================================
// Platform Subsystem
//
// Bridges winit (OS-level events) with the game loop.
//
// Architecture:
// ```text
//  Main Thread (UI context)
//   winit Event Loop
//    ├─ RedrawRequested ─────────> GameLoop::on_animation_frame
//    ├─ Focused(bool) ───────────> GameLoop::set_window_focused
//    ├─ Occluded(bool) ──────────> GameLoop::set_page_visible
//    ├─ KeyboardInput ───────────> KeyboardHandle + GameLoop input stream
//    └─ user_event(LoopWake) ────> GameLoop::pump
//                ↑
//                │ EventLoopProxy::send_event
//   physics-timer thread (queued PhysicsStep messages)
//
//   WindowFrameSource::request_frame ──> Window::request_redraw
// ```
//
// Responsibilities:
// - Create and own the OS window
// - Start the game loop once the window exists
// - Translate window events into loop callbacks
// - Wake the event loop when physics steps are queued
// - Dispose the loop on close
//
//=========================================================================

//=== Submodules ==========================================================

mod frame_source;
mod input_processor;

//=== External Crates =====================================================

use std::sync::{Arc, Mutex};
use std::time::Instant;

use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::game_loop::{GameLoop, LoopError, UiWaker};
use crate::core::input::{InputEvent, KeyboardHandle};
use crate::core::platform_bridge::PlatformError;
use crate::engine::EngineError;
use input_processor::translate_key_event;

pub(crate) use frame_source::{WindowFrameSource, WindowSlot};

//=== LoopWake ============================================================

/// User event posted by the physics thread to wake the winit loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LoopWake;

//=== WindowSettings ======================================================

#[derive(Debug, Clone)]
pub(crate) struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

//=== Platform ============================================================

/// Window owner and event translator for the game loop.
///
/// Runs on the main thread (winit requirement on macOS/iOS). The game loop
/// it drives is confined to this thread as well.
pub(crate) struct Platform {
    window: WindowSlot,
    settings: WindowSettings,
    game_loop: GameLoop<InputEvent>,
    keyboard: KeyboardHandle,
    origin: Instant,
    start_error: Option<LoopError>,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    /// `window` must be the slot shared with the loop's `WindowFrameSource`.
    pub fn new(
        window: WindowSlot,
        settings: WindowSettings,
        game_loop: GameLoop<InputEvent>,
        keyboard: KeyboardHandle,
    ) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window,
            settings,
            game_loop,
            keyboard,
            origin: Instant::now(),
            start_error: None,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the winit event loop until the window closes.
    ///
    /// # Errors
    ///
    /// Returns the event loop failure, or the [`LoopError`] that prevented
    /// the game loop from starting once the window existed.
    pub fn run(mut self) -> Result<(), EngineError> {
        debug!(target: "platform", "Starting winit event loop");

        let event_loop = EventLoop::<LoopWake>::with_user_event()
            .build()
            .map_err(|e| PlatformError::EventLoopCreation(e.to_string()))?;

        let proxy = Mutex::new(event_loop.create_proxy());
        let waker: UiWaker = Arc::new(move || {
            if let Ok(proxy) = proxy.lock() {
                // Fails only once the event loop is gone
                let _ = proxy.send_event(LoopWake);
            }
        });
        self.game_loop.set_ui_waker(waker);

        event_loop
            .run_app(&mut self)
            .map_err(|e| PlatformError::EventLoopExecution(e.to_string()))?;

        match self.start_error.take() {
            Some(e) => Err(EngineError::Loop(e)),
            None => Ok(()),
        }
    }

    //--- Internal Helpers -------------------------------------------------

    /// Milliseconds since the platform was created (monotonic).
    fn timestamp_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.game_loop.dispose();
        event_loop.exit();
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn has_window(&self) -> bool {
        self.window.borrow().is_some()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler<LoopWake> for Platform {
    /// Creates the window on first resume, then starts the game loop.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.borrow().is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.settings.title.clone())
            .with_inner_size(LogicalSize::new(self.settings.width, self.settings.height));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                *self.window.borrow_mut() = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.start_error = Some(LoopError::Platform(
                    PlatformError::RenderSourceUnavailable(e.to_string()),
                ));
                self.shutdown(event_loop);
                return;
            }
        }

        if let Err(e) = self.game_loop.start() {
            error!(target: "platform", "Game loop failed to start: {}", e);
            self.start_error = Some(e);
            self.shutdown(event_loop);
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, _event: LoopWake) {
        self.game_loop.pump();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.shutdown(event_loop);
            }

            WindowEvent::RedrawRequested => {
                let timestamp = self.timestamp_ms();
                self.game_loop.on_animation_frame(timestamp);

                // Frame boundary for pressed/released queries
                self.keyboard.end_frame();
            }

            WindowEvent::Focused(focused) => {
                debug!(target: "platform", "Window focus changed: {}", focused);
                if !focused {
                    // Key-up events are not delivered to unfocused windows
                    self.keyboard.release_all();
                }
                self.game_loop.set_window_focused(*focused);
            }

            WindowEvent::Occluded(occluded) => {
                debug!(target: "platform", "Window occlusion changed: {}", occluded);
                self.game_loop.set_page_visible(!occluded);
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                match translate_key_event(key_event) {
                    Some(input) => {
                        trace!(target: "platform::input", "{:?}", input);
                        self.keyboard.record(&input);
                        self.game_loop.dispatch_input_event(input);
                    }
                    None => trace!(target: "platform::input", "Repeat or unmapped key ignored"),
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        info!(target: "platform", "Event loop exiting");
        self.game_loop.dispose();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
