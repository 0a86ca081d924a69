//=========================================================================
// Blockfall Engine
//
// Main entry point: builds the game loop over a winit window and runs it.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run(setup)──>  [Runtime]
//         │                          │
//         ├─ with_loop_config()      ├─ creates GameLoop + KeyboardHandle
//         ├─ with_title()            ├─ setup() subscribes game logic
//         └─ with_window_size()      └─ runs platform, blocks until exit
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::game_loop::{GameLoop, LoopConfig, LoopError};
use crate::core::input::{InputEvent, KeyboardHandle};
use crate::core::platform_bridge::{IntervalTimer, PlatformError};
use crate::platform::{Platform, WindowFrameSource, WindowSettings, WindowSlot};

//=== EngineError =========================================================

/// Fatal engine errors returned from [`Engine::run`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// The windowing event loop could not be created or failed while running.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The game loop refused to start.
    #[error("game loop failed to start: {0}")]
    Loop(#[from] LoopError),
}

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Loop config**: [`LoopConfig::default`]
/// - **Title**: "Blockfall"
/// - **Window size**: 480x800 (logical pixels)
///
/// # Examples
///
/// ```no_run
/// use blockfall_engine::EngineBuilder;
/// use blockfall_engine::core::game_loop::LoopConfig;
///
/// EngineBuilder::new()
///     .with_title("Blockfall")
///     .with_loop_config(LoopConfig::new().with_fixed_step(1.0 / 120.0))
///     .build()
///     .run(|game_loop, _keyboard| {
///         game_loop.on_physics_tick(|dt| {
///             let _ = dt;
///             Ok(())
///         });
///     })
///     .unwrap();
/// ```
pub struct EngineBuilder {
    config: LoopConfig,
    title: String,
    width: u32,
    height: u32,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: LoopConfig::default(),
            title: "Blockfall".to_string(),
            width: 480,
            height: 800,
        }
    }

    /// Replaces the game loop timing configuration.
    pub fn with_loop_config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the initial window size in logical pixels.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Window size must be positive, got {}x{}", width, height);
        self.width = width;
        self.height = height;
        self
    }

    /// Builds the engine instance.
    pub fn build(self) -> Engine {
        info!(
            "Building engine (step: {:.4}s, window: {}x{})",
            self.config.fixed_step(),
            self.width,
            self.height
        );

        Engine {
            config: self.config,
            settings: WindowSettings {
                title: self.title,
                width: self.width,
                height: self.height,
            },
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Blockfall engine runtime.
///
/// Create via [`EngineBuilder`].
///
/// # Architecture
///
/// ```text
/// Engine (Main Thread)
///   ├─► GameLoop (UI context)
///   │     ├─► WindowFrameSource (redraw requests)
///   │     └─► IntervalTimer → physics-timer thread
///   │
///   └─► Platform (winit event loop)
///         └─► Window, keyboard, focus/occlusion
/// ```
pub struct Engine {
    config: LoopConfig,
    settings: WindowSettings,
}

impl Engine {
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    //--- Execution --------------------------------------------------------

    /// Runs the engine and blocks until the window closes.
    ///
    /// `setup` runs once before the window opens; subscribe game logic to
    /// the loop's streams there and keep the [`KeyboardHandle`] for
    /// per-frame key queries. The loop starts as soon as the window exists.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the event loop cannot run or the game
    /// loop cannot start.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread on platforms where winit
    /// requires it (macOS/iOS).
    pub fn run<F>(self, setup: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut GameLoop<InputEvent>, &KeyboardHandle),
    {
        info!("Starting engine runtime");

        //--- 1. Game loop over the (not yet created) window ---------------
        let window: WindowSlot = Rc::new(RefCell::new(None));
        let mut game_loop = GameLoop::new(
            self.config,
            Box::new(WindowFrameSource::new(Rc::clone(&window))),
            Box::new(IntervalTimer),
        );
        let keyboard = KeyboardHandle::new();

        //--- 2. Game logic subscriptions ----------------------------------
        setup(&mut game_loop, &keyboard);
        info!("Game logic attached ({} subscriber(s))", game_loop.subscriber_count());

        //--- 3. Platform (blocks) -----------------------------------------
        let platform = Platform::new(window, self.settings, game_loop, keyboard);
        let result = platform.run();

        info!("Engine shutdown complete");
        result
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
