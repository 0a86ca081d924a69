//=========================================================================
// Game Loop Orchestrator
//=========================================================================
//
// Owns the frame clock, the physics timer worker and the visibility gate,
// and publishes their output to game logic as event streams.
//
// Architecture:
// ```text
//  RenderSource ──on_animation_frame(ts)──> FrameClock ──> render-tick
//                                               │ (suppressed while paused)
//                                               └─> request_frame() (re-arm)
//
//  TimerSource ──ticks──> PhysicsWorker (own thread, FixedStepScheduler)
//                              │ PhysicsStep messages
//                              ↓
//                         pump() on UI context ──> physics-tick
//
//  focus / visibility ──> VisibilityGate ──> pause-requested / resume-requested
//                              └─> shared pause flag (read by the worker)
// ```
//
// Lifecycle:
//   Stopped → Starting → Running → Stopping → Stopped
//   any ──dispose()──> Disposed (absorbing)
//
// All subscribers run on the UI context: render ticks directly from the
// frame callback, physics ticks from `pump()`. The worker thread never
// touches game state. Each start opens a new epoch; steps posted under an
// older epoch are discarded, so nothing is delivered after `stop()`.
//
//=========================================================================

//=== Module Declarations =================================================

mod config;
mod error;
mod worker;

//=== Public API ==========================================================

pub use config::LoopConfig;
pub use error::LoopError;
pub use worker::UiWaker;

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, trace, warn};

//=== Internal Dependencies ===============================================

use crate::core::events::{EventChannel, HandlerResult, Subscription};
use crate::core::input::InputEvent;
use crate::core::platform_bridge::{PlatformError, RenderSource, TimerSource};
use crate::core::timing::{FixedStepScheduler, FrameClock, GateTransition, VisibilityGate};
use worker::{LoopMessage, PhysicsWorker};

// Bounds one pump so a flooded queue cannot starve the frame callback.
const MAX_MESSAGES_PER_PUMP: usize = 256;

//=== LoopState ===========================================================

/// Lifecycle state of a [`GameLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Disposed,
}

//=== GameLoop ============================================================

/// Hybrid render/physics loop.
///
/// `P` is the payload type of the input stream fed through
/// [`GameLoop::dispatch_input_event`].
///
/// # Examples
///
/// ```
/// use blockfall_engine::core::game_loop::{GameLoop, LoopConfig};
/// use blockfall_engine::core::platform_bridge::{
///     completed, Completion, IntervalTimer, PlatformError, RenderSource,
/// };
///
/// struct Headless;
///
/// impl RenderSource for Headless {
///     fn register(&mut self) -> Result<(), PlatformError> { Ok(()) }
///     fn request_frame(&mut self) {}
///     fn unregister(&mut self) -> Completion { completed(Ok(())) }
/// }
///
/// let mut game_loop: GameLoop<()> =
///     GameLoop::new(LoopConfig::new(), Box::new(Headless), Box::new(IntervalTimer));
///
/// game_loop.on_render_tick(|dt| {
///     assert!(*dt >= 0.0);
///     Ok(())
/// });
///
/// game_loop.start().unwrap();
/// game_loop.on_animation_frame(0.0);
/// game_loop.on_animation_frame(16.0);
/// game_loop.dispose();
/// ```
pub struct GameLoop<P: 'static = InputEvent> {
    config: LoopConfig,
    state: LoopState,

    //--- Platform Sources -------------------------------------------------
    render_source: Box<dyn RenderSource>,
    timer_source: Box<dyn TimerSource>,
    waker: Option<UiWaker>,

    //--- Timing -----------------------------------------------------------
    frame_clock: FrameClock,
    gate: VisibilityGate,
    paused: Arc<AtomicBool>,
    worker: Option<PhysicsWorker>,
    epoch: u64,

    //--- UI Message Queue -------------------------------------------------
    outbox: Sender<LoopMessage>,
    inbox: Receiver<LoopMessage>,

    //--- Event Streams ----------------------------------------------------
    render_tick: EventChannel<f64>,
    physics_tick: EventChannel<f64>,
    pause_requested: EventChannel<()>,
    resume_requested: EventChannel<()>,
    input: EventChannel<P>,
}

impl<P: 'static> GameLoop<P> {
    //--- Construction -----------------------------------------------------

    /// Creates a stopped loop over the given platform sources.
    pub fn new(
        config: LoopConfig,
        render_source: Box<dyn RenderSource>,
        timer_source: Box<dyn TimerSource>,
    ) -> Self {
        let (outbox, inbox) = unbounded();

        Self {
            frame_clock: FrameClock::new(config.max_frame_delta()),
            config,
            state: LoopState::Stopped,
            render_source,
            timer_source,
            waker: None,
            gate: VisibilityGate::new(),
            paused: Arc::new(AtomicBool::new(false)),
            worker: None,
            epoch: 0,
            outbox,
            inbox,
            render_tick: EventChannel::new("render-tick"),
            physics_tick: EventChannel::new("physics-tick"),
            pause_requested: EventChannel::new("pause-requested"),
            resume_requested: EventChannel::new("resume-requested"),
            input: EventChannel::new("input"),
        }
    }

    /// Installs the callback the physics thread uses to wake the UI context.
    ///
    /// Takes effect on the next `start()`.
    pub fn set_ui_waker(&mut self, waker: UiWaker) {
        self.waker = Some(waker);
    }

    //--- Queries ----------------------------------------------------------

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn is_disposed(&self) -> bool {
        self.state == LoopState::Disposed
    }

    /// Returns `true` while the system pause (hidden or unfocused) is active.
    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    /// Total number of subscribers across all streams.
    pub fn subscriber_count(&self) -> usize {
        self.render_tick.len()
            + self.physics_tick.len()
            + self.pause_requested.len()
            + self.resume_requested.len()
            + self.input.len()
    }

    //--- Subscriptions ----------------------------------------------------

    /// Variable-rate tick, once per displayed frame, delta in seconds.
    pub fn on_render_tick<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&f64) -> HandlerResult + 'static,
    {
        self.render_tick.subscribe(handler)
    }

    /// Fixed-rate simulation tick, delta is always the configured step.
    pub fn on_physics_tick<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&f64) -> HandlerResult + 'static,
    {
        self.physics_tick.subscribe(handler)
    }

    pub fn on_pause_requested<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&()) -> HandlerResult + 'static,
    {
        self.pause_requested.subscribe(handler)
    }

    pub fn on_resume_requested<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&()) -> HandlerResult + 'static,
    {
        self.resume_requested.subscribe(handler)
    }

    /// Input events passed through [`GameLoop::dispatch_input_event`].
    pub fn on_input<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&P) -> HandlerResult + 'static,
    {
        self.input.subscribe(handler)
    }

    //--- Lifecycle --------------------------------------------------------

    /// Registers with the render and timer sources and starts ticking.
    ///
    /// Calling `start()` on a running loop does nothing.
    ///
    /// # Errors
    ///
    /// - [`LoopError::Disposed`] after [`GameLoop::dispose`].
    /// - [`LoopError::Platform`] if a source refuses registration.
    /// - [`LoopError::WorkerSpawn`] if the physics thread cannot start.
    ///
    /// On error every registration made so far is rolled back and the loop
    /// stays `Stopped`.
    pub fn start(&mut self) -> Result<(), LoopError> {
        match self.state {
            LoopState::Disposed => {
                debug!(target: "game_loop", "start() on disposed loop");
                return Err(LoopError::Disposed);
            }
            LoopState::Running | LoopState::Starting => {
                debug!(target: "game_loop", "start() ignored: already running");
                return Ok(());
            }
            LoopState::Stopped | LoopState::Stopping => {}
        }

        self.state = LoopState::Starting;
        self.epoch += 1;
        self.discard_pending();
        self.frame_clock.reset();
        self.gate.reset();
        self.paused.store(false, Ordering::SeqCst);

        let Some(period) = self.config.timer_period() else {
            let e = PlatformError::TimerUnavailable(format!(
                "fixed step {}s is not a valid timer period",
                self.config.fixed_step()
            ));
            error!(target: "game_loop", "{}", e);
            self.state = LoopState::Stopped;
            return Err(e.into());
        };

        //--- 1. Render source ---------------------------------------------
        if let Err(e) = self.render_source.register() {
            error!(target: "game_loop", "Render source registration failed: {}", e);
            self.state = LoopState::Stopped;
            return Err(e.into());
        }

        //--- 2. Timer source ----------------------------------------------
        let ticks = match self.timer_source.start(period) {
            Ok(ticks) => ticks,
            Err(e) => {
                error!(target: "game_loop", "Timer source registration failed: {}", e);
                self.unregister_render_source();
                self.state = LoopState::Stopped;
                return Err(e.into());
            }
        };

        //--- 3. Physics worker --------------------------------------------
        let scheduler =
            FixedStepScheduler::new(self.config.fixed_step(), self.config.max_steps_per_tick());

        match PhysicsWorker::spawn(
            ticks,
            period,
            scheduler,
            Arc::clone(&self.paused),
            self.outbox.clone(),
            self.waker.clone(),
            self.epoch,
        ) {
            Ok(worker) => self.worker = Some(worker),
            Err(e) => {
                error!(target: "game_loop", "Physics timer thread failed to spawn: {}", e);
                self.unregister_render_source();
                self.state = LoopState::Stopped;
                return Err(LoopError::WorkerSpawn(e));
            }
        }

        //--- 4. Arm the frame chain ---------------------------------------
        self.state = LoopState::Running;
        self.render_source.request_frame();

        info!(
            target: "game_loop",
            "Game loop started (step {:.4}s, max {} steps/tick, epoch {})",
            self.config.fixed_step(),
            self.config.max_steps_per_tick(),
            self.epoch
        );
        Ok(())
    }

    /// Cancels the physics timer, detaches from the render source and
    /// returns to `Stopped`.
    ///
    /// Safe to call repeatedly; does nothing unless the loop is running.
    /// Render-source unregistration that fails or exceeds the configured
    /// timeout is logged and does not prevent the stop.
    pub fn stop(&mut self) {
        if !matches!(self.state, LoopState::Running | LoopState::Starting) {
            trace!(target: "game_loop", "stop() ignored in state {:?}", self.state);
            return;
        }

        self.state = LoopState::Stopping;

        // Invalidate every step already queued for this run
        self.epoch += 1;

        if let Some(worker) = self.worker.take() {
            worker.cancel();
        }

        self.unregister_render_source();
        self.discard_pending();

        self.state = LoopState::Stopped;
        info!(target: "game_loop", "Game loop stopped");
    }

    /// Stops the loop, drops every subscriber and marks the loop disposed.
    ///
    /// Idempotent. Afterwards `start()` fails with [`LoopError::Disposed`]
    /// and every other operation does nothing.
    pub fn dispose(&mut self) {
        if self.state == LoopState::Disposed {
            return;
        }

        self.stop();

        self.render_tick.clear();
        self.physics_tick.clear();
        self.pause_requested.clear();
        self.resume_requested.clear();
        self.input.clear();

        self.state = LoopState::Disposed;
        info!(target: "game_loop", "Game loop disposed");
    }

    //--- Platform Callbacks -----------------------------------------------

    /// Frame notification from the render source (`timestamp_ms` monotonic).
    ///
    /// Dispatches one render tick unless the system pause is active, then
    /// delivers queued physics steps and re-requests the next frame.
    pub fn on_animation_frame(&mut self, timestamp_ms: f64) {
        if self.state != LoopState::Running {
            trace!(target: "game_loop", "Frame ignored in state {:?}", self.state);
            return;
        }

        match self.frame_clock.tick(timestamp_ms, self.gate.is_paused()) {
            Some(delta) => {
                self.render_tick.dispatch(&delta);
            }
            None => trace!(target: "game_loop", "Render tick suppressed (system pause)"),
        }

        self.pump();

        // pump() may have stopped the loop (timer failure)
        if self.state == LoopState::Running {
            self.render_source.request_frame();
        }
    }

    /// Page visibility changed (hidden/visible).
    pub fn set_page_visible(&mut self, visible: bool) {
        let transition = self.gate.set_page_visible(visible);
        self.apply_transition(transition);
    }

    /// Window focus changed (blur/focus).
    pub fn set_window_focused(&mut self, focused: bool) {
        let transition = self.gate.set_window_focused(focused);
        self.apply_transition(transition);
    }

    /// Fire-and-forget passthrough to input subscribers.
    ///
    /// Dropped while the loop is not running or the system pause is active.
    pub fn dispatch_input_event(&self, payload: P) {
        if self.state != LoopState::Running || self.gate.is_paused() {
            trace!(target: "game_loop", "Input event suppressed");
            return;
        }
        self.input.dispatch(&payload);
    }

    //--- UI Message Queue -------------------------------------------------

    /// Delivers physics steps posted by the timer thread.
    ///
    /// Must be called on the UI context. Returns how many physics ticks
    /// were dispatched.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        let mut drained = 0;

        while drained < MAX_MESSAGES_PER_PUMP {
            let Ok(message) = self.inbox.try_recv() else {
                break;
            };
            drained += 1;
            if self.handle_message(message) {
                delivered += 1;
            }
        }

        if drained >= MAX_MESSAGES_PER_PUMP && !self.inbox.is_empty() {
            warn!(target: "game_loop", "Physics queue backlog: drained {} messages this pump", drained);
        }

        delivered
    }

    /// Blocks up to `timeout` for the first posted message, then pumps.
    ///
    /// For headless drivers that have no frame callback to pump from.
    pub fn wait_and_pump(&mut self, timeout: Duration) -> usize {
        match self.inbox.recv_timeout(timeout) {
            Ok(message) => {
                let first = usize::from(self.handle_message(message));
                first + self.pump()
            }
            Err(_) => 0,
        }
    }

    //--- Internal Helpers -------------------------------------------------

    /// Returns `true` if a physics tick was dispatched.
    fn handle_message(&mut self, message: LoopMessage) -> bool {
        match message {
            LoopMessage::PhysicsStep { epoch, delta } => {
                if epoch != self.epoch || self.state != LoopState::Running {
                    trace!(target: "game_loop", "Discarding stale physics step (epoch {})", epoch);
                    return false;
                }
                if self.gate.is_paused() {
                    trace!(target: "game_loop", "Discarding physics step (system pause)");
                    return false;
                }
                self.physics_tick.dispatch(&delta);
                true
            }
            LoopMessage::TimerFailed { epoch } => {
                if epoch == self.epoch && self.state == LoopState::Running {
                    error!(target: "game_loop", "Timer source failed, stopping game loop");
                    self.stop();
                }
                false
            }
        }
    }

    fn apply_transition(&mut self, transition: Option<GateTransition>) {
        let Some(transition) = transition else {
            return;
        };

        self.paused.store(self.gate.is_paused(), Ordering::SeqCst);

        if self.state != LoopState::Running {
            debug!(target: "game_loop", "{:?} while not running, not dispatched", transition);
            return;
        }

        match transition {
            GateTransition::Paused => {
                info!(target: "game_loop", "System pause requested");
                self.pause_requested.dispatch(&());
            }
            GateTransition::Resumed => {
                info!(target: "game_loop", "System resume requested");
                self.resume_requested.dispatch(&());
            }
        }
    }

    fn unregister_render_source(&mut self) {
        let completion = self.render_source.unregister();
        let timeout = self.config.unregister_timeout();

        match completion.recv_timeout(timeout) {
            Ok(Ok(())) => debug!(target: "game_loop", "Render source unregistered"),
            Ok(Err(e)) => info!(target: "game_loop", "{}", e),
            Err(RecvTimeoutError::Timeout) => info!(
                target: "game_loop",
                "Render source did not confirm unregistration within {:?}",
                timeout
            ),
            Err(RecvTimeoutError::Disconnected) => info!(
                target: "game_loop",
                "Render source context already gone during unregistration"
            ),
        }
    }

    fn discard_pending(&self) {
        let discarded = self.inbox.try_iter().count();
        if discarded > 0 {
            debug!(target: "game_loop", "Discarded {} queued loop message(s)", discarded);
        }
    }
}

impl<P: 'static> Drop for GameLoop<P> {
    fn drop(&mut self) {
        self.dispose();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform_bridge::{completed, Completion, PlatformError};
    use crossbeam_channel::bounded;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::thread;
    use std::time::Instant;

    //=====================================================================
    // Test Doubles
    //=====================================================================

    #[derive(Default)]
    struct RenderLog {
        registrations: usize,
        frame_requests: usize,
        unregistrations: usize,
    }

    struct FakeRenderSource {
        log: Rc<RefCell<RenderLog>>,
        fail_register: bool,
        hang_unregister: bool,
        pending: Vec<Sender<Result<(), PlatformError>>>,
    }

    impl RenderSource for FakeRenderSource {
        fn register(&mut self) -> Result<(), PlatformError> {
            if self.fail_register {
                return Err(PlatformError::RenderSourceUnavailable("no window".into()));
            }
            self.log.borrow_mut().registrations += 1;
            Ok(())
        }

        fn request_frame(&mut self) {
            self.log.borrow_mut().frame_requests += 1;
        }

        fn unregister(&mut self) -> Completion {
            self.log.borrow_mut().unregistrations += 1;
            if self.hang_unregister {
                // Keep the sender alive so the completion never resolves
                let (tx, rx) = bounded(1);
                self.pending.push(tx);
                rx
            } else {
                completed(Ok(()))
            }
        }
    }

    #[derive(Default)]
    struct TimerLog {
        starts: usize,
        ticks: Option<Sender<Instant>>,
    }

    struct ManualTimer {
        log: Rc<RefCell<TimerLog>>,
        fail: bool,
    }

    impl TimerSource for ManualTimer {
        fn start(&mut self, _period: Duration) -> Result<Receiver<Instant>, PlatformError> {
            if self.fail {
                return Err(PlatformError::TimerUnavailable("no timers".into()));
            }
            let (tx, rx) = unbounded();
            let mut log = self.log.borrow_mut();
            log.starts += 1;
            log.ticks = Some(tx);
            Ok(rx)
        }
    }

    #[derive(Default)]
    struct Options {
        fail_register: bool,
        fail_timer: bool,
        hang_unregister: bool,
    }

    struct Harness {
        game_loop: GameLoop<u32>,
        render: Rc<RefCell<RenderLog>>,
        timer: Rc<RefCell<TimerLog>>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with(LoopConfig::new(), Options::default())
        }

        fn with(config: LoopConfig, options: Options) -> Self {
            let render = Rc::new(RefCell::new(RenderLog::default()));
            let timer = Rc::new(RefCell::new(TimerLog::default()));

            let game_loop = GameLoop::new(
                config,
                Box::new(FakeRenderSource {
                    log: Rc::clone(&render),
                    fail_register: options.fail_register,
                    hang_unregister: options.hang_unregister,
                    pending: Vec::new(),
                }),
                Box::new(ManualTimer {
                    log: Rc::clone(&timer),
                    fail: options.fail_timer,
                }),
            );

            Self {
                game_loop,
                render,
                timer,
            }
        }

        fn tick(&self) {
            let timer = self.timer.borrow();
            let ticks = timer.ticks.as_ref().expect("timer not started");
            ticks.send(Instant::now()).unwrap();
        }

        /// Waits until the worker has posted at least one message.
        fn await_queued(&self) {
            let deadline = Instant::now() + Duration::from_secs(1);
            while self.game_loop.inbox.is_empty() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(1));
            }
            assert!(!self.game_loop.inbox.is_empty(), "Worker posted nothing");
        }
    }

    fn counting<T: 'static>(counter: &Rc<Cell<usize>>) -> impl FnMut(&T) -> HandlerResult {
        let counter = Rc::clone(counter);
        move |_: &T| {
            counter.set(counter.get() + 1);
            Ok(())
        }
    }

    //=====================================================================
    // Lifecycle Tests
    //=====================================================================

    #[test]
    fn new_loop_is_stopped() {
        let harness = Harness::new();
        assert_eq!(harness.game_loop.state(), LoopState::Stopped);
        assert!(!harness.game_loop.is_paused());
    }

    #[test]
    fn start_twice_registers_once() {
        let mut harness = Harness::new();

        harness.game_loop.start().unwrap();
        harness.game_loop.start().unwrap();

        assert_eq!(harness.game_loop.state(), LoopState::Running);
        assert_eq!(harness.render.borrow().registrations, 1);
        assert_eq!(harness.render.borrow().frame_requests, 1);
        assert_eq!(harness.timer.borrow().starts, 1);
    }

    #[test]
    fn render_registration_failure_aborts_start() {
        let mut harness = Harness::with(
            LoopConfig::new(),
            Options {
                fail_register: true,
                ..Options::default()
            },
        );

        let result = harness.game_loop.start();

        assert!(matches!(
            result,
            Err(LoopError::Platform(PlatformError::RenderSourceUnavailable(_)))
        ));
        assert_eq!(harness.game_loop.state(), LoopState::Stopped);
        assert_eq!(harness.timer.borrow().starts, 0, "Timer must not be touched");
    }

    #[test]
    fn timer_registration_failure_rolls_back_render_source() {
        let mut harness = Harness::with(
            LoopConfig::new(),
            Options {
                fail_timer: true,
                ..Options::default()
            },
        );

        let result = harness.game_loop.start();

        assert!(matches!(
            result,
            Err(LoopError::Platform(PlatformError::TimerUnavailable(_)))
        ));
        assert_eq!(harness.game_loop.state(), LoopState::Stopped);
        assert_eq!(harness.render.borrow().registrations, 1);
        assert_eq!(harness.render.borrow().unregistrations, 1);
        assert_eq!(harness.render.borrow().frame_requests, 0);
    }

    #[test]
    fn unrepresentable_step_fails_start_before_registration() {
        let mut harness = Harness::with(
            LoopConfig::new().with_fixed_step(1e20),
            Options::default(),
        );

        let result = harness.game_loop.start();

        assert!(matches!(
            result,
            Err(LoopError::Platform(PlatformError::TimerUnavailable(_)))
        ));
        assert_eq!(harness.game_loop.state(), LoopState::Stopped);
        assert_eq!(harness.render.borrow().registrations, 0);
        assert_eq!(harness.timer.borrow().starts, 0);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut harness = Harness::new();

        harness.game_loop.stop();
        harness.game_loop.start().unwrap();
        harness.game_loop.stop();
        harness.game_loop.stop();

        assert_eq!(harness.game_loop.state(), LoopState::Stopped);
        assert_eq!(harness.render.borrow().unregistrations, 1);
    }

    #[test]
    fn stop_completes_when_render_source_never_confirms() {
        let config = LoopConfig::new().with_unregister_timeout(Duration::from_millis(20));
        let mut harness = Harness::with(
            config,
            Options {
                hang_unregister: true,
                ..Options::default()
            },
        );

        harness.game_loop.start().unwrap();
        let began = Instant::now();
        harness.game_loop.stop();

        assert_eq!(harness.game_loop.state(), LoopState::Stopped);
        assert!(began.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn restart_after_stop_opens_new_registration() {
        let mut harness = Harness::new();
        let physics = Rc::new(Cell::new(0));
        harness.game_loop.on_physics_tick(counting::<f64>(&physics));

        harness.game_loop.start().unwrap();
        harness.game_loop.stop();
        harness.game_loop.start().unwrap();

        assert_eq!(harness.render.borrow().registrations, 2);
        assert_eq!(harness.timer.borrow().starts, 2);

        harness.tick();
        assert_eq!(harness.game_loop.wait_and_pump(Duration::from_secs(1)), 1);
        assert_eq!(physics.get(), 1);
    }

    #[test]
    fn dispose_before_start_delivers_nothing() {
        let mut harness = Harness::new();
        let renders = Rc::new(Cell::new(0));
        harness.game_loop.on_render_tick(counting::<f64>(&renders));

        harness.game_loop.dispose();

        assert!(matches!(harness.game_loop.start(), Err(LoopError::Disposed)));
        harness.game_loop.on_animation_frame(0.0);

        assert_eq!(renders.get(), 0);
        assert_eq!(harness.render.borrow().registrations, 0);
        assert_eq!(harness.game_loop.state(), LoopState::Disposed);
    }

    #[test]
    fn dispose_discards_in_flight_physics_and_subscribers() {
        let mut harness = Harness::new();
        let physics = Rc::new(Cell::new(0));
        harness.game_loop.on_physics_tick(counting::<f64>(&physics));

        harness.game_loop.start().unwrap();
        harness.tick();
        harness.await_queued();

        harness.game_loop.dispose();

        assert_eq!(harness.game_loop.pump(), 0);
        assert_eq!(physics.get(), 0);
        assert_eq!(harness.game_loop.subscriber_count(), 0);
        assert!(harness.game_loop.is_disposed());

        // Still idempotent
        harness.game_loop.dispose();
        harness.game_loop.stop();
        assert_eq!(harness.render.borrow().unregistrations, 1);
    }

    #[test]
    fn stop_discards_queued_physics_steps() {
        let mut harness = Harness::new();
        let physics = Rc::new(Cell::new(0));
        harness.game_loop.on_physics_tick(counting::<f64>(&physics));

        harness.game_loop.start().unwrap();
        harness.tick();
        harness.await_queued();
        harness.game_loop.stop();

        assert_eq!(harness.game_loop.pump(), 0);
        assert_eq!(physics.get(), 0);
    }

    //=====================================================================
    // Render Tick Tests
    //=====================================================================

    #[test]
    fn render_deltas_start_at_zero_and_clamp() {
        let mut harness = Harness::new();
        let deltas = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&deltas);
        harness.game_loop.on_render_tick(move |dt| {
            sink.borrow_mut().push(*dt);
            Ok(())
        });

        harness.game_loop.start().unwrap();
        for timestamp in [0.0, 16.0, 33.0, 500.0] {
            harness.game_loop.on_animation_frame(timestamp);
        }

        let deltas = deltas.borrow();
        let expected = [0.0, 0.016, 0.017, 0.1];
        assert_eq!(deltas.len(), expected.len());
        for (actual, expected) in deltas.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
        }

        // Initial request plus one re-request per frame
        assert_eq!(harness.render.borrow().frame_requests, 5);
    }

    #[test]
    fn paused_frames_are_suppressed_but_chain_continues() {
        let mut harness = Harness::new();
        let renders = Rc::new(Cell::new(0));
        harness.game_loop.on_render_tick(counting::<f64>(&renders));

        harness.game_loop.start().unwrap();
        harness.game_loop.set_window_focused(false);
        harness.game_loop.on_animation_frame(0.0);
        harness.game_loop.on_animation_frame(16.0);

        assert_eq!(renders.get(), 0);
        assert_eq!(harness.render.borrow().frame_requests, 3);

        harness.game_loop.set_window_focused(true);
        harness.game_loop.on_animation_frame(32.0);
        assert_eq!(renders.get(), 1);
    }

    #[test]
    fn frames_after_stop_are_ignored() {
        let mut harness = Harness::new();
        let renders = Rc::new(Cell::new(0));
        harness.game_loop.on_render_tick(counting::<f64>(&renders));

        harness.game_loop.start().unwrap();
        harness.game_loop.stop();
        harness.game_loop.on_animation_frame(16.0);

        assert_eq!(renders.get(), 0);
        assert_eq!(harness.render.borrow().frame_requests, 1);
    }

    #[test]
    fn failing_render_subscribers_do_not_kill_loop() {
        let mut harness = Harness::new();
        let renders = Rc::new(Cell::new(0));

        harness.game_loop.on_render_tick(|_| Err("render failed".into()));
        harness.game_loop.on_render_tick(|_| panic!("render exploded"));
        harness.game_loop.on_render_tick(counting::<f64>(&renders));

        harness.game_loop.start().unwrap();
        harness.game_loop.on_animation_frame(0.0);
        harness.game_loop.on_animation_frame(16.0);

        assert_eq!(renders.get(), 2);
        assert!(harness.game_loop.is_running());
        assert_eq!(harness.render.borrow().frame_requests, 3);
    }

    //=====================================================================
    // Physics Tick Tests
    //=====================================================================

    #[test]
    fn timer_tick_delivers_one_fixed_step() {
        let mut harness = Harness::new();
        let deltas = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&deltas);
        harness.game_loop.on_physics_tick(move |dt| {
            sink.borrow_mut().push(*dt);
            Ok(())
        });

        harness.game_loop.start().unwrap();
        harness.tick();

        assert_eq!(harness.game_loop.wait_and_pump(Duration::from_secs(1)), 1);
        assert_eq!(*deltas.borrow(), vec![1.0 / 60.0]);
    }

    #[test]
    fn physics_is_delivered_from_frame_callback() {
        let mut harness = Harness::new();
        let physics = Rc::new(Cell::new(0));
        harness.game_loop.on_physics_tick(counting::<f64>(&physics));

        harness.game_loop.start().unwrap();
        harness.tick();
        harness.await_queued();
        harness.game_loop.on_animation_frame(0.0);

        assert_eq!(physics.get(), 1);
    }

    #[test]
    fn paused_loop_delivers_no_physics() {
        let mut harness = Harness::new();
        let physics = Rc::new(Cell::new(0));
        harness.game_loop.on_physics_tick(counting::<f64>(&physics));

        harness.game_loop.start().unwrap();
        harness.game_loop.set_page_visible(false);
        harness.tick();

        assert_eq!(harness.game_loop.wait_and_pump(Duration::from_millis(100)), 0);
        assert_eq!(physics.get(), 0);
    }

    #[test]
    fn failing_physics_subscriber_does_not_block_others() {
        let mut harness = Harness::new();
        let physics = Rc::new(Cell::new(0));
        harness.game_loop.on_physics_tick(|_| Err("physics failed".into()));
        harness.game_loop.on_physics_tick(counting::<f64>(&physics));

        harness.game_loop.start().unwrap();
        harness.tick();
        harness.game_loop.wait_and_pump(Duration::from_secs(1));

        assert_eq!(physics.get(), 1);
        assert!(harness.game_loop.is_running());
    }

    #[test]
    fn timer_failure_stops_loop() {
        let mut harness = Harness::new();
        harness.game_loop.start().unwrap();

        // Dropping the only sender disconnects the tick stream
        harness.timer.borrow_mut().ticks = None;
        harness.game_loop.wait_and_pump(Duration::from_secs(1));

        assert_eq!(harness.game_loop.state(), LoopState::Stopped);
        assert_eq!(harness.render.borrow().unregistrations, 1);
    }

    #[test]
    fn panicking_waker_stops_loop() {
        let mut harness = Harness::new();
        harness
            .game_loop
            .set_ui_waker(Arc::new(|| panic!("waker exploded")));
        harness.game_loop.start().unwrap();

        harness.tick();
        let deadline = Instant::now() + Duration::from_secs(1);
        while harness.game_loop.is_running() && Instant::now() < deadline {
            harness.game_loop.wait_and_pump(Duration::from_millis(50));
        }

        assert_eq!(harness.game_loop.state(), LoopState::Stopped);
        assert_eq!(harness.render.borrow().unregistrations, 1);
    }

    #[test]
    fn full_pump_leaves_nothing_behind() {
        let mut harness = Harness::new();
        let physics = Rc::new(Cell::new(0));
        harness.game_loop.on_physics_tick(counting::<f64>(&physics));
        harness.game_loop.start().unwrap();
        let epoch = harness.game_loop.epoch;

        for _ in 0..MAX_MESSAGES_PER_PUMP {
            harness
                .game_loop
                .outbox
                .send(LoopMessage::PhysicsStep { epoch, delta: 0.01 })
                .unwrap();
        }

        assert_eq!(harness.game_loop.pump(), MAX_MESSAGES_PER_PUMP);
        assert!(harness.game_loop.inbox.is_empty());

        // One more than a pump can drain stays queued for the next pump
        for _ in 0..=MAX_MESSAGES_PER_PUMP {
            harness
                .game_loop
                .outbox
                .send(LoopMessage::PhysicsStep { epoch, delta: 0.01 })
                .unwrap();
        }
        assert_eq!(harness.game_loop.pump(), MAX_MESSAGES_PER_PUMP);
        assert_eq!(harness.game_loop.pump(), 1);
        assert_eq!(physics.get(), 2 * MAX_MESSAGES_PER_PUMP + 1);
    }

    //=====================================================================
    // Visibility Tests
    //=====================================================================

    #[test]
    fn pause_and_resume_fire_once_per_transition() {
        let mut harness = Harness::new();
        let pauses = Rc::new(Cell::new(0));
        let resumes = Rc::new(Cell::new(0));
        harness.game_loop.on_pause_requested(counting::<()>(&pauses));
        harness.game_loop.on_resume_requested(counting::<()>(&resumes));

        harness.game_loop.start().unwrap();
        harness.game_loop.set_page_visible(false);
        harness.game_loop.set_window_focused(false);
        harness.game_loop.set_page_visible(true);
        harness.game_loop.set_window_focused(true);

        assert_eq!(pauses.get(), 1);
        assert_eq!(resumes.get(), 1);
        assert!(!harness.game_loop.is_paused());
    }

    #[test]
    fn start_resets_visibility_assumption() {
        let mut harness = Harness::new();
        harness.game_loop.start().unwrap();
        harness.game_loop.set_page_visible(false);
        harness.game_loop.stop();

        harness.game_loop.start().unwrap();
        assert!(!harness.game_loop.is_paused());
    }

    //=====================================================================
    // Input Passthrough Tests
    //=====================================================================

    #[test]
    fn input_events_pass_through_only_while_running_unpaused() {
        let mut harness = Harness::new();
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        harness.game_loop.on_input(move |payload| {
            sink.borrow_mut().push(*payload);
            Ok(())
        });

        harness.game_loop.dispatch_input_event(1);
        harness.game_loop.start().unwrap();
        harness.game_loop.dispatch_input_event(2);
        harness.game_loop.set_window_focused(false);
        harness.game_loop.dispatch_input_event(3);
        harness.game_loop.set_window_focused(true);
        harness.game_loop.dispatch_input_event(4);

        assert_eq!(*received.borrow(), vec![2, 4]);
    }
}
