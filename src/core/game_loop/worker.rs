//=========================================================================
// Physics Timer Worker
//=========================================================================
//
// Background thread that turns timer ticks into physics-step messages.
//
// Architecture:
// ```text
//  physics-timer thread                    UI context
//  ┌────────────────────────────┐         ┌──────────────────────┐
//  │ select! {                  │         │ GameLoop::pump()     │
//  │   cancel  → exit           │         │   ↓                  │
//  │   tick    → scheduler      │ ──MPSC──┼─> physics-tick       │
//  │             ↓ N steps      │         │   subscribers        │
//  │           PhysicsStep × N  │         └──────────────────────┘
//  │             ↓              │                    ↑
//  │           waker()  ────────┼────────────────────┘
//  │ }                          │   (platform wake-up)
//  └────────────────────────────┘
// ```
//
// The worker never calls game logic. It only reads the shared pause flag
// and posts messages; subscribers run where the UI state lives.
//
// Timer sources may coalesce ticks the worker was too slow to receive. The
// worker counts elapsed periods between tick timestamps so stalled time
// still reaches the scheduler and its step cap. A panic on the thread is
// reported to the UI context as `TimerFailed`, like a dead timer.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, Receiver, Sender};
use log::{debug, error, trace};

//=== Internal Dependencies ===============================================

use crate::core::timing::FixedStepScheduler;

//=== Messages ============================================================

/// Posted from the physics timer thread to the UI context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum LoopMessage {
    /// One fixed simulation step is due.
    PhysicsStep { epoch: u64, delta: f64 },

    /// The timer source died; the loop must stop.
    TimerFailed { epoch: u64 },
}

/// Wakes the UI context after messages were posted.
///
/// Platforms whose UI loop sleeps between events (winit) install one so
/// queued physics steps are delivered without waiting for the next frame.
pub type UiWaker = Arc<dyn Fn() + Send + Sync>;

//=== PhysicsWorker =======================================================

/// Handle to a running physics timer thread. Cancels and joins on drop.
pub(crate) struct PhysicsWorker {
    cancel_tx: Option<Sender<()>>,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PhysicsWorker {
    //--- Construction -----------------------------------------------------

    /// Spawns the timer thread for one run of the loop (`epoch`).
    ///
    /// `period` is the interval the timer source was started with.
    pub(crate) fn spawn(
        ticks: Receiver<Instant>,
        period: Duration,
        scheduler: FixedStepScheduler,
        paused: Arc<AtomicBool>,
        outbox: Sender<LoopMessage>,
        waker: Option<UiWaker>,
        epoch: u64,
    ) -> io::Result<Self> {
        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        let cancelled = Arc::new(AtomicBool::new(false));

        let panic_outbox = outbox.clone();
        let panic_waker = waker.clone();

        let worker = TimerThread {
            ticks,
            period,
            last_tick: None,
            cancel_rx,
            scheduler,
            paused,
            cancelled: Arc::clone(&cancelled),
            outbox,
            waker,
            epoch,
        };

        let handle = thread::Builder::new()
            .name("physics-timer".to_string())
            .spawn(move || {
                if panic::catch_unwind(AssertUnwindSafe(|| worker.run())).is_err() {
                    error!(target: "scheduler", "Physics timer thread panicked, stopping loop");
                    let _ = panic_outbox.send(LoopMessage::TimerFailed { epoch });
                    if let Some(waker) = &panic_waker {
                        let _ = panic::catch_unwind(AssertUnwindSafe(|| waker()));
                    }
                }
            })?;

        Ok(Self {
            cancel_tx: Some(cancel_tx),
            cancelled,
            handle: Some(handle),
        })
    }

    //--- Shutdown ---------------------------------------------------------

    /// Requests cancellation and waits for the thread to exit.
    ///
    /// After this returns no further message is posted by this worker.
    pub(crate) fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);

        // Disconnecting the cancel channel wakes the select immediately
        self.cancel_tx.take();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!(target: "scheduler", "Physics timer thread panicked");
            }
        }
    }
}

impl Drop for PhysicsWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//=== TimerThread =========================================================

struct TimerThread {
    ticks: Receiver<Instant>,
    period: Duration,
    last_tick: Option<Instant>,
    cancel_rx: Receiver<()>,
    scheduler: FixedStepScheduler,
    paused: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
    outbox: Sender<LoopMessage>,
    waker: Option<UiWaker>,
    epoch: u64,
}

impl TimerThread {
    fn run(mut self) {
        debug!(target: "scheduler", "Physics timer running (epoch {})", self.epoch);

        loop {
            select! {
                recv(self.cancel_rx) -> _ => break,
                recv(self.ticks) -> tick => match tick {
                    Ok(now) => {
                        if !self.on_tick(now) {
                            break;
                        }
                    }
                    Err(_) => {
                        error!(target: "scheduler", "Timer source disconnected, stopping loop");
                        let _ = self.outbox.send(LoopMessage::TimerFailed { epoch: self.epoch });
                        self.wake();
                        break;
                    }
                },
            }
        }

        debug!(target: "scheduler", "Physics timer exited (epoch {})", self.epoch);
    }

    /// Runs the scheduler for the periods elapsed up to `now`. Returns
    /// `false` when the thread should exit.
    fn on_tick(&mut self, now: Instant) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return false;
        }

        let ticks = self.elapsed_ticks(now);

        let paused = self.paused.load(Ordering::SeqCst);
        let epoch = self.epoch;
        let cancelled = &self.cancelled;
        let outbox = &self.outbox;
        let mut posted = 0u32;
        let mut disconnected = false;

        let outcome = self.scheduler.on_timer_ticks(ticks, paused, |delta| {
            if disconnected || cancelled.load(Ordering::SeqCst) {
                return;
            }
            match outbox.send(LoopMessage::PhysicsStep { epoch, delta }) {
                Ok(()) => posted += 1,
                Err(_) => disconnected = true,
            }
        });

        trace!(
            target: "scheduler",
            "Timer tick: periods={} paused={} steps={} posted={}",
            ticks,
            paused,
            outcome.steps,
            posted
        );

        if posted > 0 {
            self.wake();
        }

        if disconnected {
            debug!(target: "scheduler", "UI queue closed, physics timer exiting");
            return false;
        }
        true
    }

    /// Number of timer periods covered by the tick stamped `now`. At least 1.
    fn elapsed_ticks(&mut self, now: Instant) -> u32 {
        let period = self.period.as_secs_f64();
        let ticks = match self.last_tick {
            Some(last) if period > 0.0 => {
                let periods = now.saturating_duration_since(last).as_secs_f64() / period;
                periods.round().min(f64::from(u32::MAX)) as u32
            }
            _ => 1,
        };
        self.last_tick = Some(now);
        ticks.max(1)
    }

    fn wake(&self) {
        if let Some(waker) = &self.waker {
            waker();
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
