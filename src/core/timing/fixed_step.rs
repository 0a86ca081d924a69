//=========================================================================
// Fixed Step Scheduler
//=========================================================================
//
// Converts timer ticks into zero-or-more fixed-size simulation steps with
// bounded catch-up.
//
// Per timer tick:
//   1. paused  → lag = 0, no steps
//   2. lag += step × ticks (one nominal step per timer tick, including
//      ticks the timer coalesced while the worker was stalled)
//   3. while lag >= step && steps < max: run_step(step); lag -= step
//   4. cap reached with lag still >= step → warn, lag = 0
//
// Step 4 drops simulated time on purpose: a loop that cannot keep up
// would otherwise owe more steps every tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::warn;

/// Default simulation step, in seconds.
pub const DEFAULT_FIXED_STEP: f64 = 1.0 / 60.0;

/// Default cap on steps dispatched per timer tick.
pub const DEFAULT_MAX_STEPS_PER_TICK: u32 = 5;

// Absorbs float drift from repeated add/subtract of the step size.
const LAG_EPSILON: f64 = 1e-9;

//=== TickOutcome =========================================================

/// What a single timer tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Steps dispatched during this tick.
    pub steps: u32,

    /// Lag discarded because the step cap was reached (seconds).
    pub dropped_lag: Option<f64>,
}

//=== FixedStepScheduler ==================================================

#[derive(Debug, Clone)]
pub struct FixedStepScheduler {
    step: f64,
    max_steps: u32,
    lag: f64,
}

impl FixedStepScheduler {
    pub fn new(step: f64, max_steps: u32) -> Self {
        Self {
            step,
            max_steps,
            lag: 0.0,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Simulated time owed but not yet dispatched.
    pub fn lag(&self) -> f64 {
        self.lag
    }

    pub fn reset(&mut self) {
        self.lag = 0.0;
    }

    /// Handles one timer tick worth one nominal step.
    pub fn on_timer_tick<F>(&mut self, paused: bool, run_step: F) -> TickOutcome
    where
        F: FnMut(f64),
    {
        self.advance(self.step, paused, run_step)
    }

    /// Handles `ticks` timer periods at once, for timers that coalesce
    /// missed ticks into a single notification.
    pub fn on_timer_ticks<F>(&mut self, ticks: u32, paused: bool, run_step: F) -> TickOutcome
    where
        F: FnMut(f64),
    {
        self.advance(self.step * f64::from(ticks), paused, run_step)
    }

    /// Accumulates `elapsed` seconds of lag and dispatches the owed steps.
    pub fn advance<F>(&mut self, elapsed: f64, paused: bool, mut run_step: F) -> TickOutcome
    where
        F: FnMut(f64),
    {
        if paused {
            self.lag = 0.0;
            return TickOutcome {
                steps: 0,
                dropped_lag: None,
            };
        }

        self.lag += elapsed;

        let mut steps = 0;
        while self.lag + LAG_EPSILON >= self.step && steps < self.max_steps {
            run_step(self.step);
            self.lag -= self.step;
            steps += 1;
        }

        let mut dropped_lag = None;
        if steps == self.max_steps && self.lag + LAG_EPSILON >= self.step {
            warn!(
                target: "scheduler",
                "Physics fell behind: dropping {:.4}s of lag after {} steps",
                self.lag,
                steps
            );
            dropped_lag = Some(self.lag);
            self.lag = 0.0;
        }

        if self.lag < 0.0 {
            self.lag = 0.0;
        }

        TickOutcome { steps, dropped_lag }
    }
}

impl Default for FixedStepScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_STEP, DEFAULT_MAX_STEPS_PER_TICK)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
