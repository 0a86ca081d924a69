//=========================================================================
// Loop Configuration
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::timing::{DEFAULT_FIXED_STEP, DEFAULT_MAX_FRAME_DELTA, DEFAULT_MAX_STEPS_PER_TICK};

//=== LoopConfig ==========================================================

/// Tunables for [`GameLoop`](super::GameLoop).
///
/// # Default Values
///
/// - **Fixed step**: 1/60 s (also the timer period)
/// - **Max frame delta**: 0.1 s
/// - **Max steps per timer tick**: 5
/// - **Unregister timeout**: 1 s
///
/// # Examples
///
/// ```
/// use blockfall_engine::core::game_loop::LoopConfig;
///
/// let config = LoopConfig::new()
///     .with_fixed_step(1.0 / 120.0)
///     .with_max_steps_per_tick(8);
///
/// assert_eq!(config.max_steps_per_tick(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct LoopConfig {
    fixed_step: f64,
    max_frame_delta: f64,
    max_steps_per_tick: u32,
    unregister_timeout: Duration,
}

impl LoopConfig {
    /// Creates a config with default settings.
    pub fn new() -> Self {
        Self {
            fixed_step: DEFAULT_FIXED_STEP,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            max_steps_per_tick: DEFAULT_MAX_STEPS_PER_TICK,
            unregister_timeout: Duration::from_secs(1),
        }
    }

    /// Sets the physics step size in seconds. The timer fires once per step.
    ///
    /// # Panics
    ///
    /// Panics if `step <= 0.0` or is not finite.
    pub fn with_fixed_step(mut self, step: f64) -> Self {
        assert!(
            step.is_finite() && step > 0.0,
            "Fixed step must be positive, got {}",
            step
        );
        self.fixed_step = step;
        self
    }

    /// Sets the clamp applied to every render delta, in seconds.
    ///
    /// # Panics
    ///
    /// Panics if `max_delta <= 0.0`.
    pub fn with_max_frame_delta(mut self, max_delta: f64) -> Self {
        assert!(max_delta > 0.0, "Max frame delta must be positive, got {}", max_delta);
        self.max_frame_delta = max_delta;
        self
    }

    /// Sets how many physics steps one timer tick may dispatch.
    ///
    /// # Panics
    ///
    /// Panics if `max_steps == 0`.
    pub fn with_max_steps_per_tick(mut self, max_steps: u32) -> Self {
        assert!(max_steps > 0, "Max steps per tick must be positive");
        self.max_steps_per_tick = max_steps;
        self
    }

    /// Sets how long `stop()` waits for the render source to detach.
    pub fn with_unregister_timeout(mut self, timeout: Duration) -> Self {
        self.unregister_timeout = timeout;
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn fixed_step(&self) -> f64 {
        self.fixed_step
    }

    pub fn max_frame_delta(&self) -> f64 {
        self.max_frame_delta
    }

    pub fn max_steps_per_tick(&self) -> u32 {
        self.max_steps_per_tick
    }

    pub fn unregister_timeout(&self) -> Duration {
        self.unregister_timeout
    }

    /// Period requested from the timer source.
    ///
    /// `None` if the step does not fit in a `Duration`.
    pub fn timer_period(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.fixed_step).ok()
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_preserve_literal_constants() {
        let config = LoopConfig::new();
        assert_eq!(config.fixed_step(), 1.0 / 60.0);
        assert_eq!(config.max_frame_delta(), 0.1);
        assert_eq!(config.max_steps_per_tick(), 5);
        assert_eq!(config.unregister_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn timer_period_follows_step() {
        let config = LoopConfig::new().with_fixed_step(0.02);
        assert_eq!(config.timer_period(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn oversized_step_has_no_timer_period() {
        let config = LoopConfig::new().with_fixed_step(1e20);
        assert_eq!(config.timer_period(), None);
    }

    #[test]
    #[should_panic(expected = "Fixed step must be positive")]
    fn zero_step_panics() {
        LoopConfig::new().with_fixed_step(0.0);
    }

    #[test]
    #[should_panic(expected = "Max steps per tick must be positive")]
    fn zero_max_steps_panics() {
        LoopConfig::new().with_max_steps_per_tick(0);
    }

    #[test]
    #[should_panic(expected = "Max frame delta must be positive")]
    fn negative_frame_delta_panics() {
        LoopConfig::new().with_max_frame_delta(-1.0);
    }

    #[test]
    fn fluent_api_chaining() {
        let config = LoopConfig::new()
            .with_fixed_step(0.01)
            .with_max_frame_delta(0.25)
            .with_max_steps_per_tick(3)
            .with_unregister_timeout(Duration::from_millis(50));

        assert_eq!(config.fixed_step(), 0.01);
        assert_eq!(config.max_frame_delta(), 0.25);
        assert_eq!(config.max_steps_per_tick(), 3);
        assert_eq!(config.unregister_timeout(), Duration::from_millis(50));
    }
}
