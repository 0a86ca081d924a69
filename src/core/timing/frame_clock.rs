//=========================================================================
// Frame Clock
//=========================================================================
//
// Turns platform frame timestamps (milliseconds, monotonic) into clamped
// render deltas (seconds).
//
//   t0 → 0.0          (no previous timestamp)
//   tN → min((tN - tN-1) / 1000, max_delta)
//
// The timestamp is recorded on every frame, paused or not, so the first
// delta after a pause is measured from the last paused frame rather than
// from the frame before the pause.
//
//=========================================================================

/// Default clamp for a single render delta, in seconds.
pub const DEFAULT_MAX_FRAME_DELTA: f64 = 0.1;

//=== FrameClock ==========================================================

#[derive(Debug, Clone)]
pub struct FrameClock {
    last_timestamp_ms: Option<f64>,
    max_delta: f64,
}

impl FrameClock {
    pub fn new(max_delta: f64) -> Self {
        Self {
            last_timestamp_ms: None,
            max_delta,
        }
    }

    /// Forgets the previous timestamp; the next frame yields a zero delta.
    pub fn reset(&mut self) {
        self.last_timestamp_ms = None;
    }

    /// Records `timestamp_ms` and returns the clamped delta in seconds.
    pub fn advance(&mut self, timestamp_ms: f64) -> f64 {
        let delta = match self.last_timestamp_ms {
            None => 0.0,
            Some(previous) => ((timestamp_ms - previous) / 1000.0).clamp(0.0, self.max_delta),
        };
        self.last_timestamp_ms = Some(timestamp_ms);
        delta
    }

    /// Frame callback entry point.
    ///
    /// Always records the timestamp. Returns the delta to forward to the
    /// render-tick consumer, or `None` while `paused`.
    pub fn tick(&mut self, timestamp_ms: f64, paused: bool) -> Option<f64> {
        let delta = self.advance(timestamp_ms);
        (!paused).then_some(delta)
    }

    pub fn last_timestamp_ms(&self) -> Option<f64> {
        self.last_timestamp_ms
    }

    pub fn max_delta(&self) -> f64 {
        self.max_delta
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_DELTA)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn first_tick_yields_zero() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.advance(1234.0), 0.0);
        assert_eq!(clock.last_timestamp_ms(), Some(1234.0));
    }

    #[test]
    fn deltas_are_seconds_and_clamped() {
        let mut clock = FrameClock::default();
        let deltas: Vec<f64> = [0.0, 16.0, 33.0, 500.0]
            .iter()
            .map(|&t| clock.advance(t))
            .collect();

        assert_close(deltas[0], 0.0);
        assert_close(deltas[1], 0.016);
        assert_close(deltas[2], 0.017);
        assert_close(deltas[3], 0.1);
    }

    #[test]
    fn reset_restarts_at_zero() {
        let mut clock = FrameClock::default();
        clock.advance(0.0);
        clock.advance(16.0);
        clock.reset();
        assert_eq!(clock.advance(5000.0), 0.0);
    }

    #[test]
    fn paused_ticks_are_suppressed_but_recorded() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.tick(0.0, false), Some(0.0));
        assert_eq!(clock.tick(16.0, true), None);
        assert_eq!(clock.tick(3000.0, true), None);

        // Measured from the last paused frame, not from t=0
        let delta = clock.tick(3016.0, false).unwrap();
        assert_close(delta, 0.016);
    }

    #[test]
    fn backwards_timestamp_clamps_to_zero() {
        let mut clock = FrameClock::default();
        clock.advance(100.0);
        assert_eq!(clock.advance(50.0), 0.0);
    }

    #[test]
    fn custom_clamp_is_respected() {
        let mut clock = FrameClock::new(0.25);
        clock.advance(0.0);
        assert_close(clock.advance(200.0), 0.2);
        assert_close(clock.advance(1000.0), 0.25);
    }
}
