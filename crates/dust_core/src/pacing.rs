//! Frame pacing against the display refresh rate.
//!
//! Every measured delta is clamped into `[1/r, 4/r]`. Short frames sleep
//! off the remainder so the loop never outruns the display, long frames are
//! capped so a hitch does not teleport particles.

use std::time::Duration;

/// Refresh rate used when the host reports something unusable.
pub const FALLBACK_REFRESH_RATE: f32 = 60.0;

/// Outcome of pacing one measured delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacedDelta {
    /// Delta to simulate with, in seconds.
    pub delta: f64,
    /// Time to sleep before drawing, if the frame came in early.
    pub sleep: Option<Duration>,
}

/// Clamps raw frame deltas into the refresh-rate window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePacer {
    min_delta: f64,
    max_delta: f64,
}

impl FramePacer {
    /// Creates a pacer for `refresh_rate` Hz, with the upper bound at
    /// `max_delta_factor` frames.
    ///
    /// Non-finite or non-positive refresh rates fall back to 60 Hz.
    #[must_use]
    pub fn new(refresh_rate: f32, max_delta_factor: f64) -> Self {
        let rate = if refresh_rate.is_finite() && refresh_rate > 0.0 {
            refresh_rate
        } else {
            FALLBACK_REFRESH_RATE
        };
        let min_delta = 1.0 / f64::from(rate);
        Self {
            min_delta,
            max_delta: min_delta * max_delta_factor.max(1.0),
        }
    }

    /// Lower bound, one display frame.
    #[must_use]
    pub const fn min_delta(&self) -> f64 {
        self.min_delta
    }

    /// Upper bound.
    #[must_use]
    pub const fn max_delta(&self) -> f64 {
        self.max_delta
    }

    /// Paces a raw delta measured in seconds.
    #[must_use]
    pub fn pace(&self, raw: f64) -> PacedDelta {
        if raw < self.min_delta {
            let remaining = self.min_delta - raw.max(0.0);
            PacedDelta {
                delta: self.min_delta,
                sleep: Some(Duration::from_secs_f64(remaining)),
            }
        } else if raw > self.max_delta {
            PacedDelta { delta: self.max_delta, sleep: None }
        } else {
            PacedDelta { delta: raw, sleep: None }
        }
    }

    /// Paces a raw delta given as a [`Duration`].
    #[must_use]
    pub fn pace_duration(&self, raw: Duration) -> PacedDelta {
        self.pace(raw.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_sixty_hz_window() {
        let pacer = FramePacer::new(60.0, 4.0);
        assert!((pacer.min_delta() - 0.016_666_666).abs() < 1e-6);
        assert!((pacer.max_delta() - 0.066_666_666).abs() < 1e-6);
    }

    #[test]
    fn test_long_frame_is_capped() {
        let pacer = FramePacer::new(60.0, 4.0);
        let paced = pacer.pace(0.2);
        assert!((paced.delta - 4.0 / 60.0).abs() < EPS);
        assert!(paced.sleep.is_none());
    }

    #[test]
    fn test_short_frame_sleeps_remainder() {
        let pacer = FramePacer::new(60.0, 4.0);
        let paced = pacer.pace(0.006);
        assert!((paced.delta - 1.0 / 60.0).abs() < EPS);
        let sleep = paced.sleep.expect("short frame must sleep");
        assert!((sleep.as_secs_f64() - (1.0 / 60.0 - 0.006)).abs() < 1e-6);
    }

    #[test]
    fn test_in_window_passes_through() {
        let pacer = FramePacer::new(60.0, 4.0);
        let paced = pacer.pace(0.03);
        assert!((paced.delta - 0.03).abs() < EPS);
        assert!(paced.sleep.is_none());
    }

    #[test]
    fn test_delta_always_in_window() {
        for rate in [30.0_f32, 60.0, 90.0, 120.0, 144.0] {
            let pacer = FramePacer::new(rate, 4.0);
            let lo = 1.0 / f64::from(rate);
            let hi = 4.0 / f64::from(rate);
            for raw in [0.0, 1e-5, 0.004, 0.01, 0.02, 0.05, 0.1, 1.0, 30.0] {
                let delta = pacer.pace(raw).delta;
                assert!(delta >= lo - EPS && delta <= hi + EPS, "rate {rate} raw {raw} -> {delta}");
            }
        }
    }

    #[test]
    fn test_bad_refresh_rate_falls_back() {
        assert_eq!(FramePacer::new(0.0, 4.0), FramePacer::new(60.0, 4.0));
        assert_eq!(FramePacer::new(f32::NAN, 4.0), FramePacer::new(60.0, 4.0));
    }
}
