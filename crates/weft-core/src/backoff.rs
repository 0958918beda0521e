//! Backoff calculator: exponential growth with a cap.

use std::time::Duration;

/// Exponential backoff state for one retry session.
///
/// The state mutates on every [`Backoff::next_interval`] call, so one instance
/// belongs to exactly one session at a time. Call [`Backoff::reset`] before
/// reusing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    /// First interval. Zero means "seed from the caller's base interval".
    pub initial: Duration,

    /// Upper bound for every interval. Zero means uncapped.
    pub max: Duration,

    /// Growth factor applied per call after the first.
    ///
    /// A factor `<= 1.0` (or NaN/infinite) is a misconfiguration; it is
    /// treated as `1.0` so the interval holds steady instead of shrinking.
    pub factor: f64,

    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, factor: f64) -> Self {
        Self {
            initial,
            max,
            factor,
            current: Duration::ZERO,
        }
    }

    /// The interval returned by the last call, or zero before the first.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Forget the current interval; the next call starts from `initial` again.
    pub fn reset(&mut self) {
        self.current = Duration::ZERO;
    }

    /// Compute the next interval.
    ///
    /// - first call: `min(initial, max)`, seeding `initial` from `base` when unset
    /// - later calls: `min(current * factor, max)`
    ///
    /// Example with initial=1s, factor=2.0, max=10s: 1s, 2s, 4s, 8s, 10s, 10s, ...
    pub fn next_interval(&mut self, base: Duration) -> Duration {
        if self.current.is_zero() {
            if self.initial.is_zero() {
                self.initial = base;
            }
            self.current = self.cap(self.initial);
            return self.current;
        }

        let factor = self.effective_factor();
        if factor == 1.0 {
            return self.current;
        }
        let grown = scale(self.current, factor);
        // never shrink, even if float rounding says otherwise
        self.current = self.cap(grown.max(self.current));
        self.current
    }

    fn effective_factor(&self) -> f64 {
        if self.factor.is_finite() && self.factor > 1.0 {
            self.factor
        } else {
            1.0
        }
    }

    fn cap(&self, interval: Duration) -> Duration {
        if self.max.is_zero() {
            interval
        } else {
            interval.min(self.max)
        }
    }
}

/// `interval * factor` rounded to the nearest nanosecond, saturating.
fn scale(interval: Duration, factor: f64) -> Duration {
    let nanos = (interval.as_nanos() as f64 * factor).round();
    if nanos < u64::MAX as f64 {
        return Duration::from_nanos(nanos as u64);
    }
    Duration::try_from_secs_f64(interval.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

impl Default for Backoff {
    /// 1s initial, 30s cap, factor 2.0.
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30), 2.0)
    }
}
