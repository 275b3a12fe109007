//! Time sources for the engine.
//!
//! The `on_*` helpers stamp stimuli with [`Clock::now`]. Production code uses
//! [`SystemClock`]; tests and replays use [`ManualClock`] so identical inputs
//! produce identical state.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::types::Timestamp;

/// A source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Timestamp;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to `instant`.
    pub fn set(&self, instant: Timestamp) {
        *self.now.lock() = instant;
    }

    /// Move forward by `secs` seconds (millisecond resolution).
    ///
    /// Saturates at the representable range; a non-finite `secs` leaves the
    /// clock where it is.
    pub fn advance_secs(&self, secs: f64) {
        if !secs.is_finite() {
            return;
        }
        let mut now = self.now.lock();
        *now = offset_by_secs(*now, secs).unwrap_or(if secs > 0.0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        });
    }
}

/// `base` shifted by `secs` seconds, rounded to the millisecond.
///
/// `None` if `secs` is not finite or the result falls outside the range a
/// [`Timestamp`] can hold.
#[must_use]
pub fn offset_by_secs(base: Timestamp, secs: f64) -> Option<Timestamp> {
    let millis = (secs * 1000.0).round();
    #[allow(clippy::cast_precision_loss)]
    let in_range = millis.is_finite() && millis.abs() < i64::MAX as f64;
    if !in_range {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let delta = Duration::try_milliseconds(millis as i64)?;
    base.checked_add_signed(delta)
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_moves_when_advanced() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance_secs(2.5);
        assert_eq!(clock.now(), start + Duration::milliseconds(2500));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn huge_advance_saturates_instead_of_panicking() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        clock.advance_secs(f64::NAN);
        assert_eq!(clock.now(), start);

        clock.advance_secs(1e15);
        assert_eq!(clock.now(), DateTime::<Utc>::MAX_UTC);
        clock.advance_secs(1.0);
        assert_eq!(clock.now(), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn offset_rejects_unrepresentable_results() {
        let start = Utc::now();
        assert_eq!(
            offset_by_secs(start, 1.5),
            Some(start + Duration::milliseconds(1500))
        );
        assert_eq!(offset_by_secs(start, 1e15), None);
        assert_eq!(offset_by_secs(start, 1e300), None);
        assert_eq!(offset_by_secs(start, f64::INFINITY), None);
    }
}
