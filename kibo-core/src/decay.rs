//! Exponential relaxation toward baseline.
//!
//! Each dimension's distance from its resting level shrinks as
//!   R = e^(-t/τ)
//!
//! Where:
//!   R = fraction of the excursion that remains (1.0 = none decayed)
//!   t = seconds since the previous tick
//!   τ = the dimension's configured time constant (`half_life_secs`)
//!
//! Because R is a pure function of elapsed wall-clock time, two ticks of
//! `t/2` land exactly where one tick of `t` does. Tick cadence never causes
//! drift.

/// Fraction of an excursion retained after `dt_secs` with time constant `tau_secs`.
///
/// Returns a value in [0.0, 1.0]. A non-positive time constant retains nothing.
#[must_use]
pub fn retention(dt_secs: f64, tau_secs: f64) -> f64 {
    if tau_secs <= 0.0 {
        return 0.0;
    }
    (-dt_secs.max(0.0) / tau_secs).exp()
}

/// Move `current` toward `baseline` by the decay accumulated over `dt_secs`.
///
/// The result always lies between `current` and `baseline` (inclusive), so
/// repeated application approaches the baseline monotonically and never
/// overshoots.
#[must_use]
pub fn relax_toward(current: f32, baseline: f32, dt_secs: f64, tau_secs: f64) -> f32 {
    let excursion = f64::from(current) - f64::from(baseline);
    #[allow(clippy::cast_possible_truncation)]
    let relaxed = (f64::from(baseline) + excursion * retention(dt_secs, tau_secs)) as f32;
    if current >= baseline {
        relaxed.clamp(baseline, current)
    } else {
        relaxed.clamp(current, baseline)
    }
}
