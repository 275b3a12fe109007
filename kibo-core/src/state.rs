//! The emotion state: one clamped intensity per dimension plus the time each
//! was last moved by a stimulus.
//!
//! `EmotionState` does no locking of its own. [`crate::EmotionEngine`] is its
//! only mutator and serializes access.

use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::error::KiboError;
use crate::types::{DimensionMap, EmotionDimension, Timestamp};

/// Per-dimension intensities in [0, 1] and their last stimulus timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionState {
    intensities: DimensionMap<f32>,
    last_updated: DimensionMap<Option<Timestamp>>,
}

impl EmotionState {
    /// A state resting at `baselines`, never stimulated.
    #[must_use]
    pub fn at_baseline(baselines: &DimensionMap<f32>) -> Self {
        Self {
            intensities: baselines.map(|_, &v| v.clamp(0.0, 1.0)),
            last_updated: DimensionMap::default(),
        }
    }

    /// Current intensity of `dim`.
    #[must_use]
    pub fn get(&self, dim: EmotionDimension) -> f32 {
        self.intensities[dim]
    }

    /// Set `dim` to `value` clamped to [0, 1] and record `now` as its last update.
    pub fn set(&mut self, dim: EmotionDimension, value: f32, now: Timestamp) {
        self.intensities[dim] = clamp_unit(value);
        self.last_updated[dim] = Some(now);
    }

    /// Add `delta` to `dim` (clamped) and record `now` as its last update.
    pub fn adjust(&mut self, dim: EmotionDimension, delta: f32, now: Timestamp) {
        self.set(dim, self.get(dim) + delta, now);
    }

    /// Overwrite `dim` without touching its timestamp. Used by the decay and
    /// tick passes, which are not stimuli.
    pub(crate) fn settle(&mut self, dim: EmotionDimension, value: f32) {
        self.intensities[dim] = clamp_unit(value);
    }

    /// When `dim` was last moved by a stimulus, if ever.
    #[must_use]
    pub fn last_updated(&self, dim: EmotionDimension) -> Option<Timestamp> {
        self.last_updated[dim]
    }

    /// Copy of every intensity.
    #[must_use]
    pub fn intensities(&self) -> DimensionMap<f32> {
        self.intensities
    }

    /// The strongest dimension and its intensity.
    ///
    /// Exact ties go to the dimension earliest in [`EmotionDimension::ALL`].
    #[must_use]
    pub fn dominant(&self) -> (EmotionDimension, f32) {
        let (dim, &value) = self
            .intensities
            .iter()
            .max_by_key(|&(dim, &value)| (OrderedFloat(value), std::cmp::Reverse(dim.index())))
            .unwrap_or((EmotionDimension::ALL[0], &self.intensities[EmotionDimension::ALL[0]]));
        (dim, value)
    }

    /// Verify every intensity is finite and within [0, 1].
    ///
    /// # Errors
    /// Returns [`KiboError::InvariantViolation`] naming the first bad dimension.
    pub fn check_invariants(&self) -> crate::error::Result<()> {
        for (dimension, &value) in self.intensities.iter() {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return Err(KiboError::InvariantViolation { dimension, value });
            }
        }
        Ok(())
    }
}

/// Clamp to [0, 1]; NaN maps to 0.
fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
