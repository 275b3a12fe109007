//! Stimulus scoring.
//!
//! [`EmotionScorer::score`] turns one stimulus into an [`EmotionDelta`]: an
//! additive, pre-clamp change per dimension. It reads the trait profile and
//! the current state but never writes; the engine applies the delta
//! atomically.
//!
//! | Stimulus          | Raises                         | Lowers              | Trait scaling            |
//! |-------------------|--------------------------------|---------------------|--------------------------|
//! | touch             | loving, happy                  | lonely              | affection                |
//! | voice             | happy, curious, excited        |                     | sociability              |
//! | known face        | happy, loving                  |                     | affection                |
//! | unknown face      | curious, scared                |                     | curiosity, 1-sociability |
//! | near approach     | excited, curious               |                     | energy, curiosity        |
//! | very near         | scared, surprised              |                     | 1-sociability            |
//! | idle              | lonely                         |                     | 1-sociability            |
//! | night             | sleepy                         | excited, playful    | energy                   |

use crate::config::{AwakeWindow, ScoringWeights};
use crate::state::EmotionState;
use crate::stimulus::{Stimulus, StimulusEvent, TouchLocation};
use crate::traits::TraitProfile;
use crate::types::{DimensionMap, EmotionDimension};

/// Additive change per dimension, applied before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmotionDelta(DimensionMap<f32>);

impl EmotionDelta {
    /// No change anywhere.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Accumulate `amount` onto `dim`.
    pub fn add(&mut self, dim: EmotionDimension, amount: f32) {
        self.0[dim] += amount;
    }

    /// Accumulated change for `dim`.
    #[must_use]
    pub fn get(&self, dim: EmotionDimension) -> f32 {
        self.0[dim]
    }

    /// Fold another delta into this one.
    pub fn merge(&mut self, other: &Self) {
        for (dim, &amount) in other.0.iter() {
            self.0[dim] += amount;
        }
    }

    /// Dimensions with a non-zero change, in priority order.
    pub fn nonzero(&self) -> impl Iterator<Item = (EmotionDimension, f32)> + '_ {
        self.0
            .iter()
            .filter(|&(_, &amount)| amount != 0.0)
            .map(|(dim, &amount)| (dim, amount))
    }

    /// Whether the delta changes nothing.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.nonzero().next().is_none()
    }
}

/// Converts stimuli into emotion deltas.
#[derive(Debug, Clone)]
pub struct EmotionScorer {
    weights: ScoringWeights,
    awake_window: AwakeWindow,
}

impl EmotionScorer {
    /// Create a scorer with the given weights and awake window.
    #[must_use]
    pub fn new(weights: ScoringWeights, awake_window: AwakeWindow) -> Self {
        Self {
            weights,
            awake_window,
        }
    }

    /// The scoring weights in use.
    #[must_use]
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// The awake window in use.
    #[must_use]
    pub fn awake_window(&self) -> &AwakeWindow {
        &self.awake_window
    }

    /// Score one stimulus against the traits and current state.
    ///
    /// The payload is assumed valid; the engine validates before scoring.
    #[must_use]
    pub fn score(
        &self,
        event: &StimulusEvent,
        traits: &TraitProfile,
        state: &EmotionState,
    ) -> EmotionDelta {
        match event.stimulus {
            Stimulus::Touch {
                location,
                duration_secs,
            } => self.touch(location, duration_secs, traits, state),
            Stimulus::Voice => self.voice(traits),
            Stimulus::FaceRecognized { known } => self.face(known, traits),
            Stimulus::Proximity { distance_cm } => self.proximity(distance_cm, traits),
            Stimulus::IdleTick { idle_secs, dt_secs } => self.idle(idle_secs, dt_secs, traits),
            Stimulus::TimeOfDay { hour, dt_secs } => self.circadian(hour, dt_secs, traits, state),
        }
    }

    fn touch(
        &self,
        location: TouchLocation,
        duration_secs: f64,
        traits: &TraitProfile,
        state: &EmotionState,
    ) -> EmotionDelta {
        let w = &self.weights;
        let saturation = saturating(duration_secs, w.touch_saturation_secs);
        let placement = match location {
            TouchLocation::Head => w.head_weight,
            TouchLocation::Body => w.body_weight,
            TouchLocation::Back => w.back_weight,
        };
        // A frightened robot takes less comfort from being handled.
        let dampening = 1.0 - state.get(EmotionDimension::Scared) * w.touch_fear_dampening;
        let gain = saturation * placement * dampening;
        let affection = traits.affection();

        let mut delta = EmotionDelta::zero();
        delta.add(EmotionDimension::Loving, w.touch_loving_boost * affection * gain);
        delta.add(
            EmotionDimension::Happy,
            w.touch_happy_boost * (0.5 + 0.5 * affection) * gain,
        );
        delta.add(EmotionDimension::Lonely, -w.touch_lonely_relief * saturation);
        delta
    }

    fn voice(&self, traits: &TraitProfile) -> EmotionDelta {
        let boost = self.weights.voice_boost * traits.sociability();
        let mut delta = EmotionDelta::zero();
        delta.add(EmotionDimension::Happy, boost);
        delta.add(EmotionDimension::Curious, boost * 0.6);
        delta.add(EmotionDimension::Excited, boost * 0.3);
        delta
    }

    fn face(&self, known: bool, traits: &TraitProfile) -> EmotionDelta {
        let w = &self.weights;
        let mut delta = EmotionDelta::zero();
        if known {
            delta.add(EmotionDimension::Happy, w.face_known_boost);
            delta.add(EmotionDimension::Loving, w.face_known_boost * traits.affection());
        } else {
            delta.add(EmotionDimension::Curious, w.face_unknown_curious * traits.curiosity());
            delta.add(
                EmotionDimension::Scared,
                w.face_unknown_scared * (1.0 - traits.sociability()),
            );
        }
        delta
    }

    #[allow(clippy::cast_possible_truncation)]
    fn proximity(&self, distance_cm: f64, traits: &TraitProfile) -> EmotionDelta {
        let w = &self.weights;
        let mut delta = EmotionDelta::zero();
        if distance_cm < w.startle_distance_cm {
            // Social personalities startle less.
            let startle = w.startle_boost * (1.0 - traits.sociability());
            delta.add(EmotionDimension::Scared, startle);
            delta.add(EmotionDimension::Surprised, startle);
        } else if distance_cm < w.near_distance_cm {
            let span = w.near_distance_cm - w.startle_distance_cm;
            let closeness = (1.0 - (distance_cm - w.startle_distance_cm) / span) as f32;
            delta.add(
                EmotionDimension::Excited,
                w.proximity_boost * closeness * traits.energy(),
            );
            delta.add(
                EmotionDimension::Curious,
                w.proximity_boost * closeness * traits.curiosity(),
            );
        }
        delta
    }

    #[allow(clippy::cast_possible_truncation)]
    fn idle(&self, idle_secs: f64, dt_secs: f64, traits: &TraitProfile) -> EmotionDelta {
        let w = &self.weights;
        let mut delta = EmotionDelta::zero();
        let overdue = idle_secs - w.loneliness_onset_secs;
        if overdue > 0.0 {
            // Only the part of this tick that falls past the onset accrues.
            let accrual = dt_secs.min(overdue) as f32;
            delta.add(
                EmotionDimension::Lonely,
                w.loneliness_rate * (1.0 - traits.sociability()) * accrual,
            );
        }
        delta
    }

    #[allow(clippy::cast_possible_truncation)]
    fn circadian(
        &self,
        hour: u8,
        dt_secs: f64,
        traits: &TraitProfile,
        state: &EmotionState,
    ) -> EmotionDelta {
        let mut delta = EmotionDelta::zero();
        if self.awake_window.contains(hour) {
            return delta;
        }
        let w = &self.weights;
        let pressure = (f64::from(w.circadian_rate * traits.energy()) * dt_secs).min(1.0) as f32;
        delta.add(
            EmotionDimension::Excited,
            -state.get(EmotionDimension::Excited) * pressure,
        );
        delta.add(
            EmotionDimension::Playful,
            -state.get(EmotionDimension::Playful) * pressure,
        );
        delta.add(EmotionDimension::Sleepy, w.circadian_sleepy_gain * pressure);
        delta
    }
}

/// `min(value, cap) / cap`: linear up to `cap`, flat after.
#[allow(clippy::cast_possible_truncation)]
fn saturating(value: f64, cap: f64) -> f32 {
    (value.min(cap) / cap).clamp(0.0, 1.0) as f32
}
