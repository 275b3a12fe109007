//! Configuration for the KIBO emotion engine.
//!
//! Plain serde-derived structs. Text formats are parsed by the host layer
//! (`kibo-host`), which hands a finished [`EngineConfig`] to
//! [`crate::EmotionEngine::new`]. Every numeric weight lives here rather than
//! in the scorer so it can be tuned without a rebuild.

use std::collections::BTreeMap;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{DimensionMap, EmotionDimension, Timestamp};

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Resting level and decay time constant for every dimension.
    #[serde(default = "default_decay_table")]
    pub decay: BTreeMap<EmotionDimension, DecaySpec>,
    /// Hours during which the robot is expected to be awake.
    #[serde(default)]
    pub awake_window: AwakeWindow,
    /// Per-stimulus scoring weights.
    #[serde(default)]
    pub scoring: ScoringWeights,
    /// Energy level dynamics.
    #[serde(default)]
    pub energy: EnergyConfig,
    /// How conversation-chosen emotions blend into the state.
    #[serde(default)]
    pub blend: BlendConfig,
    /// A dimension stimulated within this many seconds is skipped by the decay pass.
    #[serde(default = "default_decay_grace")]
    pub decay_grace_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decay: default_decay_table(),
            awake_window: AwakeWindow::default(),
            scoring: ScoringWeights::default(),
            energy: EnergyConfig::default(),
            blend: BlendConfig::default(),
            decay_grace_secs: default_decay_grace(),
        }
    }
}

impl EngineConfig {
    /// Check every section.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.decay_tables()?;
        self.awake_window.validate()?;
        self.scoring.validate()?;
        self.energy.validate()?;
        self.blend.validate()?;
        non_negative("decay_grace_secs", self.decay_grace_secs)?;
        Ok(())
    }

    /// Resolve the decay table into per-dimension baselines and time constants.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingDimension`] if a dimension has no entry,
    /// or a range error for an invalid baseline or half-life.
    pub fn decay_tables(&self) -> Result<(DimensionMap<f32>, DimensionMap<f64>), ConfigError> {
        let baselines = DimensionMap::try_from_fn(|dim| {
            let entry = self.decay.get(&dim).ok_or(ConfigError::MissingDimension(dim))?;
            if entry.baseline.is_finite() && (0.0..=1.0).contains(&entry.baseline) {
                Ok(entry.baseline)
            } else {
                Err(ConfigError::BaselineOutOfRange {
                    dimension: dim,
                    value: entry.baseline,
                })
            }
        })?;
        let half_lives = DimensionMap::try_from_fn(|dim| {
            let entry = self.decay.get(&dim).ok_or(ConfigError::MissingDimension(dim))?;
            if entry.half_life_secs.is_finite() && entry.half_life_secs > 0.0 {
                Ok(entry.half_life_secs)
            } else {
                Err(ConfigError::NonPositiveHalfLife {
                    dimension: dim,
                    value: entry.half_life_secs,
                })
            }
        })?;
        Ok((baselines, half_lives))
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Resting level and decay speed for one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecaySpec {
    /// Intensity the dimension relaxes toward absent stimuli.
    pub baseline: f32,
    /// Decay time constant τ in seconds: the distance to baseline shrinks by
    /// `exp(-dt / τ)` over `dt` seconds.
    pub half_life_secs: f64,
}

impl DecaySpec {
    /// Shorthand constructor.
    #[must_use]
    pub const fn new(baseline: f32, half_life_secs: f64) -> Self {
        Self {
            baseline,
            half_life_secs,
        }
    }
}

/// Daily window in which the robot is awake. Outside it, circadian scoring
/// pushes toward sleepiness.
///
/// `start_hour == end_hour` means awake around the clock. A window may wrap
/// midnight (`start_hour > end_hour`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwakeWindow {
    /// First awake hour (inclusive), 0–23.
    #[serde(default = "default_wake_hour")]
    pub start_hour: u8,
    /// First asleep hour (exclusive end of the window), 0–23.
    #[serde(default = "default_sleep_hour")]
    pub end_hour: u8,
    /// Offset of the robot's local time from UTC, in whole hours.
    #[serde(default)]
    pub utc_offset_hours: i8,
}

impl Default for AwakeWindow {
    fn default() -> Self {
        Self {
            start_hour: 7,
            end_hour: 22,
            utc_offset_hours: 0,
        }
    }
}

impl AwakeWindow {
    /// Awake around the clock; circadian scoring never fires.
    pub const ALWAYS: Self = Self {
        start_hour: 0,
        end_hour: 0,
        utc_offset_hours: 0,
    };

    /// Whether local `hour` falls inside the window.
    #[must_use]
    pub fn contains(&self, hour: u8) -> bool {
        match self.start_hour.cmp(&self.end_hour) {
            std::cmp::Ordering::Equal => true,
            std::cmp::Ordering::Less => (self.start_hour..self.end_hour).contains(&hour),
            std::cmp::Ordering::Greater => hour >= self.start_hour || hour < self.end_hour,
        }
    }

    /// Local hour of day for `now`, applying the configured UTC offset.
    #[must_use]
    pub fn local_hour(&self, now: Timestamp) -> u8 {
        let hour = i32::try_from(now.hour()).unwrap_or(0) + i32::from(self.utc_offset_hours);
        u8::try_from(hour.rem_euclid(24)).unwrap_or(0)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.start_hour >= 24 || self.end_hour >= 24 {
            return Err(ConfigError::InvalidAwakeWindow(format!(
                "hours must be 0..24, got {}..{}",
                self.start_hour, self.end_hour
            )));
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(ConfigError::InvalidAwakeWindow(format!(
                "UTC offset must be -12..=14, got {}",
                self.utc_offset_hours
            )));
        }
        Ok(())
    }
}

/// Weights used by [`crate::EmotionScorer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Touch duration beyond which longer contact adds nothing.
    pub touch_saturation_secs: f64,
    /// `loving` gain for a saturated head touch at full affection.
    pub touch_loving_boost: f32,
    /// `happy` gain for a saturated head touch.
    pub touch_happy_boost: f32,
    /// `lonely` reduction for a saturated touch.
    pub touch_lonely_relief: f32,
    /// Fraction of the touch gain removed when fully scared.
    pub touch_fear_dampening: f32,
    /// Location weight for the head pad.
    pub head_weight: f32,
    /// Location weight for the body pad.
    pub body_weight: f32,
    /// Location weight for the back pad.
    pub back_weight: f32,
    /// `happy` gain per voice interaction at full sociability.
    pub voice_boost: f32,
    /// `happy` gain when a known face is recognised.
    pub face_known_boost: f32,
    /// `curious` gain for an unknown face at full curiosity.
    pub face_unknown_curious: f32,
    /// `scared` gain for an unknown face at zero sociability.
    pub face_unknown_scared: f32,
    /// Farthest distance the proximity sensor reports.
    pub max_distance_cm: f64,
    /// Approaches closer than this register as "near".
    pub near_distance_cm: f64,
    /// Approaches closer than this startle.
    pub startle_distance_cm: f64,
    /// `excited`/`curious` gain for a near approach right at the startle edge.
    pub proximity_boost: f32,
    /// `scared`/`surprised` gain for a startle at zero sociability.
    pub startle_boost: f32,
    /// Seconds without a positive interaction before loneliness starts to accrue.
    pub loneliness_onset_secs: f64,
    /// `lonely` gain per idle second at zero sociability.
    pub loneliness_rate: f32,
    /// Circadian pressure per second outside the awake window at full energy.
    pub circadian_rate: f32,
    /// `sleepy` gain at full circadian pressure.
    pub circadian_sleepy_gain: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            touch_saturation_secs: 3.0,
            touch_loving_boost: 0.3,
            touch_happy_boost: 0.25,
            touch_lonely_relief: 0.3,
            touch_fear_dampening: 0.5,
            head_weight: 1.0,
            body_weight: 0.8,
            back_weight: 0.6,
            voice_boost: 0.2,
            face_known_boost: 0.25,
            face_unknown_curious: 0.2,
            face_unknown_scared: 0.15,
            max_distance_cm: 400.0,
            near_distance_cm: 50.0,
            startle_distance_cm: 10.0,
            proximity_boost: 0.2,
            startle_boost: 0.4,
            loneliness_onset_secs: 30.0,
            loneliness_rate: 0.0005,
            circadian_rate: 0.001,
            circadian_sleepy_gain: 0.5,
        }
    }
}

impl ScoringWeights {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.touch_saturation_secs.is_finite() && self.touch_saturation_secs > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "touch_saturation_secs",
                value: self.touch_saturation_secs,
            });
        }
        for (name, value) in [
            ("touch_loving_boost", self.touch_loving_boost),
            ("touch_happy_boost", self.touch_happy_boost),
            ("touch_lonely_relief", self.touch_lonely_relief),
            ("head_weight", self.head_weight),
            ("body_weight", self.body_weight),
            ("back_weight", self.back_weight),
            ("voice_boost", self.voice_boost),
            ("face_known_boost", self.face_known_boost),
            ("face_unknown_curious", self.face_unknown_curious),
            ("face_unknown_scared", self.face_unknown_scared),
            ("proximity_boost", self.proximity_boost),
            ("startle_boost", self.startle_boost),
            ("loneliness_rate", self.loneliness_rate),
            ("circadian_rate", self.circadian_rate),
            ("circadian_sleepy_gain", self.circadian_sleepy_gain),
        ] {
            non_negative(name, f64::from(value))?;
        }
        unit_interval("touch_fear_dampening", self.touch_fear_dampening)?;
        non_negative("loneliness_onset_secs", self.loneliness_onset_secs)?;
        non_negative("startle_distance_cm", self.startle_distance_cm)?;
        if !(self.near_distance_cm.is_finite() && self.near_distance_cm > self.startle_distance_cm) {
            return Err(ConfigError::InvalidParameter {
                name: "near_distance_cm",
                value: self.near_distance_cm,
            });
        }
        if !(self.max_distance_cm.is_finite() && self.max_distance_cm >= self.near_distance_cm) {
            return Err(ConfigError::InvalidParameter {
                name: "max_distance_cm",
                value: self.max_distance_cm,
            });
        }
        Ok(())
    }
}

/// Energy level dynamics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Energy lost per awake second.
    pub drain_rate: f32,
    /// Energy never drains below this.
    pub floor: f32,
    /// Energy regained per asleep second, up to the trait energy.
    pub recharge_rate: f32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            drain_rate: 0.000_05,
            floor: 0.1,
            recharge_rate: 0.000_2,
        }
    }
}

impl EnergyConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("drain_rate", f64::from(self.drain_rate))?;
        non_negative("recharge_rate", f64::from(self.recharge_rate))?;
        unit_interval("floor", self.floor)
    }
}

/// How emotions chosen by the conversation model blend into the state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Every other dimension is multiplied by this when one emotion is set outright.
    pub override_suppression: f32,
    /// Every dimension is multiplied by this before an emotion sequence is applied.
    pub sequence_suppression: f32,
    /// Intensity given to the first emotion of a sequence.
    pub sequence_floor: f32,
    /// Intensity given to the last emotion of a sequence.
    pub sequence_peak: f32,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            override_suppression: 0.3,
            sequence_suppression: 0.2,
            sequence_floor: 0.3,
            sequence_peak: 0.8,
        }
    }
}

impl BlendConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        unit_interval("override_suppression", self.override_suppression)?;
        unit_interval("sequence_suppression", self.sequence_suppression)?;
        unit_interval("sequence_floor", self.sequence_floor)?;
        unit_interval("sequence_peak", self.sequence_peak)?;
        if self.sequence_floor > self.sequence_peak {
            return Err(ConfigError::InvalidParameter {
                name: "sequence_floor",
                value: f64::from(self.sequence_floor),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

fn unit_interval(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            value: f64::from(value),
        })
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

/// Baseline 0.1 everywhere with a mild curious bias. High-arousal dimensions
/// fade within a minute or two; attachment and mood dimensions linger.
#[must_use]
pub fn default_decay_table() -> BTreeMap<EmotionDimension, DecaySpec> {
    use EmotionDimension as E;
    BTreeMap::from([
        (E::Angry, DecaySpec::new(0.1, 120.0)),
        (E::Bored, DecaySpec::new(0.1, 600.0)),
        (E::Curious, DecaySpec::new(0.2, 180.0)),
        (E::Excited, DecaySpec::new(0.1, 60.0)),
        (E::Happy, DecaySpec::new(0.1, 300.0)),
        (E::Lonely, DecaySpec::new(0.1, 1200.0)),
        (E::Loving, DecaySpec::new(0.1, 900.0)),
        (E::Playful, DecaySpec::new(0.1, 120.0)),
        (E::Sad, DecaySpec::new(0.1, 600.0)),
        (E::Scared, DecaySpec::new(0.1, 45.0)),
        (E::Sleepy, DecaySpec::new(0.1, 1800.0)),
        (E::Surprised, DecaySpec::new(0.1, 20.0)),
    ])
}

fn default_decay_grace() -> f64 { 2.0 }
fn default_wake_hour() -> u8 { 7 }
fn default_sleep_hour() -> u8 { 22 }

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn missing_dimension_is_rejected() {
        let mut config = EngineConfig::default();
        config.decay.remove(&EmotionDimension::Sleepy);
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingDimension(EmotionDimension::Sleepy))
        );
    }

    #[test]
    fn non_positive_half_life_is_rejected() {
        let mut config = EngineConfig::default();
        config
            .decay
            .insert(EmotionDimension::Happy, DecaySpec::new(0.1, 0.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveHalfLife {
                dimension: EmotionDimension::Happy,
                ..
            })
        ));
    }

    #[test]
    fn baseline_out_of_range_is_rejected() {
        let mut config = EngineConfig::default();
        config
            .decay
            .insert(EmotionDimension::Sad, DecaySpec::new(1.5, 60.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BaselineOutOfRange { .. })
        ));
    }

    #[test]
    fn inverted_proximity_thresholds_are_rejected() {
        let mut config = EngineConfig::default();
        config.scoring.startle_distance_cm = 80.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter {
                name: "near_distance_cm",
                ..
            })
        ));
    }

    #[test]
    fn awake_window_hours_must_be_in_day() {
        let mut config = EngineConfig::default();
        config.awake_window.end_hour = 24;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAwakeWindow(_))
        ));
    }

    #[test]
    fn awake_window_contains() {
        let day = AwakeWindow::default();
        assert!(day.contains(7));
        assert!(day.contains(21));
        assert!(!day.contains(22));
        assert!(!day.contains(3));

        let night_shift = AwakeWindow {
            start_hour: 20,
            end_hour: 4,
            utc_offset_hours: 0,
        };
        assert!(night_shift.contains(23));
        assert!(night_shift.contains(2));
        assert!(!night_shift.contains(12));

        assert!((0..24).all(|h| AwakeWindow::ALWAYS.contains(h)));
    }

    #[test]
    fn local_hour_applies_offset() {
        let window = AwakeWindow {
            utc_offset_hours: -5,
            ..AwakeWindow::default()
        };
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 2, 30, 0).single().expect("valid");
        assert_eq!(window.local_hour(now), 21);
    }
}
