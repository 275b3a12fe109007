//! Stimulus events reported by sensors, vision, audio and the clock.
//!
//! A stimulus is a transient value: it is validated, scored once, and
//! discarded. Payloads are typed primitives; no raw sensor data crosses into
//! the core.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ScoringWeights;
use crate::error::ValidationError;
use crate::types::Timestamp;

/// Where the robot was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchLocation {
    /// Head pad. Weighted highest for affection.
    Head,
    /// Body / side pads.
    Body,
    /// Back pad.
    Back,
}

impl TouchLocation {
    /// Lowercase label, matching the sensor wiring names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Body => "body",
            Self::Back => "back",
        }
    }
}

impl fmt::Display for TouchLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TouchLocation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "head" => Ok(Self::Head),
            "body" | "side" | "belly" => Ok(Self::Body),
            "back" => Ok(Self::Back),
            _ => Err(ValidationError::UnknownTouchLocation(s.to_string())),
        }
    }
}

/// The payload of a stimulus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stimulus {
    /// A touch pad was held for `duration_secs`.
    Touch {
        /// Which pad.
        location: TouchLocation,
        /// How long contact lasted.
        duration_secs: f64,
    },
    /// Someone spoke with the robot.
    Voice,
    /// Face recognition produced a result.
    FaceRecognized {
        /// Whether the face matched a known user.
        known: bool,
    },
    /// The proximity sensor reported something at `distance_cm`.
    Proximity {
        /// Measured distance.
        distance_cm: f64,
    },
    /// Periodic idle accounting.
    IdleTick {
        /// Seconds since the last positive interaction.
        idle_secs: f64,
        /// Seconds since the previous tick.
        dt_secs: f64,
    },
    /// Periodic circadian accounting.
    TimeOfDay {
        /// Local hour, 0–23.
        hour: u8,
        /// Seconds since the previous tick.
        dt_secs: f64,
    },
}

/// Discriminant of [`Stimulus`], for logging and counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StimulusKind {
    /// See [`Stimulus::Touch`].
    Touch,
    /// See [`Stimulus::Voice`].
    Voice,
    /// See [`Stimulus::FaceRecognized`].
    FaceRecognized,
    /// See [`Stimulus::Proximity`].
    Proximity,
    /// See [`Stimulus::IdleTick`].
    IdleTick,
    /// See [`Stimulus::TimeOfDay`].
    TimeOfDay,
}

impl Stimulus {
    /// Which kind of stimulus this is.
    #[must_use]
    pub fn kind(&self) -> StimulusKind {
        match self {
            Self::Touch { .. } => StimulusKind::Touch,
            Self::Voice => StimulusKind::Voice,
            Self::FaceRecognized { .. } => StimulusKind::FaceRecognized,
            Self::Proximity { .. } => StimulusKind::Proximity,
            Self::IdleTick { .. } => StimulusKind::IdleTick,
            Self::TimeOfDay { .. } => StimulusKind::TimeOfDay,
        }
    }

    /// Whether this stimulus counts as company and resets the idle counter.
    #[must_use]
    pub fn is_positive_interaction(&self) -> bool {
        matches!(
            self,
            Self::Touch { .. } | Self::Voice | Self::FaceRecognized { known: true }
        )
    }

    /// Reject payloads that are not physically sensible.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] describing the first problem found.
    pub fn validate(&self, weights: &ScoringWeights) -> Result<(), ValidationError> {
        match *self {
            Self::Touch { duration_secs, .. } => {
                finite("duration_secs", duration_secs)?;
                if duration_secs < 0.0 {
                    return Err(ValidationError::NegativeDuration(duration_secs));
                }
            }
            Self::Proximity { distance_cm } => {
                finite("distance_cm", distance_cm)?;
                if !(0.0..=weights.max_distance_cm).contains(&distance_cm) {
                    return Err(ValidationError::DistanceOutOfRange {
                        distance_cm,
                        max_cm: weights.max_distance_cm,
                    });
                }
            }
            Self::IdleTick { idle_secs, dt_secs } => {
                non_negative_secs("idle_secs", idle_secs)?;
                non_negative_secs("dt_secs", dt_secs)?;
            }
            Self::TimeOfDay { hour, dt_secs } => {
                if hour >= 24 {
                    return Err(ValidationError::HourOutOfRange(hour));
                }
                non_negative_secs("dt_secs", dt_secs)?;
            }
            Self::Voice | Self::FaceRecognized { .. } => {}
        }
        Ok(())
    }
}

/// A stimulus stamped with the instant it happened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StimulusEvent {
    /// What happened.
    pub stimulus: Stimulus,
    /// When it happened.
    pub timestamp: Timestamp,
}

impl StimulusEvent {
    /// Pair a stimulus with its timestamp.
    #[must_use]
    pub fn new(stimulus: Stimulus, timestamp: Timestamp) -> Self {
        Self {
            stimulus,
            timestamp,
        }
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite(field))
    }
}

fn non_negative_secs(field: &'static str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeDuration(value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_locations_parse_from_sensor_names() {
        assert_eq!("HEAD".parse::<TouchLocation>().ok(), Some(TouchLocation::Head));
        assert_eq!("side".parse::<TouchLocation>().ok(), Some(TouchLocation::Body));
        assert!(matches!(
            "tail".parse::<TouchLocation>(),
            Err(ValidationError::UnknownTouchLocation(_))
        ));
    }

    #[test]
    fn negative_touch_duration_is_rejected() {
        let s = Stimulus::Touch {
            location: TouchLocation::Head,
            duration_secs: -1.0,
        };
        assert_eq!(
            s.validate(&ScoringWeights::default()),
            Err(ValidationError::NegativeDuration(-1.0))
        );
    }

    #[test]
    fn distance_must_be_within_sensor_range() {
        let weights = ScoringWeights::default();
        assert!(Stimulus::Proximity { distance_cm: 0.0 }.validate(&weights).is_ok());
        assert!(Stimulus::Proximity { distance_cm: -5.0 }.validate(&weights).is_err());
        assert!(Stimulus::Proximity { distance_cm: 10_000.0 }.validate(&weights).is_err());
        assert_eq!(
            Stimulus::Proximity { distance_cm: f64::NAN }.validate(&weights),
            Err(ValidationError::NonFinite("distance_cm"))
        );
    }

    #[test]
    fn hour_must_be_in_day() {
        let s = Stimulus::TimeOfDay { hour: 24, dt_secs: 1.0 };
        assert_eq!(
            s.validate(&ScoringWeights::default()),
            Err(ValidationError::HourOutOfRange(24))
        );
    }

    #[test]
    fn only_company_resets_idle() {
        assert!(Stimulus::Voice.is_positive_interaction());
        assert!(Stimulus::FaceRecognized { known: true }.is_positive_interaction());
        assert!(!Stimulus::FaceRecognized { known: false }.is_positive_interaction());
        assert!(!Stimulus::Proximity { distance_cm: 30.0 }.is_positive_interaction());
    }

    #[test]
    fn stimulus_serializes_with_kind_tag() {
        let json = serde_json::to_value(Stimulus::FaceRecognized { known: true }).expect("serialize");
        assert_eq!(json["kind"], "face_recognized");
        assert_eq!(json["known"], true);
    }
}
