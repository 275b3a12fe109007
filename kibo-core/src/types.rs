//! Core type definitions for the KIBO emotion core.
//!
//! The emotion model is a closed set of twelve dimensions. Everything keyed by
//! dimension is stored in a [`DimensionMap`], a fixed-size array indexed by the
//! enum, so a missing or extra dimension cannot be represented.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Wall-clock instant used for every stimulus and tick.
pub type Timestamp = DateTime<Utc>;

/// Seconds elapsed from `earlier` to `later`, or `0.0` if `later` is not after it.
#[must_use]
pub fn seconds_between(earlier: Timestamp, later: Timestamp) -> f64 {
    let delta = later.signed_duration_since(earlier);
    #[allow(clippy::cast_precision_loss)]
    let secs = delta.num_milliseconds() as f64 / 1000.0;
    secs.max(0.0)
}

// ---------------------------------------------------------------------------
// Emotion Dimensions
// ---------------------------------------------------------------------------

/// One axis of emotional intensity.
///
/// Declaration order is alphabetical on the label and doubles as the
/// tie-break priority for [`crate::EmotionState::dominant`]: when two
/// dimensions hold exactly the same intensity, the one declared first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionDimension {
    /// Frustrated or cross.
    Angry,
    /// Under-stimulated.
    Bored,
    /// Interested in something new.
    Curious,
    /// High-arousal positive.
    Excited,
    /// Content and cheerful.
    Happy,
    /// Missing company.
    Lonely,
    /// Affectionate toward someone.
    Loving,
    /// In the mood to play.
    Playful,
    /// Low and down.
    Sad,
    /// Frightened.
    Scared,
    /// Tired.
    Sleepy,
    /// Startled by something unexpected.
    Surprised,
}

impl EmotionDimension {
    /// Number of dimensions in the model.
    pub const COUNT: usize = 12;

    /// Every dimension, in tie-break priority order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Angry,
        Self::Bored,
        Self::Curious,
        Self::Excited,
        Self::Happy,
        Self::Lonely,
        Self::Loving,
        Self::Playful,
        Self::Sad,
        Self::Scared,
        Self::Sleepy,
        Self::Surprised,
    ];

    /// Position of this dimension in [`Self::ALL`]. Lower is higher priority.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase label, as used in configuration and LLM emotion tags.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Angry => "angry",
            Self::Bored => "bored",
            Self::Curious => "curious",
            Self::Excited => "excited",
            Self::Happy => "happy",
            Self::Lonely => "lonely",
            Self::Loving => "loving",
            Self::Playful => "playful",
            Self::Sad => "sad",
            Self::Scared => "scared",
            Self::Sleepy => "sleepy",
            Self::Surprised => "surprised",
        }
    }
}

impl fmt::Display for EmotionDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionDimension {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|dim| dim.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownEmotion(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Dimension-keyed storage
// ---------------------------------------------------------------------------

/// A value for every [`EmotionDimension`], stored inline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionMap<T>([T; EmotionDimension::COUNT]);

impl<T: Copy> DimensionMap<T> {
    /// Every dimension set to `value`.
    #[must_use]
    pub fn splat(value: T) -> Self {
        Self([value; EmotionDimension::COUNT])
    }
}

impl<T> DimensionMap<T> {
    /// Build a map by evaluating `f` once per dimension.
    pub fn from_fn(mut f: impl FnMut(EmotionDimension) -> T) -> Self {
        Self(std::array::from_fn(|i| f(EmotionDimension::ALL[i])))
    }

    /// Build a map by evaluating a fallible `f` once per dimension, stopping
    /// at the first error.
    ///
    /// # Errors
    /// Returns the first error produced by `f`.
    pub fn try_from_fn<E>(
        mut f: impl FnMut(EmotionDimension) -> Result<T, E>,
    ) -> Result<Self, E>
    where
        T: Copy + Default,
    {
        let mut values = [T::default(); EmotionDimension::COUNT];
        for dim in EmotionDimension::ALL {
            values[dim.index()] = f(dim)?;
        }
        Ok(Self(values))
    }

    /// Iterate `(dimension, value)` pairs in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (EmotionDimension, &T)> {
        EmotionDimension::ALL.into_iter().zip(self.0.iter())
    }

    /// Transform every value, keeping the keys.
    #[must_use]
    pub fn map<U>(&self, mut f: impl FnMut(EmotionDimension, &T) -> U) -> DimensionMap<U> {
        DimensionMap::from_fn(|dim| f(dim, &self.0[dim.index()]))
    }

    /// Borrow the values as a slice, in priority order.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.0
    }
}

impl<T: Default> Default for DimensionMap<T> {
    fn default() -> Self {
        Self(std::array::from_fn(|_| T::default()))
    }
}

impl<T> Index<EmotionDimension> for DimensionMap<T> {
    type Output = T;

    fn index(&self, dim: EmotionDimension) -> &T {
        &self.0[dim.index()]
    }
}

impl<T> IndexMut<EmotionDimension> for DimensionMap<T> {
    fn index_mut(&mut self, dim: EmotionDimension) -> &mut T {
        &mut self.0[dim.index()]
    }
}

impl<T: Serialize> Serialize for DimensionMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(EmotionDimension::COUNT))?;
        for (dim, value) in self.iter() {
            map.serialize_entry(dim.as_str(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_declaration_order() {
        for (i, dim) in EmotionDimension::ALL.iter().enumerate() {
            assert_eq!(dim.index(), i);
        }
    }

    #[test]
    fn priority_order_is_alphabetical() {
        let labels: Vec<&str> = EmotionDimension::ALL.iter().map(|d| d.as_str()).collect();
        let mut sorted = labels.clone();
        sorted.sort_unstable();
        assert_eq!(labels, sorted);
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("Happy".parse::<EmotionDimension>().ok(), Some(EmotionDimension::Happy));
        assert_eq!(" sleepy ".parse::<EmotionDimension>().ok(), Some(EmotionDimension::Sleepy));
        assert!(matches!(
            "grumpy".parse::<EmotionDimension>(),
            Err(ValidationError::UnknownEmotion(_))
        ));
    }

    #[test]
    fn dimension_map_indexes_by_enum() {
        let mut map = DimensionMap::splat(0.1_f32);
        map[EmotionDimension::Loving] = 0.9;
        assert!((map[EmotionDimension::Loving] - 0.9).abs() < f32::EPSILON);
        assert!((map[EmotionDimension::Happy] - 0.1).abs() < f32::EPSILON);
        assert_eq!(map.iter().count(), EmotionDimension::COUNT);
    }

    #[test]
    fn try_from_fn_stops_at_first_error() {
        let result: Result<DimensionMap<f32>, EmotionDimension> =
            DimensionMap::try_from_fn(|dim| {
                if dim == EmotionDimension::Lonely { Err(dim) } else { Ok(0.5) }
            });
        assert_eq!(result.err(), Some(EmotionDimension::Lonely));
    }

    #[test]
    fn dimension_map_serializes_as_labelled_object() {
        let map = DimensionMap::splat(0.25_f32);
        let json = serde_json::to_value(map).expect("serialize");
        assert_eq!(json["curious"], serde_json::json!(0.25));
        assert_eq!(json.as_object().map(serde_json::Map::len), Some(12));
    }

    #[test]
    fn seconds_between_never_negative() {
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::milliseconds(1500);
        assert!((seconds_between(t0, t1) - 1.5).abs() < 1e-9);
        assert!(seconds_between(t1, t0).abs() < f64::EPSILON);
    }
}
