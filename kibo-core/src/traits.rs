//! Personality trait profile.
//!
//! Four static scalars, each in [0, 1], that scale how strongly stimuli move
//! the emotion state. Loaded once at startup and shared read-only.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Static personality scalars. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTraits")]
pub struct TraitProfile {
    energy: f32,
    sociability: f32,
    curiosity: f32,
    affection: f32,
}

impl TraitProfile {
    /// Build a validated profile.
    ///
    /// # Errors
    /// Returns [`ConfigError::TraitOutOfRange`] if any scalar is outside
    /// [0, 1] or not finite.
    pub fn new(
        energy: f32,
        sociability: f32,
        curiosity: f32,
        affection: f32,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            energy: check("energy", energy)?,
            sociability: check("sociability", sociability)?,
            curiosity: check("curiosity", curiosity)?,
            affection: check("affection", affection)?,
        })
    }

    /// How lively the robot is (0 = lethargic, 1 = hyperactive).
    #[must_use]
    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// How much it seeks and enjoys company (0 = aloof, 1 = gregarious).
    #[must_use]
    pub fn sociability(&self) -> f32 {
        self.sociability
    }

    /// How drawn it is to novelty (0 = indifferent, 1 = nosy).
    #[must_use]
    pub fn curiosity(&self) -> f32 {
        self.curiosity
    }

    /// How strongly it responds to physical affection (0 = cool, 1 = cuddly).
    #[must_use]
    pub fn affection(&self) -> f32 {
        self.affection
    }
}

impl Default for TraitProfile {
    fn default() -> Self {
        Self {
            energy: 0.7,
            sociability: 0.8,
            curiosity: 0.7,
            affection: 0.9,
        }
    }
}

fn check(name: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::TraitOutOfRange { name, value })
    }
}

/// Unvalidated wire form; every deserialized profile passes through
/// [`TraitProfile::new`].
#[derive(Deserialize)]
struct RawTraits {
    energy: f32,
    sociability: f32,
    curiosity: f32,
    affection: f32,
}

impl TryFrom<RawTraits> for TraitProfile {
    type Error = ConfigError;

    fn try_from(raw: RawTraits) -> Result<Self, Self::Error> {
        Self::new(raw.energy, raw.sociability, raw.curiosity, raw.affection)
    }
}
