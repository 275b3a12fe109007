//! Configuration for a KIBO robot process.
//!
//! Maps directly to `kibo.toml`. Every section is optional; a missing
//! section falls back to its defaults.
//!
//! ```toml
//! [general]
//! log_level = "debug"
//! tick_interval_ms = 500
//!
//! [traits]
//! energy = 0.6
//! sociability = 0.9
//! curiosity = 0.7
//! affection = 0.95
//!
//! [engine.awake_window]
//! start_hour = 8
//! end_hour = 21
//!
//! [engine.decay.happy]
//! baseline = 0.15
//! half_life_secs = 240.0
//! ```

use std::path::Path;
use std::sync::Arc;

use kibo_core::{EmotionEngine, EngineConfig, TraitProfile};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level process configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KiboConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// The robot's personality.
    #[serde(default)]
    pub traits: TraitProfile,
    /// Emotion engine tuning.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Sensor adapter settings.
    #[serde(default)]
    pub sensors: SensorConfig,
    /// Conversation glue settings.
    #[serde(default)]
    pub conversation: ConversationConfig,
}

impl KiboConfig {
    /// Load configuration from a TOML string.
    ///
    /// Decay entries given in the file replace the defaults for those
    /// dimensions only; the rest keep their default baseline and time constant.
    ///
    /// # Errors
    /// Returns [`crate::HostError::Toml`] if the TOML is invalid, or
    /// [`crate::HostError::Config`] if it describes an invalid engine.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(toml_str)?;
        let mut decay = kibo_core::config::default_decay_table();
        decay.append(&mut config.engine.decay);
        config.engine.decay = decay;
        config.engine.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Build the engine this configuration describes.
    ///
    /// # Errors
    /// Returns [`crate::HostError::Config`] if the engine config is invalid.
    pub fn build_engine(&self) -> Result<EmotionEngine> {
        Ok(EmotionEngine::new(
            self.engine.clone(),
            Arc::new(self.traits),
        )?)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log filter used when `RUST_LOG` is unset: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// How often the ticker advances the engine, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Sensor adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// A touch held at least this long is reported as a long press.
    #[serde(default = "default_long_press_secs")]
    pub long_press_secs: f64,
    /// Proximity readings that move less than this since the last forwarded
    /// reading are dropped.
    #[serde(default = "default_proximity_deadband_cm")]
    pub proximity_deadband_cm: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            long_press_secs: default_long_press_secs(),
            proximity_deadband_cm: default_proximity_deadband_cm(),
        }
    }
}

/// Conversation glue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Intensity given to a single `[emotion]` tag in a reply.
    #[serde(default = "default_tag_intensity")]
    pub tag_intensity: f32,
    /// Personality prompt; `{emotion}` and `{energy}` are filled from the engine.
    #[serde(default = "default_personality_prompt")]
    pub personality_prompt: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            tag_intensity: default_tag_intensity(),
            personality_prompt: default_personality_prompt(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_log_level() -> String {
    "info".into()
}
fn default_tick_interval_ms() -> u64 {
    1_000
}
fn default_long_press_secs() -> f64 {
    2.0
}
fn default_proximity_deadband_cm() -> f64 {
    5.0
}
fn default_tag_intensity() -> f32 {
    0.8
}
fn default_personality_prompt() -> String {
    "You are KIBO, a small companion robot. Current emotion: {emotion}. Energy: {energy}.".into()
}
