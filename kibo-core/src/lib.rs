//! # KIBO Core Library
//!
//! The emotion core of a personality-driven companion robot.
//!
//! Sensors, vision, audio and the conversation pipeline report discrete
//! stimuli into a single [`EmotionEngine`]. The engine folds them into a
//! continuous 12-dimensional intensity model and exposes the dominant
//! emotion to the display renderer, the TTS modulator and the conversation
//! manager, which poll it.
//!
//! - **State** — per-dimension intensities in [0, 1] ([`EmotionState`])
//! - **Traits** — static personality scalars ([`TraitProfile`])
//! - **Scoring** — stimulus → delta rules ([`EmotionScorer`])
//! - **Decay** — exponential relaxation toward per-dimension baselines
//! - **Engine** — thread-safe mutation and snapshot API ([`EmotionEngine`])
//!
//! ## Performance Contract
//!
//! No operation performs I/O. Every mutation is a constant amount of
//! arithmetic over 12 dimensions under one write lock, so it is safe to call
//! from latency-sensitive producer threads such as a touch interrupt handler.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod config;
pub mod decay;
pub mod engine;
pub mod error;
pub mod expression;
pub mod metrics;
pub mod scorer;
pub mod state;
pub mod stimulus;
pub mod traits;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use engine::{EmotionEngine, EmotionReading, EmotionSnapshot};
pub use error::{ConfigError, KiboError, Result, ValidationError};
pub use scorer::{EmotionDelta, EmotionScorer};
pub use state::EmotionState;
pub use stimulus::{Stimulus, StimulusEvent, StimulusKind, TouchLocation};
pub use traits::TraitProfile;
pub use types::{DimensionMap, EmotionDimension, Timestamp};
