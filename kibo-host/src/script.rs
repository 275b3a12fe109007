//! Scripted sessions.
//!
//! A script is a TOML list of timed sensor and conversation events. Replaying
//! it against an engine on a [`ManualClock`] reproduces a session exactly,
//! which is how behaviour changes are reviewed without hardware.
//!
//! ```toml
//! start = "2026-05-04T08:00:00Z"
//!
//! [[step]]
//! at_secs = 0.0
//! action = "press"
//! location = "head"
//!
//! [[step]]
//! at_secs = 2.5
//! action = "release"
//! location = "head"
//!
//! [[step]]
//! at_secs = 60.0
//! action = "tick"
//! ```

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use kibo_core::clock::offset_by_secs;
use kibo_core::metrics::CounterSnapshot;
use kibo_core::{
    Clock, EmotionEngine, EmotionSnapshot, ManualClock, Stimulus, StimulusEvent, Timestamp,
    TouchLocation,
};
use serde::Deserialize;
use tracing::info;

use crate::config::KiboConfig;
use crate::conversation::{LlmReply, apply_reply};
use crate::error::{HostError, Result};
use crate::hooks::{MotionAdapter, ProximityAdapter, TouchTracker, on_face_result};

/// A parsed session script.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Wall-clock time of `at_secs = 0`.
    #[serde(default = "default_start")]
    pub start: Timestamp,
    /// Steps in the order they are replayed.
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// One timed event.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Seconds after the script start.
    pub at_secs: f64,
    /// What happens.
    #[serde(flatten)]
    pub action: Action,
}

/// Events a script can replay.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// A touch pad closes.
    Press {
        /// Which pad.
        location: TouchLocation,
    },
    /// A touch pad opens.
    Release {
        /// Which pad.
        location: TouchLocation,
    },
    /// Someone speaks to the robot.
    Voice,
    /// Face recognition result; `user` absent for a stranger.
    Face {
        /// Matched user name.
        #[serde(default)]
        user: Option<String>,
    },
    /// An ultrasonic reading.
    Proximity {
        /// Measured distance.
        distance_cm: f64,
    },
    /// A PIR motion sensor level.
    Motion {
        /// Whether motion is currently detected.
        detected: bool,
    },
    /// A model reply with `[emotion]` tags.
    Reply {
        /// Raw reply text.
        text: String,
    },
    /// The scheduler ticks.
    Tick,
    /// Return to baseline.
    Reset,
}

/// The engine state after one replayed step.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StepOutcome {
    /// Seconds after the script start.
    pub at_secs: f64,
    /// Wall-clock time of the step.
    pub at: Timestamp,
    /// State right after the step.
    pub snapshot: EmotionSnapshot,
}

/// Result of replaying a whole script.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Replay {
    /// One outcome per step, in order.
    pub steps: Vec<StepOutcome>,
    /// Engine counters once the last step has run.
    pub counters: CounterSnapshot,
}

impl Script {
    /// Parse a script from TOML.
    ///
    /// # Errors
    /// Returns [`HostError::Toml`] if the script is malformed, or
    /// [`HostError::Script`] if a step time is negative, not finite, or lands
    /// outside the representable calendar.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let script: Self = toml::from_str(toml_str)?;
        for (index, step) in script.steps.iter().enumerate() {
            if !(step.at_secs.is_finite() && step.at_secs >= 0.0) {
                return Err(HostError::Script(format!(
                    "step {index}: at_secs must be a non-negative number, got {}",
                    step.at_secs
                )));
            }
            script.time_of(step.at_secs)?;
        }
        Ok(script)
    }

    /// Parse a script file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Replay every step against a fresh engine built from `config`.
    ///
    /// Steps are replayed in file order; a step whose time lies before the
    /// previous one is replayed at the previous time.
    ///
    /// # Errors
    /// Returns the first rejected input, an invalid engine config, or
    /// [`HostError::Script`] for a step time out of range.
    pub fn replay(&self, config: &KiboConfig) -> Result<Replay> {
        let clock = Arc::new(ManualClock::new(self.start));
        let engine = Arc::new(EmotionEngine::with_clock(
            config.engine.clone(),
            Arc::new(config.traits),
            clock.clone(),
        )?);
        let touch = TouchTracker::new(Arc::clone(&engine), &config.sensors);
        let proximity = ProximityAdapter::new(Arc::clone(&engine), &config.sensors);
        let motion = MotionAdapter::new(Arc::clone(&engine));

        let mut outcomes = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let at = self.time_of(step.at_secs)?.max(clock.now());
            clock.set(at);

            match &step.action {
                Action::Press { location } => touch.press(*location, at),
                Action::Release { location } => {
                    touch.release(*location, at)?;
                }
                Action::Voice => engine.apply(StimulusEvent::new(Stimulus::Voice, at))?,
                Action::Face { user } => on_face_result(&engine, user.as_deref(), at),
                Action::Proximity { distance_cm } => {
                    proximity.on_reading(*distance_cm, at)?;
                }
                Action::Motion { detected } => {
                    motion.on_motion(*detected, at)?;
                }
                Action::Reply { text } => {
                    apply_reply(&engine, &LlmReply::parse(text), &config.conversation)?;
                }
                Action::Tick => engine.on_tick(at),
                Action::Reset => engine.reset(),
            }

            outcomes.push(StepOutcome {
                at_secs: step.at_secs,
                at,
                snapshot: engine.snapshot(),
            });
        }

        let counters = engine.counters();
        info!(steps = outcomes.len(), ?counters, "Script replayed");
        Ok(Replay {
            steps: outcomes,
            counters,
        })
    }

    fn time_of(&self, at_secs: f64) -> Result<Timestamp> {
        offset_by_secs(self.start, at_secs.max(0.0)).ok_or_else(|| {
            HostError::Script(format!("at_secs = {at_secs} is past the end of the calendar"))
        })
    }
}

fn default_start() -> Timestamp {
    DateTime::<Utc>::default() + Duration::hours(12)
}
