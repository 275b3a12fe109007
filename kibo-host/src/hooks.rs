//! Sensor adapters.
//!
//! These sit between raw sensor polling loops and the engine. Each adapter
//! turns edge-level readings (pad pressed, pad released, echo distance, PIR
//! motion) into the typed stimuli the engine expects. Polling loops run on
//! their own threads and share the engine through an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use kibo_core::stimulus::{Stimulus, StimulusEvent};
use kibo_core::types::seconds_between;
use kibo_core::{EmotionEngine, Timestamp, TouchLocation, ValidationError};
use parking_lot::Mutex;
use tracing::debug;

use crate::config::SensorConfig;

// ---------------------------------------------------------------------------
// Touch
// ---------------------------------------------------------------------------

/// How a completed touch is classified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchGesture {
    /// Released before the long-press threshold.
    Tap {
        /// How long the pad was held.
        duration_secs: f64,
    },
    /// Held at least the long-press threshold.
    LongPress {
        /// How long the pad was held.
        duration_secs: f64,
    },
}

impl TouchGesture {
    /// How long the pad was held.
    #[must_use]
    pub fn duration_secs(self) -> f64 {
        match self {
            Self::Tap { duration_secs } | Self::LongPress { duration_secs } => duration_secs,
        }
    }
}

/// Tracks press/release edges per touch pad and reports each completed touch
/// to the engine with its measured duration.
pub struct TouchTracker {
    engine: Arc<EmotionEngine>,
    pressed_at: Mutex<HashMap<TouchLocation, Timestamp>>,
    long_press_secs: f64,
}

impl TouchTracker {
    /// Create a tracker feeding `engine`.
    #[must_use]
    pub fn new(engine: Arc<EmotionEngine>, config: &SensorConfig) -> Self {
        Self {
            engine,
            pressed_at: Mutex::new(HashMap::new()),
            long_press_secs: config.long_press_secs,
        }
    }

    /// A pad went from open to closed at `at`. Repeated presses without a
    /// release keep the first press time.
    pub fn press(&self, location: TouchLocation, at: Timestamp) {
        self.pressed_at.lock().entry(location).or_insert(at);
        debug!(%location, "Touch pressed");
    }

    /// A pad went from closed to open at `at`.
    ///
    /// Returns `Ok(None)` for a release with no matching press.
    ///
    /// # Errors
    /// Propagates the engine's [`ValidationError`] for a malformed duration.
    pub fn release(
        &self,
        location: TouchLocation,
        at: Timestamp,
    ) -> Result<Option<TouchGesture>, ValidationError> {
        let Some(pressed) = self.pressed_at.lock().remove(&location) else {
            debug!(%location, "Release without press ignored");
            return Ok(None);
        };
        let duration_secs = seconds_between(pressed, at);
        self.engine.apply(StimulusEvent::new(
            Stimulus::Touch {
                location,
                duration_secs,
            },
            at,
        ))?;

        let gesture = if duration_secs >= self.long_press_secs {
            TouchGesture::LongPress { duration_secs }
        } else {
            TouchGesture::Tap { duration_secs }
        };
        debug!(%location, ?gesture, "Touch released");
        Ok(Some(gesture))
    }

    /// Feed a raw pin level: `true` = touched.
    ///
    /// # Errors
    /// See [`Self::release`].
    pub fn on_level(
        &self,
        location: TouchLocation,
        touched: bool,
        at: Timestamp,
    ) -> Result<Option<TouchGesture>, ValidationError> {
        if touched {
            self.press(location, at);
            Ok(None)
        } else {
            self.release(location, at)
        }
    }

    /// Whether `location` is currently held.
    #[must_use]
    pub fn is_touched(&self, location: TouchLocation) -> bool {
        self.pressed_at.lock().contains_key(&location)
    }
}

// ---------------------------------------------------------------------------
// Proximity
// ---------------------------------------------------------------------------

/// Forwards ultrasonic readings to the engine, clamped to the sensor range
/// and with jitter below a deadband dropped.
pub struct ProximityAdapter {
    engine: Arc<EmotionEngine>,
    deadband_cm: f64,
    last_forwarded: Mutex<Option<f64>>,
}

impl ProximityAdapter {
    /// Create an adapter feeding `engine`.
    #[must_use]
    pub fn new(engine: Arc<EmotionEngine>, config: &SensorConfig) -> Self {
        Self {
            engine,
            deadband_cm: config.proximity_deadband_cm,
            last_forwarded: Mutex::new(None),
        }
    }

    /// Handle one echo measurement taken at `at`.
    ///
    /// Readings beyond the sensor's maximum are clamped to it, the way the
    /// ultrasonic driver reports "nothing in range". Returns whether the
    /// reading reached the engine.
    ///
    /// # Errors
    /// Returns the engine's [`ValidationError`] for negative or non-finite readings.
    pub fn on_reading(&self, distance_cm: f64, at: Timestamp) -> Result<bool, ValidationError> {
        let max_cm = self.engine.scorer().weights().max_distance_cm;
        let distance_cm = if distance_cm.is_finite() {
            distance_cm.min(max_cm)
        } else {
            distance_cm
        };

        let mut last = self.last_forwarded.lock();
        if last.is_some_and(|prev| (prev - distance_cm).abs() < self.deadband_cm) {
            return Ok(false);
        }
        self.engine.apply(StimulusEvent::new(
            Stimulus::Proximity { distance_cm },
            at,
        ))?;
        *last = Some(distance_cm);
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

/// Forwards PIR motion edges to the engine.
///
/// A PIR sensor reports presence, not range. A rising edge is sent as a
/// proximity reading halfway between the startle and near thresholds: close
/// enough to draw interest, not close enough to startle. Held or falling
/// levels are ignored.
pub struct MotionAdapter {
    engine: Arc<EmotionEngine>,
    detected: Mutex<bool>,
}

impl MotionAdapter {
    /// Create an adapter feeding `engine`.
    #[must_use]
    pub fn new(engine: Arc<EmotionEngine>) -> Self {
        Self {
            engine,
            detected: Mutex::new(false),
        }
    }

    /// Distance reported for a motion edge.
    #[must_use]
    pub fn presence_distance_cm(&self) -> f64 {
        let weights = self.engine.scorer().weights();
        (weights.startle_distance_cm + weights.near_distance_cm) / 2.0
    }

    /// Feed the sensor level sampled at `at`. Returns whether a stimulus
    /// reached the engine.
    ///
    /// # Errors
    /// Returns the engine's [`ValidationError`] if the derived reading is rejected.
    pub fn on_motion(&self, detected: bool, at: Timestamp) -> Result<bool, ValidationError> {
        let mut level = self.detected.lock();
        let rising = detected && !*level;
        *level = detected;
        if !rising {
            return Ok(false);
        }
        let distance_cm = self.presence_distance_cm();
        self.engine.apply(StimulusEvent::new(
            Stimulus::Proximity { distance_cm },
            at,
        ))?;
        debug!(distance_cm, "Motion detected");
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Vision
// ---------------------------------------------------------------------------

/// Report a face-recognition result. `user` is the matched user's name, if any.
pub fn on_face_result(engine: &EmotionEngine, user: Option<&str>, at: Timestamp) {
    let known = user.is_some();
    if let Err(err) = engine.apply(StimulusEvent::new(Stimulus::FaceRecognized { known }, at)) {
        // Face results carry no payload that can fail validation.
        debug!(error = %err, "Face result rejected");
    }
    debug!(user = user.unwrap_or("unknown"), known, "Face result reported");
}
