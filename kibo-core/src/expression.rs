//! Lookup tables and controllers for the emotion consumers.
//!
//! The TTS modulator and the display renderer both poll
//! [`crate::EmotionEngine::get_emotion`] and translate the reading into
//! output. The translation itself is pure and lives here.

use serde::{Deserialize, Serialize};

use crate::types::EmotionDimension;

// ---------------------------------------------------------------------------
// Voice
// ---------------------------------------------------------------------------

/// Multipliers applied to the TTS voice's base rate, pitch and volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceModulation {
    /// Speaking rate multiplier.
    pub rate_mult: f32,
    /// Pitch multiplier.
    pub pitch_mult: f32,
    /// Volume multiplier.
    pub volume_mult: f32,
}

impl VoiceModulation {
    /// Unmodulated voice.
    pub const NEUTRAL: Self = Self::new(1.0, 1.0, 1.0);

    const fn new(rate_mult: f32, pitch_mult: f32, volume_mult: f32) -> Self {
        Self {
            rate_mult,
            pitch_mult,
            volume_mult,
        }
    }

    /// Full-strength modulation for `emotion`.
    #[must_use]
    pub const fn for_emotion(emotion: EmotionDimension) -> Self {
        use EmotionDimension as E;
        match emotion {
            E::Angry => Self::new(1.2, 0.9, 1.0),
            E::Bored => Self::new(0.8, 0.85, 0.9),
            E::Curious => Self::new(1.05, 1.15, 1.0),
            E::Excited => Self::new(1.3, 1.4, 1.1),
            E::Happy => Self::new(1.1, 1.2, 1.0),
            E::Lonely => Self::new(0.85, 0.9, 0.85),
            E::Loving => Self::new(0.9, 1.1, 0.95),
            E::Playful => Self::new(1.15, 1.25, 1.05),
            E::Sad => Self::new(0.8, 0.8, 0.9),
            E::Scared => Self::new(1.1, 1.3, 0.9),
            E::Sleepy => Self::new(0.7, 0.7, 0.8),
            E::Surprised => Self::new(1.25, 1.35, 1.05),
        }
    }

    /// Blend from neutral toward this modulation by `intensity` in [0, 1].
    #[must_use]
    pub fn scaled(self, intensity: f32) -> Self {
        let t = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let lerp = |m: f32| 1.0 + (m - 1.0) * t;
        Self::new(
            lerp(self.rate_mult),
            lerp(self.pitch_mult),
            lerp(self.volume_mult),
        )
    }
}

impl Default for VoiceModulation {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

// ---------------------------------------------------------------------------
// Display cross-fade
// ---------------------------------------------------------------------------

/// Shortest cross-fade the display will run, in seconds.
pub const MIN_TRANSITION_SECS: f32 = 0.1;

/// Cross-fade used when the caller does not pick one.
pub const DEFAULT_TRANSITION_SECS: f32 = 0.5;

/// Linear cross-fade between two emotion faces.
///
/// The renderer calls [`update`](Self::update) once per frame and draws the
/// two faces blended by the returned alpha.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionTransition {
    from: EmotionDimension,
    to: EmotionDimension,
    duration_secs: f32,
    elapsed_secs: f32,
    active: bool,
}

impl Default for EmotionTransition {
    fn default() -> Self {
        Self::new(EmotionDimension::Happy)
    }
}

impl EmotionTransition {
    /// A controller at rest on `initial`.
    #[must_use]
    pub fn new(initial: EmotionDimension) -> Self {
        Self {
            from: initial,
            to: initial,
            duration_secs: DEFAULT_TRANSITION_SECS,
            elapsed_secs: 0.0,
            active: false,
        }
    }

    /// Begin fading from `from` to `to` over `duration_secs`.
    ///
    /// Durations shorter than [`MIN_TRANSITION_SECS`] (or non-finite) are
    /// raised to it.
    pub fn start(&mut self, from: EmotionDimension, to: EmotionDimension, duration_secs: f32) {
        self.from = from;
        self.to = to;
        self.duration_secs = if duration_secs.is_finite() {
            duration_secs.max(MIN_TRANSITION_SECS)
        } else {
            MIN_TRANSITION_SECS
        };
        self.elapsed_secs = 0.0;
        self.active = true;
    }

    /// Advance by `dt_secs` and return `(from, to, alpha)`.
    ///
    /// Once alpha reaches 1 the fade completes and both ends become `to`.
    pub fn update(&mut self, dt_secs: f32) -> (EmotionDimension, EmotionDimension, f32) {
        if !self.active {
            return (self.to, self.to, 1.0);
        }
        if dt_secs.is_finite() && dt_secs > 0.0 {
            self.elapsed_secs += dt_secs;
        }
        let alpha = self.progress();
        if alpha >= 1.0 {
            self.finish();
            return (self.to, self.to, 1.0);
        }
        (self.from, self.to, alpha)
    }

    /// Jump straight to the target face.
    pub fn skip_to_end(&mut self) {
        if self.active {
            self.finish();
        }
    }

    /// The face that dominates the blend right now.
    #[must_use]
    pub fn current_emotion(&self) -> EmotionDimension {
        if self.active && self.progress() < 0.5 {
            self.from
        } else {
            self.to
        }
    }

    /// Whether a fade is running.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.active
    }

    /// Fade progress in [0, 1]; 1 when idle.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.active {
            (self.elapsed_secs / self.duration_secs).min(1.0)
        } else {
            1.0
        }
    }

    fn finish(&mut self) {
        self.from = self.to;
        self.elapsed_secs = self.duration_secs;
        self.active = false;
    }
}
