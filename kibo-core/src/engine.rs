//! The emotion engine.
//!
//! [`EmotionEngine`] owns the one [`EmotionState`] of the robot and is the
//! only thing that mutates it. Producers on any thread call the `on_*`
//! methods; consumers poll [`EmotionEngine::get_emotion`].
//!
//! ## Concurrency
//!
//! All mutable state sits behind a single `parking_lot::RwLock`. Every
//! mutation validates its payload first, then takes the write lock, scores,
//! applies the whole delta and releases. Readers take the read lock and copy
//! the (small, `Copy`) intensity array out, so they see either the state
//! before a mutation or after it, never a mix. Nothing under the lock blocks
//! on I/O.
//!
//! ## Time
//!
//! The engine owns no timer. An external scheduler calls
//! [`EmotionEngine::on_tick`] with the current wall-clock time at whatever
//! cadence it likes; decay and accrual use the measured delta since the
//! previous tick.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{BlendConfig, EnergyConfig, EngineConfig};
use crate::decay;
use crate::error::{ConfigError, KiboError, ValidationError};
use crate::metrics::{CounterSnapshot, EngineCounters};
use crate::scorer::EmotionScorer;
use crate::state::EmotionState;
use crate::stimulus::{Stimulus, StimulusEvent, TouchLocation};
use crate::traits::TraitProfile;
use crate::types::{DimensionMap, EmotionDimension, Timestamp, seconds_between};

/// The dominant emotion at the moment of reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmotionReading {
    /// Strongest dimension.
    pub label: EmotionDimension,
    /// Its intensity.
    pub intensity: f32,
}

impl fmt::Display for EmotionReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2})", self.label, self.intensity)
    }
}

/// Everything a consumer might want in one consistent read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionSnapshot {
    /// Strongest dimension.
    pub label: EmotionDimension,
    /// Its intensity.
    pub intensity: f32,
    /// Current energy level.
    pub energy: f32,
    /// Every dimension's intensity.
    pub intensities: DimensionMap<f32>,
}

impl EmotionSnapshot {
    /// The dominant emotion as a reading.
    #[must_use]
    pub fn reading(&self) -> EmotionReading {
        EmotionReading {
            label: self.label,
            intensity: self.intensity,
        }
    }

    /// Serialize for telemetry.
    ///
    /// # Errors
    /// Returns [`KiboError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> crate::error::Result<String> {
        serde_json::to_string(self).map_err(|e| KiboError::Serialization(e.to_string()))
    }
}

/// Mutable engine state, guarded as one unit.
#[derive(Debug)]
struct EngineState {
    emotion: EmotionState,
    last_tick: Timestamp,
    last_interaction: Timestamp,
    energy: f32,
}

/// Thread-safe owner of the robot's emotion state.
pub struct EmotionEngine {
    state: RwLock<EngineState>,
    traits: Arc<TraitProfile>,
    scorer: EmotionScorer,
    baselines: DimensionMap<f32>,
    half_lives: DimensionMap<f64>,
    decay_grace_secs: f64,
    energy: EnergyConfig,
    blend: BlendConfig,
    clock: Arc<dyn Clock>,
    counters: EngineCounters,
}

impl fmt::Debug for EmotionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmotionEngine")
            .field("traits", &self.traits)
            .field("emotion", &self.get_emotion())
            .finish_non_exhaustive()
    }
}

impl EmotionEngine {
    /// Create an engine on the system clock.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if `config` is invalid.
    pub fn new(config: EngineConfig, traits: Arc<TraitProfile>) -> Result<Self, ConfigError> {
        Self::with_clock(config, traits, Arc::new(SystemClock))
    }

    /// Create an engine that stamps stimuli with `clock`.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if `config` is invalid.
    pub fn with_clock(
        config: EngineConfig,
        traits: Arc<TraitProfile>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (baselines, half_lives) = config.decay_tables()?;
        let now = clock.now();

        let engine = Self {
            state: RwLock::new(EngineState {
                emotion: EmotionState::at_baseline(&baselines),
                last_tick: now,
                last_interaction: now,
                energy: traits.energy(),
            }),
            scorer: EmotionScorer::new(config.scoring, config.awake_window),
            baselines,
            half_lives,
            decay_grace_secs: config.decay_grace_secs,
            energy: config.energy,
            blend: config.blend,
            traits,
            clock,
            counters: EngineCounters::new(),
        };

        info!(
            traits = ?engine.traits,
            emotion = %engine.get_emotion(),
            "Emotion engine initialized"
        );
        Ok(engine)
    }

    // -----------------------------------------------------------------------
    // Stimuli
    // -----------------------------------------------------------------------

    /// A touch pad was held for `duration_secs`.
    ///
    /// # Errors
    /// Rejects a negative or non-finite duration; state is unchanged.
    pub fn on_touch(
        &self,
        location: TouchLocation,
        duration_secs: f64,
    ) -> Result<(), ValidationError> {
        self.apply(self.stamp(Stimulus::Touch {
            location,
            duration_secs,
        }))
    }

    /// Someone talked with the robot.
    pub fn on_voice_interaction(&self) {
        self.commit(self.stamp(Stimulus::Voice));
    }

    /// Face recognition finished; `known` if it matched a user.
    pub fn on_face_recognized(&self, known: bool) {
        self.commit(self.stamp(Stimulus::FaceRecognized { known }));
    }

    /// The proximity sensor reported an object at `distance_cm`.
    ///
    /// # Errors
    /// Rejects a distance outside the sensor's range; state is unchanged.
    pub fn on_proximity(&self, distance_cm: f64) -> Result<(), ValidationError> {
        self.apply(self.stamp(Stimulus::Proximity { distance_cm }))
    }

    /// Validate, score and commit a stimulus stamped by the caller.
    ///
    /// # Errors
    /// Returns the [`ValidationError`] for a malformed payload; state is unchanged.
    pub fn apply(&self, event: StimulusEvent) -> Result<(), ValidationError> {
        if let Err(err) = event.stimulus.validate(self.scorer.weights()) {
            self.reject(&err);
            return Err(err);
        }
        self.commit(event);
        Ok(())
    }

    /// Advance time to `now`: decay toward baseline, accrue loneliness,
    /// apply circadian pressure and update the energy level.
    ///
    /// A `now` earlier than the previous tick decays nothing and does not
    /// move the tick reference backwards.
    pub fn on_tick(&self, now: Timestamp) {
        let mut guard = self.state.write();
        let state = &mut *guard;

        if now < state.last_tick {
            debug!(%now, last_tick = %state.last_tick, "Clock moved backwards; nothing to decay");
        }
        let dt = seconds_between(state.last_tick, now);

        for dim in EmotionDimension::ALL {
            let recently_stimulated = state
                .emotion
                .last_updated(dim)
                .is_some_and(|at| seconds_between(at, now) < self.decay_grace_secs);
            if recently_stimulated {
                continue;
            }
            let relaxed = decay::relax_toward(
                state.emotion.get(dim),
                self.baselines[dim],
                dt,
                self.half_lives[dim],
            );
            state.emotion.settle(dim, relaxed);
        }

        let hour = self.scorer.awake_window().local_hour(now);
        let idle_secs = seconds_between(state.last_interaction, now);
        let mut delta = self.scorer.score(
            &StimulusEvent::new(Stimulus::IdleTick { idle_secs, dt_secs: dt }, now),
            &self.traits,
            &state.emotion,
        );
        delta.merge(&self.scorer.score(
            &StimulusEvent::new(Stimulus::TimeOfDay { hour, dt_secs: dt }, now),
            &self.traits,
            &state.emotion,
        ));
        for (dim, amount) in delta.nonzero() {
            let next = state.emotion.get(dim) + amount;
            state.emotion.settle(dim, next);
        }

        state.energy = self.next_energy(state.energy, self.scorer.awake_window().contains(hour), dt);
        if now > state.last_tick {
            state.last_tick = now;
        }

        self.verify(&state.emotion);
        self.counters.ticks.fetch_add(1, Ordering::Relaxed);
        debug!(dt, idle_secs, hour, energy = state.energy, "Tick applied");
    }

    // -----------------------------------------------------------------------
    // Conversation-chosen emotions
    // -----------------------------------------------------------------------

    /// The conversation model chose `dimension` at `intensity`. Sets it
    /// outright and damps every other dimension.
    ///
    /// # Errors
    /// Rejects an intensity outside [0, 1]; state is unchanged.
    pub fn on_llm_emotion(
        &self,
        dimension: EmotionDimension,
        intensity: f32,
    ) -> Result<(), ValidationError> {
        if !(intensity.is_finite() && (0.0..=1.0).contains(&intensity)) {
            let err = ValidationError::IntensityOutOfRange(intensity);
            self.reject(&err);
            return Err(err);
        }

        let now = self.clock.now();
        {
            let mut guard = self.state.write();
            let state = &mut *guard;
            for dim in EmotionDimension::ALL {
                if dim == dimension {
                    state.emotion.set(dim, intensity, now);
                } else {
                    let damped = state.emotion.get(dim) * self.blend.override_suppression;
                    state.emotion.set(dim, damped, now);
                }
            }
            state.last_interaction = state.last_interaction.max(now);
            self.verify(&state.emotion);
        }

        self.counters
            .conversation_overrides
            .fetch_add(1, Ordering::Relaxed);
        info!(emotion = %dimension, intensity, "Emotion set by conversation");
        Ok(())
    }

    /// The conversation model produced a response carrying several emotions
    /// in order. Later entries end up stronger, the last one strongest.
    ///
    /// # Errors
    /// Rejects an empty sequence; state is unchanged.
    pub fn on_emotion_sequence(&self, sequence: &[EmotionDimension]) -> Result<(), ValidationError> {
        if sequence.is_empty() {
            let err = ValidationError::EmptySequence;
            self.reject(&err);
            return Err(err);
        }

        let blend = &self.blend;
        let now = self.clock.now();
        {
            let mut guard = self.state.write();
            let state = &mut *guard;
            for dim in EmotionDimension::ALL {
                let damped = state.emotion.get(dim) * blend.sequence_suppression;
                state.emotion.set(dim, damped, now);
            }

            let steps = sequence.len() - 1;
            for (i, &dim) in sequence.iter().enumerate() {
                let target = if steps == 0 {
                    blend.sequence_peak
                } else {
                    #[allow(clippy::cast_precision_loss)]
                    let position = i as f32 / steps as f32;
                    blend.sequence_floor + (blend.sequence_peak - blend.sequence_floor) * position
                };
                let current = state.emotion.get(dim);
                state.emotion.set(dim, current.max(target), now);
            }
            state.last_interaction = state.last_interaction.max(now);
            self.verify(&state.emotion);
        }

        self.counters
            .conversation_overrides
            .fetch_add(1, Ordering::Relaxed);
        info!(
            sequence = ?sequence,
            emotion = %self.get_emotion(),
            "Processed emotion sequence"
        );
        Ok(())
    }

    /// Return every dimension to baseline and energy to the trait level.
    pub fn reset(&self) {
        let now = self.clock.now();
        let mut guard = self.state.write();
        guard.emotion = EmotionState::at_baseline(&self.baselines);
        guard.energy = self.traits.energy();
        guard.last_interaction = now;
        if now > guard.last_tick {
            guard.last_tick = now;
        }
        info!("Emotion state reset to baseline");
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The dominant emotion.
    #[must_use]
    pub fn get_emotion(&self) -> EmotionReading {
        let (label, intensity) = self.state.read().emotion.dominant();
        EmotionReading { label, intensity }
    }

    /// Every dimension's intensity.
    #[must_use]
    pub fn get_all_intensities(&self) -> DimensionMap<f32> {
        self.state.read().emotion.intensities()
    }

    /// Dominant emotion, energy and all intensities from one read.
    #[must_use]
    pub fn snapshot(&self) -> EmotionSnapshot {
        let guard = self.state.read();
        let (label, intensity) = guard.emotion.dominant();
        EmotionSnapshot {
            label,
            intensity,
            energy: guard.energy,
            intensities: guard.emotion.intensities(),
        }
    }

    /// A copy of the full state, including last-update timestamps.
    #[must_use]
    pub fn state(&self) -> EmotionState {
        self.state.read().emotion.clone()
    }

    /// Current energy level.
    #[must_use]
    pub fn energy_level(&self) -> f32 {
        self.state.read().energy
    }

    /// The configured resting level of every dimension.
    #[must_use]
    pub fn baselines(&self) -> DimensionMap<f32> {
        self.baselines
    }

    /// The personality this engine was built with.
    #[must_use]
    pub fn traits(&self) -> &TraitProfile {
        &self.traits
    }

    /// The scorer, for inspecting weights and the awake window.
    #[must_use]
    pub fn scorer(&self) -> &EmotionScorer {
        &self.scorer
    }

    /// Counter values at this instant.
    #[must_use]
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn stamp(&self, stimulus: Stimulus) -> StimulusEvent {
        StimulusEvent::new(stimulus, self.clock.now())
    }

    /// Score and apply an already-valid stimulus under the write lock.
    fn commit(&self, event: StimulusEvent) {
        let kind = event.stimulus.kind();
        {
            let mut guard = self.state.write();
            let state = &mut *guard;
            let delta = self.scorer.score(&event, &self.traits, &state.emotion);
            for (dim, amount) in delta.nonzero() {
                state.emotion.adjust(dim, amount, event.timestamp);
            }
            if event.stimulus.is_positive_interaction() {
                state.last_interaction = state.last_interaction.max(event.timestamp);
            }
            self.verify(&state.emotion);
        }
        self.counters.record(kind);
        debug!(?kind, emotion = %self.get_emotion(), "Stimulus applied");
    }

    fn reject(&self, err: &ValidationError) {
        self.counters.rejected.fetch_add(1, Ordering::Relaxed);
        warn!(error = %err, "Rejected stimulus");
    }

    fn verify(&self, emotion: &EmotionState) {
        if let Err(err) = emotion.check_invariants() {
            self.counters
                .invariant_violations
                .fetch_add(1, Ordering::Relaxed);
            error!(error = %err, "Emotion state invariant violated");
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn next_energy(&self, energy: f32, awake: bool, dt_secs: f64) -> f32 {
        let dt = dt_secs as f32;
        if awake {
            if energy > self.energy.floor {
                (energy - self.energy.drain_rate * dt).max(self.energy.floor)
            } else {
                energy
            }
        } else {
            let rested = self.traits.energy();
            if energy < rested {
                (energy + self.energy.recharge_rate * dt).min(rested)
            } else {
                energy
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::AwakeWindow;

    fn noon() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).single().expect("valid")
    }

    fn engine_at(start: Timestamp) -> (EmotionEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start));
        let engine = EmotionEngine::with_clock(
            EngineConfig::default(),
            Arc::new(TraitProfile::default()),
            clock.clone(),
        )
        .expect("default config is valid");
        (engine, clock)
    }

    #[test]
    fn fresh_engine_rests_at_baseline() {
        let (engine, _) = engine_at(noon());
        assert_eq!(engine.get_all_intensities(), engine.baselines());
        assert_eq!(engine.get_emotion().label, EmotionDimension::Curious);
        assert!((engine.energy_level() - TraitProfile::default().energy()).abs() < f32::EPSILON);
    }

    #[test]
    fn invalid_config_fails_construction() {
        let mut config = EngineConfig::default();
        config.decay.remove(&EmotionDimension::Bored);
        let result = EmotionEngine::new(config, Arc::new(TraitProfile::default()));
        assert!(matches!(
            result,
            Err(ConfigError::MissingDimension(EmotionDimension::Bored))
        ));
    }

    #[test]
    fn stimulus_stamps_last_updated() {
        let (engine, _) = engine_at(noon());
        engine
            .on_touch(TouchLocation::Head, 2.0)
            .expect("valid touch");
        let state = engine.state();
        assert_eq!(state.last_updated(EmotionDimension::Loving), Some(noon()));
        assert!(state.last_updated(EmotionDimension::Sleepy).is_none());
    }

    #[test]
    fn recently_stimulated_dimension_skips_decay() {
        let (engine, clock) = engine_at(noon());
        engine
            .on_touch(TouchLocation::Head, 3.0)
            .expect("valid touch");
        let loving = engine.get_all_intensities()[EmotionDimension::Loving];

        clock.advance_secs(1.0);
        engine.on_tick(clock.now());
        assert!((engine.get_all_intensities()[EmotionDimension::Loving] - loving).abs() < f32::EPSILON);

        clock.advance_secs(60.0);
        engine.on_tick(clock.now());
        assert!(engine.get_all_intensities()[EmotionDimension::Loving] < loving);
    }

    #[test]
    fn backwards_tick_changes_nothing() {
        let (engine, _) = engine_at(noon());
        engine.on_voice_interaction();
        let before = engine.get_all_intensities();
        engine.on_tick(noon() - Duration::seconds(600));
        assert_eq!(engine.get_all_intensities(), before);
    }

    #[test]
    fn energy_drains_by_day_and_recovers_by_night() {
        let start = Utc.with_ymd_and_hms(2026, 5, 4, 8, 0, 0).single().expect("valid");
        let (engine, clock) = engine_at(start);
        let rested = engine.energy_level();

        clock.advance_secs(3600.0);
        engine.on_tick(clock.now());
        let tired = engine.energy_level();
        assert!(tired < rested);
        assert!(tired >= 0.1);

        clock.set(Utc.with_ymd_and_hms(2026, 5, 4, 23, 0, 0).single().expect("valid"));
        engine.on_tick(clock.now());
        assert!(engine.energy_level() > tired);
        assert!(engine.energy_level() <= rested);
    }

    #[test]
    fn llm_emotion_takes_over() {
        let (engine, _) = engine_at(noon());
        engine
            .on_llm_emotion(EmotionDimension::Playful, 0.8)
            .expect("valid intensity");
        let reading = engine.get_emotion();
        assert_eq!(reading.label, EmotionDimension::Playful);
        assert!((reading.intensity - 0.8).abs() < f32::EPSILON);
        let curious = engine.get_all_intensities()[EmotionDimension::Curious];
        assert!((curious - 0.2 * 0.3).abs() < 1e-6);
    }

    #[test]
    fn llm_emotion_rejects_bad_intensity() {
        let (engine, _) = engine_at(noon());
        let before = engine.get_all_intensities();
        assert_eq!(
            engine.on_llm_emotion(EmotionDimension::Happy, 1.5),
            Err(ValidationError::IntensityOutOfRange(1.5))
        );
        assert_eq!(engine.get_all_intensities(), before);
        assert_eq!(engine.counters().rejected, 1);
    }

    #[test]
    fn emotion_sequence_ends_on_last_entry() {
        let (engine, _) = engine_at(noon());
        engine
            .on_emotion_sequence(&[
                EmotionDimension::Excited,
                EmotionDimension::Curious,
                EmotionDimension::Happy,
            ])
            .expect("non-empty");
        let all = engine.get_all_intensities();
        assert!((all[EmotionDimension::Excited] - 0.3).abs() < 1e-6);
        assert!((all[EmotionDimension::Curious] - 0.55).abs() < 1e-6);
        assert!((all[EmotionDimension::Happy] - 0.8).abs() < 1e-6);
        assert_eq!(engine.get_emotion().label, EmotionDimension::Happy);
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let (engine, _) = engine_at(noon());
        assert_eq!(engine.on_emotion_sequence(&[]), Err(ValidationError::EmptySequence));
    }

    #[test]
    fn reset_returns_to_baseline() {
        let (engine, _) = engine_at(noon());
        engine.on_face_recognized(true);
        engine.on_proximity(3.0).expect("in range");
        assert_ne!(engine.get_all_intensities(), engine.baselines());

        engine.reset();
        assert_eq!(engine.get_all_intensities(), engine.baselines());
    }

    #[test]
    fn snapshot_serializes() {
        let (engine, _) = engine_at(noon());
        engine.on_voice_interaction();
        let json = engine.snapshot().to_json().expect("serialize");
        assert!(json.contains("\"label\":\"happy\""));
        assert!(json.contains("\"energy\""));
    }

    #[test]
    fn counters_track_accepted_and_rejected() {
        let (engine, clock) = engine_at(noon());
        engine.on_voice_interaction();
        engine.on_proximity(30.0).expect("in range");
        let _ = engine.on_proximity(-5.0);
        engine.on_tick(clock.now());

        let snap = engine.counters();
        assert_eq!(snap.voice_interactions, 1);
        assert_eq!(snap.proximity_readings, 1);
        assert_eq!(snap.rejected, 1);
        assert_eq!(snap.ticks, 1);
        assert_eq!(snap.invariant_violations, 0);
    }

    #[test]
    fn always_awake_window_never_gets_sleepy() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 5, 4, 3, 0, 0).single().expect("valid"),
        ));
        let config = EngineConfig {
            awake_window: AwakeWindow::ALWAYS,
            ..EngineConfig::default()
        };
        let engine =
            EmotionEngine::with_clock(config, Arc::new(TraitProfile::default()), clock.clone())
                .expect("valid");
        clock.advance_secs(600.0);
        engine.on_tick(clock.now());
        assert!(engine.get_all_intensities()[EmotionDimension::Sleepy] <= 0.1 + f32::EPSILON);
    }
}
