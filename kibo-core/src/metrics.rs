//! Runtime counters for the emotion engine.
//!
//! Lock-free `AtomicU64` counters incremented on the mutation path and read
//! on telemetry export. They never touch the state lock.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::stimulus::StimulusKind;

/// Atomic counters for engine events.
#[derive(Debug)]
pub struct EngineCounters {
    /// Accepted touch stimuli.
    pub touches: AtomicU64,
    /// Accepted voice interactions.
    pub voice_interactions: AtomicU64,
    /// Accepted face-recognition results.
    pub faces: AtomicU64,
    /// Accepted proximity readings.
    pub proximity_readings: AtomicU64,
    /// Tick passes completed.
    pub ticks: AtomicU64,
    /// Emotions set by the conversation model (single or sequence).
    pub conversation_overrides: AtomicU64,
    /// Stimuli rejected by validation.
    pub rejected: AtomicU64,
    /// Commits after which the state failed its invariant check.
    pub invariant_violations: AtomicU64,
}

impl EngineCounters {
    /// Create a new set of zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            touches: AtomicU64::new(0),
            voice_interactions: AtomicU64::new(0),
            faces: AtomicU64::new(0),
            proximity_readings: AtomicU64::new(0),
            ticks: AtomicU64::new(0),
            conversation_overrides: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            invariant_violations: AtomicU64::new(0),
        }
    }

    /// Count one accepted stimulus of `kind`.
    ///
    /// Idle and time-of-day stimuli arrive through the tick pass and are
    /// covered by `ticks`.
    pub fn record(&self, kind: StimulusKind) {
        let counter = match kind {
            StimulusKind::Touch => &self.touches,
            StimulusKind::Voice => &self.voice_interactions,
            StimulusKind::FaceRecognized => &self.faces,
            StimulusKind::Proximity => &self.proximity_readings,
            StimulusKind::IdleTick | StimulusKind::TimeOfDay => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot all counters for export.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            touches: self.touches.load(Ordering::Relaxed),
            voice_interactions: self.voice_interactions.load(Ordering::Relaxed),
            faces: self.faces.load(Ordering::Relaxed),
            proximity_readings: self.proximity_readings.load(Ordering::Relaxed),
            ticks: self.ticks.load(Ordering::Relaxed),
            conversation_overrides: self.conversation_overrides.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            invariant_violations: self.invariant_violations.load(Ordering::Relaxed),
        }
    }
}

impl Default for EngineCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// A snapshot of counter values at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct CounterSnapshot {
    /// Accepted touch stimuli.
    pub touches: u64,
    /// Accepted voice interactions.
    pub voice_interactions: u64,
    /// Accepted face-recognition results.
    pub faces: u64,
    /// Accepted proximity readings.
    pub proximity_readings: u64,
    /// Tick passes completed.
    pub ticks: u64,
    /// Conversation-chosen emotions applied.
    pub conversation_overrides: u64,
    /// Stimuli rejected by validation.
    pub rejected: u64,
    /// Invariant check failures.
    pub invariant_violations: u64,
}

impl CounterSnapshot {
    /// Format as Prometheus-compatible text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP kibo_stimuli_total Accepted stimuli by kind\n\
             # TYPE kibo_stimuli_total counter\n\
             kibo_stimuli_total{{kind=\"touch\"}} {}\n\
             kibo_stimuli_total{{kind=\"voice\"}} {}\n\
             kibo_stimuli_total{{kind=\"face\"}} {}\n\
             kibo_stimuli_total{{kind=\"proximity\"}} {}\n\
             # HELP kibo_ticks_total Tick passes completed\n\
             # TYPE kibo_ticks_total counter\n\
             kibo_ticks_total {}\n\
             # HELP kibo_conversation_overrides_total Emotions set by the conversation model\n\
             # TYPE kibo_conversation_overrides_total counter\n\
             kibo_conversation_overrides_total {}\n\
             # HELP kibo_stimuli_rejected_total Stimuli rejected by validation\n\
             # TYPE kibo_stimuli_rejected_total counter\n\
             kibo_stimuli_rejected_total {}\n\
             # HELP kibo_invariant_violations_total State invariant check failures\n\
             # TYPE kibo_invariant_violations_total counter\n\
             kibo_invariant_violations_total {}\n",
            self.touches,
            self.voice_interactions,
            self.faces,
            self.proximity_readings,
            self.ticks,
            self.conversation_overrides,
            self.rejected,
            self.invariant_violations,
        )
    }
}
