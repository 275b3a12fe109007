//! Property-Based Tests for the KIBO emotion engine
//!
//! Uses `proptest` to check engine invariants under random stimulus streams:
//! clamping, reproducibility, decay monotonicity, tie-break stability and
//! rejection without side effects.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use kibo_core::config::{AwakeWindow, BlendConfig};
use kibo_core::{
    Clock, EmotionDimension, EmotionEngine, EngineConfig, ManualClock, Timestamp, TouchLocation,
    TraitProfile,
};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Op {
    Touch(TouchLocation, f64),
    Voice,
    Face(bool),
    Proximity(f64),
    Wait(f64),
    Llm(EmotionDimension, f32),
}

fn arb_dimension() -> impl Strategy<Value = EmotionDimension> {
    (0..EmotionDimension::COUNT).prop_map(|i| EmotionDimension::ALL[i])
}

fn arb_location() -> impl Strategy<Value = TouchLocation> {
    prop_oneof![
        Just(TouchLocation::Head),
        Just(TouchLocation::Body),
        Just(TouchLocation::Back),
    ]
}

fn arb_traits() -> impl Strategy<Value = TraitProfile> {
    (0.0..=1.0f32, 0.0..=1.0f32, 0.0..=1.0f32, 0.0..=1.0f32).prop_map(|(e, s, c, a)| {
        TraitProfile::new(e, s, c, a).expect("generated traits are in range")
    })
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (arb_location(), 0.0..20.0f64).prop_map(|(l, d)| Op::Touch(l, d)),
        Just(Op::Voice),
        any::<bool>().prop_map(Op::Face),
        (0.0..=400.0f64).prop_map(Op::Proximity),
        (0.0..7200.0f64).prop_map(Op::Wait),
        (arb_dimension(), 0.0..=1.0f32).prop_map(|(d, i)| Op::Llm(d, i)),
    ]
}

fn start() -> Timestamp {
    Utc.with_ymd_and_hms(2026, 1, 1, 6, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn build(config: EngineConfig, traits: TraitProfile) -> (EmotionEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start()));
    let engine = EmotionEngine::with_clock(config, Arc::new(traits), clock.clone())
        .expect("valid config");
    (engine, clock)
}

fn run(engine: &EmotionEngine, clock: &ManualClock, op: &Op) {
    match *op {
        Op::Touch(location, secs) => engine.on_touch(location, secs).expect("valid touch"),
        Op::Voice => engine.on_voice_interaction(),
        Op::Face(known) => engine.on_face_recognized(known),
        Op::Proximity(cm) => engine.on_proximity(cm).expect("in range"),
        Op::Wait(secs) => {
            clock.advance_secs(secs);
            engine.on_tick(clock.now());
        }
        Op::Llm(dim, intensity) => engine
            .on_llm_emotion(dim, intensity)
            .expect("valid intensity"),
    }
}

fn decay_only_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.scoring.loneliness_rate = 0.0;
    config.awake_window = AwakeWindow::ALWAYS;
    config
}

// ---------------------------------------------------------------------------
// Property: Every intensity stays in [0, 1] whatever happens
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn intensities_always_clamped(
        traits in arb_traits(),
        ops in prop::collection::vec(arb_op(), 1..60),
    ) {
        let (engine, clock) = build(EngineConfig::default(), traits);
        for op in &ops {
            run(&engine, &clock, op);
            let all = engine.get_all_intensities();
            prop_assert!(all.values().iter().all(|v| (0.0..=1.0).contains(v)));
            let energy = engine.energy_level();
            prop_assert!((0.0..=1.0).contains(&energy));
        }
        prop_assert!(engine.state().check_invariants().is_ok());
        prop_assert_eq!(engine.counters().invariant_violations, 0);
    }
}

// ---------------------------------------------------------------------------
// Property: Same stimuli, same traits, same times → same state
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn replay_is_deterministic(
        traits in arb_traits(),
        ops in prop::collection::vec(arb_op(), 1..40),
    ) {
        let (a, clock_a) = build(EngineConfig::default(), traits);
        let (b, clock_b) = build(EngineConfig::default(), traits);
        for op in &ops {
            run(&a, &clock_a, op);
            run(&b, &clock_b, op);
        }
        prop_assert_eq!(a.state(), b.state());
        prop_assert_eq!(a.get_emotion(), b.get_emotion());
    }
}

// ---------------------------------------------------------------------------
// Property: Without stimuli, no dimension moves away from its baseline
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn decay_never_moves_away_from_baseline(
        ops in prop::collection::vec(arb_op(), 1..30),
        waits in prop::collection::vec(0.0..5000.0f64, 1..10),
    ) {
        let (engine, clock) = build(decay_only_config(), TraitProfile::default());
        for op in &ops {
            run(&engine, &clock, op);
        }
        let baselines = engine.baselines();

        let mut before = engine.get_all_intensities();
        for secs in waits {
            clock.advance_secs(secs);
            engine.on_tick(clock.now());
            let after = engine.get_all_intensities();
            for dim in EmotionDimension::ALL {
                let was = before[dim] - baselines[dim];
                let now = after[dim] - baselines[dim];
                prop_assert!(now.abs() <= was.abs(), "{} moved away: {} -> {}", dim, was, now);
                prop_assert!(now * was >= 0.0, "{} overshot its baseline", dim);
            }
            before = after;
        }
    }
}

// ---------------------------------------------------------------------------
// Property: An exact tie always goes to the earlier dimension
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn ties_resolve_by_dimension_order(
        a in arb_dimension(),
        b in arb_dimension(),
        level in 0.05..=1.0f32,
    ) {
        prop_assume!(a != b);
        let config = EngineConfig {
            blend: BlendConfig {
                sequence_floor: level,
                sequence_peak: level,
                ..BlendConfig::default()
            },
            ..EngineConfig::default()
        };
        let (engine, _) = build(config, TraitProfile::default());
        engine.on_emotion_sequence(&[a, b]).expect("non-empty");

        let expected = if a.index() < b.index() { a } else { b };
        let reading = engine.get_emotion();
        prop_assert_eq!(reading.label, expected);
        prop_assert!((reading.intensity - level).abs() < f32::EPSILON);
    }
}

// ---------------------------------------------------------------------------
// Property: Rejected stimuli change nothing
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn rejected_proximity_leaves_state_untouched(
        ops in prop::collection::vec(arb_op(), 0..20),
        distance in prop_oneof![-1000.0..-0.001f64, 400.001..10_000.0f64],
    ) {
        let (engine, clock) = build(EngineConfig::default(), TraitProfile::default());
        for op in &ops {
            run(&engine, &clock, op);
        }
        let before = engine.state();
        prop_assert!(engine.on_proximity(distance).is_err());
        prop_assert_eq!(engine.state(), before);
    }

    #[test]
    fn rejected_touch_leaves_state_untouched(
        ops in prop::collection::vec(arb_op(), 0..20),
        duration in -1000.0..-0.001f64,
    ) {
        let (engine, clock) = build(EngineConfig::default(), TraitProfile::default());
        for op in &ops {
            run(&engine, &clock, op);
        }
        let before = engine.state();
        prop_assert!(engine.on_touch(TouchLocation::Head, duration).is_err());
        prop_assert_eq!(engine.state(), before);
    }
}
