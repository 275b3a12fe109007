//! Integration Tests — config files and recorded sessions
//!
//! Loads the shipped `kibo.toml` and session scripts from disk and replays
//! them end to end.

use std::io::Write;
use std::path::PathBuf;

use kibo_core::EmotionDimension;
use kibo_host::script::Script;
use kibo_host::{HostError, KiboConfig};

fn manifest_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[test]
fn shipped_config_loads_and_builds() {
    let config = KiboConfig::from_file(&manifest_path("kibo.toml")).expect("valid config");
    assert_eq!(config.general.tick_interval_ms, 1_000);
    assert_eq!(config.engine.decay.len(), EmotionDimension::COUNT);
    let engine = config.build_engine().expect("valid engine");
    assert_eq!(engine.get_emotion().label, EmotionDimension::Curious);
}

#[test]
fn config_written_to_disk_round_trips() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
        [general]
        log_level = "debug"

        [traits]
        energy = 0.4
        sociability = 0.2
        curiosity = 0.9
        affection = 0.5
        "#
    )
    .expect("write");

    let config = KiboConfig::from_file(file.path()).expect("valid config");
    assert_eq!(config.general.log_level, "debug");
    assert!((config.traits.sociability() - 0.2).abs() < f32::EPSILON);
    let engine = config.build_engine().expect("valid engine");
    assert!((engine.energy_level() - 0.4).abs() < f32::EPSILON);
}

#[test]
fn missing_config_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = KiboConfig::from_file(&dir.path().join("absent.toml")).expect_err("missing");
    assert!(matches!(err, HostError::Io(_)));
}

#[test]
fn evening_session_ends_sleepy() {
    let config = KiboConfig::from_file(&manifest_path("kibo.toml")).expect("valid config");
    let script =
        Script::from_file(&manifest_path("sessions/evening.toml")).expect("valid script");
    let replay = script.replay(&config).expect("replay");
    let steps = &replay.steps;
    assert_eq!(steps.len(), script.steps.len());

    // Greeted, excited, then playful.
    assert_eq!(steps[3].snapshot.label, EmotionDimension::Happy);
    assert_eq!(steps[6].snapshot.label, EmotionDimension::Playful);

    // Hours alone: lonely by bedtime, asleep soon after.
    let lonely = |i: usize| steps[i].snapshot.intensities[EmotionDimension::Lonely];
    assert!(lonely(9) > lonely(7));
    assert_eq!(
        steps.last().expect("non-empty").snapshot.label,
        EmotionDimension::Sleepy
    );
    assert!(steps.last().expect("non-empty").snapshot.energy <= config.traits.energy());

    assert_eq!(replay.counters.touches, 1);
    assert_eq!(replay.counters.faces, 1);
    assert_eq!(replay.counters.proximity_readings, 2);
    assert_eq!(replay.counters.conversation_overrides, 2);
    assert_eq!(replay.counters.rejected, 0);
}
