//! Replay a scripted session and print the engine state after every step.
//!
//! ```text
//! kibo-sim <script.toml> [--config kibo.toml] [--prometheus]
//! ```
//!
//! Each step prints one JSON line. With `--prometheus` the final engine
//! counters follow in Prometheus text format.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use kibo_host::KiboConfig;
use kibo_host::script::Script;
use kibo_host::telemetry::init_tracing;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session script to replay
    script: PathBuf,

    /// Engine and personality config (defaults apply when omitted)
    #[arg(short, long, env = "KIBO_CONFIG")]
    config: Option<PathBuf>,

    /// Print the final counters in Prometheus text format
    #[arg(long)]
    prometheus: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => KiboConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => KiboConfig::default(),
    };
    init_tracing(&config.general.log_level)?;

    let script = Script::from_file(&args.script)
        .with_context(|| format!("loading script {}", args.script.display()))?;
    let replay = script.replay(&config).context("replaying script")?;

    for step in &replay.steps {
        println!("{}", serde_json::to_string(step)?);
    }
    if args.prometheus {
        print!("{}", replay.counters.to_prometheus());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_script_and_flags() {
        let args = Args::try_parse_from([
            "kibo-sim",
            "sessions/evening.toml",
            "--config",
            "kibo.toml",
            "--prometheus",
        ])
        .expect("valid args");
        assert_eq!(args.script, PathBuf::from("sessions/evening.toml"));
        assert_eq!(args.config, Some(PathBuf::from("kibo.toml")));
        assert!(args.prometheus);
    }

    #[test]
    fn script_path_is_required() {
        assert!(Args::try_parse_from(["kibo-sim", "--prometheus"]).is_err());
    }
}
