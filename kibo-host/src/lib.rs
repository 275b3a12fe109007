//! # kibo-host — Host Integration for KIBO
//!
//! This crate wires the I/O-free `kibo-core` engine into a running robot
//! process.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 robot process                 │
//! │  touch / proximity / vision threads           │
//! │        │                                      │
//! │        ▼                                      │
//! │  ┌──────────┐   ┌──────────────┐  ┌────────┐  │
//! │  │  hooks   │   │ conversation │  │ ticker │  │
//! │  └────┬─────┘   └──────┬───────┘  └───┬────┘  │
//! │       │                │              │       │
//! │       ▼                ▼              ▼       │
//! │    ┌────────────────────────────────────┐     │
//! │    │        kibo-core EmotionEngine     │     │
//! │    └────────────────────────────────────┘     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config` — `kibo.toml` loading ([`KiboConfig`])
//! - `telemetry` — tracing subscriber setup
//! - `hooks` — touch press/release tracking, proximity, PIR motion and face adapters
//! - `conversation` — `[emotion]` reply tags, prompt context, voice modulation
//! - `script` — timed session replay for `kibo-sim`
//! - `ticker` — the tokio task that drives `on_tick`

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod conversation;
pub mod error;
pub mod hooks;
pub mod script;
pub mod telemetry;
pub mod ticker;

pub use config::KiboConfig;
pub use error::{HostError, Result};
pub use ticker::Ticker;
