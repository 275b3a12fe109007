//! Background ticker.
//!
//! The engine owns no timer. [`Ticker`] is the external scheduler: a tokio
//! task that calls [`EmotionEngine::on_tick`] with the wall-clock time at a
//! fixed interval. The engine measures elapsed time itself, so a late or
//! skipped tick only makes the next one larger.

use std::sync::Arc;
use std::time::Duration;

use kibo_core::{Clock, EmotionEngine};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::error::{HostError, Result};

/// How long [`Ticker::stop`] waits for the task to exit.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Drives `on_tick` from a tokio task.
pub struct Ticker {
    engine: Arc<EmotionEngine>,
    clock: Arc<dyn Clock>,
    period: Duration,
    shutdown: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Create a stopped ticker. Periods under a millisecond are raised to one.
    #[must_use]
    pub fn new(engine: Arc<EmotionEngine>, clock: Arc<dyn Clock>, period: Duration) -> Self {
        Self {
            engine,
            clock,
            period: period.max(Duration::from_millis(1)),
            shutdown: Arc::new(Notify::new()),
            task: None,
        }
    }

    /// Spawn the tick task on the current runtime.
    ///
    /// # Errors
    /// Returns [`HostError::Ticker`] if already running.
    pub fn start(&mut self) -> Result<()> {
        if self.task.is_some() {
            return Err(HostError::Ticker("already running"));
        }
        self.shutdown = Arc::new(Notify::new());

        let engine = Arc::clone(&self.engine);
        let clock = Arc::clone(&self.clock);
        let shutdown = Arc::clone(&self.shutdown);
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            tick_loop(engine, clock, shutdown, period).await;
        }));

        info!(period_ms = self.period.as_millis(), "Ticker started");
        Ok(())
    }

    /// Signal the task to exit and wait for it.
    ///
    /// # Errors
    /// Returns [`HostError::Ticker`] if not running or if the task does not
    /// exit in time.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(task) = self.task.take() else {
            return Err(HostError::Ticker("not running"));
        };
        self.shutdown.notify_one();

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, task).await {
            Ok(Ok(())) => {
                info!("Ticker stopped");
                Ok(())
            }
            Ok(Err(err)) => {
                error!(error = %err, "Ticker task panicked");
                Ok(())
            }
            Err(_) => Err(HostError::Ticker("shutdown timed out")),
        }
    }

    /// Whether the task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

async fn tick_loop(
    engine: Arc<EmotionEngine>,
    clock: Arc<dyn Clock>,
    shutdown: Arc<Notify>,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            () = shutdown.notified() => break,

            _ = interval.tick() => engine.on_tick(clock.now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use kibo_core::{EngineConfig, SystemClock, TraitProfile};

    use super::*;

    fn engine() -> Arc<EmotionEngine> {
        Arc::new(
            EmotionEngine::new(EngineConfig::default(), Arc::new(TraitProfile::default()))
                .expect("valid config"),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_until_stopped() {
        let engine = engine();
        let mut ticker = Ticker::new(
            Arc::clone(&engine),
            Arc::new(SystemClock),
            Duration::from_millis(100),
        );
        ticker.start().expect("not yet running");
        assert!(ticker.is_running());

        tokio::time::sleep(Duration::from_millis(350)).await;
        ticker.stop().await.expect("running");
        let ticks = engine.counters().ticks;
        assert!(ticks >= 3, "only {ticks} ticks");

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(engine.counters().ticks, ticks);
        assert!(!ticker.is_running());
    }

    #[tokio::test]
    async fn double_start_and_idle_stop_are_errors() {
        let mut ticker = Ticker::new(engine(), Arc::new(SystemClock), Duration::from_secs(1));
        assert!(matches!(ticker.stop().await, Err(HostError::Ticker(_))));
        ticker.start().expect("first start");
        assert!(matches!(ticker.start(), Err(HostError::Ticker(_))));
        ticker.stop().await.expect("running");
    }
}
