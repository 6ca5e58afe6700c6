//! Reload on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::{self, MissedTickBehavior};

use crate::error::{ConfigError, ConfigResult};
use crate::reload::{registration_key, ReloadStrategy, Reloadable};

/// Runs `reload()` at registration and then every `interval` on a Tokio task.
///
/// Each scheduled run executes on the blocking pool, so a slow backend never
/// stalls the runtime. A failing or panicking run is logged and the schedule
/// continues.
///
/// Each registration owns the sending half of a cancel channel. Dropping it,
/// by deregistering, re-registering or dropping the strategy, ends the task
/// after any run in progress.
#[derive(Debug)]
pub struct PeriodicalReloadStrategy {
    interval: Duration,
    runtime: Option<Handle>,
    registrations: DashMap<usize, oneshot::Sender<()>>,
}

impl PeriodicalReloadStrategy {
    /// Schedule on the Tokio runtime that is current at registration time.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            runtime: None,
            registrations: DashMap::new(),
        }
    }

    /// Schedule on an explicit runtime, so registration works from any thread.
    pub fn with_runtime(interval: Duration, runtime: Handle) -> Self {
        Self {
            interval,
            runtime: Some(runtime),
            registrations: DashMap::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of live registrations.
    pub fn registered(&self) -> usize {
        self.registrations.len()
    }

    fn runtime(&self) -> ConfigResult<Handle> {
        self.runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
            .ok_or_else(|| {
                ConfigError::Misconfigured("periodic reload requires a Tokio runtime".into())
            })
    }
}

impl ReloadStrategy for PeriodicalReloadStrategy {
    fn register(&self, reloadable: Arc<dyn Reloadable>) -> ConfigResult<()> {
        if self.interval.is_zero() {
            return Err(ConfigError::Misconfigured(
                "reload interval must be greater than zero".into(),
            ));
        }
        let runtime = self.runtime()?;
        reloadable.reload()?;

        let (cancel, mut cancelled) = oneshot::channel::<()>();
        let interval = self.interval;
        let name = reloadable.describe();
        let key = registration_key(&reloadable);

        runtime.spawn(async move {
            tracing::info!(target_name = %name, interval = ?interval, "Periodic reload starting");
            let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let target = Arc::clone(&reloadable);
                        match tokio::task::spawn_blocking(move || target.reload()).await {
                            Ok(Ok(())) => {
                                tracing::debug!(target_name = %name, "Scheduled reload completed")
                            }
                            Ok(Err(e)) => {
                                tracing::error!(
                                    target_name = %name,
                                    error = %e,
                                    "Scheduled reload failed"
                                )
                            }
                            Err(e) => {
                                tracing::error!(
                                    target_name = %name,
                                    error = %e,
                                    "Scheduled reload panicked"
                                )
                            }
                        }
                    }
                    _ = &mut cancelled => {
                        tracing::info!(target_name = %name, "Periodic reload cancelled");
                        break;
                    }
                }
            }
        });

        self.registrations.insert(key, cancel);
        Ok(())
    }

    fn deregister(&self, reloadable: &Arc<dyn Reloadable>) {
        self.registrations.remove(&registration_key(reloadable));
    }
}
