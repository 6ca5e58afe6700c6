//! Reload when watched files change.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{ConfigError, ConfigResult};
use crate::reload::{registration_key, ReloadStrategy, Reloadable};

/// Runs `reload()` at registration and again whenever a watched path is
/// modified or created. Reload failures are logged and the current
/// configuration stays in effect.
pub struct FileWatchReloadStrategy {
    paths: Vec<PathBuf>,
    poll_interval: Duration,
    watchers: Mutex<HashMap<usize, RecommendedWatcher>>,
}

impl FileWatchReloadStrategy {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            poll_interval: Duration::from_secs(2),
            watchers: Mutex::new(HashMap::new()),
        }
    }

    /// Poll interval for platforms without native change notification.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn watch(&self, reloadable: Arc<dyn Reloadable>) -> notify::Result<RecommendedWatcher> {
        let name = reloadable.describe();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(
                            target_name = %name,
                            "Configuration change detected, reloading..."
                        );
                        if let Err(e) = reloadable.reload() {
                            tracing::error!(
                                target_name = %name,
                                error = %e,
                                "Failed to reload config. Keeping current configuration."
                            );
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        for path in &self.paths {
            watcher.watch(path, RecursiveMode::Recursive)?;
            tracing::info!(path = ?path, "Config watcher started");
        }
        Ok(watcher)
    }
}

impl fmt::Debug for FileWatchReloadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileWatchReloadStrategy")
            .field("paths", &self.paths)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl ReloadStrategy for FileWatchReloadStrategy {
    fn register(&self, reloadable: Arc<dyn Reloadable>) -> ConfigResult<()> {
        if self.paths.is_empty() {
            return Err(ConfigError::Misconfigured(
                "file watch reload needs at least one path".into(),
            ));
        }
        reloadable.reload()?;

        let key = registration_key(&reloadable);
        let watcher = self
            .watch(reloadable)
            .map_err(|e| ConfigError::Misconfigured(format!("cannot watch configuration: {}", e)))?;
        self.watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, watcher);
        Ok(())
    }

    fn deregister(&self, reloadable: &Arc<dyn Reloadable>) {
        let removed = self
            .watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&registration_key(reloadable));
        if removed.is_some() {
            tracing::info!(target_name = %reloadable.describe(), "Config watcher stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(AtomicUsize);

    impl Reloadable for Counting {
        fn reload(&self) -> ConfigResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_reloads_on_change_until_deregistered() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("app.toml");
        std::fs::write(&file, "a = 1\n").unwrap();

        let strategy = FileWatchReloadStrategy::new(vec![dir.path().to_path_buf()])
            .with_poll_interval(Duration::from_millis(50));
        let counting = Arc::new(Counting(AtomicUsize::new(0)));
        let reloadable: Arc<dyn Reloadable> = counting.clone();

        strategy.register(reloadable.clone()).unwrap();
        assert_eq!(counting.0.load(Ordering::SeqCst), 1);

        std::fs::write(&file, "a = 2\n").unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while counting.0.load(Ordering::SeqCst) < 2 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(counting.0.load(Ordering::SeqCst) >= 2);

        strategy.deregister(&reloadable);
        std::thread::sleep(Duration::from_millis(200));
        let settled = counting.0.load(Ordering::SeqCst);
        std::fs::write(&file, "a = 3\n").unwrap();
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(counting.0.load(Ordering::SeqCst), settled);
    }

    #[test]
    fn test_requires_paths() {
        let strategy = FileWatchReloadStrategy::new(Vec::new());
        let reloadable: Arc<dyn Reloadable> = Arc::new(Counting(AtomicUsize::new(0)));
        assert!(matches!(strategy.register(reloadable), Err(ConfigError::Misconfigured(_))));
    }
}
