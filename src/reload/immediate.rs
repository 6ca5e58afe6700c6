//! Reload exactly once, at registration.

use std::sync::Arc;

use crate::error::ConfigResult;
use crate::reload::{ReloadStrategy, Reloadable};

/// Runs `reload()` synchronously when registered and never again.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateReloadStrategy;

impl ReloadStrategy for ImmediateReloadStrategy {
    fn register(&self, reloadable: Arc<dyn Reloadable>) -> ConfigResult<()> {
        tracing::debug!(target_name = %reloadable.describe(), "Immediate reload");
        reloadable.reload()
    }

    fn deregister(&self, _reloadable: &Arc<dyn Reloadable>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    impl Reloadable for Counting {
        fn reload(&self) -> ConfigResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ConfigError::CommunicationFailure("down".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_runs_once_and_propagates() {
        let ok = Arc::new(Counting { calls: AtomicUsize::new(0), fail: false });
        let as_dyn: Arc<dyn Reloadable> = ok.clone();
        ImmediateReloadStrategy.register(as_dyn.clone()).unwrap();
        ImmediateReloadStrategy.deregister(&as_dyn);
        assert_eq!(ok.calls.load(Ordering::SeqCst), 1);

        let failing: Arc<dyn Reloadable> = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        assert!(ImmediateReloadStrategy.register(failing).is_err());
    }
}
