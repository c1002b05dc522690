//! Release-on-every-exit guard for critical sections

use super::LockService;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Releases a held lock exactly once
///
/// [`release`](LeaseGuard::release) is the normal path. When the guard is
/// dropped without it (the critical section panicked or its future was
/// cancelled), the release is spawned on the current runtime instead.
pub(crate) struct LeaseGuard {
    pending: Option<(LockService, String)>,
}

impl LeaseGuard {
    pub(crate) fn new(service: &LockService, key: &str) -> Self {
        Self {
            pending: Some((service.clone(), key.to_string())),
        }
    }

    /// Release now and report whether the store lease was deleted
    ///
    /// The guard stays armed until the release returns, so cancelling this
    /// future mid-release still hands the release to `Drop`.
    pub(crate) async fn release(mut self) -> bool {
        let Some((service, key)) = self.pending.clone() else {
            return false;
        };
        let released = service.release_lock(&key).await.unwrap_or(false);
        self.pending = None;
        released
    }
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        let Some((service, key)) = self.pending.take() else {
            return;
        };
        match Handle::try_current() {
            Ok(handle) => {
                debug!(key = %key, "Critical section abandoned, releasing lock in background");
                handle.spawn(async move {
                    if !service.release_lock(&key).await.unwrap_or(false) {
                        warn!(key = %key, "Background lock release failed, lease will expire");
                    }
                });
            }
            Err(_) => {
                warn!(key = %key, "No runtime to release lock, lease will expire");
            }
        }
    }
}
