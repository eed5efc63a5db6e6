//! Trailing-edge debounce built on a cancellable delayed task.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Runs only the last action handed to [`Debouncer::call`] once no new call
/// has arrived for the quiet period. Earlier actions are dropped unrun.
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    pending: Option<CancellationToken>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
        }
    }

    /// Schedule `action`, replacing whatever was scheduled before.
    pub fn call<F>(&mut self, runtime: &Handle, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let token = CancellationToken::new();
        self.pending = Some(token.clone());
        let quiet_period = self.quiet_period;

        runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(quiet_period) => {
                    action();
                    // Marks the call as no longer pending
                    token.cancel();
                }
            }
        });
    }

    /// Drop the scheduled action, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    /// True while an action is waiting out its quiet period.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
