//! Storage lifecycle: a deferred expiry sweep at startup and another each time the host signals
//! that the chat became visible again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::chat_storage::ChatStorage;

/// Delay before the first sweep, so startup is not blocked by storage I/O.
pub const INITIAL_SWEEP_DELAY: Duration = Duration::from_millis(100);

/// Handle returned by [`initialize_storage_lifecycle`]. Dropping it (or calling
/// [`StorageLifecycle::dispose`]) stops the background task.
pub struct StorageLifecycle {
    visible: Arc<Notify>,
    task: JoinHandle<()>,
}

impl StorageLifecycle {
    /// The host regained visibility (terminal focus, tab shown). Signals arriving while a sweep
    /// runs are coalesced into one.
    pub fn notify_visible(&self) {
        self.visible.notify_one();
    }

    pub fn dispose(self) {}
}

impl Drop for StorageLifecycle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts the sweep task. Must be called from within a Tokio runtime; invoke once from the
/// application's bootstrap.
pub fn initialize_storage_lifecycle<F>(storage: ChatStorage, on_visible: F) -> StorageLifecycle
where
    F: Fn() + Send + Sync + 'static,
{
    let visible = Arc::new(Notify::new());
    let signal = visible.clone();

    let task = tokio::spawn(async move {
        tokio::time::sleep(INITIAL_SWEEP_DELAY).await;
        let swept = storage.cleanup_old_sessions();
        debug!(swept, "initial storage sweep finished");

        loop {
            signal.notified().await;
            storage.cleanup_old_sessions();
            on_visible();
        }
    });

    StorageLifecycle { visible, task }
}
