//! Deadline scheduling for the two operations that outlive their request:
//! deferred message delivery and standup window expiry.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::{Store, now};

impl Store {
    /// Run `task` against the store once the wall clock reaches `fire_at`
    /// (unix seconds). The task runs on the runtime regardless of further
    /// client activity and takes the store lock like any request would.
    /// Scheduled tasks are not cancellable.
    pub(crate) fn spawn_at<F>(self: &Arc<Self>, fire_at: i64, task: F)
    where
        F: FnOnce(&Store) + Send + 'static,
    {
        let store = Arc::clone(self);
        let delay = (fire_at - now()).max(0) as u64;
        debug!(fire_at, delay, "scheduling deferred task");
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(delay)).await;
            task(&store);
        });
    }
}
