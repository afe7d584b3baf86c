//! Handle on a running voicemail notification
//!
//! The dispatcher hands one of these back instead of firing and forgetting.
//! The webhook either waits for it, bounded by a timeout, or detaches it as
//! best-effort. Either way its result ends up in the log.

use crate::domain::notification::NotificationResult;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Completed(NotificationResult),
    /// Still running when the wait ended; it keeps going in the background
    TimedOut,
    /// The task panicked or was cancelled
    Aborted(String),
}

pub struct NotificationTask {
    id: Uuid,
    handle: JoinHandle<NotificationResult>,
}

impl NotificationTask {
    pub fn new(id: Uuid, handle: JoinHandle<NotificationResult>) -> Self {
        Self { id, handle }
    }

    /// Wait up to `timeout` for the notification to finish
    pub async fn wait(self, timeout: Duration) -> NotificationOutcome {
        let Self { id, mut handle } = self;

        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(result)) => NotificationOutcome::Completed(result),
            Ok(Err(e)) => {
                error!(notification_id = %id, error = %e, "Notification task aborted");
                NotificationOutcome::Aborted(e.to_string())
            }
            Err(_) => {
                warn!(
                    notification_id = %id,
                    timeout_ms = timeout.as_millis() as u64,
                    "Notification still running, continuing in background"
                );
                watch(id, handle);
                NotificationOutcome::TimedOut
            }
        }
    }

    /// Let the notification finish on its own (best-effort delivery)
    pub fn detach(self) {
        info!(notification_id = %self.id, "Notification detached (best-effort)");
        watch(self.id, self.handle);
    }
}

/// Log the final result of a task nobody is waiting on
fn watch(id: Uuid, handle: JoinHandle<NotificationResult>) {
    tokio::spawn(async move {
        match handle.await {
            Ok(result) => info!(
                notification_id = %id,
                success = result.success,
                message_id = ?result.message_id,
                error = ?result.error_detail,
                "Background notification finished"
            ),
            Err(e) => error!(notification_id = %id, error = %e, "Notification task aborted"),
        }
    });
}
