//! One-shot desktop notification for completed tickets.

use std::path::Path;

use notify_rust::Notification;

use crate::errors::NotificationError;

/// User notification sink, abstracted for testing.
pub trait Notifier {
    /// Announce that the issue's working folder is ready. Best effort and
    /// fire-and-forget from the orchestrator's point of view.
    fn notify(&self, iid: i64, folder: &Path) -> Result<(), NotificationError>;
}

/// Shows a desktop notification with an "Open folder" action where the
/// platform supports actions; elsewhere the folder path is only in the body.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, iid: i64, folder: &Path) -> Result<(), NotificationError> {
        let mut notification = Notification::new();
        notification
            .summary(&format!("Issue #{iid} created"))
            .body(&format!("Working folder ready: {}", folder.display()));
        show(notification, folder)
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn show(mut notification: Notification, folder: &Path) -> Result<(), NotificationError> {
    notification.action("open", "Open folder");
    let handle = notification
        .show()
        .map_err(|e| NotificationError::Display(e.to_string()))?;

    let folder = folder.to_path_buf();
    // The click handler outlives this call; if the process exits first the
    // action is simply lost.
    std::thread::spawn(move || {
        handle.wait_for_action(|action| {
            if action == "open"
                && let Err(err) = open::that(&folder)
            {
                tracing::warn!(
                    folder = %folder.display(),
                    error = %err,
                    "failed to open folder from notification"
                );
            }
        });
    });
    Ok(())
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn show(notification: Notification, _folder: &Path) -> Result<(), NotificationError> {
    notification
        .show()
        .map_err(|e| NotificationError::Display(e.to_string()))?;
    Ok(())
}

/// Used when `[notifications].enabled = false`.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, iid: i64, folder: &Path) -> Result<(), NotificationError> {
        tracing::debug!(iid, folder = %folder.display(), "notifications disabled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_noop_notifier_always_succeeds() {
        let notifier = NoopNotifier;
        assert!(notifier.notify(7, &PathBuf::from("/work/tickets/7")).is_ok());
    }
}
