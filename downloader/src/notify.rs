/// User-facing failure notifications.
use std::sync::Arc;

use tracing::error;

/// Surfaces a failure message to the user. Called once per failed download.
pub trait Notifier {
    fn notify_error(&self, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify_error(&self, message: &str) {
        (**self).notify_error(message)
    }
}

/// Prints failures to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify_error(&self, message: &str) {
        error!("Notifying user: {}", message);
        eprintln!("Download failed: {}", message);
    }
}
