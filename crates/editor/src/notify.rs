//! User-facing notifications, delivered through an injected [`Notifier`].

/// How prominently a notification should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NotificationLevel {
    Info,
    /// Non-blocking; the user keeps typing
    Warning,
    /// Shown visibly
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Receiver for notifications raised by the document controller.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

impl<F: FnMut(Notification)> Notifier for F {
    fn notify(&mut self, notification: Notification) {
        self(notification)
    }
}

/// Forwards notifications to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => log::info!("{}", notification.message),
            NotificationLevel::Warning => log::warn!("{}", notification.message),
            NotificationLevel::Error => log::error!("{}", notification.message),
        }
    }
}
