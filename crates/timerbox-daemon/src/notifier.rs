//! Notification sinks: log, terminal bell, desktop, stderr

use std::io::Write;
use std::sync::Arc;

use timerbox_core::models::NotificationConfig;
use timerbox_core::notify::{Notification, NotificationLevel, NotificationSink};

/// Writes notifications to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.level {
            NotificationLevel::Error => {
                tracing::warn!("{}: {}", notification.title, notification.message)
            }
            _ => tracing::info!("{}: {}", notification.title, notification.message),
        }
    }
}

/// Rings the terminal bell for completion alerts
#[derive(Debug, Default, Clone, Copy)]
pub struct BellNotifier;

impl NotificationSink for BellNotifier {
    fn notify(&self, notification: &Notification) {
        if notification.level == NotificationLevel::Error {
            return;
        }
        print!("\x07");
        let _ = std::io::stdout().flush();
    }
}

/// Shows a desktop notification
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl NotificationSink for DesktopNotifier {
    fn notify(&self, notification: &Notification) {
        let mut desktop = notify_rust::Notification::new();
        desktop
            .summary(&notification.title)
            .body(&notification.message)
            .icon("alarm-clock")
            .timeout(notify_rust::Timeout::Milliseconds(10000));

        #[cfg(all(unix, not(target_os = "macos")))]
        desktop.urgency(urgency_for(notification.level));

        if let Err(e) = desktop.show() {
            tracing::error!("Failed to send desktop notification: {}", e);
        }
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn urgency_for(level: NotificationLevel) -> notify_rust::Urgency {
    match level {
        NotificationLevel::Error => notify_rust::Urgency::Critical,
        _ => notify_rust::Urgency::Normal,
    }
}

/// Prints form feedback for the command line
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl NotificationSink for StderrNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.level {
            NotificationLevel::Error => eprintln!("error: {}", notification.message),
            _ => eprintln!("{}", notification.message),
        }
    }
}

/// Forwards to every wrapped sink in order
#[derive(Default, Clone)]
pub struct MultiNotifier {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl MultiNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Completion sinks enabled by the notification config. Always logs.
    pub fn from_config(config: &NotificationConfig) -> Self {
        let mut notifier = Self::new().with(Arc::new(LogNotifier));
        if config.bell {
            notifier = notifier.with(Arc::new(BellNotifier));
        }
        if config.desktop {
            notifier = notifier.with(Arc::new(DesktopNotifier));
        }
        notifier
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl NotificationSink for MultiNotifier {
    fn notify(&self, notification: &Notification) {
        for sink in &self.sinks {
            sink.notify(notification);
        }
    }
}
