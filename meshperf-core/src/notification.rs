use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Success,
    Info,
    Warning,
    Error,
}

/// User visible message raised by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Notification {
    pub fn new(event_type: EventType, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            event_type,
            details: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(EventType::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(EventType::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(EventType::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EventType::Error, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) if *details != self.message => write!(f, "{} ({details})", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Sink for notifications.
pub trait Notify: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Logs notifications at the level matching their type.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notify for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.event_type {
            EventType::Success | EventType::Info => info!("{notification}"),
            EventType::Warning => warn!("{notification}"),
            EventType::Error => error!("{notification}"),
        }
    }
}

/// Keeps every notification it receives. Clones share the same history.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    history: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Notification> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, event_type: EventType, message: &str) -> bool {
        self.history()
            .iter()
            .any(|n| n.event_type == event_type && n.message.contains(message))
    }
}

impl Notify for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        if let Ok(mut history) = self.history.lock() {
            history.push(notification.clone());
        }
    }
}
