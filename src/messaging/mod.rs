// ============================================================================
// Messaging - outbound customer notification channels
// ============================================================================
//
// Both channels are in-memory mocks: nothing leaves the process. They keep an
// outbox so callers can inspect what would have been sent.
//
// ============================================================================

mod email;
mod sms;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use email::EmailChannel;
pub use sms::SmsChannel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub recipient: String,
    pub subject: String,
    pub message: String,
    pub priority: Priority,
}

/// Outcome reported by a channel. A rejected message is still `Ok` at the
/// call level: `success` is false and `error` says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationResult {
    pub success: bool,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChannelError {
    #[error("{service} is unavailable")]
    Unavailable { service: String },
}

pub trait NotificationChannel: Send + Sync {
    fn service_name(&self) -> &str;

    /// Whether the recipient address is acceptable for this channel
    fn validate(&self, recipient: &str) -> bool;

    fn send(&self, notification: &NotificationMessage) -> Result<NotificationResult, ChannelError>;
}
