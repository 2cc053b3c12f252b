use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use super::{ChannelError, NotificationChannel, NotificationMessage, NotificationResult};

/// Mock email transport
pub struct EmailChannel {
    from_address: String,
    available: AtomicBool,
    outbox: Mutex<Vec<NotificationMessage>>,
}

impl Default for EmailChannel {
    fn default() -> Self {
        Self::new("noreply@bloomify.com")
    }
}

impl EmailChannel {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
            available: AtomicBool::new(true),
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn from_address(&self) -> &str {
        &self.from_address
    }

    /// Simulate an outage: while unavailable, `send` returns an error
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<NotificationMessage> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationChannel for EmailChannel {
    fn service_name(&self) -> &str {
        "Email"
    }

    fn validate(&self, recipient: &str) -> bool {
        if recipient.chars().any(char::is_whitespace) {
            return false;
        }
        match recipient.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain
                        .split_once('.')
                        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            }
            None => false,
        }
    }

    fn send(&self, notification: &NotificationMessage) -> Result<NotificationResult, ChannelError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(ChannelError::Unavailable {
                service: self.service_name().to_string(),
            });
        }

        let message_id = Uuid::new_v4().to_string();

        if !self.validate(&notification.recipient) {
            tracing::warn!(
                recipient = %notification.recipient,
                "Email rejected: invalid address"
            );
            return Ok(NotificationResult {
                success: false,
                message_id,
                timestamp: Utc::now(),
                service: self.service_name().to_string(),
                error: Some(format!("Invalid email address: {}", notification.recipient)),
            });
        }

        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());

        tracing::debug!(
            from = %self.from_address,
            to = %notification.recipient,
            subject = %notification.subject,
            message_id = %message_id,
            "📧 Email queued"
        );

        Ok(NotificationResult {
            success: true,
            message_id,
            timestamp: Utc::now(),
            service: self.service_name().to_string(),
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::Priority;

    fn message(recipient: &str) -> NotificationMessage {
        NotificationMessage {
            recipient: recipient.to_string(),
            subject: "Order ORD-000001".to_string(),
            message: "Hello".to_string(),
            priority: Priority::Normal,
        }
    }

    #[test]
    fn test_validate() {
        let channel = EmailChannel::default();
        assert!(channel.validate("alice@example.com"));
        assert!(!channel.validate("alice@example"));
        assert!(!channel.validate("alice example.com"));
        assert!(!channel.validate("@example.com"));
    }

    #[test]
    fn test_send_records_outbox() {
        let channel = EmailChannel::default();
        let result = channel.send(&message("alice@example.com")).unwrap();
        assert!(result.success);
        assert_eq!(channel.sent().len(), 1);
    }

    #[test]
    fn test_invalid_recipient_is_soft_failure() {
        let channel = EmailChannel::default();
        let result = channel.send(&message("not-an-email")).unwrap();
        assert!(!result.success);
        assert!(result.error.is_some());
        assert!(channel.sent().is_empty());
    }

    #[test]
    fn test_unavailable_channel_errors() {
        let channel = EmailChannel::default();
        channel.set_available(false);
        let err = channel.send(&message("alice@example.com")).unwrap_err();
        assert_eq!(err.to_string(), "Email is unavailable");
    }
}
