use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use super::{ChannelError, NotificationChannel, NotificationMessage, NotificationResult, Priority};

/// Mock SMS gateway. The subject line is prepended to the text body.
pub struct SmsChannel {
    available: AtomicBool,
    outbox: Mutex<Vec<String>>,
}

impl Default for SmsChannel {
    fn default() -> Self {
        Self {
            available: AtomicBool::new(true),
            outbox: Mutex::new(Vec::new()),
        }
    }
}

impl SmsChannel {
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Text bodies as they would have been transmitted
    pub fn sent(&self) -> Vec<String> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationChannel for SmsChannel {
    fn service_name(&self) -> &str {
        "SMS"
    }

    /// `+` followed by 10 to 15 digits; spaces and dashes are ignored
    fn validate(&self, recipient: &str) -> bool {
        let compact: String = recipient
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        match compact.strip_prefix('+') {
            Some(digits) => {
                (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
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
                "SMS rejected: invalid phone number"
            );
            return Ok(NotificationResult {
                success: false,
                message_id,
                timestamp: Utc::now(),
                service: self.service_name().to_string(),
                error: Some(format!("Invalid phone number: {}", notification.recipient)),
            });
        }

        let text = format!("{}\n\n{}", notification.subject, notification.message);
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text);

        tracing::debug!(
            to = %notification.recipient,
            urgent = notification.priority == Priority::High,
            message_id = %message_id,
            "📱 SMS transmitted"
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

    #[test]
    fn test_validate_phone_numbers() {
        let channel = SmsChannel::default();
        assert!(channel.validate("+1234567890"));
        assert!(channel.validate("+40 722-123-456"));
        assert!(!channel.validate("1234567890"));
        assert!(!channel.validate("+12345"));
        assert!(!channel.validate("+1234567890abc"));
    }

    #[test]
    fn test_send_prepends_subject() {
        let channel = SmsChannel::default();
        channel
            .send(&NotificationMessage {
                recipient: "+1234567890".to_string(),
                subject: "Order ORD-000001".to_string(),
                message: "On its way".to_string(),
                priority: Priority::High,
            })
            .unwrap();

        assert_eq!(channel.sent(), vec!["Order ORD-000001\n\nOn its way".to_string()]);
    }
}
