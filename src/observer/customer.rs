use std::sync::{Arc, Mutex, PoisonError};

use super::subject::{ObserverError, OrderObserver};
use crate::config::ShopConfig;
use crate::domain::order::{OrderData, OrderStatus};
use crate::messaging::{NotificationChannel, NotificationMessage, NotificationResult, Priority};

/// Where customer notifications are addressed
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerContact {
    pub email: String,
    pub phone: String,
}

impl Default for CustomerContact {
    fn default() -> Self {
        Self {
            email: "customer@example.com".to_string(),
            phone: "+1234567890".to_string(),
        }
    }
}

/// Tells the customer about every status change by email, SMS and a UI toast.
///
/// Channel errors propagate to the subject; delivery results are only logged.
pub struct CustomerObserver {
    config: ShopConfig,
    contact: CustomerContact,
    email: Arc<dyn NotificationChannel>,
    sms: Arc<dyn NotificationChannel>,
    toasts: Mutex<Vec<String>>,
}

impl CustomerObserver {
    pub fn new(
        config: ShopConfig,
        email: Arc<dyn NotificationChannel>,
        sms: Arc<dyn NotificationChannel>,
    ) -> Self {
        Self {
            config,
            contact: CustomerContact::default(),
            email,
            sms,
            toasts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_contact(mut self, contact: CustomerContact) -> Self {
        self.contact = contact;
        self
    }

    pub fn message_for(&self, order: &OrderData) -> String {
        let bouquet = &order.bouquet_name;
        match order.status {
            OrderStatus::Pending => format!(
                "Your order for \"{bouquet}\" has been received and is pending confirmation."
            ),
            OrderStatus::Confirmed => format!(
                "Great news! Your order for \"{bouquet}\" has been confirmed. Total: {}",
                self.config.format_price(order.total_price)
            ),
            OrderStatus::Preparing => {
                format!("We're preparing your beautiful \"{bouquet}\" bouquet with care! 💐")
            }
            OrderStatus::Ready => format!("Your \"{bouquet}\" is ready for delivery!"),
            OrderStatus::OutForDelivery => {
                "Your bouquet is on its way! Expected delivery soon.".to_string()
            }
            OrderStatus::Delivered => format!("Your \"{bouquet}\" has been delivered! Enjoy! 🌸"),
            OrderStatus::Cancelled => format!(
                "Your order for \"{bouquet}\" has been cancelled. Refund initiated."
            ),
        }
    }

    /// Toast texts shown so far, oldest first
    pub fn toasts(&self) -> Vec<String> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn log_result(&self, order: &OrderData, result: &NotificationResult) {
        if result.success {
            tracing::debug!(
                order_id = %order.order_id,
                service = %result.service,
                message_id = %result.message_id,
                "Customer notification sent"
            );
        } else {
            tracing::warn!(
                order_id = %order.order_id,
                service = %result.service,
                error = ?result.error,
                "Customer notification not delivered"
            );
        }
    }
}

impl OrderObserver for CustomerObserver {
    fn name(&self) -> &str {
        "CustomerObserver"
    }

    fn update(&self, order: &OrderData) -> Result<(), ObserverError> {
        tracing::info!(
            order_id = %order.order_id,
            status = %order.status,
            "📧 Notifying customer"
        );

        let message = self.message_for(order);

        let email_result = self.email.send(&NotificationMessage {
            recipient: self.contact.email.clone(),
            subject: format!("Order {} - {}", order.order_id, order.status),
            message: message.clone(),
            priority: Priority::Normal,
        })?;
        self.log_result(order, &email_result);

        let sms_result = self.sms.send(&NotificationMessage {
            recipient: self.contact.phone.clone(),
            subject: format!("Order {}", order.order_id),
            message: message.clone(),
            priority: Priority::Normal,
        })?;
        self.log_result(order, &sms_result);

        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{EmailChannel, SmsChannel};
    use crate::observer::subject::test_support::order_data;

    fn observer() -> (CustomerObserver, Arc<EmailChannel>, Arc<SmsChannel>) {
        let email = Arc::new(EmailChannel::default());
        let sms = Arc::new(SmsChannel::default());
        let observer = CustomerObserver::new(ShopConfig::default(), email.clone(), sms.clone());
        (observer, email, sms)
    }

    #[test]
    fn test_every_status_has_a_message() {
        let (observer, _, _) = observer();
        for status in OrderStatus::ALL {
            let message = observer.message_for(&order_data(status));
            assert!(!message.is_empty());
        }
    }

    #[test]
    fn test_confirmed_message_uses_configured_currency() {
        let (observer, _, _) = observer();
        assert_eq!(
            observer.message_for(&order_data(OrderStatus::Confirmed)),
            "Great news! Your order for \"Spring Dream\" has been confirmed. Total: 120.00 €"
        );
    }

    #[test]
    fn test_update_sends_email_sms_and_toast() {
        let (observer, email, sms) = observer();
        observer.update(&order_data(OrderStatus::Cancelled)).unwrap();

        let sent = email.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Order ORD-000042 - cancelled");
        assert_eq!(sms.sent().len(), 1);
        assert_eq!(
            observer.toasts(),
            vec!["Your order for \"Spring Dream\" has been cancelled. Refund initiated.".to_string()]
        );
    }

    #[test]
    fn test_channel_failure_propagates() {
        let (observer, email, sms) = observer();
        email.set_available(false);

        let result = observer.update(&order_data(OrderStatus::Ready));

        assert!(matches!(result, Err(ObserverError::Channel(_))));
        assert!(sms.sent().is_empty());
        assert!(observer.toasts().is_empty());
    }

    #[test]
    fn test_rejected_recipient_is_not_an_error() {
        let (observer, email, _) = observer();
        let observer = observer.with_contact(CustomerContact {
            email: "broken".to_string(),
            phone: "+1234567890".to_string(),
        });

        observer.update(&order_data(OrderStatus::Ready)).unwrap();
        assert!(email.sent().is_empty());
        assert_eq!(observer.toasts().len(), 1);
    }
}
