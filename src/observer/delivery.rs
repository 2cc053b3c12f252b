use std::sync::{Mutex, PoisonError};

use super::subject::{ObserverError, OrderObserver};
use crate::domain::order::{OrderData, OrderStatus};

/// Keeps the dispatch queue in step with order status.
///
/// `ready` enqueues, `delivered` and `cancelled` remove the order by id,
/// `out_for_delivery` only logs tracking info.
#[derive(Default)]
pub struct DeliveryObserver {
    queue: Mutex<Vec<String>>,
}

impl DeliveryObserver {
    pub fn delivery_queue(&self) -> Vec<String> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remove(queue: &mut Vec<String>, order_id: &str) -> bool {
        match queue.iter().position(|id| id == order_id) {
            Some(index) => {
                queue.remove(index);
                true
            }
            None => false,
        }
    }
}

impl OrderObserver for DeliveryObserver {
    fn name(&self) -> &str {
        "DeliveryObserver"
    }

    fn update(&self, order: &OrderData) -> Result<(), ObserverError> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);

        match order.status {
            OrderStatus::Ready => {
                queue.push(order.order_id.clone());
                tracing::info!(
                    order_id = %order.order_id,
                    position = queue.len(),
                    "🚚 Delivery scheduled"
                );
            }
            OrderStatus::OutForDelivery => {
                tracing::info!(
                    order_id = %order.order_id,
                    eta = "30-45 minutes",
                    "🚚 Tracking delivery"
                );
            }
            OrderStatus::Delivered => {
                Self::remove(&mut queue, &order.order_id);
                tracing::info!(order_id = %order.order_id, "Delivery completed");
            }
            OrderStatus::Cancelled => {
                if Self::remove(&mut queue, &order.order_id) {
                    tracing::info!(order_id = %order.order_id, "Delivery cancelled");
                }
            }
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Preparing => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::subject::test_support::order_data;

    fn data(order_id: &str, status: OrderStatus) -> OrderData {
        OrderData {
            order_id: order_id.to_string(),
            ..order_data(status)
        }
    }

    #[test]
    fn test_queue_follows_lifecycle() {
        let observer = DeliveryObserver::default();

        observer.update(&data("ORD-000001", OrderStatus::Ready)).unwrap();
        observer.update(&data("ORD-000002", OrderStatus::Ready)).unwrap();
        observer.update(&data("ORD-000001", OrderStatus::OutForDelivery)).unwrap();
        assert_eq!(observer.delivery_queue(), vec!["ORD-000001", "ORD-000002"]);

        // Removal is by id, not queue order
        observer.update(&data("ORD-000002", OrderStatus::Delivered)).unwrap();
        assert_eq!(observer.delivery_queue(), vec!["ORD-000001"]);

        observer.update(&data("ORD-000001", OrderStatus::Cancelled)).unwrap();
        assert!(observer.delivery_queue().is_empty());
    }

    #[test]
    fn test_ignores_other_statuses() {
        let observer = DeliveryObserver::default();
        observer.update(&data("ORD-000003", OrderStatus::Confirmed)).unwrap();
        observer.update(&data("ORD-000003", OrderStatus::Cancelled)).unwrap();
        assert!(observer.delivery_queue().is_empty());
    }
}
