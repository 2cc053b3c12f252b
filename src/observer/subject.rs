use chrono::Utc;
use std::fmt;
use std::sync::Arc;

use crate::domain::order::{OrderData, OrderDataPatch, OrderStatus};
use crate::messaging::ChannelError;
use crate::metrics::Metrics;

// ============================================================================
// Order Subject - broadcasts order state to attached observers
// ============================================================================
//
// Notification is synchronous and runs in attachment order. The subject does
// not isolate observers: the first observer error stops the fan-out and is
// returned to the caller, so later observers do not see that update.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    #[error("Notification channel failed: {0}")]
    Channel(#[from] ChannelError),

    #[error("{observer} rejected update: {reason}")]
    Rejected { observer: String, reason: String },
}

/// Party interested in order status changes
pub trait OrderObserver: Send + Sync {
    fn name(&self) -> &str;

    fn update(&self, order: &OrderData) -> Result<(), ObserverError>;
}

fn same_observer(a: &Arc<dyn OrderObserver>, b: &Arc<dyn OrderObserver>) -> bool {
    // Compare data pointers only; vtable pointers are not guaranteed unique
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

pub struct OrderSubject {
    data: OrderData,
    observers: Vec<Arc<dyn OrderObserver>>,
    metrics: Option<Arc<Metrics>>,
}

impl fmt::Debug for OrderSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderSubject")
            .field("data", &self.data)
            .field("observers", &self.observer_names())
            .finish()
    }
}

impl OrderSubject {
    pub fn new(data: OrderData) -> Self {
        Self {
            data,
            observers: Vec::new(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Option<Arc<Metrics>>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Attach an observer. Returns false (and changes nothing) when this
    /// exact instance is already attached.
    pub fn attach(&mut self, observer: Arc<dyn OrderObserver>) -> bool {
        if self.observers.iter().any(|o| same_observer(o, &observer)) {
            tracing::debug!(
                order_id = %self.data.order_id,
                observer = observer.name(),
                "Observer already attached"
            );
            return false;
        }

        tracing::debug!(
            order_id = %self.data.order_id,
            observer = observer.name(),
            "Attached observer"
        );
        self.observers.push(observer);
        true
    }

    /// Detach an observer. Returns false when it was not attached.
    pub fn detach(&mut self, observer: &Arc<dyn OrderObserver>) -> bool {
        match self.observers.iter().position(|o| same_observer(o, observer)) {
            Some(index) => {
                self.observers.remove(index);
                tracing::debug!(
                    order_id = %self.data.order_id,
                    observer = observer.name(),
                    "Detached observer"
                );
                true
            }
            None => {
                tracing::debug!(
                    order_id = %self.data.order_id,
                    observer = observer.name(),
                    "Observer not found"
                );
                false
            }
        }
    }

    pub fn notify(&self) -> Result<(), ObserverError> {
        tracing::debug!(
            order_id = %self.data.order_id,
            status = %self.data.status,
            observers = self.observers.len(),
            "Notifying observers"
        );

        for observer in &self.observers {
            let result = observer.update(&self.data);

            if let Some(metrics) = &self.metrics {
                metrics.record_notification(observer.name(), result.is_ok());
            }

            if let Err(e) = result {
                tracing::error!(
                    order_id = %self.data.order_id,
                    observer = observer.name(),
                    error = %e,
                    "Observer failed, remaining observers skipped"
                );
                return Err(e);
            }
        }

        Ok(())
    }

    pub fn state(&self) -> &OrderData {
        &self.data
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn observer_names(&self) -> Vec<String> {
        self.observers.iter().map(|o| o.name().to_string()).collect()
    }

    /// Set the status and notify. Legality of the transition is the
    /// caller's concern.
    pub fn update_status(&mut self, status: OrderStatus) -> Result<(), ObserverError> {
        tracing::info!(
            order_id = %self.data.order_id,
            from = %self.data.status,
            to = %status,
            "🔄 Order status broadcast"
        );
        self.data.status = status;
        self.data.timestamp = Utc::now();
        self.notify()
    }

    /// Merge the patch and notify, even when nothing actually changed
    pub fn update_order_data(&mut self, patch: OrderDataPatch) -> Result<(), ObserverError> {
        if let Some(order_id) = patch.order_id {
            self.data.order_id = order_id;
        }
        if let Some(bouquet_name) = patch.bouquet_name {
            self.data.bouquet_name = bouquet_name;
        }
        if let Some(customer_name) = patch.customer_name {
            self.data.customer_name = customer_name;
        }
        if let Some(total_price) = patch.total_price {
            self.data.total_price = total_price;
        }
        if let Some(status) = patch.status {
            self.data.status = status;
        }
        self.data.timestamp = Utc::now();
        self.notify()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_fan_out_delivers_same_snapshot() {
        let mut subject = OrderSubject::new(order_data(OrderStatus::Pending));
        let observers: Vec<_> = ["a", "b", "c"].iter().map(|n| RecordingObserver::named(n)).collect();
        for observer in &observers {
            subject.attach(observer.clone());
        }

        subject.update_status(OrderStatus::Confirmed).unwrap();

        let snapshots: Vec<OrderData> = observers
            .iter()
            .map(|o| {
                assert_eq!(o.count(), 1);
                o.received.lock().unwrap()[0].clone()
            })
            .collect();
        assert!(snapshots.iter().all(|s| s.status == OrderStatus::Confirmed));
        assert!(snapshots.iter().all(|s| s.timestamp == snapshots[0].timestamp));
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut subject = OrderSubject::new(order_data(OrderStatus::Pending));
        let observer = RecordingObserver::named("dup");

        assert!(subject.attach(observer.clone()));
        assert!(!subject.attach(observer.clone()));
        assert_eq!(subject.observer_count(), 1);

        subject.notify().unwrap();
        assert_eq!(observer.count(), 1);
    }

    #[test]
    fn test_detach_missing_is_noop() {
        let mut subject = OrderSubject::new(order_data(OrderStatus::Pending));
        let attached = RecordingObserver::named("attached");
        let stranger: Arc<dyn OrderObserver> = RecordingObserver::named("stranger");
        subject.attach(attached.clone());

        assert!(!subject.detach(&stranger));
        assert_eq!(subject.observer_count(), 1);

        let attached_dyn: Arc<dyn OrderObserver> = attached;
        assert!(subject.detach(&attached_dyn));
        assert_eq!(subject.observer_count(), 0);
    }

    #[test]
    fn test_failing_observer_aborts_fan_out() {
        let mut subject = OrderSubject::new(order_data(OrderStatus::Pending));
        let before = RecordingObserver::named("before");
        let after = RecordingObserver::named("after");
        subject.attach(before.clone());
        subject.attach(Arc::new(FailingObserver));
        subject.attach(after.clone());

        let result = subject.update_status(OrderStatus::Confirmed);

        assert!(matches!(result, Err(ObserverError::Rejected { .. })));
        assert_eq!(before.count(), 1);
        assert_eq!(after.count(), 0);
        assert_eq!(subject.state().status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_update_order_data_always_notifies() {
        let mut subject = OrderSubject::new(order_data(OrderStatus::Ready));
        let observer = RecordingObserver::named("watcher");
        subject.attach(observer.clone());

        subject.update_order_data(OrderDataPatch::default()).unwrap();
        subject
            .update_order_data(OrderDataPatch {
                total_price: Some(99.0),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(observer.count(), 2);
        assert_eq!(subject.state().total_price, 99.0);
        assert_eq!(subject.state().status, OrderStatus::Ready);
    }

    #[test]
    fn test_notify_records_metrics() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let mut subject =
            OrderSubject::new(order_data(OrderStatus::Pending)).with_metrics(Some(metrics.clone()));
        subject.attach(RecordingObserver::named("ok"));

        subject.notify().unwrap();

        assert_eq!(
            metrics
                .observer_notifications
                .with_label_values(&["ok", "success"])
                .get(),
            1
        );
    }
}
