use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::errors::OrderError;
use super::value_objects::{OrderData, OrderStatus};
use crate::config::ShopConfig;
use crate::metrics::Metrics;
use crate::models::Bouquet;
use crate::observer::{OrderObserver, OrderSubject};

// ============================================================================
// Order Manager - receiver for order commands
// ============================================================================
//
// Owns the authoritative order map. Every mutation is guarded: an illegal
// request fails with a descriptive `OrderError` instead of being ignored.
// Status changes are pushed to the order's subject, which notifies its
// observers before the call returns.
//
// ============================================================================

/// Handle commands hold on their receiver
pub type SharedOrderManager = Arc<Mutex<OrderManager>>;

#[derive(Debug)]
pub struct OrderRecord {
    pub order_id: String,
    /// Independent copy taken at placement
    pub bouquet: Bouquet,
    pub customer_name: String,
    pub customer_email: String,
    pub total_price: f64,
    pub status: OrderStatus,
    pub subject: OrderSubject,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct OrderManager {
    orders: BTreeMap<String, OrderRecord>,
    next_sequence: u64,
    config: ShopConfig,
    metrics: Option<Arc<Metrics>>,
}

impl Default for OrderManager {
    fn default() -> Self {
        Self::new(ShopConfig::default())
    }
}

impl OrderManager {
    pub fn new(config: ShopConfig) -> Self {
        Self {
            orders: BTreeMap::new(),
            next_sequence: 1,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Wrap in the shared handle commands are built with
    pub fn shared(self) -> SharedOrderManager {
        Arc::new(Mutex::new(self))
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    fn validate_customer(name: &str, email: &str) -> Result<(), OrderError> {
        if name.trim().is_empty() {
            return Err(OrderError::InvalidCustomer("name cannot be empty".to_string()));
        }
        if email.trim().is_empty() {
            return Err(OrderError::InvalidCustomer("email cannot be empty".to_string()));
        }
        if !email.contains('@') {
            return Err(OrderError::InvalidCustomer(format!("invalid email format: {email}")));
        }
        Ok(())
    }

    fn record_mut(&mut self, order_id: &str) -> Result<&mut OrderRecord, OrderError> {
        self.orders
            .get_mut(order_id)
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))
    }

    /// Apply a status on an already-guarded record and broadcast it.
    ///
    /// The record keeps the new status even if an observer fails.
    fn transition(
        record: &mut OrderRecord,
        status: OrderStatus,
        metrics: Option<&Metrics>,
    ) -> Result<(), OrderError> {
        let previous = record.status;
        record.status = status;
        record.updated_at = Utc::now();

        if let Some(metrics) = metrics {
            metrics.record_transition(previous.as_str(), status.as_str());
        }

        tracing::info!(
            order_id = %record.order_id,
            from = %previous,
            to = %status,
            "Order status changed"
        );

        record
            .subject
            .update_status(status)
            .map_err(|source| OrderError::Notification {
                order_id: record.order_id.clone(),
                source,
            })
    }

    pub fn place_order(
        &mut self,
        bouquet: &Bouquet,
        customer_name: &str,
        customer_email: &str,
    ) -> Result<&OrderRecord, OrderError> {
        Self::validate_customer(customer_name, customer_email)?;

        let order_id = format!("ORD-{:06}", self.next_sequence);
        self.next_sequence += 1;

        let now = Utc::now();
        let total_price = bouquet.estimate();

        let subject = OrderSubject::new(OrderData {
            order_id: order_id.clone(),
            bouquet_name: bouquet.name.clone(),
            customer_name: customer_name.to_string(),
            total_price,
            status: OrderStatus::Confirmed,
            timestamp: now,
        })
        .with_metrics(self.metrics.clone());

        let record = OrderRecord {
            order_id: order_id.clone(),
            bouquet: bouquet.clone(),
            customer_name: customer_name.to_string(),
            customer_email: customer_email.to_string(),
            total_price,
            status: OrderStatus::Confirmed,
            subject,
            created_at: now,
            updated_at: now,
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_order_placed();
        }

        tracing::info!(
            order_id = %order_id,
            bouquet = %bouquet.name,
            customer = %customer_name,
            total = total_price,
            "✅ Order placed"
        );

        Ok(self.orders.entry(order_id).or_insert(record))
    }

    pub fn cancel_order(&mut self, order_id: &str) -> Result<&OrderRecord, OrderError> {
        let metrics = self.metrics.clone();
        let record = self.record_mut(order_id)?;

        match record.status {
            OrderStatus::Delivered => {
                return Err(OrderError::CannotCancelDelivered(order_id.to_string()))
            }
            OrderStatus::Cancelled => {
                return Err(OrderError::AlreadyCancelled(order_id.to_string()))
            }
            _ => {}
        }

        Self::transition(record, OrderStatus::Cancelled, metrics.as_deref())?;
        Ok(record)
    }

    /// Bring a cancelled order back to the status it had before cancellation
    pub fn restore_order(
        &mut self,
        order_id: &str,
        previous_status: OrderStatus,
    ) -> Result<&OrderRecord, OrderError> {
        let metrics = self.metrics.clone();
        let record = self.record_mut(order_id)?;

        if record.status != OrderStatus::Cancelled {
            return Err(OrderError::NotCancelled(order_id.to_string()));
        }

        Self::transition(record, previous_status, metrics.as_deref())?;
        Ok(record)
    }

    /// Set any status on a non-terminal order. No adjacency check is made:
    /// `pending` may jump straight to `out_for_delivery`.
    pub fn modify_order_status(
        &mut self,
        order_id: &str,
        new_status: OrderStatus,
    ) -> Result<&OrderRecord, OrderError> {
        let metrics = self.metrics.clone();
        let record = self.record_mut(order_id)?;

        match record.status {
            OrderStatus::Cancelled => {
                return Err(OrderError::CannotModifyCancelled(order_id.to_string()))
            }
            OrderStatus::Delivered => {
                return Err(OrderError::CannotModifyDelivered(order_id.to_string()))
            }
            _ => {}
        }

        Self::transition(record, new_status, metrics.as_deref())?;
        Ok(record)
    }

    pub fn remove_order(&mut self, order_id: &str) -> Result<OrderRecord, OrderError> {
        let record = self
            .orders
            .remove(order_id)
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;

        tracing::info!(order_id = %order_id, "Order removed");
        Ok(record)
    }

    pub fn attach_observer(
        &mut self,
        order_id: &str,
        observer: Arc<dyn OrderObserver>,
    ) -> Result<bool, OrderError> {
        Ok(self.record_mut(order_id)?.subject.attach(observer))
    }

    pub fn detach_observer(
        &mut self,
        order_id: &str,
        observer: &Arc<dyn OrderObserver>,
    ) -> Result<bool, OrderError> {
        Ok(self.record_mut(order_id)?.subject.detach(observer))
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn get_order(&self, order_id: &str) -> Option<&OrderRecord> {
        self.orders.get(order_id)
    }

    /// All orders in placement order
    pub fn get_all_orders(&self) -> Vec<&OrderRecord> {
        self.orders.values().collect()
    }

    pub fn get_orders_by_status(&self, status: OrderStatus) -> Vec<&OrderRecord> {
        self.orders.values().filter(|o| o.status == status).collect()
    }

    /// Orders for a customer email, compared case-insensitively
    pub fn get_orders_by_customer(&self, customer_email: &str) -> Vec<&OrderRecord> {
        let wanted = customer_email.to_lowercase();
        self.orders
            .values()
            .filter(|o| o.customer_email.to_lowercase() == wanted)
            .collect()
    }

    /// Sum of totals over every order that is not cancelled
    pub fn total_revenue(&self) -> f64 {
        self.orders
            .values()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .map(|o| o.total_price)
            .sum()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Drop every order and restart numbering at ORD-000001
    pub fn clear_all_orders(&mut self) {
        self.orders.clear();
        self.next_sequence = 1;
        tracing::info!("All orders cleared");
    }
}
