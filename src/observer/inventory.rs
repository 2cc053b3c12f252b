use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use super::subject::{ObserverError, OrderObserver};
use crate::domain::order::{OrderData, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryAction {
    Reserve,
    Release,
    ConfirmUsage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryEntry {
    pub order_id: String,
    pub bouquet_name: String,
    pub action: InventoryAction,
}

/// Reserves stock on confirmation, releases it on cancellation and confirms
/// usage on delivery.
///
/// Stock counters are seeded but not adjusted: the observer only sees the
/// bouquet name, not its flower lines.
pub struct InventoryObserver {
    stock: BTreeMap<String, u32>,
    journal: Mutex<Vec<InventoryEntry>>,
}

impl Default for InventoryObserver {
    fn default() -> Self {
        let stock = [("Rose", 100), ("Tulip", 80), ("Lily", 60), ("Orchid", 40)]
            .into_iter()
            .map(|(kind, qty)| (kind.to_string(), qty))
            .collect();

        Self {
            stock,
            journal: Mutex::new(Vec::new()),
        }
    }
}

impl InventoryObserver {
    pub fn inventory_status(&self) -> BTreeMap<String, u32> {
        self.stock.clone()
    }

    /// Actions taken so far, oldest first
    pub fn journal(&self) -> Vec<InventoryEntry> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OrderObserver for InventoryObserver {
    fn name(&self) -> &str {
        "InventoryObserver"
    }

    fn update(&self, order: &OrderData) -> Result<(), ObserverError> {
        let action = match order.status {
            OrderStatus::Confirmed => InventoryAction::Reserve,
            OrderStatus::Cancelled => InventoryAction::Release,
            OrderStatus::Delivered => InventoryAction::ConfirmUsage,
            _ => return Ok(()),
        };

        tracing::info!(
            order_id = %order.order_id,
            bouquet = %order.bouquet_name,
            action = ?action,
            "📦 Inventory updated"
        );

        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(InventoryEntry {
                order_id: order.order_id.clone(),
                bouquet_name: order.bouquet_name.clone(),
                action,
            });

        Ok(())
    }
}
