use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{MutexGuard, PoisonError};
use uuid::Uuid;

use super::manager::{OrderManager, SharedOrderManager};
use super::value_objects::OrderStatus;
use crate::models::Bouquet;

// ============================================================================
// Order Commands - reversible operations on the order manager
// ============================================================================
//
// Each command captures its arguments at construction and the state it needs
// for undo at execution. Receiver errors never escape: they become a failure
// `CommandOutcome` and leave the command with nothing to undo.
//
// ============================================================================

/// Result of executing or undoing a command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    message: String,
    succeeded: bool,
}

impl CommandOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            succeeded: true,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            succeeded: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.succeeded
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub trait Command {
    fn execute(&mut self) -> CommandOutcome;

    /// Reverse the last successful execute. Succeeds at most once per execute.
    fn undo(&mut self) -> CommandOutcome;

    fn description(&self) -> String;

    fn timestamp(&self) -> DateTime<Utc>;

    fn can_undo(&self) -> bool;
}

fn lock(receiver: &SharedOrderManager) -> MutexGuard<'_, OrderManager> {
    receiver.lock().unwrap_or_else(PoisonError::into_inner)
}

// ----------------------------------------------------------------------------
// Place
// ----------------------------------------------------------------------------

pub struct PlaceOrderCommand {
    command_id: Uuid,
    receiver: SharedOrderManager,
    bouquet: Bouquet,
    customer_name: String,
    customer_email: String,
    timestamp: DateTime<Utc>,
    placed_order_id: Option<String>,
}

impl PlaceOrderCommand {
    pub fn new(
        receiver: SharedOrderManager,
        bouquet: Bouquet,
        customer_name: impl Into<String>,
        customer_email: impl Into<String>,
    ) -> Self {
        Self {
            command_id: Uuid::new_v4(),
            receiver,
            bouquet,
            customer_name: customer_name.into(),
            customer_email: customer_email.into(),
            timestamp: Utc::now(),
            placed_order_id: None,
        }
    }

    /// Id of the order created by the last successful execute, until undone
    pub fn executed_order_id(&self) -> Option<&str> {
        self.placed_order_id.as_deref()
    }
}

impl Command for PlaceOrderCommand {
    fn execute(&mut self) -> CommandOutcome {
        let mut manager = lock(&self.receiver);

        let placed = manager
            .place_order(&self.bouquet, &self.customer_name, &self.customer_email)
            .map(|order| (order.order_id.clone(), order.total_price));

        match placed {
            Ok((order_id, total)) => {
                tracing::info!(command_id = %self.command_id, order_id = %order_id, "Place command executed");
                let message = format!(
                    "Order {} placed successfully! Bouquet: {}, Total: {}",
                    order_id,
                    self.bouquet.name,
                    manager.config().format_price(total)
                );
                self.placed_order_id = Some(order_id);
                CommandOutcome::success(message)
            }
            Err(e) => {
                tracing::warn!(command_id = %self.command_id, error = %e, "Place command failed");
                self.placed_order_id = None;
                CommandOutcome::failure(format!("Failed to place order: {e}"))
            }
        }
    }

    /// Cancels the placed order. The order stays in the manager as cancelled.
    fn undo(&mut self) -> CommandOutcome {
        let Some(order_id) = self.placed_order_id.clone() else {
            return CommandOutcome::failure("Cannot undo: Order was not successfully placed");
        };

        let result = lock(&self.receiver).cancel_order(&order_id).map(|_| ());
        match result {
            Ok(()) => {
                self.placed_order_id = None;
                CommandOutcome::success(format!("Order {order_id} cancelled (undo)"))
            }
            Err(e) => CommandOutcome::failure(format!("Failed to undo order: {e}")),
        }
    }

    fn description(&self) -> String {
        format!("Place Order: {} for {}", self.bouquet.name, self.customer_name)
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn can_undo(&self) -> bool {
        self.placed_order_id.is_some()
    }
}

// ----------------------------------------------------------------------------
// Cancel
// ----------------------------------------------------------------------------

pub struct CancelOrderCommand {
    command_id: Uuid,
    receiver: SharedOrderManager,
    order_id: String,
    timestamp: DateTime<Utc>,
    previous_status: Option<OrderStatus>,
}

impl CancelOrderCommand {
    pub fn new(receiver: SharedOrderManager, order_id: impl Into<String>) -> Self {
        Self {
            command_id: Uuid::new_v4(),
            receiver,
            order_id: order_id.into(),
            timestamp: Utc::now(),
            previous_status: None,
        }
    }
}

impl Command for CancelOrderCommand {
    fn execute(&mut self) -> CommandOutcome {
        self.previous_status = None;
        let mut manager = lock(&self.receiver);

        let Some(status) = manager.get_order(&self.order_id).map(|o| o.status) else {
            tracing::warn!(command_id = %self.command_id, order_id = %self.order_id, "Cancel target not found");
            return CommandOutcome::failure(format!(
                "Failed to cancel: Order {} not found",
                self.order_id
            ));
        };

        match manager.cancel_order(&self.order_id) {
            Ok(_) => {
                self.previous_status = Some(status);
                tracing::info!(command_id = %self.command_id, order_id = %self.order_id, "Cancel command executed");
                CommandOutcome::success(format!("Order {} cancelled successfully", self.order_id))
            }
            Err(e) => {
                tracing::warn!(command_id = %self.command_id, error = %e, "Cancel command failed");
                CommandOutcome::failure(format!("Failed to cancel order: {e}"))
            }
        }
    }

    fn undo(&mut self) -> CommandOutcome {
        let Some(previous) = self.previous_status else {
            return CommandOutcome::failure("Cannot undo: Order was not successfully cancelled");
        };

        let result = lock(&self.receiver)
            .restore_order(&self.order_id, previous)
            .map(|_| ());
        match result {
            Ok(()) => {
                self.previous_status = None;
                CommandOutcome::success(format!(
                    "Order {} restored to {} status (undo)",
                    self.order_id, previous
                ))
            }
            Err(e) => CommandOutcome::failure(format!("Failed to undo cancellation: {e}")),
        }
    }

    fn description(&self) -> String {
        format!("Cancel Order: {}", self.order_id)
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn can_undo(&self) -> bool {
        self.previous_status.is_some()
    }
}

// ----------------------------------------------------------------------------
// Modify
// ----------------------------------------------------------------------------

pub struct ModifyOrderCommand {
    command_id: Uuid,
    receiver: SharedOrderManager,
    order_id: String,
    new_status: OrderStatus,
    timestamp: DateTime<Utc>,
    previous_status: Option<OrderStatus>,
}

impl ModifyOrderCommand {
    pub fn new(
        receiver: SharedOrderManager,
        order_id: impl Into<String>,
        new_status: OrderStatus,
    ) -> Self {
        Self {
            command_id: Uuid::new_v4(),
            receiver,
            order_id: order_id.into(),
            new_status,
            timestamp: Utc::now(),
            previous_status: None,
        }
    }
}

impl Command for ModifyOrderCommand {
    fn execute(&mut self) -> CommandOutcome {
        self.previous_status = None;
        let mut manager = lock(&self.receiver);

        let Some(status) = manager.get_order(&self.order_id).map(|o| o.status) else {
            tracing::warn!(command_id = %self.command_id, order_id = %self.order_id, "Modify target not found");
            return CommandOutcome::failure(format!(
                "Failed to modify: Order {} not found",
                self.order_id
            ));
        };

        match manager.modify_order_status(&self.order_id, self.new_status) {
            Ok(_) => {
                self.previous_status = Some(status);
                tracing::info!(
                    command_id = %self.command_id,
                    order_id = %self.order_id,
                    to = %self.new_status,
                    "Modify command executed"
                );
                CommandOutcome::success(format!(
                    "Order {} status updated to {}",
                    self.order_id, self.new_status
                ))
            }
            Err(e) => {
                tracing::warn!(command_id = %self.command_id, error = %e, "Modify command failed");
                CommandOutcome::failure(format!("Failed to modify order: {e}"))
            }
        }
    }

    fn undo(&mut self) -> CommandOutcome {
        let Some(previous) = self.previous_status else {
            return CommandOutcome::failure("Cannot undo: Order was not successfully modified");
        };

        let result = lock(&self.receiver)
            .modify_order_status(&self.order_id, previous)
            .map(|_| ());
        match result {
            Ok(()) => {
                self.previous_status = None;
                CommandOutcome::success(format!(
                    "Order {} reverted to {} status (undo)",
                    self.order_id, previous
                ))
            }
            Err(e) => CommandOutcome::failure(format!("Failed to undo modification: {e}")),
        }
    }

    fn description(&self) -> String {
        format!("Modify Order: {} → {}", self.order_id, self.new_status)
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn can_undo(&self) -> bool {
        self.previous_status.is_some()
    }
}

// ----------------------------------------------------------------------------
// Dispatch
// ----------------------------------------------------------------------------

pub enum OrderCommand {
    Place(PlaceOrderCommand),
    Cancel(CancelOrderCommand),
    Modify(ModifyOrderCommand),
}

impl OrderCommand {
    pub fn place(
        receiver: SharedOrderManager,
        bouquet: Bouquet,
        customer_name: impl Into<String>,
        customer_email: impl Into<String>,
    ) -> Self {
        Self::Place(PlaceOrderCommand::new(receiver, bouquet, customer_name, customer_email))
    }

    pub fn cancel(receiver: SharedOrderManager, order_id: impl Into<String>) -> Self {
        Self::Cancel(CancelOrderCommand::new(receiver, order_id))
    }

    pub fn modify(
        receiver: SharedOrderManager,
        order_id: impl Into<String>,
        new_status: OrderStatus,
    ) -> Self {
        Self::Modify(ModifyOrderCommand::new(receiver, order_id, new_status))
    }

    /// Metric and log label
    pub fn kind(&self) -> &'static str {
        match self {
            OrderCommand::Place(_) => "place_order",
            OrderCommand::Cancel(_) => "cancel_order",
            OrderCommand::Modify(_) => "modify_order",
        }
    }

    pub fn command_id(&self) -> Uuid {
        match self {
            OrderCommand::Place(c) => c.command_id,
            OrderCommand::Cancel(c) => c.command_id,
            OrderCommand::Modify(c) => c.command_id,
        }
    }
}

impl Command for OrderCommand {
    fn execute(&mut self) -> CommandOutcome {
        match self {
            OrderCommand::Place(c) => c.execute(),
            OrderCommand::Cancel(c) => c.execute(),
            OrderCommand::Modify(c) => c.execute(),
        }
    }

    fn undo(&mut self) -> CommandOutcome {
        match self {
            OrderCommand::Place(c) => c.undo(),
            OrderCommand::Cancel(c) => c.undo(),
            OrderCommand::Modify(c) => c.undo(),
        }
    }

    fn description(&self) -> String {
        match self {
            OrderCommand::Place(c) => c.description(),
            OrderCommand::Cancel(c) => c.description(),
            OrderCommand::Modify(c) => c.description(),
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            OrderCommand::Place(c) => c.timestamp(),
            OrderCommand::Cancel(c) => c.timestamp(),
            OrderCommand::Modify(c) => c.timestamp(),
        }
    }

    fn can_undo(&self) -> bool {
        match self {
            OrderCommand::Place(c) => c.can_undo(),
            OrderCommand::Cancel(c) => c.can_undo(),
            OrderCommand::Modify(c) => c.can_undo(),
        }
    }
}

impl From<PlaceOrderCommand> for OrderCommand {
    fn from(command: PlaceOrderCommand) -> Self {
        Self::Place(command)
    }
}

impl From<CancelOrderCommand> for OrderCommand {
    fn from(command: CancelOrderCommand) -> Self {
        Self::Cancel(command)
    }
}

impl From<ModifyOrderCommand> for OrderCommand {
    fn from(command: ModifyOrderCommand) -> Self {
        Self::Modify(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::red_roses;

    fn receiver() -> SharedOrderManager {
        OrderManager::default().shared()
    }

    fn status_of(receiver: &SharedOrderManager, order_id: &str) -> OrderStatus {
        receiver.lock().unwrap().get_order(order_id).unwrap().status
    }

    fn placed(receiver: &SharedOrderManager) -> String {
        receiver
            .lock()
            .unwrap()
            .place_order(&red_roses(), "Alice", "alice@example.com")
            .unwrap()
            .order_id
            .clone()
    }

    #[test]
    fn test_place_execute_and_undo() {
        let receiver = receiver();
        let mut command = PlaceOrderCommand::new(
            receiver.clone(),
            red_roses(),
            "Alice Johnson",
            "alice@example.com",
        );

        let outcome = command.execute();
        assert!(outcome.is_success());
        assert_eq!(
            outcome.message(),
            "Order ORD-000001 placed successfully! Bouquet: Red Romance, Total: 42.00 €"
        );
        assert_eq!(command.executed_order_id(), Some("ORD-000001"));
        assert!(command.can_undo());

        let undone = command.undo();
        assert!(undone.is_success());
        assert_eq!(undone.message(), "Order ORD-000001 cancelled (undo)");
        assert_eq!(status_of(&receiver, "ORD-000001"), OrderStatus::Cancelled);
        assert!(!command.can_undo());
    }

    #[test]
    fn test_undo_succeeds_exactly_once() {
        let receiver = receiver();
        let mut command = OrderCommand::place(receiver, red_roses(), "Alice", "alice@example.com");

        command.execute();
        assert!(command.undo().is_success());

        let second = command.undo();
        assert!(!second.is_success());
        assert_eq!(second.message(), "Cannot undo: Order was not successfully placed");
    }

    #[test]
    fn test_place_failure_is_an_outcome() {
        let receiver = receiver();
        let mut command = OrderCommand::place(receiver.clone(), red_roses(), "", "alice@example.com");

        let outcome = command.execute();

        assert!(!outcome.is_success());
        assert!(outcome.message().starts_with("Failed to place order: "));
        assert!(!command.can_undo());
        assert_eq!(receiver.lock().unwrap().order_count(), 0);
    }

    #[test]
    fn test_cancel_snapshot_and_restore() {
        let receiver = receiver();
        let order_id = placed(&receiver);
        receiver
            .lock()
            .unwrap()
            .modify_order_status(&order_id, OrderStatus::Preparing)
            .unwrap();

        let mut command = CancelOrderCommand::new(receiver.clone(), order_id.clone());
        assert_eq!(command.execute().message(), "Order ORD-000001 cancelled successfully");
        assert_eq!(status_of(&receiver, &order_id), OrderStatus::Cancelled);

        let undone = command.undo();
        assert_eq!(undone.message(), "Order ORD-000001 restored to preparing status (undo)");
        assert_eq!(status_of(&receiver, &order_id), OrderStatus::Preparing);
    }

    #[test]
    fn test_cancel_unknown_order() {
        let mut command = CancelOrderCommand::new(receiver(), "ORD-999999");

        let outcome = command.execute();

        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), "Failed to cancel: Order ORD-999999 not found");
        assert!(!command.can_undo());
        assert_eq!(
            command.undo().message(),
            "Cannot undo: Order was not successfully cancelled"
        );
    }

    #[test]
    fn test_cancel_rejected_by_receiver() {
        let receiver = receiver();
        let order_id = placed(&receiver);
        receiver.lock().unwrap().cancel_order(&order_id).unwrap();

        let mut command = CancelOrderCommand::new(receiver, order_id);
        let outcome = command.execute();

        assert_eq!(
            outcome.message(),
            "Failed to cancel order: Order ORD-000001 is already cancelled"
        );
        assert!(!command.can_undo());
    }

    #[test]
    fn test_modify_and_revert() {
        let receiver = receiver();
        let order_id = placed(&receiver);

        let mut command = ModifyOrderCommand::new(receiver.clone(), order_id.clone(), OrderStatus::Ready);
        assert_eq!(command.description(), "Modify Order: ORD-000001 → ready");
        assert_eq!(command.execute().message(), "Order ORD-000001 status updated to ready");
        assert_eq!(status_of(&receiver, &order_id), OrderStatus::Ready);

        assert_eq!(
            command.undo().message(),
            "Order ORD-000001 reverted to confirmed status (undo)"
        );
        assert_eq!(status_of(&receiver, &order_id), OrderStatus::Confirmed);
        assert!(!command.can_undo());
    }

    #[test]
    fn test_undo_failure_keeps_undo_state() {
        let receiver = receiver();
        let order_id = placed(&receiver);

        let mut command = ModifyOrderCommand::new(receiver.clone(), order_id.clone(), OrderStatus::Ready);
        command.execute();
        receiver.lock().unwrap().cancel_order(&order_id).unwrap();

        let undone = command.undo();
        assert_eq!(
            undone.message(),
            "Failed to undo modification: Cannot modify cancelled order ORD-000001"
        );
        assert!(command.can_undo());
    }

    #[test]
    fn test_redo_reexecutes_with_new_id() {
        let receiver = receiver();
        let mut command = PlaceOrderCommand::new(receiver.clone(), red_roses(), "Alice", "alice@example.com");

        command.execute();
        command.undo();
        command.execute();

        assert_eq!(command.executed_order_id(), Some("ORD-000002"));
        assert_eq!(receiver.lock().unwrap().order_count(), 2);
    }

    #[test]
    fn test_dispatch_labels() {
        let receiver = receiver();
        let place = OrderCommand::place(receiver.clone(), red_roses(), "Alice", "a@b.com");
        let cancel = OrderCommand::from(CancelOrderCommand::new(receiver.clone(), "ORD-000001"));
        let modify = OrderCommand::modify(receiver, "ORD-000001", OrderStatus::Ready);

        assert_eq!(place.kind(), "place_order");
        assert_eq!(place.description(), "Place Order: Red Romance for Alice");
        assert_eq!(cancel.kind(), "cancel_order");
        assert_eq!(cancel.description(), "Cancel Order: ORD-000001");
        assert_eq!(modify.kind(), "modify_order");
        assert_ne!(place.command_id(), cancel.command_id());
    }
}
