use crate::observer::ObserverError;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order {0} not found")]
    NotFound(String),

    #[error("Cannot cancel delivered order {0}")]
    CannotCancelDelivered(String),

    #[error("Order {0} is already cancelled")]
    AlreadyCancelled(String),

    #[error("Order {0} is not cancelled")]
    NotCancelled(String),

    #[error("Cannot modify cancelled order {0}")]
    CannotModifyCancelled(String),

    #[error("Cannot modify delivered order {0}")]
    CannotModifyDelivered(String),

    #[error("Invalid customer details: {0}")]
    InvalidCustomer(String),

    #[error("Observer notification failed for order {order_id}: {source}")]
    Notification {
        order_id: String,
        #[source]
        source: ObserverError,
    },
}
