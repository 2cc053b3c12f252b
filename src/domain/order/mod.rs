// ============================================================================
// Order Domain - lifecycle, receiver and command history
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderStatus, OrderData, OrderDataPatch)
// - Errors (OrderError enum)
// - Manager (OrderManager, the receiver every command acts on)
// - Commands (Place / Cancel / Modify, dispatched through OrderCommand)
// - Invoker (OrderInvoker with bounded undo/redo history)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod manager;
pub mod commands;
pub mod invoker;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
pub use manager::*;
pub use commands::*;
pub use invoker::*;
