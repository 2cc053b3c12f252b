// ============================================================================
// Delivery Domain - Interchangeable delivery cost calculators
// ============================================================================
//
// This module contains:
// - Errors (DeliveryError enum)
// - Strategies (Standard, Express, Same-Day, Pickup + DeliveryMethod catalogue)
// - Context (DeliveryContext holding the active strategy)
//
// Strategies are pure and share nothing with the order lifecycle; callers
// consult them before placing an order.
//
// ============================================================================

pub mod errors;
pub mod strategies;
pub mod context;

// Re-export for convenience
pub use errors::*;
pub use strategies::*;
pub use context::*;
