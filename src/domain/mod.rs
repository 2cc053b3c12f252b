// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// - order/    - order lifecycle, commands and undo/redo history
// - delivery/ - interchangeable delivery pricing strategies
//
// Notification fan-out lives in `crate::observer`; the order domain only
// hands snapshots to an order's subject.
//
// ============================================================================

pub mod order;
pub mod delivery;
