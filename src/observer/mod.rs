// ============================================================================
// Observer - order status broadcast
// ============================================================================
//
// - subject/   - OrderSubject and the OrderObserver trait
// - customer/  - customer notifications (email, SMS, UI toast)
// - inventory/ - stock reservation journal
// - delivery/  - dispatch queue
//
// Observers share no state and do not depend on each other.
//
// ============================================================================

pub mod subject;
pub mod customer;
pub mod inventory;
pub mod delivery;

pub use subject::{ObserverError, OrderObserver, OrderSubject};
pub use customer::{CustomerContact, CustomerObserver};
pub use inventory::{InventoryAction, InventoryEntry, InventoryObserver};
pub use delivery::DeliveryObserver;
