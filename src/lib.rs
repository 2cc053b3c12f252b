// ============================================================================
// Bloomify Orders - order lifecycle core for a flower shop
// ============================================================================
//
// - config    - explicit shop configuration (currency, locale, history cap)
// - models    - bouquets and their price estimate
// - domain    - order manager, commands, invoker, delivery strategies
// - observer  - per-order subjects and the customer/inventory/delivery observers
// - messaging - email and SMS notification channels
// - metrics   - Prometheus registry shared by the components above
//
// ============================================================================

pub mod config;
pub mod models;
pub mod domain;
pub mod observer;
pub mod messaging;
pub mod metrics;
