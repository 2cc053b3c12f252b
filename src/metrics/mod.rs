use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

// ============================================================================
// Metrics Module - Prometheus metrics for the order core
// ============================================================================
//
// Provides metrics for:
// - Order placement and status transitions
// - Command execution and undo/redo history
// - Observer fan-out outcomes
// - Delivery quotes per strategy
//
// Nothing is served over HTTP; `render()` produces the text exposition format
// for whoever wants to print or ship it.
// ============================================================================

/// Central metrics registry shared by the manager, invoker and subjects
pub struct Metrics {
    registry: Registry,

    // Order Metrics
    pub orders_placed: IntCounter,
    pub status_transitions: IntCounterVec,

    // Command Metrics
    pub commands_executed: IntCounterVec,
    pub history_operations: IntCounterVec,
    pub history_size: IntGauge,

    // Observer Metrics
    pub observer_notifications: IntCounterVec,

    // Delivery Metrics
    pub delivery_quotes: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Order Metrics
        let orders_placed = IntCounter::new("orders_placed_total", "Total orders placed")?;
        registry.register(Box::new(orders_placed.clone()))?;

        let status_transitions = IntCounterVec::new(
            Opts::new("order_status_transitions_total", "Order status transitions"),
            &["from", "to"],
        )?;
        registry.register(Box::new(status_transitions.clone()))?;

        // Command Metrics
        let commands_executed = IntCounterVec::new(
            Opts::new("commands_executed_total", "Commands executed through the invoker"),
            &["command", "outcome"],
        )?;
        registry.register(Box::new(commands_executed.clone()))?;

        let history_operations = IntCounterVec::new(
            Opts::new("command_history_operations_total", "Undo and redo requests"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(history_operations.clone()))?;

        let history_size = IntGauge::new(
            "command_history_size",
            "Number of commands currently held in the history",
        )?;
        registry.register(Box::new(history_size.clone()))?;

        // Observer Metrics
        let observer_notifications = IntCounterVec::new(
            Opts::new("observer_notifications_total", "Observer update calls"),
            &["observer", "outcome"],
        )?;
        registry.register(Box::new(observer_notifications.clone()))?;

        // Delivery Metrics
        let delivery_quotes = IntCounterVec::new(
            Opts::new("delivery_quotes_total", "Delivery cost calculations"),
            &["strategy", "outcome"],
        )?;
        registry.register(Box::new(delivery_quotes.clone()))?;

        Ok(Self {
            registry,
            orders_placed,
            status_transitions,
            commands_executed,
            history_operations,
            history_size,
            observer_notifications,
            delivery_quotes,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_placed(&self) {
        self.orders_placed.inc();
    }

    pub fn record_transition(&self, from: &str, to: &str) {
        self.status_transitions.with_label_values(&[from, to]).inc();
    }

    pub fn record_command(&self, command: &str, success: bool) {
        self.commands_executed
            .with_label_values(&[command, outcome_label(success)])
            .inc();
    }

    pub fn record_history_operation(&self, operation: &str, success: bool) {
        self.history_operations
            .with_label_values(&[operation, outcome_label(success)])
            .inc();
    }

    pub fn set_history_size(&self, size: usize) {
        self.history_size.set(size as i64);
    }

    pub fn record_notification(&self, observer: &str, success: bool) {
        self.observer_notifications
            .with_label_values(&[observer, outcome_label(success)])
            .inc();
    }

    pub fn record_delivery_quote(&self, strategy: &str, success: bool) {
        self.delivery_quotes
            .with_label_values(&[strategy, outcome_label(success)])
            .inc();
    }

    /// Encode every registered metric in the Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn outcome_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}
