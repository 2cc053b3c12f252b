use std::sync::Arc;

use serde::Serialize;

use super::errors::DeliveryError;
use super::strategies::{DeliveryDetails, DeliveryStrategy};
use crate::metrics::Metrics;

// ============================================================================
// Delivery Context
// ============================================================================
//
// Holds the active strategy and delegates to it. Strategy errors (for example
// same-day out of range) are returned to the caller untouched.
//
// ============================================================================

/// One row of a side-by-side strategy comparison
#[derive(Debug, Clone, Serialize)]
pub struct StrategyComparison {
    pub strategy: String,
    pub outcome: Result<DeliveryDetails, String>,
}

pub struct DeliveryContext {
    strategy: Box<dyn DeliveryStrategy>,
    metrics: Option<Arc<Metrics>>,
}

impl DeliveryContext {
    pub fn new(strategy: Box<dyn DeliveryStrategy>) -> Self {
        Self {
            strategy,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Swap the active strategy at runtime
    pub fn set_strategy(&mut self, strategy: Box<dyn DeliveryStrategy>) {
        tracing::info!(
            from = self.strategy.name(),
            to = strategy.name(),
            "Switching delivery strategy"
        );
        self.strategy = strategy;
    }

    pub fn strategy(&self) -> &dyn DeliveryStrategy {
        self.strategy.as_ref()
    }

    pub fn calculate_delivery_cost(
        &self,
        distance_km: f64,
        order_value: f64,
    ) -> Result<f64, DeliveryError> {
        let result = self.strategy.calculate_cost(distance_km, order_value);
        self.record(&result);

        match &result {
            Ok(cost) => tracing::debug!(
                strategy = self.strategy.name(),
                distance_km,
                order_value,
                cost,
                "Calculated delivery cost"
            ),
            Err(e) => tracing::warn!(
                strategy = self.strategy.name(),
                distance_km,
                error = %e,
                "Delivery cost calculation rejected"
            ),
        }

        result
    }

    pub fn delivery_details(
        &self,
        distance_km: f64,
        order_value: f64,
    ) -> Result<DeliveryDetails, DeliveryError> {
        let result = self.strategy.delivery_details(distance_km, order_value);
        self.record(&result);

        if let Err(e) = &result {
            tracing::warn!(
                strategy = self.strategy.name(),
                distance_km,
                error = %e,
                "Delivery details rejected"
            );
        }

        result
    }

    fn record<T>(&self, result: &Result<T, DeliveryError>) {
        if let Some(metrics) = &self.metrics {
            metrics.record_delivery_quote(self.strategy.name(), result.is_ok());
        }
    }

    /// Quote every strategy against the same inputs.
    ///
    /// A failing strategy contributes its error message; the batch always
    /// covers every strategy.
    pub fn compare_strategies(
        strategies: &[&dyn DeliveryStrategy],
        distance_km: f64,
        order_value: f64,
    ) -> Vec<StrategyComparison> {
        strategies
            .iter()
            .map(|strategy| StrategyComparison {
                strategy: strategy.name().to_string(),
                outcome: strategy
                    .delivery_details(distance_km, order_value)
                    .map_err(|e| e.to_string()),
            })
            .collect()
    }
}
