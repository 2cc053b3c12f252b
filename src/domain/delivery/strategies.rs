use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::DeliveryError;
use crate::config::DeliveryPreference;

// ============================================================================
// Delivery Strategies
// ============================================================================

/// Quote returned by every strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub cost: f64,
    pub estimated_time: String,
    pub description: String,
    pub tracking_available: bool,
}

/// Interchangeable delivery pricing algorithm.
///
/// Implementations are stateless, so a single instance can be shared by any
/// number of contexts.
pub trait DeliveryStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn tracking_available(&self) -> bool;

    fn calculate_cost(&self, distance_km: f64, order_value: f64) -> Result<f64, DeliveryError>;

    fn estimated_time(&self, distance_km: f64) -> String;

    fn delivery_details(
        &self,
        distance_km: f64,
        order_value: f64,
    ) -> Result<DeliveryDetails, DeliveryError> {
        Ok(DeliveryDetails {
            cost: self.calculate_cost(distance_km, order_value)?,
            estimated_time: self.estimated_time(distance_km),
            description: self.description().to_string(),
            tracking_available: self.tracking_available(),
        })
    }
}

/// Round to the cent
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn validate_inputs(distance_km: f64, order_value: f64) -> Result<(), DeliveryError> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(DeliveryError::InvalidInput {
            field: "distance",
            value: distance_km,
        });
    }
    if !order_value.is_finite() || order_value < 0.0 {
        return Err(DeliveryError::InvalidInput {
            field: "order value",
            value: order_value,
        });
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// Standard
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDeliveryStrategy;

impl StandardDeliveryStrategy {
    const BASE_COST: f64 = 5.00;
    const COST_PER_KM: f64 = 0.50;
    const FREE_FROM: f64 = 50.0;
}

impl DeliveryStrategy for StandardDeliveryStrategy {
    fn name(&self) -> &'static str {
        "Standard Delivery"
    }

    fn description(&self) -> &'static str {
        "Standard delivery with tracking. Free for orders over $50."
    }

    fn tracking_available(&self) -> bool {
        true
    }

    fn calculate_cost(&self, distance_km: f64, order_value: f64) -> Result<f64, DeliveryError> {
        validate_inputs(distance_km, order_value)?;

        if order_value >= Self::FREE_FROM {
            return Ok(0.0);
        }

        Ok(round_to_cents(Self::BASE_COST + distance_km * Self::COST_PER_KM))
    }

    fn estimated_time(&self, distance_km: f64) -> String {
        if distance_km < 5.0 {
            "2-3 business days".to_string()
        } else if distance_km < 20.0 {
            "3-4 business days".to_string()
        } else {
            "4-5 business days".to_string()
        }
    }
}

// ----------------------------------------------------------------------------
// Express
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressDeliveryStrategy;

impl ExpressDeliveryStrategy {
    const BASE_COST: f64 = 12.00;
    const COST_PER_KM: f64 = 1.00;
    const DISCOUNT_FROM: f64 = 100.0;
    const DISCOUNT_FACTOR: f64 = 0.8;
}

impl DeliveryStrategy for ExpressDeliveryStrategy {
    fn name(&self) -> &'static str {
        "Express Delivery"
    }

    fn description(&self) -> &'static str {
        "Express delivery with priority handling and tracking. 20% off for orders over $100."
    }

    fn tracking_available(&self) -> bool {
        true
    }

    fn calculate_cost(&self, distance_km: f64, order_value: f64) -> Result<f64, DeliveryError> {
        validate_inputs(distance_km, order_value)?;

        // Surcharge first, discount after
        let mut cost = Self::BASE_COST + distance_km * Self::COST_PER_KM;
        if order_value >= Self::DISCOUNT_FROM {
            cost *= Self::DISCOUNT_FACTOR;
        }

        Ok(round_to_cents(cost))
    }

    fn estimated_time(&self, distance_km: f64) -> String {
        if distance_km < 10.0 {
            "Next business day".to_string()
        } else if distance_km < 30.0 {
            "1-2 business days".to_string()
        } else {
            "2 business days".to_string()
        }
    }
}

// ----------------------------------------------------------------------------
// Same-Day
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct SameDayDeliveryStrategy;

impl SameDayDeliveryStrategy {
    const BASE_COST: f64 = 20.00;
    const COST_PER_KM: f64 = 2.00;
    pub const MAX_DISTANCE_KM: f64 = 15.0;
    /// Orders must come in before this local hour
    pub const CUTOFF_HOUR: u32 = 14;

    fn check_range(distance_km: f64) -> Result<(), DeliveryError> {
        if distance_km > Self::MAX_DISTANCE_KM {
            return Err(DeliveryError::SameDayOutOfRange {
                max_km: Self::MAX_DISTANCE_KM,
            });
        }
        Ok(())
    }

    /// Availability text for an order placed at `hour` (0-23, local time)
    pub fn estimated_time_at_hour(&self, hour: u32) -> String {
        if hour < Self::CUTOFF_HOUR {
            "Today by 8 PM".to_string()
        } else {
            "Not available (order before 2 PM for same-day delivery)".to_string()
        }
    }
}

impl DeliveryStrategy for SameDayDeliveryStrategy {
    fn name(&self) -> &'static str {
        "Same-Day Delivery"
    }

    fn description(&self) -> &'static str {
        "Premium same-day delivery. Order before 2 PM for delivery by 8 PM. Available within 15km only."
    }

    fn tracking_available(&self) -> bool {
        true
    }

    fn calculate_cost(&self, distance_km: f64, order_value: f64) -> Result<f64, DeliveryError> {
        validate_inputs(distance_km, order_value)?;
        Self::check_range(distance_km)?;

        // Premium service, no discounts
        Ok(round_to_cents(Self::BASE_COST + distance_km * Self::COST_PER_KM))
    }

    fn estimated_time(&self, _distance_km: f64) -> String {
        self.estimated_time_at_hour(Local::now().hour())
    }

    fn delivery_details(
        &self,
        distance_km: f64,
        order_value: f64,
    ) -> Result<DeliveryDetails, DeliveryError> {
        validate_inputs(distance_km, order_value)?;
        Self::check_range(distance_km)?;

        Ok(DeliveryDetails {
            cost: self.calculate_cost(distance_km, order_value)?,
            estimated_time: self.estimated_time(distance_km),
            description: self.description().to_string(),
            tracking_available: self.tracking_available(),
        })
    }
}

// ----------------------------------------------------------------------------
// Pickup
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct PickupStrategy;

impl DeliveryStrategy for PickupStrategy {
    fn name(&self) -> &'static str {
        "Store Pickup"
    }

    fn description(&self) -> &'static str {
        "Pick up your order at our store. Free and ready in 2 hours."
    }

    fn tracking_available(&self) -> bool {
        false
    }

    fn calculate_cost(&self, distance_km: f64, order_value: f64) -> Result<f64, DeliveryError> {
        validate_inputs(distance_km, order_value)?;
        Ok(0.0)
    }

    fn estimated_time(&self, _distance_km: f64) -> String {
        "Ready in 2 hours".to_string()
    }
}

// ----------------------------------------------------------------------------
// Catalogue
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Standard,
    Express,
    SameDay,
    Pickup,
}

impl DeliveryMethod {
    pub const ALL: [DeliveryMethod; 4] = [
        DeliveryMethod::Standard,
        DeliveryMethod::Express,
        DeliveryMethod::SameDay,
        DeliveryMethod::Pickup,
    ];

    pub fn strategy(self) -> Box<dyn DeliveryStrategy> {
        match self {
            DeliveryMethod::Standard => Box::new(StandardDeliveryStrategy),
            DeliveryMethod::Express => Box::new(ExpressDeliveryStrategy),
            DeliveryMethod::SameDay => Box::new(SameDayDeliveryStrategy),
            DeliveryMethod::Pickup => Box::new(PickupStrategy),
        }
    }
}

/// Default method for a shop's fulfilment preference
impl From<DeliveryPreference> for DeliveryMethod {
    fn from(preference: DeliveryPreference) -> Self {
        match preference {
            DeliveryPreference::Pickup => DeliveryMethod::Pickup,
            DeliveryPreference::Courier => DeliveryMethod::Standard,
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeliveryMethod::Standard => "standard",
            DeliveryMethod::Express => "express",
            DeliveryMethod::SameDay => "same_day",
            DeliveryMethod::Pickup => "pickup",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::ShopConfig;

    #[test]
    fn test_method_from_preference() {
        assert_eq!(DeliveryMethod::from(DeliveryPreference::Pickup), DeliveryMethod::Pickup);
        assert_eq!(DeliveryMethod::from(DeliveryPreference::Courier), DeliveryMethod::Standard);
        assert_eq!(
            DeliveryMethod::from(ShopConfig::default().delivery).strategy().name(),
            StandardDeliveryStrategy.name()
        );
    }

    #[test]
    fn test_standard_cost() {
        let strategy = StandardDeliveryStrategy;
        assert_eq!(strategy.calculate_cost(10.0, 60.0).unwrap(), 0.0);
        assert_eq!(strategy.calculate_cost(10.0, 10.0).unwrap(), 10.0);
        assert_eq!(strategy.calculate_cost(3.0, 49.99).unwrap(), 6.5);
    }

    #[test]
    fn test_standard_time_bands() {
        let strategy = StandardDeliveryStrategy;
        assert_eq!(strategy.estimated_time(4.9), "2-3 business days");
        assert_eq!(strategy.estimated_time(5.0), "3-4 business days");
        assert_eq!(strategy.estimated_time(20.0), "4-5 business days");
    }

    #[test]
    fn test_express_discount_after_surcharge() {
        let strategy = ExpressDeliveryStrategy;
        assert_eq!(strategy.calculate_cost(10.0, 150.0).unwrap(), 17.6);
        assert_eq!(strategy.calculate_cost(10.0, 99.0).unwrap(), 22.0);
        assert_eq!(strategy.calculate_cost(3.3, 100.0).unwrap(), 12.24);
    }

    #[test]
    fn test_express_time_bands() {
        let strategy = ExpressDeliveryStrategy;
        assert_eq!(strategy.estimated_time(9.0), "Next business day");
        assert_eq!(strategy.estimated_time(10.0), "1-2 business days");
        assert_eq!(strategy.estimated_time(30.0), "2 business days");
    }

    #[test]
    fn test_same_day_out_of_range() {
        let strategy = SameDayDeliveryStrategy;
        let err = strategy.calculate_cost(20.0, 10.0).unwrap_err();
        assert_eq!(err, DeliveryError::SameDayOutOfRange { max_km: 15.0 });
        assert_eq!(
            err.to_string(),
            "Same-day delivery not available for distances over 15km"
        );
        assert!(strategy.delivery_details(15.1, 500.0).is_err());
    }

    #[test]
    fn test_same_day_cost_within_range() {
        let strategy = SameDayDeliveryStrategy;
        assert_eq!(strategy.calculate_cost(15.0, 500.0).unwrap(), 50.0);
        assert_eq!(strategy.calculate_cost(12.0, 75.0).unwrap(), 44.0);
    }

    #[test]
    fn test_same_day_cutoff() {
        let strategy = SameDayDeliveryStrategy;
        assert_eq!(strategy.estimated_time_at_hour(13), "Today by 8 PM");
        assert_eq!(
            strategy.estimated_time_at_hour(14),
            "Not available (order before 2 PM for same-day delivery)"
        );
    }

    #[test]
    fn test_pickup_is_free() {
        let details = PickupStrategy.delivery_details(40.0, 10.0).unwrap();
        assert_eq!(details.cost, 0.0);
        assert_eq!(details.estimated_time, "Ready in 2 hours");
        assert!(!details.tracking_available);
    }

    #[test]
    fn test_rejects_negative_distance() {
        for method in DeliveryMethod::ALL {
            let result = method.strategy().calculate_cost(-1.0, 10.0);
            assert!(matches!(result, Err(DeliveryError::InvalidInput { field: "distance", .. })));
        }
    }

    #[test]
    fn test_catalogue_names() {
        let names: Vec<_> = DeliveryMethod::ALL
            .iter()
            .map(|m| m.strategy().name())
            .collect();
        assert_eq!(
            names,
            vec!["Standard Delivery", "Express Delivery", "Same-Day Delivery", "Store Pickup"]
        );
        assert_eq!(DeliveryMethod::SameDay.to_string(), "same_day");
    }
}
