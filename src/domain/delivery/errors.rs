// ============================================================================
// Delivery Eligibility Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeliveryError {
    #[error("Same-day delivery not available for distances over {max_km}km")]
    SameDayOutOfRange { max_km: f64 },

    #[error("Invalid {field}: {value} (must be a finite, non-negative number)")]
    InvalidInput { field: &'static str, value: f64 },
}
