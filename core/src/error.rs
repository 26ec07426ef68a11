/// Errors returned by the pure nutrition engine.
///
/// Storage and presentation layers wrap these in `anyhow::Error`; the engine
/// itself never retries or panics on bad input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Quantity must not be negative (got {quantity})")]
    InvalidQuantity { quantity: f64 },
    #[error("{field} must be greater than 0 (got {value})")]
    InvalidBodyMetric { field: &'static str, value: f64 },
    #[error("Invalid {kind} '{value}'. Must be one of: {expected}")]
    InvalidValue {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::InvalidQuantity { quantity: -5.0 };
        assert_eq!(err.to_string(), "Quantity must not be negative (got -5)");

        let err = EngineError::InvalidBodyMetric {
            field: "weight_kg",
            value: 0.0,
        };
        assert_eq!(err.to_string(), "weight_kg must be greater than 0 (got 0)");
    }

    #[test]
    fn test_error_converts_to_anyhow() {
        fn fails() -> anyhow::Result<()> {
            Err(EngineError::InvalidQuantity { quantity: -1.0 })?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert!(err.downcast_ref::<EngineError>().is_some());
    }
}
