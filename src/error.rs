use thiserror::Error;

/// Errors produced by the ATS and arbitrage calculations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AtsError {
    /// A game or line lacks a numeric field the calculation needs
    #[error("invalid input: {field} {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// Not enough usable lines to evaluate arbitrage
    #[error("insufficient data: {usable} usable lines, need at least {required}")]
    InsufficientData { usable: usize, required: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl AtsError {
    pub fn missing(field: &'static str) -> Self {
        AtsError::InvalidInput {
            field,
            reason: "is missing".to_string(),
        }
    }

    pub fn non_finite(field: &'static str, value: f64) -> Self {
        AtsError::InvalidInput {
            field,
            reason: format!("is not a finite number ({})", value),
        }
    }
}
