/// Commission calculation error.
///
/// A missing or inactive policy is not an error; see
/// [`Calculation::PolicyUnavailable`](crate::Calculation::PolicyUnavailable).
#[derive(Debug, Clone, PartialEq)]
pub enum CommissionError {
    /// Base amount is negative, NaN or infinite.
    InvalidAmount(f64),
    /// A policy percentage is outside 0–100 or not finite.
    InvalidPercentage { field: &'static str, value: f64 },
}

impl std::fmt::Display for CommissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAmount(amount) => {
                write!(f, "invalid amount: {amount} (must be finite and >= 0)")
            }
            Self::InvalidPercentage { field, value } => {
                write!(f, "invalid percentage for {field}: {value} (must be within 0-100)")
            }
        }
    }
}

impl std::error::Error for CommissionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_amount() {
        let err = CommissionError::InvalidAmount(-500.0);
        assert_eq!(err.to_string(), "invalid amount: -500 (must be finite and >= 0)");
    }

    #[test]
    fn test_display_invalid_percentage() {
        let err = CommissionError::InvalidPercentage {
            field: "shares.platform",
            value: 120.0,
        };
        assert!(err.to_string().contains("shares.platform"));
        assert!(err.to_string().contains("120"));
    }
}
