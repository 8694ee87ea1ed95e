use thiserror::Error;

#[derive(Debug, Error)]
pub enum RentalRoiError {
    #[error("Parse error: {field} - '{value}' is not a valid number")]
    Parse { field: String, value: String },

    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid loan terms: {field} - {reason}")]
    InvalidLoanTerms { field: String, reason: String },

    #[error("Incomplete rent data: {found} of {expected} unit types present")]
    IncompleteRentData { found: usize, expected: usize },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RentalRoiError {
    fn from(e: serde_json::Error) -> Self {
        RentalRoiError::SerializationError(e.to_string())
    }
}

impl RentalRoiError {
    /// A sum or product on `field` left the range `Decimal` can represent.
    pub fn out_of_range(field: &str) -> Self {
        RentalRoiError::InvalidInput {
            field: field.into(),
            reason: "Value is too large to compute with".into(),
        }
    }
}
