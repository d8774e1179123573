#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Missing {0}")]
    MissingField(&'static str),

    #[error("Malformed {field}: '{value}' is not an integer")]
    MalformedField { field: &'static str, value: String },

    #[error("Please enter and select a valid location for both profiles.")]
    MissingLocation,

    #[error("Invalid selection '{0}'. Must be 'me' or a family member id")]
    InvalidSelection(String),

    #[error("Invalid division '{0}'. Must be one of: D1, D9, D10")]
    InvalidDivision(String),
}
