use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredicateError {
    /// A handler could not turn `field` and its value into a condition.
    #[error("Cannot build condition on field '{field}': {reason}")]
    Build { field: String, reason: String },
}

impl PredicateError {
    pub fn build(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Build {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
