use clause_xpath::XPathError;
use thiserror::Error;

/// Failures while loading, indexing or resolving condition documents.
///
/// A missing condition is not an error: resolvers report it as `Ok(None)`.
#[derive(Error, Debug, Clone)]
pub enum TemplateError {
    #[error("No condition documents are registered under namespace '{namespace}'")]
    ConfigNotFound { namespace: String },

    #[error("Failed to read or parse condition document '{location}': {reason}")]
    XmlParse { location: String, reason: String },

    #[error("Searching '{location}' for condition '{id}' failed: {reason}")]
    NodeNotFound {
        location: String,
        id: String,
        reason: String,
    },

    #[error("The '{field}' of <{tag}> is missing or blank")]
    FieldEmpty { tag: String, field: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    XPath(#[from] XPathError),
}
