use clause_predicate::PredicateError;
use clause_template_core::TemplateError;
use clause_traits::SourceError;
use clause_xpath::XPathError;
use thiserror::Error;

/// Errors surfaced by the store and the command line.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Predicate error: {0}")]
    Predicate(#[from] PredicateError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("XPath error: {0}")]
    XPath(#[from] XPathError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
