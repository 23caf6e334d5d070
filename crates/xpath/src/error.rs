use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum XPathError {
    #[error("XPath parse error in '{0}': {1}")]
    Parse(String, String),

    #[error("Function '{function}' error: {message}")]
    Function { function: String, message: String },

    #[error("Type error: {0}")]
    Type(String),

    #[error("Variable '${0}' is not bound")]
    UnknownVariable(String),

    #[error("Namespace prefix '{0}' is not bound")]
    UnboundPrefix(String),
}
