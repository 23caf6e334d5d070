//! A small XPath 1.0 engine evaluated against any tree implementing
//! [`DataSourceNode`].
//!
//! The engine covers location paths, predicates, variables, the core
//! string/boolean/node-set functions and namespace-qualified name tests.
//! Prefixes are resolved through the bindings of a [`Query`], never through
//! declarations found in the document itself.

pub mod ast;
pub mod axes;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod functions;
pub mod operators;
pub mod parser;
pub mod query;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NameTest, NodeTest, Step};
pub use datasource::{DataSourceNode, NodeType, QName};
pub use engine::{Bindings, EvaluationContext, XPathValue, evaluate};
pub use error::XPathError;
pub use parser::parse_expression;
pub use query::Query;
