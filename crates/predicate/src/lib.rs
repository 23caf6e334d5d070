//! Composition of comparison conditions.
//!
//! A [`PredicateHandler`] turns one `(field, value)` pair into a condition
//! through a [`QueryTarget`]; a [`PredicateBuilder`] runs handlers in call
//! order and collects their conditions, each tagged with the [`Combinator`]
//! joining it to the previous ones. [`criteria::Criteria`] is a target over a
//! typed schema.

pub mod builder;
pub mod criteria;
pub mod error;
pub mod handler;
pub mod target;
pub mod value;

pub use builder::{PredicateBuilder, ScopedCondition};
pub use criteria::{Criteria, Expr, FieldType, Record, Schema};
pub use error::PredicateError;
pub use handler::{Combinator, Comparison, ComparisonHandler, PredicateHandler};
pub use target::QueryTarget;
pub use value::Value;
