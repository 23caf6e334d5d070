//! Namespaced condition templates and predicate composition.
//!
//! Condition documents are discovered and resolved by
//! [`clause_template_core`]; [`ConditionStore`] keeps the loaded state behind
//! an atomically swappable snapshot. Conditions are composed programmatically
//! with [`clause_predicate::PredicateBuilder`].

pub mod error;
pub mod store;

pub use error::Error;
pub use store::{ConditionStore, Snapshot};

pub use clause_predicate::{
    Combinator, Comparison, ComparisonHandler, Criteria, Expr, FieldType, PredicateBuilder,
    PredicateError, PredicateHandler, QueryTarget, Record, Schema, ScopedCondition, Value,
};
pub use clause_resource::{FilesystemSourceProvider, InMemorySourceProvider};
pub use clause_template_core::{
    CachedResolver, Catalog, ConditionNode, Config, LiveResolver, ParseFailurePolicy, Resolve,
    TemplateError,
};
pub use clause_traits::{SourceError, SourceProvider};
