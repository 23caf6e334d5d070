use crate::error::PredicateError;
use crate::handler::Comparison;
use crate::value::Value;
use std::fmt;

/// What conditions are built against: it knows the fields, their types and
/// how to represent a comparison and the conjunction or disjunction of two
/// conditions.
pub trait QueryTarget {
    type Condition: Clone + fmt::Debug;

    /// One atomic comparison of `field` with `value`. Fails when the field is
    /// unknown or the value does not fit its type.
    fn compare(
        &self,
        field: &str,
        comparison: Comparison,
        value: &Value,
    ) -> Result<Self::Condition, PredicateError>;

    fn all(&self, left: Self::Condition, right: Self::Condition) -> Self::Condition;

    fn any(&self, left: Self::Condition, right: Self::Condition) -> Self::Condition;
}
