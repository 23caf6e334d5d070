//! Strategies turning `(field, value)` into one condition.
use crate::error::PredicateError;
use crate::target::QueryTarget;
use crate::value::Value;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Equals => "=",
            Comparison::NotEquals => "!=",
            Comparison::GreaterThan => ">",
            Comparison::GreaterOrEqual => ">=",
            Comparison::LessThan => "<",
        }
    }

    /// Whether an operand ordering satisfies this comparison.
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Comparison::Equals => ordering == Ordering::Equal,
            Comparison::NotEquals => ordering != Ordering::Equal,
            Comparison::GreaterThan => ordering == Ordering::Greater,
            Comparison::GreaterOrEqual => ordering != Ordering::Less,
            Comparison::LessThan => ordering == Ordering::Less,
        }
    }

    /// Only equality comparisons are meaningful against `Null` or booleans.
    pub fn is_equality(&self) -> bool {
        matches!(self, Comparison::Equals | Comparison::NotEquals)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// How a condition joins the ones accumulated before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => f.write_str("AND"),
            Combinator::Or => f.write_str("OR"),
        }
    }
}

/// Builds one condition for a field. The combinator is not part of the
/// condition; the builder records it alongside.
pub trait PredicateHandler<T: QueryTarget + ?Sized> {
    fn build_condition(
        &self,
        target: &T,
        field: &str,
        value: &Value,
    ) -> Result<T::Condition, PredicateError>;

    fn combinator(&self) -> Combinator;
}

/// The built-in handlers: one comparison in one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComparisonHandler {
    comparison: Comparison,
    combinator: Combinator,
}

impl ComparisonHandler {
    /// Plain equality, joined with AND.
    pub const EQUALS: Self = Self::new(Comparison::Equals, Combinator::And);
    /// Plain inequality, joined with AND.
    pub const NOT_EQUALS: Self = Self::new(Comparison::NotEquals, Combinator::And);

    pub const AND_EQUALS: Self = Self::new(Comparison::Equals, Combinator::And);
    pub const AND_NOT_EQUALS: Self = Self::new(Comparison::NotEquals, Combinator::And);
    pub const AND_GREATER_THAN: Self = Self::new(Comparison::GreaterThan, Combinator::And);
    pub const AND_GREATER_OR_EQUAL: Self = Self::new(Comparison::GreaterOrEqual, Combinator::And);
    pub const AND_LESS_THAN: Self = Self::new(Comparison::LessThan, Combinator::And);

    pub const OR_EQUALS: Self = Self::new(Comparison::Equals, Combinator::Or);
    pub const OR_NOT_EQUALS: Self = Self::new(Comparison::NotEquals, Combinator::Or);
    pub const OR_GREATER_THAN: Self = Self::new(Comparison::GreaterThan, Combinator::Or);
    pub const OR_GREATER_OR_EQUAL: Self = Self::new(Comparison::GreaterOrEqual, Combinator::Or);
    pub const OR_LESS_THAN: Self = Self::new(Comparison::LessThan, Combinator::Or);

    pub const fn new(comparison: Comparison, combinator: Combinator) -> Self {
        Self {
            comparison,
            combinator,
        }
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }
}

impl<T: QueryTarget + ?Sized> PredicateHandler<T> for ComparisonHandler {
    fn build_condition(
        &self,
        target: &T,
        field: &str,
        value: &Value,
    ) -> Result<T::Condition, PredicateError> {
        target.compare(field, self.comparison, value)
    }

    fn combinator(&self) -> Combinator {
        self.combinator
    }
}
