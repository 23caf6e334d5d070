use crate::error::PredicateError;
use crate::handler::{Combinator, ComparisonHandler, PredicateHandler};
use crate::target::QueryTarget;
use crate::value::Value;
use log::trace;

/// A condition plus the combinator joining it to the conditions before it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedCondition<C> {
    pub combinator: Combinator,
    pub condition: C,
}

impl<C> ScopedCondition<C> {
    pub fn new(combinator: Combinator, condition: C) -> Self {
        Self {
            combinator,
            condition,
        }
    }
}

/// Accumulates conditions against one target, in call order.
///
/// Every comparison comes as a pair: `and_greater_than(field, value)` always
/// appends, `and_greater_than_if(field, value, matched)` appends only when
/// `matched` is true. A skipped call never fails.
///
/// ```ignore
/// let conditions = PredicateBuilder::new(&criteria)
///     .and_equals("status", "shipped")?
///     .and_greater_than_if("total", min_total, min_total > 0)?
///     .or_less_than("placed", cutoff)?
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct PredicateBuilder<'t, T: QueryTarget> {
    target: &'t T,
    conditions: Vec<ScopedCondition<T::Condition>>,
}

macro_rules! comparison_methods {
    ($($handler:ident => $name:ident, $name_if:ident;)*) => {
        $(
            #[doc = concat!("Appends a `", stringify!($handler), "` condition.")]
            pub fn $name(self, field: &str, value: impl Into<Value>) -> Result<Self, PredicateError> {
                self.append_if(&ComparisonHandler::$handler, field, value.into(), true)
            }

            #[doc = concat!("Appends a `", stringify!($handler), "` condition when `matched` is true.")]
            pub fn $name_if(
                self,
                field: &str,
                value: impl Into<Value>,
                matched: bool,
            ) -> Result<Self, PredicateError> {
                self.append_if(&ComparisonHandler::$handler, field, value.into(), matched)
            }
        )*
    };
}

impl<'t, T: QueryTarget> PredicateBuilder<'t, T> {
    pub fn new(target: &'t T) -> Self {
        Self {
            target,
            conditions: Vec::new(),
        }
    }

    pub fn target(&self) -> &'t T {
        self.target
    }

    fn append_if<H>(
        mut self,
        handler: &H,
        field: &str,
        value: Value,
        matched: bool,
    ) -> Result<Self, PredicateError>
    where
        H: PredicateHandler<T> + ?Sized,
    {
        if !matched {
            trace!("Skipping condition on '{}'", field);
            return Ok(self);
        }
        let condition = handler.build_condition(self.target, field, &value)?;
        self.conditions
            .push(ScopedCondition::new(handler.combinator(), condition));
        Ok(self)
    }

    /// Appends the condition built by a caller-supplied handler.
    pub fn with_handler<H>(
        self,
        handler: &H,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Self, PredicateError>
    where
        H: PredicateHandler<T> + ?Sized,
    {
        self.append_if(handler, field, value.into(), true)
    }

    pub fn with_handler_if<H>(
        self,
        handler: &H,
        field: &str,
        value: impl Into<Value>,
        matched: bool,
    ) -> Result<Self, PredicateError>
    where
        H: PredicateHandler<T> + ?Sized,
    {
        self.append_if(handler, field, value.into(), matched)
    }

    comparison_methods! {
        EQUALS => equals, equals_if;
        NOT_EQUALS => not_equals, not_equals_if;
        AND_EQUALS => and_equals, and_equals_if;
        AND_NOT_EQUALS => and_not_equals, and_not_equals_if;
        AND_GREATER_THAN => and_greater_than, and_greater_than_if;
        AND_GREATER_OR_EQUAL => and_greater_or_equal, and_greater_or_equal_if;
        AND_LESS_THAN => and_less_than, and_less_than_if;
        OR_EQUALS => or_equals, or_equals_if;
        OR_NOT_EQUALS => or_not_equals, or_not_equals_if;
        OR_GREATER_THAN => or_greater_than, or_greater_than_if;
        OR_GREATER_OR_EQUAL => or_greater_or_equal, or_greater_or_equal_if;
        OR_LESS_THAN => or_less_than, or_less_than_if;
    }

    /// A copy of the conditions accumulated so far. The builder stays usable
    /// and later appends do not affect lists already returned.
    pub fn build(&self) -> Vec<ScopedCondition<T::Condition>> {
        self.conditions.clone()
    }

    pub fn conditions(&self) -> &[ScopedCondition<T::Condition>] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Folds the conditions left to right into one, joining each to the
    /// result so far with its own combinator. The first condition's
    /// combinator is ignored. `None` when nothing was appended.
    pub fn combine(&self) -> Option<T::Condition> {
        let mut conditions = self.conditions.iter().cloned();
        let first = conditions.next()?.condition;
        Some(conditions.fold(first, |acc, next| match next.combinator {
            Combinator::And => self.target.all(acc, next.condition),
            Combinator::Or => self.target.any(acc, next.condition),
        }))
    }
}
