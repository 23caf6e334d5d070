//! A self-contained query target: a typed schema producing expression trees
//! that render as infix text and evaluate against in-memory records.
use crate::error::PredicateError;
use crate::handler::Comparison;
use crate::target::QueryTarget;
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

/// One row of named values. Missing fields read as `Null`.
pub type Record = HashMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Float,
    Text,
    Boolean,
    Date,
    DateTime,
}

impl FieldType {
    /// Whether a non-null value can be compared with a field of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldType::Integer, Value::Int(_))
                | (FieldType::Float, Value::Float(_) | Value::Int(_))
                | (FieldType::Text, Value::Text(_))
                | (FieldType::Boolean, Value::Bool(_))
                | (FieldType::Date, Value::Date(_))
                | (FieldType::DateTime, Value::DateTime(_) | Value::Date(_))
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Text => "text",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// Declared fields, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: IndexMap<String, FieldType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), *ty))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Compare {
        field: String,
        comparison: Comparison,
        value: Value,
    },
    All(Box<Expr>, Box<Expr>),
    Any(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// SQL-like truth: comparing a null or incomparable operand is false,
    /// except `= NULL` and `!= NULL`, which test for presence.
    pub fn evaluate(&self, record: &Record) -> bool {
        match self {
            Expr::All(left, right) => left.evaluate(record) && right.evaluate(record),
            Expr::Any(left, right) => left.evaluate(record) || right.evaluate(record),
            Expr::Compare {
                field,
                comparison,
                value,
            } => {
                let actual = record.get(field).unwrap_or(&Value::Null);
                if value.is_null() {
                    return match comparison {
                        Comparison::Equals => actual.is_null(),
                        Comparison::NotEquals => !actual.is_null(),
                        _ => false,
                    };
                }
                actual
                    .compare(value)
                    .is_some_and(|ordering| comparison.holds(ordering))
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Compare {
                field,
                comparison: Comparison::Equals,
                value: Value::Null,
            } => write!(f, "{} IS NULL", field),
            Expr::Compare {
                field,
                comparison: Comparison::NotEquals,
                value: Value::Null,
            } => write!(f, "{} IS NOT NULL", field),
            Expr::Compare {
                field,
                comparison,
                value,
            } => write!(f, "{} {} {}", field, comparison, value),
            Expr::All(left, right) => write!(f, "({} AND {})", left, right),
            Expr::Any(left, right) => write!(f, "({} OR {})", left, right),
        }
    }
}

/// Validates comparisons against a [`Schema`] and builds [`Expr`] trees.
#[derive(Debug, Clone)]
pub struct Criteria {
    schema: Schema,
}

impl Criteria {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl QueryTarget for Criteria {
    type Condition = Expr;

    fn compare(
        &self,
        field: &str,
        comparison: Comparison,
        value: &Value,
    ) -> Result<Expr, PredicateError> {
        let field_type = self
            .schema
            .field_type(field)
            .ok_or_else(|| PredicateError::build(field, "unknown field"))?;

        if value.is_null() {
            if !comparison.is_equality() {
                return Err(PredicateError::build(
                    field,
                    format!("'{}' cannot compare against null", comparison),
                ));
            }
        } else if !field_type.accepts(value) {
            return Err(PredicateError::build(
                field,
                format!("{} value does not fit {} field", value.type_name(), field_type),
            ));
        } else if field_type == FieldType::Boolean && !comparison.is_equality() {
            return Err(PredicateError::build(
                field,
                format!("'{}' is not defined for boolean fields", comparison),
            ));
        }

        Ok(Expr::Compare {
            field: field.to_string(),
            comparison,
            value: value.clone(),
        })
    }

    fn all(&self, left: Expr, right: Expr) -> Expr {
        Expr::All(Box::new(left), Box::new(right))
    }

    fn any(&self, left: Expr, right: Expr) -> Expr {
        Expr::Any(Box::new(left), Box::new(right))
    }
}
