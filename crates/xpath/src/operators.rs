//! Comparison, arithmetic and union operators. `and`/`or` are handled by the
//! engine so they can short-circuit.

use crate::ast::BinaryOperator;
use crate::datasource::DataSourceNode;
use crate::engine::{XPathValue, format_number};
use crate::error::XPathError;

/// A single non-node-set operand.
enum Atom {
    Str(String),
    Num(f64),
    Bool(bool),
}

impl Atom {
    fn num(&self) -> f64 {
        match self {
            Atom::Num(n) => *n,
            Atom::Bool(b) => f64::from(u8::from(*b)),
            Atom::Str(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }

    fn boolean(&self) -> bool {
        match self {
            Atom::Num(n) => *n != 0.0 && !n.is_nan(),
            Atom::Bool(b) => *b,
            Atom::Str(s) => !s.is_empty(),
        }
    }

    fn string(&self) -> String {
        match self {
            Atom::Str(s) => s.clone(),
            Atom::Num(n) => format_number(*n),
            Atom::Bool(b) => b.to_string(),
        }
    }
}

pub fn evaluate<'a, N: DataSourceNode<'a>>(
    op: BinaryOperator,
    left: XPathValue<N>,
    right: XPathValue<N>,
) -> Result<XPathValue<N>, XPathError> {
    match op {
        BinaryOperator::Equals
        | BinaryOperator::NotEquals
        | BinaryOperator::LessThan
        | BinaryOperator::LessThanOrEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanOrEqual => Ok(XPathValue::Boolean(compare(op, left, right))),
        BinaryOperator::Plus => Ok(XPathValue::Number(left.to_number() + right.to_number())),
        BinaryOperator::Minus => Ok(XPathValue::Number(left.to_number() - right.to_number())),
        BinaryOperator::Multiply => Ok(XPathValue::Number(left.to_number() * right.to_number())),
        BinaryOperator::Divide => Ok(XPathValue::Number(left.to_number() / right.to_number())),
        BinaryOperator::Modulo => Ok(XPathValue::Number(left.to_number() % right.to_number())),
        BinaryOperator::Union => match (left, right) {
            (XPathValue::NodeSet(mut a), XPathValue::NodeSet(b)) => {
                a.extend(b);
                a.sort();
                a.dedup();
                Ok(XPathValue::NodeSet(a))
            }
            _ => Err(XPathError::Type(
                "both operands of '|' must be node-sets".to_string(),
            )),
        },
        BinaryOperator::And | BinaryOperator::Or => Ok(XPathValue::Boolean(match op {
            BinaryOperator::And => left.to_bool() && right.to_bool(),
            _ => left.to_bool() || right.to_bool(),
        })),
    }
}

/// XPath 1.0 comparison: a node-set compares true when any of its members
/// satisfies the comparison.
fn compare<'a, N: DataSourceNode<'a>>(
    op: BinaryOperator,
    left: XPathValue<N>,
    right: XPathValue<N>,
) -> bool {
    match (left, right) {
        (XPathValue::NodeSet(a), XPathValue::NodeSet(b)) => a.iter().any(|x| {
            let x = Atom::Str(x.string_value());
            b.iter()
                .any(|y| compare_atoms(op, &x, &Atom::Str(y.string_value())))
        }),
        (XPathValue::NodeSet(nodes), other) => {
            let other = atom(other);
            if let Atom::Bool(_) = other {
                return compare_atoms(op, &Atom::Bool(!nodes.is_empty()), &other);
            }
            nodes
                .iter()
                .any(|n| compare_atoms(op, &Atom::Str(n.string_value()), &other))
        }
        (other, XPathValue::NodeSet(nodes)) => {
            let other = atom(other);
            if let Atom::Bool(_) = other {
                return compare_atoms(op, &other, &Atom::Bool(!nodes.is_empty()));
            }
            nodes
                .iter()
                .any(|n| compare_atoms(op, &other, &Atom::Str(n.string_value())))
        }
        (a, b) => compare_atoms(op, &atom(a), &atom(b)),
    }
}

fn atom<'a, N: DataSourceNode<'a>>(value: XPathValue<N>) -> Atom {
    match value {
        XPathValue::String(s) => Atom::Str(s),
        XPathValue::Number(n) => Atom::Num(n),
        XPathValue::Boolean(b) => Atom::Bool(b),
        XPathValue::NodeSet(nodes) => Atom::Str(
            nodes.first().map(|n| n.string_value()).unwrap_or_default(),
        ),
    }
}

fn compare_atoms(op: BinaryOperator, a: &Atom, b: &Atom) -> bool {
    match op {
        BinaryOperator::Equals | BinaryOperator::NotEquals => {
            let equal = match (a, b) {
                (Atom::Bool(_), _) | (_, Atom::Bool(_)) => a.boolean() == b.boolean(),
                (Atom::Num(_), _) | (_, Atom::Num(_)) => a.num() == b.num(),
                _ => a.string() == b.string(),
            };
            (op == BinaryOperator::Equals) == equal
        }
        BinaryOperator::LessThan => a.num() < b.num(),
        BinaryOperator::LessThanOrEqual => a.num() <= b.num(),
        BinaryOperator::GreaterThan => a.num() > b.num(),
        BinaryOperator::GreaterThanOrEqual => a.num() >= b.num(),
        _ => false,
    }
}
