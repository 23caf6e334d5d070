//! Evaluates a parsed expression against a `DataSourceNode` tree.

use crate::ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, NodeTypeTest, Step};
use crate::datasource::{DataSourceNode, NodeType};
use crate::error::XPathError;
use crate::{axes, functions, operators};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone)]
pub enum XPathValue<N> {
    NodeSet(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, N: DataSourceNode<'a>> XPathValue<N> {
    pub fn to_bool(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::Boolean(b) => *b,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            XPathValue::Number(n) => *n,
            XPathValue::Boolean(b) => f64::from(u8::from(*b)),
            XPathValue::String(_) | XPathValue::NodeSet(_) => {
                self.to_string().trim().parse().unwrap_or(f64::NAN)
            }
        }
    }
}

impl<'a, N: DataSourceNode<'a>> fmt::Display for XPathValue<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XPathValue::NodeSet(nodes) => f.write_str(
                &nodes.first().map(|n| n.string_value()).unwrap_or_default(),
            ),
            XPathValue::String(s) => f.write_str(s),
            XPathValue::Number(n) => f.write_str(&format_number(*n)),
            XPathValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// XPath number-to-string conversion: integral values print without a
/// fractional part.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.fract() == 0.0 && n.is_finite() {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Namespace prefixes and string variables visible to an expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    namespaces: HashMap<String, String>,
    variables: HashMap<String, String>,
}

impl Bindings {
    pub fn bind_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.namespaces.insert(prefix.into(), uri.into());
    }

    pub fn bind_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    fn resolve_prefix(&self, prefix: &str) -> Result<&str, XPathError> {
        self.namespace(prefix)
            .ok_or_else(|| XPathError::UnboundPrefix(prefix.to_string()))
    }
}

/// State for one evaluation. `'a` is the tree lifetime, `'d` the lifetime of
/// the borrowed bindings.
pub struct EvaluationContext<'a, 'd, N: DataSourceNode<'a>> {
    pub context_node: N,
    pub root_node: N,
    /// 1-based.
    pub context_position: usize,
    pub context_size: usize,
    pub bindings: &'d Bindings,
    _marker: PhantomData<&'a ()>,
}

impl<'a, 'd, N: DataSourceNode<'a>> EvaluationContext<'a, 'd, N> {
    pub fn new(context_node: N, root_node: N, bindings: &'d Bindings) -> Self {
        Self {
            context_node,
            root_node,
            context_position: 1,
            context_size: 1,
            bindings,
            _marker: PhantomData,
        }
    }

    fn at(&self, node: N, position: usize, size: usize) -> Self {
        Self {
            context_node: node,
            root_node: self.root_node,
            context_position: position,
            context_size: size,
            bindings: self.bindings,
            _marker: PhantomData,
        }
    }
}

pub fn evaluate<'a, N>(
    expr: &Expression,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::LocationPath(path) => {
            evaluate_location_path(path, e_ctx).map(XPathValue::NodeSet)
        }
        Expression::Variable(name) => e_ctx
            .bindings
            .variable(name)
            .map(|v| XPathValue::String(v.to_string()))
            .ok_or_else(|| XPathError::UnknownVariable(name.clone())),
        Expression::FunctionCall { name, args } => {
            let evaluated = args
                .iter()
                .map(|arg| evaluate(arg, e_ctx))
                .collect::<Result<Vec<_>, _>>()?;
            functions::evaluate_function(name, evaluated, e_ctx)
        }
        Expression::BinaryOp { left, op, right } => match op {
            BinaryOperator::And => Ok(XPathValue::Boolean(
                evaluate(left, e_ctx)?.to_bool() && evaluate(right, e_ctx)?.to_bool(),
            )),
            BinaryOperator::Or => Ok(XPathValue::Boolean(
                evaluate(left, e_ctx)?.to_bool() || evaluate(right, e_ctx)?.to_bool(),
            )),
            _ => operators::evaluate(*op, evaluate(left, e_ctx)?, evaluate(right, e_ctx)?),
        },
        Expression::Negate(inner) => Ok(XPathValue::Number(-evaluate(inner, e_ctx)?.to_number())),
    }
}

fn evaluate_location_path<'a, N>(
    path: &LocationPath,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut current = if let Some(start) = &path.start_point {
        match evaluate(start, e_ctx)? {
            XPathValue::NodeSet(nodes) => nodes,
            other => {
                return Err(XPathError::Type(format!(
                    "cannot apply a path to the non node-set value '{}'",
                    other
                )));
            }
        }
    } else if path.is_absolute {
        vec![e_ctx.root_node]
    } else {
        vec![e_ctx.context_node]
    };

    for step in &path.steps {
        current = evaluate_step(step, &current, e_ctx)?;
    }
    Ok(current)
}

/// Axis collection, node test, then predicates; the result is in document order.
fn evaluate_step<'a, N>(
    step: &Step,
    context_nodes: &[N],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for &node in context_nodes {
        let mut axis_nodes = Vec::new();
        let mut local_seen = HashSet::new();
        axes::collect(step.axis, node, &mut local_seen, &mut axis_nodes);
        let mut tested = Vec::with_capacity(axis_nodes.len());
        for candidate in axis_nodes {
            if matches_node_test(candidate, &step.node_test, step.axis, e_ctx)? {
                tested.push(candidate);
            }
        }
        // Predicate positions are relative to the axis of each context node.
        for kept in apply_predicates(tested, &step.predicates, step.axis, e_ctx)? {
            if seen.insert(kept) {
                result.push(kept);
            }
        }
    }
    result.sort();
    Ok(result)
}

fn matches_node_test<'a, N>(
    node: N,
    test: &NodeTest,
    axis: Axis,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<bool, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let principal = match axis {
        Axis::Attribute => NodeType::Attribute,
        _ => NodeType::Element,
    };
    Ok(match test {
        NodeTest::Wildcard(prefix) => {
            if node.node_type() != principal {
                return Ok(false);
            }
            match prefix {
                None => true,
                Some(prefix) => {
                    let uri = e_ctx.bindings.resolve_prefix(prefix)?;
                    node.name().is_some_and(|q| q.namespace == Some(uri))
                }
            }
        }
        NodeTest::Name(name) => {
            if node.node_type() != principal {
                return Ok(false);
            }
            let uri = match &name.prefix {
                Some(prefix) => Some(e_ctx.bindings.resolve_prefix(prefix)?),
                None => None,
            };
            node.name()
                .is_some_and(|q| q.local_part == name.local && q.namespace == uri)
        }
        NodeTest::NodeType(NodeTypeTest::Node) => true,
        NodeTest::NodeType(NodeTypeTest::Text) => node.node_type() == NodeType::Text,
        NodeTest::NodeType(NodeTypeTest::Comment) => node.node_type() == NodeType::Comment,
    })
}

fn apply_predicates<'a, N>(
    nodes: Vec<N>,
    predicates: &[Expression],
    axis: Axis,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut current = nodes;
    for predicate in predicates {
        let size = current.len();
        let mut kept = Vec::with_capacity(size);
        for (index, &node) in current.iter().enumerate() {
            // preceding-sibling is collected in document order but counts
            // positions outward from the context node.
            let position = if axis == Axis::PrecedingSibling {
                size - index
            } else {
                index + 1
            };
            let result = evaluate(predicate, &e_ctx.at(node, position, size))?;
            let keep = match result {
                XPathValue::Number(n) => n == position as f64,
                other => other.to_bool(),
            };
            if keep {
                kept.push(node);
            }
        }
        current = kept;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::mock::{MockTree, library};
    use crate::parser::parse_expression;

    fn select<'a>(tree: &'a MockTree, bindings: &Bindings, xpath: &str) -> Vec<usize> {
        let root = tree.node(0);
        let e_ctx = EvaluationContext::new(root, root, bindings);
        let expr = parse_expression(xpath).unwrap();
        match evaluate(&expr, &e_ctx).unwrap() {
            XPathValue::NodeSet(nodes) => nodes.into_iter().map(|n| n.id).collect(),
            other => panic!("expected a node-set, got {:?}", other),
        }
    }

    #[test]
    fn predicate_by_attribute_and_position() {
        let tree = library();
        let bindings = Bindings::default();
        assert_eq!(select(&tree, &bindings, "/library/book[@id='b2']"), vec![6]);
        assert_eq!(select(&tree, &bindings, "/library/book[1]"), vec![2]);
        assert_eq!(select(&tree, &bindings, "/library/book[last()]"), vec![6]);
        assert_eq!(select(&tree, &bindings, "//book"), vec![2, 6, 10]);
    }

    #[test]
    fn variables_are_matched_literally() {
        let tree = library();
        let mut bindings = Bindings::default();
        bindings.bind_variable("id", "b3");
        assert_eq!(select(&tree, &bindings, "//book[@id=$id]"), vec![10]);
    }

    #[test]
    fn unbound_variable_is_an_error() {
        let tree = library();
        let root = tree.node(0);
        let bindings = Bindings::default();
        let e_ctx = EvaluationContext::new(root, root, &bindings);
        let expr = parse_expression("//book[@id=$missing]").unwrap();
        let err = evaluate(&expr, &e_ctx).unwrap_err();
        assert_eq!(err, XPathError::UnknownVariable("missing".into()));
    }

    #[test]
    fn prefixed_tests_match_namespace_uri_only() {
        let mut tree = MockTree::new();
        let root = tree.element(0, Some("urn:a"), "conditions");
        let block = tree.element(root, Some("urn:a"), "condition");
        tree.attribute(block, "id", "q1");

        let mut bound = Bindings::default();
        bound.bind_namespace("ns", "urn:a");
        assert_eq!(select(&tree, &bound, "//ns:conditions/ns:condition"), vec![2]);
        assert!(select(&tree, &bound, "/conditions/condition").is_empty());

        let mut other = Bindings::default();
        other.bind_namespace("ns", "urn:b");
        assert!(select(&tree, &other, "//ns:conditions/ns:condition").is_empty());
    }

    #[test]
    fn unbound_prefix_is_an_error() {
        let tree = library();
        let root = tree.node(0);
        let bindings = Bindings::default();
        let e_ctx = EvaluationContext::new(root, root, &bindings);
        let expr = parse_expression("//x:book").unwrap();
        let err = evaluate(&expr, &e_ctx).unwrap_err();
        assert_eq!(err, XPathError::UnboundPrefix("x".into()));
    }

    #[test]
    fn parent_and_attribute_axes() {
        let tree = library();
        let bindings = Bindings::default();
        assert_eq!(select(&tree, &bindings, "//book[@lang]/.."), vec![1]);
        assert_eq!(select(&tree, &bindings, "/library/book/attribute::*"), vec![3, 4, 7]);
    }

    #[test]
    fn boolean_operators_short_circuit() {
        let tree = library();
        let bindings = Bindings::default();
        // The right operands reference an unbound variable and must not run.
        assert_eq!(select(&tree, &bindings, "//book[true() or $nope]"), vec![2, 6, 10]);
        assert!(select(&tree, &bindings, "//book[false() and $nope]").is_empty());
    }
}
