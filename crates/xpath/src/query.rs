//! Compiled expressions with their bindings.

use crate::ast::Expression;
use crate::datasource::DataSourceNode;
use crate::engine::{Bindings, EvaluationContext, XPathValue, evaluate};
use crate::error::XPathError;
use crate::parser::parse_expression;

/// A parsed XPath expression plus the namespace prefixes and variables it is
/// evaluated with.
///
/// ```ignore
/// let query = Query::compile("//ns:conditions/ns:condition[@id=$id]")?
///     .with_namespace("ns", "http://example.com/ns")
///     .with_variable("id", "q2");
/// let block = query.select_single(document.root())?;
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    source: String,
    expr: Expression,
    bindings: Bindings,
}

impl Query {
    pub fn compile(source: &str) -> Result<Self, XPathError> {
        let expr = parse_expression(source)?;
        Ok(Self {
            source: source.to_string(),
            expr,
            bindings: Bindings::default(),
        })
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.bindings.bind_namespace(prefix, uri);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.bindings.bind_variable(name, value);
        self
    }

    /// The expression text this query was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Evaluates with `context` as the context node. Absolute paths start at
    /// the root of the tree `context` belongs to.
    pub fn evaluate<'a, N>(&self, context: N) -> Result<XPathValue<N>, XPathError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        let root = document_root(context);
        let e_ctx = EvaluationContext::new(context, root, &self.bindings);
        evaluate(&self.expr, &e_ctx)
    }

    /// Evaluates and requires a node-set, returned in document order.
    pub fn select<'a, N>(&self, context: N) -> Result<Vec<N>, XPathError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        match self.evaluate(context)? {
            XPathValue::NodeSet(nodes) => Ok(nodes),
            other => Err(XPathError::Type(format!(
                "'{}' evaluated to '{}', not a node-set",
                self.source, other
            ))),
        }
    }

    /// First selected node in document order, if any.
    pub fn select_single<'a, N>(&self, context: N) -> Result<Option<N>, XPathError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        Ok(self.select(context)?.into_iter().next())
    }
}

fn document_root<'a, N: DataSourceNode<'a>>(node: N) -> N {
    let mut current = node;
    while let Some(parent) = current.parent() {
        current = parent;
    }
    current
}
