//! Built-in XPath 1.0 core functions.

use crate::datasource::DataSourceNode;
use crate::engine::{EvaluationContext, XPathValue};
use crate::error::XPathError;

/// Dispatches a function call to its implementation.
pub fn evaluate_function<'a, 'd, N: DataSourceNode<'a>>(
    name: &str,
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, 'd, N>,
) -> Result<XPathValue<N>, XPathError> {
    match name {
        // Node-set
        "count" => func_count(args),
        "position" => arity(name, &args, 0, 0).map(|_| XPathValue::Number(e_ctx.context_position as f64)),
        "last" => arity(name, &args, 0, 0).map(|_| XPathValue::Number(e_ctx.context_size as f64)),
        "local-name" => node_name(name, args, e_ctx, |q| q.local_part.to_string()),
        "name" => node_name(name, args, e_ctx, |q| q.local_part.to_string()),
        "namespace-uri" => node_name(name, args, e_ctx, |q| {
            q.namespace.unwrap_or_default().to_string()
        }),

        // String
        "string" => {
            arity(name, &args, 0, 1)?;
            Ok(XPathValue::String(string_arg_or_context(args, e_ctx)))
        }
        "concat" => {
            arity(name, &args, 2, usize::MAX)?;
            Ok(XPathValue::String(
                args.iter().map(|a| a.to_string()).collect(),
            ))
        }
        "starts-with" => {
            arity(name, &args, 2, 2)?;
            Ok(XPathValue::Boolean(
                args[0].to_string().starts_with(&args[1].to_string()),
            ))
        }
        "contains" => {
            arity(name, &args, 2, 2)?;
            Ok(XPathValue::Boolean(
                args[0].to_string().contains(&args[1].to_string()),
            ))
        }
        "string-length" => {
            arity(name, &args, 0, 1)?;
            let s = string_arg_or_context(args, e_ctx);
            Ok(XPathValue::Number(s.chars().count() as f64))
        }
        "normalize-space" => {
            arity(name, &args, 0, 1)?;
            let s = string_arg_or_context(args, e_ctx);
            Ok(XPathValue::String(
                s.split_whitespace().collect::<Vec<_>>().join(" "),
            ))
        }

        // Boolean
        "not" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Boolean(!args[0].to_bool()))
        }
        "true" => arity(name, &args, 0, 0).map(|_| XPathValue::Boolean(true)),
        "false" => arity(name, &args, 0, 0).map(|_| XPathValue::Boolean(false)),
        "boolean" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Boolean(args[0].to_bool()))
        }
        "number" => {
            arity(name, &args, 0, 1)?;
            let n = match args.first() {
                Some(v) => v.to_number(),
                None => XPathValue::<N>::String(e_ctx.context_node.string_value()).to_number(),
            };
            Ok(XPathValue::Number(n))
        }

        _ => Err(XPathError::Function {
            function: name.to_string(),
            message: "unknown function".to_string(),
        }),
    }
}

fn arity<N>(name: &str, args: &[XPathValue<N>], min: usize, max: usize) -> Result<(), XPathError> {
    if args.len() < min || args.len() > max {
        let expected = match (min, max) {
            (a, b) if a == b => format!("{}", a),
            (a, usize::MAX) => format!("at least {}", a),
            (a, b) => format!("{} to {}", a, b),
        };
        return Err(XPathError::Function {
            function: name.to_string(),
            message: format!("expected {} argument(s), got {}", expected, args.len()),
        });
    }
    Ok(())
}

fn string_arg_or_context<'a, N: DataSourceNode<'a>>(
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> String {
    match args.into_iter().next() {
        Some(value) => value.to_string(),
        None => e_ctx.context_node.string_value(),
    }
}

fn func_count<'a, N: DataSourceNode<'a>>(
    args: Vec<XPathValue<N>>,
) -> Result<XPathValue<N>, XPathError> {
    arity("count", &args, 1, 1)?;
    match &args[0] {
        XPathValue::NodeSet(nodes) => Ok(XPathValue::Number(nodes.len() as f64)),
        _ => Err(XPathError::Function {
            function: "count".to_string(),
            message: "argument must be a node-set".to_string(),
        }),
    }
}

/// Shared body of `local-name`, `name` and `namespace-uri`: inspects the first
/// node of the argument, or the context node when called without one.
fn node_name<'a, N, F>(
    name: &str,
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, '_, N>,
    project: F,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a>,
    F: Fn(crate::datasource::QName<'a>) -> String,
{
    arity(name, &args, 0, 1)?;
    let node = match args.into_iter().next() {
        None => Some(e_ctx.context_node),
        Some(XPathValue::NodeSet(nodes)) => nodes.into_iter().next(),
        Some(_) => {
            return Err(XPathError::Function {
                function: name.to_string(),
                message: "argument must be a node-set".to_string(),
            });
        }
    };
    Ok(XPathValue::String(
        node.and_then(|n| n.name()).map(project).unwrap_or_default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::mock::library;
    use crate::engine::{Bindings, evaluate};
    use crate::parser::parse_expression;

    fn eval_string(xpath: &str) -> String {
        let tree = library();
        let root = tree.node(0);
        let bindings = Bindings::default();
        let e_ctx = EvaluationContext::new(root, root, &bindings);
        evaluate(&parse_expression(xpath).unwrap(), &e_ctx)
            .unwrap()
            .to_string()
    }

    #[test]
    fn string_functions() {
        assert_eq!(eval_string("concat('a', 'b', 'c')"), "abc");
        assert_eq!(eval_string("normalize-space('  a   b ')"), "a b");
        assert_eq!(eval_string("string-length('héllo')"), "5");
        assert_eq!(eval_string("starts-with('condition', 'cond')"), "true");
        assert_eq!(eval_string("contains('condition', 'dit')"), "true");
    }

    #[test]
    fn node_set_functions() {
        assert_eq!(eval_string("count(//book)"), "3");
        assert_eq!(eval_string("local-name(/library/*[1])"), "book");
        assert_eq!(eval_string("namespace-uri(/library)"), "");
        assert_eq!(eval_string("string(/library/book[2])"), "Emma");
    }

    #[test]
    fn arity_is_checked() {
        let tree = library();
        let root = tree.node(0);
        let bindings = Bindings::default();
        let e_ctx = EvaluationContext::new(root, root, &bindings);
        let err = evaluate(&parse_expression("not()").unwrap(), &e_ctx).unwrap_err();
        assert!(matches!(err, XPathError::Function { ref function, .. } if function == "not"));
        let err = evaluate(&parse_expression("frobnicate(1)").unwrap(), &e_ctx).unwrap_err();
        assert!(matches!(err, XPathError::Function { .. }));
    }
}
