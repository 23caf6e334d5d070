//! Text extraction from condition nodes.
//!
//! Paths are XPath expressions evaluated with the node as context, usually
//! one of the `ATTR_*` constants.
use crate::consts::{ATTR_END, ATTR_START, field_label};
use crate::error::TemplateError;
use clause_xpath::{DataSourceNode, NodeType, Query};

/// Raw text of `node`, or the empty string when there is no node.
///
/// For elements this is the element's own text children only; text inside
/// nested elements is not included. Other nodes yield their string value.
pub fn node_text<'a, N: DataSourceNode<'a>>(node: Option<N>) -> String {
    match node {
        None => String::new(),
        Some(n) if matches!(n.node_type(), NodeType::Element | NodeType::Root) => n
            .children()
            .filter(|c| c.node_type() == NodeType::Text)
            .map(|c| c.string_value())
            .collect(),
        Some(n) => n.string_value(),
    }
}

/// Text of the first node `path` selects from `node`, empty when nothing
/// matches.
pub fn attribute_text<'a, N>(node: N, path: &str) -> Result<String, TemplateError>
where
    N: DataSourceNode<'a> + 'a,
{
    let query = Query::compile(path)?;
    Ok(node_text(query.select_single(node)?))
}

/// Like [`attribute_text`], but text that is empty after trimming is an error
/// naming the owning element. The untrimmed text is returned.
pub fn required_text<'a, N>(node: N, path: &str) -> Result<String, TemplateError>
where
    N: DataSourceNode<'a> + 'a,
{
    let text = attribute_text(node, path)?;
    if text.trim().is_empty() {
        return Err(TemplateError::FieldEmpty {
            tag: tag_of(node),
            field: field_label(path).to_string(),
        });
    }
    Ok(text)
}

/// The `start` and `end` attributes of a range element. Either side may be
/// blank for an open range, but not both.
pub fn range_text<'a, N>(node: N) -> Result<(String, String), TemplateError>
where
    N: DataSourceNode<'a> + 'a,
{
    let start = attribute_text(node, ATTR_START)?;
    let end = attribute_text(node, ATTR_END)?;
    if start.trim().is_empty() && end.trim().is_empty() {
        return Err(TemplateError::FieldEmpty {
            tag: tag_of(node),
            field: format!("{}/{}", field_label(ATTR_START), field_label(ATTR_END)),
        });
    }
    Ok((start, end))
}

fn tag_of<'a, N: DataSourceNode<'a>>(node: N) -> String {
    node.name()
        .map(|n| n.local_part.to_string())
        .unwrap_or_default()
}
