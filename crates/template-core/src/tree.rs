//! Owned condition documents.
//!
//! Parsed documents outlive the text they were read from, so the roxmltree
//! document is copied into an arena that can be shared behind an `Arc` and
//! handed out as [`ConditionNode`]s.
use crate::consts::ROOT_NAME;
use crate::error::TemplateError;
use crate::node;
use clause_xpath::{DataSourceNode, NodeType, QName, Query};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExpandedName {
    namespace: Option<String>,
    local: String,
}

#[derive(Debug)]
struct NodeData {
    node_type: NodeType,
    name: Option<ExpandedName>,
    value: String,
    parent: Option<usize>,
    children: Vec<usize>,
    attributes: Vec<usize>,
}

impl NodeData {
    fn new(node_type: NodeType, parent: Option<usize>) -> Self {
        Self {
            node_type,
            name: None,
            value: String::new(),
            parent,
            children: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

/// A parsed XML document stored as an arena in document order: each element
/// is followed by its attributes, then by its children.
#[derive(Debug)]
pub struct XmlTree {
    location: String,
    nodes: Vec<NodeData>,
}

impl XmlTree {
    /// Parses `text`, remembering `location` for diagnostics. DTDs are
    /// accepted; processing instructions are dropped.
    pub fn parse(location: impl Into<String>, text: &str) -> Result<Self, TemplateError> {
        let location = location.into();
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(text, options).map_err(|e| {
            TemplateError::XmlParse {
                location: location.clone(),
                reason: e.to_string(),
            }
        })?;

        let mut tree = Self {
            location,
            nodes: Vec::new(),
        };
        tree.append(doc.root(), None);
        Ok(tree)
    }

    /// Decodes `bytes` as UTF-8 and parses them.
    pub fn from_bytes(location: impl Into<String>, bytes: &[u8]) -> Result<Self, TemplateError> {
        let location = location.into();
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::parse(location, text),
            Err(e) => Err(TemplateError::XmlParse {
                location,
                reason: e.to_string(),
            }),
        }
    }

    fn append(&mut self, source: roxmltree::Node<'_, '_>, parent: Option<usize>) -> Option<usize> {
        let node_type = match source.node_type() {
            roxmltree::NodeType::Root => NodeType::Root,
            roxmltree::NodeType::Element => NodeType::Element,
            roxmltree::NodeType::Text => NodeType::Text,
            roxmltree::NodeType::Comment => NodeType::Comment,
            roxmltree::NodeType::PI => return None,
        };

        let id = self.nodes.len();
        let mut data = NodeData::new(node_type, parent);
        match node_type {
            NodeType::Element => {
                let tag = source.tag_name();
                data.name = Some(ExpandedName {
                    namespace: tag.namespace().map(str::to_string),
                    local: tag.name().to_string(),
                });
            }
            NodeType::Text | NodeType::Comment => {
                data.value = source.text().unwrap_or_default().to_string();
            }
            _ => {}
        }
        self.nodes.push(data);

        for attr in source.attributes() {
            let attr_id = self.nodes.len();
            let mut data = NodeData::new(NodeType::Attribute, Some(id));
            data.name = Some(ExpandedName {
                namespace: attr.namespace().map(str::to_string),
                local: attr.name().to_string(),
            });
            data.value = attr.value().to_string();
            self.nodes.push(data);
            self.nodes[id].attributes.push(attr_id);
        }

        for child in source.children() {
            if let Some(child_id) = self.append(child, Some(id)) {
                self.nodes[id].children.push(child_id);
            }
        }
        Some(id)
    }

    /// Where the document was read from.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn root(&self) -> TreeNode<'_> {
        TreeNode { tree: self, id: 0 }
    }

    /// The document element.
    pub fn root_element(&self) -> Option<TreeNode<'_>> {
        self.root()
            .children()
            .find(|n| n.node_type() == NodeType::Element)
    }

    /// True when the document element is `<conditions>`, in any namespace.
    pub fn is_condition_document(&self) -> bool {
        self.root_element()
            .is_some_and(|root| root.tag_name() == ROOT_NAME)
    }

    /// Namespace URI of the document element, empty when it has none.
    pub fn namespace_uri(&self) -> &str {
        self.root_element()
            .and_then(|root| root.name())
            .and_then(|name| name.namespace)
            .unwrap_or_default()
    }

    fn node(&self, id: usize) -> &NodeData {
        &self.nodes[id]
    }

    fn collect_text(&self, id: usize, out: &mut String) {
        for &child in &self.nodes[id].children {
            match self.nodes[child].node_type {
                NodeType::Text => out.push_str(&self.nodes[child].value),
                NodeType::Element => self.collect_text(child, out),
                _ => {}
            }
        }
    }
}

/// A borrowed position in an [`XmlTree`].
#[derive(Clone, Copy)]
pub struct TreeNode<'a> {
    tree: &'a XmlTree,
    id: usize,
}

impl<'a> TreeNode<'a> {
    /// Arena index; stable for the lifetime of the tree.
    pub fn index(&self) -> usize {
        self.id
    }

    pub fn tree(&self) -> &'a XmlTree {
        self.tree
    }

    /// Local name for elements and attributes, empty otherwise.
    pub fn tag_name(&self) -> &'a str {
        self.name().map(|n| n.local_part).unwrap_or_default()
    }

    /// Value of the attribute with this local name.
    pub fn attribute(&self, local: &str) -> Option<&'a str> {
        let tree = self.tree;
        tree.node(self.id)
            .attributes
            .iter()
            .map(|&id| tree.node(id))
            .find(|data| data.name.as_ref().is_some_and(|n| n.local == local))
            .map(|data| data.value.as_str())
    }

    /// Element children in document order. Takes `self` by value so the
    /// iterator borrows only the tree.
    pub fn child_elements(self) -> impl Iterator<Item = TreeNode<'a>> + 'a {
        self.children()
            .filter(|n| n.node_type() == NodeType::Element)
    }
}

impl fmt::Debug for TreeNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("location", &self.tree.location)
            .field("id", &self.id)
            .field("type", &self.node_type())
            .field("name", &self.tag_name())
            .finish()
    }
}

impl PartialEq for TreeNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for TreeNode<'_> {}

impl PartialOrd for TreeNode<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeNode<'_> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for TreeNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<'a> DataSourceNode<'a> for TreeNode<'a> {
    fn node_type(&self) -> NodeType {
        self.tree.node(self.id).node_type
    }

    fn name(&self) -> Option<QName<'a>> {
        let tree = self.tree;
        tree.node(self.id).name.as_ref().map(|n| QName {
            namespace: n.namespace.as_deref(),
            local_part: n.local.as_str(),
        })
    }

    fn string_value(&self) -> String {
        let data = self.tree.node(self.id);
        match data.node_type {
            NodeType::Root | NodeType::Element => {
                let mut out = String::new();
                self.tree.collect_text(self.id, &mut out);
                out
            }
            _ => data.value.clone(),
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        let tree = self.tree;
        Box::new(
            tree.node(self.id)
                .attributes
                .iter()
                .map(move |&id| TreeNode { tree, id }),
        )
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        let tree = self.tree;
        Box::new(
            tree.node(self.id)
                .children
                .iter()
                .map(move |&id| TreeNode { tree, id }),
        )
    }

    fn parent(&self) -> Option<Self> {
        let tree = self.tree;
        tree.node(self.id).parent.map(|id| TreeNode { tree, id })
    }
}

/// A resolved condition block.
///
/// Owns a share of the document it came from, so it stays valid after the
/// resolver that produced it is dropped or reloaded. Two handles are equal
/// when they point at the same node of the same parsed document.
#[derive(Clone)]
pub struct ConditionNode {
    tree: Arc<XmlTree>,
    index: usize,
}

impl ConditionNode {
    /// `index` must come from [`TreeNode::index`] on a node of `tree`.
    pub(crate) fn new(tree: Arc<XmlTree>, index: usize) -> Self {
        Self { tree, index }
    }

    pub fn node(&self) -> TreeNode<'_> {
        TreeNode {
            tree: &self.tree,
            id: self.index,
        }
    }

    /// Location of the document this block was found in.
    pub fn source(&self) -> &str {
        self.tree.location()
    }

    pub fn tag_name(&self) -> &str {
        self.node().tag_name()
    }

    /// The block's `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.node().attribute("id")
    }

    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.node().attribute(local)
    }

    /// The block's own text, without the text of nested elements.
    pub fn text(&self) -> String {
        node::node_text(Some(self.node()))
    }

    pub fn child_elements(&self) -> impl Iterator<Item = TreeNode<'_>> {
        self.node().child_elements()
    }

    /// Evaluates `query` with this block as the context node.
    pub fn select(&self, query: &Query) -> Result<Vec<TreeNode<'_>>, TemplateError> {
        Ok(query.select(self.node())?)
    }

    /// Text selected by `path`, empty when nothing matches.
    pub fn attribute_text(&self, path: &str) -> Result<String, TemplateError> {
        node::attribute_text(self.node(), path)
    }

    /// Like [`attribute_text`](Self::attribute_text), but blank text is an error.
    pub fn required_text(&self, path: &str) -> Result<String, TemplateError> {
        node::required_text(self.node(), path)
    }

    /// The `start` and `end` attributes; at least one must be non-blank.
    pub fn range_text(&self) -> Result<(String, String), TemplateError> {
        node::range_text(self.node())
    }
}

impl PartialEq for ConditionNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree) && self.index == other.index
    }
}

impl Eq for ConditionNode {}

impl fmt::Debug for ConditionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionNode")
            .field("source", &self.source())
            .field("tag", &self.tag_name())
            .field("id", &self.id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE conditions>
<conditions xmlns="http://example.com/orders" namespace="orders">
    <!-- shipped orders -->
    <condition id="q1">status = 'shipped'</condition>
    <condition id="q2"><equal field="total" value="10"/></condition>
</conditions>"#;

    #[test]
    fn arena_preserves_document_order() {
        let tree = XmlTree::parse("orders.xml", DOC).unwrap();
        let root = tree.root_element().unwrap();
        assert_eq!(root.tag_name(), "conditions");
        assert_eq!(root.attribute("namespace"), Some("orders"));

        let mut previous = root;
        for node in root.attributes().chain(root.child_elements()) {
            assert!(node > previous);
            previous = node;
        }
        assert_eq!(tree.namespace_uri(), "http://example.com/orders");
        assert!(tree.is_condition_document());
    }

    #[test]
    fn element_names_carry_namespace_but_attributes_do_not() {
        let tree = XmlTree::parse("orders.xml", DOC).unwrap();
        let block = tree.root_element().unwrap().child_elements().next().unwrap();
        let name = block.name().unwrap();
        assert_eq!(name.namespace, Some("http://example.com/orders"));
        assert_eq!(name.local_part, "condition");

        let id = block.attributes().next().unwrap();
        assert_eq!(id.name().unwrap().namespace, None);
        assert_eq!(id.string_value(), "q1");
        assert_eq!(block.string_value(), "status = 'shipped'");
    }

    #[test]
    fn malformed_xml_reports_location() {
        let err = XmlTree::parse("broken.xml", "<conditions>").unwrap_err();
        match err {
            TemplateError::XmlParse { location, .. } => assert_eq!(location, "broken.xml"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(XmlTree::from_bytes("bin.xml", &[0xff, 0xfe]).is_err());
    }

    #[test]
    fn condition_node_equality_is_identity() {
        let tree = Arc::new(XmlTree::parse("orders.xml", DOC).unwrap());
        let block = tree.root_element().unwrap().child_elements().next().unwrap();
        let a = ConditionNode::new(tree.clone(), block.index());
        let b = ConditionNode::new(tree.clone(), block.index());
        assert_eq!(a, b);
        assert_eq!(a.id(), Some("q1"));
        assert_eq!(a.source(), "orders.xml");

        let reparsed = Arc::new(XmlTree::parse("orders.xml", DOC).unwrap());
        let c = ConditionNode::new(reparsed, block.index());
        assert_ne!(a, c);
    }

    #[test]
    fn condition_node_children_outlive_the_borrowed_node() {
        let tree = Arc::new(XmlTree::parse("orders.xml", DOC).unwrap());
        let q2 = tree.root_element().unwrap().child_elements().nth(1).unwrap();
        let block = ConditionNode::new(tree.clone(), q2.index());

        let children = block.child_elements();
        let tags: Vec<&str> = children.map(|c| c.tag_name()).collect();
        assert_eq!(tags, vec!["equal"]);
        assert_eq!(block.child_elements().next().unwrap().attribute("field"), Some("total"));
    }

    #[test]
    fn condition_text_excludes_nested_elements() {
        let tree = Arc::new(
            XmlTree::parse(
                "mixed.xml",
                r#"<conditions namespace="n"><condition id="m">a = 1 <and>b = 2</and></condition></conditions>"#,
            )
            .unwrap(),
        );
        let block = tree.root_element().unwrap().child_elements().next().unwrap();
        let node = ConditionNode::new(tree.clone(), block.index());
        assert_eq!(node.text(), "a = 1 ");
        assert_eq!(block.string_value(), "a = 1 b = 2");
    }
}
