//! The read-only tree contract the engine evaluates against.
use std::hash::Hash;

/// An expanded name: namespace URI (if any) plus local part.
///
/// Prefixes are a property of the query text, not of the tree, so they do not
/// appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    pub namespace: Option<&'a str>,
    pub local_part: &'a str,
}

impl<'a> QName<'a> {
    pub fn local(local_part: &'a str) -> Self {
        Self {
            namespace: None,
            local_part,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
}

/// A node in a navigable, read-only tree.
///
/// `Ord` must follow document order: a node sorts before its attributes, and
/// its attributes sort before its children.
///
/// `'a` is the lifetime of the tree the node borrows from.
pub trait DataSourceNode<'a>:
    std::fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + PartialOrd + Ord
{
    fn node_type(&self) -> NodeType;

    /// Expanded name of elements and attributes, `None` for every other kind.
    fn name(&self) -> Option<QName<'a>>;

    /// XPath string value: text content for text and comment nodes, the value
    /// for attributes, concatenated descendant text for elements and the root.
    fn string_value(&self) -> String;

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// `None` only for the root. An attribute's parent is its owning element.
    fn parent(&self) -> Option<Self>;
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    #[derive(Debug)]
    struct MockData {
        node_type: NodeType,
        name: Option<QName<'static>>,
        value: String,
        parent: Option<usize>,
        children: Vec<usize>,
        attributes: Vec<usize>,
    }

    /// Arena tree for engine tests. Nodes must be added in document order.
    #[derive(Debug)]
    pub struct MockTree {
        nodes: Vec<MockData>,
    }

    #[derive(Debug, Clone, Copy)]
    pub struct MockNode<'a> {
        pub id: usize,
        pub tree: &'a MockTree,
    }

    impl PartialEq for MockNode<'_> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }
    impl Eq for MockNode<'_> {}

    impl PartialOrd for MockNode<'_> {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for MockNode<'_> {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            self.id.cmp(&other.id)
        }
    }

    impl Hash for MockNode<'_> {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    impl MockTree {
        pub fn new() -> Self {
            Self {
                nodes: vec![MockData {
                    node_type: NodeType::Root,
                    name: None,
                    value: String::new(),
                    parent: None,
                    children: vec![],
                    attributes: vec![],
                }],
            }
        }

        fn push(&mut self, parent: usize, data: MockData, as_attribute: bool) -> usize {
            let id = self.nodes.len();
            self.nodes.push(data);
            if as_attribute {
                self.nodes[parent].attributes.push(id);
            } else {
                self.nodes[parent].children.push(id);
            }
            id
        }

        pub fn element(
            &mut self,
            parent: usize,
            namespace: Option<&'static str>,
            local: &'static str,
        ) -> usize {
            let data = MockData {
                node_type: NodeType::Element,
                name: Some(QName {
                    namespace,
                    local_part: local,
                }),
                value: String::new(),
                parent: Some(parent),
                children: vec![],
                attributes: vec![],
            };
            self.push(parent, data, false)
        }

        pub fn attribute(&mut self, owner: usize, local: &'static str, value: &str) -> usize {
            let data = MockData {
                node_type: NodeType::Attribute,
                name: Some(QName::local(local)),
                value: value.to_string(),
                parent: Some(owner),
                children: vec![],
                attributes: vec![],
            };
            self.push(owner, data, true)
        }

        pub fn text(&mut self, parent: usize, value: &str) -> usize {
            let data = MockData {
                node_type: NodeType::Text,
                name: None,
                value: value.to_string(),
                parent: Some(parent),
                children: vec![],
                attributes: vec![],
            };
            self.push(parent, data, false)
        }

        pub fn node(&self, id: usize) -> MockNode<'_> {
            MockNode { id, tree: self }
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

    impl<'a> DataSourceNode<'a> for MockNode<'a> {
        fn node_type(&self) -> NodeType {
            self.tree.nodes[self.id].node_type
        }

        fn name(&self) -> Option<QName<'a>> {
            self.tree.nodes[self.id].name
        }

        fn string_value(&self) -> String {
            match self.node_type() {
                NodeType::Root | NodeType::Element => {
                    let mut out = String::new();
                    self.tree.collect_text(self.id, &mut out);
                    out
                }
                _ => self.tree.nodes[self.id].value.clone(),
            }
        }

        fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(
                tree.nodes[self.id]
                    .attributes
                    .iter()
                    .map(move |&id| MockNode { id, tree }),
            )
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(
                tree.nodes[self.id]
                    .children
                    .iter()
                    .map(move |&id| MockNode { id, tree }),
            )
        }

        fn parent(&self) -> Option<Self> {
            self.tree.nodes[self.id].parent.map(|id| MockNode {
                id,
                tree: self.tree,
            })
        }
    }

    /// ```text
    /// <library>                                   1
    ///   <book id="b1" lang="en">Dune</book>       2, @3, @4, text 5
    ///   <book id="b2">Emma</book>                 6, @7, text 8
    ///   <shelf><book id="b3">Ulysses</book></shelf>  9, 10, @11, text 12
    /// </library>
    /// ```
    pub fn library() -> MockTree {
        let mut tree = MockTree::new();
        let library = tree.element(0, None, "library");
        let b1 = tree.element(library, None, "book");
        tree.attribute(b1, "id", "b1");
        tree.attribute(b1, "lang", "en");
        tree.text(b1, "Dune");
        let b2 = tree.element(library, None, "book");
        tree.attribute(b2, "id", "b2");
        tree.text(b2, "Emma");
        let shelf = tree.element(library, None, "shelf");
        let b3 = tree.element(shelf, None, "book");
        tree.attribute(b3, "id", "b3");
        tree.text(b3, "Ulysses");
        tree
    }
}
