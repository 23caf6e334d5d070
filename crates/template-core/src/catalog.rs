//! Discovery of condition documents and the namespace registry built from them.
use crate::config::Config;
use crate::consts::{ATTR_ID, ATTR_NAMESPACE, KEY_SEPARATOR, ROOT_NAME};
use crate::error::TemplateError;
use crate::node::required_text;
use crate::resolver::blocks_query;
use crate::tree::{ConditionNode, XmlTree};
use clause_traits::{SourceError, SourceProvider};
use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Namespace → source locators, both in registration order.
pub type SourceMap = IndexMap<String, IndexSet<String>>;

/// Condition blocks keyed by `(namespace, id)`.
///
/// The pair is kept apart because either half may itself contain the key
/// separator: `("a.b", "c")` and `("a", "b.c")` are different blocks.
pub type ConditionIndex = HashMap<(String, String), ConditionNode>;

/// Display form `namespace.id` of an index key, used in logs and messages.
pub fn index_key(namespace: &str, id: &str) -> String {
    format!("{namespace}{KEY_SEPARATOR}{id}")
}

/// Immutable result of scanning the configured locations.
///
/// The index is only populated when the catalog was loaded for cached
/// resolution; in debug mode it stays empty and documents are re-read per
/// lookup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sources: Arc<SourceMap>,
    index: Arc<ConditionIndex>,
    indexed: bool,
}

impl Catalog {
    /// Discovers every `.xml` document under `config.xml_locations`, registers
    /// it under the namespace its root declares and, unless `config.debug` is
    /// set, indexes its blocks.
    ///
    /// Locations that do not exist are skipped with a warning. Documents whose
    /// root element is not `<conditions>` are skipped. A locator reached from
    /// more than one location is read once.
    pub fn load(config: &Config, provider: &dyn SourceProvider) -> Result<Self, TemplateError> {
        config.validate()?;
        let mut builder = CatalogBuilder::new(!config.debug);
        let mut seen = HashSet::new();

        for location in &config.xml_locations {
            let locators = match provider.discover(location) {
                Ok(locators) => locators,
                Err(SourceError::NotFound(_)) => {
                    warn!(
                        "Condition location '{}' does not exist ({} provider), skipping",
                        location,
                        provider.name()
                    );
                    continue;
                }
                Err(e) => {
                    return Err(TemplateError::XmlParse {
                        location: location.clone(),
                        reason: e.to_string(),
                    });
                }
            };

            for locator in locators {
                if !seen.insert(locator.clone()) {
                    continue;
                }
                let tree = load_document(provider, &locator)?;
                if !tree.is_condition_document() {
                    debug!("Skipping '{}': root element is not <{}>", locator, ROOT_NAME);
                    continue;
                }
                builder.add_document(Arc::new(tree))?;
            }
        }

        let catalog = builder.build();
        debug!(
            "Loaded {} namespace(s) from {} document(s), {} indexed block(s)",
            catalog.sources.len(),
            seen.len(),
            catalog.index.len()
        );
        Ok(catalog)
    }

    pub fn builder(build_index: bool) -> CatalogBuilder {
        CatalogBuilder::new(build_index)
    }

    pub fn sources(&self) -> &Arc<SourceMap> {
        &self.sources
    }

    pub fn index(&self) -> &Arc<ConditionIndex> {
        &self.index
    }

    /// Whether blocks were indexed at load time.
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Locators registered under `namespace`, in registration order.
    pub fn sources_for(&self, namespace: &str) -> Option<&IndexSet<String>> {
        self.sources.get(namespace)
    }
}

/// Incremental construction of a [`Catalog`], for callers that register
/// documents themselves instead of scanning locations.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    sources: SourceMap,
    index: ConditionIndex,
    build_index: bool,
}

impl CatalogBuilder {
    pub fn new(build_index: bool) -> Self {
        Self {
            build_index,
            ..Self::default()
        }
    }

    /// Adds `locator` to `namespace`. Returns false if it was already there.
    pub fn register_source(
        &mut self,
        namespace: impl Into<String>,
        locator: impl Into<String>,
    ) -> bool {
        self.sources
            .entry(namespace.into())
            .or_default()
            .insert(locator.into())
    }

    /// Registers a parsed document under the namespace named by its root's
    /// `namespace` attribute and indexes its blocks.
    ///
    /// A key that is already indexed keeps its first definition.
    pub fn add_document(&mut self, tree: Arc<XmlTree>) -> Result<(), TemplateError> {
        let root = tree.root_element().ok_or_else(|| TemplateError::XmlParse {
            location: tree.location().to_string(),
            reason: "document has no root element".to_string(),
        })?;
        let namespace = required_text(root, ATTR_NAMESPACE)?.trim().to_string();
        self.register_source(namespace.clone(), tree.location());

        if !self.build_index {
            return Ok(());
        }

        let query = blocks_query(tree.namespace_uri())?;
        let mut blocks = Vec::new();
        for block in query.select(tree.root())? {
            blocks.push((required_text(block, ATTR_ID)?, block.index()));
        }

        for (id, index) in blocks {
            let label = index_key(&namespace, &id);
            match self.index.entry((namespace.clone(), id)) {
                Entry::Occupied(existing) => {
                    warn!(
                        "Duplicate condition '{}' in '{}'; keeping the definition from '{}'",
                        label,
                        tree.location(),
                        existing.get().source()
                    );
                }
                Entry::Vacant(slot) => {
                    debug!("Indexed condition '{}' from '{}'", label, tree.location());
                    slot.insert(ConditionNode::new(Arc::clone(&tree), index));
                }
            }
        }
        Ok(())
    }

    pub fn build(self) -> Catalog {
        Catalog {
            sources: Arc::new(self.sources),
            index: Arc::new(self.index),
            indexed: self.build_index,
        }
    }
}

/// Reads and parses one document. Any failure is reported against `locator`.
pub(crate) fn load_document(
    provider: &dyn SourceProvider,
    locator: &str,
) -> Result<XmlTree, TemplateError> {
    let bytes = provider
        .load(locator)
        .map_err(|e| TemplateError::XmlParse {
            location: locator.to_string(),
            reason: e.to_string(),
        })?;
    XmlTree::from_bytes(locator, &bytes)
}
