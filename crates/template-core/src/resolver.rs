//! Lookup of condition blocks by `(namespace, id)`.
//!
//! Two strategies share the [`Resolve`] contract: [`CachedResolver`] answers
//! from the index built at load time, [`LiveResolver`] re-reads the registered
//! documents on every call. [`resolver_for`] picks one from the configuration.
use crate::catalog::{Catalog, ConditionIndex, SourceMap, index_key, load_document};
use crate::config::Config;
use crate::consts::{BLOCK_PATH, BLOCK_PATH_WITH_NAMESPACE, ID_VARIABLE, NAMESPACE_ALIAS};
use crate::error::TemplateError;
use crate::tree::ConditionNode;
use clause_traits::SourceProvider;
use clause_xpath::{Query, XPathError};
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;

pub trait Resolve: Send + Sync + fmt::Debug {
    /// The block with this id in this namespace. A miss is `Ok(None)`.
    fn resolve(&self, namespace: &str, id: &str) -> Result<Option<ConditionNode>, TemplateError>;

    /// True when every call reads the sources again.
    fn is_live(&self) -> bool;
}

/// Every block of a document whose root has namespace URI `namespace_uri`
/// (empty for none).
pub fn blocks_query(namespace_uri: &str) -> Result<Query, XPathError> {
    if namespace_uri.is_empty() {
        Query::compile(BLOCK_PATH)
    } else {
        Ok(Query::compile(BLOCK_PATH_WITH_NAMESPACE)?.with_namespace(NAMESPACE_ALIAS, namespace_uri))
    }
}

/// The block with `id`, which is bound as a variable rather than quoted into
/// the expression.
pub fn block_query(namespace_uri: &str, id: &str) -> Result<Query, XPathError> {
    let path = if namespace_uri.is_empty() {
        BLOCK_PATH
    } else {
        BLOCK_PATH_WITH_NAMESPACE
    };
    let query = Query::compile(&format!("{path}[@id=${ID_VARIABLE}]"))?
        .with_variable(ID_VARIABLE, id);
    Ok(if namespace_uri.is_empty() {
        query
    } else {
        query.with_namespace(NAMESPACE_ALIAS, namespace_uri)
    })
}

/// Map lookup on `(namespace, id)`. Never fails.
#[derive(Debug, Clone, Default)]
pub struct CachedResolver {
    index: Arc<ConditionIndex>,
}

impl CachedResolver {
    pub fn new(index: Arc<ConditionIndex>) -> Self {
        Self { index }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl Resolve for CachedResolver {
    fn resolve(&self, namespace: &str, id: &str) -> Result<Option<ConditionNode>, TemplateError> {
        let key = (namespace.to_string(), id.to_string());
        Ok(self.index.get(&key).cloned())
    }

    fn is_live(&self) -> bool {
        false
    }
}

/// What [`LiveResolver`] does when a registered document cannot be read or
/// parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseFailurePolicy {
    /// Fail the whole lookup with `XmlParse`.
    #[default]
    Abort,
    /// Log a warning and continue with the next document.
    Skip,
}

/// Reads and parses every registered document of the namespace, in
/// registration order, until one contains the block. The first match wins.
#[derive(Debug, Clone)]
pub struct LiveResolver {
    sources: Arc<SourceMap>,
    provider: Arc<dyn SourceProvider>,
    on_parse_failure: ParseFailurePolicy,
}

impl LiveResolver {
    pub fn new(sources: Arc<SourceMap>, provider: Arc<dyn SourceProvider>) -> Self {
        Self {
            sources,
            provider,
            on_parse_failure: ParseFailurePolicy::default(),
        }
    }

    pub fn with_parse_failure_policy(mut self, policy: ParseFailurePolicy) -> Self {
        self.on_parse_failure = policy;
        self
    }

    pub fn parse_failure_policy(&self) -> ParseFailurePolicy {
        self.on_parse_failure
    }
}

impl Resolve for LiveResolver {
    fn resolve(&self, namespace: &str, id: &str) -> Result<Option<ConditionNode>, TemplateError> {
        let locators = self
            .sources
            .get(namespace)
            .filter(|set| !set.is_empty())
            .ok_or_else(|| TemplateError::ConfigNotFound {
                namespace: namespace.to_string(),
            })?;

        for locator in locators {
            let tree = match load_document(self.provider.as_ref(), locator) {
                Ok(tree) => Arc::new(tree),
                Err(e) if self.on_parse_failure == ParseFailurePolicy::Skip => {
                    warn!("Skipping condition document: {}", e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let not_found = |e: XPathError| TemplateError::NodeNotFound {
                location: locator.clone(),
                id: id.to_string(),
                reason: e.to_string(),
            };
            let found = block_query(tree.namespace_uri(), id)
                .and_then(|query| query.select_single(tree.root()))
                .map_err(not_found)?
                .map(|node| node.index());

            if let Some(index) = found {
                debug!("Resolved '{}' from '{}'", index_key(namespace, id), locator);
                return Ok(Some(ConditionNode::new(tree, index)));
            }
        }
        Ok(None)
    }

    fn is_live(&self) -> bool {
        true
    }
}

/// Debug configurations resolve live against `provider`, all others from the
/// catalog's index.
pub fn resolver_for(
    config: &Config,
    catalog: &Catalog,
    provider: Arc<dyn SourceProvider>,
) -> Arc<dyn Resolve> {
    if config.debug {
        Arc::new(LiveResolver::new(Arc::clone(catalog.sources()), provider))
    } else {
        Arc::new(CachedResolver::new(Arc::clone(catalog.index())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::XmlTree;
    use clause_traits::InMemorySourceProvider;

    const FIRST: &str = r#"<conditions namespace="n1">
    <condition id="q1">from first</condition>
</conditions>"#;

    const SECOND: &str = r#"<conditions namespace="n1">
    <condition id="q1">from second</condition>
    <condition id="only-second">second only</condition>
</conditions>"#;

    const QUALIFIED: &str = r#"<conditions xmlns="http://example.com/ns" namespace="n2">
    <condition id="q2">qualified</condition>
    <condition id="it's">quoted</condition>
</conditions>"#;

    fn provider() -> Arc<InMemorySourceProvider> {
        Arc::new(
            InMemorySourceProvider::new()
                .with_source("conditions/a.xml", FIRST)
                .unwrap()
                .with_source("conditions/b.xml", SECOND)
                .unwrap()
                .with_source("conditions/c.xml", QUALIFIED)
                .unwrap(),
        )
    }

    fn resolvers() -> (Arc<dyn Resolve>, Arc<dyn Resolve>) {
        let provider = provider();
        let cached_config = Config::default();
        let live_config = Config::default().with_debug(true);
        let cached = Catalog::load(&cached_config, provider.as_ref()).unwrap();
        let live = Catalog::load(&live_config, provider.as_ref()).unwrap();
        (
            resolver_for(&cached_config, &cached, provider.clone()),
            resolver_for(&live_config, &live, provider),
        )
    }

    #[test]
    fn strategies_agree_on_every_registered_block() {
        let (cached, live) = resolvers();
        assert!(!cached.is_live());
        assert!(live.is_live());
        for (namespace, id) in [("n1", "q1"), ("n1", "only-second"), ("n2", "q2"), ("n2", "it's")] {
            let a = cached.resolve(namespace, id).unwrap().unwrap();
            let b = live.resolve(namespace, id).unwrap().unwrap();
            assert_eq!(a.id(), Some(id));
            assert_eq!(a.id(), b.id());
            assert_eq!(a.text(), b.text());
        }
    }

    #[test]
    fn first_registered_source_wins() {
        let (cached, live) = resolvers();
        assert_eq!(live.resolve("n1", "q1").unwrap().unwrap().text(), "from first");
        assert_eq!(cached.resolve("n1", "q1").unwrap().unwrap().source(), "conditions/a.xml");
    }

    #[test]
    fn strategies_agree_when_dotted_keys_would_collide() {
        let provider = Arc::new(
            InMemorySourceProvider::new()
                .with_source(
                    "conditions/a.xml",
                    r#"<conditions namespace="a.b"><condition id="c">from a.b</condition></conditions>"#,
                )
                .unwrap()
                .with_source(
                    "conditions/b.xml",
                    r#"<conditions namespace="a"><condition id="b.c">from a</condition></conditions>"#,
                )
                .unwrap(),
        );
        let cached_config = Config::default();
        let live_config = Config::default().with_debug(true);
        let cached_catalog = Catalog::load(&cached_config, provider.as_ref()).unwrap();
        let live_catalog = Catalog::load(&live_config, provider.as_ref()).unwrap();
        let cached = resolver_for(&cached_config, &cached_catalog, provider.clone());
        let live = resolver_for(&live_config, &live_catalog, provider);

        for (namespace, id, text) in [("a.b", "c", "from a.b"), ("a", "b.c", "from a")] {
            let a = cached.resolve(namespace, id).unwrap().unwrap();
            let b = live.resolve(namespace, id).unwrap().unwrap();
            assert_eq!(a.text(), text);
            assert_eq!(b.text(), text);
            assert_eq!(a.source(), b.source());
        }
    }

    #[test]
    fn unknown_namespace() {
        let (cached, live) = resolvers();
        assert!(cached.resolve("nope", "q1").unwrap().is_none());
        match live.resolve("nope", "q1").unwrap_err() {
            TemplateError::ConfigNotFound { namespace } => assert_eq!(namespace, "nope"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn miss_is_not_an_error() {
        let (cached, live) = resolvers();
        assert!(cached.resolve("n1", "missing").unwrap().is_none());
        assert!(live.resolve("n1", "missing").unwrap().is_none());
    }

    #[test]
    fn qualified_documents_need_qualified_paths() {
        let tree = XmlTree::parse("c.xml", QUALIFIED).unwrap();
        let uri = tree.namespace_uri();
        assert_eq!(uri, "http://example.com/ns");

        let qualified = block_query(uri, "q2").unwrap();
        assert!(qualified.select_single(tree.root()).unwrap().is_some());

        let plain = block_query("", "q2").unwrap();
        assert!(plain.select_single(tree.root()).unwrap().is_none());
    }

    fn broken_first() -> (Arc<SourceMap>, Arc<InMemorySourceProvider>) {
        let provider = Arc::new(
            InMemorySourceProvider::new()
                .with_source("a.xml", "<conditions namespace=\"n1\">")
                .unwrap()
                .with_source("b.xml", SECOND)
                .unwrap(),
        );
        let mut builder = Catalog::builder(false);
        builder.register_source("n1", "a.xml");
        builder.register_source("n1", "b.xml");
        (Arc::clone(builder.build().sources()), provider)
    }

    #[test]
    fn parse_failure_aborts_by_default() {
        let (sources, provider) = broken_first();
        let live = LiveResolver::new(sources, provider);
        assert_eq!(live.parse_failure_policy(), ParseFailurePolicy::Abort);
        match live.resolve("n1", "q1").unwrap_err() {
            TemplateError::XmlParse { location, .. } => assert_eq!(location, "a.xml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_failure_can_be_skipped() {
        let (sources, provider) = broken_first();
        let live = LiveResolver::new(sources, provider)
            .with_parse_failure_policy(ParseFailurePolicy::Skip);
        let node = live.resolve("n1", "q1").unwrap().unwrap();
        assert_eq!(node.source(), "b.xml");
        assert!(live.resolve("n1", "missing").unwrap().is_none());
    }

    #[test]
    fn live_resolution_sees_updated_sources() {
        let provider = provider();
        let config = Config::default().with_debug(true);
        let catalog = Catalog::load(&config, provider.as_ref()).unwrap();
        let live = resolver_for(&config, &catalog, provider.clone());
        assert!(live.resolve("n1", "q9").unwrap().is_none());

        provider
            .insert(
                "conditions/a.xml",
                r#"<conditions namespace="n1"><condition id="q9">new</condition></conditions>"#,
            )
            .unwrap();
        assert_eq!(live.resolve("n1", "q9").unwrap().unwrap().text(), "new");
    }
}
