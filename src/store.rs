use crate::error::Error;
use arc_swap::ArcSwap;
use clause_template_core::{Catalog, ConditionNode, Config, Resolve, resolver_for};
use clause_traits::SourceProvider;
use log::info;
use std::sync::Arc;

/// One loaded configuration: its catalog and the resolver chosen for it.
#[derive(Debug)]
pub struct Snapshot {
    config: Config,
    catalog: Catalog,
    resolver: Arc<dyn Resolve>,
}

impl Snapshot {
    fn load(config: Config, provider: &Arc<dyn SourceProvider>) -> Result<Self, Error> {
        let catalog = Catalog::load(&config, provider.as_ref())?;
        let resolver = resolver_for(&config, &catalog, Arc::clone(provider));
        info!(
            "Loaded {} namespace(s) for {} resolution",
            catalog.sources().len(),
            if resolver.is_live() { "live" } else { "cached" }
        );
        Ok(Self {
            config,
            catalog,
            resolver,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &Arc<dyn Resolve> {
        &self.resolver
    }

    pub fn resolve(&self, namespace: &str, id: &str) -> Result<Option<ConditionNode>, Error> {
        Ok(self.resolver.resolve(namespace, id)?)
    }
}

/// Resolves condition blocks for a configuration that can be replaced while
/// readers are active.
///
/// Each call works against the snapshot current when it started. A reload
/// builds a complete new snapshot before swapping it in; if loading fails the
/// previous snapshot stays in place.
#[derive(Debug)]
pub struct ConditionStore {
    provider: Arc<dyn SourceProvider>,
    current: ArcSwap<Snapshot>,
}

impl ConditionStore {
    pub fn load(config: Config, provider: Arc<dyn SourceProvider>) -> Result<Self, Error> {
        let snapshot = Snapshot::load(config, &provider)?;
        Ok(Self {
            provider,
            current: ArcSwap::from_pointee(snapshot),
        })
    }

    pub fn reload(&self, config: Config) -> Result<(), Error> {
        let snapshot = Snapshot::load(config, &self.provider)?;
        self.current.store(Arc::new(snapshot));
        Ok(())
    }

    /// The current snapshot. It stays valid across later reloads.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    pub fn resolve(&self, namespace: &str, id: &str) -> Result<Option<ConditionNode>, Error> {
        self.current.load().resolve(namespace, id)
    }

    pub fn provider(&self) -> &Arc<dyn SourceProvider> {
        &self.provider
    }
}
