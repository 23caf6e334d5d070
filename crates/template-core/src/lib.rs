//! Condition template documents.
//!
//! Documents are XML files whose `<conditions namespace="...">` root holds
//! `<condition id="...">` blocks. A [`Catalog`] discovers them through a
//! [`clause_traits::SourceProvider`]; a [`Resolve`] implementation then finds
//! blocks by `(namespace, id)`, either from the catalog's index or by reading
//! the documents again on each call.
//!
//! ```ignore
//! let config = Config::from_path("clause.json")?;
//! let provider = Arc::new(FilesystemSourceProvider::current_dir());
//! let catalog = Catalog::load(&config, provider.as_ref())?;
//! let resolver = resolver_for(&config, &catalog, provider);
//! if let Some(block) = resolver.resolve("orders", "shipped")? {
//!     println!("{}", block.text());
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod consts;
pub mod error;
pub mod node;
pub mod resolver;
pub mod tree;

pub use catalog::{Catalog, CatalogBuilder, ConditionIndex, SourceMap, index_key};
pub use config::Config;
pub use error::TemplateError;
pub use node::{attribute_text, node_text, range_text, required_text};
pub use resolver::{
    CachedResolver, LiveResolver, ParseFailurePolicy, Resolve, block_query, blocks_query,
    resolver_for,
};
pub use tree::{ConditionNode, TreeNode, XmlTree};
