pub mod source;

pub use source::{InMemorySourceProvider, SharedSourceData, SourceError, SourceProvider};
