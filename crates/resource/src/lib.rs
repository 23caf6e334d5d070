//! Source providers for condition documents.
//!
//! ## Available Providers
//!
//! - [`FilesystemSourceProvider`]: reads documents from the local filesystem
//!
//! The in-memory provider from clause-traits is re-exported as
//! [`InMemorySourceProvider`].

mod filesystem;

pub use filesystem::FilesystemSourceProvider;

pub use clause_traits::InMemorySourceProvider;
