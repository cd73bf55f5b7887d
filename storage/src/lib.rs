//! # Storage Layer
//!
//! [`DocumentStore`](pm_core::DocumentStore) backends: the local filesystem
//! and an in-memory map for tests and ephemeral hosts.

pub mod fs;
pub mod memory;

pub use fs::FsDocumentStore;
pub use memory::InMemoryDocumentStore;
