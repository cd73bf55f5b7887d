//! Shared test fixtures for the project memory workspace.
//!
//! Provides deterministic stand-ins for every host collaborator:
//! - A manually advanced clock
//! - Notifiers, revealers and change observers that record their calls
//! - A picker that answers from a script
//! - A store wrapper that injects I/O failures for chosen paths
//! - Temporary workspace and global roots backed by `tempfile`

mod fixtures;

pub use fixtures::*;
