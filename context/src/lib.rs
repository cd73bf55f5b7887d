//! Workspace discovery for the project memory store.
//!
//! Finds the workspace root the documents live under and the
//! workspace-independent root of the global memory document, recording where
//! each answer came from.

pub mod resolver;
pub mod types;

pub use resolver::{
    GLOBAL_DIR_ENV, GLOBAL_DIR_NAME, GlobalRootResolver, MARKER_DIR, WORKSPACE_ENV,
    WorkspaceResolver
};
pub use types::{ContextSource, ResolvedValue};
