//! # Project Memory Core
//!
//! Shared types and collaborator traits for the project memory store.
//!
//! This crate provides:
//! - Logical document paths, document kinds and their default content
//! - The built-in entry templates and assimilation candidates
//! - The retention policy for history snapshots
//! - Traits for the host collaborators the engine calls through: document
//!   storage, clock, notifications, pickers, reveal and change observers

pub mod traits;
pub mod types;

pub use traits::{
    ChangeObserver, Clock, DocumentStore, NoPicker, NoReveal, Notifier, Picker, Revealer,
    SystemClock, TracingNotifier
};
pub use types::{
    AssimilationCandidate, ChangeReason, DATE_PLACEHOLDER, DEFAULT_MAX_HISTORY_ENTRIES,
    DocumentKind, DocumentPath, PickItem, RetentionPolicy, TemplateDefinition,
    builtin_candidates, builtin_templates, default_for
};
