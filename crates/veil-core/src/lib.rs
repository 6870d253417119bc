//! Core domain models for veil
//!
//! This crate contains:
//! - The span data model and its lifecycle invariants
//! - The identifier taxonomy shared by every detector
//! - Redaction policy (enabled types, thresholds, templates)
//! - Execution reports and the error taxonomy
//! - Tracing hooks for external diagnostics

pub mod error;
pub mod events;
pub mod identifier;
pub mod policy;
pub mod report;
pub mod span;

pub use error::{Result, VeilError};
pub use events::{NoopHook, Stage, TraceHook};
pub use identifier::IdentifierType;
pub use policy::RedactionPolicy;
pub use report::{DocumentStatus, ExecutionReport, FilterReport};
pub use span::Span;
