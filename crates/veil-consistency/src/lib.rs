//! Referential consistency for replacement tokens
//!
//! The same underlying value must map to the same token everywhere it
//! appears, within a document and across a batch. Values are reduced to a
//! canonical key first, so `John Smith`, `SMITH, JOHN` and `john smith`
//! share one token. Token text is derived from a session salt, never from
//! the value itself, and the mapping table can be exported encrypted for
//! longitudinal runs.

pub mod canonical;
pub mod export;
pub mod manager;

pub use canonical::{canonicalize, CanonicalKey};
pub use export::{ConsistencyExport, ExportEntry};
pub use manager::{ConsistencyManager, SessionSalt};
