//! Filter contract, registry, and built-in detectors
//!
//! The core consumes filters through one narrow contract: a filter names
//! its identifier type, carries a static priority, and turns text into
//! spans. Detection logic is never inspected or modified by the engine;
//! a filter that fails is isolated, recorded, and contributes zero spans.

pub mod builtin;
pub mod filter;
pub mod registry;

pub use filter::{DetectionContext, Filter};
pub use registry::FilterRegistry;
