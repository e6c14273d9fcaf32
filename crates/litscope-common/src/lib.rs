//! litscope-common — Shared types, errors, and the sandboxed HTTP client used across litscope crates.

pub mod error;
pub mod sandbox;
pub mod year;

// Re-export commonly used types
pub use error::{LitscopeError, Result};
pub use year::YearCount;
