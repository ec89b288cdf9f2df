//! Output formatters for duplicate scan results.
//!
//! Two renderings of the same result:
//! - [`text`]: human-readable listing, one block per duplicate group
//! - [`json`]: machine-readable document for scripting
//!
//! Both receive the finished groups and summary; nothing is rendered
//! for an interrupted scan.

pub mod json;
pub mod text;

// Re-export main types
pub use json::JsonOutput;
pub use text::TextOutput;
