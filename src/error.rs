//! Error types for the builder.
//!
//! Interactive toggles never fail; they report whether they were applied.
//! `BuilderError` covers the remaining failure points: loading static
//! tables, loading persisted blobs, and the confirm-time check of a MAP
//! selection.

use crate::id::ItemId;
use thiserror::Error;

/// Format a cycle path as a readable string.
fn format_cycle_path(path: &[ItemId]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors produced while loading rules or data, or confirming a selection.
///
/// # Examples
///
/// ```rust
/// use magecraft::{BuilderError, ItemId};
///
/// let err = BuilderError::UnsupportedVersion(7);
/// assert_eq!(err.to_string(), "Unsupported save version: 7");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuilderError {
    /// A family's sigil nodes form a prerequisite cycle.
    ///
    /// The path is closed, e.g. `[a, b, c, a]`.
    #[error("Prerequisite cycle: {}", format_cycle_path(.path))]
    PrerequisiteCycle { path: Vec<ItemId> },

    /// A sigil node lists a prerequisite that is not part of its family.
    #[error("Sigil node {node} requires unknown node {missing}")]
    UnknownPrerequisite { node: ItemId, missing: ItemId },

    /// No family is registered under this key.
    #[error("Unknown blessing family: {0}")]
    UnknownFamily(String),

    /// A sigil node's image carries no recognised tier suffix.
    #[error("Sigil node {node} has no tier suffix in image {image}")]
    UnknownTier { node: ItemId, image: String },

    /// A MAP selection failed its confirm-time validator.
    #[error("{0}")]
    SelectionRejected(String),

    /// A persisted record carries a version this build cannot read.
    #[error("Unsupported save version: {0}")]
    UnsupportedVersion(u32),

    /// JSON could not be produced or parsed.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for BuilderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
