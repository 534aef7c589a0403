//! Item identifiers.
//!
//! Catalog items, sigil nodes, perks and spells are all named by an
//! `ItemId`. Selection sets clone ids constantly, so the string is shared.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Shared string id of a catalog entry.
///
/// Ids are only unique within their catalog group; the group is always
/// carried alongside the id where it matters.
///
/// # Examples
///
/// ```rust
/// use magecraft::ItemId;
///
/// let lift: ItemId = "tk_lift".into();
/// assert_eq!(lift, ItemId::new("tk_lift"));
/// assert_eq!(serde_json::to_string(&lift).unwrap(), "\"tk_lift\"");
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Arc<str>);

impl ItemId {
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl PartialEq<str> for ItemId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
