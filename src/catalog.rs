//! Catalog module.
//!
//! The catalog is the read-only store of static content: traits, perks,
//! spells and sigil nodes. The resolver only ever looks records up by
//! group and id; it never mutates them.

use crate::error::BuilderError;
use crate::family::Family;
use crate::id::ItemId;
use crate::tier::{Grade, SigilTier};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Price of a catalog item.
///
/// Only `Points` participates in budget math; `Text` is free-form copy
/// such as "Costs 3 BP" meant for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cost {
    Points(i32),
    Text(String),
}

impl Cost {
    /// Numeric cost, or zero for text-only prices.
    pub fn points(&self) -> i32 {
        match self {
            Cost::Points(p) => *p,
            Cost::Text(_) => 0,
        }
    }
}

impl Default for Cost {
    fn default() -> Self {
        Cost::Points(0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(ItemId),
    Many(Vec<ItemId>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<ItemId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(id)) => vec![id],
        Some(OneOrMany::Many(ids)) => ids,
    })
}

/// A static catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_src: String,
    #[serde(default)]
    pub cost: Cost,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
    /// Ids that must be active before this item can be picked.
    #[serde(default, deserialize_with = "one_or_many")]
    pub requires: Vec<ItemId>,
}

impl CatalogItem {
    /// Minimal record with a numeric cost.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use magecraft::CatalogItem;
    ///
    /// let item = CatalogItem::new("lucky", 2);
    /// assert_eq!(item.cost.points(), 2);
    /// ```
    pub fn new(id: impl Into<ItemId>, cost: i32) -> Self {
        let id = id.into();
        Self {
            title: id.to_string(),
            id,
            description: String::new(),
            image_src: String::new(),
            cost: Cost::Points(cost),
            grade: None,
            requires: Vec::new(),
        }
    }

    pub fn with_grade(mut self, grade: Grade) -> Self {
        self.grade = Some(grade);
        self
    }

    pub fn requiring<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        self.requires = ids.into_iter().map(Into::into).collect();
        self
    }
}

/// One node of a blessing's sigil tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigilNode {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image_src: String,
    #[serde(default)]
    pub prerequisites: Vec<ItemId>,
    /// Picks granted per sub-catalog while this node is selected.
    #[serde(default)]
    pub benefits: BTreeMap<String, u32>,
}

impl SigilNode {
    /// Node whose tier is encoded in a synthetic image name.
    pub fn new(id: impl Into<ItemId>, tier: SigilTier) -> Self {
        let id = id.into();
        Self {
            title: id.to_string(),
            image_src: format!("/sigils/{}_{}.webp", id, tier),
            id,
            description: String::new(),
            prerequisites: Vec::new(),
            benefits: BTreeMap::new(),
        }
    }

    pub fn after<I, T>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        self.prerequisites = prerequisites.into_iter().map(Into::into).collect();
        self
    }

    pub fn granting(mut self, sub_catalog: &str, picks: u32) -> Self {
        self.benefits.insert(sub_catalog.to_string(), picks);
        self
    }

    /// Tier read from the image suffix.
    pub fn tier(&self) -> Result<SigilTier, BuilderError> {
        SigilTier::from_image(&self.image_src).ok_or_else(|| BuilderError::UnknownTier {
            node: self.id.clone(),
            image: self.image_src.clone(),
        })
    }
}

/// Read-only access to static content.
///
/// Lookups are by linear scan unless an implementation chooses to index.
pub trait Catalog: Send + Sync {
    /// Every record in a named group, or an empty slice.
    fn group(&self, name: &str) -> &[CatalogItem];

    /// Sigil nodes of one blessing family.
    fn sigil_nodes(&self, family: Family) -> &[SigilNode];

    /// Names of the thematic groups that make up the full spell catalog.
    fn spell_groups(&self) -> Vec<&str>;

    /// Find a record by id within a group.
    fn item(&self, group: &str, id: &ItemId) -> Option<&CatalogItem> {
        self.group(group).iter().find(|item| &item.id == id)
    }

    /// Numeric cost of a record, zero if it is missing.
    fn cost_of(&self, group: &str, id: &ItemId) -> i32 {
        self.item(group, id).map(|item| item.cost.points()).unwrap_or(0)
    }
}

/// In-memory catalog.
///
/// # Examples
///
/// ```rust
/// use magecraft::{Catalog, CatalogItem, ItemId, StaticCatalog};
///
/// let catalog = StaticCatalog::new()
///     .with_group("perks", vec![CatalogItem::new("lucky", 2)]);
///
/// assert_eq!(catalog.cost_of("perks", &ItemId::new("lucky")), 2);
/// assert!(catalog.item("perks", &ItemId::new("missing")).is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticCatalog {
    #[serde(default)]
    groups: BTreeMap<String, Vec<CatalogItem>>,
    #[serde(default)]
    sigils: BTreeMap<Family, Vec<SigilNode>>,
    #[serde(default)]
    spell_groups: Vec<String>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from JSON.
    pub fn from_json(json: &str) -> Result<Self, BuilderError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_group(mut self, name: &str, items: Vec<CatalogItem>) -> Self {
        self.groups.insert(name.to_string(), items);
        self
    }

    /// Add a group and register it as part of the spell catalog.
    pub fn with_spell_group(mut self, name: &str, items: Vec<CatalogItem>) -> Self {
        if !self.spell_groups.iter().any(|g| g == name) {
            self.spell_groups.push(name.to_string());
        }
        self.with_group(name, items)
    }

    pub fn with_sigils(mut self, family: Family, nodes: Vec<SigilNode>) -> Self {
        self.sigils.insert(family, nodes);
        self
    }
}

impl Catalog for StaticCatalog {
    fn group(&self, name: &str) -> &[CatalogItem] {
        self.groups.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn sigil_nodes(&self, family: Family) -> &[SigilNode] {
        self.sigils.get(&family).map(Vec::as_slice).unwrap_or(&[])
    }

    fn spell_groups(&self) -> Vec<&str> {
        self.spell_groups.iter().map(String::as_str).collect()
    }
}

/// A spell flattened out of its thematic group.
#[derive(Debug, Clone, PartialEq)]
pub struct SpellEntry {
    pub id: ItemId,
    pub grade: Option<Grade>,
    /// Thematic group ("blessing") the spell belongs to.
    pub blessing: String,
}

/// Flattened view of every spell group, used by MAP selections.
#[derive(Debug, Clone, Default)]
pub struct SpellIndex {
    entries: Vec<SpellEntry>,
}

impl SpellIndex {
    /// Index every spell group of a catalog, in group order.
    pub fn from_catalog(catalog: &dyn Catalog) -> Self {
        let mut entries = Vec::new();
        for group in catalog.spell_groups() {
            for item in catalog.group(group) {
                entries.push(SpellEntry {
                    id: item.id.clone(),
                    grade: item.grade,
                    blessing: group.to_string(),
                });
            }
        }
        Self { entries }
    }

    pub fn get(&self, id: &ItemId) -> Option<&SpellEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpellEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
