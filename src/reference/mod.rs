//! Reference pages: companion, weapon, beast and vehicle builders.
//!
//! All four share one shape. A `ReferenceBuild` records the picks, the
//! kind's `BuildRules` say how they are constrained and priced, and
//! `ReferencePage` applies the rules to a build.

pub mod page;
pub mod pricing;
pub mod rules;

pub use page::ReferencePage;
pub use rules::{BuildRules, GradeSurcharge, MapPerk, PerkPricing};

use crate::budget::Currency;
use crate::id::ItemId;
use crate::ordered::OrderedSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Most Blessing Points one build can absorb.
pub const MAX_BP_SPENT: u32 = 1_000;

/// The four reference page kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildKind {
    Companion,
    Weapon,
    Beast,
    Vehicle,
}

impl BuildKind {
    pub const ALL: [BuildKind; 4] = [
        BuildKind::Companion,
        BuildKind::Weapon,
        BuildKind::Beast,
        BuildKind::Vehicle,
    ];

    pub fn key(self) -> &'static str {
        match self {
            BuildKind::Companion => "companion",
            BuildKind::Weapon => "weapon",
            BuildKind::Beast => "beast",
            BuildKind::Vehicle => "vehicle",
        }
    }

    /// Key of this kind in the saved build library.
    pub fn library_key(self) -> &'static str {
        match self {
            BuildKind::Companion => "companions",
            BuildKind::Weapon => "weapons",
            BuildKind::Beast => "beasts",
            BuildKind::Vehicle => "vehicles",
        }
    }

    pub fn currency(self) -> Currency {
        match self {
            BuildKind::Companion => Currency::Companion,
            BuildKind::Weapon => Currency::Weapon,
            BuildKind::Beast => Currency::Beast,
            BuildKind::Vehicle => Currency::Vehicle,
        }
    }
}

impl fmt::Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One companion, weapon, beast or vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceBuild {
    pub(crate) kind: BuildKind,
    pub(crate) categories: OrderedSet<ItemId>,
    pub(crate) profile: Option<ItemId>,
    pub(crate) traits: OrderedSet<ItemId>,
    pub(crate) perks: BTreeMap<ItemId, u32>,
    /// Perk → name of the saved build it points at.
    pub(crate) assignments: BTreeMap<ItemId, String>,
    /// Perk → counted MAP picks in pick order.
    pub(crate) map_picks: BTreeMap<ItemId, OrderedSet<ItemId>>,
    /// Blessing Points redirected into this build.
    pub(crate) bp_spent: u32,
}

impl ReferenceBuild {
    pub fn new(kind: BuildKind) -> Self {
        Self {
            kind,
            categories: OrderedSet::new(),
            profile: None,
            traits: OrderedSet::new(),
            perks: BTreeMap::new(),
            assignments: BTreeMap::new(),
            map_picks: BTreeMap::new(),
            bp_spent: 0,
        }
    }

    pub fn kind(&self) -> BuildKind {
        self.kind
    }

    pub fn categories(&self) -> &[ItemId] {
        self.categories.as_slice()
    }

    pub fn profile(&self) -> Option<&ItemId> {
        self.profile.as_ref()
    }

    pub fn traits(&self) -> &[ItemId] {
        self.traits.as_slice()
    }

    pub fn perk_count(&self, perk: &ItemId) -> u32 {
        self.perks.get(perk).copied().unwrap_or(0)
    }

    pub fn perks(&self) -> impl Iterator<Item = (&ItemId, u32)> {
        self.perks.iter().map(|(id, count)| (id, *count))
    }

    pub fn assignment(&self, perk: &ItemId) -> Option<&str> {
        self.assignments.get(perk).map(String::as_str)
    }

    pub fn map_picks(&self, perk: &ItemId) -> &[ItemId] {
        self.map_picks
            .get(perk)
            .map(OrderedSet::as_slice)
            .unwrap_or(&[])
    }

    pub fn bp_spent(&self) -> u32 {
        self.bp_spent
    }
}
