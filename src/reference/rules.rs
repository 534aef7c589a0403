//! Per-kind rule tables for reference builds.

use super::pricing::career_tiers;
use super::BuildKind;
use crate::id::ItemId;
use crate::map_select::MapConfig;
use crate::tier::Grade;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a perk's count turns into points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerkPricing {
    /// Catalog cost times count.
    #[default]
    Flat,
    /// `first` for the first purchase, `subsequent` for each one after.
    Stepped { first: i32, subsequent: i32 },
    /// The count is a tier chosen directly; each tier has a fixed price.
    Tiered { tiers: BTreeMap<u32, i32> },
}

/// Surcharge per counted MAP pick of one grade, stepped like `PerkPricing::Stepped`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSurcharge {
    pub grade: Grade,
    pub first: i32,
    pub subsequent: i32,
}

/// A perk whose purchase opens a MAP selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPerk {
    pub config: MapConfig,
    /// Picks granted per purchase; overrides the config's total cap.
    #[serde(default)]
    pub picks_per_count: Option<u32>,
    #[serde(default)]
    pub surcharge: Option<GradeSurcharge>,
}

/// Rule table for one reference page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRules {
    pub kind: BuildKind,
    pub category_group: String,
    /// Relationship, size or power level, depending on the kind.
    pub profile_group: String,
    pub trait_group: String,
    pub perk_group: String,
    /// Each purchase raises the category cap by one.
    #[serde(default)]
    pub extending_perk: Option<ItemId>,
    /// When set, trait costs only count while this perk is held.
    #[serde(default)]
    pub trait_gate: Option<ItemId>,
    /// Perk → category that makes it free.
    #[serde(default)]
    pub free_with_category: BTreeMap<ItemId, ItemId>,
    /// Perk → perks zeroed when the perk is fully removed.
    #[serde(default)]
    pub dependents: BTreeMap<ItemId, Vec<ItemId>>,
    /// Purchase caps; perks not listed can be bought once.
    #[serde(default)]
    pub max_counts: BTreeMap<ItemId, u32>,
    #[serde(default)]
    pub pricing: BTreeMap<ItemId, PerkPricing>,
    #[serde(default)]
    pub map_perks: BTreeMap<ItemId, MapPerk>,
    /// Perk → kind of saved build it points at.
    #[serde(default)]
    pub assignable: BTreeMap<ItemId, BuildKind>,
    /// Every category after the first may not cost more than the first.
    #[serde(default)]
    pub followers_not_dearer: bool,
}

impl BuildRules {
    /// Empty rules with `<kind>_categories` style group names.
    pub fn new(kind: BuildKind) -> Self {
        let prefix = kind.key();
        Self {
            kind,
            category_group: format!("{}_categories", prefix),
            profile_group: format!("{}_profiles", prefix),
            trait_group: format!("{}_traits", prefix),
            perk_group: format!("{}_perks", prefix),
            extending_perk: None,
            trait_gate: None,
            free_with_category: BTreeMap::new(),
            dependents: BTreeMap::new(),
            max_counts: BTreeMap::new(),
            pricing: BTreeMap::new(),
            map_perks: BTreeMap::new(),
            assignable: BTreeMap::new(),
            followers_not_dearer: false,
        }
    }

    pub fn max_count(&self, perk: &ItemId) -> u32 {
        match self.pricing.get(perk) {
            Some(PerkPricing::Tiered { tiers }) => tiers.keys().max().copied().unwrap_or(0),
            _ => self.max_counts.get(perk).copied().unwrap_or(1),
        }
    }

    pub fn pricing_of(&self, perk: &ItemId) -> PerkPricing {
        self.pricing.get(perk).cloned().unwrap_or_default()
    }

    /// Built-in rules for a kind.
    pub fn standard(kind: BuildKind) -> Self {
        let mut rules = BuildRules::new(kind);
        let id = ItemId::new;

        let signature = MapPerk {
            config: MapConfig::new().ban_grade(Grade::Sinthru),
            picks_per_count: Some(1),
            surcharge: Some(GradeSurcharge {
                grade: Grade::Xuth,
                first: 5,
                subsequent: 10,
            }),
        };
        let stepped = PerkPricing::Stepped {
            first: 5,
            subsequent: 10,
        };

        match kind {
            BuildKind::Companion => {
                rules.extending_perk = Some(id("hybrid"));
                rules.max_counts.insert(id("hybrid"), 2);
                rules.max_counts.insert(id("signature_power"), 5);
                rules.pricing.insert(id("signature_power"), stepped);
                rules.pricing.insert(
                    id("impressive_career"),
                    PerkPricing::Tiered {
                        tiers: career_tiers(),
                    },
                );
                rules.map_perks.insert(id("signature_power"), signature);
                rules.map_perks.insert(
                    id("attuned"),
                    MapPerk {
                        config: MapConfig::new()
                            .limit(Grade::Kaarn, 2)
                            .limit(Grade::Purth, 1)
                            .exclusive(),
                        picks_per_count: None,
                        surcharge: None,
                    },
                );
                rules
                    .free_with_category
                    .insert(id("loyal"), id("familiar"));
                rules
                    .dependents
                    .insert(id("combat_training"), vec![id("combat_mastery")]);
                rules.assignable.insert(id("bonded_weapon"), BuildKind::Weapon);
                rules.assignable.insert(id("steed"), BuildKind::Beast);
            }
            BuildKind::Weapon => {
                rules.extending_perk = Some(id("transforming"));
                rules.max_counts.insert(id("transforming"), 2);
                rules.trait_gate = Some(id("chatty"));
                rules.max_counts.insert(id("signature_power"), 3);
                rules.pricing.insert(id("signature_power"), stepped);
                rules.map_perks.insert(id("signature_power"), signature);
                rules
                    .free_with_category
                    .insert(id("returning"), id("thrown"));
                rules
                    .dependents
                    .insert(id("sentient"), vec![id("chatty")]);
                rules.assignable.insert(id("wielder"), BuildKind::Companion);
            }
            BuildKind::Beast => {
                rules.extending_perk = Some(id("hybrid"));
                rules.max_counts.insert(id("hybrid"), 2);
                rules.trait_gate = Some(id("chatty"));
                rules.map_perks.insert(
                    id("power_level"),
                    MapPerk {
                        config: MapConfig::new()
                            .max_total(3)
                            .max_blessings(1)
                            .require_group_picks(Grade::Xuth, 3),
                        picks_per_count: None,
                        surcharge: None,
                    },
                );
                rules
                    .free_with_category
                    .insert(id("flight"), id("avian"));
                rules.assignable.insert(id("rider"), BuildKind::Companion);
            }
            BuildKind::Vehicle => {
                rules.extending_perk = Some(id("transforming"));
                rules.max_counts.insert(id("transforming"), 3);
                rules.trait_gate = Some(id("chatty"));
                rules.followers_not_dearer = true;
                rules
                    .free_with_category
                    .insert(id("sealed_hull"), id("submarine"));
                rules
                    .dependents
                    .insert(id("armament"), vec![id("heavy_armament")]);
                rules.assignable.insert(id("crew"), BuildKind::Companion);
            }
        }

        rules
    }
}
