//! Blessing families and their rule tables.
//!
//! Every blessing runs the same sigil-tree engine; what differs between
//! them is data: which sub-catalogs the nodes grant picks in, which boosts
//! exist, which sub-catalog ids are chained tier pairs, and which picks
//! bind a named sub-build.

use crate::error::BuilderError;
use crate::id::ItemId;
use crate::reference::BuildKind;
use crate::tier::SigilTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The ten blessing families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    GoodTidings,
    CompellingWill,
    WorldlyWisdom,
    BitterDissatisfaction,
    LostHope,
    FallenPeace,
    GraciousDefeat,
    ClosedCircuits,
    RighteousCreation,
    StarCrossedLove,
}

impl Family {
    pub const ALL: [Family; 10] = [
        Family::GoodTidings,
        Family::CompellingWill,
        Family::WorldlyWisdom,
        Family::BitterDissatisfaction,
        Family::LostHope,
        Family::FallenPeace,
        Family::GraciousDefeat,
        Family::ClosedCircuits,
        Family::RighteousCreation,
        Family::StarCrossedLove,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Family::GoodTidings => "good_tidings",
            Family::CompellingWill => "compelling_will",
            Family::WorldlyWisdom => "worldly_wisdom",
            Family::BitterDissatisfaction => "bitter_dissatisfaction",
            Family::LostHope => "lost_hope",
            Family::FallenPeace => "fallen_peace",
            Family::GraciousDefeat => "gracious_defeat",
            Family::ClosedCircuits => "closed_circuits",
            Family::RighteousCreation => "righteous_creation",
            Family::StarCrossedLove => "star_crossed_love",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Family {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Family::ALL
            .into_iter()
            .find(|family| family.key() == s)
            .ok_or_else(|| BuilderError::UnknownFamily(s.to_string()))
    }
}

/// How a family's nodes relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeShape {
    /// Free prerequisite DAG; nodes toggle individually.
    #[default]
    Dag,
    /// Linear ladder; selecting a rung fills every rung below it and
    /// deselecting steps down one rung.
    Ladder,
}

/// A toggle that multiplies one sub-catalog's picks and costs one sigil.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostDefinition {
    pub id: ItemId,
    pub tier: SigilTier,
    pub sub_catalog: String,
    pub multiplier: u32,
    /// Switched on for free while the family's external flag is raised.
    #[serde(default)]
    pub forced_externally: bool,
}

/// Tier chain inside a sub-catalog: `upper` needs `lower`, and losing
/// `lower` drops `upper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadePair {
    pub sub_catalog: String,
    pub lower: ItemId,
    pub upper: ItemId,
}

/// Sub-catalog of a family: the key nodes grant picks under, and the
/// catalog group its items live in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCatalog {
    pub key: String,
    pub group: String,
}

/// Rule table for one blessing family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyDefinition {
    pub family: Family,
    #[serde(default)]
    pub shape: TreeShape,
    pub sub_catalogs: Vec<SubCatalog>,
    #[serde(default)]
    pub boosts: Vec<BoostDefinition>,
    #[serde(default)]
    pub cascade_pairs: Vec<CascadePair>,
    /// Sub-catalog ids that bind a saved build, and the kind they bind.
    #[serde(default)]
    pub assignable: BTreeMap<ItemId, BuildKind>,
}

impl FamilyDefinition {
    pub fn new(family: Family) -> Self {
        Self {
            family,
            shape: TreeShape::Dag,
            sub_catalogs: Vec::new(),
            boosts: Vec::new(),
            cascade_pairs: Vec::new(),
            assignable: BTreeMap::new(),
        }
    }

    pub fn ladder(mut self) -> Self {
        self.shape = TreeShape::Ladder;
        self
    }

    /// Add a sub-catalog whose catalog group is `<family>_<key>`.
    pub fn sub_catalog(mut self, key: &str) -> Self {
        let group = format!("{}_{}", self.family.key(), key);
        self.sub_catalogs.push(SubCatalog {
            key: key.to_string(),
            group,
        });
        self
    }

    pub fn boost(mut self, id: &str, tier: SigilTier, sub_catalog: &str, multiplier: u32) -> Self {
        self.boosts.push(BoostDefinition {
            id: id.into(),
            tier,
            sub_catalog: sub_catalog.to_string(),
            multiplier,
            forced_externally: false,
        });
        self
    }

    /// Like `boost`, but switched on for free by the external flag.
    pub fn forced_boost(
        mut self,
        id: &str,
        tier: SigilTier,
        sub_catalog: &str,
        multiplier: u32,
    ) -> Self {
        self = self.boost(id, tier, sub_catalog, multiplier);
        if let Some(last) = self.boosts.last_mut() {
            last.forced_externally = true;
        }
        self
    }

    /// Chain `ids` so that each needs the one before it.
    pub fn chain(mut self, sub_catalog: &str, ids: &[&str]) -> Self {
        for pair in ids.windows(2) {
            self.cascade_pairs.push(CascadePair {
                sub_catalog: sub_catalog.to_string(),
                lower: pair[0].into(),
                upper: pair[1].into(),
            });
        }
        self
    }

    /// Let the pick `id` point at a saved build of `kind`.
    pub fn assignable(mut self, id: &str, kind: BuildKind) -> Self {
        self.assignable.insert(id.into(), kind);
        self
    }

    pub fn has_sub_catalog(&self, key: &str) -> bool {
        self.sub_catalogs.iter().any(|sub| sub.key == key)
    }

    pub fn boost_def(&self, id: &ItemId) -> Option<&BoostDefinition> {
        self.boosts.iter().find(|boost| &boost.id == id)
    }

    /// Built-in tables for all ten families.
    pub fn standard_families() -> Vec<FamilyDefinition> {
        use SigilTier::*;

        vec![
            FamilyDefinition::new(Family::GoodTidings)
                .ladder()
                .sub_catalog("charms")
                .sub_catalog("omens")
                .forced_boost("minor_boon", Purth, "charms", 2)
                .forced_boost("major_boon", Kaarn, "omens", 2),
            FamilyDefinition::new(Family::CompellingWill)
                .sub_catalog("telekinetics")
                .sub_catalog("metamorphosis")
                .chain("telekinetics", &["tk_lift", "tk_lift_ii", "tk_lift_iii"])
                .chain("metamorphosis", &["shift_form", "shift_form_ii"]),
            FamilyDefinition::new(Family::WorldlyWisdom)
                .sub_catalog("elementalism")
                .sub_catalog("alchemy")
                .boost("eldritch_focus", Kaarn, "elementalism", 2)
                .chain("elementalism", &["fire_shaping", "fire_shaping_ii"]),
            FamilyDefinition::new(Family::BitterDissatisfaction)
                .sub_catalog("brewing")
                .sub_catalog("hexes")
                .chain("hexes", &["minor_hex", "greater_hex", "grand_hex"]),
            FamilyDefinition::new(Family::LostHope)
                .sub_catalog("necromancy")
                .sub_catalog("curses")
                .chain("necromancy", &["raise_dead", "raise_dead_ii"])
                .assignable("bound_thrall", BuildKind::Companion),
            FamilyDefinition::new(Family::FallenPeace)
                .sub_catalog("wardings")
                .sub_catalog("sanctums")
                .chain("wardings", &["ward", "ward_ii", "ward_iii"]),
            FamilyDefinition::new(Family::GraciousDefeat)
                .sub_catalog("bargains")
                .sub_catalog("guardians")
                .boost("humble_offering", Lekolu, "bargains", 2)
                .assignable("guardian_beast", BuildKind::Beast),
            FamilyDefinition::new(Family::ClosedCircuits)
                .sub_catalog("technomancy")
                .sub_catalog("constructs")
                .chain("technomancy", &["overclock", "overclock_ii"])
                .assignable("bonded_vehicle", BuildKind::Vehicle)
                .assignable("drone_companion", BuildKind::Companion),
            FamilyDefinition::new(Family::RighteousCreation)
                .sub_catalog("artifice")
                .sub_catalog("enchantments")
                .chain("enchantments", &["imbue", "imbue_ii", "imbue_iii"])
                .assignable("forged_weapon", BuildKind::Weapon),
            FamilyDefinition::new(Family::StarCrossedLove).sub_catalog("pacts"),
        ]
    }
}
