//! Builder configuration.
//!
//! `BuilderConfig` gathers every rule table the builder reads: point caps,
//! which catalog groups are priced in which currency, the blessing family
//! tables, the reference page rules, the cross-family pacts and the
//! multi-choice sheet entries. `Default` ships the built-in tables; a JSON
//! file may override any part of them.

use crate::budget::Currency;
use crate::error::BuilderError;
use crate::family::FamilyDefinition;
use crate::id::ItemId;
use crate::reference::{BuildKind, BuildRules};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caps and currency routing for the character sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetConfig {
    pub fortune_cap: i32,
    pub blessing_cap: i32,
    /// Currency of purchases per catalog group; unlisted groups are Fortune.
    pub group_currencies: BTreeMap<String, Currency>,
    /// Points each reference build starts with, before BP is redirected.
    pub reference_allowances: BTreeMap<BuildKind, i32>,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            fortune_cap: 60,
            blessing_cap: 40,
            group_currencies: BTreeMap::new(),
            reference_allowances: BTreeMap::new(),
        }
    }
}

impl BudgetConfig {
    pub fn currency_of(&self, group: &str) -> Currency {
        self.group_currencies
            .get(group)
            .copied()
            .unwrap_or(Currency::Fortune)
    }

    pub fn allowance(&self, kind: BuildKind) -> i32 {
        self.reference_allowances.get(&kind).copied().unwrap_or(0)
    }
}

/// The Star-Crossed Love pacts other parts of the sheet react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PactConfig {
    /// Pact whose presence forces Good Tidings' boosts on.
    pub onis_blessing: ItemId,
    /// Pact that grants every choice of `contract_entry` and locks it.
    pub sinthru_contract: ItemId,
    pub contract_entry: ItemId,
}

impl Default for PactConfig {
    fn default() -> Self {
        Self {
            onis_blessing: ItemId::new("onis_blessing"),
            sinthru_contract: ItemId::new("sinthrus_contract"),
            contract_entry: ItemId::new("fae_heritage"),
        }
    }
}

/// A sheet entry that takes several sub-choices, e.g. a heritage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceEntry {
    pub choices: Vec<ItemId>,
    pub max_picks: u32,
}

/// Every rule table the builder reads.
///
/// # Examples
///
/// ```rust
/// use magecraft::BuilderConfig;
///
/// let config = BuilderConfig::from_json(r#"{"budget": {"fortuneCap": 10}}"#).unwrap();
/// assert_eq!(config.budget.fortune_cap, 10);
/// assert_eq!(config.families.len(), 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderConfig {
    pub budget: BudgetConfig,
    pub families: Vec<FamilyDefinition>,
    pub reference: BTreeMap<BuildKind, BuildRules>,
    pub pacts: PactConfig,
    pub entries: BTreeMap<ItemId, ChoiceEntry>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        let contract_entry = ChoiceEntry {
            choices: ["glamour", "wild_hunt", "iron_ward", "changeling_blood"]
                .into_iter()
                .map(ItemId::new)
                .collect(),
            max_picks: 2,
        };

        Self {
            budget: BudgetConfig::default(),
            families: FamilyDefinition::standard_families(),
            reference: BuildKind::ALL
                .into_iter()
                .map(|kind| (kind, BuildRules::standard(kind)))
                .collect(),
            pacts: PactConfig::default(),
            entries: BTreeMap::from([(ItemId::new("fae_heritage"), contract_entry)]),
        }
    }
}

impl BuilderConfig {
    /// Parse a configuration, filling missing sections with the defaults.
    pub fn from_json(json: &str) -> Result<Self, BuilderError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn rules(&self, kind: BuildKind) -> BuildRules {
        self.reference
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| BuildRules::standard(kind))
    }
}
