//! Constrained multi-select ("MAP selection") module.
//!
//! A MAP selection lets a perk grant "N picks from the full spell
//! catalog" under a composable set of constraints. `MapConfig` holds the
//! constraints, `MapSelection` holds the picks, and all checks run in
//! `MapConfig::toggle` in a fixed order:
//!
//! ```text
//! banned id/grade → cost cap → max total → exclusive grades → per-grade limit → blessing cap
//! ```
//!
//! Rejections are silent. The only human-readable error is produced by
//! the confirm-time validator.

use crate::catalog::{SpellEntry, SpellIndex};
use crate::error::BuilderError;
use crate::id::ItemId;
use crate::tier::Grade;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Whole-selection check run when the dialog is confirmed.
pub trait MapValidator: Send + Sync + fmt::Debug {
    /// Inspect the counted (non-mandatory) picks.
    fn validate(&self, picks: &[SpellEntry]) -> Result<(), String>;
}

/// Built-in validators that can live in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidatorRule {
    /// A spell of `grade` needs at least `min` counted picks from its own
    /// thematic group.
    MinGroupPicksForGrade { grade: Grade, min: usize },
}

impl MapValidator for ValidatorRule {
    fn validate(&self, picks: &[SpellEntry]) -> Result<(), String> {
        match self {
            ValidatorRule::MinGroupPicksForGrade { grade, min } => {
                for pick in picks.iter().filter(|p| p.grade == Some(*grade)) {
                    let in_group = picks.iter().filter(|p| p.blessing == pick.blessing).count();
                    if in_group < *min {
                        return Err(format!(
                            "To pick a {} spell from {} you need at least {} picks from {} ({} chosen)",
                            grade, pick.blessing, min, pick.blessing, in_group
                        ));
                    }
                }
                Ok(())
            }
        }
    }
}

/// Constraints of one MAP selection.
///
/// # Examples
///
/// ```rust
/// use magecraft::{Grade, MapConfig};
///
/// let attune = MapConfig::new()
///     .limit(Grade::Kaarn, 2)
///     .limit(Grade::Purth, 1)
///     .exclusive()
///     .ban_grade(Grade::Sinthru);
///
/// assert!(attune.is_exclusive());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    #[serde(default)]
    limits: BTreeMap<Grade, u32>,
    #[serde(default)]
    max_total: Option<u32>,
    #[serde(default)]
    exclusive: bool,
    #[serde(default)]
    banned_ids: BTreeSet<ItemId>,
    #[serde(default)]
    banned_grades: BTreeSet<Grade>,
    #[serde(default)]
    mandatory: Vec<ItemId>,
    #[serde(default)]
    max_blessings: Option<u32>,
    #[serde(default)]
    grade_costs: Option<GradeCosts>,
    #[serde(default)]
    validator: Option<ValidatorRule>,
    #[serde(skip)]
    custom_validator: Option<Arc<dyn MapValidator>>,
}

/// Per-grade point cost with a cap on the summed cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeCosts {
    pub costs: BTreeMap<Grade, u32>,
    pub max_cost: u32,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of picks of one grade.
    pub fn limit(mut self, grade: Grade, max: u32) -> Self {
        self.limits.insert(grade, max);
        self
    }

    /// Cap picks across all grades; per-grade limits are then ignored.
    pub fn max_total(mut self, max: u32) -> Self {
        self.max_total = Some(max);
        self
    }

    /// Once a capped grade is picked, other capped grades are locked out.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    pub fn ban_id(mut self, id: impl Into<ItemId>) -> Self {
        self.banned_ids.insert(id.into());
        self
    }

    pub fn ban_grade(mut self, grade: Grade) -> Self {
        self.banned_grades.insert(grade);
        self
    }

    /// Pre-selected, locked, and left out of every count and cost.
    pub fn mandatory(mut self, id: impl Into<ItemId>) -> Self {
        self.mandatory.push(id.into());
        self
    }

    /// Cap the number of distinct thematic groups picks may come from.
    pub fn max_blessings(mut self, max: u32) -> Self {
        self.max_blessings = Some(max);
        self
    }

    pub fn grade_costs(mut self, costs: BTreeMap<Grade, u32>, max_cost: u32) -> Self {
        self.grade_costs = Some(GradeCosts { costs, max_cost });
        self
    }

    /// Require `min` same-group picks alongside any pick of `grade`.
    pub fn require_group_picks(mut self, grade: Grade, min: usize) -> Self {
        self.validator = Some(ValidatorRule::MinGroupPicksForGrade { grade, min });
        self
    }

    /// Attach a caller-supplied confirm-time validator.
    pub fn validator(mut self, validator: Arc<dyn MapValidator>) -> Self {
        self.custom_validator = Some(validator);
        self
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    pub fn is_mandatory(&self, id: &ItemId) -> bool {
        self.mandatory.contains(id)
    }

    /// An empty selection holding only the mandatory picks.
    pub fn start(&self, spells: &SpellIndex) -> MapSelection {
        let picks = self
            .mandatory
            .iter()
            .map(|id| {
                spells.get(id).cloned().unwrap_or_else(|| SpellEntry {
                    id: id.clone(),
                    grade: None,
                    blessing: String::new(),
                })
            })
            .collect();
        MapSelection { picks }
    }

    /// Rebuild a selection from stored ids.
    ///
    /// Ids are replayed through `toggle`, so anything the rules no longer
    /// allow (or the catalog no longer has) is dropped.
    ///
    /// # Arguments
    ///
    /// * `spells` - The spell index the ids are looked up in
    /// * `ids` - Stored picks, in the order they were made
    ///
    /// # Returns
    ///
    /// The mandatory picks followed by every stored id that still fits.
    pub fn restore<'a, I>(&self, spells: &SpellIndex, ids: I) -> MapSelection
    where
        I: IntoIterator<Item = &'a ItemId>,
    {
        let mut selection = self.start(spells);
        for id in ids {
            if selection.contains(id) {
                continue;
            }
            match spells.get(id) {
                Some(spell) => {
                    if !self.toggle(&mut selection, spell) {
                        debug!(spell = %id, "dropped stored MAP pick");
                    }
                }
                None => debug!(spell = %id, "stored MAP pick not in catalog"),
            }
        }
        selection
    }

    /// Toggle a spell.
    ///
    /// Removal always succeeds except for mandatory picks. Addition runs
    /// the checks in the module-level order and stops at the first failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use magecraft::{CatalogItem, Grade, MapConfig, SpellIndex, StaticCatalog};
    ///
    /// let catalog = StaticCatalog::new().with_spell_group(
    ///     "necromancy",
    ///     vec![
    ///         CatalogItem::new("bone_spear", 0).with_grade(Grade::Kaarn),
    ///         CatalogItem::new("death_knell", 0).with_grade(Grade::Xuth),
    ///     ],
    /// );
    /// let spells = SpellIndex::from_catalog(&catalog);
    /// let spear = spells.get(&"bone_spear".into()).unwrap();
    /// let knell = spells.get(&"death_knell".into()).unwrap();
    ///
    /// let config = MapConfig::new()
    ///     .limit(Grade::Kaarn, 1)
    ///     .limit(Grade::Xuth, 1)
    ///     .exclusive();
    /// let mut selection = config.start(&spells);
    ///
    /// assert!(config.toggle(&mut selection, spear));
    /// // another capped grade is locked out
    /// assert!(!config.toggle(&mut selection, knell));
    /// assert!(config.toggle(&mut selection, spear));
    /// assert!(config.toggle(&mut selection, knell));
    /// ```
    pub fn toggle(&self, selection: &mut MapSelection, spell: &SpellEntry) -> bool {
        if let Some(pos) = selection.picks.iter().position(|p| p.id == spell.id) {
            if self.is_mandatory(&spell.id) {
                return false;
            }
            selection.picks.remove(pos);
            return true;
        }

        match self.rejection(selection, spell) {
            Some(reason) => {
                debug!(spell = %spell.id, reason, "MAP pick rejected");
                false
            }
            None => {
                selection.picks.push(spell.clone());
                true
            }
        }
    }

    fn rejection(&self, selection: &MapSelection, spell: &SpellEntry) -> Option<&'static str> {
        if self.banned_ids.contains(&spell.id) {
            return Some("banned id");
        }
        if spell.grade.is_some_and(|g| self.banned_grades.contains(&g)) {
            return Some("banned grade");
        }

        let counted = self.counted(selection);

        if let Some(grade_costs) = &self.grade_costs {
            let cost_of = |grade: Option<Grade>| {
                grade
                    .and_then(|g| grade_costs.costs.get(&g).copied())
                    .unwrap_or(0)
            };
            let current: u32 = counted.iter().map(|p| cost_of(p.grade)).sum();
            if current + cost_of(spell.grade) > grade_costs.max_cost {
                return Some("cost cap");
            }
        }

        if let Some(max_total) = self.max_total {
            if counted.len() as u32 >= max_total {
                return Some("max total");
            }
        }

        let capped = |grade: Option<Grade>| grade.is_some_and(|g| self.limits.contains_key(&g));
        if self.exclusive && capped(spell.grade) {
            let conflict = counted
                .iter()
                .any(|p| capped(p.grade) && p.grade != spell.grade);
            if conflict {
                return Some("exclusive grade");
            }
        }

        if self.max_total.is_none() && !self.limits.is_empty() {
            let limit = spell
                .grade
                .and_then(|g| self.limits.get(&g).copied())
                .unwrap_or(0);
            let same = counted.iter().filter(|p| p.grade == spell.grade).count() as u32;
            if same >= limit {
                return Some("grade limit");
            }
        }

        if let Some(max_blessings) = self.max_blessings {
            let groups: BTreeSet<&str> = counted.iter().map(|p| p.blessing.as_str()).collect();
            if !groups.contains(spell.blessing.as_str()) && groups.len() as u32 >= max_blessings {
                return Some("blessing cap");
            }
        }

        None
    }

    /// Picks that count toward limits and costs.
    pub fn counted<'a>(&self, selection: &'a MapSelection) -> Vec<&'a SpellEntry> {
        selection
            .picks
            .iter()
            .filter(|p| !self.is_mandatory(&p.id))
            .collect()
    }

    /// Run the confirm-time validators.
    ///
    /// # Errors
    ///
    /// `BuilderError::SelectionRejected` carrying the first validator's
    /// message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use magecraft::{BuilderError, CatalogItem, Grade, ItemId, MapConfig, SpellIndex, StaticCatalog};
    ///
    /// let catalog = StaticCatalog::new().with_spell_group(
    ///     "necromancy",
    ///     vec![
    ///         CatalogItem::new("bone_spear", 0).with_grade(Grade::Kaarn),
    ///         CatalogItem::new("death_knell", 0).with_grade(Grade::Xuth),
    ///     ],
    /// );
    /// let spells = SpellIndex::from_catalog(&catalog);
    /// let config = MapConfig::new().max_total(2).require_group_picks(Grade::Xuth, 2);
    ///
    /// let knell = ItemId::new("death_knell");
    /// let spear = ItemId::new("bone_spear");
    ///
    /// let selection = config.restore(&spells, [&knell]);
    /// assert!(matches!(config.confirm(&selection), Err(BuilderError::SelectionRejected(_))));
    ///
    /// let selection = config.restore(&spells, [&knell, &spear]);
    /// assert!(config.confirm(&selection).is_ok());
    /// ```
    pub fn confirm(&self, selection: &MapSelection) -> Result<(), BuilderError> {
        let counted: Vec<SpellEntry> = self.counted(selection).into_iter().cloned().collect();
        if let Some(rule) = &self.validator {
            rule.validate(&counted).map_err(BuilderError::SelectionRejected)?;
        }
        if let Some(custom) = &self.custom_validator {
            custom.validate(&counted).map_err(BuilderError::SelectionRejected)?;
        }
        Ok(())
    }
}

/// Picks of one MAP selection, mandatory ones included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapSelection {
    picks: Vec<SpellEntry>,
}

impl MapSelection {
    pub fn picks(&self) -> &[SpellEntry] {
        &self.picks
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.picks.iter().any(|p| &p.id == id)
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.picks.iter().map(|p| p.id.clone()).collect()
    }

    /// Number of picks of a grade, mandatory ones included.
    pub fn count_grade(&self, grade: Grade) -> usize {
        self.picks.iter().filter(|p| p.grade == Some(grade)).count()
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }
}
