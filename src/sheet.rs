//! Character sheet module.
//!
//! `CharacterBuilder` is the single writer of a character. It owns the
//! static rules (catalog, configuration, one `SigilTree` per family) and
//! the `CharacterState`, and every mutation goes through it so the shared
//! sigil pool and the cross-family pacts stay consistent.
//!
//! After every mutation the builder settles the state:
//!
//! 1. Push the Star-Crossed Love pacts into the families that react to
//!    them (Oni's Blessing forces Good Tidings' boosts, Sinthru's Contract
//!    grants and locks its entry).
//! 2. Release sigil consumers while any tier is overdrawn.
//! 3. Prune purchases whose requirements are gone.

use crate::budget::{Budget, BudgetAggregator, BudgetSummary, Currency};
use crate::breakdown::PointBreakdown;
use crate::catalog::{Catalog, SpellIndex};
use crate::config::BuilderConfig;
use crate::error::BuilderError;
use crate::family::Family;
use crate::id::ItemId;
use crate::ordered::OrderedSet;
use crate::reference::{BuildKind, BuildRules, ReferenceBuild, ReferencePage};
use crate::sigil::{FamilySelection, SigilTree};
use crate::tier::{SigilCounts, SigilTier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Sub-catalog of Star-Crossed Love that holds the pacts.
const PACTS: &str = "pacts";

/// Everything a player has chosen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterState {
    /// Sigils granted elsewhere on the sheet.
    pub(crate) available_sigils: SigilCounts,
    pub(crate) families: BTreeMap<Family, FamilySelection>,
    /// Catalog group → purchased ids.
    pub(crate) purchases: BTreeMap<String, OrderedSet<ItemId>>,
    /// Multi-choice entry → chosen sub-choices.
    pub(crate) entry_choices: BTreeMap<ItemId, OrderedSet<ItemId>>,
    /// Choices the contract entry held before Sinthru's Contract took it over.
    pub(crate) contract_backup: Option<OrderedSet<ItemId>>,
    pub(crate) builds: BTreeMap<BuildKind, BTreeMap<String, ReferenceBuild>>,
}

impl CharacterState {
    pub fn available_sigils(&self) -> SigilCounts {
        self.available_sigils
    }

    pub fn family(&self, family: Family) -> Option<&FamilySelection> {
        self.families.get(&family)
    }

    pub fn purchases(&self, group: &str) -> &[ItemId] {
        self.purchases
            .get(group)
            .map(OrderedSet::as_slice)
            .unwrap_or(&[])
    }

    pub fn entry_choices(&self, entry: &ItemId) -> &[ItemId] {
        self.entry_choices
            .get(entry)
            .map(OrderedSet::as_slice)
            .unwrap_or(&[])
    }

    pub fn build(&self, kind: BuildKind, name: &str) -> Option<&ReferenceBuild> {
        self.builds.get(&kind).and_then(|builds| builds.get(name))
    }

    /// Saved build names of a kind, sorted.
    pub fn build_names(&self, kind: BuildKind) -> Vec<&str> {
        self.builds
            .get(&kind)
            .map(|builds| builds.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Owns a character and applies every change to it.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use magecraft::{BuilderConfig, CatalogItem, CharacterBuilder, Currency, StaticCatalog};
///
/// let catalog = StaticCatalog::new().with_group(
///     "traits",
///     vec![CatalogItem::new("unlucky", -3), CatalogItem::new("rich", 2)],
/// );
/// let mut builder = CharacterBuilder::new(Arc::new(catalog), BuilderConfig::default()).unwrap();
///
/// assert!(builder.toggle_purchase("traits", &"unlucky".into()));
/// assert!(builder.toggle_purchase("traits", &"rich".into()));
/// assert_eq!(builder.budgets().get(Currency::Fortune).delta(), 1);
/// ```
pub struct CharacterBuilder {
    catalog: Arc<dyn Catalog>,
    config: BuilderConfig,
    trees: BTreeMap<Family, SigilTree>,
    rules: BTreeMap<BuildKind, BuildRules>,
    spells: SpellIndex,
    state: CharacterState,
}

impl CharacterBuilder {
    /// Build the rules for every family and reference kind.
    ///
    /// Fails if a family's sigil table is malformed.
    pub fn new(catalog: Arc<dyn Catalog>, config: BuilderConfig) -> Result<Self, BuilderError> {
        let mut trees = BTreeMap::new();
        for definition in &config.families {
            let tree = SigilTree::new(definition.clone(), catalog.as_ref())?;
            trees.insert(definition.family, tree);
        }
        let rules = BuildKind::ALL
            .into_iter()
            .map(|kind| (kind, config.rules(kind)))
            .collect();
        let spells = SpellIndex::from_catalog(catalog.as_ref());

        Ok(Self {
            catalog,
            config,
            trees,
            rules,
            spells,
            state: CharacterState::default(),
        })
    }

    /// Rebuild a builder around stored state, repairing anything the
    /// current rules no longer allow.
    pub fn from_state(
        catalog: Arc<dyn Catalog>,
        config: BuilderConfig,
        state: CharacterState,
    ) -> Result<Self, BuilderError> {
        let mut builder = Self::new(catalog, config)?;
        builder.state = state;
        builder.repair();
        Ok(builder)
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    pub fn into_state(self) -> CharacterState {
        self.state
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    pub fn spells(&self) -> &SpellIndex {
        &self.spells
    }

    pub fn tree(&self, family: Family) -> Option<&SigilTree> {
        self.trees.get(&family)
    }

    /// A family's picks; empty if the family was never touched.
    pub fn family(&self, family: Family) -> FamilySelection {
        self.state.family(family).cloned().unwrap_or_default()
    }

    // --- sigil pool ---

    /// Sigils consumed across every family.
    pub fn used_sigil_counts(&self) -> SigilCounts {
        self.trees
            .iter()
            .filter_map(|(family, tree)| {
                self.state
                    .families
                    .get(family)
                    .map(|selection| tree.used_sigil_counts(selection))
            })
            .sum()
    }

    pub fn remaining_sigils(&self) -> SigilCounts {
        self.state
            .available_sigils
            .remaining(&self.used_sigil_counts())
    }

    /// Replace the sigil pool. Shrinking it releases the most recent
    /// consumers of every overdrawn tier.
    pub fn set_available_sigils(&mut self, available: SigilCounts) {
        self.state.available_sigils = available;
        self.settle();
    }

    pub fn sigil_tree_cost(&self, family: Family) -> i32 {
        match (self.trees.get(&family), self.state.families.get(&family)) {
            (Some(tree), Some(selection)) => tree.sigil_tree_cost(selection),
            _ => 0,
        }
    }

    pub fn available_picks(&self, family: Family, sub_catalog: &str) -> u32 {
        match (self.trees.get(&family), self.state.families.get(&family)) {
            (Some(tree), Some(selection)) => tree.available_picks(selection, sub_catalog),
            _ => 0,
        }
    }

    // --- family operations ---

    /// Click a sigil node.
    ///
    /// Selecting needs every prerequisite held and a free sigil of the
    /// node's tier. Deselecting takes every selected descendant with it,
    /// along with the picks that required them. Ladder families fill or
    /// step down one rung instead.
    ///
    /// # Arguments
    ///
    /// * `family` - The blessing family the node belongs to
    /// * `id` - The node id
    ///
    /// # Returns
    ///
    /// `true` if the selection changed, `false` if a rule blocked it.
    pub fn select_node(&mut self, family: Family, id: &ItemId) -> bool {
        let remaining = self.remaining_sigils();
        let changed = self.with_family(family, |tree, selection| {
            tree.select_node(selection, id, &remaining)
        });
        if changed {
            self.settle();
        }
        changed
    }

    /// Toggle a pick in one of a family's sub-catalogs.
    ///
    /// Adding is rejected when the quota is full, the id is not listed in
    /// the sub-catalog, the lower half of its tier pair is missing, or its
    /// `requires` are not held.
    pub fn select_sub_item(&mut self, family: Family, sub_catalog: &str, id: &ItemId) -> bool {
        let changed = self.with_family(family, |tree, selection| {
            tree.select_sub_item(selection, sub_catalog, id)
        });
        if changed {
            self.settle();
        }
        changed
    }

    /// Flip a boost's manual flag. A boost currently forced on by a pact
    /// cannot be toggled.
    pub fn toggle_boost(&mut self, family: Family, id: &ItemId) -> bool {
        let remaining = self.remaining_sigils();
        let changed = self.with_family(family, |tree, selection| {
            tree.toggle_boost(selection, id, &remaining)
        });
        if changed {
            self.settle();
        }
        changed
    }

    /// Bind a saved build to an assignable pick; an empty name clears.
    ///
    /// The build must already be saved under `name`, with the kind the
    /// pick binds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use magecraft::*;
    ///
    /// let catalog = StaticCatalog::new()
    ///     .with_sigils(
    ///         Family::LostHope,
    ///         vec![SigilNode::new("grave_touch", SigilTier::Kaarn).granting("necromancy", 1)],
    ///     )
    ///     .with_group("lost_hope_necromancy", vec![CatalogItem::new("bound_thrall", 0)]);
    /// let mut builder = CharacterBuilder::new(Arc::new(catalog), BuilderConfig::default()).unwrap();
    /// builder.set_available_sigils(SigilCounts::new().with(SigilTier::Kaarn, 1));
    /// builder.select_node(Family::LostHope, &"grave_touch".into());
    /// builder.select_sub_item(Family::LostHope, "necromancy", &"bound_thrall".into());
    ///
    /// let thrall = ItemId::new("bound_thrall");
    /// assert!(!builder.assign(Family::LostHope, &thrall, "Mortimer"));
    /// builder.upsert_build("Mortimer", ReferenceBuild::new(BuildKind::Companion));
    /// assert!(builder.assign(Family::LostHope, &thrall, "Mortimer"));
    /// ```
    pub fn assign(&mut self, family: Family, id: &ItemId, name: &str) -> bool {
        let Some(tree) = self.trees.get(&family) else {
            debug!(%family, "family has no rules");
            return false;
        };
        let builds = &self.state.builds;
        let selection = self.state.families.entry(family).or_default();
        tree.assign(selection, id, name, |kind, name| has_build(builds, kind, name))
    }

    pub fn boost_active(&self, family: Family, id: &ItemId) -> bool {
        match (self.trees.get(&family), self.state.families.get(&family)) {
            (Some(tree), Some(selection)) => tree.boost_active(selection, id),
            _ => false,
        }
    }

    fn with_family<F>(&mut self, family: Family, apply: F) -> bool
    where
        F: FnOnce(&SigilTree, &mut FamilySelection) -> bool,
    {
        let Some(tree) = self.trees.get(&family) else {
            debug!(%family, "family has no rules");
            return false;
        };
        let selection = self.state.families.entry(family).or_default();
        apply(tree, selection)
    }

    // --- purchases and entries ---

    /// Toggle a purchase from a catalog group.
    ///
    /// Adding needs every id the item `requires` to be active somewhere on
    /// the sheet.
    pub fn toggle_purchase(&mut self, group: &str, id: &ItemId) -> bool {
        let held = self
            .state
            .purchases
            .get_mut(group)
            .is_some_and(|set| set.remove(id));
        if held {
            self.settle();
            return true;
        }

        let Some(item) = self.catalog.item(group, id) else {
            debug!(group, item = %id, "unknown purchase");
            return false;
        };
        if let Some(unmet) = item.requires.iter().find(|req| !self.is_active(req)) {
            debug!(group, item = %id, %unmet, "purchase rejected: requirement not active");
            return false;
        }
        self.state
            .purchases
            .entry(group.to_string())
            .or_default()
            .insert(id.clone());
        true
    }

    /// Toggle one sub-choice of a multi-choice entry.
    pub fn toggle_entry_choice(&mut self, entry: &ItemId, choice: &ItemId) -> bool {
        let Some(rules) = self.config.entries.get(entry) else {
            return false;
        };
        if self.entry_locked(entry) {
            debug!(entry = %entry, "entry is locked by a pact");
            return false;
        }
        if !rules.choices.contains(choice) {
            return false;
        }

        let choices = self.state.entry_choices.entry(entry.clone()).or_default();
        if choices.remove(choice) {
            self.settle();
            return true;
        }
        if choices.len() as u32 >= rules.max_picks {
            debug!(entry = %entry, max = rules.max_picks, "entry choices full");
            return false;
        }
        choices.insert(choice.clone());
        true
    }

    /// Whether a pact currently controls the entry.
    pub fn entry_locked(&self, entry: &ItemId) -> bool {
        *entry == self.config.pacts.contract_entry && self.pact_active(&self.config.pacts.sinthru_contract)
    }

    pub fn pact_active(&self, pact: &ItemId) -> bool {
        self.state
            .families
            .get(&Family::StarCrossedLove)
            .is_some_and(|selection| selection.has_pick(PACTS, pact))
    }

    /// Whether an id is held anywhere on the sheet.
    pub fn is_active(&self, id: &ItemId) -> bool {
        self.state.purchases.values().any(|set| set.contains(id))
            || self.state.entry_choices.values().any(|set| set.contains(id))
            || self.state.families.values().any(|selection| {
                selection.has_node(id) || selection.picks.values().any(|set| set.contains(id))
            })
    }

    // --- reference builds ---

    /// The page engine for a kind, borrowing this builder's rules.
    pub fn reference_page(&self, kind: BuildKind) -> Option<ReferencePage<'_>> {
        self.rules
            .get(&kind)
            .map(|rules| ReferencePage::new(rules, self.catalog.as_ref(), &self.spells))
    }

    /// Store a build under `name`, repaired against the current rules.
    pub fn upsert_build(&mut self, name: &str, mut build: ReferenceBuild) {
        if let Some(page) = self.reference_page(build.kind()) {
            page.repair(&mut build);
        }
        self.state
            .builds
            .entry(build.kind())
            .or_default()
            .insert(name.to_string(), build);
    }

    /// Remove a build and clear every assignment that pointed at it.
    pub fn remove_build(&mut self, kind: BuildKind, name: &str) -> Option<ReferenceBuild> {
        let removed = self.state.builds.get_mut(&kind)?.remove(name)?;

        for (other_kind, builds) in self.state.builds.iter_mut() {
            let Some(rules) = self.rules.get(other_kind) else {
                continue;
            };
            for build in builds.values_mut() {
                build
                    .assignments
                    .retain(|perk, target| !(rules.assignable.get(perk) == Some(&kind) && target.as_str() == name));
            }
        }
        for (family, selection) in self.state.families.iter_mut() {
            let Some(tree) = self.trees.get(family) else {
                continue;
            };
            selection
                .assignments
                .retain(|id, target| !(tree.assign_kind(id) == Some(kind) && target.as_str() == name));
        }
        Some(removed)
    }

    /// Apply an edit to a stored build through its page.
    ///
    /// # Returns
    ///
    /// Whatever `edit` returns, or `None` when no build of that kind is
    /// saved under `name`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use magecraft::*;
    ///
    /// let catalog = StaticCatalog::new()
    ///     .with_group("vehicle_categories", vec![CatalogItem::new("skiff", 3)]);
    /// let mut builder = CharacterBuilder::new(Arc::new(catalog), BuilderConfig::default()).unwrap();
    /// builder.upsert_build("Nautilus", ReferenceBuild::new(BuildKind::Vehicle));
    ///
    /// let added = builder.edit_build(BuildKind::Vehicle, "Nautilus", |page, build| {
    ///     page.toggle_category(build, &"skiff".into())
    /// });
    /// assert_eq!(added, Some(true));
    /// assert_eq!(builder.build_points(BuildKind::Vehicle, "Nautilus").unwrap().total, 3);
    /// assert!(builder.edit_build(BuildKind::Vehicle, "Ghost", |_, _| ()).is_none());
    /// ```
    pub fn edit_build<F, R>(&mut self, kind: BuildKind, name: &str, edit: F) -> Option<R>
    where
        F: FnOnce(&ReferencePage<'_>, &mut ReferenceBuild) -> R,
    {
        let rules = self.rules.get(&kind)?;
        let build = self.state.builds.get_mut(&kind)?.get_mut(name)?;
        let page = ReferencePage::new(rules, self.catalog.as_ref(), &self.spells);
        Some(edit(&page, build))
    }

    /// Point a perk of one build at another saved build.
    ///
    /// The target must exist and be of the kind the perk binds.
    pub fn assign_build(&mut self, kind: BuildKind, name: &str, perk: &ItemId, target: &str) -> bool {
        if !target.is_empty() {
            let Some(target_kind) = self.rules.get(&kind).and_then(|r| r.assignable.get(perk)) else {
                return false;
            };
            if self.state.build(*target_kind, target).is_none() {
                debug!(perk = %perk, target, "assignment target does not exist");
                return false;
            }
        }
        self.edit_build(kind, name, |page, build| page.assign(build, perk, target))
            .unwrap_or(false)
    }

    /// Itemised price of a saved build, in its kind's currency.
    pub fn build_points(&self, kind: BuildKind, name: &str) -> Option<PointBreakdown> {
        let build = self.state.build(kind, name)?;
        Some(self.reference_page(kind)?.points(build))
    }

    /// A build's points against the allowance for its kind.
    pub fn build_budget(&self, kind: BuildKind, name: &str) -> Option<Budget> {
        let points = self.build_points(kind, name)?;
        Some(Budget {
            currency: kind.currency(),
            cap: self.config.budget.allowance(kind),
            spent: points.total,
        })
    }

    // --- budgets ---

    /// Fortune and Blessing balances.
    ///
    /// Fortune is every purchase in a Fortune group. Blessing is every
    /// family's sigil cost, every purchase in a Blessing group, and the BP
    /// redirected into reference builds.
    pub fn budgets(&self) -> BudgetSummary {
        let mut aggregator = BudgetAggregator::new();

        for (group, ids) in &self.state.purchases {
            let currency = self.config.budget.currency_of(group);
            for id in ids.iter() {
                aggregator.add_line(
                    currency,
                    format!("{}: {}", group, id),
                    self.catalog.cost_of(group, id),
                );
            }
        }

        for family in self.trees.keys() {
            let cost = self.sigil_tree_cost(*family);
            if cost != 0 {
                aggregator.add_line(Currency::Blessing, format!("Sigils: {}", family), cost);
            }
        }

        for (kind, builds) in &self.state.builds {
            for (name, build) in builds {
                if build.bp_spent() > 0 {
                    aggregator.add_line(
                        Currency::Blessing,
                        format!("BP into {} {}", kind, name),
                        i32::try_from(build.bp_spent()).unwrap_or(i32::MAX),
                    );
                }
            }
        }

        aggregator.finish([
            (Currency::Fortune, self.config.budget.fortune_cap),
            (Currency::Blessing, self.config.budget.blessing_cap),
        ])
    }

    // --- settling ---

    fn settle(&mut self) {
        loop {
            self.sync_pacts();
            if !self.release_overdrawn() {
                break;
            }
        }
        self.prune_purchases();
    }

    /// Push the Star-Crossed Love pacts into the parts of the sheet that
    /// react to them.
    fn sync_pacts(&mut self) {
        let oni = self.pact_active(&self.config.pacts.onis_blessing);
        if let Some(tree) = self.trees.get(&Family::GoodTidings) {
            let selection = self.state.families.entry(Family::GoodTidings).or_default();
            tree.set_forced_boosts(selection, oni);
        }

        let contract = self.pact_active(&self.config.pacts.sinthru_contract);
        let entry = self.config.pacts.contract_entry.clone();
        match (contract, self.state.contract_backup.is_some()) {
            (true, false) => {
                let granted: OrderedSet<ItemId> = self
                    .config
                    .entries
                    .get(&entry)
                    .map(|rules| rules.choices.iter().cloned().collect())
                    .unwrap_or_default();
                let prior = self.state.entry_choices.insert(entry.clone(), granted);
                self.state.contract_backup = Some(prior.unwrap_or_default());
                debug!(entry = %entry, "contract granted every choice");
            }
            (false, true) => {
                let prior = self.state.contract_backup.take().unwrap_or_default();
                if prior.is_empty() {
                    self.state.entry_choices.remove(&entry);
                } else {
                    self.state.entry_choices.insert(entry.clone(), prior);
                }
                debug!(entry = %entry, "contract lifted, prior choices restored");
            }
            _ => {}
        }
    }

    /// Release one consumer of the first overdrawn tier. Returns `false`
    /// when nothing is overdrawn or nothing could be released.
    fn release_overdrawn(&mut self) -> bool {
        let used = self.used_sigil_counts();
        let Some(tier) = used.first_overdrawn(&self.state.available_sigils) else {
            return false;
        };
        self.release_tier(tier)
    }

    /// Families are asked last-to-first, so the most recently listed
    /// family gives up a sigil first.
    fn release_tier(&mut self, tier: SigilTier) -> bool {
        for (family, tree) in self.trees.iter().rev() {
            if let Some(selection) = self.state.families.get_mut(family) {
                if tree.release_one(selection, tier) {
                    debug!(%family, %tier, "released sigil for capacity");
                    return true;
                }
            }
        }
        false
    }

    /// Drop purchases whose requirements are no longer active, until none are left.
    fn prune_purchases(&mut self) {
        loop {
            let mut unmet = Vec::new();
            for (group, ids) in &self.state.purchases {
                for id in ids.iter() {
                    let requires = self
                        .catalog
                        .item(group, id)
                        .map(|item| item.requires.as_slice())
                        .unwrap_or(&[]);
                    if requires.iter().any(|req| !self.is_active(req)) {
                        unmet.push((group.clone(), id.clone()));
                    }
                }
            }
            if unmet.is_empty() {
                break;
            }
            for (group, id) in unmet {
                debug!(group = %group, item = %id, "purchase lost its requirement");
                if let Some(set) = self.state.purchases.get_mut(&group) {
                    set.remove(&id);
                }
            }
        }
    }

    /// Bring stored state back in line with the current rules.
    fn repair(&mut self) {
        let trees = &self.trees;
        self.state.families.retain(|family, _| trees.contains_key(family));
        for (family, selection) in self.state.families.iter_mut() {
            if let Some(tree) = trees.get(family) {
                tree.repair(selection);
            }
        }

        let catalog = self.catalog.as_ref();
        for (group, ids) in self.state.purchases.iter_mut() {
            for id in ids.retain(|id| catalog.item(group, id).is_some()) {
                debug!(group = %group, item = %id, "dropped unknown purchase");
            }
        }
        self.state.purchases.retain(|_, ids| !ids.is_empty());

        let entries = &self.config.entries;
        self.state.entry_choices.retain(|entry, _| entries.contains_key(entry));
        for (entry, choices) in self.state.entry_choices.iter_mut() {
            if let Some(rules) = entries.get(entry) {
                choices.retain(|c| rules.choices.contains(c));
            }
        }
        if let Some(backup) = self.state.contract_backup.as_mut() {
            if let Some(rules) = entries.get(&self.config.pacts.contract_entry) {
                backup.retain(|c| rules.choices.contains(c));
                backup.truncate(rules.max_picks as usize);
            }
        }

        let builds = std::mem::take(&mut self.state.builds);
        for (_, named) in builds {
            for (name, build) in named {
                self.upsert_build(&name, build);
            }
        }

        let trees = &self.trees;
        let builds = &self.state.builds;
        for (family, selection) in self.state.families.iter_mut() {
            let Some(tree) = trees.get(family) else {
                continue;
            };
            selection.assignments.retain(|id, name| {
                tree.assign_kind(id)
                    .is_some_and(|kind| has_build(builds, kind, name))
            });
        }

        self.settle();

        let locked = self.entry_locked(&self.config.pacts.contract_entry);
        let entries = &self.config.entries;
        for (entry, choices) in self.state.entry_choices.iter_mut() {
            if locked && *entry == self.config.pacts.contract_entry {
                continue;
            }
            if let Some(rules) = entries.get(entry) {
                choices.truncate(rules.max_picks as usize);
            }
        }
    }
}

fn has_build(
    builds: &BTreeMap<BuildKind, BTreeMap<String, ReferenceBuild>>,
    kind: BuildKind,
    name: &str,
) -> bool {
    builds.get(&kind).is_some_and(|named| named.contains_key(name))
}
