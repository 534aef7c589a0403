//! Sigil tree module.
//!
//! Provides `SigilTree`, the rule engine shared by every blessing family,
//! and `FamilySelection`, the mutable picks of one family. The tree holds
//! the static rules (nodes, prerequisite graph, sub-catalog requirements)
//! and every operation takes the selection it should mutate.
//!
//! Operations never fail. They return `true` when applied and leave the
//! selection untouched when a rule blocks them.

use crate::catalog::{Catalog, SigilNode};
use crate::error::BuilderError;
use crate::family::{Family, FamilyDefinition, TreeShape};
use crate::graph::PrerequisiteGraph;
use crate::id::ItemId;
use crate::ordered::OrderedSet;
use crate::reference::BuildKind;
use crate::tier::{SigilCounts, SigilTier};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Mutable state of one blessing family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilySelection {
    /// Selected sigil nodes in the order they were picked.
    #[serde(default)]
    pub(crate) nodes: OrderedSet<ItemId>,
    /// Picks per sub-catalog key.
    #[serde(default)]
    pub(crate) picks: BTreeMap<String, OrderedSet<ItemId>>,
    /// Boosts the user switched on, kept even while forced on externally.
    #[serde(default)]
    pub(crate) manual_boosts: OrderedSet<ItemId>,
    /// External flag that forces some boosts on for free.
    #[serde(default)]
    pub(crate) forced: bool,
    /// Sub-build names bound to assignable picks.
    #[serde(default)]
    pub(crate) assignments: BTreeMap<ItemId, String>,
}

impl FamilySelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &OrderedSet<ItemId> {
        &self.nodes
    }

    pub fn has_node(&self, id: &ItemId) -> bool {
        self.nodes.contains(id)
    }

    /// Picks in one sub-catalog, in pick order.
    pub fn picks(&self, sub_catalog: &str) -> &[ItemId] {
        self.picks
            .get(sub_catalog)
            .map(OrderedSet::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_pick(&self, sub_catalog: &str, id: &ItemId) -> bool {
        self.picks(sub_catalog).contains(id)
    }

    /// Whether the user switched a boost on, regardless of forcing.
    pub fn manual_boost(&self, id: &ItemId) -> bool {
        self.manual_boosts.contains(id)
    }

    pub fn is_forced(&self) -> bool {
        self.forced
    }

    pub fn assignment(&self, id: &ItemId) -> Option<&str> {
        self.assignments.get(id).map(String::as_str)
    }

    fn all_picks(&self) -> impl Iterator<Item = &ItemId> {
        self.picks.values().flat_map(|set| set.iter())
    }
}

/// Static rules of one blessing family.
///
/// # Examples
///
/// ```rust
/// use magecraft::{Family, FamilyDefinition, SigilCounts, SigilNode, SigilTier, StaticCatalog};
/// use magecraft::sigil::{FamilySelection, SigilTree};
///
/// let catalog = StaticCatalog::new().with_sigils(
///     Family::CompellingWill,
///     vec![
///         SigilNode::new("root", SigilTier::Kaarn).granting("telekinetics", 2),
///         SigilNode::new("mid", SigilTier::Purth).after(["root"]),
///     ],
/// );
/// let definition = FamilyDefinition::new(Family::CompellingWill).sub_catalog("telekinetics");
/// let tree = SigilTree::new(definition, &catalog).unwrap();
///
/// let mut selection = FamilySelection::new();
/// let pool = SigilCounts::new().with(SigilTier::Kaarn, 1).with(SigilTier::Purth, 1);
///
/// assert!(!tree.select_node(&mut selection, &"mid".into(), &pool));
/// assert!(tree.select_node(&mut selection, &"root".into(), &pool));
/// assert_eq!(tree.available_picks(&selection, "telekinetics"), 2);
/// assert_eq!(tree.sigil_tree_cost(&selection), 3);
/// ```
pub struct SigilTree {
    definition: FamilyDefinition,
    nodes: Vec<SigilNode>,
    tiers: HashMap<ItemId, SigilTier>,
    graph: PrerequisiteGraph,
    /// Ladder rungs bottom to top; empty for DAG families.
    ladder: Vec<ItemId>,
    /// Known ids and their `requires` per sub-catalog key.
    sub_items: HashMap<String, HashMap<ItemId, Vec<ItemId>>>,
}

impl SigilTree {
    /// Build a family's rules from its definition and the catalog.
    ///
    /// Fails if a node has no tier suffix, names an unknown prerequisite,
    /// or the prerequisites form a cycle.
    pub fn new(definition: FamilyDefinition, catalog: &dyn Catalog) -> Result<Self, BuilderError> {
        let nodes = catalog.sigil_nodes(definition.family).to_vec();

        let mut tiers = HashMap::new();
        let mut graph = PrerequisiteGraph::new();
        for node in &nodes {
            tiers.insert(node.id.clone(), node.tier()?);
            graph.add_node(node.id.clone());
        }
        for node in &nodes {
            for prerequisite in &node.prerequisites {
                if !tiers.contains_key(prerequisite) {
                    return Err(BuilderError::UnknownPrerequisite {
                        node: node.id.clone(),
                        missing: prerequisite.clone(),
                    });
                }
                graph.add_edge(node.id.clone(), prerequisite.clone());
            }
        }
        let order = graph.topological_sort()?;
        let ladder = match definition.shape {
            TreeShape::Ladder => order,
            TreeShape::Dag => Vec::new(),
        };

        let mut sub_items = HashMap::new();
        for sub in &definition.sub_catalogs {
            let items: HashMap<ItemId, Vec<ItemId>> = catalog
                .group(&sub.group)
                .iter()
                .map(|item| (item.id.clone(), item.requires.clone()))
                .collect();
            sub_items.insert(sub.key.clone(), items);
        }

        Ok(Self {
            definition,
            nodes,
            tiers,
            graph,
            ladder,
            sub_items,
        })
    }

    pub fn family(&self) -> Family {
        self.definition.family
    }

    pub fn definition(&self) -> &FamilyDefinition {
        &self.definition
    }

    pub fn nodes(&self) -> &[SigilNode] {
        &self.nodes
    }

    pub fn tier_of(&self, id: &ItemId) -> Option<SigilTier> {
        self.tiers.get(id).copied()
    }

    /// Toggle a sigil node.
    ///
    /// Selecting needs every prerequisite selected and a free sigil of the
    /// node's tier in `remaining`. Deselecting removes the node together
    /// with every selected node downstream of it, drops sub-catalog picks
    /// that required any of them, and trims over-quota sub-catalogs.
    pub fn select_node(
        &self,
        selection: &mut FamilySelection,
        id: &ItemId,
        remaining: &SigilCounts,
    ) -> bool {
        let Some(tier) = self.tier_of(id) else {
            debug!(family = %self.family(), node = %id, "unknown sigil node");
            return false;
        };

        if self.definition.shape == TreeShape::Ladder {
            return self.select_rung(selection, id, remaining);
        }

        if selection.nodes.contains(id) {
            let closure = self
                .graph
                .dependents_closure(id, |n| selection.nodes.contains(n));
            for node in &closure {
                selection.nodes.remove(node);
            }
            debug!(family = %self.family(), node = %id, removed = closure.len(), "sigil node removed");
            self.drop_requiring(selection, &closure);
            self.trim(selection);
            return true;
        }

        let missing = self
            .graph
            .prerequisites_of(id)
            .into_iter()
            .find(|p| !selection.nodes.contains(p));
        if let Some(missing) = missing {
            debug!(family = %self.family(), node = %id, %missing, "sigil node rejected: missing prerequisite");
            return false;
        }
        if remaining.get(tier) < 1 {
            debug!(family = %self.family(), node = %id, %tier, "sigil node rejected: no sigil left");
            return false;
        }

        selection.nodes.insert(id.clone());
        true
    }

    /// Ladder variant of `select_node`.
    ///
    /// Picking a rung above the current top fills every rung in between,
    /// provided the pool covers all of them at once. Picking a rung that is
    /// already held steps down by exactly one rung.
    fn select_rung(
        &self,
        selection: &mut FamilySelection,
        id: &ItemId,
        remaining: &SigilCounts,
    ) -> bool {
        let Some(target) = self.ladder.iter().position(|rung| rung == id) else {
            return false;
        };
        let current = self.ladder_level(selection);

        if target < current {
            let top = self.ladder[current - 1].clone();
            selection.nodes.remove(&top);
            debug!(family = %self.family(), rung = %top, "ladder stepped down");
            self.drop_requiring(selection, std::slice::from_ref(&top));
            self.trim(selection);
            return true;
        }

        let mut needed = SigilCounts::new();
        for rung in &self.ladder[current..=target] {
            if let Some(tier) = self.tier_of(rung) {
                needed.add(tier, 1);
            }
        }
        if !needed.fits_within(remaining) {
            debug!(family = %self.family(), rung = %id, "ladder rejected: not enough sigils");
            return false;
        }

        for rung in &self.ladder[current..=target] {
            selection.nodes.insert(rung.clone());
        }
        true
    }

    /// Number of consecutive ladder rungs held, counting from the bottom.
    pub fn ladder_level(&self, selection: &FamilySelection) -> usize {
        self.ladder
            .iter()
            .take_while(|rung| selection.nodes.contains(*rung))
            .count()
    }

    /// Toggle a pick in one of the family's sub-catalogs.
    ///
    /// Adding needs room under the sub-catalog's quota, the lower half of
    /// any cascade pair, and every id the item `requires`.
    pub fn select_sub_item(
        &self,
        selection: &mut FamilySelection,
        sub_catalog: &str,
        id: &ItemId,
    ) -> bool {
        let Some(known) = self.sub_items.get(sub_catalog) else {
            debug!(family = %self.family(), sub_catalog, "unknown sub-catalog");
            return false;
        };
        if !known.contains_key(id) {
            debug!(family = %self.family(), sub_catalog, item = %id, "unknown sub-catalog item");
            return false;
        }

        if selection.has_pick(sub_catalog, id) {
            self.remove_pick(selection, sub_catalog, id);
            return true;
        }

        let quota = self.available_picks(selection, sub_catalog);
        if selection.picks(sub_catalog).len() as u32 >= quota {
            debug!(family = %self.family(), sub_catalog, item = %id, quota, "pick rejected: quota full");
            return false;
        }

        let lower_missing = self
            .definition
            .cascade_pairs
            .iter()
            .filter(|pair| pair.sub_catalog == sub_catalog && &pair.upper == id)
            .any(|pair| !selection.has_pick(sub_catalog, &pair.lower));
        if lower_missing {
            debug!(family = %self.family(), sub_catalog, item = %id, "pick rejected: lower tier missing");
            return false;
        }

        let requires = known.get(id).map(Vec::as_slice).unwrap_or(&[]);
        let unmet = requires.iter().find(|req| {
            !selection.nodes.contains(*req) && !selection.all_picks().any(|p| p == *req)
        });
        if let Some(unmet) = unmet {
            debug!(family = %self.family(), sub_catalog, item = %id, %unmet, "pick rejected: requirement not active");
            return false;
        }

        selection
            .picks
            .entry(sub_catalog.to_string())
            .or_default()
            .insert(id.clone());
        true
    }

    /// Toggle a boost.
    ///
    /// A boost that is currently forced on cannot be toggled by hand; the
    /// manual flag underneath is kept as it was.
    pub fn toggle_boost(
        &self,
        selection: &mut FamilySelection,
        id: &ItemId,
        remaining: &SigilCounts,
    ) -> bool {
        let Some(boost) = self.definition.boost_def(id) else {
            debug!(family = %self.family(), boost = %id, "unknown boost");
            return false;
        };
        if boost.forced_externally && selection.forced {
            debug!(family = %self.family(), boost = %id, "boost is forced on");
            return false;
        }

        if selection.manual_boosts.remove(id) {
            self.trim(selection);
            return true;
        }
        if remaining.get(boost.tier) < 1 {
            debug!(family = %self.family(), boost = %id, tier = %boost.tier, "boost rejected: no sigil left");
            return false;
        }
        selection.manual_boosts.insert(id.clone());
        true
    }

    /// Raise or lower the external flag that forces boosts on.
    ///
    /// Lowering it restores the manual flags; the caller is responsible
    /// for re-checking pool capacity afterwards.
    pub fn set_forced_boosts(&self, selection: &mut FamilySelection, forced: bool) {
        if selection.forced == forced {
            return;
        }
        selection.forced = forced;
        debug!(family = %self.family(), forced, "external boost flag changed");
        self.trim(selection);
    }

    /// Whether a boost currently multiplies picks.
    pub fn boost_active(&self, selection: &FamilySelection, id: &ItemId) -> bool {
        match self.definition.boost_def(id) {
            Some(boost) => {
                selection.manual_boosts.contains(id)
                    || (boost.forced_externally && selection.forced)
            }
            None => false,
        }
    }

    /// Kind of saved build an assignable pick points at.
    pub fn assign_kind(&self, id: &ItemId) -> Option<BuildKind> {
        self.definition.assignable.get(id).copied()
    }

    /// Bind a saved build name to an assignable pick; an empty name clears it.
    ///
    /// # Arguments
    ///
    /// * `selection` - The family's picks
    /// * `id` - An assignable pick that is currently held
    /// * `name` - Name of the saved build, or `""` to clear
    /// * `build_exists` - Whether a saved build of the given kind and name exists
    ///
    /// # Returns
    ///
    /// `true` if the binding changed hands or was cleared.
    pub fn assign<F>(
        &self,
        selection: &mut FamilySelection,
        id: &ItemId,
        name: &str,
        build_exists: F,
    ) -> bool
    where
        F: Fn(BuildKind, &str) -> bool,
    {
        let Some(kind) = self.assign_kind(id) else {
            debug!(family = %self.family(), item = %id, "assignment rejected: not assignable");
            return false;
        };
        if !selection.all_picks().any(|p| p == id) {
            debug!(family = %self.family(), item = %id, "assignment rejected: not picked");
            return false;
        }
        if name.is_empty() {
            selection.assignments.remove(id);
            return true;
        }
        if !build_exists(kind, name) {
            debug!(family = %self.family(), item = %id, %kind, build = name, "assignment target does not exist");
            return false;
        }
        selection.assignments.insert(id.clone(), name.to_string());
        true
    }

    /// Picks the sub-catalog currently allows.
    ///
    /// The sum of `benefits` over selected nodes, multiplied by every
    /// active boost aimed at the sub-catalog.
    pub fn available_picks(&self, selection: &FamilySelection, sub_catalog: &str) -> u32 {
        let base: u32 = self
            .nodes
            .iter()
            .filter(|node| selection.nodes.contains(&node.id))
            .filter_map(|node| node.benefits.get(sub_catalog))
            .sum();

        self.definition
            .boosts
            .iter()
            .filter(|boost| boost.sub_catalog == sub_catalog)
            .filter(|boost| self.boost_active(selection, &boost.id))
            .fold(base, |picks, boost| picks * boost.multiplier)
    }

    /// Sigils this family consumes: one per selected node plus one per
    /// manual boost that is not currently forced on for free.
    pub fn used_sigil_counts(&self, selection: &FamilySelection) -> SigilCounts {
        let mut used = SigilCounts::new();
        for node in selection.nodes.iter() {
            if let Some(tier) = self.tier_of(node) {
                used.add(tier, 1);
            }
        }
        for id in selection.manual_boosts.iter() {
            if let Some(boost) = self.definition.boost_def(id) {
                if !(boost.forced_externally && selection.forced) {
                    used.add(boost.tier, 1);
                }
            }
        }
        used
    }

    /// Blessing Point cost of the selected nodes.
    pub fn sigil_tree_cost(&self, selection: &FamilySelection) -> i32 {
        selection
            .nodes
            .iter()
            .filter_map(|node| self.tier_of(node))
            .map(SigilTier::bp_cost)
            .sum()
    }

    /// Give back one sigil of `tier`, preferring boosts over nodes.
    ///
    /// Used when the pool shrinks underneath existing selections. Returns
    /// `false` if the family holds nothing of that tier.
    pub fn release_one(&self, selection: &mut FamilySelection, tier: SigilTier) -> bool {
        let boost = selection.manual_boosts.iter().rev().find(|id| {
            self.definition.boost_def(id).is_some_and(|boost| {
                boost.tier == tier && !(boost.forced_externally && selection.forced)
            })
        });
        if let Some(boost) = boost.cloned() {
            selection.manual_boosts.remove(&boost);
            debug!(family = %self.family(), boost = %boost, "boost released for capacity");
            self.trim(selection);
            return true;
        }

        let node = selection
            .nodes
            .iter()
            .rev()
            .find(|id| self.tier_of(id) == Some(tier))
            .cloned();
        let Some(node) = node else {
            return false;
        };

        let removed: Vec<ItemId> = if self.definition.shape == TreeShape::Ladder {
            let rung = self.ladder.iter().position(|r| r == &node).unwrap_or(0);
            self.ladder[rung..]
                .iter()
                .filter(|r| selection.nodes.contains(*r))
                .cloned()
                .collect()
        } else {
            self.graph
                .dependents_closure(&node, |n| selection.nodes.contains(n))
        };
        for id in &removed {
            selection.nodes.remove(id);
        }
        debug!(family = %self.family(), node = %node, removed = removed.len(), "node released for capacity");
        self.drop_requiring(selection, &removed);
        self.trim(selection);
        true
    }

    /// Bring a selection read from storage back in line with the rules.
    ///
    /// Unknown ids are dropped, nodes without their prerequisites are
    /// dropped, picks are re-validated in order, and quotas are trimmed.
    /// Pool capacity is checked by the caller.
    pub fn repair(&self, selection: &mut FamilySelection) {
        selection.nodes.retain(|id| self.tiers.contains_key(id));

        if self.definition.shape == TreeShape::Ladder {
            let level = self.ladder_level(selection);
            selection.nodes = self.ladder[..level].iter().cloned().collect();
        } else {
            loop {
                let snapshot = selection.nodes.clone();
                let removed = selection.nodes.retain(|id| {
                    self.graph
                        .prerequisites_of(id)
                        .iter()
                        .all(|p| snapshot.contains(p))
                });
                if removed.is_empty() {
                    break;
                }
            }
        }

        selection
            .manual_boosts
            .retain(|id| self.definition.boost_def(id).is_some());

        let picks = std::mem::take(&mut selection.picks);
        for (sub_catalog, set) in picks {
            if !self.sub_items.contains_key(&sub_catalog) {
                continue;
            }
            for id in set {
                if selection.has_pick(&sub_catalog, &id) {
                    continue;
                }
                // Re-adding through the normal path applies every pick rule.
                if !self.select_sub_item(selection, &sub_catalog, &id) {
                    debug!(family = %self.family(), sub_catalog = %sub_catalog, item = %id, "dropped invalid stored pick");
                }
            }
        }

        let assignments = std::mem::take(&mut selection.assignments);
        selection.assignments = assignments
            .into_iter()
            .filter(|(id, name)| {
                !name.is_empty()
                    && self.definition.assignable.contains_key(id)
                    && selection.all_picks().any(|p| p == id)
            })
            .collect();

        self.trim(selection);
    }

    /// Remove a pick and everything that hangs off it.
    fn remove_pick(&self, selection: &mut FamilySelection, sub_catalog: &str, id: &ItemId) {
        let removed = selection
            .picks
            .get_mut(sub_catalog)
            .is_some_and(|set| set.remove(id));
        if removed {
            self.after_pick_removed(selection, sub_catalog, id);
        }
    }

    /// Cleanup for a pick that just left its set: clear its assignment and
    /// drop the upper half of any cascade pair it anchors.
    fn after_pick_removed(&self, selection: &mut FamilySelection, sub_catalog: &str, id: &ItemId) {
        if let Some(name) = selection.assignments.remove(id) {
            debug!(family = %self.family(), item = %id, build = %name, "assignment cleared");
        }
        let uppers: Vec<ItemId> = self
            .definition
            .cascade_pairs
            .iter()
            .filter(|pair| pair.sub_catalog == sub_catalog && &pair.lower == id)
            .map(|pair| pair.upper.clone())
            .collect();
        for upper in uppers {
            self.remove_pick(selection, sub_catalog, &upper);
        }
    }

    /// Drop picks whose `requires` names any of `removed_nodes`.
    fn drop_requiring(&self, selection: &mut FamilySelection, removed_nodes: &[ItemId]) {
        let removed_set: HashSet<&ItemId> = removed_nodes.iter().collect();
        let keys: Vec<String> = selection.picks.keys().cloned().collect();
        for sub_catalog in keys {
            let Some(known) = self.sub_items.get(&sub_catalog) else {
                continue;
            };
            let dropped = match selection.picks.get_mut(&sub_catalog) {
                Some(set) => set.retain(|pick| {
                    !known
                        .get(pick)
                        .is_some_and(|reqs| reqs.iter().any(|r| removed_set.contains(r)))
                }),
                None => continue,
            };
            for id in dropped {
                debug!(family = %self.family(), sub_catalog = %sub_catalog, item = %id, "pick lost its requirement");
                self.after_pick_removed(selection, &sub_catalog, &id);
            }
        }
    }

    /// Truncate every over-quota sub-catalog to its first `quota` picks.
    fn trim(&self, selection: &mut FamilySelection) {
        for sub in &self.definition.sub_catalogs {
            let quota = self.available_picks(selection, &sub.key) as usize;
            let dropped = match selection.picks.get_mut(&sub.key) {
                Some(set) => set.truncate(quota),
                None => continue,
            };
            if !dropped.is_empty() {
                debug!(family = %self.family(), sub_catalog = %sub.key, quota, dropped = dropped.len(), "trimmed over-quota picks");
            }
            for id in dropped {
                self.after_pick_removed(selection, &sub.key, &id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogItem, StaticCatalog};

    fn id(s: &str) -> ItemId {
        ItemId::new(s)
    }

    fn plenty() -> SigilCounts {
        let mut pool = SigilCounts::new();
        for tier in SigilTier::ALL {
            pool.set(tier, 10);
        }
        pool
    }

    fn will_tree() -> SigilTree {
        let catalog = StaticCatalog::new()
            .with_sigils(
                Family::CompellingWill,
                vec![
                    SigilNode::new("root", SigilTier::Kaarn).granting("telekinetics", 2),
                    SigilNode::new("mid", SigilTier::Purth)
                        .after(["root"])
                        .granting("telekinetics", 1),
                    SigilNode::new("leaf", SigilTier::Xuth).after(["mid"]),
                ],
            )
            .with_group(
                "compelling_will_telekinetics",
                vec![
                    CatalogItem::new("tk_lift", 0),
                    CatalogItem::new("tk_lift_ii", 0),
                    CatalogItem::new("tk_lift_iii", 0),
                    CatalogItem::new("tk_shield", 0).requiring(["mid"]),
                    CatalogItem::new("tk_flight", 0),
                ],
            );
        let definition = FamilyDefinition::new(Family::CompellingWill)
            .sub_catalog("telekinetics")
            .chain("telekinetics", &["tk_lift", "tk_lift_ii", "tk_lift_iii"]);
        SigilTree::new(definition, &catalog).unwrap()
    }

    #[test]
    fn test_cascade_removal_clears_descendants() {
        let tree = will_tree();
        let mut sel = FamilySelection::new();
        assert!(tree.select_node(&mut sel, &id("root"), &plenty()));
        assert!(tree.select_node(&mut sel, &id("mid"), &plenty()));
        assert!(tree.select_node(&mut sel, &id("leaf"), &plenty()));

        assert!(tree.select_node(&mut sel, &id("root"), &plenty()));
        assert!(sel.nodes().is_empty());
    }

    #[test]
    fn test_missing_prerequisite_rejected() {
        let tree = will_tree();
        let mut sel = FamilySelection::new();
        assert!(!tree.select_node(&mut sel, &id("mid"), &plenty()));
        assert!(sel.nodes().is_empty());
    }

    #[test]
    fn test_tier_capacity_rejected() {
        let tree = will_tree();
        let mut sel = FamilySelection::new();
        let pool = SigilCounts::new().with(SigilTier::Purth, 1);
        assert!(!tree.select_node(&mut sel, &id("root"), &pool));
    }

    #[test]
    fn test_quota_and_cascade_pairs() {
        let tree = will_tree();
        let mut sel = FamilySelection::new();
        tree.select_node(&mut sel, &id("root"), &plenty());

        // tier II needs tier I
        assert!(!tree.select_sub_item(&mut sel, "telekinetics", &id("tk_lift_ii")));
        assert!(tree.select_sub_item(&mut sel, "telekinetics", &id("tk_lift")));
        assert!(tree.select_sub_item(&mut sel, "telekinetics", &id("tk_lift_ii")));
        // quota of 2 reached
        assert!(!tree.select_sub_item(&mut sel, "telekinetics", &id("tk_flight")));

        tree.select_node(&mut sel, &id("mid"), &plenty());
        assert!(tree.select_sub_item(&mut sel, "telekinetics", &id("tk_lift_iii")));

        // removing tier I drops II, and II drops III
        assert!(tree.select_sub_item(&mut sel, "telekinetics", &id("tk_lift")));
        assert!(sel.picks("telekinetics").is_empty());
    }

    #[test]
    fn test_requires_checked_and_cascaded() {
        let tree = will_tree();
        let mut sel = FamilySelection::new();
        tree.select_node(&mut sel, &id("root"), &plenty());
        assert!(!tree.select_sub_item(&mut sel, "telekinetics", &id("tk_shield")));

        tree.select_node(&mut sel, &id("mid"), &plenty());
        assert!(tree.select_sub_item(&mut sel, "telekinetics", &id("tk_shield")));

        // losing mid drops the shield through `requires`
        tree.select_node(&mut sel, &id("mid"), &plenty());
        assert!(!sel.has_pick("telekinetics", &id("tk_shield")));
    }

    #[test]
    fn test_unknown_sub_item_rejected() {
        let tree = will_tree();
        let mut sel = FamilySelection::new();
        tree.select_node(&mut sel, &id("root"), &plenty());
        assert!(!tree.select_sub_item(&mut sel, "telekinetics", &id("ghost")));
        assert!(!tree.select_sub_item(&mut sel, "nope", &id("tk_lift")));
    }

    #[test]
    fn test_sub_catalog_without_entries_accepts_nothing() {
        let catalog = StaticCatalog::new().with_sigils(
            Family::CompellingWill,
            vec![SigilNode::new("root", SigilTier::Kaarn).granting("metamorphosis", 2)],
        );
        let definition = FamilyDefinition::new(Family::CompellingWill).sub_catalog("metamorphosis");
        let tree = SigilTree::new(definition, &catalog).unwrap();
        let mut sel = FamilySelection::new();
        tree.select_node(&mut sel, &id("root"), &plenty());

        assert_eq!(tree.available_picks(&sel, "metamorphosis"), 2);
        assert!(!tree.select_sub_item(&mut sel, "metamorphosis", &id("shift_form")));
        assert!(sel.picks("metamorphosis").is_empty());
    }

    #[test]
    fn test_cost_and_usage() {
        let tree = will_tree();
        let mut sel = FamilySelection::new();
        tree.select_node(&mut sel, &id("root"), &plenty());
        tree.select_node(&mut sel, &id("mid"), &plenty());

        assert_eq!(tree.sigil_tree_cost(&sel), 3 + 5);
        let used = tree.used_sigil_counts(&sel);
        assert_eq!(used.get(SigilTier::Kaarn), 1);
        assert_eq!(used.get(SigilTier::Purth), 1);
        assert_eq!(used.total(), 2);
    }

    #[test]
    fn test_cycle_rejected_at_build() {
        let catalog = StaticCatalog::new().with_sigils(
            Family::LostHope,
            vec![
                SigilNode::new("a", SigilTier::Kaarn).after(["b"]),
                SigilNode::new("b", SigilTier::Kaarn).after(["a"]),
            ],
        );
        let result = SigilTree::new(FamilyDefinition::new(Family::LostHope), &catalog);
        assert!(matches!(result, Err(BuilderError::PrerequisiteCycle { .. })));
    }

    #[test]
    fn test_unknown_prerequisite_rejected_at_build() {
        let catalog = StaticCatalog::new().with_sigils(
            Family::LostHope,
            vec![SigilNode::new("a", SigilTier::Kaarn).after(["ghost"])],
        );
        let result = SigilTree::new(FamilyDefinition::new(Family::LostHope), &catalog);
        assert_eq!(
            result.err(),
            Some(BuilderError::UnknownPrerequisite {
                node: id("a"),
                missing: id("ghost"),
            })
        );
    }
}
