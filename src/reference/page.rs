//! The reference page engine.
//!
//! `ReferencePage` borrows a kind's rules, the catalog and the spell index,
//! and applies user intents to a `ReferenceBuild`. Like the sigil trees,
//! every toggle returns `bool` and a rejected intent leaves the build
//! untouched.

use super::pricing::{stepped_cost, tiered_cost};
use super::rules::{BuildRules, PerkPricing};
use super::{ReferenceBuild, MAX_BP_SPENT};
use crate::breakdown::PointBreakdown;
use crate::catalog::{Catalog, SpellIndex};
use crate::error::BuilderError;
use crate::id::ItemId;
use crate::map_select::{MapConfig, MapSelection};
use crate::ordered::OrderedSet;
use tracing::debug;

/// Applies one kind's rules to builds of that kind.
///
/// # Examples
///
/// ```rust
/// use magecraft::reference::{BuildKind, BuildRules, ReferenceBuild, ReferencePage};
/// use magecraft::{CatalogItem, SpellIndex, StaticCatalog};
///
/// let catalog = StaticCatalog::new()
///     .with_group("companion_categories", vec![CatalogItem::new("familiar", 4)])
///     .with_group("companion_perks", vec![CatalogItem::new("signature_power", 0)]);
/// let spells = SpellIndex::from_catalog(&catalog);
/// let rules = BuildRules::standard(BuildKind::Companion);
/// let page = ReferencePage::new(&rules, &catalog, &spells);
///
/// let mut build = ReferenceBuild::new(BuildKind::Companion);
/// assert!(page.toggle_category(&mut build, &"familiar".into()));
/// assert!(page.add_perk(&mut build, &"signature_power".into()));
/// assert!(page.add_perk(&mut build, &"signature_power".into()));
///
/// // 4 for the category, 5 + 10 for two signature powers
/// assert_eq!(page.points(&build).total, 19);
/// ```
pub struct ReferencePage<'a> {
    rules: &'a BuildRules,
    catalog: &'a dyn Catalog,
    spells: &'a SpellIndex,
}

impl<'a> ReferencePage<'a> {
    pub fn new(rules: &'a BuildRules, catalog: &'a dyn Catalog, spells: &'a SpellIndex) -> Self {
        Self {
            rules,
            catalog,
            spells,
        }
    }

    pub fn rules(&self) -> &BuildRules {
        self.rules
    }

    /// Categories allowed: one, plus one per purchase of the extending perk.
    pub fn category_cap(&self, build: &ReferenceBuild) -> usize {
        let extra = self
            .rules
            .extending_perk
            .as_ref()
            .map_or(0, |perk| build.perk_count(perk));
        1 + extra as usize
    }

    /// Toggle a category.
    ///
    /// With a cap of one a new category replaces the old. Above that, a full
    /// build rejects new categories. When followers may not be dearer than
    /// the first category, a dearer follower is rejected, and removing the
    /// first category drops followers dearer than the new first.
    pub fn toggle_category(&self, build: &mut ReferenceBuild, id: &ItemId) -> bool {
        let group = self.rules.category_group.as_str();

        if build.categories.contains(id) {
            let was_first = build.categories.first() == Some(id);
            build.categories.remove(id);
            if was_first && self.rules.followers_not_dearer {
                self.drop_dearer_followers(build);
            }
            self.drop_unmet_perks(build);
            return true;
        }

        if self.catalog.item(group, id).is_none() {
            debug!(category = %id, "unknown category");
            return false;
        }

        let cap = self.category_cap(build);
        if cap <= 1 {
            build.categories.clear();
            build.categories.insert(id.clone());
            self.drop_unmet_perks(build);
            return true;
        }
        if build.categories.len() >= cap {
            debug!(category = %id, cap, "category cap reached");
            return false;
        }
        if self.rules.followers_not_dearer {
            if let Some(first) = build.categories.first() {
                let first_cost = self.catalog.cost_of(group, first);
                if self.catalog.cost_of(group, id) > first_cost {
                    debug!(category = %id, first = %first, "follower dearer than first category");
                    return false;
                }
            }
        }
        build.categories.insert(id.clone());
        true
    }

    fn drop_dearer_followers(&self, build: &mut ReferenceBuild) {
        let group = self.rules.category_group.as_str();
        let Some(first) = build.categories.first().cloned() else {
            return;
        };
        let limit = self.catalog.cost_of(group, &first);
        let dropped = build
            .categories
            .retain(|c| *c == first || self.catalog.cost_of(group, c) <= limit);
        for id in dropped {
            debug!(category = %id, "dropped category dearer than new first");
        }
    }

    /// Set or clear the relationship / size / power level choice.
    pub fn set_profile(&self, build: &mut ReferenceBuild, id: Option<&ItemId>) -> bool {
        match id {
            None => {
                if build.profile.take().is_none() {
                    return false;
                }
            }
            Some(id) => {
                if build.profile.as_ref() == Some(id) {
                    return false;
                }
                if self.catalog.item(&self.rules.profile_group, id).is_none() {
                    debug!(profile = %id, "unknown profile");
                    return false;
                }
                build.profile = Some(id.clone());
            }
        }
        self.drop_unmet_perks(build);
        true
    }

    pub fn toggle_trait(&self, build: &mut ReferenceBuild, id: &ItemId) -> bool {
        if build.traits.remove(id) {
            self.drop_unmet_perks(build);
            return true;
        }
        if self.catalog.item(&self.rules.trait_group, id).is_none() {
            debug!(trait_id = %id, "unknown trait");
            return false;
        }
        build.traits.insert(id.clone())
    }

    /// Whether `id` is held anywhere in the build.
    pub fn is_active(&self, build: &ReferenceBuild, id: &ItemId) -> bool {
        build.categories.contains(id)
            || build.profile.as_ref() == Some(id)
            || build.traits.contains(id)
            || build.perk_count(id) > 0
    }

    fn requirements_met(&self, build: &ReferenceBuild, perk: &ItemId) -> bool {
        match self.catalog.item(&self.rules.perk_group, perk) {
            Some(item) => item.requires.iter().all(|r| self.is_active(build, r)),
            None => false,
        }
    }

    /// Buy one more of a perk.
    pub fn add_perk(&self, build: &mut ReferenceBuild, perk: &ItemId) -> bool {
        if self.catalog.item(&self.rules.perk_group, perk).is_none() {
            debug!(perk = %perk, "unknown perk");
            return false;
        }
        let count = build.perk_count(perk);
        if count >= self.rules.max_count(perk) {
            debug!(perk = %perk, count, "perk at max count");
            return false;
        }
        if !self.requirements_met(build, perk) {
            debug!(perk = %perk, "perk requirements not met");
            return false;
        }
        build.perks.insert(perk.clone(), count + 1);
        true
    }

    /// Sell one of a perk. Selling the last one zeroes its dependents.
    pub fn remove_perk(&self, build: &mut ReferenceBuild, perk: &ItemId) -> bool {
        let count = build.perk_count(perk);
        if count == 0 {
            return false;
        }
        if count == 1 {
            self.clear_perk(build, perk);
        } else {
            build.perks.insert(perk.clone(), count - 1);
            self.after_count_change(build, perk);
        }
        self.drop_unmet_perks(build);
        true
    }

    /// Choose a tier of a tiered perk directly. Tier 0 removes the perk.
    pub fn set_perk_tier(&self, build: &mut ReferenceBuild, perk: &ItemId, tier: u32) -> bool {
        let PerkPricing::Tiered { tiers } = self.rules.pricing_of(perk) else {
            return false;
        };
        if tier == 0 {
            if build.perk_count(perk) == 0 {
                return false;
            }
            self.clear_perk(build, perk);
            self.drop_unmet_perks(build);
            return true;
        }
        if !tiers.contains_key(&tier) || build.perk_count(perk) == tier {
            return false;
        }
        if !self.requirements_met(build, perk) {
            debug!(perk = %perk, "perk requirements not met");
            return false;
        }
        build.perks.insert(perk.clone(), tier);
        true
    }

    fn clear_perk(&self, build: &mut ReferenceBuild, perk: &ItemId) {
        let mut pending = vec![perk.clone()];
        while let Some(id) = pending.pop() {
            if build.perks.remove(&id).is_none() {
                continue;
            }
            debug!(perk = %id, "perk removed");
            build.assignments.remove(&id);
            build.map_picks.remove(&id);
            self.after_count_change(build, &id);
            if let Some(dependents) = self.rules.dependents.get(&id) {
                pending.extend(dependents.iter().cloned());
            }
            // perks that required this one go too
            pending.extend(
                build
                    .perks
                    .keys()
                    .filter(|p| {
                        self.catalog
                            .item(&self.rules.perk_group, p)
                            .is_some_and(|item| item.requires.contains(&id))
                    })
                    .cloned()
                    .collect::<Vec<_>>(),
            );
        }
    }

    /// Clear every perk whose requirements are no longer held, until none
    /// are left. Clearing can trim categories, which can strand more perks.
    fn drop_unmet_perks(&self, build: &mut ReferenceBuild) {
        loop {
            let unmet: Vec<ItemId> = build
                .perks
                .keys()
                .filter(|perk| !self.requirements_met(build, perk))
                .cloned()
                .collect();
            if unmet.is_empty() {
                break;
            }
            for perk in unmet {
                debug!(perk = %perk, "perk lost a requirement");
                self.clear_perk(build, &perk);
            }
        }
    }

    fn after_count_change(&self, build: &mut ReferenceBuild, perk: &ItemId) {
        if self.rules.extending_perk.as_ref() == Some(perk) {
            let cap = self.category_cap(build);
            for id in build.categories.truncate(cap) {
                debug!(category = %id, cap, "category trimmed");
            }
        }

        let count = build.perk_count(perk);
        let per_count = self
            .rules
            .map_perks
            .get(perk)
            .and_then(|map| map.picks_per_count);
        if let (Some(per_count), Some(picks)) = (per_count, build.map_picks.get_mut(perk)) {
            for id in picks.truncate((per_count * count) as usize) {
                debug!(perk = %perk, spell = %id, "MAP pick trimmed");
            }
        }
    }

    /// Point an assignment-bound perk at a saved build. An empty name clears.
    pub fn assign(&self, build: &mut ReferenceBuild, perk: &ItemId, name: &str) -> bool {
        if !self.rules.assignable.contains_key(perk) || build.perk_count(perk) == 0 {
            return false;
        }
        if name.is_empty() {
            return build.assignments.remove(perk).is_some();
        }
        build.assignments.insert(perk.clone(), name.to_string());
        true
    }

    /// MAP constraints for a perk at its current count.
    pub fn map_config(&self, build: &ReferenceBuild, perk: &ItemId) -> Option<MapConfig> {
        let map = self.rules.map_perks.get(perk)?;
        let config = map.config.clone();
        Some(match map.picks_per_count {
            Some(per_count) => config.max_total(per_count * build.perk_count(perk)),
            None => config,
        })
    }

    /// The stored picks replayed through the current constraints.
    pub fn map_selection(&self, build: &ReferenceBuild, perk: &ItemId) -> Option<MapSelection> {
        let config = self.map_config(build, perk)?;
        Some(config.restore(self.spells, build.map_picks(perk)))
    }

    /// Toggle a spell in a perk's MAP selection.
    pub fn toggle_map_pick(&self, build: &mut ReferenceBuild, perk: &ItemId, spell: &ItemId) -> bool {
        if build.perk_count(perk) == 0 {
            return false;
        }
        let Some(config) = self.map_config(build, perk) else {
            return false;
        };
        let Some(entry) = self.spells.get(spell) else {
            debug!(spell = %spell, "unknown spell");
            return false;
        };

        let mut selection = config.restore(self.spells, build.map_picks(perk));
        if !config.toggle(&mut selection, entry) {
            return false;
        }
        let counted: OrderedSet<ItemId> = config
            .counted(&selection)
            .into_iter()
            .map(|p| p.id.clone())
            .collect();
        build.map_picks.insert(perk.clone(), counted);
        true
    }

    /// Run the confirm-time validators of a perk's MAP selection.
    pub fn confirm_map(&self, build: &ReferenceBuild, perk: &ItemId) -> Result<(), BuilderError> {
        match self.map_config(build, perk) {
            Some(config) => {
                let selection = config.restore(self.spells, build.map_picks(perk));
                config.confirm(&selection)
            }
            None => Ok(()),
        }
    }

    /// Redirect Blessing Points into the build, clamped to `MAX_BP_SPENT`.
    pub fn set_bp_spent(&self, build: &mut ReferenceBuild, bp: u32) -> bool {
        let bp = bp.min(MAX_BP_SPENT);
        if build.bp_spent == bp {
            return false;
        }
        build.bp_spent = bp;
        true
    }

    /// Bring a build read from storage back in line with the rules.
    ///
    /// Unknown ids are dropped, counts are clamped to their caps, perks
    /// without their requirements are removed, categories are trimmed to
    /// the cap, and MAP picks are replayed through their constraints.
    pub fn repair(&self, build: &mut ReferenceBuild) {
        let rules = self.rules;
        build.kind = rules.kind;
        build.bp_spent = build.bp_spent.min(MAX_BP_SPENT);

        build
            .categories
            .retain(|id| self.catalog.item(&rules.category_group, id).is_some());
        if build
            .profile
            .as_ref()
            .is_some_and(|id| self.catalog.item(&rules.profile_group, id).is_none())
        {
            build.profile = None;
        }
        build
            .traits
            .retain(|id| self.catalog.item(&rules.trait_group, id).is_some());

        let perks = std::mem::take(&mut build.perks);
        for (perk, count) in perks {
            let max = rules.max_count(&perk);
            if count == 0 || self.catalog.item(&rules.perk_group, &perk).is_none() {
                debug!(perk = %perk, "dropped stored perk");
                continue;
            }
            build.perks.insert(perk, count.min(max));
        }
        self.drop_unmet_perks(build);

        let cap = self.category_cap(build);
        build.categories.truncate(cap);
        if rules.followers_not_dearer {
            self.drop_dearer_followers(build);
        }
        self.drop_unmet_perks(build);

        build.assignments.retain(|perk, name| {
            !name.is_empty() && rules.assignable.contains_key(perk) && build.perks.contains_key(perk)
        });

        let stored = std::mem::take(&mut build.map_picks);
        for (perk, picks) in stored {
            let Some(config) = self.map_config(build, &perk) else {
                continue;
            };
            if build.perk_count(&perk) == 0 {
                continue;
            }
            let selection = config.restore(self.spells, picks.iter());
            let counted: OrderedSet<ItemId> = config
                .counted(&selection)
                .into_iter()
                .map(|p| p.id.clone())
                .collect();
            if !counted.is_empty() {
                build.map_picks.insert(perk, counted);
            }
        }
    }

    /// Price a build.
    pub fn points(&self, build: &ReferenceBuild) -> PointBreakdown {
        let rules = self.rules;
        let mut points = PointBreakdown::new(rules.kind.currency());

        for id in build.categories.iter() {
            points.add_line(
                format!("Category: {}", id),
                self.catalog.cost_of(&rules.category_group, id),
            );
        }
        if let Some(id) = &build.profile {
            points.add_line(
                format!("Profile: {}", id),
                self.catalog.cost_of(&rules.profile_group, id),
            );
        }

        let traits_count = rules
            .trait_gate
            .as_ref()
            .map_or(true, |gate| build.perk_count(gate) > 0);
        if traits_count {
            for id in build.traits.iter() {
                points.add_line(
                    format!("Trait: {}", id),
                    self.catalog.cost_of(&rules.trait_group, id),
                );
            }
        }

        for (perk, count) in build.perks() {
            let free = rules
                .free_with_category
                .get(perk)
                .is_some_and(|category| build.categories.contains(category));
            let cost = if free {
                0
            } else {
                match rules.pricing_of(perk) {
                    PerkPricing::Flat => self
                        .catalog
                        .cost_of(&rules.perk_group, perk)
                        .saturating_mul(i32::try_from(count).unwrap_or(i32::MAX)),
                    PerkPricing::Stepped { first, subsequent } => stepped_cost(count, first, subsequent),
                    PerkPricing::Tiered { tiers } => tiered_cost(count, &tiers),
                }
            };
            points.add_line(format!("Perk: {} x{}", perk, count), cost);
        }

        for (perk, map) in &rules.map_perks {
            let Some(surcharge) = &map.surcharge else {
                continue;
            };
            let n = build
                .map_picks(perk)
                .iter()
                .filter_map(|id| self.spells.get(id))
                .filter(|spell| spell.grade == Some(surcharge.grade))
                .count() as u32;
            if n > 0 {
                points.add_line(
                    format!("Surcharge: {} {} picks in {}", n, surcharge.grade, perk),
                    stepped_cost(n, surcharge.first, surcharge.subsequent),
                );
            }
        }

        if build.bp_spent > 0 {
            points.add_line(
                format!("BP spent: {}", build.bp_spent),
                i32::try_from(build.bp_spent).map_or(i32::MIN, |bp| bp.saturating_mul(-2)),
            );
        }

        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogItem, StaticCatalog};
    use crate::reference::BuildKind;
    use crate::tier::Grade;

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with_group(
                "companion_categories",
                vec![
                    CatalogItem::new("familiar", 4),
                    CatalogItem::new("spirit", 6),
                    CatalogItem::new("golem", 8),
                ],
            )
            .with_group("companion_profiles", vec![CatalogItem::new("sibling", 2)])
            .with_group("companion_traits", vec![CatalogItem::new("brave", 1)])
            .with_group(
                "companion_perks",
                vec![
                    CatalogItem::new("hybrid", 3),
                    CatalogItem::new("loyal", 2),
                    CatalogItem::new("signature_power", 0),
                    CatalogItem::new("impressive_career", 0),
                    CatalogItem::new("attuned", 1),
                    CatalogItem::new("combat_training", 2),
                    CatalogItem::new("combat_mastery", 4).requiring(["combat_training"]),
                    CatalogItem::new("bonded_weapon", 1),
                ],
            )
            .with_spell_group(
                "necromancy",
                vec![
                    CatalogItem::new("bone_spear", 0).with_grade(Grade::Kaarn),
                    CatalogItem::new("death_knell", 0).with_grade(Grade::Xuth),
                    CatalogItem::new("grave_pact", 0).with_grade(Grade::Xuth),
                    CatalogItem::new("soul_forge", 0).with_grade(Grade::Sinthru),
                ],
            )
            .with_spell_group(
                "alchemy",
                vec![CatalogItem::new("transmute", 0).with_grade(Grade::Purth)],
            )
    }

    #[test]
    fn test_category_cap_grows_with_hybrid() {
        let catalog = catalog();
        let spells = SpellIndex::from_catalog(&catalog);
        let rules = BuildRules::standard(BuildKind::Companion);
        let page = ReferencePage::new(&rules, &catalog, &spells);
        let mut build = ReferenceBuild::new(BuildKind::Companion);

        assert!(page.toggle_category(&mut build, &"familiar".into()));
        // cap 1 replaces
        assert!(page.toggle_category(&mut build, &"spirit".into()));
        assert_eq!(build.categories(), &[ItemId::new("spirit")]);

        assert!(page.add_perk(&mut build, &"hybrid".into()));
        assert_eq!(page.category_cap(&build), 2);
        assert!(page.toggle_category(&mut build, &"familiar".into()));
        assert!(!page.toggle_category(&mut build, &"golem".into()));

        // losing the hybrid trims back to the first category
        assert!(page.remove_perk(&mut build, &"hybrid".into()));
        assert_eq!(build.categories(), &[ItemId::new("spirit")]);
    }

    #[test]
    fn test_free_with_category() {
        let catalog = catalog();
        let spells = SpellIndex::from_catalog(&catalog);
        let rules = BuildRules::standard(BuildKind::Companion);
        let page = ReferencePage::new(&rules, &catalog, &spells);
        let mut build = ReferenceBuild::new(BuildKind::Companion);

        page.add_perk(&mut build, &"loyal".into());
        assert_eq!(page.points(&build).total, 2);
        page.toggle_category(&mut build, &"familiar".into());
        assert_eq!(page.points(&build).total, 4);
    }

    #[test]
    fn test_dependents_zeroed_on_full_removal() {
        let catalog = catalog();
        let spells = SpellIndex::from_catalog(&catalog);
        let rules = BuildRules::standard(BuildKind::Companion);
        let page = ReferencePage::new(&rules, &catalog, &spells);
        let mut build = ReferenceBuild::new(BuildKind::Companion);

        assert!(!page.add_perk(&mut build, &"combat_mastery".into()));
        assert!(page.add_perk(&mut build, &"combat_training".into()));
        assert!(page.add_perk(&mut build, &"combat_mastery".into()));
        assert!(page.remove_perk(&mut build, &"combat_training".into()));
        assert_eq!(build.perk_count(&"combat_mastery".into()), 0);
    }

    #[test]
    fn test_career_tier_chosen_directly() {
        let catalog = catalog();
        let spells = SpellIndex::from_catalog(&catalog);
        let rules = BuildRules::standard(BuildKind::Companion);
        let page = ReferencePage::new(&rules, &catalog, &spells);
        let mut build = ReferenceBuild::new(BuildKind::Companion);

        let career = ItemId::new("impressive_career");
        assert!(page.set_perk_tier(&mut build, &career, 2));
        assert_eq!(page.points(&build).total, 10);
        assert!(!page.set_perk_tier(&mut build, &career, 4));
        assert!(page.set_perk_tier(&mut build, &career, 0));
        assert_eq!(page.points(&build).total, 0);
        // flat perks have no tiers
        assert!(!page.set_perk_tier(&mut build, &"loyal".into(), 1));
    }

    #[test]
    fn test_signature_picks_follow_count_and_surcharge() {
        let catalog = catalog();
        let spells = SpellIndex::from_catalog(&catalog);
        let rules = BuildRules::standard(BuildKind::Companion);
        let page = ReferencePage::new(&rules, &catalog, &spells);
        let mut build = ReferenceBuild::new(BuildKind::Companion);
        let signature = ItemId::new("signature_power");

        assert!(!page.toggle_map_pick(&mut build, &signature, &"death_knell".into()));
        page.add_perk(&mut build, &signature);
        page.add_perk(&mut build, &signature);
        assert!(page.toggle_map_pick(&mut build, &signature, &"death_knell".into()));
        assert!(page.toggle_map_pick(&mut build, &signature, &"grave_pact".into()));
        // two picks for two purchases
        assert!(!page.toggle_map_pick(&mut build, &signature, &"bone_spear".into()));
        // sinthru is banned outright
        page.toggle_map_pick(&mut build, &signature, &"grave_pact".into());
        assert!(!page.toggle_map_pick(&mut build, &signature, &"soul_forge".into()));
        page.toggle_map_pick(&mut build, &signature, &"grave_pact".into());

        let points = page.points(&build);
        assert_eq!(points.sum_where("Perk:"), 15);
        assert_eq!(points.sum_where("Surcharge:"), 15);

        page.remove_perk(&mut build, &signature);
        assert_eq!(build.map_picks(&signature), &[ItemId::new("death_knell")]);
    }

    #[test]
    fn test_attuned_exclusive_grades() {
        let catalog = catalog();
        let spells = SpellIndex::from_catalog(&catalog);
        let rules = BuildRules::standard(BuildKind::Companion);
        let page = ReferencePage::new(&rules, &catalog, &spells);
        let mut build = ReferenceBuild::new(BuildKind::Companion);
        let attuned = ItemId::new("attuned");

        page.add_perk(&mut build, &attuned);
        assert!(page.toggle_map_pick(&mut build, &attuned, &"bone_spear".into()));
        assert!(!page.toggle_map_pick(&mut build, &attuned, &"transmute".into()));
        assert!(page.toggle_map_pick(&mut build, &attuned, &"bone_spear".into()));
        assert!(page.toggle_map_pick(&mut build, &attuned, &"transmute".into()));
    }

    #[test]
    fn test_bp_discount_is_last_line() {
        let catalog = catalog();
        let spells = SpellIndex::from_catalog(&catalog);
        let rules = BuildRules::standard(BuildKind::Companion);
        let page = ReferencePage::new(&rules, &catalog, &spells);
        let mut build = ReferenceBuild::new(BuildKind::Companion);

        page.toggle_category(&mut build, &"golem".into());
        page.set_profile(&mut build, Some(&"sibling".into()));
        page.toggle_trait(&mut build, &"brave".into());
        assert!(page.set_bp_spent(&mut build, 3));

        let points = page.points(&build);
        assert_eq!(points.total, 8 + 2 + 1 - 6);
        assert_eq!(points.lines.last().map(|(_, p)| *p), Some(-6));
    }

    #[test]
    fn test_repair_drops_what_rules_forbid() {
        let catalog = catalog();
        let spells = SpellIndex::from_catalog(&catalog);
        let rules = BuildRules::standard(BuildKind::Companion);
        let page = ReferencePage::new(&rules, &catalog, &spells);

        let mut build = ReferenceBuild::new(BuildKind::Companion);
        build.categories = ["familiar", "spirit", "dragon"].into_iter().map(ItemId::new).collect();
        build.perks.insert("signature_power".into(), 9);
        build.perks.insert("combat_mastery".into(), 1);
        build.perks.insert("vanished".into(), 1);
        build.map_picks.insert(
            "signature_power".into(),
            ["soul_forge", "death_knell"].into_iter().map(ItemId::new).collect(),
        );

        page.repair(&mut build);

        assert_eq!(build.categories(), &[ItemId::new("familiar")]);
        assert_eq!(build.perk_count(&"signature_power".into()), 5);
        assert_eq!(build.perk_count(&"combat_mastery".into()), 0);
        assert_eq!(build.perk_count(&"vanished".into()), 0);
        assert_eq!(
            build.map_picks(&"signature_power".into()),
            &[ItemId::new("death_knell")]
        );
    }

    #[test]
    fn test_assign_requires_held_assignable_perk() {
        let catalog = catalog();
        let spells = SpellIndex::from_catalog(&catalog);
        let rules = BuildRules::standard(BuildKind::Companion);
        let page = ReferencePage::new(&rules, &catalog, &spells);
        let mut build = ReferenceBuild::new(BuildKind::Companion);
        let bonded = ItemId::new("bonded_weapon");

        assert!(!page.assign(&mut build, &bonded, "Ashbringer"));
        page.add_perk(&mut build, &bonded);
        assert!(page.assign(&mut build, &bonded, "Ashbringer"));
        assert!(!page.assign(&mut build, &"loyal".into(), "Rex"));

        page.remove_perk(&mut build, &bonded);
        assert_eq!(build.assignment(&bonded), None);
    }
}
