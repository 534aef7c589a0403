mod common;

use common::*;
use magecraft::*;

/// Deselecting a root removes every selected descendant.
#[test]
fn test_cascade_removal() {
    let mut builder = builder();
    let will = Family::CompellingWill;

    assert!(builder.select_node(will, &id("root")));
    assert!(builder.select_node(will, &id("mid")));
    assert!(builder.select_node(will, &id("leaf")));
    assert_eq!(builder.family(will).nodes().len(), 3);

    assert!(builder.select_node(will, &id("root")));
    assert!(builder.family(will).nodes().is_empty());
    assert_eq!(builder.sigil_tree_cost(will), 0);
}

/// A node never stays selected without its prerequisites.
#[test]
fn test_prerequisite_closure() {
    let mut builder = builder();
    let will = Family::CompellingWill;

    assert!(!builder.select_node(will, &id("mid")));
    assert!(builder.select_node(will, &id("root")));
    assert!(builder.select_node(will, &id("mid")));
    assert!(builder.select_node(will, &id("leaf")));

    // removing the middle takes the leaf but leaves the root
    assert!(builder.select_node(will, &id("mid")));
    let selection = builder.family(will);
    assert!(selection.has_node(&id("root")));
    assert!(!selection.has_node(&id("leaf")));
}

/// No sequence of operations overdraws the pool.
#[test]
fn test_capacity_invariant() {
    let mut builder = builder_with(
        SigilCounts::new()
            .with(SigilTier::Kaarn, 2)
            .with(SigilTier::Purth, 1),
    );
    let will = Family::CompellingWill;
    let hope = Family::LostHope;

    let steps: Vec<(Family, &str)> = vec![
        (will, "root"),
        (hope, "grave_touch"),
        (will, "mid"),
        (hope, "deep_grave"),
        (will, "leaf"),
        (will, "root"),
        (hope, "deep_grave"),
        (will, "root"),
        (will, "mid"),
    ];
    for (family, node) in steps {
        builder.select_node(family, &id(node));
        assert_within_capacity(&builder);
    }

    // the purth went to whoever asked first while it was free
    assert!(builder.family(hope).has_node(&id("deep_grave")));
    assert!(!builder.family(will).has_node(&id("mid")));

    builder.toggle_boost(Family::GoodTidings, &id("minor_boon"));
    assert_within_capacity(&builder);
    assert!(!builder.family(Family::GoodTidings).manual_boost(&id("minor_boon")));
}

/// Toggling an id twice restores every derived quantity.
#[test]
fn test_toggle_twice_is_identity() {
    let mut builder = builder();
    let will = Family::CompellingWill;
    builder.select_node(will, &id("root"));
    builder.select_sub_item(will, "telekinetics", &id("tk_flight"));

    let picks = builder.available_picks(will, "telekinetics");
    let used = builder.used_sigil_counts();
    let budgets = builder.budgets();

    assert!(builder.select_node(will, &id("mid")));
    assert_ne!(builder.available_picks(will, "telekinetics"), picks);
    assert!(builder.select_node(will, &id("mid")));

    assert_eq!(builder.available_picks(will, "telekinetics"), picks);
    assert_eq!(builder.used_sigil_counts(), used);
    assert_eq!(builder.budgets(), budgets);

    assert!(builder.select_sub_item(will, "telekinetics", &id("tk_lift")));
    assert!(builder.select_sub_item(will, "telekinetics", &id("tk_lift")));
    assert_eq!(builder.budgets(), budgets);
    assert_eq!(builder.family(will).picks("telekinetics"), &[id("tk_flight")]);
}

/// Shrinking a quota keeps the first picks and runs their cleanup.
#[test]
fn test_trim_keeps_first_picks() {
    let mut builder = builder();
    let hope = Family::LostHope;

    builder.select_node(hope, &id("grave_touch"));
    builder.select_node(hope, &id("deep_grave"));
    assert_eq!(builder.available_picks(hope, "necromancy"), 5);

    for pick in ["grave_call", "bone_ward", "bound_thrall", "raise_dead", "raise_dead_ii"] {
        assert!(builder.select_sub_item(hope, "necromancy", &id(pick)), "{}", pick);
    }
    builder.upsert_build("Mortimer", ReferenceBuild::new(BuildKind::Companion));
    assert!(builder.assign(hope, &id("bound_thrall"), "Mortimer"));
    assert_eq!(
        builder.family(hope).assignment(&id("bound_thrall")),
        Some("Mortimer")
    );

    assert!(builder.select_node(hope, &id("deep_grave")));

    let selection = builder.family(hope);
    assert_eq!(builder.available_picks(hope, "necromancy"), 2);
    assert_eq!(selection.picks("necromancy"), &[id("grave_call"), id("bone_ward")]);
    assert_eq!(selection.assignment(&id("bound_thrall")), None);
}

/// Tier pairs: the upper needs the lower, and losing the lower drops the upper.
#[test]
fn test_cascade_pairs() {
    let mut builder = builder();
    let will = Family::CompellingWill;
    builder.select_node(will, &id("root"));
    builder.select_node(will, &id("mid"));

    assert!(!builder.select_sub_item(will, "telekinetics", &id("tk_lift_ii")));
    assert!(builder.select_sub_item(will, "telekinetics", &id("tk_lift")));
    assert!(builder.select_sub_item(will, "telekinetics", &id("tk_lift_ii")));
    assert!(builder.select_sub_item(will, "telekinetics", &id("tk_lift_iii")));

    assert!(builder.select_sub_item(will, "telekinetics", &id("tk_lift")));
    assert!(builder.family(will).picks("telekinetics").is_empty());
}

/// Picks that require a node go when the node goes, even under quota.
#[test]
fn test_requires_cascade_from_nodes() {
    let mut builder = builder();
    let will = Family::CompellingWill;
    builder.select_node(will, &id("root"));

    assert!(!builder.select_sub_item(will, "telekinetics", &id("tk_shield")));
    builder.select_node(will, &id("mid"));
    assert!(builder.select_sub_item(will, "telekinetics", &id("tk_shield")));
    assert!(builder.select_sub_item(will, "telekinetics", &id("tk_flight")));

    builder.select_node(will, &id("mid"));
    assert_eq!(builder.family(will).picks("telekinetics"), &[id("tk_flight")]);
}

/// The ladder fills every rung up to the target and steps down one at a time.
#[test]
fn test_good_tidings_ladder() {
    let mut builder = builder_with(
        SigilCounts::new()
            .with(SigilTier::Kaarn, 1)
            .with(SigilTier::Purth, 1),
    );
    let tidings = Family::GoodTidings;
    let tree = builder.tree(tidings).expect("fixture has Good Tidings");
    let level = |b: &CharacterBuilder| {
        b.tree(tidings)
            .map(|t| t.ladder_level(&b.family(tidings)))
            .unwrap_or(0)
    };
    assert_eq!(tree.definition().shape, TreeShape::Ladder);

    // master needs a xuth that is not there
    assert!(!builder.select_node(tidings, &id("master")));
    assert_eq!(level(&builder), 0);

    // journeyman pulls in standard
    assert!(builder.select_node(tidings, &id("journeyman")));
    assert_eq!(level(&builder), 2);
    assert_eq!(builder.sigil_tree_cost(tidings), 3 + 5);

    // any held rung steps down by one
    assert!(builder.select_node(tidings, &id("standard")));
    assert_eq!(level(&builder), 1);
    assert!(builder.select_node(tidings, &id("standard")));
    assert_eq!(level(&builder), 0);
}

/// Oni's Blessing forces the boosts on without touching the manual flag.
#[test]
fn test_onis_blessing_restores_manual_boost() {
    let mut builder = builder_with(
        SigilCounts::new()
            .with(SigilTier::Kaarn, 1)
            .with(SigilTier::Purth, 1),
    );
    let tidings = Family::GoodTidings;
    let minor = id("minor_boon");

    assert!(builder.toggle_boost(tidings, &minor));
    assert_eq!(builder.used_sigil_counts().purth, 1);

    assert!(builder.select_node(Family::StarCrossedLove, &id("first_kiss")));
    assert!(builder.select_sub_item(Family::StarCrossedLove, "pacts", &id("onis_blessing")));

    // forced on for free; the manual flag is still remembered
    assert_eq!(builder.used_sigil_counts().purth, 0);
    assert!(builder.boost_active(tidings, &minor));
    assert!(builder.boost_active(tidings, &id("major_boon")));
    assert!(builder.family(tidings).manual_boost(&minor));
    assert!(!builder.toggle_boost(tidings, &minor));

    assert!(builder.select_sub_item(Family::StarCrossedLove, "pacts", &id("onis_blessing")));
    assert!(builder.family(tidings).manual_boost(&minor));
    assert!(!builder.boost_active(tidings, &id("major_boon")));
    assert_eq!(builder.used_sigil_counts().purth, 1);
    assert_within_capacity(&builder);
}

/// A boost multiplies the picks of its sub-catalog.
#[test]
fn test_boost_multiplies_picks() {
    let mut builder = builder();
    let tidings = Family::GoodTidings;
    builder.select_node(tidings, &id("journeyman"));
    assert_eq!(builder.available_picks(tidings, "charms"), 2);

    for charm in ["luck_charm", "ward_charm"] {
        assert!(builder.select_sub_item(tidings, "charms", &id(charm)));
    }
    assert!(!builder.select_sub_item(tidings, "charms", &id("road_charm")));

    assert!(builder.toggle_boost(tidings, &id("minor_boon")));
    assert_eq!(builder.available_picks(tidings, "charms"), 4);
    assert!(builder.select_sub_item(tidings, "charms", &id("road_charm")));
    assert!(builder.select_sub_item(tidings, "charms", &id("hearth_charm")));

    // switching the boost off trims back to the first two
    assert!(builder.toggle_boost(tidings, &id("minor_boon")));
    assert_eq!(
        builder.family(tidings).picks("charms"),
        &[id("luck_charm"), id("ward_charm")]
    );
}

/// Shrinking the pool releases the newest consumers.
#[test]
fn test_shrinking_pool_releases_consumers() {
    let mut builder = builder_with(pool(2));
    let will = Family::CompellingWill;
    builder.select_node(will, &id("root"));
    builder.select_node(will, &id("mid"));
    builder.select_node(will, &id("leaf"));
    builder.select_sub_item(will, "telekinetics", &id("tk_shield"));

    builder.set_available_sigils(pool(2).with(SigilTier::Purth, 0));
    assert_within_capacity(&builder);

    let selection = builder.family(will);
    assert!(selection.has_node(&id("root")));
    assert!(!selection.has_node(&id("mid")));
    assert!(!selection.has_node(&id("leaf")));
    assert!(selection.picks("telekinetics").is_empty());
}

/// Purchases that required a node are pruned with it.
#[test]
fn test_purchase_requires_node() {
    let mut builder = builder();
    let prodigy = id("telekinetic_prodigy");

    assert!(!builder.toggle_purchase("traits", &prodigy));
    builder.select_node(Family::CompellingWill, &id("root"));
    assert!(builder.toggle_purchase("traits", &prodigy));

    builder.select_node(Family::CompellingWill, &id("root"));
    assert!(builder.state().purchases("traits").is_empty());
}

/// Sinthru's Contract grants every heritage choice and locks them.
#[test]
fn test_sinthrus_contract_locks_entry() {
    let mut builder = builder();
    let heritage = id("fae_heritage");
    let contract = id("sinthrus_contract");

    assert!(builder.toggle_entry_choice(&heritage, &id("glamour")));
    assert!(builder.toggle_entry_choice(&heritage, &id("iron_ward")));
    assert!(!builder.toggle_entry_choice(&heritage, &id("wild_hunt")));

    builder.select_node(Family::StarCrossedLove, &id("first_kiss"));
    assert!(builder.select_sub_item(Family::StarCrossedLove, "pacts", &contract));
    assert_eq!(builder.state().entry_choices(&heritage).len(), 4);
    assert!(!builder.toggle_entry_choice(&heritage, &id("glamour")));

    // losing the node that granted the pact lifts the contract too
    builder.select_node(Family::StarCrossedLove, &id("first_kiss"));
    assert!(!builder.entry_locked(&heritage));
    assert_eq!(
        builder.state().entry_choices(&heritage),
        &[id("glamour"), id("iron_ward")]
    );
}

/// A bound pick points at a saved build of its kind, and losing the build
/// clears the binding.
#[test]
fn test_assignment_needs_saved_build() {
    let mut builder = builder();
    let hope = Family::LostHope;
    let thrall = id("bound_thrall");
    builder.select_node(hope, &id("grave_touch"));
    builder.select_sub_item(hope, "necromancy", &thrall);

    assert!(!builder.assign(hope, &thrall, "Mortimer"));
    builder.upsert_build("Mortimer", ReferenceBuild::new(BuildKind::Vehicle));
    assert!(!builder.assign(hope, &thrall, "Mortimer"));

    builder.upsert_build("Mortimer", ReferenceBuild::new(BuildKind::Companion));
    assert!(builder.assign(hope, &thrall, "Mortimer"));
    // not assignable
    assert!(!builder.assign(hope, &id("grave_call"), "Mortimer"));

    builder.remove_build(BuildKind::Companion, "Mortimer");
    assert_eq!(builder.family(hope).assignment(&thrall), None);
}
