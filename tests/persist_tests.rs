mod common;

use common::*;
use magecraft::persist::{BuildLibrary, CharacterSnapshot, KeyValueStore, MemoryStore, SaveSlots};
use magecraft::reference::MAX_BP_SPENT;
use magecraft::*;
use serde_json::json;
use std::sync::Arc;

fn load(slots: &SaveSlots<MemoryStore>, slot: &str) -> Option<CharacterBuilder> {
    slots
        .load(slot, Arc::new(catalog()), BuilderConfig::default())
        .expect("fixture rules are valid")
}

/// Saving and loading a consistent character changes nothing.
#[test]
fn test_save_slot_round_trip() {
    let mut builder = builder();
    let will = Family::CompellingWill;
    builder.select_node(will, &id("root"));
    builder.select_node(will, &id("mid"));
    builder.select_sub_item(will, "telekinetics", &id("tk_shield"));
    builder.toggle_purchase("traits", &id("rich"));
    builder.toggle_entry_choice(&id("fae_heritage"), &id("glamour"));

    builder.upsert_build("Rex", ReferenceBuild::new(BuildKind::Companion));
    builder.edit_build(BuildKind::Companion, "Rex", |page, build| {
        page.toggle_category(build, &id("familiar"));
        page.add_perk(build, &id("signature_power"));
        page.toggle_map_pick(build, &id("signature_power"), &id("death_knell"));
        page.set_bp_spent(build, 1);
    });

    let mut slots = SaveSlots::new(MemoryStore::new());
    slots.save("hero", &builder).unwrap();

    let loaded = load(&slots, "hero").expect("slot was saved");
    assert_eq!(loaded.state(), builder.state());
    assert_eq!(loaded.budgets(), builder.budgets());
    assert_eq!(slots.slots(), vec!["hero".to_string()]);

    assert!(slots.delete("hero"));
    assert!(load(&slots, "hero").is_none());
}

/// Saves from an unknown version are skipped, not misread.
#[test]
fn test_unknown_version_is_skipped() {
    let mut slots = SaveSlots::new(MemoryStore::new());
    slots.store_mut().set(
        "character:future",
        json!({ "version": 2, "data": { "availableSigils": { "kaarn": 3 } } }).to_string(),
    );
    slots
        .store_mut()
        .set("character:garbled", "{ not json".to_string());

    assert!(load(&slots, "future").is_none());
    assert!(load(&slots, "garbled").is_none());

    let err = CharacterSnapshot::hydrate(&json!({ "version": 2, "data": {} })).unwrap_err();
    assert_eq!(err, BuilderError::UnsupportedVersion(2));
}

/// A save that overdraws the pool or breaks the rules is repaired on load.
#[test]
fn test_inconsistent_save_repaired_on_load() {
    let raw = json!({
        "version": 1,
        "data": {
            "availableSigils": { "kaarn": 1 },
            "families": {
                "compelling_will": {
                    "nodes": ["root", "mid"],
                    "picks": { "telekinetics": ["tk_lift", "tk_flight", "tk_shield", "vanished"] }
                },
                "no_such_family": { "nodes": ["root"] }
            },
            "purchases": { "traits": ["rich", "telekinetic_prodigy", "unknown"] },
            "builds": {
                "vehicle": {
                    "Nautilus": { "categories": ["submarine", "airship"], "perks": { "transforming": 1 } }
                }
            }
        }
    });

    let builder = CharacterSnapshot::restore(&raw, Arc::new(catalog()), BuilderConfig::default())
        .unwrap();
    assert_within_capacity(&builder);

    let will = builder.family(Family::CompellingWill);
    assert_eq!(will.nodes().as_slice(), &[id("root")]);
    assert_eq!(will.picks("telekinetics"), &[id("tk_lift"), id("tk_flight")]);
    assert_eq!(
        builder.state().purchases("traits"),
        &[id("rich"), id("telekinetic_prodigy")]
    );

    let nautilus = builder.state().build(BuildKind::Vehicle, "Nautilus").unwrap();
    assert_eq!(nautilus.categories(), &[id("submarine")]);
}

/// Missing or malformed fields fall back to empty.
#[test]
fn test_hydrate_is_lenient() {
    let raw = json!({
        "version": 1,
        "data": {
            "availableSigils": "lots",
            "purchases": { "traits": ["rich"] },
            "entryChoices": 42
        }
    });

    let state = CharacterSnapshot::hydrate(&raw).unwrap();
    assert_eq!(state.available_sigils(), SigilCounts::new());
    assert_eq!(state.purchases("traits"), &[id("rich")]);
    assert!(state.entry_choices(&id("fae_heritage")).is_empty());
}

/// The build library survives a trip through the store.
#[test]
fn test_library_save_and_load() {
    let mut rex = ReferenceBuild::new(BuildKind::Companion);
    let mut nautilus = ReferenceBuild::new(BuildKind::Vehicle);
    let builder = builder();
    if let Some(page) = builder.reference_page(BuildKind::Companion) {
        page.toggle_category(&mut rex, &id("spirit"));
    }
    if let Some(page) = builder.reference_page(BuildKind::Vehicle) {
        page.toggle_category(&mut nautilus, &id("skiff"));
        page.add_perk(&mut nautilus, &id("chatty"));
    }

    let mut library = BuildLibrary::new();
    library.insert("Rex", rex.clone());
    library.insert("Nautilus", nautilus.clone());

    let mut slots = SaveSlots::new(MemoryStore::new());
    assert!(slots.load_library().is_empty());
    slots.save_library(&library).unwrap();

    let loaded = slots.load_library();
    assert_eq!(loaded, library);
    assert_eq!(loaded.get(BuildKind::Vehicle, "Nautilus"), Some(&nautilus));

    // every kind gets a section, even when empty
    let raw = library.dehydrate();
    assert_eq!(raw["weapons"], json!({}));
    assert_eq!(raw["companions"]["Rex"]["version"], json!(1));
}

/// Repeated ids in a save count once, and one deselect removes them.
#[test]
fn test_duplicate_ids_collapse_on_load() {
    let raw = json!({
        "version": 1,
        "data": {
            "availableSigils": { "kaarn": 2 },
            "families": {
                "compelling_will": { "nodes": ["root", "root"] }
            },
            "purchases": { "traits": ["rich", "rich"] }
        }
    });

    let mut builder =
        CharacterSnapshot::restore(&raw, Arc::new(catalog()), BuilderConfig::default()).unwrap();
    let will = Family::CompellingWill;
    assert_eq!(builder.family(will).nodes().as_slice(), &[id("root")]);
    assert_eq!(builder.state().purchases("traits"), &[id("rich")]);
    assert_eq!(builder.budgets().get(Currency::Fortune).spent, 2);
    assert_eq!(builder.sigil_tree_cost(will), 3);

    assert!(builder.select_node(will, &id("root")));
    assert!(!builder.family(will).has_node(&id("root")));
    assert_eq!(builder.sigil_tree_cost(will), 0);
}

/// Oversized numbers in a saved build are clamped, not wrapped.
#[test]
fn test_oversized_build_numbers_clamped() {
    let raw = json!({
        "version": 1,
        "data": {
            "builds": {
                "companion": {
                    "Rex": {
                        "categories": ["familiar"],
                        "perks": { "hybrid": 5_000_000_000u64 },
                        "bpSpent": 99_999_999_999u64
                    }
                }
            }
        }
    });

    let state = CharacterSnapshot::hydrate(&raw).unwrap();
    let rex = state.build(BuildKind::Companion, "Rex").unwrap();
    assert_eq!(rex.bp_spent(), MAX_BP_SPENT);
    assert_eq!(rex.perk_count(&id("hybrid")), u32::MAX);

    let builder = CharacterSnapshot::restore(&raw, Arc::new(catalog()), BuilderConfig::default())
        .unwrap();
    let rex = builder.state().build(BuildKind::Companion, "Rex").unwrap();
    assert_eq!(rex.perk_count(&id("hybrid")), 2);
    assert_eq!(
        builder.build_points(BuildKind::Companion, "Rex").unwrap().total,
        4 + 3 * 2 - 2 * MAX_BP_SPENT as i32
    );
}
