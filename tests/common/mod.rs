#![allow(dead_code)]

use magecraft::*;
use std::sync::Arc;

pub fn id(s: &str) -> ItemId {
    ItemId::new(s)
}

/// A pool of `n` sigils in every tier.
pub fn pool(n: u32) -> SigilCounts {
    let mut pool = SigilCounts::new();
    for tier in SigilTier::ALL {
        pool.set(tier, n);
    }
    pool
}

/// Small catalog touching every part of the sheet.
pub fn catalog() -> StaticCatalog {
    use SigilTier::*;

    StaticCatalog::new()
        // Good Tidings: a three-rung ladder
        .with_sigils(
            Family::GoodTidings,
            vec![
                SigilNode::new("standard", Kaarn)
                    .granting("charms", 1)
                    .granting("omens", 1),
                SigilNode::new("journeyman", Purth)
                    .after(["standard"])
                    .granting("charms", 1),
                SigilNode::new("master", Xuth)
                    .after(["journeyman"])
                    .granting("charms", 1),
            ],
        )
        .with_group(
            "good_tidings_charms",
            ["luck_charm", "ward_charm", "hearth_charm", "road_charm"]
                .into_iter()
                .map(|c| CatalogItem::new(c, 0))
                .collect(),
        )
        .with_group(
            "good_tidings_omens",
            vec![CatalogItem::new("bright_omen", 0), CatalogItem::new("dark_omen", 0)],
        )
        // Compelling Will: root -> mid -> leaf
        .with_sigils(
            Family::CompellingWill,
            vec![
                SigilNode::new("root", Kaarn).granting("telekinetics", 2),
                SigilNode::new("mid", Purth)
                    .after(["root"])
                    .granting("telekinetics", 1),
                SigilNode::new("leaf", Xuth).after(["mid"]),
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
        )
        // Lost Hope: two nodes feeding one sub-catalog
        .with_sigils(
            Family::LostHope,
            vec![
                SigilNode::new("grave_touch", Kaarn).granting("necromancy", 2),
                SigilNode::new("deep_grave", Purth)
                    .after(["grave_touch"])
                    .granting("necromancy", 3),
            ],
        )
        .with_group(
            "lost_hope_necromancy",
            ["grave_call", "bone_ward", "bound_thrall", "raise_dead", "raise_dead_ii"]
                .into_iter()
                .map(|c| CatalogItem::new(c, 0))
                .collect(),
        )
        // Star-Crossed Love: pacts
        .with_sigils(
            Family::StarCrossedLove,
            vec![SigilNode::new("first_kiss", Kaarn).granting("pacts", 2)],
        )
        .with_group(
            "star_crossed_love_pacts",
            vec![
                CatalogItem::new("onis_blessing", 0),
                CatalogItem::new("sinthrus_contract", 0),
                CatalogItem::new("lovers_oath", 0),
            ],
        )
        // Fortune purchases
        .with_group(
            "traits",
            vec![
                CatalogItem::new("unlucky", -3),
                CatalogItem::new("rich", 2),
                CatalogItem::new("telekinetic_prodigy", 4).requiring(["root"]),
            ],
        )
        .with_group("perks", vec![CatalogItem::new("fae_heritage", 5)])
        // Reference pages
        .with_group(
            "companion_categories",
            vec![CatalogItem::new("familiar", 4), CatalogItem::new("spirit", 6)],
        )
        .with_group(
            "companion_perks",
            vec![
                CatalogItem::new("hybrid", 3),
                CatalogItem::new("signature_power", 0),
                CatalogItem::new("impressive_career", 0),
                CatalogItem::new("attuned", 1),
                CatalogItem::new("bonded_weapon", 1),
            ],
        )
        .with_group("weapon_categories", vec![CatalogItem::new("sword", 2)])
        .with_group("weapon_perks", vec![CatalogItem::new("wielder", 1)])
        .with_group("beast_categories", vec![CatalogItem::new("wolf", 3)])
        .with_group("beast_perks", vec![CatalogItem::new("power_level", 2)])
        .with_group(
            "vehicle_categories",
            vec![
                CatalogItem::new("submarine", 6),
                CatalogItem::new("skiff", 3),
                CatalogItem::new("raft", 5),
                CatalogItem::new("airship", 8),
            ],
        )
        .with_group(
            "vehicle_perks",
            vec![
                CatalogItem::new("transforming", 2),
                CatalogItem::new("sealed_hull", 3),
                CatalogItem::new("chatty", 1),
                CatalogItem::new("armament", 2),
                CatalogItem::new("heavy_armament", 3).requiring(["armament"]),
                CatalogItem::new("ballast", 4).requiring(["submarine"]),
                CatalogItem::new("slipstream", 1).requiring(["sleek"]),
            ],
        )
        .with_group("vehicle_traits", vec![CatalogItem::new("sleek", 2)])
        // Spells
        .with_spell_group(
            "necromancy_spells",
            vec![
                CatalogItem::new("death_knell", 0).with_grade(Grade::Xuth),
                CatalogItem::new("bone_spear", 0).with_grade(Grade::Kaarn),
                CatalogItem::new("grave_pact", 0).with_grade(Grade::Xuth),
                CatalogItem::new("soul_forge", 0).with_grade(Grade::Sinthru),
            ],
        )
        .with_spell_group(
            "alchemy_spells",
            vec![
                CatalogItem::new("transmute", 0).with_grade(Grade::Purth),
                CatalogItem::new("gild", 0).with_grade(Grade::Kaarn),
            ],
        )
}

/// A builder over the fixture catalog with the given sigil pool.
pub fn builder_with(available: SigilCounts) -> CharacterBuilder {
    let mut builder = CharacterBuilder::new(Arc::new(catalog()), BuilderConfig::default())
        .expect("fixture catalog is valid");
    builder.set_available_sigils(available);
    builder
}

pub fn builder() -> CharacterBuilder {
    builder_with(pool(10))
}

/// Used sigils never exceed the pool.
pub fn assert_within_capacity(builder: &CharacterBuilder) {
    let used = builder.used_sigil_counts();
    let available = builder.state().available_sigils();
    assert!(
        used.fits_within(&available),
        "used {:?} exceeds available {:?}",
        used,
        available
    );
}
