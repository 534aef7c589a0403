//! # magecraft - Budget and Eligibility Resolver for a Character Builder
//!
//! The rule engine behind a magecraft character sheet:
//! - **Sigil trees** with prerequisite graphs, cascading deselection and
//!   a shared, tiered sigil pool
//! - **Point budgets** in Fortune, Blessing and per-build currencies
//! - **Constrained multi-select** ("MAP selection") over the spell catalog
//! - **Reference builds** for companions, weapons, beasts and vehicles
//! - **Versioned persistence** that degrades instead of failing
//!
//! ## Core Concepts
//!
//! ### Rules and state
//!
//! Static rules and mutable picks are kept apart:
//!
//! ```text
//! [Catalog] + [BuilderConfig] → [SigilTree] / [ReferencePage]   (rules)
//!                                   ↓ operate on
//!                    [FamilySelection] / [ReferenceBuild]        (state)
//! ```
//!
//! `CharacterBuilder` owns both and is the only writer of a character.
//!
//! ### Silent rejection
//!
//! Every interactive operation returns `bool`. A rule that blocks an
//! intent leaves the state untouched; nothing is half-applied. Errors are
//! reserved for loading malformed static data, unknown save versions, and
//! the MAP confirm-time validator.
//!
//! ### Trimming
//!
//! All selections are insertion-ordered. When a quota shrinks, the
//! selection keeps its first picks and drops the rest, running the same
//! cleanup a manual removal would.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use magecraft::*;
//!
//! let catalog = StaticCatalog::new()
//!     .with_sigils(
//!         Family::CompellingWill,
//!         vec![
//!             SigilNode::new("root", SigilTier::Kaarn).granting("telekinetics", 1),
//!             SigilNode::new("mid", SigilTier::Purth).after(["root"]),
//!         ],
//!     )
//!     .with_group(
//!         "compelling_will_telekinetics",
//!         vec![CatalogItem::new("tk_lift", 0)],
//!     );
//!
//! let mut builder = CharacterBuilder::new(Arc::new(catalog), BuilderConfig::default()).unwrap();
//! builder.set_available_sigils(SigilCounts::new().with(SigilTier::Kaarn, 1).with(SigilTier::Purth, 1));
//!
//! let will = Family::CompellingWill;
//! assert!(builder.select_node(will, &"root".into()));
//! assert!(builder.select_node(will, &"mid".into()));
//! assert!(builder.select_sub_item(will, "telekinetics", &"tk_lift".into()));
//!
//! // deselecting the root takes its dependents and their picks with it
//! assert!(builder.select_node(will, &"root".into()));
//! assert!(builder.family(will).nodes().is_empty());
//! assert!(builder.family(will).picks("telekinetics").is_empty());
//! assert_eq!(builder.budgets().get(Currency::Blessing).spent, 0);
//! ```
//!
//! ## Modules
//!
//! - [`id`] - Interned item identifiers
//! - [`tier`] - Sigil tiers, spell grades and the sigil pool
//! - [`catalog`] - Read-only static content
//! - [`ordered`] - Insertion-ordered selections
//! - [`graph`] - Prerequisite graph
//! - [`family`] - Blessing family rule tables
//! - [`sigil`] - The sigil tree engine
//! - [`map_select`] - Constrained multi-select
//! - [`reference`] - Companion, weapon, beast and vehicle builds
//! - [`breakdown`] - Itemised point totals
//! - [`budget`] - Per-currency budgets
//! - [`sheet`] - The character builder
//! - [`persist`] - Save and load
//! - [`config`] - Builder configuration
//! - [`error`] - Error types

pub mod breakdown;
pub mod budget;
pub mod catalog;
pub mod config;
pub mod error;
pub mod family;
pub mod graph;
pub mod id;
pub mod map_select;
pub mod ordered;
pub mod persist;
pub mod reference;
pub mod sheet;
pub mod sigil;
pub mod tier;

// Re-export main types for convenience
pub use breakdown::PointBreakdown;
pub use budget::{Budget, BudgetAggregator, BudgetSummary, Currency};
pub use catalog::{Catalog, CatalogItem, Cost, SigilNode, SpellEntry, SpellIndex, StaticCatalog};
pub use config::{BudgetConfig, BuilderConfig, ChoiceEntry, PactConfig};
pub use error::BuilderError;
pub use family::{Family, FamilyDefinition, TreeShape};
pub use id::ItemId;
pub use map_select::{MapConfig, MapSelection, MapValidator, ValidatorRule};
pub use ordered::OrderedSet;
pub use reference::{BuildKind, ReferenceBuild};
pub use sheet::{CharacterBuilder, CharacterState};
pub use tier::{Grade, SigilCounts, SigilTier};
