//! Persistence module.
//!
//! Saved data is plain JSON. Builds live in a library keyed by kind and
//! build name, each wrapped as `{ "version": 1, "data": { .. } }`; whole
//! characters are stored the same way. Hydration is lenient: a missing or
//! malformed field becomes its empty default, and an entry with an unknown
//! version is skipped with a warning instead of being loaded.
//!
//! ```text
//! {
//!   "companions": { "Rex": { "version": 1, "data": { "categories": ["familiar"], .. } } },
//!   "weapons": {},
//!   "beasts": {},
//!   "vehicles": {}
//! }
//! ```

use crate::catalog::Catalog;
use crate::config::BuilderConfig;
use crate::error::BuilderError;
use crate::family::Family;
use crate::id::ItemId;
use crate::ordered::OrderedSet;
use crate::reference::{BuildKind, ReferenceBuild, MAX_BP_SPENT};
use crate::sheet::{CharacterBuilder, CharacterState};
use crate::sigil::FamilySelection;
use crate::tier::SigilCounts;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Version written into every saved entry.
pub const SAVE_VERSION: u64 = 1;

static NULL: Value = Value::Null;

/// Saved reference builds, by kind and name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildLibrary {
    builds: BTreeMap<BuildKind, BTreeMap<String, ReferenceBuild>>,
}

impl BuildLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, build: ReferenceBuild) {
        self.builds
            .entry(build.kind())
            .or_default()
            .insert(name.to_string(), build);
    }

    pub fn get(&self, kind: BuildKind, name: &str) -> Option<&ReferenceBuild> {
        self.builds.get(&kind).and_then(|builds| builds.get(name))
    }

    pub fn remove(&mut self, kind: BuildKind, name: &str) -> Option<ReferenceBuild> {
        self.builds.get_mut(&kind)?.remove(name)
    }

    pub fn names(&self, kind: BuildKind) -> Vec<&str> {
        self.builds
            .get(&kind)
            .map(|builds| builds.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.builds.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a library, skipping anything that cannot be used.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use magecraft::persist::BuildLibrary;
    /// use magecraft::reference::BuildKind;
    /// use serde_json::json;
    ///
    /// let raw = json!({
    ///     "companions": {
    ///         "Rex": { "version": 1, "data": { "categories": ["familiar"], "bpSpent": 2 } },
    ///         "Old": { "version": 7, "data": {} }
    ///     },
    ///     "vehicles": "not an object"
    /// });
    ///
    /// let library = BuildLibrary::hydrate(&raw);
    /// assert_eq!(library.names(BuildKind::Companion), vec!["Rex"]);
    /// assert_eq!(library.get(BuildKind::Companion, "Rex").unwrap().bp_spent(), 2);
    /// assert!(library.names(BuildKind::Vehicle).is_empty());
    /// ```
    pub fn hydrate(raw: &Value) -> Self {
        let mut library = Self::new();
        let Some(root) = raw.as_object() else {
            warn!("build library is not an object; starting empty");
            return library;
        };

        for kind in BuildKind::ALL {
            let Some(section) = root.get(kind.library_key()) else {
                continue;
            };
            let Some(entries) = section.as_object() else {
                warn!(kind = %kind, "build library section is not an object; skipped");
                continue;
            };
            for (name, entry) in entries {
                match versioned_data(entry) {
                    Ok(data) => library.insert(name, hydrate_build(kind, data)),
                    Err(err) => warn!(kind = %kind, build = %name, %err, "saved build skipped"),
                }
            }
        }
        library
    }

    /// Write the library in its storage shape. Every kind gets a section.
    pub fn dehydrate(&self) -> Value {
        let mut root = Map::new();
        for kind in BuildKind::ALL {
            let mut section = Map::new();
            if let Some(builds) = self.builds.get(&kind) {
                for (name, build) in builds {
                    section.insert(
                        name.clone(),
                        json!({ "version": SAVE_VERSION, "data": dehydrate_build(build) }),
                    );
                }
            }
            root.insert(kind.library_key().to_string(), Value::Object(section));
        }
        Value::Object(root)
    }
}

/// Unwrap `{version, data}`, rejecting versions this crate cannot read.
fn versioned_data(entry: &Value) -> Result<&Value, BuilderError> {
    let version = entry.get("version").and_then(Value::as_u64).unwrap_or(0);
    if version != SAVE_VERSION {
        return Err(BuilderError::UnsupportedVersion(
            u32::try_from(version).unwrap_or(u32::MAX),
        ));
    }
    Ok(entry.get("data").unwrap_or(&NULL))
}

/// Read one field, falling back to its default when absent or malformed.
fn field<T>(data: &Value, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match data.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(field = key, %err, "malformed saved field; using default");
                T::default()
            }
        },
    }
}

/// Ids from an array, skipping anything that is not a string.
fn id_list(value: Option<&Value>) -> OrderedSet<ItemId> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(ItemId::new).collect())
        .unwrap_or_default()
}

fn id_strs(set: &OrderedSet<ItemId>) -> Vec<&str> {
    set.iter().map(ItemId::as_str).collect()
}

/// Read a saved build field by field.
pub fn hydrate_build(kind: BuildKind, data: &Value) -> ReferenceBuild {
    let mut build = ReferenceBuild::new(kind);
    build.categories = id_list(data.get("categories"));
    build.profile = data.get("profile").and_then(Value::as_str).map(ItemId::new);
    build.traits = id_list(data.get("traits"));

    if let Some(perks) = data.get("perks").and_then(Value::as_object) {
        for (perk, count) in perks {
            match count.as_u64() {
                Some(0) => {}
                Some(count) => {
                    build
                        .perks
                        .insert(ItemId::new(perk), u32::try_from(count).unwrap_or(u32::MAX));
                }
                None => warn!(perk = %perk, "perk count is not a number; skipped"),
            }
        }
    }
    if let Some(assignments) = data.get("assignments").and_then(Value::as_object) {
        for (perk, name) in assignments {
            if let Some(name) = name.as_str().filter(|n| !n.is_empty()) {
                build.assignments.insert(ItemId::new(perk), name.to_string());
            }
        }
    }
    if let Some(map_picks) = data.get("mapPicks").and_then(Value::as_object) {
        for (perk, picks) in map_picks {
            let picks = id_list(Some(picks));
            if !picks.is_empty() {
                build.map_picks.insert(ItemId::new(perk), picks);
            }
        }
    }
    build.bp_spent = data
        .get("bpSpent")
        .and_then(Value::as_u64)
        .map_or(0, |bp| u32::try_from(bp).unwrap_or(u32::MAX).min(MAX_BP_SPENT));
    build
}

/// The storage shape of one build, without the version wrapper.
pub fn dehydrate_build(build: &ReferenceBuild) -> Value {
    let perks: Map<String, Value> = build
        .perks
        .iter()
        .map(|(perk, count)| (perk.to_string(), json!(count)))
        .collect();
    let assignments: Map<String, Value> = build
        .assignments
        .iter()
        .map(|(perk, name)| (perk.to_string(), json!(name)))
        .collect();
    let map_picks: Map<String, Value> = build
        .map_picks
        .iter()
        .map(|(perk, picks)| (perk.to_string(), json!(id_strs(picks))))
        .collect();

    json!({
        "categories": id_strs(&build.categories),
        "profile": build.profile.as_ref().map(ItemId::as_str),
        "traits": id_strs(&build.traits),
        "perks": perks,
        "assignments": assignments,
        "mapPicks": map_picks,
        "bpSpent": build.bp_spent,
    })
}

/// A whole character in its storage shape.
pub struct CharacterSnapshot;

impl CharacterSnapshot {
    /// Wrap a character's state as `{version, data}`.
    pub fn dehydrate(state: &CharacterState) -> Value {
        let families: Map<String, Value> = state
            .families
            .iter()
            .filter_map(|(family, selection)| {
                serde_json::to_value(selection)
                    .ok()
                    .map(|value| (family.key().to_string(), value))
            })
            .collect();

        let builds: Map<String, Value> = state
            .builds
            .iter()
            .map(|(kind, builds)| {
                let named: Map<String, Value> = builds
                    .iter()
                    .map(|(name, build)| (name.clone(), dehydrate_build(build)))
                    .collect();
                (kind.key().to_string(), Value::Object(named))
            })
            .collect();

        json!({
            "version": SAVE_VERSION,
            "data": {
                "availableSigils": state.available_sigils,
                "families": families,
                "purchases": state.purchases,
                "entryChoices": state.entry_choices,
                "contractBackup": state.contract_backup,
                "builds": builds,
            }
        })
    }

    /// Read a character's state field by field.
    ///
    /// Only an unknown version is an error; anything malformed inside the
    /// data falls back to empty.
    pub fn hydrate(raw: &Value) -> Result<CharacterState, BuilderError> {
        let data = versioned_data(raw)?;

        let mut state = CharacterState {
            available_sigils: field::<SigilCounts>(data, "availableSigils"),
            purchases: field(data, "purchases"),
            entry_choices: field(data, "entryChoices"),
            contract_backup: field(data, "contractBackup"),
            ..CharacterState::default()
        };

        if let Some(families) = data.get("families").and_then(Value::as_object) {
            for (key, value) in families {
                let Ok(family) = key.parse::<Family>() else {
                    warn!(family = %key, "unknown family in save; skipped");
                    continue;
                };
                match serde_json::from_value::<FamilySelection>(value.clone()) {
                    Ok(selection) => {
                        state.families.insert(family, selection);
                    }
                    Err(err) => warn!(%family, %err, "malformed family in save; skipped"),
                }
            }
        }

        if let Some(builds) = data.get("builds").and_then(Value::as_object) {
            for kind in BuildKind::ALL {
                let Some(named) = builds.get(kind.key()).and_then(Value::as_object) else {
                    continue;
                };
                let section = state.builds.entry(kind).or_default();
                for (name, build) in named {
                    section.insert(name.clone(), hydrate_build(kind, build));
                }
            }
        }

        Ok(state)
    }

    /// Hydrate and hand the state to a builder, which repairs it.
    pub fn restore(
        raw: &Value,
        catalog: Arc<dyn Catalog>,
        config: BuilderConfig,
    ) -> Result<CharacterBuilder, BuilderError> {
        let state = Self::hydrate(raw)?;
        CharacterBuilder::from_state(catalog, config, state)
    }
}

/// String key-value storage the save slots sit on.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str) -> Option<String>;
    fn keys(&self) -> Vec<String>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

const SLOT_PREFIX: &str = "character:";
const LIBRARY_KEY: &str = "build_library";

/// Named character saves plus the shared build library.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use magecraft::persist::{MemoryStore, SaveSlots};
/// use magecraft::{BuilderConfig, CharacterBuilder, StaticCatalog};
///
/// let catalog = Arc::new(StaticCatalog::new());
/// let builder = CharacterBuilder::new(catalog.clone(), BuilderConfig::default()).unwrap();
///
/// let mut slots = SaveSlots::new(MemoryStore::new());
/// slots.save("hero", &builder).unwrap();
/// assert_eq!(slots.slots(), vec!["hero".to_string()]);
///
/// let loaded = slots.load("hero", catalog, BuilderConfig::default()).unwrap();
/// assert!(loaded.is_some());
/// ```
#[derive(Debug)]
pub struct SaveSlots<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SaveSlots<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn save(&mut self, slot: &str, builder: &CharacterBuilder) -> Result<(), BuilderError> {
        let raw = CharacterSnapshot::dehydrate(builder.state());
        self.store
            .set(&format!("{}{}", SLOT_PREFIX, slot), serde_json::to_string(&raw)?);
        Ok(())
    }

    /// Load a slot. Missing, unparsable and unknown-version saves all come
    /// back as `None`; only building the rules can fail.
    pub fn load(
        &self,
        slot: &str,
        catalog: Arc<dyn Catalog>,
        config: BuilderConfig,
    ) -> Result<Option<CharacterBuilder>, BuilderError> {
        let Some(text) = self.store.get(&format!("{}{}", SLOT_PREFIX, slot)) else {
            return Ok(None);
        };
        let raw: Value = match serde_json::from_str(&text) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(slot, %err, "save is not valid JSON; ignored");
                return Ok(None);
            }
        };
        let state = match CharacterSnapshot::hydrate(&raw) {
            Ok(state) => state,
            Err(err) => {
                warn!(slot, %err, "save skipped");
                return Ok(None);
            }
        };
        CharacterBuilder::from_state(catalog, config, state).map(Some)
    }

    pub fn delete(&mut self, slot: &str) -> bool {
        self.store
            .remove(&format!("{}{}", SLOT_PREFIX, slot))
            .is_some()
    }

    /// Slot names, sorted as the store lists them.
    pub fn slots(&self) -> Vec<String> {
        self.store
            .keys()
            .into_iter()
            .filter_map(|key| key.strip_prefix(SLOT_PREFIX).map(str::to_string))
            .collect()
    }

    pub fn save_library(&mut self, library: &BuildLibrary) -> Result<(), BuilderError> {
        let text = serde_json::to_string(&library.dehydrate())?;
        self.store.set(LIBRARY_KEY, text);
        Ok(())
    }

    /// The stored library, or an empty one if it is missing or unreadable.
    pub fn load_library(&self) -> BuildLibrary {
        let Some(text) = self.store.get(LIBRARY_KEY) else {
            return BuildLibrary::new();
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(raw) => BuildLibrary::hydrate(&raw),
            Err(err) => {
                warn!(%err, "build library is not valid JSON; starting empty");
                BuildLibrary::new()
            }
        }
    }
}
