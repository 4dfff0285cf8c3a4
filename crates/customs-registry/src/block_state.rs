//! Block states and the per-protocol lookup tables built from them.

use std::collections::HashMap;
use std::sync::OnceLock;

use bytes::Bytes;
use customs_nbt::{to_network_bytes, NbtCompound, NbtRoot};

use crate::error::RegistryError;

/// Well-known block names the palette depends on.
pub mod names {
    /// Runtime id every unknown state falls back to.
    pub const INFO_UPDATE: &str = "minecraft:info_update";
    pub const SKELETON_SKULL: &str = "minecraft:skeleton_skull";

    /// Skull variants that older protocols only know as the skeleton skull.
    pub const SKULL_VARIANTS: [&str; 6] = [
        "minecraft:wither_skeleton_skull",
        "minecraft:zombie_head",
        "minecraft:player_head",
        "minecraft:creeper_head",
        "minecraft:dragon_head",
        "minecraft:piglin_head",
    ];
}

/// A single block state: a block name plus a concrete property assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStateEntry {
    name: String,
    properties: NbtCompound,
    raw_properties: Bytes,
    meta: i32,
    previous_name: Option<String>,
    runtime_id: Option<u32>,
}

impl BlockStateEntry {
    pub fn new(name: impl Into<String>, properties: NbtCompound, meta: i32) -> Self {
        let raw_properties = encode_properties(&properties);
        Self {
            name: name.into(),
            properties,
            raw_properties,
            meta,
            previous_name: None,
            runtime_id: None,
        }
    }

    /// Record the name this state had before an upgrade renamed it.
    pub fn with_previous_name(mut self, previous: impl Into<String>) -> Self {
        self.previous_name = Some(previous.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &NbtCompound {
        &self.properties
    }

    /// Canonical encoding of the properties, used as the variant lookup key.
    pub fn raw_properties(&self) -> &Bytes {
        &self.raw_properties
    }

    pub fn meta(&self) -> i32 {
        self.meta
    }

    pub fn previous_name(&self) -> Option<&str> {
        self.previous_name.as_deref()
    }

    /// Position in the protocol's palette, once assigned.
    pub fn runtime_id(&self) -> Option<u32> {
        self.runtime_id
    }

    /// Name used to group states of one block when sorting.
    pub(crate) fn group_name(&self) -> &str {
        self.previous_name.as_deref().unwrap_or(&self.name)
    }

    pub(crate) fn with_runtime_id(&self, runtime_id: u32) -> Self {
        Self {
            runtime_id: Some(runtime_id),
            ..self.clone()
        }
    }
}

/// Properties are keyed by name in a BTreeMap, so the encoding is canonical.
pub(crate) fn encode_properties(properties: &NbtCompound) -> Bytes {
    to_network_bytes(&NbtRoot::unnamed(properties.clone()))
}

/// What a block name resolves to in a palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateLookup {
    /// The block has exactly one state.
    Single(u32),
    /// Runtime ids keyed by raw properties.
    Variants(HashMap<Bytes, u32>),
}

/// One protocol's finished palette: ordered states, name lookup, fallback.
#[derive(Debug)]
pub struct ProtocolBlockTable {
    states: Vec<BlockStateEntry>,
    lookup: HashMap<String, StateLookup>,
    fallback_state_id: u32,
    id_meta_cache: OnceLock<HashMap<(String, i32), u32>>,
}

impl ProtocolBlockTable {
    pub(crate) fn from_parts(
        states: Vec<BlockStateEntry>,
        lookup: HashMap<String, StateLookup>,
        fallback_state_id: u32,
    ) -> Self {
        Self {
            states,
            lookup,
            fallback_state_id,
            id_meta_cache: OnceLock::new(),
        }
    }

    /// Build a table from states already in palette order.
    ///
    /// Runtime ids are the positions in `states`. Fails if the palette has
    /// no `minecraft:info_update` state to fall back to.
    pub fn from_states(states: Vec<BlockStateEntry>) -> Result<Self, RegistryError> {
        let mut state_counts: HashMap<&str, usize> = HashMap::new();
        for state in &states {
            *state_counts.entry(state.name()).or_default() += 1;
        }

        let mut lookup = HashMap::new();
        for (index, state) in states.iter().enumerate() {
            let single = state_counts.get(state.name()).copied() == Some(1);
            insert_lookup(&mut lookup, state, index as u32, single);
        }

        let fallback = resolve_fallback(&lookup)?;
        let states = states
            .iter()
            .enumerate()
            .map(|(index, state)| state.with_runtime_id(index as u32))
            .collect();
        Ok(Self::from_parts(states, lookup, fallback))
    }

    pub fn states(&self) -> &[BlockStateEntry] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn fallback_state_id(&self) -> u32 {
        self.fallback_state_id
    }

    pub fn lookup_name(&self, name: &str) -> Option<&StateLookup> {
        self.lookup.get(name)
    }

    /// Resolve a name and property assignment to a runtime id.
    pub fn lookup(&self, name: &str, properties: &NbtCompound) -> Option<u32> {
        match self.lookup.get(name)? {
            StateLookup::Single(id) => Some(*id),
            StateLookup::Variants(variants) => {
                variants.get(&encode_properties(properties)).copied()
            }
        }
    }

    /// Like [`lookup`](Self::lookup), but unknown states map to the fallback.
    pub fn lookup_or_fallback(&self, name: &str, properties: &NbtCompound) -> u32 {
        self.lookup(name, properties).unwrap_or(self.fallback_state_id)
    }

    pub fn state(&self, runtime_id: u32) -> Option<&BlockStateEntry> {
        self.states.get(runtime_id as usize)
    }

    /// Resolve a legacy `(name, meta)` pair. The index is built on first use.
    pub fn lookup_id_meta(&self, name: &str, meta: i32) -> Option<u32> {
        let cache = self.id_meta_cache.get_or_init(|| {
            let mut map = HashMap::with_capacity(self.states.len());
            for (index, state) in self.states.iter().enumerate() {
                map.entry((state.name().to_string(), state.meta()))
                    .or_insert(index as u32);
            }
            map
        });
        cache.get(&(name.to_string(), meta)).copied()
    }
}

pub(crate) fn insert_lookup(
    lookup: &mut HashMap<String, StateLookup>,
    state: &BlockStateEntry,
    runtime_id: u32,
    single: bool,
) {
    if single {
        lookup.insert(state.name().to_string(), StateLookup::Single(runtime_id));
        return;
    }
    let entry = lookup
        .entry(state.name().to_string())
        .or_insert_with(|| StateLookup::Variants(HashMap::new()));
    if let StateLookup::Single(_) = entry {
        *entry = StateLookup::Variants(HashMap::new());
    }
    if let StateLookup::Variants(variants) = entry {
        variants.insert(state.raw_properties().clone(), runtime_id);
    }
}

pub(crate) fn resolve_fallback(lookup: &HashMap<String, StateLookup>) -> Result<u32, RegistryError> {
    match lookup.get(names::INFO_UPDATE) {
        Some(StateLookup::Single(id)) => Ok(*id),
        Some(StateLookup::Variants(_)) => Err(RegistryError::AssumptionViolation(format!(
            "{} has more than one state",
            names::INFO_UPDATE
        ))),
        None => Err(RegistryError::AssumptionViolation(format!(
            "palette has no {} state",
            names::INFO_UPDATE
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use customs_nbt::NbtTag;

    fn props(pairs: &[(&str, NbtTag)]) -> NbtCompound {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn vanilla() -> Vec<BlockStateEntry> {
        vec![
            BlockStateEntry::new("minecraft:air", NbtCompound::new(), 0),
            BlockStateEntry::new("minecraft:info_update", NbtCompound::new(), 0),
            BlockStateEntry::new(
                "minecraft:wool",
                props(&[("color", "white".into())]),
                0,
            ),
            BlockStateEntry::new(
                "minecraft:wool",
                props(&[("color", "orange".into())]),
                1,
            ),
        ]
    }

    #[test]
    fn single_and_variant_lookups() {
        let table = ProtocolBlockTable::from_states(vanilla()).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.fallback_state_id(), 1);
        assert_eq!(
            table.lookup_name("minecraft:air"),
            Some(&StateLookup::Single(0))
        );
        assert_eq!(
            table.lookup("minecraft:wool", &props(&[("color", "orange".into())])),
            Some(3)
        );
        assert_eq!(
            table.lookup("minecraft:wool", &props(&[("color", "lime".into())])),
            None
        );
        assert_eq!(
            table.lookup_or_fallback("minecraft:wool", &props(&[("color", "lime".into())])),
            1
        );
    }

    #[test]
    fn runtime_ids_are_positions() {
        let table = ProtocolBlockTable::from_states(vanilla()).unwrap();
        for (index, state) in table.states().iter().enumerate() {
            assert_eq!(state.runtime_id(), Some(index as u32));
        }
        assert_eq!(table.state(2).map(BlockStateEntry::meta), Some(0));
    }

    #[test]
    fn missing_info_update_is_fatal() {
        let states = vec![BlockStateEntry::new("minecraft:air", NbtCompound::new(), 0)];
        let err = ProtocolBlockTable::from_states(states).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn id_meta_lookup() {
        let table = ProtocolBlockTable::from_states(vanilla()).unwrap();
        assert_eq!(table.lookup_id_meta("minecraft:wool", 1), Some(3));
        assert_eq!(table.lookup_id_meta("minecraft:wool", 7), None);
        // Second call hits the built index.
        assert_eq!(table.lookup_id_meta("minecraft:air", 0), Some(0));
    }

    #[test]
    fn property_order_does_not_change_the_key() {
        let a = BlockStateEntry::new(
            "custom:lamp",
            props(&[("lit", true.into()), ("power", NbtTag::Int(3))]),
            0,
        );
        let b = BlockStateEntry::new(
            "custom:lamp",
            props(&[("power", NbtTag::Int(3)), ("lit", true.into())]),
            0,
        );
        assert_eq!(a.raw_properties(), b.raw_properties());
    }

    #[test]
    fn group_name_prefers_previous_name() {
        let state = BlockStateEntry::new("minecraft:oak_log", NbtCompound::new(), 0)
            .with_previous_name("minecraft:log");
        assert_eq!(state.group_name(), "minecraft:log");
        assert_eq!(state.previous_name(), Some("minecraft:log"));
    }
}
