//! The per-protocol block state palette and its one-shot finalization.
//!
//! Custom states are queued with [`BlockStatePalette::insert_state`] while
//! the server boots. [`BlockStatePalette::finalize`] merges them into every
//! protocol's vanilla palette, re-sorts each palette by name hash, assigns
//! runtime ids and publishes the result through the dictionary patcher.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use customs_nbt::{NbtCompound, NbtTag};
use tracing::{debug, error, info, warn};

use crate::block_state::{
    insert_lookup, names, resolve_fallback, BlockStateEntry, ProtocolBlockTable, StateLookup,
};
use crate::dictionary::NetworkDictionaryPatcher;
use crate::error::RegistryError;
use crate::hash::name_hash;

/// States of one block, keyed by the name the palette groups them under.
#[derive(Debug, Default)]
struct StateGroups {
    groups: Vec<(String, Vec<BlockStateEntry>)>,
    index: HashMap<String, usize>,
}

impl StateGroups {
    fn push(&mut self, group: &str, state: BlockStateEntry) {
        match self.index.get(group) {
            Some(&i) => self.groups[i].1.push(state),
            None => {
                self.index.insert(group.to_string(), self.groups.len());
                self.groups.push((group.to_string(), vec![state]));
            }
        }
    }

    /// Replace a group in place, or append it if the name is new.
    fn replace(&mut self, group: &str, states: Vec<BlockStateEntry>) {
        match self.index.get(group) {
            Some(&i) => self.groups[i].1 = states,
            None => {
                self.index.insert(group.to_string(), self.groups.len());
                self.groups.push((group.to_string(), states));
            }
        }
    }
}

pub struct BlockStatePalette {
    patcher: Arc<dyn NetworkDictionaryPatcher>,
    states: BTreeMap<i32, Vec<BlockStateEntry>>,
    custom_states: Vec<BlockStateEntry>,
    pending: StateGroups,
    finalized: bool,
}

impl BlockStatePalette {
    /// Snapshot the current palette of every protocol the patcher serves.
    pub fn new(patcher: Arc<dyn NetworkDictionaryPatcher>) -> Result<Self, RegistryError> {
        let mut states = BTreeMap::new();
        for protocol in patcher.protocols() {
            let table = patcher
                .block_table(protocol)
                .ok_or(RegistryError::UnsupportedProtocol(protocol))?;
            states.insert(protocol, table.states().to_vec());
        }
        debug!(protocols = states.len(), "Loaded block palettes");
        Ok(Self {
            patcher,
            states,
            custom_states: Vec::new(),
            pending: StateGroups::default(),
            finalized: false,
        })
    }

    pub fn protocols(&self) -> impl Iterator<Item = i32> + '_ {
        self.states.keys().copied()
    }

    /// Ordered states of one protocol. Runtime ids are positions.
    pub fn get_states(&self, protocol: i32) -> Result<&[BlockStateEntry], RegistryError> {
        self.states
            .get(&protocol)
            .map(Vec::as_slice)
            .ok_or(RegistryError::UnsupportedProtocol(protocol))
    }

    /// Custom states in insertion order.
    pub fn custom_states(&self) -> &[BlockStateEntry] {
        &self.custom_states
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Queue a custom state for the next [`finalize`](Self::finalize).
    pub fn insert_state(
        &mut self,
        name: &str,
        properties: NbtCompound,
        meta: i32,
    ) -> Result<(), RegistryError> {
        if self.finalized {
            return Err(RegistryError::AlreadyFinalized);
        }
        if name.is_empty() {
            return Err(RegistryError::MalformedState("empty block name".into()));
        }
        let state = BlockStateEntry::new(name, properties, meta);
        self.pending.push(name, state.clone());
        self.custom_states.push(state);
        Ok(())
    }

    /// Queue a state given in its NBT form: `{name: String, states: Compound}`.
    pub fn insert_state_nbt(&mut self, state: &NbtCompound, meta: i32) -> Result<(), RegistryError> {
        let name = state
            .get("name")
            .and_then(NbtTag::as_string)
            .ok_or_else(|| RegistryError::MalformedState("missing name".into()))?;
        let properties = state
            .get("states")
            .and_then(NbtTag::as_compound)
            .ok_or_else(|| {
                RegistryError::MalformedState(format!("{name} has no states compound"))
            })?;
        self.insert_state(name, properties.clone(), meta)
    }

    /// Merge queued states into every protocol palette and publish them.
    ///
    /// Either every protocol is updated or none is.
    pub fn finalize(&mut self) -> Result<(), RegistryError> {
        if self.finalized {
            return Err(RegistryError::AlreadyFinalized);
        }
        let alias_skulls = self.states.len() > 1;

        let mut tables = Vec::with_capacity(self.states.len());
        for (&protocol, existing) in &self.states {
            let table = self
                .sort_protocol(existing, alias_skulls)
                .inspect_err(|e| error!(protocol, error = %e, "Failed to sort block palette"))?;
            tables.push((protocol, table));
        }

        for (protocol, table) in tables {
            info!(
                protocol,
                states = table.len(),
                fallback = table.fallback_state_id(),
                "Block palette finalized"
            );
            self.states.insert(protocol, table.states().to_vec());
            self.patcher.replace_block_table(protocol, table);
        }
        self.pending = StateGroups::default();
        self.finalized = true;
        Ok(())
    }

    fn sort_protocol(
        &self,
        existing: &[BlockStateEntry],
        alias_skulls: bool,
    ) -> Result<ProtocolBlockTable, RegistryError> {
        let mut groups = StateGroups::default();
        for state in existing {
            groups.push(state.group_name(), state.clone());
        }
        for (name, states) in &self.pending.groups {
            groups.replace(name, states.clone());
        }

        let mut groups = groups.groups;
        groups.sort_by_key(|(name, _)| name_hash(name));

        let mut sorted = Vec::with_capacity(groups.iter().map(|(_, s)| s.len()).sum());
        let mut lookup = HashMap::new();
        for (_, states) in &groups {
            let single = states.len() == 1;
            for state in states {
                let runtime_id = sorted.len() as u32;
                insert_lookup(&mut lookup, state, runtime_id, single);
                sorted.push(state.with_runtime_id(runtime_id));
            }
        }

        if alias_skulls {
            alias_skull_variants(&mut lookup);
        }
        let fallback = resolve_fallback(&lookup)?;
        Ok(ProtocolBlockTable::from_parts(sorted, lookup, fallback))
    }
}

/// Older protocols lack the newer skull blocks; point them at the skeleton
/// skull so they still resolve.
fn alias_skull_variants(lookup: &mut HashMap<String, StateLookup>) {
    let Some(skeleton) = lookup.get(names::SKELETON_SKULL).cloned() else {
        warn!("No {} state to alias skull variants to", names::SKELETON_SKULL);
        return;
    };
    for variant in names::SKULL_VARIANTS {
        if !lookup.contains_key(variant) {
            debug!(variant, "Aliasing skull variant to skeleton skull");
            lookup.insert(variant.to_string(), skeleton.clone());
        }
    }
}

impl std::fmt::Debug for BlockStatePalette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockStatePalette")
            .field("protocols", &self.states.keys().collect::<Vec<_>>())
            .field("custom_states", &self.custom_states.len())
            .field("finalized", &self.finalized)
            .finish()
    }
}
