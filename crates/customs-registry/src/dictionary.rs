//! Adapter over the host's per-protocol type dictionaries.
//!
//! The registries never touch host state directly. Everything they publish
//! (sorted palettes, item id mappings, block item links) goes through
//! [`NetworkDictionaryPatcher`], so a host can back it with whatever storage
//! its network serializers already read from.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::block_state::ProtocolBlockTable;
use crate::item::ItemTypeEntry;

pub trait NetworkDictionaryPatcher: Send + Sync {
    /// Protocols with a live dictionary, ascending.
    fn protocols(&self) -> Vec<i32>;

    /// Current palette of a protocol.
    fn block_table(&self, protocol: i32) -> Option<Arc<ProtocolBlockTable>>;

    /// Swap in a new palette. States, lookup and fallback change together.
    fn replace_block_table(&self, protocol: i32, table: ProtocolBlockTable);

    /// Publish a new item type: both id maps plus the item type list.
    fn register_item_type(&self, protocol: i32, entry: Arc<ItemTypeEntry>);

    /// Record that `item` places `block`. Existing links are left alone.
    fn map_block_item(&self, protocol: i32, item: &str, block: &str);
}

/// Item id mappings of one protocol.
#[derive(Debug, Clone, Default)]
pub struct ItemTypeDictionary {
    int_to_string: HashMap<i16, String>,
    string_to_int: HashMap<String, i16>,
    item_types: Vec<Arc<ItemTypeEntry>>,
}

impl ItemTypeDictionary {
    pub fn new(entries: impl IntoIterator<Item = Arc<ItemTypeEntry>>) -> Self {
        let mut dictionary = Self::default();
        for entry in entries {
            dictionary.insert(entry);
        }
        dictionary
    }

    fn insert(&mut self, entry: Arc<ItemTypeEntry>) {
        self.int_to_string
            .insert(entry.numeric_id(), entry.identifier().to_string());
        self.string_to_int
            .insert(entry.identifier().to_string(), entry.numeric_id());
        self.item_types.push(entry);
    }

    pub fn numeric_id(&self, identifier: &str) -> Option<i16> {
        self.string_to_int.get(identifier).copied()
    }

    pub fn identifier(&self, numeric_id: i16) -> Option<&str> {
        self.int_to_string.get(&numeric_id).map(String::as_str)
    }

    pub fn item_types(&self) -> &[Arc<ItemTypeEntry>] {
        &self.item_types
    }
}

#[derive(Debug)]
struct ProtocolDictionaries {
    blocks: RwLock<Arc<ProtocolBlockTable>>,
    items: RwLock<ItemTypeDictionary>,
    block_items: RwLock<HashMap<String, String>>,
}

/// In-process dictionaries, one set per protocol.
#[derive(Debug, Default)]
pub struct TypeDictionaries {
    protocols: BTreeMap<i32, ProtocolDictionaries>,
}

impl TypeDictionaries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the vanilla dictionaries of one protocol.
    pub fn insert_protocol(
        &mut self,
        protocol: i32,
        blocks: ProtocolBlockTable,
        items: ItemTypeDictionary,
    ) {
        self.protocols.insert(
            protocol,
            ProtocolDictionaries {
                blocks: RwLock::new(Arc::new(blocks)),
                items: RwLock::new(items),
                block_items: RwLock::new(HashMap::new()),
            },
        );
    }

    pub fn item_numeric_id(&self, protocol: i32, identifier: &str) -> Option<i16> {
        self.protocols
            .get(&protocol)?
            .items
            .read()
            .numeric_id(identifier)
    }

    pub fn item_identifier(&self, protocol: i32, numeric_id: i16) -> Option<String> {
        self.protocols
            .get(&protocol)?
            .items
            .read()
            .identifier(numeric_id)
            .map(str::to_string)
    }

    pub fn item_types(&self, protocol: i32) -> Vec<Arc<ItemTypeEntry>> {
        self.protocols
            .get(&protocol)
            .map(|p| p.items.read().item_types().to_vec())
            .unwrap_or_default()
    }

    pub fn block_for_item(&self, protocol: i32, item: &str) -> Option<String> {
        self.protocols
            .get(&protocol)?
            .block_items
            .read()
            .get(item)
            .cloned()
    }
}

impl NetworkDictionaryPatcher for TypeDictionaries {
    fn protocols(&self) -> Vec<i32> {
        self.protocols.keys().copied().collect()
    }

    fn block_table(&self, protocol: i32) -> Option<Arc<ProtocolBlockTable>> {
        self.protocols
            .get(&protocol)
            .map(|p| Arc::clone(&p.blocks.read()))
    }

    fn replace_block_table(&self, protocol: i32, table: ProtocolBlockTable) {
        if let Some(p) = self.protocols.get(&protocol) {
            debug!(protocol, states = table.len(), "Replacing block palette");
            *p.blocks.write() = Arc::new(table);
        }
    }

    fn register_item_type(&self, protocol: i32, entry: Arc<ItemTypeEntry>) {
        if let Some(p) = self.protocols.get(&protocol) {
            p.items.write().insert(entry);
        }
    }

    fn map_block_item(&self, protocol: i32, item: &str, block: &str) {
        if let Some(p) = self.protocols.get(&protocol) {
            p.block_items
                .write()
                .entry(item.to_string())
                .or_insert_with(|| block.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_state::BlockStateEntry;
    use customs_nbt::NbtCompound;

    fn table() -> ProtocolBlockTable {
        ProtocolBlockTable::from_states(vec![BlockStateEntry::new(
            "minecraft:info_update",
            NbtCompound::new(),
            0,
        )])
        .unwrap()
    }

    fn dictionaries() -> TypeDictionaries {
        let mut dicts = TypeDictionaries::new();
        dicts.insert_protocol(786, table(), ItemTypeDictionary::default());
        dicts.insert_protocol(766, table(), ItemTypeDictionary::default());
        dicts
    }

    #[test]
    fn protocols_ascend() {
        assert_eq!(dictionaries().protocols(), vec![766, 786]);
    }

    #[test]
    fn item_types_update_both_maps() {
        let dicts = dictionaries();
        let entry = Arc::new(ItemTypeEntry::vanilla("minecraft:stick", 320));
        dicts.register_item_type(766, Arc::clone(&entry));

        assert_eq!(dicts.item_numeric_id(766, "minecraft:stick"), Some(320));
        assert_eq!(dicts.item_identifier(766, 320).as_deref(), Some("minecraft:stick"));
        assert_eq!(dicts.item_types(766).len(), 1);
        assert_eq!(dicts.item_numeric_id(786, "minecraft:stick"), None);
    }

    #[test]
    fn block_item_links_are_insert_only() {
        let dicts = dictionaries();
        dicts.map_block_item(786, "custom:lamp", "custom:lamp");
        dicts.map_block_item(786, "custom:lamp", "custom:other");
        assert_eq!(dicts.block_for_item(786, "custom:lamp").as_deref(), Some("custom:lamp"));
    }

    #[test]
    fn unknown_protocol_is_ignored() {
        let dicts = dictionaries();
        dicts.replace_block_table(1, table());
        assert!(dicts.block_table(1).is_none());
    }
}
