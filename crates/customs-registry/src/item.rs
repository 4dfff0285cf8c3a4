//! Custom item types: id allocation, component blobs, dictionary publishing.

use std::collections::HashMap;
use std::sync::Arc;

use customs_nbt::{CacheableNbt, NbtTag};
use customs_proto::packets::ItemRegistryEntry;
use tracing::{debug, info};

use crate::block::BlockType;
use crate::component::{CreativeCategory, ItemDescriptor};
use crate::dictionary::NetworkDictionaryPatcher;
use crate::error::RegistryError;
use crate::type_id::{TypeIdAllocator, TypeNamespace};

/// Item type entry versions understood by the client.
pub mod version {
    pub const LEGACY: i32 = 0;
    pub const DATA_DRIVEN: i32 = 1;
    pub const NONE: i32 = 2;
}

/// One row of the item table sent to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTypeEntry {
    identifier: String,
    numeric_id: i16,
    component_based: bool,
    version: i32,
    components: CacheableNbt,
}

impl ItemTypeEntry {
    pub fn new(
        identifier: impl Into<String>,
        numeric_id: i16,
        component_based: bool,
        version: i32,
        components: CacheableNbt,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            numeric_id,
            component_based,
            version,
            components,
        }
    }

    /// A built-in item with no component data.
    pub fn vanilla(identifier: impl Into<String>, numeric_id: i16) -> Self {
        Self::new(
            identifier,
            numeric_id,
            false,
            version::LEGACY,
            CacheableNbt::default(),
        )
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn numeric_id(&self) -> i16 {
        self.numeric_id
    }

    pub fn is_component_based(&self) -> bool {
        self.component_based
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn components(&self) -> &CacheableNbt {
        &self.components
    }

    pub fn to_registry_entry(&self) -> ItemRegistryEntry {
        ItemRegistryEntry {
            string_id: self.identifier.clone(),
            numeric_id: self.numeric_id,
            is_component_based: self.component_based,
            version: self.version,
            component_nbt: self.components.encoded(),
        }
    }
}

/// A stack of a registered item type.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    identifier: String,
    numeric_id: i16,
    name: String,
    count: u32,
    max_stack_size: u8,
    block: Option<String>,
}

impl Item {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn numeric_id(&self) -> i16 {
        self.numeric_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn max_stack_size(&self) -> u8 {
        self.max_stack_size
    }

    /// The block this item places, if it is a block item.
    pub fn block(&self) -> Option<&str> {
        self.block.as_deref()
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreativeItem {
    pub identifier: String,
    pub category: CreativeCategory,
}

pub(crate) fn check_identifier(identifier: &str) -> Result<(), RegistryError> {
    match identifier.split_once(':') {
        Some((namespace, path)) if !namespace.is_empty() && !path.is_empty() => Ok(()),
        _ => Err(RegistryError::invalid_type(
            identifier,
            "identifier must look like namespace:path",
        )),
    }
}

/// Registry of custom item types.
pub struct ItemTypeRegistry {
    allocator: Arc<TypeIdAllocator>,
    patcher: Arc<dyn NetworkDictionaryPatcher>,
    entries: Vec<Arc<ItemTypeEntry>>,
    prototypes: HashMap<String, Item>,
    identifiers: HashMap<i16, String>,
    creative: Vec<CreativeItem>,
}

impl ItemTypeRegistry {
    pub fn new(
        allocator: Arc<TypeIdAllocator>,
        patcher: Arc<dyn NetworkDictionaryPatcher>,
    ) -> Self {
        Self {
            allocator,
            patcher,
            entries: Vec::new(),
            prototypes: HashMap::new(),
            identifiers: HashMap::new(),
            creative: Vec::new(),
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.prototypes.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a custom item and publish it to every protocol.
    pub fn register_item(
        &mut self,
        identifier: &str,
        name: &str,
        descriptor: &ItemDescriptor,
        category: CreativeCategory,
    ) -> Result<i16, RegistryError> {
        check_identifier(identifier)?;
        if self.contains(identifier) {
            return Err(RegistryError::DuplicateIdentifier(identifier.to_string()));
        }
        descriptor.validate(identifier)?;

        let numeric_id = self.allocator.allocate(TypeNamespace::Items)?;
        let component_based = descriptor.is_component_based();
        let mut nbt = descriptor.component_nbt(category);
        if component_based {
            nbt.insert("id".into(), NbtTag::Int(numeric_id as i32));
            nbt.insert("name".into(), identifier.into());
        }
        let version = if component_based {
            version::DATA_DRIVEN
        } else {
            version::LEGACY
        };
        let entry = Arc::new(ItemTypeEntry::new(
            identifier,
            numeric_id,
            component_based,
            version,
            CacheableNbt::new(nbt),
        ));
        self.publish(Arc::clone(&entry));

        self.prototypes.insert(
            identifier.to_string(),
            Item {
                identifier: identifier.to_string(),
                numeric_id,
                name: name.to_string(),
                count: 1,
                max_stack_size: descriptor.stack_size(),
                block: None,
            },
        );
        if category != CreativeCategory::None {
            self.creative.push(CreativeItem {
                identifier: identifier.to_string(),
                category,
            });
        }
        info!(identifier, numeric_id, component_based, "Registered item");
        Ok(numeric_id)
    }

    /// Register the item form of a custom block. Its numeric id is the
    /// block's type id.
    pub fn register_block_item(
        &mut self,
        identifier: &str,
        block: &BlockType,
    ) -> Result<(), RegistryError> {
        check_identifier(identifier)?;
        if self.contains(identifier) {
            return Err(RegistryError::DuplicateIdentifier(identifier.to_string()));
        }
        let numeric_id = block.type_id();
        if let Some(existing) = self.identifiers.get(&numeric_id) {
            return Err(RegistryError::IdCollision {
                id: numeric_id,
                existing: existing.clone(),
            });
        }

        let entry = Arc::new(ItemTypeEntry::new(
            identifier,
            numeric_id,
            false,
            version::NONE,
            CacheableNbt::default(),
        ));
        self.publish(Arc::clone(&entry));
        for protocol in self.patcher.protocols() {
            self.patcher
                .map_block_item(protocol, identifier, block.identifier());
        }

        self.prototypes.insert(
            identifier.to_string(),
            Item {
                identifier: identifier.to_string(),
                numeric_id,
                name: block.identifier().to_string(),
                count: 1,
                max_stack_size: 64,
                block: Some(block.identifier().to_string()),
            },
        );
        debug!(identifier, numeric_id, "Registered block item");
        Ok(())
    }

    fn publish(&mut self, entry: Arc<ItemTypeEntry>) {
        for protocol in self.patcher.protocols() {
            self.patcher.register_item_type(protocol, Arc::clone(&entry));
        }
        self.identifiers
            .insert(entry.numeric_id(), entry.identifier().to_string());
        self.entries.push(entry);
    }

    /// A fresh stack of a registered item.
    pub fn get(&self, identifier: &str, amount: u32) -> Result<Item, RegistryError> {
        self.prototypes
            .get(identifier)
            .map(|item| item.clone().with_count(amount))
            .ok_or_else(|| RegistryError::UnknownIdentifier(identifier.to_string()))
    }

    pub fn identifier_of(&self, numeric_id: i16) -> Option<&str> {
        self.identifiers.get(&numeric_id).map(String::as_str)
    }

    /// Every custom item entry, in registration order.
    pub fn item_table_entries(&self) -> Vec<Arc<ItemTypeEntry>> {
        self.entries.clone()
    }

    pub fn creative_items(&self) -> &[CreativeItem] {
        &self.creative
    }
}

impl std::fmt::Debug for ItemTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemTypeRegistry")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_state::{BlockStateEntry, ProtocolBlockTable};
    use crate::component::ItemComponent;
    use crate::dictionary::{ItemTypeDictionary, TypeDictionaries};
    use customs_nbt::NbtCompound;

    fn dictionaries() -> Arc<TypeDictionaries> {
        let mut dicts = TypeDictionaries::new();
        for protocol in [766, 800] {
            let table = ProtocolBlockTable::from_states(vec![BlockStateEntry::new(
                "minecraft:info_update",
                NbtCompound::new(),
                0,
            )])
            .unwrap();
            dicts.insert_protocol(
                protocol,
                table,
                ItemTypeDictionary::new([Arc::new(ItemTypeEntry::vanilla("minecraft:stick", 320))]),
            );
        }
        Arc::new(dicts)
    }

    fn registry(dicts: &Arc<TypeDictionaries>) -> ItemTypeRegistry {
        ItemTypeRegistry::new(Arc::new(TypeIdAllocator::default()), dicts.clone())
    }

    fn ruby() -> ItemDescriptor {
        ItemDescriptor::with_components(vec![ItemComponent::Icon("ruby".into())])
    }

    #[test]
    fn register_item_publishes_to_every_protocol() {
        let dicts = dictionaries();
        let mut items = registry(&dicts);
        let id = items
            .register_item("custom:ruby", "Ruby", &ruby(), CreativeCategory::Items)
            .unwrap();
        assert_eq!(id, 20_000);

        for protocol in [766, 800] {
            assert_eq!(dicts.item_numeric_id(protocol, "custom:ruby"), Some(id));
            assert_eq!(
                dicts.item_identifier(protocol, id).as_deref(),
                Some("custom:ruby")
            );
            assert_eq!(dicts.item_types(protocol).len(), 2);
        }
        assert_eq!(items.identifier_of(id), Some("custom:ruby"));
        assert_eq!(items.creative_items().len(), 1);
    }

    #[test]
    fn component_blob_carries_id_and_name() {
        let dicts = dictionaries();
        let mut items = registry(&dicts);
        let id = items
            .register_item("custom:ruby", "Ruby", &ruby(), CreativeCategory::Items)
            .unwrap();
        let entries = items.item_table_entries();
        let entry = &entries[0];
        assert!(entry.is_component_based());
        assert_eq!(entry.version(), version::DATA_DRIVEN);

        let nbt = entry.components().compound();
        assert_eq!(nbt.get("id"), Some(&NbtTag::Int(id as i32)));
        assert_eq!(nbt.get("name"), Some(&NbtTag::String("custom:ruby".into())));
        assert!(nbt.contains_key("components"));
    }

    #[test]
    fn simple_item_has_empty_blob() {
        let dicts = dictionaries();
        let mut items = registry(&dicts);
        items
            .register_item("custom:coin", "Coin", &ItemDescriptor::simple(), CreativeCategory::None)
            .unwrap();
        let entry = items.item_table_entries().remove(0);
        assert!(!entry.is_component_based());
        assert_eq!(entry.version(), version::LEGACY);
        assert!(entry.components().is_empty());
        assert!(items.creative_items().is_empty());
    }

    #[test]
    fn duplicates_are_rejected_without_spending_an_id() {
        let dicts = dictionaries();
        let allocator = Arc::new(TypeIdAllocator::default());
        let mut items = ItemTypeRegistry::new(allocator.clone(), dicts.clone());
        items
            .register_item("custom:ruby", "Ruby", &ruby(), CreativeCategory::Items)
            .unwrap();
        let err = items
            .register_item("custom:ruby", "Ruby", &ruby(), CreativeCategory::Items)
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateIdentifier(_)));
        assert_eq!(allocator.peek(TypeNamespace::Items), 20_001);
        assert_eq!(dicts.item_types(800).len(), 2);
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        let dicts = dictionaries();
        let mut items = registry(&dicts);
        assert!(matches!(
            items.register_item("ruby", "Ruby", &ruby(), CreativeCategory::Items),
            Err(RegistryError::InvalidType { .. })
        ));
        let bad = ItemDescriptor::with_components(vec![ItemComponent::UseModifiers {
            movement_modifier: 2.0,
            use_duration: 1.0,
        }]);
        assert!(items
            .register_item("custom:bad", "Bad", &bad, CreativeCategory::Items)
            .is_err());
        assert!(items.is_empty());
    }

    #[test]
    fn get_returns_fresh_stacks() {
        let dicts = dictionaries();
        let mut items = registry(&dicts);
        items
            .register_item("custom:ruby", "Ruby", &ruby().max_stack_size(16), CreativeCategory::Items)
            .unwrap();
        let a = items.get("custom:ruby", 3).unwrap();
        let b = items.get("custom:ruby", 1).unwrap();
        assert_eq!(a.count(), 3);
        assert_eq!(b.count(), 1);
        assert_eq!(a.name(), "Ruby");
        assert_eq!(a.max_stack_size(), 16);
        assert!(matches!(
            items.get("custom:missing", 1),
            Err(RegistryError::UnknownIdentifier(_))
        ));
    }

    #[test]
    fn block_items_use_the_block_type_id() {
        let dicts = dictionaries();
        let mut items = registry(&dicts);
        let lamp = BlockType::new("custom:lamp", 10_000);
        items.register_block_item("custom:lamp", &lamp).unwrap();

        let entry = items.item_table_entries().remove(0);
        assert_eq!(entry.numeric_id(), 10_000);
        assert_eq!(entry.version(), version::NONE);
        assert!(entry.components().is_empty());
        assert_eq!(dicts.block_for_item(766, "custom:lamp").as_deref(), Some("custom:lamp"));
        assert_eq!(items.get("custom:lamp", 1).unwrap().block(), Some("custom:lamp"));

        let clash = BlockType::new("custom:other", 10_000);
        assert!(matches!(
            items.register_block_item("custom:other", &clash),
            Err(RegistryError::IdCollision { id: 10_000, .. })
        ));
    }

    #[test]
    fn registry_entry_encodes_components() {
        let dicts = dictionaries();
        let mut items = registry(&dicts);
        items
            .register_item("custom:ruby", "Ruby", &ruby(), CreativeCategory::Items)
            .unwrap();
        let wire = items.item_table_entries()[0].to_registry_entry();
        assert_eq!(wire.string_id, "custom:ruby");
        assert!(wire.is_component_based);
        assert_eq!(wire.component_nbt[0], 0x0A);
        assert!(wire.component_nbt.len() > 3);
    }
}
