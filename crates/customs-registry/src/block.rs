//! Custom block types: property permutations, type ids, palette entries.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use customs_nbt::{CacheableNbt, NbtCompound, NbtTag};
use customs_proto::packets::BlockPaletteEntry;
use tracing::info;

use crate::component::CreativeCategory;
use crate::error::RegistryError;
use crate::item::{check_identifier, ItemTypeRegistry};
use crate::palette::BlockStatePalette;
use crate::type_id::{TypeIdAllocator, TypeNamespace};

/// Molang version advertised for custom block definitions.
const MOLANG_VERSION: i32 = 12;

/// Upper bound on the states a single block may expand to.
pub const MAX_PERMUTATIONS: usize = 1 << 16;

/// A registered block type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockType {
    identifier: String,
    type_id: i16,
}

impl BlockType {
    pub fn new(identifier: impl Into<String>, type_id: i16) -> Self {
        Self {
            identifier: identifier.into(),
            type_id,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn type_id(&self) -> i16 {
        self.type_id
    }
}

/// A block state property and every value it may take.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockProperty {
    name: String,
    values: Vec<NbtTag>,
}

impl BlockProperty {
    pub fn new(name: impl Into<String>, values: Vec<NbtTag>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, vec![false.into(), true.into()])
    }

    pub fn ints(name: impl Into<String>, values: impl IntoIterator<Item = i32>) -> Self {
        Self::new(name, values.into_iter().map(NbtTag::Int).collect())
    }

    pub fn strings<S: AsRef<str>>(name: impl Into<String>, values: &[S]) -> Self {
        Self::new(
            name,
            values.iter().map(|v| NbtTag::from(v.as_ref())).collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[NbtTag] {
        &self.values
    }

    fn validate(&self, identifier: &str) -> Result<(), RegistryError> {
        if self.name.is_empty() {
            return Err(RegistryError::invalid_type(identifier, "property with empty name"));
        }
        let Some(first) = self.values.first() else {
            return Err(RegistryError::invalid_type(
                identifier,
                format!("property {} has no values", self.name),
            ));
        };
        if !matches!(first, NbtTag::Byte(_) | NbtTag::Int(_) | NbtTag::String(_)) {
            return Err(RegistryError::invalid_type(
                identifier,
                format!("property {} must be boolean, int or string", self.name),
            ));
        }
        let kind = first.tag_type_id();
        let mut seen = HashSet::new();
        for value in &self.values {
            if value.tag_type_id() != kind {
                return Err(RegistryError::invalid_type(
                    identifier,
                    format!("property {} mixes value types", self.name),
                ));
            }
            if !seen.insert(value.to_string()) {
                return Err(RegistryError::invalid_type(
                    identifier,
                    format!("property {} repeats value {value}", self.name),
                ));
            }
        }
        Ok(())
    }
}

/// Everything needed to register a custom block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDefinition {
    identifier: String,
    properties: Vec<BlockProperty>,
    components: NbtCompound,
    category: CreativeCategory,
    group: Option<String>,
}

impl BlockDefinition {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            properties: Vec::new(),
            components: NbtCompound::new(),
            category: CreativeCategory::None,
            group: None,
        }
    }

    pub fn with_property(mut self, property: BlockProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_components(mut self, components: NbtCompound) -> Self {
        self.components = components;
        self
    }

    pub fn with_category(mut self, category: CreativeCategory, group: Option<String>) -> Self {
        self.category = category;
        self.group = group;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn properties(&self) -> &[BlockProperty] {
        &self.properties
    }

    fn validate(&self) -> Result<(), RegistryError> {
        check_identifier(&self.identifier)?;
        let mut names = HashSet::new();
        for property in &self.properties {
            property.validate(&self.identifier)?;
            if !names.insert(property.name()) {
                return Err(RegistryError::invalid_type(
                    &self.identifier,
                    format!("duplicate property {}", property.name()),
                ));
            }
        }
        let count = self
            .properties
            .iter()
            .try_fold(1usize, |acc, p| acc.checked_mul(p.values.len()));
        match count {
            Some(n) if n <= MAX_PERMUTATIONS => Ok(()),
            _ => Err(RegistryError::invalid_type(
                &self.identifier,
                format!("more than {MAX_PERMUTATIONS} permutations"),
            )),
        }
    }

    /// Every property assignment. The index of each entry is its meta; the
    /// last property varies fastest.
    pub fn permutations(&self) -> Vec<NbtCompound> {
        let mut out = vec![NbtCompound::new()];
        for property in &self.properties {
            out = out
                .into_iter()
                .flat_map(|base| {
                    property.values.iter().map(move |value| {
                        let mut next = base.clone();
                        next.insert(property.name.clone(), value.clone());
                        next
                    })
                })
                .collect();
        }
        out
    }

    fn palette_nbt(&self, type_id: i16) -> NbtCompound {
        let mut menu_category = NbtCompound::new();
        menu_category.insert("category".into(), self.category.as_str().into());
        menu_category.insert(
            "group".into(),
            self.group.clone().unwrap_or_default().into(),
        );

        let properties = self
            .properties
            .iter()
            .map(|p| {
                let mut entry = NbtCompound::new();
                entry.insert("name".into(), p.name.as_str().into());
                entry.insert("enum".into(), NbtTag::List(p.values.clone()));
                NbtTag::Compound(entry)
            })
            .collect();

        let mut vanilla_block_data = NbtCompound::new();
        vanilla_block_data.insert("block_id".into(), NbtTag::Int(type_id as i32));

        let mut root = NbtCompound::new();
        root.insert("components".into(), self.components.clone().into());
        root.insert("menu_category".into(), menu_category.into());
        root.insert("molangVersion".into(), NbtTag::Int(MOLANG_VERSION));
        root.insert("properties".into(), NbtTag::List(properties));
        root.insert("vanilla_block_data".into(), vanilla_block_data.into());
        root
    }
}

#[derive(Debug)]
struct RegisteredBlock {
    block_type: BlockType,
    states: usize,
    palette_nbt: CacheableNbt,
}

/// Registry of custom block types.
#[derive(Debug)]
pub struct BlockTypeRegistry {
    allocator: Arc<TypeIdAllocator>,
    protocols: Vec<i32>,
    blocks: Vec<RegisteredBlock>,
    index: HashMap<String, usize>,
}

impl BlockTypeRegistry {
    pub fn new(allocator: Arc<TypeIdAllocator>, protocols: Vec<i32>) -> Self {
        Self {
            allocator,
            protocols,
            blocks: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a block: queue its states in the palette and add its item.
    pub fn register_block(
        &mut self,
        definition: BlockDefinition,
        palette: &mut BlockStatePalette,
        items: &mut ItemTypeRegistry,
    ) -> Result<BlockType, RegistryError> {
        definition.validate()?;
        let identifier = definition.identifier().to_string();
        if self.index.contains_key(&identifier) || items.contains(&identifier) {
            return Err(RegistryError::DuplicateIdentifier(identifier));
        }
        if palette.is_finalized() {
            return Err(RegistryError::AlreadyFinalized);
        }

        let type_id = self.allocator.allocate(TypeNamespace::Blocks)?;
        let block_type = BlockType::new(identifier.clone(), type_id);

        let permutations = definition.permutations();
        let states = permutations.len();
        for (meta, properties) in permutations.into_iter().enumerate() {
            palette.insert_state(&identifier, properties, meta as i32)?;
        }
        items.register_block_item(&identifier, &block_type)?;

        self.index.insert(identifier.clone(), self.blocks.len());
        self.blocks.push(RegisteredBlock {
            block_type: block_type.clone(),
            states,
            palette_nbt: CacheableNbt::new(definition.palette_nbt(type_id)),
        });
        info!(identifier = %identifier, type_id, states, "Registered block");
        Ok(block_type)
    }

    pub fn get(&self, identifier: &str) -> Option<&BlockType> {
        self.index
            .get(identifier)
            .map(|&i| &self.blocks[i].block_type)
    }

    pub fn state_count(&self, identifier: &str) -> Option<usize> {
        self.index.get(identifier).map(|&i| self.blocks[i].states)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Custom block definitions for the StartGame palette, in registration
    /// order.
    pub fn block_palette_entries(
        &self,
        protocol: i32,
    ) -> Result<Vec<BlockPaletteEntry>, RegistryError> {
        if !self.protocols.contains(&protocol) {
            return Err(RegistryError::UnsupportedProtocol(protocol));
        }
        Ok(self
            .blocks
            .iter()
            .map(|block| BlockPaletteEntry {
                name: block.block_type.identifier().to_string(),
                nbt: block.palette_nbt.encoded(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_state::{BlockStateEntry, ProtocolBlockTable};
    use crate::dictionary::{ItemTypeDictionary, TypeDictionaries};
    use customs_nbt::read_nbt_network;

    struct Fixture {
        palette: BlockStatePalette,
        items: ItemTypeRegistry,
        blocks: BlockTypeRegistry,
    }

    fn fixture() -> Fixture {
        let mut dicts = TypeDictionaries::new();
        let table = ProtocolBlockTable::from_states(vec![BlockStateEntry::new(
            "minecraft:info_update",
            NbtCompound::new(),
            0,
        )])
        .unwrap();
        dicts.insert_protocol(800, table, ItemTypeDictionary::default());
        let dicts = Arc::new(dicts);
        let allocator = Arc::new(TypeIdAllocator::default());
        Fixture {
            palette: BlockStatePalette::new(dicts.clone()).unwrap(),
            items: ItemTypeRegistry::new(allocator.clone(), dicts),
            blocks: BlockTypeRegistry::new(allocator, vec![800]),
        }
    }

    fn lamp() -> BlockDefinition {
        BlockDefinition::new("custom:lamp")
            .with_property(BlockProperty::boolean("lit"))
            .with_property(BlockProperty::strings("color", &["red", "green", "blue"]))
            .with_category(CreativeCategory::Construction, Some("itemGroup.name.lamps".into()))
    }

    #[test]
    fn permutations_are_a_cartesian_product() {
        let perms = lamp().permutations();
        assert_eq!(perms.len(), 6);
        assert_eq!(perms[0].get("lit"), Some(&NbtTag::Byte(0)));
        assert_eq!(perms[0].get("color"), Some(&NbtTag::String("red".into())));
        assert_eq!(perms[1].get("color"), Some(&NbtTag::String("green".into())));
        assert_eq!(perms[3].get("lit"), Some(&NbtTag::Byte(1)));
        assert_eq!(perms[3].get("color"), Some(&NbtTag::String("red".into())));
    }

    #[test]
    fn block_without_properties_has_one_state() {
        assert_eq!(BlockDefinition::new("custom:marble").permutations().len(), 1);
    }

    #[test]
    fn register_block_queues_states_and_item() {
        let mut f = fixture();
        let lamp = f
            .blocks
            .register_block(lamp(), &mut f.palette, &mut f.items)
            .unwrap();
        assert_eq!(lamp.type_id(), 10_000);
        assert_eq!(f.blocks.state_count("custom:lamp"), Some(6));
        assert_eq!(f.palette.custom_states().len(), 6);
        assert_eq!(f.palette.custom_states()[5].meta(), 5);
        assert_eq!(f.items.get("custom:lamp", 1).unwrap().numeric_id(), 10_000);
        assert_eq!(f.blocks.get("custom:lamp"), Some(&lamp));
    }

    #[test]
    fn duplicate_block_is_rejected() {
        let mut f = fixture();
        f.blocks
            .register_block(lamp(), &mut f.palette, &mut f.items)
            .unwrap();
        assert!(matches!(
            f.blocks.register_block(lamp(), &mut f.palette, &mut f.items),
            Err(RegistryError::DuplicateIdentifier(_))
        ));
    }

    #[test]
    fn invalid_properties_are_rejected() {
        let mut f = fixture();
        let empty = BlockDefinition::new("custom:a").with_property(BlockProperty::new("x", vec![]));
        let mixed = BlockDefinition::new("custom:b")
            .with_property(BlockProperty::new("x", vec![NbtTag::Int(1), "one".into()]));
        let repeated = BlockDefinition::new("custom:c")
            .with_property(BlockProperty::ints("x", [1, 1]));
        let doubled = BlockDefinition::new("custom:d")
            .with_property(BlockProperty::boolean("x"))
            .with_property(BlockProperty::boolean("x"));
        for def in [empty, mixed, repeated, doubled] {
            assert!(matches!(
                f.blocks.register_block(def, &mut f.palette, &mut f.items),
                Err(RegistryError::InvalidType { .. })
            ));
        }
        assert!(f.blocks.is_empty());
    }

    #[test]
    fn too_many_permutations() {
        let def = BlockDefinition::new("custom:huge")
            .with_property(BlockProperty::ints("a", 0..300))
            .with_property(BlockProperty::ints("b", 0..300));
        assert!(def.validate().is_err());
    }

    #[test]
    fn palette_entries_describe_the_block() {
        let mut f = fixture();
        f.blocks
            .register_block(lamp(), &mut f.palette, &mut f.items)
            .unwrap();
        let entries = f.blocks.block_palette_entries(800).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "custom:lamp");

        let root = read_nbt_network(&mut entries[0].nbt.clone()).unwrap();
        let data = root.compound["vanilla_block_data"].as_compound().unwrap();
        assert_eq!(data.get("block_id"), Some(&NbtTag::Int(10_000)));
        let menu = root.compound["menu_category"].as_compound().unwrap();
        assert_eq!(menu["category"].as_string(), Some("construction"));
        let props = root.compound["properties"].as_list().unwrap();
        assert_eq!(props.len(), 2);

        assert!(matches!(
            f.blocks.block_palette_entries(1),
            Err(RegistryError::UnsupportedProtocol(1))
        ));
    }
}
