//! Boot-time registration and the frozen catalog it produces.

use std::sync::Arc;

use customs_nbt::NbtCompound;
use customs_proto::packets::BlockPaletteEntry;
use tracing::info;

use crate::block::{BlockDefinition, BlockType, BlockTypeRegistry};
use crate::block_state::BlockStateEntry;
use crate::component::{CreativeCategory, ItemDescriptor};
use crate::dictionary::NetworkDictionaryPatcher;
use crate::error::RegistryError;
use crate::item::{CreativeItem, Item, ItemTypeEntry, ItemTypeRegistry};
use crate::palette::BlockStatePalette;
use crate::type_id::TypeIdAllocator;

/// Collects custom types while the server boots.
///
/// Registration needs `&mut self`, so it cannot race with anything.
/// [`finish`](Self::finish) consumes the builder; after that the catalog is
/// read-only and can be shared across connection tasks.
#[derive(Debug)]
pub struct CatalogBuilder {
    palette: BlockStatePalette,
    items: ItemTypeRegistry,
    blocks: BlockTypeRegistry,
}

impl CatalogBuilder {
    pub fn new(
        patcher: Arc<dyn NetworkDictionaryPatcher>,
        allocator: TypeIdAllocator,
    ) -> Result<Self, RegistryError> {
        let allocator = Arc::new(allocator);
        let palette = BlockStatePalette::new(Arc::clone(&patcher))?;
        let protocols = palette.protocols().collect();
        Ok(Self {
            palette,
            items: ItemTypeRegistry::new(Arc::clone(&allocator), patcher),
            blocks: BlockTypeRegistry::new(allocator, protocols),
        })
    }

    pub fn register_item(
        &mut self,
        identifier: &str,
        name: &str,
        descriptor: &ItemDescriptor,
        category: CreativeCategory,
    ) -> Result<i16, RegistryError> {
        self.items
            .register_item(identifier, name, descriptor, category)
    }

    pub fn register_block(&mut self, definition: BlockDefinition) -> Result<BlockType, RegistryError> {
        self.blocks
            .register_block(definition, &mut self.palette, &mut self.items)
    }

    /// Queue a raw block state. Prefer [`register_block`](Self::register_block).
    pub fn insert_state(
        &mut self,
        name: &str,
        properties: NbtCompound,
        meta: i32,
    ) -> Result<(), RegistryError> {
        self.palette.insert_state(name, properties, meta)
    }

    pub fn items(&self) -> &ItemTypeRegistry {
        &self.items
    }

    pub fn blocks(&self) -> &BlockTypeRegistry {
        &self.blocks
    }

    /// Sort and publish the block palettes, then freeze.
    pub fn finish(mut self) -> Result<Catalog, RegistryError> {
        self.palette.finalize()?;
        info!(
            items = self.items.len(),
            blocks = self.blocks.len(),
            custom_states = self.palette.custom_states().len(),
            "Custom type catalog finished"
        );
        Ok(Catalog {
            palette: self.palette,
            items: self.items,
            blocks: self.blocks,
        })
    }
}

/// Read-only view of every registered custom type.
#[derive(Debug)]
pub struct Catalog {
    palette: BlockStatePalette,
    items: ItemTypeRegistry,
    blocks: BlockTypeRegistry,
}

impl Catalog {
    pub fn protocols(&self) -> Vec<i32> {
        self.palette.protocols().collect()
    }

    pub fn get_states(&self, protocol: i32) -> Result<&[BlockStateEntry], RegistryError> {
        self.palette.get_states(protocol)
    }

    pub fn custom_states(&self) -> &[BlockStateEntry] {
        self.palette.custom_states()
    }

    pub fn get_item(&self, identifier: &str, amount: u32) -> Result<Item, RegistryError> {
        self.items.get(identifier, amount)
    }

    pub fn get_block(&self, identifier: &str) -> Option<&BlockType> {
        self.blocks.get(identifier)
    }

    pub fn item_table_entries(&self) -> Vec<Arc<ItemTypeEntry>> {
        self.items.item_table_entries()
    }

    pub fn creative_items(&self) -> &[CreativeItem] {
        self.items.creative_items()
    }

    pub fn block_palette_entries(
        &self,
        protocol: i32,
    ) -> Result<Vec<BlockPaletteEntry>, RegistryError> {
        self.blocks.block_palette_entries(protocol)
    }
}
