//! Outbound game packets touched by the custom type catalog.

pub mod biome_definition_list;
pub mod experiments;
pub mod item_registry;
pub mod resource_pack_stack;
pub mod start_game;

use std::sync::Arc;

use bytes::Bytes;

pub use biome_definition_list::BiomeDefinitionList;
pub use experiments::{Experiment, Experiments};
pub use item_registry::{ItemRegistry, ItemRegistryEntry};
pub use resource_pack_stack::{ResourcePackStack, StackPackEntry};
pub use start_game::{BlockPaletteEntry, StartGame};

use crate::codec::{to_bytes, ProtoEncode};

/// Game packet IDs.
pub mod id {
    pub const RESOURCE_PACK_STACK: u32 = 0x07;
    pub const START_GAME: u32 = 0x0B;
    pub const BIOME_DEFINITION_LIST: u32 = 0x7B;
    pub const ITEM_REGISTRY: u32 = 0xA2;
}

/// The closed set of outbound packets the catalog layer inspects. Anything
/// else passes through untouched as [`GamePacket::Other`].
#[derive(Debug, Clone)]
pub enum GamePacket {
    BiomeDefinitionList(BiomeDefinitionList),
    StartGame(Box<StartGame>),
    ResourcePackStack(ResourcePackStack),
    /// Shared across every connection that needs it.
    ItemRegistry(Arc<ItemRegistry>),
    Other { id: u32, payload: Bytes },
}

impl GamePacket {
    pub fn id(&self) -> u32 {
        match self {
            GamePacket::BiomeDefinitionList(_) => id::BIOME_DEFINITION_LIST,
            GamePacket::StartGame(_) => id::START_GAME,
            GamePacket::ResourcePackStack(_) => id::RESOURCE_PACK_STACK,
            GamePacket::ItemRegistry(_) => id::ITEM_REGISTRY,
            GamePacket::Other { id, .. } => *id,
        }
    }

    /// Encode the packet body (without the packet id header).
    pub fn encode_body(&self) -> Bytes {
        match self {
            GamePacket::BiomeDefinitionList(p) => to_bytes(p),
            GamePacket::StartGame(p) => to_bytes(p.as_ref()),
            GamePacket::ResourcePackStack(p) => to_bytes(p),
            GamePacket::ItemRegistry(p) => to_bytes(p.as_ref()),
            GamePacket::Other { payload, .. } => payload.clone(),
        }
    }
}

impl ProtoEncode for GamePacket {
    fn proto_encode(&self, buf: &mut impl bytes::BufMut) {
        buf.put_slice(&self.encode_body());
    }
}
