//! ItemRegistryPacket (0xA2): Server → Client.
//!
//! Older clients (below 1.21.60) need this sent by us right after the biome
//! definitions so custom item types are known before the world starts.

use bytes::{BufMut, Bytes};

use crate::codec::{self, ProtoEncode};
use crate::types::{VarInt, VarUInt32};

/// Empty NBT compound in network format.
const EMPTY_NBT_COMPOUND: &[u8] = &[0x0A, 0x00, 0x00];

/// An entry in the item registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRegistryEntry {
    pub string_id: String,
    pub numeric_id: i16,
    pub is_component_based: bool,
    /// 0 = legacy, 1 = data driven, 2 = placeable block item.
    pub version: i32,
    /// Network NBT bytes; empty means an empty compound.
    pub component_nbt: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    pub entries: Vec<ItemRegistryEntry>,
}

impl ProtoEncode for ItemRegistry {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarUInt32(self.entries.len() as u32).proto_encode(buf);
        for entry in &self.entries {
            codec::write_string(buf, &entry.string_id);
            buf.put_i16_le(entry.numeric_id);
            codec::write_bool(buf, entry.is_component_based);
            VarInt(entry.version).proto_encode(buf);
            if entry.component_nbt.is_empty() {
                buf.put_slice(EMPTY_NBT_COMPOUND);
            } else {
                buf.put_slice(&entry.component_nbt);
            }
        }
    }
}
