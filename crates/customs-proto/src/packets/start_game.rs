//! StartGame (0x0B): Server → Client.
//!
//! Only the level settings that matter for the type catalog are modelled:
//! the experiment toggles and the custom block palette. Everything else
//! travels as the host's pre-encoded tail.

use bytes::{BufMut, Bytes};

use crate::codec::{self, ProtoEncode};
use crate::protocol::{game_version_for_protocol, CURRENT_PROTOCOL};
use crate::types::{VarInt, VarUInt32};

use super::experiments::Experiments;

/// A custom block definition sent with StartGame.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockPaletteEntry {
    pub name: String,
    /// Network NBT bytes describing the block's components and properties.
    pub nbt: Bytes,
}

#[derive(Debug, Clone)]
pub struct StartGame {
    pub entity_unique_id: i32,
    pub player_gamemode: i32,
    pub seed: u64,
    pub level_id: String,
    pub world_name: String,
    pub game_version: String,
    pub experiments: Experiments,
    pub block_palette: Vec<BlockPaletteEntry>,
    pub block_network_ids_are_hashes: bool,
    /// Remaining level settings, already encoded by the host.
    pub trailer: Bytes,
}

impl Default for StartGame {
    fn default() -> Self {
        Self {
            entity_unique_id: 1,
            player_gamemode: 0,
            seed: 0,
            level_id: "level".into(),
            world_name: "world".into(),
            game_version: game_version_for_protocol(CURRENT_PROTOCOL)
                .unwrap_or_default()
                .into(),
            experiments: Experiments::default(),
            block_palette: Vec::new(),
            block_network_ids_are_hashes: false,
            trailer: Bytes::new(),
        }
    }
}

impl ProtoEncode for StartGame {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.entity_unique_id).proto_encode(buf);
        VarInt(self.player_gamemode).proto_encode(buf);
        buf.put_u64_le(self.seed);
        codec::write_string(buf, &self.level_id);
        codec::write_string(buf, &self.world_name);
        codec::write_string(buf, &self.game_version);
        self.experiments.proto_encode(buf);
        VarUInt32(self.block_palette.len() as u32).proto_encode(buf);
        for entry in &self.block_palette {
            codec::write_string(buf, &entry.name);
            buf.put_slice(&entry.nbt);
        }
        codec::write_bool(buf, self.block_network_ids_are_hashes);
        buf.put_slice(&self.trailer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn palette_entries_follow_experiments() {
        let pkt = StartGame {
            experiments: Experiments::new([("data_driven_items".to_string(), true)], true),
            block_palette: vec![BlockPaletteEntry {
                name: "custom:lamp".into(),
                nbt: Bytes::from_static(&[0x0A, 0x00, 0x00]),
            }],
            ..StartGame::default()
        };
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        let exp_at = buf
            .windows(17)
            .position(|w| w == b"data_driven_items")
            .unwrap();
        let block_at = buf.windows(11).position(|w| w == b"custom:lamp").unwrap();
        assert!(exp_at < block_at);
    }

    #[test]
    fn trailer_is_appended_verbatim() {
        let pkt = StartGame {
            trailer: Bytes::from_static(&[0xDE, 0xAD]),
            ..StartGame::default()
        };
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        assert_eq!(&buf[buf.len() - 2..], &[0xDE, 0xAD]);
    }
}
