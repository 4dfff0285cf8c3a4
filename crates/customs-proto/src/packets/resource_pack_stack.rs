//! ResourcePackStack (0x07): Server → Client.

use bytes::BufMut;

use crate::codec::{self, ProtoEncode};
use crate::protocol::{game_version_for_protocol, CURRENT_PROTOCOL};
use crate::types::VarUInt32;

use super::experiments::Experiments;

/// A pack entry in the resource pack stack.
#[derive(Debug, Clone)]
pub struct StackPackEntry {
    pub uuid: String,
    pub version: String,
    pub sub_pack_name: String,
}

/// Tells the client the order in which packs should be applied.
#[derive(Debug, Clone)]
pub struct ResourcePackStack {
    pub must_accept: bool,
    pub resource_pack_stack: Vec<StackPackEntry>,
    pub game_version: String,
    pub experiments: Experiments,
    pub use_vanilla_editor_packs: bool,
}

impl Default for ResourcePackStack {
    fn default() -> Self {
        Self {
            must_accept: false,
            resource_pack_stack: Vec::new(),
            game_version: game_version_for_protocol(CURRENT_PROTOCOL)
                .unwrap_or_default()
                .into(),
            experiments: Experiments::default(),
            use_vanilla_editor_packs: false,
        }
    }
}

impl ProtoEncode for ResourcePackStack {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        codec::write_bool(buf, self.must_accept);

        VarUInt32(self.resource_pack_stack.len() as u32).proto_encode(buf);
        for entry in &self.resource_pack_stack {
            codec::write_string(buf, &entry.uuid);
            codec::write_string(buf, &entry.version);
            codec::write_string(buf, &entry.sub_pack_name);
        }

        codec::write_string(buf, &self.game_version);
        self.experiments.proto_encode(buf);
        codec::write_bool(buf, self.use_vanilla_editor_packs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn encode_default() {
        let mut buf = BytesMut::new();
        ResourcePackStack::default().proto_encode(&mut buf);
        // must_accept(1) + stack_count(1) + "1.21.80"(1+7) + experiments(4+1) + editor(1)
        assert_eq!(buf.len(), 16);
    }

    #[test]
    fn experiments_are_encoded() {
        let pkt = ResourcePackStack {
            experiments: Experiments::new([("data_driven_items".to_string(), true)], true),
            ..ResourcePackStack::default()
        };
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        assert!(buf.windows(17).any(|w| w == b"data_driven_items"));
    }
}
