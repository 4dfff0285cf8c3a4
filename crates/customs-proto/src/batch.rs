//! Sub-packet framing for the game packet batch layer.
//!
//! Compression, encryption and the 0xFE wrapper belong to the transport;
//! this only produces the `VarUInt32(header) + body` unit and the
//! length-prefixed concatenation the transport compresses.

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::ProtoEncode;
use crate::packets::GamePacket;
use crate::types::VarUInt32;

/// Encode a single sub-packet: `VarUInt32(packet_id) + body`.
///
/// Sender and target sub-client ids are always zero for a server.
pub fn encode_sub_packet(packet: &GamePacket) -> Bytes {
    let body = packet.encode_body();
    let mut buf = BytesMut::with_capacity(body.len() + 5);
    VarUInt32(packet.id() & 0x3FF).proto_encode(&mut buf);
    buf.put_slice(&body);
    buf.freeze()
}

/// Concatenate sub-packets, each prefixed with its VarUInt32 length.
pub fn encode_batch(packets: &[GamePacket]) -> Bytes {
    let mut batch = BytesMut::new();
    for packet in packets {
        let sub = encode_sub_packet(packet);
        VarUInt32(sub.len() as u32).proto_encode(&mut batch);
        batch.put_slice(&sub);
    }
    batch.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ProtoDecode;
    use crate::packets::{id, BiomeDefinitionList};

    #[test]
    fn sub_packet_starts_with_id() {
        let pkt = GamePacket::BiomeDefinitionList(BiomeDefinitionList::from_payload(
            Bytes::from_static(&[1, 2, 3]),
        ));
        let sub = encode_sub_packet(&pkt);
        let mut cursor = &sub[..];
        let header = VarUInt32::proto_decode(&mut cursor).unwrap().0;
        assert_eq!(header, id::BIOME_DEFINITION_LIST);
        assert_eq!(cursor, &[1, 2, 3]);
    }

    #[test]
    fn batch_is_length_prefixed() {
        let packets = vec![
            GamePacket::Other {
                id: 0x09,
                payload: Bytes::from_static(b"ab"),
            },
            GamePacket::Other {
                id: 0x0A,
                payload: Bytes::new(),
            },
        ];
        let batch = encode_batch(&packets);
        assert_eq!(&batch[..], &[3, 0x09, b'a', b'b', 1, 0x0A]);
    }
}
