//! BiomeDefinitionList (0x7B): Server → Client.
//!
//! The payload is produced by the host's world layer; this crate only needs
//! to recognise the packet so the item registry can be sent right after it.

use bytes::{BufMut, Bytes};

use crate::codec::ProtoEncode;

#[derive(Debug, Clone, Default)]
pub struct BiomeDefinitionList {
    pub payload: Bytes,
}

impl BiomeDefinitionList {
    pub fn from_payload(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

impl ProtoEncode for BiomeDefinitionList {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self.payload);
    }
}
