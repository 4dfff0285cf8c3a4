//! Network NBT (Named Binary Tag) for Minecraft Bedrock Edition.
//!
//! Only the network variant is implemented: VarInt ints, VarLong longs,
//! VarUInt32 string lengths. This is the encoding used for item component
//! blobs, block state properties and block palette definitions.

mod cacheable;
pub mod error;
mod io;
pub mod tag;

pub use cacheable::CacheableNbt;
pub use error::NbtError;
pub use tag::{NbtCompound, NbtRoot, NbtTag};

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Read network NBT from a buffer.
pub fn read_nbt_network(buf: &mut impl Buf) -> Result<NbtRoot, NbtError> {
    io::read_root(buf)
}

/// Write network NBT to a buffer.
pub fn write_nbt_network(buf: &mut impl BufMut, root: &NbtRoot) {
    io::write_root(buf, root)
}

/// Encode a root compound into a fresh buffer.
pub fn to_network_bytes(root: &NbtRoot) -> Bytes {
    let mut buf = BytesMut::new();
    write_nbt_network(&mut buf, root);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(root: &NbtRoot) -> NbtRoot {
        let bytes = to_network_bytes(root);
        read_nbt_network(&mut bytes.clone()).unwrap()
    }

    #[test]
    fn component_blob_survives_encoding() {
        let mut use_modifiers = NbtCompound::new();
        use_modifiers.insert("movement_modifier".into(), NbtTag::Float(0.35));
        use_modifiers.insert("use_duration".into(), NbtTag::Float(1.6));

        let mut components = NbtCompound::new();
        components.insert("minecraft:use_modifiers".into(), use_modifiers.into());
        components.insert(
            "item_tags".into(),
            NbtTag::List(vec!["a".into(), "b".into()]),
        );

        let mut root = NbtCompound::new();
        root.insert("components".into(), components.into());
        root.insert("id".into(), NbtTag::Int(10_001));
        root.insert("name".into(), "custom:ruby".into());
        root.insert("stamp".into(), NbtTag::Long(-5_000_000_000));

        let root = NbtRoot::unnamed(root);
        assert_eq!(roundtrip(&root), root);
    }

    #[test]
    fn int_uses_zigzag_varint() {
        let mut c = NbtCompound::new();
        c.insert("v".into(), NbtTag::Int(1));
        let bytes = to_network_bytes(&NbtRoot::unnamed(c));
        // compound, name len 0, TAG_Int, "v", ZigZag(1) = 2, end
        assert_eq!(&bytes[..], &[0x0A, 0x00, 0x03, 0x01, b'v', 0x02, 0x00]);
    }

    #[test]
    fn key_order_does_not_depend_on_insertion_order() {
        let mut a = NbtCompound::new();
        a.insert("b".into(), NbtTag::Byte(1));
        a.insert("a".into(), NbtTag::Byte(2));
        let mut b = NbtCompound::new();
        b.insert("a".into(), NbtTag::Byte(2));
        b.insert("b".into(), NbtTag::Byte(1));
        assert_eq!(
            to_network_bytes(&NbtRoot::unnamed(a)),
            to_network_bytes(&NbtRoot::unnamed(b))
        );
    }

    #[test]
    fn empty_list_is_typed_end() {
        let mut c = NbtCompound::new();
        c.insert("l".into(), NbtTag::List(vec![]));
        let bytes = to_network_bytes(&NbtRoot::unnamed(c));
        assert_eq!(&bytes[..], &[0x0A, 0x00, 0x09, 0x01, b'l', 0x00, 0x00, 0x00]);
    }

    #[test]
    fn wrong_root_type_error() {
        let data = Bytes::from_static(&[1]);
        assert!(matches!(
            read_nbt_network(&mut data.clone()),
            Err(NbtError::ExpectedCompound { got: 1 })
        ));
    }

    #[test]
    fn truncated_input_is_error() {
        let data = Bytes::from_static(&[0x0A, 0x00, 0x03, 0x01]);
        assert!(read_nbt_network(&mut data.clone()).is_err());
    }
}
