//! NBT payloads that are encoded at most once.

use std::sync::OnceLock;

use bytes::Bytes;

use crate::tag::{NbtCompound, NbtRoot};

/// A root compound paired with its lazily encoded network bytes.
///
/// Component blobs are immutable after registration but are written into
/// every catalog packet, so the encoding is kept.
#[derive(Debug, Default)]
pub struct CacheableNbt {
    root: NbtRoot,
    encoded: OnceLock<Bytes>,
}

impl CacheableNbt {
    pub fn new(compound: NbtCompound) -> Self {
        Self {
            root: NbtRoot::unnamed(compound),
            encoded: OnceLock::new(),
        }
    }

    pub fn root(&self) -> &NbtRoot {
        &self.root
    }

    pub fn compound(&self) -> &NbtCompound {
        &self.root.compound
    }

    pub fn is_empty(&self) -> bool {
        self.root.compound.is_empty()
    }

    /// Network-encoded bytes, computed on first use.
    pub fn encoded(&self) -> Bytes {
        self.encoded
            .get_or_init(|| crate::to_network_bytes(&self.root))
            .clone()
    }
}

impl Clone for CacheableNbt {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            encoded: self.encoded.clone(),
        }
    }
}

impl PartialEq for CacheableNbt {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NbtTag;

    #[test]
    fn empty_compound_encodes_to_three_bytes() {
        let nbt = CacheableNbt::new(NbtCompound::new());
        assert!(nbt.is_empty());
        assert_eq!(&nbt.encoded()[..], &[0x0A, 0x00, 0x00]);
    }

    #[test]
    fn encoding_is_reused() {
        let mut c = NbtCompound::new();
        c.insert("id".into(), NbtTag::Int(10_000));
        let nbt = CacheableNbt::new(c);
        let first = nbt.encoded();
        let second = nbt.encoded();
        assert_eq!(first.as_ptr(), second.as_ptr());
    }
}
