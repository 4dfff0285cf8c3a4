//! FNV-1 64-bit name hashing.
//!
//! Since 1.18.30 the client orders the block palette by the FNV-1 (not
//! FNV-1a) 64-bit hash of each block name. Comparing the fixed-width hex
//! digests lexically is the same as comparing the integers, so the sort key
//! is the plain `u64`.

/// FNV-1 64-bit offset basis.
const FNV1_64_INIT: u64 = 0xcbf2_9ce4_8422_2325;
/// FNV-1 64-bit prime.
const FNV1_64_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1 64-bit hash of a byte slice: multiply, then xor.
pub fn fnv1_64(data: &[u8]) -> u64 {
    data.iter().fold(FNV1_64_INIT, |hash, &byte| {
        hash.wrapping_mul(FNV1_64_PRIME) ^ byte as u64
    })
}

/// Palette sort key of a block name.
pub fn name_hash(name: &str) -> u64 {
    fnv1_64(name.as_bytes())
}
