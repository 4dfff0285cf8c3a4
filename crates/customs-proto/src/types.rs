//! Variable-length integers used by the Bedrock wire format.

use std::fmt;

use bytes::{Buf, BufMut};
use thiserror::Error;

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Error)]
pub enum VarIntError {
    #[error("buffer too short")]
    BufferTooShort,
    #[error("VarInt is too long (more than {max_bytes} bytes)")]
    TooManyBytes { max_bytes: usize },
}

/// Signed 32-bit VarInt (ZigZag + LEB128).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarInt(pub i32);

/// Unsigned 32-bit VarInt (plain LEB128).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarUInt32(pub u32);

impl VarInt {
    pub const MAX_BYTES: usize = 5;
}

impl VarUInt32 {
    pub const MAX_BYTES: usize = 5;
}

fn zigzag_encode_32(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

fn zigzag_decode_32(v: u32) -> i32 {
    ((v >> 1) as i32) ^ -((v & 1) as i32)
}

fn write_leb128_32(buf: &mut impl BufMut, mut value: u32) {
    loop {
        if value & !0x7F == 0 {
            buf.put_u8(value as u8);
            return;
        }
        buf.put_u8((value & 0x7F | 0x80) as u8);
        value >>= 7;
    }
}

fn read_leb128_32(buf: &mut impl Buf) -> Result<u32, VarIntError> {
    let mut result: u32 = 0;
    for i in 0..VarUInt32::MAX_BYTES {
        if !buf.has_remaining() {
            return Err(VarIntError::BufferTooShort);
        }
        let byte = buf.get_u8();
        result |= ((byte & 0x7F) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err(VarIntError::TooManyBytes {
        max_bytes: VarUInt32::MAX_BYTES,
    })
}

impl ProtoEncode for VarInt {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_leb128_32(buf, zigzag_encode_32(self.0));
    }
}

impl ProtoDecode for VarInt {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(VarInt(zigzag_decode_32(read_leb128_32(buf)?)))
    }
}

impl ProtoEncode for VarUInt32 {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_leb128_32(buf, self.0);
    }
}

impl ProtoDecode for VarUInt32 {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(VarUInt32(read_leb128_32(buf)?))
    }
}

impl From<i32> for VarInt {
    fn from(v: i32) -> Self {
        VarInt(v)
    }
}

impl From<u32> for VarUInt32 {
    fn from(v: u32) -> Self {
        VarUInt32(v)
    }
}

impl fmt::Debug for VarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarInt({})", self.0)
    }
}

impl fmt::Debug for VarUInt32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarUInt32({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn encoded(v: &impl ProtoEncode) -> Vec<u8> {
        let mut buf = BytesMut::new();
        v.proto_encode(&mut buf);
        buf.to_vec()
    }

    #[test]
    fn varint_zigzag_small_values() {
        assert_eq!(encoded(&VarInt(0)), vec![0x00]);
        assert_eq!(encoded(&VarInt(-1)), vec![0x01]);
        assert_eq!(encoded(&VarInt(1)), vec![0x02]);
        assert_eq!(encoded(&VarInt(-2)), vec![0x03]);
    }

    #[test]
    fn varint_extremes_decode() {
        for v in [i32::MIN, -300, 300, i32::MAX] {
            let bytes = encoded(&VarInt(v));
            let decoded = VarInt::proto_decode(&mut &bytes[..]).unwrap();
            assert_eq!(decoded.0, v);
        }
    }

    #[test]
    fn varuint_multi_byte() {
        assert_eq!(encoded(&VarUInt32(300)), vec![0xAC, 0x02]);
        assert_eq!(encoded(&VarUInt32(127)), vec![0x7F]);
    }

    #[test]
    fn varuint_truncated_is_error() {
        let data = [0x80u8];
        assert!(VarUInt32::proto_decode(&mut &data[..]).is_err());
    }

    #[test]
    fn varuint_too_long_is_error() {
        let data = [0xFFu8; 6];
        assert!(matches!(
            VarUInt32::proto_decode(&mut &data[..]),
            Err(ProtoError::VarInt(VarIntError::TooManyBytes { .. }))
        ));
    }
}
