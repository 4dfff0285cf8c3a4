//! Network NBT read/write.
//!
//! Network NBT differs from the disk format in its integer encodings: ints
//! are ZigZag VarInts, longs are ZigZag VarLongs, and string lengths are
//! VarUInt32.

use bytes::{Buf, BufMut};
use customs_proto::codec::{ProtoDecode, ProtoEncode};
use customs_proto::types::{VarInt, VarUInt32};

use crate::error::NbtError;
use crate::tag::{NbtCompound, NbtRoot, NbtTag};

/// Maximum nesting depth to prevent stack overflow.
const MAX_DEPTH: usize = 512;

const TAG_END: u8 = 0;
const TAG_COMPOUND: u8 = 10;

pub(crate) fn read_root(buf: &mut impl Buf) -> Result<NbtRoot, NbtError> {
    let tag_type = read_u8(buf)?;
    if tag_type != TAG_COMPOUND {
        return Err(NbtError::ExpectedCompound { got: tag_type });
    }
    let name = read_string(buf)?;
    let compound = read_compound(buf, 0)?;
    Ok(NbtRoot { name, compound })
}

pub(crate) fn write_root(buf: &mut impl BufMut, root: &NbtRoot) {
    buf.put_u8(TAG_COMPOUND);
    write_string(buf, &root.name);
    write_compound(buf, &root.compound);
}

fn read_tag(buf: &mut impl Buf, tag_type: u8, depth: usize) -> Result<NbtTag, NbtError> {
    if depth > MAX_DEPTH {
        return Err(NbtError::NestingTooDeep { limit: MAX_DEPTH });
    }
    let tag = match tag_type {
        1 => {
            ensure_remaining(buf, 1)?;
            NbtTag::Byte(buf.get_i8())
        }
        2 => {
            ensure_remaining(buf, 2)?;
            NbtTag::Short(buf.get_i16_le())
        }
        3 => NbtTag::Int(VarInt::proto_decode(buf)?.0),
        4 => NbtTag::Long(read_varlong(buf)?),
        5 => {
            ensure_remaining(buf, 4)?;
            NbtTag::Float(buf.get_f32_le())
        }
        6 => {
            ensure_remaining(buf, 8)?;
            NbtTag::Double(buf.get_f64_le())
        }
        7 => {
            let len = read_len(buf)?;
            ensure_remaining(buf, len)?;
            NbtTag::ByteArray((0..len).map(|_| buf.get_i8()).collect())
        }
        8 => NbtTag::String(read_string(buf)?),
        9 => {
            let element_type = read_u8(buf)?;
            let len = read_len(buf)?;
            let mut list = Vec::with_capacity(len.min(1024));
            for _ in 0..len {
                list.push(read_tag(buf, element_type, depth + 1)?);
            }
            NbtTag::List(list)
        }
        10 => NbtTag::Compound(read_compound(buf, depth + 1)?),
        11 => {
            let len = read_len(buf)?;
            let mut arr = Vec::with_capacity(len.min(1024));
            for _ in 0..len {
                arr.push(VarInt::proto_decode(buf)?.0);
            }
            NbtTag::IntArray(arr)
        }
        other => return Err(NbtError::UnknownTagType(other)),
    };
    Ok(tag)
}

fn read_compound(buf: &mut impl Buf, depth: usize) -> Result<NbtCompound, NbtError> {
    if depth > MAX_DEPTH {
        return Err(NbtError::NestingTooDeep { limit: MAX_DEPTH });
    }
    let mut map = NbtCompound::new();
    loop {
        let tag_type = read_u8(buf)?;
        if tag_type == TAG_END {
            return Ok(map);
        }
        let name = read_string(buf)?;
        let tag = read_tag(buf, tag_type, depth)?;
        map.insert(name, tag);
    }
}

fn write_tag(buf: &mut impl BufMut, tag: &NbtTag) {
    match tag {
        NbtTag::Byte(v) => buf.put_i8(*v),
        NbtTag::Short(v) => buf.put_i16_le(*v),
        NbtTag::Int(v) => VarInt(*v).proto_encode(buf),
        NbtTag::Long(v) => write_varlong(buf, *v),
        NbtTag::Float(v) => buf.put_f32_le(*v),
        NbtTag::Double(v) => buf.put_f64_le(*v),
        NbtTag::ByteArray(arr) => {
            VarInt(arr.len() as i32).proto_encode(buf);
            arr.iter().for_each(|&b| buf.put_i8(b));
        }
        NbtTag::String(s) => write_string(buf, s),
        NbtTag::List(list) => {
            // An empty list is typed TAG_End. Every element is framed by the
            // first one's type; `NbtTag::list` keeps them uniform.
            let element_type = list.first().map_or(TAG_END, NbtTag::tag_type_id);
            debug_assert!(list.iter().all(|t| t.tag_type_id() == element_type));
            buf.put_u8(element_type);
            VarInt(list.len() as i32).proto_encode(buf);
            for item in list {
                write_tag(buf, item);
            }
        }
        NbtTag::Compound(map) => write_compound(buf, map),
        NbtTag::IntArray(arr) => {
            VarInt(arr.len() as i32).proto_encode(buf);
            for &v in arr {
                VarInt(v).proto_encode(buf);
            }
        }
    }
}

fn write_compound(buf: &mut impl BufMut, map: &NbtCompound) {
    for (name, tag) in map {
        buf.put_u8(tag.tag_type_id());
        write_string(buf, name);
        write_tag(buf, tag);
    }
    buf.put_u8(TAG_END);
}

fn write_string(buf: &mut impl BufMut, s: &str) {
    VarUInt32(s.len() as u32).proto_encode(buf);
    buf.put_slice(s.as_bytes());
}

fn read_string(buf: &mut impl Buf) -> Result<String, NbtError> {
    let len = VarUInt32::proto_decode(buf)?.0 as usize;
    ensure_remaining(buf, len)?;
    let data = buf.copy_to_bytes(len);
    String::from_utf8(data.to_vec()).map_err(|_| NbtError::InvalidUtf8)
}

fn read_len(buf: &mut impl Buf) -> Result<usize, NbtError> {
    let len = VarInt::proto_decode(buf)?.0;
    usize::try_from(len).map_err(|_| NbtError::NegativeLength(len))
}

fn read_u8(buf: &mut impl Buf) -> Result<u8, NbtError> {
    ensure_remaining(buf, 1)?;
    Ok(buf.get_u8())
}

fn write_varlong(buf: &mut impl BufMut, v: i64) {
    let mut value = ((v << 1) ^ (v >> 63)) as u64;
    loop {
        if value & !0x7F == 0 {
            buf.put_u8(value as u8);
            return;
        }
        buf.put_u8((value & 0x7F | 0x80) as u8);
        value >>= 7;
    }
}

fn read_varlong(buf: &mut impl Buf) -> Result<i64, NbtError> {
    let mut result: u64 = 0;
    for i in 0..10 {
        let byte = read_u8(buf)?;
        result |= ((byte & 0x7F) as u64) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(((result >> 1) as i64) ^ -((result & 1) as i64));
        }
    }
    Err(NbtError::UnexpectedEof)
}

fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<(), NbtError> {
    if buf.remaining() < needed {
        Err(NbtError::UnexpectedEof)
    } else {
        Ok(())
    }
}
