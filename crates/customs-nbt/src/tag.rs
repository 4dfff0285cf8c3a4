//! NBT tag types.
//!
//! Compounds are ordered by key so that encoding a compound always yields
//! the same bytes. Block state lookups depend on that: the encoded
//! properties compound is the identity key of a state variant.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::NbtError;

/// A compound tag: ordered map of name -> tag.
pub type NbtCompound = BTreeMap<String, NbtTag>;

/// A named root compound (the root always has a name, usually empty).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NbtRoot {
    pub name: String,
    pub compound: NbtCompound,
}

impl NbtRoot {
    pub fn new(name: impl Into<String>, compound: NbtCompound) -> Self {
        Self {
            name: name.into(),
            compound,
        }
    }

    /// Unnamed root, the form used for every network payload.
    pub fn unnamed(compound: NbtCompound) -> Self {
        Self::new("", compound)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NbtTag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<NbtTag>),
    Compound(NbtCompound),
    IntArray(Vec<i32>),
}

impl NbtTag {
    /// Numeric tag type ID. TAG_End (0) is not representable.
    pub fn tag_type_id(&self) -> u8 {
        match self {
            NbtTag::Byte(_) => 1,
            NbtTag::Short(_) => 2,
            NbtTag::Int(_) => 3,
            NbtTag::Long(_) => 4,
            NbtTag::Float(_) => 5,
            NbtTag::Double(_) => 6,
            NbtTag::ByteArray(_) => 7,
            NbtTag::String(_) => 8,
            NbtTag::List(_) => 9,
            NbtTag::Compound(_) => 10,
            NbtTag::IntArray(_) => 11,
        }
    }

    /// Build a list tag. A network list carries a single element type, so
    /// mixed element types are refused.
    pub fn list(items: Vec<NbtTag>) -> Result<NbtTag, NbtError> {
        if let Some(first) = items.first() {
            let expected = first.tag_type_id();
            if let Some(other) = items.iter().find(|t| t.tag_type_id() != expected) {
                return Err(NbtError::MixedList {
                    expected,
                    got: other.tag_type_id(),
                });
            }
        }
        Ok(NbtTag::List(items))
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            NbtTag::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            NbtTag::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&NbtCompound> {
        match self {
            NbtTag::Compound(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[NbtTag]> {
        match self {
            NbtTag::List(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for NbtTag {
    /// Booleans are stored as bytes.
    fn from(v: bool) -> Self {
        NbtTag::Byte(v as i8)
    }
}

impl From<i32> for NbtTag {
    fn from(v: i32) -> Self {
        NbtTag::Int(v)
    }
}

impl From<f32> for NbtTag {
    fn from(v: f32) -> Self {
        NbtTag::Float(v)
    }
}

impl From<&str> for NbtTag {
    fn from(v: &str) -> Self {
        NbtTag::String(v.to_string())
    }
}

impl From<String> for NbtTag {
    fn from(v: String) -> Self {
        NbtTag::String(v)
    }
}

impl From<NbtCompound> for NbtTag {
    fn from(v: NbtCompound) -> Self {
        NbtTag::Compound(v)
    }
}

impl fmt::Display for NbtTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NbtTag::Byte(v) => write!(f, "{v}b"),
            NbtTag::Short(v) => write!(f, "{v}s"),
            NbtTag::Int(v) => write!(f, "{v}"),
            NbtTag::Long(v) => write!(f, "{v}L"),
            NbtTag::Float(v) => write!(f, "{v}f"),
            NbtTag::Double(v) => write!(f, "{v}d"),
            NbtTag::ByteArray(v) => write!(f, "[B; {} elements]", v.len()),
            NbtTag::String(v) => write!(f, "\"{v}\""),
            NbtTag::List(v) => write!(f, "[{} elements]", v.len()),
            NbtTag::Compound(v) => {
                write!(f, "{{")?;
                for (i, (k, tag)) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{k}:{tag}")?;
                }
                write!(f, "}}")
            }
            NbtTag::IntArray(v) => write!(f, "[I; {} elements]", v.len()),
        }
    }
}
