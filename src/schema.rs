//! Primitive field types understood by the external structure decoder.
//!
//! The core never interprets parameter bytes itself. What crosses the
//! boundary is an ordered list of [`FieldSpec`]s plus a byte buffer; the
//! decoder on the other side returns formatted fields or an error string.
//! This module only describes the vocabulary.

use std::fmt;

use serde::Serialize;

/// Every primitive tag the structure decoder recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int24,
    Uint24,
    Int32,
    Uint32,
    Int48,
    Uint48,
    Int64,
    Uint64,
    Int128,
    Uint128,
    Float16,
    Float,
    Double,
    Char,
    Wchar,
    Uleb128,
    Ileb128,
    Void,
}

/// All tags, in the order they are presented to users.
pub const ALL: [Primitive; 22] = [
    Primitive::Int8,
    Primitive::Uint8,
    Primitive::Int16,
    Primitive::Uint16,
    Primitive::Int24,
    Primitive::Uint24,
    Primitive::Int32,
    Primitive::Uint32,
    Primitive::Int48,
    Primitive::Uint48,
    Primitive::Int64,
    Primitive::Uint64,
    Primitive::Int128,
    Primitive::Uint128,
    Primitive::Float16,
    Primitive::Float,
    Primitive::Double,
    Primitive::Char,
    Primitive::Wchar,
    Primitive::Uleb128,
    Primitive::Ileb128,
    Primitive::Void,
];

impl Primitive {
    /// Width in bytes, or `None` for the variable-width varints.
    pub fn fixed_width(self) -> Option<usize> {
        Some(match self {
            Primitive::Int8 | Primitive::Uint8 | Primitive::Char => 1,
            // wchar is a UTF-16 code unit on the platforms that write ODL
            Primitive::Int16 | Primitive::Uint16 | Primitive::Float16 | Primitive::Wchar => 2,
            Primitive::Int24 | Primitive::Uint24 => 3,
            Primitive::Int32 | Primitive::Uint32 | Primitive::Float => 4,
            Primitive::Int48 | Primitive::Uint48 => 6,
            Primitive::Int64 | Primitive::Uint64 | Primitive::Double => 8,
            Primitive::Int128 | Primitive::Uint128 => 16,
            Primitive::Void => 0,
            Primitive::Uleb128 | Primitive::Ileb128 => return None,
        })
    }

    /// The tag as it appears in structure definitions.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int8 => "int8",
            Primitive::Uint8 => "uint8",
            Primitive::Int16 => "int16",
            Primitive::Uint16 => "uint16",
            Primitive::Int24 => "int24",
            Primitive::Uint24 => "uint24",
            Primitive::Int32 => "int32",
            Primitive::Uint32 => "uint32",
            Primitive::Int48 => "int48",
            Primitive::Uint48 => "uint48",
            Primitive::Int64 => "int64",
            Primitive::Uint64 => "uint64",
            Primitive::Int128 => "int128",
            Primitive::Uint128 => "uint128",
            Primitive::Float16 => "float16",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Char => "char",
            Primitive::Wchar => "wchar",
            Primitive::Uleb128 => "uleb128",
            Primitive::Ileb128 => "ileb128",
            Primitive::Void => "void",
        }
    }

    /// Parse a tag name (case-insensitive).
    pub fn from_name(s: &str) -> Option<Self> {
        ALL.into_iter().find(|p| p.name().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One field of a structure definition: exactly what the core hands the
/// external decoder alongside the raw parameter bytes.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub primitive: Primitive,
    pub name: String,
}

impl FieldSpec {
    pub fn new(primitive: Primitive, name: impl Into<String>) -> Self {
        Self {
            primitive,
            name: name.into(),
        }
    }
}
