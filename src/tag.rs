//! Wire tag bytes. For internal use only.

/// The single-byte type markers that open every value in the wire stream. This
/// is the fixed assignment published by this crate (see spec §3): changing it
/// breaks wire compatibility with anything already encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    Null,
    Boolean,
    Number,
    BigInt,
    String,
    Array,
    Object,
    Map,
    Set,
    Buffer,
    Date,
    Regexp,
    Error,
    Typed,
    Recursive,
}

impl Tag {
    pub const NULL: u8 = b'n';
    pub const BOOLEAN: u8 = b'b';
    pub const NUMBER: u8 = b'N';
    pub const BIGINT: u8 = b'I';
    pub const STRING: u8 = b's';
    pub const ARRAY: u8 = b'A';
    pub const OBJECT: u8 = b'O';
    pub const MAP: u8 = b'M';
    pub const SET: u8 = b'S';
    pub const BUFFER: u8 = b'B';
    pub const DATE: u8 = b'D';
    pub const REGEXP: u8 = b'R';
    pub const ERROR: u8 = b'E';
    pub const TYPED: u8 = b'T';
    pub const RECURSIVE: u8 = b'r';

    /// Construct a tag from a single byte. Returns `None` for any byte outside
    /// the closed set in spec §3.
    pub fn from_u8(n: u8) -> Option<Tag> {
        Some(match n {
            Self::NULL => Tag::Null,
            Self::BOOLEAN => Tag::Boolean,
            Self::NUMBER => Tag::Number,
            Self::BIGINT => Tag::BigInt,
            Self::STRING => Tag::String,
            Self::ARRAY => Tag::Array,
            Self::OBJECT => Tag::Object,
            Self::MAP => Tag::Map,
            Self::SET => Tag::Set,
            Self::BUFFER => Tag::Buffer,
            Self::DATE => Tag::Date,
            Self::REGEXP => Tag::Regexp,
            Self::ERROR => Tag::Error,
            Self::TYPED => Tag::Typed,
            Self::RECURSIVE => Tag::Recursive,
            _ => return None,
        })
    }

    /// Convert a tag back into its single-byte wire representation.
    pub fn into_u8(self) -> u8 {
        match self {
            Tag::Null => Self::NULL,
            Tag::Boolean => Self::BOOLEAN,
            Tag::Number => Self::NUMBER,
            Tag::BigInt => Self::BIGINT,
            Tag::String => Self::STRING,
            Tag::Array => Self::ARRAY,
            Tag::Object => Self::OBJECT,
            Tag::Map => Self::MAP,
            Tag::Set => Self::SET,
            Tag::Buffer => Self::BUFFER,
            Tag::Date => Self::DATE,
            Tag::Regexp => Self::REGEXP,
            Tag::Error => Self::ERROR,
            Tag::Typed => Self::TYPED,
            Tag::Recursive => Self::RECURSIVE,
        }
    }
}

impl From<Tag> for u8 {
    fn from(val: Tag) -> u8 {
        val.into_u8()
    }
}
