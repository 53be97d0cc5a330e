//! Codec error types.
//!
use std::fmt;

/// A graphpack `Result`, normally returning a graphpack [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A graphpack error. Encompasses any issue that can happen while decoding a byte
/// stream produced by [`crate::encode::encode`]. Every variant carries the byte
/// offset at which the problem was detected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The byte at `offset` is not one of the defined tag bytes.
    UnknownTag {
        /// Offset of the unrecognized tag byte.
        offset: usize,
        /// The byte itself.
        tag: u8,
    },
    /// A length prefix claims more bytes than remain in the stream.
    MalformedLength {
        /// Offset at which the length prefix began.
        offset: usize,
    },
    /// A `BOOLEAN` payload byte was neither 0 nor 1.
    MalformedBoolean {
        /// Offset of the bad payload byte.
        offset: usize,
    },
    /// A `NUMBER` or `BIGINT` payload failed to parse as ASCII decimal text.
    MalformedNumber {
        /// Offset at which the payload began.
        offset: usize,
    },
    /// A `STRING` payload was not valid UTF-8.
    MalformedString {
        /// Offset at which the payload began.
        offset: usize,
    },
    /// A `DATE` payload failed to parse as ISO-8601 text.
    MalformedDate {
        /// Offset at which the payload began.
        offset: usize,
    },
    /// A `RECURSIVE` payload pointed at an offset with no known value.
    UnresolvedBackReference {
        /// Offset of the `RECURSIVE` tag byte.
        offset: usize,
        /// The offset it pointed to.
        target: u64,
    },
    /// Container nesting exceeded the configured maximum depth.
    NestingTooDeep {
        /// Offset at which the limit was tripped.
        offset: usize,
        /// The configured limit.
        limit: usize,
    },
    /// The cursor would advance past the end of the stream while reading a payload.
    TruncatedStream {
        /// Offset at which the read was attempted.
        offset: usize,
        /// Bytes required to complete the read.
        needed: usize,
        /// Bytes actually remaining.
        remaining: usize,
    },
}

impl Error {
    /// The byte offset at which this error was detected.
    pub fn offset(&self) -> usize {
        match *self {
            Error::UnknownTag { offset, .. } => offset,
            Error::MalformedLength { offset } => offset,
            Error::MalformedBoolean { offset } => offset,
            Error::MalformedNumber { offset } => offset,
            Error::MalformedString { offset } => offset,
            Error::MalformedDate { offset } => offset,
            Error::UnresolvedBackReference { offset, .. } => offset,
            Error::NestingTooDeep { offset, .. } => offset,
            Error::TruncatedStream { offset, .. } => offset,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::UnknownTag { offset, tag } => {
                write!(f, "unknown tag byte 0x{:02x} at offset {}", tag, offset)
            }
            Error::MalformedLength { offset } => {
                write!(f, "length prefix at offset {} runs past end of stream", offset)
            }
            Error::MalformedBoolean { offset } => {
                write!(f, "malformed boolean payload at offset {}", offset)
            }
            Error::MalformedNumber { offset } => {
                write!(f, "malformed number payload at offset {}", offset)
            }
            Error::MalformedString { offset } => {
                write!(f, "malformed UTF-8 string payload at offset {}", offset)
            }
            Error::MalformedDate { offset } => {
                write!(f, "malformed ISO-8601 date payload at offset {}", offset)
            }
            Error::UnresolvedBackReference { offset, target } => write!(
                f,
                "recursive reference at offset {} points to unresolved offset {}",
                offset, target
            ),
            Error::NestingTooDeep { offset, limit } => write!(
                f,
                "container nesting exceeded limit of {} at offset {}",
                limit, offset
            ),
            Error::TruncatedStream {
                offset,
                needed,
                remaining,
            } => write!(
                f,
                "truncated stream at offset {}: needed {} bytes, only {} remain",
                offset, needed, remaining
            ),
        }
    }
}

impl std::error::Error for Error {}
