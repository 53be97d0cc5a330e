//! The host value universe this codec serializes (spec §6.1, §1 supplement).
//!
//! Rather than a generic adapter trait over an external host representation,
//! this crate plays the role of its own host: [`Value`] is both the
//! in-memory model and the thing [`crate::encode::encode`] walks. Container
//! and string-ish variants wrap `Rc` (or `Rc<RefCell<_>>` for the mutable
//! containers) so that cloning a `Value` clones a handle, not its contents —
//! that shared pointer is the "stable identity token" the identity cache
//! keys on.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::date::DateValue;

/// A key/value record, a map, or a set: all three are order-preserving
/// vectors rather than a `BTreeMap`, since nothing about host iteration
/// order may be assumed (spec §4.3) but *some* deterministic order must be
/// picked for a given insertion sequence.
pub type Pairs = Rc<RefCell<Vec<(Value, Value)>>>;
pub type Elements = Rc<RefCell<Vec<Value>>>;

/// One node of the dynamic value graph.
///
/// Cloning is cheap (`Rc::clone`) and two clones of the same container or
/// string share identity: `Rc::ptr_eq` (surfaced via [`Value::identity`])
/// is how the encoder recognizes "the same value again" rather than merely
/// an equal one.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    /// Always finite; non-finite numbers are coerced to [`Value::Null`]
    /// before a `Value` is ever constructed by a caller following the
    /// documented policy (§4.3), and the encoder re-asserts it defensively.
    Number(Rc<f64>),
    BigInt(Rc<BigInt>),
    Str(Rc<str>),
    Array(Elements),
    /// A plain record: order-preserving (key, value) pairs. Keys are
    /// conventionally [`Value::Str`] but this is not enforced here; the
    /// encoder simply walks pairs as it would a map.
    Object(Pairs),
    Map(Pairs),
    Set(Elements),
    Buffer(Rc<Vec<u8>>),
    Date(Rc<DateValue>),
    Regexp(Rc<Regexp>),
    Error(Rc<ErrorValue>),
    Typed(Rc<TypedView>),
}

impl Value {
    pub fn str(s: impl Into<Rc<str>>) -> Value {
        Value::Str(s.into())
    }

    pub fn number(n: f64) -> Value {
        if n.is_finite() {
            Value::Number(Rc::new(n))
        } else {
            Value::Null
        }
    }

    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn object(pairs: Vec<(Value, Value)>) -> Value {
        Value::Object(Rc::new(RefCell::new(pairs)))
    }

    pub fn map(pairs: Vec<(Value, Value)>) -> Value {
        Value::Map(Rc::new(RefCell::new(pairs)))
    }

    pub fn set(elements: Vec<Value>) -> Value {
        Value::Set(Rc::new(RefCell::new(elements)))
    }

    pub fn buffer(bytes: Vec<u8>) -> Value {
        Value::Buffer(Rc::new(bytes))
    }

    pub fn date(date: DateValue) -> Value {
        Value::Date(Rc::new(date))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(b) = *self {
            Some(b)
        } else {
            None
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        if let Value::Number(ref n) = *self {
            Some(**n)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::Str(ref s) = *self {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_array(&self) -> Option<&Elements> {
        if let Value::Array(ref a) = *self {
            Some(a)
        } else {
            None
        }
    }

    /// Every variant but `Null`/`Bool` carries a category used to decide
    /// cache admission under `recursion = "some"` (spec §4.2): objects are
    /// tracked, primitives are not.
    pub fn category(&self) -> Category {
        match self {
            Value::Null | Value::Bool(_) => Category::Untracked,
            Value::Number(_) | Value::BigInt(_) | Value::Str(_) => Category::Primitive,
            Value::Array(_)
            | Value::Object(_)
            | Value::Map(_)
            | Value::Set(_)
            | Value::Buffer(_)
            | Value::Date(_)
            | Value::Regexp(_)
            | Value::Error(_)
            | Value::Typed(_) => Category::Object,
        }
    }

    /// True for the primitives the spec calls "non-empty": a zero-length
    /// string is never worth admitting to the identity cache (re-emitting
    /// it costs the same two bytes a back-reference would).
    pub fn is_nonempty_primitive(&self) -> bool {
        match self {
            Value::Number(_) | Value::BigInt(_) => true,
            Value::Str(s) => !s.is_empty(),
            _ => false,
        }
    }

    /// A stable identity token for the underlying `Rc` allocation, or
    /// `None` for `Null`/`Bool` which have no backing allocation to key on.
    /// Two `Value`s produce the same token iff they are clones of the same
    /// `Rc` (spec §9: "identity, not structural equality").
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Null | Value::Bool(_) => None,
            Value::Number(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
            Value::BigInt(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
            Value::Str(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
            Value::Array(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
            Value::Object(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
            Value::Map(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
            Value::Set(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
            Value::Buffer(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
            Value::Date(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
            Value::Regexp(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
            Value::Error(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
            Value::Typed(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
        }
    }
}

/// Which admission tier a value belongs to (spec §4.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    /// `Null`, `Bool`: never tracked, at any recursion setting.
    Untracked,
    /// Strings, finite numbers, bigints: tracked only under `"all"`.
    Primitive,
    /// Arrays, records, maps, sets, buffers, dates, regexes, errors, typed
    /// views: tracked under `"all"` and `"some"`.
    Object,
}

/// A `BIGINT` payload: sign plus ASCII decimal digits, stored as text
/// rather than a fixed-width integer since that is exactly the wire
/// payload and this crate has no numeric tower to feed (spec §3
/// supplement).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BigInt {
    negative: bool,
    digits: String,
}

impl BigInt {
    /// Parse `-?[0-9]+`, rejecting a bare sign, empty digit run, or a
    /// leading zero on a multi-digit magnitude (`-0` is also rejected:
    /// canonical zero has no sign).
    pub fn parse(text: &str) -> Option<BigInt> {
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return None;
        }
        if negative && digits == "0" {
            return None;
        }
        Some(BigInt {
            negative,
            digits: digits.to_string(),
        })
    }

    pub fn to_decimal_string(&self) -> String {
        if self.negative {
            format!("-{}", self.digits)
        } else {
            self.digits.clone()
        }
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

/// A `REGEXP` value: source pattern and flag text, both opaque strings to
/// this crate (spec §4.3/§4.5: "construct host regex"). Validated eagerly
/// against the subset of flags the `regex` crate understands so a bad
/// pattern is caught at construction rather than silently round-tripped.
#[derive(Debug)]
pub struct Regexp {
    pattern: Rc<str>,
    flags: Rc<str>,
    compiled: regex::Regex,
}

impl Regexp {
    pub fn new(pattern: impl Into<Rc<str>>, flags: impl Into<Rc<str>>) -> Result<Regexp, regex::Error> {
        let pattern = pattern.into();
        let flags = flags.into();
        let mut builder = regex::RegexBuilder::new(&pattern);
        for flag in flags.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                // 'g', 'u', 'y' and similar have no equivalent in the
                // `regex` crate's engine; they are preserved as text and
                // otherwise ignored when building the host matcher.
                _ => {}
            }
        }
        let compiled = builder.build()?;
        Ok(Regexp {
            pattern,
            flags,
            compiled,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn compiled(&self) -> &regex::Regex {
        &self.compiled
    }
}

/// An `ERROR` value: class name plus message, with no stack trace (spec
/// §4.3: "Stack traces are not preserved").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorValue {
    pub name: Rc<str>,
    pub message: Rc<str>,
}

/// A `TYPED` value: a named view (e.g. `"Uint8Array"`) over a buffer. The
/// buffer is a plain `Value::Buffer`-compatible `Rc<Vec<u8>>`; if the same
/// `Rc` also appears elsewhere in the graph as a bare `Value::Buffer`, the
/// two share identity exactly as spec §9 requires for hosts without raw
/// identity. Byte offset and element count into the buffer are not
/// preserved (spec §4.3, §9 open question).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedView {
    pub kind: Rc<str>,
    pub buffer: Rc<Vec<u8>>,
}
