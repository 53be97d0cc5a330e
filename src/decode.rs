//! The decoder (spec §4.5, §4.6): single-pass recursive descent over a byte
//! slice, threading an offset→value table through the whole call so that
//! `RECURSIVE` payloads — including forward self-references into a
//! container still being filled — resolve to the right handle.

use std::collections::HashMap;
use std::rc::Rc;

use crate::date::DateValue;
use crate::depth_tracking::{DepthTracker, DEFAULT_MAX_DEPTH};
use crate::error::{Error, Result};
use crate::length;
use crate::tag::Tag;
use crate::text;
use crate::value::{BigInt, ErrorValue, Regexp, TypedView, Value};

/// Options for [`decode`]. `max_depth` realizes the "SHOULD accept a
/// configurable maximum" of spec §5.
#[derive(Clone, Debug)]
pub struct DecodeOptions {
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Decode one value from `data` per the wire grammar of spec §3.
/// `data` must contain exactly one top-level value (spec §6.3); trailing
/// bytes beyond it are ignored, matching a decoder that stops as soon as
/// the root value is fully consumed.
pub fn decode(data: &[u8], options: &DecodeOptions) -> Result<Value> {
    let mut decoder = Decoder {
        data,
        offsets: HashMap::new(),
        depth: DepthTracker::new(options.max_depth),
    };
    let (value, _) = decoder.decode_value(0)?;
    Ok(value)
}

struct Decoder<'a> {
    data: &'a [u8],
    offsets: HashMap<u64, Value>,
    depth: DepthTracker,
}

impl<'a> Decoder<'a> {
    fn byte_at(&self, pos: usize) -> Result<u8> {
        self.data.get(pos).copied().ok_or(Error::TruncatedStream {
            offset: pos,
            needed: 1,
            remaining: self.data.len().saturating_sub(pos),
        })
    }

    /// Decode whatever value begins at `pos` and record it in the offset
    /// table keyed by `pos`, so a later `RECURSIVE` can find it again.
    fn decode_value(&mut self, pos: usize) -> Result<(Value, usize)> {
        let offset = pos as u64;
        let tag_byte = self.byte_at(pos)?;
        let tag = Tag::from_u8(tag_byte).ok_or(Error::UnknownTag {
            offset: pos,
            tag: tag_byte,
        })?;
        let body = pos + 1;

        // Containers register their (still-empty) slot before decoding
        // children (spec §4.6); RECURSIVE never introduces a new slot of
        // its own. Both return directly rather than falling through to
        // the common post-decode insert below.
        match tag {
            Tag::Array => return self.decode_array(offset, body),
            Tag::Object => return self.decode_pairs(offset, body, true),
            Tag::Map => return self.decode_pairs(offset, body, false),
            Tag::Set => return self.decode_set(offset, body),
            Tag::Recursive => return self.decode_recursive(pos, body),
            _ => {}
        }

        let (value, next) = match tag {
            Tag::Null => (Value::Null, body),
            Tag::Boolean => {
                let b = self.byte_at(body)?;
                let b = match b {
                    0 => false,
                    1 => true,
                    _ => return Err(Error::MalformedBoolean { offset: body }),
                };
                (Value::Bool(b), body + 1)
            }
            Tag::Number => {
                let (text, next) =
                    read_ascii(self.data, body, |o| Error::MalformedNumber { offset: o })?;
                let n: f64 = text
                    .parse()
                    .map_err(|_| Error::MalformedNumber { offset: body })?;
                (Value::number(n), next)
            }
            Tag::BigInt => {
                let (text, next) =
                    read_ascii(self.data, body, |o| Error::MalformedNumber { offset: o })?;
                let big = BigInt::parse(text).ok_or(Error::MalformedNumber { offset: body })?;
                (Value::BigInt(Rc::new(big)), next)
            }
            Tag::String => {
                let (text, next) = text::read_utf8(self.data, body, 0)?;
                (Value::str(text), next)
            }
            Tag::Buffer => {
                let (bytes, next) = text::read_bytes(self.data, body, 0)?;
                (Value::buffer(bytes.to_vec()), next)
            }
            Tag::Date => {
                let (text, next) =
                    read_ascii(self.data, body, |o| Error::MalformedDate { offset: o })?;
                let date = DateValue::from_iso8601(text, body)?;
                (Value::date(date), next)
            }
            Tag::Regexp => {
                let (pattern, next) = self.decode_str_child(body)?;
                let (flags, next) = self.decode_str_child(next)?;
                let regexp = Regexp::new(pattern, flags)
                    .map_err(|_| Error::MalformedString { offset: body })?;
                (Value::Regexp(Rc::new(regexp)), next)
            }
            Tag::Error => {
                let (name, next) = self.decode_str_child(body)?;
                let (message, next) = self.decode_str_child(next)?;
                (Value::Error(Rc::new(ErrorValue { name, message })), next)
            }
            Tag::Typed => {
                let (kind, next) = self.decode_str_child(body)?;
                let (buffer, next) = self.decode_buffer_child(next)?;
                (Value::Typed(Rc::new(TypedView { kind, buffer })), next)
            }
            Tag::Array | Tag::Object | Tag::Map | Tag::Set | Tag::Recursive => unreachable!(),
        };
        self.offsets.insert(offset, value.clone());
        Ok((value, next))
    }

    /// Decode a child expected to be a `STRING` (or a back-reference that
    /// resolves to one), as used by `REGEXP`/`ERROR`/`TYPED` payloads.
    fn decode_str_child(&mut self, pos: usize) -> Result<(Rc<str>, usize)> {
        let found = self.byte_at(pos)?;
        let (value, next) = self.decode_value(pos)?;
        match value {
            Value::Str(s) => Ok((s, next)),
            _ => Err(Error::UnknownTag {
                offset: pos,
                tag: found,
            }),
        }
    }

    /// Decode a child expected to be a `BUFFER` (or a resolving
    /// back-reference), as used by `TYPED`.
    fn decode_buffer_child(&mut self, pos: usize) -> Result<(Rc<Vec<u8>>, usize)> {
        let found = self.byte_at(pos)?;
        let (value, next) = self.decode_value(pos)?;
        match value {
            Value::Buffer(b) => Ok((b, next)),
            _ => Err(Error::UnknownTag {
                offset: pos,
                tag: found,
            }),
        }
    }

    fn decode_array(&mut self, offset: u64, body: usize) -> Result<(Value, usize)> {
        let (count, mut pos) = length::read(self.data, body, 0)?;
        let container = Value::array(Vec::new());
        self.offsets.insert(offset, container.clone());
        self.depth.enter(offset as usize)?;
        if let Value::Array(ref cell) = container {
            for _ in 0..count {
                let (child, next) = self.decode_value(pos)?;
                cell.borrow_mut().push(child);
                pos = next;
            }
        }
        self.depth.exit();
        Ok((container, pos))
    }

    fn decode_set(&mut self, offset: u64, body: usize) -> Result<(Value, usize)> {
        let (count, mut pos) = length::read(self.data, body, 0)?;
        let container = Value::set(Vec::new());
        self.offsets.insert(offset, container.clone());
        self.depth.enter(offset as usize)?;
        if let Value::Set(ref cell) = container {
            for _ in 0..count {
                let (child, next) = self.decode_value(pos)?;
                cell.borrow_mut().push(child);
                pos = next;
            }
        }
        self.depth.exit();
        Ok((container, pos))
    }

    fn decode_pairs(&mut self, offset: u64, body: usize, is_object: bool) -> Result<(Value, usize)> {
        let (count, mut pos) = length::read(self.data, body, 0)?;
        let container = if is_object {
            Value::object(Vec::new())
        } else {
            Value::map(Vec::new())
        };
        self.offsets.insert(offset, container.clone());
        self.depth.enter(offset as usize)?;
        let pairs = count / 2;
        let cell = match &container {
            Value::Object(cell) | Value::Map(cell) => cell,
            _ => unreachable!(),
        };
        for _ in 0..pairs {
            let (key, next) = self.decode_value(pos)?;
            let (value, next) = self.decode_value(next)?;
            cell.borrow_mut().push((key, value));
            pos = next;
        }
        self.depth.exit();
        Ok((container, pos))
    }

    fn decode_recursive(&mut self, tag_offset: usize, body: usize) -> Result<(Value, usize)> {
        let (target, next) = length::read(self.data, body, 0)?;
        match self.offsets.get(&target) {
            Some(value) => Ok((value.clone(), next)),
            None => Err(Error::UnresolvedBackReference {
                offset: tag_offset,
                target,
            }),
        }
    }
}

/// Read a length-prefixed ASCII payload, mapping a bad parse or non-UTF-8
/// bytes to `make_error(offset_of_payload)`.
fn read_ascii<'b>(
    data: &'b [u8],
    pos: usize,
    make_error: impl Fn(usize) -> Error,
) -> Result<(&'b str, usize)> {
    let (bytes, next) = text::read_bytes(data, pos, 0)?;
    let text = std::str::from_utf8(bytes).map_err(|_| make_error(pos))?;
    Ok((text, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode, EncodeOptions};
    use crate::identity::Recursion;

    fn dec(bytes: &[u8]) -> Value {
        decode(bytes, &DecodeOptions::default()).unwrap()
    }

    #[test]
    fn s1_null() {
        assert!(matches!(dec(&[b'n']), Value::Null));
    }

    #[test]
    fn s2_booleans() {
        assert_eq!(dec(&[b'b', 1]).as_bool(), Some(true));
        assert_eq!(dec(&[b'b', 0]).as_bool(), Some(false));
    }

    #[test]
    fn s4_number() {
        let v = dec(&[b'N', 1, 2, b'4', b'2']);
        assert_eq!(v.as_number(), Some(42.0));
    }

    #[test]
    fn s5_array_of_numbers() {
        let bytes = [
            b'A', 1, 3, //
            b'N', 1, 1, b'1', //
            b'N', 1, 1, b'2', //
            b'N', 1, 1, b'3',
        ];
        let v = dec(&bytes);
        let array = v.as_array().unwrap().borrow();
        assert_eq!(array.len(), 3);
        assert_eq!(array[0].as_number(), Some(1.0));
        assert_eq!(array[2].as_number(), Some(3.0));
    }

    #[test]
    fn s6_self_referential_array_round_trips() {
        let bytes = [b'A', 1, 1, b'r', 1, 0];
        let v = dec(&bytes);
        let array = v.as_array().unwrap();
        let first = array.borrow()[0].clone();
        assert_eq!(first.identity(), v.identity());
    }

    #[test]
    fn s7_diamond_shares_identity_after_round_trip() {
        let o = Value::object(vec![]);
        let r = Value::object(vec![
            (Value::str("x"), o.clone()),
            (Value::str("y"), o.clone()),
        ]);
        let bytes = encode(&r, &EncodeOptions::default()).unwrap();
        let decoded = dec(&bytes);
        if let Value::Object(pairs) = &decoded {
            let pairs = pairs.borrow();
            let (_, x) = &pairs[0];
            let (_, y) = &pairs[1];
            assert_eq!(x.identity(), y.identity());
        } else {
            panic!("expected object");
        }
    }

    #[test]
    fn s8_date() {
        let mut bytes = vec![b'D', 1, 24];
        bytes.extend_from_slice(b"2020-01-02T03:04:05.000Z");
        let v = dec(&bytes);
        if let Value::Date(date) = v {
            assert_eq!(date.to_iso8601(), "2020-01-02T03:04:05.000Z");
        } else {
            panic!("expected date");
        }
    }

    #[test]
    fn s9_unknown_tag_at_offset_zero() {
        let err = decode(&[0xff], &DecodeOptions::default()).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownTag {
                offset: 0,
                tag: 0xff
            }
        );
    }

    #[test]
    fn s10_truncated_array() {
        let bytes = [b'A', 1, 3, b'N', 1, 1, b'1'];
        let err = decode(&bytes, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::TruncatedStream { .. }));
    }

    #[test]
    fn round_trips_cycle_through_encode_and_decode() {
        let array = Value::array(vec![]);
        if let Value::Array(ref elements) = array {
            elements.borrow_mut().push(array.clone());
        }
        let bytes = encode(&array, &EncodeOptions::default()).unwrap();
        let decoded = dec(&bytes);
        let inner = decoded.as_array().unwrap().borrow()[0].clone();
        assert_eq!(inner.identity(), decoded.identity());
    }

    #[test]
    fn unresolved_back_reference_errors() {
        let bytes = [b'r', 1, 99];
        let err = decode(&bytes, &DecodeOptions::default()).unwrap_err();
        assert_eq!(
            err,
            Error::UnresolvedBackReference {
                offset: 0,
                target: 99
            }
        );
    }

    #[test]
    fn depth_guard_trips_on_deep_nesting() {
        let mut bytes = Vec::new();
        for _ in 0..20 {
            bytes.push(b'A');
            bytes.push(1);
            bytes.push(1);
        }
        bytes.push(b'n');
        let options = DecodeOptions { max_depth: 5 };
        let err = decode(&bytes, &options).unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep { .. }));
    }

    #[test]
    fn typed_view_round_trips_with_shared_buffer() {
        let buffer = Rc::new(vec![1u8, 2, 3]);
        let typed = Value::Typed(Rc::new(TypedView {
            kind: "Uint8Array".into(),
            buffer: buffer.clone(),
        }));
        let plain = Value::Buffer(buffer);
        let root = Value::array(vec![typed, plain]);
        let bytes = encode(&root, &EncodeOptions::default()).unwrap();
        let decoded = dec(&bytes);
        let elements = decoded.as_array().unwrap().borrow();
        let typed_buffer = if let Value::Typed(t) = &elements[0] {
            t.buffer.clone()
        } else {
            panic!("expected typed view")
        };
        let plain_buffer = if let Value::Buffer(b) = &elements[1] {
            b.clone()
        } else {
            panic!("expected buffer")
        };
        assert!(Rc::ptr_eq(&typed_buffer, &plain_buffer));
    }

    #[test]
    fn recursion_option_round_trips_through_encode() {
        let shared = Value::str("dup");
        let root = Value::array(vec![shared.clone(), shared]);
        let options = EncodeOptions {
            recursion: Recursion::Some,
            ..EncodeOptions::default()
        };
        let bytes = encode(&root, &options).unwrap();
        let decoded = dec(&bytes);
        let elements = decoded.as_array().unwrap().borrow();
        assert_eq!(elements[0].as_str(), Some("dup"));
        assert_eq!(elements[1].as_str(), Some("dup"));
    }

    #[test]
    fn acyclic_graph_round_trips_structurally() {
        use rand::prelude::*;

        let mut rng = rand::thread_rng();
        let buffer: Rc<Vec<u8>> = Rc::new((0..rng.gen_range(0..32)).map(|_| rng.gen()).collect());
        let root = Value::object(vec![
            (Value::str("n"), Value::number(rng.gen_range(-1e6..1e6))),
            (Value::str("big"), Value::BigInt(Rc::new(BigInt::parse("123456789012345678901234567890").unwrap()))),
            (Value::str("flag"), Value::Bool(rng.gen())),
            (Value::str("nil"), Value::Null),
            (
                Value::str("list"),
                Value::array((0..8).map(|i| Value::number(i as f64)).collect()),
            ),
            (
                Value::str("set"),
                Value::set(vec![Value::str("a"), Value::str("b"), Value::str("c")]),
            ),
            (
                Value::str("map"),
                Value::map(vec![(Value::number(1.0), Value::str("one"))]),
            ),
            (Value::str("buf"), Value::Buffer(buffer.clone())),
            (
                Value::str("typed"),
                Value::Typed(Rc::new(TypedView {
                    kind: "Uint8Array".into(),
                    buffer,
                })),
            ),
            (
                Value::str("re"),
                Value::Regexp(Rc::new(Regexp::new("[a-z]+", "i").unwrap())),
            ),
            (
                Value::str("err"),
                Value::Error(Rc::new(ErrorValue {
                    name: "RangeError".into(),
                    message: "out of bounds".into(),
                })),
            ),
            (
                Value::str("when"),
                Value::date(DateValue::from_millis(1_580_612_645_123)),
            ),
        ]);

        let bytes = encode(&root, &EncodeOptions::default()).unwrap();
        let decoded = dec(&bytes);
        let pairs = if let Value::Object(p) = &decoded {
            p.borrow()
        } else {
            panic!("expected object")
        };
        assert_eq!(pairs.len(), 12);
        let list = pairs
            .iter()
            .find(|(k, _)| k.as_str() == Some("list"))
            .unwrap()
            .1
            .as_array()
            .unwrap()
            .borrow()
            .len();
        assert_eq!(list, 8);
    }

    #[test]
    fn idempotent_re_encoding_is_byte_identical() {
        let o = Value::object(vec![(Value::str("k"), Value::number(7.0))]);
        let root = Value::array(vec![o.clone(), o, Value::str("tail")]);
        let first = encode(&root, &EncodeOptions::default()).unwrap();
        let decoded = dec(&first);
        let second = encode(&decoded, &EncodeOptions::default()).unwrap();
        assert_eq!(first, second);
    }
}
