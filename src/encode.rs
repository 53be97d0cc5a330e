//! The encoder (spec §4.3, §4.4): a single recursive walk over a [`Value`]
//! that dispatches on category, emitting tag plus payload and threading the
//! identity cache and depth guard through the whole call.

use crate::depth_tracking::{DepthTracker, DEFAULT_MAX_DEPTH};
use crate::error::Result;
use crate::identity::{IdentityCache, Recursion};
use crate::length;
use crate::tag::Tag;
use crate::text;
use crate::value::Value;

/// Options for [`encode`]. The closed option set of spec §6.2 plus the
/// `max_depth` guard this crate adds to keep a cyclic `recursion = "none"`
/// encode from genuinely overflowing the process stack (spec §5, §9 — see
/// DESIGN.md).
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    pub recursion: Recursion,
    pub max_depth: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            recursion: Recursion::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Encode `value` to a byte sequence per the wire grammar of spec §3.
///
/// Fails only with [`crate::error::Error::NestingTooDeep`] — the rest of
/// the wire grammar has no failure mode on the encode side, since every
/// `Value` this crate can construct is already serializable.
pub fn encode(value: &Value, options: &EncodeOptions) -> Result<Vec<u8>> {
    let mut encoder = Encoder {
        buf: Vec::new(),
        cache: IdentityCache::new(options.recursion),
        depth: DepthTracker::new(options.max_depth),
    };
    encoder.encode_value(value)?;
    Ok(encoder.buf)
}

struct Encoder {
    buf: Vec<u8>,
    cache: IdentityCache,
    depth: DepthTracker,
}

impl Encoder {
    fn encode_value(&mut self, value: &Value) -> Result<()> {
        if let Some(back_reference) = self.cache.lookup(value) {
            self.buf.extend_from_slice(back_reference);
            return Ok(());
        }
        let offset = self.buf.len() as u64;
        self.cache.record(value, offset);

        match value {
            Value::Null => self.buf.push(Tag::NULL),
            Value::Bool(b) => {
                self.buf.push(Tag::BOOLEAN);
                self.buf.push(if *b { 1 } else { 0 });
            }
            Value::Number(n) => {
                if n.is_finite() {
                    text::emit_ascii(&mut self.buf, Tag::NUMBER, &format_number(**n));
                } else {
                    // Matches the source behavior of silently coercing
                    // unrepresentable numerics (spec §4.3); reachable only
                    // if a caller builds a non-finite Number by hand,
                    // bypassing Value::number's own coercion.
                    self.buf.push(Tag::NULL);
                }
            }
            Value::BigInt(b) => {
                text::emit_ascii(&mut self.buf, Tag::BIGINT, &b.to_decimal_string());
            }
            Value::Str(s) => text::emit_string(&mut self.buf, s),
            Value::Array(elements) => {
                self.buf.push(Tag::ARRAY);
                let elements = elements.borrow();
                length::write(&mut self.buf, elements.len() as u64);
                self.depth.enter(offset as usize)?;
                for element in elements.iter() {
                    self.encode_value(element)?;
                }
                self.depth.exit();
            }
            Value::Object(pairs) => self.encode_pairs(Tag::OBJECT, pairs, offset)?,
            Value::Map(pairs) => self.encode_pairs(Tag::MAP, pairs, offset)?,
            Value::Set(elements) => {
                self.buf.push(Tag::SET);
                let elements = elements.borrow();
                length::write(&mut self.buf, elements.len() as u64);
                self.depth.enter(offset as usize)?;
                for element in elements.iter() {
                    self.encode_value(element)?;
                }
                self.depth.exit();
            }
            Value::Buffer(bytes) => {
                self.buf.push(Tag::BUFFER);
                length::write(&mut self.buf, bytes.len() as u64);
                self.buf.extend_from_slice(bytes);
            }
            Value::Date(date) => {
                text::emit_ascii(&mut self.buf, Tag::DATE, &date.to_iso8601());
            }
            Value::Regexp(regexp) => {
                self.buf.push(Tag::REGEXP);
                self.encode_value(&Value::str(regexp.pattern()))?;
                self.encode_value(&Value::str(regexp.flags()))?;
            }
            Value::Error(error) => {
                self.buf.push(Tag::ERROR);
                self.encode_value(&Value::Str(error.name.clone()))?;
                self.encode_value(&Value::Str(error.message.clone()))?;
            }
            Value::Typed(typed) => {
                self.buf.push(Tag::TYPED);
                self.encode_value(&Value::Str(typed.kind.clone()))?;
                self.encode_value(&Value::Buffer(typed.buffer.clone()))?;
            }
        }
        Ok(())
    }

    fn encode_pairs(
        &mut self,
        tag: u8,
        pairs: &crate::value::Pairs,
        offset: u64,
    ) -> Result<()> {
        self.buf.push(tag);
        let pairs = pairs.borrow();
        length::write(&mut self.buf, (pairs.len() * 2) as u64);
        self.depth.enter(offset as usize)?;
        for (key, value) in pairs.iter() {
            self.encode_value(key)?;
            self.encode_value(value)?;
        }
        self.depth.exit();
        Ok(())
    }
}

/// The canonical number-to-text rendering (spec §6.1's `to_decimal_text`):
/// Rust's own `f64` `Display`, which already omits a trailing `.0` for
/// integral values (`42.0` renders as `"42"`, matching S4).
fn format_number(n: f64) -> String {
    n.to_string()
}
