//! The encoder-side identity cache (spec §4.2): on first emission of a
//! tracked value, record the precomputed `RECURSIVE` byte sequence for its
//! offset; later emissions of the same value — by identity, never by
//! structural equality — splice those bytes instead of re-encoding.

use std::collections::HashMap;

use crate::length;
use crate::tag::Tag;
use crate::value::{Category, Value};

/// Admission policy for the identity cache (spec §4.2, the `recursion`
/// option of §6.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recursion {
    /// Track every object and every non-empty primitive.
    All,
    /// Track only objects/containers; primitives are always re-encoded.
    Some,
    /// Never track. A cyclic graph cannot be encoded under this policy
    /// (spec §4.2): the encoder's recursive walk simply never terminates,
    /// which this crate turns into a [`crate::error::Error::NestingTooDeep`]
    /// via the depth guard rather than letting the process overflow its
    /// stack.
    None,
}

impl Default for Recursion {
    fn default() -> Self {
        Recursion::All
    }
}

/// Maps a value's identity to the bytes a later occurrence should splice
/// in place of re-encoding it.
pub struct IdentityCache {
    policy: Recursion,
    seen: HashMap<usize, Vec<u8>>,
}

impl IdentityCache {
    pub fn new(policy: Recursion) -> Self {
        IdentityCache {
            policy,
            seen: HashMap::new(),
        }
    }

    fn admits(&self, value: &Value) -> bool {
        match (self.policy, value.category()) {
            (Recursion::None, _) => false,
            (_, Category::Untracked) => false,
            (Recursion::Some, Category::Primitive) => false,
            (Recursion::All, Category::Primitive) => value.is_nonempty_primitive(),
            (Recursion::Some, Category::Object) | (Recursion::All, Category::Object) => true,
        }
    }

    /// On a hit, returns the precomputed `RECURSIVE` bytes for a previous
    /// emission of this exact value.
    pub fn lookup(&self, value: &Value) -> Option<&[u8]> {
        let id = value.identity()?;
        self.seen.get(&id).map(Vec::as_slice)
    }

    /// Record that `value` is about to be emitted with its tag byte at
    /// `offset`, if the policy admits it. Must be called before the
    /// payload is written, per spec §4.2.
    pub fn record(&mut self, value: &Value, offset: u64) {
        if !self.admits(value) {
            return;
        }
        let Some(id) = value.identity() else {
            return;
        };
        let mut bytes = vec![Tag::RECURSIVE];
        length::write(&mut bytes, offset);
        self.seen.insert(id, bytes);
    }
}
