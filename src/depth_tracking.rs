//! Container nesting depth guard (spec §5, §4.6).
//!
//! Both the encoder and the decoder push a level every time they descend into
//! a container (array, object, map, set) and pop it on the way back out.
//! Tripping the limit produces [`Error::NestingTooDeep`]; this is also the
//! mechanism that turns an unbounded cyclic encode under
//! `recursion = "none"` into a catchable error instead of a stack overflow
//! (see DESIGN.md).

use crate::error::{Error, Result};

/// Default maximum container nesting depth, per spec §5.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

#[derive(Clone, Debug)]
pub struct DepthTracker {
    depth: usize,
    limit: usize,
}

impl DepthTracker {
    pub fn new(limit: usize) -> Self {
        Self { depth: 0, limit }
    }

    /// Enter one more level of container nesting. Fails if the limit is
    /// exceeded; `offset` is attached to the error for diagnostics.
    pub fn enter(&mut self, offset: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > self.limit {
            return Err(Error::NestingTooDeep {
                offset,
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// Leave one level of container nesting.
    pub fn exit(&mut self) {
        self.depth -= 1;
    }
}
