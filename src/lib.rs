//! A binary codec for a dynamic-typed value graph — numbers, strings,
//! booleans, null, big integers, arrays, records, maps, sets, dates,
//! regular expressions, errors, typed byte views, and raw buffers — that
//! preserves reference identity across the graph, so cyclic and diamond
//! references round-trip exactly.
//!
//! ```
//! use graphpack::{decode, encode, DecodeOptions, EncodeOptions, Value};
//!
//! let root = Value::array(vec![Value::number(1.0), Value::str("hi")]);
//! let bytes = encode(&root, &EncodeOptions::default()).unwrap();
//! let back = decode(&bytes, &DecodeOptions::default()).unwrap();
//! assert_eq!(back.as_array().unwrap().borrow().len(), 2);
//! ```

mod date;
mod decode;
mod depth_tracking;
mod encode;
mod error;
mod identity;
mod length;
mod tag;
mod text;
mod value;

pub use date::DateValue;
pub use decode::{decode, DecodeOptions};
pub use encode::{encode, EncodeOptions};
pub use error::{Error, Result};
pub use identity::Recursion;
pub use value::{BigInt, Category, Elements, ErrorValue, Pairs, Regexp, TypedView, Value};
