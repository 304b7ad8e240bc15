//! Response handling.
//!
//! [`ResponseFormat`] describes how a successful body becomes a typed value
//! (the decode destination). [`RawResponse`] and [`ResponseSlot`] hand the
//! undecoded response back to callers that ask for it.

mod format;
mod raw;

pub use format::{BinaryFormat, EmptyFormat, JsonFormat, PlainTextFormat, ResponseFormat, is_json};
pub use raw::{RawResponse, ResponseSlot};
