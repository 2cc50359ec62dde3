//! Shared identifiers and the crate error type.

mod error;

use std::fmt;

use serde::Serialize;

pub use error::{ProfilerError, Result};

/// Duration in microseconds as stored in the counter trees.
///
/// Signed because a diff between two snapshots may go below zero.
pub type Micros = i64;

/// Opaque identity of a recording thread within one recorder.
///
/// Keys are handed out in registration order and stay stable for the life of
/// the recorder, so the same thread maps to the same key in every snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ThreadKey(pub u64);

impl fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
