//! Low-level building blocks for the recorder.
//!
//! Includes the monotonic clock, thread identity helpers and the
//! thread-to-tree registry that backs live recording.

/// Monotonic microsecond clock anchored at first use.
pub mod clock;

/// Registry mapping each recording thread to its live counter tree.
///
/// Lookups share a read lock; only a thread's first record takes the write lock.
pub mod registry;

/// Thread identity labels and the advisory wrong-thread check.
pub mod thread;
