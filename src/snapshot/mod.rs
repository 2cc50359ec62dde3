//! Point-in-time copies of every thread's counter tree.
//!
//! A [`Snapshot`] is an owned value. Whatever a caller does with one can never
//! reach live recording state or another snapshot. Diffing two snapshots with
//! [`Snapshot::compare_to`] yields the work done between them.

mod chain;

use std::collections::BTreeMap;

use time::OffsetDateTime;

use crate::primitives::thread::ThreadLabel;
use crate::tree::CallTree;
use crate::types::ThreadKey;

pub(crate) use chain::SnapshotChain;

/// Per-thread trees keyed by thread.
pub type ThreadData = BTreeMap<ThreadKey, ThreadTree>;

/// One thread's counter tree together with its identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadTree {
    /// Identity of the recording thread.
    pub label: ThreadLabel,
    /// Counters recorded by that thread.
    pub tree: CallTree,
}

/// Name, position in the chain and capture time of a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotHeader {
    /// Name given when the snapshot was taken.
    pub name: String,
    /// Position in the snapshot chain; the root is zero.
    pub index: u32,
    /// Wall-clock capture time.
    pub timestamp: OffsetDateTime,
}

/// Frozen copy of all threads' counters.
///
/// The null snapshot (see [`Snapshot::null`]) stands in for a lookup that
/// found nothing. It carries no header and no data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    header: Option<SnapshotHeader>,
    threads: ThreadData,
}

impl Snapshot {
    pub(crate) fn new(
        name: impl Into<String>,
        index: u32,
        timestamp: OffsetDateTime,
        threads: ThreadData,
    ) -> Self {
        Self {
            header: Some(SnapshotHeader {
                name: name.into(),
                index,
                timestamp,
            }),
            threads,
        }
    }

    /// The empty result of a failed lookup.
    pub fn null() -> Self {
        Self::default()
    }

    /// True for the null snapshot.
    pub fn is_null(&self) -> bool {
        self.header.is_none()
    }

    /// True when no thread has recorded anything.
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Header, `None` for the null snapshot.
    pub fn header(&self) -> Option<&SnapshotHeader> {
        self.header.as_ref()
    }

    /// Snapshot name.
    pub fn name(&self) -> Option<&str> {
        self.header.as_ref().map(|header| header.name.as_str())
    }

    /// Position in the snapshot chain.
    pub fn index(&self) -> Option<u32> {
        self.header.as_ref().map(|header| header.index)
    }

    /// Capture time.
    pub fn timestamp(&self) -> Option<OffsetDateTime> {
        self.header.as_ref().map(|header| header.timestamp)
    }

    /// Number of threads with data.
    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    /// Borrowed view of one thread's tree.
    pub fn thread(&self, key: ThreadKey) -> Option<&ThreadTree> {
        self.threads.get(&key)
    }

    /// Borrowed view of every thread in key order.
    pub fn threads(&self) -> impl Iterator<Item = &ThreadTree> + '_ {
        self.threads.values()
    }

    /// Deep copy of the per-thread data.
    pub fn all_data(&self) -> ThreadData {
        self.threads.clone()
    }

    /// Counters of this snapshot minus those of `other`, thread by thread.
    ///
    /// Threads only present here keep their absolute values; threads only
    /// present in `other` are ignored. Comparing against the null snapshot
    /// returns an unchanged copy.
    pub fn compare_to(&self, other: &Snapshot) -> Snapshot {
        let mut diff = self.clone();
        if other.is_null() {
            return diff;
        }
        for (key, thread) in diff.threads.iter_mut() {
            if let Some(base) = other.threads.get(key) {
                thread.tree.subtract(&base.tree);
            }
        }
        diff
    }

    /// Work recorded since `earlier`; same as [`Snapshot::compare_to`].
    pub fn since(&self, earlier: &Snapshot) -> Snapshot {
        self.compare_to(earlier)
    }
}
