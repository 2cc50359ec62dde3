use std::sync::{Arc, Weak};

use time::OffsetDateTime;
use tracing::debug;

use super::{Snapshot, ThreadData};

/// Frozen snapshot linked to the one taken before it.
pub(crate) struct ChainNode {
    snapshot: Snapshot,
    parent: Weak<ChainNode>,
}

impl ChainNode {
    pub(crate) fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn index(&self) -> u32 {
        self.snapshot.index().unwrap_or_default()
    }
}

/// Chronological history of frozen snapshots.
///
/// The chain owns every node; the parent links are weak and only used to
/// walk backwards.
pub(crate) struct SnapshotChain {
    nodes: Vec<Arc<ChainNode>>,
}

impl SnapshotChain {
    /// Starts a chain at an empty root with index zero.
    pub(crate) fn new(root_name: &str) -> Self {
        let root = ChainNode {
            snapshot: Snapshot::new(root_name, 0, OffsetDateTime::now_utc(), ThreadData::new()),
            parent: Weak::new(),
        };
        Self {
            nodes: vec![Arc::new(root)],
        }
    }

    /// Most recent frozen snapshot.
    pub(crate) fn head(&self) -> &Arc<ChainNode> {
        // The root is created in `new` and nodes are never removed.
        &self.nodes[self.nodes.len() - 1]
    }

    /// Index the next frozen snapshot will get.
    pub(crate) fn next_index(&self) -> u32 {
        self.head().index() + 1
    }

    /// Freezes `threads` as a child of the head and makes it the new head.
    pub(crate) fn push(&mut self, name: &str, threads: ThreadData) -> u32 {
        let parent = Arc::downgrade(self.head());
        let index = self.next_index();
        let node = ChainNode {
            snapshot: Snapshot::new(name, index, OffsetDateTime::now_utc(), threads),
            parent,
        };
        debug!(
            snapshot = name,
            index,
            threads = node.snapshot.thread_count(),
            "snapshot taken"
        );
        self.nodes.push(Arc::new(node));
        index
    }

    /// Walks back from the head to the snapshot with `index`.
    pub(crate) fn ancestor(&self, index: u32) -> Option<Arc<ChainNode>> {
        let mut cursor = Some(Arc::clone(self.head()));
        while let Some(node) = cursor {
            if node.index() == index {
                return Some(node);
            }
            cursor = node.parent.upgrade();
        }
        None
    }
}
