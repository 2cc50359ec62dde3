use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::primitives::thread::ThreadLabel;
use crate::snapshot::{ThreadData, ThreadTree};
use crate::tree::CallTree;
use crate::types::ThreadKey;

/// Live tree of one thread.
///
/// Only the owning thread records into `tree`; the mutex is contended only
/// while a reporter copies it.
struct ThreadSlot {
    label: ThreadLabel,
    tree: Mutex<CallTree>,
}

/// Maps recording threads to their live counter trees.
///
/// Slots are never removed: a thread that exits keeps its key and its final
/// counters for the life of the registry, so the map grows by one slot per
/// distinct recording thread. [`ThreadRegistry::clear`] empties the trees but
/// keeps the slots.
pub struct ThreadRegistry {
    slots: RwLock<HashMap<ThreadId, Arc<ThreadSlot>>>,
    next_key: AtomicU64,
}

impl Default for ThreadRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            next_key: AtomicU64::new(1),
        }
    }

    /// Runs `f` against the calling thread's tree, registering the thread first
    /// if this is its first use.
    pub fn with_local<R>(&self, f: impl FnOnce(&mut CallTree) -> R) -> R {
        let slot = self.local_slot();
        let mut tree = slot.tree.lock();
        f(&mut tree)
    }

    /// Key of the calling thread, registering it if needed.
    pub fn local_key(&self) -> ThreadKey {
        self.local_slot().label.key
    }

    fn local_slot(&self) -> Arc<ThreadSlot> {
        let id = thread::current().id();
        if let Some(slot) = self.slots.read().get(&id) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        let slot = slots.entry(id).or_insert_with(|| {
            let key = ThreadKey(self.next_key.fetch_add(1, Ordering::Relaxed));
            let label = ThreadLabel::current(key);
            trace!(thread = %label, "registered recording thread");
            Arc::new(ThreadSlot {
                label,
                tree: Mutex::new(CallTree::new()),
            })
        });
        Arc::clone(slot)
    }

    /// Deep-copies every thread's tree.
    ///
    /// Holds the registry read lock for the whole pass and each thread's tree
    /// lock only while that tree is copied. No atomicity is promised across
    /// threads.
    pub fn copy_all(&self) -> ThreadData {
        let slots = self.slots.read();
        let mut out = BTreeMap::new();
        for slot in slots.values() {
            let tree = slot.tree.lock().clone();
            out.insert(
                slot.label.key,
                ThreadTree {
                    label: slot.label.clone(),
                    tree,
                },
            );
        }
        out
    }

    /// Empties every live tree while keeping thread keys stable.
    pub fn clear(&self) {
        let slots = self.slots.read();
        for slot in slots.values() {
            slot.tree.lock().clear();
        }
    }

    /// Number of threads that have recorded at least once.
    pub fn thread_count(&self) -> usize {
        self.slots.read().len()
    }
}
