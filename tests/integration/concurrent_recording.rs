#![allow(missing_docs)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use callprof::{Recorder, ThreadKey};

const NUM_THREADS: usize = 8;
const RECORDS_PER_THREAD: usize = 2_000;

fn spawn_named<F>(name: String, f: F) -> thread::JoinHandle<ThreadKey>
where
    F: FnOnce() -> ThreadKey + Send + 'static,
{
    thread::Builder::new()
        .name(name)
        .spawn(f)
        .expect("spawn thread")
}

#[test]
fn threads_record_into_isolated_trees() {
    let recorder = Arc::new(Recorder::new());
    let barrier = Arc::new(Barrier::new(NUM_THREADS));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|worker| {
            let recorder = Arc::clone(&recorder);
            let barrier = Arc::clone(&barrier);
            spawn_named(format!("worker-{worker}"), move || {
                barrier.wait();
                let category = format!("cat{worker}");
                for _ in 0..RECORDS_PER_THREAD {
                    recorder.record(&category, "op", worker as i64 + 1);
                }
                recorder.local_thread_key()
            })
        })
        .collect();
    let keys: Vec<ThreadKey> = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker"))
        .collect();

    let distinct: BTreeSet<_> = keys.iter().copied().collect();
    assert_eq!(distinct.len(), NUM_THREADS);
    assert_eq!(recorder.thread_count(), NUM_THREADS);

    let snapshot = recorder.snapshot();
    for (worker, key) in keys.iter().enumerate() {
        let thread = snapshot.thread(*key).expect("thread data");
        assert_eq!(thread.label.name, format!("worker-{worker}"));
        let tree = &thread.tree;
        let node = tree.node(tree.find(&format!("cat{worker}/op")).expect("own leaf"));
        assert_eq!(node.calls(), RECORDS_PER_THREAD as i64);
        assert_eq!(
            node.total_us(),
            RECORDS_PER_THREAD as i64 * (worker as i64 + 1)
        );
        assert_eq!(tree.node(tree.root()).child_names(), [format!("cat{worker}")]);
    }
}

#[test]
fn snapshots_taken_while_threads_record() {
    let recorder = Arc::new(Recorder::new());
    let done = Arc::new(AtomicBool::new(false));
    let workers = 4;
    let start = Arc::new(Barrier::new(workers + 1));

    let handles: Vec<_> = (0..workers)
        .map(|worker| {
            let recorder = Arc::clone(&recorder);
            let start = Arc::clone(&start);
            spawn_named(format!("busy-{worker}"), move || {
                start.wait();
                for _ in 0..RECORDS_PER_THREAD {
                    recorder.record("busy", "tick", 1);
                }
                recorder.local_thread_key()
            })
        })
        .collect();

    let snapshotter = {
        let recorder = Arc::clone(&recorder);
        let done = Arc::clone(&done);
        let start = Arc::clone(&start);
        thread::spawn(move || {
            start.wait();
            let mut taken = Vec::new();
            loop {
                taken.push(recorder.take_snapshot("periodic"));
                if done.load(Ordering::Acquire) {
                    break taken;
                }
            }
        })
    };

    let keys: Vec<ThreadKey> = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker"))
        .collect();
    done.store(true, Ordering::Release);
    let taken = snapshotter.join().expect("snapshotter");
    assert!(!taken.is_empty());

    for pair in taken.windows(2) {
        assert_eq!(pair[1], pair[0] + 1);
    }

    // Every frozen per-thread counter is a prefix of that thread's work.
    let mut previous = vec![0i64; keys.len()];
    for index in &taken {
        let snapshot = recorder.snapshot_at(*index);
        for (slot, key) in keys.iter().enumerate() {
            let calls = snapshot
                .thread(*key)
                .and_then(|thread| {
                    let tree = &thread.tree;
                    tree.find("busy/tick").map(|id| tree.node(id).calls())
                })
                .unwrap_or(0);
            assert!(calls >= previous[slot] && calls <= RECORDS_PER_THREAD as i64);
            previous[slot] = calls;
        }
    }

    let live = recorder.snapshot();
    for key in &keys {
        let tree = &live.thread(*key).expect("thread").tree;
        let leaf = tree.find("busy/tick").expect("leaf");
        assert_eq!(tree.node(leaf).calls(), RECORDS_PER_THREAD as i64);
    }
}

#[test]
fn concurrent_first_use_registers_each_thread_once() {
    let recorder = Arc::new(Recorder::new());
    let barrier = Arc::new(Barrier::new(NUM_THREADS));
    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|worker| {
            let recorder = Arc::clone(&recorder);
            let barrier = Arc::clone(&barrier);
            spawn_named(format!("first-{worker}"), move || {
                barrier.wait();
                let first = recorder.local_thread_key();
                recorder.record("x", "y", 1);
                assert_eq!(recorder.local_thread_key(), first);
                first
            })
        })
        .collect();
    let keys: BTreeSet<ThreadKey> = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker"))
        .collect();
    assert_eq!(keys.len(), NUM_THREADS);
    assert_eq!(recorder.thread_count(), NUM_THREADS);
}
