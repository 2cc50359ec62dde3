#![allow(missing_docs)]

use callprof::{Micros, ProfilerOptions, Recorder, Snapshot, ThreadKey};

fn counters(snapshot: &Snapshot, key: ThreadKey, path: &str) -> Option<(i64, Micros)> {
    let tree = &snapshot.thread(key)?.tree;
    let node = tree.node(tree.find(path)?);
    Some((node.calls(), node.total_us()))
}

#[test]
fn after_queries_scenario() {
    let recorder = Recorder::new();
    for _ in 0..3 {
        recorder.record("db", "query", 100);
    }
    let frozen = recorder.take_snapshot("after-queries");
    recorder.record("db", "query", 50);
    let key = recorder.local_thread_key();

    let after = recorder.snapshot_at(frozen);
    assert_eq!(after.name(), Some("after-queries"));
    assert_eq!(counters(&after, key, "db/query"), Some((3, 300)));
    assert_eq!(counters(&after, key, "db"), Some((3, 300)));
    assert_eq!(counters(&after, key, ""), Some((3, 300)));

    let live = recorder.snapshot();
    assert_eq!(live.name(), Some("current"));
    assert_eq!(live.index(), Some(frozen + 1));
    assert_eq!(counters(&live, key, "db/query"), Some((4, 350)));

    let delta = recorder.snapshot_since(frozen);
    assert_eq!(counters(&delta, key, "db/query"), Some((1, 50)));
}

#[test]
fn chain_indices_are_sequential_from_the_root() {
    let recorder = Recorder::new();
    let root = recorder.snapshot_at(0);
    assert_eq!(root.name(), Some("initial"));
    assert!(root.is_empty());

    let names = ["boot", "warm", "steady"];
    let indices: Vec<u32> = names
        .iter()
        .map(|name| {
            recorder.record("tick", name, 1);
            recorder.take_snapshot(name)
        })
        .collect();
    assert_eq!(indices, [1, 2, 3]);
    assert_eq!(recorder.latest_index(), 3);

    for (index, name) in indices.iter().zip(names) {
        let snapshot = recorder.snapshot_at(*index);
        assert_eq!(snapshot.index(), Some(*index));
        assert_eq!(snapshot.name(), Some(name));
    }
    assert!(recorder.snapshot_at(5).is_null());
}

#[test]
fn frozen_snapshots_do_not_move() {
    let recorder = Recorder::new();
    recorder.record("io", "read", 10);
    let index = recorder.take_snapshot("one");
    let before = recorder.snapshot_at(index);

    for _ in 0..100 {
        recorder.record("io", "read", 10);
    }
    recorder.take_snapshot("two");

    assert_eq!(recorder.snapshot_at(index), before);
}

#[test]
fn mutating_a_returned_copy_changes_nothing() {
    let recorder = Recorder::new();
    recorder.record("io", "write", 7);
    let index = recorder.take_snapshot("one");
    let key = recorder.local_thread_key();

    let mut data = recorder.snapshot_at(index).all_data();
    data.get_mut(&key)
        .expect("thread")
        .tree
        .record("io", "write", 1_000);
    let mut stats = recorder.current_statistics();
    stats.clear();

    assert_eq!(counters(&recorder.snapshot_at(index), key, "io/write"), Some((1, 7)));
    assert_eq!(counters(&recorder.snapshot(), key, "io/write"), Some((1, 7)));
}

#[test]
fn compare_between_two_frozen_snapshots() {
    let recorder = Recorder::new();
    for _ in 0..5 {
        recorder.record("db", "query", 100);
    }
    let first = recorder.take_snapshot("first");
    for _ in 0..3 {
        recorder.record("db", "query", 133);
    }
    recorder.record("cache", "miss", 4);
    let second = recorder.take_snapshot("second");
    let key = recorder.local_thread_key();

    let diff = recorder
        .snapshot_at(second)
        .compare_to(&recorder.snapshot_at(first));
    assert_eq!(counters(&diff, key, "db/query"), Some((3, 399)));
    assert_eq!(counters(&diff, key, "cache/miss"), Some((1, 4)));
    assert_eq!(counters(&diff, key, ""), Some((4, 403)));
}

#[test]
fn self_compare_is_all_zero() {
    let recorder = Recorder::new();
    recorder.record("db", "query", 12);
    recorder.record("net", "send", 3);
    let index = recorder.take_snapshot("one");
    let snapshot = recorder.snapshot_at(index);
    let diff = snapshot.compare_to(&snapshot);
    for thread in diff.threads() {
        for visit in thread.tree.walk() {
            assert_eq!(visit.node.calls(), 0, "{}", visit.display_path());
            assert_eq!(visit.node.total_us(), 0, "{}", visit.display_path());
        }
    }
}

#[test]
fn compare_to_null_and_unknown_since() {
    let recorder = Recorder::new();
    recorder.record("db", "query", 9);
    let live = recorder.snapshot();
    assert_eq!(live.compare_to(&Snapshot::null()), live);

    let key = recorder.local_thread_key();
    assert_eq!(
        counters(&recorder.snapshot_since(42), key, "db/query"),
        Some((1, 9))
    );
}

#[test]
fn custom_snapshot_names_from_options() {
    let recorder = Recorder::with_options(ProfilerOptions {
        initial_snapshot_name: "boot".into(),
        live_snapshot_name: "now".into(),
        ..ProfilerOptions::default()
    });
    assert_eq!(recorder.snapshot_at(0).name(), Some("boot"));
    assert_eq!(recorder.snapshot().name(), Some("now"));
}

#[test]
fn scope_guard_times_into_its_recorder() {
    let recorder = Recorder::new();
    for _ in 0..2 {
        let _scope = callprof::ProfileScope::on(&recorder, "work", "spin");
        std::hint::black_box((0..1_000u64).sum::<u64>());
    }
    let key = recorder.local_thread_key();
    let (calls, total) = counters(&recorder.snapshot(), key, "work/spin").expect("leaf");
    assert_eq!(calls, 2);
    assert!(total >= 0);
}
