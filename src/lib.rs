//! In-process call-timing profiler.
//!
//! Every recording thread accumulates a tree of counters (call count and total
//! microseconds) addressed by `category/name`. Named snapshots freeze copies
//! of all threads' trees so that the work done between any two of them can be
//! computed by subtraction.
//!
//! ```
//! use callprof::{Recorder, ReportFormat};
//!
//! let recorder = Recorder::new();
//! recorder.record("db", "query", 100);
//! let mark = recorder.take_snapshot("after-queries");
//! recorder.record("db", "query", 50);
//!
//! let delta = recorder.snapshot_since(mark);
//! let tree = &delta.thread(recorder.local_thread_key()).unwrap().tree;
//! assert_eq!(tree.node(tree.find("db/query").unwrap()).calls(), 1);
//!
//! let mut html = Vec::new();
//! recorder.render(&mut html, None, ReportFormat::Html).unwrap();
//! ```

#![warn(missing_docs)]

pub mod logging;
pub mod options;
pub mod primitives;
pub mod recorder;
pub mod report;
pub mod snapshot;
pub mod tree;
pub mod types;

pub use options::ProfilerOptions;
pub use primitives::thread::{check_thread, ThreadAffinity, ThreadLabel};
pub use recorder::{ProfileScope, Recorder};
pub use report::{ReportFormat, ReportRow, SnapshotReport, ThreadReport};
pub use snapshot::{Snapshot, SnapshotHeader, ThreadData, ThreadTree};
pub use tree::{CallTree, Node, NodeId};
pub use types::{Micros, ProfilerError, Result, ThreadKey};
