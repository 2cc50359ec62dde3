//! Process-wide entry point for recording and reporting.
//!
//! A [`Recorder`] owns the live per-thread trees and the chain of frozen
//! snapshots. Instrumented code calls [`Recorder::record`] (usually through
//! [`ProfileScope`]); reporting code asks for snapshots and renders them.
//!
//! The live state is exposed as a snapshot named `current` whose index is one
//! past the most recent frozen snapshot. Taking a snapshot freezes a copy of
//! the live trees under that index and recording carries on, so every snapshot
//! holds cumulative counters and [`Snapshot::compare_to`] recovers the work
//! done in between.

mod scope;

use std::io::Write;
use std::sync::OnceLock;

use parking_lot::RwLock;
use time::OffsetDateTime;
use tracing::{debug, trace, warn};

use crate::options::ProfilerOptions;
use crate::primitives::registry::ThreadRegistry;
use crate::report::{self, ReportFormat, SnapshotReport};
use crate::snapshot::{Snapshot, SnapshotChain, ThreadData};
use crate::types::{Micros, Result, ThreadKey};

pub use scope::ProfileScope;

static GLOBAL: OnceLock<Recorder> = OnceLock::new();

/// Accumulates per-thread call timings and hands out snapshots.
pub struct Recorder {
    options: ProfilerOptions,
    live: ThreadRegistry,
    chain: RwLock<SnapshotChain>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    /// Creates an enabled recorder with default options.
    pub fn new() -> Self {
        Self::with_options(ProfilerOptions::default())
    }

    /// Creates a recorder with explicit options.
    pub fn with_options(options: ProfilerOptions) -> Self {
        let chain = SnapshotChain::new(&options.initial_snapshot_name);
        Self {
            options,
            live: ThreadRegistry::new(),
            chain: RwLock::new(chain),
        }
    }

    /// The process-wide recorder, configured by [`ProfilerOptions::from_env`].
    pub fn global() -> &'static Recorder {
        GLOBAL.get_or_init(|| {
            let options = ProfilerOptions::from_env();
            debug!(enabled = options.enabled, "global recorder initialized");
            Recorder::with_options(options)
        })
    }

    /// Options this recorder was built with.
    pub fn options(&self) -> &ProfilerOptions {
        &self.options
    }

    /// Whether invocations are being accumulated.
    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    /// Adds one invocation of `duration_us` at `category/name` for the calling
    /// thread.
    ///
    /// A negative duration is recorded as zero.
    pub fn record(&self, category: &str, name: &str, duration_us: Micros) {
        if !self.options.enabled {
            trace!(category, leaf = name, "recorder disabled; invocation dropped");
            return;
        }
        let duration_us = if duration_us < 0 {
            warn!(category, leaf = name, duration_us, "negative duration clamped to zero");
            0
        } else {
            duration_us
        };
        self.live.with_local(|tree| {
            tree.record(category, name, duration_us);
        });
    }

    /// Freezes the live counters under `name` and returns the new index.
    pub fn take_snapshot(&self, name: &str) -> u32 {
        let mut chain = self.chain.write();
        let threads = self.live.copy_all();
        chain.push(name, threads)
    }

    /// Copy of the live state.
    pub fn snapshot(&self) -> Snapshot {
        let chain = self.chain.read();
        self.live_snapshot(&chain)
    }

    /// Copy of the snapshot with `index`, the live state if `index` is the
    /// live index, or the null snapshot.
    pub fn snapshot_at(&self, index: u32) -> Snapshot {
        let chain = self.chain.read();
        self.resolve(&chain, Some(index))
    }

    /// Live counters minus the snapshot with `index`.
    ///
    /// An unknown index yields the live counters unchanged.
    pub fn snapshot_since(&self, index: u32) -> Snapshot {
        let chain = self.chain.read();
        let earlier = self.resolve(&chain, Some(index));
        self.live_snapshot(&chain).compare_to(&earlier)
    }

    /// Deep copy of every thread's live tree.
    pub fn current_statistics(&self) -> ThreadData {
        self.live.copy_all()
    }

    /// Index reported for the live state.
    pub fn live_index(&self) -> u32 {
        self.chain.read().next_index()
    }

    /// Index of the most recent frozen snapshot.
    pub fn latest_index(&self) -> u32 {
        self.live_index() - 1
    }

    /// Number of threads that have recorded into this recorder.
    pub fn thread_count(&self) -> usize {
        self.live.thread_count()
    }

    /// Key of the calling thread in this recorder.
    pub fn local_thread_key(&self) -> ThreadKey {
        self.live.local_key()
    }

    /// Row model of the snapshot at `index`, or of the live state for `None`.
    pub fn report(&self, index: Option<u32>) -> SnapshotReport {
        let snapshot = {
            let chain = self.chain.read();
            self.resolve(&chain, index)
        };
        SnapshotReport::from_snapshot(&snapshot)
    }

    /// Writes the snapshot at `index` (live state for `None`) to `out`.
    ///
    /// An unknown index renders a "no data" placeholder.
    pub fn render<W: Write + ?Sized>(
        &self,
        out: &mut W,
        index: Option<u32>,
        format: ReportFormat,
    ) -> Result<()> {
        report::render(&self.report(index), format, out)
    }

    /// [`Recorder::render`] in the configured default format.
    pub fn render_default<W: Write + ?Sized>(&self, out: &mut W, index: Option<u32>) -> Result<()> {
        self.render(out, index, self.options.default_format)
    }

    /// Drops all counters and restarts the chain at a fresh root.
    pub fn reset(&self) {
        let mut chain = self.chain.write();
        self.live.clear();
        *chain = SnapshotChain::new(&self.options.initial_snapshot_name);
        debug!("recorder reset");
    }

    fn live_snapshot(&self, chain: &SnapshotChain) -> Snapshot {
        Snapshot::new(
            self.options.live_snapshot_name.as_str(),
            chain.next_index(),
            OffsetDateTime::now_utc(),
            self.live.copy_all(),
        )
    }

    fn resolve(&self, chain: &SnapshotChain, index: Option<u32>) -> Snapshot {
        match index {
            None => self.live_snapshot(chain),
            Some(index) if index == chain.next_index() => self.live_snapshot(chain),
            Some(index) => chain
                .ancestor(index)
                .map(|node| node.snapshot().clone())
                .unwrap_or_else(Snapshot::null),
        }
    }
}

/// Times the rest of the enclosing block into the global recorder.
///
/// `profile_scope!(category, name)` uses an explicit name;
/// `profile_scope!(category)` names the scope after the calling module.
#[macro_export]
macro_rules! profile_scope {
    ($category:expr, $name:expr) => {
        let _profile_scope_guard = $crate::ProfileScope::new($category, $name);
    };
    ($category:expr) => {
        let _profile_scope_guard = $crate::ProfileScope::new($category, module_path!());
    };
}

/// Takes a named snapshot on the global recorder and returns its index.
#[macro_export]
macro_rules! profile_snapshot {
    ($name:expr) => {
        $crate::Recorder::global().take_snapshot($name)
    };
}
