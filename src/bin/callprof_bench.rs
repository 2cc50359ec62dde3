//! Multi-threaded workload driver for the callprof recorder.
//!
//! Spawns named worker threads that record synthetic and measured invocations
//! in rounds, takes a snapshot after every round and writes a report.
#![forbid(unsafe_code)]

use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;

use callprof::logging::init_logging;
use callprof::report::{self, ReportFormat, SnapshotReport};
use callprof::{ProfileScope, ProfilerOptions, Recorder};
use clap::{Parser, ValueEnum};
use rand::Rng;
use tracing::info;

const OPERATIONS: &[(&str, &str)] = &[
    ("db", "query"),
    ("db", "connect"),
    ("net", "send"),
    ("net", "recv"),
    ("cache", "hit"),
    ("cache", "miss"),
];

#[derive(Parser, Debug)]
#[command(
    name = "callprof-bench",
    version,
    about = "Drive the call profiler with a synthetic multi-threaded workload"
)]
struct Cli {
    #[arg(long, default_value_t = 4, help = "Number of worker threads")]
    threads: usize,

    #[arg(long, default_value_t = 3, help = "Rounds; a snapshot is taken after each")]
    rounds: usize,

    #[arg(long, default_value_t = 10_000, help = "Invocations per worker per round")]
    iterations: usize,

    #[arg(long, value_enum, help = "Report format (defaults to the options file or html)")]
    format: Option<FormatArg>,

    #[arg(long, value_name = "FILE", help = "Write the report here instead of stdout")]
    output: Option<PathBuf>,

    #[arg(long, value_name = "INDEX", help = "Render this snapshot instead of the live state")]
    snapshot: Option<u32>,

    #[arg(
        long,
        value_name = "INDEX",
        conflicts_with = "snapshot",
        help = "Render live counters minus this snapshot"
    )]
    since: Option<u32>,

    #[arg(long, value_name = "FILE", env = "CALLPROF_CONFIG", help = "Profiler options TOML")]
    config: Option<PathBuf>,

    #[arg(long, default_value = "info", env = "CALLPROF_LOG", help = "Log filter directive")]
    log: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Html,
    Text,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Html => ReportFormat::Html,
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log)?;

    let options = match &cli.config {
        Some(path) => ProfilerOptions::load(path)?,
        None => ProfilerOptions::default(),
    };
    let format = cli.format.map(ReportFormat::from).unwrap_or(options.default_format);
    let recorder = Arc::new(Recorder::with_options(options));

    let started = Instant::now();
    run_workload(&recorder, cli.threads, cli.rounds, cli.iterations)?;
    info!(
        threads = recorder.thread_count(),
        snapshots = recorder.latest_index(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "workload finished"
    );

    let model = match cli.since {
        Some(index) => SnapshotReport::from_snapshot(&recorder.snapshot_since(index)),
        None => recorder.report(cli.snapshot),
    };
    match &cli.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            report::render(&model, format, &mut out)?;
            info!(path = %path.display(), %format, "report written");
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            report::render(&model, format, &mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn run_workload(
    recorder: &Arc<Recorder>,
    threads: usize,
    rounds: usize,
    iterations: usize,
) -> io::Result<()> {
    let barrier = Arc::new(Barrier::new(threads + 1));
    let mut handles = Vec::with_capacity(threads);
    for worker in 0..threads {
        let recorder = Arc::clone(recorder);
        let barrier = Arc::clone(&barrier);
        let handle = thread::Builder::new()
            .name(format!("worker-{worker}"))
            .spawn(move || {
                for _ in 0..rounds {
                    worker_round(&recorder, iterations);
                    barrier.wait();
                    barrier.wait();
                }
            })?;
        handles.push(handle);
    }

    for round in 0..rounds {
        barrier.wait();
        let index = recorder.take_snapshot(&format!("round-{round}"));
        info!(round, index, "snapshot taken");
        barrier.wait();
    }

    for handle in handles {
        if handle.join().is_err() {
            return Err(io::Error::new(io::ErrorKind::Other, "worker panicked"));
        }
    }
    Ok(())
}

fn worker_round(recorder: &Recorder, iterations: usize) {
    let mut rng = rand::thread_rng();
    for _ in 0..iterations {
        let (category, name) = OPERATIONS[rng.gen_range(0..OPERATIONS.len())];
        recorder.record(category, name, rng.gen_range(1..500));
    }
    let _scope = ProfileScope::on(recorder, "worker", "checksum");
    let checksum = (0..iterations as u64).fold(0u64, |acc, v| acc.wrapping_mul(31).wrapping_add(v));
    std::hint::black_box(checksum);
}
