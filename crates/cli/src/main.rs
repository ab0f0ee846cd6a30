//! GHB prefetcher trace driver.
//!
//! This binary wraps the trace replay utilities of `ghb-core`. It performs:
//! 1. **Replay:** Load an access trace, feed it through a GHB prefetcher and report coverage, accuracy and prefetcher statistics.
//! 2. **Config:** Print the effective default configuration as JSON, as a starting point for a config file.
//!
//! Log verbosity is taken from `RUST_LOG` (e.g. `RUST_LOG=ghb_core=trace`).

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use ghb_core::common::addr::LineGeometry;
use ghb_core::common::constants::LINE_SIZE;
use ghb_core::sim::{Replay, ReplayReport, load_trace};
use ghb_core::stats::PrefetchStats;
use ghb_core::{GhbConfig, GhbPrefetcher};

#[derive(Parser, Debug)]
#[command(
    name = "ghb",
    author,
    version,
    about = "GHB delta-correlation prefetcher trace driver",
    long_about = "Replay a memory access trace through a Global History Buffer prefetcher.\n\nTrace lines are `ADDR [PC]` in decimal or 0x-hex; `#` starts a comment.\n\nExamples:\n  ghb replay traces/stream.trace\n  ghb replay traces/list.trace --config ghb.json --window 64 --json\n  ghb config > ghb.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a trace and report coverage, accuracy and statistics.
    Replay {
        /// Trace file (one `ADDR [PC]` per line).
        trace: PathBuf,

        /// JSON configuration file; defaults are used when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Cache line size in bytes (rounded up to a power of two).
        #[arg(long, default_value_t = LINE_SIZE)]
        line_bytes: u64,

        /// Outstanding prefetches tracked when scoring coverage.
        #[arg(short, long, default_value_t = 32)]
        window: usize,

        /// Print the candidates produced for every access.
        #[arg(long)]
        emit: bool,

        /// Statistics sections to print (summary, sources, emission, table). All when omitted.
        #[arg(long = "stats", value_name = "SECTION")]
        sections: Vec<String>,

        /// Print the report and statistics as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print the default configuration as JSON.
    Config,
}

/// Combined machine-readable output of a replay.
#[derive(Serialize, Debug)]
struct ReplayOutput<'a> {
    config: &'a GhbConfig,
    report: &'a ReplayReport,
    coverage: f64,
    accuracy: f64,
    stats: &'a PrefetchStats,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            trace,
            config,
            line_bytes,
            window,
            emit,
            sections,
            json,
        } => cmd_replay(
            &trace,
            config.as_deref(),
            line_bytes,
            window,
            emit,
            &sections,
            json,
        ),
        Commands::Config => cmd_config(),
    }
}

/// Loads the configuration and trace, replays it and prints the results.
///
/// Exits with code 1 if the configuration or trace cannot be loaded.
fn cmd_replay(
    trace: &Path,
    config: Option<&Path>,
    line_bytes: u64,
    window: usize,
    emit: bool,
    sections: &[String],
    json: bool,
) {
    let config = match config {
        Some(path) => GhbConfig::from_path(path).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            process::exit(1);
        }),
        None => GhbConfig::default(),
    };
    let accesses = load_trace(trace).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    tracing::info!(
        trace = %trace.display(),
        accesses = accesses.len(),
        "replaying trace"
    );

    let geometry = LineGeometry::new(line_bytes, config.page_bytes);
    let mut prefetcher = GhbPrefetcher::with_geometry(config, geometry);
    let mut replay = Replay::new(&geometry, window);

    replay.run(&mut prefetcher, accesses, |access, candidates| {
        if emit && !candidates.is_empty() {
            let addrs: Vec<String> = candidates.iter().map(|c| format!("{:#x}", c.addr)).collect();
            println!("{:#x} -> {}", access.addr, addrs.join(" "));
        }
    });
    let report = replay.into_report();

    if json {
        let output = ReplayOutput {
            config: prefetcher.config(),
            report: &report,
            coverage: report.coverage(),
            accuracy: report.accuracy(),
            stats: prefetcher.stats(),
        };
        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
        return;
    }

    println!("[*] Trace: {}", trace.display());
    println!(
        "    accesses={}  covered={}  issued={}  redundant={}  evicted_unused={}",
        report.accesses, report.covered, report.issued, report.redundant, report.evicted_unused
    );
    println!(
        "    coverage={:.4}  accuracy={:.4}  (window={})",
        report.coverage(),
        report.accuracy(),
        window.max(1)
    );
    prefetcher.stats().print_sections(sections);
}

/// Prints the default configuration as pretty JSON.
fn cmd_config() {
    match serde_json::to_string_pretty(&GhbConfig::default()) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
