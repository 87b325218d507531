//! Station Temperature Aggregator CLI
//!
//! Reads a `station;temperature` measurements file and prints
//! `station: min/mean/max` for every station, sorted by station name.
//!
//! # Output Format
//!
//! The report goes to stdout, one station per line: `<name>: <min>/<mean>/<max>`.
//!
//! With `--stats`, a summary line goes to stderr on completion:
//! `chunks=N bytes=N rows=N stations=N workers=N elapsed_ms=N throughput_mib_s=N`
//!
//! Diagnostics use `tracing`; set `RUST_LOG=debug` for per-worker events.
//!
//! # Exit Codes
//!
//! - `0`: Success
//! - `1`: Read failure, malformed input or output failure (no report printed)
//! - `2`: Invalid arguments

use brc_pipeline::{run, PipelineConfig, SplitStrategy, StdoutSink};
use std::env;
use std::ffi::OsStr;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Input used when no path is given.
const DEFAULT_INPUT: &str = "measurements.txt";

fn print_usage(exe: &OsStr) {
    eprintln!(
        "usage: {} [OPTIONS] [path]

ARGS:
    [path]                  Measurements file (default: {DEFAULT_INPUT})

OPTIONS:
    --workers=<N>           Parallel aggregators (default: CPU count)
    --chunk-size=<BYTES>    Bytes per read call (default: 1048576)
    --queue-depth=<N>       Chunks buffered between reader and workers (default: workers)
    --split=<scan|probe>    Delimiter search strategy (default: scan)
    --no-validate           Decode values without checking their shape
    --stats                 Print run statistics to stderr
    --help, -h              Show this help message",
        exe.to_string_lossy()
    );
}

fn parse_count(flag: &str, value: &str) -> usize {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            eprintln!("invalid {flag} value: {value} (expected an integer >= 1)");
            std::process::exit(2);
        }
    }
}

struct Args {
    path: PathBuf,
    config: PipelineConfig,
    stats: bool,
}

fn parse_args() -> Args {
    let mut args = env::args_os();
    let exe = args.next().unwrap_or_else(|| "brc".into());
    let mut path: Option<PathBuf> = None;
    let mut workers: Option<usize> = None;
    let mut queue_depth: Option<usize> = None;
    let mut config = PipelineConfig::default();
    let mut stats = false;

    for arg in args {
        if let Some(flag) = arg.to_str() {
            if let Some(value) = flag.strip_prefix("--workers=") {
                workers = Some(parse_count("--workers", value));
                continue;
            }
            if let Some(value) = flag.strip_prefix("--chunk-size=") {
                config.chunk_size = parse_count("--chunk-size", value);
                continue;
            }
            if let Some(value) = flag.strip_prefix("--queue-depth=") {
                queue_depth = Some(parse_count("--queue-depth", value));
                continue;
            }
            if let Some(value) = flag.strip_prefix("--split=") {
                config.split = SplitStrategy::from_name(value).unwrap_or_else(|| {
                    eprintln!("invalid --split value: {value} (expected scan or probe)");
                    std::process::exit(2);
                });
                continue;
            }
            match flag {
                "--no-validate" => {
                    config.validate_values = false;
                    continue;
                }
                "--stats" => {
                    stats = true;
                    continue;
                }
                "--help" | "-h" => {
                    print_usage(&exe);
                    std::process::exit(0);
                }
                _ if flag.starts_with("--") => {
                    eprintln!("unknown flag: {flag}");
                    print_usage(&exe);
                    std::process::exit(2);
                }
                _ => {}
            }
        }

        if path.is_some() {
            print_usage(&exe);
            std::process::exit(2);
        }
        path = Some(PathBuf::from(arg));
    }

    if let Some(n) = workers {
        config.workers = n;
    }
    config.queue_depth = queue_depth.unwrap_or(config.workers);

    Args {
        path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT)),
        config,
        stats,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let args = parse_args();

    let file = match File::open(&args.path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: cannot open {}: {e}", args.path.display());
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let sink = StdoutSink::new();
    let stats = match run(file, &args.config, &sink) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.stats {
        let elapsed = start.elapsed();
        let elapsed_secs = elapsed.as_secs_f64();
        let throughput_mib = if elapsed_secs > 0.0 {
            (stats.bytes as f64 / (1024.0 * 1024.0)) / elapsed_secs
        } else {
            0.0
        };
        eprintln!(
            "chunks={} bytes={} rows={} stations={} workers={} elapsed_ms={} throughput_mib_s={:.2}",
            stats.chunks,
            stats.bytes,
            stats.rows,
            stats.stations,
            stats.workers,
            elapsed.as_millis(),
            throughput_mib
        );
    }

    ExitCode::SUCCESS
}
