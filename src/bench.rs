// Benchmark harness for primer.
//
// Purpose:
// - Provide a simple, repeatable baseline for the core operations (add, mul, greet).
// - Emit machine-readable JSON to stdout and a human-readable table to stderr.
//
// Design notes:
// - Everything runs in-process; the operations are pure, so there is no setup,
//   teardown, or contention to model.
// - Results pass through `black_box` so the timed calls survive optimization.
// - Keep benchmarks "good enough" for trend tracking, not lab-grade profiling.

use std::cmp::Ordering;
use std::hint::black_box;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::{Value, json};

use primer::core::error::{Error, ErrorKind};
use primer::core::ops;

// Greeting cost scales with the name; measure a few points on that curve.
const GREET_NAME_LENGTHS: [usize; 3] = [5, 64, 1024];

#[derive(Clone, Debug)]
pub struct BenchArgs {
    pub iters: u64,
    pub rounds: u32,
    pub format: BenchFormat,
    pub out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BenchFormat {
    Json,
    Table,
    Both,
}

impl BenchFormat {
    pub fn parse(input: &str) -> Result<Self, Error> {
        match input.trim() {
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            "both" => Ok(Self::Both),
            _ => Err(
                Error::new(ErrorKind::Usage).with_message("invalid --format (use json|table|both)")
            ),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct BenchEntry {
    bench: String,
    iters: u64,
    rounds: u32,
    ns_per_call: NsSummary,
    calls_per_sec: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

#[derive(Clone, Copy, Debug, Serialize)]
struct NsSummary {
    min: f64,
    p50: f64,
    p95: f64,
    max: f64,
}

pub fn run_bench(args: BenchArgs, program_version: &str) -> Result<(), Error> {
    if args.iters == 0 {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("--iters must be at least 1")
            .with_hint("Use a round count in the thousands for stable medians."));
    }
    if args.rounds == 0 {
        return Err(Error::new(ErrorKind::Usage).with_message("--rounds must be at least 1"));
    }

    let start = SystemTime::now();
    let mut results = Vec::new();

    results.push(bench_op("add", &args, None, || {
        black_box(ops::add(black_box(123), black_box(456)));
    }));
    results.push(bench_op("mul", &args, None, || {
        black_box(ops::multiply(black_box(123), black_box(456)));
    }));
    for len in GREET_NAME_LENGTHS {
        let name = "x".repeat(len);
        results.push(bench_op(
            &format!("greet/{len}"),
            &args,
            Some(format!("{len}-byte name, fresh allocation per call")),
            || {
                black_box(ops::greet(black_box(name.as_str())));
            },
        ));
    }

    let output = json!({
        "name": "primer",
        "version": program_version,
        "ts": rfc3339_now(start),
        "system": system_json(),
        "params": {
            "iters": args.iters,
            "rounds": args.rounds,
            "debug_build": cfg!(debug_assertions),
        },
        "results": results,
    });

    if let Some(path) = &args.out {
        write_json_file(path, &output)?;
    }
    emit_bench_output(output, args.format)
}

fn bench_op(label: &str, args: &BenchArgs, notes: Option<String>, mut op: impl FnMut()) -> BenchEntry {
    let mut per_round_ns = Vec::with_capacity(args.rounds as usize);
    for _ in 0..args.rounds {
        let start = Instant::now();
        for _ in 0..args.iters {
            op();
        }
        let dur = start.elapsed();
        per_round_ns.push(dur.as_nanos() as f64 / args.iters as f64);
    }
    per_round_ns.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let summary = NsSummary {
        min: per_round_ns.first().copied().unwrap_or(0.0),
        p50: quantile(&per_round_ns, 0.50),
        p95: quantile(&per_round_ns, 0.95),
        max: per_round_ns.last().copied().unwrap_or(0.0),
    };
    let calls_per_sec = 1e9 / summary.p50.max(1e-3);

    BenchEntry {
        bench: label.to_string(),
        iters: args.iters,
        rounds: args.rounds,
        ns_per_call: summary,
        calls_per_sec,
        notes,
    }
}

fn emit_bench_output(value: Value, format: BenchFormat) -> Result<(), Error> {
    match format {
        BenchFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
            );
            Ok(())
        }
        BenchFormat::Table => emit_table(&value),
        BenchFormat::Both => {
            println!(
                "{}",
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
            );
            emit_table(&value)
        }
    }
}

fn emit_table(value: &Value) -> Result<(), Error> {
    let mut stderr = io::stderr().lock();
    writeln!(stderr, "primer bench (table)").map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write bench table")
            .with_source(err)
    })?;

    let results = value
        .get("results")
        .and_then(|v| v.as_array())
        .ok_or_else(|| Error::new(ErrorKind::Internal).with_message("bench results missing"))?;

    writeln!(
        stderr,
        "{:>12}  {:>10}  {:>8}  {:>12}  {:>12}  {:>14}  {}",
        "bench", "iters", "rounds", "p50 ns/call", "max ns/call", "calls/sec", "notes"
    )
    .map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write bench table header")
            .with_source(err)
    })?;

    for item in results {
        let bench = item.get("bench").and_then(|v| v.as_str()).unwrap_or("?");
        let iters = item.get("iters").and_then(|v| v.as_u64()).unwrap_or(0);
        let rounds = item.get("rounds").and_then(|v| v.as_u64()).unwrap_or(0);
        let p50 = item
            .pointer("/ns_per_call/p50")
            .and_then(|v| v.as_f64())
            .unwrap_or(f64::NAN);
        let max = item
            .pointer("/ns_per_call/max")
            .and_then(|v| v.as_f64())
            .unwrap_or(f64::NAN);
        let calls_per_sec = item
            .get("calls_per_sec")
            .and_then(|v| v.as_f64())
            .unwrap_or(f64::NAN);
        let notes = item.get("notes").and_then(|v| v.as_str()).unwrap_or("");

        writeln!(
            stderr,
            "{:>12}  {:>10}  {:>8}  {:>12.2}  {:>12.2}  {:>14.0}  {}",
            bench, iters, rounds, p50, max, calls_per_sec, notes
        )
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to write bench table row")
                .with_source(err)
        })?;
    }

    Ok(())
}

fn write_json_file(path: &Path, value: &Value) -> Result<(), Error> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("json encode failed")
            .with_source(err)
    })?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|err| Error::new(ErrorKind::Io).with_path(parent).with_source(err))?;
        }
    }
    std::fs::write(path, bytes)
        .map_err(|err| Error::new(ErrorKind::Io).with_path(path).with_source(err))
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let clamped = q.clamp(0.0, 1.0);
    let idx = ((sorted.len() - 1) as f64 * clamped).round() as usize;
    sorted
        .get(idx)
        .copied()
        .unwrap_or_else(|| sorted[sorted.len() - 1])
}

fn system_json() -> Value {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    json!({
        "os": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
        "cpus": cpus,
    })
}

fn rfc3339_now(ts: SystemTime) -> String {
    let dur = ts.duration_since(UNIX_EPOCH).unwrap_or_default();
    let secs = dur.as_secs() as i64;
    let nsec = dur.subsec_nanos();
    let tm = time::OffsetDateTime::from_unix_timestamp(secs)
        .unwrap_or_else(|_| time::OffsetDateTime::UNIX_EPOCH);
    let tm = tm.replace_nanosecond(nsec).unwrap_or(tm);
    tm.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
