//! CLI entry point: parses arguments, validates configuration, drives a
//! trace file through a `Simulator`, and writes a timestamped log file.

use clap::Parser;
use memsim::config::{
    AddressRange, Config, DEFAULT_DATA_GEOMETRY, DEFAULT_DATA_RANGE, DEFAULT_INSTR_GEOMETRY,
    DEFAULT_INSTR_RANGE,
};
use memsim::error::{ConfigError, SimError};
use memsim::simulator::Simulator;
use memsim::stats::StatsMode;
use memsim::trace::TraceReader;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Parser)]
#[command(about = "Trace-driven simulator of a two-level memory hierarchy")]
struct Args {
    /// Path to the trace file to replay
    trace_path: PathBuf,

    /// Statistics mode: 1 = counters only, 2 = counters + per-L2-interaction log lines
    #[arg(default_value_t = 1)]
    mode: u8,

    /// Directory to write the timestamped log file into
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,

    /// Override the instruction cache's way count
    #[arg(long)]
    i_ways: Option<u32>,
    /// Override the instruction cache's set count
    #[arg(long)]
    i_sets: Option<u32>,
    /// Override the instruction cache's line size in bytes
    #[arg(long)]
    i_line: Option<u32>,

    /// Override the data cache's way count
    #[arg(long)]
    d_ways: Option<u32>,
    /// Override the data cache's set count
    #[arg(long)]
    d_sets: Option<u32>,
    /// Override the data cache's line size in bytes
    #[arg(long)]
    d_line: Option<u32>,

    /// Override the instruction address range, "<lo>:<hi>" in hex
    #[arg(long)]
    instr_range: Option<String>,
    /// Override the data address range, "<lo>:<hi>" in hex
    #[arg(long)]
    data_range: Option<String>,

    /// Print the resolved cache geometries and exit without reading a trace
    #[arg(long)]
    dump_geometry: bool,
}

fn parse_range(spec: &str) -> Result<AddressRange, ConfigError> {
    let (lo, hi) = spec
        .split_once(':')
        .ok_or_else(|| ConfigError::BadRange(format!("'{spec}' must be '<lo>:<hi>'")))?;
    let lo = u32::from_str_radix(lo.trim_start_matches("0x"), 16)
        .map_err(|_| ConfigError::BadRange(format!("'{lo}' is not a hex address")))?;
    let hi = u32::from_str_radix(hi.trim_start_matches("0x"), 16)
        .map_err(|_| ConfigError::BadRange(format!("'{hi}' is not a hex address")))?;
    Ok(AddressRange { lo, hi })
}

/// Seconds-resolution suffix used for the log file name. A single run only
/// needs uniqueness across invocations, not a calendar timestamp, so no
/// date/time crate is pulled in for it.
fn timestamp_suffix() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

fn build_config(args: &Args) -> Result<Config, SimError> {
    let mode = StatsMode::from_arg(args.mode)
        .ok_or_else(|| ConfigError::InvalidMode(args.mode.to_string()))?;

    let instr_geometry = (
        args.i_line.unwrap_or(DEFAULT_INSTR_GEOMETRY.0),
        args.i_sets.unwrap_or(DEFAULT_INSTR_GEOMETRY.1),
        args.i_ways.unwrap_or(DEFAULT_INSTR_GEOMETRY.2),
    );
    let data_geometry = (
        args.d_line.unwrap_or(DEFAULT_DATA_GEOMETRY.0),
        args.d_sets.unwrap_or(DEFAULT_DATA_GEOMETRY.1),
        args.d_ways.unwrap_or(DEFAULT_DATA_GEOMETRY.2),
    );

    let instr_range = match &args.instr_range {
        Some(s) => parse_range(s)?,
        None => DEFAULT_INSTR_RANGE,
    };
    let data_range = match &args.data_range {
        Some(s) => parse_range(s)?,
        None => DEFAULT_DATA_RANGE,
    };

    Ok(Config::new(instr_geometry, data_geometry, instr_range, data_range, mode)?)
}

fn run(args: Args) -> Result<(), SimError> {
    let config = build_config(&args)?;

    if args.dump_geometry {
        println!("instruction: {:?}", config.instr_geometry);
        println!("data: {:?}", config.data_geometry);
        return Ok(());
    }

    let trace_file = File::open(&args.trace_path)
        .map_err(|source| SimError::TraceOpen { path: args.trace_path.display().to_string(), source })?;
    let mut trace = TraceReader::new(BufReader::new(trace_file));

    let log_path = args.log_dir.join(format!("log_{}.log", timestamp_suffix()));
    let log_file = File::create(&log_path)
        .map_err(|source| SimError::LogOpen { path: log_path.display().to_string(), source })?;

    let mut sim = Simulator::new(&config, BufWriter::new(log_file));
    sim.run(&mut trace)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
