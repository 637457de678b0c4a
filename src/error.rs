//! Error types. Only conditions that abort a run are `SimError`; routing
//! failures and benign invalidation misses are continuable and are logged
//! via `log::warn!` instead (see [`crate::dispatcher`]).

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be a power of two, got {value}")]
    NotPowerOfTwo { field: &'static str, value: u32 },

    #[error("instruction range {instr_lo:#x}..={instr_hi:#x} overlaps data range {data_lo:#x}..={data_hi:#x}")]
    OverlappingRanges { instr_lo: u32, instr_hi: u32, data_lo: u32, data_hi: u32 },

    #[error("mode must be 1 or 2, got {0}")]
    InvalidMode(String),

    #[error("invalid address range: {0}")]
    BadRange(String),
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("could not open trace file {path}: {source}")]
    TraceOpen { path: String, source: io::Error },

    #[error("could not open log file {path}: {source}")]
    LogOpen { path: String, source: io::Error },

    #[error("malformed trace line {line}: {reason}")]
    TraceParse { line: usize, reason: String },

    #[error("unknown command {command} at trace line {line}")]
    UnknownCommand { command: i64, line: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
