//! CLI support for the `aql` binary
//!
//! Provides programmatic access to the CLI commands so other tools can embed
//! them without spawning a process.

mod check;

pub use check::{CheckOptions, CheckResult, execute_check, execute_tokens};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Tokenizer or parser error
    #[error("error[{}]: {} ({})", .0.code(), .0, .0.translation_key())]
    Query(#[from] crate::AqlError),

    /// JSON parsing error
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No input provided
    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    /// Input is neither an array nor an object
    #[error("Input must be a JSON array of records or a single record object, got {0}")]
    NotRecords(&'static str),

    /// `--context` is not a JSON object
    #[error("Context must be a JSON object mapping \"name()\" to a value")]
    InvalidContext,
}
