//! Invoicer replay CLI
//!
//! Replays a CSV file of ledger transactions against an in-memory store and
//! writes a CSV report of the resulting state.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- ledger.csv > invoices.csv
//! cargo run -- --report profiles ledger.csv > profiles.csv
//! cargo run -- --report payments --log-level debug ledger.csv > payments.csv
//! ```
//!
//! Each input row is `time,caller,tx`: the RFC 3339 block time, the base64
//! caller address and the base64 transaction bytes. Logs go to stderr so
//! stdout carries only the report.
//!
//! # Exit Codes
//!
//! - 0: Success (rejected or malformed rows do not change the exit code)
//! - 1: Error (missing arguments, file not found, report not writable, etc.)

use invoicer_engine::cli;
use invoicer_engine::core::KeySpace;
use invoicer_engine::replay;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = cli::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .with_writer(std::io::stderr)
        .init();

    let mut output = std::io::stdout();
    if let Err(e) = replay::replay(
        &args.input_file,
        args.report,
        KeySpace::new(args.app_name),
        &mut output,
    ) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
