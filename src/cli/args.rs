use crate::core::keys::APP_NAME;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay ledger transactions and report the resulting state
#[derive(Parser, Debug)]
#[command(name = "invoicer-replay")]
#[command(about = "Replay ledger transactions and report the resulting state", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing `time,caller,tx` rows
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Entity kind written to stdout once the replay finishes
    #[arg(
        long = "report",
        value_name = "KIND",
        default_value = "invoices",
        help = "Report to write: 'invoices', 'profiles' or 'payments'"
    )]
    pub report: ReportKind,

    /// Store key namespace
    #[arg(
        long = "app-name",
        value_name = "NAME",
        default_value = APP_NAME,
        help = "Application name prefixed to every store key"
    )]
    pub app_name: String,

    /// Log filter directive for stderr
    #[arg(
        long = "log-level",
        value_name = "FILTER",
        default_value = "warn",
        help = "Log filter, e.g. 'warn', 'debug' or 'invoicer_engine=trace'"
    )]
    pub log_level: String,
}

/// Reports the replay binary can write
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    Invoices,
    Profiles,
    Payments,
}
