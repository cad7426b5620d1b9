//! CLI argument definitions for rowkey.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use rowkey_core::Method;

use rowkey_cli::summary::DEFAULT_DUPLICATE_LIMIT;

#[derive(Parser)]
#[command(
    name = "rowkey",
    version,
    about = "Assign deterministic USER_ID values to customer CSV exports",
    long_about = "Assign deterministic USER_ID values to customer CSV exports.\n\n\
                  Detects the delimiter (comma, semicolon, tab) and the SCHEDA NUMERO /\n\
                  CODICE CLIENTE / EMAIL columns, derives a 24-character ID per row and\n\
                  writes a copy of the file with a USER_ID column appended."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Prefix pretty and compact log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Allow customer values (codes, e-mails) to appear in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate IDs and write the augmented file.
    Generate(GenerateArgs),

    /// Look up a user by USER_ID in an augmented file.
    Lookup(LookupArgs),
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Input CSV file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output CSV file (default: <INPUT stem>_with_ids.<ext>).
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Fields used to derive the ID.
    #[arg(long = "method", value_enum, default_value = "combined")]
    pub method: MethodArg,

    /// Print progress every N rows (0 disables progress output).
    #[arg(long = "progress-every", value_name = "ROWS", default_value_t = 100)]
    pub progress_every: usize,

    /// Bytes inspected when detecting the delimiter.
    #[arg(long = "sample-size", value_name = "BYTES", default_value_t = 1024)]
    pub sample_size: usize,

    /// Number of duplicate rows listed in the summary.
    #[arg(long = "show-duplicates", value_name = "N", default_value_t = DEFAULT_DUPLICATE_LIMIT)]
    pub show_duplicates: usize,

    /// Print the result as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct LookupArgs {
    /// Augmented CSV file (output of `generate`).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// USER_ID to look up.
    #[arg(value_name = "USER_ID")]
    pub user_id: String,

    /// Print the record as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

/// CLI ID method choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum MethodArg {
    /// SCHEDA NUMERO only.
    Scheda,
    /// CODICE CLIENTE only.
    Cliente,
    /// SCHEDA NUMERO + "_" + CODICE CLIENTE.
    Combined,
}

impl From<MethodArg> for Method {
    fn from(value: MethodArg) -> Self {
        match value {
            MethodArg::Scheda => Method::RecordNumberOnly,
            MethodArg::Cliente => Method::ClientCodeOnly,
            MethodArg::Combined => Method::Combined,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
