use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Query applications, units, and machines from a Juju status snapshot
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Object kind to query: applications (a), units (u), or machines (m)
    pub object: String,

    /// Filter expressions, e.g. "app=nova-compute" or "hostname~ubun"
    pub filters: Vec<String>,

    /// Read the snapshot from a local JSON file instead of the cache
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Force a refresh of the cached snapshot
    #[arg(long)]
    pub refresh: bool,

    /// Maximum cache age in minutes before the snapshot is refreshed
    #[arg(long, value_name = "MINUTES", default_value_t = 5)]
    pub max_age: i64,

    /// Snapshot cache file location
    #[arg(long, value_name = "FILE", env = "JUJU_QUERY_CACHE")]
    pub cache_file: Option<PathBuf>,

    /// Select which columns to show, comma-separated
    #[arg(short, long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Output format
    #[arg(short = 'F', long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Color handling for terminal output
    #[arg(long, value_enum, default_value = "auto")]
    pub color: ColorMode,

    /// Print diagnostic information to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
