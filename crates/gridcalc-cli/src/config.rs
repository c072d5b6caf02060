use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command line configuration, with environment fallbacks
#[derive(Debug, Clone, Parser)]
#[command(name = "gridcalc")]
#[command(about = "Apply cell edits to a sheet and print its values and texts")]
#[command(version)]
pub struct Config {
    /// Read edits from FILE instead of stdin
    #[arg(long, short = 'i', value_name = "FILE", env = "GRIDCALC_INPUT")]
    pub input: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "tsv", env = "GRIDCALC_FORMAT")]
    pub format: OutputFormat,

    /// Log and skip rejected edits instead of aborting
    #[arg(long, env = "GRIDCALC_KEEP_GOING")]
    pub keep_going: bool,

    /// Print a header line before each table (tsv only)
    #[arg(long, env = "GRIDCALC_HEADERS")]
    pub headers: bool,

    /// Log filter, e.g. `debug` or `gridcalc_core=trace`
    #[arg(long, value_name = "FILTER", default_value = "warn", env = "GRIDCALC_LOG")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Tsv,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: None,
            format: OutputFormat::Tsv,
            keep_going: false,
            headers: false,
            log_level: "warn".to_string(),
        }
    }
}
