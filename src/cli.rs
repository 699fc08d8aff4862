use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `file:line:col: message` lines followed by a summary
    Terminal,
    /// The full report as JSON
    Json,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => crate::io::output::OutputFormat::Terminal,
            OutputFormat::Json => crate::io::output::OutputFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "errstringcheck")]
#[command(
    about = "Check that fmt.Errorf templates end with \": %v\" or \": %w\" when formatting errors",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Analysis input files (JSON dumps produced by the front end)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Only accept the %w verb for formatting errors
    #[arg(long, env = "ERRSTRINGCHECK_WRAPONLY")]
    pub wraponly: bool,

    /// Configuration file (defaults to the nearest .errstringcheck.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Worker threads for scanning functions (0 or 1 scans sequentially)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Increase verbosity level (can be repeated: -v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}
