// Export modules for library usage
pub mod analysis;
pub mod cli;
pub mod config;
pub mod errors;
pub mod io;
pub mod ir;
pub mod testkit;

// Re-export commonly used types
pub use crate::analysis::{
    trailing_verb, Analyzer, ArgClass, CallSite, CheckReport, CheckSummary, Diagnostic,
    PackageReport, Pass, Policy, SkipReason, Verb, Verdict, RULE_NAME,
};

pub use crate::config::{load_config, load_config_from, CheckConfig, CONFIG_FILE_NAME};

pub use crate::errors::CheckError;

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};

pub use crate::ir::{AnalysisInput, ErrorCapability, Package};
