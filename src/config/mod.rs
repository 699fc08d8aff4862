//! Configuration for the check.
//!
//! Settings come from `.errstringcheck.toml`, discovered by walking up from
//! the current directory, and are overridden by command-line flags.

mod core;
mod loader;

pub use self::core::CheckConfig;
pub use loader::{
    directory_ancestors, discover_config, load_config, load_config_from, parse_config,
    CONFIG_FILE_NAME,
};
