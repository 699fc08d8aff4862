use serde::{Deserialize, Serialize};

use crate::analysis::Policy;

/// Root configuration, read from `.errstringcheck.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Accept only `": %w"` as the trailing verb when an error is formatted.
    pub wraponly: bool,

    /// Worker threads for scanning functions; 0 or absent scans sequentially.
    pub jobs: Option<usize>,
}

impl CheckConfig {
    /// Apply command-line overrides. A flag can only switch `wraponly` on.
    pub fn with_overrides(mut self, wraponly: bool, jobs: Option<usize>) -> Self {
        self.wraponly |= wraponly;
        if jobs.is_some() {
            self.jobs = jobs;
        }
        self
    }

    /// The immutable policy handed to the scan.
    pub fn policy(&self) -> Policy {
        Policy {
            wrap_only: self.wraponly,
        }
    }

    pub fn parallelism(&self) -> Option<usize> {
        self.jobs.filter(|&jobs| jobs > 1)
    }
}
