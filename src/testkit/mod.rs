//! Testing infrastructure: builders for analysis input.
//!
//! Real input comes from a front end that type-checks and lowers source
//! code. Tests construct the same structures directly:
//!
//! ```rust
//! use errstringcheck::testkit::{Arg, PackageBuilder};
//! use errstringcheck::{Analyzer, Policy};
//!
//! let package = PackageBuilder::new("errorf")
//!     .errorf("open config: %w", [Arg::Error("err")])
//!     .errorf("open config=%v", [Arg::Error("err")])
//!     .build();
//!
//! let report = Analyzer::new(Policy::default()).analyze_package(&package);
//! assert_eq!(report.diagnostics.len(), 1);
//! ```

pub mod builder;

pub use builder::{Arg, PackageBuilder};
