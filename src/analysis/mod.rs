//! The `errstringcheck` rule.
//!
//! For every `fmt.Errorf` call that formats an error, the template must end
//! with `": %v"` or `": %w"` (only `": %w"` under the wrap-only policy).
//!
//! The scan runs in two stages:
//!
//! 1. [`scanner`] walks every instruction of every source function and yields
//!    static calls to `fmt.Errorf` with the expected lowered arity.
//! 2. [`validator`] recovers the call's syntactic arguments, decides whether
//!    any of them carries an error, and checks the template's trailing verb.
//!
//! Unanalyzable call sites are skipped silently; the scan never fails.

pub mod scanner;
pub mod validator;
pub mod verbs;

pub use scanner::CallSite;
pub use validator::{ArgClass, SkipReason, Verdict};
pub use verbs::{trailing_verb, Policy, Verb};

use crate::ir::{
    AnalysisInput, ErrorCapability, Function, Location, Package, Pos, SyntaxIndex, TypeInfo,
    TypeTable,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, debug_span, warn};

pub const RULE_NAME: &str = "errstringcheck";

/// Read-only view of one package for the duration of a scan.
pub struct Pass<'a> {
    package: &'a Package,
    /// One index per file of `package`, same order.
    indexes: Vec<SyntaxIndex<'a>>,
}

impl<'a> Pass<'a> {
    pub fn new(package: &'a Package) -> Self {
        let indexes = package
            .files
            .iter()
            .map(|file| SyntaxIndex::build(&file.exprs))
            .collect();
        Self { package, indexes }
    }

    pub fn package(&self) -> &'a Package {
        self.package
    }

    pub fn types(&self) -> &'a TypeTable {
        &self.package.types
    }

    pub fn type_info(&self) -> &'a TypeInfo {
        &self.package.type_info
    }

    /// Syntax index of the file containing `pos`.
    pub fn syntax_at(&self, pos: Pos) -> Option<&SyntaxIndex<'a>> {
        self.package
            .files
            .iter()
            .position(|file| file.contains(pos))
            .and_then(|index| self.indexes.get(index))
    }

    pub fn location(&self, pos: Pos) -> Option<Location> {
        self.package.location(pos)
    }
}

/// A reported violation, anchored at the call instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule: String,
    pub pos: Pos,
    pub location: Option<Location>,
    pub package: String,
    pub function: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {}", location, self.message),
            None => write!(f, "{}:@{}: {}", self.package, self.pos, self.message),
        }
    }
}

/// Outcome of scanning one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReport {
    pub package: String,
    pub functions: usize,
    pub call_sites: usize,
    pub skipped: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl PackageReport {
    fn absorb(&mut self, outcome: FunctionOutcome) {
        self.functions += 1;
        self.call_sites += outcome.call_sites;
        self.skipped += outcome.skipped;
        self.diagnostics.extend(outcome.diagnostics);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub packages: usize,
    pub functions: usize,
    pub call_sites: usize,
    pub skipped: usize,
    pub reported: usize,
}

/// Outcome of a whole run, diagnostics in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub policy: Policy,
    pub summary: CheckSummary,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[derive(Debug, Default)]
struct FunctionOutcome {
    call_sites: usize,
    skipped: usize,
    diagnostics: Vec<Diagnostic>,
}

/// The configured rule. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    policy: Policy,
    capability: ErrorCapability,
    jobs: Option<usize>,
}

impl Analyzer {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            capability: ErrorCapability::new(),
            jobs: None,
        }
    }

    /// Scan functions on `jobs` worker threads. Diagnostics keep the
    /// sequential discovery order.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs.filter(|&jobs| jobs > 1);
        self
    }

    pub fn analyze(&self, input: &AnalysisInput) -> CheckReport {
        let mut report = CheckReport {
            policy: self.policy,
            ..Default::default()
        };
        let pool = self.thread_pool();
        for package in &input.packages {
            let package_report = self.scan_package(package, pool.as_ref());
            report.summary.packages += 1;
            report.summary.functions += package_report.functions;
            report.summary.call_sites += package_report.call_sites;
            report.summary.skipped += package_report.skipped;
            report.diagnostics.extend(package_report.diagnostics);
        }
        report.summary.reported = report.diagnostics.len();
        report
    }

    pub fn analyze_package(&self, package: &Package) -> PackageReport {
        self.scan_package(package, self.thread_pool().as_ref())
    }

    /// Worker pool shared by every package of a run, `None` when scanning
    /// sequentially.
    fn thread_pool(&self) -> Option<rayon::ThreadPool> {
        let jobs = self.jobs?;
        match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!("Failed to build thread pool ({}), scanning sequentially", e);
                None
            }
        }
    }

    fn scan_package(&self, package: &Package, pool: Option<&rayon::ThreadPool>) -> PackageReport {
        let _span = debug_span!("package", path = %package.path).entered();
        let pass = Pass::new(package);
        let mut report = PackageReport {
            package: package.path.clone(),
            ..Default::default()
        };

        match pool {
            Some(pool) => {
                for outcome in self.scan_parallel(&pass, pool) {
                    report.absorb(outcome);
                }
            }
            None => {
                for function in package.source_functions() {
                    report.absorb(self.scan_function(&pass, function));
                }
            }
        }

        debug!(
            call_sites = report.call_sites,
            skipped = report.skipped,
            reported = report.diagnostics.len(),
            "package scanned"
        );
        report
    }

    fn scan_parallel(&self, pass: &Pass<'_>, pool: &rayon::ThreadPool) -> Vec<FunctionOutcome> {
        use rayon::prelude::*;

        let functions: Vec<&Function> = pass.package().source_functions().collect();
        pool.install(|| {
            functions
                .par_iter()
                .map(|function| self.scan_function(pass, function))
                .collect()
        })
    }

    fn scan_function(&self, pass: &Pass<'_>, function: &Function) -> FunctionOutcome {
        let mut outcome = FunctionOutcome::default();
        for site in scanner::function_call_sites(function) {
            outcome.call_sites += 1;
            match validator::evaluate(pass, &self.capability, self.policy, &site) {
                Verdict::Rejected(class) => {
                    debug!(function = %function.name, pos = %site.call.pos, ?class, "reported");
                    outcome.diagnostics.push(self.diagnostic(pass, &site));
                }
                Verdict::Skipped(reason) => {
                    debug!(function = %function.name, pos = %site.call.pos, ?reason, "skipped");
                    outcome.skipped += 1;
                }
                Verdict::Accepted(_) | Verdict::NoErrorArgument => {}
            }
        }
        outcome
    }

    fn diagnostic(&self, pass: &Pass<'_>, site: &CallSite<'_>) -> Diagnostic {
        Diagnostic {
            rule: RULE_NAME.to_string(),
            pos: site.call.pos,
            location: pass.location(site.call.pos),
            package: pass.package().path.clone(),
            function: site.function.name.clone(),
            message: self.policy.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{Arg, PackageBuilder};
    use pretty_assertions::assert_eq;

    fn package() -> Package {
        PackageBuilder::new("errorf")
            .errorf("err: %v", [Arg::Error("err")])
            .errorf("err=%v", [Arg::Error("err")])
            .func("helper")
            .errorf("err: %w", [Arg::Error("err")])
            .errorf("this is message", [])
            .build()
    }

    #[test]
    fn test_package_report_counts() {
        let report = Analyzer::new(Policy::PERMISSIVE).analyze_package(&package());
        assert_eq!(report.functions, 2);
        assert_eq!(report.call_sites, 4);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.diagnostics.len(), 1);

        let diag = &report.diagnostics[0];
        assert_eq!(diag.function, "main");
        assert_eq!(diag.rule, RULE_NAME);
        assert_eq!(
            diag.to_string(),
            r#"errorf/errorf.go:5:12: invalid format for fmt.Errorf. Use "...: %v" or "...: %w" to format errors"#
        );
    }

    #[test]
    fn test_wrap_only_reports_display_verb() {
        let report = Analyzer::new(Policy::WRAP_ONLY).analyze_package(&package());
        let lines: Vec<_> = report
            .diagnostics
            .iter()
            .map(|d| d.location.as_ref().map(|l| l.line))
            .collect();
        assert_eq!(lines, vec![Some(4), Some(5)]);
        assert!(report
            .diagnostics
            .iter()
            .all(|d| d.message == Policy::WRAP_ONLY.message()));
    }

    #[test]
    fn test_parallel_scan_matches_sequential() {
        let mut builder = PackageBuilder::new("errorf");
        for i in 0..16 {
            builder = builder
                .func(if i % 2 == 0 { "even" } else { "odd" })
                .errorf("err=%v", [Arg::Error("err")])
                .errorf("err: %v", [Arg::Error("err")]);
        }
        let input = AnalysisInput {
            packages: vec![builder.build()],
        };

        let sequential = Analyzer::new(Policy::WRAP_ONLY).analyze(&input);
        let parallel = Analyzer::new(Policy::WRAP_ONLY)
            .with_jobs(Some(4))
            .analyze(&input);
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.summary.reported, 32);
    }

    #[test]
    fn test_parallel_scan_over_several_packages() {
        let input = AnalysisInput {
            packages: vec![package(), package(), package()],
        };
        let sequential = Analyzer::new(Policy::PERMISSIVE).analyze(&input);
        let parallel = Analyzer::new(Policy::PERMISSIVE)
            .with_jobs(Some(2))
            .analyze(&input);
        assert_eq!(sequential, parallel);
        assert_eq!(parallel.summary.packages, 3);
        assert_eq!(parallel.summary.reported, 3);
    }

    #[test]
    fn test_inconsistent_line_table_still_reports() {
        let mut package = PackageBuilder::new("errorf")
            .errorf("err=%v", [Arg::Error("err")])
            .build();
        package.files[0].line_starts = vec![1000];

        let report = Analyzer::new(Policy::PERMISSIVE).analyze_package(&package);
        assert_eq!(report.diagnostics.len(), 1);
        let diag = &report.diagnostics[0];
        assert_eq!(diag.location, None);
        assert!(diag.to_string().starts_with(&format!("errorf:@{}: ", diag.pos)));
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let input = AnalysisInput {
            packages: vec![package(), package()],
        };
        let analyzer = Analyzer::new(Policy::PERMISSIVE);
        let first = analyzer.analyze(&input);
        let second = analyzer.analyze(&input);
        assert_eq!(first, second);
        assert_eq!(first.summary.packages, 2);
        assert_eq!(first.summary.reported, 2);
        assert!(!first.is_clean());
    }

    #[test]
    fn test_empty_input_is_clean() {
        let report = Analyzer::default().analyze(&AnalysisInput::default());
        assert!(report.is_clean());
        assert_eq!(report.summary, CheckSummary::default());
    }

    #[test]
    fn test_diagnostic_without_location_uses_offset() {
        let diag = Diagnostic {
            rule: RULE_NAME.into(),
            pos: Pos(42),
            location: None,
            package: "errorf".into(),
            function: "main".into(),
            message: Policy::PERMISSIVE.message().into(),
        };
        assert!(diag.to_string().starts_with("errorf:@42: invalid format"));
    }
}
