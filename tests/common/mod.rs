#![allow(dead_code)]

use errstringcheck::ir::AnalysisInput;
use errstringcheck::testkit::{Arg, PackageBuilder};
use errstringcheck::Package;
use std::fs;
use std::path::{Path, PathBuf};

pub const PERMISSIVE_MESSAGE: &str =
    r#"invalid format for fmt.Errorf. Use "...: %v" or "...: %w" to format errors"#;
pub const WRAP_ONLY_MESSAGE: &str =
    r#"invalid format for fmt.Errorf. Use "...: %w" to format errors"#;

/// Lines reported under the permissive policy.
pub const PERMISSIVE_LINES: &[u32] = &[6, 7, 8, 9, 10, 12, 13, 15, 16, 17, 18];
/// Lines reported under the wrap-only policy.
pub const WRAP_ONLY_LINES: &[u32] = &[6, 7, 8, 9, 10, 11, 12, 13, 15, 16, 17, 18, 19];

/// The `errorf` package; calls start on line 4, one per line.
pub fn errorf_package() -> Package {
    PackageBuilder::new("errorf")
        .errorf("this is message", [])
        .errorf("this is message %q", [Arg::Str("str")])
        .errorf("err=%s", [Arg::Error("err")])
        .errorf("err: %s: suffix", [Arg::Error("err")])
        .errorf("err: %s", [Arg::Error("err")])
        .errorf("err=%v", [Arg::Error("err")])
        .errorf("err: %v: suffix", [Arg::Error("err")])
        .errorf("err: %v", [Arg::Error("err")])
        .errorf("err=%w", [Arg::Error("err")])
        .errorf("err: %w: suffix", [Arg::Error("err")])
        .errorf("err: %w", [Arg::Error("err")])
        .errorf("err=%s, str=%s", [Arg::Error("err"), Arg::Str("str")])
        .errorf("err=%s", [Arg::ErrorString("err")])
        .errorf("err=%v", [Arg::ErrorString("err")])
        .errorf("err: %s", [Arg::ErrorString("err")])
        .errorf("err: %v", [Arg::ErrorString("err")])
        .build()
}

pub fn errorf_input() -> AnalysisInput {
    AnalysisInput {
        packages: vec![errorf_package()],
    }
}

/// Dump `input` as JSON into `dir` and return the file path.
pub fn write_input(dir: &Path, name: &str, input: &AnalysisInput) -> PathBuf {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(input).unwrap();
    fs::write(&path, json).unwrap();
    path
}
