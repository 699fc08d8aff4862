use anyhow::{Context, Result};
use clap::Parser;
use errstringcheck::cli::Cli;
use errstringcheck::config::{self, CheckConfig};
use errstringcheck::io::output::create_writer;
use errstringcheck::ir::AnalysisInput;
use errstringcheck::{Analyzer, CheckError, CheckReport};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Exit status when diagnostics were reported.
const EXIT_DIAGNOSTICS: u8 = 3;

// Main orchestrator function
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    match run(cli) {
        Ok(report) if report.is_clean() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(EXIT_DIAGNOSTICS),
        Err(e) => {
            eprintln!("errstringcheck: {:#}", e);
            if let Some(hint) = e.downcast_ref::<CheckError>().and_then(fix_hint) {
                eprintln!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn fix_hint(err: &CheckError) -> Option<String> {
    err.is_user_fixable()
        .then(|| format!("hint: check that {} exists and is well-formed", err.path().display()))
}

fn run(cli: Cli) -> Result<CheckReport> {
    let config = resolve_config(&cli)?;
    let input = load_inputs(&cli)?;

    let analyzer = Analyzer::new(config.policy()).with_jobs(config.parallelism());
    let report = analyzer.analyze(&input);

    write_report(&cli, &report)?;
    Ok(report)
}

// CLI flags take precedence over the config file
fn resolve_config(cli: &Cli) -> Result<CheckConfig> {
    let config = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config(),
    };
    Ok(config.with_overrides(cli.wraponly, cli.jobs))
}

fn load_inputs(cli: &Cli) -> Result<AnalysisInput> {
    let mut merged = AnalysisInput::default();
    for path in &cli.inputs {
        let input = AnalysisInput::load(path)?;
        tracing::info!(
            path = %path.display(),
            packages = input.packages.len(),
            functions = input.function_count(),
            "loaded analysis input"
        );
        merged.packages.extend(input.packages);
    }
    Ok(merged)
}

fn write_report(cli: &Cli, report: &CheckReport) -> Result<()> {
    let sink: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file {}", path.display())
        })?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = create_writer(cli.format.into(), sink);
    writer.write_report(report)
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // Config loader records arrive through the log bridge
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
