use crate::analysis::{CheckReport, Diagnostic};
use colored::*;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Terminal,
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &CheckReport) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &CheckReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// One `file:line:col: message` line per diagnostic, then a summary.
pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_diagnostic(&mut self, diagnostic: &Diagnostic) -> anyhow::Result<()> {
        let location = match &diagnostic.location {
            Some(location) => location.to_string(),
            None => format!("{}:@{}", diagnostic.package, diagnostic.pos),
        };
        writeln!(
            self.writer,
            "{}: {}",
            location.bold(),
            diagnostic.message.yellow()
        )?;
        Ok(())
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &CheckReport) -> anyhow::Result<()> {
        for diagnostic in &report.diagnostics {
            self.write_diagnostic(diagnostic)?;
        }

        let summary = &report.summary;
        let status = if report.is_clean() {
            "ok".green()
        } else {
            format!("{} issue(s)", summary.reported).red()
        };
        writeln!(
            self.writer,
            "{} {} package(s), {} function(s), {} Errorf call(s), {} skipped: {}",
            "errstringcheck:".bold(),
            summary.packages,
            summary.functions,
            summary.call_sites,
            summary.skipped,
            status
        )?;
        self.writer.flush()?;
        Ok(())
    }
}

pub fn create_writer<'w>(
    format: OutputFormat,
    writer: Box<dyn Write + 'w>,
) -> Box<dyn OutputWriter + 'w> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer)),
    }
}
