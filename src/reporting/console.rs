// src/reporting/console.rs
//! Terminal table output

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::io::Write;

use super::{Reporter, Summary};
use crate::models::{Finding, Severity};

/// Prints findings as a table followed by a one-line summary
pub struct ConsoleReporter<W: Write> {
    out: W,

    /// Hide info-level findings
    pub quiet: bool,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, quiet: false }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Info => "INFO".cyan(),
        Severity::Warning => "WARN".yellow().bold(),
        Severity::Error => "ERROR".red().bold(),
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, findings: &[Finding]) -> Result<()> {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["#", "Section", "Check", "Severity", "Message"]);

        for (i, finding) in findings.iter().enumerate() {
            if self.quiet && finding.severity == Severity::Info {
                continue;
            }
            table.add_row(vec![
                (i + 1).to_string(),
                finding.section.clone(),
                finding.kind.to_string(),
                severity_label(finding.severity).to_string(),
                finding.message.clone(),
            ]);
        }

        let summary = Summary::of(findings);
        writeln!(self.out, "{table}")?;
        writeln!(
            self.out,
            "{} {} finding(s): {} info, {} warning(s), {} error(s)",
            "Summary:".bold(),
            summary.total(),
            summary.info,
            summary.warnings.to_string().yellow(),
            summary.errors.to_string().red()
        )?;

        Ok(())
    }
}
