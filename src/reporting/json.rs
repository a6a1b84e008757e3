// src/reporting/json.rs
//! JSON report for pipelines and archiving

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::{Reporter, Summary};
use crate::models::Finding;

/// Serialized form of one run
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    pub tool: &'static str,
    pub version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub target: &'a str,
    pub summary: Summary,
    pub findings: &'a [Finding],
}

impl<'a> JsonReport<'a> {
    pub fn new(target: &'a str, findings: &'a [Finding]) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            generated_at: Utc::now(),
            target,
            summary: Summary::of(findings),
            findings,
        }
    }
}

/// Writes a pretty-printed [`JsonReport`]
pub struct JsonReporter<W: Write> {
    out: W,
    target: String,
}

impl JsonReporter<File> {
    pub fn create<P: AsRef<Path>>(path: P, target: impl Into<String>) -> Result<Self> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create JSON report {:?}", path.as_ref()))?;
        Ok(Self::new(file, target))
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W, target: impl Into<String>) -> Self {
        Self {
            out,
            target: target.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, findings: &[Finding]) -> Result<()> {
        let report = JsonReport::new(&self.target, findings);
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize JSON report")?;
        self.out.write_all(json.as_bytes()).context("Failed to write JSON report")?;
        self.out.flush()?;
        Ok(())
    }
}
