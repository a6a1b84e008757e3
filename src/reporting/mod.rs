// src/reporting/mod.rs
//! Reporting
//!
//! The analysis pass only produces a flat list of findings. Reporters turn
//! that list into something a person or a pipeline can read, and the gate
//! decides whether the run should fail.

pub mod console;
pub mod gate;
pub mod json;

pub use console::ConsoleReporter;
pub use gate::{Gate, GateVerdict};
pub use json::{JsonReport, JsonReporter};

use anyhow::Result;

use crate::models::{Finding, Severity};

/// Consumer of the findings of one run
pub trait Reporter {
    fn report(&mut self, findings: &[Finding]) -> Result<()>;
}

/// Finding counts per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Summary {
    pub info: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl Summary {
    pub fn of(findings: &[Finding]) -> Self {
        findings.iter().fold(Self::default(), |mut acc, f| {
            match f.severity {
                Severity::Info => acc.info += 1,
                Severity::Warning => acc.warnings += 1,
                Severity::Error => acc.errors += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.info + self.warnings + self.errors
    }
}
