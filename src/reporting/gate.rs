// src/reporting/gate.rs
//! Pass/fail decision for CI

use crate::models::{Finding, Severity};

/// Fails a run when any finding reaches `fail_on`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    pub fail_on: Severity,
}

/// Outcome of [`Gate::evaluate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateVerdict {
    pub passed: bool,

    /// Findings at or above the failing severity
    pub failing: usize,
}

impl GateVerdict {
    pub fn exit_code(&self) -> i32 {
        if self.passed {
            0
        } else {
            1
        }
    }
}

impl Gate {
    pub fn new(fail_on: Severity) -> Self {
        Self { fail_on }
    }

    pub fn evaluate(&self, findings: &[Finding]) -> GateVerdict {
        let failing = findings.iter().filter(|f| f.severity >= self.fail_on).count();
        GateVerdict {
            passed: failing == 0,
            failing,
        }
    }
}
