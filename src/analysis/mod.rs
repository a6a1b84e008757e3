// src/analysis/mod.rs
//! Consistency analysis
//!
//! One pass over a quiet page: every configured query is probed first, then
//! the matched sets are handed to the language, style and layout checks. The
//! page is never re-queried by selector once the checks start, so all of
//! them see the same snapshot.

pub mod language;
pub mod layout;
pub mod prober;
pub mod style;

pub use language::{detect, BilingualDetector, LanguageToggleCheck, ToggleOutcome};
pub use prober::{SectionMatch, SelectorProber};
pub use style::{distinct_values, StyleScorer};

use log::{info, warn};
use thiserror::Error;

use crate::config::{AnalysisProfile, ConfigError};
use crate::inspector::{InspectionError, PageInspector};
use crate::models::{Finding, FindingKind, SectionQuery, Severity};

/// Errors that stop an analysis pass
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Inspection failed: {0}")]
    Inspection(#[from] InspectionError),
}

/// Findings of one pass, plus the language sections for callers that want screenshots
#[derive(Debug, Default)]
pub struct AnalysisOutcome {
    pub findings: Vec<Finding>,
    pub sections: Vec<SectionMatch>,
}

impl AnalysisOutcome {
    /// True if the pass ended with a terminal failure finding
    pub fn failed(&self) -> bool {
        self.findings
            .last()
            .map_or(false, |f| f.kind == FindingKind::AnalysisFailed)
    }
}

/// Everything probed before the checks run
struct Snapshot {
    body: SectionMatch,
    sections: Vec<SectionMatch>,
    styles: Vec<SectionMatch>,
    layouts: Vec<SectionMatch>,
}

/// Runs the configured checks against a page
pub struct ConsistencyAnalyzer {
    profile: AnalysisProfile,
    detector: BilingualDetector,
}

impl ConsistencyAnalyzer {
    /// Validate the whole profile up front
    pub fn new(profile: AnalysisProfile) -> Result<Self, ConfigError> {
        profile.validate()?;
        let (english, korean) = profile.phrase_sets()?;
        let detector = BilingualDetector::new(english, korean)?.expecting(profile.expected_language);
        Ok(Self { profile, detector })
    }

    pub fn profile(&self) -> &AnalysisProfile {
        &self.profile
    }

    pub fn detector(&self) -> &BilingualDetector {
        &self.detector
    }

    /// Run the pass. An inspection failure keeps the findings gathered so far
    /// and appends one terminal [`FindingKind::AnalysisFailed`] finding.
    pub fn run(&self, page: &dyn PageInspector) -> AnalysisOutcome {
        let mut outcome = AnalysisOutcome::default();
        if let Err(e) = self.pass(page, &mut outcome) {
            warn!("Analysis '{}' stopped early: {}", self.profile.name, e);
            outcome.findings.push(terminal_failure(&e));
        }
        outcome
    }

    /// Like [`ConsistencyAnalyzer::run`] but returns the error instead of a terminal finding
    pub fn try_run(&self, page: &dyn PageInspector) -> Result<AnalysisOutcome, AnalysisError> {
        let mut outcome = AnalysisOutcome::default();
        self.pass(page, &mut outcome)?;
        Ok(outcome)
    }

    /// Click through the configured language controls. Empty when no toggle is configured.
    /// A failed click keeps the findings of earlier controls and appends one terminal finding.
    pub fn run_toggle_check(&self, page: &dyn PageInspector) -> Vec<Finding> {
        let Some(ref toggle) = self.profile.language_toggle else {
            return Vec::new();
        };

        let mut findings = Vec::new();
        let result = LanguageToggleCheck::new(&self.detector, toggle)
            .map_err(AnalysisError::from)
            .and_then(|check| {
                check
                    .with_screenshots(self.profile.screenshots.as_ref())
                    .run(page, &mut findings)
            });

        if let Err(e) = result {
            warn!("Language toggle check stopped: {}", e);
            findings.push(terminal_failure(&e));
        }
        findings
    }

    fn pass(&self, page: &dyn PageInspector, outcome: &mut AnalysisOutcome) -> Result<(), AnalysisError> {
        info!("Starting analysis '{}'", self.profile.name);

        let snapshot = self.probe_all(page)?;

        for section in snapshot
            .sections
            .iter()
            .chain(&snapshot.styles)
            .chain(&snapshot.layouts)
        {
            outcome.findings.push(selector_match(section));
        }

        let body_text: Vec<&str> = snapshot.body.elements.iter().map(|el| el.text.as_str()).collect();
        outcome.findings.push(self.detector.check_page(&body_text.join("\n")));

        for section in &snapshot.sections {
            outcome.findings.extend(self.detector.check_section(section));
        }

        for (check, section) in self.profile.style_checks.iter().zip(&snapshot.styles) {
            outcome.findings.extend(StyleScorer::run_check(check, section)?);
        }

        for (check, section) in self.profile.layout_checks.iter().zip(&snapshot.layouts) {
            outcome.findings.extend(layout::check_boxes(check, section, page)?);
        }

        if self.profile.check_overflow {
            outcome.findings.extend(layout::check_overflow(page.viewport_metrics()?));
        }

        outcome.sections = snapshot.sections;
        info!(
            "Analysis '{}' produced {} finding(s)",
            self.profile.name,
            outcome.findings.len()
        );
        Ok(())
    }

    fn probe_all(&self, page: &dyn PageInspector) -> Result<Snapshot, AnalysisError> {
        let text_prober = SelectorProber::new();

        let body_query = SectionQuery::new("Page", ["body"])?;
        let body = text_prober.probe_section(&body_query, page)?;

        let sections = self
            .profile
            .sections
            .iter()
            .map(|query| text_prober.probe_section(query, page))
            .collect::<Result<Vec<_>, _>>()?;

        let styles = self
            .profile
            .style_checks
            .iter()
            .map(|check| {
                SelectorProber::new()
                    .capture_styles([check.property.as_str()])
                    .limit(check.max_samples)
                    .probe_section(&check.query, page)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let layouts = self
            .profile
            .layout_checks
            .iter()
            .map(|check| {
                SelectorProber::new()
                    .limit(check.max_samples)
                    .probe_section(&check.query, page)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Snapshot {
            body,
            sections,
            styles,
            layouts,
        })
    }
}

fn selector_match(section: &SectionMatch) -> Finding {
    let message = match section.selector {
        Some(ref selector) => format!("Matched {} element(s) with '{}'", section.elements.len(), selector),
        None => "No element matched any selector".to_string(),
    };
    Finding::info(FindingKind::SelectorMatch, &section.label, message)
}

fn terminal_failure(error: &AnalysisError) -> Finding {
    Finding::new(FindingKind::AnalysisFailed, "Analysis", Severity::Error, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::StaticPage;

    const PAGE: &str = r#"
        <html><body>
            <section class="hero" style="background-color: rgb(0, 51, 102)">
                <h1 style="font-family: Pretendard">DORIKO</h1>
                <p>20 Years of Excellence</p>
            </section>
            <section class="timeline" style="background-color: white">
                <h2 style="font-family: Georgia">History</h2>
                <div class="timeline-item">2004 20년의 우수성</div>
            </section>
            <section style="background-color: rgba(0, 0, 0, 0)"></section>
            <button style="background-color: red">Contact</button>
        </body></html>
    "#;

    #[test]
    fn test_default_profile_pass_over_static_page() {
        let analyzer = ConsistencyAnalyzer::new(AnalysisProfile::default()).unwrap();
        let page = StaticPage::parse(PAGE);

        let outcome = analyzer.run(&page);

        assert!(!outcome.failed());
        let page_state = outcome
            .findings
            .iter()
            .find(|f| f.kind == FindingKind::LanguageState && f.section == "Page")
            .unwrap();
        assert_eq!(page_state.severity, Severity::Warning);

        let timeline_found = outcome
            .findings
            .iter()
            .any(|f| f.kind == FindingKind::SelectorMatch && f.section == "Timeline Section" && f.message.contains("'.timeline'"));
        assert!(timeline_found);

        // two heading fonts are within the threshold of 2
        assert!(!outcome
            .findings
            .iter()
            .any(|f| f.kind == FindingKind::StyleConsistencyWarning));
    }

    #[test]
    fn test_invalid_profile_fails_at_construction() {
        let mut profile = AnalysisProfile::default();
        profile.style_checks[0].threshold = 0;
        assert!(ConsistencyAnalyzer::new(profile).is_err());
    }

    #[test]
    fn test_no_toggle_configured() {
        let profile = AnalysisProfile {
            language_toggle: None,
            ..AnalysisProfile::default()
        };
        let analyzer = ConsistencyAnalyzer::new(profile).unwrap();
        assert!(analyzer.run_toggle_check(&StaticPage::parse(PAGE)).is_empty());
    }

    #[test]
    fn test_toggle_without_controls_is_info() {
        let analyzer = ConsistencyAnalyzer::new(AnalysisProfile::default()).unwrap();
        let findings = analyzer.run_toggle_check(&StaticPage::parse(PAGE));

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::LanguageToggle);
        assert_eq!(findings[0].severity, Severity::Info);
    }
}
