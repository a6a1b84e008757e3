// src/analysis/language.rs
//! Bilingual mismatch detection
//!
//! Text is classified by looking for literal phrases from an English and a
//! Korean phrase set. Seeing both in one section means a string was left
//! untranslated. Matching is exact substring search, so a short phrase such
//! as "20 years" also fires inside unrelated sentences; that is accepted.

use log::{debug, info, warn};

use super::prober::{SectionMatch, SelectorProber};
use super::AnalysisError;
use crate::config::{ConfigError, ScreenshotConfig, ToggleConfig};
use crate::inspector::{PageInspector, ScreenshotTarget};
use crate::models::{Finding, FindingKind, Language, LanguageState, MatchedElement, PhraseSet};

/// Classify `text` by which phrase sets occur in it
pub fn detect(text: &str, english: &PhraseSet, korean: &PhraseSet) -> LanguageState {
    match (english.any_in(text), korean.any_in(text)) {
        (true, true) => LanguageState::Mixed,
        (true, false) => LanguageState::English,
        (false, true) => LanguageState::Korean,
        (false, false) => LanguageState::Unknown,
    }
}

/// Phrase sets plus the language the page is supposed to be in
#[derive(Debug, Clone)]
pub struct BilingualDetector {
    english: PhraseSet,
    korean: PhraseSet,
    expected: Option<Language>,
}

impl BilingualDetector {
    pub fn new(english: PhraseSet, korean: PhraseSet) -> Result<Self, ConfigError> {
        for (set, language) in [(&english, Language::English), (&korean, Language::Korean)] {
            if set.language() != language {
                return Err(ConfigError::MislabeledPhraseSet {
                    expected: language,
                    found: set.language(),
                });
            }
        }
        Ok(Self {
            english,
            korean,
            expected: None,
        })
    }

    /// Also flag sections that are entirely in the other language
    pub fn expecting(mut self, language: Option<Language>) -> Self {
        self.expected = language;
        self
    }

    pub fn detect(&self, text: &str) -> LanguageState {
        detect(text, &self.english, &self.korean)
    }

    /// Combined state of every element in a section
    pub fn section_state(&self, section: &SectionMatch) -> LanguageState {
        section
            .elements
            .iter()
            .map(|el| self.detect(&el.text))
            .fold(LanguageState::Unknown, LanguageState::combine)
    }

    /// Language state of the whole document body
    pub fn check_page(&self, body_text: &str) -> Finding {
        let state = self.detect(body_text);
        let phrases = self.phrases_in(body_text);
        match state {
            LanguageState::Mixed => Finding::warning(
                FindingKind::LanguageState,
                "Page",
                format!("Both English and Korean versions present: {}", phrases.join(", ")),
            ),
            LanguageState::Unknown => Finding::info(
                FindingKind::LanguageState,
                "Page",
                "No configured phrase found in the current view",
            ),
            _ => Finding::info(
                FindingKind::LanguageState,
                "Page",
                format!("Current language appears to be {} ({})", state, phrases.join(", ")),
            ),
        }
    }

    /// Findings for one probed section. Sections without any phrase yield nothing.
    pub fn check_section(&self, section: &SectionMatch) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut state = LanguageState::Unknown;
        let mut evidence = Vec::new();

        for (i, element) in section.elements.iter().enumerate() {
            let element_state = self.detect(&element.text);
            if element_state == LanguageState::Unknown {
                continue;
            }
            debug!("[{}] element #{} reads as {}", section.label, i + 1, element_state);
            evidence.push(format!("#{} {}: {}", i + 1, element_state, preview(&element.text, 100)));
            state = state.combine(element_state);
        }

        if state == LanguageState::Unknown {
            return findings;
        }

        findings.push(Finding::info(
            FindingKind::LanguageState,
            &section.label,
            format!("{} ({})", state, evidence.join("; ")),
        ));

        if state == LanguageState::Mixed {
            findings.push(Finding::warning(
                FindingKind::MixedLanguageWarning,
                &section.label,
                format!("English and Korean phrases appear together: {}", evidence.join("; ")),
            ));
        } else if let Some(expected) = self.expected {
            if state != LanguageState::from(expected) {
                findings.push(Finding::warning(
                    FindingKind::MixedLanguageWarning,
                    &section.label,
                    format!("Expected {} but section reads as {}", expected, state),
                ));
            }
        }

        findings
    }

    fn phrases_in(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = self
            .english
            .matches_in(text)
            .into_iter()
            .map(|p| format!("'{}'", p))
            .collect();
        found.extend(self.korean.matches_in(text).into_iter().map(|p| format!("'{}'", p)));
        found
    }
}

/// Shorten text for messages without splitting a character
fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

// ============================================================================
// Language toggle
// ============================================================================

/// How a section's language changed across one click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The language changed (including from or to no recognised phrase)
    Switched { from: LanguageState, to: LanguageState },
    /// Same language before and after
    Unchanged(LanguageState),
    /// At least one of the two snapshots mixes languages
    MixedLanguage { before: LanguageState, after: LanguageState },
    /// No configured phrase before or after
    NoContent,
}

impl ToggleOutcome {
    /// Compare two independent snapshots of the same section
    pub fn between(before: LanguageState, after: LanguageState) -> Self {
        use LanguageState::*;
        match (before, after) {
            (Mixed, _) | (_, Mixed) => ToggleOutcome::MixedLanguage { before, after },
            (Unknown, Unknown) => ToggleOutcome::NoContent,
            (a, b) if a == b => ToggleOutcome::Unchanged(a),
            (from, to) => ToggleOutcome::Switched { from, to },
        }
    }

    pub fn has_mixed_language_issue(&self) -> bool {
        matches!(self, ToggleOutcome::MixedLanguage { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            ToggleOutcome::Switched { from, to } => {
                format!("Language switched from {} to {}, no mixed-language issue", from, to)
            }
            ToggleOutcome::Unchanged(state) => {
                format!("Language stayed {}, no mixed-language issue", state)
            }
            ToggleOutcome::MixedLanguage { before, after } => {
                format!("Mixed language content around toggle (before: {}, after: {})", before, after)
            }
            ToggleOutcome::NoContent => "No configured phrase visible before or after toggle".to_string(),
        }
    }
}

/// Clicks each language control and compares the target section before and after.
///
/// Every click changes the document, so the target is re-probed for each
/// snapshot. Each comparison sees exactly two independent snapshots.
pub struct LanguageToggleCheck<'a> {
    detector: &'a BilingualDetector,
    config: &'a ToggleConfig,
    screenshots: Option<&'a ScreenshotConfig>,
}

impl<'a> LanguageToggleCheck<'a> {
    pub fn new(detector: &'a BilingualDetector, config: &'a ToggleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            detector,
            config,
            screenshots: None,
        })
    }

    /// Screenshot the target after every click
    pub fn with_screenshots(mut self, screenshots: Option<&'a ScreenshotConfig>) -> Self {
        self.screenshots = screenshots;
        self
    }

    /// Append one finding per clicked control to `findings`. On error the
    /// findings of the controls already clicked stay in place.
    pub fn run(&self, page: &dyn PageInspector, findings: &mut Vec<Finding>) -> Result<(), AnalysisError> {
        let controls = self.find_controls(page)?;

        if controls.is_empty() {
            findings.push(Finding::info(
                FindingKind::LanguageToggle,
                &self.config.controls.label,
                "No language toggle control found",
            ));
            return Ok(());
        }

        info!("Testing {} language toggle control(s)", controls.len());

        for (i, control) in controls.iter().enumerate() {
            let label = control.text.trim();
            let before = self.detector.section_state(&self.snapshot(page)?);
            page.click(control.handle)?;
            page.wait_until_settled()?;
            let after_section = self.snapshot(page)?;
            let after = self.detector.section_state(&after_section);

            self.capture_target(page, &after_section, label);

            let outcome = ToggleOutcome::between(before, after);
            let message = format!("Control #{} '{}': {}", i + 1, label, outcome.describe());
            findings.push(if outcome.has_mixed_language_issue() {
                Finding::warning(FindingKind::LanguageToggle, &self.config.target.label, message)
            } else {
                Finding::info(FindingKind::LanguageToggle, &self.config.target.label, message)
            });
        }

        Ok(())
    }

    /// Controls matched by selector, then labelled candidates, without duplicates
    fn find_controls(&self, page: &dyn PageInspector) -> Result<Vec<MatchedElement>, AnalysisError> {
        let mut controls = SelectorProber::new().probe(&self.config.controls, page)?;

        if !self.config.text_matches.is_empty() {
            for candidate in SelectorProber::new().probe(&self.config.text_scope, page)? {
                if self.config.is_control_label(&candidate.text)
                    && !controls.iter().any(|c| c.handle == candidate.handle)
                {
                    debug!("Language control by label '{}'", candidate.text.trim());
                    controls.push(candidate);
                }
            }
        }

        controls.truncate(self.config.max_toggles);
        Ok(controls)
    }

    fn snapshot(&self, page: &dyn PageInspector) -> Result<SectionMatch, AnalysisError> {
        SelectorProber::new().probe_section(&self.config.target, page)
    }

    fn capture_target(&self, page: &dyn PageInspector, target: &SectionMatch, control: &str) {
        let (Some(shots), Some(first)) = (self.screenshots, target.elements.first()) else {
            return;
        };
        let path = shots.file_for(&format!("{}_after_{}_toggle", self.config.target.label, control));
        match page.screenshot(ScreenshotTarget::Element(first.handle), &path) {
            Ok(()) => info!("Saved {}", path.display()),
            Err(e) => warn!("Screenshot of {} after toggle failed: {}", self.config.target.label, e),
        }
    }
}
