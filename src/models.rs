// src/models.rs
//! Data model shared by the inspectors, the analysis pass and the reporters.
//!
//! Everything here lives for one page snapshot: queries and phrase sets are
//! built from the profile, matched elements and samples are collected while
//! probing, and findings are handed to a reporter once the pass finishes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::ConfigError;
use crate::inspector::ElementHandle;

// ============================================================================
// Queries
// ============================================================================

/// An ordered list of CSS selectors for one logical page section.
///
/// Selectors are tried in order and the first one that matches anything
/// wins. With `merge` set, every selector is tried and the matches are
/// unioned in selector order instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionQuery {
    /// Human-readable section name used in findings
    pub label: String,

    /// Candidate selectors, most specific first
    pub selectors: Vec<String>,

    /// Union the matches of all selectors instead of stopping at the first hit
    #[serde(default)]
    pub merge: bool,
}

impl SectionQuery {
    /// Build a validated first-match-wins query
    pub fn new<L, I, S>(label: L, selectors: I) -> Result<Self, ConfigError>
    where
        L: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let query = Self {
            label: label.into(),
            selectors: selectors.into_iter().map(Into::into).collect(),
            merge: false,
        };
        query.validate()?;
        Ok(query)
    }

    /// Switch the query to union mode
    pub fn merged(mut self) -> Self {
        self.merge = true;
        self
    }

    /// Reject queries that could never match anything meaningful
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selectors.is_empty() {
            return Err(ConfigError::EmptyQuery(self.label.clone()));
        }
        if self.selectors.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::EmptySelector(self.label.clone()));
        }
        Ok(())
    }
}

// ============================================================================
// Matched elements and style samples
// ============================================================================

/// Computed style values captured from one element, keyed by CSS property name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSample {
    values: BTreeMap<String, String>,
}

impl StyleSample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.values.insert(property.into(), value.into());
    }

    /// Builder form of [`StyleSample::insert`]
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(property, value);
        self
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.values.get(property).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An element located by the prober, with the text and styles read from it.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedElement {
    /// Inspector-owned handle, valid only for the snapshot it came from
    pub handle: ElementHandle,

    /// Rendered text of the element
    pub text: String,

    /// Styles captured at probe time (only the properties that were asked for)
    pub style: StyleSample,
}

// ============================================================================
// Languages
// ============================================================================

/// A language the site is translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Korean,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Korean => write!(f, "Korean"),
        }
    }
}

/// Which language a piece of text appears to be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageState {
    English,
    Korean,
    Mixed,
    Unknown,
}

impl LanguageState {
    /// Fold two observations of the same section into one state.
    ///
    /// `Unknown` is the identity; two different languages make `Mixed`.
    pub fn combine(self, other: LanguageState) -> LanguageState {
        use LanguageState::*;
        match (self, other) {
            (Unknown, s) | (s, Unknown) => s,
            (Mixed, _) | (_, Mixed) => Mixed,
            (a, b) if a == b => a,
            _ => Mixed,
        }
    }

    pub fn language(self) -> Option<Language> {
        match self {
            LanguageState::English => Some(Language::English),
            LanguageState::Korean => Some(Language::Korean),
            _ => None,
        }
    }
}

impl From<Language> for LanguageState {
    fn from(language: Language) -> Self {
        match language {
            Language::English => LanguageState::English,
            Language::Korean => LanguageState::Korean,
        }
    }
}

impl fmt::Display for LanguageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageState::English => write!(f, "English"),
            LanguageState::Korean => write!(f, "Korean"),
            LanguageState::Mixed => write!(f, "Mixed"),
            LanguageState::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A fixed set of literal phrases that mark text as being in one language.
///
/// Matching is exact, case-sensitive substring search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseSet {
    language: Language,
    phrases: Vec<String>,
}

impl PhraseSet {
    pub fn new<I, S>(language: Language, phrases: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<String> = phrases.into_iter().map(Into::into).collect();
        if phrases.is_empty() {
            return Err(ConfigError::EmptyPhraseSet(language));
        }
        // An empty phrase is a substring of everything
        if phrases.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::EmptyPhrase(language));
        }
        Ok(Self { language, phrases })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// True if any phrase occurs in `text`
    pub fn any_in(&self, text: &str) -> bool {
        self.phrases.iter().any(|p| text.contains(p.as_str()))
    }

    /// Every phrase that occurs in `text`, in set order
    pub fn matches_in<'a>(&'a self, text: &str) -> Vec<&'a str> {
        self.phrases
            .iter()
            .filter(|p| text.contains(p.as_str()))
            .map(String::as_str)
            .collect()
    }
}

// ============================================================================
// Findings
// ============================================================================

/// How loud a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Which selector located a section, or that none did
    SelectorMatch,
    /// Detected language of a section or the whole page
    LanguageState,
    /// A section mixes languages or is not in the expected one
    MixedLanguageWarning,
    /// Too many distinct values of a style property
    StyleConsistencyWarning,
    /// Repeated boxes with diverging sizes
    LayoutConsistencyWarning,
    /// Document wider than the viewport
    OverflowWarning,
    /// Before/after comparison around a language control
    LanguageToggle,
    /// The pass stopped early
    AnalysisFailed,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FindingKind::SelectorMatch => "selector-match",
            FindingKind::LanguageState => "language-state",
            FindingKind::MixedLanguageWarning => "mixed-language",
            FindingKind::StyleConsistencyWarning => "style-consistency",
            FindingKind::LayoutConsistencyWarning => "layout-consistency",
            FindingKind::OverflowWarning => "overflow",
            FindingKind::LanguageToggle => "language-toggle",
            FindingKind::AnalysisFailed => "analysis-failed",
        };
        f.write_str(name)
    }
}

/// One observation from an analysis pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    /// Section label the finding is scoped to
    pub section: String,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn new(
        kind: FindingKind,
        section: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            section: section.into(),
            severity,
            message: message.into(),
        }
    }

    pub fn info(kind: FindingKind, section: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(kind, section, Severity::Info, message)
    }

    pub fn warning(kind: FindingKind, section: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(kind, section, Severity::Warning, message)
    }

    pub fn is_warning_or_worse(&self) -> bool {
        self.severity >= Severity::Warning
    }
}
