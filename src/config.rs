// src/config.rs
//! Analysis profiles
//!
//! A profile is a YAML document describing which page to open, which
//! sections to look for, which phrases identify each language and which
//! style and layout checks to run. [`AnalysisProfile::default`] reproduces
//! the checks run against the DORIKO homepage.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::inspector::LaunchConfig;
use crate::models::{Language, PhraseSet, SectionQuery, Severity};

/// Malformed configuration, reported before any page is touched
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Section query '{0}' has no selectors")]
    EmptyQuery(String),

    #[error("Section query '{0}' contains a blank selector")]
    EmptySelector(String),

    #[error("Threshold for '{label}' must be at least 1, got {value}")]
    InvalidThreshold { label: String, value: usize },

    #[error("Sample cap for '{0}' must be at least 1")]
    InvalidSampleCap(String),

    #[error("Tolerance for '{label}' must be a non-negative number, got {value}")]
    InvalidTolerance { label: String, value: f64 },

    #[error("Toggle '{0}' has a blank control label")]
    EmptyControlLabel(String),

    #[error("{0} phrase set is empty")]
    EmptyPhraseSet(Language),

    #[error("{0} phrase set contains an empty phrase")]
    EmptyPhrase(Language),

    #[error("Expected a {expected} phrase set, got {found}")]
    MislabeledPhraseSet { expected: Language, found: Language },

    #[error("Invalid target URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to parse profile: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Failed to read profile {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Browser window size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Literal phrases per language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseConfig {
    pub english: Vec<String>,
    pub korean: Vec<String>,
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            english: strings(&["20 Years of Excellence", "20 years of excellence", "20 Years", "20 years"]),
            korean: strings(&["20년의 우수성", "20년", "20 년", "이십년", "이십 년"]),
        }
    }
}

/// Distinct-value check for one style property over one set of elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleCheck {
    #[serde(flatten)]
    pub query: SectionQuery,

    /// CSS property name, e.g. `background-color`
    pub property: String,

    /// Most distinct values tolerated before warning
    pub threshold: usize,

    /// Elements sampled at most
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,

    /// Values that do not count, such as a transparent background
    #[serde(default)]
    pub ignore_values: Vec<String>,
}

impl StyleCheck {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.query.validate()?;
        if self.threshold == 0 {
            return Err(ConfigError::InvalidThreshold {
                label: self.query.label.clone(),
                value: self.threshold,
            });
        }
        if self.max_samples == 0 {
            return Err(ConfigError::InvalidSampleCap(self.query.label.clone()));
        }
        Ok(())
    }
}

/// Size agreement check for repeated boxes such as cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutCheck {
    #[serde(flatten)]
    pub query: SectionQuery,

    /// Largest tolerated difference between the widest and narrowest box (px)
    #[serde(default = "default_tolerance")]
    pub tolerance_px: f64,

    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

impl LayoutCheck {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.query.validate()?;
        if !self.tolerance_px.is_finite() || self.tolerance_px < 0.0 {
            return Err(ConfigError::InvalidTolerance {
                label: self.query.label.clone(),
                value: self.tolerance_px,
            });
        }
        if self.max_samples == 0 {
            return Err(ConfigError::InvalidSampleCap(self.query.label.clone()));
        }
        Ok(())
    }
}

/// Where the language controls are and what to watch when clicking them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleConfig {
    /// Locates the language controls
    pub controls: SectionQuery,

    /// Candidates that count as controls when their visible text is a label below
    #[serde(default = "default_text_scope")]
    pub text_scope: SectionQuery,

    /// Control labels such as "KR" or "English", compared case-insensitively to the trimmed text
    #[serde(default = "default_text_matches")]
    pub text_matches: Vec<String>,

    /// Section whose language is compared before and after each click
    pub target: SectionQuery,

    #[serde(default = "default_max_toggles")]
    pub max_toggles: usize,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            controls: query(
                "Language toggle",
                &[
                    "[data-lang='ko']",
                    "[data-lang='kr']",
                    ".lang-ko",
                    ".lang-kr",
                    "[data-lang='en']",
                    ".lang-en",
                    ".lang-toggle",
                    ".lang-btn",
                ],
            )
            .merged(),
            text_scope: default_text_scope(),
            text_matches: default_text_matches(),
            target: query("Timeline", &[".timeline", ".about", ".hero"]),
            max_toggles: default_max_toggles(),
        }
    }
}

impl ToggleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.controls.validate()?;
        self.text_scope.validate()?;
        self.target.validate()?;
        if self.text_matches.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::EmptyControlLabel(self.controls.label.clone()));
        }
        if self.max_toggles == 0 {
            return Err(ConfigError::InvalidSampleCap(self.controls.label.clone()));
        }
        Ok(())
    }

    /// True if `text` is one of the configured control labels
    pub fn is_control_label(&self, text: &str) -> bool {
        let text = text.trim();
        self.text_matches.iter().any(|m| m.trim().eq_ignore_ascii_case(text))
    }
}

/// Screenshot output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    pub dir: PathBuf,

    #[serde(default = "default_true")]
    pub full_page: bool,
}

impl ScreenshotConfig {
    /// PNG path in `dir` named after `stem`, with anything but letters and digits replaced by `_`
    pub fn file_for(&self, stem: &str) -> PathBuf {
        let slug: String = stem
            .chars()
            .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        self.dir.join(format!("{}.png", slug))
    }
}

/// Complete analysis profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisProfile {
    pub name: String,

    pub target_url: String,

    #[serde(default)]
    pub viewport: ViewportSize,

    /// Delay after navigation and after each click (ms)
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default)]
    pub chrome_path: Option<String>,

    #[serde(default)]
    pub phrases: PhraseConfig,

    /// Language every section should be in; other languages are flagged
    #[serde(default)]
    pub expected_language: Option<Language>,

    #[serde(default = "default_sections")]
    pub sections: Vec<SectionQuery>,

    #[serde(default = "default_style_checks")]
    pub style_checks: Vec<StyleCheck>,

    #[serde(default = "default_layout_checks")]
    pub layout_checks: Vec<LayoutCheck>,

    #[serde(default)]
    pub language_toggle: Option<ToggleConfig>,

    #[serde(default = "default_true")]
    pub check_overflow: bool,

    #[serde(default)]
    pub screenshots: Option<ScreenshotConfig>,

    /// Lowest severity that fails the run
    #[serde(default = "default_fail_on")]
    pub fail_on: Severity,
}

impl Default for AnalysisProfile {
    fn default() -> Self {
        Self {
            name: "doriko".to_string(),
            target_url: "http://localhost:8000/doriko-premium-blue.html".to_string(),
            viewport: ViewportSize::default(),
            settle_ms: default_settle_ms(),
            headless: true,
            chrome_path: None,
            phrases: PhraseConfig::default(),
            expected_language: None,
            sections: default_sections(),
            style_checks: default_style_checks(),
            layout_checks: default_layout_checks(),
            language_toggle: Some(ToggleConfig::default()),
            check_overflow: true,
            screenshots: Some(ScreenshotConfig {
                dir: PathBuf::from("screenshots"),
                full_page: true,
            }),
            fail_on: default_fail_on(),
        }
    }
}

impl AnalysisProfile {
    /// Load a profile from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content)
    }

    /// Parse a profile from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validate every query, threshold and phrase set
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.target_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.target_url.clone(),
            reason: e.to_string(),
        })?;

        self.phrase_sets()?;

        for section in &self.sections {
            section.validate()?;
        }
        for check in &self.style_checks {
            check.validate()?;
        }
        for check in &self.layout_checks {
            check.validate()?;
        }
        if let Some(ref toggle) = self.language_toggle {
            toggle.validate()?;
        }

        Ok(())
    }

    /// English and Korean phrase sets
    pub fn phrase_sets(&self) -> Result<(PhraseSet, PhraseSet), ConfigError> {
        Ok((
            PhraseSet::new(Language::English, self.phrases.english.iter().cloned())?,
            PhraseSet::new(Language::Korean, self.phrases.korean.iter().cloned())?,
        ))
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn launch_config(&self) -> LaunchConfig {
        LaunchConfig {
            headless: self.headless,
            window_size: (self.viewport.width, self.viewport.height),
            settle: self.settle(),
            chrome_path: self.chrome_path.clone(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn query(label: &str, selectors: &[&str]) -> SectionQuery {
    SectionQuery {
        label: label.to_string(),
        selectors: strings(selectors),
        merge: false,
    }
}

fn default_true() -> bool {
    true
}

fn default_settle_ms() -> u64 {
    3000
}

fn default_max_samples() -> usize {
    10
}

fn default_tolerance() -> f64 {
    1.0
}

fn default_max_toggles() -> usize {
    4
}

fn default_text_scope() -> SectionQuery {
    query("Labelled controls", &["button", "a"]).merged()
}

fn default_text_matches() -> Vec<String> {
    strings(&["KR", "EN", "한국어", "English"])
}

fn default_fail_on() -> Severity {
    Severity::Error
}

fn default_sections() -> Vec<SectionQuery> {
    vec![
        query("Hero Section", &[".hero"]),
        query("About Section", &[".about"]),
        query("Timeline Section", &[".timeline"]),
        query("History Section", &[".history"]),
        query("Company Info", &[".company-info"]),
        query("Introduction", &[".intro"]),
        query("Headings", &["h1, h2, h3"]),
        query("Badge/Tag elements", &[".badge"]),
        query("Highlight sections", &[".highlight"]),
    ]
}

fn default_style_checks() -> Vec<StyleCheck> {
    vec![
        StyleCheck {
            query: query("Section backgrounds", &["section", ".section", ".container"]).merged(),
            property: "background-color".to_string(),
            threshold: 5,
            max_samples: default_max_samples(),
            ignore_values: strings(&["rgba(0, 0, 0, 0)"]),
        },
        StyleCheck {
            query: query("Buttons", &["button", ".btn", ".button"]).merged(),
            property: "background-color".to_string(),
            threshold: 3,
            max_samples: default_max_samples(),
            ignore_values: Vec::new(),
        },
        StyleCheck {
            query: query("Heading typography", &["h1, h2, h3, h4"]),
            property: "font-family".to_string(),
            threshold: 2,
            max_samples: default_max_samples(),
            ignore_values: Vec::new(),
        },
    ]
}

fn default_layout_checks() -> Vec<LayoutCheck> {
    vec![
        LayoutCheck {
            query: query("Timeline boxes", &[".timeline-item"]),
            tolerance_px: default_tolerance(),
            max_samples: default_max_samples(),
        },
        LayoutCheck {
            query: query("Organization boxes", &[".org-box"]),
            tolerance_px: default_tolerance(),
            max_samples: default_max_samples(),
        },
        LayoutCheck {
            query: query("Owner cards", &[".owner-card"]),
            tolerance_px: default_tolerance(),
            max_samples: default_max_samples(),
        },
    ]
}
