use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use sitecheck::analysis::{BilingualDetector, LanguageToggleCheck, SelectorProber};
use sitecheck::config::{LayoutCheck, ScreenshotConfig, StyleCheck, ToggleConfig};
use sitecheck::inspector::{BoxSize, ElementHandle, ScreenshotTarget, ViewportMetrics};
use sitecheck::models::{Language, PhraseSet, SectionQuery};
use sitecheck::{
    AnalysisError, AnalysisProfile, ConsistencyAnalyzer, FindingKind, InspectionError, LanguageState,
    PageInspector, Severity,
};

/// In-memory page whose elements, styles and click effects are scripted by the test
#[derive(Default)]
struct ScriptedPage {
    texts: RefCell<HashMap<u64, String>>,
    styles: HashMap<(u64, String), String>,
    boxes: HashMap<u64, BoxSize>,
    selectors: HashMap<String, Vec<u64>>,
    clicks: HashMap<u64, Vec<(u64, String)>>,
    viewport: Option<ViewportMetrics>,
    fail_viewport: bool,
    detached: HashSet<u64>,
    queried: RefCell<Vec<String>>,
    shots: RefCell<Vec<PathBuf>>,
}

impl ScriptedPage {
    fn element(mut self, id: u64, text: &str, selectors: &[&str]) -> Self {
        self.texts.borrow_mut().insert(id, text.to_string());
        for selector in selectors {
            self.selectors.entry(selector.to_string()).or_default().push(id);
        }
        self
    }

    fn style(mut self, id: u64, property: &str, value: &str) -> Self {
        self.styles.insert((id, property.to_string()), value.to_string());
        self
    }

    fn sized(mut self, id: u64, width: f64, height: f64) -> Self {
        self.boxes.insert(id, BoxSize { width, height });
        self
    }

    /// Clicking `id` replaces the text of `target`
    fn on_click(mut self, id: u64, target: u64, text: &str) -> Self {
        self.clicks.entry(id).or_default().push((target, text.to_string()));
        self
    }

    /// Clicking `id` fails as if the node had been re-rendered
    fn detach(mut self, id: u64) -> Self {
        self.detached.insert(id);
        self
    }

    fn queried(&self) -> Vec<String> {
        self.queried.borrow().clone()
    }
}

impl PageInspector for ScriptedPage {
    fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>, InspectionError> {
        self.queried.borrow_mut().push(selector.to_string());
        Ok(self
            .selectors
            .get(selector)
            .map(|ids| ids.iter().copied().map(ElementHandle::new).collect())
            .unwrap_or_default())
    }

    fn text_of(&self, element: ElementHandle) -> Result<String, InspectionError> {
        self.texts
            .borrow()
            .get(&element.id())
            .cloned()
            .ok_or(InspectionError::UnknownHandle(element.id()))
    }

    fn computed_style(&self, element: ElementHandle, property: &str) -> Result<Option<String>, InspectionError> {
        Ok(self.styles.get(&(element.id(), property.to_string())).cloned())
    }

    fn screenshot(&self, _target: ScreenshotTarget, path: &Path) -> Result<(), InspectionError> {
        self.shots.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn click(&self, element: ElementHandle) -> Result<(), InspectionError> {
        if self.detached.contains(&element.id()) {
            return Err(InspectionError::Driver("element detached".to_string()));
        }
        if let Some(effects) = self.clicks.get(&element.id()) {
            let mut texts = self.texts.borrow_mut();
            for (target, text) in effects {
                texts.insert(*target, text.clone());
            }
        }
        Ok(())
    }

    fn box_size(&self, element: ElementHandle) -> Result<Option<BoxSize>, InspectionError> {
        Ok(self.boxes.get(&element.id()).copied())
    }

    fn viewport_metrics(&self) -> Result<Option<ViewportMetrics>, InspectionError> {
        if self.fail_viewport {
            return Err(InspectionError::Driver("navigation interrupted".to_string()));
        }
        Ok(self.viewport)
    }
}

fn detector() -> BilingualDetector {
    let profile = AnalysisProfile::default();
    let (english, korean) = profile.phrase_sets().unwrap();
    BilingualDetector::new(english, korean).unwrap()
}

fn minimal_profile() -> AnalysisProfile {
    AnalysisProfile {
        sections: vec![SectionQuery::new("Timeline Section", [".timeline", ".history"]).unwrap()],
        style_checks: vec![],
        layout_checks: vec![],
        language_toggle: None,
        screenshots: None,
        ..AnalysisProfile::default()
    }
}

#[test]
fn test_first_match_never_evaluates_later_selectors() {
    let page = ScriptedPage::default()
        .element(1, "A", &[".s1"])
        .element(2, "B", &[".s2"]);
    let query = SectionQuery::new("Section", [".s1", ".s2"]).unwrap();

    let elements = SelectorProber::new().probe(&query, &page).unwrap();

    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].handle, ElementHandle::new(1));
    assert_eq!(page.queried(), vec![".s1"]);
}

#[test]
fn test_no_selector_matches_returns_empty() {
    let page = ScriptedPage::default();
    let query = SectionQuery::new("Section", [".s1", ".s2"]).unwrap();

    let elements = SelectorProber::new().probe(&query, &page).unwrap();

    assert!(elements.is_empty());
    assert_eq!(page.queried(), vec![".s1", ".s2"]);
}

#[test]
fn test_language_toggle_before_and_after_are_independent() {
    let page = ScriptedPage::default()
        .element(1, "20 Years of Excellence", &[".timeline"])
        .element(2, "KR", &["[data-lang='ko']"])
        .on_click(2, 1, "20년의 우수성");
    let detector = detector();

    let timeline = page.query_all(".timeline").unwrap()[0];
    let before = detector.detect(&page.text_of(timeline).unwrap());
    page.click(page.query_all("[data-lang='ko']").unwrap()[0]).unwrap();
    let after = detector.detect(&page.text_of(timeline).unwrap());

    assert_eq!(before, LanguageState::English);
    assert_eq!(after, LanguageState::Korean);
}

#[test]
fn test_toggle_check_reports_switch_without_mixed_issue() {
    let page = ScriptedPage::default()
        .element(1, "20 Years of Excellence", &[".timeline"])
        .element(2, "KR", &["[data-lang='ko']"])
        .on_click(2, 1, "20년의 우수성");
    let detector = detector();
    let config = ToggleConfig::default();

    let mut findings = Vec::new();
    LanguageToggleCheck::new(&detector, &config)
        .unwrap()
        .run(&page, &mut findings)
        .unwrap();

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::LanguageToggle);
    assert_eq!(findings[0].severity, Severity::Info);
    assert!(findings[0].message.contains("from English to Korean"));
    assert!(findings[0].message.contains("no mixed-language issue"));
}

#[test]
fn test_toggle_check_flags_untranslated_leftover() {
    let page = ScriptedPage::default()
        .element(1, "20 Years of Excellence", &[".timeline"])
        .element(2, "KR", &["[data-lang='ko']"])
        .on_click(2, 1, "20년의 우수성 - 20 Years");
    let detector = detector();
    let config = ToggleConfig::default();

    let mut findings = Vec::new();
    LanguageToggleCheck::new(&detector, &config)
        .unwrap()
        .run(&page, &mut findings)
        .unwrap();

    assert_eq!(findings[0].severity, Severity::Warning);
    assert!(findings[0].message.contains("Mixed language"));
}

#[test]
fn test_failed_click_keeps_earlier_toggle_findings() {
    let page = ScriptedPage::default()
        .element(1, "20 Years of Excellence", &[".timeline"])
        .element(2, "KR", &["[data-lang='ko']"])
        .element(3, "EN", &["[data-lang='en']"])
        .on_click(2, 1, "20년의 우수성")
        .detach(3);
    let analyzer = ConsistencyAnalyzer::new(AnalysisProfile {
        language_toggle: Some(ToggleConfig::default()),
        ..minimal_profile()
    })
    .unwrap();

    let findings = analyzer.run_toggle_check(&page);

    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].kind, FindingKind::LanguageToggle);
    assert!(findings[0].message.contains("from English to Korean"));
    assert_eq!(findings[1].kind, FindingKind::AnalysisFailed);
    assert_eq!(findings[1].severity, Severity::Error);
    assert!(findings[1].message.contains("element detached"));
}

#[test]
fn test_controls_found_by_visible_label() {
    let page = ScriptedPage::default()
        .element(1, "20 Years of Excellence", &[".timeline"])
        .element(2, "Contact", &["button"])
        .element(3, " KR ", &["button"])
        .on_click(2, 1, "Contact form")
        .on_click(3, 1, "20년의 우수성");
    let detector = detector();
    let config = ToggleConfig::default();

    let mut findings = Vec::new();
    LanguageToggleCheck::new(&detector, &config)
        .unwrap()
        .run(&page, &mut findings)
        .unwrap();

    assert_eq!(findings.len(), 1);
    assert!(findings[0].message.contains("'KR'"));
    assert!(findings[0].message.contains("from English to Korean"));
}

#[test]
fn test_control_matched_twice_is_clicked_once() {
    let page = ScriptedPage::default()
        .element(1, "20 Years of Excellence", &[".timeline"])
        .element(2, "KR", &["[data-lang='ko']", "button"])
        .on_click(2, 1, "20년의 우수성");
    let detector = detector();
    let config = ToggleConfig::default();

    let mut findings = Vec::new();
    LanguageToggleCheck::new(&detector, &config)
        .unwrap()
        .run(&page, &mut findings)
        .unwrap();

    assert_eq!(findings.len(), 1);
}

#[test]
fn test_target_captured_after_each_toggle() {
    let page = ScriptedPage::default()
        .element(1, "20 Years of Excellence", &[".timeline"])
        .element(2, "KR", &["button"])
        .element(3, "EN", &["button"])
        .on_click(2, 1, "20년의 우수성")
        .on_click(3, 1, "20 Years of Excellence");
    let detector = detector();
    let config = ToggleConfig::default();
    let shots = ScreenshotConfig {
        dir: PathBuf::from("shots"),
        full_page: false,
    };

    let mut findings = Vec::new();
    LanguageToggleCheck::new(&detector, &config)
        .unwrap()
        .with_screenshots(Some(&shots))
        .run(&page, &mut findings)
        .unwrap();

    assert_eq!(findings.len(), 2);
    assert_eq!(
        *page.shots.borrow(),
        vec![
            PathBuf::from("shots/timeline_after_kr_toggle.png"),
            PathBuf::from("shots/timeline_after_en_toggle.png"),
        ]
    );
}

#[test]
fn test_zero_max_toggles_is_config_error() {
    let detector = detector();
    let config = ToggleConfig {
        max_toggles: 0,
        ..ToggleConfig::default()
    };
    assert!(LanguageToggleCheck::new(&detector, &config).is_err());
}

#[test]
fn test_analysis_is_idempotent_on_unchanged_snapshot() {
    let page = ScriptedPage::default()
        .element(1, "Welcome 20 Years of Excellence", &["body"])
        .element(2, "20 Years of Excellence", &[".timeline"])
        .element(3, "Contact", &["button"])
        .style(3, "background-color", "red")
        .element(4, "Quote", &["button"])
        .style(4, "background-color", "blue");
    let analyzer = ConsistencyAnalyzer::new(AnalysisProfile::default()).unwrap();

    let first = analyzer.run(&page);
    let second = analyzer.run(&page);

    assert!(!first.findings.is_empty());
    assert_eq!(first.findings, second.findings);
}

#[test]
fn test_mixed_section_produces_single_scoped_warning() {
    let page = ScriptedPage::default()
        .element(1, "20 Years of Excellence", &[".timeline"])
        .element(2, "20년의 우수성", &[".timeline"])
        .element(3, "About 20 Years", &[".about"]);
    let profile = AnalysisProfile {
        sections: vec![
            SectionQuery::new("Timeline Section", [".timeline"]).unwrap(),
            SectionQuery::new("About Section", [".about"]).unwrap(),
        ],
        ..minimal_profile()
    };
    let analyzer = ConsistencyAnalyzer::new(profile).unwrap();

    let findings = analyzer.run(&page).findings;
    let mixed: Vec<_> = findings
        .iter()
        .filter(|f| f.kind == FindingKind::MixedLanguageWarning)
        .collect();

    assert_eq!(mixed.len(), 1);
    assert_eq!(mixed[0].section, "Timeline Section");
}

#[test]
fn test_style_threshold_exceeded_for_buttons() {
    let mut page = ScriptedPage::default();
    for (id, color) in [(1, "red"), (2, "blue"), (3, "green"), (4, "black")] {
        page = page.element(id, "Button", &["button"]).style(id, "background-color", color);
    }
    let profile = AnalysisProfile {
        style_checks: vec![StyleCheck {
            query: SectionQuery::new("Buttons", ["button", ".btn"]).unwrap().merged(),
            property: "background-color".to_string(),
            threshold: 3,
            max_samples: 10,
            ignore_values: vec![],
        }],
        ..minimal_profile()
    };
    let analyzer = ConsistencyAnalyzer::new(profile).unwrap();

    let findings = analyzer.run(&page).findings;
    let warning = findings
        .iter()
        .find(|f| f.kind == FindingKind::StyleConsistencyWarning)
        .unwrap();

    assert_eq!(warning.section, "Buttons");
    assert!(warning.message.starts_with("4 distinct background-color values exceed threshold 3"));
}

#[test]
fn test_layout_and_overflow_checks() {
    let page = ScriptedPage {
        viewport: Some(ViewportMetrics {
            document_width: 420.0,
            viewport_width: 375.0,
        }),
        ..ScriptedPage::default()
    }
    .element(1, "2004", &[".timeline-item"])
    .sized(1, 300.0, 120.0)
    .element(2, "2014", &[".timeline-item"])
    .sized(2, 300.0, 180.0);
    let profile = AnalysisProfile {
        layout_checks: vec![LayoutCheck {
            query: SectionQuery::new("Timeline boxes", [".timeline-item"]).unwrap(),
            tolerance_px: 1.0,
            max_samples: 10,
        }],
        ..minimal_profile()
    };
    let analyzer = ConsistencyAnalyzer::new(profile).unwrap();

    let findings = analyzer.run(&page).findings;

    assert!(findings
        .iter()
        .any(|f| f.kind == FindingKind::LayoutConsistencyWarning && f.section == "Timeline boxes"));
    assert!(findings.iter().any(|f| f.kind == FindingKind::OverflowWarning));
}

#[test]
fn test_inspection_failure_keeps_partial_findings() {
    let page = ScriptedPage {
        fail_viewport: true,
        ..ScriptedPage::default()
    }
    .element(1, "20 Years of Excellence", &[".timeline"]);
    let analyzer = ConsistencyAnalyzer::new(minimal_profile()).unwrap();

    let outcome = analyzer.run(&page);

    assert!(outcome.failed());
    assert!(outcome.findings.len() > 1);
    let terminal: Vec<_> = outcome
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::AnalysisFailed)
        .collect();
    assert_eq!(terminal.len(), 1);
    assert_eq!(terminal[0].severity, Severity::Error);
    assert!(terminal[0].message.contains("navigation interrupted"));

    assert!(matches!(
        analyzer.try_run(&page),
        Err(AnalysisError::Inspection(InspectionError::Driver(_)))
    ));
}

#[test]
fn test_mislabeled_phrase_sets_fail_fast() {
    let english = PhraseSet::new(Language::English, ["20 Years"]).unwrap();
    assert!(BilingualDetector::new(english.clone(), english).is_err());
}
