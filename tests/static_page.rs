use sitecheck::analysis::{SelectorProber, StyleScorer};
use sitecheck::inspector::StaticPage;
use sitecheck::models::{SectionQuery, StyleSample};
use sitecheck::reporting::{Gate, JsonReporter, Reporter};
use sitecheck::{AnalysisProfile, ConsistencyAnalyzer, FindingKind, PageInspector, Severity};

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn page() -> StaticPage {
    StaticPage::from_file(fixture("doriko_mixed.html")).unwrap()
}

fn profile() -> AnalysisProfile {
    AnalysisProfile::from_file(fixture("profile.yaml")).unwrap()
}

#[test]
fn test_profile_fixture_loads() {
    let profile = profile();
    assert_eq!(profile.name, "doriko-korean");
    assert_eq!(profile.sections.len(), 3);
    assert!(profile.layout_checks.is_empty());
    assert!(profile.validate().is_ok());
}

#[test]
fn test_untranslated_timeline_is_reported() {
    let analyzer = ConsistencyAnalyzer::new(profile()).unwrap();

    let outcome = analyzer.run(&page());

    assert!(!outcome.failed());
    let mixed: Vec<_> = outcome
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::MixedLanguageWarning)
        .collect();
    assert_eq!(mixed.len(), 1);
    assert_eq!(mixed[0].section, "Timeline Section");
    assert!(mixed[0].message.contains("20 Years of Excellence"));
}

#[test]
fn test_fallback_selector_is_named_in_findings() {
    let analyzer = ConsistencyAnalyzer::new(profile()).unwrap();

    let findings = analyzer.run(&page()).findings;

    let fleet = findings
        .iter()
        .find(|f| f.kind == FindingKind::SelectorMatch && f.section == "Fleet Section")
        .unwrap();
    assert_eq!(fleet.message, "Matched 1 element(s) with '#fleet'");
}

#[test]
fn test_button_and_font_variety_is_reported() {
    let analyzer = ConsistencyAnalyzer::new(profile()).unwrap();

    let findings = analyzer.run(&page()).findings;
    let style: Vec<_> = findings
        .iter()
        .filter(|f| f.kind == FindingKind::StyleConsistencyWarning)
        .collect();

    assert_eq!(style.len(), 2);
    assert_eq!(style[0].section, "Buttons");
    assert!(style[0].message.starts_with("4 distinct background-color values"));
    assert_eq!(style[1].section, "Heading typography");
    assert!(style[1].message.starts_with("3 distinct font-family values"));
}

#[test]
fn test_gate_fails_on_warnings_from_profile() {
    let analyzer = ConsistencyAnalyzer::new(profile()).unwrap();
    let findings = analyzer.run(&page()).findings;

    let verdict = Gate::new(analyzer.profile().fail_on).evaluate(&findings);

    assert!(!verdict.passed);
    assert!(verdict.failing >= 3);
}

#[test]
fn test_section_background_sampling_skips_transparent() {
    let page = page();
    let query = SectionQuery::new("Sections", ["section", ".section", ".container"])
        .unwrap()
        .merged();

    let elements = SelectorProber::new()
        .capture_styles(["background-color"])
        .limit(10)
        .probe(&query, &page)
        .unwrap();
    let samples: Vec<StyleSample> = elements.into_iter().map(|el| el.style).collect();

    assert_eq!(samples.len(), 5);
    let ignore = vec!["rgba(0, 0, 0, 0)".to_string()];
    let scorer = StyleScorer::default();
    assert_eq!(scorer.score_ignoring("Sections", &samples, "background-color", 4, &ignore).unwrap(), None);
    assert!(scorer.score("Sections", &samples, "background-color", 4).unwrap().is_some());
}

#[test]
fn test_json_report_of_static_run() {
    let analyzer = ConsistencyAnalyzer::new(profile()).unwrap();
    let findings = analyzer.run(&page()).findings;

    let mut reporter = JsonReporter::new(Vec::new(), analyzer.profile().target_url.clone());
    reporter.report(&findings).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&reporter.into_inner()).unwrap();

    assert_eq!(value["findings"].as_array().unwrap().len(), findings.len());
    assert!(value["summary"]["warnings"].as_u64().unwrap() >= 3);
}

#[test]
fn test_static_page_cannot_click() {
    let page = page();
    let button = page.query_all("[data-lang='ko']").unwrap()[0];
    assert!(page.click(button).is_err());

    let analyzer = ConsistencyAnalyzer::new(AnalysisProfile {
        language_toggle: Some(Default::default()),
        ..profile()
    })
    .unwrap();
    let findings = analyzer.run_toggle_check(&page);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::AnalysisFailed);
    assert_eq!(findings[0].severity, Severity::Error);
}

#[test]
fn test_text_only_language_buttons_are_found() {
    let page = StaticPage::parse(
        r#"<html><body>
            <nav><button>KR</button><button>EN</button></nav>
            <section class="timeline">20 Years of Excellence</section>
        </body></html>"#,
    );
    let analyzer = ConsistencyAnalyzer::new(AnalysisProfile {
        language_toggle: Some(Default::default()),
        ..profile()
    })
    .unwrap();

    let findings = analyzer.run_toggle_check(&page);

    assert!(!findings.iter().any(|f| f.message.contains("No language toggle control found")));
    // the control was found, and clicking it is what a static page cannot do
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::AnalysisFailed);
    assert!(findings[0].message.contains("click"));
}
