use anyhow::{Context, Result};
use colored::*;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::time::Duration;

use sitecheck::analysis::SectionMatch;
use sitecheck::config::ScreenshotConfig;
use sitecheck::inspector::{ChromeSession, PageInspector, ScreenshotTarget};
use sitecheck::reporting::{ConsoleReporter, Gate, JsonReporter, Reporter};
use sitecheck::{AnalysisProfile, ConsistencyAnalyzer, LanguageState};

/// Profile location override
const PROFILE_ENV: &str = "SITECHECK_PROFILE";
/// Optional JSON report destination
const JSON_REPORT_ENV: &str = "SITECHECK_JSON";

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{} {:#}", "ERROR:".red().bold(), e);
            std::process::exit(2);
        }
    }
}

fn load_profile() -> Result<AnalysisProfile> {
    match std::env::var(PROFILE_ENV) {
        Ok(path) => {
            info!("Loading profile from {}", path);
            AnalysisProfile::from_file(&path).with_context(|| format!("Failed to load profile {}", path))
        }
        Err(_) => Ok(AnalysisProfile::default()),
    }
}

fn run() -> Result<i32> {
    println!("{}", "🔍 Site consistency analysis".cyan().bold());

    let profile = load_profile()?;
    let analyzer = ConsistencyAnalyzer::new(profile).context("Invalid analysis profile")?;
    let profile = analyzer.profile();

    println!("   Profile: {} -> {}", profile.name.green(), profile.target_url);

    // ==========================================================================
    // BROWSER + NAVIGATION
    // ==========================================================================
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .context("Invalid spinner template")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("Launching browser...");

    let session = ChromeSession::launch(&profile.launch_config())?;
    spinner.set_message(format!("Loading {} ...", profile.target_url));
    session.navigate(&profile.target_url)?;
    spinner.finish_with_message("Page loaded");

    let page = session.page();

    // ==========================================================================
    // ANALYSIS PASS
    // ==========================================================================
    let outcome = analyzer.run(&page);
    let mut findings = outcome.findings;

    if let Some(ref shots) = profile.screenshots {
        capture_sections(&page, analyzer.detector(), &outcome.sections, shots);
    }

    // The toggle check clicks, so it runs after the snapshot pass.
    // With screenshots configured it also captures the target after each click.
    findings.extend(analyzer.run_toggle_check(&page));

    if let Some(ref shots) = profile.screenshots {
        if shots.full_page {
            let path = shots.file_for("full_page");
            match page.screenshot(ScreenshotTarget::FullPage, &path) {
                Ok(()) => println!("📸 Saved {}", path.display()),
                Err(e) => warn!("Full page screenshot failed: {}", e),
            }
        }
    }

    // ==========================================================================
    // REPORTING
    // ==========================================================================
    println!("\n{}", "Findings".bold().underline());
    ConsoleReporter::stdout().report(&findings)?;

    if let Ok(path) = std::env::var(JSON_REPORT_ENV) {
        JsonReporter::create(&path, profile.target_url.clone())?.report(&findings)?;
        println!("Saved JSON report to {}", path.green());
    }

    let verdict = Gate::new(profile.fail_on).evaluate(&findings);
    if verdict.passed {
        println!("{}", "✅ Analysis passed".green().bold());
    } else {
        println!(
            "{} {} finding(s) at or above '{}'",
            "❌ Analysis failed:".red().bold(),
            verdict.failing,
            profile.fail_on
        );
    }

    Ok(verdict.exit_code())
}

/// Screenshot every element of the sections that contain a configured phrase
fn capture_sections(
    page: &dyn PageInspector,
    detector: &sitecheck::analysis::BilingualDetector,
    sections: &[SectionMatch],
    shots: &ScreenshotConfig,
) {
    for section in sections {
        for (i, element) in section.elements.iter().enumerate() {
            if detector.detect(&element.text) == LanguageState::Unknown {
                continue;
            }
            let path = shots.file_for(&format!("section_{}_{}", section.label, i + 1));
            match page.screenshot(ScreenshotTarget::Element(element.handle), &path) {
                Ok(()) => println!("📍 Saved {}", path.display()),
                Err(e) => warn!("Screenshot of {} #{} failed: {}", section.label, i + 1, e),
            }
        }
    }
}
