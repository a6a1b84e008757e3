// src/analysis/layout.rs
//! Layout agreement checks
//!
//! Repeated cards (timeline entries, organization boxes, owner cards) are
//! meant to render at the same size. These checks measure the spread of
//! their boxes and look for content wider than the viewport.

use super::prober::SectionMatch;
use super::AnalysisError;
use crate::config::LayoutCheck;
use crate::inspector::{BoxSize, PageInspector, ViewportMetrics};
use crate::models::{Finding, FindingKind};

/// Difference between the largest and smallest value, 0 for fewer than two
fn spread(values: impl Iterator<Item = f64>) -> f64 {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if max >= min {
        max - min
    } else {
        0.0
    }
}

/// Warning if widths or heights of `boxes` differ by more than `tolerance_px`
pub fn score_boxes(section: &str, boxes: &[BoxSize], tolerance_px: f64) -> Option<Finding> {
    if boxes.len() < 2 {
        return None;
    }

    let width_spread = spread(boxes.iter().map(|b| b.width));
    let height_spread = spread(boxes.iter().map(|b| b.height));

    let mut problems = Vec::new();
    if width_spread > tolerance_px {
        problems.push(format!("widths differ by {:.2}px", width_spread));
    }
    if height_spread > tolerance_px {
        problems.push(format!("heights differ by {:.2}px", height_spread));
    }
    if problems.is_empty() {
        return None;
    }

    let sizes: Vec<String> = boxes
        .iter()
        .map(|b| format!("{:.2}x{:.2}", b.width, b.height))
        .collect();

    Some(Finding::warning(
        FindingKind::LayoutConsistencyWarning,
        section,
        format!(
            "{} across {} boxes (tolerance {:.2}px): {}",
            problems.join(", "),
            boxes.len(),
            tolerance_px,
            sizes.join(", ")
        ),
    ))
}

/// Measure a probed section and score the boxes that have a layout
pub fn check_boxes(
    check: &LayoutCheck,
    section: &SectionMatch,
    page: &dyn PageInspector,
) -> Result<Option<Finding>, AnalysisError> {
    check.validate()?;

    let mut boxes = Vec::new();
    for element in section.elements.iter().take(check.max_samples) {
        if let Some(size) = page.box_size(element.handle)? {
            boxes.push(size);
        }
    }

    Ok(score_boxes(&check.query.label, &boxes, check.tolerance_px))
}

/// Warning if the document is wider than the viewport
pub fn check_overflow(metrics: Option<ViewportMetrics>) -> Option<Finding> {
    let metrics = metrics?;
    if metrics.document_width <= metrics.viewport_width {
        return None;
    }

    Some(Finding::warning(
        FindingKind::OverflowWarning,
        "Page",
        format!(
            "Horizontal overflow: document is {:.0}px wide, viewport is {:.0}px",
            metrics.document_width, metrics.viewport_width
        ),
    ))
}
