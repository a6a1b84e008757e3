// src/analysis/style.rs
//! Style consistency scoring
//!
//! Reduces computed style samples to the set of distinct values per property
//! and warns when a page uses more variants than the configured threshold.

use std::collections::BTreeSet;

use super::prober::SectionMatch;
use crate::config::{ConfigError, StyleCheck};
use crate::models::{Finding, FindingKind, StyleSample};

/// Distinct values of `property` across `samples`, sorted. Samples without the property are skipped.
pub fn distinct_values<'a>(samples: &'a [StyleSample], property: &str) -> BTreeSet<&'a str> {
    samples.iter().filter_map(|s| s.get(property)).collect()
}

/// Counts distinct style values over at most `max_samples` samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleScorer {
    max_samples: usize,
}

impl Default for StyleScorer {
    fn default() -> Self {
        Self { max_samples: 10 }
    }
}

impl StyleScorer {
    pub fn new(max_samples: usize) -> Result<Self, ConfigError> {
        if max_samples == 0 {
            return Err(ConfigError::InvalidSampleCap("style scorer".to_string()));
        }
        Ok(Self { max_samples })
    }

    /// Warning if `property` takes more than `threshold` distinct values
    pub fn score(
        &self,
        section: &str,
        samples: &[StyleSample],
        property: &str,
        threshold: usize,
    ) -> Result<Option<Finding>, ConfigError> {
        self.score_ignoring(section, samples, property, threshold, &[])
    }

    /// [`StyleScorer::score`] with some values, such as transparent, not counted
    pub fn score_ignoring(
        &self,
        section: &str,
        samples: &[StyleSample],
        property: &str,
        threshold: usize,
        ignore: &[String],
    ) -> Result<Option<Finding>, ConfigError> {
        if threshold == 0 {
            return Err(ConfigError::InvalidThreshold {
                label: section.to_string(),
                value: threshold,
            });
        }

        let capped = &samples[..samples.len().min(self.max_samples)];
        let mut values = distinct_values(capped, property);
        values.retain(|v| !ignore.iter().any(|i| i.as_str() == *v));

        if values.len() <= threshold {
            return Ok(None);
        }

        let listed: Vec<&str> = values.into_iter().collect();
        Ok(Some(Finding::warning(
            FindingKind::StyleConsistencyWarning,
            section,
            format!(
                "{} distinct {} values exceed threshold {}: {}",
                listed.len(),
                property,
                threshold,
                listed.join(" | ")
            ),
        )))
    }

    /// Score one configured check against its probed section
    pub fn run_check(check: &StyleCheck, section: &SectionMatch) -> Result<Option<Finding>, ConfigError> {
        check.validate()?;
        let samples: Vec<StyleSample> = section.elements.iter().map(|el| el.style.clone()).collect();
        Self::new(check.max_samples)?.score_ignoring(
            &check.query.label,
            &samples,
            &check.property,
            check.threshold,
            &check.ignore_values,
        )
    }
}
