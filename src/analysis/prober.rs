// src/analysis/prober.rs
//! Ordered selector fallback
//!
//! Sites rarely agree on class names, so each logical section is described by
//! several candidate selectors. The prober tries them in order and keeps the
//! full match set of the first selector that finds anything.

use log::debug;

use super::AnalysisError;
use crate::inspector::{ElementHandle, PageInspector};
use crate::models::{MatchedElement, SectionQuery, StyleSample};

/// Result of probing one section
#[derive(Debug, Clone, PartialEq)]
pub struct SectionMatch {
    pub label: String,

    /// Selector that produced the matches (first hit in merge mode)
    pub selector: Option<String>,

    pub elements: Vec<MatchedElement>,
}

impl SectionMatch {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Locates sections and reads text and styles from the matched elements.
#[derive(Debug, Clone, Default)]
pub struct SelectorProber {
    /// Style properties captured from every matched element
    capture: Vec<String>,

    /// Elements read at most per section
    limit: Option<usize>,
}

impl SelectorProber {
    /// Prober that captures text only and keeps every match
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture these computed style properties from each element
    pub fn capture_styles<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capture = properties.into_iter().map(Into::into).collect();
        self
    }

    /// Keep at most `limit` elements per section
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Elements of the first selector in `query` that matches anything
    pub fn probe(
        &self,
        query: &SectionQuery,
        page: &dyn PageInspector,
    ) -> Result<Vec<MatchedElement>, AnalysisError> {
        Ok(self.probe_section(query, page)?.elements)
    }

    /// Like [`SelectorProber::probe`] but also reports which selector won
    pub fn probe_section(
        &self,
        query: &SectionQuery,
        page: &dyn PageInspector,
    ) -> Result<SectionMatch, AnalysisError> {
        query.validate()?;

        let (selector, handles) = if query.merge {
            Self::union_matches(query, page)?
        } else {
            Self::first_matches(query, page)?
        };

        let keep = self.limit.unwrap_or(handles.len());
        let mut elements = Vec::with_capacity(keep.min(handles.len()));
        for handle in handles.into_iter().take(keep) {
            elements.push(self.read_element(handle, page)?);
        }

        Ok(SectionMatch {
            label: query.label.clone(),
            selector,
            elements,
        })
    }

    fn first_matches(
        query: &SectionQuery,
        page: &dyn PageInspector,
    ) -> Result<(Option<String>, Vec<ElementHandle>), AnalysisError> {
        for selector in &query.selectors {
            let handles = page.query_all(selector)?;
            debug!("[{}] '{}' -> {} element(s)", query.label, selector, handles.len());
            if !handles.is_empty() {
                return Ok((Some(selector.clone()), handles));
            }
        }
        Ok((None, Vec::new()))
    }

    fn union_matches(
        query: &SectionQuery,
        page: &dyn PageInspector,
    ) -> Result<(Option<String>, Vec<ElementHandle>), AnalysisError> {
        let mut first_hit = None;
        let mut all: Vec<ElementHandle> = Vec::new();

        for selector in &query.selectors {
            let handles = page.query_all(selector)?;
            debug!("[{}] '{}' -> {} element(s) (merge)", query.label, selector, handles.len());
            if !handles.is_empty() && first_hit.is_none() {
                first_hit = Some(selector.clone());
            }
            for handle in handles {
                if !all.contains(&handle) {
                    all.push(handle);
                }
            }
        }
        Ok((first_hit, all))
    }

    fn read_element(
        &self,
        handle: ElementHandle,
        page: &dyn PageInspector,
    ) -> Result<MatchedElement, AnalysisError> {
        let text = page.text_of(handle)?;
        let mut style = StyleSample::new();
        for property in &self.capture {
            if let Some(value) = page.computed_style(handle, property)? {
                style.insert(property.clone(), value);
            }
        }
        Ok(MatchedElement { handle, text, style })
    }
}
