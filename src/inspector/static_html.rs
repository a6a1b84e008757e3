// src/inspector/static_html.rs
//! Offline inspector over an HTML string
//!
//! Useful for checking exported pages and fixtures without a browser. There is
//! no layout engine behind it: text is the collapsed text content of an
//! element and "computed" style only sees inline `style` declarations.

use scraper::{ElementRef, Html, Selector};
use std::fs;
use std::path::Path;

use super::{ElementHandle, InspectionError, PageInspector, ScreenshotTarget};

/// A parsed HTML document. Handles are document-order node positions.
pub struct StaticPage {
    document: Html,
}

impl StaticPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InspectionError> {
        let html = fs::read_to_string(path.as_ref())?;
        Ok(Self::parse(&html))
    }

    fn element(&self, handle: ElementHandle) -> Result<ElementRef<'_>, InspectionError> {
        self.document
            .tree
            .root()
            .descendants()
            .nth(handle.id() as usize)
            .and_then(ElementRef::wrap)
            .ok_or(InspectionError::UnknownHandle(handle.id()))
    }
}

impl PageInspector for StaticPage {
    fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>, InspectionError> {
        let parsed = Selector::parse(selector).map_err(|e| InspectionError::InvalidSelector {
            selector: selector.to_string(),
            reason: format!("{:?}", e),
        })?;

        let matched: Vec<_> = self.document.select(&parsed).map(|el| el.id()).collect();
        if matched.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .document
            .tree
            .root()
            .descendants()
            .enumerate()
            .filter(|(_, node)| matched.contains(&node.id()))
            .map(|(position, _)| ElementHandle::new(position as u64))
            .collect())
    }

    fn text_of(&self, element: ElementHandle) -> Result<String, InspectionError> {
        let element = self.element(element)?;
        let raw: String = element.text().collect();
        Ok(raw.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    fn computed_style(
        &self,
        element: ElementHandle,
        property: &str,
    ) -> Result<Option<String>, InspectionError> {
        let element = self.element(element)?;
        Ok(element
            .value()
            .attr("style")
            .and_then(|style| inline_declaration(style, property)))
    }

    fn screenshot(&self, _target: ScreenshotTarget, _path: &Path) -> Result<(), InspectionError> {
        Err(InspectionError::Unsupported("screenshot"))
    }

    fn click(&self, _element: ElementHandle) -> Result<(), InspectionError> {
        Err(InspectionError::Unsupported("click"))
    }
}

/// Value of the last declaration of `property` in an inline style attribute
fn inline_declaration(style: &str, property: &str) -> Option<String> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| {
            value
                .trim()
                .trim_end_matches("!important")
                .trim()
                .to_string()
        })
        .filter(|value| !value.is_empty())
        .last()
}
