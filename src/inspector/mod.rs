// src/inspector/mod.rs
//! Page inspection capability
//!
//! The analysis pass never talks to a browser directly. It is handed a
//! [`PageInspector`] and only queries, reads text and reads computed styles
//! through it. Two implementations ship with the crate: a live Chrome tab
//! and an offline HTML document.

pub mod chrome;
pub mod static_html;

pub use chrome::{ChromePage, ChromeSession, LaunchConfig};
pub use static_html::StaticPage;

use std::path::Path;
use thiserror::Error;

/// Failures raised by an inspector. The analysis pass never retries them.
#[derive(Error, Debug)]
pub enum InspectionError {
    #[error("Browser driver failed: {0}")]
    Driver(String),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Element handle {0} does not belong to this page")]
    UnknownHandle(u64),

    #[error("{0} is not supported by this inspector")]
    Unsupported(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InspectionError {
    pub fn driver(err: impl std::fmt::Display) -> Self {
        InspectionError::Driver(err.to_string())
    }
}

/// Opaque reference to an element inside one inspected page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// What a screenshot should capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenshotTarget {
    Element(ElementHandle),
    FullPage,
}

/// Rendered size of an element, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

/// Document width against the visible viewport width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    pub document_width: f64,
    pub viewport_width: f64,
}

/// Query and evaluate access to a rendered document.
///
/// Implementations must return handles that stay valid for the lifetime of
/// the inspector and must hand out the same handle for the same element.
pub trait PageInspector {
    /// All elements matching `selector`, in document order. No match is `Ok(vec![])`.
    fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>, InspectionError>;

    /// Rendered text of an element
    fn text_of(&self, element: ElementHandle) -> Result<String, InspectionError>;

    /// Computed value of a CSS property, `None` when the property is not set
    fn computed_style(
        &self,
        element: ElementHandle,
        property: &str,
    ) -> Result<Option<String>, InspectionError>;

    fn screenshot(&self, target: ScreenshotTarget, path: &Path) -> Result<(), InspectionError>;

    fn click(&self, element: ElementHandle) -> Result<(), InspectionError>;

    /// Rendered box of an element, `None` when it has no layout box
    fn box_size(&self, _element: ElementHandle) -> Result<Option<BoxSize>, InspectionError> {
        Ok(None)
    }

    fn viewport_metrics(&self) -> Result<Option<ViewportMetrics>, InspectionError> {
        Ok(None)
    }

    /// Block until the document is quiet again after an action such as a click
    fn wait_until_settled(&self) -> Result<(), InspectionError> {
        Ok(())
    }
}
