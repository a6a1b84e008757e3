// src/inspector/chrome.rs
//! Live inspection through headless Chrome
//!
//! [`ChromeSession`] owns the browser process and one tab. [`ChromePage`]
//! borrows that tab and implements [`PageInspector`], keeping every element
//! it hands out in a registry so handles stay stable for the whole pass.

use headless_chrome::protocol::cdp::Page::{CaptureScreenshotFormatOption, Viewport};
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use log::{debug, info};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::{BoxSize, ElementHandle, InspectionError, PageInspector, ScreenshotTarget, ViewportMetrics};

/// Browser launch settings
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub headless: bool,

    /// Window size in CSS pixels
    pub window_size: (u32, u32),

    /// How long to let the page settle after navigation or a click
    pub settle: Duration,

    /// Path to Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            settle: Duration::from_secs(3),
            chrome_path: None,
        }
    }
}

/// A running browser with a single tab
pub struct ChromeSession {
    // Dropping the browser closes the tab, keep it alive alongside it
    _browser: Browser,
    tab: Arc<Tab>,
    settle: Duration,
}

impl ChromeSession {
    pub fn launch(config: &LaunchConfig) -> Result<Self, InspectionError> {
        let mut options = LaunchOptions::default_builder();
        options.headless(config.headless);
        options.window_size(Some(config.window_size));
        options.idle_browser_timeout(Duration::from_secs(120));

        if let Some(ref path) = config.chrome_path {
            options.path(Some(path.into()));
        }

        let options = options
            .build()
            .map_err(|e| InspectionError::Driver(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(options).map_err(|e| {
            InspectionError::Driver(format!("Failed to launch browser. Is Chrome/Chromium installed? {}", e))
        })?;
        let tab = browser.new_tab().map_err(InspectionError::driver)?;

        Ok(Self {
            _browser: browser,
            tab,
            settle: config.settle,
        })
    }

    /// Navigate and wait for the load plus the settle delay
    pub fn navigate(&self, url: &str) -> Result<(), InspectionError> {
        info!("Navigating to {}", url);
        self.tab
            .navigate_to(url)
            .map_err(InspectionError::driver)?
            .wait_until_navigated()
            .map_err(InspectionError::driver)?;
        std::thread::sleep(self.settle);
        Ok(())
    }

    /// Inspector over the current document of the tab
    pub fn page(&self) -> ChromePage<'_> {
        ChromePage {
            tab: &self.tab,
            settle: self.settle,
            elements: RefCell::new(NodeRegistry::default()),
        }
    }
}

/// Elements seen so far, keyed by a node identity that outlives a single query
struct NodeRegistry<K, E> {
    entries: Vec<(K, E)>,
}

impl<K, E> Default for NodeRegistry<K, E> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<K: PartialEq, E> NodeRegistry<K, E> {
    /// Handle of the node `key`, storing `element` only the first time the node is seen
    fn register(&mut self, key: K, element: E) -> ElementHandle {
        if let Some(index) = self.entries.iter().position(|(k, _)| *k == key) {
            return ElementHandle::new(index as u64);
        }
        self.entries.push((key, element));
        ElementHandle::new((self.entries.len() - 1) as u64)
    }

    fn get(&self, handle: ElementHandle) -> Option<&E> {
        self.entries.get(handle.id() as usize).map(|(_, e)| e)
    }
}

/// [`PageInspector`] over one Chrome tab
pub struct ChromePage<'a> {
    tab: &'a Tab,
    settle: Duration,
    elements: RefCell<NodeRegistry<u32, Element<'a>>>,
}

impl<'a> ChromePage<'a> {
    /// Register an element, reusing the handle of an already known node.
    ///
    /// `find_elements` fetches the document again on every query, which
    /// rebinds `node_id`; `backend_node_id` is stable for the document's life.
    fn register(&self, element: Element<'a>) -> ElementHandle {
        let key = element.backend_node_id;
        self.elements.borrow_mut().register(key, element)
    }

    fn call_on<T>(
        &self,
        handle: ElementHandle,
        f: impl FnOnce(&Element<'a>) -> Result<T, InspectionError>,
    ) -> Result<T, InspectionError> {
        let elements = self.elements.borrow();
        let element = elements
            .get(handle)
            .ok_or(InspectionError::UnknownHandle(handle.id()))?;
        f(element)
    }

    fn evaluate(&self, expression: &str) -> Result<Option<Value>, InspectionError> {
        let result = self
            .tab
            .evaluate(expression, false)
            .map_err(InspectionError::driver)?;
        Ok(result.value)
    }

    fn full_page_clip(&self) -> Result<Option<Viewport>, InspectionError> {
        let size = self.evaluate(
            "JSON.stringify([document.documentElement.scrollWidth, document.documentElement.scrollHeight])",
        )?;
        let dims: Option<(f64, f64)> = size
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| serde_json::from_str(s).ok());

        Ok(dims.map(|(width, height)| Viewport {
            x: 0.0,
            y: 0.0,
            width,
            height,
            scale: 1.0,
        }))
    }
}

impl<'a> PageInspector for ChromePage<'a> {
    fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>, InspectionError> {
        // find_elements treats "no match" as an error, so count first
        let quoted = serde_json::to_string(selector).map_err(InspectionError::driver)?;
        let count = self
            .evaluate(&format!(
                "(() => {{ try {{ return document.querySelectorAll({}).length; }} catch (e) {{ return -1; }} }})()",
                quoted
            ))?
            .and_then(|v| v.as_i64())
            .unwrap_or(0);

        if count < 0 {
            return Err(InspectionError::InvalidSelector {
                selector: selector.to_string(),
                reason: "rejected by document.querySelectorAll".to_string(),
            });
        }
        if count == 0 {
            debug!("No elements for selector '{}'", selector);
            return Ok(Vec::new());
        }

        let found = self
            .tab
            .find_elements(selector)
            .map_err(InspectionError::driver)?;
        debug!("Selector '{}' matched {} elements", selector, found.len());

        Ok(found.into_iter().map(|element| self.register(element)).collect())
    }

    fn text_of(&self, element: ElementHandle) -> Result<String, InspectionError> {
        self.call_on(element, |el| el.get_inner_text().map_err(InspectionError::driver))
    }

    fn computed_style(
        &self,
        element: ElementHandle,
        property: &str,
    ) -> Result<Option<String>, InspectionError> {
        self.call_on(element, |el| {
            let result = el
                .call_js_fn(
                    "function(property) { return getComputedStyle(this).getPropertyValue(property); }",
                    vec![json!(property)],
                    false,
                )
                .map_err(InspectionError::driver)?;

            Ok(result
                .value
                .as_ref()
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string))
        })
    }

    fn screenshot(&self, target: ScreenshotTarget, path: &Path) -> Result<(), InspectionError> {
        let png = match target {
            ScreenshotTarget::Element(handle) => self.call_on(handle, |el| {
                el.capture_screenshot(CaptureScreenshotFormatOption::Png)
                    .map_err(InspectionError::driver)
            })?,
            ScreenshotTarget::FullPage => {
                let clip = self.full_page_clip()?;
                self.tab
                    .capture_screenshot(CaptureScreenshotFormatOption::Png, None, clip, true)
                    .map_err(InspectionError::driver)?
            }
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, png)?;
        debug!("Saved screenshot to {}", path.display());
        Ok(())
    }

    fn click(&self, element: ElementHandle) -> Result<(), InspectionError> {
        self.call_on(element, |el| {
            el.click().map_err(InspectionError::driver)?;
            Ok(())
        })
    }

    fn box_size(&self, element: ElementHandle) -> Result<Option<BoxSize>, InspectionError> {
        self.call_on(element, |el| match el.get_box_model() {
            Ok(model) => Ok(Some(BoxSize {
                width: model.width,
                height: model.height,
            })),
            Err(e) => {
                // Hidden elements have no box model
                debug!("No box model for element {}: {}", element.id(), e);
                Ok(None)
            }
        })
    }

    fn viewport_metrics(&self) -> Result<Option<ViewportMetrics>, InspectionError> {
        let metrics = self.evaluate("JSON.stringify([document.body.scrollWidth, window.innerWidth])")?;
        let dims: Option<(f64, f64)> = metrics
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| serde_json::from_str(s).ok());

        Ok(dims.map(|(document_width, viewport_width)| ViewportMetrics {
            document_width,
            viewport_width,
        }))
    }

    fn wait_until_settled(&self) -> Result<(), InspectionError> {
        std::thread::sleep(self.settle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_node_keeps_its_handle() {
        let mut registry = NodeRegistry::default();
        let first = registry.register(41u32, "section");
        let other = registry.register(7u32, "div");
        let again = registry.register(41u32, ".section");

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(registry.get(again), Some(&"section"));
    }

    #[test]
    fn test_unknown_handle() {
        let registry: NodeRegistry<u32, &str> = NodeRegistry::default();
        assert_eq!(registry.get(ElementHandle::new(3)), None);
    }
}
