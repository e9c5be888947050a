//! Capture adapter message protocol.
//!
//! Each runtime surface hosts a [`CaptureAdapter`] and drives it with
//! JSON messages: `PING`, `EXTRACT_CONTENT`, `GET_PAGE_INFO`, and
//! `UPDATE_CONFIG`. The adapter owns the current page and the capture
//! configuration and runs the state machine
//! `uninitialized → ready → extracting → ready`. Unknown message types
//! are rejected explicitly; handlers process one message at a time per
//! instance, and concurrent captures simply run independent adapters.

use serde_json::{Value, json};

use crate::document::CaptureOptions;
use crate::extract::page_info;
use crate::pipeline::{CaptureConfig, capture};
use crate::{PrismError, Result};

/// Lifecycle state of an adapter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// No page loaded yet.
    Uninitialized,
    /// A page is loaded and the adapter accepts messages.
    Ready,
    /// An extraction is in flight.
    Extracting,
}

impl AdapterState {
    fn as_str(self) -> &'static str {
        match self {
            AdapterState::Uninitialized => "uninitialized",
            AdapterState::Ready => "ready",
            AdapterState::Extracting => "extracting",
        }
    }
}

/// The page a surface has handed to its adapter.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub html: String,
    pub url: Option<String>,
}

/// Message-driven capture adapter for one surface.
pub struct CaptureAdapter {
    page: Option<PageContext>,
    config: CaptureConfig,
    state: AdapterState,
}

impl CaptureAdapter {
    pub fn new() -> Self {
        Self { page: None, config: CaptureConfig::default(), state: AdapterState::Uninitialized }
    }

    pub fn with_config(config: CaptureConfig) -> Self {
        Self { page: None, config, state: AdapterState::Uninitialized }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AdapterState {
        self.state
    }

    /// Hand the adapter a loaded page, the DOM-load check of the
    /// original surfaces. Transitions `uninitialized → ready`.
    pub fn load_page(&mut self, page: PageContext) {
        self.page = Some(page);
        self.state = AdapterState::Ready;
    }

    /// Dispatch one protocol message.
    ///
    /// Responses are plain JSON objects carrying `success: true`; errors
    /// are returned as `Err` for the host to surface. An unrecognized
    /// `type` fails with [`PrismError::UnknownMessage`].
    pub fn handle(&mut self, message: &Value) -> Result<Value> {
        let message_type = message
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| PrismError::Validation("message has no type field".to_string()))?;

        match message_type {
            "PING" => Ok(json!({
                "success": true,
                "status": self.state.as_str(),
            })),
            "GET_PAGE_INFO" => self.handle_page_info(),
            "EXTRACT_CONTENT" => self.handle_extract(message.get("data")),
            "UPDATE_CONFIG" => self.handle_update_config(message.get("data")),
            other => Err(PrismError::UnknownMessage(other.to_string())),
        }
    }

    /// Read-only title and URL of the current page.
    fn handle_page_info(&self) -> Result<Value> {
        let page = self.page.as_ref().ok_or(PrismError::NoPage)?;
        let (title, url) = page_info(&page.html, page.url.as_deref());

        Ok(json!({
            "success": true,
            "title": title,
            "url": url,
        }))
    }

    fn handle_extract(&mut self, data: Option<&Value>) -> Result<Value> {
        if self.page.is_none() {
            return Err(PrismError::NoPage);
        }

        let mut config = self.config.clone();
        if let Some(options) = data.and_then(|d| d.get("options")) {
            apply_option_patch(&mut config.options, options);
        }

        self.state = AdapterState::Extracting;
        let result = match self.page.as_ref() {
            Some(page) => capture(&page.html, page.url.as_deref(), &config),
            None => Err(PrismError::NoPage),
        };
        self.state = AdapterState::Ready;

        let doc = result?;
        Ok(json!({
            "success": true,
            "markdown": doc.markdown,
            "metadata": serde_json::to_value(&doc.metadata)?,
            "suggestedPath": doc.suggested_path,
        }))
    }

    fn handle_update_config(&mut self, data: Option<&Value>) -> Result<Value> {
        let data = data.ok_or_else(|| PrismError::Validation("UPDATE_CONFIG requires data".to_string()))?;

        apply_option_patch(&mut self.config.options, data);

        if let Some(folder) = data.get("folder").and_then(Value::as_str) {
            self.config.folder = folder.to_string();
        }
        if let Some(frontmatter) = data.get("includeFrontmatter").and_then(Value::as_bool) {
            self.config.include_frontmatter = frontmatter;
        }

        Ok(json!({ "success": true }))
    }
}

impl Default for CaptureAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Overlay present fields of a JSON patch onto capture options.
fn apply_option_patch(options: &mut CaptureOptions, patch: &Value) {
    if let Some(v) = patch.get("includeImages").and_then(Value::as_bool) {
        options.include_images = v;
    }
    if let Some(v) = patch.get("includeLinks").and_then(Value::as_bool) {
        options.include_links = v;
    }
    if let Some(v) = patch.get("cleanHtml").and_then(Value::as_bool) {
        options.clean_html = v;
    }
}
