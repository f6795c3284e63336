//! Page automation capability
//!
//! The navigation engine only talks to a page through [`PageDriver`]. A
//! driver owns one page (plus its frames) and executes one operation at a
//! time; every network wait takes an explicit timeout.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Where a query or text read is evaluated
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Top-level document
    Page,
    /// Named frame or iframe
    Frame(String),
}

impl Scope {
    pub fn frame(name: &str) -> Self {
        Self::Frame(name.to_string())
    }
}

/// A loaded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub name: String,
    pub url: Url,
}

/// Snapshot of a matched element
///
/// Handles are plain data. Clicking one re-resolves it against the current
/// page, so a handle from an earlier navigation may fail with `NotFound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub scope: Scope,
    /// URL of the document the element was found in
    pub document_url: Url,
    pub tag: String,
    pub href: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    /// Link target, including one inherited from `<base target>`
    pub target: Option<String>,
    pub text: String,
}

impl ElementHandle {
    /// `href` resolved against the owning document
    pub fn resolved_href(&self) -> Option<Url> {
        let href = self.href.as_deref()?.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }
        self.document_url.join(href).ok()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Operation not supported by this driver: {operation}")]
    Unsupported { operation: String },

    #[error("No document loaded")]
    NotLoaded,

    #[error("Page resource already closed")]
    Closed,
}

impl DriverError {
    pub fn navigation(url: &Url, reason: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub fn timeout(operation: &str, timeout: Duration) -> Self {
        Self::Timeout {
            operation: operation.to_string(),
            seconds: timeout.as_secs(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn unsupported(operation: &str) -> Self {
        Self::Unsupported {
            operation: operation.to_string(),
        }
    }

    /// Whether the same step might succeed if tried again
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Navigation { .. })
    }
}

pub type DriverResult<T> = Result<T, DriverError>;

#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Load `url` as the top-level document
    async fn goto(&mut self, url: &Url, timeout: Duration) -> DriverResult<()>;

    /// Wait until the document and its frames have loaded
    async fn wait_for_load(&mut self, timeout: Duration) -> DriverResult<()>;

    fn current_url(&self) -> Option<Url>;

    async fn query_frames(&self) -> DriverResult<Vec<FrameInfo>>;

    async fn find_by_selector(&self, scope: &Scope, selector: &str) -> DriverResult<Vec<ElementHandle>>;

    async fn click(&mut self, element: &ElementHandle, timeout: Duration) -> DriverResult<()>;

    async fn evaluate_script(
        &mut self,
        scope: &Scope,
        script: &str,
        timeout: Duration,
    ) -> DriverResult<serde_json::Value>;

    /// Visible text of the scope, one block element per line
    async fn text_content(&self, scope: &Scope) -> DriverResult<String>;

    /// Release the page; later calls fail with [`DriverError::Closed`]
    async fn close(&mut self) -> DriverResult<()>;
}

/// Hands out fresh page resources
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn acquire(&self) -> anyhow::Result<Box<dyn PageDriver>>;
}
