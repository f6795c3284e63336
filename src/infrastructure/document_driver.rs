//! Page driver over fetched HTML documents
//!
//! Loads a page and its `<frame>`/`<iframe>` children through an
//! [`HtmlSource`], follows anchors as clicks (honouring link targets) and
//! renders visible text. Scripts are never executed.
//!
//! Parsed `scraper::Html` trees are not `Send`, so documents are kept as
//! strings and parsed inside synchronous helpers.

use anyhow::{Result, bail};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector, node::Node};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::infrastructure::page_driver::{
    DriverError, DriverFactory, DriverResult, ElementHandle, FrameInfo, PageDriver, Scope,
};

/// Anything that can fetch an HTML document by URL
#[async_trait]
pub trait HtmlSource: Send + Sync {
    async fn fetch_html(&self, url: &Url) -> Result<String>;
}

fn page_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.to_string()
}

/// In-memory site keyed by URL, for offline snapshots and fixtures
#[derive(Debug, Clone, Default)]
pub struct StaticHtmlSource {
    pages: HashMap<String, String>,
}

impl StaticHtmlSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.insert(url, html);
        self
    }

    pub fn insert(&mut self, url: &str, html: &str) {
        let key = Url::parse(url).map_or_else(|_| url.to_string(), |u| page_key(&u));
        self.pages.insert(key, html.to_string());
    }
}

#[async_trait]
impl HtmlSource for StaticHtmlSource {
    async fn fetch_html(&self, url: &Url) -> Result<String> {
        let key = page_key(url);
        match self.pages.get(&key) {
            Some(html) => Ok(html.clone()),
            None => bail!("HTTP request failed with status 404 Not Found: {key}"),
        }
    }
}

#[derive(Debug, Clone)]
struct Document {
    url: Url,
    html: String,
}

#[derive(Debug, Clone)]
struct LoadedFrame {
    name: String,
    parent: Option<String>,
    depth: usize,
    document: Document,
}

pub const DEFAULT_MAX_FRAME_DEPTH: usize = 3;

pub struct DocumentPageDriver<S: HtmlSource> {
    source: Arc<S>,
    page: Option<Document>,
    frames: Vec<LoadedFrame>,
    max_frame_depth: usize,
    closed: bool,
}

impl<S: HtmlSource> DocumentPageDriver<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            page: None,
            frames: Vec::new(),
            max_frame_depth: DEFAULT_MAX_FRAME_DEPTH,
            closed: false,
        }
    }

    pub fn with_max_frame_depth(mut self, depth: usize) -> Self {
        self.max_frame_depth = depth;
        self
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed {
            Err(DriverError::Closed)
        } else {
            Ok(())
        }
    }

    async fn fetch(&self, url: &Url, timeout: Duration, operation: &str) -> DriverResult<Document> {
        ensure_fetchable(url)?;
        let mut target = url.clone();
        target.set_fragment(None);

        debug!("Fetching document: {}", target);
        let html = tokio::time::timeout(timeout, self.source.fetch_html(&target))
            .await
            .map_err(|_| DriverError::timeout(operation, timeout))?
            .map_err(|e| DriverError::navigation(&target, format!("{e:#}")))?;

        Ok(Document { url: target, html })
    }

    /// Load child frames of `parent` breadth-first, down to the depth limit
    async fn load_frames_of(&mut self, parent: Option<String>, document: &Document, depth: usize, timeout: Duration) {
        let mut pending: VecDeque<(Option<String>, String, Url, usize)> = frame_sources(document)
            .into_iter()
            .map(|(name, url)| (parent.clone(), name, url, depth))
            .collect();

        while let Some((parent, name, url, depth)) = pending.pop_front() {
            match self.fetch(&url, timeout, "frame load").await {
                Ok(child) => {
                    if depth < self.max_frame_depth {
                        pending.extend(
                            frame_sources(&child)
                                .into_iter()
                                .map(|(n, u)| (Some(name.clone()), n, u, depth + 1)),
                        );
                    }
                    self.frames.push(LoadedFrame {
                        name,
                        parent,
                        depth,
                        document: child,
                    });
                }
                Err(e) => warn!("Frame '{}' failed to load from {}: {}", name, url, e),
            }
        }
    }

    fn drop_descendants(&mut self, name: &str) {
        let mut doomed = vec![name.to_string()];
        while let Some(parent) = doomed.pop() {
            let children: Vec<String> = self
                .frames
                .iter()
                .filter(|f| f.parent.as_deref() == Some(parent.as_str()))
                .map(|f| f.name.clone())
                .collect();
            self.frames.retain(|f| f.parent.as_deref() != Some(parent.as_str()));
            doomed.extend(children);
        }
    }

    fn frame_index(&self, name: &str) -> Option<usize> {
        self.frames
            .iter()
            .position(|f| f.name == name)
            .or_else(|| self.frames.iter().position(|f| f.name.eq_ignore_ascii_case(name)))
    }

    fn document_for(&self, scope: &Scope) -> DriverResult<&Document> {
        match scope {
            Scope::Page => self.page.as_ref().ok_or(DriverError::NotLoaded),
            Scope::Frame(name) => self
                .frame_index(name)
                .map(|i| &self.frames[i].document)
                .ok_or_else(|| DriverError::not_found(format!("frame '{name}'"))),
        }
    }

    async fn navigate_frame(&mut self, index: usize, url: &Url, timeout: Duration) -> DriverResult<()> {
        let document = self.fetch(url, timeout, "frame navigation").await?;
        let name = self.frames[index].name.clone();
        let depth = self.frames[index].depth;
        self.drop_descendants(&name);

        // Index is stale once descendants are removed
        let index = self.frame_index(&name).ok_or_else(|| DriverError::not_found(format!("frame '{name}'")))?;
        self.frames[index].document = document.clone();
        if depth < self.max_frame_depth {
            self.load_frames_of(Some(name), &document, depth + 1, timeout).await;
        }
        Ok(())
    }
}

fn ensure_fetchable(url: &Url) -> DriverResult<()> {
    match url.scheme() {
        "http" | "https" | "file" => Ok(()),
        "javascript" => Err(DriverError::unsupported("javascript link")),
        other => Err(DriverError::navigation(url, format!("unsupported scheme '{other}'"))),
    }
}

#[async_trait]
impl<S: HtmlSource + 'static> PageDriver for DocumentPageDriver<S> {
    async fn goto(&mut self, url: &Url, timeout: Duration) -> DriverResult<()> {
        self.ensure_open()?;
        let document = self.fetch(url, timeout, "goto").await?;
        self.frames.clear();
        self.page = Some(document.clone());
        self.load_frames_of(None, &document, 1, timeout).await;
        debug!("Loaded {} with {} frame(s)", document.url, self.frames.len());
        Ok(())
    }

    async fn wait_for_load(&mut self, _timeout: Duration) -> DriverResult<()> {
        // Documents and frames are fully fetched before goto returns
        self.ensure_open()?;
        self.page.as_ref().map(|_| ()).ok_or(DriverError::NotLoaded)
    }

    fn current_url(&self) -> Option<Url> {
        self.page.as_ref().map(|p| p.url.clone())
    }

    async fn query_frames(&self) -> DriverResult<Vec<FrameInfo>> {
        self.ensure_open()?;
        Ok(self
            .frames
            .iter()
            .map(|f| FrameInfo {
                name: f.name.clone(),
                url: f.document.url.clone(),
            })
            .collect())
    }

    async fn find_by_selector(&self, scope: &Scope, selector: &str) -> DriverResult<Vec<ElementHandle>> {
        self.ensure_open()?;
        let document = self.document_for(scope)?;
        select_elements(document, scope, selector)
    }

    async fn click(&mut self, element: &ElementHandle, timeout: Duration) -> DriverResult<()> {
        self.ensure_open()?;
        let current = self.document_for(&element.scope)?;
        if current.url != element.document_url {
            return Err(DriverError::not_found(format!(
                "element from {} is no longer displayed",
                element.document_url
            )));
        }

        let href = element
            .resolved_href()
            .ok_or_else(|| DriverError::not_found("clickable href on element"))?;

        let target_frame = match element.target.as_deref().map(str::trim) {
            Some("_top" | "_parent" | "_blank") => None,
            Some(name) if !name.is_empty() && name != "_self" => self.frame_index(name),
            _ => match &element.scope {
                Scope::Page => None,
                Scope::Frame(name) => self.frame_index(name),
            },
        };

        match target_frame {
            Some(index) => self.navigate_frame(index, &href, timeout).await,
            None => self.goto(&href, timeout).await,
        }
    }

    async fn evaluate_script(
        &mut self,
        _scope: &Scope,
        _script: &str,
        _timeout: Duration,
    ) -> DriverResult<serde_json::Value> {
        self.ensure_open()?;
        Err(DriverError::unsupported("evaluate_script"))
    }

    async fn text_content(&self, scope: &Scope) -> DriverResult<String> {
        self.ensure_open()?;
        let document = self.document_for(scope)?;
        Ok(visible_text(&document.html))
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.page = None;
        self.frames.clear();
        self.closed = true;
        Ok(())
    }
}

/// Creates a [`DocumentPageDriver`] per acquisition, all sharing one source
pub struct DocumentDriverFactory<S: HtmlSource> {
    source: Arc<S>,
    max_frame_depth: usize,
}

impl<S: HtmlSource> DocumentDriverFactory<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            max_frame_depth: DEFAULT_MAX_FRAME_DEPTH,
        }
    }

    pub fn with_max_frame_depth(mut self, depth: usize) -> Self {
        self.max_frame_depth = depth;
        self
    }
}

#[async_trait]
impl<S: HtmlSource + 'static> DriverFactory for DocumentDriverFactory<S> {
    async fn acquire(&self) -> Result<Box<dyn PageDriver>> {
        Ok(Box::new(
            DocumentPageDriver::new(Arc::clone(&self.source)).with_max_frame_depth(self.max_frame_depth),
        ))
    }
}

fn frame_sources(document: &Document) -> Vec<(String, Url)> {
    let html = Html::parse_document(&document.html);
    let Ok(selector) = Selector::parse("frame[src], iframe[src]") else {
        return Vec::new();
    };

    html.select(&selector)
        .enumerate()
        .filter_map(|(i, frame)| {
            let attrs = frame.value();
            let src = attrs.attr("src")?.trim();
            let url = document.url.join(src).ok()?;
            let name = attrs
                .attr("name")
                .or_else(|| attrs.attr("id"))
                .map_or_else(|| format!("frame{i}"), str::to_string);
            Some((name, url))
        })
        .collect()
}

fn select_elements(document: &Document, scope: &Scope, selector: &str) -> DriverResult<Vec<ElementHandle>> {
    let parsed = Selector::parse(selector).map_err(|e| DriverError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })?;
    let html = Html::parse_document(&document.html);

    let base_target = Selector::parse("base[target]")
        .ok()
        .and_then(|s| html.select(&s).next())
        .and_then(|base| base.value().attr("target"))
        .map(str::to_string);

    Ok(html
        .select(&parsed)
        .map(|element| {
            let attrs = element.value();
            let attr = |name: &str| attrs.attr(name).map(str::to_string);
            ElementHandle {
                scope: scope.clone(),
                document_url: document.url.clone(),
                tag: attrs.name().to_string(),
                href: attr("href"),
                id: attr("id"),
                title: attr("title"),
                target: attr("target").or_else(|| base_target.clone()),
                text: element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" "),
            }
        })
        .collect())
}

const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "noscript", "noframes", "template"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "caption", "dd", "div", "dl", "dt",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "tbody", "tfoot", "thead", "tr", "ul",
];

const CELL_TAGS: &[&str] = &["td", "th"];

/// Visible text with one block element per line and cells separated by spaces
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let separator = if BLOCK_TAGS.contains(&name) {
                    Some('\n')
                } else if CELL_TAGS.contains(&name) {
                    Some(' ')
                } else {
                    None
                };
                if let Some(sep) = separator {
                    out.push(sep);
                }
                collect_text(child_element, out);
                if let Some(sep) = separator {
                    out.push(sep);
                }
            }
            _ => {}
        }
    }
}
