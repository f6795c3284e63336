//! From a country's landing page to the text of one airport's AD 2 page
//!
//! The walk is a fixed sequence: open landing, resolve the current edition,
//! open it, locate the airport anchor in the navigation frame, then reach
//! the airport page through an ordered ladder of attempts. The first
//! attempt whose page mentions the code (or is long enough) wins; nothing
//! is ever extracted from a page that was not accepted.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::application::edition_resolver;
use crate::domain::{AipEdition, AirportCode, CountryProfile, NavigationStrategy};
use crate::infrastructure::config::NavigationConfig;
use crate::infrastructure::{AipError, AipResult, ElementHandle, FrameInfo, NavigationStage, PageDriver, Scope};

/// Frame name fragments marking the navigation region, in preference order
const NAVIGATION_FRAME_HINTS: &[&str] = &["navigation", "toc", "nav"];

const CONTENT_FRAME_HINT: &str = "content";

/// Menu entries clicked to expand a collapsed aerodrome list
const EXPAND_MENU_LABELS: &[&str] = &["AERODROMES", "PART 3"];

/// Timeouts and acceptance threshold for one walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationSettings {
    pub landing_timeout: Duration,
    pub edition_timeout: Duration,
    pub reach_timeout: Duration,
    /// Pages longer than this are accepted even without the code
    pub min_content_length: usize,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self::from(&NavigationConfig::default())
    }
}

impl From<&NavigationConfig> for NavigationSettings {
    fn from(config: &NavigationConfig) -> Self {
        Self {
            landing_timeout: config.landing_timeout(),
            edition_timeout: config.edition_timeout(),
            reach_timeout: config.reach_timeout(),
            min_content_length: config.min_content_length,
        }
    }
}

/// Accepted airport page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub url: Option<Url>,
    pub text: String,
    pub edition: AipEdition,
    /// Name of the ladder attempt that produced the page
    pub reached_via: String,
}

/// One way of reaching the airport page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReachAttempt {
    ClickAnchor(ElementHandle),
    ScriptedClick { scope: Scope, script: String },
    DirectUrl(Url),
    HyphenatedUrl(Url),
}

impl fmt::Display for ReachAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClickAnchor(_) => f.write_str("click anchor"),
            Self::ScriptedClick { .. } => f.write_str("scripted click"),
            Self::DirectUrl(url) => write!(f, "direct url {url}"),
            Self::HyphenatedUrl(url) => write!(f, "hyphenated url {url}"),
        }
    }
}

/// Executes ladder attempts
#[async_trait]
pub trait AttemptRunner<A: Sync>: Send {
    type Output: Send;

    async fn run(&mut self, attempt: &A) -> Result<Self::Output, String>;
}

/// Run `attempts` in order, stopping at the first output `accept` approves.
///
/// On exhaustion every attempt's failure is returned as `"{attempt}: {reason}"`.
pub async fn run_ladder<A, R, F>(
    runner: &mut R,
    attempts: &[A],
    accept: F,
) -> Result<(usize, R::Output), Vec<String>>
where
    A: fmt::Display + Sync,
    R: AttemptRunner<A>,
    F: Fn(&R::Output) -> Result<(), String>,
{
    let mut failures = Vec::with_capacity(attempts.len());
    for (index, attempt) in attempts.iter().enumerate() {
        match runner.run(attempt).await {
            Ok(output) => match accept(&output) {
                Ok(()) => return Ok((index, output)),
                Err(reason) => {
                    debug!("Attempt '{}' rejected: {}", attempt, reason);
                    failures.push(format!("{attempt}: {reason}"));
                }
            },
            Err(error) => {
                debug!("Attempt '{}' failed: {}", attempt, error);
                failures.push(format!("{attempt}: {error}"));
            }
        }
    }
    Err(failures)
}

/// Page reached by an attempt, before acceptance
#[derive(Debug, Clone)]
pub struct ReachedPage {
    pub url: Option<Url>,
    pub text: String,
}

struct DriverAttemptRunner<'a> {
    driver: &'a mut dyn PageDriver,
    timeout: Duration,
}

#[async_trait]
impl AttemptRunner<ReachAttempt> for DriverAttemptRunner<'_> {
    type Output = ReachedPage;

    async fn run(&mut self, attempt: &ReachAttempt) -> Result<ReachedPage, String> {
        match attempt {
            ReachAttempt::ClickAnchor(anchor) => {
                self.driver.click(anchor, self.timeout).await.map_err(|e| e.to_string())?;
            }
            ReachAttempt::ScriptedClick { scope, script } => {
                let clicked = self
                    .driver
                    .evaluate_script(scope, script, self.timeout)
                    .await
                    .map_err(|e| e.to_string())?;
                if clicked == serde_json::Value::Bool(false) {
                    return Err("scripted query matched no anchor".to_string());
                }
            }
            ReachAttempt::DirectUrl(url) | ReachAttempt::HyphenatedUrl(url) => {
                self.driver.goto(url, self.timeout).await.map_err(|e| e.to_string())?;
            }
        }
        self.driver.wait_for_load(self.timeout).await.map_err(|e| e.to_string())?;

        let frames = self.driver.query_frames().await.map_err(|e| e.to_string())?;
        let scope = content_scope(&frames);
        let text = self.driver.text_content(&scope).await.map_err(|e| e.to_string())?;
        Ok(ReachedPage {
            url: self.driver.current_url(),
            text,
        })
    }
}

/// Accept pages that mention the code, or are longer than `min_length` characters
pub fn accept_page(page: &ReachedPage, code: &AirportCode, min_length: usize) -> Result<(), String> {
    if page.text.to_uppercase().contains(code.as_str()) {
        return Ok(());
    }
    let length = page.text.chars().count();
    if length > min_length {
        warn!(
            "Accepting page for {} by length only ({} chars, code not present)",
            code, length
        );
        return Ok(());
    }
    Err(format!("page does not mention {code} ({length} chars)"))
}

/// Frames whose names mark a navigation region, in preference order, then the page
pub fn navigation_scopes(frames: &[FrameInfo]) -> Vec<Scope> {
    let mut scopes: Vec<Scope> = Vec::new();
    for hint in NAVIGATION_FRAME_HINTS {
        for frame in frames {
            let scope = Scope::frame(&frame.name);
            if frame.name.to_lowercase().contains(hint) && !scopes.contains(&scope) {
                scopes.push(scope);
            }
        }
    }
    scopes.push(Scope::Page);
    scopes
}

/// Content frame if there is one, else the whole page
pub fn content_scope(frames: &[FrameInfo]) -> Scope {
    frames
        .iter()
        .find(|frame| frame.name.to_lowercase().contains(CONTENT_FRAME_HINT))
        .map_or(Scope::Page, |frame| Scope::frame(&frame.name))
}

fn anchor_selector(code: &AirportCode) -> String {
    format!("a[href*='{code}'], a[id*='{code}'], a[title*='{code}']")
}

fn scripted_click(code: &AirportCode) -> String {
    format!(
        r#"(() => {{ const a = document.querySelector('a[href*="{code}"], a[id*="{code}"], a[title="{code}"]'); if (!a) return false; a.click(); return true; }})()"#
    )
}

/// Drives one page through the navigation walk
#[derive(Debug, Clone, Default)]
pub struct NavigationEngine {
    settings: NavigationSettings,
}

impl NavigationEngine {
    pub fn new(settings: NavigationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &NavigationSettings {
        &self.settings
    }

    pub async fn locate_airport_page(
        &self,
        driver: &mut dyn PageDriver,
        profile: &CountryProfile,
        code: &AirportCode,
    ) -> AipResult<PageText> {
        info!("Locating {} in the {} AIP", code, profile.name);

        let edition = self.resolve_edition(driver, profile, code).await?;
        info!(
            "Using edition {} ({})",
            edition.index_url, edition.effective_date_label
        );

        self.open_edition(driver, &edition, code).await?;

        let anchor = self.locate_anchor(driver, code).await;
        if anchor.is_none() {
            debug!("No anchor for {} in the navigation region", code);
        }

        let attempts = reach_ladder(profile, &edition, code, anchor);
        let mut runner = DriverAttemptRunner {
            driver,
            timeout: self.settings.reach_timeout,
        };
        let min_length = self.settings.min_content_length;

        match run_ladder(&mut runner, &attempts, |page| accept_page(page, code, min_length)).await {
            Ok((index, page)) => {
                let reached_via = attempts
                    .get(index)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                info!("Reached {} via {}", code, reached_via);
                Ok(PageText {
                    url: page.url,
                    text: page.text,
                    edition,
                    reached_via,
                })
            }
            Err(failures) => {
                warn!("All {} attempts to reach {} failed", failures.len(), code);
                Err(AipError::navigation_exhausted(
                    code.as_str(),
                    NavigationStage::ReachAirportPage,
                    failures,
                ))
            }
        }
    }

    async fn resolve_edition(
        &self,
        driver: &mut dyn PageDriver,
        profile: &CountryProfile,
        code: &AirportCode,
    ) -> AipResult<AipEdition> {
        match profile.strategy {
            NavigationStrategy::FixedEdition => {
                let index_url = parse_profile_url(profile, &profile.index_url)?;
                Ok(AipEdition::from_index_url(index_url, &[]))
            }
            NavigationStrategy::CurrentIssueLink => {
                self.open_landing(driver, profile, code).await?;
                let anchors = collect_anchors(driver).await;
                edition_resolver::resolve_current_edition(&anchors, profile.edition_hint.as_deref())
                    .ok_or_else(|| {
                        AipError::navigation(
                            code.as_str(),
                            NavigationStage::ResolveCurrentEdition,
                            format!(
                                "no current-issue link among {} anchors on {}",
                                anchors.len(),
                                profile.index_url
                            ),
                        )
                    })
            }
        }
    }

    async fn open_landing(
        &self,
        driver: &mut dyn PageDriver,
        profile: &CountryProfile,
        code: &AirportCode,
    ) -> AipResult<()> {
        let mut candidates = vec![profile.index_url.as_str()];
        candidates.extend(profile.alternate_landing_url.as_deref());

        let timeout = self.settings.landing_timeout;
        let mut failures = Vec::new();
        for candidate in candidates {
            let url = parse_profile_url(profile, candidate)?;
            let opened = match driver.goto(&url, timeout).await {
                Ok(()) => driver.wait_for_load(timeout).await,
                Err(e) => Err(e),
            };
            match opened {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!("Landing page {} failed: {}", url, e);
                    failures.push(format!("{url}: {e}"));
                    if !e.is_recoverable() {
                        break;
                    }
                }
            }
        }

        Err(AipError::navigation_exhausted(
            code.as_str(),
            NavigationStage::OpenLanding,
            failures,
        ))
    }

    async fn open_edition(
        &self,
        driver: &mut dyn PageDriver,
        edition: &AipEdition,
        code: &AirportCode,
    ) -> AipResult<()> {
        let timeout = self.settings.edition_timeout;
        let opened = match driver.goto(&edition.index_url, timeout).await {
            Ok(()) => driver.wait_for_load(timeout).await,
            Err(e) => Err(e),
        };
        opened.map_err(|e| {
            AipError::navigation(
                code.as_str(),
                NavigationStage::OpenEdition,
                format!("{}: {e}", edition.index_url),
            )
        })
    }

    /// Best-effort search; `None` lets the ladder start at the URL conventions
    async fn locate_anchor(&self, driver: &mut dyn PageDriver, code: &AirportCode) -> Option<ElementHandle> {
        if let Some(anchor) = find_code_anchor(driver, code).await {
            return Some(anchor);
        }

        // Collapsed menus hide the aerodrome list until a section is opened
        let frames = driver.query_frames().await.unwrap_or_default();
        for scope in navigation_scopes(&frames) {
            let Ok(anchors) = driver.find_by_selector(&scope, "a[href]").await else {
                continue;
            };
            let expander = anchors.into_iter().find(|a| {
                let text = a.text.to_uppercase();
                EXPAND_MENU_LABELS.iter().any(|label| text.contains(label))
            });
            if let Some(expander) = expander {
                debug!("Expanding menu entry '{}'", expander.text);
                if let Err(e) = driver.click(&expander, self.settings.reach_timeout).await {
                    debug!("Menu expansion failed: {}", e);
                }
                return find_code_anchor(driver, code).await;
            }
        }
        None
    }
}

async fn find_code_anchor(driver: &mut dyn PageDriver, code: &AirportCode) -> Option<ElementHandle> {
    let frames = driver.query_frames().await.unwrap_or_default();
    let selector = anchor_selector(code);
    for scope in navigation_scopes(&frames) {
        match driver.find_by_selector(&scope, &selector).await {
            Ok(anchors) if !anchors.is_empty() => {
                let preferred = anchors
                    .iter()
                    .position(|a| a.resolved_href().is_some())
                    .unwrap_or(0);
                return anchors.into_iter().nth(preferred);
            }
            Ok(_) => {}
            Err(e) => debug!("Anchor query in {:?} failed: {}", scope, e),
        }
    }
    None
}

/// Anchors of the page and every loaded frame
async fn collect_anchors(driver: &mut dyn PageDriver) -> Vec<ElementHandle> {
    let mut scopes = vec![Scope::Page];
    if let Ok(frames) = driver.query_frames().await {
        scopes.extend(frames.iter().map(|f| Scope::frame(&f.name)));
    }

    let mut anchors = Vec::new();
    for scope in scopes {
        match driver.find_by_selector(&scope, "a[href]").await {
            Ok(found) => anchors.extend(found),
            Err(e) => debug!("Anchor collection in {:?} failed: {}", scope, e),
        }
    }
    anchors
}

fn parse_profile_url(profile: &CountryProfile, raw: &str) -> AipResult<Url> {
    Url::parse(raw).map_err(|e| {
        AipError::configuration(format!("invalid URL '{raw}' in profile {}: {e}", profile.name))
    })
}

/// Ordered reach attempts. Anchor-based attempts only exist when an anchor was found.
pub fn reach_ladder(
    profile: &CountryProfile,
    edition: &AipEdition,
    code: &AirportCode,
    anchor: Option<ElementHandle>,
) -> Vec<ReachAttempt> {
    let mut attempts = Vec::with_capacity(4);
    if let Some(anchor) = anchor {
        let scope = anchor.scope.clone();
        attempts.push(ReachAttempt::ClickAnchor(anchor));
        attempts.push(ReachAttempt::ScriptedClick {
            scope,
            script: scripted_click(code),
        });
    }

    let prefix = profile.document_prefix_for(code);
    let direct = format!("eAIP/{prefix}-AD-2.{code}-en-GB.html");
    let hyphenated = format!("eAIP/{prefix}-AD-2-{code}-en-GB.html");

    match edition.document_url(&direct) {
        Ok(url) => attempts.push(ReachAttempt::DirectUrl(url)),
        Err(e) => warn!("Cannot build direct URL for {}: {}", code, e),
    }
    match edition.document_url(&hyphenated) {
        Ok(url) => attempts.push(ReachAttempt::HyphenatedUrl(url)),
        Err(e) => warn!("Cannot build hyphenated URL for {}: {}", code, e),
    }
    attempts
}
