//! One country's scraper: a profile, the navigation walk and a page resource
//!
//! A scraper owns at most one page at a time. With [`ResourcePolicy::Reuse`]
//! the page is acquired on first use and kept until [`AipScraper::release`];
//! with [`ResourcePolicy::PerCall`] every lookup acquires a fresh page and
//! closes it before returning, whatever the outcome.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::application::navigation_engine::{NavigationEngine, NavigationSettings};
use crate::application::result_assembler;
use crate::application::section_extractor::SectionExtractor;
use crate::domain::{AirportCode, AirportRecord, CountryProfile, NavigationStrategy, ResourcePolicy};
use crate::infrastructure::{AipError, AipResult, DriverFactory, PageDriver};

/// Builds a scraper for a profile of one navigation strategy
pub type StrategyConstructor =
    fn(CountryProfile, Arc<dyn DriverFactory>, NavigationSettings) -> AipResult<AipScraper>;

/// Constructor for `strategy`, chosen at compile time
pub fn constructor_for(strategy: NavigationStrategy) -> StrategyConstructor {
    match strategy {
        NavigationStrategy::CurrentIssueLink => construct_current_issue,
        NavigationStrategy::FixedEdition => construct_fixed_edition,
    }
}

fn construct_current_issue(
    profile: CountryProfile,
    factory: Arc<dyn DriverFactory>,
    settings: NavigationSettings,
) -> AipResult<AipScraper> {
    check_url(&profile, &profile.index_url, "landing")?;
    if let Some(alternate) = &profile.alternate_landing_url {
        check_url(&profile, alternate, "alternate landing")?;
    }
    Ok(AipScraper::new(profile, factory, settings))
}

fn construct_fixed_edition(
    profile: CountryProfile,
    factory: Arc<dyn DriverFactory>,
    settings: NavigationSettings,
) -> AipResult<AipScraper> {
    let url = check_url(&profile, &profile.index_url, "edition index")?;
    if url.path().ends_with('/') {
        debug!("{} edition index {} is a directory", profile.name, url);
    }
    Ok(AipScraper::new(profile, factory, settings))
}

fn check_url(profile: &CountryProfile, raw: &str, role: &str) -> AipResult<Url> {
    let url = Url::parse(raw).map_err(|e| {
        AipError::configuration(format!("{} {role} URL '{raw}' is invalid: {e}", profile.name))
    })?;
    match url.scheme() {
        "http" | "https" | "file" => Ok(url),
        other => Err(AipError::configuration(format!(
            "{} {role} URL '{raw}' has unsupported scheme '{other}'",
            profile.name
        ))),
    }
}

pub struct AipScraper {
    profile: CountryProfile,
    engine: NavigationEngine,
    factory: Arc<dyn DriverFactory>,
    page: Mutex<Option<Box<dyn PageDriver>>>,
}

impl AipScraper {
    fn new(profile: CountryProfile, factory: Arc<dyn DriverFactory>, settings: NavigationSettings) -> Self {
        Self {
            profile,
            engine: NavigationEngine::new(settings),
            factory,
            page: Mutex::new(None),
        }
    }

    /// Build through the constructor registered for the profile's strategy
    pub fn for_profile(
        profile: CountryProfile,
        factory: Arc<dyn DriverFactory>,
        settings: NavigationSettings,
    ) -> AipResult<Self> {
        constructor_for(profile.strategy)(profile, factory, settings)
    }

    pub fn profile(&self) -> &CountryProfile {
        &self.profile
    }

    pub fn country(&self) -> &str {
        &self.profile.name
    }

    /// Whether a reusable page is currently held
    pub async fn holds_page(&self) -> bool {
        self.page.lock().await.is_some()
    }

    /// Look up one airport. Lookups on the same scraper run one at a time.
    pub async fn get_airport_info(&self, code: &AirportCode) -> AipResult<AirportRecord> {
        let mut slot = self.page.lock().await;

        match self.profile.resource_policy {
            ResourcePolicy::Reuse => {
                if slot.is_none() {
                    *slot = Some(self.acquire().await?);
                }
                match slot.as_deref_mut() {
                    Some(driver) => self.lookup(driver, code).await,
                    None => Err(AipError::resource_init(&self.profile.name, "page slot is empty")),
                }
            }
            ResourcePolicy::PerCall => {
                let mut driver = self.acquire().await?;
                let result = self.lookup(driver.as_mut(), code).await;
                if let Err(e) = driver.close().await {
                    warn!("Failed to close page for {}: {}", self.profile.name, e);
                }
                result
            }
        }
    }

    /// Close the held page, if any
    pub async fn release(&self) {
        let mut slot = self.page.lock().await;
        if let Some(mut driver) = slot.take() {
            if let Err(e) = driver.close().await {
                warn!("Failed to close page for {}: {}", self.profile.name, e);
            }
            debug!("Released page for {}", self.profile.name);
        }
    }

    async fn acquire(&self) -> AipResult<Box<dyn PageDriver>> {
        self.factory
            .acquire()
            .await
            .map_err(|e| AipError::resource_init(&self.profile.name, format!("{e:#}")))
    }

    async fn lookup(&self, driver: &mut dyn PageDriver, code: &AirportCode) -> AipResult<AirportRecord> {
        let page = self.engine.locate_airport_page(driver, &self.profile, code).await?;

        let extractor = SectionExtractor::for_airport(code.clone());
        let fields = extractor.extract_standard(&page.text);
        let contacts = extractor.extract_contacts(&page.text);
        info!(
            "Extracted {} fields and {} contact(s) for {} from {}",
            fields.len(),
            contacts.len(),
            code,
            page.url.as_ref().map_or("<unknown>", Url::as_str)
        );

        Ok(result_assembler::assemble(code, &fields, contacts))
    }
}

impl std::fmt::Debug for AipScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AipScraper")
            .field("country", &self.profile.name)
            .field("strategy", &self.profile.strategy)
            .field("resource_policy", &self.profile.resource_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Region;
    use crate::infrastructure::{DocumentDriverFactory, StaticHtmlSource};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const INDEX: &str = "https://eaip.example.org/2025-10-30/html/index-en-GB.html";

    fn site() -> StaticHtmlSource {
        StaticHtmlSource::new()
            .with_page(INDEX, "<html><body><p>Index</p></body></html>")
            .with_page(
                "https://eaip.example.org/2025-10-30/html/eAIP/EV-AD-2.EVRA-en-GB.html",
                "<html><body><h3>EVRA AD 2.3 OPERATIONAL HOURS</h3>\
                 <table><tr><td>AD Operator</td><td>H24</td></tr></table></body></html>",
            )
    }

    struct CountingFactory {
        inner: DocumentDriverFactory<StaticHtmlSource>,
        acquired: AtomicUsize,
    }

    #[async_trait]
    impl DriverFactory for CountingFactory {
        async fn acquire(&self) -> anyhow::Result<Box<dyn PageDriver>> {
            self.acquired.fetch_add(1, Ordering::SeqCst);
            self.inner.acquire().await
        }
    }

    struct FailingFactory;

    #[async_trait]
    impl DriverFactory for FailingFactory {
        async fn acquire(&self) -> anyhow::Result<Box<dyn PageDriver>> {
            anyhow::bail!("browser binary not found")
        }
    }

    fn counting() -> Arc<CountingFactory> {
        Arc::new(CountingFactory {
            inner: DocumentDriverFactory::new(Arc::new(site())),
            acquired: AtomicUsize::new(0),
        })
    }

    fn code() -> AirportCode {
        AirportCode::parse("EVRA").unwrap()
    }

    #[test]
    fn test_constructor_rejects_bad_urls() {
        let profile = CountryProfile::current_issue("Nowhere", Region::Europe, "not a url");
        let error = AipScraper::for_profile(profile, counting(), NavigationSettings::default()).unwrap_err();
        assert!(matches!(error, AipError::Configuration { .. }));

        let profile = CountryProfile::fixed_edition("Nowhere", Region::Europe, "ftp://ais.example/eaip/");
        assert!(AipScraper::for_profile(profile, counting(), NavigationSettings::default()).is_err());
    }

    #[tokio::test]
    async fn test_reuse_keeps_one_page() {
        let factory = counting();
        let profile = CountryProfile::fixed_edition("Latvia", Region::Europe, INDEX);
        let scraper = AipScraper::for_profile(profile, factory.clone(), NavigationSettings::default()).unwrap();

        let first = scraper.get_airport_info(&code()).await.unwrap();
        let second = scraper.get_airport_info(&code()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.ad_operator, "H24");
        assert_eq!(factory.acquired.load(Ordering::SeqCst), 1);
        assert!(scraper.holds_page().await);

        scraper.release().await;
        assert!(!scraper.holds_page().await);
    }

    #[tokio::test]
    async fn test_per_call_releases_on_every_exit() {
        let factory = counting();
        let profile = CountryProfile::fixed_edition("Latvia", Region::Europe, INDEX).per_call();
        let scraper = AipScraper::for_profile(profile, factory.clone(), NavigationSettings::default()).unwrap();

        scraper.get_airport_info(&code()).await.unwrap();
        let missing = AirportCode::parse("EVLA").unwrap();
        assert!(scraper.get_airport_info(&missing).await.is_err());

        assert_eq!(factory.acquired.load(Ordering::SeqCst), 2);
        assert!(!scraper.holds_page().await);
    }

    #[tokio::test]
    async fn test_acquire_failure_is_resource_init() {
        let profile = CountryProfile::fixed_edition("Latvia", Region::Europe, INDEX);
        let scraper =
            AipScraper::for_profile(profile, Arc::new(FailingFactory), NavigationSettings::default()).unwrap();
        let error = scraper.get_airport_info(&code()).await.unwrap_err();
        match error {
            AipError::ResourceInitFailure { country, reason } => {
                assert_eq!(country, "Latvia");
                assert!(reason.contains("browser binary"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
