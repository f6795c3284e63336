//! Lookup entry point: airport code in, operational record out

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::application::country_resolver::{CountryMatch, CountryResolver};
use crate::application::navigation_engine::NavigationSettings;
use crate::application::scraper_registry::ScraperRegistry;
use crate::domain::{AirportCode, AirportRecord, ProfileCatalog};
use crate::infrastructure::{
    AipError, AipResult, AppConfig, DocumentDriverFactory, DriverFactory, HttpClient,
};

pub struct AirportInfoService {
    resolver: CountryResolver,
    registry: Arc<ScraperRegistry>,
    unresolved_fallback: Option<String>,
}

impl AirportInfoService {
    pub fn new(resolver: CountryResolver, registry: Arc<ScraperRegistry>) -> Self {
        Self {
            resolver,
            registry,
            unresolved_fallback: None,
        }
    }

    /// Country used for codes whose prefix is not in the table
    pub fn with_unresolved_fallback(mut self, country: Option<String>) -> Self {
        self.unresolved_fallback = country;
        self
    }

    /// Wire the HTTP-backed pipeline from configuration.
    ///
    /// Extra profiles from `registry.profiles_path` override embedded ones.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let http = HttpClient::new(config.http.clone()).context("Failed to build HTTP client")?;
        let factory: Arc<dyn DriverFactory> = Arc::new(DocumentDriverFactory::new(Arc::new(http)));

        let mut catalog = ProfileCatalog::embedded();
        if let Some(path) = &config.registry.profiles_path {
            let extra = ProfileCatalog::load_file(path).await?;
            info!("Loaded {} extra country profile(s) from {:?}", extra.len(), path);
            catalog.merge(extra);
        }

        let registry = ScraperRegistry::init(
            catalog,
            factory,
            NavigationSettings::from(&config.navigation),
            &config.registry.default_country,
        );

        Ok(Self::new(CountryResolver::standard(), Arc::new(registry))
            .with_unresolved_fallback(config.registry.unresolved_fallback.clone()))
    }

    pub fn registry(&self) -> &ScraperRegistry {
        &self.registry
    }

    /// Country and prefix for a raw code, without any navigation
    pub fn resolve(&self, raw_code: &str) -> AipResult<Option<CountryMatch>> {
        let code = AirportCode::parse(raw_code)?;
        Ok(self.resolver.resolve_info(code.as_str()))
    }

    pub async fn get_airport_info(&self, raw_code: &str) -> AipResult<AirportRecord> {
        let session = Uuid::new_v4();
        let span = info_span!("lookup", code = %raw_code.trim(), session = %session);
        self.lookup(raw_code).instrument(span).await
    }

    async fn lookup(&self, raw_code: &str) -> AipResult<AirportRecord> {
        let code = AirportCode::parse(raw_code)?;

        let country = match self.resolver.resolve(code.as_str()) {
            Some(country) => country.to_string(),
            None => match &self.unresolved_fallback {
                Some(fallback) => {
                    warn!("No country prefix matches {}; using {}", code, fallback);
                    fallback.clone()
                }
                None => return Err(AipError::unsupported_country(&format!("<unresolved {code}>"))),
            },
        };
        info!("{} resolved to {}", code, country);

        let scraper = self.registry.get_instance(&country).await?;
        let record = scraper.get_airport_info(&code).await?;
        info!("Lookup for {} complete", code);
        Ok(record)
    }

    /// Release every page resource held by cached scrapers
    pub async fn shutdown(&self) {
        self.registry.teardown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CountryProfile, Region};
    use crate::infrastructure::StaticHtmlSource;

    fn service(fallback: Option<&str>) -> AirportInfoService {
        let catalog = ProfileCatalog::from_profiles([CountryProfile::fixed_edition(
            "Latvia",
            Region::Europe,
            "https://eaip.example.org/index.html",
        )]);
        let factory = Arc::new(DocumentDriverFactory::new(Arc::new(StaticHtmlSource::new())));
        let registry = ScraperRegistry::init(catalog, factory, NavigationSettings::default(), "Latvia");
        AirportInfoService::new(CountryResolver::standard(), Arc::new(registry))
            .with_unresolved_fallback(fallback.map(str::to_string))
    }

    #[tokio::test]
    async fn test_invalid_code_is_rejected_before_navigation() {
        let error = service(None).get_airport_info("E1").await.unwrap_err();
        assert!(matches!(error, AipError::InvalidAirportCode { .. }));
    }

    #[tokio::test]
    async fn test_unresolved_code_without_fallback_is_unsupported() {
        let error = service(None).get_airport_info("QQQQ").await.unwrap_err();
        assert!(matches!(error, AipError::UnsupportedCountry { .. }));
    }

    #[tokio::test]
    async fn test_unresolved_code_uses_fallback() {
        let service = service(Some("Latvia"));
        let error = service.get_airport_info("QQQQ").await.unwrap_err();
        // The fallback scraper runs; the empty fixture site cannot be navigated
        assert!(matches!(error, AipError::NavigationFailure { .. }));
        assert_eq!(service.registry().cached_count().await, 1);
    }

    #[test]
    fn test_resolve_reports_prefix() {
        let info = service(None).resolve("kjfk").unwrap().unwrap();
        assert_eq!(info.country, "United States of America");
        assert_eq!(info.prefix, "K");
    }

    #[tokio::test]
    async fn test_shutdown_clears_registry() {
        let service = service(Some("Latvia"));
        let _ = service.get_airport_info("EVRA").await;
        service.shutdown().await;
        assert_eq!(service.registry().cached_count().await, 0);
    }
}
