//! Country → scraper cache with default-country fallback
//!
//! Scrapers are built lazily, once per country. The whole
//! check-then-construct path runs under one async mutex, so two concurrent
//! callers never build two scrapers for the same country.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::application::aip_scraper::AipScraper;
use crate::application::navigation_engine::NavigationSettings;
use crate::domain::ProfileCatalog;
use crate::infrastructure::{AipError, AipResult, DriverFactory};

pub struct ScraperRegistry {
    catalog: ProfileCatalog,
    factory: Arc<dyn DriverFactory>,
    settings: NavigationSettings,
    default_country: String,
    instances: Mutex<HashMap<String, Arc<AipScraper>>>,
}

impl ScraperRegistry {
    pub fn init(
        catalog: ProfileCatalog,
        factory: Arc<dyn DriverFactory>,
        settings: NavigationSettings,
        default_country: &str,
    ) -> Self {
        if !catalog.contains(default_country) {
            warn!("Default country '{}' has no registered profile", default_country);
        }
        info!(
            "Scraper registry initialized with {} profiles (default: {})",
            catalog.len(),
            default_country
        );
        Self {
            catalog,
            factory,
            settings,
            default_country: default_country.to_string(),
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Scraper for `country`, falling back to the default country's scraper.
    ///
    /// Fails only when the default cannot be built either.
    pub async fn get_instance(&self, country: &str) -> AipResult<Arc<AipScraper>> {
        let mut instances = self.instances.lock().await;

        match self.instance_locked(&mut instances, country) {
            Ok(scraper) => Ok(scraper),
            Err(error) => {
                if country.eq_ignore_ascii_case(&self.default_country) {
                    return Err(error);
                }
                warn!(
                    "No usable scraper for '{}' ({}); falling back to {}",
                    country, error, self.default_country
                );
                let default_country = self.default_country.clone();
                self.instance_locked(&mut instances, &default_country)
                    .map_err(|default_error| match default_error {
                        AipError::UnsupportedCountry { .. } => AipError::unsupported_country(country),
                        other => other,
                    })
            }
        }
    }

    fn instance_locked(
        &self,
        instances: &mut HashMap<String, Arc<AipScraper>>,
        country: &str,
    ) -> AipResult<Arc<AipScraper>> {
        let key = country.trim().to_lowercase();
        if let Some(existing) = instances.get(&key) {
            return Ok(Arc::clone(existing));
        }

        let profile = self
            .catalog
            .get(country)
            .cloned()
            .ok_or_else(|| AipError::unsupported_country(country))?;

        debug!("Constructing {:?} scraper for {}", profile.strategy, profile.name);
        let scraper = Arc::new(AipScraper::for_profile(
            profile,
            Arc::clone(&self.factory),
            self.settings,
        )?);
        instances.insert(key, Arc::clone(&scraper));
        Ok(scraper)
    }

    /// Countries with a registered profile, sorted
    pub fn list_available(&self) -> Vec<String> {
        self.catalog.names()
    }

    pub fn default_country(&self) -> &str {
        &self.default_country
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    pub async fn cached_count(&self) -> usize {
        self.instances.lock().await.len()
    }

    /// Release every cached scraper's page and empty the cache
    pub async fn teardown(&self) {
        let drained: Vec<Arc<AipScraper>> = {
            let mut instances = self.instances.lock().await;
            instances.drain().map(|(_, scraper)| scraper).collect()
        };
        for scraper in &drained {
            scraper.release().await;
        }
        info!("Scraper registry torn down ({} instance(s) released)", drained.len());
    }
}
