//! Application layer - the lookup pipeline
//!
//! Code → country → strategy instance → page text → raw fields → record.

pub mod aip_scraper;
pub mod airport_info_service;
pub mod country_resolver;
pub mod edition_resolver;
pub mod field_patterns;
pub mod navigation_engine;
pub mod normalize;
pub mod result_assembler;
pub mod scraper_registry;
pub mod section_extractor;

// Re-export commonly used items
pub use aip_scraper::AipScraper;
pub use airport_info_service::AirportInfoService;
pub use country_resolver::{CountryMatch, CountryResolver};
pub use navigation_engine::{NavigationEngine, NavigationSettings, PageText};
pub use scraper_registry::ScraperRegistry;
pub use section_extractor::SectionExtractor;
