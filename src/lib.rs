//! AIP Ops Scraper - airport operational data from national eAIP publications
//!
//! Given an ICAO location indicator, the library works out which country
//! publishes it, walks that country's frame-based eAIP to the aerodrome page
//! and reads the AD 2.x operational sections into a fixed-shape record.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export the lookup surface for easier access
pub use application::AirportInfoService;
pub use domain::{AirportCode, AirportRecord, Contact};
pub use infrastructure::aip_error::{AipError, AipResult};
