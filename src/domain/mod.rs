//! Domain module - airports, countries and the records produced for them
//!
//! Plain data and value types. Nothing here performs I/O except loading
//! extra country profiles from disk.

pub mod airport;
pub mod constants;
pub mod country;
pub mod edition;
pub mod prefix_table;

// Re-export commonly used items
pub use airport::{AirportCode, AirportRecord, Contact};
pub use country::{CountryProfile, NavigationStrategy, ProfileCatalog, Region, ResourcePolicy};
pub use edition::AipEdition;
