//! Infrastructure layer for HTTP access, page automation, configuration and logging
//!
//! Everything that touches the network, the file system or the process-wide
//! tracing subscriber lives here.

pub mod aip_error;  // Lookup error taxonomy
pub mod config;  // Configuration loading and defaults
pub mod document_driver;  // Page driver over fetched HTML documents
pub mod http_client;  // Rate-limited reqwest client
pub mod logging;  // Logging infrastructure
pub mod page_driver;  // Page automation capability

// Re-export commonly used items
pub use aip_error::{AipError, AipResult, NavigationStage};
pub use config::{AppConfig, ConfigManager};
pub use document_driver::{DocumentDriverFactory, DocumentPageDriver, HtmlSource, StaticHtmlSource};
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use page_driver::{DriverError, DriverFactory, ElementHandle, FrameInfo, PageDriver, Scope};
