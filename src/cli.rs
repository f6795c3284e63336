//! Command-line front end
//!
//! Records are printed to stdout as JSON, one per line (or pretty-printed).
//! Logs go to stderr so the output stays machine-readable.

use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};

use crate::application::{AirportInfoService, CountryResolver};
use crate::domain::ProfileCatalog;
use crate::infrastructure::{AipError, AppConfig, ConfigManager, init_logging_with_config, logging};

#[derive(Parser, Debug)]
#[command(name = "aip-ops-scraper")]
#[command(version, about = "Airport operational data from national eAIP publications", long_about = None)]
#[command(after_help = "EXAMPLES:
    aip-ops-scraper lookup EVRA EETN   Print operational records as JSON
    aip-ops-scraper resolve KJFK       Show the country an ICAO code belongs to
    aip-ops-scraper countries          List countries with a registered scraper")]
pub struct Cli {
    /// Configuration file (JSON); defaults to the user config directory
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up one or more airports
    Lookup {
        /// ICAO location indicators
        #[arg(value_name = "CODE", required = true)]
        codes: Vec<String>,

        /// Pretty-print each record
        #[arg(short, long)]
        pretty: bool,
    },
    /// List countries with a registered scraper
    Countries,
    /// Resolve the country of an airport code without navigating
    Resolve {
        #[arg(value_name = "CODE")]
        code: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(execute(cli))
}

async fn execute(cli: Cli) -> ExitCode {
    let config = load_config(cli.config.as_deref()).await;

    if let Err(e) = init_logging_with_config(config.logging.clone()) {
        eprintln!("warning: logging disabled: {e:#}");
    } else {
        logging::log_system_info();
    }

    match cli.command {
        Command::Resolve { code } => resolve(&code),
        Command::Countries => countries(&config).await,
        Command::Lookup { codes, pretty } => lookup(&config, &codes, pretty).await,
    }
}

async fn load_config(path: Option<&std::path::Path>) -> AppConfig {
    if let Some(path) = path {
        return match AppConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("warning: {e}; using defaults");
                AppConfig::default()
            }
        };
    }

    let loaded = match ConfigManager::new() {
        Ok(manager) => manager.initialize_on_first_run().await,
        Err(e) => Err(e),
    };
    loaded.unwrap_or_else(|e| {
        eprintln!("warning: {e:#}; using defaults");
        AppConfig::default()
    })
}

fn resolve(raw: &str) -> ExitCode {
    match crate::domain::AirportCode::parse(raw) {
        Ok(code) => match CountryResolver::standard().resolve_info(code.as_str()) {
            Some(found) => {
                let resolved = json!({
                    "code": code.as_str(),
                    "country": found.country,
                    "prefix": found.prefix,
                    "region": found.region,
                });
                println!("{resolved}");
                ExitCode::SUCCESS
            }
            None => {
                print_error(raw, &AipError::unsupported_country(&format!("<unresolved {code}>")));
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            print_error(raw, &e);
            ExitCode::FAILURE
        }
    }
}

async fn countries(config: &AppConfig) -> ExitCode {
    let mut catalog = ProfileCatalog::embedded();
    if let Some(path) = &config.registry.profiles_path {
        match ProfileCatalog::load_file(path).await {
            Ok(extra) => catalog.merge(extra),
            Err(e) => warn!("Ignoring extra profiles: {:#}", e),
        }
    }
    for name in catalog.names() {
        println!("{name}");
    }
    ExitCode::SUCCESS
}

async fn lookup(config: &AppConfig, codes: &[String], pretty: bool) -> ExitCode {
    let service = match AirportInfoService::from_config(config).await {
        Ok(service) => service,
        Err(e) => {
            error!("Failed to initialize lookup service: {:#}", e);
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let results = futures::future::join_all(codes.iter().map(|code| service.get_airport_info(code))).await;
    service.shutdown().await;

    let mut failed = 0usize;
    for (code, result) in codes.iter().zip(results) {
        match result {
            Ok(record) => {
                let rendered = if pretty {
                    serde_json::to_string_pretty(&record)
                } else {
                    serde_json::to_string(&record)
                };
                match rendered {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        failed += 1;
                        eprintln!("error: failed to serialize {code}: {e}");
                    }
                }
            }
            Err(e) => {
                failed += 1;
                print_error(code, &e);
            }
        }
    }

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_error(code: &str, error: &AipError) {
    println!("{}", error_json(code, error));
}

/// Error line printed in place of a record; `recoverable` tells callers a retry may help
fn error_json(code: &str, error: &AipError) -> serde_json::Value {
    json!({
        "code": code.trim(),
        "error": error.kind(),
        "recoverable": error.is_recoverable(),
        "message": error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_lookup_parses_codes_and_flags() {
        let cli = Cli::try_parse_from(["aip-ops-scraper", "lookup", "EVRA", "eetn", "--pretty"]).unwrap();
        match cli.command {
            Command::Lookup { codes, pretty } => {
                assert_eq!(codes, vec!["EVRA", "eetn"]);
                assert!(pretty);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_lookup_requires_a_code() {
        assert!(Cli::try_parse_from(["aip-ops-scraper", "lookup"]).is_err());
    }

    #[test]
    fn test_error_json_marks_recoverable_failures() {
        let failure = AipError::navigation("EVRA", crate::infrastructure::NavigationStage::OpenLanding, "HTTP 503");
        let line = error_json(" EVRA ", &failure);
        assert_eq!(line["code"], "EVRA");
        assert_eq!(line["error"], "navigation_failure");
        assert_eq!(line["recoverable"], true);

        let line = error_json("QQQQ", &AipError::unsupported_country("<unresolved QQQQ>"));
        assert_eq!(line["recoverable"], false);
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["aip-ops-scraper", "resolve", "KJFK", "--config", "/tmp/x.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.json")));
    }
}
