#![allow(missing_docs)]

fn main() -> std::process::ExitCode {
    aip_ops_scraper_lib::cli::run()
}
