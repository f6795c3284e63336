//! ICAO code → country resolution
//!
//! Pure lookup over the standard prefix table. The longest matching prefix
//! wins; only 3, 2 and 1 character prefixes are tried.

use serde::Serialize;
use std::collections::HashMap;

use crate::domain::constants::code;
use crate::domain::country::Region;
use crate::domain::prefix_table::STANDARD_PREFIXES;

/// Prefix lengths tried, longest first
const PREFIX_LENGTHS: [usize; 3] = [3, 2, 1];

/// Country resolved for an airport code, with the prefix that matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryMatch {
    pub country: String,
    pub prefix: String,
    pub region: Region,
}

#[derive(Debug, Clone)]
pub struct CountryResolver {
    table: HashMap<&'static str, (&'static str, Region)>,
}

impl Default for CountryResolver {
    fn default() -> Self {
        Self::standard()
    }
}

impl CountryResolver {
    /// Resolver over the standard table. Duplicate prefixes keep the last entry.
    pub fn standard() -> Self {
        Self::from_entries(STANDARD_PREFIXES)
    }

    pub fn from_entries(entries: &[(&'static str, &'static str, Region)]) -> Self {
        let table = entries
            .iter()
            .map(|(prefix, country, region)| (*prefix, (*country, *region)))
            .collect();
        Self { table }
    }

    /// Country for `code`, or `None` for codes under 3 characters and misses
    pub fn resolve(&self, code: &str) -> Option<&'static str> {
        self.lookup(code).map(|(_, country, _)| country)
    }

    /// Like [`resolve`](Self::resolve) but also reports the prefix and region
    pub fn resolve_info(&self, code: &str) -> Option<CountryMatch> {
        self.lookup(code).map(|(prefix, country, region)| CountryMatch {
            country: country.to_string(),
            prefix,
            region,
        })
    }

    /// Table entry for an exact prefix
    pub fn prefix_country(&self, prefix: &str) -> Option<&'static str> {
        self.table
            .get(prefix.trim().to_uppercase().as_str())
            .map(|(country, _)| *country)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn lookup(&self, code: &str) -> Option<(String, &'static str, Region)> {
        let normalized = code.trim().to_uppercase();
        if normalized.chars().count() < code::MIN_LEN {
            return None;
        }

        PREFIX_LENGTHS.iter().find_map(|&len| {
            let prefix: String = normalized.chars().take(len).collect();
            self.table
                .get(prefix.as_str())
                .map(|(country, region)| (prefix, *country, *region))
        })
    }
}
