//! Country profiles: where each national eAIP lives and how to enter it
//!
//! A profile is pure data. The navigation engine interprets it, so adding a
//! country that follows the common eAIP layout is a catalog entry, not code.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::domain::airport::AirportCode;
use crate::domain::prefix_table;

/// World region a prefix table entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    NorthAmerica,
    SouthAmerica,
    Europe,
    Asia,
    Africa,
    Oceania,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NorthAmerica => "North America",
            Self::SouthAmerica => "South America",
            Self::Europe => "Europe",
            Self::Asia => "Asia",
            Self::Africa => "Africa",
            Self::Oceania => "Oceania",
        };
        f.write_str(label)
    }
}

/// How the current edition is found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationStrategy {
    /// Landing page lists editions; follow the link to the current one
    CurrentIssueLink,
    /// `index_url` already is the edition index document
    FixedEdition,
}

impl fmt::Display for NavigationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrentIssueLink => f.write_str("current_issue_link"),
            Self::FixedEdition => f.write_str("fixed_edition"),
        }
    }
}

/// Lifetime of the page resource a strategy instance drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourcePolicy {
    /// Acquired on first use, kept until registry teardown
    #[default]
    Reuse,
    /// Acquired and released around every lookup
    PerCall,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryProfile {
    pub name: String,
    /// Location-indicator prefixes that resolve to this country
    #[serde(default)]
    pub icao_prefixes: Vec<String>,
    pub region: Region,
    pub strategy: NavigationStrategy,
    pub index_url: String,
    /// Tried when the primary landing page cannot be opened
    #[serde(default)]
    pub alternate_landing_url: Option<String>,
    /// Path fragment identifying the current-issue link on the landing page
    #[serde(default)]
    pub edition_hint: Option<String>,
    /// Document prefix used in direct AD-2 URLs; defaults to the code's first two letters
    #[serde(default)]
    pub document_prefix: Option<String>,
    #[serde(default)]
    pub resource_policy: ResourcePolicy,
}

impl CountryProfile {
    pub fn current_issue(name: &str, region: Region, landing_url: &str) -> Self {
        Self::new(name, region, NavigationStrategy::CurrentIssueLink, landing_url)
    }

    pub fn fixed_edition(name: &str, region: Region, index_url: &str) -> Self {
        Self::new(name, region, NavigationStrategy::FixedEdition, index_url)
    }

    fn new(name: &str, region: Region, strategy: NavigationStrategy, url: &str) -> Self {
        Self {
            name: name.to_string(),
            icao_prefixes: Vec::new(),
            region,
            strategy,
            index_url: url.to_string(),
            alternate_landing_url: None,
            edition_hint: None,
            document_prefix: None,
            resource_policy: ResourcePolicy::Reuse,
        }
    }

    pub fn with_alternate_landing(mut self, url: &str) -> Self {
        self.alternate_landing_url = Some(url.to_string());
        self
    }

    pub fn with_edition_hint(mut self, hint: &str) -> Self {
        self.edition_hint = Some(hint.to_string());
        self
    }

    pub fn with_document_prefix(mut self, prefix: &str) -> Self {
        self.document_prefix = Some(prefix.to_string());
        self
    }

    pub fn per_call(mut self) -> Self {
        self.resource_policy = ResourcePolicy::PerCall;
        self
    }

    /// Prefix used in `{prefix}-AD-2.{code}` document names
    pub fn document_prefix_for(&self, code: &AirportCode) -> String {
        self.document_prefix
            .clone()
            .unwrap_or_else(|| code.leading(2).to_string())
    }
}

/// Case-insensitive lookup key for country names
fn catalog_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// All known country profiles keyed by name
#[derive(Debug, Clone, Default)]
pub struct ProfileCatalog {
    profiles: BTreeMap<String, CountryProfile>,
}

impl ProfileCatalog {
    pub fn from_profiles(profiles: impl IntoIterator<Item = CountryProfile>) -> Self {
        let mut catalog = Self::default();
        catalog.merge(profiles);
        catalog
    }

    /// Profiles compiled into the binary, with prefixes taken from the standard table
    pub fn embedded() -> Self {
        Self::from_profiles(embedded_profiles().into_iter().map(|mut profile| {
            profile.icao_prefixes = prefix_table::prefixes_for(&profile.name);
            profile
        }))
    }

    /// Add profiles, replacing any existing entry with the same name
    pub fn merge(&mut self, profiles: impl IntoIterator<Item = CountryProfile>) {
        for profile in profiles {
            self.profiles.insert(catalog_key(&profile.name), profile);
        }
    }

    /// Read a JSON array of profiles
    pub async fn load_file(path: &Path) -> Result<Vec<CountryProfile>> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read country profiles: {}", path.display()))?;
        let profiles: Vec<CountryProfile> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid country profiles file: {}", path.display()))?;
        Ok(profiles)
    }

    pub fn get(&self, name: &str) -> Option<&CountryProfile> {
        self.profiles.get(&catalog_key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(&catalog_key(name))
    }

    /// Display names, alphabetically
    pub fn names(&self) -> Vec<String> {
        self.profiles.values().map(|p| p.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn embedded_profiles() -> Vec<CountryProfile> {
    use Region::{Africa, Asia, Europe, NorthAmerica, SouthAmerica};

    vec![
        // Europe
        CountryProfile::current_issue("Albania", Europe, "https://www.albcontrol.al/al/aip/")
            .with_edition_hint("AIRAC"),
        CountryProfile::fixed_edition(
            "Croatia",
            Europe,
            "https://www.crocontrol.hr/UserDocsImages/AIS%20produkti/eAIP/2025-10-30-AIRAC/html/index-en-HR.html",
        ),
        CountryProfile::fixed_edition(
            "Estonia",
            Europe,
            "https://eaip.eans.ee/2025-10-02/html/index-en-GB.html",
        )
        .with_document_prefix("EE"),
        CountryProfile::fixed_edition(
            "Finland",
            Europe,
            "https://www.ais.fi/eaip/005-2025_2025_10_02/index.html",
        ),
        CountryProfile::current_issue("France", Europe, "https://aip.aero/fr/en/").per_call(),
        CountryProfile::current_issue("Hungary", Europe, "https://ais-en.hungarocontrol.hu/aip"),
        CountryProfile::fixed_edition(
            "Kosovo",
            Europe,
            "https://www.ashna-ks.org/eAIP/AIRAC%20AMDT%2001-2025_2025_10_30/index.html",
        ),
        CountryProfile::current_issue("Latvia", Europe, "https://ais.lgs.lv/aiseaip")
            .with_edition_hint("eAIPfiles")
            .with_document_prefix("EV"),
        CountryProfile::current_issue("Norway", Europe, "https://aim-prod.avinor.no/no/AIP/"),
        CountryProfile::current_issue(
            "Poland",
            Europe,
            "https://www.ais.pansa.pl/en/publications/aip-poland/",
        ),
        CountryProfile::fixed_edition(
            "Portugal",
            Europe,
            "https://ais.nav.pt/wp-content/uploads/AIS_Files/eAIP_Current/eAIP_Online/eAIP/html/index.html",
        ),
        CountryProfile::fixed_edition(
            "Sweden",
            Europe,
            "https://aro.lfv.se/content/eaip/AIRAC%20AIP%20AMDT%206-2025_2025_10_30/index-v2.html",
        ),
        CountryProfile::fixed_edition(
            "United Kingdom",
            Europe,
            "https://www.aurora.nats.co.uk/htmlAIP/Publications/2025-10-30-AIRAC/html/index-en-GB.html",
        ),
        // Asia
        CountryProfile::current_issue("Georgia", Asia, "https://airnav.ge/eaip/history-en-GB.html"),
        CountryProfile::fixed_edition(
            "Hong Kong",
            Asia,
            "https://www.ais.gov.hk/eaip_20251030/2025-10-30-000000/html/index-en-US.html",
        ),
        CountryProfile::fixed_edition(
            "India",
            Asia,
            "https://aim-india.aai.aero/eaip/eaip-v2-05-2025/index-en-GB.html",
        )
        .with_alternate_landing("https://aim-india.aai.aero/aip-supplements?page=1"),
        CountryProfile::fixed_edition("Israel", Asia, "https://e-aip.azurefd.net/2025-10-02-AIRAC/html/index.html"),
        CountryProfile::fixed_edition(
            "Kazakhstan",
            Asia,
            "https://www.ans.kz/AIP/eAIP/2025-10-30-AIRAC/html/index-en-GB.html",
        ),
        CountryProfile::fixed_edition(
            "Kyrgyzstan",
            Asia,
            "http://kan.kg/ais/eaip/2025-10-30-AIRAC/html/index_commands.html",
        ),
        CountryProfile::fixed_edition(
            "Malaysia",
            Asia,
            "https://aip.caam.gov.my/aip/eAIP/2025-09-09/html/index-en-MS.html",
        ),
        CountryProfile::fixed_edition(
            "Mongolia",
            Asia,
            "https://ais.mn/files/aip/eAIP/2025-10-30-AIRAC/html/index-en-MN.html",
        ),
        CountryProfile::current_issue("Oman", Asia, "https://aim.caa.gov.om/AIRAC_eAIPOman-3-25/"),
        CountryProfile::fixed_edition(
            "Saudi Arabia",
            Asia,
            "https://aimss.sans.com.sa/assets/FileManagerFiles/AIRAC%20AIP%20AMDT%2005_24_2024_05_16/index.html",
        ),
        CountryProfile::fixed_edition(
            "South Korea",
            Asia,
            "https://aim.koca.go.kr/eaipPub/Package/2025-10-29-AIRAC/html/index-en-GB.html",
        ),
        CountryProfile::fixed_edition(
            "Taiwan",
            Asia,
            "https://ais.caa.gov.tw/eaip/AIRAC%20AIP%20AMDT%2005-25_2025_09_04/index.html",
        ),
        CountryProfile::fixed_edition(
            "Thailand",
            Asia,
            "https://aip.caat.or.th/2025-10-30-AIRAC/html/index-en-GB.html",
        ),
        CountryProfile::current_issue("United Arab Emirates", Asia, "https://www.gcaa.gov.ae/en/ais"),
        // Africa
        CountryProfile::fixed_edition(
            "Cabo Verde",
            Africa,
            "https://eaip.asa.cv/2024-04-18-AIRAC/html/index-en-GB.html",
        ),
        // Americas
        CountryProfile::current_issue(
            "Chile",
            SouthAmerica,
            "https://aipchile.dgac.gob.cl/aip/vol1/seccion/airac",
        ),
        CountryProfile::fixed_edition(
            "Costa Rica",
            NorthAmerica,
            "https://www.cocesna.org/aipca/AIPMR/AIP_2504/Eurocontrol/COSTA%20RICA/2025-10-30-DOUBLE%20AIRAC/html/index-es-ES.html",
        ),
        CountryProfile::current_issue("Ecuador", SouthAmerica, "https://www.ais.aviacioncivil.gob.ec/ifis3/"),
        CountryProfile::fixed_edition(
            "El Salvador",
            NorthAmerica,
            "https://www.cocesna.org/aipca/AIPMS/AIP_2512/Eurocontrol/EL%20SALVADOR/2025-09-04-NON%20AIRAC/html/index-es-ES.html",
        ),
        CountryProfile::fixed_edition(
            "Guatemala",
            NorthAmerica,
            "https://www.dgac.gob.gt/home/aip_e/AIP_2508/Eurocontrol/GUATEMALA/2025-05-15-DOUBLE%20AIRAC/html/index-es-ES.html",
        ),
        CountryProfile::fixed_edition(
            "Honduras",
            NorthAmerica,
            "https://www.ahac.gob.hn/eAIP1/AIP_2528/Eurocontrol/HONDURAS/2025-08-07-AIRAC/html/index-es-ES.html",
        ),
    ]
}
