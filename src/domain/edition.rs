//! The AIP edition a lookup navigates inside

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:19|20)\d{2}-\d{2}-\d{2}").expect("valid ISO date regex"));

static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d{2}-(?:JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)-(?:19|20)\d{2}")
        .expect("valid DD-MON-YYYY regex")
});

pub const UNKNOWN_EFFECTIVE_DATE: &str = "unknown";

/// Index document of one edition and the directory its documents live in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AipEdition {
    pub index_url: Url,
    /// Always ends with `/` so relative document paths can be joined onto it
    pub base_directory_url: Url,
    pub effective_date_label: String,
}

impl AipEdition {
    /// Build an edition from its index document URL.
    ///
    /// `label_sources` are searched in order for a date; the URL itself is
    /// always tried first.
    pub fn from_index_url(index_url: Url, label_sources: &[&str]) -> Self {
        let base_directory_url = base_directory_of(&index_url);
        let effective_date_label = effective_date_label(index_url.as_str(), label_sources);
        Self {
            index_url,
            base_directory_url,
            effective_date_label,
        }
    }

    /// Resolve a document path relative to the edition directory
    pub fn document_url(&self, relative: &str) -> Result<Url, url::ParseError> {
        self.base_directory_url.join(relative)
    }
}

/// Directory portion of an index URL.
///
/// A path whose last segment names a file loses that segment; a path that
/// already names a directory only gains a trailing slash.
pub fn base_directory_of(index_url: &Url) -> Url {
    let mut base = index_url.clone();
    base.set_query(None);
    base.set_fragment(None);

    let path = base.path().to_string();
    if path.ends_with('/') {
        return base;
    }

    let last_segment = path.rsplit('/').next().unwrap_or_default();
    if last_segment.contains('.') {
        let cut = path.len() - last_segment.len();
        base.set_path(&path[..cut]);
    } else {
        base.set_path(&format!("{path}/"));
    }
    base
}

fn effective_date_label(url: &str, label_sources: &[&str]) -> String {
    std::iter::once(url)
        .chain(label_sources.iter().copied())
        .find_map(find_date)
        .unwrap_or_else(|| {
            label_sources
                .iter()
                .map(|s| s.trim())
                .find(|s| !s.is_empty())
                .map_or_else(|| UNKNOWN_EFFECTIVE_DATE.to_string(), str::to_string)
        })
}

fn find_date(text: &str) -> Option<String> {
    ISO_DATE
        .find(text)
        .or_else(|| DAY_MONTH_YEAR.find(text))
        .map(|m| m.as_str().to_uppercase())
}
