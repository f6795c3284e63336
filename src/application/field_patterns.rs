//! Ordered extraction tables for the AD 2 sections
//!
//! Each field has a list of (pattern, normalizer) pairs tried top to
//! bottom; the first pattern producing a value wins. Row labels split a
//! section into per-field windows so a value cannot leak in from the
//! neighbouring row.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::application::normalize;
use crate::domain::constants::sentinel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldName {
    AirportName,
    AdAdministration,
    AdOperator,
    CustomsAndImmigration,
    Ats,
    OperationalRemarks,
    TrafficTypes,
    AdministrativeRemarks,
    FireFightingCategory,
}

impl FieldName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AirportName => "airportName",
            Self::AdAdministration => "adAdministration",
            Self::AdOperator => "adOperator",
            Self::CustomsAndImmigration => "customsAndImmigration",
            Self::Ats => "ats",
            Self::OperationalRemarks => "operationalRemarks",
            Self::TrafficTypes => "trafficTypes",
            Self::AdministrativeRemarks => "administrativeRemarks",
            Self::FireFightingCategory => "fireFightingCategory",
        }
    }

    /// Value used when nothing matched.
    ///
    /// The airport name has no fixed sentinel; the extractor substitutes the
    /// airport code for it.
    pub fn sentinel(&self) -> &'static str {
        match self {
            Self::AirportName => "",
            Self::TrafficTypes | Self::FireFightingCategory => sentinel::NOT_SPECIFIED,
            _ => sentinel::NIL,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post-processing applied to a matched value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalizer {
    Hours,
    Fixed(&'static str),
    TrafficTypes,
    Remarks,
    AirportName,
    Digits,
}

impl Normalizer {
    /// `None` rejects the match so the next candidate is tried
    pub fn apply(&self, matched: &str) -> Option<String> {
        match self {
            Self::Hours => {
                let value = normalize::canonicalize_hours(matched);
                let looks_like_range = matched.chars().any(|c| c.is_ascii_digit())
                    && matched.contains(['-', '–'])
                    && value != sentinel::H24;
                // A range that did not canonicalize is not a valid clock range
                if looks_like_range && normalize::canonical_time_range(&value).is_none() {
                    None
                } else {
                    Some(value)
                }
            }
            Self::Fixed(value) => Some((*value).to_string()),
            Self::TrafficTypes => normalize::canonicalize_traffic(matched),
            Self::Remarks => normalize::clean_remarks(matched),
            Self::AirportName => normalize::clean_airport_name(matched),
            Self::Digits => {
                let digits: String = matched.chars().filter(char::is_ascii_digit).collect();
                (!digits.is_empty()).then_some(digits)
            }
        }
    }
}

/// Compiled pattern plus its normalizer.
///
/// A named group `v` selects the value; otherwise the whole match is used.
/// A named group `code` must equal the airport code being looked up.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    pub regex: Regex,
    pub normalizer: Normalizer,
}

impl FieldPattern {
    fn new(pattern: &str, normalizer: Normalizer) -> Self {
        Self {
            regex: Regex::new(pattern).expect("extraction patterns are valid regexes"),
            normalizer,
        }
    }

    /// First value this pattern yields inside `window`
    pub fn first_value(&self, window: &str, code: &str) -> Option<String> {
        self.regex.captures_iter(window).find_map(|caps| {
            if let Some(found) = caps.name("code") {
                if !found.as_str().eq_ignore_ascii_case(code) {
                    return None;
                }
            }
            let matched = caps.name("v").or_else(|| caps.get(0))?;
            self.normalizer.apply(matched.as_str())
        })
    }
}

/// Where a field's patterns are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    /// The whole bounded section
    Section,
    /// Text between the field's row label and the next row label
    Row,
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub field: FieldName,
    pub scope: FieldScope,
    pub patterns: Vec<FieldPattern>,
}

/// A row label inside a section. Labels without a field only bound windows.
#[derive(Debug, Clone)]
pub struct RowLabel {
    pub regex: Regex,
    pub field: Option<FieldName>,
}

impl RowLabel {
    fn field(pattern: &str, field: FieldName) -> Self {
        Self {
            regex: Regex::new(pattern).expect("row label patterns are valid regexes"),
            field: Some(field),
        }
    }

    fn boundary(pattern: &str) -> Self {
        Self {
            regex: Regex::new(pattern).expect("row label patterns are valid regexes"),
            field: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SectionSpec {
    /// The `n` of `AD 2.n`
    pub number: u8,
    pub title: &'static str,
    /// Header patterns, most specific first
    pub headers: Vec<Regex>,
    /// Fallback window length when no following header is found
    pub budget: usize,
    pub row_labels: Vec<RowLabel>,
    pub fields: Vec<FieldSpec>,
}

impl SectionSpec {
    pub fn name(&self) -> String {
        format!("AD 2.{} {}", self.number, self.title)
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.fields.iter().map(|f| f.field)
    }
}

/// Section holding the operator block used by contact extraction
pub const CONTACTS_SECTION: u8 = 2;

/// Any `AD 2.n` header; group 1 is the section number
pub static ANY_SECTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bAD\s*2\.(\d{1,2})\b").expect("valid section header regex"));

/// Titled header, bare `AD 2.n` header, then the title on its own
fn header_patterns(number: u8, title: &str) -> Vec<Regex> {
    let title = title.split_whitespace().collect::<Vec<_>>().join(r"\s+");
    [
        format!(r"(?i)\bAD\s*2\.{number}\b\s*[:.\-–—]?\s*{title}"),
        format!(r"(?i)\bAD\s*2\.{number}\b"),
        format!(r"(?i)\b{title}\b"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("section header patterns are valid regexes"))
    .collect()
}

pub static OPERATOR_BLOCK_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bAD\s+(?:operator|administration)\s*,?\s*(?:postal\s+)?address|\bAD\s+operator\b")
        .expect("valid operator block regex")
});

pub static OPERATOR_BLOCK_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bTypes?\s+of\s+traffic|\bAD\s*2\.3\b").expect("valid operator block end regex")
});

pub const OPERATOR_BLOCK_BUDGET: usize = 2000;

fn hours_patterns() -> Vec<FieldPattern> {
    vec![
        FieldPattern::new(r"(?i)\b(?:H\s?24|24\s?H(?:RS?|OURS?)?)\b", Normalizer::Hours),
        FieldPattern::new(r"\b\d{2}[:.]?\d{2}\s*[-–]\s*\d{2}[:.]?\d{2}\b", Normalizer::Hours),
        FieldPattern::new(
            r"(?i)\b(?:on\s+request|O/R|may\s+be\s+requested|by\s+prior\s+request)",
            Normalizer::Fixed(sentinel::ON_REQUEST),
        ),
        FieldPattern::new(r"(?i)\bNIL\b", Normalizer::Fixed(sentinel::NIL)),
    ]
}

fn remarks_patterns() -> Vec<FieldPattern> {
    vec![FieldPattern::new(r"(?s)(?P<v>.+)", Normalizer::Remarks)]
}

fn hours_field(field: FieldName) -> FieldSpec {
    FieldSpec {
        field,
        scope: FieldScope::Row,
        patterns: hours_patterns(),
    }
}

/// The AD 2.1, 2.2, 2.3 and 2.6 tables used for every lookup
pub static STANDARD_SECTIONS: Lazy<Vec<SectionSpec>> = Lazy::new(|| {
    vec![
        SectionSpec {
            number: 1,
            title: "AERODROME LOCATION INDICATOR AND NAME",
            headers: header_patterns(1, "AERODROME LOCATION INDICATOR AND NAME"),
            budget: 600,
            row_labels: Vec::new(),
            fields: vec![FieldSpec {
                field: FieldName::AirportName,
                scope: FieldScope::Section,
                patterns: vec![FieldPattern::new(
                    r"(?i)\b(?P<code>[A-Z0-9]{3,4})\s*[—–-]\s*(?P<v>[^\n]+)",
                    Normalizer::AirportName,
                )],
            }],
        },
        SectionSpec {
            number: 2,
            title: "AERODROME GEOGRAPHICAL AND ADMINISTRATIVE DATA",
            headers: header_patterns(2, "AERODROME GEOGRAPHICAL AND ADMINISTRATIVE DATA"),
            budget: 3000,
            row_labels: vec![
                RowLabel::boundary(r"(?i)\bARP\s+coordinates"),
                RowLabel::boundary(r"(?i)\bDirection\s+and\s+distance"),
                RowLabel::boundary(r"(?i)\bElevation\b"),
                RowLabel::boundary(r"(?i)\bGeoid\s+undulation"),
                RowLabel::boundary(r"(?i)\bMAG\s*VAR"),
                RowLabel::boundary(r"(?i)\bAD\s+(?:operator|administration)\s*,?\s*(?:postal\s+)?address"),
                // The "(IFR/VFR)" caption belongs to the label, not the value
                RowLabel::field(
                    r"(?i)\b(?:Types?\s+of\s+traffic(?:\s+permitted)?|Traffic\s+permitted)(?:\s*\(\s*IFR\s*/\s*VFR\s*\))?",
                    FieldName::TrafficTypes,
                ),
                RowLabel::field(r"(?i)\bRemarks\b", FieldName::AdministrativeRemarks),
            ],
            fields: vec![
                FieldSpec {
                    field: FieldName::TrafficTypes,
                    scope: FieldScope::Row,
                    patterns: vec![FieldPattern::new(
                        r"(?i)\b(?P<v>IFR\s*[/,]\s*VFR|VFR\s*[/,]\s*IFR|IFR\s+and\s+VFR|IFR|VFR)\b",
                        Normalizer::TrafficTypes,
                    )],
                },
                FieldSpec {
                    field: FieldName::AdministrativeRemarks,
                    scope: FieldScope::Row,
                    patterns: remarks_patterns(),
                },
            ],
        },
        SectionSpec {
            number: 3,
            title: "OPERATIONAL HOURS",
            headers: header_patterns(3, "OPERATIONAL HOURS"),
            budget: 3000,
            row_labels: vec![
                RowLabel::field(r"(?i)\bAD\s+Administration\b", FieldName::AdAdministration),
                RowLabel::field(r"(?i)\bAD\s+Operator\b", FieldName::AdOperator),
                RowLabel::field(
                    r"(?i)\bCustoms\s*(?:and|&)\s*immigration\b",
                    FieldName::CustomsAndImmigration,
                ),
                RowLabel::boundary(r"(?i)\bHealth\s+and\s+sanitation\b"),
                RowLabel::boundary(r"(?i)\bAIS\s+Briefing\s+Office\b"),
                RowLabel::boundary(r"(?i)\bATS\s+Reporting\s+Office\b(?:\s*\(ARO\))?"),
                RowLabel::boundary(r"(?i)\bMET\s+Briefing\s+Office\b"),
                RowLabel::field(r"\bATS\b", FieldName::Ats),
                RowLabel::boundary(r"(?i)\bFuelling\b"),
                RowLabel::boundary(r"(?i)\bHandling\b"),
                RowLabel::boundary(r"(?i)\bSecurity\b"),
                RowLabel::boundary(r"(?i)\bDe-?icing\b"),
                RowLabel::field(r"(?i)\bRemarks\b", FieldName::OperationalRemarks),
            ],
            fields: vec![
                hours_field(FieldName::AdAdministration),
                hours_field(FieldName::AdOperator),
                hours_field(FieldName::CustomsAndImmigration),
                hours_field(FieldName::Ats),
                FieldSpec {
                    field: FieldName::OperationalRemarks,
                    scope: FieldScope::Row,
                    patterns: remarks_patterns(),
                },
            ],
        },
        SectionSpec {
            number: 6,
            title: "RESCUE AND FIRE FIGHTING SERVICES",
            headers: header_patterns(6, "RESCUE AND FIRE FIGHTING SERVICES"),
            budget: 2000,
            row_labels: Vec::new(),
            fields: vec![FieldSpec {
                field: FieldName::FireFightingCategory,
                scope: FieldScope::Section,
                patterns: vec![
                    FieldPattern::new(
                        r"(?i)AD\s+category\s+for\s+fire\s*fighting[:\s]*(?:CAT(?:EGORY)?\s*)?(?P<v>\d{1,2})\b",
                        Normalizer::Digits,
                    ),
                    FieldPattern::new(r"(?i)AD\s+CATEGORY[:\s]+(?P<v>\d{1,2})\b", Normalizer::Digits),
                    FieldPattern::new(r"(?i)\bCategory\s+(?P<v>\d{1,2})[:\s]+for", Normalizer::Digits),
                    FieldPattern::new(r"(?i)\bCategory[:\s]+(?P<v>\d{1,2})\b", Normalizer::Digits),
                    FieldPattern::new(r"(?i)\bCAT\s*(?P<v>\d{1,2})\b", Normalizer::Digits),
                ],
            }],
        },
    ]
});
