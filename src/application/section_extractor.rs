//! Bounded-window field extraction from AD 2 page text
//!
//! A section runs from its header to the next `AD 2.n` header with a
//! different number, or to its character budget when no such header
//! follows. Fields are read with the ordered tables in
//! [`field_patterns`](crate::application::field_patterns); anything not
//! found gets its sentinel.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

use crate::application::field_patterns::{
    ANY_SECTION_HEADER, CONTACTS_SECTION, FieldName, FieldScope, FieldSpec, OPERATOR_BLOCK_BUDGET,
    OPERATOR_BLOCK_END, OPERATOR_BLOCK_LABEL, STANDARD_SECTIONS, SectionSpec,
};
use crate::application::normalize::{self, collapse_whitespace};
use crate::domain::constants::{contact, limits};
use crate::domain::{AirportCode, Contact};

static PHONE_CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\(?\d[\d \t().\-/]{4,24}\d").expect("valid phone regex"));

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

/// Uppercase run glued onto an email's top-level domain, e.g. an AFS address
static GLUED_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\.[a-z]{2,})[A-Z]{2,}.*$").expect("valid suffix regex"));

static ISO_DATE_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Extracted values keyed by field; every requested field is present
pub type FieldMap = BTreeMap<FieldName, String>;

/// A located section of the page text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub number: u8,
    /// Byte offset of the header
    pub start: usize,
    /// Byte offset where the section stops (exclusive)
    pub end: usize,
    /// Byte length of the matched header at the start of `raw_text`
    pub header_len: usize,
    pub raw_text: String,
}

impl Section {
    /// Section text after its header
    pub fn body(&self) -> &str {
        &self.raw_text[self.header_len..]
    }
}

/// Field extraction for one airport code
#[derive(Debug, Clone)]
pub struct SectionExtractor {
    code: AirportCode,
}

impl SectionExtractor {
    pub fn for_airport(code: AirportCode) -> Self {
        Self { code }
    }

    pub fn code(&self) -> &AirportCode {
        &self.code
    }

    /// Locate `spec`'s section in `page_text`
    pub fn locate_section(&self, page_text: &str, spec: &SectionSpec) -> Option<Section> {
        // A header starting its line beats an inline mention of the same section
        let header = spec
            .headers
            .iter()
            .find_map(|regex| {
                regex
                    .find_iter(page_text)
                    .find(|m| header_line_start(page_text, 0, m.start()).is_some())
            })
            .or_else(|| spec.headers.iter().find_map(|regex| regex.find(page_text)))?;
        let start = header.start();
        let after_header = header.end();

        // Inline cross-references such as "see AD 2.20" do not end the section
        let next_header = ANY_SECTION_HEADER
            .captures_iter(&page_text[after_header..])
            .filter(|caps| {
                caps.get(1)
                    .and_then(|n| n.as_str().parse::<u8>().ok())
                    .is_some_and(|n| n != spec.number)
            })
            .filter_map(|caps| caps.get(0))
            .find_map(|m| header_line_start(page_text, after_header, after_header + m.start()));

        let end = next_header.unwrap_or_else(|| budget_end(page_text, start, spec.budget));
        let end = end.max(after_header);

        Some(Section {
            name: spec.name(),
            number: spec.number,
            start,
            end,
            header_len: after_header - start,
            raw_text: page_text[start..end].to_string(),
        })
    }

    /// Apply every spec to `page_text`
    pub fn extract_fields(&self, page_text: &str, specs: &[SectionSpec]) -> FieldMap {
        let mut fields = FieldMap::new();

        for spec in specs {
            let section = self.locate_section(page_text, spec);
            if section.is_none() {
                debug!("{} not found for {}", spec.name(), self.code);
            }

            for field in &spec.fields {
                let value = section
                    .as_ref()
                    .and_then(|section| self.extract_field(section.body(), spec, field))
                    .unwrap_or_else(|| self.sentinel_for(field.field));
                fields.insert(field.field, value);
            }
        }

        fields
    }

    /// Apply the standard AD 2.1, 2.2, 2.3 and 2.6 tables
    pub fn extract_standard(&self, page_text: &str) -> FieldMap {
        self.extract_fields(page_text, &STANDARD_SECTIONS)
    }

    /// Contacts from the AD operator block.
    ///
    /// Returns an empty list when neither phone nor email is present.
    pub fn extract_contacts(&self, page_text: &str) -> Vec<Contact> {
        let Some(block) = self.operator_block(page_text) else {
            return Vec::new();
        };

        let phones = find_phones(&block);
        let emails = find_emails(&block);

        if phones.is_empty() {
            return emails
                .into_iter()
                .next()
                .map(|email| {
                    vec![Contact {
                        contact_type: contact::OPERATOR_TYPE.to_string(),
                        phone: String::new(),
                        name: String::new(),
                        email,
                        notes: contact::SOURCE_NOTES.to_string(),
                    }]
                })
                .unwrap_or_default();
        }

        phones
            .into_iter()
            .take(limits::MAX_CONTACTS)
            .enumerate()
            .map(|(i, phone)| Contact {
                contact_type: format!("{} {}", contact::OPERATOR_TYPE, i + 1),
                phone,
                name: String::new(),
                email: emails.get(i).cloned().unwrap_or_default(),
                notes: contact::SOURCE_NOTES.to_string(),
            })
            .collect()
    }

    fn sentinel_for(&self, field: FieldName) -> String {
        match field {
            FieldName::AirportName => self.code.to_string(),
            other => other.sentinel().to_string(),
        }
    }

    fn extract_field(&self, body: &str, spec: &SectionSpec, field: &FieldSpec) -> Option<String> {
        let window = match field.scope {
            FieldScope::Section => body,
            FieldScope::Row => row_window(body, spec, field.field)?,
        };

        field
            .patterns
            .iter()
            .find_map(|pattern| pattern.first_value(window, self.code.as_str()))
    }

    /// Operator block text, preferring the AD 2.2 section over the whole page
    fn operator_block(&self, page_text: &str) -> Option<String> {
        let scope = STANDARD_SECTIONS
            .iter()
            .find(|spec| spec.number == CONTACTS_SECTION)
            .and_then(|spec| self.locate_section(page_text, spec))
            .map(|section| section.body().to_string())
            .filter(|body| OPERATOR_BLOCK_LABEL.is_match(body))
            .unwrap_or_else(|| page_text.to_string());

        let label = OPERATOR_BLOCK_LABEL.find(&scope)?;
        let rest = &scope[label.end()..];
        let stop = OPERATOR_BLOCK_END
            .find(rest)
            .map_or(rest.len(), |m| m.start());
        let end = budget_end(rest, 0, OPERATOR_BLOCK_BUDGET).min(stop);
        Some(rest[..end].to_string())
    }
}

/// Byte offset `budget` characters after `start`, clamped to the text
fn budget_end(text: &str, start: usize, budget: usize) -> usize {
    text[start..]
        .char_indices()
        .nth(budget)
        .map_or(text.len(), |(offset, _)| start + offset)
}

/// Longest prefix kept on a header line, e.g. the `EVRA ` of `EVRA AD 2.3`
const HEADER_LINE_PREFIX_CHARS: usize = 12;

/// Start of the line holding the header at `header`, when only a short
/// prefix precedes it on that line. `None` for a mention inside running text.
fn header_line_start(text: &str, floor: usize, header: usize) -> Option<usize> {
    let line_start = text[floor..header].rfind('\n').map_or(floor, |i| floor + i + 1);
    let prefix = text[line_start..header].trim();
    (prefix.chars().count() <= HEADER_LINE_PREFIX_CHARS).then_some(line_start)
}

/// Window for a row-scoped field: its label's end to the next label's start
fn row_window<'a>(body: &'a str, spec: &SectionSpec, field: FieldName) -> Option<&'a str> {
    // (start, end, field) for every label hit
    let mut hits: Vec<(usize, usize, Option<FieldName>)> = spec
        .row_labels
        .iter()
        .flat_map(|label| {
            label
                .regex
                .find_iter(body)
                .map(move |m| (m.start(), m.end(), label.field))
        })
        .collect();

    // Earlier first; at the same start the longer label wins
    hits.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut kept: Vec<(usize, usize, Option<FieldName>)> = Vec::with_capacity(hits.len());
    for hit in hits {
        if kept.last().is_none_or(|last| hit.0 >= last.1) {
            kept.push(hit);
        }
    }

    let position = kept.iter().position(|(_, _, f)| *f == Some(field))?;
    let from = kept[position].1;
    let to = kept.get(position + 1).map_or(body.len(), |next| next.0);
    Some(&body[from..to])
}

fn find_phones(block: &str) -> Vec<String> {
    let mut phones: Vec<String> = Vec::new();
    for candidate in PHONE_CANDIDATE.find_iter(block) {
        // Coordinates and similar are digit runs glued to a letter
        let glued = block[candidate.end()..]
            .chars()
            .next()
            .is_some_and(char::is_alphabetic);
        if glued {
            continue;
        }

        let raw = candidate.as_str().trim();
        let digits = raw.chars().filter(char::is_ascii_digit).count();
        if !(limits::MIN_PHONE_DIGITS..=limits::MAX_PHONE_DIGITS).contains(&digits) {
            continue;
        }
        if ISO_DATE_ONLY.is_match(raw) || normalize::canonical_time_range(raw).is_some() {
            continue;
        }

        let phone = collapse_whitespace(raw);
        if !phones.contains(&phone) {
            phones.push(phone);
        }
    }
    phones
}

fn find_emails(block: &str) -> Vec<String> {
    let mut emails: Vec<String> = Vec::new();
    for found in EMAIL.find_iter(block) {
        let raw = found.as_str();
        let email = match raw.split_once('@') {
            Some((local, domain)) => format!("{local}@{}", GLUED_SUFFIX.replace(domain, "$1")),
            None => raw.to_string(),
        };
        let email = email.trim_end_matches('.').to_string();
        if email.contains('.') && !emails.contains(&email) {
            emails.push(email);
        }
    }
    emails
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constants::sentinel;

    const EVRA_PAGE: &str = "\
EVRA AD 2.1 AERODROME LOCATION INDICATOR AND NAME
EVRA — RIGA/Riga International
EVRA AD 2.2 AERODROME GEOGRAPHICAL AND ADMINISTRATIVE DATA
1 ARP coordinates and site at AD 565525N 0240800E
3 Elevation / Reference temperature 36 FT / 22.1°C
6 AD operator, address, telephone, telefax, e-mail, AFS, URL
Riga International Airport, LV-1053
Tel: +371 67207009
Fax: +371 67207100
E-mail: info@riga-airport.comEVRAYDYX
7 Types of traffic permitted (IFR/VFR) IFR/VFR
8 Remarks NIL
EVRA AD 2.3 OPERATIONAL HOURS
1 AD Operator MON-FRI: 0700-1900
2 Customs and immigration H24
3 Health and sanitation H24
4 AIS Briefing Office H24
5 ATS Reporting Office (ARO) H24
6 MET Briefing Office H24
7 ATS H24
8 Fuelling H24
12 Remarks Aerodrome closed to training flights on weekends. © LGS 2025
EVRA AD 2.4 HANDLING SERVICES AND FACILITIES
1 Cargo-handling facilities Yes
EVRA AD 2.6 RESCUE AND FIRE FIGHTING SERVICES
1 AD category for fire fighting CAT 9
2 Rescue equipment As per ICAO
";

    fn extractor() -> SectionExtractor {
        SectionExtractor::for_airport(AirportCode::parse("EVRA").unwrap())
    }

    #[test]
    fn test_operational_hours_fixture() {
        let fields = extractor().extract_standard(EVRA_PAGE);
        assert_eq!(fields[&FieldName::AdOperator], "07:00-19:00");
        assert_eq!(fields[&FieldName::CustomsAndImmigration], "H24");
        assert_eq!(fields[&FieldName::Ats], "H24");
    }

    #[test]
    fn test_missing_row_gets_nil() {
        let fields = extractor().extract_standard(EVRA_PAGE);
        assert_eq!(fields[&FieldName::AdAdministration], sentinel::NIL);
    }

    #[test]
    fn test_every_field_is_present() {
        let fields = extractor().extract_standard("no aerodrome data at all");
        assert_eq!(fields.len(), 9);
        assert_eq!(fields[&FieldName::AirportName], "EVRA");
        assert_eq!(fields[&FieldName::TrafficTypes], sentinel::NOT_SPECIFIED);
        assert_eq!(fields[&FieldName::FireFightingCategory], sentinel::NOT_SPECIFIED);
        assert_eq!(fields[&FieldName::Ats], sentinel::NIL);
    }

    #[test]
    fn test_name_traffic_fire_and_remarks() {
        let fields = extractor().extract_standard(EVRA_PAGE);
        assert_eq!(fields[&FieldName::AirportName], "RIGA/Riga International");
        assert_eq!(fields[&FieldName::TrafficTypes], "IFR/VFR");
        assert_eq!(fields[&FieldName::FireFightingCategory], "9");
        assert_eq!(
            fields[&FieldName::OperationalRemarks],
            "Aerodrome closed to training flights on weekends."
        );
        assert_eq!(fields[&FieldName::AdministrativeRemarks], sentinel::NIL);
    }

    #[test]
    fn test_ats_reporting_office_is_not_the_ats_row() {
        let page = "AD 2.3 OPERATIONAL HOURS\nATS Reporting Office (ARO) H24\nATS 0600-2200\nFuelling H24";
        let fields = extractor().extract_standard(page);
        assert_eq!(fields[&FieldName::Ats], "06:00-22:00");
    }

    #[test]
    fn test_customs_on_request() {
        let page = "AD 2.3 OPERATIONAL HOURS\nCustoms and immigration May be requested\nATS H24";
        let fields = extractor().extract_standard(page);
        assert_eq!(fields[&FieldName::CustomsAndImmigration], sentinel::ON_REQUEST);
    }

    #[test]
    fn test_section_stops_before_next_header() {
        let extractor = extractor();
        for spec in STANDARD_SECTIONS.iter() {
            let section = extractor.locate_section(EVRA_PAGE, spec).unwrap();
            for other in STANDARD_SECTIONS.iter().filter(|s| s.number != spec.number) {
                assert!(!section.raw_text.contains(other.title), "{} leaks {}", section.name, other.title);
            }
        }
        let ops = extractor.locate_section(EVRA_PAGE, &STANDARD_SECTIONS[2]).unwrap();
        assert!(!ops.raw_text.contains("HANDLING SERVICES"));
    }

    #[test]
    fn test_section_budget_applies_without_next_header() {
        let page = format!("AD 2.6 RESCUE AND FIRE FIGHTING SERVICES\n{}", "é".repeat(5000));
        let spec = STANDARD_SECTIONS.iter().find(|s| s.number == 6).unwrap();
        let section = extractor().locate_section(&page, spec).unwrap();
        assert_eq!(section.raw_text.chars().count(), spec.budget);
    }

    #[test]
    fn test_inline_section_reference_does_not_end_section() {
        let page = "AD 2.3 OPERATIONAL HOURS\nAD Operator H24\nSee remarks in AD 2.20 for details\nATS H24\nAD 2.4 HANDLING SERVICES\n";
        let spec = STANDARD_SECTIONS.iter().find(|s| s.number == 3).unwrap();

        let section = extractor().locate_section(page, spec).unwrap();
        assert!(section.raw_text.contains("ATS H24"));
        assert!(!section.raw_text.contains("HANDLING"));

        let fields = extractor().extract_standard(page);
        assert_eq!(fields[&FieldName::Ats], "H24");
        assert_eq!(fields[&FieldName::AdOperator], "H24");
    }

    #[test]
    fn test_header_line_beats_earlier_mention() {
        let page = "AD 2.2 AERODROME GEOGRAPHICAL AND ADMINISTRATIVE DATA\n\
                    8 Remarks Hours of service are listed in AD 2.3\n\
                    AD 2.3 OPERATIONAL HOURS\nATS 0600-2200\n";
        let spec = STANDARD_SECTIONS.iter().find(|s| s.number == 3).unwrap();
        let section = extractor().locate_section(page, spec).unwrap();
        assert!(section.raw_text.starts_with("AD 2.3 OPERATIONAL HOURS"));
        assert_eq!(extractor().extract_standard(page)[&FieldName::Ats], "06:00-22:00");
    }

    #[test]
    fn test_traffic_caption_is_not_the_value() {
        let page = "AD 2.2 AERODROME GEOGRAPHICAL AND ADMINISTRATIVE DATA\n\
                    7 Types of traffic permitted (IFR/VFR) VFR\n\
                    8 Remarks NIL\n\
                    AD 2.3 OPERATIONAL HOURS\nATS H24\n";
        let fields = extractor().extract_standard(page);
        assert_eq!(fields[&FieldName::TrafficTypes], "VFR");

        let ifr_only = page.replace(") VFR", ") IFR");
        assert_eq!(extractor().extract_standard(&ifr_only)[&FieldName::TrafficTypes], "IFR");
    }

    #[test]
    fn test_bare_header_is_found() {
        let page = "AD 2.3\nAD Operator H24\nAD 2.4\n";
        let fields = extractor().extract_standard(page);
        assert_eq!(fields[&FieldName::AdOperator], "H24");
    }

    #[test]
    fn test_contacts_pair_phones_with_emails() {
        let contacts = extractor().extract_contacts(EVRA_PAGE);
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].contact_type, "AD Operator Contact 1");
        assert_eq!(contacts[0].phone, "+371 67207009");
        assert_eq!(contacts[0].email, "info@riga-airport.com");
        assert_eq!(contacts[1].phone, "+371 67207100");
        assert_eq!(contacts[1].email, "");
    }

    #[test]
    fn test_contacts_email_only() {
        let page = "AD 2.2 AERODROME GEOGRAPHICAL AND ADMINISTRATIVE DATA\n\
                    AD operator, address: Airport Ltd, LV-1053, ops@airport.example\n\
                    Types of traffic permitted VFR";
        let contacts = extractor().extract_contacts(page);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].phone, "");
        assert_eq!(contacts[0].email, "ops@airport.example");
    }

    #[test]
    fn test_uppercase_email_keeps_its_domain() {
        let emails = find_emails("E-mail: AIS@LGS.LV\nAFS: info@riga-airport.comEVRAYDYX");
        assert_eq!(emails, vec!["AIS@LGS.LV".to_string(), "info@riga-airport.com".to_string()]);
    }

    #[test]
    fn test_contacts_absent() {
        assert!(extractor().extract_contacts("AD operator: Airport Ltd").is_empty());
        assert!(extractor().extract_contacts("nothing").is_empty());
    }

    #[test]
    fn test_phones_skip_coordinates_and_dates() {
        let phones = find_phones("565525N 0240800E 2025-10-02 0700-1900 +44 20 7946 0000");
        assert_eq!(phones, vec!["+44 20 7946 0000".to_string()]);
    }
}
