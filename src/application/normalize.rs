//! Value canonicalization shared by extraction and assembly
//!
//! Every function here is idempotent: feeding its output back in returns
//! the same string.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::constants::{limits, sentinel};

static H24_WHOLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:H\s*24|24\s*H(?:RS?|OURS?)?|24\s*HOURS?)$").expect("valid H24 regex")
});

static TIME_RANGE_WHOLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2})[:.]?(\d{2})\s*[-–]\s*(\d{2})[:.]?(\d{2})$").expect("valid time range regex")
});

static ON_REQUEST_WHOLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:on\s+request|O/R|may\s+be\s+requested|by\s+prior\s+request|PPR)$")
        .expect("valid on-request regex")
});

static NIL_WHOLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:NIL|none|-|n/a)$").expect("valid NIL regex"));

static COPYRIGHT_TRAILER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)©.*$").expect("valid copyright regex"));

static AIP_FOOTER_TRAILER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\bAIP\s+\S+(?:\s+\S+)?\s+AIRAC\b.*$").expect("valid AIP footer regex")
});

static TRAILING_SECTION_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\bAD\s*2\.\d+\b.*$").expect("valid section ref regex"));

/// Trim and collapse internal whitespace runs to single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max_chars` characters
pub fn cap_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].trim_end().to_string(),
        None => text.to_string(),
    }
}

/// Canonical form of an hours or service-availability value.
///
/// `24H`, `24 HR`, `H 24` → `H24`; `0700-1900` and `07.00 – 19.00` →
/// `07:00-19:00`; "May be requested" → `On request`; anything else is
/// returned with whitespace collapsed.
pub fn canonicalize_hours(raw: &str) -> String {
    let value = collapse_whitespace(raw);
    if value.is_empty() {
        return sentinel::NIL.to_string();
    }
    if H24_WHOLE.is_match(&value) {
        return sentinel::H24.to_string();
    }
    if let Some(range) = canonical_time_range(&value) {
        return range;
    }
    if ON_REQUEST_WHOLE.is_match(&value) {
        return sentinel::ON_REQUEST.to_string();
    }
    if NIL_WHOLE.is_match(&value) {
        return sentinel::NIL.to_string();
    }
    value
}

/// `HH:MM-HH:MM` if `value` is exactly one valid time range
pub fn canonical_time_range(value: &str) -> Option<String> {
    let caps = TIME_RANGE_WHOLE.captures(value.trim())?;
    let part = |i: usize| caps.get(i).map_or("", |m| m.as_str());
    let (h1, m1, h2, m2) = (part(1), part(2), part(3), part(4));
    if valid_clock(h1, m1) && valid_clock(h2, m2) {
        Some(format!("{h1}:{m1}-{h2}:{m2}"))
    } else {
        None
    }
}

fn valid_clock(hours: &str, minutes: &str) -> bool {
    match (hours.parse::<u32>(), minutes.parse::<u32>()) {
        (Ok(24), Ok(0)) => true,
        (Ok(h), Ok(m)) => h < 24 && m < 60,
        _ => false,
    }
}

/// `IFR/VFR`, `IFR` or `VFR`; `None` if neither rule is mentioned
pub fn canonicalize_traffic(raw: &str) -> Option<String> {
    let upper = raw.to_uppercase();
    match (upper.contains("IFR"), upper.contains("VFR")) {
        (true, true) => Some("IFR/VFR".to_string()),
        (true, false) => Some("IFR".to_string()),
        (false, true) => Some("VFR".to_string()),
        (false, false) => None,
    }
}

/// Remarks text without copyright and AIP page-footer trailers, capped.
///
/// `None` when what remains is too short to be a remark.
pub fn clean_remarks(raw: &str) -> Option<String> {
    let without_copyright = COPYRIGHT_TRAILER.replace(raw, "");
    let without_footer = AIP_FOOTER_TRAILER.replace(&without_copyright, "");
    let collapsed = collapse_whitespace(&without_footer);
    let trimmed = collapsed.trim_start_matches([':', '-', '–', ' ']).trim();

    if trimmed.chars().count() <= limits::MIN_REMARKS_CHARS {
        return None;
    }
    Some(cap_chars(trimmed, limits::MAX_REMARKS_CHARS))
}

/// Aerodrome name from the AD 2.1 line, without trailing section references
pub fn clean_airport_name(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    let without_ref = TRAILING_SECTION_REF.replace(&collapsed, "");
    let name = without_ref.trim().trim_end_matches(['/', '-', '–', '—']).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("H24", "H24")]
    #[case("24H", "H24")]
    #[case("24 HR", "H24")]
    #[case("24 hours", "H24")]
    #[case("h 24", "H24")]
    #[case("0700-1900", "07:00-19:00")]
    #[case("07:00 - 19:00", "07:00-19:00")]
    #[case("07.00–19.00", "07:00-19:00")]
    #[case("0000-2400", "00:00-24:00")]
    #[case("May be requested", "On request")]
    #[case("O/R", "On request")]
    #[case("nil", "NIL")]
    #[case("   ", "NIL")]
    #[case("MON-FRI  0700-1900", "MON-FRI 0700-1900")]
    #[case("2500-2600", "2500-2600")]
    fn test_canonicalize_hours(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(canonicalize_hours(raw), expected);
    }

    #[rstest]
    #[case("IFR/VFR", Some("IFR/VFR"))]
    #[case("VFR, IFR", Some("IFR/VFR"))]
    #[case("ifr", Some("IFR"))]
    #[case("VFR", Some("VFR"))]
    #[case("Not specified", None)]
    fn test_canonicalize_traffic(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(canonicalize_traffic(raw).as_deref(), expected);
    }

    #[test]
    fn test_clean_remarks_strips_trailers() {
        let raw = ": Aerodrome closed to training flights on weekends.  © LGS 2025 AIP LATVIA";
        assert_eq!(
            clean_remarks(raw).as_deref(),
            Some("Aerodrome closed to training flights on weekends.")
        );

        let footer = "PPR for GA flights AIP LATVIA AIRAC AMDT 10/2025 30 OCT 2025";
        assert_eq!(clean_remarks(footer).as_deref(), Some("PPR for GA flights"));
    }

    #[test]
    fn test_clean_remarks_short_is_none() {
        assert_eq!(clean_remarks("NIL"), None);
        assert_eq!(clean_remarks(" : - "), None);
    }

    #[test]
    fn test_clean_remarks_caps_length() {
        let long = "x".repeat(450);
        assert_eq!(clean_remarks(&long).unwrap().chars().count(), limits::MAX_REMARKS_CHARS);
    }

    #[test]
    fn test_clean_airport_name() {
        assert_eq!(
            clean_airport_name("RIGA/Riga International   AD 2.2 AERODROME").as_deref(),
            Some("RIGA/Riga International")
        );
        assert_eq!(clean_airport_name("  AD 2.2"), None);
    }

    proptest! {
        #[test]
        fn prop_canonicalize_hours_is_idempotent(raw in "[ A-Za-z0-9:.\\-/]{0,40}") {
            let once = canonicalize_hours(&raw);
            prop_assert_eq!(canonicalize_hours(&once), once);
        }

        #[test]
        fn prop_time_ranges_canonicalize(h1 in 0u32..24, m1 in 0u32..60, h2 in 0u32..24, m2 in 0u32..60) {
            let raw = format!("{h1:02}{m1:02}-{h2:02}{m2:02}");
            prop_assert_eq!(canonicalize_hours(&raw), format!("{h1:02}:{m1:02}-{h2:02}:{m2:02}"));
        }

        #[test]
        fn prop_collapse_whitespace_is_idempotent(raw in "\\PC{0,60}") {
            let once = collapse_whitespace(&raw);
            prop_assert_eq!(collapse_whitespace(&once), once);
        }
    }
}
