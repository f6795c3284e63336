//! Builds the fixed-schema record from extracted values

use crate::application::field_patterns::FieldName;
use crate::application::normalize;
use crate::application::section_extractor::FieldMap;
use crate::domain::constants::sentinel;
use crate::domain::{AirportCode, AirportRecord, Contact};

/// Assemble the record for `code`.
///
/// Pure: the same inputs always give the same record. Missing map entries
/// are treated like misses during extraction.
pub fn assemble(code: &AirportCode, fields: &FieldMap, contacts: Vec<Contact>) -> AirportRecord {
    let value = |field: FieldName| fields.get(&field).map(String::as_str).unwrap_or_default();

    let hours = |field: FieldName| normalize::canonicalize_hours(value(field));
    let remarks = |field: FieldName| {
        normalize::clean_remarks(value(field)).unwrap_or_else(|| sentinel::NIL.to_string())
    };
    let specified = |field: FieldName| {
        let collapsed = normalize::collapse_whitespace(value(field));
        if collapsed.is_empty() {
            sentinel::NOT_SPECIFIED.to_string()
        } else {
            collapsed
        }
    };

    let contacts = if contacts.is_empty() {
        vec![Contact::placeholder()]
    } else {
        contacts
    };

    AirportRecord {
        airport_code: code.to_string(),
        airport_name: display_name(code, value(FieldName::AirportName)),
        ad_administration: hours(FieldName::AdAdministration),
        ad_operator: hours(FieldName::AdOperator),
        customs_and_immigration: hours(FieldName::CustomsAndImmigration),
        ats: hours(FieldName::Ats),
        operational_remarks: remarks(FieldName::OperationalRemarks),
        traffic_types: specified(FieldName::TrafficTypes),
        administrative_remarks: remarks(FieldName::AdministrativeRemarks),
        fire_fighting_category: specified(FieldName::FireFightingCategory),
        contacts,
    }
}

/// `"{CODE} — {name}"`, or the bare code when no name was found
fn display_name(code: &AirportCode, raw: &str) -> String {
    match normalize::clean_airport_name(raw) {
        Some(name) if !name.eq_ignore_ascii_case(code.as_str()) => format!("{code} — {name}"),
        _ => code.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constants::contact;

    fn code() -> AirportCode {
        AirportCode::parse("EVRA").unwrap()
    }

    #[test]
    fn test_empty_map_gives_sentinels() {
        let record = assemble(&code(), &FieldMap::new(), Vec::new());
        assert_eq!(record.airport_code, "EVRA");
        assert_eq!(record.airport_name, "EVRA");
        assert_eq!(record.ad_administration, sentinel::NIL);
        assert_eq!(record.ats, sentinel::NIL);
        assert_eq!(record.operational_remarks, sentinel::NIL);
        assert_eq!(record.traffic_types, sentinel::NOT_SPECIFIED);
        assert_eq!(record.fire_fighting_category, sentinel::NOT_SPECIFIED);
        assert_eq!(record.contacts, vec![Contact::placeholder()]);
        assert_eq!(record.contacts[0].notes, contact::UNAVAILABLE_NOTES);
    }

    #[test]
    fn test_values_are_normalized() {
        let mut fields = FieldMap::new();
        fields.insert(FieldName::AirportName, "RIGA/Riga International".into());
        fields.insert(FieldName::AdOperator, "0700-1900".into());
        fields.insert(FieldName::Ats, "24 HR".into());
        fields.insert(FieldName::OperationalRemarks, "  PPR   for  GA  flights ".into());
        fields.insert(FieldName::TrafficTypes, "IFR/VFR".into());
        fields.insert(FieldName::FireFightingCategory, "9".into());

        let record = assemble(&code(), &fields, Vec::new());
        assert_eq!(record.airport_name, "EVRA — RIGA/Riga International");
        assert_eq!(record.ad_operator, "07:00-19:00");
        assert_eq!(record.ats, "H24");
        assert_eq!(record.operational_remarks, "PPR for GA flights");
        assert_eq!(record.traffic_types, "IFR/VFR");
        assert_eq!(record.fire_fighting_category, "9");
    }

    #[test]
    fn test_code_as_name_renders_bare_code() {
        let mut fields = FieldMap::new();
        fields.insert(FieldName::AirportName, "EVRA".into());
        assert_eq!(assemble(&code(), &fields, Vec::new()).airport_name, "EVRA");
    }

    #[test]
    fn test_contacts_are_kept() {
        let contact = Contact {
            contact_type: "AD Operator Contact 1".into(),
            phone: "+371 67207009".into(),
            name: String::new(),
            email: String::new(),
            notes: contact::SOURCE_NOTES.into(),
        };
        let record = assemble(&code(), &FieldMap::new(), vec![contact.clone()]);
        assert_eq!(record.contacts, vec![contact]);
    }

    #[test]
    fn test_assembly_is_idempotent_on_hours() {
        let mut fields = FieldMap::new();
        fields.insert(FieldName::Ats, "07.00 – 19.00".into());
        let first = assemble(&code(), &fields, Vec::new());

        fields.insert(FieldName::Ats, first.ats.clone());
        let second = assemble(&code(), &fields, Vec::new());
        assert_eq!(first, second);
    }
}
