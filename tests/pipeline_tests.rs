//! End-to-end lookups against an in-memory eAIP site
//!
//! The fixture mirrors a typical Eurocontrol-style publication: a landing
//! page linking dated editions, a frameset index with a nested navigation
//! frame and a content frame, and one AD 2 page per aerodrome.

use std::sync::Arc;

use aip_ops_scraper_lib::application::navigation_engine::{NavigationEngine, NavigationSettings};
use aip_ops_scraper_lib::application::{AirportInfoService, CountryResolver, ScraperRegistry};
use aip_ops_scraper_lib::domain::{AirportCode, CountryProfile, ProfileCatalog, Region};
use aip_ops_scraper_lib::infrastructure::{
    AipError, DocumentDriverFactory, DocumentPageDriver, NavigationStage, StaticHtmlSource,
};

const LANDING: &str = "https://ais.example.lv/aiseaip";
const EDITION: &str = "https://ais.example.lv/eAIPfiles/2025-10-30/html/";

const LANDING_HTML: &str = r#"<html><body>
    <h1>Electronic AIP</h1>
    <a href="archive/2025-09-04/html/index-en-GB.html">AIRAC AMDT 09/2025</a>
    <a href="eAIPfiles/2025-10-30/html/index-en-GB.html">AIRAC AMDT 10/2025 effective 30-OCT-2025</a>
    <a href="about.html">About</a>
</body></html>"#;

const INDEX_HTML: &str = r#"<html><frameset cols="25%,75%">
    <frame name="eAISNavigationBase" src="toc-frameset-en-GB.html">
    <frame name="eAISContent" src="eAIP/cover.html">
</frameset></html>"#;

const TOC_FRAMESET_HTML: &str = r#"<html><frameset rows="10%,90%">
    <frame name="eAISNavigation" src="eAIP/menu.html">
</frameset></html>"#;

const MENU_HTML: &str = r#"<html><head><base target="eAISContent"></head><body>
    <a href="EV-GEN-0.1-en-GB.html">GEN 0.1</a>
    <a href="EV-AD-2.EVRA-en-GB.html#AD-2.EVRA" title="EVRA">EVRA RIGA</a>
</body></html>"#;

const EVRA_HTML: &str = r#"<html><head><title>EVRA</title></head><body>
<h3>EVRA AD 2.1 AERODROME LOCATION INDICATOR AND NAME</h3>
<p>EVRA — RIGA/Riga International</p>
<h3>EVRA AD 2.2 AERODROME GEOGRAPHICAL AND ADMINISTRATIVE DATA</h3>
<table>
<tr><td>1</td><td>ARP coordinates and site at AD</td><td>565525N 0240800E</td></tr>
<tr><td>6</td><td>AD operator, address, telephone, telefax, e-mail, AFS, URL</td>
<td>Riga International Airport, LV-1053<br>Tel: +371 67207009<br>Fax: +371 67207100<br>E-mail: info@riga-airport.com</td></tr>
<tr><td>7</td><td>Types of traffic permitted (IFR/VFR)</td><td>IFR/VFR</td></tr>
<tr><td>8</td><td>Remarks</td><td>NIL</td></tr>
</table>
<h3>EVRA AD 2.3 OPERATIONAL HOURS</h3>
<table>
<tr><td>1</td><td>AD Operator</td><td>MON-FRI: 0700-1900</td></tr>
<tr><td>2</td><td>Customs and immigration</td><td>H24</td></tr>
<tr><td>3</td><td>Health and sanitation</td><td>H24</td></tr>
<tr><td>4</td><td>AIS Briefing Office</td><td>H24</td></tr>
<tr><td>5</td><td>ATS Reporting Office (ARO)</td><td>H24</td></tr>
<tr><td>6</td><td>MET Briefing Office</td><td>H24</td></tr>
<tr><td>7</td><td>ATS</td><td>H24</td></tr>
<tr><td>8</td><td>Fuelling</td><td>H24</td></tr>
<tr><td>12</td><td>Remarks</td><td>Aerodrome closed to training flights on weekends.</td></tr>
</table>
<h3>EVRA AD 2.4 HANDLING SERVICES AND FACILITIES</h3>
<table><tr><td>1</td><td>Cargo-handling facilities</td><td>Yes</td></tr></table>
<h3>EVRA AD 2.6 RESCUE AND FIRE FIGHTING SERVICES</h3>
<table><tr><td>1</td><td>AD category for fire fighting</td><td>CAT 9</td></tr></table>
</body></html>"#;

fn edition_url(path: &str) -> String {
    format!("{EDITION}{path}")
}

fn latvia_site(menu: &str) -> StaticHtmlSource {
    StaticHtmlSource::new()
        .with_page(LANDING, LANDING_HTML)
        .with_page(&edition_url("index-en-GB.html"), INDEX_HTML)
        .with_page(&edition_url("toc-frameset-en-GB.html"), TOC_FRAMESET_HTML)
        .with_page(&edition_url("eAIP/menu.html"), menu)
        .with_page(&edition_url("eAIP/cover.html"), "<html><body><p>Cover</p></body></html>")
        .with_page(&edition_url("eAIP/EV-AD-2.EVRA-en-GB.html"), EVRA_HTML)
}

fn latvia_profile() -> CountryProfile {
    CountryProfile::current_issue("Latvia", Region::Europe, LANDING).with_edition_hint("eAIPfiles")
}

fn service_for(source: StaticHtmlSource, profiles: Vec<CountryProfile>) -> AirportInfoService {
    let factory = Arc::new(DocumentDriverFactory::new(Arc::new(source)));
    let registry = ScraperRegistry::init(
        ProfileCatalog::from_profiles(profiles),
        factory,
        NavigationSettings::default(),
        "Latvia",
    );
    AirportInfoService::new(CountryResolver::standard(), Arc::new(registry))
}

fn code(raw: &str) -> AirportCode {
    AirportCode::parse(raw).unwrap()
}

#[tokio::test]
async fn lookup_through_current_issue_link_and_frames() {
    let service = service_for(latvia_site(MENU_HTML), vec![latvia_profile()]);

    let record = service.get_airport_info("evra").await.unwrap();

    assert_eq!(record.airport_code, "EVRA");
    assert_eq!(record.airport_name, "EVRA — RIGA/Riga International");
    assert_eq!(record.ad_operator, "07:00-19:00");
    assert_eq!(record.customs_and_immigration, "H24");
    assert_eq!(record.ats, "H24");
    assert_eq!(record.ad_administration, "NIL");
    assert_eq!(record.traffic_types, "IFR/VFR");
    assert_eq!(record.fire_fighting_category, "9");
    assert_eq!(record.operational_remarks, "Aerodrome closed to training flights on weekends.");
    assert_eq!(record.administrative_remarks, "NIL");

    assert_eq!(record.contacts.len(), 2);
    assert_eq!(record.contacts[0].contact_type, "AD Operator Contact 1");
    assert_eq!(record.contacts[0].phone, "+371 67207009");
    assert_eq!(record.contacts[0].email, "info@riga-airport.com");
    assert_eq!(record.contacts[1].phone, "+371 67207100");

    service.shutdown().await;
}

#[tokio::test]
async fn record_json_has_exactly_the_fixed_keys() {
    let service = service_for(latvia_site(MENU_HTML), vec![latvia_profile()]);
    let record = service.get_airport_info("EVRA").await.unwrap();

    let json = serde_json::to_value(&record).unwrap();
    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "adAdministration",
            "adOperator",
            "administrativeRemarks",
            "airportCode",
            "airportName",
            "ats",
            "contacts",
            "customsAndImmigration",
            "fireFightingCategory",
            "operationalRemarks",
            "trafficTypes",
        ]
    );
    let contact_keys: Vec<&str> = json["contacts"][0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(contact_keys.len(), 5);
    assert!(contact_keys.contains(&"type"));
}

#[tokio::test]
async fn missing_menu_anchor_falls_back_to_direct_url() {
    let menu = r#"<html><body><a href="EV-GEN-0.1-en-GB.html">GEN 0.1</a></body></html>"#;
    let mut driver = DocumentPageDriver::new(Arc::new(latvia_site(menu)));

    let page = NavigationEngine::default()
        .locate_airport_page(&mut driver, &latvia_profile(), &code("EVRA"))
        .await
        .unwrap();

    assert_eq!(
        page.reached_via,
        format!("direct url {}", edition_url("eAIP/EV-AD-2.EVRA-en-GB.html"))
    );
    assert_eq!(page.edition.effective_date_label, "2025-10-30");
    assert!(page.text.contains("EVRA AD 2.3 OPERATIONAL HOURS"));
}

#[tokio::test]
async fn collapsed_menu_is_expanded_before_searching() {
    let menu = r#"<html><body><a href="menu-ad.html">PART 3 - AERODROMES (AD)</a></body></html>"#;
    let expanded = r#"<html><body>
        <a href="EV-AD-2.EVRA-en-GB.html" target="eAISContent">EVRA RIGA</a>
    </body></html>"#;
    let source = latvia_site(menu).with_page(&edition_url("eAIP/menu-ad.html"), expanded);
    let mut driver = DocumentPageDriver::new(Arc::new(source));

    let page = NavigationEngine::default()
        .locate_airport_page(&mut driver, &latvia_profile(), &code("EVRA"))
        .await
        .unwrap();

    assert_eq!(page.reached_via, "click anchor");
}

#[tokio::test]
async fn landing_without_issue_link_fails_navigation() {
    let source = latvia_site(MENU_HTML).with_page(
        LANDING,
        r#"<html><body><a href="about.html">About</a><a href="contact.html">Contact</a></body></html>"#,
    );
    let service = service_for(source, vec![latvia_profile()]);

    let error = service.get_airport_info("EVRA").await.unwrap_err();
    match error {
        AipError::NavigationFailure { code, stage, attempts } => {
            assert_eq!(code, "EVRA");
            assert_eq!(stage, NavigationStage::ResolveCurrentEdition);
            assert_eq!(attempts.len(), 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn alternate_landing_is_used_when_primary_fails() {
    let profile = CountryProfile::current_issue("Latvia", Region::Europe, "https://down.example.lv/eaip/")
        .with_alternate_landing(LANDING)
        .with_edition_hint("eAIPfiles");
    let service = service_for(latvia_site(MENU_HTML), vec![profile]);

    let record = service.get_airport_info("EVRA").await.unwrap();
    assert_eq!(record.ats, "H24");
}

#[tokio::test]
async fn unreachable_landing_reports_every_candidate() {
    let profile = CountryProfile::current_issue("Latvia", Region::Europe, "https://down.example.lv/eaip/")
        .with_alternate_landing("https://also-down.example.lv/");
    let service = service_for(latvia_site(MENU_HTML), vec![profile]);

    match service.get_airport_info("EVRA").await.unwrap_err() {
        AipError::NavigationFailure { stage, attempts, .. } => {
            assert_eq!(stage, NavigationStage::OpenLanding);
            assert_eq!(attempts.len(), 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unregistered_country_uses_default_scraper() {
    // EETN resolves to Estonia, which has no profile here; Latvia serves it
    let service = service_for(latvia_site(MENU_HTML), vec![latvia_profile()]);

    let error = service.get_airport_info("EETN").await.unwrap_err();
    match error {
        AipError::NavigationFailure { stage, .. } => assert_eq!(stage, NavigationStage::ReachAirportPage),
        other => panic!("expected the default scraper to run, got {other:?}"),
    }
    assert_eq!(service.registry().cached_count().await, 1);
}

#[tokio::test]
async fn per_call_scrapers_never_hold_a_page() {
    let service = service_for(latvia_site(MENU_HTML), vec![latvia_profile().per_call()]);

    service.get_airport_info("EVRA").await.unwrap();
    let scraper = service.registry().get_instance("Latvia").await.unwrap();
    assert!(!scraper.holds_page().await);
}

#[tokio::test]
async fn concurrent_lookups_on_one_scraper_are_serialized() {
    let service = service_for(latvia_site(MENU_HTML), vec![latvia_profile()]);

    let lookups = ["EVRA", "evra", " EVRA "].map(|raw| service.get_airport_info(raw));
    let records = futures::future::join_all(lookups).await;

    let first = records[0].as_ref().unwrap();
    assert!(records.iter().all(|r| r.as_ref().unwrap() == first));

    let scraper = service.registry().get_instance("Latvia").await.unwrap();
    assert!(scraper.holds_page().await);
    service.shutdown().await;
    assert_eq!(service.registry().cached_count().await, 0);
}
