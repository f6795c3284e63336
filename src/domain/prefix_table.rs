//! Standard ICAO location-indicator prefix table
//!
//! Entries are listed in publication order. When a prefix appears more than
//! once, the later entry is the one that takes effect.

use crate::domain::country::Region;

use Region::{Africa, Asia, Europe, NorthAmerica, Oceania, SouthAmerica};

/// (prefix, country, region)
pub const STANDARD_PREFIXES: &[(&str, &str, Region)] = &[
    ("K", "United States of America", NorthAmerica),
    ("C", "Canada", NorthAmerica),
    ("M", "Mexico", NorthAmerica),
    ("TI", "Costa Rica", NorthAmerica),
    ("MS", "El Salvador", NorthAmerica),
    ("MG", "Guatemala", NorthAmerica),
    ("MH", "Honduras", NorthAmerica),
    ("MP", "Panama", NorthAmerica),
    ("E", "Norway", Europe),
    ("EN", "Norway", Europe),
    ("ES", "Sweden", Europe),
    ("EF", "Finland", Europe),
    ("EK", "Denmark", Europe),
    ("BI", "Iceland", Europe),
    ("EG", "United Kingdom", Europe),
    ("EI", "Ireland", Europe),
    ("LF", "France", Europe),
    ("ED", "Germany", Europe),
    ("LS", "Switzerland", Europe),
    ("LO", "Austria", Europe),
    ("LOWW", "Austria", Europe),
    ("L", "Spain", Europe),
    ("LE", "Spain", Europe),
    ("LJ", "Slovenia", Europe),
    ("LD", "Croatia", Europe),
    ("LY", "Serbia", Europe),
    ("LZ", "Bulgaria", Europe),
    ("LH", "Hungary", Europe),
    ("LR", "Romania", Europe),
    ("LK", "Czech Republic", Europe),
    ("EP", "Poland", Europe),
    ("LKPR", "Czech Republic", Europe),
    ("LI", "Italy", Europe),
    ("LG", "Greece", Europe),
    ("LT", "Turkey", Europe),
    ("LP", "Portugal", Europe),
    ("EV", "Latvia", Europe),
    ("EE", "Estonia", Europe),
    ("EY", "Lithuania", Europe),
    ("LA", "Albania", Europe),
    ("LQ", "Bosnia and Herzegovina", Europe),
    ("LZBB", "Bulgaria", Europe),
    ("BK", "Kosovo", Europe),
    ("LJ", "Slovenia", Europe),
    ("LJLJ", "Slovenia", Europe),
    ("LZ", "Slovakia", Europe),
    ("VH", "Hong Kong", Asia),
    ("RC", "Taiwan", Asia),
    ("RJ", "Japan", Asia),
    ("RK", "South Korea", Asia),
    ("VT", "Thailand", Asia),
    ("WM", "Malaysia", Asia),
    ("WS", "Singapore", Asia),
    ("W", "Indonesia", Asia),
    ("VI", "India", Asia),
    ("OP", "Pakistan", Asia),
    ("VG", "Bangladesh", Asia),
    ("VN", "Nepal", Asia),
    ("V", "Sri Lanka", Asia),
    ("OB", "Bahrain", Asia),
    ("OE", "Saudi Arabia", Asia),
    ("OM", "United Arab Emirates", Asia),
    ("OO", "Oman", Asia),
    ("OK", "Kuwait", Asia),
    ("LL", "Israel", Asia),
    ("OJ", "Jordan", Asia),
    ("OL", "Lebanon", Asia),
    ("OS", "Syria", Asia),
    ("OR", "Iraq", Asia),
    ("OI", "Iran", Asia),
    ("UG", "Georgia", Asia),
    ("UA", "Kazakhstan", Asia),
    ("UO", "Kyrgyzstan", Asia),
    ("UT", "Tajikistan", Asia),
    ("UT", "Turkmenistan", Asia),
    ("UZ", "Uzbekistan", Asia),
    ("ZM", "Mongolia", Asia),
    ("DA", "Algeria", Africa),
    ("DT", "Tunisia", Africa),
    ("HL", "Libya", Africa),
    ("HE", "Egypt", Africa),
    ("H", "Ethiopia", Africa),
    ("HA", "Ethiopia", Africa),
    ("HB", "Switzerland", Europe),
    ("HC", "Somalia", Africa),
    ("HD", "Djibouti", Africa),
    ("F", "South Africa", Africa),
    ("FA", "South Africa", Africa),
    ("FB", "Botswana", Africa),
    ("FC", "Republic of the Congo", Africa),
    ("FD", "Eswatini", Africa),
    ("FE", "Central African Republic", Africa),
    ("FG", "Equatorial Guinea", Africa),
    ("FH", "Saint Helena", Africa),
    ("FI", "Mauritius", Africa),
    ("FK", "Cameroon", Africa),
    ("FL", "Zambia", Africa),
    ("FM", "Comoros", Africa),
    ("FN", "Angola", Africa),
    ("FO", "Gabon", Africa),
    ("FP", "São Tomé and Príncipe", Africa),
    ("FQ", "Mozambique", Africa),
    ("FS", "Seychelles", Africa),
    ("FT", "Chad", Africa),
    ("FV", "Zimbabwe", Africa),
    ("FW", "Malawi", Africa),
    ("FX", "Lesotho", Africa),
    ("FY", "Namibia", Africa),
    ("FZ", "Democratic Republic of the Congo", Africa),
    ("G", "Senegal", Africa),
    ("GO", "Senegal", Africa),
    ("GQ", "Mauritania", Africa),
    ("GS", "Western Sahara", Africa),
    ("GV", "Cabo Verde", Africa),
    ("HR", "Rwanda", Africa),
    ("HS", "Sudan", Africa),
    ("HT", "Tanzania", Africa),
    ("HU", "Uganda", Africa),
    ("FV", "Zimbabwe", Africa),
    ("DN", "Nigeria", Africa),
    ("DF", "Burkina Faso", Africa),
    ("DFOO", "Burkina Faso", Africa),
    ("DI", "Ivory Coast (Côte d'Ivoire)", Africa),
    ("DXXX", "Ivory Coast (Côte d'Ivoire)", Africa),
    ("DX", "Togo", Africa),
    ("DG", "Ghana", Africa),
    ("DFOO", "Ghana", Africa),
    ("SA", "Argentina", SouthAmerica),
    ("SB", "Brazil", SouthAmerica),
    ("SC", "Chile", SouthAmerica),
    ("SE", "Ecuador", SouthAmerica),
    ("SK", "Colombia", SouthAmerica),
    ("SL", "Bolivia", SouthAmerica),
    ("SM", "Suriname", SouthAmerica),
    ("SO", "French Guiana", SouthAmerica),
    ("SP", "Peru", SouthAmerica),
    ("SU", "Uruguay", SouthAmerica),
    ("SV", "Venezuela", SouthAmerica),
    ("SY", "Guyana", SouthAmerica),
    ("S", "Paraguay", SouthAmerica),
    ("Y", "Australia", Oceania),
    ("YB", "Australia", Oceania),
    ("YC", "Australia", Oceania),
    ("YD", "Australia", Oceania),
    ("YF", "Australia", Oceania),
    ("YG", "Australia", Oceania),
    ("YH", "Australia", Oceania),
    ("YJ", "Australia", Oceania),
    ("YK", "Australia", Oceania),
    ("YL", "Australia", Oceania),
    ("YM", "Australia", Oceania),
    ("YN", "Australia", Oceania),
    ("YO", "Australia", Oceania),
    ("YP", "Australia", Oceania),
    ("YQ", "Australia", Oceania),
    ("YR", "Australia", Oceania),
    ("YS", "Australia", Oceania),
    ("YT", "Australia", Oceania),
    ("YU", "Australia", Oceania),
    ("YV", "Australia", Oceania),
    ("YW", "Australia", Oceania),
    ("YX", "Australia", Oceania),
    ("YY", "Australia", Oceania),
    ("YZ", "Australia", Oceania),
    ("NZ", "New Zealand", Oceania),
    ("AG", "Solomon Islands", Oceania),
    ("AN", "Nauru", Oceania),
    ("AY", "Papua New Guinea", Oceania),
    ("NF", "Fiji", Oceania),
    ("NG", "Kiribati", Oceania),
    ("NI", "Vanuatu", Oceania),
    ("NL", "Wallis and Futuna", Oceania),
    ("NS", "Samoa", Oceania),
    ("NT", "French Polynesia", Oceania),
    ("NV", "New Caledonia", Oceania),
    ("NW", "New Caledonia", Oceania),
    ("NX", "Tonga", Oceania),
    ("NZ", "New Zealand", Oceania),
];

/// Effective prefixes for a country, after later entries override earlier ones
pub fn prefixes_for(country: &str) -> Vec<String> {
    let mut prefixes: Vec<String> = Vec::new();
    for (index, (prefix, name, _)) in STANDARD_PREFIXES.iter().enumerate() {
        let overridden = STANDARD_PREFIXES[index + 1..]
            .iter()
            .any(|(later, _, _)| later == prefix);
        if !overridden
            && name.eq_ignore_ascii_case(country)
            && !prefixes.iter().any(|p| p == prefix)
        {
            prefixes.push((*prefix).to_string());
        }
    }
    prefixes
}
