//! ICAO location identifiers served by vAIP
//!
//! The map shows every aerodrome in Morocco, southern territories included.

/// Morocco (MA) and southern territories ICAO codes, in map display order
pub const MOROCCAN_AIRPORTS: [&str; 31] = [
    "GMMN", "GMMX", "GMFF", "GMTT", "GMAD", "GMME", "GMFO", "GMMZ", "GMMI", "GMMW",
    "GMTA", "GMFK", "GMAT", "GMTN", "GMMY", "GMMD", "GMFB", "GMFM", "GMMB", "GMAG",
    "GMFI", "GMSL", "GMAZ", "GMFA", "GMMO", "GMFZ", "GMAA", "GMMT",
    "GMML", "GMMH", "GMMA",
];

/// Country code reported for every airport, southern territories included
pub const COUNTRY_CODE: &str = "MA";

/// Canonical form of a requested code: trimmed, uppercase
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Owned copy of the default airport list
pub fn default_airports() -> Vec<String> {
    MOROCCAN_AIRPORTS.iter().map(|c| c.to_string()).collect()
}
