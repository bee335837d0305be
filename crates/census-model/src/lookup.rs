//! Static code tables for census regions and divisions.

/// Sentinel for missing or blank categorical values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Census region names keyed by region code.
const REGIONS: &[(&str, &str)] = &[
    ("1", "Northeast"),
    ("2", "Midwest"),
    ("3", "South"),
    ("4", "West"),
];

/// Census division names keyed by division code.
const DIVISIONS: &[(&str, &str)] = &[
    ("1", "New England"),
    ("2", "Middle Atlantic"),
    ("3", "East North Central"),
    ("4", "West North Central"),
    ("5", "South Atlantic"),
    ("6", "East South Central"),
    ("7", "West South Central"),
    ("8", "Mountain"),
    ("9", "Pacific"),
];

/// Region name for a code such as `"3"`, or [`NOT_AVAILABLE`].
pub fn region_name(code: &str) -> &'static str {
    lookup(REGIONS, code)
}

/// Division name for a code such as `"5"`, or [`NOT_AVAILABLE`].
pub fn division_name(code: &str) -> &'static str {
    lookup(DIVISIONS, code)
}

fn lookup(table: &[(&str, &'static str)], code: &str) -> &'static str {
    let code = code.trim();
    table
        .iter()
        .find(|(k, _)| *k == code)
        .map_or(NOT_AVAILABLE, |(_, name)| name)
}
