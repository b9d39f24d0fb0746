//! Maps region names reported by the admin API onto the region labels used
//! by the log store.
//!
//! A mismatch here does not fail: the log store silently returns no lines, so
//! the rules below have to match the labels exactly.

/// A single rewrite applied to a raw region name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionRule {
    StripPrefix(&'static str),
    StripSuffix(&'static str),
}

impl RegionRule {
    pub fn apply<'a>(&self, region: &'a str) -> &'a str {
        match *self {
            RegionRule::StripPrefix(prefix) => region.strip_prefix(prefix).unwrap_or(region),
            RegionRule::StripSuffix(suffix) => region.strip_suffix(suffix).unwrap_or(region),
        }
    }
}

/// Applied in order. The suffix covers regions renamed in the admin API but
/// still labelled under their old name in the log store.
pub const REGION_RULES: &[RegionRule] = &[
    RegionRule::StripPrefix("aws-"),
    RegionRule::StripSuffix("-new"),
];

pub fn normalize_region(raw: &str) -> String {
    REGION_RULES
        .iter()
        .fold(raw, |region, rule| rule.apply(region))
        .to_string()
}
