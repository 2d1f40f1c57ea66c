use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{format_description, Date, OffsetDateTime};

/// How "first seen" is chosen among provider result dates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FirstSeenMode {
    /// String minimum over the raw provider values. Not chronological: "Apr 2, 2020"
    /// sorts before "Mar 1, 2019". Kept as the default for behavioral parity.
    #[default]
    Lexicographic,
    /// Parse known provider formats and take the earliest real date. Unparseable
    /// values are ignored; if none parse, falls back to the string minimum.
    Chronological,
}

// Allowlist of formats seen from web-search providers. No fuzzy parsing.
const DATE_FORMATS: [&str; 5] = [
    "[year]-[month]-[day]",
    "[month repr:short] [day padding:none], [year]",
    "[month repr:long] [day padding:none], [year]",
    "[day padding:none] [month repr:short] [year]",
    "[day padding:none] [month repr:long] [year]",
];

/// Pick the earliest of the provider-reported dates, returning the raw value unchanged.
pub fn earliest_date(dates: &[String], mode: FirstSeenMode) -> Option<String> {
    if dates.is_empty() {
        return None;
    }
    match mode {
        FirstSeenMode::Lexicographic => dates.iter().min().cloned(),
        FirstSeenMode::Chronological => {
            let parsed = dates
                .iter()
                .filter_map(|raw| parse_provider_date(raw).map(|d| (d, raw)))
                .min();
            match parsed {
                Some((_, raw)) => Some(raw.clone()),
                None => dates.iter().min().cloned(),
            }
        }
    }
}

/// Parse a provider date string against the allowlist.
pub fn parse_provider_date(raw: &str) -> Option<Date> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(dt.date());
    }
    for fmt in DATE_FORMATS {
        let items = match format_description::parse(fmt) {
            Ok(i) => i,
            Err(_) => continue,
        };
        if let Ok(d) = Date::parse(trimmed, &items) {
            return Some(d);
        }
    }
    None
}
