use serde::{Deserialize, Serialize};
use std::fmt;

/// Atomic checkable assertion pulled out of a user message.
pub type Claim = String;

/// Top-level verdict of a report. Glyph and wording are fixed vocabulary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low];

    pub fn glyph(self) -> &'static str {
        match self {
            RiskLevel::High => "🔴",
            RiskLevel::Medium => "🟡",
            RiskLevel::Low => "🟢",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH RISK",
            RiskLevel::Medium => "MEDIUM RISK",
            RiskLevel::Low => "LOW RISK",
        }
    }

    /// Header line of a report, e.g. `🔴 HIGH RISK`.
    pub fn marker(self) -> String {
        format!("{} {}", self.glyph(), self.label())
    }

    /// Meaning of the tier as explained to the reasoning service.
    pub fn meaning(self) -> &'static str {
        match self {
            RiskLevel::High => "False, misleading, or harmful information",
            RiskLevel::Medium => "Partially true, needs context, or unverified",
            RiskLevel::Low => "Appears accurate and from reliable sources",
        }
    }

    /// Recognize a tier from a free-form header line (glyph or wording, any case).
    pub fn from_marker_line(line: &str) -> Option<RiskLevel> {
        let upper = line.to_uppercase();
        for level in RiskLevel::ALL {
            if upper.contains(level.label()) {
                return Some(level);
            }
        }
        RiskLevel::ALL
            .into_iter()
            .find(|level| line.contains(level.glyph()))
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.marker())
    }
}

/// Earliest known occurrence of a claim on the web.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FirstSeen {
    /// Date string exactly as the search provider returned it.
    Date(String),
    /// Search worked but no result carried a date.
    Recently,
    /// Search failed or was not configured.
    Unknown,
}

impl fmt::Display for FirstSeen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirstSeen::Date(d) => f.write_str(d),
            FirstSeen::Recently => f.write_str("Recently"),
            FirstSeen::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Qualitative spread classification, including the three distinct failure signals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SpreadPattern {
    Wide,
    Few,
    Limited,
    /// No search credential configured.
    NoCredential,
    /// Transport error or timeout talking to the search provider.
    SearchUnavailable,
    /// Provider answered but the payload was unusable.
    Untraceable,
}

impl SpreadPattern {
    pub fn phrase(self) -> &'static str {
        match self {
            SpreadPattern::Wide => "Widely shared across multiple platforms",
            SpreadPattern::Few => "Shared on a few platforms",
            SpreadPattern::Limited => "Limited sharing detected",
            SpreadPattern::NoCredential => "Unable to trace origin",
            SpreadPattern::SearchUnavailable => "Search unavailable",
            SpreadPattern::Untraceable => "Unable to trace spread pattern",
        }
    }

    /// Classify by number of distinct hostnames among the sampled results.
    pub fn classify(distinct_hosts: usize) -> SpreadPattern {
        if distinct_hosts > 3 {
            SpreadPattern::Wide
        } else if distinct_hosts > 1 {
            SpreadPattern::Few
        } else {
            SpreadPattern::Limited
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            SpreadPattern::NoCredential | SpreadPattern::SearchUnavailable | SpreadPattern::Untraceable
        )
    }
}

impl fmt::Display for SpreadPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// Provenance metadata for the primary claim of one analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Forensics {
    pub first_seen: FirstSeen,
    pub spread_pattern: SpreadPattern,
}

impl Forensics {
    pub fn new(first_seen: FirstSeen, spread_pattern: SpreadPattern) -> Self {
        Self {
            first_seen,
            spread_pattern,
        }
    }

    /// Forensics for a failed trace: first-seen is always unknown.
    pub fn failed(spread_pattern: SpreadPattern) -> Self {
        Self::new(FirstSeen::Unknown, spread_pattern)
    }
}
