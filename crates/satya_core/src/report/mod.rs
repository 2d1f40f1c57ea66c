use serde::{Deserialize, Serialize};

use crate::domain::{FirstSeen, Forensics, RiskLevel, SpreadPattern};
use crate::error::AppError;

pub const GIST_HEADER: &str = "**The Gist:**";
pub const WHY_HEADER: &str = "**Why?**";
pub const TRACE_HEADER: &str = "**🔍 Trace Report:**";
pub const ACTION_HEADER: &str = "**Action:**";
pub const FIRST_SEEN_PREFIX: &str = "📅 First Seen:";
pub const SPREAD_PREFIX: &str = "📊 How it's Spreading:";
pub const BULLET: &str = "•";

pub const MIN_REASONS: usize = 2;
pub const MAX_REASONS: usize = 3;

/// Structured risk report. `render` produces the chat-facing contract text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskReport {
    pub risk: RiskLevel,
    pub gist: String,
    pub reasons: Vec<String>,
    pub forensics: Forensics,
    pub action: String,
}

impl RiskReport {
    /// Render the report. Section order and glyphs are fixed; downstream chat renderers rely on them.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.risk.marker());
        out.push_str("\n\n");
        out.push_str(&format!("{GIST_HEADER} {}\n\n", self.gist));
        out.push_str(WHY_HEADER);
        out.push('\n');
        for r in self.reasons.iter().take(MAX_REASONS) {
            out.push_str(&format!("{BULLET} {r}\n"));
        }
        out.push('\n');
        out.push_str(&trace_block(&self.forensics));
        out.push_str("\n\n");
        out.push_str(&format!("{ACTION_HEADER} {}", self.action));
        out
    }
}

/// Trace Report block, injected verbatim from caller-supplied forensics.
pub fn trace_block(forensics: &Forensics) -> String {
    format!(
        "{TRACE_HEADER}\n{FIRST_SEEN_PREFIX} {}\n{SPREAD_PREFIX} {}",
        forensics.first_seen, forensics.spread_pattern
    )
}

/// Canned report used when the synthesis call fails. Carries the real trace data.
pub fn synthesis_fallback(forensics: &Forensics) -> RiskReport {
    RiskReport {
        risk: RiskLevel::Medium,
        gist: "Unable to fully verify this information.".to_string(),
        reasons: vec![
            "Analysis system temporarily unavailable".to_string(),
            "Recommend checking with trusted sources".to_string(),
        ],
        forensics: forensics.clone(),
        action: "Verify before sharing".to_string(),
    }
}

/// Canned report used when the whole pipeline fails. Wording differs from
/// [`synthesis_fallback`] so the two tiers can be told apart in logs and transcripts.
pub fn system_fallback() -> RiskReport {
    RiskReport {
        risk: RiskLevel::Medium,
        gist: "Unable to analyze this message due to technical issues.".to_string(),
        reasons: vec![
            "System temporarily unavailable".to_string(),
            "Recommend manual verification".to_string(),
        ],
        forensics: Forensics::new(FirstSeen::Unknown, SpreadPattern::Untraceable),
        action: "Check with trusted sources before sharing".to_string(),
    }
}

pub fn system_fallback_text() -> String {
    system_fallback().render()
}

/// Model-authored parts of a report; the trace block is never taken from the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplySections {
    pub risk: RiskLevel,
    pub gist: String,
    pub reasons: Vec<String>,
    pub action: String,
}

impl ReplySections {
    pub fn into_report(self, forensics: Forensics) -> RiskReport {
        RiskReport {
            risk: self.risk,
            gist: self.gist,
            reasons: self.reasons,
            forensics,
            action: self.action,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Gist,
    Why,
    Trace,
    Action,
}

/// Parse a reasoning-service reply written against the report template.
///
/// Tolerates markdown noise, missing bold markers and `-`/`*` bullets. Fails with
/// `AI_REPLY_MALFORMED` when the tier, gist, at least two reasons or the action are missing.
pub fn parse_model_reply(reply: &str) -> Result<ReplySections, AppError> {
    let mut risk: Option<RiskLevel> = None;
    let mut gist = String::new();
    let mut reasons: Vec<String> = Vec::new();
    let mut action = String::new();
    let mut section = Section::Preamble;

    for raw in reply.lines() {
        let line = strip_markup(raw);
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();

        if let Some(rest) = header_remainder(&line, &lower, &["the gist:", "gist:"]) {
            section = Section::Gist;
            if gist.is_empty() {
                gist = clean_text(rest);
            }
            continue;
        }
        if lower.starts_with("why?") || lower.starts_with("why:") || lower == "why" {
            section = Section::Why;
            continue;
        }
        if is_trace_header(&lower) {
            section = Section::Trace;
            continue;
        }
        if let Some(rest) = header_remainder(&line, &lower, &["action:", "recommended action:"]) {
            section = Section::Action;
            if action.is_empty() {
                action = clean_text(rest);
            }
            continue;
        }

        match section {
            Section::Preamble => {
                if risk.is_none() {
                    risk = RiskLevel::from_marker_line(&line);
                }
            }
            Section::Gist => {
                if gist.is_empty() {
                    gist = clean_text(&line);
                }
            }
            Section::Why => {
                if let Some(item) = strip_bullet(&line) {
                    let item = clean_text(item);
                    if !item.is_empty() {
                        reasons.push(item);
                    }
                }
            }
            Section::Trace => {}
            Section::Action => {
                if action.is_empty() {
                    action = clean_text(&line);
                }
            }
        }
    }

    let risk = risk.ok_or_else(|| {
        AppError::new("AI_REPLY_MALFORMED", "Reply has no risk marker")
    })?;
    if gist.is_empty() {
        return Err(AppError::new("AI_REPLY_MALFORMED", "Reply has no gist"));
    }
    if reasons.len() < MIN_REASONS {
        return Err(
            AppError::new("AI_REPLY_MALFORMED", "Reply has too few reasons")
                .with_details(format!("reasons={}", reasons.len())),
        );
    }
    reasons.truncate(MAX_REASONS);
    if action.is_empty() {
        return Err(AppError::new("AI_REPLY_MALFORMED", "Reply has no action"));
    }

    Ok(ReplySections {
        risk,
        gist,
        reasons,
        action,
    })
}

fn header_remainder<'a>(line: &'a str, lower: &str, prefixes: &[&str]) -> Option<&'a str> {
    for p in prefixes {
        if lower.starts_with(p) {
            // Prefixes are ASCII so byte offsets match between `line` and `lower`.
            return Some(line[p.len()..].trim());
        }
    }
    None
}

/// `🔍 Trace Report:` with or without the glyph, bold markers or colon.
fn is_trace_header(lower: &str) -> bool {
    lower
        .trim_start_matches('🔍')
        .trim_start()
        .starts_with("trace report")
}

fn strip_markup(raw: &str) -> String {
    raw.replace("**", "").trim().to_string()
}

fn strip_bullet(line: &str) -> Option<&str> {
    for marker in ["•", "-", "*", "·"] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest.trim());
        }
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix('.') {
            return Some(rest.trim());
        }
    }
    None
}

/// Remove tier glyphs and collapse whitespace so free text cannot forge a second marker.
fn clean_text(s: &str) -> String {
    let mut t = s.to_string();
    for level in RiskLevel::ALL {
        t = t.replace(level.glyph(), "");
    }
    t.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_bullet_accepts_common_markers() {
        assert_eq!(strip_bullet("• one"), Some("one"));
        assert_eq!(strip_bullet("- two"), Some("two"));
        assert_eq!(strip_bullet("3. three"), Some("three"));
        assert_eq!(strip_bullet("plain"), None);
    }

    #[test]
    fn trace_header_must_lead_the_line() {
        assert!(is_trace_header("🔍 trace report:"));
        assert!(is_trace_header("trace report"));
        assert!(!is_trace_header("• the trace report shows wide sharing"));
    }

    #[test]
    fn clean_text_drops_glyphs() {
        assert_eq!(clean_text("🔴 bad   claim"), "bad claim");
    }
}
