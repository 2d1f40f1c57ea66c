use std::sync::OnceLock;

use regex::Regex;
use satya_core::domain::Claim;
use satya_core::error::AppError;

use super::outcome::{log_fallback, reasoning_failure, StageOutcome};
use super::prompts::claim_extraction_prompt;
use crate::llm::Llm;

const STAGE: &str = "extract";

fn claim_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A claim line starts with `<digits>.` or `-`; the marker is dropped.
    RE.get_or_init(|| Regex::new(r"^(?:\d+\.|-)\s*(.*)$").expect("static regex"))
}

/// Parse a numbered/dashed list. Non-matching lines are dropped silently.
pub fn parse_claim_list(reply: &str) -> Vec<Claim> {
    reply
        .lines()
        .filter_map(|line| {
            let caps = claim_line().captures(line.trim())?;
            let claim = caps.get(1)?.as_str().trim();
            if claim.is_empty() {
                None
            } else {
                Some(claim.to_string())
            }
        })
        .collect()
}

/// Decompose `text` into atomic claims. Never returns an empty list: any failure
/// yields `[text]` verbatim.
pub fn extract_claims(llm: &dyn Llm, text: &str) -> StageOutcome<Vec<Claim>> {
    let reply = match llm.generate(&claim_extraction_prompt(text)) {
        Ok(r) => r,
        Err(e) => {
            let e = reasoning_failure(e);
            log_fallback(STAGE, text, &e);
            return StageOutcome::fallback(vec![text.to_string()], e);
        }
    };

    let claims = parse_claim_list(&reply);
    if claims.is_empty() {
        let e = AppError::new("AI_REPLY_MALFORMED", "Claim list reply had no claim lines")
            .with_details(format!("reply_chars={}", reply.chars().count()));
        log_fallback(STAGE, text, &e);
        return StageOutcome::fallback(vec![text.to_string()], e);
    }

    tracing::info!(stage = STAGE, claims = claims.len(), "Extracted claims");
    StageOutcome::Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numbered_and_dashed_lines_only() {
        let reply = "Here are the claims:\n1. Bleach cures COVID-19\n  2.   Doctors hide it \n- Drinking it is safe\n* starred is ignored\n2020 was a year\n3.";
        assert_eq!(
            parse_claim_list(reply),
            vec![
                "Bleach cures COVID-19".to_string(),
                "Doctors hide it".to_string(),
                "Drinking it is safe".to_string(),
            ]
        );
    }
}
