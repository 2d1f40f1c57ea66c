use satya_core::domain::{Claim, Forensics};
use satya_core::report::{parse_model_reply, synthesis_fallback, RiskReport};

use super::outcome::{log_fallback, reasoning_failure, StageOutcome};
use super::prompts::synthesis_prompt;
use crate::llm::Llm;

const STAGE: &str = "synthesize";

/// Evidence entries shown to the reasoning service; the rest are dropped.
pub const EVIDENCE_FOR_SYNTHESIS: usize = 3;

/// Produce the risk report. The model writes tier, gist, reasons and action; the trace
/// block always comes from `forensics`. Any failure yields the canned synthesis report.
pub fn synthesize_report(
    llm: &dyn Llm,
    claims: &[Claim],
    evidence: &[String],
    forensics: &Forensics,
    original_text: &str,
) -> StageOutcome<RiskReport> {
    let evidence = &evidence[..evidence.len().min(EVIDENCE_FOR_SYNTHESIS)];
    let prompt = synthesis_prompt(original_text, claims, evidence, forensics);

    let parsed = llm
        .generate(&prompt)
        .map_err(reasoning_failure)
        .and_then(|reply| parse_model_reply(&reply));

    match parsed {
        Ok(sections) => {
            tracing::info!(stage = STAGE, risk = %sections.risk, "Synthesized report");
            StageOutcome::Ok(sections.into_report(forensics.clone()))
        }
        Err(e) => {
            log_fallback(STAGE, original_text, &e);
            StageOutcome::fallback(synthesis_fallback(forensics), e)
        }
    }
}
