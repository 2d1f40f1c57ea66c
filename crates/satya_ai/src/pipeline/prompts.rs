use satya_core::domain::{Forensics, RiskLevel};
use satya_core::report::{trace_block, ACTION_HEADER, BULLET, GIST_HEADER, WHY_HEADER};

pub(crate) const NO_EVIDENCE: &str = "No specific fact-check data available";

pub fn claim_extraction_prompt(text: &str) -> String {
    format!(
        r#"Extract the main verifiable claims from this text. Focus on factual statements that can be fact-checked.
Return ONLY a numbered list of claims, nothing else:

Text: "{text}"

Claims:
"#
    )
}

pub fn synthesis_prompt(
    original_text: &str,
    claims: &[String],
    evidence: &[String],
    forensics: &Forensics,
) -> String {
    let claims_text = claims
        .iter()
        .map(|c| format!("- {c}"))
        .collect::<Vec<_>>()
        .join("\n");
    let evidence_text = if evidence.is_empty() {
        NO_EVIDENCE.to_string()
    } else {
        evidence.join("\n")
    };
    let tiers = RiskLevel::ALL
        .iter()
        .map(|r| format!("- {}: {}", r.marker(), r.meaning()))
        .collect::<Vec<_>>()
        .join("\n");
    let trace = trace_block(forensics);

    // The trace block is filled in here and re-injected after parsing; the model only
    // authors the tier, gist, reasons and action.
    format!(
        r#"You are SatyaTrace, a fact-checking assistant. Analyze the following information and provide a structured response.

ORIGINAL MESSAGE: "{original_text}"

KEY CLAIMS:
{claims_text}

RELEVANT FACT-CHECK CONTEXT:
{evidence_text}

FORENSICS DATA:
- First seen: {first_seen}
- Spread pattern: {spread}

Create a response with this EXACT structure:

[RISK LEVEL EMOJI] [RISK LEVEL]

{GIST_HEADER} [One sentence summary of the claim's accuracy]

{WHY_HEADER}
{BULLET} [Reason 1]
{BULLET} [Reason 2]
{BULLET} [Reason 3 if needed]

{trace}

{ACTION_HEADER} [Simple recommendation like "Don't forward this" or "This appears reliable"]

RISK LEVELS:
{tiers}

Keep the response concise and clear.
"#,
        first_seen = forensics.first_seen,
        spread = forensics.spread_pattern,
    )
}
