use satya_core::domain::RiskLevel;
use satya_core::error::AppError;
use satya_core::report::{ACTION_HEADER, GIST_HEADER, TRACE_HEADER, WHY_HEADER};

/// Enforce the chat-facing report contract on a rendered report.
///
/// - exactly one tier glyph, immediately followed by its own tier wording;
/// - the Gist, Why, Trace Report and Action sections, in that order.
pub fn enforce_report_contract(report: &str) -> Result<(), AppError> {
    let counts: Vec<(RiskLevel, usize)> = RiskLevel::ALL
        .into_iter()
        .map(|level| (level, report.matches(level.glyph()).count()))
        .collect();
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    let level = match counts.iter().find(|(_, n)| *n == 1) {
        Some((level, _)) if total == 1 => *level,
        _ => {
            return Err(AppError::new(
                "PIPELINE_REPORT_CONTRACT",
                "Report must carry exactly one risk glyph",
            )
            .with_details(format!("glyphs={total}")));
        }
    };
    if !report.contains(&level.marker()) {
        return Err(AppError::new(
            "PIPELINE_REPORT_CONTRACT",
            "Risk glyph is not paired with its tier",
        )
        .with_details(format!("glyph={}", level.glyph())));
    }

    let mut cursor = 0usize;
    for header in [GIST_HEADER, WHY_HEADER, TRACE_HEADER, ACTION_HEADER] {
        match report[cursor..].find(header) {
            Some(pos) => cursor += pos + header.len(),
            None => {
                return Err(AppError::new(
                    "PIPELINE_REPORT_CONTRACT",
                    "Report section missing or out of order",
                )
                .with_details(format!("section={header}")));
            }
        }
    }
    Ok(())
}
