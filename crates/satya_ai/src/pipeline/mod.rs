//! Claim-analysis pipeline: extract → retrieve → trace → synthesize.
//!
//! Each stage absorbs its own failures and hands back a [`StageOutcome`]. The
//! [`Analyzer`] adds one more layer: anything systemic (blank input, a full
//! reasoning-service outage, a contract violation, a panic) becomes the canned
//! system report. `analyze` therefore always returns a report-shaped string.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use satya_core::domain::{Claim, Forensics};
use satya_core::error::{truncate_for_log, AppError};
use satya_core::report::{system_fallback_text, RiskReport};
use serde::{Deserialize, Serialize};

use crate::guardrails::enforce_report_contract;
use crate::llm::Llm;
use crate::search::SearchProvider;

pub mod extract;
pub mod outcome;
pub mod prompts;
pub mod retrieve;
pub mod synthesize;
pub mod trace;

pub use extract::{extract_claims, parse_claim_list};
pub use outcome::{reasoning_unavailable, StageOutcome, REASONING_UNAVAILABLE};
pub use retrieve::{retrieve_evidence, KnowledgeBase};
pub use synthesize::synthesize_report;
pub use trace::{trace_claim, TraceOptions};

use outcome::LOG_INPUT_CHARS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub top_k: usize,
    pub trace: TraceOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            top_k: 3,
            trace: TraceOptions::default(),
        }
    }
}

/// Which layer produced the returned report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportTier {
    Synthesized,
    SynthesisFallback,
    SystemFallback,
}

/// Per-stage outcomes of one run, kept for observability and tests.
#[derive(Debug, Clone)]
pub struct StageTrace {
    pub claims: StageOutcome<Vec<Claim>>,
    pub evidence: StageOutcome<Vec<String>>,
    pub forensics: StageOutcome<Forensics>,
    pub synthesis: StageOutcome<RiskReport>,
}

#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub report: String,
    pub tier: ReportTier,
    /// Absent when the run was cut short before or during the stages.
    pub stages: Option<StageTrace>,
    /// Systemic failure that triggered the system report.
    pub failure: Option<AppError>,
}

impl AnalysisRun {
    fn system(failure: AppError, stages: Option<StageTrace>) -> Self {
        Self {
            report: system_fallback_text(),
            tier: ReportTier::SystemFallback,
            stages,
            failure: Some(failure),
        }
    }
}

// Internal: a systemic failure, optionally with the stages that ran before it was detected.
struct Systemic {
    error: AppError,
    stages: Option<StageTrace>,
}

impl From<AppError> for Systemic {
    fn from(error: AppError) -> Self {
        Self {
            error,
            stages: None,
        }
    }
}

/// Pipeline orchestrator over an immutable, shareable analysis context.
///
/// Holds only `Arc`s to read-only collaborators, so one instance can serve many
/// threads at once.
pub struct Analyzer {
    llm: Arc<dyn Llm>,
    search: Arc<dyn SearchProvider>,
    knowledge: Option<Arc<KnowledgeBase>>,
    options: PipelineOptions,
}

impl Analyzer {
    pub fn new(llm: Arc<dyn Llm>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            llm,
            search,
            knowledge: None,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_knowledge(mut self, knowledge: Option<Arc<KnowledgeBase>>) -> Self {
        self.knowledge = knowledge;
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn has_knowledge(&self) -> bool {
        self.knowledge.is_some()
    }

    pub fn llm(&self) -> Arc<dyn Llm> {
        Arc::clone(&self.llm)
    }

    /// Analyze English text into a risk report. Total: never panics, never errors.
    pub fn analyze(&self, text: &str) -> String {
        self.analyze_detailed(text).report
    }

    /// Like [`Analyzer::analyze`], also returning every stage outcome.
    pub fn analyze_detailed(&self, text: &str) -> AnalysisRun {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.run_stages(text)));
        match result {
            Ok(Ok(run)) => run,
            Ok(Err(Systemic { error, stages })) => {
                tracing::error!(
                    stage = "orchestrator",
                    code = %error.code,
                    details = error.details.as_deref().unwrap_or(""),
                    input = %truncate_for_log(text, LOG_INPUT_CHARS),
                    "{}; returning system report",
                    error.message
                );
                AnalysisRun::system(error, stages)
            }
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                tracing::error!(
                    stage = "orchestrator",
                    panic = %msg,
                    input = %truncate_for_log(text, LOG_INPUT_CHARS),
                    "Pipeline panicked; returning system report"
                );
                AnalysisRun::system(
                    AppError::new("PIPELINE_PANIC", "Pipeline panicked").with_details(msg),
                    None,
                )
            }
        }
    }

    fn run_stages(&self, text: &str) -> Result<AnalysisRun, Systemic> {
        if text.trim().is_empty() {
            return Err(AppError::new("PIPELINE_EMPTY_INPUT", "Nothing to analyze").into());
        }
        tracing::info!(input = %truncate_for_log(text, LOG_INPUT_CHARS), "Starting analysis");

        let claims = extract_claims(self.llm.as_ref(), text);
        let evidence = retrieve_evidence(
            self.knowledge.as_deref(),
            claims.value(),
            self.options.top_k,
        );
        let primary = claims.value().first().map(String::as_str).unwrap_or(text);
        let forensics = trace_claim(self.search.as_ref(), primary, &self.options.trace);
        let synthesis = synthesize_report(
            self.llm.as_ref(),
            claims.value(),
            evidence.value(),
            forensics.value(),
            text,
        );

        let outage = reasoning_unavailable(&claims) && reasoning_unavailable(&synthesis);
        let report = synthesis.value().render();
        let tier = if synthesis.is_fallback() {
            ReportTier::SynthesisFallback
        } else {
            ReportTier::Synthesized
        };
        let stages = StageTrace {
            claims,
            evidence,
            forensics,
            synthesis,
        };

        if outage {
            return Err(Systemic {
                error: AppError::new(
                    "PIPELINE_REASONING_OUTAGE",
                    "Reasoning service failed for every call in this run",
                )
                .with_retryable(true),
                stages: Some(stages),
            });
        }
        if let Err(error) = enforce_report_contract(&report) {
            return Err(Systemic {
                error,
                stages: Some(stages),
            });
        }

        tracing::info!(tier = ?tier, "Analysis completed");
        Ok(AnalysisRun {
            report,
            tier,
            stages: Some(stages),
            failure: None,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
