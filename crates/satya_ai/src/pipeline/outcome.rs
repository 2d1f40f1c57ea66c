use satya_core::error::{truncate_for_log, AppError};

/// Result of one pipeline stage. Either way a usable value is present; `Fallback`
/// records why the stage degraded.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Ok(T),
    Fallback { value: T, reason: AppError },
}

impl<T> StageOutcome<T> {
    pub fn fallback(value: T, reason: AppError) -> Self {
        StageOutcome::Fallback { value, reason }
    }

    pub fn value(&self) -> &T {
        match self {
            StageOutcome::Ok(v) => v,
            StageOutcome::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            StageOutcome::Ok(v) => v,
            StageOutcome::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, StageOutcome::Fallback { .. })
    }

    pub fn reason(&self) -> Option<&AppError> {
        match self {
            StageOutcome::Ok(_) => None,
            StageOutcome::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Fallback reason for a stage whose reasoning-service call itself failed, whatever
/// error the `Llm` implementation reported. The original error is kept in `details`.
pub const REASONING_UNAVAILABLE: &str = "PIPELINE_REASONING_UNAVAILABLE";

pub(crate) fn reasoning_failure(err: AppError) -> AppError {
    let retryable = err.retryable;
    let details = match err.details {
        Some(d) => format!("{}: {}; {}", err.code, err.message, d),
        None => format!("{}: {}", err.code, err.message),
    };
    AppError::new(REASONING_UNAVAILABLE, "Reasoning service call failed")
        .with_details(details)
        .with_retryable(retryable)
}

/// True when the stage fell back because its reasoning-service call failed.
pub fn reasoning_unavailable<T>(outcome: &StageOutcome<T>) -> bool {
    outcome.reason().is_some_and(|r| r.code == REASONING_UNAVAILABLE)
}

pub(crate) const LOG_INPUT_CHARS: usize = 80;

pub(crate) fn log_fallback(stage: &'static str, input: &str, reason: &AppError) {
    tracing::warn!(
        stage,
        code = %reason.code,
        details = reason.details.as_deref().unwrap_or(""),
        input = %truncate_for_log(input, LOG_INPUT_CHARS),
        "{}; using fallback",
        reason.message
    );
}
