pub mod config;
pub mod domain;
pub mod error;
pub mod normalize;
pub mod report;

#[cfg(test)]
mod tests {
    use super::error::{truncate_for_log, AppError};

    #[test]
    fn app_error_is_structured() {
        let err = AppError::new("SEARCH_UNAVAILABLE", "search failed").with_retryable(true);
        assert_eq!(err.code, "SEARCH_UNAVAILABLE");
        assert_eq!(err.message, "search failed");
        assert!(err.retryable);
        assert_eq!(err.to_string(), "[SEARCH_UNAVAILABLE] search failed");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_for_log("नमस्ते दुनिया", 3), "नमस...");
        assert_eq!(truncate_for_log("  short  ", 10), "short");
    }
}
