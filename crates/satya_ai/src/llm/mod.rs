use satya_core::error::AppError;

/// Stateless single-turn reasoning service.
///
/// Implementations must apply their own request timeout; a timeout is reported like any
/// other transport failure (`AI_LLM_UNREACHABLE`).
pub trait Llm: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

pub mod gemini_llm;
pub mod ollama_llm;

pub const LLM_NOT_CONFIGURED: &str = "AI_LLM_NOT_CONFIGURED";
pub const LLM_UNREACHABLE: &str = "AI_LLM_UNREACHABLE";
pub const LLM_FAILED: &str = "AI_LLM_FAILED";
