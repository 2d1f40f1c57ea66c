use std::time::Duration;

use satya_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::{Llm, LLM_FAILED, LLM_NOT_CONFIGURED, LLM_UNREACHABLE};

/// Reasoning service backed by the Gemini `generateContent` REST endpoint.
#[derive(Debug, Clone)]
pub struct GeminiLlm {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GeminiLlm {
    pub fn new(
        endpoint: &str,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text = content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");
        Some(text)
    }
}

impl Llm for GeminiLlm {
    fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            AppError::new(LLM_NOT_CONFIGURED, "Gemini API key is not configured")
        })?;

        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let req = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let resp = ureq::post(&url)
            .set("x-goog-api-key", key)
            .timeout(self.timeout)
            .send_json(serde_json::to_value(req).map_err(|e| {
                AppError::new(LLM_FAILED, "Failed to encode Gemini request")
                    .with_details(e.to_string())
            })?);

        match resp {
            Ok(r) => {
                let v: GenerateContentResponse = r.into_json().map_err(|e| {
                    AppError::new(LLM_FAILED, "Failed to decode Gemini response")
                        .with_details(e.to_string())
                })?;
                match v.first_text() {
                    Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
                    _ => Err(AppError::new(LLM_FAILED, "Gemini response had no text")),
                }
            }
            Err(ureq::Error::Status(code, _)) => Err(
                AppError::new(LLM_FAILED, "Gemini request failed")
                    .with_details(format!("status={code}; model={}", self.model))
                    .with_retryable(code == 429 || code >= 500),
            ),
            Err(e) => Err(
                AppError::new(LLM_UNREACHABLE, "Failed to call Gemini endpoint")
                    .with_details(format!("kind={}; model={}", e.kind(), self.model))
                    .with_retryable(true),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_reported_before_any_request() {
        let llm = GeminiLlm::new("http://127.0.0.1:9", "gemini-pro", None, Duration::from_secs(1));
        let err = llm.generate("hi").expect_err("should fail");
        assert_eq!(err.code, LLM_NOT_CONFIGURED);
        assert!(!llm.is_configured());
    }

    #[test]
    fn transport_errors_do_not_carry_the_api_key() {
        let llm = GeminiLlm::new(
            "http://127.0.0.1:9",
            "gemini-pro",
            Some("GEMINI_SECRET_456".to_string()),
            Duration::from_secs(1),
        );
        let err = llm.generate("hi").expect_err("should fail");
        assert_eq!(err.code, LLM_UNREACHABLE);
        let details = err.details.unwrap_or_default();
        assert!(!details.contains("GEMINI_SECRET_456"), "{details}");
    }

    #[test]
    fn joins_candidate_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"1. a"},{"text":"\n2. b"}]}}]}"#;
        let v: GenerateContentResponse = serde_json::from_str(raw).expect("decode");
        assert_eq!(v.first_text().as_deref(), Some("1. a\n2. b"));
    }

    #[test]
    fn empty_candidates_have_no_text() {
        let v: GenerateContentResponse = serde_json::from_str("{}").expect("decode");
        assert_eq!(v.first_text(), None);
    }
}
