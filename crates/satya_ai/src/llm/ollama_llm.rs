use std::time::Duration;

use satya_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::{Llm, LLM_FAILED, LLM_UNREACHABLE};
use crate::ollama::{error_body, OllamaClient};

/// Local reasoning backend on Ollama's non-streaming `/api/generate`.
#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
    model: String,
    timeout: Duration,
}

impl OllamaLlm {
    pub fn new(client: OllamaClient, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            model: model.into(),
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

impl Llm for OllamaLlm {
    fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/api/generate", self.client.base_url());
        let body = serde_json::to_value(GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        })
        .map_err(|e| {
            AppError::new(LLM_FAILED, "Failed to encode generate request")
                .with_details(e.to_string())
        })?;

        let reply: GenerateResponse = match ureq::post(&url).timeout(self.timeout).send_json(body) {
            Ok(r) => r.into_json().map_err(|e| {
                AppError::new(LLM_FAILED, "Failed to decode generate response")
                    .with_details(e.to_string())
            })?,
            // 404 here means the model was never pulled.
            Err(ureq::Error::Status(code, resp)) => {
                return Err(AppError::new(LLM_FAILED, "Ollama rejected generate request")
                    .with_details(format!(
                        "status={code}; model={}; error={}",
                        self.model,
                        error_body(resp)
                    ))
                    .with_retryable(code >= 500));
            }
            Err(e) => {
                return Err(
                    AppError::new(LLM_UNREACHABLE, "Failed to call Ollama generate endpoint")
                        .with_details(e.to_string())
                        .with_retryable(true),
                );
            }
        };

        if !reply.done {
            tracing::debug!(model = %self.model, "Generate reply not marked done");
        }
        let text = reply.response.trim();
        if text.is_empty() {
            return Err(AppError::new(LLM_FAILED, "Generate response was empty")
                .with_details(format!("model={}", self.model)));
        }
        Ok(text.to_string())
    }
}
