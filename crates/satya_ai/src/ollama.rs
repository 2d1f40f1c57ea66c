//! Loopback-only Ollama endpoint shared by the local reasoning and embedding backends.

use std::time::Duration;

use satya_core::error::AppError;
use serde::Deserialize;

const PROBE_TIMEOUT: Duration = Duration::from_millis(800);

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// `http://127.0.0.1` with an optional non-zero numeric port and nothing after it.
fn is_loopback_base(base_url: &str) -> bool {
    let Some(rest) = base_url.strip_prefix("http://127.0.0.1") else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    match rest.strip_prefix(':') {
        Some(port) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
            matches!(port.parse::<u16>(), Ok(p) if p != 0)
        }
        _ => false,
    }
}

/// Whether `wanted` names an installed model. A bare name matches its `:latest` tag.
pub fn model_installed(installed: &[String], wanted: &str) -> bool {
    installed
        .iter()
        .any(|m| m == wanted || m.strip_suffix(":latest") == Some(wanted))
}

/// Best-effort message from an Ollama error body (`{"error": "..."}`).
pub(crate) fn error_body(resp: ureq::Response) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }
    match resp.into_string() {
        Ok(raw) => serde_json::from_str::<ErrorBody>(&raw)
            .map(|b| b.error)
            .unwrap_or(raw),
        Err(e) => e.to_string(),
    }
}

impl OllamaClient {
    /// Only `127.0.0.1` is accepted; claims and translations never leave the host.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !is_loopback_base(&base_url) {
            return Err(AppError::new(
                "AI_REMOTE_NOT_ALLOWED",
                "Ollama base URL must be localhost (127.0.0.1)",
            )
            .with_details(format!("base_url={base_url}")));
        }
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of the locally installed models.
    pub fn list_models(&self) -> Result<Vec<String>, AppError> {
        let url = format!("{}/api/tags", self.base_url);
        match ureq::get(&url).timeout(PROBE_TIMEOUT).call() {
            Ok(r) => {
                let tags: TagsResponse = r.into_json().map_err(|e| {
                    AppError::new("AI_OLLAMA_UNHEALTHY", "Failed to decode Ollama model list")
                        .with_details(e.to_string())
                })?;
                Ok(tags.models.into_iter().map(|m| m.name).collect())
            }
            Err(ureq::Error::Status(code, resp)) => Err(AppError::new(
                "AI_OLLAMA_UNHEALTHY",
                "Ollama health check failed",
            )
            .with_details(format!("status={code}; error={}", error_body(resp)))),
            Err(e) => Err(AppError::new(
                "AI_OLLAMA_UNREACHABLE",
                "Failed to reach Ollama on 127.0.0.1",
            )
            .with_details(e.to_string())
            .with_retryable(true)),
        }
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        self.list_models().map(|_| ())
    }

    /// Fails unless Ollama is up and `model` has been pulled.
    pub fn ensure_model(&self, model: &str) -> Result<(), AppError> {
        let installed = self.list_models()?;
        if model_installed(&installed, model) {
            Ok(())
        } else {
            Err(
                AppError::new("AI_OLLAMA_MODEL_MISSING", "Model is not installed in Ollama")
                    .with_details(format!("model={model}; installed={}", installed.join(","))),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_model_name_matches_latest_tag() {
        let installed = vec!["all-minilm:latest".to_string(), "llama3.1:8b".to_string()];
        assert!(model_installed(&installed, "all-minilm"));
        assert!(model_installed(&installed, "llama3.1:8b"));
        assert!(!model_installed(&installed, "llama3.1"));
    }
}
