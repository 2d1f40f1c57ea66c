use std::time::Duration;

use satya_core::error::AppError;
use serde_json::Value;

use super::{
    SearchHit, SearchOptions, SearchProvider, SEARCH_BAD_RESPONSE, SEARCH_NO_CREDENTIAL,
    SEARCH_UNAVAILABLE,
};

/// SerpApi-backed web search.
#[derive(Debug, Clone)]
pub struct SerpApiSearch {
    endpoint: String,
    engine: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl SerpApiSearch {
    pub fn new(endpoint: &str, engine: &str, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            engine: engine.to_string(),
            api_key,
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Extract organic results from a SerpApi payload.
pub(crate) fn parse_organic_results(body: &Value) -> Result<Vec<SearchHit>, AppError> {
    let results = body
        .get("organic_results")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            let keys = body
                .as_object()
                .map(|o| o.keys().cloned().collect::<Vec<_>>().join(","))
                .unwrap_or_default();
            AppError::new(SEARCH_BAD_RESPONSE, "Search response has no organic results")
                .with_details(format!("keys={keys}"))
        })?;

    Ok(results
        .iter()
        .map(|r| SearchHit {
            link: r.get("link").and_then(Value::as_str).map(str::to_string),
            date: r.get("date").and_then(Value::as_str).map(str::to_string),
        })
        .collect())
}

impl SearchProvider for SerpApiSearch {
    fn search(&self, query: &str, opts: &SearchOptions) -> Result<Vec<SearchHit>, AppError> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            AppError::new(SEARCH_NO_CREDENTIAL, "Search API key is not configured")
        })?;

        let num = opts.num_results.to_string();
        let mut req = ureq::get(&self.endpoint)
            .timeout(self.timeout)
            .query("engine", &self.engine)
            .query("q", query)
            .query("api_key", key)
            .query("num", &num);
        if opts.sort_by_date {
            req = req.query("sort", "date");
        }

        match req.call() {
            Ok(r) => {
                let body: Value = r.into_json().map_err(|e| {
                    AppError::new(SEARCH_BAD_RESPONSE, "Failed to decode search response")
                        .with_details(e.to_string())
                })?;
                parse_organic_results(&body)
            }
            Err(ureq::Error::Status(code, _)) => Err(
                AppError::new(SEARCH_BAD_RESPONSE, "Search request was rejected")
                    .with_details(format!("status={code}")),
            ),
            // The request URL carries the API key; only the error kind is recorded.
            Err(e) => Err(
                AppError::new(SEARCH_UNAVAILABLE, "Failed to reach search provider")
                    .with_details(format!("kind={}", e.kind()))
                    .with_retryable(true),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_links_and_optional_dates() {
        let body = serde_json::json!({
            "organic_results": [
                {"link": "https://a.example/x", "date": "Mar 1, 2021"},
                {"link": "https://b.example/y"},
                {"title": "no link"}
            ]
        });
        let hits = parse_organic_results(&body).expect("parse");
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].date.as_deref(), Some("Mar 1, 2021"));
        assert_eq!(hits[1].date, None);
        assert_eq!(hits[2].link, None);
    }

    #[test]
    fn transport_errors_do_not_carry_the_api_key() {
        let s = SerpApiSearch::new(
            "http://127.0.0.1:9/search",
            "google",
            Some("SERP_SECRET_123".to_string()),
            Duration::from_secs(1),
        );
        let err = s.search("q", &SearchOptions::default()).expect_err("should fail");
        assert_eq!(err.code, SEARCH_UNAVAILABLE);
        let details = err.details.clone().unwrap_or_default();
        assert!(!details.contains("SERP_SECRET_123"), "{details}");
        assert!(!err.to_string().contains("SERP_SECRET_123"));
    }

    #[test]
    fn missing_organic_results_is_bad_response() {
        let body = serde_json::json!({"error": "quota"});
        let err = parse_organic_results(&body).expect_err("should fail");
        assert_eq!(err.code, SEARCH_BAD_RESPONSE);
    }

    #[test]
    fn missing_key_is_distinct_failure() {
        let s = SerpApiSearch::new("http://127.0.0.1:9", "google", None, Duration::from_secs(1));
        let err = s.search("q", &SearchOptions::default()).expect_err("should fail");
        assert_eq!(err.code, SEARCH_NO_CREDENTIAL);
    }
}
