use satya_core::error::AppError;
use serde::{Deserialize, Serialize};

pub mod serpapi;

pub const SEARCH_NO_CREDENTIAL: &str = "SEARCH_NO_CREDENTIAL";
pub const SEARCH_UNAVAILABLE: &str = "SEARCH_UNAVAILABLE";
pub const SEARCH_BAD_RESPONSE: &str = "SEARCH_BAD_RESPONSE";

/// One organic result. Providers may omit either field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub link: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub num_results: u32,
    pub sort_by_date: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            num_results: 10,
            sort_by_date: true,
        }
    }
}

/// Web-search collaborator used for provenance tracing.
///
/// Failures must use one of the `SEARCH_*` codes: a missing credential, a transport
/// error (including timeouts) and an unusable response are reported distinctly.
pub trait SearchProvider: Send + Sync {
    fn search(&self, query: &str, opts: &SearchOptions) -> Result<Vec<SearchHit>, AppError>;
}
