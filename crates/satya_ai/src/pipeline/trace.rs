use std::collections::BTreeSet;

use satya_core::domain::{FirstSeen, Forensics, SpreadPattern};
use satya_core::normalize::dates::{earliest_date, FirstSeenMode};
use url::Url;

use super::outcome::{log_fallback, StageOutcome};
use crate::search::{
    SearchHit, SearchOptions, SearchProvider, SEARCH_NO_CREDENTIAL, SEARCH_UNAVAILABLE,
};

const STAGE: &str = "trace";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceOptions {
    pub query_prefix_chars: usize,
    pub num_results: u32,
    pub host_sample: usize,
    pub first_seen_mode: FirstSeenMode,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            query_prefix_chars: 100,
            num_results: 10,
            host_sample: 5,
            first_seen_mode: FirstSeenMode::Lexicographic,
        }
    }
}

/// Exact-phrase query over the leading `prefix_chars` characters of the claim.
pub fn build_query(claim: &str, prefix_chars: usize) -> String {
    let prefix: String = claim.trim().chars().take(prefix_chars).collect();
    format!("\"{prefix}\"")
}

/// Hostname of a result link. Falls back to a plain split for links `url` rejects.
pub fn hostname(link: &str) -> Option<String> {
    if let Some(host) = Url::parse(link).ok().and_then(|u| u.host_str().map(str::to_string)) {
        return Some(host);
    }
    let rest = link.rsplit("//").next()?;
    let host = rest.split('/').next()?.trim();
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Characterize provenance from a successful search. Spread counts distinct hosts
/// among the first `host_sample` results that carry a link.
pub fn forensics_from_hits(hits: &[SearchHit], opts: &TraceOptions) -> Forensics {
    let dates: Vec<String> = hits.iter().filter_map(|h| h.date.clone()).collect();
    let first_seen = match earliest_date(&dates, opts.first_seen_mode) {
        Some(d) => FirstSeen::Date(d),
        None => FirstSeen::Recently,
    };

    // Sample the leading linked results first; an unparseable link still uses a slot.
    let hosts: BTreeSet<String> = hits
        .iter()
        .filter_map(|h| h.link.as_deref())
        .take(opts.host_sample)
        .filter_map(hostname)
        .collect();

    Forensics::new(first_seen, SpreadPattern::classify(hosts.len()))
}

/// Look up where a claim first appeared and how widely it spread.
pub fn trace_claim(
    search: &dyn SearchProvider,
    claim: &str,
    opts: &TraceOptions,
) -> StageOutcome<Forensics> {
    let query = build_query(claim, opts.query_prefix_chars);
    let search_opts = SearchOptions {
        num_results: opts.num_results,
        sort_by_date: true,
    };

    match search.search(&query, &search_opts) {
        Ok(hits) => {
            let forensics = forensics_from_hits(&hits, opts);
            tracing::info!(
                stage = STAGE,
                results = hits.len(),
                first_seen = %forensics.first_seen,
                spread = %forensics.spread_pattern,
                "Traced claim"
            );
            StageOutcome::Ok(forensics)
        }
        Err(e) => {
            let pattern = match e.code.as_str() {
                SEARCH_NO_CREDENTIAL => SpreadPattern::NoCredential,
                SEARCH_UNAVAILABLE => SpreadPattern::SearchUnavailable,
                _ => SpreadPattern::Untraceable,
            };
            log_fallback(STAGE, claim, &e);
            StageOutcome::fallback(Forensics::failed(pattern), e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_quoted_char_prefix() {
        assert_eq!(build_query("  abcdef ", 3), "\"abc\"");
        assert_eq!(build_query("दवा काम करती है", 3), "\"दवा\"");
    }

    #[test]
    fn hostname_handles_urls_and_bare_links() {
        assert_eq!(hostname("https://www.Example.com/a/b").as_deref(), Some("www.example.com"));
        assert_eq!(hostname("example.org/path").as_deref(), Some("example.org"));
        assert_eq!(hostname(""), None);
    }
}
