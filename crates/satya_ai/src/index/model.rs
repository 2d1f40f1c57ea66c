use serde::{Deserialize, Serialize};

/// Trusted-source article fed to the offline index build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub source: String,
    #[serde(default)]
    pub url: Option<String>,
    // fact_check|curated_fact
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "fact_check".to_string()
}

/// Written next to the passages and vectors; checked on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexManifest {
    pub model: String,
    pub dims: u32,
    pub passage_count: u32,
    /// SHA-256 over the passages in index order, NUL separated.
    pub passages_sha256: String,
    pub built_at: String, // RFC3339
}

fn curated(title: &str, content: &str, source: &str, url: &str) -> Article {
    Article {
        title: title.to_string(),
        content: content.to_string(),
        source: source.to_string(),
        url: Some(url.to_string()),
        kind: "curated_fact".to_string(),
    }
}

/// Baseline facts for common misinformation themes, always included in a build.
pub fn curated_facts() -> Vec<Article> {
    vec![
        curated(
            "COVID-19 Vaccine Safety",
            "COVID-19 vaccines authorized for use have undergone rigorous testing and continue to be monitored for safety. Serious adverse reactions are rare.",
            "CDC",
            "https://www.cdc.gov/coronavirus/2019-ncov/vaccines/safety/safety-of-vaccines.html",
        ),
        curated(
            "5G and Health Concerns",
            "There is no scientific evidence that 5G networks cause health problems. 5G uses radio frequencies that are non-ionizing and do not damage DNA.",
            "WHO",
            "https://www.who.int/news-room/q-a-detail/radiation-5g-mobile-networks-and-health",
        ),
        curated(
            "Climate Change Scientific Consensus",
            "There is overwhelming scientific consensus that climate change is occurring and is primarily caused by human activities. Over 97% of climate scientists agree on this.",
            "NASA",
            "https://climate.nasa.gov/scientific-consensus/",
        ),
        curated(
            "Government Scheme Verification",
            "Always verify government schemes and benefits through official government websites and helplines. Fake schemes often spread through social media.",
            "Government Advisory",
            "https://www.india.gov.in",
        ),
        curated(
            "WhatsApp Forward Reliability",
            "Information shared through WhatsApp forwards is often unreliable. Always check the original source before believing or sharing such information.",
            "Digital Literacy",
            "https://www.whatsapp.com/safety/",
        ),
    ]
}
