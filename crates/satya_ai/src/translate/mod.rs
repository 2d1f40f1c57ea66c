//! Language bridge around the English-only pipeline.
//!
//! Detection and translation are opaque calls to the reasoning service. Every
//! failure degrades to "no translation": English for detection, the input text for
//! translation.

use std::sync::Arc;

use satya_core::error::truncate_for_log;

use crate::llm::Llm;
use crate::pipeline::Analyzer;

pub const DEFAULT_LANGUAGE: &str = "en";

const LANGUAGE_NAMES: [(&str, &str); 20] = [
    ("hi", "Hindi"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("bn", "Bengali"),
    ("te", "Telugu"),
    ("ta", "Tamil"),
    ("mr", "Marathi"),
    ("gu", "Gujarati"),
    ("kn", "Kannada"),
    ("ml", "Malayalam"),
    ("pa", "Punjabi"),
    ("ur", "Urdu"),
];

/// Display name for an ISO-639-1 code; unknown codes are passed through.
pub fn language_name(code: &str) -> &str {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// Accept only a bare two-letter code.
pub fn normalize_language_code(reply: &str) -> Option<String> {
    let code = reply
        .trim()
        .trim_matches(|c| c == '\'' || c == '"' || c == '.')
        .to_lowercase();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code)
    } else {
        None
    }
}

fn detection_prompt(text: &str) -> String {
    format!(
        r#"Detect the language of this text and return ONLY the language code (2-letter ISO code like 'en', 'hi', 'es', etc.):

Text: "{text}"

Language code:
"#
    )
}

fn translation_prompt(text: &str, from: &str, to: &str) -> String {
    format!(
        r#"Translate this text from {from} to {to}. Return ONLY the translated text, no explanations:

Text: "{text}"

{to} translation:
"#
    )
}

pub struct LanguageBridge {
    llm: Arc<dyn Llm>,
}

impl LanguageBridge {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }

    pub fn detect_language(&self, text: &str) -> String {
        match self.llm.generate(&detection_prompt(text)) {
            Ok(reply) => match normalize_language_code(&reply) {
                Some(code) => {
                    tracing::info!(language = %code, "Detected language");
                    code
                }
                None => {
                    tracing::warn!(
                        reply = %truncate_for_log(&reply, 20),
                        "Invalid language code detected, defaulting to English"
                    );
                    DEFAULT_LANGUAGE.to_string()
                }
            },
            Err(e) => {
                tracing::warn!(
                    stage = "detect_language",
                    code = %e.code,
                    "Language detection failed, defaulting to English"
                );
                DEFAULT_LANGUAGE.to_string()
            }
        }
    }

    pub fn translate_to_english(&self, text: &str, source_lang: &str) -> String {
        self.translate(text, language_name(source_lang), "English")
    }

    pub fn translate_from_english(&self, text: &str, target_lang: &str) -> String {
        self.translate(text, "English", language_name(target_lang))
    }

    fn translate(&self, text: &str, from: &str, to: &str) -> String {
        match self.llm.generate(&translation_prompt(text, from, to)) {
            Ok(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
            Ok(_) => {
                tracing::warn!(from, to, "Translation reply was empty; keeping original text");
                text.to_string()
            }
            Err(e) => {
                tracing::warn!(from, to, code = %e.code, "Translation failed; keeping original text");
                text.to_string()
            }
        }
    }

    /// Full multilingual flow: detect, translate in, analyze, translate the report back.
    pub fn check_message(&self, analyzer: &Analyzer, text: &str) -> String {
        let language = self.detect_language(text);
        if language == DEFAULT_LANGUAGE {
            return analyzer.analyze(text);
        }
        let english = self.translate_to_english(text, &language);
        let report = analyzer.analyze(&english);
        self.translate_from_english(&report, &language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_codes() {
        assert_eq!(normalize_language_code(" HI\n").as_deref(), Some("hi"));
        assert_eq!(normalize_language_code("'es'").as_deref(), Some("es"));
        assert_eq!(normalize_language_code("english"), None);
        assert_eq!(normalize_language_code("e1"), None);
    }

    #[test]
    fn names_known_and_unknown_codes() {
        assert_eq!(language_name("ta"), "Tamil");
        assert_eq!(language_name("xx"), "xx");
    }
}
