use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use satya_ai::llm::{Llm, LLM_UNREACHABLE};
use satya_ai::pipeline::Analyzer;
use satya_ai::search::{SearchHit, SearchOptions, SearchProvider};
use satya_ai::translate::LanguageBridge;
use satya_core::error::AppError;

/// Stand-in for a multilingual model: detects Hindi by script, "translates" by tagging,
/// and answers analysis prompts with a fixed report.
struct FakePolyglot {
    prompts: Mutex<Vec<String>>,
}

impl FakePolyglot {
    fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompt_count(&self) -> usize {
        self.prompts.lock().expect("lock").len()
    }
}

impl Llm for FakePolyglot {
    fn generate(&self, prompt: &str) -> Result<String, AppError> {
        self.prompts.lock().expect("lock").push(prompt.to_string());
        if prompt.starts_with("Detect the language") {
            let hindi = prompt.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c));
            return Ok(if hindi { "hi".to_string() } else { "en".to_string() });
        }
        if prompt.starts_with("Translate this text from Hindi to English") {
            return Ok("Drinking bleach cures COVID".to_string());
        }
        if prompt.starts_with("Translate this text from English to Hindi") {
            return Ok("[hi] translated report".to_string());
        }
        if prompt.starts_with("Extract the main verifiable claims") {
            return Ok("1. Drinking bleach cures COVID".to_string());
        }
        Ok("🔴 HIGH RISK\n**The Gist:** False.\n**Why?**\n• Toxic\n• Debunked\n**Action:** Don't forward this".to_string())
    }
}

struct DownLlm;

impl Llm for DownLlm {
    fn generate(&self, _prompt: &str) -> Result<String, AppError> {
        Err(AppError::new(LLM_UNREACHABLE, "connection refused"))
    }
}

struct NoHits;

impl SearchProvider for NoHits {
    fn search(&self, _query: &str, _opts: &SearchOptions) -> Result<Vec<SearchHit>, AppError> {
        Ok(Vec::new())
    }
}

#[test]
fn detection_accepts_only_two_letter_codes() {
    let bridge = LanguageBridge::new(Arc::new(FakePolyglot::new()));
    assert_eq!(bridge.detect_language("ब्लीच पीने से कोविड ठीक होता है"), "hi");
    assert_eq!(bridge.detect_language("Bleach cures COVID"), "en");

    let down = LanguageBridge::new(Arc::new(DownLlm));
    assert_eq!(down.detect_language("ब्लीच"), "en");
}

#[test]
fn translation_failure_returns_input_unchanged() {
    let down = LanguageBridge::new(Arc::new(DownLlm));
    assert_eq!(down.translate_to_english("नमस्ते", "hi"), "नमस्ते");
    assert_eq!(down.translate_from_english("hello", "ta"), "hello");
}

#[test]
fn hindi_message_is_analyzed_in_english_and_answered_in_hindi() {
    let llm = Arc::new(FakePolyglot::new());
    let analyzer = Analyzer::new(llm.clone(), Arc::new(NoHits));
    let bridge = LanguageBridge::new(llm.clone());

    let out = bridge.check_message(&analyzer, "ब्लीच पीने से कोविड ठीक होता है");

    assert_eq!(out, "[hi] translated report");
    let prompts = llm.prompts.lock().expect("lock");
    // detect, translate in, extract, synthesize, translate out
    assert_eq!(prompts.len(), 5);
    assert!(prompts[2].contains("Drinking bleach cures COVID"));
    assert!(prompts[4].contains("🔴 HIGH RISK"));
}

#[test]
fn english_message_skips_translation() {
    let llm = Arc::new(FakePolyglot::new());
    let analyzer = Analyzer::new(llm.clone(), Arc::new(NoHits));
    let bridge = LanguageBridge::new(llm.clone());

    let out = bridge.check_message(&analyzer, "Drinking bleach cures COVID");

    assert!(out.starts_with("🔴 HIGH RISK"));
    assert_eq!(llm.prompt_count(), 3);
}
