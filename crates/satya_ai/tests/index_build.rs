use std::fs;

use pretty_assertions::assert_eq;
use satya_ai::embeddings::Embedder;
use satya_ai::index::builder::load_articles;
use satya_ai::index::{build_index, curated_facts, Article, IndexStore};
use satya_core::error::AppError;

/// Deterministic encoder: length, vowel count and digit count.
struct ShapeEmbedder;

impl Embedder for ShapeEmbedder {
    fn model(&self) -> &str {
        "shape"
    }

    fn embed(&self, input: &str) -> Result<Vec<f32>, AppError> {
        let len = input.chars().count() as f32;
        let vowels = input.chars().filter(|c| "aeiou".contains(*c)).count() as f32;
        let digits = input.chars().filter(|c| c.is_ascii_digit()).count() as f32;
        Ok(vec![len, vowels, digits])
    }
}

struct RaggedEmbedder;

impl Embedder for RaggedEmbedder {
    fn model(&self) -> &str {
        "ragged"
    }

    fn embed(&self, input: &str) -> Result<Vec<f32>, AppError> {
        Ok(vec![0.0; 1 + input.len() % 2])
    }
}

fn article(title: &str, content: &str) -> Article {
    Article {
        title: title.to_string(),
        content: content.to_string(),
        source: "Test Desk".to_string(),
        url: None,
        kind: "fact_check".to_string(),
    }
}

#[test]
fn build_write_and_load_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = IndexStore::open(dir.path().join("kb"));
    assert!(!store.exists());

    let mut corpus = vec![article("Bleach", "Drinking bleach does not cure any disease.")];
    corpus.extend(curated_facts());
    let index = build_index(&corpus, &ShapeEmbedder).expect("build");
    assert_eq!(index.len(), 6);
    assert_eq!(index.dims(), 3);

    let manifest = store
        .write(&index, "2026-10-17T00:00:00Z")
        .expect("write");
    assert_eq!(manifest.model, "shape");
    assert_eq!(manifest.passage_count, 6);
    assert_eq!(manifest.passages_sha256.len(), 64);
    assert!(store.exists());

    let loaded = store.load().expect("load");
    assert_eq!(loaded.passages(), index.passages());
    assert_eq!(loaded.model(), "shape");
    assert_eq!(
        loaded.passage(0),
        Some("Bleach\n\nDrinking bleach does not cure any disease.")
    );

    // No temp files left behind by the atomic writes.
    let leftovers = fs::read_dir(store.root())
        .expect("read_dir")
        .flatten()
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("tmp"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn tampered_passages_are_rejected_on_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = IndexStore::open(dir.path().to_path_buf());
    let index = build_index(&curated_facts(), &ShapeEmbedder).expect("build");
    store.write(&index, "2026-10-17T00:00:00Z").expect("write");

    let mut passages = index.passages().to_vec();
    passages[0] = "5G towers cause illness".to_string();
    fs::write(
        dir.path().join("passages.json"),
        serde_json::to_vec(&passages).expect("encode"),
    )
    .expect("tamper");

    let err = store.load().expect_err("should fail");
    assert_eq!(err.code, "INDEX_CORRUPT");
}

#[test]
fn missing_index_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = IndexStore::open(dir.path().join("nope"))
        .load()
        .expect_err("should fail");
    assert_eq!(err.code, "INDEX_NOT_FOUND");
}

#[test]
fn empty_corpus_and_ragged_vectors_fail_the_build() {
    let err = build_index(&[], &ShapeEmbedder).expect_err("empty");
    assert_eq!(err.code, "INDEX_EMPTY_CORPUS");

    let corpus = vec![article("a", "odd"), article("bb", "odd")];
    let err = build_index(&corpus, &RaggedEmbedder).expect_err("ragged");
    assert_eq!(err.code, "INDEX_BUILD_FAILED");
}

#[test]
fn articles_file_accepts_type_field_and_optional_url() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("articles.json");
    fs::write(
        &path,
        r#"[{"title":"T","content":"C","source":"S","type":"fact_check"},
            {"title":"U","content":"D","source":"S","url":"https://example.org/x"}]"#,
    )
    .expect("write");

    let articles = load_articles(&path).expect("load");
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].url, None);
    assert_eq!(articles[1].kind, "fact_check");

    fs::write(&path, "not json").expect("write");
    assert_eq!(
        load_articles(&path).expect_err("bad json").code,
        "INDEX_SOURCE_INVALID"
    );
}

#[test]
fn sample_articles_fixture_builds_with_curated_facts() {
    let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures/articles/sample_articles.json");
    let mut corpus = load_articles(&path).expect("fixture");
    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus[1].url, None);
    corpus.extend(curated_facts());

    let index = build_index(&corpus, &ShapeEmbedder).expect("build");
    assert_eq!(index.len(), 7);
    assert!(index.passages()[0].starts_with("Fact Check: Drinking bleach"));
}
