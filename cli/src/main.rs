//! SatyaTrace command-line front end.
//!
//! Reports go to stdout; logs go to stderr.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use satya_ai::embeddings::ollama_embed::OllamaEmbedder;
use satya_ai::embeddings::Embedder;
use satya_ai::index::builder::load_articles;
use satya_ai::index::{build_index, curated_facts, IndexStore};
use satya_ai::llm::gemini_llm::GeminiLlm;
use satya_ai::llm::ollama_llm::OllamaLlm;
use satya_ai::llm::Llm;
use satya_ai::ollama::OllamaClient;
use satya_ai::pipeline::{Analyzer, KnowledgeBase, PipelineOptions, TraceOptions};
use satya_ai::search::serpapi::SerpApiSearch;
use satya_ai::translate::LanguageBridge;
use satya_core::config::{Config, LlmProvider};
use satya_core::error::AppError;

const BATCH_SEPARATOR: &str = "\n----------------------------------------\n";

#[derive(Debug, Parser)]
#[command(
    name = "satyatrace",
    version,
    about = "Misinformation risk reports for forwarded messages"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze English text and print the risk report
    Analyze { text: String },

    /// Detect the language, analyze, and answer in the same language
    Check { text: String },

    /// Analyze one message per stdin line
    Batch {
        #[arg(long, default_value_t = 4)]
        workers: usize,
    },

    /// Build the semantic index from an article file
    BuildIndex {
        #[arg(long)]
        articles: PathBuf,
        /// Defaults to the configured index directory
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print readiness of every external dependency as JSON
    Health,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // `.env` may set RUST_LOG, so it is read before the subscriber is installed.
    let dotenv = load_dotenv();
    init_logging(cli.verbose);
    if let Err(e) = dotenv {
        tracing::warn!(error = %e, "Failed to read .env file");
    }
    let config = Config::from_env();

    let result = match cli.command {
        Commands::Analyze { text } => {
            build_analyzer(&config).map(|a| println!("{}", a.analyze(&text)))
        }
        Commands::Check { text } => build_analyzer(&config).map(|a| {
            let bridge = LanguageBridge::new(a.llm());
            println!("{}", bridge.check_message(&a, &text));
        }),
        Commands::Batch { workers } => {
            build_analyzer(&config).and_then(|a| run_batch(&a, workers))
        }
        Commands::BuildIndex { articles, out } => run_build_index(&config, &articles, out),
        Commands::Health => run_health(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(
                code = %e.code,
                details = e.details.as_deref().unwrap_or(""),
                "{}",
                e.message
            );
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Load `.env` into the process environment. A missing file is not an error.
fn load_dotenv() -> Result<(), dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Filter directive: `--verbose` wins, then a non-empty RUST_LOG, then `info`.
fn log_directive(verbose: bool, rust_log: Option<String>) -> String {
    if verbose {
        return "debug".to_string();
    }
    rust_log
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

fn init_logging(verbose: bool) {
    let directive = log_directive(verbose, std::env::var("RUST_LOG").ok());
    let filter = tracing_subscriber::EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_llm(config: &Config) -> Result<Arc<dyn Llm>, AppError> {
    let timeout = Duration::from_secs(config.llm.timeout_secs);
    let model = config.llm.model_name();
    match config.llm.provider {
        LlmProvider::Gemini => {
            let llm = GeminiLlm::new(
                &config.llm.gemini_endpoint,
                model,
                config.llm.api_key.clone(),
                timeout,
            );
            if !llm.is_configured() {
                tracing::warn!("GEMINI_API_KEY not set; every report will be a fallback");
            }
            Ok(Arc::new(llm))
        }
        LlmProvider::Ollama => {
            let client = OllamaClient::new(&config.ollama_base_url)?;
            if let Err(e) = client.health_check() {
                tracing::warn!(code = %e.code, "Ollama not reachable; reports will be fallbacks");
            }
            Ok(Arc::new(OllamaLlm::new(client, model, timeout)))
        }
    }
}

fn build_embedder(config: &Config) -> Result<OllamaEmbedder, AppError> {
    let client = OllamaClient::new(&config.ollama_base_url)?;
    client.ensure_model(&config.embeddings.model)?;
    Ok(OllamaEmbedder::new(
        client,
        config.embeddings.model.clone(),
        Duration::from_secs(config.embeddings.timeout_secs),
    ))
}

/// Load the index and its encoder. Any failure leaves retrieval degraded, never fatal.
fn load_knowledge(config: &Config) -> Option<Arc<KnowledgeBase>> {
    let store = IndexStore::open(config.retrieval.index_dir.clone());
    let index = match store.load() {
        Ok(index) => index,
        Err(e) => {
            tracing::warn!(
                code = %e.code,
                dir = %store.root().display(),
                "Knowledge base unavailable; continuing without evidence"
            );
            return None;
        }
    };
    let embedder = match build_embedder(config) {
        Ok(embedder) => embedder,
        Err(e) => {
            tracing::warn!(
                code = %e.code,
                "Embedding service unavailable; continuing without evidence"
            );
            return None;
        }
    };
    tracing::info!(passages = index.len(), dims = index.dims(), "Loaded knowledge base");
    Some(Arc::new(KnowledgeBase::new(index, Arc::new(embedder))))
}

fn build_analyzer(config: &Config) -> Result<Analyzer, AppError> {
    let llm = build_llm(config)?;
    let search = SerpApiSearch::new(
        &config.search.endpoint,
        &config.search.engine,
        config.search.api_key.clone(),
        Duration::from_secs(config.search.timeout_secs),
    );
    if !search.is_configured() {
        tracing::warn!("SERPAPI_KEY not set; provenance tracing is disabled");
    }
    let options = PipelineOptions {
        top_k: config.retrieval.top_k,
        trace: TraceOptions {
            query_prefix_chars: config.search.query_prefix_chars,
            num_results: config.search.num_results,
            host_sample: config.search.host_sample,
            first_seen_mode: config.search.first_seen_mode,
        },
    };
    Ok(Analyzer::new(llm, Arc::new(search))
        .with_knowledge(load_knowledge(config))
        .with_options(options))
}

fn run_batch(analyzer: &Analyzer, workers: usize) -> Result<(), AppError> {
    let messages: Vec<String> = io::stdin()
        .lock()
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            AppError::new("CLI_STDIN_FAILED", "Failed to read stdin").with_details(e.to_string())
        })?
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect();

    let reports = analyze_all(analyzer, &messages, workers);
    println!("{}", reports.join(BATCH_SEPARATOR));
    Ok(())
}

/// Analyze messages on up to `workers` threads sharing one analyzer. Output keeps input order.
fn analyze_all(analyzer: &Analyzer, messages: &[String], workers: usize) -> Vec<String> {
    let slots: Mutex<Vec<Option<String>>> = Mutex::new(vec![None; messages.len()]);
    let next = AtomicUsize::new(0);
    let workers = workers.clamp(1, messages.len().max(1));

    std::thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let i = next.fetch_add(1, Ordering::Relaxed);
                let Some(message) = messages.get(i) else { break };
                let report = analyzer.analyze(message);
                if let Ok(mut slots) = slots.lock() {
                    slots[i] = Some(report);
                }
            });
        }
    });

    slots
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .into_iter()
        .map(|r| r.unwrap_or_else(satya_core::report::system_fallback_text))
        .collect()
}

fn run_build_index(
    config: &Config,
    articles: &Path,
    out: Option<PathBuf>,
) -> Result<(), AppError> {
    let mut corpus = load_articles(articles)?;
    let loaded = corpus.len();
    corpus.extend(curated_facts());

    let embedder = build_embedder(config)?;
    let index = build_index(&corpus, &embedder)?;

    let built_at = OffsetDateTime::now_utc().format(&Rfc3339).map_err(|e| {
        AppError::new("INDEX_BUILD_FAILED", "Failed to format build time")
            .with_details(e.to_string())
    })?;
    let store = IndexStore::open(out.unwrap_or_else(|| config.retrieval.index_dir.clone()));
    let manifest = store.write(&index, &built_at)?;

    tracing::info!(
        articles = loaded,
        curated = corpus.len() - loaded,
        passages = manifest.passage_count,
        dims = manifest.dims,
        model = %manifest.model,
        dir = %store.root().display(),
        "Index built"
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct ComponentHealth {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ComponentHealth {
    fn from_result<T>(result: Result<T, AppError>) -> Self {
        match result {
            Ok(_) => Self {
                ok: true,
                detail: None,
            },
            Err(e) => Self {
                ok: false,
                detail: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthReport {
    reasoning: ComponentHealth,
    embeddings: ComponentHealth,
    index: ComponentHealth,
    search: ComponentHealth,
}

fn run_health(config: &Config) -> Result<(), AppError> {
    let reasoning = match config.llm.provider {
        LlmProvider::Gemini => ComponentHealth::from_result(
            config
                .llm
                .api_key
                .as_ref()
                .map(|_| ())
                .ok_or_else(|| {
                    AppError::new("AI_LLM_NOT_CONFIGURED", "GEMINI_API_KEY is not set")
                }),
        ),
        LlmProvider::Ollama => ComponentHealth::from_result(
            OllamaClient::new(&config.ollama_base_url)
                .and_then(|c| c.ensure_model(config.llm.model_name())),
        ),
    };
    let store = IndexStore::open(config.retrieval.index_dir.clone());
    let report = HealthReport {
        reasoning,
        embeddings: ComponentHealth::from_result(
            build_embedder(config).map(|e| e.model().to_string()),
        ),
        index: ComponentHealth::from_result(store.load()),
        search: ComponentHealth::from_result(
            config
                .search
                .api_key
                .as_ref()
                .map(|_| ())
                .ok_or_else(|| {
                    AppError::new("SEARCH_NO_CREDENTIAL", "SERPAPI_KEY is not set")
                }),
        ),
    };

    let json = serde_json::to_string_pretty(&report).map_err(|e| {
        AppError::new("CLI_OUTPUT_FAILED", "Failed to encode health report")
            .with_details(e.to_string())
    })?;
    println!("{json}");
    Ok(())
}
