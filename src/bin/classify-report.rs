//! CLI binary for annual-report-classifier.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ClassifierConfig`, classifies one PDF and prints the label.

use annual_report_classifier::{
    classify_async, inspect, ClassifierConfig, EmbeddingFormat, ErrorKind, InferenceContext,
    InferenceResponse, RawDocument,
};
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Classify a local PDF
  classify-report --embedding-model models/word2vec.txt \
                  --classifier-model models/random_forest.json report.pdf

  # Artifacts from the environment, JSON envelope on stdout
  export ARC_EMBEDDING_MODEL=models/word2vec.bin
  export ARC_CLASSIFIER_MODEL=models/random_forest.json
  classify-report --json report.pdf

  # Read the PDF from stdin
  curl -s https://example.com/ir2023.pdf | classify-report -

  # Page count only, no models needed
  classify-report --inspect-only report.pdf

EXIT STATUS:
  0  a label was produced
  2  the document was rejected (no file, not a PDF, no text layer)
  1  anything else

ENVIRONMENT VARIABLES:
  ARC_EMBEDDING_MODEL     word2vec table (.txt text format, .bin binary format)
  ARC_EMBEDDING_FORMAT    auto, text or binary
  ARC_CLASSIFIER_MODEL    classifier JSON (random_forest / logistic_regression)
  ARC_STOPWORDS           stopword list, one per line (default: bundled English)
  ARC_NOUN_EXCEPTIONS     irregular noun list, e.g. WordNet noun.exc (default: bundled subset)
  ARC_LEMMA_INDEX         known lemmas, one per line (default: embedding vocabulary)
  RUST_LOG                tracing filter, overrides --verbose / --quiet
"#;

/// Classify a PDF as an annual report or not.
#[derive(Parser, Debug)]
#[command(
    name = "classify-report",
    version,
    about = "Classify a PDF as an annual report or not",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path, or `-` for stdin.
    input: String,

    /// Pretrained word2vec embedding table.
    #[arg(long, env = "ARC_EMBEDDING_MODEL", required_unless_present = "inspect_only")]
    embedding_model: Option<PathBuf>,

    /// Encoding of the embedding table.
    #[arg(long, env = "ARC_EMBEDDING_FORMAT", value_enum, default_value = "auto")]
    embedding_format: FormatArg,

    /// Trained classifier (JSON).
    #[arg(long, env = "ARC_CLASSIFIER_MODEL", required_unless_present = "inspect_only")]
    classifier_model: Option<PathBuf>,

    /// Stopword list replacing the bundled English one.
    #[arg(long, env = "ARC_STOPWORDS")]
    stopwords: Option<PathBuf>,

    /// Irregular noun list replacing the bundled English one. The bundled
    /// list is a common subset; WordNet's `noun.exc` can be passed as is.
    #[arg(long, env = "ARC_NOUN_EXCEPTIONS")]
    noun_exceptions: Option<PathBuf>,

    /// Known noun lemmas; defaults to the embedding vocabulary.
    #[arg(long, env = "ARC_LEMMA_INDEX")]
    lemma_index: Option<PathBuf>,

    /// Print the response envelope as JSON.
    #[arg(long)]
    json: bool,

    /// Include page, token and timing statistics.
    #[arg(long)]
    details: bool,

    /// Print PDF page count and version only, no classification.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except the result and errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FormatArg {
    Auto,
    Text,
    Binary,
}

impl From<FormatArg> for EmbeddingFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Auto => EmbeddingFormat::Auto,
            FormatArg::Text => EmbeddingFormat::Text,
            FormatArg::Binary => EmbeddingFormat::Binary,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_spinner = !cli.quiet && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_spinner {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let document = read_document(&cli.input)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = inspect(&document).context("Failed to inspect PDF")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", document.filename());
            println!("Pages:        {}", info.page_count);
            println!("PDF Version:  {}", info.pdf_version);
            println!("Encrypted:    {}", info.is_encrypted);
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── Load models (startup barrier) ────────────────────────────────────
    let config = build_config(&cli)?;
    let spinner = show_spinner.then(loading_spinner);
    let loaded = tokio::task::spawn_blocking(move || InferenceContext::load(&config))
        .await
        .context("Model loading task panicked")?;
    if let Some(ref bar) = spinner {
        bar.finish_and_clear();
    }
    let context = Arc::new(loaded.context("Failed to load models")?);

    // ── Classify ─────────────────────────────────────────────────────────
    let result = classify_async(Arc::clone(&context), document).await;
    let response = InferenceResponse::from(&result);

    if cli.json {
        let json = match (&result, cli.details) {
            (Ok(prediction), true) => serde_json::to_string_pretty(prediction),
            _ => serde_json::to_string_pretty(&response),
        }
        .context("Failed to serialise output")?;
        println!("{json}");
    } else {
        match &result {
            Ok(prediction) => {
                println!("{}", prediction.label);
                if cli.details && !cli.quiet {
                    let s = &prediction.stats;
                    eprintln!(
                        "{} {} pages ({} failed), {} tokens, {} in vocabulary, {}ms",
                        green("✔"),
                        s.pages_total,
                        s.pages_failed,
                        s.tokens,
                        s.tokens_in_vocabulary,
                        s.duration_ms
                    );
                }
            }
            Err(e) => {
                eprintln!("{} {}", red("✘"), bold(e.kind().client_message()));
                if !cli.quiet {
                    eprintln!("  {}", dim(&e.to_string()));
                }
            }
        }
    }

    Ok(match response {
        InferenceResponse::Label { .. } => ExitCode::SUCCESS,
        InferenceResponse::Error { error, .. } => exit_code_for(error),
    })
}

fn exit_code_for(kind: ErrorKind) -> ExitCode {
    if kind.is_client_error() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

/// Read the input argument into a `RawDocument`.
fn read_document(input: &str) -> Result<RawDocument> {
    if annual_report_classifier::pipeline::input::is_stdin(input) {
        RawDocument::from_reader("stdin.pdf", io::stdin().lock()).context("Failed to read stdin")
    } else {
        RawDocument::from_path(input).with_context(|| format!("Failed to read '{input}'"))
    }
}

/// Map CLI args to `ClassifierConfig`.
fn build_config(cli: &Cli) -> Result<ClassifierConfig> {
    let mut builder =
        ClassifierConfig::builder().embedding_format(cli.embedding_format.clone().into());
    if let Some(ref p) = cli.embedding_model {
        builder = builder.embedding_model(p);
    }
    if let Some(ref p) = cli.classifier_model {
        builder = builder.classifier_model(p);
    }
    if let Some(ref p) = cli.stopwords {
        builder = builder.stopwords(p);
    }
    if let Some(ref p) = cli.noun_exceptions {
        builder = builder.noun_exceptions(p);
    }
    if let Some(ref p) = cli.lemma_index {
        builder = builder.lemma_index(p);
    }
    builder.build().context("Invalid configuration")
}

fn loading_spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Loading");
    bar.set_message("embedding and classifier models…");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
