//! CLI binary for edgequake-pdf-translate.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `TranslatorConfig`, builds a `TranslationService` and prints page views.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_pdf_translate::{
    extract_metadata, NavAction, NavigateForm, NavigationRequest, PageView, Response,
    TranslationAdapter, TranslationService, TranslatorConfig, Upload, UploadStore,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Translate page 1 of a PDF into the default language
  pdf-translate translate paper.pdf --page 1

  # Translate into German with a specific model
  pdf-translate --language German --model gpt-4.1-mini translate paper.pdf --page 3

  # Move to the next page of an already stored document
  pdf-translate page --document uploads/paper.pdf --page 3 --action next

  # Page through a document interactively
  pdf-translate read paper.pdf

  # Inspect PDF metadata (no API key needed)
  pdf-translate inspect paper.pdf

  # JSON page view for scripting
  pdf-translate --json translate paper.pdf --page 2 > page2.json

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  RUST_LOG                Override the log filter (e.g. edgequake_pdf_translate=debug)
"#;

/// Translate PDF documents page by page using LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-translate",
    version,
    about = "Translate PDF documents one page at a time using LLMs",
    long_about = "Extract the text of one PDF page, translate it with a chat-completion model \
and print it as paragraphs. Pages are navigated with next/previous; no state is kept between \
invocations. Supports OpenAI, Anthropic, Google Gemini, Azure OpenAI, and any OpenAI-compatible \
endpoint (Ollama, vLLM, LiteLLM, etc.).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    opts: GlobalOpts,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1-mini, claude-sonnet-4-20250514).
    #[arg(long, global = true, env = "PDF_TRANSLATE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        global = true,
        env = "PDF_TRANSLATE_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// Target language of the translation.
    #[arg(long, global = true, env = "PDF_TRANSLATE_LANGUAGE")]
    language: Option<String>,

    /// Path to a text file with a custom instruction ({language} is substituted).
    #[arg(long, global = true, env = "PDF_TRANSLATE_INSTRUCTION")]
    instruction: Option<PathBuf>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, global = true, env = "PDF_TRANSLATE_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max LLM output tokens per page.
    #[arg(long, global = true, env = "PDF_TRANSLATE_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Retries per page on LLM failure.
    #[arg(long, global = true, env = "PDF_TRANSLATE_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Per-page LLM call timeout in seconds.
    #[arg(long, global = true, env = "PDF_TRANSLATE_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Page text longer than this many characters is truncated before translation.
    #[arg(
        long,
        global = true,
        env = "PDF_TRANSLATE_MAX_INPUT_CHARS",
        default_value_t = 12_000
    )]
    max_input_chars: usize,

    /// Directory uploaded PDFs are stored in.
    #[arg(
        long,
        global = true,
        env = "PDF_TRANSLATE_UPLOAD_DIR",
        default_value = "uploads"
    )]
    upload_dir: PathBuf,

    /// Output the page view as JSON instead of text.
    #[arg(long, global = true, env = "PDF_TRANSLATE_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF_TRANSLATE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF_TRANSLATE_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a PDF and translate one of its pages.
    Translate {
        /// Local PDF file.
        file: PathBuf,

        /// 1-based page number.
        #[arg(short, long, default_value = "1")]
        page: String,
    },

    /// Navigate from a page of an already stored document.
    Page {
        /// Stored document path (as printed by `translate`).
        #[arg(short, long)]
        document: String,

        /// Current 1-based page number.
        #[arg(short, long)]
        page: String,

        /// next, previous or none.
        #[arg(short, long, default_value = "none")]
        action: String,
    },

    /// Store a PDF and page through it interactively.
    Read {
        /// Local PDF file.
        file: PathBuf,

        /// 1-based page number to start at.
        #[arg(short, long, default_value = "1")]
        page: String,
    },

    /// Print PDF metadata only, no translation.
    Inspect {
        /// Local PDF file.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let opts = &cli.opts;

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides the feedback for a normal run, so library INFO
    // logs only show up with --verbose or RUST_LOG.
    let filter = if opts.verbose {
        "debug"
    } else if opts.quiet || !opts.json {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        // Inspect needs no provider.
        Command::Inspect { file } => inspect(file, opts.json).await?,
        Command::Translate { file, page } => {
            let service = build_service(opts).await?;
            let upload = read_upload(file).await?;
            let response = with_spinner(
                opts,
                format!("Translating page {page}…"),
                service.translate_upload(Some(upload), Some(page.as_str())),
            )
            .await;
            print_response(&response, opts.json)?;
            exit_on_failure(&response);
        }
        Command::Page {
            document,
            page,
            action,
        } => {
            let service = build_service(opts).await?;
            let form = NavigateForm {
                page_number: Some(page.clone()),
                filepath: Some(document.clone()),
                action: Some(action.clone()),
            };
            let response = with_spinner(
                opts,
                format!("Loading {action} page…"),
                service.navigate(&form),
            )
            .await;
            print_response(&response, opts.json)?;
            exit_on_failure(&response);
        }
        Command::Read { file, page } => {
            let service = build_service(opts).await?;
            let upload = read_upload(file).await?;
            let response = with_spinner(
                opts,
                format!("Translating page {page}…"),
                service.translate_upload(Some(upload), Some(page.as_str())),
            )
            .await;
            match response {
                Response::Page(view) => read_loop(&service, view, opts).await?,
                Response::Text(_) => {
                    print_response(&response, opts.json)?;
                    exit_on_failure(&response);
                }
            }
        }
    }

    Ok(())
}

/// Interactive pager: every step is a fresh request built from the last view.
async fn read_loop(
    service: &TranslationService,
    mut view: PageView,
    opts: &GlobalOpts,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_page(&view, opts.json)?;
        eprint!("{} ", dim("[n]ext  [p]revious  [q]uit ›"));
        io::stderr().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };
        let action = match line.trim().to_ascii_lowercase().as_str() {
            "n" | "next" | "" => NavAction::Next,
            "p" | "prev" | "previous" => NavAction::Previous,
            "q" | "quit" | "exit" => break,
            other => {
                eprintln!("{} unknown command '{}'", red("✗"), other);
                continue;
            }
        };

        let request = NavigationRequest::following(&view, action);
        view = with_spinner(
            opts,
            format!("Translating page {}…", request.target_page()),
            service.controller().handle(&request),
        )
        .await;
    }

    Ok(())
}

async fn inspect(file: &Path, json: bool) -> Result<()> {
    let meta = extract_metadata(file)
        .await
        .context("Failed to inspect PDF")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
        );
    } else {
        println!("File:         {}", file.display());
        if let Some(ref t) = meta.title {
            println!("Title:        {}", t);
        }
        if let Some(ref a) = meta.author {
            println!("Author:       {}", a);
        }
        println!("Pages:        {}", meta.page_count);
        println!("PDF Version:  {}", meta.pdf_version);
        println!("Encrypted:    {}", meta.is_encrypted);
        if let Some(ref p) = meta.producer {
            println!("Producer:     {}", p);
        }
    }
    Ok(())
}

/// Map CLI args to `TranslatorConfig`.
async fn build_config(opts: &GlobalOpts) -> Result<TranslatorConfig> {
    let mut builder = TranslatorConfig::builder()
        .temperature(opts.temperature)
        .max_tokens(opts.max_tokens)
        .max_retries(opts.max_retries)
        .api_timeout_secs(opts.api_timeout)
        .max_input_chars(opts.max_input_chars);

    if let Some(ref model) = opts.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = opts.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref language) = opts.language {
        builder = builder.target_language(language);
    }
    if let Some(ref path) = opts.instruction {
        let instruction = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read instruction from {:?}", path))?;
        builder = builder.instruction(instruction);
    }

    builder.build().context("Invalid configuration")
}

async fn build_service(opts: &GlobalOpts) -> Result<TranslationService> {
    let config = build_config(opts).await?;
    let adapter =
        TranslationAdapter::from_config(config).context("Failed to set up LLM provider")?;
    Ok(TranslationService::new(
        adapter,
        UploadStore::new(opts.upload_dir.clone()),
    ))
}

async fn read_upload(file: &Path) -> Result<Upload> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Upload::new(filename, bytes))
}

/// Await `fut` while a spinner runs on stderr (unless quiet or JSON).
async fn with_spinner<F: Future>(opts: &GlobalOpts, message: String, fut: F) -> F::Output {
    if opts.quiet || opts.json {
        return fut.await;
    }

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Working");
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));

    let out = fut.await;
    bar.finish_and_clear();
    out
}

/// Whether `response` shows a translated page.
fn succeeded(response: &Response) -> bool {
    response.page().is_some_and(PageView::is_ok)
}

/// Exit with status 1 when the page could not be shown, after it was printed.
fn exit_on_failure(response: &Response) {
    if !succeeded(response) {
        std::process::exit(1);
    }
}

fn print_response(response: &Response, json: bool) -> Result<()> {
    match response {
        Response::Page(view) => print_page(view, json),
        Response::Text(msg) => {
            if json {
                let value = serde_json::json!({ "message": msg });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&value).context("Failed to serialise output")?
                );
            } else {
                eprintln!("{} {}", red("✗"), msg);
            }
            Ok(())
        }
    }
}

fn print_page(view: &PageView, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(view).context("Failed to serialise output")?;
        println!("{out}");
        return Ok(());
    }

    eprintln!(
        "{} {}  {}",
        cyan("◆"),
        bold(&format!("Page {}", view.requested_page)),
        dim(&view.document.display().to_string())
    );

    match &view.error {
        Some(e) => eprintln!("{} {}", red("✗"), e),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let text = html_to_text(&view.html);
            handle
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")?;
            if !text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }
    Ok(())
}

/// Render `<p>` blocks as blank-line separated terminal text.
fn html_to_text(html: &str) -> String {
    html.split("</p>")
        .map(|block| block.trim_start_matches("<p>"))
        .filter(|block| !block.is_empty())
        .map(unescape_html)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgequake_pdf_translate::{ExtractionError, PageError};

    fn view(error: Option<PageError>) -> PageView {
        PageView {
            document: PathBuf::from("uploads/story.pdf"),
            page_index: 3,
            requested_page: 4,
            html: String::new(),
            error,
        }
    }

    #[test]
    fn only_a_translated_page_succeeds() {
        assert!(succeeded(&Response::Page(view(None))));

        let invalid = PageError::Extraction(ExtractionError::InvalidPage { page: 4, total: 3 });
        assert!(!succeeded(&Response::Page(view(Some(invalid)))));
        assert!(!succeeded(&Response::Text("Missing form field 'action'".into())));
    }

    #[test]
    fn html_to_text_unescapes_paragraphs() {
        assert_eq!(
            html_to_text("<p>a &lt; b</p><p>Tom &amp; Jerry</p>"),
            "a < b\n\nTom & Jerry"
        );
    }
}
