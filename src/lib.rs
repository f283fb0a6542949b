//! # edgequake-pdf-translate
//!
//! Translate a PDF one page at a time with an LLM, paging forward and
//! backward through the document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! NavigationRequest { document, page_index, action }
//!  │
//!  ├─ 1. Navigate  next / previous / none → target page (floor at 1)
//!  ├─ 2. Extract   text of that page via lopdf (spawn_blocking)
//!  ├─ 3. Translate one chat-completion call: instruction + page text
//!  ├─ 4. Polish    strip fences, normalise line endings, drop invisible chars
//!  └─ 5. Format    blank-line paragraphs → <p> blocks
//!  │
//!  ▼
//! PageView { document, page_index, html | error }
//! ```
//!
//! No state is kept between requests. The client sends the document
//! reference and its current page with every request, and every page view
//! re-runs extraction and translation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf_translate::{
//!     NavAction, NavigationRequest, PaginationController, TranslationAdapter, TranslatorConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = TranslatorConfig::builder().target_language("German").build()?;
//!     let controller = PaginationController::new(TranslationAdapter::from_config(config)?);
//!
//!     let view = controller
//!         .handle(&NavigationRequest::initial("uploads/paper.pdf", 1))
//!         .await;
//!     println!("{}", view.content_html());
//!
//!     let next = NavigationRequest::following(&view, NavAction::Next);
//!     println!("{}", controller.handle(&next).await.content_html());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-translate` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod navigation;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod service;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{TranslatorConfig, TranslatorConfigBuilder};
pub use error::{
    BackendError, ExtractionError, InputError, PageError, PdfTranslateError, TranslationError,
};
pub use navigation::{NavAction, NavigationRequest, PaginationController};
pub use output::{DocumentMetadata, PageView};
pub use pipeline::extract::{extract_metadata, extract_page, page_count};
pub use pipeline::format::format_paragraphs;
pub use pipeline::translate::{Completion, LlmBackend, TranslationAdapter, TranslationBackend};
pub use service::{parse_page_number, NavigateForm, Response, TranslationService};
pub use upload::{Upload, UploadStore};
