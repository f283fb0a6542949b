//! Pipeline stages for single-page translation.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the remote backend can be swapped without touching
//! extraction or formatting.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ translate ──▶ postprocess ──▶ format
//! (lopdf)     (LLM call)    (cleanup)       (<p> blocks)
//! ```
//!
//! 1. [`extract`]     — text of one page, by 1-based index; runs in
//!    `spawn_blocking` because PDF parsing is synchronous
//! 2. [`translate`]   — the only stage with network I/O; timeout and
//!    optional retry/backoff
//! 3. [`postprocess`] — deterministic cleanup of model quirks (fences,
//!    line endings, invisible characters)
//! 4. [`format`]      — blank-line paragraphs to escaped `<p>` containers

pub mod extract;
pub mod format;
pub mod postprocess;
pub mod translate;
