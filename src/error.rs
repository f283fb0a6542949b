//! Error types for the edgequake-pdf-translate library.
//!
//! Three groups of errors reflect three distinct moments a request can fail:
//!
//! * [`InputError`] — the request itself is malformed (page number is not a
//!   positive integer, a form field is missing). Detected before the pipeline
//!   runs; the pipeline is never entered.
//!
//! * [`PageError`] — **Non-fatal**: one page could not be shown. Either the
//!   document could not be read / the page does not exist
//!   ([`ExtractionError`]) or the remote call failed ([`TranslationError`]).
//!   Stored inside [`crate::output::PageView`] so the page view still
//!   renders with the error text in place of the translation.
//!
//! * [`PdfTranslateError`] — setup failures: invalid configuration, no LLM
//!   provider available, upload storage failure, an unreadable document
//!   when only its metadata is asked for. Returned as `Err` from
//!   constructors, [`crate::upload::UploadStore::save`] and
//!   [`crate::pipeline::extract::extract_metadata`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Setup-time errors returned by constructors and the upload store.
#[derive(Debug, Error)]
pub enum PdfTranslateError {
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The uploaded bytes do not start with the `%PDF` magic.
    #[error("Uploaded file '{filename}' is not a PDF")]
    NotAPdf { filename: String },

    /// Could not create the upload directory or write the uploaded file.
    #[error("Failed to store upload at '{path}': {source}")]
    UploadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be opened.
    #[error(transparent)]
    Document(#[from] ExtractionError),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The page text could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ExtractionError {
    /// The document could not be opened or read.
    #[error("Failed to open PDF '{}': {detail}", .path.display())]
    Resource { path: PathBuf, detail: String },

    /// The requested page is outside `[1, total]`.
    #[error("Invalid page {page}: the document has {total} pages")]
    InvalidPage { page: i64, total: usize },
}

/// The remote translation call failed or returned nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TranslationError {
    /// The backend reported an error (network, auth, quota, malformed response).
    #[error("Failed to translate text: {detail}")]
    Remote { detail: String, retries: u32 },

    /// No answer within the configured timeout.
    #[error("Failed to translate text: no response after {secs}s")]
    Timeout { secs: u64 },

    /// The backend answered with empty content.
    #[error("Failed to translate text: the model returned an empty response")]
    EmptyResponse,
}

/// A non-fatal error for the requested page.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PageError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Translation(#[from] TranslationError),
}

impl PageError {
    /// True when the page index was out of range.
    pub fn is_invalid_page(&self) -> bool {
        matches!(self, PageError::Extraction(ExtractionError::InvalidPage { .. }))
    }
}

/// Malformed request input, reported as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("No file uploaded or selected.")]
    NoFileSelected,

    #[error("Invalid page number: '{input}'")]
    InvalidPageNumber { input: String },

    #[error("Missing form field '{field}'")]
    MissingField { field: &'static str },

    #[error("Unknown navigation action '{action}' (expected next, previous or none)")]
    InvalidAction { action: String },

    /// The document reference does not name a file in the upload directory.
    #[error("Unknown document '{filepath}'")]
    UnknownDocument { filepath: String },
}

/// Error reported by a [`crate::pipeline::translate::TranslationBackend`].
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct BackendError(pub String);
