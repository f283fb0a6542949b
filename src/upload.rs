//! Storage for uploaded PDFs.
//!
//! An upload becomes a document reference: a path inside the upload
//! directory. The client filename is sanitised before it is used, and the
//! bytes are written to a temp file in the same directory and renamed into
//! place so a concurrent reader never sees a half-written PDF.

use crate::error::{InputError, PdfTranslateError};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// Filename used when sanitising leaves nothing.
const FALLBACK_FILENAME: &str = "upload.pdf";

/// A file received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Directory that uploaded PDFs are saved into.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save `upload` and return its document reference.
    ///
    /// A second upload with the same sanitised name replaces the first.
    pub async fn save(&self, upload: &Upload) -> Result<PathBuf, PdfTranslateError> {
        if !upload.bytes.starts_with(b"%PDF") {
            return Err(PdfTranslateError::NotAPdf {
                filename: upload.filename.clone(),
            });
        }

        let dir = self.dir.clone();
        let target = dir.join(secure_filename(&upload.filename));
        let bytes = upload.bytes.clone();

        let path = target.clone();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &path, &bytes))
            .await
            .map_err(|e| PdfTranslateError::Internal(format!("Upload task panicked: {}", e)))?
            .map_err(|source| PdfTranslateError::UploadFailed {
                path: target.clone(),
                source,
            })?;

        info!(
            "Stored upload '{}' as {} ({} bytes)",
            upload.filename,
            target.display(),
            upload.bytes.len()
        );
        Ok(target)
    }

    /// Map a client-held document reference back to a stored upload.
    ///
    /// Accepts the path returned by [`Self::save`] or a bare filename. Any
    /// other path (outside the directory, nested, or containing `..`) is
    /// rejected without touching the filesystem.
    pub fn resolve(&self, reference: &Path) -> Result<PathBuf, InputError> {
        let relative = reference.strip_prefix(&self.dir).unwrap_or(reference);
        let mut components = relative.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(self.dir.join(name)),
            _ => Err(InputError::UnknownDocument {
                filepath: reference.display().to_string(),
            }),
        }
    }
}

fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Keeps ASCII alphanumerics, `.`, `-` and `_`; whitespace runs become `_`;
/// everything else (path separators included) is dropped. Leading dots and
/// underscores are stripped so the result is never hidden or a `..`
/// component. An empty result becomes `upload.pdf`.
pub fn secure_filename(filename: &str) -> String {
    // Only the last component of either separator style counts.
    let base = filename.rsplit(['/', '\\']).next().unwrap_or("");

    let mut out = String::with_capacity(base.len());
    let mut pending_space = false;
    for ch in base.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
            if pending_space && !out.is_empty() {
                out.push('_');
            }
            pending_space = false;
            out.push(ch);
        }
    }

    let trimmed = out.trim_start_matches(['.', '_']);
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}
