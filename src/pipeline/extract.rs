//! Page text extraction via lopdf.
//!
//! ## Why spawn_blocking?
//!
//! Parsing a PDF is CPU-bound and touches the filesystem synchronously.
//! `tokio::task::spawn_blocking` moves the work onto the blocking pool so a
//! large document does not stall the Tokio worker that is serving other
//! requests.
//!
//! ## Resource lifetime
//!
//! `lopdf::Document::load` reads the whole file and closes it before
//! returning, so no file handle outlives [`extract_page`] on any exit path:
//! success, invalid page, or extraction failure.

use crate::error::{ExtractionError, PdfTranslateError};
use crate::output::DocumentMetadata;
use lopdf::{Document, Object};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extract the raw text of one page (1-based).
///
/// Returns [`ExtractionError::InvalidPage`] when `page_index` is outside
/// `[1, page_count]` (0 and negative included), and
/// [`ExtractionError::Resource`] when the document cannot be opened or the
/// page's content cannot be decoded. The text is returned as lopdf produces
/// it; layout cleanup is left to the formatter.
pub async fn extract_page(document: &Path, page_index: i64) -> Result<String, ExtractionError> {
    let path = document.to_path_buf();
    let err_path = path.clone();

    tokio::task::spawn_blocking(move || extract_page_blocking(&path, page_index))
        .await
        .map_err(|e| ExtractionError::Resource {
            path: err_path,
            detail: format!("Extraction task panicked: {}", e),
        })?
}

/// Blocking implementation of page extraction.
pub(crate) fn extract_page_blocking(
    document: &Path,
    page_index: i64,
) -> Result<String, ExtractionError> {
    let doc = open_document(document)?;

    let pages = doc.get_pages();
    let total = pages.len();

    let page_number = match u32::try_from(page_index) {
        Ok(n) if n >= 1 && (n as usize) <= total => n,
        _ => {
            warn!(
                "Page {} requested from {} (document has {} pages)",
                page_index,
                document.display(),
                total
            );
            return Err(ExtractionError::InvalidPage {
                page: page_index,
                total,
            });
        }
    };

    let text = page_text(&doc, document, page_number)?;

    debug!(
        "Extracted page {}/{} of {} ({} chars)",
        page_number,
        total,
        document.display(),
        text.chars().count()
    );

    Ok(text)
}

/// Count the pages of a document.
pub async fn page_count(document: &Path) -> Result<usize, ExtractionError> {
    let path = document.to_path_buf();
    let err_path = path.clone();

    tokio::task::spawn_blocking(move || open_document(&path).map(|doc| doc.get_pages().len()))
        .await
        .map_err(|e| ExtractionError::Resource {
            path: err_path,
            detail: format!("Page-count task panicked: {}", e),
        })?
}

/// Extract document metadata without extracting any page text.
pub async fn extract_metadata(document: &Path) -> Result<DocumentMetadata, PdfTranslateError> {
    let path = document.to_path_buf();

    tokio::task::spawn_blocking(move || extract_metadata_blocking(&path))
        .await
        .map_err(|e| PdfTranslateError::Internal(format!("Metadata task panicked: {}", e)))?
}

fn extract_metadata_blocking(document: &Path) -> Result<DocumentMetadata, PdfTranslateError> {
    // Encrypted documents still report their metadata.
    let doc = load_document(document)?;

    let info = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id))
        .ok();

    let get_meta = |key: &[u8]| -> Option<String> {
        let value = info?.get(key).ok()?.as_str().ok()?;
        let s = String::from_utf8_lossy(value).trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    };

    Ok(DocumentMetadata {
        title: get_meta(b"Title"),
        author: get_meta(b"Author"),
        producer: get_meta(b"Producer"),
        page_count: doc.get_pages().len(),
        pdf_version: doc.version.clone(),
        is_encrypted: doc.is_encrypted(),
    })
}

/// Decode the text of an existing page.
fn page_text(
    doc: &Document,
    document: &Path,
    page_number: u32,
) -> Result<String, ExtractionError> {
    doc.extract_text(&[page_number]).map_err(|e| {
        resource_error(
            document,
            format!("text extraction failed on page {}: {}", page_number, e),
        )
    })
}

/// Load a document whose text can be extracted.
fn open_document(document: &Path) -> Result<Document, ExtractionError> {
    let doc = load_document(document)?;
    ensure_readable(&doc, document)?;
    Ok(doc)
}

/// Parse the file and check it has a catalog.
fn load_document(document: &Path) -> Result<Document, ExtractionError> {
    let doc = Document::load(document).map_err(|e| resource_error(document, e.to_string()))?;
    if let Err(e) = doc.catalog() {
        return Err(resource_error(
            document,
            format!("document catalog unreadable: {}", e),
        ));
    }
    Ok(doc)
}

/// Reject documents whose content cannot be read without a password.
fn ensure_readable(doc: &Document, document: &Path) -> Result<(), ExtractionError> {
    if doc.is_encrypted() {
        return Err(resource_error(document, "document is encrypted".to_string()));
    }
    Ok(())
}

fn resource_error(document: &Path, detail: String) -> ExtractionError {
    ExtractionError::Resource {
        path: PathBuf::from(document),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};

    /// Write a PDF with one page per entry of `texts`.
    fn write_test_pdf(path: &Path, texts: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                lopdf::Dictionary::new(),
                content.encode().unwrap(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => texts.len() as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    fn three_page_pdf(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("three.pdf");
        write_test_pdf(&path, &["First page text", "Second page text", "Third page text"]);
        path
    }

    #[tokio::test]
    async fn extracts_each_valid_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = three_page_pdf(&dir);

        for (page, expected) in [(1, "First"), (2, "Second"), (3, "Third")] {
            let text = extract_page(&path, page).await.unwrap();
            assert!(text.contains(expected), "page {page}: {text:?}");
        }
    }

    #[tokio::test]
    async fn out_of_range_pages_are_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = three_page_pdf(&dir);

        for page in [0, -1, -42, 4, 99, i64::MAX] {
            let err = extract_page(&path, page).await.unwrap_err();
            assert_eq!(err, ExtractionError::InvalidPage { page, total: 3 });
        }
    }

    #[tokio::test]
    async fn missing_file_is_resource_error_with_cause() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.pdf");

        match extract_page(&path, 1).await.unwrap_err() {
            ExtractionError::Resource { path: p, detail } => {
                assert_eq!(p, path);
                assert!(!detail.is_empty());
            }
            other => panic!("expected Resource, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn corrupt_file_is_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.pdf");
        std::fs::write(&path, b"%PDF-1.5\nthis is not a pdf body").unwrap();

        let err = extract_page(&path, 1).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Resource { .. }), "{err:?}");
    }

    #[test]
    fn encrypted_document_is_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = three_page_pdf(&dir);
        let mut doc = Document::load(&path).unwrap();
        doc.trailer.set(
            "Encrypt",
            dictionary! {
                "Filter" => "Standard",
                "V" => 1,
                "R" => 2,
                "P" => -4,
            },
        );

        assert_eq!(
            ensure_readable(&doc, &path),
            Err(ExtractionError::Resource {
                path: path.clone(),
                detail: "document is encrypted".into(),
            })
        );
    }

    #[tokio::test]
    async fn encrypted_file_is_never_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let path = three_page_pdf(&dir);
        let mut doc = Document::load(&path).unwrap();
        doc.trailer.set(
            "Encrypt",
            dictionary! {
                "Filter" => "Standard",
                "V" => 1,
                "R" => 2,
                "P" => -4,
            },
        );
        doc.save(&path).unwrap();

        let err = extract_page(&path, 1).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Resource { .. }), "{err:?}");
    }

    #[test]
    fn text_extraction_failure_is_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = three_page_pdf(&dir);
        let doc = Document::load(&path).unwrap();

        match page_text(&doc, &path, 7).unwrap_err() {
            ExtractionError::Resource { path: p, detail } => {
                assert_eq!(p, path);
                assert!(detail.starts_with("text extraction failed on page 7"), "{detail}");
            }
            other => panic!("expected Resource, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn metadata_of_missing_file_reports_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.pdf");

        let err = extract_metadata(&path).await.unwrap_err();
        assert!(
            matches!(
                err,
                PdfTranslateError::Document(ExtractionError::Resource { .. })
            ),
            "{err:?}"
        );
        assert!(err.to_string().starts_with("Failed to open PDF"), "{err}");
    }

    #[tokio::test]
    async fn page_count_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = three_page_pdf(&dir);

        assert_eq!(page_count(&path).await.unwrap(), 3);

        let meta = extract_metadata(&path).await.unwrap();
        assert_eq!(meta.page_count, 3);
        assert_eq!(meta.pdf_version, "1.5");
        assert!(!meta.is_encrypted);
        assert_eq!(meta.title, None);
    }
}
