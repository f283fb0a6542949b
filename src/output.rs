//! Per-request output types handed to the presentation layer.

use crate::error::PageError;
use crate::pipeline::format::escape_html;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of one navigation request: what the page view renders.
///
/// `page_index` is the value the client carries into its next request.
/// It equals `requested_page` except when the requested page does not exist,
/// in which case pagination does not advance and `page_index` keeps the
/// pre-transition value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    /// Stored document the page belongs to.
    pub document: PathBuf,
    /// Page index to carry into the next request.
    pub page_index: i64,
    /// Page the pipeline ran for.
    pub requested_page: i64,
    /// Translated paragraphs as HTML. Empty when `error` is set.
    pub html: String,
    /// Why the page could not be shown, if it could not.
    pub error: Option<PageError>,
}

impl PageView {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Markup to render in place of the translation: the HTML on success,
    /// otherwise the error message in a paragraph.
    pub fn content_html(&self) -> String {
        match &self.error {
            None => self.html.clone(),
            Some(e) => format!("<p class=\"error\">{}</p>", escape_html(&e.to_string())),
        }
    }
}

/// Document-level metadata read without extracting any page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
    pub is_encrypted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;

    #[test]
    fn content_html_escapes_error_text() {
        let view = PageView {
            document: PathBuf::from("uploads/<a>.pdf"),
            page_index: 1,
            requested_page: 1,
            html: String::new(),
            error: Some(
                ExtractionError::Resource {
                    path: PathBuf::from("uploads/<a>.pdf"),
                    detail: "not found".into(),
                }
                .into(),
            ),
        };
        let html = view.content_html();
        assert!(html.starts_with("<p class=\"error\">"));
        assert!(html.contains("&lt;a&gt;"));
        assert!(!view.is_ok());
    }

    #[test]
    fn content_html_passes_translation_through() {
        let view = PageView {
            document: PathBuf::from("doc.pdf"),
            page_index: 2,
            requested_page: 2,
            html: "<p>Olá</p>".into(),
            error: None,
        };
        assert_eq!(view.content_html(), "<p>Olá</p>");
    }
}
