//! Pagination: page index transitions and the per-request pipeline run.
//!
//! There is no session. The client holds the state (document reference and
//! current page) and sends it back with every request as a
//! [`NavigationRequest`]; [`PaginationController::handle`] is fully
//! determined by that value and never remembers anything between calls.

use crate::error::{PageError, PdfTranslateError};
use crate::output::PageView;
use crate::pipeline::extract::extract_page;
use crate::pipeline::translate::TranslationAdapter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info};

/// What the client asked to do with its current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavAction {
    Next,
    Previous,
    /// Show the page as given (initial request).
    #[default]
    None,
}

impl NavAction {
    /// Apply this action to `page_index`.
    ///
    /// `Next` is unbounded above; a page past the end is reported by the
    /// extractor. `Previous` never goes below 1.
    pub fn apply(self, page_index: i64) -> i64 {
        match self {
            NavAction::Next => page_index.saturating_add(1),
            NavAction::Previous if page_index > 1 => page_index - 1,
            NavAction::Previous | NavAction::None => page_index,
        }
    }
}

impl FromStr for NavAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "next" => Ok(NavAction::Next),
            "previous" | "prev" => Ok(NavAction::Previous),
            "none" | "" => Ok(NavAction::None),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for NavAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NavAction::Next => "next",
            NavAction::Previous => "previous",
            NavAction::None => "none",
        })
    }
}

/// Client-held navigation state for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub document: PathBuf,
    pub page_index: i64,
    pub action: NavAction,
}

impl NavigationRequest {
    pub fn new(document: impl Into<PathBuf>, page_index: i64, action: NavAction) -> Self {
        Self {
            document: document.into(),
            page_index,
            action,
        }
    }

    /// Initial request for a page (action `None`).
    pub fn initial(document: impl Into<PathBuf>, page_index: i64) -> Self {
        Self::new(document, page_index, NavAction::None)
    }

    /// The page the pipeline runs for.
    pub fn target_page(&self) -> i64 {
        self.action.apply(self.page_index)
    }

    /// The request a client would send after `view` to move by `action`.
    pub fn following(view: &PageView, action: NavAction) -> Self {
        Self::new(view.document.clone(), view.page_index, action)
    }
}

/// Runs extract → translate for the page a request points at.
#[derive(Clone)]
pub struct PaginationController {
    adapter: TranslationAdapter,
}

impl PaginationController {
    pub fn new(adapter: TranslationAdapter) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &TranslationAdapter {
        &self.adapter
    }

    /// Compute the target page and run the pipeline for it.
    ///
    /// Always returns a renderable [`PageView`]; failures are carried in
    /// `PageView::error`. An out-of-range page leaves `page_index` at the
    /// request's original value and never reaches the translator.
    pub async fn handle(&self, request: &NavigationRequest) -> PageView {
        let start = Instant::now();
        let target = request.target_page();
        info!(
            "{} → page {} of {} ({})",
            request.page_index,
            target,
            request.document.display(),
            request.action
        );

        let outcome = match extract_page(&request.document, target).await {
            Ok(text) => self.adapter.translate(&text).await.map_err(PageError::from),
            Err(e) => Err(PageError::from(e)),
        };

        let (html, error) = match outcome {
            Ok(html) => (html, None),
            Err(e) => (String::new(), Some(e)),
        };

        let page_index = match &error {
            Some(e) if e.is_invalid_page() => request.page_index,
            _ => target,
        };

        debug!(
            "Page {} done in {}ms (error: {})",
            target,
            start.elapsed().as_millis(),
            error.is_some()
        );

        PageView {
            document: request.document.clone(),
            page_index,
            requested_page: target,
            html,
            error,
        }
    }

    /// Synchronous wrapper around [`Self::handle`].
    ///
    /// Creates a temporary tokio runtime internally; do not call from inside
    /// an async context.
    pub fn handle_blocking(
        &self,
        request: &NavigationRequest,
    ) -> Result<PageView, PdfTranslateError> {
        let runtime = tokio::runtime::Runtime::new().map_err(|e| {
            PdfTranslateError::Internal(format!("Failed to create tokio runtime: {}", e))
        })?;
        Ok(runtime.block_on(self.handle(request)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_is_clamped_at_one() {
        assert_eq!(NavAction::Previous.apply(1), 1);
        assert_eq!(NavAction::Previous.apply(2), 1);
        assert_eq!(NavAction::Previous.apply(7), 6);
    }

    #[test]
    fn next_is_unbounded() {
        assert_eq!(NavAction::Next.apply(5), 6);
        assert_eq!(NavAction::Next.apply(i64::MAX), i64::MAX);
    }

    #[test]
    fn none_keeps_the_supplied_page() {
        assert_eq!(NavAction::None.apply(3), 3);
        assert_eq!(NavAction::None.apply(0), 0);
    }

    #[test]
    fn previous_from_non_positive_is_unchanged() {
        assert_eq!(NavAction::Previous.apply(0), 0);
        assert_eq!(NavAction::Previous.apply(-3), -3);
    }

    #[test]
    fn parse_actions() {
        assert_eq!("next".parse::<NavAction>(), Ok(NavAction::Next));
        assert_eq!(" Previous ".parse::<NavAction>(), Ok(NavAction::Previous));
        assert_eq!("prev".parse::<NavAction>(), Ok(NavAction::Previous));
        assert_eq!("none".parse::<NavAction>(), Ok(NavAction::None));
        assert_eq!("jump".parse::<NavAction>(), Err("jump".to_string()));
    }

    #[test]
    fn action_display_roundtrips() {
        for a in [NavAction::Next, NavAction::Previous, NavAction::None] {
            assert_eq!(a.to_string().parse::<NavAction>(), Ok(a));
        }
    }

    #[test]
    fn request_target_page() {
        let req = NavigationRequest::new("doc.pdf", 2, NavAction::Next);
        assert_eq!(req.target_page(), 3);
        assert_eq!(NavigationRequest::initial("doc.pdf", 4).target_page(), 4);
    }

    #[test]
    fn following_carries_view_state() {
        let view = PageView {
            document: PathBuf::from("uploads/book.pdf"),
            page_index: 3,
            requested_page: 4,
            html: String::new(),
            error: None,
        };
        let req = NavigationRequest::following(&view, NavAction::Previous);
        assert_eq!(req.document, PathBuf::from("uploads/book.pdf"));
        assert_eq!(req.page_index, 3);
        assert_eq!(req.target_page(), 2);
    }
}
