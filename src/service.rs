//! Request-level operations: initial translate and navigate.
//!
//! These are what a web handler or the CLI calls. Inputs arrive as raw form
//! strings; anything malformed is answered with [`Response::Text`] before the
//! pipeline runs. Everything else produces a [`Response::Page`], whose
//! [`PageView`] carries either the translation or the error to show in its
//! place.

use crate::error::InputError;
use crate::navigation::{NavAction, NavigationRequest, PaginationController};
use crate::output::PageView;
use crate::pipeline::translate::TranslationAdapter;
use crate::upload::{Upload, UploadStore};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A page view (translated or with an error in place of the translation).
    Page(PageView),
    /// A plain-text message; the request never reached the pipeline.
    Text(String),
}

impl Response {
    pub fn page(&self) -> Option<&PageView> {
        match self {
            Response::Page(view) => Some(view),
            Response::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Response::Text(msg) => Some(msg),
            Response::Page(_) => None,
        }
    }
}

/// Fields of a navigation form, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigateForm {
    pub page_number: Option<String>,
    pub filepath: Option<String>,
    pub action: Option<String>,
}

impl NavigateForm {
    /// Validate the form into a [`NavigationRequest`].
    pub fn parse(&self) -> Result<NavigationRequest, InputError> {
        let page = required(&self.page_number, "page_number")?;
        let filepath = required(&self.filepath, "filepath")?;
        let action = required(&self.action, "action")?;

        let page_index = parse_page_number(page)?;
        let action = action
            .parse::<NavAction>()
            .map_err(|action| InputError::InvalidAction { action })?;

        Ok(NavigationRequest::new(
            PathBuf::from(filepath),
            page_index,
            action,
        ))
    }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, InputError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(InputError::MissingField { field }),
    }
}

/// Parse a page-number form field as a positive integer.
pub fn parse_page_number(input: &str) -> Result<i64, InputError> {
    match input.trim().parse::<i64>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(InputError::InvalidPageNumber {
            input: input.to_string(),
        }),
    }
}

/// Upload storage plus the pagination controller.
#[derive(Clone)]
pub struct TranslationService {
    controller: PaginationController,
    store: UploadStore,
}

impl TranslationService {
    pub fn new(adapter: TranslationAdapter, store: UploadStore) -> Self {
        Self {
            controller: PaginationController::new(adapter),
            store,
        }
    }

    pub fn controller(&self) -> &PaginationController {
        &self.controller
    }

    pub fn store(&self) -> &UploadStore {
        &self.store
    }

    /// Store an uploaded PDF and show the requested page.
    ///
    /// The page number is validated before anything is stored.
    pub async fn translate_upload(
        &self,
        upload: Option<Upload>,
        page_number: Option<&str>,
    ) -> Response {
        let upload = match upload {
            Some(u) if !u.filename.trim().is_empty() => u,
            _ => return Response::Text(InputError::NoFileSelected.to_string()),
        };

        let page_index = match page_number
            .ok_or(InputError::MissingField {
                field: "page_number",
            })
            .and_then(parse_page_number)
        {
            Ok(p) => p,
            Err(e) => return Response::Text(e.to_string()),
        };

        let document = match self.store.save(&upload).await {
            Ok(path) => path,
            Err(e) => {
                warn!("Upload rejected: {}", e);
                return Response::Text(e.to_string());
            }
        };

        let request = NavigationRequest::initial(document, page_index);
        Response::Page(self.controller.handle(&request).await)
    }

    /// Move to the next/previous page of an already stored document.
    ///
    /// `filepath` must name a document in the upload directory; anything
    /// else is answered with plain text and never opened.
    pub async fn navigate(&self, form: &NavigateForm) -> Response {
        let request = match form.parse().and_then(|mut request| {
            request.document = self.store.resolve(&request.document)?;
            Ok(request)
        }) {
            Ok(request) => request,
            Err(e) => {
                warn!("Navigation rejected: {}", e);
                return Response::Text(e.to_string());
            }
        };
        Response::Page(self.controller.handle(&request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(page: Option<&str>, path: Option<&str>, action: Option<&str>) -> NavigateForm {
        NavigateForm {
            page_number: page.map(str::to_string),
            filepath: path.map(str::to_string),
            action: action.map(str::to_string),
        }
    }

    #[test]
    fn parse_page_number_accepts_positive_integers() {
        assert_eq!(parse_page_number("1"), Ok(1));
        assert_eq!(parse_page_number(" 42 "), Ok(42));
    }

    #[test]
    fn parse_page_number_rejects_garbage_and_non_positive() {
        for bad in ["", "abc", "1.5", "0", "-2", "9999999999999999999999"] {
            assert_eq!(
                parse_page_number(bad),
                Err(InputError::InvalidPageNumber { input: bad.into() }),
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn navigate_form_parses() {
        let req = form(Some("2"), Some("uploads/a.pdf"), Some("next"))
            .parse()
            .unwrap();
        assert_eq!(req, NavigationRequest::new("uploads/a.pdf", 2, NavAction::Next));
    }

    #[test]
    fn navigate_form_missing_fields() {
        assert_eq!(
            form(None, Some("a.pdf"), Some("next")).parse(),
            Err(InputError::MissingField {
                field: "page_number"
            })
        );
        assert_eq!(
            form(Some("1"), Some("  "), Some("next")).parse(),
            Err(InputError::MissingField { field: "filepath" })
        );
        assert_eq!(
            form(Some("1"), Some("a.pdf"), None).parse(),
            Err(InputError::MissingField { field: "action" })
        );
    }

    #[test]
    fn navigate_form_rejects_unknown_action() {
        assert_eq!(
            form(Some("1"), Some("a.pdf"), Some("jump")).parse(),
            Err(InputError::InvalidAction {
                action: "jump".into()
            })
        );
    }

    #[test]
    fn navigate_form_rejects_non_integer_page() {
        assert!(matches!(
            form(Some("two"), Some("a.pdf"), Some("next")).parse(),
            Err(InputError::InvalidPageNumber { .. })
        ));
    }
}
