//! Shared helpers for the integration tests: a lopdf PDF writer and a
//! scripted translation backend.

#![allow(dead_code)]

use async_trait::async_trait;
use edgequake_pdf_translate::{
    BackendError, Completion, TranslationAdapter, TranslationBackend, TranslatorConfig,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Text printed on each page of [`three_page_pdf`].
pub const PAGE_TEXTS: [&str; 3] = [
    "The first page opens the story",
    "The second page continues it",
    "The third page ends it",
];

/// Build a PDF with one Helvetica text line per entry of `texts`.
pub fn pdf_bytes(texts: &[&str]) -> Vec<u8> {
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

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// Write the [`PAGE_TEXTS`] document into `dir` and return its path.
pub fn three_page_pdf(dir: &Path) -> PathBuf {
    let path = dir.join("story.pdf");
    std::fs::write(&path, pdf_bytes(&PAGE_TEXTS)).unwrap();
    path
}

/// Backend that "translates" by prefixing the page text with `PT: `.
///
/// The page text is recovered from the prompt, which is
/// `instruction \n\n text \n\n suffix`. Can be switched to fail every call.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
    pub fail_with: Option<String>,
}

impl FakeBackend {
    pub fn failing(detail: &str) -> Self {
        Self {
            fail_with: Some(detail.to_string()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(detail) = &self.fail_with {
            return Err(BackendError(detail.clone()));
        }

        let start = prompt.find("\n\n").map(|i| i + 2).unwrap_or(0);
        let end = prompt.rfind("\n\n").filter(|&i| i >= start).unwrap_or(prompt.len());
        Ok(Completion {
            content: format!("PT: {}", prompt[start..end].trim()),
            input_tokens: 10,
            output_tokens: 5,
        })
    }
}

/// Adapter over `backend` with default configuration.
pub fn adapter(backend: Arc<FakeBackend>) -> TranslationAdapter {
    let config = TranslatorConfig::builder()
        .build()
        .expect("default config is valid");
    TranslationAdapter::new(backend, config)
}
