//! Paragraph formatting: plain text → `<p>` blocks.
//!
//! Paragraph breaks are blank lines (`"\n\n"`). Single newlines inside a
//! paragraph are kept as they are; browsers fold them into spaces. Line
//! endings are not normalised here: model output has already been through
//! [`crate::pipeline::postprocess::clean_translation`].

/// Wrap each blank-line-separated paragraph of `raw_text` in `<p>…</p>`.
///
/// Paragraphs are trimmed and HTML-escaped; paragraphs that are empty after
/// trimming produce no markup. Containers are concatenated in input order
/// with nothing between them.
pub fn format_paragraphs(raw_text: &str) -> String {
    raw_text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape_html(p)))
        .collect()
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
