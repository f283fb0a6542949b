//! Post-processing: deterministic cleanup of the model's translation.
//!
//! Models told to "return only the translation" still occasionally wrap the
//! answer in a code fence, answer with Windows line endings, or leave
//! zero-width characters copied from the source PDF. These rules fix that
//! before [`super::format::format_paragraphs`] splits the text, so paragraph
//! detection works on clean input.
//!
//! ## Rule Order
//!
//! Fences are stripped first (the fence regex expects the raw answer), then
//! line endings are normalised so the whitespace rules only see `\n`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to the raw model answer.
///
/// Rules (applied in order):
/// 1. Strip an outer code fence (```` ``` ```` or ```` ```text ````)
/// 2. Normalise line endings (CRLF / CR → LF)
/// 3. Trim trailing whitespace per line, so whitespace-only lines count as blank
/// 4. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, …)
/// 5. Trim the whole answer
pub fn clean_translation(input: &str) -> String {
    let s = strip_outer_fence(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = remove_invisible_chars(&s);
    s.trim().to_string()
}

// ── Rule 1: Strip outer fence ────────────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*\r?\n(.*?)\r?\n```\s*$").unwrap());

fn strip_outer_fence(input: &str) -> String {
    match RE_OUTER_FENCE.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Remove invisible Unicode characters ──────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}
