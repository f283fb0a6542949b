//! Instruction templates for page translation.
//!
//! Every prompt lives here so the wording can change without touching the
//! retry or error-handling logic in [`crate::pipeline::translate`], and so
//! tests can inspect the exact payload sent to the model.
//!
//! Callers can override the instruction via
//! [`crate::config::TranslatorConfig::instruction`]; the constants here are
//! used only when no override is provided.

/// Placeholder replaced with the target language.
pub const LANGUAGE_PLACEHOLDER: &str = "{language}";

/// Directive placed before the page text.
pub const DEFAULT_INSTRUCTION: &str = "Translate the following text into {language} so that \
the sentences are coherent and easy to understand. Make any adaptations necessary:";

/// Directive placed after the page text.
pub const OUTPUT_ONLY_SUFFIX: &str =
    "Return only the translation, without any additional commentary.";

/// Build the single user message sent to the model.
///
/// Layout: instruction (language substituted), blank line, page text, blank
/// line, output-only suffix.
pub fn build_translation_prompt(instruction: Option<&str>, language: &str, text: &str) -> String {
    let instruction = instruction
        .unwrap_or(DEFAULT_INSTRUCTION)
        .replace(LANGUAGE_PLACEHOLDER, language);
    format!("{instruction}\n\n{text}\n\n{OUTPUT_ONLY_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_names_language_and_wraps_text() {
        let p = build_translation_prompt(None, "Brazilian Portuguese", "Hello world.");
        assert!(p.starts_with("Translate the following text into Brazilian Portuguese"));
        assert!(p.contains("\n\nHello world.\n\n"));
        assert!(p.ends_with(OUTPUT_ONLY_SUFFIX));
        assert!(!p.contains(LANGUAGE_PLACEHOLDER));
    }

    #[test]
    fn custom_instruction_without_placeholder_is_used_verbatim() {
        let p = build_translation_prompt(Some("Rewrite in French:"), "German", "Bonjour");
        assert!(p.starts_with("Rewrite in French:\n\nBonjour"));
        assert!(!p.contains("German"));
    }
}
