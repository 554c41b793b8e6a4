// Shared prompt fragments.
// Each agent keeps its own prompts in agents/prompts.rs; this file holds the
// cross-cutting pieces they append.

/// Appended to every prompt that expects a JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str = "Return only valid JSON, no additional text. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Max characters of resume text forwarded to the model.
pub const MAX_PROMPT_TEXT_CHARS: usize = 2000;

/// Truncates `text` to `MAX_PROMPT_TEXT_CHARS` characters on a char boundary.
pub fn clip_for_prompt(text: &str) -> &str {
    match text.char_indices().nth(MAX_PROMPT_TEXT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_short_text_untouched() {
        assert_eq!(clip_for_prompt("rust"), "rust");
    }

    #[test]
    fn test_clip_long_multibyte_text() {
        let text = "é".repeat(MAX_PROMPT_TEXT_CHARS + 50);
        assert_eq!(clip_for_prompt(&text).chars().count(), MAX_PROMPT_TEXT_CHARS);
    }
}
