pub mod extraction;

pub use extraction::extract_contract_text;

/// Removes a single wrapping fenced code block, if present.
///
/// The model occasionally wraps an entire markdown or JSON artifact in
/// triple-backtick fences; downstream consumers (email body, JSON parsing)
/// need the bare content. Exactly one leading and one trailing fence line are
/// removed; fences inside the body are left alone.
pub fn strip_code_fence(text: &str) -> String {
    let mut trimmed = text.trim();
    if trimmed.starts_with("```") {
        trimmed = match trimmed.find('\n') {
            Some(idx) => &trimmed[idx + 1..],
            None => "",
        };
    }
    if trimmed.ends_with("```") {
        trimmed = match trimmed.rfind('\n') {
            Some(idx) => &trimmed[..idx],
            None => "",
        };
    }
    trimmed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_plain_fences() {
        let fenced = "```\n# Summary\n\nBody text.\n```";
        assert_eq!(strip_code_fence(fenced), "# Summary\n\nBody text.");
    }

    #[test]
    fn strips_language_tagged_fence() {
        let fenced = "```json\n[{\"summary\": \"Post\"}]\n```";
        assert_eq!(strip_code_fence(fenced), "[{\"summary\": \"Post\"}]");
    }

    #[test]
    fn leaves_unfenced_text_untouched() {
        let plain = "# Summary\n\nNo fences here.";
        assert_eq!(strip_code_fence(plain), plain);
    }

    #[test]
    fn keeps_interior_fences() {
        let text = "Intro\n```\ncode\n```\nOutro";
        assert_eq!(strip_code_fence(text), text);
    }
}
