/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Clean a raw completion for posting verbatim: strip markdown code fences,
/// wrapping quotes, and surrounding whitespace, then cap the length.
pub fn sanitize_completion(raw: &str, max_bytes: usize) -> String {
    let text = raw
        .trim()
        .trim_start_matches("```text")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let text = strip_wrapping_quotes(text);
    truncate_to_char_boundary(text, max_bytes).trim_end().to_string()
}

fn strip_wrapping_quotes(s: &str) -> &str {
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”')] {
        if s.len() >= 2 && s.starts_with(open) && s.ends_with(close) {
            return s[open.len_utf8()..s.len() - close.len_utf8()].trim();
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_char_boundary() {
        let text = "Hello 世界";
        let truncated = truncate_to_char_boundary(text, 8);
        assert!(truncated.len() <= 8);
        assert!(text.starts_with(truncated));
    }

    #[test]
    fn test_truncate_within_bounds() {
        assert_eq!(truncate_to_char_boundary("Hello", 100), "Hello");
    }

    #[test]
    fn sanitize_strips_fences_and_quotes() {
        assert_eq!(sanitize_completion("```\nGreat post!\n```", 500), "Great post!");
        assert_eq!(sanitize_completion("\"Great post!\"", 500), "Great post!");
        assert_eq!(sanitize_completion("“Great post!”", 500), "Great post!");
        assert_eq!(sanitize_completion("  Great post!  ", 500), "Great post!");
    }

    #[test]
    fn sanitize_caps_length() {
        let long = "word ".repeat(200);
        let out = sanitize_completion(&long, 64);
        assert!(out.len() <= 64);
    }

    #[test]
    fn sanitize_empty_input_yields_empty() {
        assert_eq!(sanitize_completion("```\n```", 500), "");
        assert_eq!(sanitize_completion("   ", 500), "");
    }
}
