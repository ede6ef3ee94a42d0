//! Small text helpers for rendering report lines.

/// Default preview length for email bodies and chat messages.
pub const PREVIEW_CHARS: usize = 150;

/// Collapses every run of whitespace (newlines included) into one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns a single-line preview of at most `max_chars` characters.
///
/// An ellipsis is appended only when the text was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = collapse_whitespace(text);
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", flat[..cut].trim_end()),
        None => flat,
    }
}

/// Truncates `text` to at most `max_chars` characters, appending a marker.
pub fn truncate_chars(text: &str, max_chars: usize, marker: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let keep = max_chars.saturating_sub(marker.chars().count());
            let cut = text.char_indices().nth(keep).map_or(cut, |(i, _)| i);
            format!("{}{}", &text[..cut], marker)
        }
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\n\nb\t c  "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_preview_short_text_untouched() {
        assert_eq!(preview("short note", 150), "short note");
    }

    #[test]
    fn test_preview_long_text_cut() {
        let text = "word ".repeat(60);
        let out = preview(&text, 20);
        assert!(out.ends_with("..."));
        assert!(out.chars().count() <= 23);
        assert!(!out.contains('\n'));
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(preview(&text, 4), "éééé...");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 10, "…"), "abcdef");
        let out = truncate_chars("abcdefghij", 5, "…");
        assert_eq!(out, "abcd…");
        assert_eq!(out.chars().count(), 5);
    }
}
