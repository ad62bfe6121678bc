//! Small helpers shared across the pipeline and search backends.

use scraper::Html;

/// Strip markup from an HTML fragment, collapsing runs of whitespace.
///
/// Google News descriptions arrive as small HTML fragments (an anchor per
/// related headline, entity-escaped text). Scoring and display want plain
/// text.
pub fn strip_html(fragment: &str) -> String {
    let document = Html::parse_fragment(fragment);
    let text = document.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes with an ellipsis and byte
/// count indicator appended. Truncation backs up to a UTF-8 boundary so a
/// multi-byte character is never split.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while cut > 0 && !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_removes_tags_and_entities() {
        let html = r#"<a href="https://example.com">이마트&nbsp;가격인상</a>&amp; 물가"#;
        assert_eq!(strip_html(html), "이마트 가격인상 & 물가");
    }

    #[test]
    fn test_strip_html_plain_text_passthrough() {
        assert_eq!(strip_html("plain  text"), "plain text");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_utf8_boundaries() {
        // '가' is three bytes; a cut at 4 must back up to the boundary.
        let s = "가가가가";
        let result = truncate_for_log(s, 4);
        assert!(result.starts_with('가'));
        assert!(!result.starts_with("가가"));
    }
}
