//! Text escaping with `mysql_real_escape_string` rules.

/// Escape `text` for inclusion in a quoted `MySQL` string literal.
///
/// Backslash-escapes NUL, newline, carriage return, backslash, both quote
/// characters and Ctrl-Z. Assumes a UTF-8 (or other ASCII-compatible)
/// connection charset.
#[must_use]
pub fn escape_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\0' => escaped.push_str("\\0"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\x1a' => escaped.push_str("\\Z"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_escape_quotes_and_backslashes() {
        assert_eq!(escape_string(r#"O'Brien "x" \ y"#), r#"O\'Brien \"x\" \\ y"#);
    }

    #[test]
    fn should_escape_control_characters() {
        assert_eq!(escape_string("a\0b\nc\rd\x1ae"), "a\\0b\\nc\\rd\\Ze");
    }

    #[test]
    fn should_leave_plain_text_untouched() {
        assert_eq!(escape_string("grüße, 世界"), "grüße, 世界");
        assert_eq!(escape_string(""), "");
    }
}
