/// Strips control characters (keeping `\n`/`\t`), replaces the Unicode line
/// and paragraph separators with spaces, collapses whitespace runs, and
/// trims. Applied to every piece of text that reaches a transcript segment.
pub fn sanitize_text(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\u{2028}' | '\u{2029}' => cleaned.push(' '),
            c if (c as u32) < 0x20 && c != '\n' && c != '\t' => {}
            c => cleaned.push(c),
        }
    }

    let collapsed: String = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_characters() {
        assert_eq!(sanitize_text("hi\x00\x01there"), "hithere");
    }

    #[test]
    fn keeps_newline_and_tab_but_collapses_whitespace() {
        assert_eq!(sanitize_text("a\nb\tc   d"), "a b c d");
    }

    #[test]
    fn replaces_line_and_paragraph_separators() {
        assert_eq!(sanitize_text("a\u{2028}b\u{2029}c"), "a b c");
    }

    #[test]
    fn trims_leading_and_trailing_whitespace() {
        assert_eq!(sanitize_text("  hello  "), "hello");
    }
}
