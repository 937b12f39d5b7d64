//! Text escaping for generated HTML and XML.

use std::borrow::Cow;

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    escape(s, false)
}

/// Escape text for XML, including `'`.
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    escape(s, true)
}

fn escape(s: &str, apos: bool) -> Cow<'_, str> {
    let needs_escape = |c: char| matches!(c, '<' | '>' | '&' | '"') || (apos && c == '\'');
    if !s.contains(needs_escape) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' if apos => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}
