//! Slugification for heading anchors and URL segments.

use crate::config::SlugMode;

/// Characters forbidden in URL segments and fragments
const FORBIDDEN_CHARS: &[char] = &[
    '<', '>', ':', '|', '?', '*', '#', '\\', '/', '(', ')', '[', ']', '"', '\'', '`', '%', '\t',
    '\r', '\n',
];

/// Fallback anchor when the heading text slugifies to nothing
const EMPTY_FRAGMENT: &str = "section";

/// Convert heading text to an anchor id according to `mode`.
pub fn slugify_fragment(text: &str, mode: SlugMode) -> String {
    let slug = match mode {
        SlugMode::Safe => sanitize_text(text),
        SlugMode::On => slugify_ascii(text),
        SlugMode::No => text.trim().to_owned(),
    };
    if slug.is_empty() { EMPTY_FRAGMENT.to_owned() } else { slug }
}

/// Whether `segment` can be used verbatim as one `/`-separated URL segment.
///
/// Category directory names and file stems become URL segments unchanged, so
/// they must not contain whitespace or characters reserved in URLs.
pub fn is_url_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.starts_with('.')
        && !segment.chars().any(|c| c.is_whitespace() || FORBIDDEN_CHARS.contains(&c))
}

/// Remove forbidden characters and replace whitespace with `-`.
///
/// Non-ASCII text (e.g. hangul) is kept as is.
fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.trim().chars().filter(|c| !FORBIDDEN_CHARS.contains(c)) {
        if c.is_whitespace() {
            if !out.ends_with('-') {
                out.push('-');
            }
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out.trim_matches('-').to_owned()
}

/// Transliterate to ASCII and keep only `[a-z0-9]` separated by single dashes.
fn slugify_ascii(text: &str) -> String {
    let ascii = deunicode::deunicode(text);
    let mut out = String::with_capacity(ascii.len());
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_owned()
}
