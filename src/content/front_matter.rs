//! Front-matter extraction.
//!
//! A guide starts with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: NestJS 소개
//! description: NestJS의 핵심 개념
//! date: 2025-01-15
//! ---
//! # 본문
//! ```

use super::ContentError;
use serde::Deserialize;

/// Raw front-matter fields. Validation happens in [`super::GuideMeta`].
///
/// Unknown keys are ignored so authors can keep editor-specific metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

/// A source file split into metadata and markdown body.
#[derive(Debug)]
pub struct Document<'a> {
    pub front_matter: FrontMatter,
    pub body: &'a str,
}

/// Parse a source file. A file without a leading `---` line has empty front matter.
pub fn parse(source: &str) -> Result<Document<'_>, ContentError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some((yaml, body)) = split(source)? else {
        return Ok(Document { front_matter: FrontMatter::default(), body: source });
    };

    let front_matter = if yaml.trim().is_empty() {
        FrontMatter::default()
    } else {
        serde_yaml::from_str(yaml)?
    };
    Ok(Document { front_matter, body })
}

/// Split off the `---` fenced block. `...` also closes it, as in YAML.
fn split(source: &str) -> Result<Option<(&str, &str)>, ContentError> {
    let Some(rest) = source.strip_prefix("---") else {
        return Ok(None);
    };
    let (opening, rest) = rest.split_once('\n').unwrap_or((rest, ""));
    if !opening.trim().is_empty() {
        // "----" or "--- text" is a thematic break, not front matter
        return Ok(None);
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let marker = line.trim_end();
        if marker == "---" || marker == "..." {
            return Ok(Some((&rest[..offset], &rest[offset + line.len()..])));
        }
        offset += line.len();
    }
    Err(ContentError::Unterminated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_front_matter() {
        let source = "---\ntitle: NestJS 소개\ndescription: 핵심 개념\ndate: 2025-01-15\ncategory: nestjs\n---\n# 본문\n";
        let doc = parse(source).unwrap();

        assert_eq!(doc.front_matter.title.as_deref(), Some("NestJS 소개"));
        assert_eq!(doc.front_matter.description.as_deref(), Some("핵심 개념"));
        assert_eq!(doc.front_matter.date.as_deref(), Some("2025-01-15"));
        assert_eq!(doc.front_matter.category.as_deref(), Some("nestjs"));
        assert!(!doc.front_matter.draft);
        assert_eq!(doc.body, "# 본문\n");
    }

    #[test]
    fn test_parse_without_front_matter() {
        let doc = parse("# Just markdown\n").unwrap();
        assert!(doc.front_matter.title.is_none());
        assert_eq!(doc.body, "# Just markdown\n");
    }

    #[test]
    fn test_thematic_break_is_not_front_matter() {
        let doc = parse("----\ntext\n").unwrap();
        assert!(doc.front_matter.title.is_none());
        assert_eq!(doc.body, "----\ntext\n");
    }

    #[test]
    fn test_crlf_and_bom() {
        let source = "\u{feff}---\r\ntitle: Windows\r\n---\r\nbody";
        let doc = parse(source).unwrap();
        assert_eq!(doc.front_matter.title.as_deref(), Some("Windows"));
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_empty_block() {
        let doc = parse("---\n---\nbody").unwrap();
        assert!(doc.front_matter.title.is_none());
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_dots_close_block() {
        let doc = parse("---\ntitle: A\n...\nbody").unwrap();
        assert_eq!(doc.front_matter.title.as_deref(), Some("A"));
    }

    #[test]
    fn test_unterminated_block() {
        assert!(matches!(parse("---\ntitle: A\n"), Err(ContentError::Unterminated)));
        assert!(matches!(parse("---"), Err(ContentError::Unterminated)));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = parse("---\ntitle: [unclosed\n---\n");
        assert!(matches!(result, Err(ContentError::FrontMatter(_))));
    }

    #[test]
    fn test_unknown_keys_ignored_and_draft() {
        let doc = parse("---\ntitle: A\ntags: [x, y]\ndraft: true\n---\n").unwrap();
        assert!(doc.front_matter.draft);
        assert_eq!(doc.body, "");
    }
}
