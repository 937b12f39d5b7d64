//! Markdown to HTML with heading anchors and a table of contents.

use crate::config::SlugMode;
use crate::utils::slug::slugify_fragment;
use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use rustc_hash::FxHashSet;
use std::borrow::Cow;

/// One heading of a rendered guide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// 1 for `#`, 2 for `##`, ...
    pub level: u8,
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct Rendered {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_GFM
}

/// Render markdown, giving every heading a unique `id`.
///
/// An explicit `{#id}` attribute wins over the generated anchor.
pub fn render(markdown: &str, mode: SlugMode) -> Rendered {
    let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, options()).collect();
    let mut seen = FxHashSet::default();
    let mut toc = Vec::new();

    for i in 0..events.len() {
        let (level, explicit) = match &events[i] {
            Event::Start(Tag::Heading { level, id, .. }) => (*level, id.as_ref().map(|id| id.to_string())),
            _ => continue,
        };

        let title = heading_text(&events[i + 1..]);
        let id = unique_anchor(explicit.unwrap_or_else(|| slugify_fragment(&title, mode)), &mut seen);
        if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[i] {
            *slot = Some(CowStr::from(id.clone()));
        }
        toc.push(TocEntry { level: heading_number(level), id, title });
    }

    let mut html_out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html_out, events.into_iter());
    Rendered { html: html_out, toc }
}

/// Plain text of a heading: everything up to its end tag.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_owned()
}

/// Suffix repeated anchors with `-1`, `-2`, ...
fn unique_anchor(base: String, seen: &mut FxHashSet<String>) -> String {
    let mut id = base.clone();
    let mut n = 1;
    while !seen.insert(id.clone()) {
        id = format!("{base}-{n}");
        n += 1;
    }
    id
}

const fn heading_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Drop top-level MDX `import`/`export` statements outside fenced code.
///
/// A statement continues over following lines until its brackets balance
/// and, for `import`, its `from` clause has been seen.
pub fn strip_mdx_statements(body: &str) -> Cow<'_, str> {
    let mut fence: Option<Fence> = None;
    let mut statement: Option<Statement> = None;
    let mut stripped = false;
    let mut out = String::with_capacity(body.len());

    for line in body.split_inclusive('\n') {
        if let Some(open) = statement.as_mut() {
            open.consume(line);
            if open.is_complete() {
                statement = None;
            }
            continue;
        }

        match fence {
            Some(open) if open.is_closed_by(line) => fence = None,
            Some(_) => {}
            None => fence = Fence::open(line),
        }

        if fence.is_none()
            && let Some(started) = Statement::start(line)
        {
            stripped = true;
            if !started.is_complete() {
                statement = Some(started);
            }
            continue;
        }
        out.push_str(line);
    }

    if stripped { Cow::Owned(out) } else { Cow::Borrowed(body) }
}

/// An open code fence: its marker character and run length.
#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
        let len = trimmed.chars().take_while(|&c| c == marker).count();
        (len >= 3).then_some(Self { marker, len })
    }

    /// Only a run of the same marker, at least as long, with nothing after it.
    fn is_closed_by(self, line: &str) -> bool {
        let trimmed = line.trim();
        let len = trimmed.chars().take_while(|&c| c == self.marker).count();
        len >= self.len && trimmed[len * self.marker.len_utf8()..].trim().is_empty()
    }
}

/// Bracket depth of an ESM statement being skipped.
#[derive(Debug)]
struct Statement {
    depth: i32,
    needs_from: bool,
}

impl Statement {
    fn start(line: &str) -> Option<Self> {
        let mut statement = if let Some(rest) = line.strip_prefix("import ") {
            let rest = rest.trim_start();
            let side_effect = rest.starts_with(['\'', '"']);
            if !side_effect && !rest.starts_with(['{', '*']) && !rest.contains(" from ") {
                return None;
            }
            Self { depth: 0, needs_from: !side_effect }
        } else {
            let rest = line.strip_prefix("export ")?;
            let keyword = ["const ", "default ", "function ", "let "];
            if !keyword.iter().any(|kw| rest.starts_with(kw)) {
                return None;
            }
            Self { depth: 0, needs_from: false }
        };
        statement.consume(line);
        Some(statement)
    }

    fn consume(&mut self, line: &str) {
        let mut quote = None;
        for c in line.chars() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '\'' | '"' | '`') => quote = Some(c),
                (None, '{' | '[' | '(') => self.depth += 1,
                (None, '}' | ']' | ')') => self.depth -= 1,
                _ => {}
            }
        }
        if self.needs_from && (line.contains(" from ") || line.trim_start().starts_with("from ")) {
            self.needs_from = false;
        }
    }

    fn is_complete(&self) -> bool {
        self.depth <= 0 && !self.needs_from
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_headings_with_anchors() {
        let rendered = render("# NestJS 소개\n\n## 모듈 구조\n\ntext\n", SlugMode::Safe);

        assert!(rendered.html.contains(r#"<h1 id="nestjs-소개">NestJS 소개</h1>"#));
        assert!(rendered.html.contains(r#"<h2 id="모듈-구조">모듈 구조</h2>"#));
        assert_eq!(
            rendered.toc,
            vec![
                TocEntry { level: 1, id: "nestjs-소개".into(), title: "NestJS 소개".into() },
                TocEntry { level: 2, id: "모듈-구조".into(), title: "모듈 구조".into() },
            ]
        );
    }

    #[test]
    fn test_duplicate_headings_get_suffix() {
        let rendered = render("## 예제\n\n## 예제\n\n## 예제\n", SlugMode::Safe);
        let ids: Vec<_> = rendered.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["예제", "예제-1", "예제-2"]);
    }

    #[test]
    fn test_explicit_heading_id() {
        let rendered = render("## Setup {#install}\n", SlugMode::Safe);
        assert_eq!(rendered.toc[0].id, "install");
        assert_eq!(rendered.toc[0].title, "Setup");
        assert!(rendered.html.contains(r#"id="install""#));
    }

    #[test]
    fn test_heading_with_inline_code() {
        let rendered = render("## `@Module` 데코레이터\n", SlugMode::On);
        assert_eq!(rendered.toc[0].title, "@Module 데코레이터");
        assert!(rendered.toc[0].id.starts_with("module"));
    }

    #[test]
    fn test_gfm_extensions() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~\n\n- [x] done\n";
        let html = render(md, SlugMode::Safe).html;
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains(r#"type="checkbox""#));
    }

    #[test]
    fn test_code_block_escaped() {
        let html = render("```ts\nconst a = <T>() => 1;\n```\n", SlugMode::Safe).html;
        assert!(html.contains("language-ts"));
        assert!(html.contains("&lt;T&gt;"));
    }

    #[test]
    fn test_strip_mdx_statements() {
        let body = "import Callout from '../components/Callout'\nexport const meta = {}\n\n# Title\n\n```js\nimport x from 'y'\n```\n";
        let stripped = strip_mdx_statements(body);
        assert_eq!(stripped, "\n# Title\n\n```js\nimport x from 'y'\n```\n");
    }

    #[test]
    fn test_strip_mdx_keeps_prose() {
        let body = "import 문은 파일 맨 위에 둡니다.\n";
        assert!(matches!(strip_mdx_statements(body), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_multiline_export() {
        let body = "export const meta = {\n  author: 'jsy',\n  tags: ['nestjs'],\n}\n\n# Title\n";
        assert_eq!(strip_mdx_statements(body), "\n# Title\n");

        let rendered = render(&strip_mdx_statements(body), SlugMode::Safe);
        assert!(!rendered.html.contains("author"));
    }

    #[test]
    fn test_strip_multiline_import() {
        let body = "import {\n  Callout,\n  Tabs,\n} from '@/components'\n\n본문\n";
        assert_eq!(strip_mdx_statements(body), "\n본문\n");
    }

    #[test]
    fn test_strip_respects_fence_marker() {
        let body = "~~~md\n```\nimport x from 'y'\n~~~\nimport Foo from './foo'\n";
        assert_eq!(strip_mdx_statements(body), "~~~md\n```\nimport x from 'y'\n~~~\n");
    }
}
