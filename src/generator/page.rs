//! Guide article pages.

use super::{
    jsonld,
    layout::{PageHead, PageKind, render_document},
    sidebar::{SidebarState, render_sidebar},
};
use crate::{
    config::SiteConfig,
    content::{CategoryIndex, Guide, markdown::TocEntry},
    utils::html::escape_html,
};
use std::fmt::Write as _;

/// Headings deeper than this are left out of the on-page table of contents.
const TOC_MAX_LEVEL: u8 = 3;

/// Render one guide: sidebar with the guide highlighted, header, overview box,
/// on-page contents and the markdown body.
pub fn render_guide_page(config: &SiteConfig, guide: &Guide, categories: &CategoryIndex<'_>) -> String {
    let meta = &guide.meta;
    let path = config.guide_path(&meta.category, &meta.slug);
    let sidebar = render_sidebar(config, categories, &SidebarState::new(Some(&path)));

    let mut body = String::with_capacity(guide.html.len() + sidebar.len() + 2048);
    body.push_str(r#"<div class="guide-layout">"#);
    body.push_str(&sidebar);
    let _ = write!(
        body,
        r#"<main class="guide-main"><article class="guide"><header class="guide-header"><p class="guide-category">{category}</p><h1 class="guide-title">{title}</h1><p class="guide-date"><time datetime="{iso}">{date}</time> 수정됨</p></header>"#,
        category = escape_html(&meta.category.to_uppercase()),
        title = escape_html(&meta.title),
        iso = meta.date.to_iso8601(),
        date = meta.date.to_korean(),
    );

    if !meta.description.is_empty() {
        let _ = write!(
            body,
            r#"<section class="guide-overview"><h2>📋 개요</h2><p>{}</p></section>"#,
            escape_html(&meta.description)
        );
    }

    render_toc(&mut body, &guide.toc);

    let _ = write!(body, r#"<div class="guide-content">{}</div></article></main></div>"#, guide.html);

    let head = PageHead {
        kind: PageKind::Article { published: meta.date, section: meta.category.clone() },
        json_ld: Some(jsonld::script_tag(&jsonld::tech_article(config, meta))),
        ..PageHead::website(Some(meta.title.clone()), meta.description.clone(), path)
    };
    render_document(config, &head, &body)
}

fn render_toc(html: &mut String, toc: &[TocEntry]) {
    let entries: Vec<_> = toc.iter().filter(|e| (2..=TOC_MAX_LEVEL).contains(&e.level)).collect();
    if entries.is_empty() {
        return;
    }

    html.push_str(r#"<nav class="guide-toc" aria-label="이 페이지의 내용"><p class="guide-toc-title">이 페이지의 내용</p><ul>"#);
    for entry in entries {
        let _ = write!(
            html,
            r##"<li class="toc-level-{}"><a href="#{}">{}</a></li>"##,
            entry.level,
            escape_html(&entry.id),
            escape_html(&entry.title)
        );
    }
    html.push_str("</ul></nav>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::SlugMode,
        content::{GuideMeta, markdown},
        utils::date::GuideDate,
    };

    fn make_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.base.title = "한국어 기술 가이드".into();
        config.base.url = Some("https://jsy8481.github.io".into());
        config
    }

    fn make_guide(description: &str, body: &str) -> Guide {
        let rendered = markdown::render(body, SlugMode::Safe);
        Guide {
            meta: GuideMeta {
                title: "NestJS 소개".into(),
                description: description.into(),
                date: GuideDate::from_ymd(2025, 1, 15),
                category: "nestjs".into(),
                slug: "intro".into(),
            },
            html: rendered.html,
            toc: rendered.toc,
        }
    }

    #[test]
    fn test_guide_page_content() {
        let config = make_config();
        let guide = make_guide("NestJS의 핵심 개념", "## 설치\n\n### CLI\n\n#### 세부\n\n본문입니다.\n");
        let categories = CategoryIndex::from_guides([&guide.meta]);
        let html = render_guide_page(&config, &guide, &categories);

        assert!(html.contains("<title>NestJS 소개 | 한국어 기술 가이드</title>"));
        assert!(html.contains(r#"<h1 class="guide-title">NestJS 소개</h1>"#));
        assert!(html.contains("2025년 1월 15일</time> 수정됨"));
        assert!(html.contains("📋 개요"));
        assert!(html.contains("본문입니다."));
        assert!(html.contains(r##"<a href="#설치">설치</a>"##));
        assert!(html.contains(r##"<li class="toc-level-3"><a href="#cli">CLI</a></li>"##));
        assert!(!html.contains(r##"<a href="#세부">"##));
        assert!(html.contains(r#"class="sidebar-link is-active" aria-current="page" data-active href="/guides/nestjs/intro""#));
        assert!(html.contains(r#""@type":"TechArticle""#));
    }

    #[test]
    fn test_guide_page_without_description_or_headings() {
        let config = make_config();
        let guide = make_guide("", "본문만 있습니다.\n");
        let categories = CategoryIndex::from_guides([&guide.meta]);
        let html = render_guide_page(&config, &guide, &categories);

        assert!(!html.contains("📋 개요"));
        assert!(!html.contains("guide-toc"));
    }
}
