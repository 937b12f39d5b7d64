//! Index-style pages: home, guides overview and the not-found page.

use super::{
    layout::{PageHead, render_document},
    sidebar::{EMPTY_TEXT, SidebarState, render_sidebar},
};
use crate::{
    config::SiteConfig,
    content::{CategoryIndex, GuideMeta},
    utils::html::escape_html,
};
use std::fmt::Write as _;

/// Guides shown under "최근 가이드" on the home page.
const RECENT_GUIDES: usize = 6;

pub const NOT_FOUND_TITLE: &str = "페이지를 찾을 수 없습니다";

/// Site root: hero, most recent guides and a link to the overview.
pub fn render_home(config: &SiteConfig, categories: &CategoryIndex<'_>) -> String {
    let mut recent: Vec<&GuideMeta> = categories.iter().flat_map(|(_, guides)| guides.iter().copied()).collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(RECENT_GUIDES);

    let mut body = String::with_capacity(2048);
    let _ = write!(
        body,
        r#"<main class="home"><section class="hero"><h1>{title}</h1><p>{description}</p><a class="button" href="{guides}">가이드 보기</a></section>"#,
        title = escape_html(&config.base.title),
        description = escape_html(&config.base.description),
        guides = escape_html(&config.guides_index_path()),
    );

    body.push_str(r#"<section class="recent"><h2>최근 가이드</h2>"#);
    if recent.is_empty() {
        let _ = write!(body, r#"<p class="empty">{EMPTY_TEXT}</p>"#);
    } else {
        body.push_str(r#"<ul class="guide-cards">"#);
        for guide in recent {
            guide_card(&mut body, config, guide);
        }
        body.push_str("</ul>");
    }
    body.push_str("</section></main>");

    let head = PageHead::website(None, config.base.description.clone(), "/");
    render_document(config, &head, &body)
}

/// `/guides`: every category with its guides, next to the sidebar.
pub fn render_guides_overview(config: &SiteConfig, categories: &CategoryIndex<'_>) -> String {
    let path = config.guides_index_path();
    let sidebar = render_sidebar(config, categories, &SidebarState::new(None));

    let mut body = String::with_capacity(sidebar.len() + 4096);
    body.push_str(r#"<div class="guide-layout">"#);
    body.push_str(&sidebar);
    let _ = write!(
        body,
        r#"<main class="guide-main overview"><h1>전체 가이드</h1><p class="overview-count">{} 개 카테고리 · {} 개 가이드</p>"#,
        categories.len(),
        categories.guide_count()
    );

    if categories.is_empty() {
        let _ = write!(body, r#"<p class="empty">{EMPTY_TEXT}</p>"#);
    }
    for (category, guides) in categories.iter() {
        let _ = write!(
            body,
            r#"<section class="overview-category" id="{id}"><h2>{name}</h2><ul class="guide-cards">"#,
            id = escape_html(category),
            name = escape_html(&category.to_uppercase()),
        );
        for guide in guides {
            guide_card(&mut body, config, guide);
        }
        body.push_str("</ul></section>");
    }
    body.push_str("</main></div>");

    let head = PageHead::website(Some("전체 가이드".into()), config.base.description.clone(), path);
    render_document(config, &head, &body)
}

/// `404.html`, served by the dev server and by static hosts for unknown routes.
pub fn render_not_found(config: &SiteConfig) -> String {
    let body = format!(
        r#"<main class="not-found"><h1>404</h1><p>{NOT_FOUND_TITLE}</p><p>요청하신 가이드가 존재하지 않거나 이동되었습니다.</p><p><a href="/">홈으로</a> · <a href="{}">가이드 목록</a></p></main>"#,
        escape_html(&config.guides_index_path())
    );
    let head = PageHead {
        indexable: false,
        ..PageHead::website(Some(NOT_FOUND_TITLE.into()), NOT_FOUND_TITLE, "/404")
    };
    render_document(config, &head, &body)
}

fn guide_card(html: &mut String, config: &SiteConfig, guide: &GuideMeta) {
    let _ = write!(
        html,
        r#"<li class="guide-card"><a href="{href}"><span class="guide-card-category">{category}</span><strong>{title}</strong>"#,
        href = escape_html(&config.guide_path(&guide.category, &guide.slug)),
        category = escape_html(&guide.category.to_uppercase()),
        title = escape_html(&guide.title),
    );
    if !guide.description.is_empty() {
        let _ = write!(html, "<p>{}</p>", escape_html(&guide.description));
    }
    let _ = write!(
        html,
        r#"<time datetime="{}">{}</time></a></li>"#,
        guide.date.to_iso8601(),
        guide.date.to_korean()
    );
}
