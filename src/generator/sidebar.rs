//! Guide sidebar: the category -> guides navigation shown beside every guide.
//!
//! The sidebar is rendered statically, closed, with the current route passed
//! in explicitly. Opening, closing and centring the active entry happen in
//! the browser (`guidepress.js`), driven by the `data-*` hooks emitted here.

use crate::{config::SiteConfig, content::CategoryIndex, utils::html::escape_html};
use std::fmt::Write as _;

pub const HEADING: &str = "목차";
pub const EMPTY_TEXT: &str = "가이드 준비 중...";
pub const OPEN_LABEL: &str = "목차 열기";
pub const CLOSE_LABEL: &str = "목차 닫기";

/// The route whose entry is highlighted. Every page load starts with the drawer closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidebarState {
    active: Option<String>,
}

impl SidebarState {
    pub fn new(active: Option<&str>) -> Self {
        Self { active: active.map(str::to_owned) }
    }

    pub fn is_active(&self, href: &str) -> bool {
        self.active.as_deref() == Some(href)
    }
}

/// Render the toggle button, overlay and sidebar for `state`.
pub fn render_sidebar(config: &SiteConfig, categories: &CategoryIndex<'_>, state: &SidebarState) -> String {
    let mut html = String::with_capacity(1024 + categories.guide_count() * 160);

    let _ = write!(
        html,
        r#"<button type="button" class="sidebar-toggle" data-sidebar-toggle aria-controls="guide-sidebar" aria-expanded="false" aria-label="{OPEN_LABEL}" data-label-open="{OPEN_LABEL}" data-label-close="{CLOSE_LABEL}"><span aria-hidden="true">☰</span></button>"#
    );
    html.push_str(r#"<div class="sidebar-overlay" data-sidebar-overlay hidden></div>"#);
    let _ = write!(
        html,
        r#"<aside id="guide-sidebar" class="sidebar" data-sidebar><nav aria-label="{HEADING}"><h2 class="sidebar-heading">{HEADING}</h2>"#
    );

    if categories.is_empty() {
        let _ = write!(html, r#"<p class="sidebar-empty">{EMPTY_TEXT}</p>"#);
    }

    for (category, guides) in categories.iter() {
        let _ = write!(
            html,
            r#"<div class="sidebar-category"><h3 class="sidebar-category-title">{}</h3><ul>"#,
            escape_html(&category.to_uppercase())
        );
        for guide in guides {
            let href = config.guide_path(&guide.category, &guide.slug);
            let (class, current) = if state.is_active(&href) {
                ("sidebar-link is-active", r#" aria-current="page" data-active"#)
            } else {
                ("sidebar-link", "")
            };
            let _ = write!(
                html,
                r#"<li><a class="{class}"{current} href="{}">{}</a></li>"#,
                escape_html(&href),
                escape_html(&guide.title)
            );
        }
        html.push_str("</ul></div>");
    }

    html.push_str("</nav></aside>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{content::GuideMeta, utils::date::GuideDate};

    fn meta(category: &str, slug: &str, title: &str) -> GuideMeta {
        GuideMeta {
            title: title.into(),
            description: String::new(),
            date: GuideDate::from_ymd(2025, 1, 15),
            category: category.into(),
            slug: slug.into(),
        }
    }

    fn sample() -> Vec<GuideMeta> {
        vec![
            meta("nestjs", "intro", "NestJS 소개"),
            meta("nestjs", "modules", "모듈"),
            meta("drizzle", "setup", "Drizzle <설정>"),
        ]
    }

    #[test]
    fn test_script_drives_drawer_hooks() {
        use crate::generator::layout::SCRIPT;

        for hook in ["[data-sidebar]", "[data-sidebar-toggle]", "[data-sidebar-overlay]", "[data-active]"] {
            assert!(SCRIPT.contains(hook), "script does not use {hook}");
        }
        assert!(SCRIPT.contains("labelClose") && SCRIPT.contains("labelOpen"));
        assert!(SCRIPT.contains(r#"event.key === "Escape""#));
        assert!(SCRIPT.contains("sidebar.clientHeight / 2"));
    }

    #[test]
    fn test_render_groups_by_category_in_order() {
        let guides = sample();
        let categories = CategoryIndex::from_guides(&guides);
        let html = render_sidebar(&SiteConfig::default(), &categories, &SidebarState::default());

        let nestjs = html.find(">NESTJS<").unwrap();
        let drizzle = html.find(">DRIZZLE<").unwrap();
        assert!(nestjs < drizzle);
        assert!(html.contains(r#"href="/guides/nestjs/intro">NestJS 소개</a>"#));
        assert!(html.contains("Drizzle &lt;설정&gt;"));
        assert!(!html.contains("is-active"));
        assert!(html.contains(r#"<h2 class="sidebar-heading">목차</h2>"#));
    }

    #[test]
    fn test_render_highlights_only_active_route() {
        let guides = sample();
        let categories = CategoryIndex::from_guides(&guides);
        let state = SidebarState::new(Some("/guides/nestjs/modules"));
        let html = render_sidebar(&SiteConfig::default(), &categories, &state);

        assert_eq!(html.matches("is-active").count(), 1);
        assert!(html.contains(
            r#"<a class="sidebar-link is-active" aria-current="page" data-active href="/guides/nestjs/modules">"#
        ));
    }

    #[test]
    fn test_render_starts_closed() {
        let html = render_sidebar(&SiteConfig::default(), &CategoryIndex::default(), &SidebarState::default());
        assert!(html.contains(r#"aria-expanded="false" aria-label="목차 열기""#));
        assert!(html.contains(r#"data-label-close="목차 닫기""#));
        assert!(html.contains("data-sidebar-overlay hidden"));
        assert!(html.contains(r#"class="sidebar" data-sidebar"#));
    }

    #[test]
    fn test_render_empty_state() {
        let html = render_sidebar(&SiteConfig::default(), &CategoryIndex::default(), &SidebarState::default());
        assert!(html.contains("가이드 준비 중..."));
    }
}
