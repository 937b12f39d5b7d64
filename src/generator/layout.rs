//! Document shell shared by every generated page: `<head>` metadata,
//! site header and footer.

use crate::{config::SiteConfig, utils::date::GuideDate, utils::html::escape_html};
use std::fmt::Write as _;

pub const STYLESHEET: &str = include_str!("../embed/guidepress.css");
pub const SCRIPT: &str = include_str!("../embed/guidepress.js");

/// Output names of the embedded stylesheet and script, relative to the site root.
pub const STYLESHEET_PATH: &str = "guidepress.css";
pub const SCRIPT_PATH: &str = "guidepress.js";

/// OpenGraph flavour of a page.
#[derive(Debug, Clone)]
pub enum PageKind {
    Website,
    Article { published: GuideDate, section: String },
}

/// Everything the `<head>` needs to know about one page.
#[derive(Debug, Clone)]
pub struct PageHead {
    /// Page title without the site suffix. `None` uses the bare site title.
    pub title: Option<String>,
    pub description: String,
    /// Site-relative URL, e.g. `/guides/nestjs/intro`
    pub path: String,
    pub kind: PageKind,
    /// Pre-rendered `<script type="application/ld+json">` element
    pub json_ld: Option<String>,
    /// 404 pages must not be indexed or given a canonical URL
    pub indexable: bool,
}

impl PageHead {
    pub fn website(title: Option<String>, description: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title,
            description: description.into(),
            path: path.into(),
            kind: PageKind::Website,
            json_ld: None,
            indexable: true,
        }
    }

    /// `<title>` content: `"{page} | {site}"`, or just the site title.
    pub fn full_title(&self, config: &SiteConfig) -> String {
        match &self.title {
            Some(title) => format!("{title} | {}", config.base.title),
            None => config.base.title.clone(),
        }
    }
}

/// Wrap `body` in a complete HTML document.
pub fn render_document(config: &SiteConfig, head: &PageHead, body: &str) -> String {
    let base = &config.base;
    let title = head.full_title(config);
    let url = config.absolute_url(&head.path);
    let og_type = match head.kind {
        PageKind::Website => "website",
        PageKind::Article { .. } => "article",
    };

    let mut html = String::with_capacity(body.len() + 4096);
    let _ = write!(
        html,
        r#"<!DOCTYPE html><html lang="{lang}"><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>{title}</title><meta name="description" content="{description}">"#,
        lang = escape_html(&base.language),
        title = escape_html(&title),
        description = escape_html(&head.description),
    );

    if head.indexable {
        let _ = write!(html, r#"<link rel="canonical" href="{}">"#, escape_html(&url));
    } else {
        html.push_str(r#"<meta name="robots" content="noindex">"#);
    }

    meta_property(&mut html, "og:title", head.title.as_deref().unwrap_or(&base.title));
    meta_property(&mut html, "og:description", &head.description);
    meta_property(&mut html, "og:url", &url);
    meta_property(&mut html, "og:site_name", &base.title);
    meta_property(&mut html, "og:locale", &base.locale);
    meta_property(&mut html, "og:type", og_type);
    if let PageKind::Article { published, section } = &head.kind {
        meta_property(&mut html, "article:published_time", &published.to_iso8601());
        meta_property(&mut html, "article:section", section);
        meta_property(&mut html, "article:author", &base.author.name);
    }
    meta_name(&mut html, "twitter:card", "summary_large_image");
    meta_name(&mut html, "twitter:title", head.title.as_deref().unwrap_or(&base.title));
    meta_name(&mut html, "twitter:description", &head.description);

    if let Some(token) = &base.verification.google {
        meta_name(&mut html, "google-site-verification", token);
    }
    if let Some(token) = &base.verification.naver {
        meta_name(&mut html, "naver-site-verification", token);
    }

    if config.build.rss.enable {
        let _ = write!(
            html,
            r#"<link rel="alternate" type="application/rss+xml" title="{}" href="{}">"#,
            escape_html(&base.title),
            escape_html(&config.rss_url_path())
        );
    }
    let _ = write!(
        html,
        r#"<link rel="icon" href="{}"><link rel="stylesheet" href="/{STYLESHEET_PATH}">"#,
        escape_html(&base.favicon)
    );
    if let Some(json_ld) = &head.json_ld {
        html.push_str(json_ld);
    }
    html.push_str("</head><body>");

    site_header(&mut html, config);
    html.push_str(body);
    site_footer(&mut html, config);

    let _ = write!(html, r#"<script src="/{SCRIPT_PATH}" defer></script></body></html>"#);
    html
}

fn site_header(html: &mut String, config: &SiteConfig) {
    let _ = write!(
        html,
        r#"<header class="site-header"><a class="site-title" href="/"><img src="{logo}" alt="" width="28" height="28"><span>{title}</span></a><nav class="site-nav"><a href="{guides}">가이드</a>"#,
        logo = escape_html(&config.base.logo),
        title = escape_html(&config.base.title),
        guides = escape_html(&config.guides_index_path()),
    );
    if config.build.rss.enable {
        let _ = write!(html, r#"<a href="{}">RSS</a>"#, escape_html(&config.rss_url_path()));
    }
    html.push_str("</nav></header>");
}

fn site_footer(html: &mut String, config: &SiteConfig) {
    html.push_str(r#"<footer class="site-footer">"#);
    if !config.base.copyright.is_empty() {
        let _ = write!(html, "<p>{}</p>", escape_html(&config.base.copyright));
    }
    html.push_str("</footer>");
}

fn meta_property(html: &mut String, property: &str, content: &str) {
    let _ = write!(html, r#"<meta property="{property}" content="{}">"#, escape_html(content));
}

fn meta_name(html: &mut String, name: &str, content: &str) {
    let _ = write!(html, r#"<meta name="{name}" content="{}">"#, escape_html(content));
}
