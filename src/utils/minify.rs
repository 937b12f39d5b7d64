//! Output minification for generated HTML and XML documents.
//!
//! Disabled entirely when `[build.minify]` is false.

use crate::config::SiteConfig;
use std::borrow::Cow;

pub enum MinifyType<'a> {
    Html(&'a [u8]),
    Xml(&'a [u8]),
}

/// Minify content if the site enables it.
///
/// Returns the input untouched (`Cow::Borrowed`) when minification is off.
pub fn minify<'a>(content: MinifyType<'a>, config: &SiteConfig) -> Cow<'a, [u8]> {
    match content {
        MinifyType::Html(html) if config.build.minify => Cow::Owned(minify_html_bytes(html)),
        MinifyType::Xml(xml) if config.build.minify => Cow::Owned(minify_xml_bytes(xml)),
        MinifyType::Html(bytes) | MinifyType::Xml(bytes) => Cow::Borrowed(bytes),
    }
}

fn minify_html_bytes(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    minify_html::minify(html, &cfg)
}

/// Drop whitespace-only runs between tags. Text nodes are copied unchanged.
fn minify_xml_bytes(xml: &[u8]) -> Vec<u8> {
    let text = String::from_utf8_lossy(xml);
    let mut out = String::with_capacity(text.len());
    let mut rest = text.trim();

    while let Some(end) = rest.find('>') {
        out.push_str(&rest[..=end]);
        rest = &rest[end + 1..];
        let next = rest.trim_start();
        if next.starts_with('<') {
            rest = next;
        }
    }
    out.push_str(rest);
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_minify(enabled: bool) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.build.minify = enabled;
        config
    }

    #[test]
    fn test_minify_html_shrinks_and_keeps_text() {
        let html = "<html>\n  <body>\n    <p>NestJS 소개</p>\n  </body>\n</html>".as_bytes();
        let result = minify(MinifyType::Html(html), &config_with_minify(true));
        let text = String::from_utf8_lossy(&result);

        assert!(result.len() < html.len());
        assert!(text.contains("<p>NestJS 소개</p>"));
    }

    #[test]
    fn test_minify_disabled_borrows() {
        let html = b"<html>\n  <body>\n  </body>\n</html>";
        let result = minify(MinifyType::Html(html), &config_with_minify(false));
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(&*result, html);
    }

    #[test]
    fn test_minify_xml_sitemap() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">

  <url>
    <loc>https://example.com/guides</loc>
  </url>
</urlset>"#;
        let result = minify(MinifyType::Xml(xml), &config_with_minify(true));
        assert_eq!(
            &*result,
            br#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>https://example.com/guides</loc></url></urlset>"#
        );
    }

    #[test]
    fn test_minify_xml_keeps_multiline_text() {
        let xml = "<rss>\n  <item>\n    <description>첫 줄\n둘째 줄</description>\n  </item>\n</rss>\n";
        let result = minify(MinifyType::Xml(xml.as_bytes()), &config_with_minify(true));
        assert_eq!(
            String::from_utf8_lossy(&result),
            "<rss><item><description>첫 줄\n둘째 줄</description></item></rss>"
        );
    }
}
