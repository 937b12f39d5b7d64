//! Sitemap generation.
//!
//! Two static entries (site root and the guides overview) followed by one
//! entry per guide.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/guides/nestjs/intro</loc>
//!     <lastmod>2025-01-15T00:00:00.000Z</lastmod>
//!     <changefreq>weekly</changefreq>
//!     <priority>0.8</priority>
//!   </url>
//! </urlset>
//! ```

use crate::{
    config::SiteConfig,
    content::GuideIndex,
    log,
    utils::{
        date::GuideDate,
        html::escape_xml,
        minify::{MinifyType, minify},
    },
};
use anyhow::{Context, Result};
use std::{fmt::Write as _, fs};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Build sitemap if enabled in config.
pub fn build_sitemap(config: &SiteConfig, index: &GuideIndex) -> Result<()> {
    if config.build.sitemap.enable {
        Sitemap::from_index(config, index, GuideDate::now()).write(config)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeFreq {
    Daily,
    Weekly,
}

impl ChangeFreq {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

#[derive(Debug)]
struct UrlEntry {
    loc: String,
    lastmod: GuideDate,
    changefreq: ChangeFreq,
    priority: f32,
}

struct Sitemap {
    urls: Vec<UrlEntry>,
}

impl Sitemap {
    fn from_index(config: &SiteConfig, index: &GuideIndex, build_date: GuideDate) -> Self {
        let statics = [
            (config.absolute_url("/"), 1.0),
            (config.absolute_url(&config.guides_index_path()), 0.9),
        ]
        .into_iter()
        .map(|(loc, priority)| UrlEntry { loc, lastmod: build_date, changefreq: ChangeFreq::Daily, priority });

        let guides = index.guides().map(|guide| UrlEntry {
            loc: config.absolute_url(&config.guide_path(&guide.category, &guide.slug)),
            lastmod: guide.date,
            changefreq: ChangeFreq::Weekly,
            priority: 0.8,
        });

        Self { urls: statics.chain(guides).collect() }
    }

    fn into_xml(self) -> String {
        let mut xml = String::with_capacity(256 + self.urls.len() * 192);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(xml, r#"<urlset xmlns="{SITEMAP_NS}">"#);

        for entry in self.urls {
            let _ = write!(
                xml,
                "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
                escape_xml(&entry.loc),
                entry.lastmod.to_iso8601(),
                entry.changefreq.as_str(),
                entry.priority,
            );
        }

        xml.push_str("</urlset>\n");
        xml
    }

    fn write(self, config: &SiteConfig) -> Result<()> {
        let sitemap_path = config.sitemap_output_path();
        let xml = self.into_xml();
        let xml = minify(MinifyType::Xml(xml.as_bytes()), config);

        if let Some(parent) = sitemap_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&sitemap_path, &*xml)
            .with_context(|| format!("Failed to write sitemap to {}", sitemap_path.display()))?;

        log!("sitemap"; "{}", sitemap_path.file_name().unwrap_or_default().to_string_lossy());
        Ok(())
    }
}
