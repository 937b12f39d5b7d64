//! RSS feed generation.
//!
//! One `<item>` per indexed guide, newest first.

use crate::{
    config::SiteConfig,
    content::{GuideIndex, GuideMeta},
    log,
    utils::{
        date::GuideDate,
        minify::{MinifyType, minify},
    },
};
use anyhow::{Context, Result, anyhow};
use rss::{CategoryBuilder, ChannelBuilder, GuidBuilder, ImageBuilder, ItemBuilder, validation::Validate};
use std::fs;

/// Build the RSS feed if enabled in config.
pub fn build_rss(config: &SiteConfig, index: &GuideIndex) -> Result<()> {
    if config.build.rss.enable {
        RssFeed::new(config, index).write(GuideDate::now())?;
    }
    Ok(())
}

struct RssFeed<'a> {
    config: &'a SiteConfig,
    guides: Vec<&'a GuideMeta>,
}

impl<'a> RssFeed<'a> {
    fn new(config: &'a SiteConfig, index: &'a GuideIndex) -> Self {
        let mut guides: Vec<_> = index.guides().collect();
        // stable: guides sharing a date keep index order
        guides.sort_by(|a, b| b.date.cmp(&a.date));
        Self { config, guides }
    }

    fn into_xml(self, now: GuideDate) -> Result<String> {
        let config = self.config;
        let site_url = config.absolute_url("/");
        let author = config.base.author.name.as_str();

        let items: Vec<_> = self.guides.iter().map(|guide| guide_to_rss_item(guide, config)).collect();

        let image = ImageBuilder::default()
            .url(config.absolute_url(&config.base.logo))
            .title(config.base.title.clone())
            .link(site_url.clone())
            .build();

        let channel = ChannelBuilder::default()
            .title(config.base.title.clone())
            .link(site_url)
            .description(config.base.description.clone())
            .language(config.base.language.clone())
            .generator("guidepress".to_string())
            .copyright(format!("All rights reserved {}, {author}", now.year()))
            .managing_editor(rss_author(config))
            .last_build_date(now.to_rfc2822())
            .image(Some(image))
            .items(items)
            .build();

        channel.validate().map_err(|e| anyhow!("rss validation failed: {e}"))?;
        Ok(channel.to_string())
    }

    fn write(self, now: GuideDate) -> Result<()> {
        let config = self.config;
        let rss_path = config.rss_output_path();
        let xml = self.into_xml(now)?;
        let xml = minify(MinifyType::Xml(xml.as_bytes()), config);

        if let Some(parent) = rss_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&rss_path, &*xml).with_context(|| format!("Failed to write rss to {}", rss_path.display()))?;

        log!("rss"; "{}", rss_path.file_name().unwrap_or_default().to_string_lossy());
        Ok(())
    }
}

fn guide_to_rss_item(guide: &GuideMeta, config: &SiteConfig) -> rss::Item {
    let link = config.absolute_url(&config.guide_path(&guide.category, &guide.slug));
    let description = Some(guide.description.clone()).filter(|d| !d.is_empty());

    ItemBuilder::default()
        .title(guide.title.clone())
        .link(Some(link.clone()))
        .guid(GuidBuilder::default().permalink(true).value(link).build())
        .description(description)
        .pub_date(guide.date.to_rfc2822())
        .categories(vec![CategoryBuilder::default().name(guide.category.clone()).build()])
        .author(rss_author(config))
        .build()
}

/// RSS wants `email (Name)`. Without an email there is no valid author field.
fn rss_author(config: &SiteConfig) -> Option<String> {
    let author = &config.base.author;
    let email = author.email.trim();
    (!email.is_empty()).then(|| format!("{email} ({})", author.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlugMode;
    use crate::content::GuideEntry;
    use std::path::PathBuf;

    fn make_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.base.title = "한국어 기술 가이드".into();
        config.base.description = "초보자도 실제 프로젝트에 적용 가능한 상세한 한국어 기술 가이드".into();
        config.base.url = Some("https://jsy8481.github.io".into());
        config.base.author.name = "jsy8481".into();
        config.base.author.email = "jsy8481@example.com".into();
        config
    }

    fn entry(category: &str, slug: &str, title: &str, date: GuideDate) -> GuideEntry {
        GuideEntry {
            meta: GuideMeta {
                title: title.into(),
                description: format!("{title} 설명"),
                date,
                category: category.into(),
                slug: slug.into(),
            },
            source: PathBuf::from(format!("content/{category}/{slug}.md")),
        }
    }

    fn make_index() -> GuideIndex {
        GuideIndex::from_entries(
            vec![
                entry("nestjs", "intro", "NestJS 소개", GuideDate::from_ymd(2025, 1, 15)),
                entry("nestjs", "modules", "모듈", GuideDate::from_ymd(2025, 1, 20)),
                entry("drizzle", "setup", "Drizzle 설정", GuideDate::from_ymd(2025, 2, 1)),
            ],
            SlugMode::Safe,
        )
        .unwrap()
    }

    #[test]
    fn test_guide_to_rss_item() {
        let config = make_config();
        let index = make_index();
        let guide = index.get("nestjs", "intro").unwrap();

        let item = guide_to_rss_item(&guide.meta, &config);
        assert_eq!(item.title(), Some("NestJS 소개"));
        assert_eq!(item.link(), Some("https://jsy8481.github.io/guides/nestjs/intro"));
        assert_eq!(item.guid().map(|g| g.value()), Some("https://jsy8481.github.io/guides/nestjs/intro"));
        assert_eq!(item.description(), Some("NestJS 소개 설명"));
        assert_eq!(item.pub_date(), Some("Wed, 15 Jan 2025 00:00:00 +0000"));
        assert_eq!(item.categories()[0].name(), "nestjs");
        assert_eq!(item.author(), Some("jsy8481@example.com (jsy8481)"));
    }

    #[test]
    fn test_feed_has_one_item_per_guide_newest_first() {
        let config = make_config();
        let index = make_index();
        let xml = RssFeed::new(&config, &index).into_xml(GuideDate::from_ymd(2025, 3, 1)).unwrap();
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();

        let links: Vec<_> = channel.items().iter().filter_map(|i| i.link()).collect();
        assert_eq!(
            links,
            [
                "https://jsy8481.github.io/guides/drizzle/setup",
                "https://jsy8481.github.io/guides/nestjs/modules",
                "https://jsy8481.github.io/guides/nestjs/intro",
            ]
        );
        assert_eq!(
            links.iter().filter(|l| l.ends_with("/guides/nestjs/intro")).count(),
            1
        );
    }

    #[test]
    fn test_channel_metadata() {
        let config = make_config();
        let index = make_index();
        let xml = RssFeed::new(&config, &index).into_xml(GuideDate::from_ymd(2025, 3, 1)).unwrap();
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();

        assert_eq!(channel.title(), "한국어 기술 가이드");
        assert_eq!(channel.link(), "https://jsy8481.github.io");
        assert_eq!(channel.language(), Some("ko"));
        assert_eq!(channel.copyright(), Some("All rights reserved 2025, jsy8481"));
        assert_eq!(channel.image().map(|i| i.url()), Some("https://jsy8481.github.io/logo.svg"));
    }

    #[test]
    fn test_rss_author_requires_email() {
        let mut config = make_config();
        config.base.author.email = String::new();
        assert_eq!(rss_author(&config), None);
    }

    #[test]
    fn test_build_rss_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = make_config();
        config.build.output = dir.path().to_path_buf();

        build_rss(&config, &make_index()).unwrap();
        let xml = fs::read_to_string(dir.path().join("rss.xml")).unwrap();
        assert!(xml.contains("NestJS 소개"));
    }

    #[test]
    fn test_build_rss_minified_keeps_multiline_description() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = make_config();
        config.build.output = dir.path().to_path_buf();
        config.build.minify = true;

        let mut guide = entry("nestjs", "intro", "NestJS 소개", GuideDate::from_ymd(2025, 1, 15));
        guide.meta.description = "첫 줄\n둘째 줄".into();
        let index = GuideIndex::from_entries(vec![guide], SlugMode::Safe).unwrap();

        build_rss(&config, &index).unwrap();
        let xml = fs::read(dir.path().join("rss.xml")).unwrap();
        let channel = rss::Channel::read_from(xml.as_slice()).unwrap();
        assert_eq!(channel.items()[0].description(), Some("첫 줄\n둘째 줄"));
    }
}
