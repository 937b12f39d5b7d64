//! schema.org `TechArticle` structured data for guide pages.

use crate::{config::SiteConfig, content::GuideMeta};
use serde_json::{Value, json};

pub fn tech_article(config: &SiteConfig, guide: &GuideMeta) -> Value {
    let url = config.absolute_url(&config.guide_path(&guide.category, &guide.slug));
    let date = guide.date.to_iso8601();

    let mut author = json!({
        "@type": "Person",
        "name": config.base.author.name,
    });
    if let Some(profile) = &config.base.author.url {
        author["url"] = json!(profile);
    }

    json!({
        "@context": "https://schema.org",
        "@type": "TechArticle",
        "headline": guide.title,
        "description": guide.description,
        "author": author,
        "datePublished": date,
        "dateModified": date,
        "mainEntityOfPage": {
            "@type": "WebPage",
            "@id": url,
        },
        "publisher": {
            "@type": "Organization",
            "name": config.base.title,
            "logo": {
                "@type": "ImageObject",
                "url": config.absolute_url(&config.base.logo),
            },
        },
        "articleSection": guide.category,
        "inLanguage": config.base.language,
    })
}

/// Embed as a `<script>` element. `</` is escaped so content cannot close the tag.
pub fn script_tag(data: &Value) -> String {
    let json = data.to_string().replace("</", "<\\/");
    format!(r#"<script type="application/ld+json">{json}</script>"#)
}
