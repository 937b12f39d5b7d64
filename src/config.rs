//! Site configuration management.
//!
//! Handles loading, parsing, and validating the `guidepress.toml` configuration file.

use crate::cli::{BuildArgs, Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default values for serde deserialization
pub mod config_defaults {
    pub fn r#true() -> bool {
        true
    }

    pub fn r#false() -> bool {
        false
    }

    pub mod base {
        pub fn url() -> Option<String> {
            None
        }
        pub fn language() -> String {
            "ko".into()
        }
        pub fn locale() -> String {
            "ko_KR".into()
        }
        pub fn logo() -> String {
            "/logo.svg".into()
        }
        pub fn favicon() -> String {
            "/favicon.ico".into()
        }

        pub mod author {
            pub fn name() -> String {
                "<YOUR_NAME>".into()
            }
            pub fn url() -> Option<String> {
                None
            }
            pub fn email() -> String {
                "user@noreply.guidepress".into()
            }
        }
    }

    pub mod build {
        use std::path::PathBuf;

        pub fn root() -> Option<PathBuf> {
            None
        }
        pub fn content() -> PathBuf {
            "content".into()
        }
        pub fn output() -> PathBuf {
            "public".into()
        }
        pub fn assets() -> PathBuf {
            "assets".into()
        }
        pub fn guides_path() -> String {
            "guides".into()
        }
        pub fn on_invalid() -> crate::config::InvalidPolicy {
            crate::config::InvalidPolicy::default()
        }

        pub mod rss {
            use std::path::PathBuf;

            pub fn path() -> PathBuf {
                "rss.xml".into()
            }
        }

        pub mod sitemap {
            use std::path::PathBuf;

            pub fn path() -> PathBuf {
                "sitemap.xml".into()
            }
        }

        pub mod slug {
            use crate::config::SlugMode;

            pub fn fragment() -> SlugMode {
                SlugMode::default()
            }
        }
    }

    pub mod serve {
        pub fn interface() -> String {
            "127.0.0.1".into()
        }
        pub fn port() -> u16 {
            5277
        }
    }
}

/// Slug generation mode for heading anchors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugMode {
    /// Always slugify
    On,
    /// Only replace characters that are unsafe in a fragment (default)
    #[default]
    Safe,
    /// No slugification
    No,
}

/// What the index builder does with a content file it cannot parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidPolicy {
    /// Abort the build (default)
    #[default]
    Fail,
    /// Log a warning and leave the file out of the index
    Skip,
}

/// `[base.author]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct AuthorConfig {
    /// Author name, e.g.: "jsy8481"
    #[serde(default = "config_defaults::base::author::name")]
    #[educe(Default = config_defaults::base::author::name())]
    pub name: String,

    /// Author profile page, used as the JSON-LD `Person.url`
    #[serde(default = "config_defaults::base::author::url")]
    #[educe(Default = config_defaults::base::author::url())]
    pub url: Option<String>,

    /// Author email, e.g.: "bob@example.com"
    #[serde(default = "config_defaults::base::author::email")]
    #[educe(Default = config_defaults::base::author::email())]
    pub email: String,
}

/// `[base.verification]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerificationConfig {
    /// `google-site-verification` token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google: Option<String>,

    /// `naver-site-verification` token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naver: Option<String>,
}

/// `[base]` section in guidepress.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Site title, also the suffix of every page title
    pub title: String,

    /// Site description
    pub description: String,

    /// Base URL for canonical links, RSS and sitemap, e.g.: "https://example.github.io"
    #[serde(default = "config_defaults::base::url")]
    #[educe(Default = config_defaults::base::url())]
    pub url: Option<String>,

    /// Language code, e.g.: "ko", "en"
    #[serde(default = "config_defaults::base::language")]
    #[educe(Default = config_defaults::base::language())]
    pub language: String,

    /// OpenGraph locale, e.g.: "ko_KR"
    #[serde(default = "config_defaults::base::locale")]
    #[educe(Default = config_defaults::base::locale())]
    pub locale: String,

    /// Copyright notice shown in the footer
    #[serde(default)]
    pub copyright: String,

    /// Site logo, relative to the site root
    #[serde(default = "config_defaults::base::logo")]
    #[educe(Default = config_defaults::base::logo())]
    pub logo: String,

    /// Favicon, relative to the site root
    #[serde(default = "config_defaults::base::favicon")]
    #[educe(Default = config_defaults::base::favicon())]
    pub favicon: String,

    #[serde(default)]
    pub author: AuthorConfig,

    #[serde(default)]
    pub verification: VerificationConfig,
}

/// `[build]` section in guidepress.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Root directory path
    #[serde(default = "config_defaults::build::root", skip_serializing)]
    #[educe(Default = config_defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Content directory path (relative to root)
    #[serde(default = "config_defaults::build::content")]
    #[educe(Default = config_defaults::build::content())]
    pub content: PathBuf,

    /// Output directory path (relative to root)
    #[serde(default = "config_defaults::build::output")]
    #[educe(Default = config_defaults::build::output())]
    pub output: PathBuf,

    /// Assets directory path (relative to root)
    #[serde(default = "config_defaults::build::assets")]
    #[educe(Default = config_defaults::build::assets())]
    pub assets: PathBuf,

    /// URL segment every guide lives under, e.g.: "guides" -> `/guides/{category}/{slug}`
    #[serde(default = "config_defaults::build::guides_path")]
    #[educe(Default = config_defaults::build::guides_path())]
    pub guides_path: String,

    /// Minify HTML output
    #[serde(default = "config_defaults::r#true")]
    #[educe(Default = true)]
    pub minify: bool,

    /// Clean output directory before building
    #[serde(default = "config_defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,

    /// Policy for content files with malformed front matter
    #[serde(default = "config_defaults::build::on_invalid")]
    #[educe(Default = config_defaults::build::on_invalid())]
    pub on_invalid: InvalidPolicy,

    /// RSS feed configuration
    #[serde(default)]
    pub rss: RssConfig,

    /// Sitemap configuration
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// Slugification settings
    #[serde(default)]
    pub slug: SlugConfig,
}

/// `[build.rss]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RssConfig {
    /// Enable RSS feed generation
    #[serde(default = "config_defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Output path for RSS feed file (relative to output)
    #[serde(default = "config_defaults::build::rss::path")]
    #[educe(Default = config_defaults::build::rss::path())]
    pub path: PathBuf,
}

/// `[build.sitemap]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SitemapConfig {
    /// Enable sitemap generation
    #[serde(default = "config_defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Output path for sitemap file (relative to output)
    #[serde(default = "config_defaults::build::sitemap::path")]
    #[educe(Default = config_defaults::build::sitemap::path())]
    pub path: PathBuf,
}

/// `[build.slug]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SlugConfig {
    /// Slugify heading anchors
    #[serde(default = "config_defaults::build::slug::fragment")]
    #[educe(Default = config_defaults::build::slug::fragment())]
    pub fragment: SlugMode,
}

/// `[serve]` section in guidepress.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Network interface to bind (e.g.: "127.0.0.1", "0.0.0.0")
    #[serde(default = "config_defaults::serve::interface")]
    #[educe(Default = config_defaults::serve::interface())]
    pub interface: String,

    /// Port number to listen on
    #[serde(default = "config_defaults::serve::port")]
    #[educe(Default = config_defaults::serve::port())]
    pub port: u16,

    /// Rebuild when content, assets or config change
    #[serde(default = "config_defaults::r#true")]
    #[educe(Default = true)]
    pub watch: bool,
}

/// Root configuration structure representing guidepress.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Resolved path of the loaded config file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli.root.clone().unwrap_or_else(|| self.get_root().to_owned());
        let root = match &cli.command {
            Commands::Init { name: Some(name) } => root.join(name),
            _ => root,
        };
        self.config_path = root.join(&cli.config);
        self.update_path_with_root(&root, cli);

        match &cli.command {
            Commands::Build { build_args } => self.apply_build_args(build_args),
            Commands::Serve { build_args, interface, port, watch } => {
                self.apply_build_args(build_args);
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
                if build_args.base_url.is_none() {
                    self.base.url = Some(format!("http://{}:{}", self.serve.interface, self.serve.port));
                }
            }
            Commands::Init { .. } | Commands::List => {}
        }
    }

    fn apply_build_args(&mut self, args: &BuildArgs) {
        self.build.clean |= args.clean;
        Self::update_option(&mut self.build.minify, args.minify.as_ref());
        Self::update_option(&mut self.build.rss.enable, args.rss.as_ref());
        Self::update_option(&mut self.build.sitemap.enable, args.sitemap.as_ref());
        if let Some(url) = &args.base_url {
            self.base.url = Some(url.clone());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory
    fn update_path_with_root(&mut self, root: &Path, cli: &Cli) {
        self.set_root(root);
        Self::update_option(&mut self.build.content, cli.content.as_ref());
        Self::update_option(&mut self.build.assets, cli.assets.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        self.build.content = root.join(&self.build.content);
        self.build.assets = root.join(&self.build.assets);
        self.build.output = root.join(&self.build.output);
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        if self.build.guides_path.trim_matches('/').is_empty() {
            bail!(ConfigError::Validation("[build.guides_path] must not be empty".into()));
        }

        match &self.base.url {
            None => bail!(ConfigError::Validation("[base.url] is required".into())),
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                bail!(ConfigError::Validation(
                    "[base.url] must start with http:// or https://".into()
                ));
            }
            _ => {}
        }

        if !self.build.content.is_dir() {
            bail!(ConfigError::Validation(format!(
                "content directory `{}` not found",
                self.build.content.display()
            )));
        }

        Ok(())
    }

    // ========================================================================
    // URL and output layout
    // ========================================================================

    fn guides_segment(&self) -> &str {
        self.build.guides_path.trim_matches('/')
    }

    /// Site-relative URL of the guides overview, e.g.: `/guides`
    pub fn guides_index_path(&self) -> String {
        format!("/{}", self.guides_segment())
    }

    /// Site-relative URL of one guide, e.g.: `/guides/nestjs/intro`
    pub fn guide_path(&self, category: &str, slug: &str) -> String {
        format!("/{}/{category}/{slug}", self.guides_segment())
    }

    /// Join a site-relative path onto `[base.url]`.
    ///
    /// The site root maps to the bare base URL without a trailing slash.
    pub fn absolute_url(&self, path: &str) -> String {
        let base = self.base.url.as_deref().unwrap_or_default().trim_end_matches('/');
        match path.trim_start_matches('/') {
            "" => base.to_owned(),
            rest => format!("{base}/{rest}"),
        }
    }

    /// Output file for a guide page: `{output}/guides/{category}/{slug}/index.html`
    pub fn guide_output_path(&self, category: &str, slug: &str) -> PathBuf {
        self.build
            .output
            .join(self.guides_segment())
            .join(category)
            .join(slug)
            .join("index.html")
    }

    /// Output file for the guides overview page
    pub fn guides_index_output_path(&self) -> PathBuf {
        self.build.output.join(self.guides_segment()).join("index.html")
    }

    pub fn rss_output_path(&self) -> PathBuf {
        self.build.output.join(&self.build.rss.path)
    }

    pub fn sitemap_output_path(&self) -> PathBuf {
        self.build.output.join(&self.build.sitemap.path)
    }

    /// Site-relative URL of the RSS feed
    pub fn rss_url_path(&self) -> String {
        format!("/{}", self.build.rss.path.to_string_lossy().replace('\\', "/"))
    }
}
