//! Output generation: HTML pages, RSS feed and sitemap.

pub mod jsonld;
pub mod layout;
pub mod listing;
pub mod page;
pub mod rss;
pub mod sidebar;
pub mod sitemap;
