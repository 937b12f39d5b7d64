//! Utility modules for the static site generator.

pub mod category;
pub mod date;
pub mod html;
pub mod log;
pub mod minify;
pub mod slug;
