//! xpost-extract: browser-driven extraction of X/Twitter posts
//!
//! This library drives a headless Chrome over the Chrome DevTools Protocol to
//! turn a post URL into a canonical record, with an optional HTTP API parser
//! tried first.

pub mod error;
pub mod config;

pub mod cdp;
pub mod session;
pub mod stealth;
pub mod extract;
pub mod bridge;
pub mod parser;
pub mod api;
pub mod plugin;

// Re-exports
pub use error::{Error, Result};
pub use extract::{CanonicalRecord, ExtractionEngine};
pub use parser::{is_post_url, ContentParser};
pub use plugin::TwitterParserPlugin;

/// xpost-extract library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
