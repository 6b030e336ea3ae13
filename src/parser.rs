//! Content parser trait and the post URL capability check

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use crate::extract::CanonicalRecord;
use crate::Error;

static RE_POST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(www\.)?(twitter\.com|x\.com)/.+/status/\d+").expect("valid post URL pattern")
});

/// Whether `url` points at a single X/Twitter post
pub fn is_post_url(url: &str) -> bool {
    RE_POST_URL.is_match(url)
}

/// A source of canonical records for post URLs
#[async_trait]
pub trait ContentParser: Send + Sync + std::fmt::Debug {
    /// Parser tag reported in logs and on the record
    fn name(&self) -> &str;

    fn can_parse(&self, url: &str) -> bool {
        is_post_url(url)
    }

    /// Parse one post URL
    async fn parse(&self, url: &str) -> Result<CanonicalRecord, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_post_url() {
        assert!(is_post_url("https://x.com/jack/status/20"));
        assert!(is_post_url("https://twitter.com/jack/status/20"));
        assert!(is_post_url("http://www.twitter.com/jack/status/20?s=21"));
        assert!(is_post_url("https://x.com/i/web/status/1234567890"));

        assert!(!is_post_url("https://x.com/jack"));
        assert!(!is_post_url("https://x.com/jack/status/"));
        assert!(!is_post_url("https://example.com/jack/status/20"));
        assert!(!is_post_url("ftp://x.com/jack/status/20"));
        assert!(!is_post_url("see https://x.com/jack/status/20"));
    }
}
