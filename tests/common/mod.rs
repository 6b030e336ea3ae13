//! Common test utilities
//!
//! Fixtures and engine builders shared by the integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use xpost_extract::cdp::{LaunchOptions, MockDocument, MockLauncher};
use xpost_extract::extract::navigation::{ReadinessTier, WaitPlan, ARTICLE_SELECTOR, POST_SELECTOR};
use xpost_extract::extract::{ExtractionEngine, NavigationController};
use xpost_extract::session::SessionManagerImpl;
use xpost_extract::stealth::ContextProfile;

pub const POST_URL: &str = "https://x.com/jack/status/20";
pub const POST_TEXT: &str = "just setting up my twttr";

/// What the extraction script returns for the fixture post
pub fn post_value() -> Value {
    json!({
        "text": POST_TEXT,
        "timestamp": "2006-03-21T20:50:14.000Z",
        "author": {
            "name": "jack",
            "userName": "jack",
            "url": "https://x.com/jack",
            "uid": "1115644092329758721",
            "avatar": "https://pbs.twimg.com/profile_images/1115644092329758721/AFjOr-K8_normal.jpg"
        },
        "images": ["https://pbs.twimg.com/media/GBx1?format=jpg&name=small"],
        "videos": []
    })
}

/// Rendered markup of the fixture post
pub fn post_html() -> String {
    format!(
        r#"<!DOCTYPE html>
<html><body>
<article data-testid="tweet" role="article">
  <div data-testid="User-Name">
    <span><span>jack</span></span>
    <a role="link" href="https://x.com/jack">@jack</a>
  </div>
  <img alt="jack" src="https://pbs.twimg.com/profile_images/1115644092329758721/AFjOr-K8_normal.jpg">
  <div data-testid="tweetText"><span>{}</span></div>
  <img alt="Image" src="https://pbs.twimg.com/media/GBx1?format=jpg&amp;name=small">
  <time datetime="2006-03-21T20:50:14.000Z">Mar 21, 2006</time>
</article>
</body></html>"#,
        POST_TEXT
    )
}

pub const SHORT_LINK: &str = "https://t.co/AbC123";
pub const VIDEO_URL: &str = "https://video.twimg.com/ext_tw_video/1/vid/clip.mp4";
pub const VIDEO_COVER: &str = "https://pbs.twimg.com/ext_tw_video_thumb/1/img/cover.jpg";
pub const POSTER_ONLY: &str = "https://pbs.twimg.com/ext_tw_video_thumb/2/img/still.jpg";

/// A post inside `<article {attrs}>`, with author and time around `body`
pub fn tweet_html(attrs: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><body>
<article {attrs}>
  <div data-testid="User-Name">
    <span><span>jack</span></span>
    <a role="link" href="https://x.com/jack">@jack</a>
  </div>
  {body}
  <time datetime="2006-03-21T20:50:14.000Z">Mar 21, 2006</time>
</article>
</body></html>"#
    )
}

/// Body text without the short link shown below it
pub fn short_link_html() -> String {
    tweet_html(
        r#"data-testid="tweet""#,
        &format!(
            r#"<div data-testid="tweetText"><span>Read the thread</span></div>
  <a href="{0}">{0}</a>"#,
            SHORT_LINK
        ),
    )
}

/// Body text that already mentions the short link
pub fn inline_short_link_html() -> String {
    tweet_html(
        r#"data-testid="tweet""#,
        &format!(
            r#"<div data-testid="tweetText"><span>Mirror at t.co/AbC123</span></div>
  <a href="{0}">{0}</a>"#,
            SHORT_LINK
        ),
    )
}

/// One photo, one profile banner, a playable video and a poster-only video
pub fn media_html() -> String {
    tweet_html(
        r#"data-testid="tweet""#,
        &format!(
            r#"<div data-testid="tweetText"><span>clip</span></div>
  <img alt="Image" src="https://pbs.twimg.com/media/GBx2.png">
  <img src="https://pbs.twimg.com/profile_media/12/banner.jpg">
  <video src="{}" poster="{}"></video>
  <video poster="{}"></video>"#,
            VIDEO_URL, VIDEO_COVER, POSTER_ONLY
        ),
    )
}

/// A bare article ahead of one marked `role="article"`
pub fn role_article_html() -> String {
    r#"<!DOCTYPE html>
<html><body>
<article><div data-testid="tweetText"><span>bare</span></div></article>
<article role="article"><div data-testid="tweetText"><span>by role</span></div></article>
</body></html>"#
        .to_string()
}

/// Only an unmarked article
pub fn bare_article_html() -> String {
    r#"<!DOCTYPE html>
<html><body>
<article><div data-testid="tweetText"><span>bare</span></div></article>
</body></html>"#
        .to_string()
}

/// A page with no post container
pub fn empty_html() -> String {
    "<!DOCTYPE html><html><body><main><p>This post is unavailable.</p></main></body></html>".to_string()
}

/// Serve `html` from a `data:` URL
pub fn data_url(html: &str) -> String {
    format!("data:text/html;charset=utf-8,{}", urlencoding::encode(html))
}

/// Wait plan scaled down to milliseconds
pub fn fast_navigator() -> NavigationController {
    NavigationController::new(
        Duration::from_secs(2),
        WaitPlan {
            tiers: vec![
                ReadinessTier::optional(POST_SELECTOR, Duration::from_millis(50)),
                ReadinessTier::optional(ARTICLE_SELECTOR, Duration::from_millis(50)),
            ],
            settle: Duration::from_millis(5),
            poll_interval: Duration::from_millis(5),
        },
    )
}

/// Engine over a mock browser whose pages serve `document`
pub fn mock_engine(document: MockDocument) -> (ExtractionEngine, Arc<MockLauncher>) {
    mock_engine_with(MockLauncher::new(document))
}

/// Engine over an already configured mock launcher
pub fn mock_engine_with(launcher: MockLauncher) -> (ExtractionEngine, Arc<MockLauncher>) {
    let launcher = Arc::new(launcher);
    let sessions = Arc::new(SessionManagerImpl::new(
        launcher.clone(),
        LaunchOptions::default(),
        ContextProfile::default(),
    ));

    (ExtractionEngine::new(sessions, fast_navigator()), launcher)
}
