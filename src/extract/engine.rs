//! Extraction engine
//!
//! Ties the session, navigation, extraction script and normalizer together
//! for one URL at a time.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::navigation::NavigationController;
use super::normalize::resolve;
use super::raw::ExtractionOutcome;
use super::record::{CanonicalRecord, PARSER_TAG};
use crate::config::Config;
use crate::parser::ContentParser;
use crate::session::{BrowserSession, ExtractionPage, SessionManager, SessionManagerImpl};
use crate::Error;

/// Browser-driven extraction engine
#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    sessions: Arc<dyn SessionManager>,
    navigator: NavigationController,
}

impl ExtractionEngine {
    pub fn new(sessions: Arc<dyn SessionManager>, navigator: NavigationController) -> Self {
        Self { sessions, navigator }
    }

    /// Engine backed by a local Chrome
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(SessionManagerImpl::from_config(config)),
            NavigationController::from_config(config),
        )
    }

    pub fn sessions(&self) -> &Arc<dyn SessionManager> {
        &self.sessions
    }

    /// Extract `url`, starting the session if needed
    pub async fn extract(&self, url: &str) -> Result<CanonicalRecord, Error> {
        let session = self.sessions.ensure_ready().await.map_err(|e| {
            error!(url = %url, "session unavailable: {}", e);
            e.for_url(url)
        })?;

        self.extract_with(&session, url).await
    }

    /// Extract `url` on a page of `session`.
    ///
    /// The page is closed on every path out of this call.
    pub async fn extract_with(&self, session: &BrowserSession, url: &str) -> Result<CanonicalRecord, Error> {
        let page = session.open_page().await.map_err(|e| {
            error!(url = %url, "page open failed: {}", e);
            e.for_url(url)
        })?;

        let result = self.run(&page, url).await;

        if let Err(e) = page.close().await {
            warn!(url = %url, page_id = %page.id(), "page close failed: {}", e);
        }

        match result {
            Ok(record) => {
                info!(url = %url, pid = %record.pid, media = record.media.len(), "extraction succeeded");
                Ok(record)
            }
            Err(e) => {
                error!(url = %url, "extraction failed: {}", e);
                Err(e.for_url(url))
            }
        }
    }

    async fn run(&self, page: &ExtractionPage, url: &str) -> Result<CanonicalRecord, Error> {
        self.navigator.load(page, url).await?;

        let value = page.run_extraction().await?;
        let outcome = ExtractionOutcome::classify(value)?;

        resolve(outcome, url)
    }

    /// Tear the session down
    pub async fn shutdown(&self) {
        self.sessions.teardown().await;
    }
}

#[async_trait]
impl ContentParser for ExtractionEngine {
    fn name(&self) -> &str {
        PARSER_TAG
    }

    async fn parse(&self, url: &str) -> Result<CanonicalRecord, Error> {
        self.extract(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdp::{LaunchOptions, MockDocument, MockLauncher};
    use crate::extract::navigation::{ReadinessTier, WaitPlan, ARTICLE_SELECTOR, POST_SELECTOR};
    use crate::stealth::ContextProfile;
    use serde_json::json;
    use std::time::Duration;

    fn engine_for(document: MockDocument) -> (ExtractionEngine, Arc<MockLauncher>) {
        let launcher = Arc::new(MockLauncher::new(document));
        let sessions = Arc::new(SessionManagerImpl::new(
            launcher.clone(),
            LaunchOptions::default(),
            ContextProfile::default(),
        ));
        let navigator = NavigationController::new(
            Duration::from_millis(500),
            WaitPlan {
                tiers: vec![
                    ReadinessTier::optional(POST_SELECTOR, Duration::from_millis(20)),
                    ReadinessTier::optional(ARTICLE_SELECTOR, Duration::from_millis(20)),
                ],
                settle: Duration::ZERO,
                poll_interval: Duration::from_millis(5),
            },
        );
        (ExtractionEngine::new(sessions, navigator), launcher)
    }

    #[tokio::test]
    async fn test_extract_found() {
        let (engine, launcher) = engine_for(MockDocument::with_post(json!({
            "text": "just setting up my twttr",
            "timestamp": "2006-03-21T20:50:14.000Z",
            "author": { "name": "jack", "userName": "jack" },
            "images": ["https://pbs.twimg.com/media/ABC?format=png&name=small"],
            "videos": []
        })));

        let record = engine.extract("https://x.com/jack/status/20").await.unwrap();

        assert_eq!(record.pid, "20");
        assert_eq!(record.content, "just setting up my twttr");
        assert_eq!(record.created_time, 1142974214000);
        assert_eq!(record.media.len(), 1);
        assert!(record.media[0].url.ends_with(":orig"));

        let browser = launcher.last_browser().unwrap();
        assert!(browser.clients().iter().all(|c| c.is_closed()));
    }

    #[tokio::test]
    async fn test_extract_not_found_closes_page() {
        let (engine, launcher) = engine_for(MockDocument::default());

        let err = engine.extract("https://x.com/jack/status/20").await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.url(), Some("https://x.com/jack/status/20"));

        let browser = launcher.last_browser().unwrap();
        assert_eq!(browser.targets_closed(), 1);
    }

    #[tokio::test]
    async fn test_navigation_failure_is_wrapped() {
        let (engine, _launcher) = engine_for(MockDocument {
            navigation_error: Some("net::ERR_CONNECTION_REFUSED".to_string()),
            ..MockDocument::default()
        });

        let err = engine.extract("https://x.com/jack/status/20").await.unwrap_err();
        assert!(matches!(err.root(), Error::NavigationFailed(_)));
    }

    #[tokio::test]
    async fn test_session_failure_is_wrapped() {
        let (engine, launcher) = engine_for(MockDocument::default());
        launcher.fail_next_launch();

        let err = engine.extract("https://x.com/jack/status/20").await.unwrap_err();
        assert!(matches!(err.root(), Error::SessionInit(_)));
        assert!(!engine.sessions().is_live());
    }

    #[tokio::test]
    async fn test_parser_name() {
        let (engine, _launcher) = engine_for(MockDocument::default());
        assert_eq!(engine.name(), "twitter_parser");
        assert!(engine.can_parse("https://twitter.com/jack/status/20"));
    }

    #[tokio::test]
    async fn test_shutdown_tears_down() {
        let (engine, _launcher) = engine_for(MockDocument::with_post(json!({ "text": "hi" })));

        engine.extract("https://x.com/a/status/1").await.unwrap();
        assert!(engine.sessions().is_live());

        engine.shutdown().await;
        assert!(!engine.sessions().is_live());
    }
}
