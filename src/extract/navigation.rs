//! Navigation and wait controller
//!
//! Drives a page to its URL, waits for DOM-ready, then walks the readiness
//! tiers and applies the settle delay.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::session::ExtractionPage;
use crate::Error;

/// Primary structural selector of a rendered post
pub const POST_SELECTOR: &str = r#"article[data-testid="tweet"]"#;

/// Fallback selector for any article container
pub const ARTICLE_SELECTOR: &str = "article";

/// One readiness stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessTier {
    pub selector: String,
    pub timeout: Duration,
    /// A timed-out required tier fails the load
    pub required: bool,
}

impl ReadinessTier {
    pub fn optional(selector: impl Into<String>, timeout: Duration) -> Self {
        Self {
            selector: selector.into(),
            timeout,
            required: false,
        }
    }

    pub fn required(selector: impl Into<String>, timeout: Duration) -> Self {
        Self {
            selector: selector.into(),
            timeout,
            required: true,
        }
    }
}

/// Ordered readiness tiers plus the delay applied after them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitPlan {
    pub tiers: Vec<ReadinessTier>,
    pub settle: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitPlan {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl WaitPlan {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tiers: vec![
                ReadinessTier::optional(POST_SELECTOR, Duration::from_millis(config.primary_selector_timeout)),
                ReadinessTier::optional(ARTICLE_SELECTOR, Duration::from_millis(config.fallback_selector_timeout)),
            ],
            settle: Duration::from_millis(config.settle_delay),
            poll_interval: Duration::from_millis(config.poll_interval),
        }
    }
}

/// Navigation and wait controller
#[derive(Debug, Clone)]
pub struct NavigationController {
    navigation_timeout: Duration,
    plan: WaitPlan,
}

impl NavigationController {
    pub fn new(navigation_timeout: Duration, plan: WaitPlan) -> Self {
        Self {
            navigation_timeout,
            plan,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.navigation_timeout(), WaitPlan::from_config(config))
    }

    pub fn plan(&self) -> &WaitPlan {
        &self.plan
    }

    /// Load `url` into `page` and wait until it is worth extracting.
    ///
    /// Returns the selector of the first tier that matched, if any.
    pub async fn load(&self, page: &ExtractionPage, url: &str) -> Result<Option<String>, Error> {
        info!(url = %url, page_id = %page.id(), "navigating");

        let navigation = async {
            page.navigate(url).await?;
            self.wait_dom_ready(page).await
        };

        match tokio::time::timeout(self.navigation_timeout, navigation).await {
            Ok(Ok(())) => {}
            Ok(Err(Error::Timeout(msg))) => return Err(Error::navigation_timeout(msg)),
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(Error::navigation_timeout(format!(
                    "{} not DOM-ready after {:?}",
                    url, self.navigation_timeout
                )))
            }
        }

        debug!(url = %url, "DOM ready");

        let matched = self.run_tiers(page).await?;

        if !self.plan.settle.is_zero() {
            debug!(url = %url, settle = ?self.plan.settle, "settling");
            tokio::time::sleep(self.plan.settle).await;
        }

        Ok(matched)
    }

    async fn wait_dom_ready(&self, page: &ExtractionPage) -> Result<(), Error> {
        loop {
            match page.is_dom_ready().await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e @ Error::SessionClosed(_)) => return Err(e),
                // The execution context is replaced while the document commits
                Err(e) => debug!("DOM-ready probe failed: {}", e),
            }
            tokio::time::sleep(self.plan.poll_interval).await;
        }
    }

    /// `Ok(false)` when `selector` is still absent after `timeout`
    async fn wait_for_selector(&self, page: &ExtractionPage, selector: &str, timeout: Duration) -> Result<bool, Error> {
        let poll = async {
            loop {
                match page.has_selector(selector).await {
                    Ok(true) => return Ok(()),
                    Ok(false) => {}
                    Err(e @ Error::SessionClosed(_)) => return Err(e),
                    Err(e) => debug!(selector = %selector, "selector probe failed: {}", e),
                }
                tokio::time::sleep(self.plan.poll_interval).await;
            }
        };

        match tokio::time::timeout(timeout, poll).await {
            Ok(Ok(())) => Ok(true),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(false),
        }
    }

    async fn run_tiers(&self, page: &ExtractionPage) -> Result<Option<String>, Error> {
        for (index, tier) in self.plan.tiers.iter().enumerate() {
            if self.wait_for_selector(page, &tier.selector, tier.timeout).await? {
                info!(tier = index, selector = %tier.selector, "readiness tier matched");
                return Ok(Some(tier.selector.clone()));
            }

            if tier.required {
                return Err(Error::timeout(format!(
                    "required selector {} not found within {:?}",
                    tier.selector, tier.timeout
                )));
            }

            warn!(tier = index, selector = %tier.selector, "readiness tier timed out");
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdp::{MockCdpBrowser, MockCdpClient, MockDocument};
    use std::sync::Arc;

    fn page_with(document: MockDocument) -> ExtractionPage {
        ExtractionPage::new(
            Arc::new(MockCdpBrowser::default()),
            "target-1".to_string(),
            Arc::new(MockCdpClient::with_document(document)),
        )
    }

    fn fast_controller(required_fallback: bool) -> NavigationController {
        let fallback = if required_fallback {
            ReadinessTier::required(ARTICLE_SELECTOR, Duration::from_millis(30))
        } else {
            ReadinessTier::optional(ARTICLE_SELECTOR, Duration::from_millis(30))
        };

        NavigationController::new(
            Duration::from_millis(200),
            WaitPlan {
                tiers: vec![ReadinessTier::optional(POST_SELECTOR, Duration::from_millis(30)), fallback],
                settle: Duration::ZERO,
                poll_interval: Duration::from_millis(5),
            },
        )
    }

    #[test]
    fn test_default_plan() {
        let plan = WaitPlan::default();

        assert_eq!(plan.tiers.len(), 2);
        assert_eq!(plan.tiers[0].selector, POST_SELECTOR);
        assert_eq!(plan.tiers[0].timeout, Duration::from_secs(30));
        assert_eq!(plan.tiers[1].selector, ARTICLE_SELECTOR);
        assert_eq!(plan.tiers[1].timeout, Duration::from_secs(20));
        assert!(plan.tiers.iter().all(|t| !t.required));
        assert_eq!(plan.settle, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_primary_tier_matches() {
        let page = page_with(MockDocument::with_post(serde_json::json!({})));

        let matched = fast_controller(false).load(&page, "https://x.com/a/status/1").await.unwrap();
        assert_eq!(matched.as_deref(), Some(POST_SELECTOR));
    }

    #[tokio::test]
    async fn test_falls_through_to_fallback_tier() {
        let page = page_with(MockDocument {
            selectors: vec![ARTICLE_SELECTOR.to_string()],
            ..MockDocument::default()
        });

        let matched = fast_controller(false).load(&page, "https://x.com/a/status/1").await.unwrap();
        assert_eq!(matched.as_deref(), Some(ARTICLE_SELECTOR));
    }

    #[tokio::test]
    async fn test_optional_tiers_never_fail() {
        let page = page_with(MockDocument::default());

        let matched = fast_controller(false).load(&page, "https://x.com/a/status/1").await.unwrap();
        assert_eq!(matched, None);
    }

    #[tokio::test]
    async fn test_required_tier_fails() {
        let page = page_with(MockDocument::default());

        let result = fast_controller(true).load(&page, "https://x.com/a/status/1").await;
        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn test_dom_never_ready_times_out() {
        let page = page_with(MockDocument {
            ready: false,
            ..MockDocument::default()
        });

        let result = fast_controller(false).load(&page, "https://x.com/a/status/1").await;
        assert!(matches!(result, Err(Error::NavigationTimeout(_))));
    }

    #[tokio::test]
    async fn test_navigation_error_is_reported() {
        let page = page_with(MockDocument {
            navigation_error: Some("net::ERR_NAME_NOT_RESOLVED".to_string()),
            ..MockDocument::default()
        });

        let result = fast_controller(false).load(&page, "https://x.com/a/status/1").await;
        assert!(matches!(result, Err(Error::NavigationFailed(_))));
    }

    #[tokio::test]
    async fn test_closed_page_stops_tier_wait() {
        let page = page_with(MockDocument::default());
        let controller = NavigationController::new(
            Duration::from_secs(10),
            WaitPlan {
                tiers: vec![ReadinessTier::optional(POST_SELECTOR, Duration::from_secs(5))],
                settle: Duration::ZERO,
                poll_interval: Duration::from_millis(5),
            },
        );
        page.close().await.unwrap();

        let started = std::time::Instant::now();
        let result = controller.run_tiers(&page).await;

        assert!(matches!(result, Err(Error::SessionClosed(_))));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_settle_delay_applies() {
        let page = page_with(MockDocument::with_post(serde_json::json!({})));
        let mut controller = fast_controller(false);
        controller.plan.settle = Duration::from_millis(50);

        let started = std::time::Instant::now();
        controller.load(&page, "https://x.com/a/status/1").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
