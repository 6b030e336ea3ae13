//! Browser session implementation
//!
//! One browser process plus one browsing context, shared by every page.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::page::ExtractionPage;
use crate::cdp::CdpBrowser;
use crate::stealth::{apply_profile, ContextProfile};
use crate::Error;

/// Live browser session
#[derive(Debug)]
pub struct BrowserSession {
    id: String,
    browser: Arc<dyn CdpBrowser>,
    context_id: String,
    profile: ContextProfile,
    open: AtomicBool,
}

impl BrowserSession {
    /// Create a new browser session around an initialized context
    pub(crate) fn new(browser: Arc<dyn CdpBrowser>, context_id: String, profile: ContextProfile) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            browser,
            context_id,
            profile,
            open: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn profile(&self) -> &ContextProfile {
        &self.profile
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Open a fresh page in the browsing context with the profile applied
    pub async fn open_page(&self) -> Result<ExtractionPage, Error> {
        if !self.is_open() {
            return Err(Error::session_closed(format!("session {} was torn down", self.id)));
        }

        let target_url = self.browser.create_target(&self.context_id, "about:blank").await?;
        let target_id = target_url.rsplit('/').next().unwrap_or(&target_url).to_string();

        let client = match self.browser.create_client(&target_url).await {
            Ok(client) => client,
            Err(e) => {
                self.browser.close_target(&target_id).await.ok();
                return Err(e);
            }
        };

        let page = ExtractionPage::new(Arc::clone(&self.browser), target_id, client);

        if let Err(e) = apply_profile(page.client().as_ref(), &self.profile).await {
            page.close().await.ok();
            return Err(e);
        }

        debug!(page_id = %page.id(), session_id = %self.id, "page opened");
        Ok(page)
    }

    /// Close the context, then the browser, then the automation engine.
    ///
    /// Every step runs even when an earlier one fails. Idempotent.
    pub(crate) async fn shutdown(&self) {
        if !self.open.swap(false, Ordering::SeqCst) {
            return;
        }

        info!(session_id = %self.id, "BrowserSession::shutdown");

        if let Err(e) = self.browser.dispose_browser_context(&self.context_id).await {
            warn!(session_id = %self.id, "failed to dispose browsing context: {}", e);
        }

        if let Err(e) = self.browser.close().await {
            warn!(session_id = %self.id, "failed to close browser: {}", e);
        }

        if let Err(e) = self.browser.shutdown().await {
            warn!(session_id = %self.id, "failed to stop automation engine: {}", e);
        }
    }
}
