//! Extraction page implementation
//!
//! A single-use page opened for one extraction call.

use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cdp::{CdpBrowser, CdpClient, EvaluationResult, NavigationResult};
use crate::extract::scripts::{selector_probe, DOM_READY_PROBE, EXTRACTION_SCRIPT};
use crate::Error;

/// Transient page owned by one in-flight call
///
/// Closed explicitly with [`ExtractionPage::close`]; a page dropped while
/// still open schedules its own close on the current runtime.
#[derive(Debug)]
pub struct ExtractionPage {
    id: String,
    target_id: String,
    browser: Arc<dyn CdpBrowser>,
    client: Arc<dyn CdpClient>,
    open: AtomicBool,
}

impl ExtractionPage {
    /// Create a new extraction page
    pub(crate) fn new(browser: Arc<dyn CdpBrowser>, target_id: String, client: Arc<dyn CdpClient>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            target_id,
            browser,
            client,
            open: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Underlying CDP client
    pub fn client(&self) -> Arc<dyn CdpClient> {
        Arc::clone(&self.client)
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.is_open() {
            Ok(())
        } else {
            Err(Error::session_closed(format!("page {} is closed", self.id)))
        }
    }

    /// Start navigating to `url`
    pub async fn navigate(&self, url: &str) -> Result<NavigationResult, Error> {
        self.ensure_open()?;
        self.client.navigate(url).await
    }

    /// Whether the navigated document has reached DOM-ready
    pub async fn is_dom_ready(&self) -> Result<bool, Error> {
        self.ensure_open()?;
        let result = self.client.evaluate(DOM_READY_PROBE, false).await?;
        Ok(matches!(result, EvaluationResult::Bool(true)))
    }

    /// Whether `selector` matches an element in the document
    pub async fn has_selector(&self, selector: &str) -> Result<bool, Error> {
        self.ensure_open()?;
        let result = self.client.evaluate(&selector_probe(selector), false).await?;
        Ok(matches!(result, EvaluationResult::Bool(true)))
    }

    /// Run the extraction script; `None` when the page has no content container
    pub async fn run_extraction(&self) -> Result<Option<Value>, Error> {
        self.ensure_open()?;
        match self.client.evaluate(EXTRACTION_SCRIPT, false).await? {
            EvaluationResult::Object(value) => Ok(Some(value)),
            EvaluationResult::Null => Ok(None),
            other => Err(Error::script_execution_failed(format!(
                "extraction returned {:?}",
                other
            ))),
        }
    }

    /// Close the page. Idempotent.
    pub async fn close(&self) -> Result<(), Error> {
        if !self.open.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        debug!(page_id = %self.id, "ExtractionPage::close");
        close_target(Arc::clone(&self.browser), Arc::clone(&self.client), self.target_id.clone()).await
    }
}

async fn close_target(browser: Arc<dyn CdpBrowser>, client: Arc<dyn CdpClient>, target_id: String) -> Result<(), Error> {
    if let Err(e) = client.connection().close().await {
        debug!("ExtractionPage: page connection close failed: {}", e);
    }
    browser.close_target(&target_id).await
}

impl Drop for ExtractionPage {
    fn drop(&mut self) {
        if !self.open.swap(false, Ordering::SeqCst) {
            return;
        }

        let browser = Arc::clone(&self.browser);
        let client = Arc::clone(&self.client);
        let target_id = self.target_id.clone();
        let page_id = self.id.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!(page_id = %page_id, "ExtractionPage dropped open, scheduling close");
                handle.spawn(async move {
                    if let Err(e) = close_target(browser, client, target_id).await {
                        warn!(page_id = %page_id, "deferred page close failed: {}", e);
                    }
                });
            }
            Err(_) => warn!(page_id = %page_id, "ExtractionPage dropped outside a runtime, target left open"),
        }
    }
}
