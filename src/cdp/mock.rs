//! Mock CDP implementation for testing
//!
//! This module provides mock implementations of the CDP traits. Pages serve a
//! scripted [`MockDocument`] instead of a real DOM: the readiness probes and
//! the extraction script are answered from its fields.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::cdp::traits::*;
use crate::extract::scripts::{selector_probe, DOM_READY_PROBE, EXTRACTION_SCRIPT};
use crate::Error;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Scripted page content served by mock clients
#[derive(Debug, Clone)]
pub struct MockDocument {
    /// Whether the DOM-ready probe succeeds
    pub ready: bool,
    /// Selectors that match an element
    pub selectors: Vec<String>,
    /// Value returned by the extraction script (`None` evaluates to `null`)
    pub extraction: Option<Value>,
    /// Network error reported by `Page.navigate`
    pub navigation_error: Option<String>,
    /// Delay before `Page.navigate` answers
    pub navigate_delay: Duration,
}

impl Default for MockDocument {
    fn default() -> Self {
        Self {
            ready: true,
            selectors: Vec::new(),
            extraction: None,
            navigation_error: None,
            navigate_delay: Duration::ZERO,
        }
    }
}

impl MockDocument {
    /// A ready document whose extraction yields `extraction`
    pub fn with_post(extraction: Value) -> Self {
        Self {
            selectors: vec![
                r#"article[data-testid="tweet"]"#.to_string(),
                "article".to_string(),
            ],
            extraction: Some(extraction),
            ..Self::default()
        }
    }
}

/// Mock CDP connection
#[derive(Debug)]
pub struct MockCdpConnection {
    is_active: Arc<AtomicBool>,
    next_id: AtomicU64,
}

impl MockCdpConnection {
    /// Create a new mock CDP connection
    pub fn new() -> Self {
        Self {
            is_active: Arc::new(AtomicBool::new(true)),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for MockCdpConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdpConnection for MockCdpConnection {
    async fn send_command(&self, _method: &str, _params: Value) -> Result<CdpResponse, Error> {
        if !self.is_active() {
            return Err(Error::websocket("Connection is not active"));
        }

        Ok(CdpResponse {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            result: Some(serde_json::json!({})),
            error: None,
        })
    }

    async fn close(&self) -> Result<(), Error> {
        self.is_active.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}

/// Mock CDP client
#[derive(Debug)]
pub struct MockCdpClient {
    /// Unique page id
    id: String,
    connection: Arc<MockCdpConnection>,
    document: MockDocument,
    url: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
}

impl MockCdpClient {
    /// Create a new mock CDP client serving an empty document
    pub fn new() -> Self {
        Self::with_document(MockDocument::default())
    }

    /// Create a mock client serving `document`
    pub fn with_document(document: MockDocument) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            connection: Arc::new(MockCdpConnection::new()),
            document,
            url: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Page id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last URL navigated to
    pub fn url(&self) -> Option<String> {
        lock(&self.url).clone()
    }

    /// CDP methods called so far, in order
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Whether the page connection was closed
    pub fn is_closed(&self) -> bool {
        !self.connection.is_active()
    }

    fn record(&self, method: &str) -> Result<(), Error> {
        if self.is_closed() {
            return Err(Error::websocket("Connection is not active"));
        }
        lock(&self.calls).push(method.to_string());
        Ok(())
    }

    fn answer(&self, script: &str) -> EvaluationResult {
        if script == DOM_READY_PROBE {
            return EvaluationResult::Bool(self.document.ready);
        }

        if script == EXTRACTION_SCRIPT {
            return match &self.document.extraction {
                Some(value) => EvaluationResult::Object(value.clone()),
                None => EvaluationResult::Null,
            };
        }

        if script.starts_with("document.querySelector(") {
            let matched = self
                .document
                .selectors
                .iter()
                .any(|selector| selector_probe(selector) == script);
            return EvaluationResult::Bool(matched);
        }

        EvaluationResult::Null
    }
}

impl Default for MockCdpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdpClient for MockCdpClient {
    fn connection(&self) -> Arc<dyn CdpConnection> {
        self.connection.clone()
    }

    async fn navigate(&self, url: &str) -> Result<NavigationResult, Error> {
        self.record("Page.navigate")?;

        if !self.document.navigate_delay.is_zero() {
            tokio::time::sleep(self.document.navigate_delay).await;
        }

        if let Some(error_text) = &self.document.navigation_error {
            return Err(Error::navigation_failed(format!("{}: {}", url, error_text)));
        }

        *lock(&self.url) = Some(url.to_string());

        Ok(NavigationResult {
            navigation_id: Some(uuid::Uuid::new_v4().to_string()),
            frame_id: self.id.clone(),
            url: url.to_string(),
        })
    }

    async fn evaluate(&self, script: &str, _await_promise: bool) -> Result<EvaluationResult, Error> {
        self.record("Runtime.evaluate")?;
        Ok(self.answer(script))
    }

    async fn enable_domain(&self, domain: &str) -> Result<(), Error> {
        self.record(&format!("{}.enable", domain))
    }

    async fn call_method(&self, method: &str, _params: Value) -> Result<Value, Error> {
        self.record(method)?;
        Ok(serde_json::json!({}))
    }
}

/// Mock CDP browser
#[derive(Debug, Default)]
pub struct MockCdpBrowser {
    document: Mutex<MockDocument>,
    fail_context: AtomicBool,
    contexts_created: AtomicUsize,
    contexts_disposed: AtomicUsize,
    targets_closed: AtomicUsize,
    close_calls: AtomicUsize,
    shutdown_calls: AtomicUsize,
    clients: Mutex<Vec<Arc<MockCdpClient>>>,
    lifecycle: Mutex<Vec<String>>,
}

impl MockCdpBrowser {
    /// Create a new mock browser whose pages serve `document`
    pub fn new(document: MockDocument) -> Self {
        Self {
            document: Mutex::new(document),
            ..Self::default()
        }
    }

    /// Replace the document served to pages created from now on
    pub fn set_document(&self, document: MockDocument) {
        *lock(&self.document) = document;
    }

    /// Make browsing context creation fail
    pub fn fail_context_creation(&self) {
        self.fail_context.store(true, Ordering::SeqCst);
    }

    pub fn contexts_created(&self) -> usize {
        self.contexts_created.load(Ordering::SeqCst)
    }

    pub fn contexts_disposed(&self) -> usize {
        self.contexts_disposed.load(Ordering::SeqCst)
    }

    pub fn targets_closed(&self) -> usize {
        self.targets_closed.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn shutdown_calls(&self) -> usize {
        self.shutdown_calls.load(Ordering::SeqCst)
    }

    /// Every page client created so far
    pub fn clients(&self) -> Vec<Arc<MockCdpClient>> {
        lock(&self.clients).clone()
    }

    /// Context disposal, close and shutdown events in call order
    pub fn lifecycle(&self) -> Vec<String> {
        lock(&self.lifecycle).clone()
    }

    fn log(&self, event: &str) {
        lock(&self.lifecycle).push(event.to_string());
    }
}

#[async_trait]
impl CdpBrowser for MockCdpBrowser {
    async fn get_version(&self) -> Result<BrowserVersion, Error> {
        Ok(BrowserVersion {
            protocol_version: "1.3".to_string(),
            product: "MockChrome/120.0.0.0".to_string(),
            user_agent: "Mock".to_string(),
            js_version: "12.0".to_string(),
        })
    }

    async fn create_browser_context(&self) -> Result<String, Error> {
        if self.fail_context.load(Ordering::SeqCst) {
            return Err(Error::cdp("Target.createBrowserContext: mock failure"));
        }
        self.contexts_created.fetch_add(1, Ordering::SeqCst);
        Ok(format!("context-{}", uuid::Uuid::new_v4()))
    }

    async fn dispose_browser_context(&self, _context_id: &str) -> Result<(), Error> {
        self.contexts_disposed.fetch_add(1, Ordering::SeqCst);
        self.log("dispose_context");
        Ok(())
    }

    async fn create_target(&self, _context_id: &str, _url: &str) -> Result<String, Error> {
        Ok(format!("ws://mock/devtools/page/{}", uuid::Uuid::new_v4()))
    }

    async fn close_target(&self, _target_id: &str) -> Result<(), Error> {
        self.targets_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_client(&self, _target_url: &str) -> Result<Arc<dyn CdpClient>, Error> {
        let document = lock(&self.document).clone();
        let client = Arc::new(MockCdpClient::with_document(document));
        lock(&self.clients).push(Arc::clone(&client));
        Ok(client)
    }

    async fn close(&self) -> Result<(), Error> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.log("close");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), Error> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        self.log("shutdown");
        Ok(())
    }
}

/// Mock browser launcher
#[derive(Debug, Default)]
pub struct MockLauncher {
    document: MockDocument,
    delay: Duration,
    launches: AtomicUsize,
    fail_next: AtomicBool,
    fail_context: AtomicBool,
    browsers: Mutex<Vec<Arc<MockCdpBrowser>>>,
}

impl MockLauncher {
    /// Create a launcher whose browsers serve `document`
    pub fn new(document: MockDocument) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    /// Wait `delay` inside every launch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make the next launch fail
    pub fn fail_next_launch(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Make browsers launched from now on fail to create a context
    pub fn fail_context_creation(&self) {
        self.fail_context.store(true, Ordering::SeqCst);
    }

    /// Number of launch attempts
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// Browsers launched successfully, oldest first
    pub fn browsers(&self) -> Vec<Arc<MockCdpBrowser>> {
        lock(&self.browsers).clone()
    }

    /// Most recently launched browser
    pub fn last_browser(&self) -> Option<Arc<MockCdpBrowser>> {
        lock(&self.browsers).last().cloned()
    }
}

#[async_trait]
impl BrowserLauncher for MockLauncher {
    async fn launch(&self, _options: &LaunchOptions) -> Result<Arc<dyn CdpBrowser>, Error> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.launches.fetch_add(1, Ordering::SeqCst);

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(Error::session_init("mock launch failure"));
        }

        let browser = Arc::new(MockCdpBrowser::new(self.document.clone()));
        if self.fail_context.load(Ordering::SeqCst) {
            browser.fail_context_creation();
        }
        lock(&self.browsers).push(Arc::clone(&browser));

        Ok(browser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_answers_probes() {
        let client = MockCdpClient::with_document(MockDocument::with_post(serde_json::json!({ "text": "hi" })));

        assert_eq!(
            client.evaluate(DOM_READY_PROBE, false).await.unwrap(),
            EvaluationResult::Bool(true)
        );
        assert_eq!(
            client.evaluate(&selector_probe("article"), false).await.unwrap(),
            EvaluationResult::Bool(true)
        );
        assert_eq!(
            client.evaluate(&selector_probe("main"), false).await.unwrap(),
            EvaluationResult::Bool(false)
        );
        assert!(matches!(
            client.evaluate(EXTRACTION_SCRIPT, false).await.unwrap(),
            EvaluationResult::Object(_)
        ));
    }

    #[tokio::test]
    async fn test_mock_client_rejects_after_close() {
        let client = MockCdpClient::new();
        client.connection().close().await.unwrap();

        assert!(client.is_closed());
        assert!(client.evaluate(DOM_READY_PROBE, false).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_launcher_fail_next() {
        let launcher = MockLauncher::default();
        launcher.fail_next_launch();

        assert!(launcher.launch(&LaunchOptions::default()).await.is_err());
        assert!(launcher.launch(&LaunchOptions::default()).await.is_ok());
        assert_eq!(launcher.launches(), 2);
        assert_eq!(launcher.browsers().len(), 1);
    }
}
