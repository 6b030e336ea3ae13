//! CDP browser control implementation
//!
//! This module provides browser-level operations via CDP.

use super::client::CdpClientImpl;
use super::connection::CdpWebSocketConnection;
use super::traits::*;
use crate::Error;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Child;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// How long a closing browser gets to exit before it is killed
const PROCESS_EXIT_GRACE: Duration = Duration::from_secs(5);

/// CDP browser implementation
#[derive(Debug)]
pub struct CdpBrowserImpl {
    /// Browser WebSocket endpoint (e.g., "ws://127.0.0.1:9222/devtools/browser/<id>")
    endpoint: String,
    /// Browser-level connection
    connection: Arc<CdpWebSocketConnection>,
    /// Page connections (target_id -> connection)
    connections: Mutex<HashMap<String, Arc<dyn CdpConnection>>>,
    /// Owned browser process, absent when attached to an external browser
    process: Mutex<Option<Child>>,
    /// Throwaway profile directory, removed on drop
    profile_dir: Mutex<Option<TempDir>>,
    /// Timeout applied to page navigations
    navigation_timeout: Duration,
}

impl CdpBrowserImpl {
    /// Attach to a browser through its DevTools WebSocket endpoint
    ///
    /// # Arguments
    /// * `endpoint` - Browser WebSocket endpoint reported by Chrome
    pub async fn connect<S: Into<String>>(endpoint: S, navigation_timeout: Duration) -> Result<Self, Error> {
        let endpoint = endpoint.into();
        info!("CdpBrowser::connect: attaching to {}", endpoint);

        let connection = CdpWebSocketConnection::new(endpoint.as_str()).await?;

        Ok(Self {
            endpoint,
            connection,
            connections: Mutex::new(HashMap::new()),
            process: Mutex::new(None),
            profile_dir: Mutex::new(None),
            navigation_timeout,
        })
    }

    /// Take ownership of the process and profile directory behind this browser
    pub async fn adopt_process(&self, child: Child, profile_dir: TempDir) {
        *self.process.lock().await = Some(child);
        *self.profile_dir.lock().await = Some(profile_dir);
    }

    /// Browser WebSocket endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the page WebSocket URL for a target id
    fn target_ws_url(&self, target_id: &str) -> Result<String, Error> {
        let host = host_of(&self.endpoint)
            .ok_or_else(|| Error::cdp(format!("Malformed browser endpoint: {}", self.endpoint)))?;
        Ok(format!("ws://{}/devtools/page/{}", host, target_id))
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, Error> {
        let response = self.connection.send_command(method, params).await?;
        response.result.ok_or_else(|| Error::cdp(format!("No result for {}", method)))
    }

    /// Close every page connection opened through this browser
    async fn close_page_connections(&self) {
        let mut connections = self.connections.lock().await;
        for (target_id, connection) in connections.drain() {
            if let Err(e) = connection.close().await {
                debug!("CdpBrowser: failed to close page connection {}: {}", target_id, e);
            }
        }
    }
}

/// Extract `host:port` from a WebSocket URL
fn host_of(endpoint: &str) -> Option<&str> {
    let rest = endpoint
        .strip_prefix("ws://")
        .or_else(|| endpoint.strip_prefix("wss://"))?;
    let host = rest.split('/').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

fn str_field(value: &serde_json::Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string()
}

#[async_trait]
impl CdpBrowser for CdpBrowserImpl {
    /// Get browser version
    async fn get_version(&self) -> Result<BrowserVersion, Error> {
        let version = self.call("Browser.getVersion", serde_json::json!({})).await?;

        Ok(BrowserVersion {
            protocol_version: str_field(&version, "protocolVersion"),
            product: str_field(&version, "product"),
            user_agent: str_field(&version, "userAgent"),
            js_version: str_field(&version, "jsVersion"),
        })
    }

    async fn create_browser_context(&self) -> Result<String, Error> {
        let result = self
            .call(
                "Target.createBrowserContext",
                serde_json::json!({ "disposeOnDetach": true }),
            )
            .await?;

        let context_id = result
            .get("browserContextId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::cdp("No browserContextId in createBrowserContext result"))?;

        info!("CdpBrowser::create_browser_context: {}", context_id);
        Ok(context_id.to_string())
    }

    async fn dispose_browser_context(&self, context_id: &str) -> Result<(), Error> {
        info!("CdpBrowser::dispose_browser_context: {}", context_id);

        self.call(
            "Target.disposeBrowserContext",
            serde_json::json!({ "browserContextId": context_id }),
        )
        .await?;

        Ok(())
    }

    async fn create_target(&self, context_id: &str, url: &str) -> Result<String, Error> {
        let result = self
            .call(
                "Target.createTarget",
                serde_json::json!({ "url": url, "browserContextId": context_id }),
            )
            .await?;

        let target_id = result
            .get("targetId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::cdp("No targetId in createTarget result"))?;

        debug!("CdpBrowser::create_target: {} in context {}", target_id, context_id);
        self.target_ws_url(target_id)
    }

    async fn close_target(&self, target_id: &str) -> Result<(), Error> {
        debug!("CdpBrowser::close_target: {}", target_id);

        if let Some(connection) = self.connections.lock().await.remove(target_id) {
            connection.close().await.ok();
        }

        self.call("Target.closeTarget", serde_json::json!({ "targetId": target_id }))
            .await?;

        Ok(())
    }

    /// Create a new CDP client for a page target
    async fn create_client(&self, target_url: &str) -> Result<Arc<dyn CdpClient>, Error> {
        debug!("CdpBrowser::create_client: {}", target_url);

        let connection =
            CdpWebSocketConnection::with_navigation_timeout(target_url, self.navigation_timeout).await?;

        let target_id = target_url.rsplit('/').next().unwrap_or(target_url).to_string();
        self.connections
            .lock()
            .await
            .insert(target_id, Arc::clone(&connection) as Arc<dyn CdpConnection>);

        let client = Arc::new(CdpClientImpl::new(connection));

        client.enable_domain("Page").await?;
        client.enable_domain("Runtime").await?;

        Ok(client)
    }

    /// Close the browser
    async fn close(&self) -> Result<(), Error> {
        info!("CdpBrowser::close: closing browser at {}", self.endpoint);

        self.close_page_connections().await;

        if !self.connection.is_active() {
            return Ok(());
        }

        match self.connection.send_command("Browser.close", serde_json::json!({})).await {
            Ok(_) => Ok(()),
            // The browser may drop the socket before acknowledging
            Err(Error::WebSocket(msg)) => {
                debug!("CdpBrowser::close: connection dropped during close: {}", msg);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Drop the browser connection and reap the owned process
    async fn shutdown(&self) -> Result<(), Error> {
        info!("CdpBrowser::shutdown: stopping {}", self.endpoint);

        self.close_page_connections().await;
        let closed = self.connection.close().await;

        if let Some(mut child) = self.process.lock().await.take() {
            match tokio::time::timeout(PROCESS_EXIT_GRACE, child.wait()).await {
                Ok(Ok(status)) => debug!("CdpBrowser::shutdown: browser exited with {}", status),
                Ok(Err(e)) => warn!("CdpBrowser::shutdown: failed to wait for browser: {}", e),
                Err(_) => {
                    warn!("CdpBrowser::shutdown: browser did not exit, killing it");
                    child.kill().await?;
                }
            }
        }

        self.profile_dir.lock().await.take();

        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_of() {
        assert_eq!(
            host_of("ws://127.0.0.1:38211/devtools/browser/5c1e"),
            Some("127.0.0.1:38211")
        );
        assert_eq!(host_of("wss://remote.example.com:9222/x"), Some("remote.example.com:9222"));
        assert_eq!(host_of("http://127.0.0.1:9222"), None);
        assert_eq!(host_of("ws:///devtools"), None);
    }

    #[test]
    fn test_str_field_defaults_to_unknown() {
        let value = serde_json::json!({ "product": "HeadlessChrome/120.0.0.0" });
        assert_eq!(str_field(&value, "product"), "HeadlessChrome/120.0.0.0");
        assert_eq!(str_field(&value, "jsVersion"), "unknown");
    }
}
