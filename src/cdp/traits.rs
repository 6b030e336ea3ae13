//! CDP (Chrome DevTools Protocol) layer traits
//!
//! This module defines the abstract interfaces for CDP communication.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// CDP response representation
#[derive(Debug, Clone)]
pub struct CdpResponse {
    /// Response ID (matches request ID)
    pub id: u64,
    /// Response result
    pub result: Option<Value>,
    /// Error if any
    pub error: Option<CdpError>,
}

/// CDP error representation
#[derive(Debug, Clone)]
pub struct CdpError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    pub data: Option<Value>,
}

/// CDP connection trait
///
/// Represents a WebSocket connection to a Chrome DevTools Protocol target.
#[async_trait]
pub trait CdpConnection: Send + Sync + std::fmt::Debug {
    /// Send a CDP command and wait for response
    async fn send_command(&self, method: &str, params: Value) -> Result<CdpResponse, crate::Error>;

    /// Close the connection
    async fn close(&self) -> Result<(), crate::Error>;

    /// Check if connection is active
    fn is_active(&self) -> bool;
}

/// CDP client trait
///
/// Page-level client with typed methods for the operations the engine needs.
#[async_trait]
pub trait CdpClient: Send + Sync + std::fmt::Debug {
    /// Get the underlying connection
    fn connection(&self) -> Arc<dyn CdpConnection>;

    /// Start navigating to a URL; returns once the browser has committed to it
    async fn navigate(&self, url: &str) -> Result<NavigationResult, crate::Error>;

    /// Evaluate JavaScript in the page
    async fn evaluate(&self, script: &str, await_promise: bool) -> Result<EvaluationResult, crate::Error>;

    /// Enable a domain
    async fn enable_domain(&self, domain: &str) -> Result<(), crate::Error>;

    /// Call a raw CDP method (returns JSON Value)
    async fn call_method(&self, method: &str, params: Value) -> Result<Value, crate::Error>;
}

/// Navigation result
#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// Loader ID of the new document
    pub navigation_id: Option<String>,
    /// Frame that navigated
    pub frame_id: String,
    /// Requested URL
    pub url: String,
}

/// JavaScript evaluation result
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationResult {
    /// String value
    String(String),
    /// Number value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Null value
    Null,
    /// Object/Array (as JSON)
    Object(Value),
}

/// CDP browser trait
///
/// Controls one running browser process over its browser-level connection.
#[async_trait]
pub trait CdpBrowser: Send + Sync + std::fmt::Debug {
    /// Get browser version
    async fn get_version(&self) -> Result<BrowserVersion, crate::Error>;

    /// Create an isolated browsing context and return its id
    async fn create_browser_context(&self) -> Result<String, crate::Error>;

    /// Dispose a browsing context and every page in it
    async fn dispose_browser_context(&self, context_id: &str) -> Result<(), crate::Error>;

    /// Create a page target inside a browsing context
    ///
    /// Returns the WebSocket URL of the new target.
    async fn create_target(&self, context_id: &str, url: &str) -> Result<String, crate::Error>;

    /// Close a page target
    async fn close_target(&self, target_id: &str) -> Result<(), crate::Error>;

    /// Connect a page client to a target WebSocket URL
    async fn create_client(&self, target_url: &str) -> Result<Arc<dyn CdpClient>, crate::Error>;

    /// Ask the browser to close
    async fn close(&self) -> Result<(), crate::Error>;

    /// Stop the automation engine: drop the connection and reap the process
    async fn shutdown(&self) -> Result<(), crate::Error>;
}

/// Options for launching a browser process
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Headless mode (no GUI)
    pub headless: bool,
    /// Chrome executable path
    pub executable_path: Option<String>,
    /// Additional arguments to pass to Chrome
    pub args: Vec<String>,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Time allowed for the DevTools endpoint to appear
    pub launch_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            executable_path: None,
            args: vec![],
            window_width: 1920,
            window_height: 1080,
            launch_timeout: Duration::from_secs(30),
        }
    }
}

impl LaunchOptions {
    /// Build launch options from the engine configuration
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            headless: config.headless,
            executable_path: config.chrome_path.clone(),
            args: config.chrome_args.clone(),
            window_width: config.viewport_width,
            window_height: config.viewport_height,
            launch_timeout: config.launch_timeout(),
        }
    }
}

/// Browser launcher trait
///
/// Starts a browser process and hands back its controller.
#[async_trait]
pub trait BrowserLauncher: Send + Sync + std::fmt::Debug {
    /// Launch a browser
    async fn launch(&self, options: &LaunchOptions) -> Result<Arc<dyn CdpBrowser>, crate::Error>;
}

/// Browser version information
#[derive(Debug, Clone)]
pub struct BrowserVersion {
    /// Protocol version
    pub protocol_version: String,
    /// Product name
    pub product: String,
    /// User agent
    pub user_agent: String,
    /// JavaScript engine version
    pub js_version: String,
}
