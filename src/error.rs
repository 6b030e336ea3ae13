//! Unified error types for xpost-extract

use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for xpost-extract
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket errors
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API proxy answered with an error payload
    #[error("API error: {0}")]
    Api(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Browser process or browsing context could not be created
    #[error("Session initialization failed: {0}")]
    SessionInit(String),

    /// The session was torn down while a page was requested from it
    #[error("Session closed: {0}")]
    SessionClosed(String),

    /// The document did not reach DOM-ready in time
    #[error("Navigation timed out: {0}")]
    NavigationTimeout(String),

    /// Navigation failed
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// The in-page script found no content container
    #[error("No post content found: {0}")]
    ExtractionNotFound(String),

    /// The sync/async bridge could not schedule the work
    #[error("Bridge dispatch failed: {0}")]
    BridgeDispatch(String),

    /// Timeout
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// Script execution failed
    #[error("Script execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// A failed parse of one URL, wrapping the original cause
    #[error("Failed to parse {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a new WebSocket error
    pub fn websocket<S: Into<String>>(msg: S) -> Self {
        Error::WebSocket(msg.into())
    }

    /// Create a new CDP error
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(msg: S) -> Self {
        Error::Api(msg.into())
    }

    /// Create a new session initialization error
    pub fn session_init<S: Into<String>>(msg: S) -> Self {
        Error::SessionInit(msg.into())
    }

    /// Create a new session closed error
    pub fn session_closed<S: Into<String>>(msg: S) -> Self {
        Error::SessionClosed(msg.into())
    }

    /// Create a new navigation timeout error
    pub fn navigation_timeout<S: Into<String>>(msg: S) -> Self {
        Error::NavigationTimeout(msg.into())
    }

    /// Create a new navigation failed error
    pub fn navigation_failed<S: Into<String>>(msg: S) -> Self {
        Error::NavigationFailed(msg.into())
    }

    /// Create a new extraction not found error
    pub fn extraction_not_found<S: Into<String>>(url: S) -> Self {
        Error::ExtractionNotFound(url.into())
    }

    /// Create a new bridge dispatch error
    pub fn bridge_dispatch<S: Into<String>>(msg: S) -> Self {
        Error::BridgeDispatch(msg.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create a new script execution failed error
    pub fn script_execution_failed<S: Into<String>>(msg: S) -> Self {
        Error::ScriptExecutionFailed(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Wrap this error as the failed parse of `url`.
    ///
    /// Already wrapped errors are returned unchanged so the cause is never
    /// nested twice.
    pub fn for_url<S: Into<String>>(self, url: S) -> Self {
        match self {
            Error::Parse { .. } => self,
            other => Error::Parse {
                url: url.into(),
                source: Box::new(other),
            },
        }
    }

    /// The original cause, looking through a [`Error::Parse`] wrapper
    pub fn root(&self) -> &Error {
        match self {
            Error::Parse { source, .. } => source.root(),
            other => other,
        }
    }

    /// The URL this error was raised for, if it has been wrapped
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Parse { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Whether the in-page script found no post container
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Error::ExtractionNotFound(_))
    }
}
