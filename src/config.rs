//! Configuration management for xpost-extract

use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chrome executable path
    pub chrome_path: Option<String>,

    /// Run the browser without a window
    pub headless: bool,

    /// Extra arguments passed to Chrome
    pub chrome_args: Vec<String>,

    /// Time allowed for the browser to report its DevTools endpoint, in milliseconds
    pub launch_timeout: u64,

    /// Viewport width of the browsing context
    pub viewport_width: u32,

    /// Viewport height of the browsing context
    pub viewport_height: u32,

    /// User agent of the browsing context
    pub user_agent: String,

    /// Locale of the browsing context
    pub locale: String,

    /// IANA timezone of the browsing context
    pub timezone: String,

    /// Top-level navigation timeout in milliseconds
    pub navigation_timeout: u64,

    /// Timeout for the primary readiness selector in milliseconds
    pub primary_selector_timeout: u64,

    /// Timeout for the fallback readiness selector in milliseconds
    pub fallback_selector_timeout: u64,

    /// Fixed delay after readiness in milliseconds
    pub settle_delay: u64,

    /// Interval between readiness probes in milliseconds
    pub poll_interval: u64,

    /// Try the HTTP API proxy before the browser
    pub api_enabled: bool,

    /// Host of the HTTP API proxy
    pub api_host: String,

    /// HTTP API request timeout in milliseconds
    pub api_timeout: u64,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            chrome_args: Vec::new(),
            launch_timeout: 30000,
            viewport_width: 1920,
            viewport_height: 1080,
            user_agent: crate::stealth::DESKTOP_USER_AGENT.to_string(),
            locale: "zh-CN".to_string(),
            timezone: "Asia/Shanghai".to_string(),
            navigation_timeout: 60000,
            primary_selector_timeout: 30000,
            fallback_selector_timeout: 20000,
            settle_delay: 3000,
            poll_interval: 100,
            api_enabled: false,
            api_host: "api.fxtwitter.com".to_string(),
            api_timeout: 15000,
            log_level: "info".to_string(),
        }
    }
}

/// Parse an environment variable into `target` when it is set
fn env_override<T: FromStr>(name: &str, target: &mut T) -> Result<()> {
    if let Ok(raw) = env::var(name) {
        *target = raw
            .parse()
            .map_err(|_| Error::configuration(format!("Invalid {}", name)))?;
    }
    Ok(())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(chrome_path) = env::var("XPOST_CHROME_PATH") {
            config.chrome_path = Some(chrome_path);
        }

        if let Ok(args) = env::var("XPOST_CHROME_ARGS") {
            config.chrome_args = args.split_whitespace().map(str::to_string).collect();
        }

        env_override("XPOST_HEADLESS", &mut config.headless)?;
        env_override("XPOST_LAUNCH_TIMEOUT", &mut config.launch_timeout)?;
        env_override("XPOST_VIEWPORT_WIDTH", &mut config.viewport_width)?;
        env_override("XPOST_VIEWPORT_HEIGHT", &mut config.viewport_height)?;
        env_override("XPOST_USER_AGENT", &mut config.user_agent)?;
        env_override("XPOST_LOCALE", &mut config.locale)?;
        env_override("XPOST_TIMEZONE", &mut config.timezone)?;
        env_override("XPOST_NAVIGATION_TIMEOUT", &mut config.navigation_timeout)?;
        env_override("XPOST_PRIMARY_SELECTOR_TIMEOUT", &mut config.primary_selector_timeout)?;
        env_override("XPOST_FALLBACK_SELECTOR_TIMEOUT", &mut config.fallback_selector_timeout)?;
        env_override("XPOST_SETTLE_DELAY", &mut config.settle_delay)?;
        env_override("XPOST_POLL_INTERVAL", &mut config.poll_interval)?;
        env_override("XPOST_API_ENABLED", &mut config.api_enabled)?;
        env_override("XPOST_API_HOST", &mut config.api_host)?;
        env_override("XPOST_API_TIMEOUT", &mut config.api_timeout)?;
        env_override("XPOST_LOG_LEVEL", &mut config.log_level)?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text; absent keys keep their defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(Error::configuration("Viewport dimensions must be non-zero"));
        }
        if self.navigation_timeout == 0 {
            return Err(Error::configuration("navigation_timeout must be non-zero"));
        }
        if self.poll_interval == 0 {
            return Err(Error::configuration("poll_interval must be non-zero"));
        }
        if self.locale.trim().is_empty() || self.timezone.trim().is_empty() {
            return Err(Error::configuration("locale and timezone are required"));
        }
        Ok(())
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout)
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_millis(self.launch_timeout)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout)
    }
}
