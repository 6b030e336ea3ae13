//! Browsing-context profile
//!
//! The fingerprint every page of the session presents: viewport, user agent,
//! locale, timezone and the init script run before any page script.

use crate::config::Config;

/// Desktop Chrome on macOS
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Hides the automation flag from page scripts
pub const WEBDRIVER_MASK_SCRIPT: &str = r#"Object.defineProperty(navigator, 'webdriver', {
    get: () => undefined
});"#;

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Profile applied to every page of a browsing context
#[derive(Debug, Clone, PartialEq)]
pub struct ContextProfile {
    /// Viewport
    pub viewport: Viewport,
    /// User agent
    pub user_agent: String,
    /// BCP 47 locale, e.g. `zh-CN`
    pub locale: String,
    /// IANA timezone, e.g. `Asia/Shanghai`
    pub timezone: String,
    /// Script evaluated in every new document before page scripts
    pub init_script: String,
}

impl Default for ContextProfile {
    fn default() -> Self {
        Self {
            viewport: Viewport {
                width: 1920,
                height: 1080,
            },
            user_agent: DESKTOP_USER_AGENT.to_string(),
            locale: "zh-CN".to_string(),
            timezone: "Asia/Shanghai".to_string(),
            init_script: WEBDRIVER_MASK_SCRIPT.to_string(),
        }
    }
}

impl ContextProfile {
    /// Build the profile from the engine configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            viewport: Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
            },
            user_agent: config.user_agent.clone(),
            locale: config.locale.clone(),
            timezone: config.timezone.clone(),
            init_script: WEBDRIVER_MASK_SCRIPT.to_string(),
        }
    }

    /// `Accept-Language` header value for the locale
    pub fn accept_language(&self) -> String {
        match self.locale.split_once('-') {
            Some((language, _)) => format!("{},{};q=0.9", self.locale, language),
            None => self.locale.clone(),
        }
    }

    /// `navigator.platform` matching the user agent
    pub fn platform(&self) -> &'static str {
        if self.user_agent.contains("Macintosh") {
            "MacIntel"
        } else if self.user_agent.contains("Windows") {
            "Win32"
        } else {
            "Linux x86_64"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_language() {
        let profile = ContextProfile::default();
        assert_eq!(profile.accept_language(), "zh-CN,zh;q=0.9");

        let bare = ContextProfile {
            locale: "en".to_string(),
            ..ContextProfile::default()
        };
        assert_eq!(bare.accept_language(), "en");
    }

    #[test]
    fn test_platform_follows_user_agent() {
        assert_eq!(ContextProfile::default().platform(), "MacIntel");

        let windows = ContextProfile {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
            ..ContextProfile::default()
        };
        assert_eq!(windows.platform(), "Win32");
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            locale: "en-US".to_string(),
            timezone: "America/New_York".to_string(),
            viewport_width: 1280,
            ..Config::default()
        };
        let profile = ContextProfile::from_config(&config);

        assert_eq!(profile.locale, "en-US");
        assert_eq!(profile.timezone, "America/New_York");
        assert_eq!(profile.viewport, Viewport { width: 1280, height: 1080 });
        assert!(profile.init_script.contains("webdriver"));
    }
}
