//! Host-facing plugin adapter
//!
//! Exposes the lifecycle hooks and a blocking `parse` for synchronous hosts.
//! Parsers are tried in order; the browser engine is always last.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::FxTwitterClient;
use crate::bridge::Bridge;
use crate::config::Config;
use crate::extract::{CanonicalRecord, ExtractionEngine};
use crate::parser::{is_post_url, ContentParser};
use crate::Error;

/// X/Twitter parser plugin
#[derive(Debug)]
pub struct TwitterParserPlugin {
    bridge: Bridge,
    engine: Arc<ExtractionEngine>,
    parsers: Vec<Arc<dyn ContentParser>>,
    enabled: AtomicBool,
}

impl TwitterParserPlugin {
    /// Build the plugin from configuration
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut plugin = Self::with_engine(ExtractionEngine::from_config(config));

        if config.api_enabled {
            plugin = plugin.with_api(Arc::new(FxTwitterClient::from_config(config)?));
        }

        Ok(plugin)
    }

    /// Plugin around `engine` with no API parser
    pub fn with_engine(engine: ExtractionEngine) -> Self {
        let engine = Arc::new(engine);
        let parsers: Vec<Arc<dyn ContentParser>> = vec![engine.clone() as Arc<dyn ContentParser>];

        Self {
            bridge: Bridge::new(),
            engine,
            parsers,
            enabled: AtomicBool::new(false),
        }
    }

    /// Try `parser` before every parser already registered
    pub fn with_api(mut self, parser: Arc<dyn ContentParser>) -> Self {
        self.parsers.insert(0, parser);
        self
    }

    pub fn engine(&self) -> &ExtractionEngine {
        &self.engine
    }

    /// Names of the parser chain, in the order they are tried
    pub fn parser_names(&self) -> Vec<String> {
        self.parsers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn on_load(&self) {
        info!(parsers = ?self.parser_names(), "plugin loaded");
    }

    pub fn on_enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
        info!("plugin enabled");
    }

    pub fn on_disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        self.teardown();
        info!("plugin disabled");
    }

    pub fn on_unload(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        self.teardown();
        info!("plugin unloaded");
    }

    /// Stop the browser session, waiting out an initialization in flight
    fn teardown(&self) {
        let engine = Arc::clone(&self.engine);
        let result = self.bridge.run(async move {
            engine.shutdown().await;
            Ok(())
        });

        if let Err(e) = result {
            warn!("session teardown failed: {}", e);
        }
    }

    pub fn can_parse(&self, url: &str) -> bool {
        is_post_url(url)
    }

    /// Parse `url`, blocking the calling thread until a record or an error
    pub fn parse(&self, url: &str) -> Result<CanonicalRecord, Error> {
        if !self.is_enabled() {
            return Err(Error::internal("plugin is not enabled").for_url(url));
        }
        if !self.can_parse(url) {
            return Err(Error::internal("not an X/Twitter post URL").for_url(url));
        }

        self.bridge.run(self.parse_chain(url))
    }

    async fn parse_chain(&self, url: &str) -> Result<CanonicalRecord, Error> {
        let mut last_error = None;

        for parser in &self.parsers {
            match parser.parse(url).await {
                Ok(record) => return Ok(record),
                Err(e) => {
                    warn!(url = %url, parser = parser.name(), "parser failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| Error::internal("no parser registered"))
            .for_url(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_order() {
        let plugin = TwitterParserPlugin::new(&Config {
            api_enabled: true,
            ..Config::default()
        })
        .unwrap();
        assert_eq!(plugin.parser_names(), vec!["fxtwitter", "twitter_parser"]);

        let plugin = TwitterParserPlugin::new(&Config::default()).unwrap();
        assert_eq!(plugin.parser_names(), vec!["twitter_parser"]);
    }

    #[test]
    fn test_load_is_lazy() {
        let plugin = TwitterParserPlugin::new(&Config::default()).unwrap();
        plugin.on_load();
        plugin.on_enable();

        assert!(plugin.is_enabled());
        assert!(!plugin.engine().sessions().is_live());

        plugin.on_unload();
        assert!(!plugin.is_enabled());
    }

    #[test]
    fn test_rejects_unsupported_url() {
        let plugin = TwitterParserPlugin::new(&Config::default()).unwrap();
        plugin.on_enable();

        let err = plugin.parse("https://example.com/a/status/1").unwrap_err();
        assert_eq!(err.url(), Some("https://example.com/a/status/1"));
        assert!(matches!(err.root(), Error::Internal(_)));
    }

    #[test]
    fn test_rejects_when_disabled() {
        let plugin = TwitterParserPlugin::new(&Config::default()).unwrap();

        let err = plugin.parse("https://x.com/a/status/1").unwrap_err();
        assert!(matches!(err.root(), Error::Internal(_)));
    }
}
