//! Session manager implementation
//!
//! Lazily creates the browser session and tears it down on request.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::browser::BrowserSession;
use super::traits::SessionManager;
use crate::cdp::{BrowserLauncher, ChromeLauncher, LaunchOptions};
use crate::config::Config;
use crate::stealth::ContextProfile;
use crate::Error;

/// Session manager implementation
#[derive(Debug)]
pub struct SessionManagerImpl {
    launcher: Arc<dyn BrowserLauncher>,
    options: LaunchOptions,
    profile: ContextProfile,
    /// Live session; the lock is held for a whole initialization or teardown
    session: Mutex<Option<Arc<BrowserSession>>>,
    live: AtomicBool,
}

impl SessionManagerImpl {
    /// Create a new session manager
    pub fn new(launcher: Arc<dyn BrowserLauncher>, options: LaunchOptions, profile: ContextProfile) -> Self {
        Self {
            launcher,
            options,
            profile,
            session: Mutex::new(None),
            live: AtomicBool::new(false),
        }
    }

    /// Create a session manager that launches a local Chrome
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(ChromeLauncher::new(config.navigation_timeout())),
            LaunchOptions::from_config(config),
            ContextProfile::from_config(config),
        )
    }

    async fn initialize(&self) -> Result<Arc<BrowserSession>, Error> {
        info!("SessionManager::initialize: launching browser");

        let browser = self.launcher.launch(&self.options).await.map_err(|e| match e {
            Error::SessionInit(_) => e,
            other => Error::session_init(format!("browser launch failed: {}", other)),
        })?;

        match browser.create_browser_context().await {
            Ok(context_id) => {
                let session = Arc::new(BrowserSession::new(browser, context_id, self.profile.clone()));
                info!(session_id = %session.id(), "SessionManager::initialize: session ready");
                Ok(session)
            }
            Err(e) => {
                error!("SessionManager::initialize: context creation failed: {}", e);

                if let Err(close_err) = browser.close().await {
                    warn!("SessionManager::initialize: browser close failed: {}", close_err);
                }
                if let Err(stop_err) = browser.shutdown().await {
                    warn!("SessionManager::initialize: engine shutdown failed: {}", stop_err);
                }

                Err(Error::session_init(format!("browsing context creation failed: {}", e)))
            }
        }
    }
}

#[async_trait]
impl SessionManager for SessionManagerImpl {
    async fn ensure_ready(&self) -> Result<Arc<BrowserSession>, Error> {
        let mut guard = self.session.lock().await;

        if let Some(session) = guard.as_ref() {
            return Ok(Arc::clone(session));
        }

        let session = self.initialize().await?;
        *guard = Some(Arc::clone(&session));
        self.live.store(true, Ordering::SeqCst);

        Ok(session)
    }

    async fn teardown(&self) {
        let mut guard = self.session.lock().await;

        let Some(session) = guard.take() else {
            return;
        };

        info!(session_id = %session.id(), "SessionManager::teardown");
        self.live.store(false, Ordering::SeqCst);
        session.shutdown().await;
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}
