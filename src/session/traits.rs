//! Session management traits
//!
//! This module defines the abstract interface for owning the browser session.

use async_trait::async_trait;
use std::sync::Arc;

use super::browser::BrowserSession;
use crate::Error;

/// Session manager trait
///
/// Owns at most one live [`BrowserSession`]. The session is created lazily by
/// the first caller and shared with every in-flight extraction.
#[async_trait]
pub trait SessionManager: Send + Sync + std::fmt::Debug {
    /// Return the live session, launching the browser and creating the
    /// browsing context if none exists
    async fn ensure_ready(&self) -> Result<Arc<BrowserSession>, Error>;

    /// Tear the session down: context, then browser, then automation engine.
    ///
    /// Step failures are logged; a no-op when nothing is live.
    async fn teardown(&self);

    /// Whether a session is currently live
    fn is_live(&self) -> bool;
}
