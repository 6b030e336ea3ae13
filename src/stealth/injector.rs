//! Profile injector
//!
//! Applies a [`ContextProfile`] to a freshly created page over CDP.

use serde_json::json;
use tracing::debug;

use super::profile::ContextProfile;
use crate::cdp::CdpClient;
use crate::Error;

/// Features applied to a page, in application order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedFeatures {
    pub features: Vec<String>,
}

/// Apply `profile` to the page behind `client`
///
/// Must run before the first navigation so the init script and the overrides
/// are in place for the target document.
pub async fn apply_profile(client: &dyn CdpClient, profile: &ContextProfile) -> Result<AppliedFeatures, Error> {
    let mut applied = Vec::new();

    // User agent first, before anything can issue a request
    client
        .call_method(
            "Network.setUserAgentOverride",
            json!({
                "userAgent": profile.user_agent,
                "acceptLanguage": profile.accept_language(),
                "platform": profile.platform(),
            }),
        )
        .await?;
    applied.push("user_agent".to_string());

    client
        .call_method(
            "Emulation.setDeviceMetricsOverride",
            json!({
                "width": profile.viewport.width,
                "height": profile.viewport.height,
                "deviceScaleFactor": 1,
                "mobile": false,
            }),
        )
        .await?;
    applied.push("viewport".to_string());

    client
        .call_method("Emulation.setLocaleOverride", json!({ "locale": profile.locale }))
        .await?;
    applied.push("locale".to_string());

    client
        .call_method(
            "Emulation.setTimezoneOverride",
            json!({ "timezoneId": profile.timezone }),
        )
        .await?;
    applied.push("timezone".to_string());

    if !profile.init_script.is_empty() {
        client
            .call_method(
                "Page.addScriptToEvaluateOnNewDocument",
                json!({ "source": profile.init_script }),
            )
            .await?;
        applied.push("init_script".to_string());
    }

    debug!("apply_profile: applied {:?}", applied);
    Ok(AppliedFeatures { features: applied })
}
