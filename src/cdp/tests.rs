//! CDP layer integration tests
//!
//! These tests launch a local Chrome/Chromium. They are skipped when no
//! executable is found (set `CHROME_BIN` to point at one).

use super::launcher::ChromeLauncher;
use super::traits::*;
use std::sync::Arc;
use std::time::Duration;

/// Test helper: launch a headless browser, or `None` when Chrome is unavailable
async fn launch_chrome() -> Option<Arc<dyn CdpBrowser>> {
    ChromeLauncher::find_executable(None)?;

    let launcher = ChromeLauncher::new(Duration::from_secs(30));
    match launcher.launch(&LaunchOptions::default()).await {
        Ok(browser) => Some(browser),
        Err(e) => {
            eprintln!("Chrome launch failed: {}", e);
            None
        }
    }
}

#[tokio::test]
async fn test_browser_get_version() {
    let Some(browser) = launch_chrome().await else {
        eprintln!("Skipping test: Chrome not available");
        return;
    };

    let version = browser.get_version().await.expect("Failed to get browser version");
    assert!(!version.protocol_version.is_empty());
    assert!(!version.product.is_empty());

    browser.close().await.ok();
    browser.shutdown().await.ok();
}

#[tokio::test]
async fn test_context_page_evaluate() {
    let Some(browser) = launch_chrome().await else {
        eprintln!("Skipping test: Chrome not available");
        return;
    };

    let context_id = browser.create_browser_context().await.expect("context");
    let target_url = browser.create_target(&context_id, "about:blank").await.expect("target");
    assert!(target_url.starts_with("ws://"));

    let client = browser.create_client(&target_url).await.expect("client");

    let sum = client.evaluate("1 + 2", false).await.expect("evaluate");
    assert_eq!(sum, EvaluationResult::Number(3.0));

    let object = client.evaluate("({ a: 'b' })", false).await.expect("evaluate");
    assert_eq!(object, EvaluationResult::Object(serde_json::json!({ "a": "b" })));

    let thrown = client.evaluate("undefinedFunction()", false).await;
    assert!(matches!(thrown, Err(crate::Error::ScriptExecutionFailed(_))));

    browser.dispose_browser_context(&context_id).await.expect("dispose");
    browser.close().await.ok();
    browser.shutdown().await.ok();
}

#[tokio::test]
async fn test_navigate_reports_network_error() {
    let Some(browser) = launch_chrome().await else {
        eprintln!("Skipping test: Chrome not available");
        return;
    };

    let context_id = browser.create_browser_context().await.expect("context");
    let target_url = browser.create_target(&context_id, "about:blank").await.expect("target");
    let client = browser.create_client(&target_url).await.expect("client");

    let result = client.navigate("http://127.0.0.1:1/unreachable").await;
    assert!(matches!(result, Err(crate::Error::NavigationFailed(_))));

    browser.close().await.ok();
    browser.shutdown().await.ok();
}
