//! CDP client implementation
//!
//! This module provides a page-level CDP client with typed methods for the
//! operations the extraction engine performs.

use super::traits::*;
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// CDP client implementation
#[derive(Debug, Clone)]
pub struct CdpClientImpl {
    /// Underlying CDP connection
    connection: Arc<dyn CdpConnection>,
}

impl CdpClientImpl {
    /// Create a new CDP client
    ///
    /// # Arguments
    /// * `connection` - CDP connection instance
    pub fn new(connection: Arc<dyn CdpConnection>) -> Self {
        Self { connection }
    }

    /// Parse remote object value to evaluation result
    fn parse_remote_object(obj: &RemoteObject) -> EvaluationResult {
        match obj.r#type.as_str() {
            "string" => EvaluationResult::String(
                obj.value
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
            ),
            "number" => EvaluationResult::Number(
                obj.value.as_ref().and_then(|v| v.as_f64()).unwrap_or(0.0),
            ),
            "boolean" => EvaluationResult::Bool(
                obj.value.as_ref().and_then(|v| v.as_bool()).unwrap_or(false),
            ),
            "object" => match &obj.value {
                None | Some(serde_json::Value::Null) => EvaluationResult::Null,
                Some(value) => EvaluationResult::Object(value.clone()),
            },
            "undefined" => EvaluationResult::Null,
            other => {
                debug!("parse_remote_object: unsupported type '{}', returning Null", other);
                EvaluationResult::Null
            }
        }
    }

    /// Describe an exception thrown by evaluated script
    fn describe_exception(details: &ExceptionDetails) -> String {
        details
            .exception
            .as_ref()
            .and_then(|e| e.description.clone())
            .or_else(|| details.text.clone())
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

#[async_trait]
impl CdpClient for CdpClientImpl {
    /// Get the underlying connection
    fn connection(&self) -> Arc<dyn CdpConnection> {
        Arc::clone(&self.connection)
    }

    /// Navigate to a URL
    ///
    /// Returns once the browser has committed the navigation; readiness of the
    /// new document is the caller's concern.
    async fn navigate(&self, url: &str) -> Result<NavigationResult, Error> {
        info!("CdpClient::navigate: {}", url);

        let params = NavigateParams {
            url: url.to_string(),
            referrer: None,
        };

        let result = self
            .call_method("Page.navigate", serde_json::to_value(params)?)
            .await?;

        let response: NavigateResponse = serde_json::from_value(result)?;

        if let Some(error_text) = response.error_text.filter(|t| !t.is_empty()) {
            return Err(Error::navigation_failed(format!("{}: {}", url, error_text)));
        }

        Ok(NavigationResult {
            navigation_id: response.loader_id,
            frame_id: response.frame_id,
            url: url.to_string(),
        })
    }

    /// Evaluate JavaScript in the page
    async fn evaluate(&self, script: &str, await_promise: bool) -> Result<EvaluationResult, Error> {
        let params = EvaluateParams {
            expression: script.to_string(),
            await_promise: Some(await_promise),
            return_by_value: Some(true),
        };

        let result = self
            .call_method("Runtime.evaluate", serde_json::to_value(params)?)
            .await?;

        let eval_response: EvaluateResponse = serde_json::from_value(result)
            .map_err(|e| Error::cdp(format!("Failed to parse EvaluateResponse: {}", e)))?;

        if let Some(details) = &eval_response.exception_details {
            return Err(Error::script_execution_failed(Self::describe_exception(details)));
        }

        Ok(Self::parse_remote_object(&eval_response.result))
    }

    /// Enable a domain
    async fn enable_domain(&self, domain: &str) -> Result<(), Error> {
        debug!("Enabling domain: {}", domain);

        let method = format!("{}.enable", domain);
        self.call_method(&method, serde_json::json!({})).await?;

        Ok(())
    }

    /// Call a raw CDP method
    async fn call_method(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, Error> {
        let response = self.connection.send_command(method, params).await?;

        response.result.ok_or_else(|| Error::cdp("No result in response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(kind: &str, value: Option<serde_json::Value>) -> RemoteObject {
        RemoteObject {
            r#type: kind.to_string(),
            subtype: None,
            value,
            description: None,
        }
    }

    #[test]
    fn test_parse_remote_object_string() {
        let result = CdpClientImpl::parse_remote_object(&remote("string", Some(serde_json::json!("test"))));
        assert_eq!(result, EvaluationResult::String("test".to_string()));
    }

    #[test]
    fn test_parse_remote_object_number() {
        let result = CdpClientImpl::parse_remote_object(&remote("number", Some(serde_json::json!(42.5))));
        assert_eq!(result, EvaluationResult::Number(42.5));
    }

    #[test]
    fn test_parse_remote_object_bool() {
        let result = CdpClientImpl::parse_remote_object(&remote("boolean", Some(serde_json::json!(true))));
        assert_eq!(result, EvaluationResult::Bool(true));
    }

    #[test]
    fn test_parse_remote_object_null_object() {
        let mut obj = remote("object", Some(serde_json::Value::Null));
        obj.subtype = Some("null".to_string());

        assert_eq!(CdpClientImpl::parse_remote_object(&obj), EvaluationResult::Null);
        assert_eq!(CdpClientImpl::parse_remote_object(&remote("undefined", None)), EvaluationResult::Null);
    }

    #[test]
    fn test_parse_remote_object_value() {
        let value = serde_json::json!({ "content": "hi", "images": [] });
        let result = CdpClientImpl::parse_remote_object(&remote("object", Some(value.clone())));
        assert_eq!(result, EvaluationResult::Object(value));
    }

    #[test]
    fn test_describe_exception_prefers_description() {
        let details = ExceptionDetails {
            text: Some("Uncaught".to_string()),
            exception: Some(RemoteObject {
                description: Some("TypeError: x is null".to_string()),
                ..RemoteObject::default()
            }),
        };
        assert_eq!(CdpClientImpl::describe_exception(&details), "TypeError: x is null");

        let bare = ExceptionDetails {
            text: Some("Uncaught".to_string()),
            exception: None,
        };
        assert_eq!(CdpClientImpl::describe_exception(&bare), "Uncaught");
    }
}
