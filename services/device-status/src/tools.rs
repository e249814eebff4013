//! Device management API client for tool listing and invocation

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::DeviceStatusError;
use crate::io::HttpClient;

const TOOLS_LIST_PATH: &str = "/api/messaging/device/tools/list";
const TOOLS_CALL_PATH: &str = "/api/messaging/device/tools/call";

pub const SYSTEM_INFO_TOOL: &str = "self.get_system_info";
pub const DEVICE_STATUS_TOOL: &str = "self.get_device_status";
pub const SCREEN_INFO_TOOL: &str = "self.screen.get_info";

/// Error body returned by the API on a failed tool call
#[derive(Debug, Deserialize)]
struct ToolErrorBody {
    message: Option<String>,
}

/// Authenticated client for the device tool endpoints
#[derive(Clone)]
pub struct ToolClient {
    base_url: String,
    token: Option<String>,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ToolClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolClient")
            .field("base_url", &self.base_url)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl ToolClient {
    pub fn new(base_url: &str, token: Option<String>, http: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        tracing::debug!("Created ToolClient for {}", base_url);
        Self {
            base_url,
            token,
            http,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Check the device by listing its tools. Succeeds only on a 2xx response.
    pub async fn list_tools(&self) -> crate::Result<()> {
        let token = self.token().ok_or(DeviceStatusError::MissingToken)?;
        let url = format!("{}{}", self.base_url, TOOLS_LIST_PATH);

        let response = self.http.post(&url, token).await?;
        if !response.is_success() {
            return Err(DeviceStatusError::Http(format!(
                "{} returned HTTP {}",
                TOOLS_LIST_PATH, response.status
            )));
        }
        Ok(())
    }

    /// Invoke a named tool with the given arguments.
    ///
    /// Any non-2xx response is an error carrying the server's `message` when
    /// the body has one, or a generic status message otherwise.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> crate::Result<Value> {
        let token = self.token().ok_or(DeviceStatusError::MissingToken)?;
        let url = format!("{}{}", self.base_url, TOOLS_CALL_PATH);
        let body = json!({ "name": name, "arguments": arguments });

        let response = self.http.post_json(&url, token, &body).await?;
        if response.is_success() {
            return Ok(serde_json::from_str(&response.body)?);
        }

        tracing::debug!(
            "Tool {} failed: status={} body={}",
            name,
            response.status,
            response.body
        );
        let message = serde_json::from_str::<ToolErrorBody>(&response.body)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("{} failed: HTTP {}", name, response.status));

        Err(DeviceStatusError::Tool {
            tool: name.to_string(),
            message,
        })
    }
}
