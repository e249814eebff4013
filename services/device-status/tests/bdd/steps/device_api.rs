//! In-memory stand-in for the device management API

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use device_status::io::{HttpClient, HttpResponse};

/// Records every request and answers with canned device payloads
#[derive(Debug, Default)]
pub struct FakeDeviceApi {
    pub list_status: u16,
    pub failing_tool: Option<String>,
    pub system_info: Value,
    pub requests: RwLock<Vec<String>>,
}

impl FakeDeviceApi {
    pub fn with_list_status(list_status: u16) -> Self {
        Self {
            list_status,
            system_info: json!({
                "data": {
                    "chip_model_name": "esp32s3",
                    "board": {"name": "atoms3r-echo-base"},
                    "application": {"version": "1.9.4"},
                    "flash_size": 8388608,
                    "partition_table": [
                        {"label": "nvs", "size": 16384},
                        {"label": "assets", "size": 4194304}
                    ]
                }
            }),
            ..Self::default()
        }
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl HttpClient for FakeDeviceApi {
    async fn post(&self, url: &str, _bearer: &str) -> device_status::Result<HttpResponse> {
        self.requests.write().await.push(url.to_string());
        Ok(HttpResponse {
            status: self.list_status,
            body: "{}".to_string(),
        })
    }

    async fn post_json(
        &self,
        url: &str,
        _bearer: &str,
        body: &Value,
    ) -> device_status::Result<HttpResponse> {
        let name = body["name"].as_str().unwrap_or_default();
        self.requests.write().await.push(format!("{} {}", url, name));

        if self.failing_tool.as_deref() == Some(name) {
            return Ok(HttpResponse {
                status: 500,
                body: "Internal Server Error".to_string(),
            });
        }

        let payload = match name {
            "self.get_system_info" => self.system_info.clone(),
            "self.get_device_status" => {
                json!({"data": {"network": {"type": "wifi", "signal": "strong"}}})
            }
            "self.screen.get_info" => json!({"data": {"width": 128, "height": 128}}),
            _ => json!({}),
        };
        Ok(HttpResponse {
            status: 200,
            body: payload.to_string(),
        })
    }
}
