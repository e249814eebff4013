//! Device status and device information records
//!
//! The device reports its details through three tools whose JSON payloads
//! are mapped here into display-ready records. Each payload is mapped
//! independently, and a failed query is replaced by placeholder records
//! without touching the fields owned by the other queries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::labels::Locale;

const ASSETS_PARTITION_LABEL: &str = "assets";
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Reachability of the device, updated by every liveness check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub is_online: bool,
    /// Message from the most recent failed check, cleared on success
    pub error: Option<String>,
    pub last_check_epoch_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipInfo {
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardInfo {
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareInfo {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashInfo {
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsPartition {
    pub size: u64,
    pub size_formatted: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    #[serde(rename = "type")]
    pub network_type: String,
    pub signal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenInfo {
    pub resolution: String,
}

/// Aggregated device details. `None` means not fetched yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub chip: Option<ChipInfo>,
    pub board: Option<BoardInfo>,
    pub firmware: Option<FirmwareInfo>,
    pub flash: Option<FlashInfo>,
    pub assets_partition: Option<AssetsPartition>,
    pub network: Option<NetworkInfo>,
    pub screen: Option<ScreenInfo>,
}

impl DeviceInfo {
    /// Apply the outcome of `self.get_system_info`
    pub fn apply_system_info(&mut self, outcome: &crate::Result<Value>, locale: Locale) {
        let unknown = locale.unknown();
        match fulfilled(outcome, "system info") {
            Some(data) => {
                self.chip = Some(ChipInfo {
                    model: text_at(data, "/chip_model_name").unwrap_or(unknown).to_string(),
                });
                self.board = Some(BoardInfo {
                    model: text_at(data, "/board/name").unwrap_or(unknown).to_string(),
                });
                self.firmware = Some(FirmwareInfo {
                    version: text_at(data, "/application/version")
                        .unwrap_or(unknown)
                        .to_string(),
                });
                self.flash = Some(FlashInfo {
                    size: data
                        .get("flash_size")
                        .and_then(Value::as_f64)
                        .filter(|bytes| *bytes > 0.0)
                        .map(format_megabytes)
                        .unwrap_or_else(|| unknown.to_string()),
                });
                self.assets_partition = data.get("partition_table").and_then(find_assets_partition);
            }
            None => {
                self.chip = Some(ChipInfo {
                    model: unknown.to_string(),
                });
                self.board = Some(BoardInfo {
                    model: unknown.to_string(),
                });
                self.firmware = Some(FirmwareInfo {
                    version: unknown.to_string(),
                });
                self.flash = Some(FlashInfo {
                    size: unknown.to_string(),
                });
                self.assets_partition = None;
            }
        }
    }

    /// Apply the outcome of `self.get_device_status`
    pub fn apply_device_status(&mut self, outcome: &crate::Result<Value>, locale: Locale) {
        let network = match fulfilled(outcome, "device status") {
            Some(data) => NetworkInfo {
                network_type: text_at(data, "/network/type")
                    .unwrap_or("unknown")
                    .to_string(),
                signal: text_at(data, "/network/signal")
                    .unwrap_or(locale.unknown())
                    .to_string(),
            },
            None => NetworkInfo {
                network_type: "unknown".to_string(),
                signal: locale.unknown().to_string(),
            },
        };
        self.network = Some(network);
    }

    /// Apply the outcome of `self.screen.get_info`
    pub fn apply_screen_info(&mut self, outcome: &crate::Result<Value>, locale: Locale) {
        let resolution = match fulfilled(outcome, "screen info") {
            Some(data) => {
                let dimension = |key: &str| number_at(data, key).unwrap_or(0);
                format!("{}x{}", dimension("width"), dimension("height"))
            }
            None => locale.unknown().to_string(),
        };
        self.screen = Some(ScreenInfo { resolution });
    }
}

/// Payload of a query that succeeded with a non-null body.
///
/// Failed and empty responses are logged and yield `None`.
fn fulfilled<'a>(outcome: &'a crate::Result<Value>, query: &str) -> Option<&'a Value> {
    match outcome {
        Ok(response) if !response.is_null() => Some(payload(response)),
        Ok(_) => {
            tracing::warn!("Empty {} response", query);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", query, e);
            None
        }
    }
}

/// Tool responses either wrap their result in `data` or return it directly
pub fn payload(response: &Value) -> &Value {
    match response.get("data") {
        Some(data) if !data.is_null() => data,
        _ => response,
    }
}

/// Render a byte count as whole megabytes, e.g. `10485760` -> `"10MB"`
pub fn format_megabytes(bytes: f64) -> String {
    format!("{}MB", (bytes / BYTES_PER_MB).round() as u64)
}

/// Find the partition labelled `assets` in a partition table
pub fn find_assets_partition(table: &Value) -> Option<AssetsPartition> {
    table
        .as_array()?
        .iter()
        .find(|p| p.get("label").and_then(Value::as_str) == Some(ASSETS_PARTITION_LABEL))
        .map(|p| {
            let size = number_at(p, "size").unwrap_or(0);
            AssetsPartition {
                size,
                size_formatted: format_megabytes(size as f64),
            }
        })
}

/// Non-negative number at `key`, accepting integers and floats like `240.0`
fn number_at(data: &Value, key: &str) -> Option<u64> {
    data.get(key)
        .and_then(Value::as_f64)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u64)
}

fn text_at<'a>(data: &'a Value, pointer: &str) -> Option<&'a str> {
    data.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
