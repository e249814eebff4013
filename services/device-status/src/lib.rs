//! Device Status - device liveness polling and status aggregation
//!
//! Authenticates against a device management API with a bearer token taken
//! from a page URL, checks the device for liveness, and aggregates system,
//! network and screen details into observable state.

pub mod aggregator;
pub mod config;
pub mod device_info;
pub mod error;
pub mod io;
pub mod labels;
pub mod token;
pub mod tools;

pub use aggregator::DeviceStatusAggregator;
pub use config::{load_config, Config};
pub use error::{DeviceStatusError, Result};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::io::ReqwestHttpClient;

/// Run the device status monitor until Ctrl-C, logging every state change
pub async fn run(config: Config, token: Option<String>) -> Result<()> {
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::default());
    let aggregator = DeviceStatusAggregator::new(&config, token, http);
    let cancel = CancellationToken::new();

    let mut status_rx = aggregator.subscribe_status();
    let mut info_rx = aggregator.subscribe_info();

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    if aggregator.initialize().is_none() {
        tracing::warn!("No token provided; the device will not be polled");
    }

    loop {
        tokio::select! {
            Ok(()) = status_rx.changed() => {
                let status = status_rx.borrow_and_update().clone();
                tracing::info!(
                    "Device {} (last check {:?} ms{})",
                    if status.is_online { "online" } else { "offline" },
                    status.last_check_epoch_ms,
                    status
                        .error
                        .as_deref()
                        .map(|e| format!(", error: {}", e))
                        .unwrap_or_default()
                );
            }
            Ok(()) = info_rx.changed() => {
                let info = info_rx.borrow_and_update().clone();
                log_device_info(&aggregator, &info);
            }
            _ = cancel.cancelled() => break,
        }
    }

    aggregator.teardown();
    tracing::info!("Device status monitor stopped");
    Ok(())
}

fn log_device_info(aggregator: &DeviceStatusAggregator, info: &device_info::DeviceInfo) {
    if let Some(chip) = &info.chip {
        tracing::info!("Chip: {}", chip.model);
    }
    if let Some(board) = &info.board {
        tracing::info!("Board: {}", board.model);
    }
    if let Some(firmware) = &info.firmware {
        tracing::info!("Firmware: {}", firmware.version);
    }
    if let Some(flash) = &info.flash {
        tracing::info!("Flash: {}", flash.size);
    }
    if let Some(assets) = &info.assets_partition {
        tracing::info!("Assets partition: {} ({} bytes)", assets.size_formatted, assets.size);
    }
    if let Some(network) = &info.network {
        tracing::info!(
            "Network: {} / {}",
            network.network_type,
            aggregator.signal_display_text(Some(&network.signal))
        );
    }
    if let Some(screen) = &info.screen {
        tracing::info!("Screen: {}", screen.resolution);
    }
}
