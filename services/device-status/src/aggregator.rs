//! Aggregator: checks device liveness, schedules retries, and merges device details

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::device_info::{DeviceInfo, DeviceStatus};
use crate::io::HttpClient;
use crate::labels::{signal_display_text, Locale};
use crate::tools::{ToolClient, DEVICE_STATUS_TOOL, SCREEN_INFO_TOOL, SYSTEM_INFO_TOOL};

/// A scheduled liveness re-check
struct PendingRetry {
    generation: u64,
    handle: JoinHandle<()>,
}

struct Inner {
    tools: ToolClient,
    locale: Locale,
    retry_delay: Duration,
    status: watch::Sender<DeviceStatus>,
    info: watch::Sender<DeviceInfo>,
    checking: watch::Sender<bool>,
    retry: Mutex<Option<PendingRetry>>,
    retry_generation: AtomicU64,
    cancel: CancellationToken,
}

impl Inner {
    fn retry_slot(&self) -> MutexGuard<'_, Option<PendingRetry>> {
        self.retry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Forget the retry with the given generation once it has fired
    fn release_retry(&self, generation: u64) {
        let mut slot = self.retry_slot();
        if slot.as_ref().is_some_and(|r| r.generation == generation) {
            slot.take();
        }
    }
}

/// Re-entrancy guard for liveness checks, released on drop
struct CheckingGuard<'a> {
    checking: &'a watch::Sender<bool>,
}

impl<'a> CheckingGuard<'a> {
    fn acquire(checking: &'a watch::Sender<bool>) -> Option<Self> {
        let acquired = checking.send_if_modified(|in_progress| {
            if *in_progress {
                false
            } else {
                *in_progress = true;
                true
            }
        });
        acquired.then_some(Self { checking })
    }
}

impl Drop for CheckingGuard<'_> {
    fn drop(&mut self) {
        self.checking.send_replace(false);
    }
}

/// Polls a device for liveness and publishes its status and details.
///
/// Cloning yields another handle to the same aggregator. State is published
/// through watch channels so UI consumers can subscribe to changes.
#[derive(Clone)]
pub struct DeviceStatusAggregator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for DeviceStatusAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceStatusAggregator")
            .field("tools", &self.inner.tools)
            .field("status", &*self.inner.status.borrow())
            .finish()
    }
}

impl DeviceStatusAggregator {
    pub fn new(config: &Config, token: Option<String>, http: Arc<dyn HttpClient>) -> Self {
        let (status, _) = watch::channel(DeviceStatus::default());
        let (info, _) = watch::channel(DeviceInfo::default());
        let (checking, _) = watch::channel(false);

        Self {
            inner: Arc::new(Inner {
                tools: ToolClient::new(&config.api_base_url, token, http),
                locale: config.locale(),
                retry_delay: config.retry_delay(),
                status,
                info,
                checking,
                retry: Mutex::new(None),
                retry_generation: AtomicU64::new(0),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Build an aggregator authenticated with the `token` parameter of a page URL
    pub fn from_page_url(
        config: &Config,
        page_url: &str,
        http: Arc<dyn HttpClient>,
    ) -> crate::Result<Self> {
        let token = crate::token::token_from_url(page_url)?;
        Ok(Self::new(config, token, http))
    }

    /// Start monitoring. Without a token the aggregator stays idle and
    /// `None` is returned; otherwise the first check runs in the background.
    pub fn initialize(&self) -> Option<JoinHandle<()>> {
        if !self.has_token() {
            tracing::debug!("No authentication token, device status monitoring stays idle");
            return None;
        }

        tracing::info!("Starting device status monitoring");
        let this = self.clone();
        Some(tokio::spawn(async move {
            this.check_liveness().await;
        }))
    }

    /// Stop monitoring: cancel any pending retry and refuse further checks
    pub fn teardown(&self) {
        self.inner.cancel.cancel();
        if let Some(pending) = self.inner.retry_slot().take() {
            pending.handle.abort();
            tracing::debug!("Cancelled pending liveness retry");
        }
    }

    /// Manually re-check the device
    pub async fn refresh(&self) {
        self.check_liveness().await;
    }

    /// Check the device, refreshing its details when it answers and
    /// scheduling a single retry when it does not.
    ///
    /// Returns immediately if a check is already running, there is no
    /// token, or the aggregator has been torn down.
    pub async fn check_liveness(&self) {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() || !self.has_token() {
            return;
        }
        let Some(_guard) = CheckingGuard::acquire(&inner.checking) else {
            tracing::debug!("Liveness check already in progress");
            return;
        };

        match inner.tools.list_tools().await {
            Ok(()) => {
                let was_online = self.mark_checked(true, None);
                if !was_online {
                    tracing::info!("Device is online");
                }
                if inner.cancel.is_cancelled() {
                    return;
                }
                self.refresh_device_info().await;
            }
            Err(e) => {
                let was_online = self.mark_checked(false, Some(e.to_string()));
                if was_online {
                    tracing::warn!("Device went offline: {}", e);
                } else {
                    tracing::debug!("Device unreachable: {}", e);
                }
                self.schedule_retry();
            }
        }
    }

    /// Query system, device and screen info concurrently and merge the
    /// outcomes. A failed query only affects the fields it owns.
    pub async fn refresh_device_info(&self) {
        let tools = &self.inner.tools;
        let (system, device, screen) = tokio::join!(
            tools.call_tool(SYSTEM_INFO_TOOL, json!({})),
            tools.call_tool(DEVICE_STATUS_TOOL, json!({})),
            tools.call_tool(SCREEN_INFO_TOOL, json!({})),
        );

        let locale = self.inner.locale;
        self.inner.info.send_modify(|info| {
            info.apply_system_info(&system, locale);
            info.apply_device_status(&device, locale);
            info.apply_screen_info(&screen, locale);
        });
        tracing::debug!("Device info refreshed");
    }

    /// Invoke a device tool. Failures are returned to the caller.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> crate::Result<Value> {
        self.inner.tools.call_tool(name, arguments).await
    }

    /// Display label for a signal strength code in this aggregator's locale
    pub fn signal_display_text(&self, signal: Option<&str>) -> String {
        signal_display_text(signal, self.inner.locale)
    }

    pub fn has_token(&self) -> bool {
        self.inner.tools.token().is_some()
    }

    pub fn is_online(&self) -> bool {
        self.inner.status.borrow().is_online
    }

    pub fn is_checking(&self) -> bool {
        *self.inner.checking.borrow()
    }

    pub fn has_pending_retry(&self) -> bool {
        self.inner.retry_slot().is_some()
    }

    pub fn device_status(&self) -> DeviceStatus {
        self.inner.status.borrow().clone()
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.inner.info.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<DeviceStatus> {
        self.inner.status.subscribe()
    }

    pub fn subscribe_info(&self) -> watch::Receiver<DeviceInfo> {
        self.inner.info.subscribe()
    }

    pub fn subscribe_checking(&self) -> watch::Receiver<bool> {
        self.inner.checking.subscribe()
    }

    /// Record the outcome of a liveness check, returning the previous online flag
    fn mark_checked(&self, is_online: bool, error: Option<String>) -> bool {
        let now_ms = current_epoch_ms();
        let mut was_online = false;
        self.inner.status.send_modify(|status| {
            was_online = status.is_online;
            status.is_online = is_online;
            status.error = error;
            status.last_check_epoch_ms = Some(now_ms);
        });
        was_online
    }

    /// Replace any pending retry with a fresh one after the retry delay
    fn schedule_retry(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }

        let generation = self.inner.retry_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = self.inner.retry_delay;
        let sleep = tokio::time::sleep(delay);
        let mut slot = self.inner.retry_slot();

        let this = self.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = sleep => {}
                _ = this.inner.cancel.cancelled() => return,
            }
            this.inner.release_retry(generation);
            tracing::debug!("Retrying liveness check");
            this.check_liveness().await;
        });

        if let Some(previous) = slot.replace(PendingRetry { generation, handle }) {
            previous.handle.abort();
            tracing::debug!("Replaced pending liveness retry");
        }
        tracing::debug!("Liveness retry scheduled in {:?}", delay);
    }
}

fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
