//! BDD step definitions for liveness checking

use std::sync::Arc;

use cucumber::{given, then, when};

use device_status::{Config, DeviceStatusAggregator};

use crate::steps::device_api::FakeDeviceApi;
use crate::world::DeviceStatusWorld;

fn build_aggregator(world: &mut DeviceStatusWorld) {
    let config = Config {
        api_base_url: "http://device.local".to_string(),
        ..Config::default()
    };
    let api = Arc::clone(world.api());
    world.aggregator = Some(DeviceStatusAggregator::new(
        &config,
        world.token.clone(),
        api,
    ));
}

#[given("a device that is online")]
fn device_online(world: &mut DeviceStatusWorld) {
    world.api = Some(Arc::new(FakeDeviceApi::with_list_status(200)));
}

#[given(expr = "a device that answers the liveness check with HTTP {int}")]
fn device_answers_with(world: &mut DeviceStatusWorld, status: u16) {
    world.api = Some(Arc::new(FakeDeviceApi::with_list_status(status)));
}

#[given(expr = "the page URL {string}")]
fn page_url(world: &mut DeviceStatusWorld, url: String) {
    world.token = device_status::token::token_from_url(&url).unwrap();
}

#[when("the aggregator is initialized")]
async fn aggregator_initialized(world: &mut DeviceStatusWorld) {
    build_aggregator(world);
    if let Some(handle) = world.aggregator().initialize() {
        handle.await.unwrap();
    }
}

#[when("the device is refreshed")]
async fn device_refreshed(world: &mut DeviceStatusWorld) {
    world.aggregator().refresh().await;
}

#[when("the aggregator is torn down")]
fn aggregator_torn_down(world: &mut DeviceStatusWorld) {
    world.aggregator().teardown();
}

#[then("no request is sent to the device")]
async fn no_request_sent(world: &mut DeviceStatusWorld) {
    assert_eq!(world.api().request_count().await, 0);
}

#[then(expr = "{int} request(s) has/have been sent to the device")]
async fn requests_sent(world: &mut DeviceStatusWorld, count: usize) {
    assert_eq!(world.api().request_count().await, count);
}

#[then("the device is reported online")]
fn reported_online(world: &mut DeviceStatusWorld) {
    let status = world.aggregator().device_status();
    assert!(status.is_online);
    assert!(status.error.is_none());
    assert!(status.last_check_epoch_ms.is_some());
}

#[then("the device is reported offline")]
fn reported_offline(world: &mut DeviceStatusWorld) {
    assert!(!world.aggregator().is_online());
}

#[then(expr = "the status error mentions {string}")]
fn status_error_mentions(world: &mut DeviceStatusWorld, text: String) {
    let error = world.aggregator().device_status().error.unwrap_or_default();
    assert!(error.contains(&text), "{error}");
}

#[then("the device has never been checked")]
fn never_checked(world: &mut DeviceStatusWorld) {
    assert!(world.aggregator().device_status().last_check_epoch_ms.is_none());
}

#[then("a liveness retry is pending")]
fn retry_pending(world: &mut DeviceStatusWorld) {
    assert!(world.aggregator().has_pending_retry());
}

#[then("no liveness retry is pending")]
fn no_retry_pending(world: &mut DeviceStatusWorld) {
    assert!(!world.aggregator().has_pending_retry());
}
