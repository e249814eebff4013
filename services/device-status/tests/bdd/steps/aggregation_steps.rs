//! BDD step definitions for device info aggregation and tool calls

use std::sync::Arc;

use cucumber::{given, then, when};
use serde_json::json;

use crate::steps::device_api::FakeDeviceApi;
use crate::world::DeviceStatusWorld;

#[given(expr = "a device whose {string} tool fails")]
fn device_tool_fails(world: &mut DeviceStatusWorld, tool: String) {
    world.api = Some(Arc::new(FakeDeviceApi {
        failing_tool: Some(tool),
        ..FakeDeviceApi::with_list_status(200)
    }));
}

#[given("a device without an assets partition")]
fn device_without_assets(world: &mut DeviceStatusWorld) {
    world.api = Some(Arc::new(FakeDeviceApi {
        system_info: json!({
            "chip_model_name": "esp32c3",
            "flash_size": 4194304,
            "partition_table": [{"label": "ota_0", "size": 1966080}]
        }),
        ..FakeDeviceApi::with_list_status(200)
    }));
}

#[when(expr = "the tool {string} is called")]
async fn tool_called(world: &mut DeviceStatusWorld, tool: String) {
    let result = world.aggregator().call_tool(&tool, json!({})).await;
    world.tool_result = Some(result);
}

#[then(expr = "the chip model is {string}")]
fn chip_model(world: &mut DeviceStatusWorld, expected: String) {
    let chip = world.aggregator().device_info().chip.expect("chip not set");
    assert_eq!(chip.model, expected);
}

#[then(expr = "the firmware version is {string}")]
fn firmware_version(world: &mut DeviceStatusWorld, expected: String) {
    let firmware = world
        .aggregator()
        .device_info()
        .firmware
        .expect("firmware not set");
    assert_eq!(firmware.version, expected);
}

#[then(expr = "the flash size is {string}")]
fn flash_size(world: &mut DeviceStatusWorld, expected: String) {
    let flash = world.aggregator().device_info().flash.expect("flash not set");
    assert_eq!(flash.size, expected);
}

#[then(expr = "the assets partition is {string}")]
fn assets_partition(world: &mut DeviceStatusWorld, expected: String) {
    let assets = world
        .aggregator()
        .device_info()
        .assets_partition
        .expect("assets partition not set");
    assert_eq!(assets.size_formatted, expected);
}

#[then("there is no assets partition")]
fn no_assets_partition(world: &mut DeviceStatusWorld) {
    assert!(world.aggregator().device_info().assets_partition.is_none());
}

#[then(expr = "the network signal is shown as {string}")]
fn network_signal(world: &mut DeviceStatusWorld, expected: String) {
    let aggregator = world.aggregator();
    let network = aggregator.device_info().network.expect("network not set");
    assert_eq!(aggregator.signal_display_text(Some(&network.signal)), expected);
}

#[then(expr = "the screen resolution is {string}")]
fn screen_resolution(world: &mut DeviceStatusWorld, expected: String) {
    let screen = world.aggregator().device_info().screen.expect("screen not set");
    assert_eq!(screen.resolution, expected);
}

#[then("device details are not known yet")]
fn details_unknown(world: &mut DeviceStatusWorld) {
    assert_eq!(
        world.aggregator().device_info(),
        device_status::device_info::DeviceInfo::default()
    );
}

#[then(expr = "the tool call fails with {string}")]
fn tool_call_fails(world: &mut DeviceStatusWorld, expected: String) {
    match world.tool_result.take() {
        Some(Err(e)) => assert_eq!(e.to_string(), expected),
        other => panic!("expected a failed tool call, got {other:?}"),
    }
}
