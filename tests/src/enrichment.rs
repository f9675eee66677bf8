//! Flow of telemetry and classification data into the merged record.

use std::collections::BTreeMap;
use std::sync::Arc;

use netinv_common::inventory::{
    DeviceTelemetry, DeviceType, InterfaceStats, PortStatus, ResourceStats, SystemInfo,
};
use netinv_core::inventory::InventoryService;

use crate::support::{
    FixedFingerprint, FixedTelemetry, InvertedDelayProbe, NoTelemetry, StaticVendor, candidates,
    config,
};

fn router_telemetry() -> DeviceTelemetry {
    let mut interfaces: BTreeMap<u32, InterfaceStats> = BTreeMap::new();

    let mut wan = InterfaceStats::new(1, String::from("wan0"));
    wan.oper_status = PortStatus::Up;
    wan.in_octets = Some(123_456);
    wan.out_octets = Some(654_321);
    interfaces.insert(1, wan);

    let mut lan = InterfaceStats::new(2, String::from("lan0"));
    lan.oper_status = PortStatus::Down;
    interfaces.insert(2, lan);

    DeviceTelemetry {
        system: SystemInfo {
            description: Some(String::from("Linux edge-router 6.8.0-40 armv7l")),
            name: Some(String::from("edge-router")),
            location: Some(String::from("closet B")),
            ..SystemInfo::default()
        },
        resources: ResourceStats {
            cpu_load_percent: Some(20.0),
            memory_used_percent: Some(50.0),
        },
        interfaces,
    }
}

#[tokio::test]
async fn telemetry_fields_flow_into_the_record() {
    let service = InventoryService::new(
        Arc::new(InvertedDelayProbe { total: 1 }),
        Arc::new(FixedFingerprint("Microsoft Windows 10")),
        Arc::new(StaticVendor),
        Arc::new(FixedTelemetry(router_telemetry())),
        &config(),
    );

    let records = service.enrich_all(candidates(1)).await;
    let record = &records[0];

    // The agent description wins over the fingerprint, for both the OS
    // label and the device type.
    assert_eq!(record.classification.os_name, "Linux");
    assert_eq!(record.classification.device_type, DeviceType::Server);

    assert_eq!(record.hostname.as_deref(), Some("edge-router"));
    assert_eq!(record.vendor, "Acme Corp");

    let resources = record.resources.expect("telemetry present");
    assert_eq!(resources.cpu_load_percent, Some(20.0));
    assert_eq!(resources.memory_used_percent, Some(50.0));

    assert_eq!(record.interfaces.len(), 2);
    assert_eq!(record.interfaces[&1].oper_status, PortStatus::Up);
    assert_eq!(record.interfaces[&2].oper_status, PortStatus::Down);
    assert_eq!(record.interfaces[&2].in_octets, None);
}

#[tokio::test]
async fn fingerprint_classifies_when_the_agent_is_silent() {
    let service = InventoryService::new(
        Arc::new(InvertedDelayProbe { total: 1 }),
        Arc::new(FixedFingerprint("Microsoft Windows 10")),
        Arc::new(StaticVendor),
        Arc::new(NoTelemetry),
        &config(),
    );

    let records = service.enrich_all(candidates(1)).await;
    let record = &records[0];

    assert!(record.reachability.is_alive);
    assert_eq!(record.classification.os_name, "Microsoft Windows 10");
    assert_eq!(record.classification.device_type, DeviceType::Workstation);
    assert_eq!(record.resources, None);
    assert!(record.interfaces.is_empty());
}

#[tokio::test]
async fn firmware_compliance_is_checked_against_the_approved_list() {
    let mut cfg = config();
    cfg.approved_firmware = vec![String::from("6.8.0-40")];

    let service = InventoryService::new(
        Arc::new(InvertedDelayProbe { total: 1 }),
        Arc::new(FixedFingerprint("irrelevant")),
        Arc::new(StaticVendor),
        Arc::new(FixedTelemetry(router_telemetry())),
        &cfg,
    );

    let records = service.enrich_all(candidates(1)).await;
    assert_eq!(records[0].firmware_compliant, Some(true));

    let mut strict = config();
    strict.approved_firmware = vec![String::from("7.1.2")];

    let service = InventoryService::new(
        Arc::new(InvertedDelayProbe { total: 1 }),
        Arc::new(FixedFingerprint("irrelevant")),
        Arc::new(StaticVendor),
        Arc::new(FixedTelemetry(router_telemetry())),
        &strict,
    );

    let records = service.enrich_all(candidates(1)).await;
    assert_eq!(records[0].firmware_compliant, Some(false));
}
