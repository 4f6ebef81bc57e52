//! Switch entity contract shared by every bridged variant.
//!
//! Entities are thin views over a gateway [`LightResource`]: state is read
//! through on every call and commands are forwarded to the gateway. Nothing
//! is cached on the entity itself.

use super::classifier::SwitchKind;
use super::power_plug::DeconzPowerPlug;
use super::siren::DeconzSiren;
use crate::error::GatewayError;
use crate::gateway::{Gateway, LightResource};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Integration domain used in device identifiers.
pub const DOMAIN: &str = "deconz";

/// Extra arguments of a turn on/off call.
///
/// Keys are variant specific; the current variants accept and ignore them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnOptions(Map<String, Value>);

impl TurnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Device registry entry for a bridged light.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub name: String,
    pub sw_version: Option<String>,
    /// The gateway the device is reached through.
    pub via_device: (String, String),
}

/// Gateway context every bridged entity carries.
pub struct DeconzDevice {
    device: Arc<LightResource>,
    gateway: Arc<Gateway>,
}

impl DeconzDevice {
    pub fn new(device: Arc<LightResource>, gateway: Arc<Gateway>) -> Self {
        Self { device, gateway }
    }

    pub fn device(&self) -> &LightResource {
        &self.device
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Zigbee address part of the unique id (`<mac>-<endpoint>`).
    pub fn serial(&self) -> Option<&str> {
        self.device
            .unique_id()
            .split_once('-')
            .map(|(serial, _)| serial)
    }

    pub fn available(&self) -> bool {
        self.gateway.available() && self.device.reachable()
    }

    pub fn device_info(&self) -> Option<DeviceInfo> {
        let serial = self.serial()?;
        Some(DeviceInfo {
            identifiers: vec![(DOMAIN.to_string(), serial.to_string())],
            manufacturer: self.device.manufacturer().map(str::to_string),
            model: self.device.model_id().map(str::to_string),
            name: self.device.name().to_string(),
            sw_version: self.device.sw_version().map(str::to_string),
            via_device: (DOMAIN.to_string(), self.gateway.bridge_id().to_string()),
        })
    }
}

/// Capability contract the host drives a bridged switch through.
#[async_trait]
pub trait SwitchEntity: Send + Sync {
    /// Shared gateway context.
    fn base(&self) -> &DeconzDevice;

    fn category(&self) -> SwitchKind;

    /// Current on/off state as last reported by the gateway.
    fn is_on(&self) -> bool;

    /// Errors from the gateway are returned unchanged.
    async fn turn_on(&self, options: TurnOptions) -> Result<(), GatewayError>;

    async fn turn_off(&self, options: TurnOptions) -> Result<(), GatewayError>;

    fn unique_id(&self) -> &str {
        self.base().device().unique_id()
    }

    fn name(&self) -> &str {
        self.base().device().name()
    }

    fn available(&self) -> bool {
        self.base().available()
    }

    fn device_info(&self) -> Option<DeviceInfo> {
        self.base().device_info()
    }
}

impl SwitchKind {
    /// Build the entity for this variant on top of `device`.
    pub fn create_entity(
        self,
        device: Arc<LightResource>,
        gateway: Arc<Gateway>,
    ) -> Arc<dyn SwitchEntity> {
        match self {
            SwitchKind::PowerPlug => Arc::new(DeconzPowerPlug::new(device, gateway)),
            SwitchKind::Siren => Arc::new(DeconzSiren::new(device, gateway)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::gateway::{LightCommand, LightDescriptor, LightState, MemoryTransport, StateUpdate};
    use std::time::Duration;

    fn setup(unique_id: &str) -> (Arc<Gateway>, Arc<LightResource>) {
        let gateway = Arc::new(Gateway::new(
            "00212EFFFF012345",
            Arc::new(MemoryTransport::new()),
            Arc::new(Dispatcher::new()),
        ));
        let light = gateway.add_light(
            "1",
            LightDescriptor {
                unique_id: unique_id.to_string(),
                name: "Garage plug".to_string(),
                type_tag: "Smart plug".to_string(),
                manufacturer: Some("innr".to_string()),
                model_id: Some("SP 120".to_string()),
                sw_version: Some("2.0".to_string()),
                state: LightState::default(),
            },
        );
        (gateway, light)
    }

    #[test]
    fn test_device_info_uses_serial_and_bridge() {
        let (gateway, light) = setup("00:15:8d:00:01:02:03:04-01");
        let base = DeconzDevice::new(light, gateway);

        assert_eq!(base.serial(), Some("00:15:8d:00:01:02:03:04"));
        let info = base.device_info().unwrap();
        assert_eq!(
            info.identifiers,
            vec![("deconz".to_string(), "00:15:8d:00:01:02:03:04".to_string())]
        );
        assert_eq!(
            info.via_device,
            ("deconz".to_string(), "00212EFFFF012345".to_string())
        );
        assert_eq!(info.model.as_deref(), Some("SP 120"));
    }

    #[test]
    fn test_no_device_info_without_serial() {
        let (gateway, light) = setup("nodash");
        let base = DeconzDevice::new(light, gateway);
        assert_eq!(base.serial(), None);
        assert_eq!(base.device_info(), None);
    }

    #[test]
    fn test_available_needs_gateway_and_reachable() {
        let (gateway, light) = setup("aa-01");
        let base = DeconzDevice::new(light.clone(), gateway.clone());
        assert!(base.available());

        gateway.set_available(false);
        assert!(!base.available());
        gateway.set_available(true);

        light.apply_update(&StateUpdate {
            reachable: Some(false),
            ..StateUpdate::default()
        });
        assert!(!base.available());
    }

    #[test]
    fn test_turn_options_bag() {
        let options = TurnOptions::new().with("duration", 30);
        assert!(!options.is_empty());
        assert_eq!(options.get("duration"), Some(&Value::from(30)));
        assert!(TurnOptions::default().is_empty());
    }

    #[test]
    fn test_create_entity_matches_kind() {
        let (gateway, light) = setup("aa-01");
        let plug = SwitchKind::PowerPlug.create_entity(light.clone(), gateway.clone());
        let siren = SwitchKind::Siren.create_entity(light, gateway);
        assert_eq!(plug.category(), SwitchKind::PowerPlug);
        assert_eq!(siren.category(), SwitchKind::Siren);
        assert_eq!(plug.unique_id(), "aa-01");
        assert_eq!(siren.name(), "Garage plug");
    }

    #[tokio::test]
    async fn test_commands_on_different_devices_run_concurrently() {
        let transport = Arc::new(
            MemoryTransport::new()
                .with_echo()
                .with_delay(Duration::from_millis(20)),
        );
        let gateway = Arc::new(Gateway::new(
            "00212EFFFF012345",
            transport.clone(),
            Arc::new(Dispatcher::new()),
        ));
        let plug_light = gateway.add_light(
            "1",
            LightDescriptor {
                unique_id: "00:15:8d:00:01:02:03:04-01".to_string(),
                name: "Garage plug".to_string(),
                type_tag: "Smart plug".to_string(),
                manufacturer: None,
                model_id: None,
                sw_version: None,
                state: LightState::default(),
            },
        );
        let siren_light = gateway.add_light(
            "2",
            LightDescriptor {
                unique_id: "00:0d:6f:00:0a:0b:0c:0d-01".to_string(),
                name: "Hallway siren".to_string(),
                type_tag: "Warning device".to_string(),
                manufacturer: None,
                model_id: None,
                sw_version: None,
                state: LightState::default(),
            },
        );
        let plug = SwitchKind::PowerPlug.create_entity(plug_light, gateway.clone());
        let siren = SwitchKind::Siren.create_entity(siren_light, gateway);

        let (plug_result, siren_result, reads) = tokio::join!(
            plug.turn_on(TurnOptions::default()),
            siren.turn_on(TurnOptions::default()),
            async { (plug.is_on(), siren.is_on()) },
        );
        assert_eq!(plug_result, Ok(()));
        assert_eq!(siren_result, Ok(()));
        // Both requests were in flight before either was acknowledged.
        assert_eq!(reads, (false, false));

        let mut sent = transport.sent();
        sent.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            sent,
            vec![
                ("1".to_string(), LightCommand::SetState { on: true }),
                (
                    "2".to_string(),
                    LightCommand::Alert {
                        alert: crate::gateway::Alert::Lselect
                    }
                ),
            ]
        );
        assert!(plug.is_on());
        assert!(siren.is_on());
    }
}
