//! Siren variant for deCONZ warning devices.
//!
//! A warning device sounds while its alert is the long select alert. It is
//! switched with the dedicated siren verbs instead of the generic `on` state.

use super::classifier::SwitchKind;
use super::entity::{DeconzDevice, SwitchEntity, TurnOptions};
use crate::error::GatewayError;
use crate::gateway::{Gateway, LightResource};
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

pub struct DeconzSiren {
    base: DeconzDevice,
}

impl DeconzSiren {
    pub fn new(device: Arc<LightResource>, gateway: Arc<Gateway>) -> Self {
        Self {
            base: DeconzDevice::new(device, gateway),
        }
    }
}

#[async_trait]
impl SwitchEntity for DeconzSiren {
    fn base(&self) -> &DeconzDevice {
        &self.base
    }

    fn category(&self) -> SwitchKind {
        SwitchKind::Siren
    }

    fn is_on(&self) -> bool {
        self.base.device().is_sounding()
    }

    // TODO: forward a `duration` option as the warning device `ontime` attribute.
    async fn turn_on(&self, _options: TurnOptions) -> Result<(), GatewayError> {
        let device = self.base.device();
        info!("[Switch] siren {}: sound", device.name());
        device
            .turn_on()
            .await
            .inspect_err(|e| warn!("[Switch] siren {} failed to sound: {}", device.name(), e))
    }

    async fn turn_off(&self, _options: TurnOptions) -> Result<(), GatewayError> {
        let device = self.base.device();
        info!("[Switch] siren {}: silence", device.name());
        device
            .turn_off()
            .await
            .inspect_err(|e| warn!("[Switch] siren {} failed to silence: {}", device.name(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::gateway::{Alert, LightCommand, LightDescriptor, LightState, MemoryTransport};

    fn siren(transport: Arc<MemoryTransport>, state: LightState) -> DeconzSiren {
        let gateway = Arc::new(Gateway::new(
            "BRIDGE",
            transport,
            Arc::new(Dispatcher::new()),
        ));
        let light = gateway.add_light(
            "12",
            LightDescriptor {
                unique_id: "00:0d:6f:00:0a:0b:0c:0d-01".to_string(),
                name: "Hallway siren".to_string(),
                type_tag: "Warning device".to_string(),
                manufacturer: Some("Heiman".to_string()),
                model_id: Some("WarningDevice".to_string()),
                sw_version: None,
                state,
            },
        );
        DeconzSiren::new(light, gateway)
    }

    #[tokio::test]
    async fn test_uses_siren_verbs_not_generic_state() {
        let transport = Arc::new(MemoryTransport::new());
        let siren = siren(transport.clone(), LightState::default());

        siren.turn_on(TurnOptions::default()).await.unwrap();
        siren.turn_off(TurnOptions::default()).await.unwrap();

        let sent = transport.sent();
        assert_eq!(
            sent,
            vec![
                (
                    "12".to_string(),
                    LightCommand::Alert {
                        alert: Alert::Lselect
                    }
                ),
                ("12".to_string(), LightCommand::Alert { alert: Alert::None }),
            ]
        );
        assert!(
            sent.iter()
                .all(|(_, cmd)| !matches!(cmd, LightCommand::SetState { .. }))
        );
    }

    #[test]
    fn test_is_on_ignores_boolean_state() {
        let on_but_silent = siren(
            Arc::new(MemoryTransport::new()),
            LightState {
                on: Some(true),
                alert: Some(Alert::None),
                reachable: true,
            },
        );
        assert!(!on_but_silent.is_on());

        let off_but_sounding = siren(
            Arc::new(MemoryTransport::new()),
            LightState {
                on: Some(false),
                alert: Some(Alert::Lselect),
                reachable: true,
            },
        );
        assert!(off_but_sounding.is_on());
    }

    #[tokio::test]
    async fn test_echoed_alert_turns_siren_on_and_off() {
        let transport = Arc::new(MemoryTransport::new().with_echo());
        let siren = siren(transport, LightState::default());
        assert!(!siren.is_on());

        siren.turn_on(TurnOptions::default()).await.unwrap();
        assert!(siren.is_on());
        assert_eq!(siren.base().device().alert(), Some(Alert::Lselect));

        siren.turn_off(TurnOptions::default()).await.unwrap();
        assert!(!siren.is_on());
        assert_eq!(siren.base().device().alert(), Some(Alert::None));
    }

    #[tokio::test]
    async fn test_disconnect_propagates() {
        let transport = Arc::new(MemoryTransport::new());
        let siren = siren(transport.clone(), LightState::default());
        transport.fail_next(GatewayError::Disconnected);

        assert_eq!(
            siren.turn_off(TurnOptions::default()).await,
            Err(GatewayError::Disconnected)
        );
    }
}
