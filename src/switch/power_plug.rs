//! Power plug variant: a plain on/off switch.

use super::classifier::SwitchKind;
use super::entity::{DeconzDevice, SwitchEntity, TurnOptions};
use crate::error::GatewayError;
use crate::gateway::{Gateway, LightResource};
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

/// Power plug bridged from a deCONZ light resource.
///
/// Reads the light's `on` field and drives it with generic state changes.
pub struct DeconzPowerPlug {
    base: DeconzDevice,
}

impl DeconzPowerPlug {
    pub fn new(device: Arc<LightResource>, gateway: Arc<Gateway>) -> Self {
        Self {
            base: DeconzDevice::new(device, gateway),
        }
    }

    async fn set(&self, on: bool) -> Result<(), GatewayError> {
        let device = self.base.device();
        info!(
            "[Switch] power plug {}: {}",
            device.name(),
            if on { "on" } else { "off" }
        );
        device
            .set_state(on)
            .await
            .inspect_err(|e| warn!("[Switch] power plug {} failed: {}", device.name(), e))
    }
}

#[async_trait]
impl SwitchEntity for DeconzPowerPlug {
    fn base(&self) -> &DeconzDevice {
        &self.base
    }

    fn category(&self) -> SwitchKind {
        SwitchKind::PowerPlug
    }

    fn is_on(&self) -> bool {
        self.base.device().state()
    }

    async fn turn_on(&self, _options: TurnOptions) -> Result<(), GatewayError> {
        self.set(true).await
    }

    async fn turn_off(&self, _options: TurnOptions) -> Result<(), GatewayError> {
        self.set(false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::gateway::{Alert, LightCommand, LightDescriptor, LightState, MemoryTransport, StateUpdate};
    use std::time::Duration;

    fn plug(transport: Arc<MemoryTransport>, on: bool) -> DeconzPowerPlug {
        let gateway = Arc::new(Gateway::new(
            "BRIDGE",
            transport,
            Arc::new(Dispatcher::new()),
        ));
        let light = gateway.add_light(
            "5",
            LightDescriptor {
                unique_id: "00:0d:6f:00:11:22:33:44-01".to_string(),
                name: "Desk plug".to_string(),
                type_tag: "Smart plug".to_string(),
                manufacturer: None,
                model_id: None,
                sw_version: None,
                state: LightState {
                    on: Some(on),
                    alert: Some(Alert::None),
                    reachable: true,
                },
            },
        );
        DeconzPowerPlug::new(light, gateway)
    }

    #[tokio::test]
    async fn test_turn_on_sends_generic_state() {
        let transport = Arc::new(MemoryTransport::new());
        let plug = plug(transport.clone(), false);

        plug.turn_on(TurnOptions::default()).await.unwrap();
        plug.turn_off(TurnOptions::new().with("transition", 5))
            .await
            .unwrap();

        assert_eq!(
            transport.sent(),
            vec![
                ("5".to_string(), LightCommand::SetState { on: true }),
                ("5".to_string(), LightCommand::SetState { on: false }),
            ]
        );
    }

    #[test]
    fn test_is_on_reads_state_field() {
        let plug = plug(Arc::new(MemoryTransport::new()), true);
        assert!(plug.is_on());

        plug.base().device().apply_update(&StateUpdate {
            on: Some(false),
            ..StateUpdate::default()
        });
        assert!(!plug.is_on());

        // Alert changes belong to sirens and leave the plug state alone.
        plug.base().device().apply_update(&StateUpdate {
            alert: Some(Alert::Lselect),
            ..StateUpdate::default()
        });
        assert!(!plug.is_on());
    }

    #[tokio::test]
    async fn test_gateway_error_is_returned_unchanged() {
        let transport = Arc::new(MemoryTransport::new().with_echo());
        let plug = plug(transport.clone(), false);

        let rejected = GatewayError::Rejected {
            code: 201,
            description: "parameter, on, is not modifiable".to_string(),
        };
        transport.fail_next(rejected.clone());

        assert_eq!(plug.turn_on(TurnOptions::default()).await, Err(rejected));
        assert!(!plug.is_on());
        // No retry.
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_state_follows_gateway_push() {
        let transport = Arc::new(MemoryTransport::new().with_echo());
        let plug = plug(transport, false);

        plug.turn_on(TurnOptions::default()).await.unwrap();
        assert!(plug.is_on());
    }

    #[tokio::test]
    async fn test_abandoned_command_is_not_rolled_back() {
        let transport = Arc::new(
            MemoryTransport::new()
                .with_echo()
                .with_delay(Duration::from_millis(200)),
        );
        let plug = plug(transport.clone(), false);

        let result = tokio::time::timeout(
            Duration::from_millis(10),
            plug.turn_on(TurnOptions::default()),
        )
        .await;
        assert!(result.is_err());

        // The request went out; the cached state waits for a gateway push.
        assert_eq!(
            transport.sent(),
            vec![("5".to_string(), LightCommand::SetState { on: true })]
        );
        assert!(!plug.is_on());
        assert!(plug.base().device().last_updated().is_none());
    }
}
