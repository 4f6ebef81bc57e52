//! Command transport between light resources and the gateway.
//!
//! The real gateway client (REST + websocket) lives outside this crate. The
//! [`MemoryTransport`] stands in for it: it records every command, can fail
//! on demand and, when echo is enabled, answers an acknowledged command with
//! the state push the gateway would send.

use super::light::{LightCommand, LightResource};
use crate::error::GatewayError;
use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Carries state-change commands to the gateway.
#[async_trait]
pub trait LightTransport: Send + Sync + 'static {
    /// Send `command` for the light with gateway-local id `resource_id`.
    ///
    /// Resolves once the gateway acknowledged the request.
    async fn put_state(&self, resource_id: &str, command: &LightCommand)
    -> Result<(), GatewayError>;

    /// Called when the gateway registers a light served by this transport.
    fn attach(&self, _light: &Arc<LightResource>) {}
}

/// In-memory transport used by tests and the demo binary.
pub struct MemoryTransport {
    echo: AtomicBool,
    delay: Option<Duration>,
    sent: Mutex<Vec<(String, LightCommand)>>,
    failures: Mutex<VecDeque<GatewayError>>,
    lights: RwLock<HashMap<String, Weak<LightResource>>>,
}

impl MemoryTransport {
    /// Transport that acknowledges every command without pushing state back.
    pub fn new() -> Self {
        Self {
            echo: AtomicBool::new(false),
            delay: None,
            sent: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            lights: RwLock::new(HashMap::new()),
        }
    }

    /// Push the resulting state back to the light after each acknowledged command.
    pub fn with_echo(self) -> Self {
        self.echo.store(true, Ordering::SeqCst);
        self
    }

    /// Wait `delay` before acknowledging each command.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_echo(&self, echo: bool) {
        self.echo.store(echo, Ordering::SeqCst);
    }

    /// Fail the next command with `error`. Queued failures are used in order.
    pub fn fail_next(&self, error: GatewayError) {
        self.failures.lock().push_back(error);
    }

    /// Every command that reached the transport, in arrival order.
    ///
    /// Failed commands are included; they did reach the gateway.
    pub fn sent(&self) -> Vec<(String, LightCommand)> {
        self.sent.lock().clone()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LightTransport for MemoryTransport {
    async fn put_state(
        &self,
        resource_id: &str,
        command: &LightCommand,
    ) -> Result<(), GatewayError> {
        self.sent
            .lock()
            .push((resource_id.to_string(), command.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.lock().pop_front() {
            warn!("[Gateway] light {} rejected {:?}: {}", resource_id, command, error);
            return Err(error);
        }

        if self.echo.load(Ordering::SeqCst) {
            let light = self
                .lights
                .read()
                .get(resource_id)
                .and_then(Weak::upgrade);
            match light {
                Some(light) => {
                    light.apply_update(&command.expected_update());
                }
                None => debug!("[Gateway] no light {} to echo state to", resource_id),
            }
        }

        Ok(())
    }

    fn attach(&self, light: &Arc<LightResource>) {
        self.lights
            .write()
            .insert(light.id().to_string(), Arc::downgrade(light));
    }
}
