//! In-process stand-in for the deCONZ gateway.
//!
//! The gateway owns the light registry, reports availability, and announces
//! newly learned devices on a per-bridge "new device" signal. Its network
//! client is out of scope; commands leave through a [`LightTransport`].

pub mod event;
pub mod light;
pub mod transport;

pub use event::{EventKind, GatewayEvent, ResourceKind};
pub use light::{Alert, LightCommand, LightDescriptor, LightResource, LightState, StateUpdate};
pub use transport::{LightTransport, MemoryTransport};

use crate::dispatcher::Dispatcher;
use crate::error::GatewayError;
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Payload of the new-device signal: the devices to consider.
pub type NewDevices = Vec<Arc<LightResource>>;

/// deCONZ gateway session.
pub struct Gateway {
    bridge_id: String,
    available: AtomicBool,
    lights: RwLock<Vec<Arc<LightResource>>>,
    transport: Arc<dyn LightTransport>,
    dispatcher: Arc<Dispatcher<NewDevices>>,
}

impl Gateway {
    pub fn new(
        bridge_id: impl Into<String>,
        transport: Arc<dyn LightTransport>,
        dispatcher: Arc<Dispatcher<NewDevices>>,
    ) -> Self {
        Self {
            bridge_id: bridge_id.into(),
            available: AtomicBool::new(true),
            lights: RwLock::new(Vec::new()),
            transport,
            dispatcher,
        }
    }

    pub fn bridge_id(&self) -> &str {
        &self.bridge_id
    }

    pub fn available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    pub fn set_available(&self, available: bool) {
        let old = self.available.swap(available, Ordering::SeqCst);
        if old != available {
            info!(
                "[Gateway] {} is {}",
                self.bridge_id,
                if available { "available" } else { "unavailable" }
            );
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher<NewDevices>> {
        &self.dispatcher
    }

    /// Session-scoped name of the new-device signal for `kind`.
    pub fn signal_new_device(&self, kind: ResourceKind) -> String {
        format!("deconz_new_{}_{}", kind, self.bridge_id)
    }

    /// Snapshot of all known lights in registration order.
    pub fn lights(&self) -> Vec<Arc<LightResource>> {
        self.lights.read().clone()
    }

    /// Look up a light by its gateway-local id.
    pub fn light(&self, id: &str) -> Option<Arc<LightResource>> {
        self.lights.read().iter().find(|l| l.id() == id).cloned()
    }

    /// Initial sync: register lights without announcing them.
    ///
    /// Ids already known are left untouched.
    pub fn load_lights<I>(&self, lights: I) -> usize
    where
        I: IntoIterator<Item = (String, LightDescriptor)>,
    {
        let mut loaded = 0;
        for (id, descriptor) in lights {
            if self.insert(id, descriptor).1 {
                loaded += 1;
            }
        }
        info!("[Gateway] loaded {} light(s)", loaded);
        loaded
    }

    /// Register a newly learned light and announce it on the new-device signal.
    ///
    /// Returns the existing resource, without announcing, if `id` is known.
    pub fn add_light(&self, id: impl Into<String>, descriptor: LightDescriptor) -> Arc<LightResource> {
        let (light, is_new) = self.insert(id.into(), descriptor);
        if is_new {
            self.announce(vec![light.clone()]);
        } else {
            debug!("[Gateway] light {} already known", light.id());
        }
        light
    }

    /// Announce every known light again, e.g. after a reconnect.
    pub fn announce_all(&self) -> usize {
        self.announce(self.lights())
    }

    fn announce(&self, lights: NewDevices) -> usize {
        let signal = self.signal_new_device(ResourceKind::Light);
        debug!("[Gateway] {} <- {} light(s)", signal, lights.len());
        self.dispatcher.send(&signal, &lights)
    }

    fn insert(&self, id: String, descriptor: LightDescriptor) -> (Arc<LightResource>, bool) {
        let mut lights = self.lights.write();
        if let Some(existing) = lights.iter().find(|l| l.id() == id) {
            return (existing.clone(), false);
        }
        let light = Arc::new(LightResource::new(id, descriptor, self.transport.clone()));
        self.transport.attach(&light);
        lights.push(light.clone());
        (light, true)
    }

    /// Apply a push event from the gateway.
    pub fn apply_event(&self, event: GatewayEvent) -> Result<(), GatewayError> {
        if event.resource != ResourceKind::Light {
            debug!("[Gateway] ignoring {} event for {}", event.resource, event.id);
            return Ok(());
        }

        match event.kind {
            EventKind::Added => match event.light {
                Some(descriptor) => {
                    self.add_light(event.id, descriptor);
                }
                None => warn!("[Gateway] added event for light {} without body", event.id),
            },
            EventKind::Changed => {
                let light = self
                    .light(&event.id)
                    .ok_or_else(|| GatewayError::ResourceNotFound(format!("lights/{}", event.id)))?;
                if let Some(update) = event.state {
                    light.apply_update(&update);
                }
            }
        }
        Ok(())
    }
}
