//! Switch platform for deCONZ.
//!
//! Power plugs and warning devices live in the gateway's light registry next
//! to real lights. This platform picks them out and bridges each one to a
//! host switch entity, once per device for the lifetime of the session:
//! - `classifier`: light type tag to switch variant
//! - `listener`: discovery listener driving the bridging
//! - `entity`: the switch capability contract and shared device context
//! - `power_plug` / `siren`: the two variants

pub mod classifier;
pub mod entity;
pub mod listener;
pub mod power_plug;
pub mod siren;

pub use classifier::{POWER_PLUGS, SIRENS, SwitchKind, classify};
pub use entity::{DeconzDevice, DeviceInfo, SwitchEntity, TurnOptions};
pub use listener::{AddEntities, DiscoveryListener, ListenerState};
pub use power_plug::DeconzPowerPlug;
pub use siren::DeconzSiren;

use crate::error::{BridgeError, Result};
use crate::gateway::Gateway;
use crate::session::IntegrationSession;
use log::info;
use std::sync::Arc;

/// Set up switches for a gateway session.
///
/// Subscribes to the gateway's new-light signal, bridges every switch the
/// gateway already knows, and ties unsubscription to session teardown.
pub fn setup_entry(
    gateway: &Arc<Gateway>,
    session: &IntegrationSession,
    add_entities: AddEntities,
) -> Result<Arc<DiscoveryListener>> {
    if session.is_unloaded() {
        return Err(BridgeError::SessionUnloaded);
    }

    let listener = DiscoveryListener::new(gateway.clone(), session.tracker().clone(), add_entities);

    let teardown = listener.clone();
    session.on_unload(move || {
        teardown.unsubscribe();
    })?;

    let added = listener.start();
    info!(
        "[Switch] set up for gateway {} ({} switch(es) bridged)",
        gateway.bridge_id(),
        added
    );
    Ok(listener)
}
