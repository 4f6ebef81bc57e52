//! deCONZ switch bridge library.
//!
//! Picks the switch-like devices (power plugs and warning devices) out of a
//! deCONZ gateway's light registry and bridges each one, once, into a host
//! switch entity. Devices learned while the session runs are picked up from
//! the gateway's new-device signal.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod session;
pub mod switch;
pub mod tracker;

pub use error::{BridgeError, GatewayError, Result};
pub use gateway::Gateway;
pub use session::IntegrationSession;
pub use switch::{AddEntities, DiscoveryListener, SwitchEntity, SwitchKind, setup_entry};
