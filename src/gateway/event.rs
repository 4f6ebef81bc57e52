//! Push events emitted by the gateway.
//!
//! Mirrors the deCONZ websocket event shape:
//! `{"e": "changed", "r": "lights", "id": "3", "state": {"on": true}}`.

use super::light::{LightDescriptor, StateUpdate};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Kind of resource a signal or event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
pub enum ResourceKind {
    #[serde(rename = "lights")]
    #[strum(serialize = "light")]
    Light,
    #[serde(rename = "sensors")]
    #[strum(serialize = "sensor")]
    Sensor,
    #[serde(rename = "groups")]
    #[strum(serialize = "group")]
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Added,
    Changed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayEvent {
    #[serde(rename = "e")]
    pub kind: EventKind,
    #[serde(rename = "r")]
    pub resource: ResourceKind,
    pub id: String,
    /// Full resource, present on `added` light events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<LightDescriptor>,
    /// Changed state fields, present on `changed` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateUpdate>,
}
