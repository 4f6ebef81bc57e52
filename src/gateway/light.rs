//! Light resources as the deCONZ gateway reports them.
//!
//! deCONZ exposes power plugs and warning devices (sirens) through its
//! `/lights` resource, next to actual lights. A [`LightResource`] keeps the
//! gateway's last known state and forwards state-change commands through a
//! [`LightTransport`]. The cached state only changes when the gateway pushes
//! an update, never as a side effect of issuing a command.

use super::transport::LightTransport;
use crate::error::GatewayError;
use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{AsRefStr, Display, EnumString};

/// Alert mode of a light resource.
///
/// Warning devices sound while the alert is [`Alert::Lselect`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Alert {
    /// No alert active
    #[default]
    None,
    /// Single breathe cycle
    Select,
    /// Long running alert (siren sounding)
    Lselect,
}

/// State block of a light resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightState {
    /// On/off state; absent for resources without an on/off attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
    #[serde(default = "default_reachable")]
    pub reachable: bool,
}

fn default_reachable() -> bool {
    true
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            on: None,
            alert: None,
            reachable: true,
        }
    }
}

/// Partial state pushed by the gateway. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reachable: Option<bool>,
}

/// Body of a `PUT /lights/<id>/state` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LightCommand {
    /// Generic on/off state change, used by power plugs.
    SetState { on: bool },
    /// Alert change, used by warning devices.
    Alert { alert: Alert },
}

impl LightCommand {
    /// The state the gateway will report once it has applied this command.
    pub fn expected_update(&self) -> StateUpdate {
        match self {
            Self::SetState { on } => StateUpdate {
                on: Some(*on),
                ..StateUpdate::default()
            },
            Self::Alert { alert } => StateUpdate {
                alert: Some(*alert),
                ..StateUpdate::default()
            },
        }
    }
}

/// Light resource as listed by `GET /lights`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightDescriptor {
    #[serde(rename = "uniqueid")]
    pub unique_id: String,
    #[serde(default)]
    pub name: String,
    /// Hardware class reported by deCONZ, e.g. "Smart plug".
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default, rename = "manufacturername")]
    pub manufacturer: Option<String>,
    #[serde(default, rename = "modelid")]
    pub model_id: Option<String>,
    #[serde(default, rename = "swversion")]
    pub sw_version: Option<String>,
    #[serde(default)]
    pub state: LightState,
}

struct Inner {
    state: LightState,
    last_updated: Option<DateTime<Utc>>,
}

/// A light resource owned by the gateway.
///
/// Shared between the gateway registry and every bridge entity built on it.
pub struct LightResource {
    id: String,
    unique_id: String,
    name: String,
    type_tag: String,
    manufacturer: Option<String>,
    model_id: Option<String>,
    sw_version: Option<String>,
    inner: RwLock<Inner>,
    transport: Arc<dyn LightTransport>,
}

impl LightResource {
    /// Create a resource from its descriptor.
    ///
    /// `id` is the gateway-local resource id used in request paths.
    pub fn new(
        id: impl Into<String>,
        descriptor: LightDescriptor,
        transport: Arc<dyn LightTransport>,
    ) -> Self {
        Self {
            id: id.into(),
            unique_id: descriptor.unique_id,
            name: descriptor.name,
            type_tag: descriptor.type_tag,
            manufacturer: descriptor.manufacturer,
            model_id: descriptor.model_id,
            sw_version: descriptor.sw_version,
            inner: RwLock::new(Inner {
                state: descriptor.state,
                last_updated: None,
            }),
            transport,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    pub fn sw_version(&self) -> Option<&str> {
        self.sw_version.as_deref()
    }

    /// Boolean on/off state; resources without one read as off.
    pub fn state(&self) -> bool {
        self.inner.read().state.on.unwrap_or(false)
    }

    /// Whether the warning device is currently sounding.
    pub fn is_sounding(&self) -> bool {
        self.inner.read().state.alert == Some(Alert::Lselect)
    }

    pub fn alert(&self) -> Option<Alert> {
        self.inner.read().state.alert
    }

    pub fn reachable(&self) -> bool {
        self.inner.read().state.reachable
    }

    /// Time of the last pushed update, `None` until the first push.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.inner.read().last_updated
    }

    /// Generic on/off state change.
    pub async fn set_state(&self, on: bool) -> Result<(), GatewayError> {
        self.send(LightCommand::SetState { on }).await
    }

    /// Start sounding (warning devices).
    pub async fn turn_on(&self) -> Result<(), GatewayError> {
        self.send(LightCommand::Alert {
            alert: Alert::Lselect,
        })
        .await
    }

    /// Stop sounding (warning devices).
    pub async fn turn_off(&self) -> Result<(), GatewayError> {
        self.send(LightCommand::Alert { alert: Alert::None }).await
    }

    async fn send(&self, command: LightCommand) -> Result<(), GatewayError> {
        debug!("[Gateway] light {} <- {:?}", self.id, command);
        self.transport.put_state(&self.id, &command).await
    }

    /// Apply a state push from the gateway. Returns true if anything changed.
    pub fn apply_update(&self, update: &StateUpdate) -> bool {
        let mut inner = self.inner.write();
        let old = inner.state.clone();

        if let Some(on) = update.on {
            inner.state.on = Some(on);
        }
        if let Some(alert) = update.alert {
            inner.state.alert = Some(alert);
        }
        if let Some(reachable) = update.reachable {
            inner.state.reachable = reachable;
        }
        inner.last_updated = Some(Utc::now());

        inner.state != old
    }
}

impl std::fmt::Debug for LightResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightResource")
            .field("id", &self.id)
            .field("unique_id", &self.unique_id)
            .field("type_tag", &self.type_tag)
            .field("state", &self.inner.read().state)
            .finish()
    }
}
