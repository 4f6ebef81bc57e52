//! Discovery listener: turns new-device signals into bridged switch entities.

use super::classifier::classify;
use super::entity::SwitchEntity;
use crate::dispatcher::Subscription;
use crate::gateway::{Gateway, LightResource, NewDevices, ResourceKind};
use crate::tracker::RegistrationTracker;
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use strum::Display;

/// Host callback receiving each batch of newly bridged entities.
pub type AddEntities = Arc<dyn Fn(Vec<Arc<dyn SwitchEntity>>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ListenerState {
    /// Created, not subscribed yet
    Idle,
    /// Subscribed to the new-device signal
    Active,
    /// Torn down; terminal
    Unsubscribed,
}

pub struct DiscoveryListener {
    gateway: Arc<Gateway>,
    tracker: Arc<RegistrationTracker>,
    add_entities: AddEntities,
    state: Mutex<ListenerState>,
    subscription: Mutex<Option<Subscription>>,
}

impl DiscoveryListener {
    pub fn new(
        gateway: Arc<Gateway>,
        tracker: Arc<RegistrationTracker>,
        add_entities: AddEntities,
    ) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            tracker,
            add_entities,
            state: Mutex::new(ListenerState::Idle),
            subscription: Mutex::new(None),
        })
    }

    pub fn state(&self) -> ListenerState {
        *self.state.lock()
    }

    /// Subscribe to the new-device signal, then run the initial pass over
    /// every light the gateway knows.
    ///
    /// Returns the number of entities bridged by the initial pass. Only the
    /// first call on an idle listener does anything.
    pub fn start(self: &Arc<Self>) -> usize {
        {
            let mut state = self.state.lock();
            if *state != ListenerState::Idle {
                return 0;
            }

            let signal = self.gateway.signal_new_device(ResourceKind::Light);
            let listener = Arc::downgrade(self);
            let subscription = self
                .gateway
                .dispatcher()
                .connect(signal, move |lights: &NewDevices| {
                    if let Some(listener) = listener.upgrade() {
                        listener.process(lights);
                    }
                });
            *self.subscription.lock() = Some(subscription);
            *state = ListenerState::Active;
        }

        self.process(&self.gateway.lights())
    }

    /// Bridge every switch-like light in `lights` not bridged yet.
    ///
    /// New entities go to the host in a single call; nothing is called when
    /// there are none. Returns the number of entities handed over.
    pub fn process(&self, lights: &[Arc<LightResource>]) -> usize {
        let entities = self.collect(lights);
        self.deliver(entities)
    }

    fn collect(&self, lights: &[Arc<LightResource>]) -> Vec<Arc<dyn SwitchEntity>> {
        let mut entities: Vec<Arc<dyn SwitchEntity>> = Vec::new();
        for light in lights {
            // Teardown may land mid-pass; stop registering into a cleared tracker.
            if self.state() != ListenerState::Active {
                debug!("[Switch] listener not active, ignoring {} light(s)", lights.len());
                break;
            }

            let Some(kind) = classify(light.type_tag()) else {
                debug!(
                    "[Switch] {} ({}) is not a switch",
                    light.unique_id(),
                    light.type_tag()
                );
                continue;
            };

            if !self.tracker.try_register(kind.as_ref(), light.unique_id()) {
                debug!("[Switch] {} already bridged", light.unique_id());
                continue;
            }

            entities.push(kind.create_entity(light.clone(), self.gateway.clone()));
        }
        entities
    }

    fn deliver(&self, entities: Vec<Arc<dyn SwitchEntity>>) -> usize {
        if entities.is_empty() {
            return 0;
        }
        if self.state() != ListenerState::Active {
            debug!(
                "[Switch] listener torn down, dropping {} switch entity(ies)",
                entities.len()
            );
            return 0;
        }

        let count = entities.len();
        info!("[Switch] adding {} switch entity(ies)", count);
        (self.add_entities)(entities);
        count
    }

    /// Leave the new-device signal. Returns false if already unsubscribed.
    pub fn unsubscribe(&self) -> bool {
        {
            let mut state = self.state.lock();
            if *state == ListenerState::Unsubscribed {
                return false;
            }
            *state = ListenerState::Unsubscribed;
        }

        let subscription = self.subscription.lock().take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
        debug!("[Switch] discovery listener unsubscribed");
        true
    }
}
