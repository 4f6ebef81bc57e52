//! Signal dispatcher for "new device" notifications.
//!
//! Callbacks are connected to a signal name and invoked synchronously, in
//! connection order, every time a payload is sent on that signal. Sends are
//! processed in the order they are made.
//!
//! Connecting returns a [`Subscription`] guard. Dropping the guard or calling
//! [`Subscription::unsubscribe`] disconnects the callback; both are safe to
//! repeat.

use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

type Callback<P> = Arc<dyn Fn(&P) + Send + Sync>;

struct Registry<P> {
    next_id: u64,
    signals: HashMap<String, Vec<(u64, Callback<P>)>>,
}

impl<P> Registry<P> {
    fn disconnect(&mut self, signal: &str, id: u64) -> bool {
        let Some(callbacks) = self.signals.get_mut(signal) else {
            return false;
        };
        let before = callbacks.len();
        callbacks.retain(|(cb_id, _)| *cb_id != id);
        let removed = callbacks.len() != before;
        if callbacks.is_empty() {
            self.signals.remove(signal);
        }
        removed
    }
}

/// Signal-name keyed callback registry.
pub struct Dispatcher<P> {
    registry: Arc<Mutex<Registry<P>>>,
}

impl<P: Send + 'static> Dispatcher<P> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                signals: HashMap::new(),
            })),
        }
    }

    /// Connect `callback` to `signal`.
    pub fn connect<F>(&self, signal: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        let signal = signal.into();
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry
                .signals
                .entry(signal.clone())
                .or_default()
                .push((id, Arc::new(callback)));
            id
        };
        debug!("[Dispatcher] connected #{} to {}", id, signal);

        let registry: Weak<Mutex<Registry<P>>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            let Some(registry) = registry.upgrade() else {
                return false;
            };
            let removed = registry.lock().disconnect(&signal, id);
            if removed {
                debug!("[Dispatcher] disconnected #{} from {}", id, signal);
            }
            removed
        })
    }

    /// Send `payload` to every callback connected to `signal`.
    ///
    /// Returns the number of callbacks invoked. The registry lock is not held
    /// while callbacks run, so a callback may connect or disconnect.
    pub fn send(&self, signal: &str, payload: &P) -> usize {
        let callbacks: Vec<Callback<P>> = self
            .registry
            .lock()
            .signals
            .get(signal)
            .map(|cbs| cbs.iter().map(|(_, cb)| cb.clone()).collect())
            .unwrap_or_default();

        for callback in &callbacks {
            callback(payload);
        }
        callbacks.len()
    }

    /// Number of callbacks currently connected to `signal`.
    pub fn receivers(&self, signal: &str) -> usize {
        self.registry
            .lock()
            .signals
            .get(signal)
            .map_or(0, Vec::len)
    }
}

impl<P: Send + 'static> Default for Dispatcher<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection handle returned by [`Dispatcher::connect`].
pub struct Subscription {
    disconnect: Mutex<Option<Box<dyn FnOnce() -> bool + Send>>>,
}

impl Subscription {
    fn new(disconnect: impl FnOnce() -> bool + Send + 'static) -> Self {
        Self {
            disconnect: Mutex::new(Some(Box::new(disconnect))),
        }
    }

    /// Disconnect the callback. Returns true only for the call that disconnected it.
    pub fn unsubscribe(&self) -> bool {
        let disconnect = self.disconnect.lock().take();
        match disconnect {
            Some(disconnect) => disconnect(),
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.disconnect.lock().is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
