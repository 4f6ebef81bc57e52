//! Integration session: the lifetime of one configured gateway.
//!
//! Platforms register teardown callbacks with [`IntegrationSession::on_unload`];
//! [`IntegrationSession::unload`] runs each of them exactly once.

use crate::error::{BridgeError, Result};
use crate::tracker::RegistrationTracker;
use log::info;
use parking_lot::Mutex;
use std::sync::Arc;

type UnloadCallback = Box<dyn FnOnce() + Send>;

struct State {
    unloaded: bool,
    callbacks: Vec<UnloadCallback>,
}

pub struct IntegrationSession {
    entry_id: String,
    tracker: Arc<RegistrationTracker>,
    state: Mutex<State>,
}

impl IntegrationSession {
    pub fn new(entry_id: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.into(),
            tracker: Arc::new(RegistrationTracker::new()),
            state: Mutex::new(State {
                unloaded: false,
                callbacks: Vec::new(),
            }),
        }
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    /// Devices bridged during this session.
    pub fn tracker(&self) -> &Arc<RegistrationTracker> {
        &self.tracker
    }

    pub fn is_unloaded(&self) -> bool {
        self.state.lock().unloaded
    }

    /// Register `callback` to run at teardown.
    ///
    /// On an unloaded session the callback runs right away and
    /// `SessionUnloaded` is returned.
    pub fn on_unload(&self, callback: impl FnOnce() + Send + 'static) -> Result<()> {
        {
            let mut state = self.state.lock();
            if !state.unloaded {
                state.callbacks.push(Box::new(callback));
                return Ok(());
            }
        }
        callback();
        Err(BridgeError::SessionUnloaded)
    }

    /// Tear the session down. Returns the number of callbacks run; 0 on repeat calls.
    pub fn unload(&self) -> usize {
        let callbacks = {
            let mut state = self.state.lock();
            if state.unloaded {
                return 0;
            }
            state.unloaded = true;
            std::mem::take(&mut state.callbacks)
        };

        let count = callbacks.len();
        // Release in reverse registration order.
        for callback in callbacks.into_iter().rev() {
            callback();
        }
        self.tracker.clear();
        info!("Session {} unloaded ({} callback(s))", self.entry_id, count);
        count
    }
}

impl Drop for IntegrationSession {
    fn drop(&mut self) {
        self.unload();
    }
}
