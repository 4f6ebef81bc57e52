//! Registration tracker: which devices are already bridged, per category.
//!
//! The check and the insert happen under one lock, so two discovery passes
//! racing on the same new device can never both bridge it.

use log::debug;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct RegistrationTracker {
    categories: Mutex<HashMap<String, HashSet<String>>>,
}

impl RegistrationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, category: &str, unique_id: &str) -> bool {
        self.categories
            .lock()
            .get(category)
            .is_some_and(|ids| ids.contains(unique_id))
    }

    /// Record `unique_id` as bridged. Returns false if it already was.
    pub fn mark_registered(&self, category: &str, unique_id: &str) -> bool {
        self.try_register(category, unique_id)
    }

    /// Atomic test-and-set: true only for the caller that registered the id.
    pub fn try_register(&self, category: &str, unique_id: &str) -> bool {
        let inserted = self
            .categories
            .lock()
            .entry(category.to_string())
            .or_default()
            .insert(unique_id.to_string());
        if inserted {
            debug!("[Tracker] registered {} as {}", unique_id, category);
        }
        inserted
    }

    /// Number of ids registered under `category`.
    pub fn count(&self, category: &str) -> usize {
        self.categories.lock().get(category).map_or(0, HashSet::len)
    }

    /// Forget everything; only done at session teardown.
    pub fn clear(&self) {
        self.categories.lock().clear();
    }
}
