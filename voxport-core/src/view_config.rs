//! Per-dataset view configuration with cascade cleanup.
//!
//! Display settings (slice index, window width/level) live outside the
//! datasets themselves. The registry subscribes to the dataset store's
//! deletion stream so settings for removed datasets are pruned without
//! polling or peeking at store internals.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::store::{DataId, DatasetStore};

/// Display settings for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub slice_index: u32,
    pub window_width: f64,
    pub window_level: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            slice_index: 0,
            window_width: 400.0,
            window_level: 40.0,
        }
    }
}

/// Holds view configuration per dataset id.
#[derive(Default)]
pub struct ViewConfigRegistry {
    configs: Mutex<HashMap<DataId, ViewConfig>>,
}

impl ViewConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, id: DataId, config: ViewConfig) {
        self.configs.lock().expect("view configs poisoned").insert(id, config);
    }

    pub fn get(&self, id: DataId) -> Option<ViewConfig> {
        self.configs.lock().expect("view configs poisoned").get(&id).cloned()
    }

    pub fn remove(&self, id: DataId) -> bool {
        self.configs.lock().expect("view configs poisoned").remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.configs.lock().expect("view configs poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe to the store's deletion stream and prune settings for
    /// deleted datasets until the store (sender) goes away. Returns the
    /// subscriber task; abort it to unsubscribe at teardown.
    pub fn spawn_cleanup(self: &Arc<Self>, store: &DatasetStore) -> JoinHandle<()> {
        let mut deletions = store.subscribe_deletions();
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            while let Ok(id) = deletions.recv().await {
                if registry.remove(id) {
                    debug!(%id, "pruned view config for deleted dataset");
                }
            }
        })
    }
}
