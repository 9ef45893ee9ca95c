//! The rasterizer keeps the most recently drawn layer tree for inspection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::LayerTree;

/// Produces frames for one view and retains the last one it drew.
#[derive(Debug, Default)]
pub struct Rasterizer {
    last_layer_tree: Mutex<Option<Arc<LayerTree>>>,
    frame_count: AtomicU64,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `tree` as the most recently produced frame.
    pub fn draw(&self, tree: LayerTree) {
        let mut guard = self.last_layer_tree.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Arc::new(tree));
        self.frame_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn last_layer_tree(&self) -> Option<Arc<LayerTree>> {
        self.last_layer_tree
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::Relaxed)
    }
}
