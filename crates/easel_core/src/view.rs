//! Render views owned by the host.

use std::sync::Arc;

use crate::{Engine, Rasterizer};

/// Opaque handle identifying one live view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub usize);

/// One active render surface, with its engine and rasterizer.
#[derive(Debug)]
pub struct PlatformView {
    id: ViewId,
    engine: Engine,
    rasterizer: Arc<Rasterizer>,
}

impl PlatformView {
    pub fn new(id: ViewId, engine: Engine, rasterizer: Arc<Rasterizer>) -> Self {
        Self {
            id,
            engine,
            rasterizer,
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn rasterizer(&self) -> &Arc<Rasterizer> {
        &self.rasterizer
    }
}
