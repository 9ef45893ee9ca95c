//! Host-side collaborators for the easel service protocol.
//!
//! Everything the inspection handlers talk to lives here: render views and
//! their rasterizers, the script engine seam, and the GPU/UI task runners
//! that handlers post work onto.

pub mod canvas;
pub mod engine;
pub mod geometry;
pub mod layer_tree;
pub mod rasterizer;
pub mod shell;
pub mod task;
pub mod view;

pub use canvas::*;
pub use engine::*;
pub use geometry::*;
pub use layer_tree::*;
pub use rasterizer::*;
pub use shell::*;
pub use task::*;
pub use view::*;

// Re-export commonly used palette types
pub use palette::Srgba;
