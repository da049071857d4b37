//! Growing, pointer-reactive trees on a full-viewport canvas.

mod component;
pub mod generator;
pub mod growth;
pub mod physics;
pub mod registry;
mod render;
pub mod scale;
pub mod state;
pub mod types;

pub use component::TreeScene;
