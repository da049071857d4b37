//! One-shot intro: a white tile mosaic that bleeds away from the lettering.

pub mod animator;
mod component;
pub mod mask;
pub mod plan;
mod render;

pub use component::MosaicIntro;
