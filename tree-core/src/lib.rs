//! Procedural 2-D pixel-art tree generation.
//!
//! Main components:
//! - [`params`] - bounded tree parameters, presets and normalization.
//! - [`grammar`] - stochastic L-system rewriting into a symbol sequence.
//! - [`structure`] - turtle interpretation into a branch arena and leaf clusters.
//! - [`render`] - rasterization of a structure into a pixel buffer.
//! - [`buffer`] - the pixel buffer with checked and unchecked access.
//! - [`generator`] - the seeded end-to-end pipeline and its metadata.
//! - [`color`] - RGBA packing and alpha compositing.
//! - [`types`] - shared ids and bounding boxes.

pub mod buffer;
pub mod color;
pub mod generator;
pub mod grammar;
pub mod params;
pub mod render;
pub mod structure;
pub mod types;

pub use buffer::{BufferError, PixelBuffer, RgbaBuffer};
pub use generator::{TreeGenerator, TreeMetadata};
pub use params::TreeParameters;
