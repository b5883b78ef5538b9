//! Pixel-level overlay painting for segmentation results.

pub mod overlay;

pub use overlay::{blend_mask, rgb_to_rgba};
