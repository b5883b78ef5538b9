#![recursion_limit = "256"]

//! Post-training inference: overlay export and checkpoint helpers.

pub mod checkpoint;
pub mod export;

pub use checkpoint::{load_checkpoint, save_checkpoint};
pub use export::{export_samples, ExportConfig};

/// Backend alias for inference (NdArray by default; WGPU if enabled).
#[cfg(feature = "backend-wgpu")]
pub type InferenceBackend = burn_wgpu::Wgpu<f32>;
#[cfg(not(feature = "backend-wgpu"))]
pub type InferenceBackend = burn_ndarray::NdArray<f32>;
