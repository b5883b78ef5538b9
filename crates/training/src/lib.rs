#![recursion_limit = "256"]

pub mod config;
pub mod loss;
pub mod trainer;

pub use config::{
    sweep_grid, validate_backend_choice, BackendKind, HyperParamError, HyperParams, RunConfig,
    RunTag,
};
pub use loss::{cross_entropy, flatten_scores};
pub use trainer::{train, TrainReport};

/// Backend alias for training (NdArray by default; WGPU if enabled).
#[cfg(feature = "backend-wgpu")]
pub type TrainBackend = burn_wgpu::Wgpu<f32>;
#[cfg(not(feature = "backend-wgpu"))]
pub type TrainBackend = burn_ndarray::NdArray<f32>;
