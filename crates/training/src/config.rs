//! Hyperparameter records, validation, and the fixed sweep grid.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HyperParamError {
    #[error("keep_prob {0} outside (0, 1]")]
    KeepProb(f64),
    #[error("learning_rate {0} must be positive and finite")]
    LearningRate(f64),
    #[error("weight_decay {0} must be non-negative and finite")]
    WeightDecay(f64),
    #[error("batch_size must be at least 1")]
    BatchSize,
    #[error("epochs must be at least 1")]
    Epochs,
}

/// One run's hyperparameters; immutable once the run starts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HyperParams {
    /// Dropout keep probability for the backbone's fc6/fc7 layers.
    pub keep_prob: f64,
    pub learning_rate: f64,
    /// L2 penalty applied through the optimizer.
    pub weight_decay: f64,
    pub batch_size: usize,
    pub epochs: usize,
}

impl HyperParams {
    pub fn validate(&self) -> Result<(), HyperParamError> {
        if !self.keep_prob.is_finite() || self.keep_prob <= 0.0 || self.keep_prob > 1.0 {
            return Err(HyperParamError::KeepProb(self.keep_prob));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(HyperParamError::LearningRate(self.learning_rate));
        }
        if !self.weight_decay.is_finite() || self.weight_decay < 0.0 {
            return Err(HyperParamError::WeightDecay(self.weight_decay));
        }
        if self.batch_size == 0 {
            return Err(HyperParamError::BatchSize);
        }
        if self.epochs == 0 {
            return Err(HyperParamError::Epochs);
        }
        Ok(())
    }
}

/// Structured run identifier; one per grid point.
///
/// Rendering follows the legacy `klr_<keep><lr><reg>_` prefix so exported
/// artifacts keep their historical names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTag {
    pub keep_index: u8,
    pub lr_index: u8,
    pub reg_index: u8,
}

impl fmt::Display for RunTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "klr_{}{}{}_",
            self.keep_index, self.lr_index, self.reg_index
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunConfig {
    pub tag: RunTag,
    pub hyper: HyperParams,
}

/// Enumerate the full sweep: keep_prob from `0.3 * i - 0.1` over i in 1..=4
/// (clamped into (0, 1], so the last point disables dropout), learning rate
/// `0.001^j` over j in 1..=2, weight decay `0.001^k` over k in 1..=2.
pub fn sweep_grid(batch_size: usize, epochs: usize) -> Vec<RunConfig> {
    let mut runs = Vec::with_capacity(16);
    for i in 1..=4u8 {
        for j in 1..=2u8 {
            for k in 1..=2u8 {
                let hyper = HyperParams {
                    keep_prob: (0.3 * i as f64 - 0.1).min(1.0),
                    learning_rate: 0.001f64.powi(j as i32),
                    weight_decay: 0.001f64.powi(k as i32),
                    batch_size,
                    epochs,
                };
                hyper
                    .validate()
                    .expect("sweep grid produces valid hyperparameters");
                runs.push(RunConfig {
                    tag: RunTag {
                        keep_index: i,
                        lr_index: j,
                        reg_index: k,
                    },
                    hyper,
                });
            }
        }
    }
    runs
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum BackendKind {
    NdArray,
    Wgpu,
}

/// Check the requested backend against what was compiled in. An impossible
/// request halts; a redundant one just prints a note.
pub fn validate_backend_choice(kind: BackendKind) -> anyhow::Result<()> {
    let built_wgpu = cfg!(feature = "backend-wgpu");
    match (kind, built_wgpu) {
        (BackendKind::Wgpu, false) => {
            anyhow::bail!(
                "backend-wgpu feature not enabled; rebuild with --features backend-wgpu or choose ndarray"
            )
        }
        (BackendKind::NdArray, true) => {
            println!("note: built with backend-wgpu; the WGPU backend is used despite --backend ndarray");
        }
        _ => {}
    }
    Ok(())
}
