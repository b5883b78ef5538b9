//! Core types and error definitions for road_dataset.

use std::path::PathBuf;
use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image decode error at {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no ground-truth mask for image {image}")]
    MissingLabel { image: PathBuf },
    #[error("no training pairs found under {root}")]
    Empty { root: PathBuf },
    #[error("dataset layout missing {path}")]
    MissingLayout { path: PathBuf },
}

/// One camera image and its ground-truth road mask on disk.
#[derive(Debug, Clone)]
pub struct SamplePair {
    pub image: PathBuf,
    pub label: PathBuf,
}

/// A decoded pair, resized to the training shape.
#[derive(Debug, Clone)]
pub struct SegSample {
    /// Image in CHW layout, normalized to [0, 1].
    pub image_chw: Vec<f32>,
    /// One-hot labels in CHW layout, one channel per class.
    pub label_chw: Vec<f32>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Resize every pair to this (width, height) before batching.
    pub target_size: (u32, u32),
    /// Channels of the one-hot label tensor.
    pub num_classes: usize,
    /// Ground-truth pixels of exactly this color are background; everything
    /// else is road.
    pub background_color: [u8; 3],
    /// Shuffle samples before each epoch.
    pub shuffle: bool,
    /// Seed for reproducible shuffling.
    pub seed: Option<u64>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            target_size: (576, 160),
            num_classes: 2,
            background_color: [255, 0, 0],
            shuffle: true,
            seed: None,
        }
    }
}
