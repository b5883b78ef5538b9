//! Road-scene dataset loading and Burn-compatible batching.
//!
//! This crate provides utilities for:
//! - Pairing camera images with their ground-truth road masks on disk
//! - Decoding and resizing pairs into CHW float samples with one-hot labels
//! - Shuffled batch iteration behind the [`BatchSource`] seam the trainer
//!   consumes

pub mod batch;
pub mod kitti;
pub mod types;

pub use batch::{BatchIter, BatchSource, SegBatch};
pub use kitti::{check_layout, index_pairs, load_sample};
pub use types::{DatasetConfig, DatasetError, DatasetResult, SamplePair, SegSample};
