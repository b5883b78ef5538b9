//! Batch iteration for training.

use crate::kitti::{index_pairs, load_sample};
use crate::types::{DatasetConfig, DatasetResult, SamplePair};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::path::Path;

/// One training batch: images and one-hot labels of matching spatial shape.
pub struct SegBatch<B: Backend> {
    /// `[batch, 3, height, width]`, normalized to [0, 1].
    pub images: Tensor<B, 4>,
    /// `[batch, num_classes, height, width]` one-hot.
    pub labels: Tensor<B, 4>,
}

/// Generator seam between the dataset and the training loop. The trainer
/// drains a source once per epoch and calls `reset` in between; tests stub
/// this with synthetic batches.
pub trait BatchSource<B: Backend> {
    fn next_batch(
        &mut self,
        batch_size: usize,
        device: &B::Device,
    ) -> DatasetResult<Option<SegBatch<B>>>;

    /// Rewind for the next epoch.
    fn reset(&mut self);
}

pub struct BatchIter {
    pairs: Vec<SamplePair>,
    cursor: usize,
    cfg: DatasetConfig,
    rng: StdRng,
    images_buf: Vec<f32>,
    labels_buf: Vec<f32>,
}

impl BatchIter {
    pub fn from_root(training_dir: &Path, cfg: DatasetConfig) -> DatasetResult<Self> {
        let pairs = index_pairs(training_dir)?;
        Ok(Self::from_pairs(pairs, cfg))
    }

    pub fn from_pairs(mut pairs: Vec<SamplePair>, cfg: DatasetConfig) -> Self {
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        if cfg.shuffle {
            pairs.shuffle(&mut rng);
        }
        Self {
            pairs,
            cursor: 0,
            cfg,
            rng,
            images_buf: Vec::new(),
            labels_buf: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<B: Backend> BatchSource<B> for BatchIter {
    fn next_batch(
        &mut self,
        batch_size: usize,
        device: &B::Device,
    ) -> DatasetResult<Option<SegBatch<B>>> {
        if self.cursor >= self.pairs.len() {
            return Ok(None);
        }
        let end = (self.cursor + batch_size.max(1)).min(self.pairs.len());
        let slice = &self.pairs[self.cursor..end];
        self.cursor = end;

        // Decode in parallel, then restore on-disk order.
        let mut loaded: Vec<_> = slice
            .par_iter()
            .enumerate()
            .map(|(i, pair)| (i, load_sample(pair, &self.cfg)))
            .collect();
        loaded.sort_by_key(|(i, _)| *i);

        self.images_buf.clear();
        self.labels_buf.clear();
        for (_, result) in loaded {
            let sample = result?;
            self.images_buf.extend_from_slice(&sample.image_chw);
            self.labels_buf.extend_from_slice(&sample.label_chw);
        }

        let batch_len = slice.len();
        let (width, height) = self.cfg.target_size;
        let images = Tensor::<B, 1>::from_floats(self.images_buf.as_slice(), device).reshape([
            batch_len,
            3,
            height as usize,
            width as usize,
        ]);
        let labels = Tensor::<B, 1>::from_floats(self.labels_buf.as_slice(), device).reshape([
            batch_len,
            self.cfg.num_classes,
            height as usize,
            width as usize,
        ]);

        Ok(Some(SegBatch { images, labels }))
    }

    fn reset(&mut self) {
        self.cursor = 0;
        if self.cfg.shuffle {
            self.pairs.shuffle(&mut self.rng);
        }
    }
}
