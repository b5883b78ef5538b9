//! VGG16 encoder with fully-convolutional fc6/fc7 layers.
//!
//! The trunk is the standard five-block VGG16 feature extractor; fc6 and fc7
//! are carried as 7x7 and 1x1 convolutions so the whole network stays
//! convolutional. Pretrained weights are restored from a Burn binary record
//! rather than fetched by tensor name: `forward` hands back a typed
//! [`EncoderFeatures`] record.

use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{MaxPool2d, MaxPool2dConfig};
use burn::nn::{Dropout, DropoutConfig, PaddingConfig2d};
use burn::record::{BinFileRecorder, FullPrecisionSettings, RecorderError};
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the serialized backbone inside the pretrained model directory.
pub const VGG_CHECKPOINT: &str = "vgg16.bin";

#[derive(Debug, Error)]
pub enum VggLoadError {
    #[error("pretrained vgg checkpoint missing at {path}")]
    MissingArtifact { path: PathBuf },
    #[error("failed to restore vgg checkpoint: {0}")]
    Recorder(#[from] RecorderError),
}

/// Channel widths for the backbone. The real network uses the defaults;
/// tests shrink them to keep the same topology cheap.
#[derive(Debug, Clone)]
pub struct Vgg16Config {
    /// Channels of the first conv block; later blocks scale by 2/4/8/8.
    pub base_channels: usize,
    /// Channels of the fully-convolutional fc6/fc7 layers.
    pub fc_channels: usize,
    /// Probability of keeping an activation in the fc6/fc7 dropout.
    pub keep_prob: f64,
}

impl Default for Vgg16Config {
    fn default() -> Self {
        Self {
            base_channels: 64,
            fc_channels: 4096,
            keep_prob: 0.5,
        }
    }
}

impl Vgg16Config {
    /// Tiny configuration with the full topology, for tests.
    pub fn miniature() -> Self {
        Self {
            base_channels: 2,
            fc_channels: 8,
            keep_prob: 0.5,
        }
    }

    pub fn with_keep_prob(mut self, keep_prob: f64) -> Self {
        self.keep_prob = keep_prob;
        self
    }

    pub fn pool3_channels(&self) -> usize {
        self.base_channels * 4
    }

    pub fn pool4_channels(&self) -> usize {
        self.base_channels * 8
    }

    pub fn conv7_channels(&self) -> usize {
        self.fc_channels
    }
}

/// The three feature maps the decoder consumes, shallow to deep.
#[derive(Debug, Clone)]
pub struct EncoderFeatures<B: Backend> {
    /// After the third pooling stage, 1/8 input resolution.
    pub pool3: Tensor<B, 4>,
    /// After the fourth pooling stage, 1/16 input resolution.
    pub pool4: Tensor<B, 4>,
    /// After the fc7 convolution, 1/32 input resolution.
    pub conv7: Tensor<B, 4>,
}

#[derive(Debug, Module)]
struct ConvRelu<B: Backend> {
    conv: Conv2d<B>,
}

impl<B: Backend> ConvRelu<B> {
    fn new(channels_in: usize, channels_out: usize, device: &B::Device) -> Self {
        let conv = Conv2dConfig::new([channels_in, channels_out], [3, 3])
            .with_padding(PaddingConfig2d::Same)
            .init(device);
        Self { conv }
    }

    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        relu(self.conv.forward(input))
    }
}

#[derive(Debug, Module)]
pub struct Vgg16Backbone<B: Backend> {
    block1: Vec<ConvRelu<B>>,
    block2: Vec<ConvRelu<B>>,
    block3: Vec<ConvRelu<B>>,
    block4: Vec<ConvRelu<B>>,
    block5: Vec<ConvRelu<B>>,
    pool: MaxPool2d,
    conv6: Conv2d<B>,
    conv7: Conv2d<B>,
    dropout: Dropout,
}

impl<B: Backend> Vgg16Backbone<B> {
    pub fn new(cfg: Vgg16Config, device: &B::Device) -> Self {
        let b = cfg.base_channels;
        let block = |channels_in: usize, channels_out: usize, depth: usize| {
            let mut convs = Vec::with_capacity(depth);
            convs.push(ConvRelu::new(channels_in, channels_out, device));
            for _ in 1..depth {
                convs.push(ConvRelu::new(channels_out, channels_out, device));
            }
            convs
        };

        let block1 = block(3, b, 2);
        let block2 = block(b, b * 2, 2);
        let block3 = block(b * 2, b * 4, 3);
        let block4 = block(b * 4, b * 8, 3);
        let block5 = block(b * 8, b * 8, 3);

        let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();

        let conv6 = Conv2dConfig::new([b * 8, cfg.fc_channels], [7, 7])
            .with_padding(PaddingConfig2d::Same)
            .init(device);
        let conv7 = Conv2dConfig::new([cfg.fc_channels, cfg.fc_channels], [1, 1])
            .with_padding(PaddingConfig2d::Valid)
            .init(device);
        let dropout = DropoutConfig::new(1.0 - cfg.keep_prob).init();

        Self {
            block1,
            block2,
            block3,
            block4,
            block5,
            pool,
            conv6,
            conv7,
            dropout,
        }
    }

    /// Restore a pretrained backbone from `<dir>/vgg16.bin`.
    ///
    /// The checkpoint must record a module with the same topology as `cfg`;
    /// a structural mismatch surfaces as [`VggLoadError::Recorder`].
    pub fn from_pretrained<P: AsRef<Path>>(
        dir: P,
        cfg: Vgg16Config,
        device: &B::Device,
    ) -> Result<Self, VggLoadError> {
        let path = dir.as_ref().join(VGG_CHECKPOINT);
        if !path.is_file() {
            return Err(VggLoadError::MissingArtifact { path });
        }
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        let backbone = Self::new(cfg, device).load_file(path, &recorder, device)?;
        Ok(backbone)
    }

    pub fn forward(&self, images: Tensor<B, 4>) -> EncoderFeatures<B> {
        let run_block = |convs: &[ConvRelu<B>], mut x: Tensor<B, 4>| {
            for conv in convs {
                x = conv.forward(x);
            }
            self.pool.forward(x)
        };

        let x = run_block(&self.block1, images);
        let x = run_block(&self.block2, x);
        let pool3 = run_block(&self.block3, x);
        let pool4 = run_block(&self.block4, pool3.clone());
        let x = run_block(&self.block5, pool4.clone());

        let x = self.dropout.forward(relu(self.conv6.forward(x)));
        let conv7 = self.dropout.forward(relu(self.conv7.forward(x)));

        EncoderFeatures {
            pool3,
            pool4,
            conv7,
        }
    }
}
