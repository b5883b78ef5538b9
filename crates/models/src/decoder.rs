//! FCN-8s decoder: 1x1 score projections, learned upsampling, skip fusion.

use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig};
use burn::nn::{Initializer, PaddingConfig2d};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::vgg::{EncoderFeatures, Vgg16Config};

#[derive(Debug, Clone)]
pub struct FcnDecoderConfig {
    pub num_classes: usize,
    pub pool3_channels: usize,
    pub pool4_channels: usize,
    pub conv7_channels: usize,
}

impl FcnDecoderConfig {
    /// Channel counts of the full-size VGG16 encoder.
    pub fn new(num_classes: usize) -> Self {
        Self::for_backbone(num_classes, &Vgg16Config::default())
    }

    pub fn for_backbone(num_classes: usize, backbone: &Vgg16Config) -> Self {
        Self {
            num_classes,
            pool3_channels: backbone.pool3_channels(),
            pool4_channels: backbone.pool4_channels(),
            conv7_channels: backbone.conv7_channels(),
        }
    }
}

/// Decoder stack producing per-pixel class scores at input resolution.
///
/// Stages, in order: project conv7 to class channels, upsample x2, fuse
/// pool4, upsample x2, fuse pool3, upsample x8. Both skip fusions require
/// exactly matching shapes.
#[derive(Debug, Module)]
pub struct FcnDecoder<B: Backend> {
    score_conv7: Conv2d<B>,
    score_pool4: Conv2d<B>,
    score_pool3: Conv2d<B>,
    up2_deep: ConvTranspose2d<B>,
    up2_mid: ConvTranspose2d<B>,
    up8_out: ConvTranspose2d<B>,
}

impl<B: Backend> FcnDecoder<B> {
    pub fn new(cfg: FcnDecoderConfig, device: &B::Device) -> Self {
        let classes = cfg.num_classes;
        Self {
            score_conv7: score_projection(cfg.conv7_channels, classes, device),
            score_pool4: score_projection(cfg.pool4_channels, classes, device),
            score_pool3: score_projection(cfg.pool3_channels, classes, device),
            up2_deep: upsample(classes, 4, 2, 1, device),
            up2_mid: upsample(classes, 4, 2, 1, device),
            up8_out: upsample(classes, 16, 8, 4, device),
        }
    }

    pub fn forward(&self, features: EncoderFeatures<B>) -> Tensor<B, 4> {
        let x = self.score_conv7.forward(features.conv7);
        let x = self.up2_deep.forward(x);
        let x = fuse_skip(x, self.score_pool4.forward(features.pool4));
        let x = self.up2_mid.forward(x);
        let x = fuse_skip(x, self.score_pool3.forward(features.pool3));
        self.up8_out.forward(x)
    }
}

fn score_projection<B: Backend>(
    channels_in: usize,
    num_classes: usize,
    device: &B::Device,
) -> Conv2d<B> {
    Conv2dConfig::new([channels_in, num_classes], [1, 1])
        .with_padding(PaddingConfig2d::Valid)
        .with_initializer(Initializer::XavierUniform { gain: 1.0 })
        .init(device)
}

fn upsample<B: Backend>(
    num_classes: usize,
    kernel: usize,
    stride: usize,
    padding: usize,
    device: &B::Device,
) -> ConvTranspose2d<B> {
    ConvTranspose2dConfig::new([num_classes, num_classes], [kernel, kernel])
        .with_stride([stride, stride])
        .with_padding([padding, padding])
        .with_initializer(Initializer::XavierUniform { gain: 1.0 })
        .init(device)
}

/// Elementwise skip addition. Dims must match exactly; a mismatch means the
/// encoder and decoder disagree about geometry and continuing would train
/// garbage, so it is fatal.
fn fuse_skip<B: Backend>(upsampled: Tensor<B, 4>, lateral: Tensor<B, 4>) -> Tensor<B, 4> {
    let up = upsampled.dims();
    let lat = lateral.dims();
    if up != lat {
        panic!("skip fusion shape mismatch: upsampled {up:?} vs lateral {lat:?}");
    }
    upsampled + lateral
}
