#![recursion_limit = "256"]

//! Burn ML models for road-scene semantic segmentation.
//!
//! This crate defines the network architecture used for per-pixel road
//! classification:
//! - `Vgg16Backbone`: VGG16 convolutional trunk with fully-convolutional
//!   fc6/fc7 layers, restorable from a pretrained checkpoint.
//! - `FcnDecoder`: FCN-8s decoder fusing backbone features back up to
//!   input resolution.
//! - `Fcn`: backbone + decoder composition producing per-pixel class scores.
//!
//! These are pure Burn Modules with no awareness of datasets or training.
//! The `training` crate drives them; the `inference` crate wraps them for
//! overlay export.

pub mod decoder;
pub mod vgg;

pub use decoder::{FcnDecoder, FcnDecoderConfig};
pub use vgg::{EncoderFeatures, Vgg16Backbone, Vgg16Config, VggLoadError, VGG_CHECKPOINT};

use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Full segmentation network: VGG16 encoder feeding the FCN-8s decoder.
#[derive(Debug, Module)]
pub struct Fcn<B: Backend> {
    backbone: Vgg16Backbone<B>,
    decoder: FcnDecoder<B>,
}

impl<B: Backend> Fcn<B> {
    pub fn new(backbone: Vgg16Backbone<B>, decoder: FcnDecoder<B>) -> Self {
        Self { backbone, decoder }
    }

    /// Per-pixel class scores with the spatial shape of `images`.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        self.decoder.forward(self.backbone.forward(images))
    }
}

pub mod prelude {
    pub use super::{
        EncoderFeatures, Fcn, FcnDecoder, FcnDecoderConfig, Vgg16Backbone, Vgg16Config,
    };
}
