//! Save and restore trained segmentation checkpoints.

use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings, RecorderError};
use burn::tensor::backend::Backend;
use models::{Fcn, FcnDecoder, FcnDecoderConfig, Vgg16Backbone, Vgg16Config};
use std::fs;
use std::path::Path;

pub fn save_checkpoint<B: Backend, P: AsRef<Path>>(model: &Fcn<B>, path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    model
        .clone()
        .save_file(path, &recorder)
        .map_err(|e| anyhow::anyhow!("failed to save checkpoint: {e}"))?;
    Ok(())
}

/// Rebuild a fresh network with the given topology and load the recorded
/// weights into it.
pub fn load_checkpoint<B: Backend, P: AsRef<Path>>(
    path: P,
    backbone_cfg: Vgg16Config,
    num_classes: usize,
    device: &B::Device,
) -> Result<Fcn<B>, RecorderError> {
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    let decoder_cfg = FcnDecoderConfig::for_backbone(num_classes, &backbone_cfg);
    Fcn::new(
        Vgg16Backbone::new(backbone_cfg, device),
        FcnDecoder::new(decoder_cfg, device),
    )
    .load_file(path.as_ref(), &recorder, device)
}
