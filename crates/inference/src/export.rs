//! Sweep test images through a trained model and save road overlays.

use burn::tensor::activation::softmax;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use image::imageops::FilterType;
use image::Rgba;
use models::Fcn;
use std::fs;
use std::path::{Path, PathBuf};
use vision_core::{blend_mask, rgb_to_rgba};

#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Resize test images to this (width, height) before inference.
    pub target_size: (u32, u32),
    /// Class channel treated as road.
    pub road_class: usize,
    /// Softmax probability above which a pixel counts as road.
    pub threshold: f32,
    /// Overlay tint; the alpha channel drives the blend weight.
    pub color: [u8; 4],
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            target_size: (576, 160),
            road_class: 1,
            threshold: 0.5,
            color: [0, 255, 0, 127],
        }
    }
}

/// Run every image under `images_dir` through the model and write one
/// annotated overlay per image into `out_dir`. Returns the export count.
pub fn export_samples<B: Backend>(
    model: &Fcn<B>,
    images_dir: &Path,
    out_dir: &Path,
    cfg: &ExportConfig,
    device: &B::Device,
) -> anyhow::Result<usize> {
    let mut files: Vec<PathBuf> = fs::read_dir(images_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("png"))
        .collect();
    if files.is_empty() {
        anyhow::bail!("no test images under {}", images_dir.display());
    }
    files.sort();
    fs::create_dir_all(out_dir)?;

    let (width, height) = cfg.target_size;
    let mut exported = 0usize;
    for path in files {
        let rgb = image::open(&path)?.to_rgb8();
        let rgb = image::imageops::resize(&rgb, width, height, FilterType::Triangle);

        let mut buf = Vec::with_capacity((3 * width * height) as usize);
        for c in 0..3usize {
            for y in 0..height {
                for x in 0..width {
                    buf.push(rgb.get_pixel(x, y)[c] as f32 / 255.0);
                }
            }
        }
        let images = Tensor::<B, 1>::from_floats(buf.as_slice(), device).reshape([
            1,
            3,
            height as usize,
            width as usize,
        ]);

        let scores = model.forward(images);
        let [_, classes, h, w] = scores.dims();
        anyhow::ensure!(
            cfg.road_class < classes,
            "road class {} out of range for {} output channels",
            cfg.road_class,
            classes
        );
        let probs = softmax(scores, 1);
        let road = probs
            .slice([0..1, cfg.road_class..cfg.road_class + 1, 0..h, 0..w])
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("failed to read road probabilities: {e:?}"))?;
        let mask: Vec<bool> = road.iter().map(|p| *p > cfg.threshold).collect();

        let mut overlay = rgb_to_rgba(&rgb);
        blend_mask(&mut overlay, &mask, Rgba(cfg.color));

        if let Some(name) = path.file_name() {
            overlay.save(out_dir.join(name))?;
            exported += 1;
        }
    }

    Ok(exported)
}
