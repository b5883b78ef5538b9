//! Indexing and decoding of the road dataset layout on disk.
//!
//! Expected layout under the data directory:
//! `data_road/training/image_2/*.png` paired with
//! `data_road/training/gt_image_2/*_road_*.png`, where the ground-truth file
//! name is the image name with a `_road_` infix.

use crate::types::{DatasetConfig, DatasetError, DatasetResult, SamplePair, SegSample};
use image::imageops::FilterType;
use image::RgbImage;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const IMAGE_SUBDIR: &str = "image_2";
const GT_SUBDIR: &str = "gt_image_2";
const GT_INFIX: &str = "_road_";

/// Eagerly verify the on-disk layout before any model is built.
pub fn check_layout(data_dir: &Path) -> DatasetResult<()> {
    let training = data_dir.join("data_road").join("training");
    for sub in [IMAGE_SUBDIR, GT_SUBDIR] {
        let path = training.join(sub);
        if !path.is_dir() {
            return Err(DatasetError::MissingLayout { path });
        }
    }
    Ok(())
}

/// Pair every camera image with its ground-truth mask.
///
/// Every image must have a mask; an unpaired image is a hard error rather
/// than a skip, since training on a partial dataset silently would be worse.
pub fn index_pairs(training_dir: &Path) -> DatasetResult<Vec<SamplePair>> {
    let image_dir = training_dir.join(IMAGE_SUBDIR);
    let gt_dir = training_dir.join(GT_SUBDIR);

    let mut gt_by_name: HashMap<String, std::path::PathBuf> = HashMap::new();
    for entry in fs::read_dir(&gt_dir).map_err(|source| DatasetError::Io {
        path: gt_dir.clone(),
        source,
    })? {
        let entry = entry.map_err(|source| DatasetError::Io {
            path: gt_dir.clone(),
            source,
        })?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.contains(GT_INFIX) {
            gt_by_name.insert(name.replacen(GT_INFIX, "_", 1), path);
        }
    }

    let mut pairs = Vec::new();
    for entry in fs::read_dir(&image_dir).map_err(|source| DatasetError::Io {
        path: image_dir.clone(),
        source,
    })? {
        let entry = entry.map_err(|source| DatasetError::Io {
            path: image_dir.clone(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("png") {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match gt_by_name.get(name) {
            Some(label) => pairs.push(SamplePair {
                image: path.clone(),
                label: label.clone(),
            }),
            None => return Err(DatasetError::MissingLabel { image: path }),
        }
    }

    if pairs.is_empty() {
        return Err(DatasetError::Empty {
            root: training_dir.to_path_buf(),
        });
    }
    pairs.sort_by(|a, b| a.image.cmp(&b.image));
    Ok(pairs)
}

/// Decode one pair, resize to the training shape, and one-hot the labels.
pub fn load_sample(pair: &SamplePair, cfg: &DatasetConfig) -> DatasetResult<SegSample> {
    let (width, height) = cfg.target_size;

    let img = open_rgb(&pair.image)?;
    // Triangle keeps the camera image smooth; nearest keeps the mask crisp.
    let img = image::imageops::resize(&img, width, height, FilterType::Triangle);
    let gt = open_rgb(&pair.label)?;
    let gt = image::imageops::resize(&gt, width, height, FilterType::Nearest);

    let pixels = (width * height) as usize;
    let mut image_chw = Vec::with_capacity(3 * pixels);
    for c in 0..3usize {
        for y in 0..height {
            for x in 0..width {
                image_chw.push(img.get_pixel(x, y)[c] as f32 / 255.0);
            }
        }
    }

    let road_class = cfg.num_classes.saturating_sub(1).min(1);
    let mut label_chw = vec![0.0f32; cfg.num_classes * pixels];
    for y in 0..height {
        for x in 0..width {
            let class = if gt.get_pixel(x, y).0 == cfg.background_color {
                0
            } else {
                road_class
            };
            label_chw[class * pixels + (y * width + x) as usize] = 1.0;
        }
    }

    Ok(SegSample {
        image_chw,
        label_chw,
        width,
        height,
    })
}

fn open_rgb(path: &Path) -> DatasetResult<RgbImage> {
    let img = image::open(path).map_err(|source| DatasetError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgb8())
}
