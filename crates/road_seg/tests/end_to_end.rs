use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use image::{Rgb, RgbImage};
use models::{Vgg16Backbone, Vgg16Config, VGG_CHECKPOINT};
use road_dataset::DatasetConfig;
use road_seg::{run_grid_point, AppPaths};
use std::fs;
use std::path::Path;
use training::{HyperParams, RunConfig, RunTag, TrainBackend};

fn seed_pretrained_backbone(vgg_dir: &Path, cfg: &Vgg16Config) {
    fs::create_dir_all(vgg_dir).unwrap();
    let device = Default::default();
    let backbone = Vgg16Backbone::<TrainBackend>::new(cfg.clone(), &device);
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    backbone
        .save_file(vgg_dir.join(VGG_CHECKPOINT), &recorder)
        .expect("seed backbone checkpoint");
}

fn seed_dataset(data_dir: &Path) {
    let training = data_dir.join("data_road/training");
    let image_dir = training.join("image_2");
    let gt_dir = training.join("gt_image_2");
    let test_dir = data_dir.join("data_road/testing/image_2");
    fs::create_dir_all(&image_dir).unwrap();
    fs::create_dir_all(&gt_dir).unwrap();
    fs::create_dir_all(&test_dir).unwrap();

    let img = RgbImage::from_fn(64, 32, |x, y| Rgb([(x * 3) as u8, (y * 7) as u8, 80]));
    img.save(image_dir.join("um_000000.png")).unwrap();

    // Left half background (pure red), right half road.
    let gt = RgbImage::from_fn(64, 32, |x, _y| {
        if x < 32 {
            Rgb([255, 0, 0])
        } else {
            Rgb([128, 64, 128])
        }
    });
    gt.save(gt_dir.join("um_road_000000.png")).unwrap();

    RgbImage::from_pixel(64, 32, Rgb([100, 100, 100]))
        .save(test_dir.join("um_000042.png"))
        .unwrap();
}

#[test]
fn grid_point_trains_and_exports_one_tagged_artifact() {
    let temp = tempfile::tempdir().unwrap();
    let data_dir = temp.path().join("data");
    let base_vgg = Vgg16Config::miniature();

    seed_pretrained_backbone(&data_dir.join("vgg"), &base_vgg);
    seed_dataset(&data_dir);

    let paths = AppPaths {
        data_dir,
        runs_dir: temp.path().join("runs"),
        checkpoint_dir: temp.path().join("checkpoints"),
    };
    let run = RunConfig {
        tag: RunTag {
            keep_index: 1,
            lr_index: 1,
            reg_index: 1,
        },
        hyper: HyperParams {
            keep_prob: 0.5,
            learning_rate: 1e-3,
            weight_decay: 1e-3,
            batch_size: 1,
            epochs: 1,
        },
    };
    let dataset_cfg = DatasetConfig {
        target_size: (64, 32),
        shuffle: false,
        ..DatasetConfig::default()
    };

    let out_dir = run_grid_point(&run, &paths, &base_vgg, &dataset_cfg).unwrap();

    let dir_name = out_dir.file_name().unwrap().to_str().unwrap();
    assert!(dir_name.starts_with("klr_111_"));
    let artifacts: Vec<_> = fs::read_dir(&out_dir).unwrap().collect();
    assert_eq!(artifacts.len(), 1);
    assert!(out_dir.join("um_000042.png").is_file());
    assert!(paths.checkpoint_dir.join("klr_111_fcn.bin").is_file());
}

#[test]
fn grid_point_fails_without_the_pretrained_checkpoint() {
    let temp = tempfile::tempdir().unwrap();
    let data_dir = temp.path().join("data");
    seed_dataset(&data_dir);
    fs::create_dir_all(data_dir.join("vgg")).unwrap();

    let paths = AppPaths {
        data_dir,
        runs_dir: temp.path().join("runs"),
        checkpoint_dir: temp.path().join("checkpoints"),
    };
    let run = RunConfig {
        tag: RunTag {
            keep_index: 1,
            lr_index: 1,
            reg_index: 1,
        },
        hyper: HyperParams {
            keep_prob: 0.5,
            learning_rate: 1e-3,
            weight_decay: 1e-3,
            batch_size: 1,
            epochs: 1,
        },
    };
    let dataset_cfg = DatasetConfig {
        target_size: (64, 32),
        shuffle: false,
        ..DatasetConfig::default()
    };

    let err = run_grid_point(&run, &paths, &Vgg16Config::miniature(), &dataset_cfg).unwrap_err();
    assert!(err.to_string().contains("checkpoint missing"));
}
