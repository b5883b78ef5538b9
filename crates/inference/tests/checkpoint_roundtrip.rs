use inference::{export_samples, load_checkpoint, save_checkpoint, ExportConfig, InferenceBackend};
use models::{Fcn, FcnDecoder, FcnDecoderConfig, Vgg16Backbone, Vgg16Config};
use std::fs;

type Device = <InferenceBackend as burn::tensor::backend::Backend>::Device;

fn tiny_model(device: &Device) -> (Fcn<InferenceBackend>, Vgg16Config) {
    let cfg = Vgg16Config::miniature();
    let backbone = Vgg16Backbone::new(cfg.clone(), device);
    let decoder = FcnDecoder::new(FcnDecoderConfig::for_backbone(2, &cfg), device);
    (Fcn::new(backbone, decoder), cfg)
}

#[test]
fn checkpoint_save_then_load_restores_topology() {
    let device = Device::default();
    let temp = tempfile::tempdir().unwrap();
    let (model, cfg) = tiny_model(&device);

    let path = temp.path().join("checkpoints/fcn.bin");
    save_checkpoint(&model, &path).unwrap();
    assert!(path.is_file());

    let restored = load_checkpoint::<InferenceBackend, _>(&path, cfg, 2, &device).unwrap();
    let images = burn::tensor::Tensor::zeros([1, 3, 32, 64], &device);
    assert_eq!(restored.forward(images).dims(), [1, 2, 32, 64]);
}

#[test]
fn export_writes_one_overlay_per_test_image() {
    let device = Device::default();
    let temp = tempfile::tempdir().unwrap();
    let (model, _cfg) = tiny_model(&device);

    let images_dir = temp.path().join("image_2");
    fs::create_dir_all(&images_dir).unwrap();
    for name in ["um_000000.png", "um_000001.png"] {
        image::RgbImage::from_pixel(64, 32, image::Rgb([90, 90, 90]))
            .save(images_dir.join(name))
            .unwrap();
    }

    let out_dir = temp.path().join("out");
    let cfg = ExportConfig {
        target_size: (64, 32),
        ..ExportConfig::default()
    };
    let exported = export_samples(&model, &images_dir, &out_dir, &cfg, &device).unwrap();
    assert_eq!(exported, 2);
    assert!(out_dir.join("um_000000.png").is_file());
    assert!(out_dir.join("um_000001.png").is_file());
}

#[test]
fn export_fails_fast_on_an_empty_image_directory() {
    let device = Device::default();
    let temp = tempfile::tempdir().unwrap();
    let (model, _cfg) = tiny_model(&device);
    let images_dir = temp.path().join("image_2");
    fs::create_dir_all(&images_dir).unwrap();

    let result = export_samples(
        &model,
        &images_dir,
        &temp.path().join("out"),
        &ExportConfig::default(),
        &device,
    );
    assert!(result.is_err());
}
