#![recursion_limit = "256"]

//! Driver: wire the backbone, decoder, dataset, trainer, and exporter
//! together for every point of the hyperparameter grid, strictly in
//! sequence.

pub mod cli;

use burn::backend::Autodiff;
use burn::module::AutodiffModule;
use burn::tensor::backend::Backend;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::cli::AppArgs;
use inference::{export_samples, save_checkpoint, ExportConfig};
use models::{Fcn, FcnDecoder, FcnDecoderConfig, Vgg16Backbone, Vgg16Config, VGG_CHECKPOINT};
use road_dataset::{check_layout, BatchIter, DatasetConfig};
use training::{sweep_grid, train, validate_backend_choice, RunConfig, TrainBackend};

type ADBackend = Autodiff<TrainBackend>;

/// Filesystem roots for one invocation.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub runs_dir: PathBuf,
    pub checkpoint_dir: PathBuf,
}

impl AppPaths {
    pub fn vgg_dir(&self) -> PathBuf {
        self.data_dir.join("vgg")
    }

    pub fn training_dir(&self) -> PathBuf {
        self.data_dir.join("data_road").join("training")
    }

    pub fn test_images_dir(&self) -> PathBuf {
        self.data_dir.join("data_road").join("testing").join("image_2")
    }
}

pub fn run_app(args: AppArgs) -> anyhow::Result<()> {
    validate_backend_choice(args.backend)?;
    if !cfg!(feature = "backend-wgpu") {
        eprintln!("warning: no GPU backend compiled in; training on the CPU backend will be slow");
    }

    let paths = AppPaths {
        data_dir: PathBuf::from(&args.data_dir),
        runs_dir: PathBuf::from(&args.runs_dir),
        checkpoint_dir: PathBuf::from(&args.checkpoint_dir),
    };

    // Fail before any model is built if the data layout is incomplete.
    check_layout(&paths.data_dir)?;
    let vgg_artifact = paths.vgg_dir().join(VGG_CHECKPOINT);
    anyhow::ensure!(
        vgg_artifact.is_file(),
        "pretrained vgg checkpoint missing at {}",
        vgg_artifact.display()
    );

    let dataset_cfg = DatasetConfig {
        target_size: (args.image_width, args.image_height),
        num_classes: args.num_classes,
        ..DatasetConfig::default()
    };
    let base_vgg = Vgg16Config::default();

    let runs = sweep_grid(args.batch_size, args.epochs);
    println!("sweeping {} hyperparameter combinations", runs.len());
    for run in &runs {
        let out_dir = run_grid_point(run, &paths, &base_vgg, &dataset_cfg)?;
        println!("run {} complete: overlays at {}", run.tag, out_dir.display());
    }
    Ok(())
}

/// Build, train, and export one grid point. Everything constructed here,
/// model included, is dropped before the next point starts.
pub fn run_grid_point(
    run: &RunConfig,
    paths: &AppPaths,
    base_vgg: &Vgg16Config,
    dataset_cfg: &DatasetConfig,
) -> anyhow::Result<PathBuf> {
    println!(
        "run {}: keep_prob={:.2} lr={:e} weight_decay={:e}",
        run.tag, run.hyper.keep_prob, run.hyper.learning_rate, run.hyper.weight_decay
    );
    let device = <ADBackend as Backend>::Device::default();

    let vgg_cfg = base_vgg.clone().with_keep_prob(run.hyper.keep_prob);
    let backbone =
        Vgg16Backbone::<ADBackend>::from_pretrained(paths.vgg_dir(), vgg_cfg.clone(), &device)?;
    let decoder = FcnDecoder::new(
        FcnDecoderConfig::for_backbone(dataset_cfg.num_classes, &vgg_cfg),
        &device,
    );
    let model = Fcn::new(backbone, decoder);

    let mut batches = BatchIter::from_root(&paths.training_dir(), dataset_cfg.clone())?;
    let (model, report) = train(model, &mut batches, &run.hyper, &device)?;
    println!("run {}: finished {} gradient steps", run.tag, report.steps);

    let trained = model.valid();
    let out_dir = paths.runs_dir.join(format!("{}{}", run.tag, run_stamp()));
    let export_cfg = ExportConfig {
        target_size: dataset_cfg.target_size,
        road_class: dataset_cfg.num_classes.saturating_sub(1).min(1),
        ..ExportConfig::default()
    };
    let exported = export_samples(
        &trained,
        &paths.test_images_dir(),
        &out_dir,
        &export_cfg,
        &device,
    )?;
    println!(
        "run {}: exported {} overlays to {}",
        run.tag,
        exported,
        out_dir.display()
    );

    let ckpt = paths
        .checkpoint_dir
        .join(format!("{}fcn.bin", run.tag));
    save_checkpoint(&trained, &ckpt)?;
    println!("run {}: saved checkpoint to {}", run.tag, ckpt.display());

    Ok(out_dir)
}

fn run_stamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
