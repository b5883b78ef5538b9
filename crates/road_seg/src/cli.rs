use clap::Parser;
use training::BackendKind;

#[derive(Parser, Debug)]
#[command(
    name = "road_seg",
    about = "Train the VGG16 FCN-8s road segmenter over the hyperparameter grid"
)]
pub struct AppArgs {
    /// Data directory containing vgg/ and data_road/.
    #[arg(long, default_value = "data")]
    pub data_dir: String,
    /// Export destination for inference overlays.
    #[arg(long, default_value = "runs")]
    pub runs_dir: String,
    /// Checkpoint output directory.
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
    /// Backend to use (ndarray or wgpu if enabled).
    #[arg(long, value_enum, default_value_t = BackendKind::NdArray)]
    pub backend: BackendKind,
    /// Number of epochs per grid point.
    #[arg(long, default_value_t = 3)]
    pub epochs: usize,
    /// Batch size.
    #[arg(long, default_value_t = 2)]
    pub batch_size: usize,
    /// Number of segmentation classes.
    #[arg(long, default_value_t = 2)]
    pub num_classes: usize,
    /// Training image width.
    #[arg(long, default_value_t = 576)]
    pub image_width: u32,
    /// Training image height.
    #[arg(long, default_value_t = 160)]
    pub image_height: u32,
}
