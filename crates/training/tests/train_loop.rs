use burn::backend::Autodiff;
use burn::tensor::Tensor;
use models::{Fcn, FcnDecoder, FcnDecoderConfig, Vgg16Backbone, Vgg16Config};
use road_dataset::{BatchSource, DatasetResult, SegBatch};
use training::{train, HyperParams, TrainBackend};

type ADBackend = Autodiff<TrainBackend>;
type Device = <ADBackend as burn::tensor::backend::Backend>::Device;

/// Synthetic generator: a fixed number of all-background batches per epoch.
struct StubBatches {
    remaining: usize,
    per_epoch: usize,
    height: usize,
    width: usize,
}

impl StubBatches {
    fn new(per_epoch: usize, height: usize, width: usize) -> Self {
        Self {
            remaining: per_epoch,
            per_epoch,
            height,
            width,
        }
    }
}

impl BatchSource<ADBackend> for StubBatches {
    fn next_batch(
        &mut self,
        _batch_size: usize,
        device: &Device,
    ) -> DatasetResult<Option<SegBatch<ADBackend>>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        let (h, w) = (self.height, self.width);
        let images = Tensor::ones([2, 3, h, w], device).mul_scalar(0.5);
        let background = Tensor::ones([2, 1, h, w], device);
        let road = Tensor::zeros([2, 1, h, w], device);
        let labels = Tensor::cat(vec![background, road], 1);
        Ok(Some(SegBatch { images, labels }))
    }

    fn reset(&mut self) {
        self.remaining = self.per_epoch;
    }
}

fn tiny_model(device: &Device) -> Fcn<ADBackend> {
    let cfg = Vgg16Config::miniature();
    let backbone = Vgg16Backbone::new(cfg.clone(), device);
    let decoder = FcnDecoder::new(FcnDecoderConfig::for_backbone(2, &cfg), device);
    Fcn::new(backbone, decoder)
}

#[test]
fn one_epoch_performs_one_update_per_batch() {
    let device = Device::default();
    let model = tiny_model(&device);
    let mut source = StubBatches::new(3, 160, 576);
    let hyper = HyperParams {
        keep_prob: 0.5,
        learning_rate: 1e-3,
        weight_decay: 1e-3,
        batch_size: 2,
        epochs: 1,
    };

    let (_model, report) = train(model, &mut source, &hyper, &device).unwrap();
    assert_eq!(report.steps, 3);
    assert_eq!(report.losses.len(), 3);
    assert!(report.losses.iter().all(|l| l.is_finite()));
}

#[test]
fn epochs_rewind_the_batch_source() {
    let device = Device::default();
    let model = tiny_model(&device);
    let mut source = StubBatches::new(2, 32, 64);
    let hyper = HyperParams {
        keep_prob: 0.8,
        learning_rate: 1e-3,
        weight_decay: 0.0,
        batch_size: 2,
        epochs: 2,
    };

    let (_model, report) = train(model, &mut source, &hyper, &device).unwrap();
    assert_eq!(report.steps, 4);
}

#[test]
fn invalid_hyperparameters_abort_before_any_step() {
    let device = Device::default();
    let model = tiny_model(&device);
    let mut source = StubBatches::new(1, 32, 64);
    let hyper = HyperParams {
        keep_prob: 1.5,
        learning_rate: 1e-3,
        weight_decay: 0.0,
        batch_size: 2,
        epochs: 1,
    };

    assert!(train(model, &mut source, &hyper, &device).is_err());
    // The source was never touched.
    assert_eq!(source.remaining, 1);
}
