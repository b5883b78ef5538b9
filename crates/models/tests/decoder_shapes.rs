use burn::tensor::Tensor;
use models::{EncoderFeatures, FcnDecoder, FcnDecoderConfig};

type TestBackend = burn_ndarray::NdArray<f32>;

fn synthetic_features(
    device: &<TestBackend as burn::tensor::backend::Backend>::Device,
) -> EncoderFeatures<TestBackend> {
    EncoderFeatures {
        pool3: Tensor::zeros([1, 4, 8, 16], device),
        pool4: Tensor::zeros([1, 8, 4, 8], device),
        conv7: Tensor::zeros([1, 16, 2, 4], device),
    }
}

fn tiny_config(num_classes: usize) -> FcnDecoderConfig {
    FcnDecoderConfig {
        num_classes,
        pool3_channels: 4,
        pool4_channels: 8,
        conv7_channels: 16,
    }
}

#[test]
fn decoder_restores_input_resolution_per_class_count() {
    let device = Default::default();
    for num_classes in [1usize, 2, 5] {
        let decoder = FcnDecoder::<TestBackend>::new(tiny_config(num_classes), &device);
        let scores = decoder.forward(synthetic_features(&device));
        // pool3 sits at 1/8 input resolution, so the output is 8x its size.
        assert_eq!(scores.dims(), [1, num_classes, 64, 128]);
    }
}

#[test]
#[should_panic(expected = "skip fusion shape mismatch")]
fn decoder_rejects_misaligned_skip_inputs() {
    let device = Default::default();
    let decoder = FcnDecoder::<TestBackend>::new(tiny_config(2), &device);
    let features = EncoderFeatures {
        pool3: Tensor::zeros([1, 4, 8, 16], &device),
        // One row too tall to line up with the upsampled deep path.
        pool4: Tensor::zeros([1, 8, 5, 8], &device),
        conv7: Tensor::zeros([1, 16, 2, 4], &device),
    };
    decoder.forward(features);
}
