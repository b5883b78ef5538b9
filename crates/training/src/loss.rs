//! Per-pixel softmax cross-entropy over flattened score maps.

use burn::tensor::activation::log_softmax;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Flatten `[batch, classes, h, w]` scores into `[batch * h * w, classes]`
/// per-pixel logits. Labels flatten the same way, so row order lines up.
pub fn flatten_scores<B: Backend>(scores: Tensor<B, 4>, num_classes: usize) -> Tensor<B, 2> {
    let [batch, classes, height, width] = scores.dims();
    assert_eq!(
        classes, num_classes,
        "score tensor has {classes} channels, expected {num_classes}"
    );
    scores
        .permute([0, 2, 3, 1])
        .reshape([batch * height * width, num_classes])
}

/// Mean softmax cross-entropy between per-pixel logits and one-hot (or soft)
/// target distributions of the same shape.
pub fn cross_entropy<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 2>) -> Tensor<B, 1> {
    let logit_dims = logits.dims();
    let label_dims = labels.dims();
    assert_eq!(
        logit_dims, label_dims,
        "logits {logit_dims:?} and labels {label_dims:?} must match"
    );
    let log_probs = log_softmax(logits, 1);
    (labels * log_probs).sum_dim(1).neg().mean()
}
