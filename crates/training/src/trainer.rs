//! The training loop: drain batches, step the optimizer, fail fast.

use burn::optim::decay::WeightDecayConfig;
use burn::optim::{GradientsParams, Optimizer, SgdConfig};
use burn::tensor::backend::AutodiffBackend;
use models::Fcn;
use road_dataset::BatchSource;

use crate::config::HyperParams;
use crate::loss::{cross_entropy, flatten_scores};

/// What the loop actually did, so callers can observe it without parsing
/// stdout.
#[derive(Debug, Default)]
pub struct TrainReport {
    pub steps: usize,
    pub losses: Vec<f32>,
}

/// Run gradient descent over `source` for the configured epoch count.
///
/// Every batch is one forward/backward/step; the scalar loss is printed per
/// step. Any failure aborts the run: batch-source errors and non-finite
/// losses bubble up, and a skip-fusion shape mismatch inside the model is
/// fatal before the step executes. Loss is never used to drive control flow.
pub fn train<B: AutodiffBackend>(
    model: Fcn<B>,
    source: &mut dyn BatchSource<B>,
    hyper: &HyperParams,
    device: &B::Device,
) -> anyhow::Result<(Fcn<B>, TrainReport)> {
    hyper.validate()?;

    let mut model = model;
    let mut optim = SgdConfig::new()
        .with_weight_decay(Some(WeightDecayConfig::new(hyper.weight_decay as f32)))
        .init();
    let mut report = TrainReport::default();

    for epoch in 0..hyper.epochs {
        println!(
            "epoch {}/{}: keep_prob={:.2} lr={:e} weight_decay={:e}",
            epoch + 1,
            hyper.epochs,
            hyper.keep_prob,
            hyper.learning_rate,
            hyper.weight_decay
        );
        source.reset();

        let mut epoch_losses = Vec::new();
        while let Some(batch) = source.next_batch(hyper.batch_size, device)? {
            let scores = model.forward(batch.images);
            let [_, classes, _, _] = scores.dims();
            let logits = flatten_scores(scores, classes);
            let labels = flatten_scores(batch.labels, classes);
            let loss = cross_entropy(logits, labels);

            let loss_val = loss
                .clone()
                .detach()
                .into_data()
                .to_vec::<f32>()
                .map_err(|e| anyhow::anyhow!("failed to read loss value: {e:?}"))?
                .first()
                .copied()
                .unwrap_or(f32::NAN);
            if !loss_val.is_finite() {
                anyhow::bail!("loss diverged at step {}: {loss_val}", report.steps);
            }

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(hyper.learning_rate, model, grads);

            println!("loss: {loss_val:.4}");
            report.steps += 1;
            report.losses.push(loss_val);
            epoch_losses.push(loss_val);
        }

        let avg: f32 = if epoch_losses.is_empty() {
            0.0
        } else {
            epoch_losses.iter().sum::<f32>() / epoch_losses.len() as f32
        };
        println!("epoch {}/{}: avg loss {avg:.4}", epoch + 1, hyper.epochs);
    }

    Ok((model, report))
}
