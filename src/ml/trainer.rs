// ============================================================
// Layer 5 — Training Loop
// ============================================================
// One example per optimizer step, no batching:
//
//   for epoch:
//     shuffle
//     for example (1-based idx within the epoch):
//       UNK-replace tokens → forward (dropout on) → loss?
//       loss present  → backward + optimizer step
//       idx % report_every == 0 → log running loss, reset
//       idx % dev_every    == 0 → dev pass on model.valid()
//                                 improved F1 → best F1, dev
//                                 predictions, parameters
//
// Unambiguous LUs (one candidate frame) produce no loss and so
// no update. The dev pass runs on the inner backend where dropout
// is inactive, so dev scores never depend on the dropout RNG.

use std::path::PathBuf;

use anyhow::Result;
use burn::{
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use rand::{rngs::StdRng, SeedableRng};

use crate::data::conll_writer::write_predicted_conll;
use crate::data::dataset::{unk_replace, FrameIdDataset};
use crate::data::dictionaries::Dictionaries;
use crate::data::vocab::UNK_ID;
use crate::domain::example::{Example, FrameId};
use crate::domain::traits::FrameIdentifier;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{DevMetrics, MetricsLogger};
use crate::ml::inferencer::Inferencer;
use crate::ml::model::FrameIdModel;
use crate::ml::query::{FrameQuery, QueryBuilder};

#[derive(Debug, Clone)]
pub struct TrainSettings {
    pub epochs:        usize,
    pub unk_prob:      f64,
    pub report_every:  usize,
    pub dev_every:     usize,
    pub learning_rate: f64,
    pub seed:          u64,
    /// Best dev F1 so far; 0 for a fresh model, the saved value on refresh.
    pub best_f1:       f64,
}

/// Everything the loop reads or writes besides the model and the data.
pub struct TrainContext<'a> {
    pub queries:    QueryBuilder<'a>,
    pub dicts:      &'a Dictionaries,
    pub ckpt:       &'a CheckpointManager,
    pub metrics:    Option<&'a MetricsLogger>,
    pub dev_output: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainOutcome {
    pub best_f1:     f64,
    /// How many times the parameters were written.
    pub checkpoints: usize,
    pub steps:       usize,
}

/// Forward one example with its gold frame; step the optimizer if it yields a loss.
pub fn train_step<B, O>(
    model: FrameIdModel<B>,
    optim: &mut O,
    query: &FrameQuery,
    gold:  FrameId,
    lr:    f64,
) -> (FrameIdModel<B>, Option<f64>)
where
    B: AutodiffBackend,
    O: Optimizer<FrameIdModel<B>, B>,
{
    let Some(loss) = model.identify(query, Some(gold)).loss else {
        return (model, None);
    };
    let value: f64 = loss.clone().into_scalar().elem::<f64>();

    let grads = loss.backward();
    let grads = GradientsParams::from_grads(grads, &model);
    (optim.step(lr, model, grads), Some(value))
}

pub fn run_training<B, O>(
    mut model: FrameIdModel<B>,
    mut optim: O,
    mut train: FrameIdDataset,
    dev:       &[Example],
    settings:  &TrainSettings,
    ctx:       &TrainContext<'_>,
) -> Result<(FrameIdModel<B>, TrainOutcome)>
where
    B: AutodiffBackend,
    O: Optimizer<FrameIdModel<B>, B>,
{
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut outcome = TrainOutcome { best_f1: settings.best_f1, checkpoints: 0, steps: 0 };
    tracing::info!("Best dev F1 so far = {:.4}", outcome.best_f1);

    // running loss for the progress line
    let (mut report_loss, mut report_seen) = (0.0f64, 0usize);
    // running loss between dev passes, for metrics.csv
    let (mut window_loss, mut window_seen) = (0.0f64, 0usize);

    for epoch in 0..settings.epochs {
        train.shuffle(&mut rng);

        for (idx, example) in (1..).zip(train.examples()) {
            if idx % settings.report_every == 0 && report_seen > 0 {
                tracing::info!("{} loss = {:.6}", idx, report_loss / report_seen as f64);
                report_loss = 0.0;
                report_seen = 0;
            }

            let tokens = unk_replace(&example.tokens, settings.unk_prob, UNK_ID, &mut rng);
            let query = ctx.queries.build_with_tokens(example, tokens);
            let (next, loss) = train_step(model, &mut optim, &query, example.frame, settings.learning_rate);
            model = next;

            let loss = loss.unwrap_or(0.0);
            report_loss += loss;
            report_seen += 1;
            window_loss += loss;
            window_seen += 1;
            outcome.steps += 1;

            if idx % settings.dev_every == 0 {
                let train_loss = window_loss / window_seen as f64;
                window_loss = 0.0;
                window_seen = 0;
                evaluate_dev(&model, dev, epoch, train_loss, ctx, &mut outcome)?;
            }
        }
    }

    tracing::info!(
        "Training complete: {} steps, best dev F1 = {:.4}",
        outcome.steps,
        outcome.best_f1
    );
    Ok((model, outcome))
}

fn evaluate_dev<B: AutodiffBackend>(
    model:      &FrameIdModel<B>,
    dev:        &[Example],
    epoch:      usize,
    train_loss: f64,
    ctx:        &TrainContext<'_>,
    outcome:    &mut TrainOutcome,
) -> Result<()> {
    // model.valid() → FrameIdModel<B::InnerBackend>, dropout disabled
    let inferencer = Inferencer::new(model.valid(), ctx.queries);
    let evaluation = inferencer.evaluate(dev);
    let counts = evaluation.corpus;
    let scores = counts.scores();

    tracing::info!(
        "[dev epoch={}] p = {:.4} ({:.1}/{:.1}) r = {:.4} ({:.1}/{:.1}) f1 = {:.4}",
        epoch,
        scores.precision,
        counts.true_pos as f64,
        counts.predicted() as f64,
        scores.recall,
        counts.true_pos as f64,
        counts.gold() as f64,
        scores.f1,
    );

    let metrics = DevMetrics::new(outcome.steps, epoch, train_loss, scores);
    if let Some(logger) = ctx.metrics {
        logger.log(&metrics)?;
    }

    if metrics.is_improvement(outcome.best_f1) {
        outcome.best_f1 = metrics.f1;
        ctx.ckpt.save_best_f1(metrics.f1)?;
        write_predicted_conll(&ctx.dev_output, dev, &evaluation.predictions, ctx.dicts)?;
        ctx.ckpt.save_model(inferencer.model())?;
        outcome.checkpoints += 1;
        tracing::info!(" -- saving to {}", ctx.ckpt.model_file().display());
    }
    Ok(())
}
