// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates train and refresh runs:
//
//   Step 1: Prepare workspace            (Layer 4 - data)
//   Step 2: Build model, load vectors    (Layer 5 - ml)
//   Step 3: Fresh config or restore      (Layer 6 - infra)
//   Step 4: Pick the optimizer
//   Step 5: Run training loop            (Layer 5 - ml)
//
// Refresh starts from the saved parameters and the saved best
// dev F1, so a checkpoint is only replaced by a strictly better
// model.

use anyhow::{Context, Result};
use burn::{
    grad_clipping::GradientClippingConfig,
    optim::{AdamConfig, Optimizer, SgdConfig},
    prelude::*,
};

use crate::application::{setup::Workspace, Mode, OptimizerKind, RunConfig, UNK_PROB};
use crate::data::dataset::FrameIdDataset;
use crate::infra::metrics::MetricsLogger;
use crate::ml::{
    model::FrameIdModel,
    trainer::{run_training, TrainContext, TrainOutcome, TrainSettings},
    TrainBackend,
};

const CLIP_NORM: f32 = 5.0;

pub struct TrainUseCase {
    config: RunConfig,
}

impl TrainUseCase {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainOutcome> {
        let cfg = &self.config;

        // ── Step 1: vocabularies, corpora, lexicon, vectors ───────────────────
        let ws = Workspace::prepare(cfg)?;
        let model_cfg = ws.model_config(cfg);

        // ── Step 2: model ─────────────────────────────────────────────────────
        let device = <TrainBackend as Backend>::Device::default();
        let mut model: FrameIdModel<TrainBackend> = model_cfg.init(&device);
        if let Some(vectors) = &ws.pretrained {
            model = model.with_pretrained_vectors(vectors, &device)?;
        }

        // ── Step 3: fresh start or refresh ────────────────────────────────────
        let best_f1 = match cfg.mode {
            Mode::Refresh => {
                tracing::info!("Reusing model from {} ...", ws.ckpt.model_file().display());
                ws.ckpt.load_config()?.check_compatible(&model_cfg)?;
                model = ws.ckpt.load_model(model, &device)?;
                ws.ckpt
                    .load_best_f1()
                    .context("refresh needs the best dev F1 of the previous run")?
            }
            _ => {
                ws.ckpt.save_config(&model_cfg)?;
                0.0
            }
        };

        let settings = TrainSettings {
            epochs:        cfg.num_epochs(),
            unk_prob:      UNK_PROB,
            report_every:  cfg.report_every,
            dev_every:     cfg.dev_every,
            learning_rate: cfg.learning_rate(),
            seed:          cfg.seed,
            best_f1,
        };
        let metrics = MetricsLogger::new(ws.ckpt.dir())?;
        let ctx = TrainContext {
            queries:    ws.queries(cfg),
            dicts:      &ws.dicts,
            ckpt:       &ws.ckpt,
            metrics:    Some(&metrics),
            dev_output: cfg.output_conll(),
        };
        let train = FrameIdDataset::new(ws.train.clone());
        tracing::info!(
            "Training on {} examples for {} epochs ({:?}, lr={})",
            train.len(),
            settings.epochs,
            cfg.optimizer,
            settings.learning_rate,
        );

        // ── Step 4 + 5: optimizer and training loop ───────────────────────────
        let clipping = Some(GradientClippingConfig::Norm(CLIP_NORM));
        let outcome = match cfg.optimizer {
            OptimizerKind::Sgd => {
                let optim = SgdConfig::new().with_gradient_clipping(clipping)
                    .init::<TrainBackend, FrameIdModel<TrainBackend>>();
                train_with(model, optim, train, &ws, &settings, &ctx)?
            }
            OptimizerKind::Adam => {
                let optim = AdamConfig::new().with_grad_clipping(clipping)
                    .init::<TrainBackend, FrameIdModel<TrainBackend>>();
                train_with(model, optim, train, &ws, &settings, &ctx)?
            }
        };
        Ok(outcome)
    }
}

fn train_with<O>(
    model:    FrameIdModel<TrainBackend>,
    optim:    O,
    train:    FrameIdDataset,
    ws:       &Workspace,
    settings: &TrainSettings,
    ctx:      &TrainContext<'_>,
) -> Result<TrainOutcome>
where
    O: Optimizer<FrameIdModel<TrainBackend>, TrainBackend>,
{
    let (_, outcome) = run_training(model, optim, train, &ws.eval, settings, ctx)?;
    Ok(outcome)
}
