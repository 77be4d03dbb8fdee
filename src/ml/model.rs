use anyhow::{ensure, Result};
use burn::{
    module::Param,
    nn::{Dropout, DropoutConfig, Embedding, EmbeddingConfig, Linear, LinearConfig},
    prelude::*,
    tensor::{activation, TensorData},
};

use crate::data::pretrained::PretrainedVectors;
use crate::data::vocab::UNK_ID;
use crate::domain::example::FrameId;
use crate::ml::encoder::{LstmStack, LstmStackConfig};
use crate::ml::query::FrameQuery;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize,
// adding them again gives conflicting impls.
#[derive(Config, Debug)]
pub struct FrameIdConfig {
    pub vocab_size:     usize,
    pub pos_size:       usize,
    pub lu_size:        usize,
    pub lu_pos_size:    usize,
    pub num_frames:     usize,
    /// Width of the frozen pretrained table; `None` disables it.
    pub pretrained_dim: Option<usize>,
    #[config(default = 60)]
    pub token_dim:      usize,
    #[config(default = 4)]
    pub pos_dim:        usize,
    #[config(default = 64)]
    pub lu_dim:         usize,
    #[config(default = 5)]
    pub lu_pos_dim:     usize,
    #[config(default = 64)]
    pub lstm_input_dim: usize,
    #[config(default = 64)]
    pub lstm_dim:       usize,
    #[config(default = 2)]
    pub lstm_depth:     usize,
    #[config(default = 64)]
    pub hidden_dim:     usize,
    #[config(default = 0.01)]
    pub dropout:        f64,
}

impl FrameIdConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> FrameIdModel<B> {
        let sentence_encoder = || {
            LstmStackConfig::new(self.lstm_input_dim, self.lstm_dim)
                .with_depth(self.lstm_depth)
                .with_dropout(self.dropout)
                .init(device)
        };
        let pretrained = self.pretrained_dim.map(|dim| PretrainedProjection {
            table:      EmbeddingConfig::new(self.vocab_size, dim).init(device),
            projection: LinearConfig::new(dim, self.lstm_input_dim).init(device),
        });

        FrameIdModel {
            token_embedding:  EmbeddingConfig::new(self.vocab_size, self.token_dim).init(device),
            pos_embedding:    EmbeddingConfig::new(self.pos_size, self.pos_dim).init(device),
            lu_embedding:     EmbeddingConfig::new(self.lu_size, self.lu_dim).init(device),
            lu_pos_embedding: EmbeddingConfig::new(self.lu_pos_size, self.lu_pos_dim).init(device),
            pretrained,
            input_projection: LinearConfig::new(self.token_dim + self.pos_dim, self.lstm_input_dim)
                .init(device),
            forward_encoder:  sentence_encoder(),
            backward_encoder: sentence_encoder(),
            target_encoder:   LstmStackConfig::new(2 * self.lstm_dim, self.lstm_dim)
                .with_depth(self.lstm_depth)
                .init(device),
            hidden: LinearConfig::new(self.lstm_dim + self.lu_dim + self.lu_pos_dim, self.hidden_dim)
                .init(device),
            output:  LinearConfig::new(self.hidden_dim, self.num_frames).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }

    /// A checkpoint can only be loaded into a model sized from the same vocabularies.
    pub fn check_compatible(&self, other: &Self) -> Result<()> {
        let sizes = |c: &Self| {
            (c.vocab_size, c.pos_size, c.lu_size, c.lu_pos_size, c.num_frames, c.pretrained_dim)
        };
        ensure!(
            sizes(self) == sizes(other),
            "checkpoint was built for vocabulary sizes {:?} but the data gives {:?}",
            sizes(self),
            sizes(other),
        );
        Ok(())
    }
}

/// Frozen pretrained vectors followed by a trainable projection.
#[derive(Module, Debug)]
pub struct PretrainedProjection<B: Backend> {
    pub table:      Embedding<B>,
    pub projection: Linear<B>,
}

impl<B: Backend> PretrainedProjection<B> {
    pub fn forward(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        // detach: the table never receives gradients
        self.projection.forward(self.table.forward(tokens).detach())
    }
}

#[derive(Module, Debug)]
pub struct FrameIdModel<B: Backend> {
    pub token_embedding:  Embedding<B>,
    pub pos_embedding:    Embedding<B>,
    pub lu_embedding:     Embedding<B>,
    pub lu_pos_embedding: Embedding<B>,
    pub pretrained:       Option<PretrainedProjection<B>>,
    pub input_projection: Linear<B>,
    pub forward_encoder:  LstmStack<B>,
    pub backward_encoder: LstmStack<B>,
    pub target_encoder:   LstmStack<B>,
    pub hidden:           Linear<B>,
    pub output:           Linear<B>,
    pub dropout:          Dropout,
}

/// Log-probabilities over exactly the candidate frames, in candidate order.
pub struct RestrictedLogProbs<B: Backend> {
    pub candidates: Vec<FrameId>,
    pub log_probs:  Tensor<B, 1>,
}

impl<B: Backend> RestrictedLogProbs<B> {
    pub fn values(&self) -> Vec<f32> {
        self.log_probs.clone().into_data().iter::<f32>().collect()
    }

    /// `None` for a frame outside the candidate set.
    #[cfg(test)]
    pub fn log_prob(&self, frame: FrameId) -> Option<f32> {
        let slot = self.candidates.iter().position(|&f| f == frame)?;
        self.values().get(slot).copied()
    }

    /// Highest-scoring candidate; ties go to the earliest candidate.
    pub fn argmax(&self) -> FrameId {
        let mut best: Option<(usize, f32)> = None;
        for (slot, value) in self.values().into_iter().enumerate() {
            if best.map_or(true, |(_, b)| value > b) {
                best = Some((slot, value));
            }
        }
        best.map_or(UNK_ID, |(slot, _)| self.candidates[slot])
    }

    /// −log p(gold); `None` when gold is not a candidate.
    pub fn nll(&self, gold: FrameId) -> Option<Tensor<B, 1>> {
        let slot = self.candidates.iter().position(|&f| f == gold)?;
        Some(self.log_probs.clone().slice([slot..slot + 1]).neg())
    }
}

pub struct FrameDecision<B: Backend> {
    pub frame: FrameId,
    pub loss:  Option<Tensor<B, 1>>,
}

impl<B: Backend> FrameIdModel<B> {
    /// Copy pretrained vectors into the frozen table.
    pub fn with_pretrained_vectors(mut self, vectors: &PretrainedVectors, device: &B::Device) -> Result<Self> {
        if let Some(pretrained) = self.pretrained.as_mut() {
            let [vocab, dim] = pretrained.table.weight.val().dims();
            ensure!(
                dim == vectors.dim(),
                "pretrained table has width {} but vectors have {}",
                dim,
                vectors.dim()
            );
            let table = Tensor::<B, 2>::from_data(TensorData::new(vectors.to_table(vocab), [vocab, dim]), device);
            pretrained.table.weight = Param::from_tensor(table);
        }
        Ok(self)
    }

    fn device(&self) -> B::Device {
        self.output.weight.val().device()
    }

    /// relu(W_i [tok ⊕ pos] + b_i  +  mask · (W_e pre + b_e)) → [1, n, lstm_input]
    fn embed_sentence(&self, query: &FrameQuery, device: &B::Device) -> Tensor<B, 3> {
        let n = query.tokens.len();
        let tokens  = ids::<B>(&query.tokens, device).reshape([1, n]);
        let postags = ids::<B>(&query.postags, device).reshape([1, n]);

        let words = Tensor::cat(
            vec![self.token_embedding.forward(tokens.clone()), self.pos_embedding.forward(postags)],
            2,
        );
        let mut x = self.input_projection.forward(words);

        if let Some(pretrained) = &self.pretrained {
            let [_, _, width] = x.dims();
            let mask: Vec<f32> = query
                .pretrained_mask
                .iter()
                .map(|&has| if has { 1.0 } else { 0.0 })
                .collect();
            let mask = Tensor::<B, 1>::from_data(TensorData::new(mask, [n]), device)
                .reshape([1, n, 1])
                .expand([1, n, width]);
            x = x + pretrained.forward(tokens) * mask;
        }
        activation::relu(x)
    }

    /// Pooled target vector [1, lstm_dim]: last state of the target LSTM run over
    /// [forward_i ⊕ backward_i] for each target position i.
    pub fn encode_target(&self, query: &FrameQuery) -> Tensor<B, 2> {
        let device = self.device();
        let x = self.embed_sentence(query, &device);

        let forward = self.forward_encoder.forward(x.clone());
        // run right-to-left, then flip back so index i is absolute position i
        let backward = self.backward_encoder.forward(x.flip([1])).flip([1]);

        let targets = ids::<B>(&query.targets, &device);
        let steps = Tensor::cat(vec![forward.select(1, targets.clone()), backward.select(1, targets)], 2);

        let pooled = self.target_encoder.forward(steps);
        let [_, t, h] = pooled.dims();
        pooled.slice([0..1, t - 1..t, 0..h]).reshape([1, h])
    }

    /// Restricted log-softmax over the query's candidate frames.
    pub fn score(&self, query: &FrameQuery) -> RestrictedLogProbs<B> {
        let device = self.device();
        let target = self.encode_target(query);

        let lu = match &query.siblings {
            Some(siblings) if !siblings.is_empty() => lookup_sum(&self.lu_embedding, siblings, &device),
            _ => lookup_sum(&self.lu_embedding, &[query.lu.id], &device),
        };
        let lu_pos = lookup_sum(&self.lu_pos_embedding, &[query.lu.pos_id], &device);

        let features = Tensor::cat(vec![target, lu, lu_pos], 1);
        let hidden = activation::relu(self.hidden.forward(features));
        let scores = self.dropout.forward(self.output.forward(hidden));
        let [_, frames] = scores.dims();

        let restricted = scores
            .reshape([frames])
            .select(0, ids::<B>(&query.candidates, &device));
        RestrictedLogProbs {
            candidates: query.candidates.clone(),
            log_probs:  activation::log_softmax(restricted, 0),
        }
    }

    /// With `gold`: training decision carrying the loss (if the LU is ambiguous).
    /// Without: argmax prediction.
    pub fn identify(&self, query: &FrameQuery, gold: Option<FrameId>) -> FrameDecision<B> {
        match query.candidates.as_slice() {
            [] => return FrameDecision { frame: UNK_ID, loss: None },
            [only] => return FrameDecision { frame: *only, loss: None },
            _ => {}
        }

        let distribution = self.score(query);
        match gold {
            Some(gold) => {
                let loss = distribution.nll(gold);
                if loss.is_none() {
                    tracing::warn!("gold frame {} is not a candidate of LU {}", gold, query.lu.id);
                }
                FrameDecision { frame: gold, loss }
            }
            None => FrameDecision { frame: distribution.argmax(), loss: None },
        }
    }
}

fn ids<B: Backend>(values: &[usize], device: &B::Device) -> Tensor<B, 1, Int> {
    let data: Vec<i64> = values.iter().map(|&v| v as i64).collect();
    Tensor::from_data(TensorData::new(data, [values.len()]), device)
}

/// Sum of the embedding rows for `keys` → [1, dim].
fn lookup_sum<B: Backend>(table: &Embedding<B>, keys: &[usize], device: &B::Device) -> Tensor<B, 2> {
    let rows = table.forward(ids::<B>(keys, device).reshape([1, keys.len()]));
    let [_, _, dim] = rows.dims();
    rows.sum_dim(1).reshape([1, dim])
}
