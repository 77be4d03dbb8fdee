use burn::{
    nn::{
        lstm::{Lstm, LstmConfig},
        Dropout, DropoutConfig,
    },
    prelude::*,
};

/// A stack of unidirectional LSTM layers.
#[derive(Config, Debug)]
pub struct LstmStackConfig {
    pub d_input:  usize,
    pub d_hidden: usize,
    #[config(default = 2)]
    pub depth:    usize,
    /// Applied to the input of every layer, training only.
    #[config(default = 0.0)]
    pub dropout:  f64,
}

impl LstmStackConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> LstmStack<B> {
        let layers = (0..self.depth.max(1))
            .map(|layer| {
                let d_input = if layer == 0 { self.d_input } else { self.d_hidden };
                LstmConfig::new(d_input, self.d_hidden, true).init(device)
            })
            .collect();
        LstmStack { layers, dropout: DropoutConfig::new(self.dropout).init() }
    }
}

#[derive(Module, Debug)]
pub struct LstmStack<B: Backend> {
    pub layers:  Vec<Lstm<B>>,
    pub dropout: Dropout,
}

impl<B: Backend> LstmStack<B> {
    /// [batch, seq, d_input] → [batch, seq, d_hidden], hidden state of the top layer at every step.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        self.layers.iter().fold(x, |x, layer| {
            let (states, _) = layer.forward(self.dropout.forward(x), None);
            states
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_output_shape() {
        let device = Default::default();
        let stack: LstmStack<NdArray> = LstmStackConfig::new(5, 7).with_depth(2).init(&device);
        assert_eq!(stack.layers.len(), 2);
        let x = Tensor::<NdArray, 3>::ones([1, 4, 5], &device);
        assert_eq!(stack.forward(x).dims(), [1, 4, 7]);
    }
}
