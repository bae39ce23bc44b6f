use candle_core::{Module, Result, Tensor};
use candle_nn::{linear, Linear, VarBuilder};

/// Feed-forward head over the concatenated drug and target embeddings.
///
/// Layer widths are `[input] ++ hidden ++ [1]` with ReLU between layers.
/// Training used dropout after each hidden layer; it is the identity here.
#[derive(Clone, Debug)]
pub struct Classifier {
    layers: Vec<Linear>,
}

impl Classifier {
    pub fn load(vb: VarBuilder, input: usize, hidden: &[usize]) -> Result<Self> {
        let dims: Vec<usize> = std::iter::once(input)
            .chain(hidden.iter().copied())
            .chain(std::iter::once(1))
            .collect();
        let layers = dims
            .windows(2)
            .enumerate()
            .map(|(i, pair)| linear(pair[0], pair[1], vb.pp(i)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { layers })
    }
}

impl Module for Classifier {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let mut xs = xs.clone();
        let last = self.layers.len().saturating_sub(1);
        for (i, layer) in self.layers.iter().enumerate() {
            xs = layer.forward(&xs)?;
            if i < last {
                xs = xs.relu()?;
            }
        }
        Ok(xs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_layers_and_output() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let classifier = Classifier::load(vb.pp("predictor"), 6, &[5, 4])?;
        assert_eq!(classifier.layers.len(), 3);

        let xs = Tensor::ones((3, 6), DType::F32, &Device::Cpu)?;
        assert_eq!(classifier.forward(&xs)?.dims(), &[3, 1]);
        assert!(varmap
            .data()
            .lock()
            .unwrap()
            .contains_key("predictor.2.weight"));
        Ok(())
    }

    #[test]
    fn test_zero_weights() -> Result<()> {
        let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let classifier = Classifier::load(vb, 4, &[3])?;
        let xs = Tensor::ones((2, 4), DType::F32, &Device::Cpu)?;
        let out: Vec<Vec<f32>> = classifier.forward(&xs)?.to_vec2()?;
        assert_eq!(out, vec![vec![0.0], vec![0.0]]);
        Ok(())
    }
}
