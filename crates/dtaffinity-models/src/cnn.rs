//! 1-D convolutional target encoder.
use candle_core::{DType, Module, Result, Tensor, D};
use candle_nn::{conv1d, linear, Conv1d, Conv1dConfig, Linear, VarBuilder};
use dtaffinity_core::PROTEIN_ALPHABET;

/// Convolutions over the one-hot sequence, a global max-pool and a linear
/// projection. The convolutions run in f64, matching how the weights were
/// trained; the projection runs in f32.
#[derive(Clone, Debug)]
pub struct ProteinCnn {
    conv: Vec<Conv1d>,
    fc1: Linear,
}

impl ProteinCnn {
    pub fn load(
        vb: VarBuilder,
        filters: &[usize],
        kernels: &[usize],
        hidden: usize,
    ) -> Result<Self> {
        let conv_vb = vb.pp("conv").to_dtype(DType::F64);
        let channels: Vec<usize> = std::iter::once(PROTEIN_ALPHABET.len())
            .chain(filters.iter().copied())
            .collect();
        let conv = channels
            .windows(2)
            .zip(kernels)
            .enumerate()
            .map(|(i, (pair, &kernel))| {
                conv1d(pair[0], pair[1], kernel, Conv1dConfig::default(), conv_vb.pp(i))
            })
            .collect::<Result<Vec<_>>>()?;

        let last = *channels.last().unwrap_or(&PROTEIN_ALPHABET.len());
        let fc1 = linear(last, hidden, vb.pp("fc1"))?;
        Ok(Self { conv, fc1 })
    }
}

impl Module for ProteinCnn {
    /// `[batch, 26, length]` one-hot input to `[batch, hidden]`.
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let mut xs = xs.to_dtype(DType::F64)?;
        for layer in &self.conv {
            xs = layer.forward(&xs)?.relu()?;
        }
        let pooled = xs.max(D::Minus1)?;
        self.fc1.forward(&pooled.to_dtype(DType::F32)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;
    use candle_nn::VarMap;
    use dtaffinity_core::ProteinEncoding;

    #[test]
    fn test_output_shape() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let cnn = ProteinCnn::load(vb.pp("model_protein"), &[8, 12], &[4, 6], 10)?;

        let one_hot = ProteinEncoding::new("MKTAYWGSEC").to_tensor(&Device::Cpu)?;
        let batch = Tensor::stack(&[&one_hot, &one_hot], 0)?;
        let embedding = cnn.forward(&batch)?;
        assert_eq!(embedding.dims(), &[2, 10]);
        assert_eq!(embedding.dtype(), DType::F32);

        // conv weights are stored in double precision
        let names: Vec<String> = varmap.data().lock().unwrap().keys().cloned().collect();
        assert!(names.contains(&"model_protein.conv.1.weight".to_string()));
        assert!(names.contains(&"model_protein.fc1.bias".to_string()));
        let conv = varmap.data().lock().unwrap()["model_protein.conv.0.weight"].clone();
        assert_eq!(conv.dtype(), DType::F64);
        assert_eq!(conv.dims(), &[8, 26, 4]);
        Ok(())
    }
}
