use crate::classifier::Classifier;
use crate::cnn::ProteinCnn;
use crate::config::ModelConfig;
use crate::mpnn::Mpnn;
use candle_core::{Device, Module, Result, Tensor};
use candle_nn::VarBuilder;
use dtaffinity_core::{MolGraph, ProteinEncoding};

/// Drug-target affinity model: MPNN drug encoder, CNN target encoder and a
/// feed-forward head. Weight names follow the saved state dict:
/// `model_drug.*`, `model_protein.*` and `predictor.*`.
#[derive(Clone, Debug)]
pub struct DtiModel {
    model_drug: Mpnn,
    model_protein: ProteinCnn,
    predictor: Classifier,
    device: Device,
}

impl DtiModel {
    pub fn load(vb: VarBuilder, config: &ModelConfig) -> Result<Self> {
        let device = vb.device().clone();
        let model_drug = Mpnn::load(
            vb.pp("model_drug"),
            config.hidden_dim_drug,
            config.mpnn_depth,
        )?;
        let model_protein = ProteinCnn::load(
            vb.pp("model_protein"),
            &config.cnn_target_filters,
            &config.cnn_target_kernels,
            config.hidden_dim_protein,
        )?;
        let predictor = Classifier::load(
            vb.pp("predictor"),
            config.hidden_dim_drug + config.hidden_dim_protein,
            &config.cls_hidden_dims,
        )?;
        Ok(Self {
            model_drug,
            model_protein,
            predictor,
            device,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Scores for paired inputs: one graph per row of `targets` (`[batch, 26, length]`).
    pub fn forward(&self, drugs: &[MolGraph], targets: &Tensor) -> Result<Tensor> {
        let drug = self.model_drug.forward(drugs, &self.device)?;
        let target = self.model_protein.forward(targets)?;
        let joint = Tensor::cat(&[&drug, &target], 1)?;
        self.predictor.forward(&joint)?.squeeze(1)
    }

    /// Score every drug against one target, `batch_size` drugs at a time.
    ///
    /// The target embedding does not depend on the drug, so it is computed
    /// once and broadcast over each batch.
    pub fn predict(
        &self,
        drugs: &[MolGraph],
        target: &ProteinEncoding,
        batch_size: usize,
    ) -> Result<Vec<f32>> {
        let target = target.to_tensor(&self.device)?.unsqueeze(0)?;
        let target = self.model_protein.forward(&target)?;
        let hidden_protein = target.dim(1)?;

        let mut scores = Vec::with_capacity(drugs.len());
        for (i, batch) in drugs.chunks(batch_size.max(1)).enumerate() {
            let drug = self.model_drug.forward(batch, &self.device)?;
            let target = target
                .broadcast_as((batch.len(), hidden_protein))?
                .contiguous()?;
            let joint = Tensor::cat(&[&drug, &target], 1)?;
            let batch_scores: Vec<f32> = self.predictor.forward(&joint)?.squeeze(1)?.to_vec1()?;
            tracing::debug!("Batch {}: scored {} drugs", i, batch_scores.len());
            scores.extend(batch_scores);
        }
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use candle_nn::VarMap;

    fn small_config() -> ModelConfig {
        ModelConfig {
            hidden_dim_drug: 8,
            hidden_dim_protein: 6,
            mpnn_depth: 2,
            cnn_target_filters: vec![4, 4],
            cnn_target_kernels: vec![3, 5],
            cls_hidden_dims: vec![10, 5],
            batch_size: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_predict_matches_forward() -> Result<()> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let model = DtiModel::load(vb, &small_config())?;

        let drugs: Vec<MolGraph> = ["CCO", "c1ccccc1O", "C1CC", "CC(=O)Nc1ccc(O)cc1"]
            .iter()
            .map(|s| MolGraph::from_smiles(s).unwrap())
            .collect();
        let target = ProteinEncoding::new("MKTAYWGSEC");

        // batch boundaries must not change the scores
        let batched = model.predict(&drugs, &target, 3)?;
        let single = model.predict(&drugs, &target, 1)?;
        assert_eq!(batched.len(), 4);

        let one_hot = target.to_tensor(&device)?;
        let targets = Tensor::stack(&vec![&one_hot; drugs.len()], 0)?;
        let paired: Vec<f32> = model.forward(&drugs, &targets)?.to_vec1()?;

        for ((a, b), c) in batched.iter().zip(&single).zip(&paired) {
            assert!((a - b).abs() < 1e-5);
            assert!((a - c).abs() < 1e-5);
        }
        Ok(())
    }

    #[test]
    fn test_weight_names() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        DtiModel::load(vb, &small_config())?;

        let data = varmap.data().lock().unwrap();
        let mut names: Vec<&str> = data.keys().map(|k| k.as_str()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "model_drug.W_h.weight",
                "model_drug.W_i.weight",
                "model_drug.W_o.bias",
                "model_drug.W_o.weight",
                "model_protein.conv.0.bias",
                "model_protein.conv.0.weight",
                "model_protein.conv.1.bias",
                "model_protein.conv.1.weight",
                "model_protein.fc1.bias",
                "model_protein.fc1.weight",
                "predictor.0.bias",
                "predictor.0.weight",
                "predictor.1.bias",
                "predictor.1.weight",
                "predictor.2.bias",
                "predictor.2.weight",
            ]
        );
        Ok(())
    }
}
