use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hyperparameters of a saved MPNN/CNN affinity model.
///
/// Read from the `config.pkl` dictionary written next to the weights (or an
/// equivalent `config.json`). Keys not listed here are ignored; missing keys
/// take the defaults of the training framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub drug_encoding: String,
    pub target_encoding: String,
    pub hidden_dim_drug: usize,
    pub hidden_dim_protein: usize,
    pub mpnn_depth: usize,
    pub cnn_target_filters: Vec<usize>,
    pub cnn_target_kernels: Vec<usize>,
    pub cls_hidden_dims: Vec<usize>,
    pub batch_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            drug_encoding: "MPNN".to_string(),
            target_encoding: "CNN".to_string(),
            hidden_dim_drug: 256,
            hidden_dim_protein: 256,
            mpnn_depth: 3,
            cnn_target_filters: vec![32, 64, 96],
            cnn_target_kernels: vec![4, 8, 12],
            cls_hidden_dims: vec![1024, 1024, 512],
            batch_size: 128,
        }
    }
}

impl ModelConfig {
    /// Load from a `.pkl` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_slice(&bytes)?,
            _ => Self::from_pickle_slice(&bytes)?,
        };
        config.validate()?;
        tracing::debug!("Model config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn from_pickle_slice(bytes: &[u8]) -> Result<Self> {
        // class references in the pickle (numpy scalars and the like) are not resolvable here
        let options = serde_pickle::DeOptions::new().replace_unresolved_globals();
        serde_pickle::from_slice(bytes, options).context("parsing pickled model config")
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("parsing JSON model config")
    }

    /// Reject encodings this crate cannot run and inconsistent layer shapes.
    pub fn validate(&self) -> Result<()> {
        if self.drug_encoding != "MPNN" {
            bail!(
                "drug encoding '{}' is not supported; expected MPNN",
                self.drug_encoding
            );
        }
        if self.target_encoding != "CNN" {
            bail!(
                "target encoding '{}' is not supported; expected CNN",
                self.target_encoding
            );
        }
        if self.cnn_target_filters.is_empty()
            || self.cnn_target_filters.len() != self.cnn_target_kernels.len()
        {
            bail!(
                "cnn_target_filters {:?} and cnn_target_kernels {:?} must be non-empty and of equal length",
                self.cnn_target_filters,
                self.cnn_target_kernels
            );
        }
        let shrink: usize = self
            .cnn_target_kernels
            .iter()
            .map(|k| k.saturating_sub(1))
            .sum();
        if self.cnn_target_kernels.contains(&0) || shrink >= dtaffinity_core::MAX_SEQ_PROTEIN {
            bail!(
                "cnn_target_kernels {:?} do not fit a sequence of {}",
                self.cnn_target_kernels,
                dtaffinity_core::MAX_SEQ_PROTEIN
            );
        }
        if self.mpnn_depth == 0 {
            bail!("mpnn_depth must be at least 1");
        }
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_defaults() {
        let config = ModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cls_hidden_dims, vec![1024, 1024, 512]);
    }

    #[test]
    fn test_pickle_with_extra_keys() -> Result<()> {
        // the saved dict carries training settings we do not need
        #[derive(Serialize)]
        struct Saved {
            drug_encoding: &'static str,
            target_encoding: &'static str,
            hidden_dim_drug: i64,
            mpnn_depth: i64,
            cls_hidden_dims: Vec<i64>,
            #[serde(rename = "LR")]
            lr: f64,
            result_folder: &'static str,
            cuda_id: Option<i64>,
        }
        let saved = Saved {
            drug_encoding: "MPNN",
            target_encoding: "CNN",
            hidden_dim_drug: 128,
            mpnn_depth: 4,
            cls_hidden_dims: vec![64, 32],
            lr: 0.001,
            result_folder: "./result/",
            cuda_id: None,
        };
        let bytes = serde_pickle::to_vec(&saved, serde_pickle::SerOptions::new())?;
        let config = ModelConfig::from_pickle_slice(&bytes)?;
        assert_eq!(config.hidden_dim_drug, 128);
        assert_eq!(config.mpnn_depth, 4);
        assert_eq!(config.cls_hidden_dims, vec![64, 32]);
        // untouched keys keep their defaults
        assert_eq!(config.hidden_dim_protein, 256);
        assert_eq!(config.cnn_target_kernels, vec![4, 8, 12]);
        Ok(())
    }

    #[test]
    fn test_json_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");
        let mut values = BTreeMap::new();
        values.insert("batch_size", serde_json::json!(16));
        values.insert("cnn_target_filters", serde_json::json!([8, 8]));
        values.insert("cnn_target_kernels", serde_json::json!([3, 5]));
        std::fs::write(&path, serde_json::to_vec(&values)?)?;

        let config = ModelConfig::from_file(&path)?;
        assert_eq!(config.batch_size, 16);
        assert_eq!(config.cnn_target_filters, vec![8, 8]);
        Ok(())
    }

    #[test]
    fn test_rejects_other_encodings() {
        let config = ModelConfig {
            drug_encoding: "Morgan".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ModelConfig {
            cnn_target_kernels: vec![4, 8],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ModelConfig {
            cnn_target_kernels: vec![600, 500, 2],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
