//! Affinity Runner
//!
//! Locating, loading and running a pretrained MPNN/CNN model.
use crate::config::ModelConfig;
use crate::model::DtiModel;
use anyhow::{anyhow, Context, Result};
use candle_core::pickle::PthTensors;
use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use dtaffinity_core::{MolGraph, ProteinEncoding};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::path::{Path, PathBuf};

const CONFIG_FILES: [&str; 2] = ["config.pkl", "config.json"];
const WEIGHT_FILES: [&str; 2] = ["model.pt", "model.safetensors"];

pub fn device(cpu: bool) -> Result<Device> {
    if cpu {
        Ok(Device::Cpu)
    } else if cuda_is_available() {
        Ok(Device::new_cuda(0)?)
    } else if metal_is_available() {
        Ok(Device::new_metal(0)?)
    } else {
        #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
        {
            tracing::info!("Running on CPU, to run on GPU(metal), build with `--features metal`");
        }
        #[cfg(not(all(target_os = "macos", target_arch = "aarch64")))]
        {
            tracing::info!("Running on CPU, to run on GPU, build with `--features cuda`");
        }
        Ok(Device::Cpu)
    }
}

/// Where the config and weights of a model live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// A directory holding `config.pkl` or `config.json` and `model.pt` or
    /// `model.safetensors`.
    Local(PathBuf),
    /// The same files in a HuggingFace model repository.
    HuggingFace { repo: String, revision: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub weights: PathBuf,
}

impl ModelSource {
    pub fn resolve(&self) -> Result<ModelFiles> {
        match self {
            ModelSource::Local(dir) => {
                let find = |names: &[&str]| {
                    first_available(names, &dir.display().to_string(), |name| {
                        let path = dir.join(name);
                        if path.is_file() {
                            Ok(path)
                        } else {
                            Err(anyhow!("{} is not a file", path.display()))
                        }
                    })
                };
                Ok(ModelFiles {
                    config: find(&CONFIG_FILES)?,
                    weights: find(&WEIGHT_FILES)?,
                })
            }
            ModelSource::HuggingFace { repo, revision } => {
                let api = Api::new()?;
                let api = api.repo(Repo::with_revision(
                    repo.to_string(),
                    RepoType::Model,
                    revision.to_string(),
                ));
                let location = format!("{repo}@{revision}");
                let fetch =
                    |names: &[&str]| first_available(names, &location, |name| api.get(name));
                Ok(ModelFiles {
                    config: fetch(&CONFIG_FILES)?,
                    weights: fetch(&WEIGHT_FILES)?,
                })
            }
        }
    }
}

/// The first of `names` that `fetch` can provide. When none can, the error
/// of the last attempt is kept as the cause.
fn first_available<T, E, F>(names: &[&str], location: &str, mut fetch: F) -> Result<T>
where
    E: Into<anyhow::Error>,
    F: FnMut(&str) -> std::result::Result<T, E>,
{
    let mut last_error = None;
    for &name in names {
        match fetch(name) {
            Ok(found) => return Ok(found),
            Err(err) => {
                let err: anyhow::Error = err.into();
                tracing::debug!("{} not available from {}: {}", name, location, err);
                last_error = Some(err);
            }
        }
    }
    let message = format!("none of {:?} found in {}", names, location);
    Err(match last_error {
        Some(err) => err.context(message),
        None => anyhow!(message),
    })
}

/// A VarBuilder over a PyTorch state dict or a safetensors file.
///
/// State dicts saved from a `DataParallel` wrapper carry a `module.` prefix
/// on every key; it is stripped here.
pub fn weights_var_builder(path: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let is_safetensors = path.extension().and_then(|e| e.to_str()) == Some("safetensors");
    if is_safetensors {
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device)? };
        return Ok(vb);
    }
    let pth = PthTensors::new(path, None)
        .with_context(|| format!("reading state dict {}", path.display()))?;
    let wrapped = pth.tensor_infos().keys().all(|k| k.starts_with("module."));
    for (name, info) in pth.tensor_infos() {
        tracing::trace!("{}: {:?}", name, info.layout.shape());
    }
    let vb = VarBuilder::from_backend(Box::new(pth), DType::F32, device.clone());
    Ok(if wrapped { vb.pp("module") } else { vb })
}

pub struct AffinityRunner {
    model: DtiModel,
    config: ModelConfig,
}

impl AffinityRunner {
    pub fn load(source: &ModelSource, device: Device) -> Result<Self> {
        let files = source.resolve()?;
        tracing::info!(
            "Loading model config {} and weights {}",
            files.config.display(),
            files.weights.display()
        );
        let config = ModelConfig::from_file(&files.config)?;
        let vb = weights_var_builder(&files.weights, &device)?;
        let model = DtiModel::load(vb, &config)
            .with_context(|| format!("loading weights from {}", files.weights.display()))?;
        Ok(Self { model, config })
    }

    pub fn from_parts(model: DtiModel, config: ModelConfig) -> Self {
        Self { model, config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
    pub fn device(&self) -> &Device {
        self.model.device()
    }

    /// Encode every SMILES (unreadable ones as zero vectors).
    pub fn encode_drugs(&self, smiles: &[String]) -> Result<Vec<MolGraph>> {
        smiles
            .iter()
            .map(|s| MolGraph::from_smiles(s).map_err(|e| anyhow!("{s}: {e}")))
            .collect()
    }

    /// pKd of every drug against `target_sequence`.
    ///
    /// `batch_size` overrides the batch size of the model config.
    pub fn predict(
        &self,
        smiles: &[String],
        target_sequence: &str,
        batch_size: Option<usize>,
    ) -> Result<Vec<f32>> {
        let graphs = self.encode_drugs(smiles)?;
        let empty = graphs.iter().filter(|g| g.is_empty()).count();
        if empty > 0 {
            tracing::warn!("{} of {} drugs encoded as zero vectors", empty, graphs.len());
        }
        let target = ProteinEncoding::new(target_sequence);
        let batch_size = batch_size.unwrap_or(self.config.batch_size);
        tracing::info!(
            "Scoring {} drugs in batches of {} on {:?}",
            graphs.len(),
            batch_size,
            self.device()
        );
        Ok(self.model.predict(&graphs, &target, batch_size)?)
    }
}
