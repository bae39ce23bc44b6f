//! # dtaffinity-models
//!
//! Candle implementation of a pretrained drug-target affinity model:
//!
//! * [`Mpnn`]: directed bond message passing over [`dtaffinity_core::MolGraph`]s
//! * [`ProteinCnn`]: convolutions over the one-hot target sequence
//! * [`Classifier`]: the feed-forward head producing pKd
//!
//! [`AffinityRunner`] finds the config and weights (local directory or the
//! HuggingFace hub), loads [`DtiModel`] and scores SMILES against a target.
mod classifier;
mod cnn;
mod config;
mod model;
mod mpnn;
mod runner;

pub use classifier::Classifier;
pub use cnn::ProteinCnn;
pub use config::ModelConfig;
pub use model::DtiModel;
pub use mpnn::Mpnn;
pub use runner::{device, weights_var_builder, AffinityRunner, ModelFiles, ModelSource};
