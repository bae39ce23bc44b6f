use anyhow::{anyhow, bail, Result};
use candle_core::{Device, Tensor};
use dtaffinity_core::{sequence_from_file, MolGraph, ProteinEncoding};
use dtaffinity_io::DrugTable;
use std::collections::HashMap;
use std::path::PathBuf;

pub enum DrugInput {
    Smiles(String),
    Table {
        path: PathBuf,
        id_column: String,
        smiles_column: String,
    },
}

impl DrugInput {
    pub fn new(
        smiles: Option<String>,
        drugs: Option<PathBuf>,
        id_column: String,
        smiles_column: String,
    ) -> Result<Self> {
        match (smiles, drugs) {
            (Some(smiles), None) => Ok(DrugInput::Smiles(smiles)),
            (None, Some(path)) => Ok(DrugInput::Table {
                path,
                id_column,
                smiles_column,
            }),
            _ => bail!("give either --smiles or --drugs"),
        }
    }

    /// `(id, smiles)` pairs. A lone SMILES is named `drug`.
    fn records(&self) -> Result<Vec<(String, String)>> {
        match self {
            DrugInput::Smiles(smiles) => Ok(vec![("drug".to_string(), smiles.clone())]),
            DrugInput::Table {
                path,
                id_column,
                smiles_column,
            } => {
                let table = DrugTable::read(path, id_column, smiles_column)?;
                Ok(table
                    .ids()
                    .iter()
                    .cloned()
                    .zip(table.smiles().iter().cloned())
                    .collect())
            }
        }
    }
}

/// Tensors are keyed `<id>.fatoms`, `<id>.fbonds`, `<id>.agraph`,
/// `<id>.bgraph` and `target` for the one-hot sequence.
pub fn execute(drugs: DrugInput, target: Option<PathBuf>, output: PathBuf) -> Result<()> {
    let device = Device::Cpu;
    let mut tensors: HashMap<String, Tensor> = HashMap::new();

    for (id, smiles) in drugs.records()? {
        let graph = MolGraph::from_smiles(&smiles).map_err(|e| anyhow!("{id}: {e}"))?;
        if graph.is_empty() {
            tracing::warn!("Skipping {}: no graph for {}", id, smiles);
            continue;
        }
        let (fatoms, fbonds, agraph, bgraph) = graph.to_tensors(&device)?;
        tracing::debug!(
            "{}: {} atoms, {} directed bonds",
            id,
            graph.n_atoms(),
            graph.n_bonds()
        );
        tensors.insert(format!("{id}.fatoms"), fatoms);
        tensors.insert(format!("{id}.fbonds"), fbonds);
        tensors.insert(format!("{id}.agraph"), agraph);
        tensors.insert(format!("{id}.bgraph"), bgraph);
    }

    if let Some(path) = target {
        let sequence = sequence_from_file(&path, None)?;
        let encoding = ProteinEncoding::new(&sequence.sequence);
        if encoding.unknown() > 0 {
            tracing::warn!("{} residues outside the alphabet", encoding.unknown());
        }
        tensors.insert("target".to_string(), encoding.to_tensor(&device)?);
    }

    if tensors.is_empty() {
        bail!("nothing to write: no drug could be encoded and no target was given");
    }
    candle_core::safetensors::save(&tensors, &output)?;
    tracing::info!("Wrote {} tensors to {}", tensors.len(), output.display());
    Ok(())
}
