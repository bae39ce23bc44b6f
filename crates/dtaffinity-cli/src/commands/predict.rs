use super::chain_filter;
use anyhow::{bail, Result};
use clap::Args;
use dtaffinity_core::sequence_from_file;
use dtaffinity_io::{write_predictions, AffinityUnit, DrugTable, OutputFormat, OutputOptions};
use dtaffinity_models::{device, AffinityRunner, ModelSource};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// PDB or mmCIF file of the target
    #[arg(short, long, default_value = "database/2shp.pdb")]
    pub target: PathBuf,

    /// Tab separated drug table with an id and a SMILES column
    #[arg(short, long, default_value = "database/ASD_Release_201909_DR.txt")]
    pub drugs: PathBuf,

    /// Directory holding the model config and weights
    #[arg(short, long, default_value = "database/models/model_MPNN_CNN")]
    pub model_dir: PathBuf,

    /// Fetch the model from this HuggingFace repository instead of `--model-dir`
    #[arg(long)]
    pub hf_repo: Option<String>,

    #[arg(long, default_value = "main")]
    pub hf_revision: String,

    /// Output spreadsheet: .xlsx, .csv or .tsv
    #[arg(short, long, default_value = "database/predictions.xlsx")]
    pub output: PathBuf,

    #[arg(long, default_value = dtaffinity_io::DEFAULT_ID_COLUMN)]
    pub id_column: String,

    #[arg(long, default_value = dtaffinity_io::DEFAULT_SMILES_COLUMN)]
    pub smiles_column: String,

    /// Comma separated chain ids to keep
    #[arg(long, value_delimiter = ',')]
    pub chains: Vec<String>,

    /// Drugs per forward pass (defaults to the model config)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Unit of the written column: `p` (pKd) or `nM` (Kd in nanomolar)
    #[arg(long, default_value_t = AffinityUnit::P)]
    pub unit: AffinityUnit,

    /// Sort the written table, strongest binders first
    #[arg(long)]
    pub sort: bool,

    /// Run on the CPU even when a GPU is available
    #[arg(long)]
    pub cpu: bool,
}

impl PredictArgs {
    fn model_source(&self) -> ModelSource {
        match &self.hf_repo {
            Some(repo) => ModelSource::HuggingFace {
                repo: repo.clone(),
                revision: self.hf_revision.clone(),
            },
            None => ModelSource::Local(self.model_dir.clone()),
        }
    }
}

pub fn execute(args: PredictArgs) -> Result<()> {
    if args.batch_size == Some(0) {
        bail!("--batch-size must be at least 1");
    }
    OutputFormat::from_path(&args.output)?;
    let target = sequence_from_file(&args.target, chain_filter(&args.chains))?;
    let table = DrugTable::read(&args.drugs, &args.id_column, &args.smiles_column)?;
    if table.is_empty() {
        bail!("no drugs with a SMILES string in {}", args.drugs.display());
    }

    let runner = AffinityRunner::load(&args.model_source(), device(args.cpu)?)?;
    let predictions = runner.predict(table.smiles(), &target.sequence, args.batch_size)?;

    println!("Predicted affinity (pKd):");
    for (id, p) in table.ids().iter().zip(&predictions) {
        println!("{}: {:.4}", id, p);
    }
    // both counts follow the filtered table; rows without a SMILES are logged by the reader
    println!("Drug records: {}", table.len());
    println!("Encoded records: {}", predictions.len());

    let options = OutputOptions {
        unit: args.unit,
        sort: args.sort,
    };
    write_predictions(&table, &predictions, &options, &args.output)?;
    Ok(())
}
