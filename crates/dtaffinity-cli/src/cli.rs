use super::commands;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict pKd of every drug in a table against the target of a structure file
    Predict(commands::predict::PredictArgs),
    /// Print the sequence of a structure file as FASTA
    Sequence {
        #[arg(short, long)]
        target: PathBuf,
        /// Comma separated chain ids to keep
        #[arg(long, value_delimiter = ',')]
        chains: Vec<String>,
    },
    /// Write the model inputs for SMILES and an optional target to a safetensors file
    Featurize {
        #[arg(short, long, conflicts_with = "drugs", required_unless_present = "drugs")]
        smiles: Option<String>,
        /// Tab separated drug table
        #[arg(short, long)]
        drugs: Option<PathBuf>,
        #[arg(long, default_value = dtaffinity_io::DEFAULT_ID_COLUMN)]
        id_column: String,
        #[arg(long, default_value = dtaffinity_io::DEFAULT_SMILES_COLUMN)]
        smiles_column: String,
        #[arg(short, long)]
        target: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
}

impl Cli {
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Predict(args) => commands::predict::execute(args),
            Commands::Sequence { target, chains } => commands::sequence::execute(target, chains),
            Commands::Featurize {
                smiles,
                drugs,
                id_column,
                smiles_column,
                target,
                output,
            } => commands::featurize::execute(
                commands::featurize::DrugInput::new(smiles, drugs, id_column, smiles_column)?,
                target,
                output,
            ),
        }
    }
}
