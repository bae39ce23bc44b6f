//! # dtaffinity-io
//!
//! Tabular input and output for affinity prediction.
//!
//! * [`DrugTable`]: a tab separated drug list read with polars. Rows without a
//!   SMILES are dropped; every other column is carried through to the output.
//! * [`write_predictions`]: the drug table plus a prediction column, written as
//!   `.xlsx`, `.csv` or `.tsv` depending on the output path.
mod drugs;
mod results;

pub use drugs::{DrugTable, DEFAULT_ID_COLUMN, DEFAULT_SMILES_COLUMN, NA_VALUES};
pub use results::{
    predictions_frame, write_predictions, AffinityUnit, OutputFormat, OutputOptions,
};
