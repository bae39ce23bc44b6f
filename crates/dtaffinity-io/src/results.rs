use crate::DrugTable;
use anyhow::{anyhow, bail, Result};
use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook};
use std::fs::File;
use std::path::Path;
use strum::{Display, EnumString};

/// Unit of the written affinity column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
pub enum AffinityUnit {
    /// -log10(Kd) in molar, as predicted.
    #[default]
    #[strum(serialize = "p")]
    P,
    /// Kd in nanomolar, `10^(9 - p)`.
    #[strum(serialize = "nM")]
    NanoMolar,
}

impl AffinityUnit {
    pub fn column_name(&self) -> &'static str {
        match self {
            AffinityUnit::P => "pKd",
            AffinityUnit::NanoMolar => "Kd_nM",
        }
    }
    pub fn convert(&self, p: f32) -> f64 {
        match self {
            AffinityUnit::P => p as f64,
            AffinityUnit::NanoMolar => 10f64.powf(9.0 - p as f64),
        }
    }
    /// Whether larger values mean tighter binding.
    fn higher_is_better(&self) -> bool {
        matches!(self, AffinityUnit::P)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
    Tsv,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("xlsx") => Ok(OutputFormat::Xlsx),
            Some("csv") => Ok(OutputFormat::Csv),
            Some("tsv") | Some("txt") => Ok(OutputFormat::Tsv),
            _ => bail!(
                "unsupported output format for {}; use .xlsx, .csv or .tsv",
                path.display()
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub unit: AffinityUnit,
    /// Strongest predicted binders first.
    pub sort: bool,
}

/// The drug table with one prediction column appended, in the chosen unit.
pub fn predictions_frame(
    table: &DrugTable,
    predictions: &[f32],
    options: &OutputOptions,
) -> Result<DataFrame> {
    if predictions.len() != table.len() {
        bail!(
            "{} predictions for {} drug records",
            predictions.len(),
            table.len()
        );
    }
    let name = options.unit.column_name();
    let values: Vec<f64> = predictions.iter().map(|&p| options.unit.convert(p)).collect();

    let mut frame = table.frame().clone();
    frame.with_column(Series::new(name.into(), values))?;
    if options.sort {
        let descending = options.unit.higher_is_better();
        frame = frame.sort(
            [name],
            SortMultipleOptions::default()
                .with_order_descending(descending)
                .with_maintain_order(true),
        )?;
    }
    Ok(frame)
}

/// Write the table and its predictions to `path`. The format follows the extension.
pub fn write_predictions(
    table: &DrugTable,
    predictions: &[f32],
    options: &OutputOptions,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let format = OutputFormat::from_path(path)?;
    let mut frame = predictions_frame(table, predictions, options)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    match format {
        OutputFormat::Xlsx => write_xlsx(&frame, path)?,
        OutputFormat::Csv => write_delimited(&mut frame, path, b',')?,
        OutputFormat::Tsv => write_delimited(&mut frame, path, b'\t')?,
    }
    tracing::info!("Wrote {} predictions to {}", frame.height(), path.display());
    Ok(())
}

fn write_delimited(frame: &mut DataFrame, path: &Path, separator: u8) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(separator)
        .finish(frame)?;
    Ok(())
}

/// One worksheet, bold header row, no index column.
fn write_xlsx(frame: &DataFrame, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header = Format::new().set_bold();

    for (col_idx, column) in frame.get_columns().iter().enumerate() {
        let col = u16::try_from(col_idx).map_err(|_| anyhow!("too many columns for xlsx"))?;
        worksheet.write_string_with_format(0, col, column.name().as_str(), &header)?;

        let series = column.as_materialized_series();
        if is_numeric(series.dtype()) {
            let values = series.cast(&DataType::Float64)?;
            for (row_idx, value) in values.f64()?.into_iter().enumerate() {
                if let Some(value) = value {
                    worksheet.write_number(row_idx as u32 + 1, col, value)?;
                }
            }
        } else {
            let values = series.cast(&DataType::String)?;
            for (row_idx, value) in values.str()?.into_iter().enumerate() {
                if let Some(value) = value {
                    worksheet.write_string(row_idx as u32 + 1, col, value)?;
                }
            }
        }
    }
    workbook.save(path)?;
    Ok(())
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DrugTable {
        let frame = df!(
            "drug_serial" => ["DR1", "DR2", "DR3"],
            "tr_smiles" => ["CCO", "c1ccccc1", "CC(=O)O"],
        )
        .unwrap();
        DrugTable::from_frame(frame, "drug_serial", "tr_smiles").unwrap()
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(AffinityUnit::P.convert(7.5), 7.5);
        assert!((AffinityUnit::NanoMolar.convert(9.0) - 1.0).abs() < 1e-9);
        assert!((AffinityUnit::NanoMolar.convert(6.0) - 1000.0).abs() < 1e-6);
        assert_eq!("nM".parse::<AffinityUnit>().unwrap(), AffinityUnit::NanoMolar);
        assert_eq!("p".parse::<AffinityUnit>().unwrap(), AffinityUnit::P);
    }

    #[test]
    fn test_output_format() {
        assert_eq!(OutputFormat::from_path(Path::new("a/b.xlsx")).unwrap(), OutputFormat::Xlsx);
        assert_eq!(OutputFormat::from_path(Path::new("b.CSV")).unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("b.tsv")).unwrap(), OutputFormat::Tsv);
        assert!(OutputFormat::from_path(Path::new("b.parquet")).is_err());
        assert!(OutputFormat::from_path(Path::new("b")).is_err());
    }

    #[test]
    fn test_predictions_frame() -> Result<()> {
        let frame = predictions_frame(&table(), &[5.0, 7.0, 6.0], &OutputOptions::default())?;
        assert_eq!(frame.width(), 3);
        let names: Vec<String> = frame
            .get_column_names()
            .into_iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(names, ["drug_serial", "tr_smiles", "pKd"]);
        Ok(())
    }

    #[test]
    fn test_sorted_predictions() -> Result<()> {
        let options = OutputOptions {
            unit: AffinityUnit::P,
            sort: true,
        };
        let frame = predictions_frame(&table(), &[5.0, 7.0, 6.0], &options)?;
        let ids: Vec<Option<&str>> = frame
            .column("drug_serial")?
            .as_materialized_series()
            .str()?
            .into_iter()
            .collect();
        assert_eq!(ids, [Some("DR2"), Some("DR3"), Some("DR1")]);

        // in nM the tightest binder has the smallest value
        let options = OutputOptions {
            unit: AffinityUnit::NanoMolar,
            sort: true,
        };
        let frame = predictions_frame(&table(), &[5.0, 7.0, 6.0], &options)?;
        let ids: Vec<Option<&str>> = frame
            .column("drug_serial")?
            .as_materialized_series()
            .str()?
            .into_iter()
            .collect();
        assert_eq!(ids, [Some("DR2"), Some("DR3"), Some("DR1")]);
        Ok(())
    }

    #[test]
    fn test_length_mismatch() {
        assert!(predictions_frame(&table(), &[5.0], &OutputOptions::default()).is_err());
    }
}
