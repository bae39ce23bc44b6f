use anyhow::{anyhow, Result};
use polars::prelude::*;
use std::path::Path;

pub const DEFAULT_ID_COLUMN: &str = "drug_serial";
pub const DEFAULT_SMILES_COLUMN: &str = "tr_smiles";

/// Cells read as missing, in addition to empty fields.
pub const NA_VALUES: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Drug records with a SMILES string, in file order.
#[derive(Debug, Clone)]
pub struct DrugTable {
    frame: DataFrame,
    id_column: String,
    smiles_column: String,
    ids: Vec<String>,
    smiles: Vec<String>,
    source_rows: usize,
}

impl DrugTable {
    /// Read a tab separated table with a header row.
    ///
    /// Column types are inferred from every row, so a column that turns to
    /// text late in the file is read as text. Cells in [`NA_VALUES`] are null.
    pub fn read(path: impl AsRef<Path>, id_column: &str, smiles_column: &str) -> Result<Self> {
        let path = path.as_ref();
        let null_values = NullValues::AllColumns(NA_VALUES.iter().map(|&na| na.into()).collect());
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .map_parse_options(|options| {
                options
                    .with_separator(b'\t')
                    .with_null_values(Some(null_values.clone()))
            })
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()
            .map_err(|e| anyhow!("could not read drug table {}: {e}", path.display()))?;

        tracing::info!(
            "Read {} drug records ({} columns) from {}",
            frame.height(),
            frame.width(),
            path.display()
        );
        Self::from_frame(frame, id_column, smiles_column)
    }

    /// Wrap an already loaded frame, dropping rows whose SMILES is null.
    ///
    /// Blank SMILES are kept; they encode as the empty molecule.
    pub fn from_frame(frame: DataFrame, id_column: &str, smiles_column: &str) -> Result<Self> {
        for name in [id_column, smiles_column] {
            if frame.column(name).is_err() {
                let available: Vec<String> = frame
                    .get_column_names()
                    .into_iter()
                    .map(|c| c.to_string())
                    .collect();
                return Err(anyhow!(
                    "column '{name}' not found; available columns: {}",
                    available.join(", ")
                ));
            }
        }

        let source_rows = frame.height();
        let keep: Vec<bool> = string_column(&frame, smiles_column)?
            .iter()
            .map(Option::is_some)
            .collect();
        let frame = frame.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
        if frame.height() < source_rows {
            tracing::info!(
                "Dropped {} records without a SMILES",
                source_rows - frame.height()
            );
        }

        let ids = string_column(&frame, id_column)?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        let smiles = string_column(&frame, smiles_column)?
            .into_iter()
            .map(|s| s.unwrap_or_default().trim().to_string())
            .collect();

        Ok(Self {
            frame,
            id_column: id_column.to_string(),
            smiles_column: smiles_column.to_string(),
            ids,
            smiles,
            source_rows,
        })
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
    pub fn smiles(&self) -> &[String] {
        &self.smiles
    }
    /// Records kept after dropping missing SMILES.
    pub fn len(&self) -> usize {
        self.frame.height()
    }
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
    /// Records in the file, including those without a SMILES.
    pub fn source_rows(&self) -> usize {
        self.source_rows
    }
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }
    pub fn id_column(&self) -> &str {
        &self.id_column
    }
    pub fn smiles_column(&self) -> &str {
        &self.smiles_column
    }
}

fn string_column(frame: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = frame
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtaffinity_test_data::TestFile;

    #[test]
    fn test_read_drug_table() -> Result<()> {
        let (path, _tmp) = TestFile::drugs_01().create_temp()?;
        let table = DrugTable::read(&path, DEFAULT_ID_COLUMN, DEFAULT_SMILES_COLUMN)?;
        assert_eq!(table.source_rows(), 6);
        assert_eq!(table.len(), 5);
        assert_eq!(
            table.ids(),
            &["DR000001", "DR000002", "DR000004", "DR000005", "DR000006"]
        );
        assert_eq!(table.smiles()[2], "CCO");
        // untouched columns are kept
        assert_eq!(table.frame().width(), 4);
        Ok(())
    }

    #[test]
    fn test_missing_column() -> Result<()> {
        let (path, _tmp) = TestFile::drugs_01().create_temp()?;
        let err = DrugTable::read(&path, DEFAULT_ID_COLUMN, "smiles").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'smiles'"));
        assert!(message.contains("tr_smiles"));
        Ok(())
    }

    #[test]
    fn test_late_text_in_numeric_column() -> Result<()> {
        let mut body = String::from("drug_serial\tmw\ttr_smiles\n");
        for i in 0..150 {
            let mw = if i >= 120 { "n.d.".to_string() } else { (100 + i).to_string() };
            body.push_str(&format!("DR{i:06}\t{mw}\tCCO\n"));
        }
        let file = tempfile::Builder::new().suffix(".txt").tempfile()?;
        std::fs::write(file.path(), body)?;

        let table = DrugTable::read(file.path(), DEFAULT_ID_COLUMN, DEFAULT_SMILES_COLUMN)?;
        assert_eq!(table.len(), 150);
        let mw = table.frame().column("mw")?.as_materialized_series();
        assert_eq!(mw.dtype(), &DataType::String);
        assert_eq!(mw.str()?.get(119), Some("219"));
        assert_eq!(mw.str()?.get(120), Some("n.d."));
        Ok(())
    }

    #[test]
    fn test_na_tokens_dropped_blank_kept() -> Result<()> {
        let body = "drug_serial\ttr_smiles\n\
                    DR1\tCCO\n\
                    DR2\tNA\n\
                    DR3\tNaN\n\
                    DR4\tnull\n\
                    DR5\tN/A\n\
                    DR6\t   \n\
                    DR7\t#N/A\n";
        let file = tempfile::Builder::new().suffix(".txt").tempfile()?;
        std::fs::write(file.path(), body)?;

        let table = DrugTable::read(file.path(), DEFAULT_ID_COLUMN, DEFAULT_SMILES_COLUMN)?;
        assert_eq!(table.source_rows(), 7);
        assert_eq!(table.ids(), &["DR1", "DR6"]);
        assert_eq!(table.smiles(), &["CCO", ""]);
        Ok(())
    }

    #[test]
    fn test_numeric_ids_become_strings() -> Result<()> {
        let frame = df!(
            "id" => [101i64, 102, 103],
            "smiles" => [Some("CCO"), None, Some(" c1ccccc1 ")],
        )?;
        let table = DrugTable::from_frame(frame, "id", "smiles")?;
        assert_eq!(table.ids(), &["101", "103"]);
        assert_eq!(table.smiles(), &["CCO", "c1ccccc1"]);

        let frame = df!("id" => ["a", "b"], "smiles" => [Some("  "), None])?;
        let table = DrugTable::from_frame(frame, "id", "smiles")?;
        assert_eq!(table.ids(), &["a"]);
        Ok(())
    }
}
