//! Target sequences from structure files.
//!
//! The PDB API requires us to iterate Model --> Chain --> Residue. Every
//! model is visited, so an NMR ensemble contributes its sequence once per
//! model. Residues read from `HETATM` records (ligands, waters, modified
//! residues) are skipped.
use crate::info::constants::aa3to1;
use itertools::Itertools;
use pdbtbx::PDB;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("structure path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    #[error("could not read structure {path}: {messages}")]
    Read { path: String, messages: String },
}

/// Amino-acid sequence of a target together with where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetSequence {
    pub id: String,
    pub sequence: String,
    /// Chain ids in the order they were visited. Repeats across models.
    pub chains: Vec<String>,
}

impl TargetSequence {
    pub fn len(&self) -> usize {
        self.sequence.len()
    }
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
    pub fn to_fasta(&self) -> String {
        let body = self
            .sequence
            .as_bytes()
            .chunks(60)
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .join("\n");
        format!(">{}\n{}\n", self.id, body)
    }
}

/// Open a PDB or mmCIF file and extract the sequence of its standard residues.
///
/// `chains` restricts the extraction to the given chain ids. `None` keeps all.
pub fn sequence_from_file(
    path: impl AsRef<Path>,
    chains: Option<&[String]>,
) -> Result<TargetSequence, StructureError> {
    let path = path.as_ref();
    let path_str = path
        .to_str()
        .ok_or_else(|| StructureError::NonUtf8Path(path.to_string_lossy().into_owned()))?;

    let (pdb, warnings) = pdbtbx::open(path_str).map_err(|errors| StructureError::Read {
        path: path_str.to_string(),
        messages: errors.iter().map(|e| e.to_string()).join("; "),
    })?;
    for warning in &warnings {
        tracing::debug!("{}: {}", path_str, warning);
    }

    let id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let target = sequence_from_pdb(&pdb, &id, chains);
    tracing::info!(
        "Read {} residues from {} ({} chains)",
        target.len(),
        path_str,
        target.chains.len()
    );
    Ok(target)
}

/// Extract the one-letter sequence of all standard residues in `pdb`.
pub fn sequence_from_pdb(pdb: &PDB, id: &str, chains: Option<&[String]>) -> TargetSequence {
    let mut sequence = String::new();
    let mut visited = Vec::new();

    for model in pdb.models() {
        for chain in model.chains() {
            if let Some(keep) = chains {
                if !keep.iter().any(|c| c == chain.id()) {
                    continue;
                }
            }
            visited.push(chain.id().to_string());
            for residue in chain.residues() {
                // a residue takes its record type from its first atom
                let is_standard = residue
                    .atoms()
                    .next()
                    .map(|atom| !atom.hetero())
                    .unwrap_or(false);
                if !is_standard {
                    continue;
                }
                sequence.push(aa3to1(residue.name().unwrap_or_default()));
            }
        }
    }

    if sequence.is_empty() {
        tracing::warn!("No standard residues found in structure {}", id);
    }

    TargetSequence {
        id: id.to_string(),
        sequence,
        chains: visited,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtaffinity_test_data::TestFile;

    #[test]
    fn test_sequence_from_pdb() {
        let (pdb_file, _tmp) = TestFile::target_01().create_temp().unwrap();
        let target = sequence_from_file(&pdb_file, None).unwrap();
        // two chains, the HETATM ligand and waters are dropped
        assert_eq!(target.sequence, "MKTAYWGSEC");
        assert_eq!(target.chains, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_chain_selection() {
        let (pdb_file, _tmp) = TestFile::target_01().create_temp().unwrap();
        let target = sequence_from_file(&pdb_file, Some(&["B".to_string()])).unwrap();
        assert_eq!(target.sequence, "GSEC");
    }

    #[test]
    fn test_models_are_concatenated() {
        let (pdb_file, _tmp) = TestFile::target_02().create_temp().unwrap();
        let target = sequence_from_file(&pdb_file, None).unwrap();
        assert_eq!(target.sequence, "GAVGAV");
        assert_eq!(target.chains.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let result = sequence_from_file("does/not/exist.pdb", None);
        assert!(matches!(result, Err(StructureError::Read { .. })));
    }

    #[test]
    fn test_fasta() {
        let target = TargetSequence {
            id: "2shp".to_string(),
            sequence: "A".repeat(70),
            chains: vec!["A".to_string()],
        };
        let fasta = target.to_fasta();
        let lines: Vec<&str> = fasta.lines().collect();
        assert_eq!(lines[0], ">2shp");
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2].len(), 10);
    }
}
