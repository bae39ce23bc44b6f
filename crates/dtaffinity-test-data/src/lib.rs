//! dtaffinity-test-data
//!
//! A module to provide test files embedded in the crate for use in testing.
//! Small structure files and drug tables are included in the crate for reference.
//!
//! The test files are represented as `TestFile` objects which package the raw binary data
//! and create temporary files for programs to operate on.
use std::fs;
use tempfile::{Builder, NamedTempFile};

#[derive(Debug)]
/// Test File
///
/// Example usage:
///
/// ```ignore
/// // returns (filepath, _tempfile_handle).
/// // _handle ensures the tempfile remains in scope
/// use dtaffinity_test_data::TestFile;
/// let (prot_file, _temp) = TestFile::target_01().create_temp().unwrap();
/// let (drug_file, _temp) = TestFile::drugs_01().create_temp().unwrap();
///
/// ```
pub struct TestFile {
    filebinary: &'static [u8],
    suffix: &'static str,
}

impl TestFile {
    /// Two chains (MKTAYW / GSEC), a HETATM ligand in chain A and two waters in chain B.
    pub fn target_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/structures/target_01.pdb"),
            suffix: "pdb",
        }
    }
    /// NMR style ensemble: two models of the tripeptide GAV.
    pub fn target_02() -> Self {
        Self {
            filebinary: include_bytes!("../data/structures/target_02.pdb"),
            suffix: "pdb",
        }
    }
    /// Ligand and waters only: no standard residues.
    pub fn target_03() -> Self {
        Self {
            filebinary: include_bytes!("../data/structures/target_03.pdb"),
            suffix: "pdb",
        }
    }
    /// Tab separated drug table in the ASD release layout.
    ///
    /// Six records; `DR000003` has no SMILES and `DR000005` holds an unclosed ring.
    pub fn drugs_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/drugs/drugs_01.txt"),
            suffix: "txt",
        }
    }

    /// PyTorch state dict of a small MPNN/CNN model (hidden sizes 4 and 3).
    /// Conv weights are stored as doubles, `predictor.1.bias` is 6.5.
    pub fn model_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/models/model_01.pt"),
            suffix: "pt",
        }
    }
    /// `model_01` saved from a `DataParallel` wrapper: every key has a `module.` prefix.
    pub fn model_02() -> Self {
        Self {
            filebinary: include_bytes!("../data/models/model_02.pt"),
            suffix: "pt",
        }
    }
    /// Pickled config dictionary matching `model_01`, with unrelated training keys.
    pub fn config_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/models/config_01.pkl"),
            suffix: "pkl",
        }
    }

    pub fn create_temp(&self) -> std::io::Result<(String, NamedTempFile)> {
        let temp = Builder::new()
            .suffix(&format!(".{}", self.suffix))
            .tempfile()?;

        fs::write(&temp, self.filebinary)?;
        let path = temp.path().to_string_lossy().into_owned();

        Ok((path, temp))
    }
}
