//! Small molecule graphs from SMILES.
//!
//! Parsing follows the OpenSMILES grammar. Parsed molecules are sanitized
//! the way the drug featurizer expects:
//!
//! 1. ring bonds and a set of smallest rings are perceived
//! 2. aromatic input is kekulized
//! 3. implicit hydrogens are assigned and valences checked
//! 4. aromaticity is perceived on the Kekulé structure (Hückel 4n+2)
//! 5. double bond stereo is assigned from directional bonds
//!
//! Bond orders stay Kekulé after step 4. Only the aromatic flags of atoms
//! and bonds change.
mod aromaticity;
mod error;
mod kekulize;
mod molecule;
mod rings;
mod smiles;
mod stereo;

pub use error::ChemError;
pub use molecule::{Atom, Bond, BondOrder, BondStereo, ChiralTag, Molecule};
pub use smiles::parse_smiles;
