//! # dtaffinity-core
//!
//! Inputs for drug-target affinity models.
//!
//! __dtaffinity-core__ provides functionality for:
//! * Extracting the amino-acid sequence of a target from PDB / mmCIF files
//! * Parsing SMILES into a sanitized molecular graph (rings, kekulization,
//!   aromaticity and stereo perception)
//! * Encoding drugs as MPNN bond graphs and targets as one-hot CNN inputs
//!
//! The main entry points are [`sequence_from_file`], [`parse_smiles`],
//! [`MolGraph`] and [`ProteinEncoding`].
//!
mod chem;
mod featurize;
mod info;
mod structure;

pub use self::chem::{
    parse_smiles, Atom, Bond, BondOrder, BondStereo, ChemError, ChiralTag, Molecule,
};
pub use self::featurize::{
    atom_features, bond_features, FeaturizeError, MolGraph, ProteinEncoding, ATOM_FDIM, BOND_FDIM,
    ELEM_LIST, MAX_ATOM, MAX_BOND, MAX_NB, MAX_SEQ_PROTEIN, PROTEIN_ALPHABET,
};
pub use self::info::constants::{aa3to1, atomic_number, element_symbol};
pub use self::structure::{sequence_from_file, sequence_from_pdb, StructureError, TargetSequence};
