//! Model inputs: MPNN bond graphs for drugs and one-hot sequences for targets.
mod drug;
mod protein;

pub use drug::{
    atom_features, bond_features, FeaturizeError, MolGraph, ATOM_FDIM, BOND_FDIM, ELEM_LIST,
    MAX_ATOM, MAX_BOND, MAX_NB,
};
pub use protein::{ProteinEncoding, MAX_SEQ_PROTEIN, PROTEIN_ALPHABET};
