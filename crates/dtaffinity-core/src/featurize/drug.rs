//! Directed bond graphs for the MPNN drug encoder.
//!
//! Every chemical bond becomes two directed bonds. A directed bond `x -> y`
//! carries the features of its source atom `x` followed by the bond
//! features. Row 0 of the bond table is reserved as an all-zero padding row
//! so that index 0 in `agraph` / `bgraph` means "no neighbour".
use crate::chem::{parse_smiles, Bond, BondOrder, Molecule};
use candle_core::{Device, Result, Tensor};
use thiserror::Error;

/// Element vocabulary of the atom one-hot, the last entry catching everything else.
pub const ELEM_LIST: [&str; 23] = [
    "C", "N", "O", "S", "F", "Si", "P", "Cl", "Br", "Mg", "Na", "Ca", "Fe", "Al", "I", "B", "K",
    "Se", "Zn", "H", "Cu", "Mn", "unknown",
];
const FORMAL_CHARGES: [i8; 5] = [-1, -2, 1, 2, 0];
const MAX_DEGREE: usize = 5;
const CHIRAL_TAGS: usize = 4;
const BOND_STEREOS: usize = 6;

pub const ATOM_FDIM: usize =
    ELEM_LIST.len() + (MAX_DEGREE + 1) + FORMAL_CHARGES.len() + CHIRAL_TAGS + 1;
pub const BOND_FDIM: usize = 5 + BOND_STEREOS;
/// Neighbour slots per atom and per directed bond.
pub const MAX_NB: usize = 6;
pub const MAX_ATOM: usize = 400;
/// Directed bond rows, padding row included.
pub const MAX_BOND: usize = MAX_ATOM * 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeaturizeError {
    #[error("molecule has {atoms} atoms; at most {} are supported", MAX_ATOM)]
    TooManyAtoms { atoms: usize },

    #[error("molecule has {bonds} directed bonds; at most {} are supported", MAX_BOND)]
    TooManyBonds { bonds: usize },
}

/// One-hot position of `value` in `choices`, falling back to the last slot.
fn one_hot_unk<T: PartialEq>(value: T, choices: &[T], out: &mut [f32]) {
    let idx = choices
        .iter()
        .position(|c| *c == value)
        .unwrap_or(choices.len() - 1);
    out[idx] = 1.0;
}

/// Element, degree, formal charge, chiral tag and aromaticity of one atom.
pub fn atom_features(mol: &Molecule, atom: usize) -> [f32; ATOM_FDIM] {
    let mut features = [0f32; ATOM_FDIM];
    let a = mol.atom(atom);

    let (element, rest) = features.split_at_mut(ELEM_LIST.len());
    one_hot_unk(a.symbol(), &ELEM_LIST, element);

    let (degree, rest) = rest.split_at_mut(MAX_DEGREE + 1);
    degree[mol.degree(atom).min(MAX_DEGREE)] = 1.0;

    let (charge, rest) = rest.split_at_mut(FORMAL_CHARGES.len());
    one_hot_unk(a.charge, &FORMAL_CHARGES, charge);

    let (chiral, rest) = rest.split_at_mut(CHIRAL_TAGS);
    chiral[a.chirality.to_index().min(CHIRAL_TAGS - 1)] = 1.0;

    rest[0] = if a.aromatic { 1.0 } else { 0.0 };
    features
}

/// Bond type, ring membership and stereo of one bond.
pub fn bond_features(bond: &Bond) -> [f32; BOND_FDIM] {
    let mut features = [0f32; BOND_FDIM];
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    features[0] = flag(bond.order == BondOrder::Single);
    features[1] = flag(bond.order == BondOrder::Double);
    features[2] = flag(bond.order == BondOrder::Triple);
    features[3] = flag(bond.order == BondOrder::Aromatic);
    features[4] = flag(bond.in_ring);
    features[5 + bond.stereo.to_index().min(BOND_STEREOS - 1)] = 1.0;
    features
}

/// Graph tensors of a single molecule, kept as flat row-major buffers.
///
/// A graph with zero atoms stands for a molecule that could not be read;
/// the encoder maps it to a zero embedding.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MolGraph {
    /// `[n_atoms, ATOM_FDIM]`
    pub fatoms: Vec<f32>,
    /// `[n_bonds, ATOM_FDIM + BOND_FDIM]`
    pub fbonds: Vec<f32>,
    /// `[n_atoms, MAX_NB]` incoming directed bonds of each atom
    pub agraph: Vec<u32>,
    /// `[n_bonds, MAX_NB]` directed bonds feeding each directed bond
    pub bgraph: Vec<u32>,
    n_atoms: usize,
    n_bonds: usize,
}

impl MolGraph {
    /// The zero-atom graph.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse and encode a SMILES string.
    ///
    /// Unreadable SMILES log a warning and give the empty graph. Molecules
    /// too large for the encoder are an error.
    pub fn from_smiles(smiles: &str) -> std::result::Result<Self, FeaturizeError> {
        match parse_smiles(smiles) {
            Ok(mol) => Self::from_molecule(&mol),
            Err(err) => {
                tracing::warn!("Molecule {smiles} could not be read ({err}); using zero vectors");
                Ok(Self::empty())
            }
        }
    }

    pub fn from_molecule(mol: &Molecule) -> std::result::Result<Self, FeaturizeError> {
        let n_atoms = mol.atom_count();
        let bond_width = ATOM_FDIM + BOND_FDIM;

        let atom_rows: Vec<[f32; ATOM_FDIM]> =
            (0..n_atoms).map(|atom| atom_features(mol, atom)).collect();

        // directed bonds as (source, target); row 0 is padding
        let mut all_bonds: Vec<(usize, usize)> = vec![(usize::MAX, usize::MAX)];
        let mut in_bonds: Vec<Vec<usize>> = vec![Vec::new(); n_atoms];
        let mut fbonds = vec![0f32; bond_width];

        for bond in mol.bonds() {
            let features = bond_features(bond);
            for (x, y) in [(bond.begin, bond.end), (bond.end, bond.begin)] {
                let b = all_bonds.len();
                all_bonds.push((x, y));
                fbonds.extend_from_slice(&atom_rows[x]);
                fbonds.extend_from_slice(&features);
                in_bonds[y].push(b);
            }
        }
        let n_bonds = all_bonds.len();

        if in_bonds.iter().any(|incoming| incoming.len() > MAX_NB) {
            tracing::warn!(
                "Molecule has an atom with more than {MAX_NB} neighbours; using zero vectors"
            );
            return Ok(Self::empty());
        }
        if n_atoms > MAX_ATOM {
            return Err(FeaturizeError::TooManyAtoms { atoms: n_atoms });
        }
        if n_bonds > MAX_BOND {
            return Err(FeaturizeError::TooManyBonds { bonds: n_bonds });
        }

        let mut agraph = vec![0u32; n_atoms * MAX_NB];
        for (atom, incoming) in in_bonds.iter().enumerate() {
            for (slot, &b) in incoming.iter().enumerate() {
                agraph[atom * MAX_NB + slot] = b as u32;
            }
        }

        // slots keep their position in in_bonds[x]; the reverse bond leaves a 0
        let mut bgraph = vec![0u32; n_bonds * MAX_NB];
        for (b1, &(x, y)) in all_bonds.iter().enumerate().skip(1) {
            for (slot, &b2) in in_bonds[x].iter().enumerate() {
                if all_bonds[b2].0 != y {
                    bgraph[b1 * MAX_NB + slot] = b2 as u32;
                }
            }
        }

        Ok(Self {
            fatoms: atom_rows.concat(),
            fbonds,
            agraph,
            bgraph,
            n_atoms,
            n_bonds,
        })
    }

    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }
    /// Directed bond rows, padding row included.
    pub fn n_bonds(&self) -> usize {
        self.n_bonds
    }
    pub fn is_empty(&self) -> bool {
        self.n_atoms == 0
    }

    /// `(fatoms, fbonds, agraph, bgraph)` as f32 / u32 tensors.
    pub fn to_tensors(&self, device: &Device) -> Result<(Tensor, Tensor, Tensor, Tensor)> {
        let fatoms = Tensor::from_vec(self.fatoms.clone(), (self.n_atoms, ATOM_FDIM), device)?;
        let fbonds = Tensor::from_vec(
            self.fbonds.clone(),
            (self.n_bonds, ATOM_FDIM + BOND_FDIM),
            device,
        )?;
        let agraph = Tensor::from_vec(self.agraph.clone(), (self.n_atoms, MAX_NB), device)?;
        let bgraph = Tensor::from_vec(self.bgraph.clone(), (self.n_bonds, MAX_NB), device)?;
        Ok((fatoms, fbonds, agraph, bgraph))
    }
}
