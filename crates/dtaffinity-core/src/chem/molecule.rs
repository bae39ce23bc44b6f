use super::error::ChemError;
use super::{aromaticity, kekulize, rings, stereo};
use crate::info::constants::{default_valences, element_symbol, max_valence};
use strum::{Display, EnumIter};

/// Tetrahedral chirality as written. Discriminants follow the RDKit
/// `ChiralType` numbering the drug featurizer one-hot encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter)]
pub enum ChiralTag {
    #[default]
    Unspecified = 0,
    TetrahedralCw = 1,
    TetrahedralCcw = 2,
    Other = 3,
}

impl ChiralTag {
    pub fn to_index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}

impl BondOrder {
    /// Contribution to the valence of either atom. Aromatic bonds count
    /// as single until the molecule is kekulized.
    pub fn valence(&self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Quadruple => 4,
        }
    }
}

/// Double bond configuration. Discriminants follow the RDKit `BondStereo`
/// numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter)]
pub enum BondStereo {
    #[default]
    None = 0,
    Any = 1,
    Z = 2,
    E = 3,
    Cis = 4,
    Trans = 5,
}

impl BondStereo {
    pub fn to_index(&self) -> usize {
        *self as usize
    }
}

/// Directional single bond marks (`/` and `\`), relative to `begin -> end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum BondDirection {
    #[default]
    None,
    Up,
    Down,
}

impl BondDirection {
    pub(crate) fn flip(self) -> Self {
        match self {
            BondDirection::None => BondDirection::None,
            BondDirection::Up => BondDirection::Down,
            BondDirection::Down => BondDirection::Up,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub atomic_number: u8,
    pub charge: i8,
    pub isotope: Option<u16>,
    pub chirality: ChiralTag,
    pub atom_class: Option<u32>,
    /// Written inside brackets. Bracket atoms never get implicit hydrogens.
    pub bracket: bool,
    /// Hydrogens given in a bracket (`[NH3+]`) or folded from `[H]` neighbours.
    pub explicit_hydrogens: u8,
    /// Hydrogens implied by the default valence of an organic subset atom.
    pub implicit_hydrogens: u8,
    /// Perceived aromaticity of the sanitized molecule.
    pub aromatic: bool,
    /// Lowercase in the input.
    pub(crate) written_aromatic: bool,
}

impl Atom {
    pub(crate) fn new(atomic_number: u8) -> Self {
        Self {
            atomic_number,
            charge: 0,
            isotope: None,
            chirality: ChiralTag::Unspecified,
            atom_class: None,
            bracket: false,
            explicit_hydrogens: 0,
            implicit_hydrogens: 0,
            aromatic: false,
            written_aromatic: false,
        }
    }
    pub fn symbol(&self) -> &'static str {
        element_symbol(self.atomic_number)
    }
    pub fn total_hydrogens(&self) -> usize {
        usize::from(self.explicit_hydrogens) + usize::from(self.implicit_hydrogens)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
    pub aromatic: bool,
    pub in_ring: bool,
    pub stereo: BondStereo,
    pub(crate) direction: BondDirection,
}

impl Bond {
    pub(crate) fn new(begin: usize, end: usize, order: BondOrder) -> Self {
        Self {
            begin,
            end,
            order,
            aromatic: false,
            in_ring: false,
            stereo: BondStereo::None,
            direction: BondDirection::None,
        }
    }
    /// The atom across the bond from `atom`.
    pub fn other(&self, atom: usize) -> usize {
        if self.begin == atom {
            self.end
        } else {
            self.begin
        }
    }
    pub fn contains(&self, atom: usize) -> bool {
        self.begin == atom || self.end == atom
    }
    /// Direction mark as seen walking from `atom` across the bond.
    pub(crate) fn direction_from(&self, atom: usize) -> BondDirection {
        if self.begin == atom {
            self.direction
        } else {
            self.direction.flip()
        }
    }
}

/// A ring as an ordered cycle of atoms and the bonds joining them.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Ring {
    pub atoms: Vec<usize>,
    pub bonds: Vec<usize>,
}

/// Molecular graph with hydrogens folded into their heavy atoms.
#[derive(Debug, Clone)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    // per atom: indices into `bonds`
    adjacency: Vec<Vec<usize>>,
    rings: Vec<Ring>,
}

impl Molecule {
    pub(crate) fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Result<Self, ChemError> {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (idx, bond) in bonds.iter().enumerate() {
            if bond.begin == bond.end {
                return Err(ChemError::SelfBond(bond.begin));
            }
            let duplicate = adjacency[bond.begin]
                .iter()
                .any(|&b: &usize| bonds[b].other(bond.begin) == bond.end);
            if duplicate {
                return Err(ChemError::DuplicateBond(bond.begin, bond.end));
            }
            adjacency[bond.begin].push(idx);
            adjacency[bond.end].push(idx);
        }
        Ok(Self {
            atoms,
            bonds,
            adjacency,
            rings: Vec::new(),
        })
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }
    pub fn atom(&self, idx: usize) -> &Atom {
        &self.atoms[idx]
    }
    pub fn bond(&self, idx: usize) -> &Bond {
        &self.bonds[idx]
    }
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
    /// Number of explicit (heavy atom) neighbours.
    pub fn degree(&self, atom: usize) -> usize {
        self.adjacency[atom].len()
    }
    /// Bond indices touching `atom`, in the order they were written.
    pub fn atom_bonds(&self, atom: usize) -> &[usize] {
        &self.adjacency[atom]
    }
    /// `(neighbour, bond index)` pairs of `atom`.
    pub fn neighbors(&self, atom: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency[atom]
            .iter()
            .map(move |&b| (self.bonds[b].other(atom), b))
    }
    pub fn bond_between(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency[a]
            .iter()
            .copied()
            .find(|&bond| self.bonds[bond].other(a) == b)
    }
    /// Sum of bond orders at `atom`, hydrogens excluded.
    pub fn explicit_valence(&self, atom: usize) -> usize {
        self.adjacency[atom]
            .iter()
            .map(|&b| usize::from(self.bonds[b].order.valence()))
            .sum()
    }
    /// Smallest rings as lists of atom indices, smallest first.
    pub fn rings(&self) -> Vec<Vec<usize>> {
        self.rings.iter().map(|r| r.atoms.clone()).collect()
    }
    pub fn is_atom_in_ring(&self, atom: usize) -> bool {
        self.adjacency[atom].iter().any(|&b| self.bonds[b].in_ring)
    }
    /// Size of the smallest ring holding `bond`, if any.
    pub fn smallest_ring_with_bond(&self, bond: usize) -> Option<usize> {
        self.rings
            .iter()
            .filter(|r| r.bonds.contains(&bond))
            .map(|r| r.atoms.len())
            .min()
    }

    pub(crate) fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }
    pub(crate) fn bonds_mut(&mut self) -> &mut [Bond] {
        &mut self.bonds
    }
    pub(crate) fn ring_list(&self) -> &[Ring] {
        &self.rings
    }

    /// Perceive rings, kekulize, assign hydrogens, check valences and perceive
    /// aromaticity and double bond stereo.
    pub fn sanitize(&mut self) -> Result<(), ChemError> {
        let in_ring = rings::ring_bonds(self);
        for (bond, flag) in self.bonds.iter_mut().zip(in_ring) {
            bond.in_ring = flag;
        }
        self.rings = rings::smallest_rings(self);

        kekulize::kekulize(self)?;
        self.assign_implicit_hydrogens();
        self.check_valences()?;
        aromaticity::perceive_aromaticity(self);
        stereo::assign_double_bond_stereo(self);
        Ok(())
    }

    fn assign_implicit_hydrogens(&mut self) {
        for idx in 0..self.atoms.len() {
            if self.atoms[idx].bracket {
                self.atoms[idx].implicit_hydrogens = 0;
                continue;
            }
            let valence =
                self.explicit_valence(idx) + usize::from(self.atoms[idx].explicit_hydrogens);
            // valence <= v <= u8::MAX whenever a default valence is found
            let hydrogens = default_valences(self.atoms[idx].atomic_number)
                .iter()
                .map(|&v| usize::from(v))
                .find(|&v| v >= valence)
                .map(|v| (v - valence) as u8)
                .unwrap_or(0);
            self.atoms[idx].implicit_hydrogens = hydrogens;
        }
    }

    fn check_valences(&self) -> Result<(), ChemError> {
        for (idx, atom) in self.atoms.iter().enumerate() {
            let Some(allowed) = max_valence(atom.atomic_number, atom.charge) else {
                continue;
            };
            let valence = self.explicit_valence(idx) + atom.total_hydrogens();
            if valence > usize::from(allowed) {
                return Err(ChemError::Valence {
                    atom: idx,
                    symbol: atom.symbol(),
                    valence,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse_smiles, ChemError};

    #[test]
    fn test_implicit_hydrogens() {
        let mol = parse_smiles("CC(=O)N").unwrap();
        let hydrogens: Vec<usize> = mol.atoms().iter().map(|a| a.total_hydrogens()).collect();
        assert_eq!(hydrogens, vec![3, 0, 0, 2]);
    }

    #[test]
    fn test_bracket_atoms_have_no_implicit_hydrogens() {
        let mol = parse_smiles("[NH4+]").unwrap();
        assert_eq!(mol.atom(0).explicit_hydrogens, 4);
        assert_eq!(mol.atom(0).implicit_hydrogens, 0);
        assert_eq!(mol.atom(0).charge, 1);

        let mol = parse_smiles("[C]").unwrap();
        assert_eq!(mol.atom(0).total_hydrogens(), 0);
    }

    #[test]
    fn test_valence_errors() {
        assert!(parse_smiles("C(C)(C)(C)(C)C").is_err());
        assert!(parse_smiles("CN(=O)=O").is_err());
        assert!(parse_smiles("C[N+](=O)[O-]").is_ok());
        assert!(parse_smiles("CS(=O)(=O)C").is_ok());
        assert!(parse_smiles("[Na+].[Cl-]").is_ok());
    }

    #[test]
    fn test_large_valence_is_an_error() {
        let smiles = format!("C{}", "(#N)".repeat(90));
        let err = parse_smiles(&smiles).unwrap_err();
        assert!(matches!(err, ChemError::Valence { atom: 0, valence: 270, .. }));

        let smiles = format!("C{}", "([H])".repeat(300));
        assert!(parse_smiles(&smiles).is_err());
    }

    #[test]
    fn test_neighbors() {
        let mol = parse_smiles("CC(C)O").unwrap();
        assert_eq!(mol.degree(1), 3);
        let nbrs: Vec<usize> = mol.neighbors(1).map(|(a, _)| a).collect();
        assert_eq!(nbrs, vec![0, 2, 3]);
        assert!(mol.bond_between(0, 3).is_none());
        assert_eq!(mol.explicit_valence(1), 3);
    }
}
