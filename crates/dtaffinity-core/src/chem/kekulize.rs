//! Assign alternating single and double bonds to aromatic input.
use super::error::ChemError;
use super::molecule::{BondOrder, Molecule};
use crate::info::constants::lowest_valence;

// Keeps pathological inputs from running away in the backtracking search.
const MAX_STEPS: usize = 1_000_000;

/// Replace every aromatic bond with a single or double bond.
///
/// Atoms short of their lowest valence when aromatic bonds count as single
/// need exactly one double bond; those are paired up over the aromatic bonds
/// by a backtracking search for a perfect matching.
pub(crate) fn kekulize(mol: &mut Molecule) -> Result<(), ChemError> {
    for idx in 0..mol.atom_count() {
        if mol.atom(idx).written_aromatic && !mol.is_atom_in_ring(idx) {
            return Err(ChemError::NonRingAromatic(idx));
        }
    }
    for bond in mol.bonds_mut() {
        if bond.order == BondOrder::Aromatic && !bond.in_ring {
            bond.order = BondOrder::Single;
        }
    }
    if !mol.bonds().iter().any(|b| b.order == BondOrder::Aromatic) {
        return Ok(());
    }

    let needs_double: Vec<bool> = (0..mol.atom_count())
        .map(|idx| needs_double_bond(mol, idx))
        .collect();

    // aromatic bonds whose ends both still need a double bond
    let mut options: Vec<Vec<(usize, usize)>> = vec![Vec::new(); mol.atom_count()];
    for (idx, bond) in mol.bonds().iter().enumerate() {
        if bond.order == BondOrder::Aromatic && needs_double[bond.begin] && needs_double[bond.end]
        {
            options[bond.begin].push((bond.end, idx));
            options[bond.end].push((bond.begin, idx));
        }
    }

    let mut search = Matching {
        options: &options,
        unmatched: needs_double.clone(),
        chosen: Vec::new(),
        steps: 0,
    };
    if !search.solve() {
        let atoms: Vec<usize> = needs_double
            .iter()
            .enumerate()
            .filter_map(|(idx, &needs)| needs.then_some(idx))
            .collect();
        return Err(ChemError::Kekulize(format!(
            "no alternating bond assignment covers atoms {atoms:?}"
        )));
    }

    let chosen = search.chosen;
    for (idx, bond) in mol.bonds_mut().iter_mut().enumerate() {
        if bond.order == BondOrder::Aromatic {
            bond.order = if chosen.contains(&idx) {
                BondOrder::Double
            } else {
                BondOrder::Single
            };
        }
    }
    Ok(())
}

fn needs_double_bond(mol: &Molecule, idx: usize) -> bool {
    let has_aromatic_bond = mol
        .atom_bonds(idx)
        .iter()
        .any(|&b| mol.bond(b).order == BondOrder::Aromatic);
    if !has_aromatic_bond {
        return false;
    }
    // an exocyclic c=O already satisfies the atom
    let has_multiple_bond = mol
        .atom_bonds(idx)
        .iter()
        .any(|&b| matches!(mol.bond(b).order, BondOrder::Double | BondOrder::Triple));
    if has_multiple_bond {
        return false;
    }
    let atom = mol.atom(idx);
    let Some(lowest) = lowest_valence(atom.atomic_number, atom.charge) else {
        return false;
    };
    let used = mol.explicit_valence(idx) + usize::from(atom.explicit_hydrogens);
    usize::from(lowest) > used
}

struct Matching<'a> {
    options: &'a [Vec<(usize, usize)>],
    unmatched: Vec<bool>,
    chosen: Vec<usize>,
    steps: usize,
}

impl Matching<'_> {
    fn solve(&mut self) -> bool {
        self.steps += 1;
        if self.steps > MAX_STEPS {
            return false;
        }
        // most constrained atom first
        let mut best: Option<(usize, usize)> = None;
        for atom in (0..self.unmatched.len()).filter(|&a| self.unmatched[a]) {
            let free = self.options[atom]
                .iter()
                .filter(|&&(nbr, _)| self.unmatched[nbr])
                .count();
            if free == 0 {
                return false;
            }
            if best.map_or(true, |(_, count)| free < count) {
                best = Some((atom, free));
            }
        }
        let Some((atom, _)) = best else {
            return true;
        };

        for &(nbr, bond) in &self.options[atom] {
            if !self.unmatched[nbr] {
                continue;
            }
            self.unmatched[atom] = false;
            self.unmatched[nbr] = false;
            self.chosen.push(bond);
            if self.solve() {
                return true;
            }
            self.chosen.pop();
            self.unmatched[atom] = true;
            self.unmatched[nbr] = true;
        }
        false
    }
}
