//! Hückel aromaticity on the Kekulé structure.
use super::molecule::{BondOrder, Molecule};
use std::collections::BTreeSet;

/// Flag atoms and bonds of rings (and pairs of fused rings) holding 4n+2
/// pi electrons as aromatic. Bond orders are left untouched.
pub(crate) fn perceive_aromaticity(mol: &mut Molecule) {
    for atom in mol.atoms_mut() {
        atom.aromatic = false;
    }
    for bond in mol.bonds_mut() {
        bond.aromatic = false;
    }

    let rings = mol.ring_list();
    let mut systems: Vec<(BTreeSet<usize>, BTreeSet<usize>)> = rings
        .iter()
        .map(|r| {
            (
                r.atoms.iter().copied().collect(),
                r.bonds.iter().copied().collect(),
            )
        })
        .collect();
    for (i, first) in rings.iter().enumerate() {
        for second in &rings[i + 1..] {
            if !first.bonds.iter().any(|b| second.bonds.contains(b)) {
                continue;
            }
            let atoms = first.atoms.iter().chain(&second.atoms).copied().collect();
            let bonds = first.bonds.iter().chain(&second.bonds).copied().collect();
            systems.push((atoms, bonds));
        }
    }

    let aromatic: Vec<_> = systems
        .into_iter()
        .filter(|(atoms, _)| {
            pi_electrons(mol, atoms).is_some_and(|electrons| electrons % 4 == 2)
        })
        .collect();

    for (atoms, bonds) in aromatic {
        for atom in atoms {
            mol.atoms_mut()[atom].aromatic = true;
        }
        for bond in bonds {
            mol.bonds_mut()[bond].aromatic = true;
        }
    }
}

/// Pi electrons of a ring system, or `None` when an atom cannot take part.
fn pi_electrons(mol: &Molecule, system: &BTreeSet<usize>) -> Option<usize> {
    system
        .iter()
        .map(|&atom| atom_electrons(mol, atom, system))
        .sum()
}

fn atom_electrons(mol: &Molecule, idx: usize, system: &BTreeSet<usize>) -> Option<usize> {
    let atom = mol.atom(idx);
    let mut ring_double = false;
    let mut exocyclic_acceptor = false;

    for (nbr, bond) in mol.neighbors(idx) {
        match mol.bond(bond).order {
            BondOrder::Triple | BondOrder::Quadruple => return None,
            BondOrder::Double if system.contains(&nbr) => ring_double = true,
            BondOrder::Double => {
                // c=O, c=N and c=S keep the ring carbon in the system with no electrons
                let acceptor = matches!(mol.atom(nbr).atomic_number, 7 | 8 | 16);
                if atom.atomic_number == 6 && acceptor {
                    exocyclic_acceptor = true;
                } else {
                    return None;
                }
            }
            BondOrder::Single | BondOrder::Aromatic => {}
        }
    }
    if ring_double {
        return Some(1);
    }
    if exocyclic_acceptor {
        return Some(0);
    }

    let connections = mol.degree(idx) + atom.total_hydrogens();
    #[rustfmt::skip]
    let electrons = match (atom.atomic_number, atom.charge, connections) {
        (6, -1, _)                   => 2,
        (6, 1, _)                    => 0,
        (5, 0, _)                    => 0,
        (7 | 15, 0, 3)               => 2,
        (7 | 15, -1, 2)              => 2,
        (8 | 16 | 34 | 52, 0, 2)     => 2,
        _                            => return None,
    };
    Some(electrons)
}

#[cfg(test)]
mod tests {
    use crate::parse_smiles;

    fn aromatic_atoms(smiles: &str) -> usize {
        parse_smiles(smiles)
            .unwrap()
            .atoms()
            .iter()
            .filter(|a| a.aromatic)
            .count()
    }

    #[test]
    fn test_aromatic_rings() {
        assert_eq!(aromatic_atoms("c1ccccc1"), 6);
        assert_eq!(aromatic_atoms("c1ccncc1"), 6);
        assert_eq!(aromatic_atoms("c1cc[nH]c1"), 5);
        assert_eq!(aromatic_atoms("c1ccsc1"), 5);
        assert_eq!(aromatic_atoms("c1ccc2ccccc2c1"), 10);
        assert_eq!(aromatic_atoms("Cn1cnc2c1c(=O)n(C)c(=O)n2C"), 9);
    }

    #[test]
    fn test_kekule_input_is_perceived() {
        assert_eq!(aromatic_atoms("C1=CC=CC=C1"), 6);
        let mol = parse_smiles("C1=CC=CC=C1").unwrap();
        assert!(mol.bonds().iter().all(|b| b.aromatic));
    }

    #[test]
    fn test_non_aromatic_rings() {
        assert_eq!(aromatic_atoms("C1CCCCC1"), 0);
        assert_eq!(aromatic_atoms("C1=CCC=C1"), 0);
        assert_eq!(aromatic_atoms("C1=CC=CC=CC=C1"), 0);
        // substituents stay outside the ring system
        assert_eq!(aromatic_atoms("Cc1ccccc1O"), 6);
    }

    #[test]
    fn test_pyridone() {
        let mol = parse_smiles("O=c1cccc[nH]1").unwrap();
        assert!(!mol.atom(0).aromatic);
        assert!((1..7).all(|i| mol.atom(i).aromatic));
    }
}
