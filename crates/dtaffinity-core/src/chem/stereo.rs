//! E/Z labels for double bonds written with `/` and `\`.
use super::molecule::{BondDirection, BondOrder, BondStereo, Molecule};

/// Label double bonds outside small rings whose ends both carry a
/// directional single bond.
///
/// The written neighbours fix cis or trans. Each end is then ranked by
/// atomic number alone: when the other substituent outranks the written one
/// the label flips. Ties keep the written neighbour.
pub(crate) fn assign_double_bond_stereo(mol: &mut Molecule) {
    for idx in 0..mol.bond_count() {
        let bond = mol.bond(idx);
        if bond.order != BondOrder::Double {
            continue;
        }
        if mol.smallest_ring_with_bond(idx).is_some_and(|size| size < 8) {
            continue;
        }
        let (a, b) = (bond.begin, bond.end);
        let Some((ref_a, dir_a)) = directional_neighbor(mol, a, b) else {
            continue;
        };
        let Some((ref_b, dir_b)) = directional_neighbor(mol, b, a) else {
            continue;
        };

        // walking ref_a -> a and b -> ref_b: equal marks mean trans
        let cis = dir_a.flip() != dir_b;
        let flipped = outranked(mol, a, b, ref_a) != outranked(mol, b, a, ref_b);
        let stereo = if cis != flipped {
            BondStereo::Z
        } else {
            BondStereo::E
        };
        mol.bonds_mut()[idx].stereo = stereo;
    }
}

/// First neighbour of `atom` (other than `across`) joined by a marked single
/// bond, with the mark seen walking away from `atom`.
fn directional_neighbor(mol: &Molecule, atom: usize, across: usize) -> Option<(usize, BondDirection)> {
    mol.neighbors(atom)
        .filter(|&(nbr, _)| nbr != across)
        .map(|(nbr, bond)| (nbr, mol.bond(bond)))
        .filter(|(_, bond)| bond.order == BondOrder::Single)
        .map(|(nbr, bond)| (nbr, bond.direction_from(atom)))
        .find(|(_, direction)| *direction != BondDirection::None)
}

fn outranked(mol: &Molecule, atom: usize, across: usize, written: usize) -> bool {
    let written_rank = mol.atom(written).atomic_number;
    mol.neighbors(atom)
        .filter(|&(nbr, _)| nbr != across && nbr != written)
        .any(|(nbr, _)| mol.atom(nbr).atomic_number > written_rank)
}
