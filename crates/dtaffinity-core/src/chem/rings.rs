//! Ring perception.
//!
//! A bond is in a ring exactly when it is not a bridge of the molecular
//! graph. For every ring bond the shortest cycle through it is collected;
//! the deduplicated set of these cycles covers every ring bond with its
//! smallest ring.
use super::molecule::{Molecule, Ring};
use std::collections::{HashSet, VecDeque};

/// Flags every bond that lies on a cycle.
pub(crate) fn ring_bonds(mol: &Molecule) -> Vec<bool> {
    let n = mol.atom_count();
    let mut discovery = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut is_bridge = vec![false; mol.bond_count()];
    let mut timer = 0;

    for root in 0..n {
        if discovery[root] != usize::MAX {
            continue;
        }
        // iterative DFS: (atom, bond used to reach it, next neighbour slot)
        let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];
        discovery[root] = timer;
        low[root] = timer;
        timer += 1;

        while let Some(top) = stack.len().checked_sub(1) {
            let (atom, parent_bond, slot) = stack[top];
            let bonds = mol.atom_bonds(atom);
            if slot < bonds.len() {
                let bond = bonds[slot];
                stack[top].2 += 1;
                if Some(bond) == parent_bond {
                    continue;
                }
                let next = mol.bond(bond).other(atom);
                if discovery[next] == usize::MAX {
                    discovery[next] = timer;
                    low[next] = timer;
                    timer += 1;
                    stack.push((next, Some(bond), 0));
                } else {
                    low[atom] = low[atom].min(discovery[next]);
                }
            } else {
                stack.pop();
                if let (Some(bond), Some(&(parent, _, _))) = (parent_bond, stack.last()) {
                    low[parent] = low[parent].min(low[atom]);
                    if low[atom] > discovery[parent] {
                        is_bridge[bond] = true;
                    }
                }
            }
        }
    }
    is_bridge.into_iter().map(|bridge| !bridge).collect()
}

/// Shortest ring through each ring bond, deduplicated and sorted by size.
///
/// Requires `Bond::in_ring` to be set.
pub(crate) fn smallest_rings(mol: &Molecule) -> Vec<Ring> {
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut rings = Vec::new();

    for (idx, bond) in mol.bonds().iter().enumerate() {
        if !bond.in_ring {
            continue;
        }
        let Some(ring) = shortest_cycle(mol, idx) else {
            continue;
        };
        let mut key = ring.bonds.clone();
        key.sort_unstable();
        if seen.insert(key) {
            rings.push(ring);
        }
    }
    rings.sort_by_key(|r| r.atoms.len());
    rings
}

/// BFS from one end of `bond` to the other over ring bonds, skipping `bond`.
fn shortest_cycle(mol: &Molecule, bond: usize) -> Option<Ring> {
    let start = mol.bond(bond).begin;
    let goal = mol.bond(bond).end;
    let mut previous: Vec<Option<(usize, usize)>> = vec![None; mol.atom_count()];
    let mut visited = vec![false; mol.atom_count()];
    let mut queue = VecDeque::from([start]);
    visited[start] = true;

    while let Some(atom) = queue.pop_front() {
        if atom == goal {
            break;
        }
        for (next, via) in mol.neighbors(atom) {
            if via == bond || visited[next] || !mol.bond(via).in_ring {
                continue;
            }
            visited[next] = true;
            previous[next] = Some((atom, via));
            queue.push_back(next);
        }
    }
    if !visited[goal] {
        return None;
    }

    let mut atoms = vec![goal];
    let mut bonds = vec![bond];
    let mut current = goal;
    while let Some((prev, via)) = previous[current] {
        bonds.push(via);
        atoms.push(prev);
        current = prev;
    }
    Some(Ring { atoms, bonds })
}
