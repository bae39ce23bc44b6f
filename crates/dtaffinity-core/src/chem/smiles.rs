//! SMILES reader.
//!
//! Supports the organic subset, bracket atoms with isotopes, chirality,
//! hydrogen counts, charges and atom classes, all bond symbols including the
//! directional `/` and `\`, branches, `%NN` ring closures and `.`.
use super::error::ChemError;
use super::molecule::{Atom, Bond, BondDirection, BondOrder, ChiralTag, Molecule};
use crate::info::constants::atomic_number;
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::CharIndices;

/// Parse and sanitize a SMILES string.
///
/// Anything after the first whitespace (a molecule name, say) is ignored.
/// Hydrogens written as bracket atoms on a single heavy atom are folded into
/// that atom's hydrogen count.
///
/// ```
/// use dtaffinity_core::parse_smiles;
/// let mol = parse_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap();
/// assert_eq!(mol.atom_count(), 13);
/// ```
pub fn parse_smiles(smiles: &str) -> Result<Molecule, ChemError> {
    let smiles = smiles.split_whitespace().next().ok_or(ChemError::Empty)?;
    let (atoms, bonds) = Parser::new(smiles).parse()?;
    let (atoms, bonds) = fold_hydrogens(atoms, bonds);
    let mut mol = Molecule::new(atoms, bonds)?;
    mol.sanitize()?;
    Ok(mol)
}

struct RingOpening {
    atom: usize,
    order: Option<BondOrder>,
    direction: BondDirection,
}

#[derive(Default)]
struct PendingBond {
    order: Option<BondOrder>,
    direction: BondDirection,
    position: usize,
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    previous: Option<usize>,
    pending: Option<PendingBond>,
    // (atom the branch hangs from, position of the '(')
    branches: Vec<(Option<usize>, usize)>,
    rings: HashMap<u32, RingOpening>,
}

impl<'a> Parser<'a> {
    fn new(smiles: &'a str) -> Self {
        Self {
            chars: smiles.char_indices().peekable(),
            atoms: Vec::new(),
            bonds: Vec::new(),
            previous: None,
            pending: None,
            branches: Vec::new(),
            rings: HashMap::new(),
        }
    }

    fn parse(mut self) -> Result<(Vec<Atom>, Vec<Bond>), ChemError> {
        while let Some(&(position, ch)) = self.chars.peek() {
            match ch {
                '-' | '=' | '#' | '$' | ':' | '/' | '\\' => {
                    self.chars.next();
                    if self.pending.is_some() || self.previous.is_none() {
                        return Err(ChemError::DanglingBond(position));
                    }
                    let (order, direction) = match ch {
                        '-' => (BondOrder::Single, BondDirection::None),
                        '=' => (BondOrder::Double, BondDirection::None),
                        '#' => (BondOrder::Triple, BondDirection::None),
                        '$' => (BondOrder::Quadruple, BondDirection::None),
                        ':' => (BondOrder::Aromatic, BondDirection::None),
                        '/' => (BondOrder::Single, BondDirection::Up),
                        _ => (BondOrder::Single, BondDirection::Down),
                    };
                    self.pending = Some(PendingBond {
                        order: Some(order),
                        direction,
                        position,
                    });
                }
                '(' => {
                    self.chars.next();
                    if self.previous.is_none() || self.pending.is_some() {
                        return Err(ChemError::UnmatchedBranch(position));
                    }
                    self.branches.push((self.previous, position));
                }
                ')' => {
                    self.chars.next();
                    let (atom, _) = self
                        .branches
                        .pop()
                        .ok_or(ChemError::UnmatchedBranch(position))?;
                    if self.pending.is_some() {
                        return Err(ChemError::DanglingBond(position));
                    }
                    self.previous = atom;
                }
                '.' => {
                    self.chars.next();
                    if self.pending.is_some() {
                        return Err(ChemError::DanglingBond(position));
                    }
                    self.previous = None;
                }
                '0'..='9' => {
                    self.chars.next();
                    let number = ch.to_digit(10).unwrap_or_default();
                    self.ring_closure(number, ch, position)?;
                }
                '%' => {
                    self.chars.next();
                    let tens = self.next_digit(position)?;
                    let ones = self.next_digit(position)?;
                    self.ring_closure(tens * 10 + ones, ch, position)?;
                }
                '[' => {
                    self.chars.next();
                    let atom = self.bracket_atom(position)?;
                    self.add_atom(atom);
                }
                _ => {
                    let atom = self.organic_atom(ch, position)?;
                    self.add_atom(atom);
                }
            }
        }

        if let Some(&(_, position)) = self.branches.last() {
            return Err(ChemError::UnmatchedBranch(position));
        }
        if let Some(pending) = self.pending {
            return Err(ChemError::DanglingBond(pending.position));
        }
        if let Some(&ring) = self.rings.keys().min() {
            return Err(ChemError::UnclosedRing(ring));
        }
        Ok((self.atoms, self.bonds))
    }

    fn implicit_order(&self, a: usize, b: usize) -> BondOrder {
        if self.atoms[a].written_aromatic && self.atoms[b].written_aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn add_atom(&mut self, atom: Atom) {
        let idx = self.atoms.len();
        self.atoms.push(atom);
        if let Some(previous) = self.previous {
            let pending = self.pending.take().unwrap_or_default();
            let order = pending
                .order
                .unwrap_or_else(|| self.implicit_order(previous, idx));
            let mut bond = Bond::new(previous, idx, order);
            bond.direction = pending.direction;
            self.bonds.push(bond);
        }
        self.previous = Some(idx);
    }

    fn ring_closure(&mut self, number: u32, ch: char, position: usize) -> Result<(), ChemError> {
        let Some(current) = self.previous else {
            return Err(ChemError::UnexpectedCharacter { ch, position });
        };
        let pending = self.pending.take().unwrap_or_default();

        let Some(opening) = self.rings.remove(&number) else {
            self.rings.insert(
                number,
                RingOpening {
                    atom: current,
                    order: pending.order,
                    direction: pending.direction,
                },
            );
            return Ok(());
        };

        let order = match (opening.order, pending.order) {
            (Some(a), Some(b)) if a != b => return Err(ChemError::RingBondConflict(number)),
            (Some(order), _) | (None, Some(order)) => order,
            (None, None) => self.implicit_order(opening.atom, current),
        };
        // a mark at the closing digit points from the closing atom back to the opener
        let direction = match opening.direction {
            BondDirection::None => pending.direction.flip(),
            written => written,
        };
        let mut bond = Bond::new(opening.atom, current, order);
        bond.direction = direction;
        self.bonds.push(bond);
        Ok(())
    }

    fn next_digit(&mut self, start: usize) -> Result<u32, ChemError> {
        match self.chars.next() {
            Some((_, c)) if c.is_ascii_digit() => Ok(c.to_digit(10).unwrap_or_default()),
            Some((position, ch)) => Err(ChemError::UnexpectedCharacter { ch, position }),
            None => Err(ChemError::UnexpectedCharacter {
                ch: '%',
                position: start,
            }),
        }
    }

    fn organic_atom(&mut self, ch: char, position: usize) -> Result<Atom, ChemError> {
        self.chars.next();
        let (atomic_number, aromatic) = match ch {
            'B' if self.consume_if('r') => (35, false),
            'C' if self.consume_if('l') => (17, false),
            'B' => (5, false),
            'C' => (6, false),
            'N' => (7, false),
            'O' => (8, false),
            'P' => (15, false),
            'S' => (16, false),
            'F' => (9, false),
            'I' => (53, false),
            'b' => (5, true),
            'c' => (6, true),
            'n' => (7, true),
            'o' => (8, true),
            'p' => (15, true),
            's' => (16, true),
            '*' => (0, false),
            _ => return Err(ChemError::UnexpectedCharacter { ch, position }),
        };
        let mut atom = Atom::new(atomic_number);
        atom.written_aromatic = aromatic;
        Ok(atom)
    }

    fn bracket_atom(&mut self, start: usize) -> Result<Atom, ChemError> {
        let isotope = self.read_number();
        let (atomic_number, aromatic) = self.bracket_symbol(start)?;
        let chirality = self.read_chirality();
        let explicit_hydrogens = if self.consume_if('H') {
            self.read_number().unwrap_or(1)
        } else {
            0
        };
        let charge = self.read_charge();
        let atom_class = if self.consume_if(':') {
            self.read_number()
        } else {
            None
        };
        match self.chars.next() {
            Some((_, ']')) => {}
            Some((position, ch)) => return Err(ChemError::UnexpectedCharacter { ch, position }),
            None => return Err(ChemError::UnterminatedBracket(start)),
        }

        let mut atom = Atom::new(atomic_number);
        atom.isotope = isotope.map(|i| i as u16);
        atom.chirality = chirality;
        atom.explicit_hydrogens = explicit_hydrogens.min(u8::MAX as u32) as u8;
        atom.charge = charge;
        atom.atom_class = atom_class;
        atom.bracket = true;
        atom.written_aromatic = aromatic;
        Ok(atom)
    }

    fn bracket_symbol(&mut self, start: usize) -> Result<(u8, bool), ChemError> {
        let Some((_, first)) = self.chars.next() else {
            return Err(ChemError::UnterminatedBracket(start));
        };
        if first == '*' {
            return Ok((0, false));
        }
        if first.is_ascii_lowercase() {
            let two_letter = match (first, self.chars.peek().map(|&(_, c)| c)) {
                ('s', Some('e')) => Some(34),
                ('a', Some('s')) => Some(33),
                ('t', Some('e')) => Some(52),
                _ => None,
            };
            if let Some(z) = two_letter {
                self.chars.next();
                return Ok((z, true));
            }
            return match first {
                'b' => Ok((5, true)),
                'c' => Ok((6, true)),
                'n' => Ok((7, true)),
                'o' => Ok((8, true)),
                'p' => Ok((15, true)),
                's' => Ok((16, true)),
                _ => Err(ChemError::UnknownElement(first.to_string())),
            };
        }
        if let Some(&(_, second)) = self.chars.peek() {
            if second.is_ascii_lowercase() {
                let symbol = format!("{first}{second}");
                if let Some(z) = atomic_number(&symbol) {
                    self.chars.next();
                    return Ok((z, false));
                }
            }
        }
        atomic_number(&first.to_string())
            .map(|z| (z, false))
            .ok_or_else(|| ChemError::UnknownElement(first.to_string()))
    }

    fn read_chirality(&mut self) -> ChiralTag {
        if !self.consume_if('@') {
            return ChiralTag::Unspecified;
        }
        if self.consume_if('@') {
            return ChiralTag::TetrahedralCw;
        }
        // @TH1, @TH2, @SP1, @TB5, @OH12, @AL1
        let class_start = matches!(self.chars.peek(), Some((_, 'T' | 'S' | 'O' | 'A')));
        if !class_start {
            return ChiralTag::TetrahedralCcw;
        }
        let mut class = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if class.len() < 2 && c.is_ascii_uppercase() {
                class.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        let number = self.read_number();
        match (class.as_str(), number) {
            ("TH", Some(1)) => ChiralTag::TetrahedralCcw,
            ("TH", Some(2)) => ChiralTag::TetrahedralCw,
            _ => ChiralTag::Other,
        }
    }

    fn read_charge(&mut self) -> i8 {
        let sign = match self.chars.peek() {
            Some((_, '+')) => 1,
            Some((_, '-')) => -1,
            _ => return 0,
        };
        let symbol = if sign > 0 { '+' } else { '-' };
        self.chars.next();
        if let Some(magnitude) = self.read_number() {
            return sign * magnitude.min(i8::MAX as u32) as i8;
        }
        // '++' style
        let mut magnitude = 1;
        while self.consume_if(symbol) {
            magnitude += 1;
        }
        sign * magnitude
    }

    fn read_number(&mut self) -> Option<u32> {
        let mut value: Option<u32> = None;
        while let Some(&(_, c)) = self.chars.peek() {
            let Some(digit) = c.to_digit(10) else {
                break;
            };
            value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(digit));
            self.chars.next();
        }
        value
    }

    fn consume_if(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }
}

/// Remove `[H]` atoms hanging off a single heavy atom and count them on
/// that atom instead. Isotopic or charged hydrogens and H2 stay explicit.
fn fold_hydrogens(mut atoms: Vec<Atom>, bonds: Vec<Bond>) -> (Vec<Atom>, Vec<Bond>) {
    let mut attached: Vec<Vec<usize>> = vec![Vec::new(); atoms.len()];
    for (idx, bond) in bonds.iter().enumerate() {
        attached[bond.begin].push(idx);
        attached[bond.end].push(idx);
    }

    let removable: Vec<bool> = atoms
        .iter()
        .enumerate()
        .map(|(idx, atom)| {
            if atom.atomic_number != 1 || atom.isotope.is_some() || atom.charge != 0 {
                return false;
            }
            let [bond] = attached[idx][..] else {
                return false;
            };
            let heavy = bonds[bond].other(idx);
            atoms[heavy].atomic_number != 1 && bonds[bond].order == BondOrder::Single
        })
        .collect();

    if !removable.iter().any(|&r| r) {
        return (atoms, bonds);
    }

    for idx in (0..atoms.len()).filter(|&i| removable[i]) {
        let heavy = bonds[attached[idx][0]].other(idx);
        atoms[heavy].explicit_hydrogens = atoms[heavy].explicit_hydrogens.saturating_add(1);
    }

    let mut new_index = vec![None; atoms.len()];
    let mut kept_atoms = Vec::with_capacity(atoms.len());
    for (idx, atom) in atoms.into_iter().enumerate() {
        if !removable[idx] {
            new_index[idx] = Some(kept_atoms.len());
            kept_atoms.push(atom);
        }
    }
    let kept_bonds = bonds
        .into_iter()
        .filter_map(|mut bond| {
            let begin = new_index[bond.begin]?;
            let end = new_index[bond.end]?;
            bond.begin = begin;
            bond.end = end;
            Some(bond)
        })
        .collect();
    (kept_atoms, kept_bonds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::molecule::BondStereo;

    #[test]
    fn test_organic_subset() {
        let mol = parse_smiles("ClCCBr").unwrap();
        let symbols: Vec<&str> = mol.atoms().iter().map(|a| a.symbol()).collect();
        assert_eq!(symbols, vec!["Cl", "C", "C", "Br"]);
        assert_eq!(mol.bond_count(), 3);
    }

    #[test]
    fn test_branches_and_rings() {
        // aspirin
        let mol = parse_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        assert_eq!(mol.atom_count(), 13);
        assert_eq!(mol.bond_count(), 13);
        assert_eq!(mol.rings().len(), 1);
        let carbonyl = mol.bond_between(1, 2).unwrap();
        assert_eq!(mol.bond(carbonyl).order, BondOrder::Double);
    }

    #[test]
    fn test_percent_ring_closure() {
        let a = parse_smiles("C%10CCCCC%10").unwrap();
        let b = parse_smiles("C1CCCCC1").unwrap();
        assert_eq!(a.bond_count(), b.bond_count());
        assert_eq!(a.rings(), b.rings());
    }

    #[test]
    fn test_bracket_atoms() {
        let mol = parse_smiles("[13CH3][N+](C)(C)C.[Cl-]").unwrap();
        let carbon = mol.atom(0);
        assert_eq!(carbon.isotope, Some(13));
        assert_eq!(carbon.explicit_hydrogens, 3);
        assert_eq!(mol.atom(1).charge, 1);
        assert_eq!(mol.atom(5).charge, -1);
        assert_eq!(mol.atom(5).symbol(), "Cl");

        let mol = parse_smiles("[Fe++]").unwrap();
        assert_eq!(mol.atom(0).charge, 2);
        let mol = parse_smiles("[O-2]").unwrap();
        assert_eq!(mol.atom(0).charge, -2);
        let mol = parse_smiles("[CH3:7]C").unwrap();
        assert_eq!(mol.atom(0).atom_class, Some(7));
    }

    #[test]
    fn test_two_letter_bracket_symbols() {
        let mol = parse_smiles("[Se]1C=CC=C1").unwrap();
        assert_eq!(mol.atom(0).symbol(), "Se");
        let mol = parse_smiles("[se]1cccc1").unwrap();
        assert_eq!(mol.atom(0).symbol(), "Se");
        assert!(mol.atom(0).aromatic);
        let mol = parse_smiles("[Cu+2]").unwrap();
        assert_eq!(mol.atom(0).atomic_number, 29);
    }

    #[test]
    fn test_chirality() {
        let mol = parse_smiles("N[C@@H](C)C(=O)O").unwrap();
        assert_eq!(mol.atom(1).chirality, ChiralTag::TetrahedralCw);
        let mol = parse_smiles("N[C@H](C)C(=O)O").unwrap();
        assert_eq!(mol.atom(1).chirality, ChiralTag::TetrahedralCcw);
        let mol = parse_smiles("N[C@TH2H](C)C(=O)O").unwrap();
        assert_eq!(mol.atom(1).chirality, ChiralTag::TetrahedralCw);
        assert_eq!(mol.atom(1).explicit_hydrogens, 1);
    }

    #[test]
    fn test_explicit_hydrogens_are_folded() {
        let mol = parse_smiles("[H]C([H])([H])O").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.atom(0).total_hydrogens(), 3);
        assert_eq!(mol.degree(0), 1);

        // molecular hydrogen keeps both atoms
        let mol = parse_smiles("[H][H]").unwrap();
        assert_eq!(mol.atom_count(), 2);
        // deuterium is kept
        let mol = parse_smiles("[2H]C").unwrap();
        assert_eq!(mol.atom_count(), 2);
    }

    #[test]
    fn test_name_after_whitespace() {
        let mol = parse_smiles("CCO ethanol").unwrap();
        assert_eq!(mol.atom_count(), 3);
    }

    #[test]
    fn test_directional_bonds() {
        let mol = parse_smiles("F/C=C/F").unwrap();
        let double = mol.bond_between(1, 2).unwrap();
        assert_eq!(mol.bond(double).stereo, BondStereo::E);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_smiles(""), Err(ChemError::Empty)));
        assert!(matches!(parse_smiles("   "), Err(ChemError::Empty)));
        assert!(matches!(parse_smiles("C1CC"), Err(ChemError::UnclosedRing(1))));
        assert!(matches!(parse_smiles("CC)C"), Err(ChemError::UnmatchedBranch(2))));
        assert!(matches!(parse_smiles("C(CC"), Err(ChemError::UnmatchedBranch(1))));
        assert!(matches!(parse_smiles("CC="), Err(ChemError::DanglingBond(2))));
        assert!(matches!(
            parse_smiles("C?C"),
            Err(ChemError::UnexpectedCharacter { ch: '?', position: 1 })
        ));
        assert!(matches!(parse_smiles("[Xx]"), Err(ChemError::UnknownElement(_))));
        assert!(matches!(parse_smiles("[CH3"), Err(ChemError::UnterminatedBracket(0))));
        assert!(matches!(parse_smiles("C=1CC-1"), Err(ChemError::RingBondConflict(1))));
        assert!(matches!(parse_smiles("C11"), Err(ChemError::SelfBond(0))));
        assert!(matches!(parse_smiles("C1C1"), Err(ChemError::DuplicateBond(_, _))));
    }
}
