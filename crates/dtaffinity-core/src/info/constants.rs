//! # Constants
//!
//! Residue and element tables shared by the structure reader and the
//! SMILES sanitizer.
//!
//! ## Residues
//! - [`aa3to1`] - three letter residue names to one letter codes, using the
//!   extended protein alphabet (`SEC`, `PYL`, `ASX`, `GLX`, ...)
//!
//! ## Elements
//! - [`atomic_number`] / [`element_symbol`] - periodic table lookups
//! - `default_valences` / `max_valence` - valence rules used for implicit
//!   hydrogens and sanity checks on parsed molecules
//!

#[rustfmt::skip]
/// Convert a three letter residue name to its one letter code.
///
/// Matching is case insensitive. Unknown names map to `X`.
pub fn aa3to1(aa: &str) -> char {
    match aa.to_ascii_uppercase().as_str() {
        "ALA" => 'A', "CYS" => 'C', "ASP" => 'D',
        "GLU" => 'E', "PHE" => 'F', "GLY" => 'G',
        "HIS" => 'H', "ILE" => 'I', "LYS" => 'K',
        "LEU" => 'L', "MET" => 'M', "ASN" => 'N',
        "PRO" => 'P', "GLN" => 'Q', "ARG" => 'R',
        "SER" => 'S', "THR" => 'T', "VAL" => 'V',
        "TRP" => 'W', "TYR" => 'Y',
        // extended alphabet
        "ASX" => 'B', "GLX" => 'Z', "XAA" => 'X',
        "XLE" => 'J', "SEC" => 'U', "PYL" => 'O',
        "TER" => '*',
        _     => 'X',
    }
}

pub(crate) const ELEMENT_LIST: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Atomic number for an element symbol with canonical capitalization (`Cl`, not `CL`).
pub fn atomic_number(symbol: &str) -> Option<u8> {
    ELEMENT_LIST
        .iter()
        .position(|&s| s == symbol)
        .map(|idx| (idx + 1) as u8)
}

/// Element symbol for an atomic number. `0` and out of range values give `*`.
pub fn element_symbol(atomic_number: u8) -> &'static str {
    match atomic_number {
        0 => "*",
        n => ELEMENT_LIST.get(n as usize - 1).copied().unwrap_or("*"),
    }
}

#[rustfmt::skip]
/// Normal valences of the SMILES organic subset, in increasing order.
/// Used to derive the implicit hydrogen count of unbracketed atoms.
pub(crate) fn default_valences(atomic_number: u8) -> &'static [u8] {
    match atomic_number {
        5  => &[3],          // B
        6  => &[4],          // C
        7  => &[3, 5],       // N
        8  => &[2],          // O
        15 => &[3, 5],       // P
        16 => &[2, 4, 6],    // S
        9 | 17 | 35 | 53 => &[1],
        _  => &[],
    }
}

#[rustfmt::skip]
/// Largest valence accepted for an atom after shifting the element by its
/// formal charge (an `N+` is checked like a carbon, an `O-` like a fluorine).
///
/// Returns `None` for elements without a rule (metals and the like), which
/// are never rejected.
pub(crate) fn max_valence(atomic_number: u8, charge: i8) -> Option<u8> {
    let effective = atomic_number as i16 - charge as i16;
    // the shift only holds inside one period of the p-block
    let same_period = match atomic_number {
        5..=10 => (5..=10).contains(&effective) || effective == 4,
        13..=18 => (13..=18).contains(&effective) || effective == 12,
        31..=36 => (31..=36).contains(&effective),
        49..=54 => (49..=54).contains(&effective),
        _ => charge == 0,
    };
    if !same_period {
        return None;
    }
    match effective {
        1  => Some(1),       // H
        4  => Some(2),       // B+ behaves like Be
        5  => Some(3),       // B
        6  => Some(4),       // C
        7  => Some(3),       // N
        8  => Some(2),       // O
        9  => Some(1),       // F
        10 => Some(0),       // Ne
        12 => Some(2),
        13 => Some(3),       // Al
        14 => Some(4),       // Si
        15 => Some(5),       // P
        16 => Some(6),       // S
        17 => Some(1),       // Cl
        18 => Some(0),       // Ar
        33 => Some(5),       // As
        34 => Some(6),       // Se
        35 => Some(1),       // Br
        36 => Some(0),       // Kr
        52 => Some(6),       // Te
        53 => Some(5),       // I
        _  => None,
    }
}

#[rustfmt::skip]
/// Lowest valence after the formal charge shift. An aromatic atom whose
/// single bonds and hydrogens fall short of this still needs a double bond.
pub(crate) fn lowest_valence(atomic_number: u8, charge: i8) -> Option<u8> {
    let effective = atomic_number as i16 - charge as i16;
    match effective {
        5  => Some(3),       // B
        6  => Some(4),       // C
        7  => Some(3),       // N
        8  => Some(2),       // O
        9  => Some(1),       // F
        14 => Some(4),       // Si
        15 => Some(3),       // P
        16 => Some(2),       // S
        17 => Some(1),       // Cl
        33 => Some(3),       // As
        34 => Some(2),       // Se
        35 => Some(1),       // Br
        52 => Some(2),       // Te
        53 => Some(1),       // I
        _  => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aa3to1() {
        assert_eq!(aa3to1("ALA"), 'A');
        assert_eq!(aa3to1("Trp"), 'W');
        assert_eq!(aa3to1("sec"), 'U');
        assert_eq!(aa3to1("GLX"), 'Z');
        assert_eq!(aa3to1("HOH"), 'X');
        assert_eq!(aa3to1("MSE"), 'X');
    }

    #[test]
    fn test_element_lookup() {
        assert_eq!(atomic_number("C"), Some(6));
        assert_eq!(atomic_number("Cl"), Some(17));
        assert_eq!(atomic_number("CL"), None);
        assert_eq!(element_symbol(26), "Fe");
        assert_eq!(element_symbol(0), "*");
        assert_eq!(element_symbol(200), "*");
    }

    #[test]
    fn test_valence_shift() {
        // ammonium nitrogen is checked like carbon
        assert_eq!(max_valence(7, 1), Some(4));
        // alkoxide oxygen like fluorine
        assert_eq!(max_valence(8, -1), Some(1));
        assert_eq!(max_valence(6, 0), Some(4));
        // sodium cation has no rule
        assert_eq!(max_valence(11, 1), None);
        assert_eq!(lowest_valence(7, 1), Some(4));
        assert_eq!(lowest_valence(6, -1), Some(3));
    }
}
