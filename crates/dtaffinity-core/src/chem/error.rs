use thiserror::Error;

/// Errors raised while parsing or sanitizing a SMILES string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChemError {
    #[error("empty SMILES")]
    Empty,

    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("unknown element '{0}'")]
    UnknownElement(String),

    #[error("unterminated bracket atom starting at position {0}")]
    UnterminatedBracket(usize),

    #[error("unmatched branch at position {0}")]
    UnmatchedBranch(usize),

    #[error("bond at position {0} is not attached to an atom")]
    DanglingBond(usize),

    #[error("ring closure {0} was never closed")]
    UnclosedRing(u32),

    #[error("ring closure {0} has conflicting bond orders")]
    RingBondConflict(u32),

    #[error("atom {0} is bonded to itself")]
    SelfBond(usize),

    #[error("atoms {0} and {1} are bonded twice")]
    DuplicateBond(usize, usize),

    #[error("non-ring atom {0} marked aromatic")]
    NonRingAromatic(usize),

    #[error("can't kekulize molecule: {0}")]
    Kekulize(String),

    #[error("explicit valence {valence} for atom {atom} ({symbol}) is greater than permitted")]
    Valence {
        atom: usize,
        symbol: &'static str,
        valence: usize,
    },
}
