//! One-hot target sequences for the CNN encoder.
use candle_core::{Device, Result, Tensor};

/// Sorted symbol order of the one-hot rows. `?` stands for anything else
/// and for padding.
pub const PROTEIN_ALPHABET: [char; 26] = [
    '?', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];
pub const MAX_SEQ_PROTEIN: usize = 1000;

/// A target sequence mapped onto [`PROTEIN_ALPHABET`], padded or truncated
/// to [`MAX_SEQ_PROTEIN`] positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProteinEncoding {
    indices: Vec<u32>,
    unknown: usize,
    truncated: usize,
}

impl ProteinEncoding {
    pub fn new(sequence: &str) -> Self {
        let mut unknown = 0;
        let mut indices: Vec<u32> = sequence
            .chars()
            .map(|c| c.to_ascii_uppercase())
            .map(|c| match PROTEIN_ALPHABET.iter().position(|&a| a == c) {
                Some(idx) => idx as u32,
                None => {
                    unknown += 1;
                    0
                }
            })
            .collect();
        let truncated = indices.len().saturating_sub(MAX_SEQ_PROTEIN);
        indices.resize(MAX_SEQ_PROTEIN, 0);

        if unknown > 0 {
            tracing::debug!("{unknown} residues outside the protein alphabet encoded as '?'");
        }
        if truncated > 0 {
            tracing::warn!(
                "Target sequence truncated to {MAX_SEQ_PROTEIN} residues ({truncated} dropped)"
            );
        }
        Self {
            indices,
            unknown,
            truncated,
        }
    }

    /// Alphabet index of each position.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
    /// The encoded sequence, padding included.
    pub fn symbols(&self) -> String {
        self.indices
            .iter()
            .map(|&i| PROTEIN_ALPHABET[i as usize])
            .collect()
    }
    /// Letters replaced by `?`.
    pub fn unknown(&self) -> usize {
        self.unknown
    }
    /// Residues cut off the end.
    pub fn truncated(&self) -> usize {
        self.truncated
    }

    /// One-hot tensor of shape `[26, MAX_SEQ_PROTEIN]`, one column per position.
    pub fn to_tensor(&self, device: &Device) -> Result<Tensor> {
        let mut data = vec![0f32; PROTEIN_ALPHABET.len() * MAX_SEQ_PROTEIN];
        for (position, &symbol) in self.indices.iter().enumerate() {
            data[symbol as usize * MAX_SEQ_PROTEIN + position] = 1.0;
        }
        Tensor::from_vec(data, (PROTEIN_ALPHABET.len(), MAX_SEQ_PROTEIN), device)
    }
}
