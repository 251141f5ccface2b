use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::alphabet::{Alphabet, AMINO_ALPHABET_SIZE};
use crate::error::ConfigurationError;

// https://www.ncbi.nlm.nih.gov/Class/FieldGuide/BLOSUM62.txt
// rows and columns in "ACDEFGHIKLMNPQRSTVWY" order
#[rustfmt::skip]
pub const BLOSUM62_LOG_ODDS: [[i8; 20]; 20] = [
    [  4,  0, -2, -1, -2,  0, -2, -1, -1, -1, -1, -2, -1, -1, -1,  1,  0,  0, -3, -2 ], // A
    [  0,  9, -3, -4, -2, -3, -3, -1, -3, -1, -1, -3, -3, -3, -3, -1, -1, -1, -2, -2 ], // C
    [ -2, -3,  6,  2, -3, -1, -1, -3, -1, -4, -3,  1, -1,  0, -2,  0, -1, -3, -4, -3 ], // D
    [ -1, -4,  2,  5, -3, -2,  0, -3,  1, -3, -2,  0, -1,  2,  0,  0, -1, -2, -3, -2 ], // E
    [ -2, -2, -3, -3,  6, -3, -1,  0, -3,  0,  0, -3, -4, -3, -3, -2, -2, -1,  1,  3 ], // F
    [  0, -3, -1, -2, -3,  6, -2, -4, -2, -4, -3,  0, -2, -2, -2,  0, -2, -3, -2, -3 ], // G
    [ -2, -3, -1,  0, -1, -2,  8, -3, -1, -3, -2,  1, -2,  0,  0, -1, -2, -3, -2,  2 ], // H
    [ -1, -1, -3, -3,  0, -4, -3,  4, -3,  2,  1, -3, -3, -3, -3, -2, -1,  3, -3, -1 ], // I
    [ -1, -3, -1,  1, -3, -2, -1, -3,  5, -2, -1,  0, -1,  1,  2,  0, -1, -2, -3, -2 ], // K
    [ -1, -1, -4, -3,  0, -4, -3,  2, -2,  4,  2, -3, -3, -2, -2, -2, -1,  1, -2, -1 ], // L
    [ -1, -1, -3, -2,  0, -3, -2,  1, -1,  2,  5, -2, -2,  0, -1, -1, -1,  1, -1, -1 ], // M
    [ -2, -3,  1,  0, -3,  0,  1, -3,  0, -3, -2,  6, -2,  0,  0,  1,  0, -3, -4, -2 ], // N
    [ -1, -3, -1, -1, -4, -2, -2, -3, -1, -3, -2, -2,  7, -1, -2, -1, -1, -2, -4, -3 ], // P
    [ -1, -3,  0,  2, -3, -2,  0, -3,  1, -2,  0,  0, -1,  5,  1,  0, -1, -2, -2, -1 ], // Q
    [ -1, -3, -2,  0, -3, -2,  0, -3,  2, -2, -1,  0, -2,  1,  5, -1, -1, -3, -3, -2 ], // R
    [  1, -1,  0,  0, -2,  0, -1, -2,  0, -2, -1,  1, -1,  0, -1,  4,  1, -2, -3, -2 ], // S
    [  0, -1, -1, -1, -2, -2, -2, -1, -1, -1, -1,  0, -1, -1, -1,  1,  5,  0, -2, -2 ], // T
    [  0, -1, -3, -2, -1, -3, -3,  3, -2,  1,  1, -3, -2, -2, -3, -2,  0,  4, -3, -1 ], // V
    [ -3, -2, -4, -3,  1, -2, -2, -3, -3, -2, -1, -4, -4, -2, -3, -3, -2, -3, 11,  2 ], // W
    [ -2, -2, -3, -2,  3, -3,  2, -1, -2, -1, -1, -2, -3, -1, -2, -2, -2, -1,  2,  7 ], // Y
];

// ftp://ftp.ncbi.nih.gov/repository/blocks/unix/blosum/BLOSUM/blosum62.qij
// the target frequencies q_ij, re-ordered to "ACDEFGHIKLMNPQRSTVWY"
#[rustfmt::skip]
pub const BLOSUM62_QIJ: [[f64; 20]; 20] = [
    [ 0.0215, 0.0016, 0.0022, 0.0030, 0.0016, 0.0058, 0.0011, 0.0032, 0.0033, 0.0044, 0.0013, 0.0019, 0.0022, 0.0019, 0.0023, 0.0063, 0.0037, 0.0051, 0.0004, 0.0013 ], // A
    [ 0.0016, 0.0119, 0.0004, 0.0004, 0.0005, 0.0008, 0.0002, 0.0011, 0.0005, 0.0016, 0.0004, 0.0004, 0.0004, 0.0003, 0.0004, 0.0010, 0.0009, 0.0014, 0.0001, 0.0003 ], // C
    [ 0.0022, 0.0004, 0.0213, 0.0049, 0.0008, 0.0025, 0.0010, 0.0012, 0.0024, 0.0015, 0.0005, 0.0037, 0.0012, 0.0016, 0.0016, 0.0028, 0.0019, 0.0013, 0.0002, 0.0006 ], // D
    [ 0.0030, 0.0004, 0.0049, 0.0161, 0.0009, 0.0019, 0.0014, 0.0012, 0.0041, 0.0020, 0.0007, 0.0022, 0.0014, 0.0035, 0.0027, 0.0030, 0.0020, 0.0017, 0.0003, 0.0009 ], // E
    [ 0.0016, 0.0005, 0.0008, 0.0009, 0.0183, 0.0012, 0.0008, 0.0030, 0.0009, 0.0054, 0.0012, 0.0008, 0.0005, 0.0005, 0.0009, 0.0012, 0.0012, 0.0026, 0.0008, 0.0042 ], // F
    [ 0.0058, 0.0008, 0.0025, 0.0019, 0.0012, 0.0378, 0.0010, 0.0014, 0.0025, 0.0021, 0.0007, 0.0029, 0.0014, 0.0014, 0.0017, 0.0038, 0.0022, 0.0018, 0.0004, 0.0008 ], // G
    [ 0.0011, 0.0002, 0.0010, 0.0014, 0.0008, 0.0010, 0.0093, 0.0006, 0.0012, 0.0010, 0.0004, 0.0014, 0.0005, 0.0010, 0.0012, 0.0011, 0.0007, 0.0006, 0.0002, 0.0015 ], // H
    [ 0.0032, 0.0011, 0.0012, 0.0012, 0.0030, 0.0014, 0.0006, 0.0184, 0.0016, 0.0114, 0.0025, 0.0010, 0.0010, 0.0009, 0.0012, 0.0017, 0.0027, 0.0120, 0.0004, 0.0014 ], // I
    [ 0.0033, 0.0005, 0.0024, 0.0041, 0.0009, 0.0025, 0.0012, 0.0016, 0.0161, 0.0025, 0.0009, 0.0024, 0.0016, 0.0031, 0.0062, 0.0031, 0.0023, 0.0019, 0.0003, 0.0010 ], // K
    [ 0.0044, 0.0016, 0.0015, 0.0020, 0.0054, 0.0021, 0.0010, 0.0114, 0.0025, 0.0371, 0.0049, 0.0014, 0.0014, 0.0016, 0.0024, 0.0024, 0.0033, 0.0095, 0.0007, 0.0022 ], // L
    [ 0.0013, 0.0004, 0.0005, 0.0007, 0.0012, 0.0007, 0.0004, 0.0025, 0.0009, 0.0049, 0.0040, 0.0005, 0.0004, 0.0007, 0.0008, 0.0009, 0.0010, 0.0023, 0.0002, 0.0006 ], // M
    [ 0.0019, 0.0004, 0.0037, 0.0022, 0.0008, 0.0029, 0.0014, 0.0010, 0.0024, 0.0014, 0.0005, 0.0141, 0.0009, 0.0015, 0.0020, 0.0031, 0.0022, 0.0012, 0.0002, 0.0007 ], // N
    [ 0.0022, 0.0004, 0.0012, 0.0014, 0.0005, 0.0014, 0.0005, 0.0010, 0.0016, 0.0014, 0.0004, 0.0009, 0.0191, 0.0008, 0.0010, 0.0017, 0.0014, 0.0012, 0.0001, 0.0005 ], // P
    [ 0.0019, 0.0003, 0.0016, 0.0035, 0.0005, 0.0014, 0.0010, 0.0009, 0.0031, 0.0016, 0.0007, 0.0015, 0.0008, 0.0073, 0.0025, 0.0019, 0.0014, 0.0012, 0.0002, 0.0007 ], // Q
    [ 0.0023, 0.0004, 0.0016, 0.0027, 0.0009, 0.0017, 0.0012, 0.0012, 0.0062, 0.0024, 0.0008, 0.0020, 0.0010, 0.0025, 0.0178, 0.0023, 0.0018, 0.0016, 0.0003, 0.0009 ], // R
    [ 0.0063, 0.0010, 0.0028, 0.0030, 0.0012, 0.0038, 0.0011, 0.0017, 0.0031, 0.0024, 0.0009, 0.0031, 0.0017, 0.0019, 0.0023, 0.0126, 0.0047, 0.0024, 0.0003, 0.0010 ], // S
    [ 0.0037, 0.0009, 0.0019, 0.0020, 0.0012, 0.0022, 0.0007, 0.0027, 0.0023, 0.0033, 0.0010, 0.0022, 0.0014, 0.0014, 0.0018, 0.0047, 0.0125, 0.0036, 0.0003, 0.0009 ], // T
    [ 0.0051, 0.0014, 0.0013, 0.0017, 0.0026, 0.0018, 0.0006, 0.0120, 0.0019, 0.0095, 0.0023, 0.0012, 0.0012, 0.0012, 0.0016, 0.0024, 0.0036, 0.0196, 0.0004, 0.0015 ], // V
    [ 0.0004, 0.0001, 0.0002, 0.0003, 0.0008, 0.0004, 0.0002, 0.0004, 0.0003, 0.0007, 0.0002, 0.0002, 0.0001, 0.0002, 0.0003, 0.0003, 0.0003, 0.0004, 0.0065, 0.0009 ], // W
    [ 0.0013, 0.0003, 0.0006, 0.0009, 0.0042, 0.0008, 0.0015, 0.0014, 0.0010, 0.0022, 0.0006, 0.0007, 0.0005, 0.0007, 0.0009, 0.0010, 0.0009, 0.0015, 0.0009, 0.0102 ], // Y
];

lazy_static! {
    pub static ref BLOSUM62: SubstitutionMatrix = SubstitutionMatrix::from_amino_table(
        &BLOSUM62_LOG_ODDS.map(|row| row.map(f64::from))
    );
    pub static ref BLOSUM62_TARGET_FREQUENCIES: SubstitutionMatrix =
        SubstitutionMatrix::from_amino_table(&BLOSUM62_QIJ);
}

/// A symmetric |A|x|A| table of pairwise substitution values.
///
/// Depending on the table this holds either log-odds scores or joint
/// substitution probabilities; the row sums of the latter are the
/// background probabilities of each symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionMatrix {
    pub alphabet: Alphabet,
    values: Vec<Vec<f64>>,
    row_sums: Vec<f64>,
}

impl SubstitutionMatrix {
    const SYMMETRY_TOLERANCE: f64 = 1e-9;

    pub fn new(alphabet: Alphabet, values: Vec<Vec<f64>>) -> anyhow::Result<Self> {
        let size = alphabet.len();

        if values.len() != size || values.iter().any(|row| row.len() != size) {
            return Err(ConfigurationError::new(format!(
                "substitution matrix must be {size}x{size} to match the alphabet"
            ))
            .into());
        }

        for i in 0..size {
            for j in (i + 1)..size {
                if (values[i][j] - values[j][i]).abs() > Self::SYMMETRY_TOLERANCE {
                    return Err(ConfigurationError::new(format!(
                        "substitution matrix is not symmetric at ({i}, {j})"
                    ))
                    .into());
                }
            }
        }

        let row_sums = values.iter().map(|row| row.iter().sum()).collect();

        Ok(Self {
            alphabet,
            values,
            row_sums,
        })
    }

    fn from_amino_table(table: &[[f64; AMINO_ALPHABET_SIZE]; AMINO_ALPHABET_SIZE]) -> Self {
        let values: Vec<Vec<f64>> = table.iter().map(|row| row.to_vec()).collect();
        let row_sums = values.iter().map(|row| row.iter().sum()).collect();
        Self {
            alphabet: Alphabet::amino(),
            values,
            row_sums,
        }
    }

    #[inline(always)]
    pub fn value(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// Look up two raw symbols; `None` if either is outside the alphabet.
    pub fn value_of(&self, a: u8, b: u8) -> Option<f64> {
        let i = self.alphabet.index_of(a)?;
        let j = self.alphabet.index_of(b)?;
        Some(self.values[i][j])
    }

    /// The sum of row `i`, i.e. Q\[i\] when the table holds q_ij.
    #[inline(always)]
    pub fn row_sum(&self, i: usize) -> f64 {
        self.row_sums[i]
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_blosum62_tables_are_symmetric() {
        for i in 0..AMINO_ALPHABET_SIZE {
            for j in 0..AMINO_ALPHABET_SIZE {
                check!(BLOSUM62_LOG_ODDS[i][j] == BLOSUM62_LOG_ODDS[j][i]);
                check!(BLOSUM62_QIJ[i][j] == BLOSUM62_QIJ[j][i]);
            }
        }
    }

    #[test]
    fn test_blosum62_known_values() {
        check!(BLOSUM62.value_of(b'W', b'W') == Some(11.0));
        check!(BLOSUM62.value_of(b'A', b'S') == Some(1.0));
        check!(BLOSUM62.value_of(b'A', b'X').is_none());
        check!(BLOSUM62_TARGET_FREQUENCIES.value_of(b'R', b'R') == Some(0.0178));
    }

    #[test]
    fn test_target_frequencies_sum_to_one() {
        let total: f64 = (0..AMINO_ALPHABET_SIZE)
            .map(|i| BLOSUM62_TARGET_FREQUENCIES.row_sum(i))
            .sum();
        check!((total - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_new_rejects_bad_tables() {
        let alphabet = Alphabet::new(b"AB").unwrap();

        let wrong_size = SubstitutionMatrix::new(alphabet.clone(), vec![vec![1.0; 3]; 2]);
        check!(wrong_size.is_err());

        let asymmetric =
            SubstitutionMatrix::new(alphabet.clone(), vec![vec![1.0, 2.0], vec![3.0, 1.0]]);
        check!(asymmetric.is_err());

        let ok = SubstitutionMatrix::new(alphabet, vec![vec![1.0, 2.0], vec![2.0, 1.0]]).unwrap();
        check!(ok.row_sum(0) == 3.0);
    }
}
