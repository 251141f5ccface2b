use std::fmt::{Debug, Formatter};

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

pub const UTF8_X: u8 = 88;

/// Marks a byte that is not part of an alphabet in the lookup table.
const NOT_IN_ALPHABET: u8 = 255;

pub const AMINO_ALPHABET: [&str; 20] = [
    "A", "C", "D", "E", "F", "G", "H", "I", "K", "L", "M", "N", "P", "Q", "R", "S", "T", "V", "W",
    "Y",
];

pub const AMINO_SYMBOLS: &[u8; 20] = b"ACDEFGHIKLMNPQRSTVWY";

pub const AMINO_ALPHABET_SIZE: usize = 20;

pub const UTF8_TO_DIGITAL_AMINO: phf::Map<u8, u8> = phf_map! {
    // upper case
    65u8 => 0,    // A
    67u8 => 1,    // C
    68u8 => 2,    // D
    69u8 => 3,    // E
    70u8 => 4,    // F
    71u8 => 5,    // G
    72u8 => 6,    // H
    73u8 => 7,    // I
    75u8 => 8,    // K
    76u8 => 9,    // L
    77u8 => 10,   // M
    78u8 => 11,   // N
    80u8 => 12,   // P
    81u8 => 13,   // Q
    82u8 => 14,   // R
    83u8 => 15,   // S
    84u8 => 16,   // T
    86u8 => 17,   // V
    87u8 => 18,   // W
    89u8 => 19,   // Y
    // lower case
    97u8 => 0,    // a
    99u8 => 1,    // c
    100u8 => 2,   // d
    101u8 => 3,   // e
    102u8 => 4,   // f
    103u8 => 5,   // g
    104u8 => 6,   // h
    105u8 => 7,   // i
    107u8 => 8,   // k
    108u8 => 9,   // l
    109u8 => 10,  // m
    110u8 => 11,  // n
    112u8 => 12,  // p
    113u8 => 13,  // q
    114u8 => 14,  // r
    115u8 => 15,  // s
    116u8 => 16,  // t
    118u8 => 17,  // v
    119u8 => 18,  // w
    121u8 => 19,  // y
};

/// An ordered set of sequence symbols.
///
/// The position of a symbol in the alphabet is the row/column index used by every
/// table that is keyed on this alphabet (substitution matrices, group maps, scales).
/// Lookups are case-insensitive for ASCII letters.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alphabet {
    symbols: Vec<u8>,
    lookup: [u8; 256],
}

impl Alphabet {
    pub fn new(symbols: &[u8]) -> anyhow::Result<Self> {
        if symbols.is_empty() {
            return Err(ConfigurationError::new("alphabet has no symbols").into());
        }

        if symbols.len() >= NOT_IN_ALPHABET as usize {
            return Err(ConfigurationError::new(format!(
                "alphabet has too many symbols: {}",
                symbols.len()
            ))
            .into());
        }

        let mut lookup = [NOT_IN_ALPHABET; 256];
        for (idx, &symbol) in symbols.iter().enumerate() {
            let upper = symbol.to_ascii_uppercase();
            let lower = symbol.to_ascii_lowercase();

            if lookup[upper as usize] != NOT_IN_ALPHABET {
                return Err(ConfigurationError::new(format!(
                    "duplicate alphabet symbol: {}",
                    char::from(symbol)
                ))
                .into());
            }

            lookup[upper as usize] = idx as u8;
            lookup[lower as usize] = idx as u8;
        }

        Ok(Self {
            symbols: symbols.to_vec(),
            lookup,
        })
    }

    /// The 20 standard amino acids, in "ACDEFGHIKLMNPQRSTVWY" order.
    pub fn amino() -> Self {
        let mut lookup = [NOT_IN_ALPHABET; 256];
        UTF8_TO_DIGITAL_AMINO
            .entries()
            .for_each(|(&utf8, &digital)| lookup[utf8 as usize] = digital);

        Self {
            symbols: AMINO_SYMBOLS.to_vec(),
            lookup,
        }
    }

    #[inline(always)]
    pub fn index_of(&self, byte: u8) -> Option<usize> {
        match self.lookup[byte as usize] {
            NOT_IN_ALPHABET => None,
            idx => Some(idx as usize),
        }
    }

    pub fn contains(&self, byte: u8) -> bool {
        self.index_of(byte).is_some()
    }

    pub fn symbol(&self, idx: usize) -> Option<u8> {
        self.symbols.get(idx).copied()
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::amino()
    }
}

impl Debug for Alphabet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Alphabet({})", String::from_utf8_lossy(&self.symbols))
    }
}

impl TryFrom<String> for Alphabet {
    type Error = anyhow::Error;

    fn try_from(symbols: String) -> Result<Self, Self::Error> {
        Self::new(symbols.as_bytes())
    }
}

impl From<Alphabet> for String {
    fn from(alphabet: Alphabet) -> Self {
        String::from_utf8_lossy(&alphabet.symbols).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_amino_indices_follow_symbol_order() {
        let alphabet = Alphabet::amino();
        for (idx, symbol) in AMINO_ALPHABET.iter().enumerate() {
            let byte = symbol.as_bytes()[0];
            check!(alphabet.index_of(byte) == Some(idx));
            check!(alphabet.index_of(byte.to_ascii_lowercase()) == Some(idx));
            check!(alphabet.symbol(idx) == Some(byte));
        }
    }

    #[test]
    fn test_amino_excludes_degenerate_codes() {
        let alphabet = Alphabet::amino();
        for &byte in b"BJOUXZbjouxz*-~ " {
            check!(alphabet.index_of(byte).is_none());
        }
    }

    #[test]
    fn test_custom_alphabet_order() {
        let alphabet = Alphabet::new(b"ARNDCQEGHILKMFPSTWYV").unwrap();
        check!(alphabet.index_of(b'R') == Some(1));
        check!(alphabet.index_of(b'v') == Some(19));
        check!(alphabet.len() == 20);
    }

    #[test]
    fn test_invalid_alphabets() {
        let empty = Alphabet::new(b"").unwrap_err();
        check!(empty.downcast_ref::<ConfigurationError>().is_some());

        let duplicate = Alphabet::new(b"ACa").unwrap_err();
        check!(duplicate.downcast_ref::<ConfigurationError>().is_some());
    }
}
