use std::fmt;
use std::fmt::Formatter;

use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::error::DimensionMismatchError;
use crate::structs::Label;
use crate::util::{logistic, VecMath};

/// A position-specific scoring matrix.
///
/// Each of the `length` positions holds one log-odds score per alphabet symbol:
/// ln(foreground probability / background probability).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// The name of the profile
    pub name: String,
    /// Window length (number of positions)
    pub length: usize,
    /// The sequence alphabet; its order defines the score columns
    pub alphabet: Alphabet,
    /// Log-odds scores, indexed by \[position\]\[alphabet index\]
    pub match_scores: Vec<Vec<f64>>,
}

impl Profile {
    pub fn new(name: impl Into<String>, alphabet: Alphabet, match_scores: Vec<Vec<f64>>) -> Self {
        Profile {
            name: name.into(),
            length: match_scores.len(),
            alphabet,
            match_scores,
        }
    }

    #[inline(always)]
    pub fn match_score(&self, alphabet_idx: usize, profile_idx: usize) -> f64 {
        self.match_scores[profile_idx][alphabet_idx]
    }

    /// The summed log-odds score of a window.
    ///
    /// Symbols outside the alphabet contribute nothing. The window must be
    /// exactly as long as the profile.
    pub fn score(&self, window: &[u8]) -> anyhow::Result<f64> {
        if window.len() != self.length {
            return Err(DimensionMismatchError {
                what: "PSSM window",
                expected: self.length,
                found: window.len(),
            }
            .into());
        }

        Ok(window
            .iter()
            .enumerate()
            .filter_map(|(profile_idx, &byte)| {
                self.alphabet
                    .index_of(byte)
                    .map(|alphabet_idx| self.match_score(alphabet_idx, profile_idx))
            })
            .sum())
    }

    /// P(positive) for a window.
    pub fn probability(&self, window: &[u8]) -> anyhow::Result<f64> {
        Ok(logistic(self.score(window)?))
    }

    /// The two-class distribution, indexed by `Label::NEGATIVE_INDEX` and `Label::POSITIVE_INDEX`.
    pub fn distribution(&self, window: &[u8]) -> anyhow::Result<[f64; 2]> {
        let mut distribution = [0.0; 2];
        distribution[Label::POSITIVE_INDEX] = self.probability(window)?;
        distribution[Label::NEGATIVE_INDEX] = 1.0 - distribution[Label::POSITIVE_INDEX];
        Ok(distribution)
    }

    /// The highest scoring symbol at each position.
    pub fn consensus_sequence(&self) -> Vec<u8> {
        self.match_scores
            .iter()
            .filter_map(|scores| scores.argmax().and_then(|idx| self.alphabet.symbol(idx)))
            .collect()
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "profile: {}", self.name)?;
        writeln!(f, "length: {}", self.length)?;

        write!(f, "    ")?;
        for &symbol in self.alphabet.symbols() {
            write!(f, "    {}    ", char::from(symbol))?;
        }
        writeln!(f)?;

        for (profile_idx, scores) in self.match_scores.iter().enumerate() {
            write!(f, "{:<4}", profile_idx + 1)?;
            for score in scores {
                write!(f, "{:8.4} ", score)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
