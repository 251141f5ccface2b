use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::error::{ConfigurationError, DimensionMismatchError};
use crate::structs::Label;
use crate::tables::PropensityScaleName;
use crate::util::{logistic, VecMath};

/// Scores windows by the average propensity of their residues.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropensityScorer {
    pub alphabet: Alphabet,
    /// One value per alphabet symbol, in alphabet order
    pub scale: Vec<f64>,
    /// If set, every scored window must have exactly this (odd) length
    pub window_length: Option<usize>,
}

impl PropensityScorer {
    pub fn new(
        alphabet: Alphabet,
        scale: Vec<f64>,
        window_length: Option<usize>,
    ) -> anyhow::Result<Self> {
        if scale.len() != alphabet.len() {
            return Err(ConfigurationError::new(format!(
                "propensity scale has {} values for an alphabet of {} symbols",
                scale.len(),
                alphabet.len()
            ))
            .into());
        }

        if let Some(length) = window_length {
            if length % 2 == 0 {
                return Err(ConfigurationError::new(format!(
                    "window length must be odd, got {length}"
                ))
                .into());
            }
        }

        Ok(Self {
            alphabet,
            scale,
            window_length,
        })
    }

    /// Build a scorer from scale values separated by commas and/or whitespace.
    pub fn parse(
        alphabet: Alphabet,
        scale: &str,
        window_length: Option<usize>,
    ) -> anyhow::Result<Self> {
        let values = scale
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<f64>().map_err(|_| {
                    ConfigurationError::new(format!("invalid propensity value: {token}"))
                })
            })
            .collect::<Result<Vec<f64>, ConfigurationError>>()?;

        Self::new(alphabet, values, window_length)
    }

    /// A scorer over the amino alphabet using one of the built-in scales.
    pub fn from_named(
        name: PropensityScaleName,
        window_length: Option<usize>,
    ) -> anyhow::Result<Self> {
        Self::new(Alphabet::amino(), name.values().to_vec(), window_length)
    }

    /// The mean scale value of the window.
    ///
    /// Symbols outside the alphabet add nothing to the sum but still count
    /// toward the window length.
    pub fn score(&self, window: &[u8]) -> anyhow::Result<f64> {
        if let Some(expected) = self.window_length {
            if window.len() != expected {
                return Err(DimensionMismatchError {
                    what: "propensity window",
                    expected,
                    found: window.len(),
                }
                .into());
            }
        }

        // symbols outside the alphabet count toward the length but add nothing
        let values: Vec<f64> = window
            .iter()
            .map(|&b| self.alphabet.index_of(b).map_or(0.0, |idx| self.scale[idx]))
            .collect();

        Ok(values.avg().unwrap_or(0.0))
    }

    pub fn probability(&self, window: &[u8]) -> anyhow::Result<f64> {
        Ok(logistic(self.score(window)?))
    }

    pub fn distribution(&self, window: &[u8]) -> anyhow::Result<[f64; 2]> {
        let mut distribution = [0.0; 2];
        distribution[Label::POSITIVE_INDEX] = self.probability(window)?;
        distribution[Label::NEGATIVE_INDEX] = 1.0 - distribution[Label::POSITIVE_INDEX];
        Ok(distribution)
    }
}

impl Default for PropensityScorer {
    /// Parker hydrophilicity over the amino alphabet, any window length.
    fn default() -> Self {
        Self {
            alphabet: Alphabet::amino(),
            scale: PropensityScaleName::Parker.values().to_vec(),
            window_length: None,
        }
    }
}
