use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumString};
use tracing::debug;

use crate::alphabet::UTF8_X;
use crate::error::{ConfigurationError, DimensionMismatchError};
use crate::learner::BaseLearner;
use crate::miles::MilesRegressor;
use crate::propensity::PropensityScorer;
use crate::structs::{Profile, Sequence};

pub const DEFAULT_SCAN_WINDOW_LENGTH: usize = 9;

/// Anything that maps a window of residues to a score.
pub trait WindowScorer {
    /// The only window length the scorer accepts, if it has one.
    fn window_length(&self) -> Option<usize>;

    fn score_window(&self, window: &[u8]) -> anyhow::Result<f64>;
}

impl WindowScorer for Profile {
    fn window_length(&self) -> Option<usize> {
        Some(self.length)
    }

    fn score_window(&self, window: &[u8]) -> anyhow::Result<f64> {
        self.probability(window)
    }
}

impl WindowScorer for PropensityScorer {
    fn window_length(&self) -> Option<usize> {
        self.window_length
    }

    fn score_window(&self, window: &[u8]) -> anyhow::Result<f64> {
        self.probability(window)
    }
}

impl<L: BaseLearner> WindowScorer for MilesRegressor<L> {
    fn window_length(&self) -> Option<usize> {
        None
    }

    fn score_window(&self, window: &[u8]) -> anyhow::Result<f64> {
        self.predict(&Sequence::from_utf8(window))
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, StrumDisplay, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum ScanMode {
    /// One prediction per window, reported by its span
    #[default]
    Peptide,
    /// One prediction per residue, from the window centered on it
    Residue,
}

#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(default)]
pub struct ScanParams {
    pub window_length: usize,
    pub mode: ScanMode,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            window_length: DEFAULT_SCAN_WINDOW_LENGTH,
            mode: ScanMode::Peptide,
        }
    }
}

impl ScanParams {
    fn validate(&self, scorer_length: Option<usize>) -> anyhow::Result<()> {
        if self.window_length == 0 {
            return Err(ConfigurationError::new("window length must be positive").into());
        }

        if self.mode == ScanMode::Residue && self.window_length % 2 == 0 {
            return Err(ConfigurationError::new(format!(
                "residue scans need an odd window length, got {}",
                self.window_length
            ))
            .into());
        }

        match scorer_length {
            Some(length) if length != self.window_length => {
                Err(ConfigurationError::new(format!(
                    "scan window length {} doesn't match the scorer's {}",
                    self.window_length, length
                ))
                .into())
            }
            _ => Ok(()),
        }
    }
}

/// A scored stretch of a sequence.
///
/// Positions are 1-based and inclusive. In residue mode `start == end`
/// and `residues` is the single centre residue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowPrediction {
    pub start: usize,
    pub end: usize,
    pub residues: Vec<u8>,
    pub score: f64,
}

impl Display for WindowPrediction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)?;
        } else {
            write!(f, "{}:{}", self.start, self.end)?;
        }
        write!(
            f,
            "\t{}\t{:.3}",
            String::from_utf8_lossy(&self.residues),
            self.score
        )
    }
}

/// Slide a window along `sequence` and score every placement.
pub fn scan<S: WindowScorer + ?Sized>(
    scorer: &S,
    sequence: &Sequence,
    params: &ScanParams,
) -> anyhow::Result<Vec<WindowPrediction>> {
    params.validate(scorer.window_length())?;
    let length = params.window_length;

    match params.mode {
        ScanMode::Peptide => {
            if sequence.len() < length {
                return Err(DimensionMismatchError {
                    what: "scanned sequence",
                    expected: length,
                    found: sequence.len(),
                }
                .into());
            }

            sequence
                .windows(length)
                .enumerate()
                .map(|(offset, window)| {
                    Ok(WindowPrediction {
                        start: offset + 1,
                        end: offset + length,
                        residues: window.to_vec(),
                        score: scorer.score_window(window)?,
                    })
                })
                .collect()
        }
        ScanMode::Residue => {
            let flank = length / 2;
            if sequence.is_empty() {
                return Ok(vec![]);
            }

            let mut padded = vec![UTF8_X; flank];
            padded.extend_from_slice(&sequence.utf8_bytes);
            padded.extend(std::iter::repeat(UTF8_X).take(flank));

            padded
                .windows(length)
                .enumerate()
                .map(|(offset, window)| {
                    Ok(WindowPrediction {
                        start: offset + 1,
                        end: offset + 1,
                        residues: vec![window[flank]],
                        score: scorer.score_window(window)?,
                    })
                })
                .collect()
        }
    }
}

/// Scan many sequences in parallel; results are in input order.
pub fn scan_all<S: WindowScorer + Sync + ?Sized>(
    scorer: &S,
    sequences: &[Sequence],
    params: &ScanParams,
) -> anyhow::Result<Vec<Vec<WindowPrediction>>> {
    debug!(
        sequences = sequences.len(),
        window_length = params.window_length,
        mode = %params.mode,
        "scanning"
    );
    sequences
        .par_iter()
        .map(|seq| scan(scorer, seq, params))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learner::NearestNeighborLearner;
    use crate::miles::MilesParams;
    use crate::pssm::{train_pssm, PssmParamsBuilder};
    use crate::structs::LabeledSequence;
    use crate::tables::PropensityScaleName;
    use assert2::{assert, check};
    use std::str::FromStr;

    fn residue_params(window_length: usize) -> ScanParams {
        ScanParamsBuilder::default()
            .window_length(window_length)
            .mode(ScanMode::Residue)
            .build()
            .unwrap()
    }

    fn peptide_params(window_length: usize) -> ScanParams {
        ScanParamsBuilder::default()
            .window_length(window_length)
            .build()
            .unwrap()
    }

    #[test]
    fn test_peptide_scan_positions() {
        let scorer = PropensityScorer::default();
        let predictions = scan(&scorer, &Sequence::from("ACDEFG"), &peptide_params(4)).unwrap();

        check!(predictions.len() == 3);
        check!(predictions[0].start == 1);
        check!(predictions[0].end == 4);
        check!(predictions[0].residues == b"ACDE".to_vec());
        check!(predictions[2].start == 3);
        check!(predictions[2].end == 6);
        check!(predictions[2].score == scorer.probability(b"DEFG").unwrap());
    }

    #[test]
    fn test_residue_scan_pads_the_ends() {
        let scorer = PropensityScorer::default();
        let predictions = scan(&scorer, &Sequence::from("DKL"), &residue_params(3)).unwrap();

        check!(predictions.len() == 3);
        check!(predictions.iter().map(|p| p.start).collect::<Vec<_>>() == vec![1, 2, 3]);
        check!(predictions[0].residues == b"D".to_vec());
        check!(predictions[0].score == scorer.probability(b"XDK").unwrap());
        check!(predictions[2].score == scorer.probability(b"KLX").unwrap());
    }

    #[test]
    fn test_profile_scan() {
        let windows = vec![
            LabeledSequence::positive(b"WWW"),
            LabeledSequence::positive(b"WWW"),
        ];
        let params = PssmParamsBuilder::default()
            .use_negative_background(false)
            .build()
            .unwrap();
        let profile = train_pssm(&windows, &params).unwrap();

        let predictions = scan(&profile, &Sequence::from("PPWWWPP"), &peptide_params(3)).unwrap();
        let best = predictions
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .unwrap();
        check!(best.start == 3);

        let err = scan(&profile, &Sequence::from("PPWWWPP"), &peptide_params(5)).unwrap_err();
        assert!(err.downcast_ref::<ConfigurationError>().is_some());
    }

    #[test]
    fn test_miles_scan() {
        let labeled = vec![
            LabeledSequence::new(Sequence::from("AAAAAAAAA"), 0.0),
            LabeledSequence::new(Sequence::from("WWWWWWWWW"), 1.0),
        ];
        let mut regressor = MilesRegressor::new(NearestNeighborLearner::new(), MilesParams::default());
        regressor.fit(&labeled).unwrap();

        let predictions =
            scan(&regressor, &Sequence::from("WWWWWWWWWAAAAAAAAA"), &peptide_params(9)).unwrap();
        check!(predictions.first().map(|p| p.score) == Some(1.0));
        check!(predictions.last().map(|p| p.score) == Some(0.0));
    }

    #[test]
    fn test_scan_errors() {
        let scorer = PropensityScorer::default();

        let err = scan(&scorer, &Sequence::from("ACD"), &peptide_params(5)).unwrap_err();
        assert!(err.downcast_ref::<DimensionMismatchError>().is_some());

        let err = scan(&scorer, &Sequence::from("ACDEFG"), &residue_params(4)).unwrap_err();
        assert!(err.downcast_ref::<ConfigurationError>().is_some());

        let fixed = PropensityScorer::from_named(PropensityScaleName::Parker, Some(5)).unwrap();
        let err = scan(&fixed, &Sequence::from("ACDEFG"), &peptide_params(3)).unwrap_err();
        assert!(err.downcast_ref::<ConfigurationError>().is_some());
    }

    #[test]
    fn test_scan_all_preserves_order() {
        let scorer = PropensityScorer::default();
        let sequences = vec![Sequence::from("ACDEFGHIK"), Sequence::from("LMNPQRSTV")];
        let params = residue_params(5);

        let all = scan_all(&scorer, &sequences, &params).unwrap();
        for (predictions, seq) in all.iter().zip(&sequences) {
            check!(*predictions == scan(&scorer, seq, &params).unwrap());
        }
    }

    #[test]
    fn test_prediction_display() {
        let peptide = WindowPrediction {
            start: 2,
            end: 4,
            residues: b"CDE".to_vec(),
            score: 0.25,
        };
        check!(peptide.to_string() == "2:4\tCDE\t0.250");
        check!(ScanMode::from_str("residue").unwrap() == ScanMode::Residue);
    }
}
