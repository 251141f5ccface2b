//! Position-specific scoring matrices estimated with the Henikoff & Henikoff
//! pseudo-count method.
//!
//! Henikoff JG, Henikoff S (1996) Using substitution probabilities to improve
//! position-specific scoring matrices. Comput Appl Biosci 12: 135-143.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigurationError, DegenerateTrainingError, DimensionMismatchError};
use crate::structs::{Label, LabeledSequence, Profile};
use crate::tables::{SubstitutionMatrix, BLOSUM62_TARGET_FREQUENCIES};
use crate::util::log_odds;

#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(default)]
pub struct PssmParams {
    /// The name given to the trained profile
    #[builder(setter(into))]
    pub name: String,
    /// Estimate background probabilities from the negative windows.
    /// Without negatives (or with this off) the background is uniform.
    pub use_negative_background: bool,
}

impl Default for PssmParams {
    fn default() -> Self {
        Self {
            name: "pssm".to_string(),
            use_negative_background: true,
        }
    }
}

/// Build a profile from equal-length labeled windows.
pub fn train_pssm(
    windows: &[LabeledSequence<Label>],
    params: &PssmParams,
) -> anyhow::Result<Profile> {
    train_pssm_with_matrix(windows, params, &BLOSUM62_TARGET_FREQUENCIES)
}

/// Build a profile using the joint substitution probabilities `q` to derive pseudo-counts.
pub fn train_pssm_with_matrix(
    windows: &[LabeledSequence<Label>],
    params: &PssmParams,
    q: &SubstitutionMatrix,
) -> anyhow::Result<Profile> {
    check_target_frequencies(q)?;

    let length = match windows.first() {
        Some(first) => first.sequence.len(),
        None => return Err(DegenerateTrainingError::new("no training windows").into()),
    };

    if length == 0 {
        return Err(DegenerateTrainingError::new("training windows are empty").into());
    }

    if let Some(bad) = windows.iter().find(|w| w.sequence.len() != length) {
        return Err(DimensionMismatchError {
            what: "PSSM training window",
            expected: length,
            found: bad.sequence.len(),
        }
        .into());
    }

    let (positives, negatives): (Vec<&LabeledSequence<Label>>, Vec<&LabeledSequence<Label>>) =
        windows.iter().partition(|w| w.label == Label::Positive);

    let positive_weight: f64 = positives.iter().map(|w| w.weight).sum();
    let negative_weight: f64 = negatives.iter().map(|w| w.weight).sum();

    debug!(
        length,
        positives = positives.len(),
        negatives = negatives.len(),
        positive_weight,
        negative_weight,
        "training PSSM"
    );

    if positive_weight <= 0.0 {
        return Err(DegenerateTrainingError::new("positive class has no weight").into());
    }

    let foreground = estimate_probabilities(&positives, length, q);

    let background = if params.use_negative_background && negative_weight > 0.0 {
        estimate_probabilities(&negatives, length, q)
    } else {
        let uniform = 1.0 / q.size() as f64;
        vec![vec![uniform; q.size()]; length]
    };

    let match_scores: Vec<Vec<f64>> = foreground
        .iter()
        .zip(&background)
        .map(|(f_col, b_col)| {
            f_col
                .iter()
                .zip(b_col)
                .map(|(&f, &b)| log_odds(f, b))
                .collect()
        })
        .collect();

    info!(name = %params.name, length, "trained PSSM");

    Ok(Profile::new(
        params.name.clone(),
        q.alphabet.clone(),
        match_scores,
    ))
}

/// Pseudo-counts divide by each row sum Q\[i\], so every entry must be a
/// probability and every row must carry some mass.
fn check_target_frequencies(q: &SubstitutionMatrix) -> anyhow::Result<()> {
    for i in 0..q.size() {
        if (0..q.size()).any(|j| !(q.value(i, j) >= 0.0)) {
            return Err(ConfigurationError::new(format!(
                "substitution probabilities must be non-negative (row {i})"
            ))
            .into());
        }

        if !(q.row_sum(i) > 0.0 && q.row_sum(i).is_finite()) {
            return Err(ConfigurationError::new(format!(
                "substitution probability row {i} sums to {}",
                q.row_sum(i)
            ))
            .into());
        }
    }
    Ok(())
}

/// Probability of each symbol at each position, blending the weighted observed
/// frequencies with substitution-derived pseudo-counts.
///
/// With N the in-alphabet weight of a column and B = sqrt(N) the pseudo-count weight:
///
/// ```text
///   g[c][a] = B * sum_i( n[c][i] * q[i][a] / (N * Q[i]) )
///   p[c][a] = N/(N+B) * n[c][a]/N + B/(N+B) * g[c][a]/B
/// ```
///
/// A column with no in-alphabet symbols at all is uniform.
pub fn estimate_probabilities(
    windows: &[&LabeledSequence<Label>],
    length: usize,
    q: &SubstitutionMatrix,
) -> Vec<Vec<f64>> {
    let size = q.size();

    let mut counts = vec![vec![0.0; size]; length];

    for window in windows {
        for (col, &byte) in window.sequence.utf8_bytes.iter().enumerate() {
            if let Some(a) = q.alphabet.index_of(byte) {
                counts[col][a] += window.weight;
            }
        }
    }

    counts
        .iter()
        .map(|n_col| {
            let column_weight: f64 = n_col.iter().sum();
            if column_weight <= 0.0 {
                return vec![1.0 / size as f64; size];
            }

            let pseudo_weight = column_weight.sqrt();
            let observed_share = column_weight / (column_weight + pseudo_weight);
            let pseudo_share = pseudo_weight / (column_weight + pseudo_weight);

            (0..size)
                .map(|a| {
                    let pseudo_count = pseudo_weight
                        * (0..size)
                            .map(|i| n_col[i] * q.value(i, a) / (column_weight * q.row_sum(i)))
                            .sum::<f64>();

                    observed_share * (n_col[a] / column_weight)
                        + pseudo_share * (pseudo_count / pseudo_weight)
                })
                .collect()
        })
        .collect()
}

/// P(positive) of a window under a trained profile.
pub fn score_pssm(profile: &Profile, window: &[u8]) -> anyhow::Result<f64> {
    profile.probability(window)
}
