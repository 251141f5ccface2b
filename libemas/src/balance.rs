use derive_builder::Builder;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigurationError, DegenerateTrainingError};
use crate::learner::{check_training_set, BaseLearner};
use crate::structs::{FeatureVector, Label};

#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(default)]
pub struct BalanceParams {
    /// Majority examples kept per minority example
    pub ratio: f64,
    /// Seed for the shuffle that picks the majority examples
    pub seed: u64,
}

impl Default for BalanceParams {
    fn default() -> Self {
        Self {
            ratio: 1.0,
            seed: 1,
        }
    }
}

/// Undersamples the majority class of a binary training set before fitting
/// the wrapped learner.
#[derive(Clone, Debug)]
pub struct BalancedLearner<L> {
    pub learner: L,
    pub params: BalanceParams,
}

impl<L: BaseLearner> BalancedLearner<L> {
    pub fn new(learner: L, params: BalanceParams) -> anyhow::Result<Self> {
        // written so that NaN fails too
        if !(params.ratio > 0.0 && params.ratio.is_finite()) {
            return Err(ConfigurationError::new(format!(
                "balance ratio must be positive, got {}",
                params.ratio
            ))
            .into());
        }

        Ok(Self { learner, params })
    }

    /// The indices of the training examples to keep, in selection order:
    /// the whole minority class, then up to ceil(minority * ratio) majority
    /// examples drawn from a seeded shuffle of the majority class.
    ///
    /// When the classes are the same size, the positives are treated as the majority.
    pub fn select(&self, targets: &[f64]) -> anyhow::Result<Vec<usize>> {
        let (positives, negatives): (Vec<usize>, Vec<usize>) = (0..targets.len())
            .partition(|&idx| Label::from_target(targets[idx]) == Label::Positive);

        if positives.is_empty() || negatives.is_empty() {
            return Err(DegenerateTrainingError::new(format!(
                "balancing needs both classes: {} positive, {} negative",
                positives.len(),
                negatives.len()
            ))
            .into());
        }

        let (minority, mut majority) = if negatives.len() > positives.len() {
            (positives, negatives)
        } else {
            (negatives, positives)
        };

        let keep = (minority.len() as f64 * self.params.ratio).ceil() as usize;
        let keep = keep.min(majority.len());

        let mut rng = Pcg64::seed_from_u64(self.params.seed);
        majority.shuffle(&mut rng);

        debug!(
            minority = minority.len(),
            majority = majority.len(),
            kept = keep,
            "balancing training set"
        );

        let mut selected = minority;
        selected.extend_from_slice(&majority[..keep]);
        Ok(selected)
    }
}

impl<L: BaseLearner> BaseLearner for BalancedLearner<L> {
    fn fit(
        &mut self,
        features: &[FeatureVector],
        targets: &[f64],
        weights: &[f64],
    ) -> anyhow::Result<()> {
        check_training_set(features, targets, weights)?;
        let selected = self.select(targets)?;

        let features: Vec<FeatureVector> = selected.iter().map(|&i| features[i].clone()).collect();
        let targets: Vec<f64> = selected.iter().map(|&i| targets[i]).collect();
        let weights: Vec<f64> = selected.iter().map(|&i| weights[i]).collect();

        self.learner.fit(&features, &targets, &weights)
    }

    fn predict(&self, features: &[f64]) -> anyhow::Result<f64> {
        self.learner.predict(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_close;
    use crate::learner::MeanLearner;
    use assert2::{assert, check};

    fn imbalanced_targets() -> Vec<f64> {
        // 2 positives, 8 negatives
        vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]
    }

    #[test]
    fn test_select_keeps_minority_and_samples_majority() {
        let balanced = BalancedLearner::new(MeanLearner::new(), BalanceParams::default()).unwrap();
        let targets = imbalanced_targets();
        let selected = balanced.select(&targets).unwrap();

        check!(selected.len() == 4);
        check!(selected[..2] == [1, 6]);
        check!(selected[2..].iter().all(|&i| targets[i] == 0.0));
    }

    #[test]
    fn test_ratio_is_capped_by_majority() {
        let params = BalanceParamsBuilder::default().ratio(10.0).build().unwrap();
        let balanced = BalancedLearner::new(MeanLearner::new(), params).unwrap();
        check!(balanced.select(&imbalanced_targets()).unwrap().len() == 10);
    }

    #[test]
    fn test_positive_majority() {
        let balanced = BalancedLearner::new(MeanLearner::new(), BalanceParams::default()).unwrap();
        let targets = vec![1.0, 1.0, 1.0, 0.0, 1.0];
        let selected = balanced.select(&targets).unwrap();

        check!(selected.len() == 2);
        check!(selected[0] == 3);
        check!(targets[selected[1]] == 1.0);
    }

    #[test]
    fn test_any_nonzero_target_is_positive() {
        let balanced = BalancedLearner::new(MeanLearner::new(), BalanceParams::default()).unwrap();
        let targets = vec![0.0, 2.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0];
        let selected = balanced.select(&targets).unwrap();

        check!(selected.len() == 4);
        check!(selected[..2] == [1, 4]);
        check!(selected[2..].iter().all(|&i| targets[i] == 0.0));
    }

    #[test]
    fn test_selection_is_seeded() {
        let targets = imbalanced_targets();
        let a = BalancedLearner::new(MeanLearner::new(), BalanceParams::default()).unwrap();
        let b = BalancedLearner::new(MeanLearner::new(), BalanceParams::default()).unwrap();
        check!(a.select(&targets).unwrap() == b.select(&targets).unwrap());
    }

    #[test]
    fn test_fit_balances_the_mean() {
        let targets = imbalanced_targets();
        let features: Vec<FeatureVector> = targets.iter().map(|&t| vec![t]).collect();
        let weights = vec![1.0; targets.len()];

        let mut balanced = BalancedLearner::new(MeanLearner::new(), BalanceParams::default()).unwrap();
        balanced.fit(&features, &targets, &weights).unwrap();
        assert_close!(balanced.predict(&[0.0]).unwrap(), 0.5);
    }

    #[test]
    fn test_errors() {
        for ratio in [0.0, -1.0, f64::NAN] {
            let params = BalanceParamsBuilder::default().ratio(ratio).build().unwrap();
            let err = BalancedLearner::new(MeanLearner::new(), params).unwrap_err();
            assert!(err.downcast_ref::<ConfigurationError>().is_some());
        }

        let balanced = BalancedLearner::new(MeanLearner::new(), BalanceParams::default()).unwrap();
        let err = balanced.select(&[1.0, 1.0]).unwrap_err();
        assert!(err.downcast_ref::<DegenerateTrainingError>().is_some());
    }
}
