use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, DegenerateTrainingError, DimensionMismatchError};
use crate::structs::FeatureVector;
use crate::util::VecMath;

/// A regression/classification algorithm that learns from fixed-length feature vectors.
///
/// Embedders in this crate produce the features; a `BaseLearner` is
/// whatever consumes them.
pub trait BaseLearner {
    fn fit(&mut self, features: &[FeatureVector], targets: &[f64], weights: &[f64])
        -> anyhow::Result<()>;

    fn predict(&self, features: &[f64]) -> anyhow::Result<f64>;
}

/// Checks that a training set is non-empty and rectangular, returning the
/// feature dimensionality.
pub fn check_training_set(
    features: &[FeatureVector],
    targets: &[f64],
    weights: &[f64],
) -> anyhow::Result<usize> {
    let dimensions = match features.first() {
        Some(row) => row.len(),
        None => return Err(DegenerateTrainingError::new("no training examples").into()),
    };

    if targets.len() != features.len() || weights.len() != features.len() {
        return Err(ConfigurationError::new(format!(
            "{} feature rows, {} targets and {} weights",
            features.len(),
            targets.len(),
            weights.len()
        ))
        .into());
    }

    if features.iter().any(|row| row.len() != dimensions) {
        return Err(ConfigurationError::new("feature rows differ in length").into());
    }

    Ok(dimensions)
}

fn check_dimensions(expected: usize, features: &[f64]) -> anyhow::Result<()> {
    if features.len() != expected {
        return Err(DimensionMismatchError {
            what: "feature vector",
            expected,
            found: features.len(),
        }
        .into());
    }
    Ok(())
}

/// Predicts the weighted mean of the training targets, whatever the input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanLearner {
    dimensions: Option<usize>,
    mean: f64,
}

impl MeanLearner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BaseLearner for MeanLearner {
    fn fit(
        &mut self,
        features: &[FeatureVector],
        targets: &[f64],
        weights: &[f64],
    ) -> anyhow::Result<()> {
        let dimensions = check_training_set(features, targets, weights)?;

        let total_weight: f64 = weights.iter().sum();
        if total_weight <= 0.0 {
            return Err(DegenerateTrainingError::new("training weights sum to zero").into());
        }

        self.mean = targets
            .iter()
            .zip(weights)
            .map(|(target, weight)| target * weight)
            .sum::<f64>()
            / total_weight;
        self.dimensions = Some(dimensions);
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> anyhow::Result<f64> {
        let dimensions = self
            .dimensions
            .ok_or_else(|| DegenerateTrainingError::new("learner has not been fit"))?;
        check_dimensions(dimensions, features)?;
        Ok(self.mean)
    }
}

/// One-nearest-neighbor regression under Euclidean distance.
///
/// Instance weights are accepted but not used. Ties go to the earliest
/// training example.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NearestNeighborLearner {
    examples: Vec<FeatureVector>,
    targets: Vec<f64>,
}

impl NearestNeighborLearner {
    pub fn new() -> Self {
        Self::default()
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl BaseLearner for NearestNeighborLearner {
    fn fit(
        &mut self,
        features: &[FeatureVector],
        targets: &[f64],
        weights: &[f64],
    ) -> anyhow::Result<()> {
        check_training_set(features, targets, weights)?;
        self.examples = features.to_vec();
        self.targets = targets.to_vec();
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> anyhow::Result<f64> {
        let first = self
            .examples
            .first()
            .ok_or_else(|| DegenerateTrainingError::new("learner has not been fit"))?;
        check_dimensions(first.len(), features)?;

        let distances: Vec<f64> = self
            .examples
            .iter()
            .map(|example| squared_distance(example, features))
            .collect();

        let nearest = distances
            .argmin()
            .ok_or_else(|| DegenerateTrainingError::new("learner has not been fit"))?;

        Ok(self.targets[nearest])
    }
}
