//! Multiple-instance learning via embedded instance selection (MILES), with
//! a BLOSUM62 distance between peptide windows.
//!
//! Chen Y, Bi J, Wang JZ (2006) MILES: Multiple-instance learning via embedded
//! instance selection. IEEE Trans Pattern Anal Mach Intell 28: 1931-1947.
//!
//! Each sequence is treated as a bag of fixed-length windows. The reference set
//! is every window of every training sequence (optionally a seeded subsample of
//! them). A bag is embedded as, for each reference window, the distance to the
//! closest of its own windows.

use anyhow::Context;
use derive_builder::Builder;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigurationError, DegenerateTrainingError, DimensionMismatchError};
use crate::learner::BaseLearner;
use crate::structs::{FeatureVector, LabeledSequence, Sequence};
use crate::tables::{SubstitutionMatrix, BLOSUM62};

pub const DEFAULT_WINDOW_LENGTH: usize = 9;

/// Which of the extracted training windows make up the reference set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Subsample {
    /// Keep every window
    #[default]
    All,
    /// Shuffle the windows with a seeded generator and keep the first
    /// floor(n * percent / 100) of them. `percent` must be in (0, 100].
    Percent { percent: f64, seed: u64 },
}

#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(default)]
pub struct MilesParams {
    /// The length of the windows in each bag
    pub window_length: usize,
    pub subsample: Subsample,
    /// Embed on a dedicated thread pool of this size instead of the global pool
    #[builder(setter(strip_option))]
    pub num_threads: Option<usize>,
}

impl Default for MilesParams {
    fn default() -> Self {
        Self {
            window_length: DEFAULT_WINDOW_LENGTH,
            subsample: Subsample::All,
            num_threads: None,
        }
    }
}

impl MilesParams {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.window_length == 0 {
            return Err(ConfigurationError::new("window length must be positive").into());
        }

        if let Subsample::Percent { percent, .. } = self.subsample {
            // written so that NaN fails too
            if !(percent > 0.0 && percent <= 100.0) {
                return Err(ConfigurationError::new(format!(
                    "subsample percent must be in (0, 100], got {percent}"
                ))
                .into());
            }
        }

        if self.num_threads == Some(0) {
            return Err(ConfigurationError::new("thread count must be positive").into());
        }

        Ok(())
    }

    /// Run `op` on a thread pool sized by `num_threads`, or the global pool.
    fn install<T, F>(&self, op: F) -> anyhow::Result<T>
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        match self.num_threads {
            Some(num_threads) => Ok(rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
                .context("failed to build rayon threadpool")?
                .install(op)),
            None => Ok(op()),
        }
    }
}

/// The distance between two equal-length windows under a substitution matrix.
///
/// This is 1 / (summed pairwise substitution score) when that sum is positive,
/// and 1.0 otherwise. Positions where either symbol is outside the matrix's
/// alphabet contribute nothing to the sum.
pub fn window_distance(a: &[u8], b: &[u8], matrix: &SubstitutionMatrix) -> f64 {
    let similarity: f64 = a
        .iter()
        .zip(b)
        .filter_map(|(&x, &y)| matrix.value_of(x, y))
        .sum();

    if similarity > 0.0 {
        1.0 / similarity
    } else {
        1.0
    }
}

/// The windows that define the embedding space; fixed once trained.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceWindowSet {
    pub window_length: usize,
    pub windows: Vec<Vec<u8>>,
}

impl ReferenceWindowSet {
    /// Collect the windows of `sequences` in order (sequence by sequence,
    /// offset by offset), then subsample as configured.
    pub fn extract<'a>(
        sequences: impl IntoIterator<Item = &'a Sequence>,
        params: &MilesParams,
    ) -> anyhow::Result<Self> {
        params.validate()?;

        let mut windows: Vec<Vec<u8>> = sequences
            .into_iter()
            .flat_map(|seq| seq.windows(params.window_length))
            .map(|window| window.to_vec())
            .collect();

        let num_extracted = windows.len();

        if let Subsample::Percent { percent, seed } = params.subsample {
            let mut rng = Pcg64::seed_from_u64(seed);
            windows.shuffle(&mut rng);
            let keep = (num_extracted as f64 * percent / 100.0).floor() as usize;
            windows.truncate(keep);
        }

        debug!(
            extracted = num_extracted,
            kept = windows.len(),
            window_length = params.window_length,
            "extracted MILES reference windows"
        );

        if windows.is_empty() {
            return Err(DegenerateTrainingError::new(format!(
                "no reference windows of length {}",
                params.window_length
            ))
            .into());
        }

        Ok(Self {
            window_length: params.window_length,
            windows,
        })
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Embed a bag with the BLOSUM62 distance.
    pub fn embed(&self, bag: &Sequence) -> anyhow::Result<FeatureVector> {
        self.embed_with_matrix(bag, &BLOSUM62)
    }

    pub fn embed_with_matrix(
        &self,
        bag: &Sequence,
        matrix: &SubstitutionMatrix,
    ) -> anyhow::Result<FeatureVector> {
        if bag.len() < self.window_length {
            return Err(DimensionMismatchError {
                what: "MILES bag",
                expected: self.window_length,
                found: bag.len(),
            }
            .into());
        }

        let instances: Vec<&[u8]> = bag.windows(self.window_length).collect();

        Ok(self
            .windows
            .iter()
            .map(|reference| {
                instances
                    .iter()
                    .map(|instance| window_distance(reference, instance, matrix))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect())
    }

    /// Embed many bags in parallel; rows are in input order.
    pub fn embed_all(&self, bags: &[Sequence]) -> anyhow::Result<Vec<FeatureVector>> {
        bags.par_iter().map(|bag| self.embed(bag)).collect()
    }
}

/// The embedded training bags, ready to hand to a learner.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedDataset {
    pub features: Vec<FeatureVector>,
    pub targets: Vec<f64>,
    pub weights: Vec<f64>,
}

impl EmbeddedDataset {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Build the reference set from the training bags and embed each of them.
pub fn train_miles(
    labeled: &[LabeledSequence<f64>],
    params: &MilesParams,
) -> anyhow::Result<(ReferenceWindowSet, EmbeddedDataset)> {
    if labeled.is_empty() {
        return Err(DegenerateTrainingError::new("no training sequences").into());
    }

    let reference = ReferenceWindowSet::extract(labeled.iter().map(|l| &l.sequence), params)?;

    let bags: Vec<Sequence> = labeled.iter().map(|l| l.sequence.clone()).collect();
    let features = params.install(|| reference.embed_all(&bags))??;

    let dataset = EmbeddedDataset {
        features,
        targets: labeled.iter().map(|l| l.label).collect(),
        weights: labeled.iter().map(|l| l.weight).collect(),
    };

    info!(
        bags = dataset.len(),
        reference_windows = reference.len(),
        "trained MILES embedding"
    );

    Ok((reference, dataset))
}

pub fn embed_miles(
    reference: &ReferenceWindowSet,
    sequence: &Sequence,
) -> anyhow::Result<FeatureVector> {
    reference.embed(sequence)
}

/// A MILES embedding in front of a regression learner.
#[derive(Clone, Debug)]
pub struct MilesRegressor<L> {
    pub params: MilesParams,
    pub learner: L,
    reference: Option<ReferenceWindowSet>,
}

impl<L: BaseLearner> MilesRegressor<L> {
    pub fn new(learner: L, params: MilesParams) -> Self {
        Self {
            params,
            learner,
            reference: None,
        }
    }

    /// Replace the reference set and refit the learner on the new embedding.
    pub fn fit(&mut self, labeled: &[LabeledSequence<f64>]) -> anyhow::Result<()> {
        let (reference, dataset) = train_miles(labeled, &self.params)?;
        self.learner
            .fit(&dataset.features, &dataset.targets, &dataset.weights)?;
        self.reference = Some(reference);
        Ok(())
    }

    pub fn predict(&self, sequence: &Sequence) -> anyhow::Result<f64> {
        let reference = self
            .reference
            .as_ref()
            .ok_or_else(|| DegenerateTrainingError::new("MILES regressor has not been fit"))?;
        self.learner.predict(&reference.embed(sequence)?)
    }

    pub fn reference_windows(&self) -> Option<&ReferenceWindowSet> {
        self.reference.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_close;
    use crate::learner::NearestNeighborLearner;
    use assert2::{assert, check};

    fn training_set() -> Vec<LabeledSequence<f64>> {
        vec![
            LabeledSequence::new(Sequence::from("MKVLAAGIVGLLLAS"), 0.2),
            LabeledSequence::new(Sequence::from("DEKRHNQSTYWCPGF"), 0.9),
            LabeledSequence::new(Sequence::from("WWYYFFHHKKRRDDEE"), 0.5),
        ]
    }

    fn percent(percent: f64, seed: u64) -> MilesParams {
        MilesParamsBuilder::default()
            .subsample(Subsample::Percent { percent, seed })
            .build()
            .unwrap()
    }

    #[test]
    fn test_window_distance() {
        // diagonal A/A is 4
        assert_close!(window_distance(b"AAAAAAAAA", b"AAAAAAAAA", &BLOSUM62), 1.0 / 36.0);
        // W/P is -4
        check!(window_distance(b"WWWWWWWWW", b"PPPPPPPPP", &BLOSUM62) == 1.0);
        check!(window_distance(b"XXXXXXXXX", b"AAAAAAAAA", &BLOSUM62) == 1.0);
        assert_close!(window_distance(b"AXAXAXAXA", b"AAAAAAAAA", &BLOSUM62), 1.0 / 20.0);
    }

    #[test]
    fn test_extract_keeps_input_order() {
        let sequences = [Sequence::from("ACDEFGHIKL"), Sequence::from("MNPQRSTVW")];
        let reference = ReferenceWindowSet::extract(&sequences, &MilesParams::default()).unwrap();

        check!(reference.len() == 3);
        check!(reference.windows[0] == b"ACDEFGHIK".to_vec());
        check!(reference.windows[1] == b"CDEFGHIKL".to_vec());
        check!(reference.windows[2] == b"MNPQRSTVW".to_vec());
    }

    #[test]
    fn test_subsample_is_seeded() {
        let sequences: Vec<Sequence> = training_set().into_iter().map(|l| l.sequence).collect();
        let all = ReferenceWindowSet::extract(&sequences, &MilesParams::default()).unwrap();

        let first = ReferenceWindowSet::extract(&sequences, &percent(50.0, 7)).unwrap();
        let second = ReferenceWindowSet::extract(&sequences, &percent(50.0, 7)).unwrap();
        let other = ReferenceWindowSet::extract(&sequences, &percent(50.0, 8)).unwrap();

        check!(first == second);
        check!(first != other);
        check!(first.len() == all.len() / 2);
        check!(first.windows.iter().all(|w| all.windows.contains(w)));
    }

    #[test]
    fn test_invalid_subsample_percent() {
        let sequences = [Sequence::from("ACDEFGHIKL")];
        for bad in [0.0, -5.0, 100.5, f64::NAN] {
            let err = ReferenceWindowSet::extract(&sequences, &percent(bad, 1)).unwrap_err();
            assert!(err.downcast_ref::<ConfigurationError>().is_some());
        }
        check!(ReferenceWindowSet::extract(&sequences, &percent(100.0, 1)).is_ok());
    }

    #[test]
    fn test_own_windows_are_closest() {
        let labeled = training_set();
        let (reference, dataset) = train_miles(&labeled, &MilesParams::default()).unwrap();

        check!(dataset.len() == labeled.len());
        check!(dataset.features.iter().all(|row| row.len() == reference.len()));
        check!(dataset.targets == vec![0.2, 0.9, 0.5]);

        // the first 7 reference windows come from the first sequence
        let own = &dataset.features[0];
        for (idx, window) in reference.windows.iter().take(7).enumerate() {
            check!(own[idx] == window_distance(window, window, &BLOSUM62));
            check!(own[idx] < 1.0);
        }
    }

    #[test]
    fn test_short_bag_is_an_error() {
        let (reference, _) = train_miles(&training_set(), &MilesParams::default()).unwrap();
        let err = embed_miles(&reference, &Sequence::from("ACDEF")).unwrap_err();
        assert!(err.downcast_ref::<DimensionMismatchError>().is_some());
    }

    #[test]
    fn test_no_windows_is_degenerate() {
        let labeled = vec![LabeledSequence::new(Sequence::from("ACD"), 1.0)];
        let err = train_miles(&labeled, &MilesParams::default()).unwrap_err();
        assert!(err.downcast_ref::<DegenerateTrainingError>().is_some());

        let err = train_miles(&[], &MilesParams::default()).unwrap_err();
        assert!(err.downcast_ref::<DegenerateTrainingError>().is_some());
    }

    #[test]
    fn test_dedicated_pool_matches_global_pool() {
        let labeled = training_set();
        let pooled = MilesParamsBuilder::default().num_threads(2).build().unwrap();

        let (_, global) = train_miles(&labeled, &MilesParams::default()).unwrap();
        let (_, dedicated) = train_miles(&labeled, &pooled).unwrap();
        check!(global == dedicated);
    }

    #[test]
    fn test_regressor_recalls_training_targets() {
        let labeled = training_set();
        let mut regressor = MilesRegressor::new(NearestNeighborLearner::new(), MilesParams::default());

        let err = regressor.predict(&labeled[0].sequence).unwrap_err();
        assert!(err.downcast_ref::<DegenerateTrainingError>().is_some());

        regressor.fit(&labeled).unwrap();
        for example in &labeled {
            check!(regressor.predict(&example.sequence).unwrap() == example.label);
        }
    }

    #[test]
    fn test_reference_set_persists() {
        let (reference, _) = train_miles(&training_set(), &percent(40.0, 3)).unwrap();
        let json = serde_json::to_string(&reference).unwrap();
        let restored: ReferenceWindowSet = serde_json::from_str(&json).unwrap();
        check!(restored == reference);
    }
}
