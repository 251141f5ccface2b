//! Composition, transition and distribution (CTD) encoding.
//!
//! EL-Manzalawy Y, Dobbs D, Honavar V (2008) On evaluating MHC-II binding
//! peptide prediction methods. PLoS ONE 3: e3268.

use rayon::prelude::*;
use strum::{EnumCount, IntoEnumIterator};
use tracing::debug;

use crate::alphabet::Alphabet;
use crate::structs::{FeatureVector, Sequence};
use crate::tables::{Group, GroupMap};
use crate::util::round_to;

/// Occurrence quantiles reported by the distribution descriptor.
pub const DISTRIBUTION_QUANTILES: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Number of group-pair transitions: 1-2, 1-3, 2-3.
pub const NUM_TRANSITIONS: usize = 3;

/// Features produced per group map: composition, transition, distribution.
pub const FEATURES_PER_GROUP_MAP: usize =
    Group::COUNT + NUM_TRANSITIONS + Group::COUNT * DISTRIBUTION_QUANTILES.len();

/// Decimal digits kept in the distribution percentages.
const PERCENT_DIGITS: i32 = 2;

/// Encodes sequences as symbol composition followed by the CTD block of each group map.
#[derive(Clone, Debug)]
pub struct CtdEncoder {
    pub alphabet: Alphabet,
    pub group_maps: Vec<GroupMap>,
}

impl Default for CtdEncoder {
    fn default() -> Self {
        Self {
            alphabet: Alphabet::amino(),
            group_maps: GroupMap::defaults(),
        }
    }
}

impl CtdEncoder {
    pub fn new(alphabet: Alphabet, group_maps: Vec<GroupMap>) -> Self {
        Self {
            alphabet,
            group_maps,
        }
    }

    pub fn num_features(&self) -> usize {
        self.alphabet.len() + FEATURES_PER_GROUP_MAP * self.group_maps.len()
    }

    pub fn encode(&self, sequence: &Sequence) -> FeatureVector {
        let mut features = Vec::with_capacity(self.num_features());
        features.extend(composition(sequence, &self.alphabet));

        for map in &self.group_maps {
            features.extend(group_descriptors(&map.reduce(&sequence.utf8_bytes)));
        }

        features
    }

    /// Encode many sequences in parallel; rows are in input order.
    pub fn encode_all(&self, sequences: &[Sequence]) -> Vec<FeatureVector> {
        debug!(
            sequences = sequences.len(),
            features = self.num_features(),
            "CTD encoding"
        );
        sequences.par_iter().map(|seq| self.encode(seq)).collect()
    }
}

/// Encode one amino acid sequence with the given group maps.
pub fn encode_ctd(sequence: &Sequence, group_maps: &[GroupMap]) -> FeatureVector {
    CtdEncoder::new(Alphabet::amino(), group_maps.to_vec()).encode(sequence)
}

/// The fraction of the sequence made up by each alphabet symbol.
///
/// The denominator is the full sequence length, so bytes outside the
/// alphabet lower every fraction rather than being renormalized away.
pub fn composition(sequence: &Sequence, alphabet: &Alphabet) -> Vec<f64> {
    let mut counts = vec![0.0; alphabet.len()];
    if sequence.is_empty() {
        return counts;
    }

    sequence
        .utf8_bytes
        .iter()
        .filter_map(|&b| alphabet.index_of(b))
        .for_each(|idx| counts[idx] += 1.0);

    let length = sequence.len() as f64;
    counts.iter_mut().for_each(|c| *c /= length);
    counts
}

/// The composition, transition and distribution descriptors of a grouped sequence.
pub fn group_descriptors(groups: &[Group]) -> Vec<f64> {
    let mut features = Vec::with_capacity(FEATURES_PER_GROUP_MAP);
    features.extend(group_composition(groups));
    features.extend(group_transitions(groups));
    for group in Group::iter() {
        features.extend(group_distribution(groups, group));
    }
    features
}

fn group_composition(groups: &[Group]) -> [f64; Group::COUNT] {
    let mut composition = [0.0; Group::COUNT];
    if groups.is_empty() {
        return composition;
    }

    groups.iter().for_each(|g| composition[g.idx()] += 1.0);
    let length = groups.len() as f64;
    composition.iter_mut().for_each(|c| *c /= length);
    composition
}

fn transition_idx(from: Group, to: Group) -> Option<usize> {
    match (from, to) {
        (Group::One, Group::Two) | (Group::Two, Group::One) => Some(0),
        (Group::One, Group::Three) | (Group::Three, Group::One) => Some(1),
        (Group::Two, Group::Three) | (Group::Three, Group::Two) => Some(2),
        _ => None,
    }
}

/// The fraction of adjacent pairs that switch between two groups, in either direction.
fn group_transitions(groups: &[Group]) -> [f64; NUM_TRANSITIONS] {
    let mut transitions = [0.0; NUM_TRANSITIONS];
    if groups.len() < 2 {
        return transitions;
    }

    groups
        .windows(2)
        .filter_map(|pair| transition_idx(pair[0], pair[1]))
        .for_each(|idx| transitions[idx] += 1.0);

    let num_pairs = (groups.len() - 1) as f64;
    transitions.iter_mut().for_each(|t| *t /= num_pairs);
    transitions
}

/// Where the first, 25%, 50%, 75% and last occurrence of `group` falls,
/// as a percentage of the sequence length.
///
/// A group that never occurs yields zeros.
fn group_distribution(groups: &[Group], group: Group) -> [f64; DISTRIBUTION_QUANTILES.len()] {
    let mut distribution = [0.0; DISTRIBUTION_QUANTILES.len()];

    let positions: Vec<usize> = groups
        .iter()
        .enumerate()
        .filter(|(_, &g)| g == group)
        .map(|(idx, _)| idx)
        .collect();

    if positions.is_empty() {
        return distribution;
    }

    let count = positions.len();
    let length = groups.len() as f64;

    for (value, &quantile) in distribution.iter_mut().zip(DISTRIBUTION_QUANTILES.iter()) {
        // the k-th occurrence (1-based), never before the first
        let k = ((count as f64 * quantile).floor() as usize).clamp(1, count);
        let position = positions[k - 1] + 1;
        *value = round_to(position as f64 / length * 100.0, PERCENT_DIGITS);
    }

    distribution
}
