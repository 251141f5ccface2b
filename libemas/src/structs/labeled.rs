use serde::{Deserialize, Serialize};

use super::Sequence;

/// The class of a binary-labeled example.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Negative,
    Positive,
}

impl Label {
    /// Index of the positive class in a two-class distribution.
    pub const POSITIVE_INDEX: usize = 1;
    pub const NEGATIVE_INDEX: usize = 0;

    /// Interpret a regression-style target: 0.0 is negative, any other value positive.
    pub fn from_target(target: f64) -> Self {
        if target != 0.0 {
            Label::Positive
        } else {
            Label::Negative
        }
    }
}

/// A sequence with a label (a class or a regression target) and an instance weight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabeledSequence<L> {
    pub sequence: Sequence,
    pub label: L,
    pub weight: f64,
}

impl<L> LabeledSequence<L> {
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    pub fn new(sequence: Sequence, label: L) -> Self {
        Self {
            sequence,
            label,
            weight: Self::DEFAULT_WEIGHT,
        }
    }

    pub fn weighted(sequence: Sequence, label: L, weight: f64) -> Self {
        Self {
            sequence,
            label,
            weight,
        }
    }
}

impl LabeledSequence<Label> {
    pub fn positive(bytes: &[u8]) -> Self {
        Self::new(Sequence::from_utf8(bytes), Label::Positive)
    }

    pub fn negative(bytes: &[u8]) -> Self {
        Self::new(Sequence::from_utf8(bytes), Label::Negative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_label_from_target() {
        check!(Label::from_target(0.0) == Label::Negative);
        check!(Label::from_target(-0.0) == Label::Negative);
        for target in [1.0, 2.0, 0.5, -1.0] {
            check!(Label::from_target(target) == Label::Positive);
        }
    }
}
