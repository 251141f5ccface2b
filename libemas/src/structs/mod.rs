pub mod labeled;
pub use labeled::{Label, LabeledSequence};

pub mod profile;
pub use profile::Profile;

pub mod sequence;
pub use sequence::Sequence;

/// A fixed-length numeric encoding of a sequence.
pub type FeatureVector = Vec<f64>;
