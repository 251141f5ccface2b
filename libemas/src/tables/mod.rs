pub mod blosum;
pub use blosum::{SubstitutionMatrix, BLOSUM62, BLOSUM62_TARGET_FREQUENCIES};

pub mod groups;
pub use groups::{Group, GroupMap, GroupProperty};

pub mod scales;
pub use scales::PropensityScaleName;
