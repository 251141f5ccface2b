//! Fixed-size encodings and window scorers for protein sequences.

pub mod alphabet;
pub mod error;
pub mod structs;
pub mod tables;
pub mod util;

pub mod ctd;
pub use ctd::{encode_ctd, CtdEncoder};

pub mod pssm;
pub use pssm::{score_pssm, train_pssm, PssmParams, PssmParamsBuilder};

pub mod miles;
pub use miles::{
    embed_miles, train_miles, EmbeddedDataset, MilesParams, MilesParamsBuilder, MilesRegressor,
    ReferenceWindowSet, Subsample,
};

pub mod learner;
pub use learner::{BaseLearner, MeanLearner, NearestNeighborLearner};

pub mod balance;
pub use balance::{BalanceParams, BalanceParamsBuilder, BalancedLearner};

pub mod propensity;
pub use propensity::PropensityScorer;

pub mod scan;
pub use scan::{
    scan, scan_all, ScanMode, ScanParams, ScanParamsBuilder, WindowPrediction, WindowScorer,
};
