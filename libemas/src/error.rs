use thiserror::Error;

/// A parameter, alphabet, or table that can't be used as given.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid configuration: {reason}")]
pub struct ConfigurationError {
    pub reason: String,
}

impl ConfigurationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// An input whose length doesn't match what a trained model expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{what}: expected length {expected}, found {found}")]
pub struct DimensionMismatchError {
    pub what: &'static str,
    pub expected: usize,
    pub found: usize,
}

/// Training data that can't produce a usable model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("degenerate training data: {reason}")]
pub struct DegenerateTrainingError {
    pub reason: String,
}

impl DegenerateTrainingError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
