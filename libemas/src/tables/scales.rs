use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Amino acid propensity scales shipped with the library.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
pub enum PropensityScaleName {
    /// Parker, Guo & Hodges (1986) hydrophilicity
    Parker,
    /// Kyte & Doolittle (1982) hydropathy
    KyteDoolittle,
    /// Hopp & Woods (1981) hydrophilicity
    HoppWoods,
}

impl PropensityScaleName {
    /// The scale values, in "ACDEFGHIKLMNPQRSTVWY" order.
    pub fn values(self) -> &'static [f64; 20] {
        match self {
            PropensityScaleName::Parker => &PARKER_HYDROPHILICITY,
            PropensityScaleName::KyteDoolittle => &KYTE_DOOLITTLE_HYDROPATHY,
            PropensityScaleName::HoppWoods => &HOPP_WOODS_HYDROPHILICITY,
        }
    }
}

#[rustfmt::skip]
pub const PARKER_HYDROPHILICITY: [f64; 20] = [
    2.1,   // A
    1.4,   // C
    10.0,  // D
    7.8,   // E
    -9.2,  // F
    5.7,   // G
    2.1,   // H
    -8.0,  // I
    5.7,   // K
    -9.2,  // L
    -4.2,  // M
    7.0,   // N
    2.1,   // P
    6.0,   // Q
    4.2,   // R
    6.5,   // S
    5.2,   // T
    -3.7,  // V
    -10.0, // W
    -1.9,  // Y
];

#[rustfmt::skip]
pub const KYTE_DOOLITTLE_HYDROPATHY: [f64; 20] = [
    1.8,  // A
    2.5,  // C
    -3.5, // D
    -3.5, // E
    2.8,  // F
    -0.4, // G
    -3.2, // H
    4.5,  // I
    -3.9, // K
    3.8,  // L
    1.9,  // M
    -3.5, // N
    -1.6, // P
    -3.5, // Q
    -4.5, // R
    -0.8, // S
    -0.7, // T
    4.2,  // V
    -0.9, // W
    -1.3, // Y
];

#[rustfmt::skip]
pub const HOPP_WOODS_HYDROPHILICITY: [f64; 20] = [
    -0.5, // A
    -1.0, // C
    3.0,  // D
    3.0,  // E
    -2.5, // F
    0.0,  // G
    -0.5, // H
    -1.8, // I
    3.0,  // K
    -1.8, // L
    -1.3, // M
    0.2,  // N
    0.0,  // P
    0.2,  // Q
    3.0,  // R
    0.3,  // S
    -0.4, // T
    -1.5, // V
    -3.4, // W
    -2.3, // Y
];
