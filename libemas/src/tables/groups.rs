use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

use crate::alphabet::Alphabet;
use crate::error::ConfigurationError;

/// One of the three classes of a grouped (reduced) alphabet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumCount, Serialize, Deserialize)]
pub enum Group {
    One,
    Two,
    Three,
}

impl Group {
    pub fn idx(self) -> usize {
        self as usize
    }

    fn from_utf8(byte: u8) -> Option<Self> {
        match byte {
            b'1' => Some(Group::One),
            b'2' => Some(Group::Two),
            b'3' => Some(Group::Three),
            _ => None,
        }
    }
}

/// The physico-chemical properties used to group the amino acids for CTD.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumCount, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum GroupProperty {
    Hydrophobicity,
    Polarizability,
    Polarity,
    Volume,
}

impl GroupProperty {
    /// The group of each amino acid, in "ACDEFGHIKLMNPQRSTVWY" order.
    pub fn amino_groups(self) -> &'static str {
        match self {
            GroupProperty::Hydrophobicity => "23113223133121122332",
            GroupProperty::Polarizability => "11123132323212311233",
            GroupProperty::Polarity => "21331231311323322111",
            GroupProperty::Volume => "12123132323222311233",
        }
    }
}

/// Maps every symbol of an alphabet to one of three groups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupMap {
    pub name: String,
    pub alphabet: Alphabet,
    groups: Vec<Group>,
}

impl GroupMap {
    /// `groups` holds one of '1', '2', '3' for each symbol of the alphabet, in order.
    pub fn new(
        name: impl Into<String>,
        alphabet: Alphabet,
        groups: &str,
    ) -> anyhow::Result<Self> {
        if groups.len() != alphabet.len() {
            return Err(ConfigurationError::new(format!(
                "group string has {} entries for an alphabet of {} symbols",
                groups.len(),
                alphabet.len()
            ))
            .into());
        }

        let groups = groups
            .bytes()
            .map(|byte| {
                Group::from_utf8(byte).ok_or_else(|| {
                    ConfigurationError::new(format!("invalid group label: {}", char::from(byte)))
                })
            })
            .collect::<Result<Vec<Group>, ConfigurationError>>()?;

        Ok(Self {
            name: name.into(),
            alphabet,
            groups,
        })
    }

    pub fn for_property(property: GroupProperty) -> Self {
        Self {
            name: property.to_string(),
            alphabet: Alphabet::amino(),
            groups: property
                .amino_groups()
                .bytes()
                .filter_map(Group::from_utf8)
                .collect(),
        }
    }

    /// The hydrophobicity, polarizability, polarity and volume maps, in that order.
    pub fn defaults() -> Vec<Self> {
        GroupProperty::iter().map(Self::for_property).collect()
    }

    #[inline(always)]
    pub fn group_of(&self, byte: u8) -> Option<Group> {
        self.alphabet.index_of(byte).map(|idx| self.groups[idx])
    }

    /// Reduce a sequence to its groups, skipping symbols outside the alphabet.
    pub fn reduce(&self, bytes: &[u8]) -> Vec<Group> {
        bytes.iter().filter_map(|&b| self.group_of(b)).collect()
    }
}
