//! Crime Type Module
//! Fixed association between human-readable crime labels and NCRB CSV columns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown crime type: {0}")]
pub struct ParseCrimeTypeError(pub String);

/// IPC crime categories shown on the dashboard.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum CrimeType {
    #[default]
    Murder,
    Rape,
    KidnappingAbduction,
    Robbery,
    Burglary,
    Theft,
    Riots,
    DowryDeaths,
    AssaultOnWomen,
    CrueltyByHusband,
}

impl CrimeType {
    /// All crime types, in display order.
    pub const ALL: [CrimeType; 10] = [
        CrimeType::Murder,
        CrimeType::Rape,
        CrimeType::KidnappingAbduction,
        CrimeType::Robbery,
        CrimeType::Burglary,
        CrimeType::Theft,
        CrimeType::Riots,
        CrimeType::DowryDeaths,
        CrimeType::AssaultOnWomen,
        CrimeType::CrueltyByHusband,
    ];

    /// Label shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            CrimeType::Murder => "Murder",
            CrimeType::Rape => "Rape",
            CrimeType::KidnappingAbduction => "Kidnapping & Abduction",
            CrimeType::Robbery => "Robbery",
            CrimeType::Burglary => "Burglary",
            CrimeType::Theft => "Theft",
            CrimeType::Riots => "Riots",
            CrimeType::DowryDeaths => "Dowry Deaths",
            CrimeType::AssaultOnWomen => "Assault on Women",
            CrimeType::CrueltyByHusband => "Cruelty by Husband",
        }
    }

    /// Name of the count column in the source CSV files.
    pub fn column(self) -> &'static str {
        match self {
            CrimeType::Murder => "MURDER",
            CrimeType::Rape => "RAPE",
            CrimeType::KidnappingAbduction => "KIDNAPPING & ABDUCTION",
            CrimeType::Robbery => "ROBBERY",
            CrimeType::Burglary => "BURGLARY",
            CrimeType::Theft => "THEFT",
            CrimeType::Riots => "RIOTS",
            CrimeType::DowryDeaths => "DOWRY DEATHS",
            CrimeType::AssaultOnWomen => "ASSAULT ON WOMEN WITH INTENT TO OUTRAGE HER MODESTY",
            CrimeType::CrueltyByHusband => "CRUELTY BY HUSBAND OR HIS RELATIVES",
        }
    }

    /// Kebab-case name used on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            CrimeType::Murder => "murder",
            CrimeType::Rape => "rape",
            CrimeType::KidnappingAbduction => "kidnapping-abduction",
            CrimeType::Robbery => "robbery",
            CrimeType::Burglary => "burglary",
            CrimeType::Theft => "theft",
            CrimeType::Riots => "riots",
            CrimeType::DowryDeaths => "dowry-deaths",
            CrimeType::AssaultOnWomen => "assault-on-women",
            CrimeType::CrueltyByHusband => "cruelty-by-husband",
        }
    }

    /// Look up the crime type backed by a CSV column.
    pub fn from_column(column: &str) -> Option<CrimeType> {
        Self::ALL.into_iter().find(|c| c.column() == column)
    }
}

impl fmt::Display for CrimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CrimeType {
    type Err = ParseCrimeTypeError;

    /// Accepts the label, the CSV column or the slug, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| {
                c.label().eq_ignore_ascii_case(needle)
                    || c.column().eq_ignore_ascii_case(needle)
                    || c.slug().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ParseCrimeTypeError(s.to_string()))
    }
}

impl TryFrom<String> for CrimeType {
    type Error = ParseCrimeTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CrimeType> for String {
    fn from(value: CrimeType) -> Self {
        value.label().to_string()
    }
}
