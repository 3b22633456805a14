//! Visit records

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Gender codes found in visit files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "U")]
    Undetermined,
}

impl Gender {
    /// Single-letter code
    pub fn code(self) -> &'static str {
        match self {
            Gender::Female => "F",
            Gender::Male => "M",
            Gender::Undetermined => "U",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "F" => Ok(Gender::Female),
            "M" => Ok(Gender::Male),
            "U" => Ok(Gender::Undetermined),
            other => Err(Error::invalid_argument(format!("Unknown gender code: {other}"))),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Something that describes one visit.
///
/// Fields are optional because records start empty and are filled by whatever
/// reads them from a source.
pub trait Entry {
    /// Unique identifier of the visit
    fn id(&self) -> Option<&str>;

    fn arrival_date(&self) -> Option<NaiveDateTime>;

    fn departure_date(&self) -> Option<NaiveDateTime>;

    fn gender(&self) -> Option<Gender>;

    /// True when the gender is unknown or female
    fn is_girl(&self) -> bool {
        matches!(self.gender(), None | Some(Gender::Female))
    }

    /// Time between arrival and departure, when both are known
    fn length_of_stay(&self) -> Option<TimeDelta> {
        Some(self.departure_date()? - self.arrival_date()?)
    }
}

/// An emergency department visit
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdEntry {
    pub id: Option<String>,
    pub arrival_date: Option<NaiveDateTime>,
    pub departure_date: Option<NaiveDateTime>,
    pub gender: Option<Gender>,
}

impl EdEntry {
    /// Create an entry with every field unset
    pub fn new() -> Self {
        Self::default()
    }
}

impl Entry for EdEntry {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn arrival_date(&self) -> Option<NaiveDateTime> {
        self.arrival_date
    }

    fn departure_date(&self) -> Option<NaiveDateTime> {
        self.departure_date
    }

    fn gender(&self) -> Option<Gender> {
        self.gender
    }
}
