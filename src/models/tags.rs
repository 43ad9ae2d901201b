//! Fixed tag vocabulary for restaurant records.
//!
//! Upstream aggregation hands us free-form strings. They are normalized
//! (`"Family Style"`, `"family-style"` → `family_style`) and parsed into the
//! enumerated tags below; anything else is reported as unknown so that the
//! vocabulary can be audited instead of silently drifting.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How a restaurant serves its food
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStyleTag {
    FamilyStyle,
    SharePlates,
    Casual,
    FineDining,
    CounterService,
    Buffet,
    Takeout,
}

/// Tags that satisfy the family-style requirement
pub const FAMILY_SERVICE_TAGS: [ServiceStyleTag; 2] =
    [ServiceStyleTag::FamilyStyle, ServiceStyleTag::SharePlates];

impl ServiceStyleTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FamilyStyle => "family_style",
            Self::SharePlates => "share_plates",
            Self::Casual => "casual",
            Self::FineDining => "fine_dining",
            Self::CounterService => "counter_service",
            Self::Buffet => "buffet",
            Self::Takeout => "takeout",
        }
    }
}

impl FromStr for ServiceStyleTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_tag(s).as_str() {
            "family_style" => Ok(Self::FamilyStyle),
            "share_plates" => Ok(Self::SharePlates),
            "casual" => Ok(Self::Casual),
            "fine_dining" => Ok(Self::FineDining),
            "counter_service" => Ok(Self::CounterService),
            "buffet" => Ok(Self::Buffet),
            "takeout" => Ok(Self::Takeout),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for ServiceStyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signals that a venue copes well with groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSignal {
    LargeTables,
    KidsMenu,
    PrivateRoom,
    NoiseTolerant,
    OutdoorSeating,
    Reservations,
}

impl GroupSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LargeTables => "large_tables",
            Self::KidsMenu => "kids_menu",
            Self::PrivateRoom => "private_room",
            Self::NoiseTolerant => "noise_tolerant",
            Self::OutdoorSeating => "outdoor_seating",
            Self::Reservations => "reservations",
        }
    }
}

impl FromStr for GroupSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_tag(s).as_str() {
            "large_tables" => Ok(Self::LargeTables),
            "kids_menu" => Ok(Self::KidsMenu),
            "private_room" => Ok(Self::PrivateRoom),
            "noise_tolerant" => Ok(Self::NoiseTolerant),
            "outdoor_seating" => Ok(Self::OutdoorSeating),
            "reservations" => Ok(Self::Reservations),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for GroupSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase, trim, and fold `-` and spaces into `_`
pub fn normalize_tag(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Parsed tag set plus the raw strings that did not belong to the vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet<T: Ord> {
    pub known: BTreeSet<T>,
    pub unknown: Vec<String>,
}

impl<T> TagSet<T>
where
    T: Ord + FromStr,
{
    pub fn parse<'a, I>(raw: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut known = BTreeSet::new();
        let mut unknown = Vec::new();
        for tag in raw {
            match tag.parse::<T>() {
                Ok(parsed) => {
                    known.insert(parsed);
                }
                Err(_) => unknown.push(tag.clone()),
            }
        }
        Self { known, unknown }
    }

    pub fn contains(&self, tag: &T) -> bool {
        self.known.contains(tag)
    }

    /// True when this set shares at least one tag with `wanted`
    pub fn intersects(&self, wanted: &[T]) -> bool {
        wanted.iter().any(|tag| self.known.contains(tag))
    }
}
