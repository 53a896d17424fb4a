// src/markers/frequency.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How densely bar/beat markers are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerFrequency {
    Bar8,
    Bar4,
    Bar2,
    #[default]
    Bar,
    HalfBar,
    Beat,
}

impl MarkerFrequency {
    /// Coarsest to finest.
    pub const ALL: [MarkerFrequency; 6] = [
        MarkerFrequency::Bar8,
        MarkerFrequency::Bar4,
        MarkerFrequency::Bar2,
        MarkerFrequency::Bar,
        MarkerFrequency::HalfBar,
        MarkerFrequency::Beat,
    ];

    /// Bars added to (or removed from) the bar offset by one shift action.
    ///
    /// A beat step is one beat of the bar, so the offset's fractional part
    /// always stays a whole number of beats.
    pub fn shift_increment(self, beats_per_bar: u32) -> f64 {
        match self {
            MarkerFrequency::Bar8 => 8.0,
            MarkerFrequency::Bar4 => 4.0,
            MarkerFrequency::Bar2 => 2.0,
            MarkerFrequency::Bar => 1.0,
            MarkerFrequency::HalfBar => 0.5,
            MarkerFrequency::Beat => 1.0 / beats_per_bar.max(1) as f64,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MarkerFrequency::Bar8 => "bar8",
            MarkerFrequency::Bar4 => "bar4",
            MarkerFrequency::Bar2 => "bar2",
            MarkerFrequency::Bar => "bar",
            MarkerFrequency::HalfBar => "halfbar",
            MarkerFrequency::Beat => "beat",
        }
    }
}

impl fmt::Display for MarkerFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown marker frequency '{0}' (expected bar8, bar4, bar2, bar, halfbar or beat)")]
pub struct ParseFrequencyError(pub String);

impl FromStr for MarkerFrequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        MarkerFrequency::ALL
            .into_iter()
            .find(|f| f.as_str() == needle)
            .ok_or_else(|| ParseFrequencyError(s.to_string()))
    }
}
