// src/markers/snap.rs

use serde::{Deserialize, Serialize};

/// What a snap returns when no marker lies at or before the query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapFallback {
    /// Snap to the start of the track (0s). Used for loop starts.
    #[default]
    TrackStart,
    /// Leave the query untouched, i.e. no snap.
    QueryTime,
}

impl SnapFallback {
    fn resolve(self, query: f64) -> f64 {
        match self {
            SnapFallback::TrackStart => 0.0,
            SnapFallback::QueryTime => query,
        }
    }
}

/// Largest marker time `<= query`, or `fallback` if there is none.
///
/// `markers` must be sorted ascending, which every marker set is.
pub fn find_nearest_marker_at_or_left_of(query: f64, markers: &[f64], fallback: SnapFallback) -> f64 {
    let idx = markers.partition_point(|&t| t <= query);
    if idx == 0 {
        fallback.resolve(query)
    } else {
        markers[idx - 1]
    }
}
