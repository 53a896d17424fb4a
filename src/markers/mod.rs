// src/markers/mod.rs
//
// Bar/beat marker pipeline shared by every player instance:
// normalize the first beat, rotate by the bar offset, filter by frequency.

pub mod filter;
pub mod frequency;
pub mod normalize;
pub mod rotate;
pub mod snap;

pub use filter::{Marker, MarkerKind};
pub use frequency::{MarkerFrequency, ParseFrequencyError};
pub use normalize::normalize_first_beat;
pub use rotate::{OffsetSplit, RotatedBeat, rotate_beats};
pub use snap::{SnapFallback, find_nearest_marker_at_or_left_of};

use serde::Serialize;

use crate::beatmap::BeatMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkerOptions {
    pub beats_per_bar: u32,
    /// Bars per emphasis group; bar `n` is emphasised when `n % group == 1`.
    pub emphasis_group: i64,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            beats_per_bar: 4,
            emphasis_group: 4,
        }
    }
}

/// Markers visible for one player, ordered by time.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn times(&self) -> Vec<f64> {
        self.markers.iter().map(|m| m.time).collect()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
        self.markers.iter()
    }

    /// Snap `query` to the closest marker at or before it.
    pub fn snap(&self, query: f64, fallback: SnapFallback) -> f64 {
        find_nearest_marker_at_or_left_of(query, &self.times(), fallback)
    }
}

impl<'a> IntoIterator for &'a MarkerSet {
    type Item = &'a Marker;
    type IntoIter = std::slice::Iter<'a, Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}

/// Annotates every beat of `beatmap` under `bar_offset` (stages 1 and 2).
pub fn annotate_beats(beatmap: &BeatMap, bar_offset: f64, beats_per_bar: u32) -> Vec<RotatedBeat> {
    let normalized = normalize_first_beat(beatmap.events());
    rotate_beats(&normalized, bar_offset, beats_per_bar)
}

/// Runs the full pipeline. Pure: the same inputs always give the same set.
pub fn compute_markers(
    beatmap: &BeatMap,
    bar_offset: f64,
    frequency: MarkerFrequency,
    options: &MarkerOptions,
) -> MarkerSet {
    let annotated = annotate_beats(beatmap, bar_offset, options.beats_per_bar);
    let markers = filter::filter_markers(
        &annotated,
        frequency,
        options.beats_per_bar,
        options.emphasis_group,
    );
    MarkerSet { markers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beatmap::{BeatEvent, TempoGrid};

    #[test]
    fn empty_beatmap_gives_empty_set_at_every_frequency() {
        let empty = BeatMap::empty();
        for f in MarkerFrequency::ALL {
            assert!(compute_markers(&empty, 1.25, f, &MarkerOptions::default()).is_empty());
        }
    }

    #[test]
    fn wrong_first_label_is_fixed_before_counting() {
        let map = BeatMap::new(vec![
            BeatEvent::new(0.0, 4),
            BeatEvent::new(0.5, 2),
            BeatEvent::new(1.0, 3),
            BeatEvent::new(1.5, 4),
            BeatEvent::new(2.0, 1),
        ])
        .unwrap();
        let set = compute_markers(&map, 0.0, MarkerFrequency::Bar, &MarkerOptions::default());
        assert_eq!(set.times(), vec![0.0, 2.0]);
    }

    #[test]
    fn snap_uses_visible_markers() {
        let map = TempoGrid::default().beatmap(8.0);
        let set = compute_markers(&map, 0.0, MarkerFrequency::Bar, &MarkerOptions::default());
        assert_eq!(set.times(), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(set.snap(5.9, SnapFallback::TrackStart), 4.0);
    }

    #[test]
    fn serializes_as_marker_list() {
        let map = TempoGrid::default().beatmap(2.0);
        let set = compute_markers(&map, 0.0, MarkerFrequency::Bar, &MarkerOptions::default());
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json[0]["kind"], "emphasis_bar");
        assert_eq!(json[1]["bar_number"], 2);
    }
}
