// src/markers/filter.rs

use serde::{Deserialize, Serialize};

use super::frequency::MarkerFrequency;
use super::rotate::RotatedBeat;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// First bar of an emphasis group (bar 1, 5, 9, ... by default).
    EmphasisBar,
    Bar,
    Beat,
}

impl MarkerKind {
    pub fn is_bar(self) -> bool {
        matches!(self, MarkerKind::EmphasisBar | MarkerKind::Bar)
    }

    pub fn is_beat(self) -> bool {
        self == MarkerKind::Beat
    }

    pub fn is_emphasis_bar(self) -> bool {
        self == MarkerKind::EmphasisBar
    }
}

/// One visible marker.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Marker {
    pub time: f64,
    pub bar_number: i64,
    /// Beat within the bar after rotation.
    pub beat: i64,
    pub kind: MarkerKind,
}

/// `bar_number % period == 1` with truncating remainder, so bars at or
/// below zero never match (e.g. `-7 % 8 == -7`).
pub fn is_period_start(bar_number: i64, period: i64) -> bool {
    match period {
        p if p <= 0 => false,
        1 => true,
        p => bar_number % p == 1,
    }
}

/// The beat halfway through the bar: 3 in 4/4, 2 in 3/4.
pub fn mid_bar_beat(beats_per_bar: u32) -> i64 {
    beats_per_bar.max(1) as i64 / 2 + 1
}

pub fn is_retained(beat: &RotatedBeat, frequency: MarkerFrequency, beats_per_bar: u32) -> bool {
    let downbeat = beat.rotated_beat_number == 1;
    match frequency {
        MarkerFrequency::Bar8 => downbeat && is_period_start(beat.bar_number, 8),
        MarkerFrequency::Bar4 => downbeat && is_period_start(beat.bar_number, 4),
        MarkerFrequency::Bar2 => downbeat && is_period_start(beat.bar_number, 2),
        MarkerFrequency::Bar => downbeat,
        MarkerFrequency::HalfBar => {
            downbeat || beat.rotated_beat_number == mid_bar_beat(beats_per_bar)
        }
        MarkerFrequency::Beat => true,
    }
}

pub fn classify(beat: &RotatedBeat, emphasis_group: i64) -> MarkerKind {
    if beat.rotated_beat_number != 1 {
        MarkerKind::Beat
    } else if is_period_start(beat.bar_number, emphasis_group) {
        MarkerKind::EmphasisBar
    } else {
        MarkerKind::Bar
    }
}

/// Keeps the beats visible at `frequency`, in input order.
pub fn filter_markers(
    beats: &[RotatedBeat],
    frequency: MarkerFrequency,
    beats_per_bar: u32,
    emphasis_group: i64,
) -> Vec<Marker> {
    beats
        .iter()
        .filter(|b| is_retained(b, frequency, beats_per_bar))
        .map(|b| Marker {
            time: b.time,
            bar_number: b.bar_number,
            beat: b.rotated_beat_number,
            kind: classify(b, emphasis_group),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beat(time: f64, rotated: i64, bar: i64) -> RotatedBeat {
        RotatedBeat {
            time,
            beat_number: rotated,
            original_bar_number: bar,
            rotated_beat_number: rotated,
            bar_number: bar,
        }
    }

    /// 17 bars of 4/4, one downbeat per second, bars numbered from `first_bar`.
    fn bars(first_bar: i64) -> Vec<RotatedBeat> {
        (0..17)
            .flat_map(|bar| {
                (1..=4).map(move |b| beat(bar as f64 + (b - 1) as f64 * 0.25, b, first_bar + bar))
            })
            .collect()
    }

    fn bar_numbers(markers: &[Marker]) -> Vec<i64> {
        markers.iter().map(|m| m.bar_number).collect()
    }

    #[test]
    fn bar_periods() {
        let input = bars(1);
        assert_eq!(bar_numbers(&filter_markers(&input, MarkerFrequency::Bar8, 4, 4)), vec![1, 9, 17]);
        assert_eq!(bar_numbers(&filter_markers(&input, MarkerFrequency::Bar4, 4, 4)), vec![1, 5, 9, 13, 17]);
        assert_eq!(filter_markers(&input, MarkerFrequency::Bar2, 4, 4).len(), 9);
        assert_eq!(filter_markers(&input, MarkerFrequency::Bar, 4, 4).len(), 17);
        assert_eq!(filter_markers(&input, MarkerFrequency::HalfBar, 4, 4).len(), 34);
        assert_eq!(filter_markers(&input, MarkerFrequency::Beat, 4, 4).len(), 68);
    }

    #[test]
    fn negative_bars_use_truncating_remainder() {
        // bars -7..=9
        let input = bars(-7);
        assert_eq!(bar_numbers(&filter_markers(&input, MarkerFrequency::Bar8, 4, 4)), vec![1, 9]);
        assert_eq!(bar_numbers(&filter_markers(&input, MarkerFrequency::Bar4, 4, 4)), vec![1, 5, 9]);
        assert_eq!(bar_numbers(&filter_markers(&input, MarkerFrequency::Bar2, 4, 4)), vec![1, 3, 5, 7, 9]);
        assert!(!is_period_start(-7, 8));
        assert!(!is_period_start(-3, 4));
        assert!(!is_period_start(0, 2));
    }

    #[test]
    fn half_bar_keeps_beats_one_and_three() {
        let input = bars(1);
        let markers = filter_markers(&input[..8], MarkerFrequency::HalfBar, 4, 4);
        let beats: Vec<i64> = markers.iter().map(|m| m.beat).collect();
        assert_eq!(beats, vec![1, 3, 1, 3]);
        assert_eq!(mid_bar_beat(3), 2);
        assert_eq!(mid_bar_beat(1), 1);
    }

    #[test]
    fn classification() {
        let input = bars(1);
        let markers = filter_markers(&input[..24], MarkerFrequency::HalfBar, 4, 4);
        let kinds: Vec<MarkerKind> = markers.iter().filter(|m| m.beat == 1).map(|m| m.kind).collect();

        assert_eq!(
            kinds,
            vec![
                MarkerKind::EmphasisBar,
                MarkerKind::Bar,
                MarkerKind::Bar,
                MarkerKind::Bar,
                MarkerKind::EmphasisBar,
                MarkerKind::Bar,
            ]
        );
        assert!(markers.iter().filter(|m| m.beat == 3).all(|m| m.kind.is_beat()));
        assert!(MarkerKind::EmphasisBar.is_bar());
        assert!(!MarkerKind::Beat.is_bar());
    }

    #[test]
    fn emphasis_group_of_one_marks_every_bar() {
        let input = bars(1);
        let markers = filter_markers(&input, MarkerFrequency::Bar, 4, 1);
        assert!(markers.iter().all(|m| m.kind.is_emphasis_bar()));
    }

    #[test]
    fn order_is_preserved() {
        let input = bars(1);
        let markers = filter_markers(&input, MarkerFrequency::Beat, 4, 4);
        assert!(markers.windows(2).all(|w| w[0].time <= w[1].time));
    }
}
