// src/markers/rotate.rs

use serde::Serialize;

use crate::beatmap::BeatEvent;

/// A bar offset split into whole bars and leftover beats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OffsetSplit {
    pub integer_bars: i64,
    pub fractional_beats: i64,
}

impl OffsetSplit {
    /// `2.75` bars in 4/4 -> 2 bars + 3 beats.
    ///
    /// Only offsets that are whole multiples of `1 / beats_per_bar` split
    /// exactly; anything in between is rounded to the nearest beat.
    pub fn from_bar_offset(bar_offset: f64, beats_per_bar: u32) -> Self {
        if !bar_offset.is_finite() {
            return Self { integer_bars: 0, fractional_beats: 0 };
        }
        // Whole beats first: 1.9999999999999998 bars in 3/4 is 2 bars + 0 beats.
        let bpb = beats_per_bar.max(1) as i64;
        let total_beats = (bar_offset * bpb as f64).round() as i64;
        Self {
            integer_bars: total_beats.div_euclid(bpb),
            fractional_beats: total_beats.rem_euclid(bpb),
        }
    }
}

/// A beat after re-deriving bars under a bar offset.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RotatedBeat {
    pub time: f64,
    pub beat_number: i64,
    /// Bar counted from the unshifted labels.
    pub original_bar_number: i64,
    /// Position within the bar after the fractional shift.
    pub rotated_beat_number: i64,
    /// Final bar number. Zero or negative before the first shifted downbeat.
    pub bar_number: i64,
}

/// Wraps `beat` into `1..=beats_per_bar`.
pub fn wrap_beat(beat: i64, beats_per_bar: u32) -> i64 {
    let bpb = beats_per_bar.max(1) as i64;
    (beat - 1).rem_euclid(bpb) + 1
}

/// Running bar counter: starts at 0 and ticks on every downbeat.
fn count_bars<I>(beats: I) -> Vec<i64>
where
    I: IntoIterator<Item = i64>,
{
    beats
        .into_iter()
        .scan(0i64, |bar, beat| {
            if beat == 1 {
                *bar += 1;
            }
            Some(*bar)
        })
        .collect()
}

/// Applies a bar offset to (already normalized) beat events.
///
/// The fractional part relabels every beat first, bar boundaries are then
/// recounted from the relabelled downbeats, and only after that are whole
/// bars subtracted.
pub fn rotate_beats(events: &[BeatEvent], bar_offset: f64, beats_per_bar: u32) -> Vec<RotatedBeat> {
    let split = OffsetSplit::from_bar_offset(bar_offset, beats_per_bar);

    let original_bars = count_bars(events.iter().map(|e| e.beat_number));

    let rotated_beats: Vec<i64> = if split.fractional_beats == 0 {
        events.iter().map(|e| e.beat_number).collect()
    } else {
        events
            .iter()
            .map(|e| wrap_beat(e.beat_number - split.fractional_beats, beats_per_bar))
            .collect()
    };

    let rotated_bars = count_bars(rotated_beats.iter().copied());

    events
        .iter()
        .zip(original_bars)
        .zip(rotated_beats)
        .zip(rotated_bars)
        .map(|(((ev, original_bar), rotated_beat), rotated_bar)| RotatedBeat {
            time: ev.time,
            beat_number: ev.beat_number,
            original_bar_number: original_bar,
            rotated_beat_number: rotated_beat,
            bar_number: rotated_bar - split.integer_bars,
        })
        .collect()
}
