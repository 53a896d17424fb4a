// src/markers/normalize.rs

use crate::beatmap::BeatEvent;

/// Copies the events with the first one relabelled as beat 1.
///
/// Detectors are unreliable about the very first label, and bar counting
/// has to start from a known downbeat. Nothing else changes.
pub fn normalize_first_beat(events: &[BeatEvent]) -> Vec<BeatEvent> {
    let mut out = events.to_vec();
    if let Some(first) = out.first_mut() {
        first.beat_number = 1;
    }
    out
}
