// src/beatmap/tempo.rs

use serde::{Deserialize, Serialize};

use super::{BeatEvent, BeatMap};

/// Upper bound on generated beats (about 23 hours at 1000 BPM).
const MAX_GRID_BEATS: u64 = 1_400_000;

/// A constant-tempo beat grid, for tracks whose tempo is known up front.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TempoGrid {
    pub bpm: f64,
    pub beats_per_bar: u32,
    /// Seconds at which the first downbeat lands.
    pub first_beat: f64,
}

impl Default for TempoGrid {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            beats_per_bar: 4,
            first_beat: 0.0,
        }
    }
}

impl TempoGrid {
    pub fn new(bpm: f64, beats_per_bar: u32, first_beat: f64) -> Self {
        Self {
            bpm,
            beats_per_bar,
            first_beat,
        }
    }

    /// Seconds per beat (e.g., 120 BPM -> 0.5s)
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Seconds per bar (e.g., 4/4 @ 120 BPM -> 2.0s)
    pub fn seconds_per_bar(&self) -> f64 {
        self.seconds_per_beat() * self.beats_per_bar as f64
    }

    /// Builds the beatmap covering `[first_beat, duration]`.
    /// Returns an empty map unless tempo and duration are finite and positive.
    pub fn beatmap(&self, duration: f64) -> BeatMap {
        let spb = self.seconds_per_beat();
        let valid = self.bpm.is_finite()
            && self.bpm > 0.0
            && duration.is_finite()
            && duration > 0.0
            && self.first_beat.is_finite()
            && spb > 0.0;
        if !valid {
            return BeatMap::empty();
        }
        if (duration - self.first_beat) / spb > MAX_GRID_BEATS as f64 {
            log::warn!(
                "tempo grid of {} BPM over {}s exceeds {} beats, skipping",
                self.bpm,
                duration,
                MAX_GRID_BEATS
            );
            return BeatMap::empty();
        }

        let bpb = self.beats_per_bar.max(1) as u64;
        let mut events = Vec::new();

        // Step by integer index so the times don't drift.
        let mut step_index = 0u64;
        loop {
            let time = self.first_beat + step_index as f64 * spb;
            if time > duration + 0.001 {
                break;
            }
            let beat_number = (step_index % bpb) as i64 + 1;
            events.push(BeatEvent::new(time, beat_number));
            step_index += 1;
        }

        // Times are generated in ascending order, so this cannot fail.
        BeatMap::new(events).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_at_120_bpm() {
        let grid = TempoGrid::default();
        let map = grid.beatmap(4.0);

        assert_eq!(map.len(), 9);
        assert_eq!(map.events()[0], BeatEvent::new(0.0, 1));
        assert_eq!(map.events()[3], BeatEvent::new(1.5, 4));
        assert_eq!(map.events()[4], BeatEvent::new(2.0, 1));
        assert_eq!(grid.seconds_per_bar(), 2.0);
    }

    #[test]
    fn grid_respects_first_beat_and_meter() {
        let grid = TempoGrid::new(60.0, 3, 0.25);
        let map = grid.beatmap(3.3);
        let beats: Vec<i64> = map.events().iter().map(|e| e.beat_number).collect();

        assert_eq!(beats, vec![1, 2, 3, 1]);
        assert_eq!(map.events()[3].time, 3.25);
    }

    #[test]
    fn degenerate_grid_is_empty() {
        assert!(TempoGrid::new(0.0, 4, 0.0).beatmap(10.0).is_empty());
        assert!(TempoGrid::default().beatmap(0.0).is_empty());
    }

    #[test]
    fn infinite_inputs_give_empty_grid() {
        assert!(TempoGrid::new(f64::INFINITY, 4, 0.0).beatmap(1.0).is_empty());
        assert!(TempoGrid::default().beatmap(f64::INFINITY).is_empty());
        assert!(TempoGrid::new(f64::NAN, 4, 0.0).beatmap(1.0).is_empty());
        assert!(TempoGrid::new(120.0, 4, f64::NEG_INFINITY).beatmap(1.0).is_empty());
    }

    #[test]
    fn oversized_grid_is_refused() {
        assert!(TempoGrid::new(1e12, 4, 0.0).beatmap(10.0).is_empty());
        assert_eq!(TempoGrid::new(6000.0, 4, 0.0).beatmap(1.0).len(), 101);
    }
}
