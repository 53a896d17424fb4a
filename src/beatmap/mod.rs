// src/beatmap/mod.rs

pub mod tempo;

pub use tempo::TempoGrid;

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// One detected beat: when it happens and where it sits inside its bar.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BeatEvent {
    /// Seconds from track start.
    pub time: f64,
    /// 1-based position within the bar, as labelled by the detector.
    pub beat_number: i64,
}

impl BeatEvent {
    pub fn new(time: f64, beat_number: i64) -> Self {
        Self { time, beat_number }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BeatMapError {
    #[error("beat {index} has a non-finite time ({time})")]
    NonFiniteTime { index: usize, time: f64 },

    #[error("beat {index} at {time}s comes before the previous beat at {previous}s")]
    OutOfOrder { index: usize, time: f64, previous: f64 },

    #[error("beat {index} is labelled beat {beat_number}, outside 1..={beats_per_bar}")]
    BeatOutOfRange {
        index: usize,
        beat_number: i64,
        beats_per_bar: u32,
    },
}

/// Time-ordered beat events for a single track.
///
/// Deserializes straight from the provider's `[{ "time", "beatNumber" }]` array.
/// Ordering and finiteness are checked on construction, so every `BeatMap`
/// the pipeline sees is sorted by time.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(try_from = "Vec<BeatEvent>", into = "Vec<BeatEvent>")]
pub struct BeatMap {
    events: Vec<BeatEvent>,
}

impl BeatMap {
    pub fn new(events: Vec<BeatEvent>) -> Result<Self, BeatMapError> {
        if let Some((index, ev)) = events.iter().enumerate().find(|(_, e)| !e.time.is_finite()) {
            return Err(BeatMapError::NonFiniteTime { index, time: ev.time });
        }

        if let Some((index, (prev, cur))) = events
            .iter()
            .tuple_windows()
            .enumerate()
            .find(|(_, (prev, cur))| cur.time < prev.time)
        {
            return Err(BeatMapError::OutOfOrder {
                index: index + 1,
                time: cur.time,
                previous: prev.time,
            });
        }

        Ok(Self { events })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Labels raw detector beat times cyclically 1, 2, .., beats_per_bar.
    /// The first time becomes beat 1; times are sorted first.
    pub fn from_beat_times(times: &[f32], beats_per_bar: u32) -> Self {
        let bpb = beats_per_bar.max(1) as i64;
        let events = times
            .iter()
            .filter(|t| t.is_finite())
            .map(|&t| t as f64)
            .sorted_by(|a, b| a.total_cmp(b))
            .enumerate()
            .map(|(i, time)| BeatEvent::new(time, (i as i64 % bpb) + 1))
            .collect();
        Self { events }
    }

    pub fn events(&self) -> &[BeatEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Reports the first beat label outside `1..=beats_per_bar`.
    ///
    /// The marker pipeline tolerates such labels (they are wrapped once a
    /// fractional offset applies), so callers treat this as a warning.
    pub fn validate_beats(&self, beats_per_bar: u32) -> Result<(), BeatMapError> {
        let upper = beats_per_bar as i64;
        match self
            .events
            .iter()
            .position(|e| e.beat_number < 1 || e.beat_number > upper)
        {
            Some(index) => Err(BeatMapError::BeatOutOfRange {
                index,
                beat_number: self.events[index].beat_number,
                beats_per_bar,
            }),
            None => Ok(()),
        }
    }
}

impl TryFrom<Vec<BeatEvent>> for BeatMap {
    type Error = BeatMapError;

    fn try_from(events: Vec<BeatEvent>) -> Result<Self, Self::Error> {
        Self::new(events)
    }
}

impl From<BeatMap> for Vec<BeatEvent> {
    fn from(map: BeatMap) -> Self {
        map.events
    }
}

/// What the track provider hands over for one audio file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackInfo {
    pub name: String,
    /// Seconds. Only the renderer needs it; `None` or 0 just means no percentages.
    #[serde(default)]
    pub duration: Option<f64>,
    pub beatmap: BeatMap,
}

impl TrackInfo {
    pub fn new(name: impl Into<String>, duration: Option<f64>, beatmap: BeatMap) -> Self {
        Self {
            name: name.into(),
            duration,
            beatmap,
        }
    }

    pub fn save_to_disk(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_from_disk(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening track file {}", path.display()))?;
        let reader = BufReader::new(file);
        let track = serde_json::from_reader(reader)
            .with_context(|| format!("parsing track file {}", path.display()))?;
        Ok(track)
    }

    /// Loads a raw detector output: a JSON array of beat times in seconds.
    /// Beats are labelled cyclically from the first one; the duration is unknown.
    pub fn load_beat_times(path: impl AsRef<Path>, beats_per_bar: u32) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening beat times {}", path.display()))?;
        let reader = BufReader::new(file);
        let times: Vec<f32> = serde_json::from_reader(reader)
            .with_context(|| format!("parsing beat times {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, None, BeatMap::from_beat_times(&times, beats_per_bar)))
    }
}
