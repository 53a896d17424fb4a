// src/render/mod.rs
pub mod terminal;

use serde::Serialize;

use crate::markers::{MarkerKind, MarkerSet};

/// Where a marker tick goes along the waveform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerPosition {
    pub time: f64,
    /// `time / duration * 100`.
    pub percent: f64,
    pub bar_number: i64,
    pub kind: MarkerKind,
}

/// Positions for every marker, or nothing if the duration is unknown or not positive.
pub fn marker_positions(markers: &MarkerSet, duration: Option<f64>) -> Vec<MarkerPosition> {
    let duration = match duration {
        Some(d) if d.is_finite() && d > 0.0 => d,
        _ => return Vec::new(),
    };

    markers
        .iter()
        .map(|m| MarkerPosition {
            time: m.time,
            percent: m.time / duration * 100.0,
            bar_number: m.bar_number,
            kind: m.kind,
        })
        .collect()
}
