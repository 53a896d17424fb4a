// src/player.rs

use serde::{Deserialize, Serialize};

use crate::beatmap::TrackInfo;
use crate::config::MarkerConfig;
use crate::markers::{self, MarkerFrequency, MarkerSet};
use crate::render::{self, MarkerPosition};

/// Marker controls owned by one player (parent or stem). Never shared.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerMarkerState {
    /// In bars. Fractional part is a whole number of beats.
    pub bar_offset: f64,
    pub frequency: MarkerFrequency,
    pub markers_enabled: bool,
}

impl Default for PlayerMarkerState {
    fn default() -> Self {
        Self {
            bar_offset: 0.0,
            frequency: MarkerFrequency::Bar,
            markers_enabled: true,
        }
    }
}

impl PlayerMarkerState {
    pub fn from_config(config: &MarkerConfig) -> Self {
        Self {
            bar_offset: 0.0,
            frequency: config.default_frequency,
            markers_enabled: config.markers_enabled,
        }
    }
}

/// One player instance and the markers it currently shows.
///
/// Every state change recomputes the marker set in full.
#[derive(Clone, Debug)]
pub struct MarkerPlayer {
    name: String,
    config: MarkerConfig,
    track: Option<TrackInfo>,
    state: PlayerMarkerState,
    markers: MarkerSet,
}

impl MarkerPlayer {
    pub fn new(name: impl Into<String>, config: MarkerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            track: None,
            state: PlayerMarkerState::from_config(&config),
            markers: MarkerSet::empty(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &MarkerConfig {
        &self.config
    }

    pub fn track(&self) -> Option<&TrackInfo> {
        self.track.as_ref()
    }

    pub fn state(&self) -> PlayerMarkerState {
        self.state
    }

    /// Loads a track. The bar offset goes back to 0; frequency and the
    /// markers toggle carry over.
    pub fn load_track(&mut self, track: TrackInfo) {
        if let Err(e) = track.beatmap.validate_beats(self.config.beats_per_bar) {
            log::warn!("[{}] beatmap for '{}': {}", self.name, track.name, e);
        }
        log::info!(
            "[{}] loaded '{}' ({} beats)",
            self.name,
            track.name,
            track.beatmap.len()
        );
        self.track = Some(track);
        self.state.bar_offset = 0.0;
        self.recompute();
    }

    pub fn unload_track(&mut self) -> Option<TrackInfo> {
        let track = self.track.take();
        self.state.bar_offset = 0.0;
        self.recompute();
        track
    }

    /// Restores a full state, e.g. from a saved session.
    pub fn restore_state(&mut self, state: PlayerMarkerState) {
        self.state = state;
        self.recompute();
    }

    pub fn shift_increment(&self) -> f64 {
        self.state.frequency.shift_increment(self.config.beats_per_bar)
    }

    /// Moves bar 1 later by one frequency step.
    pub fn shift_right(&mut self) {
        self.set_bar_offset(self.state.bar_offset + self.shift_increment());
    }

    /// Moves bar 1 earlier by one frequency step.
    pub fn shift_left(&mut self) {
        self.set_bar_offset(self.state.bar_offset - self.shift_increment());
    }

    pub fn set_bar_offset(&mut self, bar_offset: f64) {
        if !bar_offset.is_finite() {
            log::warn!("[{}] ignoring non-finite bar offset", self.name);
            return;
        }
        self.state.bar_offset = bar_offset;
        self.recompute();
    }

    pub fn set_frequency(&mut self, frequency: MarkerFrequency) {
        self.state.frequency = frequency;
        self.recompute();
    }

    pub fn set_markers_enabled(&mut self, enabled: bool) {
        self.state.markers_enabled = enabled;
        self.recompute();
    }

    pub fn toggle_markers(&mut self) -> bool {
        self.set_markers_enabled(!self.state.markers_enabled);
        self.state.markers_enabled
    }

    /// Visible markers; empty while markers are switched off or no track is loaded.
    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Snaps a loop point to the nearest visible marker at or before `query`.
    /// With markers off nothing snaps and `query` comes back unchanged.
    pub fn snap(&self, query: f64) -> f64 {
        if !self.state.markers_enabled {
            return query;
        }
        self.markers.snap(query, self.config.snap_fallback)
    }

    /// Marker positions as a percentage of the track duration.
    pub fn marker_positions(&self) -> Vec<MarkerPosition> {
        let duration = self.track.as_ref().and_then(|t| t.duration);
        render::marker_positions(&self.markers, duration)
    }

    fn recompute(&mut self) {
        self.markers = match &self.track {
            Some(track) if self.state.markers_enabled => markers::compute_markers(
                &track.beatmap,
                self.state.bar_offset,
                self.state.frequency,
                &self.config.marker_options(),
            ),
            _ => MarkerSet::empty(),
        };

        log::debug!(
            "[{}] markers: offset={} frequency={} enabled={} -> {}",
            self.name,
            self.state.bar_offset,
            self.state.frequency,
            self.state.markers_enabled,
            self.markers.len()
        );
    }
}
