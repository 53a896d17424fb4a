// src/lib.rs

pub mod beatmap;
pub mod config;
pub mod marker_controller;
pub mod markers;
pub mod player;
pub mod render;
pub mod session;

pub use beatmap::{BeatEvent, BeatMap, BeatMapError, TempoGrid, TrackInfo};
pub use config::MarkerConfig;
pub use markers::{
    Marker, MarkerFrequency, MarkerKind, MarkerOptions, MarkerSet, SnapFallback, compute_markers,
    find_nearest_marker_at_or_left_of,
};
pub use player::{MarkerPlayer, PlayerMarkerState};
pub use session::{MarkerSession, PlayerId, ShiftDirection};
