// src/config.rs

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::markers::{MarkerFrequency, MarkerOptions, SnapFallback};

/// Settings shared by every player in a session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub beats_per_bar: u32,
    pub default_frequency: MarkerFrequency,
    pub markers_enabled: bool,
    pub snap_fallback: SnapFallback,
    pub emphasis_group: u32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            beats_per_bar: 4,
            default_frequency: MarkerFrequency::Bar,
            markers_enabled: true,
            snap_fallback: SnapFallback::TrackStart,
            emphasis_group: 4,
        }
    }
}

impl MarkerConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.beats_per_bar > 0, "beats_per_bar must be at least 1");
        ensure!(self.emphasis_group > 0, "emphasis_group must be at least 1");
        Ok(())
    }

    pub fn marker_options(&self) -> MarkerOptions {
        MarkerOptions {
            beats_per_bar: self.beats_per_bar.max(1),
            emphasis_group: self.emphasis_group.max(1) as i64,
        }
    }

    pub fn save_to_disk(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Missing fields fall back to their defaults.
    pub fn load_from_disk(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Self = serde_json::from_reader(reader)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}
