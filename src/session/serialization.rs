use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use anyhow::{Context, Result, ensure};

use super::PlayerId;
use crate::beatmap::TrackInfo;
use crate::config::MarkerConfig;
use crate::player::PlayerMarkerState;

pub const MANIFEST_VERSION: u32 = 1;

// One player's saved state. Markers themselves are never stored.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PlayerManifest {
    pub id: PlayerId,
    pub track: Option<TrackInfo>,
    pub state: PlayerMarkerState,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionManifest {
    pub version: u32,
    pub config: MarkerConfig,
    pub players: Vec<PlayerManifest>,
}

impl SessionManifest {
    pub fn save_to_disk(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_from_disk(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening session {}", path.display()))?;
        let reader = BufReader::new(file);
        let manifest: Self = serde_json::from_reader(reader)
            .with_context(|| format!("parsing session {}", path.display()))?;
        ensure!(
            manifest.version <= MANIFEST_VERSION,
            "session version {} is newer than supported version {}",
            manifest.version,
            MANIFEST_VERSION
        );
        Ok(manifest)
    }
}
