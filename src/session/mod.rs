// src/session/mod.rs

pub mod commands;
pub mod serialization;

use crate::beatmap::TrackInfo;
use crate::config::MarkerConfig;
use crate::markers::MarkerFrequency;
use crate::player::MarkerPlayer;
use anyhow::{Result, bail};
use commands::{Command, CommandManager, SetBarOffset, SetMarkerFrequency, SetMarkersEnabled};
use serde::{Deserialize, Serialize};
use serialization::{MANIFEST_VERSION, PlayerManifest, SessionManifest};
use std::fmt;
use std::path::Path;

const HISTORY_LIMIT: usize = 100;

/// Addresses one player: the full mix or a named stem.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerId {
    Parent,
    Stem(String),
}

impl PlayerId {
    pub fn stem(name: impl Into<String>) -> Self {
        PlayerId::Stem(name.into())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::Parent => f.write_str("parent"),
            PlayerId::Stem(name) => write!(f, "stem:{name}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftDirection {
    Left,
    Right,
}

/// The parent player and its stems. Each keeps its own marker state.
#[derive(Clone, Debug)]
pub struct PlayerSet {
    config: MarkerConfig,
    parent: MarkerPlayer,
    stems: Vec<(String, MarkerPlayer)>,
}

impl PlayerSet {
    pub fn new(config: MarkerConfig) -> Self {
        Self {
            config,
            parent: MarkerPlayer::new(PlayerId::Parent.to_string(), config),
            stems: Vec::new(),
        }
    }

    pub fn config(&self) -> &MarkerConfig {
        &self.config
    }

    pub fn parent(&self) -> &MarkerPlayer {
        &self.parent
    }

    pub fn parent_mut(&mut self) -> &mut MarkerPlayer {
        &mut self.parent
    }

    pub fn add_stem(&mut self, name: impl Into<String>) -> Result<&mut MarkerPlayer> {
        let name = name.into();
        if self.stem_index(&name).is_some() {
            bail!("Stem '{}' already exists", name);
        }
        let player = MarkerPlayer::new(PlayerId::Stem(name.clone()).to_string(), self.config);
        self.stems.push((name, player));
        let idx = self.stems.len() - 1;
        Ok(&mut self.stems[idx].1)
    }

    pub fn remove_stem(&mut self, name: &str) -> Option<MarkerPlayer> {
        let idx = self.stem_index(name)?;
        Some(self.stems.remove(idx).1)
    }

    pub fn stem_names(&self) -> Vec<String> {
        self.stems.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&MarkerPlayer> {
        match id {
            PlayerId::Parent => Some(&self.parent),
            PlayerId::Stem(name) => self.stem_index(name).map(|i| &self.stems[i].1),
        }
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut MarkerPlayer> {
        match id {
            PlayerId::Parent => Some(&mut self.parent),
            PlayerId::Stem(name) => self.stem_index(name).map(|i| &mut self.stems[i].1),
        }
    }

    /// Parent first, then stems in the order they were added.
    pub fn ids(&self) -> Vec<PlayerId> {
        std::iter::once(PlayerId::Parent)
            .chain(self.stems.iter().map(|(name, _)| PlayerId::Stem(name.clone())))
            .collect()
    }

    fn stem_index(&self, name: &str) -> Option<usize> {
        self.stems.iter().position(|(stem, _)| stem == name)
    }
}

/// Players plus the undo history of the marker actions applied to them.
pub struct MarkerSession {
    pub players: PlayerSet,
    command_manager: CommandManager,
}

impl MarkerSession {
    pub fn new(config: MarkerConfig) -> Self {
        Self {
            players: PlayerSet::new(config),
            command_manager: CommandManager::new(HISTORY_LIMIT),
        }
    }

    pub fn command_manager(&self) -> &CommandManager {
        &self.command_manager
    }

    pub fn apply(&mut self, cmd: Box<dyn Command>) -> Result<()> {
        self.command_manager.push(cmd, &mut self.players)
    }

    pub fn undo(&mut self) -> Result<bool> {
        self.command_manager.undo(&mut self.players)
    }

    pub fn redo(&mut self) -> Result<bool> {
        self.command_manager.redo(&mut self.players)
    }

    fn require(&self, id: &PlayerId) -> Result<&MarkerPlayer> {
        match self.players.player(id) {
            Some(p) => Ok(p),
            None => bail!("Player not found: {}", id),
        }
    }

    /// Shifts one player's bar offset by its current frequency increment.
    /// Returns the new offset.
    pub fn shift(&mut self, id: &PlayerId, direction: ShiftDirection) -> Result<f64> {
        let player = self.require(id)?;
        let old_offset = player.state().bar_offset;
        let step = player.shift_increment();
        let new_offset = match direction {
            ShiftDirection::Left => old_offset - step,
            ShiftDirection::Right => old_offset + step,
        };
        self.apply(Box::new(SetBarOffset { player: id.clone(), old_offset, new_offset }))?;
        Ok(new_offset)
    }

    pub fn set_frequency(&mut self, id: &PlayerId, frequency: MarkerFrequency) -> Result<()> {
        let old_frequency = self.require(id)?.state().frequency;
        if old_frequency == frequency {
            return Ok(());
        }
        self.apply(Box::new(SetMarkerFrequency {
            player: id.clone(),
            old_frequency,
            new_frequency: frequency,
        }))
    }

    /// Returns the new on/off state.
    pub fn toggle_markers(&mut self, id: &PlayerId) -> Result<bool> {
        let new_state = !self.require(id)?.state().markers_enabled;
        self.apply(Box::new(SetMarkersEnabled { player: id.clone(), new_state }))?;
        Ok(new_state)
    }

    /// Loads a track into one player. Undo history does not survive a track change.
    pub fn load_track(&mut self, id: &PlayerId, track: TrackInfo) -> Result<()> {
        match self.players.player_mut(id) {
            Some(player) => player.load_track(track),
            None => bail!("Player not found: {}", id),
        }
        self.command_manager.clear();
        Ok(())
    }

    // --- SAVE / LOAD ---

    pub fn to_manifest(&self) -> SessionManifest {
        let players = self
            .players
            .ids()
            .into_iter()
            .filter_map(|id| {
                let player = self.players.player(&id)?;
                Some(PlayerManifest {
                    track: player.track().cloned(),
                    state: player.state(),
                    id,
                })
            })
            .collect();

        SessionManifest {
            version: MANIFEST_VERSION,
            config: *self.players.config(),
            players,
        }
    }

    pub fn from_manifest(manifest: SessionManifest) -> Result<Self> {
        manifest.config.validate()?;
        let mut session = Self::new(manifest.config);

        for entry in manifest.players {
            let player = match &entry.id {
                PlayerId::Parent => session.players.parent_mut(),
                PlayerId::Stem(name) => session.players.add_stem(name.clone())?,
            };
            if let Some(track) = entry.track {
                player.load_track(track);
            }
            player.restore_state(entry.state);
        }

        Ok(session)
    }

    pub fn save_to_disk(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.to_manifest().save_to_disk(path)?;
        log::info!("Saved marker session to {}", path.display());
        Ok(())
    }

    pub fn load_from_disk(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let session = Self::from_manifest(SessionManifest::load_from_disk(path)?)?;
        log::info!(
            "Loaded marker session from {} ({} players)",
            path.display(),
            session.players.ids().len()
        );
        Ok(session)
    }
}
