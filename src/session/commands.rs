// src/session/commands.rs

use super::{PlayerId, PlayerSet};
use crate::markers::MarkerFrequency;
use anyhow::{Result, anyhow};

/// The Command trait defines a marker action that can be executed and undone.
/// We require Send + Sync so commands can be moved between threads if necessary.
pub trait Command: Send + Sync {
    /// Apply the change to the players.
    fn execute(&self, players: &mut PlayerSet) -> Result<()>;

    /// Revert the change.
    fn undo(&self, players: &mut PlayerSet) -> Result<()>;

    /// A description for the UI (e.g., "Shift Bars")
    fn name(&self) -> &str;
}

/// Manages the history of commands.
pub struct CommandManager {
    undo_stack: Vec<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    max_history: usize,
}

impl CommandManager {
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_history,
        }
    }

    /// Execute a new command and push it onto the undo stack.
    /// Clears the redo stack because a new history branch is created.
    pub fn push(&mut self, command: Box<dyn Command>, players: &mut PlayerSet) -> Result<()> {
        command.execute(players)?;
        self.undo_stack.push(command);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.max_history {
            self.undo_stack.remove(0);
        }
        Ok(())
    }

    pub fn undo(&mut self, players: &mut PlayerSet) -> Result<bool> {
        if let Some(cmd) = self.undo_stack.pop() {
            cmd.undo(players)?;
            self.redo_stack.push(cmd);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn redo(&mut self, players: &mut PlayerSet) -> Result<bool> {
        if let Some(cmd) = self.redo_stack.pop() {
            cmd.execute(players)?;
            self.undo_stack.push(cmd);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn can_undo(&self) -> bool { !self.undo_stack.is_empty() }
    pub fn can_redo(&self) -> bool { !self.redo_stack.is_empty() }

    /// Name of the command the next undo would revert.
    pub fn undo_name(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.name())
    }

    pub fn redo_name(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.name())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

fn player_not_found(id: &PlayerId) -> anyhow::Error {
    anyhow!("Player not found: {}", id)
}

// ==========================================
// CONCRETE COMMANDS
// ==========================================

pub struct SetBarOffset {
    pub player: PlayerId,
    pub old_offset: f64,
    pub new_offset: f64,
}

impl Command for SetBarOffset {
    fn execute(&self, players: &mut PlayerSet) -> Result<()> {
        let player = players.player_mut(&self.player).ok_or_else(|| player_not_found(&self.player))?;
        player.set_bar_offset(self.new_offset);
        Ok(())
    }

    fn undo(&self, players: &mut PlayerSet) -> Result<()> {
        let player = players.player_mut(&self.player).ok_or_else(|| player_not_found(&self.player))?;
        player.set_bar_offset(self.old_offset);
        Ok(())
    }

    fn name(&self) -> &str { "Shift Bars" }
}

pub struct SetMarkerFrequency {
    pub player: PlayerId,
    pub old_frequency: MarkerFrequency,
    pub new_frequency: MarkerFrequency,
}

impl Command for SetMarkerFrequency {
    fn execute(&self, players: &mut PlayerSet) -> Result<()> {
        let player = players.player_mut(&self.player).ok_or_else(|| player_not_found(&self.player))?;
        player.set_frequency(self.new_frequency);
        Ok(())
    }

    fn undo(&self, players: &mut PlayerSet) -> Result<()> {
        let player = players.player_mut(&self.player).ok_or_else(|| player_not_found(&self.player))?;
        player.set_frequency(self.old_frequency);
        Ok(())
    }

    fn name(&self) -> &str { "Marker Frequency" }
}

pub struct SetMarkersEnabled {
    pub player: PlayerId,
    pub new_state: bool,
}

impl Command for SetMarkersEnabled {
    fn execute(&self, players: &mut PlayerSet) -> Result<()> {
        let player = players.player_mut(&self.player).ok_or_else(|| player_not_found(&self.player))?;
        player.set_markers_enabled(self.new_state);
        Ok(())
    }

    fn undo(&self, players: &mut PlayerSet) -> Result<()> {
        // Toggle back
        let player = players.player_mut(&self.player).ok_or_else(|| player_not_found(&self.player))?;
        player.set_markers_enabled(!self.new_state);
        Ok(())
    }

    fn name(&self) -> &str { "Toggle Markers" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarkerConfig;

    #[test]
    fn history_is_bounded() {
        let mut players = PlayerSet::new(MarkerConfig::default());
        let mut manager = CommandManager::new(2);

        for i in 0..3 {
            let cmd = SetBarOffset {
                player: PlayerId::Parent,
                old_offset: i as f64,
                new_offset: (i + 1) as f64,
            };
            manager.push(Box::new(cmd), &mut players).unwrap();
        }

        assert!(manager.undo(&mut players).unwrap());
        assert!(manager.undo(&mut players).unwrap());
        assert!(!manager.undo(&mut players).unwrap());
        assert_eq!(players.parent().state().bar_offset, 1.0);
    }

    #[test]
    fn new_command_clears_redo() {
        let mut players = PlayerSet::new(MarkerConfig::default());
        let mut manager = CommandManager::new(10);
        let cmd = SetMarkersEnabled { player: PlayerId::Parent, new_state: false };

        manager.push(Box::new(cmd), &mut players).unwrap();
        manager.undo(&mut players).unwrap();
        assert!(manager.can_redo());
        assert_eq!(manager.redo_name(), Some("Toggle Markers"));

        let cmd = SetMarkerFrequency {
            player: PlayerId::Parent,
            old_frequency: MarkerFrequency::Bar,
            new_frequency: MarkerFrequency::Beat,
        };
        manager.push(Box::new(cmd), &mut players).unwrap();
        assert!(!manager.can_redo());
        assert_eq!(manager.undo_name(), Some("Marker Frequency"));
    }

    #[test]
    fn unknown_stem_is_an_error() {
        let mut players = PlayerSet::new(MarkerConfig::default());
        let mut manager = CommandManager::new(10);
        let cmd = SetMarkersEnabled { player: PlayerId::stem("vocals"), new_state: false };

        assert!(manager.push(Box::new(cmd), &mut players).is_err());
        assert!(!manager.can_undo());
    }
}
