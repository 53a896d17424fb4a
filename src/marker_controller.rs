// src/marker_controller.rs

use std::fmt::Write as FmtWrite;
use std::io::{Write, stdout};
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate},
};

use crate::markers::MarkerFrequency;
use crate::render::terminal::{render_bar_labels, render_ruler};
use crate::session::{MarkerSession, PlayerId, ShiftDirection};

const RULER_WIDTH: usize = 72;
const CURSOR_STEP: f64 = 0.25;

/// Keyboard front end over a marker session: one active player at a time.
pub struct MarkerController {
    session: MarkerSession,
    active: PlayerId,
    cursor: f64,
    session_path: PathBuf,
    status: String,
    draw_buffer: String,
}

impl MarkerController {
    pub fn new(session: MarkerSession, session_path: PathBuf) -> Self {
        Self {
            session,
            active: PlayerId::Parent,
            cursor: 0.0,
            session_path,
            status: String::new(),
            draw_buffer: String::with_capacity(1024),
        }
    }

    pub fn session(&self) -> &MarkerSession {
        &self.session
    }

    pub fn active(&self) -> &PlayerId {
        &self.active
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn should_quit(&self, key: KeyCode) -> bool {
        matches!(key, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
    }

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // 1. Priority: Handle Global Shortcuts (Undo/Redo, Save)
        if self.handle_global_shortcuts(key, modifiers) {
            return;
        }

        // 2. Normal handlers
        self.handle_marker_keys(key);
        self.handle_cursor_keys(key);
    }

    /// Returns true if a global shortcut was executed.
    fn handle_global_shortcuts(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if !modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }

        match key {
            // [CTRL + Z] => UNDO
            KeyCode::Char('z') | KeyCode::Char('Z') => {
                let name = self.session.command_manager().undo_name().unwrap_or_default().to_string();
                self.status = match self.session.undo() {
                    Ok(true) => format!("Undo {name}"),
                    Ok(false) => "Nothing to undo".into(),
                    Err(e) => format!("Undo failed: {e}"),
                };
                true
            }
            // [CTRL + Y] => REDO
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let name = self.session.command_manager().redo_name().unwrap_or_default().to_string();
                self.status = match self.session.redo() {
                    Ok(true) => format!("Redo {name}"),
                    Ok(false) => "Nothing to redo".into(),
                    Err(e) => format!("Redo failed: {e}"),
                };
                true
            }
            // [CTRL + S] => SAVE
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.status = match self.session.save_to_disk(&self.session_path) {
                    Ok(()) => format!("Saved {}", self.session_path.display()),
                    Err(e) => format!("Error saving: {e}"),
                };
                true
            }
            _ => false,
        }
    }

    fn handle_marker_keys(&mut self, key: KeyCode) {
        let result = match key {
            KeyCode::Left => self.session.shift(&self.active, ShiftDirection::Left).map(|o| format!("Offset {o} bars")),
            KeyCode::Right => self.session.shift(&self.active, ShiftDirection::Right).map(|o| format!("Offset {o} bars")),
            KeyCode::Char(c @ '1'..='6') => {
                let idx = c as usize - '1' as usize;
                let frequency = MarkerFrequency::ALL[idx];
                self.session
                    .set_frequency(&self.active, frequency)
                    .map(|_| format!("Frequency {frequency}"))
            }
            KeyCode::Char('m') | KeyCode::Char('M') => self
                .session
                .toggle_markers(&self.active)
                .map(|on| format!("Markers {}", if on { "ON" } else { "OFF" })),
            KeyCode::Tab => {
                self.cycle_active_player();
                Ok(format!("Active player: {}", self.active))
            }
            _ => return,
        };

        self.status = result.unwrap_or_else(|e| format!("Error: {e}"));
    }

    fn handle_cursor_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(',') => self.cursor = (self.cursor - CURSOR_STEP).max(0.0),
            KeyCode::Char('.') => self.cursor += CURSOR_STEP,
            _ => {}
        }
    }

    fn cycle_active_player(&mut self) {
        let ids = self.session.players.ids();
        let pos = ids.iter().position(|id| *id == self.active).unwrap_or(0);
        self.active = ids[(pos + 1) % ids.len()].clone();
    }

    /// Builds the whole screen into the draw buffer.
    pub fn render_frame(&mut self) {
        self.draw_buffer.clear();
        let Some(player) = self.session.players.player(&self.active) else {
            let _ = write!(self.draw_buffer, "No player selected\r\n");
            return;
        };
        let state = player.state();
        let track_name = player.track().map(|t| t.name.as_str()).unwrap_or("<no track>");
        let positions = player.marker_positions();

        let _ = write!(
            self.draw_buffer,
            "[{}] {} | freq: {} | offset: {:+} bars | markers: {}\r\n",
            self.active,
            track_name,
            state.frequency,
            state.bar_offset,
            if state.markers_enabled { "ON" } else { "OFF" }
        );
        let _ = write!(self.draw_buffer, "{}\r\n", render_ruler(&positions, RULER_WIDTH));
        let _ = write!(self.draw_buffer, "{}\r\n", render_bar_labels(&positions, RULER_WIDTH));
        let _ = write!(
            self.draw_buffer,
            "cursor {:6.2}s -> loop start {:6.2}s | {} markers\r\n",
            self.cursor,
            player.snap(self.cursor),
            player.markers().len()
        );
        let _ = write!(self.draw_buffer, "{}\r\n", self.status);
        let _ = write!(
            self.draw_buffer,
            "←/→ shift | 1-6 bar8..beat | M markers | TAB player | ,/. cursor | ^Z/^Y undo/redo | ^S save | Q quit\r\n"
        );
    }

    pub fn frame(&self) -> &str {
        &self.draw_buffer
    }

    pub fn run_tick(&mut self) -> anyhow::Result<()> {
        self.render_frame();

        let mut stdout = stdout();
        execute!(stdout, BeginSynchronizedUpdate, MoveTo(0, 0), Clear(ClearType::All))?;
        stdout.write_all(self.draw_buffer.as_bytes())?;
        execute!(stdout, EndSynchronizedUpdate)?;
        stdout.flush()?;
        Ok(())
    }
}
