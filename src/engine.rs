// engine.rs
use crate::command::{Command, INVALID_IN_PHASE, SAVEGAME_FORMAT, SHOWMAP_FORMAT};
use crate::error::{GameError, Result};
use crate::game::GameState;
use crate::board::Board;
use crate::game_config::MapLoader;
use crate::log::LogCategory;
use crate::tournament::TournamentReport;
use crate::turn_phase::Phase;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameMode {
    /// The driver decides after every turn whether to go on.
    Interactive,
    /// Fixed number of turns, no questions asked.
    Tournament,
}

/// What gets written by `savegame`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedGame {
    pub phase: Phase,
    pub mode: GameMode,
    pub map_open: bool,
    pub map_valid: bool,
    pub state: GameState,
}

/// Drives one game: the current phase, the game state and the map store.
pub struct GameEngine {
    pub(crate) phase: Phase,
    pub(crate) mode: GameMode,
    pub state: GameState,
    pub(crate) loader: Arc<dyn MapLoader>,
    /// A board exists (loaded or being edited).
    pub(crate) map_open: bool,
    /// The open board passed validation since its last edit.
    pub(crate) map_valid: bool,
    pub(crate) save_dir: PathBuf,
    pub(crate) last_tournament: Option<TournamentReport>,
}

impl GameEngine {
    pub fn new(loader: Arc<dyn MapLoader>) -> Self {
        Self {
            phase: Phase::Startup,
            mode: GameMode::Interactive,
            state: GameState::new(Board::default()),
            loader,
            map_open: false,
            map_valid: false,
            save_dir: PathBuf::from("."),
            last_tournament: None,
        }
    }

    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = dir.into();
        self
    }

    /// A fixed-turn game over a prepared state, already past startup.
    pub fn for_tournament(state: GameState, loader: Arc<dyn MapLoader>) -> Result<Self> {
        let mut engine = Self::new(loader);
        engine.mode = GameMode::Tournament;
        engine.state = state;
        engine.map_open = true;
        engine.map_valid = true;
        engine.start_game()?;
        Ok(engine)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn is_map_valid(&self) -> bool {
        self.map_valid
    }

    pub fn last_tournament(&self) -> Option<&TournamentReport> {
        self.last_tournament.as_ref()
    }

    /// Runs a command and logs any error instead of returning it. Returns
    /// whether the command succeeded.
    pub fn submit(&mut self, line: &str) -> bool {
        match self.handle_command(line) {
            Ok(()) => true,
            Err(error) => {
                self.state.log.warn(LogCategory::HandleCommand, error.to_string());
                false
            }
        }
    }

    pub fn handle_command(&mut self, line: &str) -> Result<()> {
        let command = Command::parse(line)
            .ok_or_else(|| GameError::command("No command entered"))?;
        self.state
            .log
            .record(LogCategory::HandleCommand, line.trim().to_string());

        match self.phase {
            Phase::Startup => self.handle_startup_command(&command),
            _ => self.handle_in_game_command(&command),
        }
    }

    /// The commands still open once countries are assigned.
    pub fn is_in_game_command(root: &str) -> bool {
        matches!(root, "savegame" | "showmap")
    }

    fn handle_in_game_command(&mut self, command: &Command) -> Result<()> {
        match command.root.as_str() {
            "savegame" => {
                let file = command
                    .single_argument()
                    .ok_or_else(|| GameError::command(SAVEGAME_FORMAT))?;
                let path = self.save_dir.join(file);
                self.save_game(&path)
            }
            "showmap" => {
                if !command.has_no_arguments() {
                    return Err(GameError::command(SHOWMAP_FORMAT));
                }
                self.show_map()
            }
            _ => Err(GameError::command(INVALID_IN_PHASE)),
        }
    }

    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let saved = SavedGame {
            phase: self.phase,
            mode: self.mode,
            map_open: self.map_open,
            map_valid: self.map_valid,
            state: self.state.clone(),
        };
        Ok(bincode::serialize(&saved)?)
    }

    pub fn restore(&mut self, bytes: &[u8]) -> Result<()> {
        let saved: SavedGame = bincode::deserialize(bytes)?;
        self.phase = saved.phase;
        self.mode = saved.mode;
        self.map_open = saved.map_open;
        self.map_valid = saved.map_valid;
        self.state = saved.state;
        Ok(())
    }

    pub fn save_game(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.snapshot()?)?;
        self.state.log.record(
            LogCategory::HandleCommand,
            format!("Game saved to {}", path.display()),
        );
        Ok(())
    }

    pub fn load_game(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)?;
        self.restore(&bytes)?;
        self.state.log.record(
            LogCategory::HandleCommand,
            format!("Game loaded from {}", path.display()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_config::MemoryMapLoader;

    #[test]
    fn new_engine_starts_in_startup() {
        let engine = GameEngine::new(Arc::new(MemoryMapLoader::new()));
        assert_eq!(engine.phase(), Phase::Startup);
        assert_eq!(engine.mode(), GameMode::Interactive);
        assert!(!engine.is_map_valid());
    }

    #[test]
    fn submit_swallows_and_logs_errors() {
        let mut engine = GameEngine::new(Arc::new(MemoryMapLoader::new()));
        assert!(!engine.submit("validatemap now"));
        assert_eq!(
            engine.state.log.last().map(|e| e.message.clone()),
            Some(crate::command::VALIDATEMAP_FORMAT.to_string())
        );
        assert!(!engine.submit("   "));
    }

    #[test]
    fn snapshot_restores_phase_and_state() {
        let mut engine = GameEngine::new(Arc::new(MemoryMapLoader::new()));
        engine.state.round = 4;
        let bytes = engine.snapshot().unwrap();
        let mut other = GameEngine::new(Arc::new(MemoryMapLoader::new()));
        other.restore(&bytes).unwrap();
        assert_eq!(other.state.round, 4);
        assert_eq!(other.phase(), Phase::Startup);
        assert!(matches!(other.restore(&[1, 2]), Err(GameError::Snapshot(_))));
    }
}
