// game_config.rs
use crate::board::Board;
use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapConfig {
    pub continents: Vec<ContinentConfig>,
    pub territories: Vec<TerritoryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerritoryConfig {
    pub name: String,
    pub continent: String,
    #[serde(default)]
    pub adjacent_territories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContinentConfig {
    pub name: String,
    pub bonus_armies: u32,
}

impl MapConfig {
    /// Builds the graph without validating connectivity. Duplicate names and
    /// dangling references are still rejected.
    pub fn to_board(&self, name: &str) -> Result<Board> {
        let mut board = Board::new(name);

        for continent in &self.continents {
            board.add_continent(&continent.name, continent.bonus_armies)?;
        }
        for territory in &self.territories {
            board.add_territory(&territory.name, &territory.continent)?;
        }
        for territory in &self.territories {
            for adjacent in &territory.adjacent_territories {
                board.add_adjacency(&territory.name, adjacent)?;
            }
        }

        Ok(board)
    }

    pub fn from_board(board: &Board) -> Self {
        let continents = board
            .continents
            .values()
            .map(|c| ContinentConfig {
                name: c.name.clone(),
                bonus_armies: c.bonus_armies,
            })
            .collect();

        let territories = board
            .territories
            .values()
            .map(|t| TerritoryConfig {
                name: t.name.clone(),
                continent: board
                    .get_continent(t.continent)
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                adjacent_territories: t
                    .adjacent_territories
                    .iter()
                    .map(|a| board.territory_name(*a).to_string())
                    .collect(),
            })
            .collect();

        Self {
            continents,
            territories,
        }
    }

    pub fn load_from_file(filename: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(filename)?;
        let config: MapConfig = serde_json::from_str(&data)?;
        Ok(config)
    }

    pub fn save_to_file(&self, filename: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(filename, data)?;
        Ok(())
    }
}

/// Where the startup phase gets maps from and writes them back to.
pub trait MapLoader: Send + Sync {
    fn exists(&self, name: &str) -> bool;
    fn load(&self, name: &str) -> Result<Board>;
    fn save(&self, board: &Board) -> Result<()>;
}

/// Reads and writes `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct JsonMapLoader {
    pub dir: PathBuf,
}

impl JsonMapLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        let mut path = self.dir.join(name);
        if path.extension().is_none() {
            path.set_extension("json");
        }
        path
    }
}

impl MapLoader for JsonMapLoader {
    fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    fn load(&self, name: &str) -> Result<Board> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(GameError::map(format!("Map file {} does not exist", path.display())));
        }
        MapConfig::load_from_file(&path)?.to_board(name)
    }

    fn save(&self, board: &Board) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        MapConfig::from_board(board).save_to_file(&self.path_for(&board.name))
    }
}

/// Keeps maps in memory, keyed by name.
#[derive(Debug, Default)]
pub struct MemoryMapLoader {
    maps: Mutex<HashMap<String, MapConfig>>,
}

impl MemoryMapLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(self, name: &str, config: MapConfig) -> Self {
        if let Ok(mut maps) = self.maps.lock() {
            maps.insert(name.to_string(), config);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<MapConfig> {
        self.maps.lock().ok().and_then(|maps| maps.get(name).cloned())
    }
}

impl MapLoader for MemoryMapLoader {
    fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn load(&self, name: &str) -> Result<Board> {
        self.get(name)
            .ok_or_else(|| GameError::map(format!("Map {} does not exist", name)))?
            .to_board(name)
    }

    fn save(&self, board: &Board) -> Result<()> {
        let mut maps = self
            .maps
            .lock()
            .map_err(|_| GameError::map("Map store is unavailable"))?;
        maps.insert(board.name.clone(), MapConfig::from_board(board));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MapConfig {
        serde_json::from_str(
            r#"{
                "continents": [{"name": "North", "bonus_armies": 2}],
                "territories": [
                    {"name": "A", "continent": "North", "adjacent_territories": ["B"]},
                    {"name": "B", "continent": "North", "adjacent_territories": ["A"]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn config_builds_a_valid_board() {
        let board = sample().to_board("sample").unwrap();
        assert_eq!(board.territories.len(), 2);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn unknown_neighbour_is_an_invalid_map() {
        let mut config = sample();
        config.territories[0].adjacent_territories.push("Z".to_string());
        assert!(matches!(config.to_board("x"), Err(GameError::InvalidMap(_))));
    }

    #[test]
    fn board_converts_back_to_the_same_config() {
        let config = sample();
        let board = config.to_board("sample").unwrap();
        assert_eq!(MapConfig::from_board(&board), config);
    }

    #[test]
    fn json_loader_saves_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let loader = JsonMapLoader::new(dir.path());
        let board = sample().to_board("saved").unwrap();
        assert!(!loader.exists("saved"));
        loader.save(&board).unwrap();
        assert!(loader.exists("saved"));
        assert!(dir.path().join("saved.json").is_file());
        let reloaded = loader.load("saved").unwrap();
        assert_eq!(reloaded, board);
    }

    #[test]
    fn memory_loader_reports_missing_maps() {
        let loader = MemoryMapLoader::new().with_map("sample", sample());
        assert!(loader.load("sample").is_ok());
        assert!(matches!(loader.load("other"), Err(GameError::InvalidMap(_))));
    }
}
