// startup.rs
use crate::board::Board;
use crate::command::*;
use crate::engine::GameEngine;
use crate::error::{GameError, Result};
use crate::log::LogCategory;
use crate::order::Order;
use crate::player::{Behavior, NEUTRAL_PLAYER};
use crate::tournament::{Tournament, TournamentConfig};

enum MapEdit {
    AddContinent(String, u32),
    RemoveContinent(String),
    AddCountry(String, String),
    RemoveCountry(String),
    AddNeighbor(String, String),
    RemoveNeighbor(String, String),
}

enum RosterEdit {
    Add(String, Behavior),
    Remove(String),
}

impl GameEngine {
    pub(crate) fn handle_startup_command(&mut self, command: &Command) -> Result<()> {
        match command.root.as_str() {
            "loadmap" => {
                let name = command
                    .single_argument()
                    .ok_or_else(|| GameError::command(LOADMAP_FORMAT))?;
                self.load_map(name)
            }
            "editmap" => {
                let name = command
                    .single_argument()
                    .ok_or_else(|| GameError::command(EDITMAP_FORMAT))?;
                self.edit_map(name)
            }
            "editcontinent" | "editcountry" | "editneighbor" => {
                let edits = parse_map_edits(command)?;
                if !self.map_open {
                    return Err(GameError::command(MAP_NOT_EDITED));
                }
                self.apply_map_edits(edits)
            }
            "validatemap" => {
                if !command.has_no_arguments() {
                    return Err(GameError::command(VALIDATEMAP_FORMAT));
                }
                self.validate_map()
            }
            "savemap" => {
                let name = command
                    .single_argument()
                    .ok_or_else(|| GameError::command(SAVEMAP_FORMAT))?;
                self.save_map(name)
            }
            "showmap" => {
                if !command.has_no_arguments() {
                    return Err(GameError::command(SHOWMAP_FORMAT));
                }
                self.show_map()
            }
            "gameplayer" => {
                let edits = parse_roster_edits(command)?;
                if !self.map_valid {
                    return Err(GameError::command(MAP_NOT_LOADED));
                }
                self.apply_roster_edits(edits);
                Ok(())
            }
            "assigncountries" => {
                if !command.has_no_arguments() {
                    return Err(GameError::command(ASSIGNCOUNTRIES_FORMAT));
                }
                self.start_game()
            }
            "tournament" => {
                let config = TournamentConfig::from_command(command)?;
                let tournament = Tournament::prepare(config, self.loader.as_ref())?;
                let report = tournament.run(self.loader.clone());
                for line in report.to_string().lines() {
                    self.state.log.record(LogCategory::GameEnd, line.to_string());
                }
                self.last_tournament = Some(report);
                Ok(())
            }
            "savegame" => {
                let name = command
                    .single_argument()
                    .ok_or_else(|| GameError::command(SAVEGAME_FORMAT))?;
                let path = self.save_dir.join(name);
                self.save_game(&path)
            }
            "loadgame" => {
                let name = command
                    .single_argument()
                    .ok_or_else(|| GameError::command(LOADGAME_FORMAT))?;
                let path = self.save_dir.join(name);
                self.load_game(&path)
            }
            root if Order::is_order_command(root) => Err(GameError::command(INVALID_IN_PHASE)),
            root => Err(GameError::command(format!("Unknown command: {}", root))),
        }
    }

    /// Loads and validates a map. Any failure leaves an empty board behind.
    fn load_map(&mut self, name: &str) -> Result<()> {
        let loaded = self.loader.load(name).and_then(|board| {
            board.validate()?;
            Ok(board)
        });

        for player in self.state.players.iter_mut() {
            player.territories.clear();
            player.continents.clear();
        }

        match loaded {
            Ok(board) => {
                self.state.board = board;
                self.map_open = true;
                self.map_valid = true;
                self.state
                    .log
                    .record(LogCategory::HandleCommand, format!("Map {} loaded. {}", name, VALID_MAP));
                Ok(())
            }
            Err(error) => {
                self.state.board = Board::new(name);
                self.map_open = false;
                self.map_valid = false;
                Err(GameError::map(format!(
                    "Map {} could not be loaded as it is invalid: {}",
                    name, error
                )))
            }
        }
    }

    fn edit_map(&mut self, name: &str) -> Result<()> {
        let board = if self.loader.exists(name) {
            self.loader.load(name)?
        } else {
            self.state.log.record(
                LogCategory::HandleCommand,
                format!("No map named {} exists, creating a new one", name),
            );
            Board::new(name)
        };
        self.state.board = board;
        self.map_open = true;
        self.map_valid = false;
        self.state
            .log
            .record(LogCategory::HandleCommand, format!("Editing map {}", name));
        Ok(())
    }

    fn apply_map_edits(&mut self, edits: Vec<MapEdit>) -> Result<()> {
        self.map_valid = false;
        let board = &mut self.state.board;
        for edit in edits {
            let message = match edit {
                MapEdit::AddContinent(name, value) => {
                    board.add_continent(&name, value)?;
                    format!("Continent {} added with control value {}", name, value)
                }
                MapEdit::RemoveContinent(name) => {
                    board.remove_continent(&name)?;
                    format!("Continent {} removed", name)
                }
                MapEdit::AddCountry(name, continent) => {
                    board.add_territory(&name, &continent)?;
                    format!("Country {} added to continent {}", name, continent)
                }
                MapEdit::RemoveCountry(name) => {
                    board.remove_territory(&name)?;
                    format!("Country {} removed", name)
                }
                MapEdit::AddNeighbor(from, to) => {
                    board.add_adjacency(&from, &to)?;
                    format!("{} is now a neighbour of {}", to, from)
                }
                MapEdit::RemoveNeighbor(from, to) => {
                    board.remove_adjacency(&from, &to)?;
                    format!("{} is no longer a neighbour of {}", to, from)
                }
            };
            self.state.log.record(LogCategory::HandleCommand, message);
        }
        Ok(())
    }

    fn validate_map(&mut self) -> Result<()> {
        if !self.map_open {
            return Err(GameError::command(MAP_NOT_LOADED));
        }
        match self.state.board.validate() {
            Ok(()) => {
                self.map_valid = true;
                self.state.log.record(LogCategory::HandleCommand, VALID_MAP);
                Ok(())
            }
            Err(error) => {
                self.map_valid = false;
                Err(error)
            }
        }
    }

    /// Validates and writes the open map under `name`.
    fn save_map(&mut self, name: &str) -> Result<()> {
        if !self.map_open {
            return Err(GameError::command(MAP_NOT_EDITED));
        }
        self.state.board.validate()?;
        self.map_valid = true;
        self.state.board.name = name.to_string();
        self.loader.save(&self.state.board)?;
        self.state
            .log
            .record(LogCategory::HandleCommand, format!("Map saved as {}", name));
        Ok(())
    }

    pub(crate) fn show_map(&mut self) -> Result<()> {
        if !self.map_open {
            return Err(GameError::command(MAP_NOT_LOADED));
        }
        let mut lines = self.state.board.summary();
        for player in self.state.active_players() {
            lines.push(format!(
                "Player {} ({}) owns {} territories",
                player.name,
                player.behavior,
                player.territories.len()
            ));
        }
        for line in lines {
            self.state.log.record(LogCategory::HandleCommand, line);
        }
        Ok(())
    }

    fn apply_roster_edits(&mut self, edits: Vec<RosterEdit>) {
        for edit in edits {
            match edit {
                RosterEdit::Add(name, behavior) => {
                    let message = if self.state.add_player(&name, behavior) {
                        format!("Player: {} has been added successfully.", name)
                    } else {
                        format!("Player: {} already present. No modifications made.", name)
                    };
                    self.state.log.record(LogCategory::HandleCommand, message);
                }
                RosterEdit::Remove(name) => {
                    let message = if self.state.remove_player(&name) {
                        format!("Player: {} has been removed successfully.", name)
                    } else {
                        format!("Player: {} is not present. No changes made.", name)
                    };
                    self.state.log.record(LogCategory::HandleCommand, message);
                }
            }
        }
    }
}

// Checks every operation before anything is applied.
fn parse_map_edits(command: &Command) -> Result<Vec<MapEdit>> {
    let format = match command.root.as_str() {
        "editcontinent" => EDITCONTINENT_FORMAT,
        "editcountry" => EDITCOUNTRY_FORMAT,
        _ => EDITNEIGHBOR_FORMAT,
    };
    let invalid = || GameError::command(format);
    if !command.args.is_empty() || command.operations.is_empty() {
        return Err(invalid());
    }

    command
        .operations
        .iter()
        .map(|op| {
            let args = op.args.as_slice();
            match (command.root.as_str(), op.name.as_str(), args) {
                ("editcontinent", "add", [name, value]) => {
                    let value = value.parse::<u32>().map_err(|_| invalid())?;
                    Ok(MapEdit::AddContinent(name.clone(), value))
                }
                ("editcontinent", "remove", [name]) => Ok(MapEdit::RemoveContinent(name.clone())),
                ("editcountry", "add", [name, continent]) => {
                    Ok(MapEdit::AddCountry(name.clone(), continent.clone()))
                }
                ("editcountry", "remove", [name]) => Ok(MapEdit::RemoveCountry(name.clone())),
                ("editneighbor", "add", [from, to]) => Ok(MapEdit::AddNeighbor(from.clone(), to.clone())),
                ("editneighbor", "remove", [from, to]) => {
                    Ok(MapEdit::RemoveNeighbor(from.clone(), to.clone()))
                }
                _ => Err(invalid()),
            }
        })
        .collect()
}

fn parse_roster_edits(command: &Command) -> Result<Vec<RosterEdit>> {
    let invalid = || GameError::command(GAMEPLAYER_FORMAT);
    if !command.args.is_empty() || command.operations.is_empty() {
        return Err(invalid());
    }

    command
        .operations
        .iter()
        .map(|op| match (op.name.as_str(), op.args.as_slice()) {
            (_, [name, ..]) if name.eq_ignore_ascii_case(NEUTRAL_PLAYER) => Err(GameError::command(
                format!("{} is a reserved player name", NEUTRAL_PLAYER),
            )),
            ("add", [name]) => Ok(RosterEdit::Add(name.clone(), Behavior::Human)),
            ("add", [name, strategy]) => {
                let behavior = Behavior::from_name(strategy).ok_or_else(invalid)?;
                Ok(RosterEdit::Add(name.clone(), behavior))
            }
            ("remove", [name]) => Ok(RosterEdit::Remove(name.clone())),
            _ => Err(invalid()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_config::{MapConfig, MemoryMapLoader};
    use crate::turn_phase::Phase;
    use std::sync::Arc;

    fn square() -> MapConfig {
        serde_json::from_str(
            r#"{
                "continents": [{"name": "Left", "bonus_armies": 1}, {"name": "Right", "bonus_armies": 1}],
                "territories": [
                    {"name": "NW", "continent": "Left", "adjacent_territories": ["SW", "NE"]},
                    {"name": "SW", "continent": "Left", "adjacent_territories": ["NW", "SE"]},
                    {"name": "NE", "continent": "Right", "adjacent_territories": ["SE", "NW"]},
                    {"name": "SE", "continent": "Right", "adjacent_territories": ["NE", "SW"]}
                ]
            }"#,
        )
        .unwrap()
    }

    fn engine() -> GameEngine {
        let loader = MemoryMapLoader::new().with_map("square", square());
        GameEngine::new(Arc::new(loader))
    }

    #[test]
    fn map_edits_are_all_or_nothing_syntactically() {
        let mut engine = engine();
        engine.handle_command("editmap fresh").unwrap();
        let result = engine.handle_command("editcontinent -add Asia 3 -add Europe");
        assert!(matches!(result, Err(GameError::InvalidCommand(ref m)) if m == EDITCONTINENT_FORMAT));
        assert!(engine.state.board.find_continent("Asia").is_none());
    }

    #[test]
    fn non_numeric_control_value_is_a_command_error() {
        let mut engine = engine();
        engine.handle_command("editmap fresh").unwrap();
        assert!(matches!(
            engine.handle_command("editcontinent -add Asia lots"),
            Err(GameError::InvalidCommand(_))
        ));
    }

    #[test]
    fn edits_need_an_open_map() {
        let mut engine = engine();
        let result = engine.handle_command("editcountry -add A Asia");
        assert!(matches!(result, Err(GameError::InvalidCommand(ref m)) if m == MAP_NOT_EDITED));
    }

    #[test]
    fn editing_invalidates_until_revalidated() {
        let mut engine = engine();
        engine.handle_command("loadmap square").unwrap();
        assert!(engine.is_map_valid());
        engine.handle_command("editneighbor -remove NW SW").unwrap();
        assert!(!engine.is_map_valid());
        engine.handle_command("editneighbor -add NW SW").unwrap();
        engine.handle_command("validatemap").unwrap();
        assert!(engine.is_map_valid());
    }

    #[test]
    fn roster_messages_follow_the_outcome() {
        let mut engine = engine();
        engine.handle_command("loadmap square").unwrap();
        engine.handle_command("gameplayer -add alice -add bob aggressive").unwrap();
        engine.handle_command("gameplayer -add ALICE").unwrap();
        assert!(engine.state.log.contains("Player: ALICE already present. No modifications made."));
        engine.handle_command("gameplayer -remove carol").unwrap();
        assert!(engine.state.log.contains("Player: carol is not present. No changes made."));
        assert_eq!(engine.state.players[1].behavior, Behavior::Aggressive);
        assert!(engine.handle_command("gameplayer -add dave cheater").is_err());
        assert!(engine.handle_command("gameplayer -add neutral").is_err());
    }

    #[test]
    fn gameplay_orders_are_refused_in_startup() {
        let mut engine = engine();
        let result = engine.handle_command("deploy NW 3");
        assert!(matches!(result, Err(GameError::InvalidCommand(ref m)) if m == INVALID_IN_PHASE));
        assert_eq!(engine.phase(), Phase::Startup);
    }

    #[test]
    fn assigncountries_starts_the_game() {
        let mut engine = engine();
        assert!(engine.handle_command("assigncountries").is_err());
        engine.handle_command("loadmap square").unwrap();
        engine.handle_command("gameplayer -add alice").unwrap();
        assert!(engine.handle_command("assigncountries").is_err());
        engine.handle_command("gameplayer -add bob").unwrap();
        assert!(matches!(
            engine.handle_command("assigncountries now"),
            Err(GameError::InvalidCommand(_))
        ));
        engine.handle_command("assigncountries").unwrap();
        assert_eq!(engine.phase(), Phase::IssueOrders);
    }

    #[test]
    fn savemap_refuses_an_invalid_map() {
        let loader = Arc::new(MemoryMapLoader::new());
        let mut engine = GameEngine::new(loader.clone());
        engine.handle_command("editmap island").unwrap();
        engine.handle_command("editcontinent -add Sea 2").unwrap();
        engine.handle_command("editcountry -add Rock Sea").unwrap();
        assert!(matches!(engine.handle_command("savemap island"), Err(GameError::InvalidMap(_))));
        assert!(loader.get("island").is_none());
        engine.handle_command("editcountry -add Reef Sea").unwrap();
        engine.handle_command("editneighbor -add Rock Reef -add Reef Rock").unwrap();
        engine.handle_command("savemap island").unwrap();
        assert!(loader.get("island").is_some());
    }
}
