// tournament.rs
use crate::command::{Command, TOURNAMENT_FORMAT};
use crate::engine::GameEngine;
use crate::error::{GameError, Result};
use crate::game::GameState;
use crate::game_config::MapLoader;
use crate::player::Behavior;
use crate::strategy::StrategyProducer;
use itertools::Itertools;
use rayon::prelude::*;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

pub const MAP_RANGE: RangeInclusive<usize> = 1..=5;
pub const STRATEGY_RANGE: RangeInclusive<usize> = 2..=4;
pub const GAME_RANGE: RangeInclusive<u32> = 1..=5;
pub const TURN_RANGE: RangeInclusive<u32> = 10..=50;

pub const INVALID_MAP_COUNT: &str =
    "User entered invalid number of maps in command, Range of maps :- 1<=number of maps<=5";
pub const INVALID_STRATEGY_COUNT: &str =
    "User entered invalid number of player strategies in command, Range of strategies :- 2<=number of strategies<=4";
pub const INVALID_GAME_COUNT: &str =
    "Oops! It looks like the number of games provided is not valid, Range of games :- 1<=number of games<=5";
pub const INVALID_TURN_COUNT: &str =
    "User entered invalid number of turns in command, Range of turns :- 10<=number of turns<=50";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentConfig {
    pub maps: Vec<String>,
    pub strategies: Vec<Behavior>,
    pub games: u32,
    pub max_turns: u32,
}

impl TournamentConfig {
    /// Reads and range-checks every flag. Nothing is created here, so a
    /// rejected request leaves no trace besides the error.
    pub fn from_command(command: &Command) -> Result<Self> {
        let invalid = || GameError::command(TOURNAMENT_FORMAT);
        if !command.args.is_empty() || command.operations.len() != 4 {
            return Err(invalid());
        }
        let maps = flag(command, "m")?;
        let strategies = flag(command, "p")?;
        let games = flag(command, "g")?;
        let turns = flag(command, "d")?;

        if !MAP_RANGE.contains(&maps.len()) {
            return Err(GameError::command(INVALID_MAP_COUNT));
        }

        let mut behaviors = Vec::new();
        for name in strategies {
            let behavior = Behavior::from_name(name)
                .filter(|b| Behavior::COMPUTER.contains(b))
                .ok_or_else(|| {
                    GameError::command(format!(
                        "Invalid player strategy {}. Choose from: {}",
                        name,
                        Behavior::COMPUTER.iter().join(", ")
                    ))
                })?;
            if behaviors.contains(&behavior) {
                return Err(GameError::command(format!(
                    "Player strategy {} was given more than once",
                    behavior
                )));
            }
            behaviors.push(behavior);
        }
        if !STRATEGY_RANGE.contains(&behaviors.len()) {
            return Err(GameError::command(INVALID_STRATEGY_COUNT));
        }

        let games = single_number(games).ok_or_else(invalid)?;
        if !GAME_RANGE.contains(&games) {
            return Err(GameError::command(INVALID_GAME_COUNT));
        }
        let max_turns = single_number(turns).ok_or_else(invalid)?;
        if !TURN_RANGE.contains(&max_turns) {
            return Err(GameError::command(INVALID_TURN_COUNT));
        }

        Ok(Self {
            maps: maps.to_vec(),
            strategies: behaviors,
            games,
            max_turns,
        })
    }
}

fn flag<'a>(command: &'a Command, name: &str) -> Result<&'a [String]> {
    match command.operation(name) {
        Some(op) if !op.args.is_empty() => Ok(op.args.as_slice()),
        _ => Err(GameError::command(TOURNAMENT_FORMAT)),
    }
}

fn single_number(args: &[String]) -> Option<u32> {
    match args {
        [only] => only.parse().ok(),
        _ => None,
    }
}

/// One independent game of the tournament, with its own copy of the map
/// and its own players.
#[derive(Debug, Clone)]
pub struct TournamentGame {
    pub map: String,
    pub game_number: u32,
    pub state: GameState,
}

#[derive(Debug, Clone)]
pub struct Tournament {
    pub config: TournamentConfig,
    pub games: Vec<TournamentGame>,
}

impl Tournament {
    /// Loads every map once per game and seats one player per strategy.
    pub fn prepare(config: TournamentConfig, loader: &dyn MapLoader) -> Result<Self> {
        let mut games = Vec::new();
        for map in &config.maps {
            for game_number in 1..=config.games {
                let board = loader.load(map)?;
                board.validate().map_err(|error| {
                    GameError::map(format!("Tournament map {} is invalid: {}", map, error))
                })?;

                let mut state = GameState::new(board);
                for behavior in &config.strategies {
                    state.add_player(behavior.name(), *behavior);
                }
                state.max_turns = config.max_turns;
                state.turns_left = config.max_turns;
                games.push(TournamentGame {
                    map: map.clone(),
                    game_number,
                    state,
                });
            }
        }
        Ok(Self { config, games })
    }

    /// Plays every game in parallel; snapshots share nothing.
    pub fn run(self, loader: Arc<dyn MapLoader>) -> TournamentReport {
        let results = self
            .games
            .into_par_iter()
            .map(|game| play_game(game, loader.clone()))
            .collect();

        TournamentReport {
            config: self.config,
            results,
        }
    }
}

fn play_game(game: TournamentGame, loader: Arc<dyn MapLoader>) -> GameResult {
    let outcome = GameEngine::for_tournament(game.state, loader).and_then(|mut engine| {
        let mut producer = StrategyProducer::new();
        engine.play(&mut producer)?;
        Ok(engine)
    });

    match outcome {
        Ok(engine) => {
            tracing::info!(
                map = %game.map,
                game = game.game_number,
                winner = ?engine.state.winner,
                "tournament game finished"
            );
            GameResult {
                map: game.map,
                game_number: game.game_number,
                winner: engine.state.winner.clone(),
                losers: engine.state.losers.clone(),
            }
        }
        Err(error) => {
            tracing::warn!(map = %game.map, game = game.game_number, %error, "tournament game aborted");
            GameResult {
                map: game.map,
                game_number: game.game_number,
                winner: None,
                losers: Vec::new(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub map: String,
    pub game_number: u32,
    /// `None` for a draw.
    pub winner: Option<String>,
    pub losers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentReport {
    pub config: TournamentConfig,
    pub results: Vec<GameResult>,
}

impl TournamentReport {
    pub fn result(&self, map: &str, game_number: u32) -> Option<&GameResult> {
        self.results
            .iter()
            .find(|r| r.map == map && r.game_number == game_number)
    }
}

impl fmt::Display for TournamentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "M: {}", self.config.maps.join(", "))?;
        writeln!(f, "P: {}", self.config.strategies.iter().join(", "))?;
        writeln!(f, "G: {}", self.config.games)?;
        writeln!(f, "D: {}", self.config.max_turns)?;
        for result in &self.results {
            writeln!(
                f,
                "Map {} game {}: winner {}, losers {}",
                result.map,
                result.game_number,
                result.winner.as_deref().unwrap_or("Draw"),
                if result.losers.is_empty() {
                    "none".to_string()
                } else {
                    result.losers.join(", ")
                }
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(line: &str) -> Result<TournamentConfig> {
        TournamentConfig::from_command(&Command::parse(line).unwrap())
    }

    #[test]
    fn well_formed_request_is_accepted() {
        let config = config("tournament -M a b -P aggressive random -G 3 -D 20").unwrap();
        assert_eq!(config.maps, vec!["a", "b"]);
        assert_eq!(config.strategies, vec![Behavior::Aggressive, Behavior::Random]);
        assert_eq!(config.games, 3);
        assert_eq!(config.max_turns, 20);
    }

    #[test]
    fn out_of_range_games_are_rejected() {
        let error = config("tournament -M a -P aggressive random -G 8 -D 20").unwrap_err();
        assert_eq!(error.to_string(), INVALID_GAME_COUNT);
    }

    #[test]
    fn out_of_range_turns_are_rejected() {
        let error = config("tournament -M a -P aggressive random -G 2 -D 52").unwrap_err();
        assert_eq!(error.to_string(), INVALID_TURN_COUNT);
    }

    #[test]
    fn strategies_must_be_distinct_computers() {
        assert!(config("tournament -M a -P aggressive aggressive -G 1 -D 10").is_err());
        assert!(config("tournament -M a -P human random -G 1 -D 10").is_err());
        let single = config("tournament -M a -P random -G 1 -D 10").unwrap_err();
        assert_eq!(single.to_string(), INVALID_STRATEGY_COUNT);
    }

    #[test]
    fn too_many_maps_or_missing_flags() {
        let error = config("tournament -M a b c d e f -P aggressive random -G 1 -D 10").unwrap_err();
        assert_eq!(error.to_string(), INVALID_MAP_COUNT);
        let error = config("tournament -M a -P aggressive random -G 1").unwrap_err();
        assert_eq!(error.to_string(), TOURNAMENT_FORMAT);
    }
}
