// game.rs
use crate::board::Board;
use crate::continent::ContinentId;
use crate::log::{GameLog, LogCategory};
use crate::player::{Behavior, Player, NEUTRAL_PLAYER};
use crate::territory::TerritoryId;
use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};

pub const MIN_REINFORCEMENTS: u32 = 3;
pub const PLAYER_COLORS: [&str; 6] = ["red", "green", "yellow", "blue", "purple", "cyan"];

/// Everything one game owns: the board, its players, the turn counters and
/// the running log. Orders receive it by reference; nothing is global.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub board: Board,
    pub players: Vec<Player>,
    pub round: u32,
    /// Zero in interactive games.
    pub max_turns: u32,
    pub turns_left: u32,
    pub log: GameLog,
    pub winner: Option<String>,
    pub losers: Vec<String>,
}

impl GameState {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            players: Vec::new(),
            round: 0,
            max_turns: 0,
            turns_left: 0,
            log: GameLog::new(),
            winner: None,
            losers: Vec::new(),
        }
    }

    pub fn player_index(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.has_name(name))
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.has_name(name))
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.has_name(name))
    }

    pub fn owner_index(&self, territory: TerritoryId) -> Option<usize> {
        self.players.iter().position(|p| p.owns(territory))
    }

    pub fn owner_of(&self, territory: TerritoryId) -> Option<&Player> {
        self.players.iter().find(|p| p.owns(territory))
    }

    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.is_neutral())
    }

    /// Index of the neutral player, created on first use.
    pub fn neutral_index(&mut self) -> usize {
        match self.players.iter().position(|p| p.is_neutral()) {
            Some(index) => index,
            None => {
                self.players.push(Player::neutral());
                self.log.record(
                    LogCategory::OrderEffect,
                    format!("{} player joined the game", NEUTRAL_PLAYER),
                );
                self.players.len() - 1
            }
        }
    }

    /// Moves ownership of `territory` to the player at `new_owner`.
    pub fn transfer_territory(&mut self, territory: TerritoryId, new_owner: usize) {
        for player in self.players.iter_mut() {
            player.remove_territory(territory);
        }
        if let Some(player) = self.players.get_mut(new_owner) {
            player.add_territory(territory);
        }
    }

    pub fn recompute_continents(&mut self, index: usize) {
        let owned: Vec<ContinentId> = match self.players.get(index) {
            Some(player) => self
                .board
                .continents
                .values()
                .filter(|c| c.is_controlled_by(&player.territories))
                .map(|c| c.id)
                .collect(),
            None => return,
        };
        self.players[index].continents = owned;
    }

    pub fn recompute_all_continents(&mut self) {
        for index in 0..self.players.len() {
            self.recompute_continents(index);
        }
    }

    pub fn calculate_reinforcements(&self, index: usize) -> u32 {
        let player = match self.players.get(index) {
            Some(player) => player,
            None => return 0,
        };
        if player.territories.is_empty() {
            return 0;
        }
        let territories_owned = player.territories.len() as u32;
        let base_reinforcements = std::cmp::max(territories_owned / 3, MIN_REINFORCEMENTS);

        let continent_bonus: u32 = self
            .board
            .continents
            .values()
            .filter(|c| c.is_controlled_by(&player.territories))
            .map(|c| c.get_bonus())
            .sum();

        base_reinforcements + continent_bonus
    }

    /// Sets every active player's pool for the coming turn. Unspent armies
    /// from the previous turn are not carried over.
    pub fn assign_reinforcements(&mut self) {
        for index in 0..self.players.len() {
            if self.players[index].is_neutral() {
                continue;
            }
            let armies = self.calculate_reinforcements(index);
            self.players[index].reinforcements = armies;
            let message = format!(
                "Player {} receives {} reinforcement armies",
                self.players[index].name, armies
            );
            self.log.record(LogCategory::OrderEffect, message);
        }
    }

    /// Even random split of every territory among active players; the
    /// remainder goes out one territory at a time in roster order.
    pub fn distribute_territories(&mut self) {
        let active: Vec<usize> = (0..self.players.len())
            .filter(|i| !self.players[*i].is_neutral())
            .collect();
        if active.is_empty() {
            return;
        }
        for player in self.players.iter_mut() {
            player.territories.clear();
        }

        let mut territories: Vec<TerritoryId> = self.board.territories.keys().copied().collect();
        territories.shuffle(&mut thread_rng());

        let share = territories.len() / active.len();
        let mut remaining = territories.into_iter();
        for &index in &active {
            for territory in remaining.by_ref().take(share) {
                self.players[index].add_territory(territory);
            }
        }
        for (&index, territory) in active.iter().cycle().zip(remaining) {
            self.players[index].add_territory(territory);
        }

        for &index in &active {
            let player = &self.players[index];
            let message = format!(
                "Player {} was assigned {} territories",
                player.name,
                player.territories.len()
            );
            self.log.record(LogCategory::GameStart, message);
        }
    }

    pub fn assign_colors(&mut self) {
        for (player, color) in self
            .players
            .iter_mut()
            .filter(|p| !p.is_neutral())
            .zip(PLAYER_COLORS.iter().cycle())
        {
            player.color = Some(color.to_string());
        }
    }

    /// The player owning every territory, if any.
    pub fn find_winner(&self) -> Option<&Player> {
        let total = self.board.territories.len();
        if total == 0 {
            return None;
        }
        self.active_players().find(|p| p.territories.len() == total)
    }

    /// No real player holds a territory any more.
    pub fn everyone_eliminated(&self) -> bool {
        self.active_players().all(|p| p.territories.is_empty())
    }

    pub fn record_result(&mut self, winner: Option<String>) {
        self.losers = match &winner {
            Some(name) => self
                .active_players()
                .filter(|p| !p.has_name(name))
                .map(|p| p.name.clone())
                .collect(),
            None => Vec::new(),
        };
        let message = match &winner {
            Some(name) => format!("Player {} has won the game!", name),
            None => "The game ended in a draw".to_string(),
        };
        self.winner = winner;
        self.log.record(LogCategory::GameEnd, message);
    }

    pub fn any_orders_pending(&self) -> bool {
        self.players.iter().any(|p| p.has_pending_orders())
    }

    pub fn reset_players_for_new_turn(&mut self) {
        for player in self.players.iter_mut() {
            player.reset_for_new_turn();
        }
    }

    pub fn add_player(&mut self, name: &str, behavior: Behavior) -> bool {
        if self.player(name).is_some() {
            return false;
        }
        self.players.push(Player::new(name, behavior));
        true
    }

    pub fn remove_player(&mut self, name: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| !p.has_name(name));
        before != self.players.len()
    }
}
