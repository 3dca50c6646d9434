// turn_phase.rs
use crate::command::{Command, INVALID_IN_PHASE, MAP_NOT_LOADED, NOT_ENOUGH_PLAYERS};
use crate::engine::{GameEngine, GameMode};
use crate::error::{GameError, Result};
use crate::log::LogCategory;
use crate::order::{Order, OrderAction};
use crate::strategy::OrderProducer;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Phase {
    Startup,
    IssueOrders,
    OrderExecution,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Startup => f.write_str("Startup"),
            Phase::IssueOrders => f.write_str("Issue Orders"),
            Phase::OrderExecution => f.write_str("Order Execution"),
        }
    }
}

/// How an order-execution phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Someone owns the whole map. The engine stays where it is.
    GameOver { winner: String },
    /// Tournament game out of turns; back in startup.
    TurnLimitReached,
    /// Tournament game continues; already back in issue orders.
    NextTurn,
    /// Interactive game; call `continue_game` or `end_game`.
    AwaitingDecision,
    /// Every territory went to the neutral player; a draw, back in startup.
    Draw,
}

impl GameEngine {
    /// Moves to `next` if the transition is allowed from the current phase.
    pub fn request_phase(&mut self, next: Phase) -> Result<()> {
        let allowed = matches!(
            (self.phase, next),
            (Phase::Startup, Phase::IssueOrders)
                | (Phase::IssueOrders, Phase::OrderExecution)
                | (Phase::OrderExecution, Phase::IssueOrders)
                | (Phase::OrderExecution, Phase::Startup)
        );
        if !allowed {
            return Err(GameError::command(format!(
                "Cannot move from {} to {}",
                self.phase, next
            )));
        }
        if self.phase == Phase::Startup && !self.is_ready_to_play() {
            return Err(GameError::command(
                "Countries must be assigned on a valid map before orders can be issued",
            ));
        }

        self.phase = next;
        self.state
            .log
            .record(LogCategory::PhaseChange, next.to_string());
        Ok(())
    }

    fn is_ready_to_play(&self) -> bool {
        self.map_valid
            && self.state.active_players().count() >= 2
            && self
                .state
                .board
                .territories
                .keys()
                .all(|t| self.state.owner_index(*t).is_some())
    }

    /// Assigns territories, colours and first reinforcements, then enters
    /// issue orders.
    pub fn start_game(&mut self) -> Result<()> {
        if self.phase != Phase::Startup {
            return Err(GameError::command(INVALID_IN_PHASE));
        }
        if !self.map_valid {
            return Err(GameError::command(MAP_NOT_LOADED));
        }
        if self.state.active_players().count() < 2 {
            return Err(GameError::command(NOT_ENOUGH_PLAYERS));
        }

        self.state.winner = None;
        self.state.losers.clear();
        self.state.round = 0;
        for territory in self.state.board.territories.values_mut() {
            territory.armies = None;
        }
        self.state.players.retain(|p| !p.is_neutral());
        for player in self.state.players.iter_mut() {
            player.orders.clear();
            player.cards.clear();
            player.reset_for_new_turn();
        }

        self.state.log.record(
            LogCategory::GameStart,
            format!("Game started on map {}", self.state.board.name),
        );
        self.state.distribute_territories();
        self.state.recompute_all_continents();
        self.state.assign_colors();
        self.state.assign_reinforcements();
        self.request_phase(Phase::IssueOrders)
    }

    /// Parses, checks and queues one order for `player`. Structural
    /// failures are logged and the order is dropped.
    pub fn issue_order(&mut self, player: &str, line: &str) -> Result<()> {
        if self.phase != Phase::IssueOrders {
            return Err(GameError::command(INVALID_IN_PHASE));
        }
        let index = self
            .state
            .player_index(player)
            .ok_or_else(|| GameError::command(format!("Player {} is not part of the game", player)))?;
        let root = line
            .split_whitespace()
            .next()
            .map(|r| r.to_ascii_lowercase())
            .unwrap_or_default();
        if GameEngine::is_in_game_command(&root) {
            // Nothing is queued; the player is simply asked again.
            if let Err(error) = self.handle_command(line) {
                self.state.log.warn(LogCategory::HandleCommand, error.to_string());
            }
            return Ok(());
        }
        if Command::is_startup_command(&root) {
            return Err(GameError::command(INVALID_IN_PHASE));
        }

        let name = self.state.players[index].name.clone();
        let order = Order::parse(&name, line)?;
        match order.check_order_validity(&self.state) {
            Ok(()) => {
                let message = format!("{} queued", order.describe());
                let player = &mut self.state.players[index];
                order.reserve(player);
                player.issue_order(order);
                self.state.log.record(LogCategory::IssueOrder, message);
            }
            Err(reason) => {
                self.state.log.warn(
                    LogCategory::IssueOrder,
                    format!("Order of player {} rejected: {}", name, reason),
                );
            }
        }
        Ok(())
    }

    /// Asks every player who still wants to, one order per round, until
    /// nobody does; then moves on to order execution.
    pub fn run_issue_orders(&mut self, producer: &mut dyn OrderProducer) -> Result<()> {
        if self.phase != Phase::IssueOrders {
            return Err(GameError::command(INVALID_IN_PHASE));
        }

        loop {
            for index in 0..self.state.players.len() {
                let player = &self.state.players[index];
                if player.is_neutral() {
                    continue;
                }
                if player.territories.is_empty() {
                    self.state.players[index].wants_more_orders = false;
                    continue;
                }
                if !player.wants_more_orders {
                    continue;
                }

                if let Some(line) = producer.next_order(player, &self.state) {
                    let name = self.state.players[index].name.clone();
                    self.state.log.record(
                        LogCategory::IssueOrder,
                        format!("(Player: {}) {}", name, line.trim()),
                    );
                    if let Err(error) = self.issue_order(&name, &line) {
                        self.state.log.warn(LogCategory::IssueOrder, error.to_string());
                    }
                }
                let more = producer.wants_more_orders(&self.state.players[index], &self.state);
                self.state.players[index].wants_more_orders = more;
            }

            if !self.state.players.iter().any(|p| p.wants_more_orders) {
                break;
            }
        }

        self.request_phase(Phase::OrderExecution)
    }

    /// Executes every queued order round-robin, resets the turn and decides
    /// what comes next.
    pub fn run_order_execution(&mut self) -> Result<TurnOutcome> {
        if self.phase != Phase::OrderExecution {
            return Err(GameError::command(INVALID_IN_PHASE));
        }

        while self.state.any_orders_pending() {
            for index in 0..self.state.players.len() {
                if let Some(mut order) = self.state.players[index].next_order() {
                    self.state
                        .log
                        .record(LogCategory::OrderEffect, order.describe());
                    order.execute(&mut self.state);
                    self.state
                        .log
                        .record(LogCategory::OrderEffect, order.execution_log().to_string());
                }
            }
        }

        self.state.reset_players_for_new_turn();
        self.state.round += 1;

        if let Some(winner) = self.state.find_winner().map(|p| p.name.clone()) {
            self.state.record_result(Some(winner.clone()));
            return Ok(TurnOutcome::GameOver { winner });
        }
        if self.state.everyone_eliminated() {
            self.state.record_result(None);
            self.request_phase(Phase::Startup)?;
            return Ok(TurnOutcome::Draw);
        }

        match self.mode {
            GameMode::Tournament => {
                self.state.turns_left = self.state.turns_left.saturating_sub(1);
                if self.state.turns_left == 0 {
                    self.state.record_result(None);
                    self.request_phase(Phase::Startup)?;
                    Ok(TurnOutcome::TurnLimitReached)
                } else {
                    self.state.assign_reinforcements();
                    self.request_phase(Phase::IssueOrders)?;
                    Ok(TurnOutcome::NextTurn)
                }
            }
            GameMode::Interactive => Ok(TurnOutcome::AwaitingDecision),
        }
    }

    /// Next turn of an interactive game.
    pub fn continue_game(&mut self) -> Result<()> {
        if self.phase != Phase::OrderExecution || self.state.winner.is_some() {
            return Err(GameError::command(INVALID_IN_PHASE));
        }
        self.state.assign_reinforcements();
        self.request_phase(Phase::IssueOrders)
    }

    /// Abandons an interactive game and returns to startup.
    pub fn end_game(&mut self) -> Result<()> {
        if self.phase != Phase::OrderExecution {
            return Err(GameError::command(INVALID_IN_PHASE));
        }
        if self.state.winner.is_none() {
            self.state.record_result(None);
        }
        self.request_phase(Phase::Startup)
    }

    /// Plays turns until someone wins or, in tournament mode, turns run out.
    /// Interactive games keep going, so every player should be a computer.
    pub fn play(&mut self, producer: &mut dyn OrderProducer) -> Result<Option<String>> {
        loop {
            self.run_issue_orders(producer)?;
            match self.run_order_execution()? {
                TurnOutcome::GameOver { winner } => return Ok(Some(winner)),
                TurnOutcome::TurnLimitReached | TurnOutcome::Draw => return Ok(None),
                TurnOutcome::NextTurn => {}
                TurnOutcome::AwaitingDecision => self.continue_game()?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::game::GameState;
    use crate::game_config::MemoryMapLoader;
    use crate::player::Behavior;
    use crate::strategy::ScriptedProducer;
    use std::sync::Arc;

    fn ring_board(size: usize) -> Board {
        let mut board = Board::new("ring");
        board.add_continent("Ring", 2).unwrap();
        for i in 0..size {
            board.add_territory(&format!("T{}", i), "Ring").unwrap();
        }
        for i in 0..size {
            let next = (i + 1) % size;
            board.add_adjacency(&format!("T{}", i), &format!("T{}", next)).unwrap();
            board.add_adjacency(&format!("T{}", next), &format!("T{}", i)).unwrap();
        }
        board
    }

    fn started_engine(mode: GameMode) -> GameEngine {
        let mut state = GameState::new(ring_board(6));
        state.add_player("alice", Behavior::Human);
        state.add_player("bob", Behavior::Human);
        let mut engine = GameEngine::new(Arc::new(MemoryMapLoader::new()));
        engine.state = state;
        engine.mode = mode;
        engine.map_open = true;
        engine.map_valid = true;
        engine.start_game().unwrap();
        engine
    }

    fn first_territory(engine: &GameEngine, player: usize) -> String {
        let id = engine.state.players[player].territories[0];
        engine.state.board.territory_name(id).to_string()
    }

    #[test]
    fn only_listed_transitions_are_allowed() {
        let mut engine = GameEngine::new(Arc::new(MemoryMapLoader::new()));
        assert!(engine.request_phase(Phase::OrderExecution).is_err());
        assert!(engine.request_phase(Phase::IssueOrders).is_err());
        assert_eq!(engine.phase(), Phase::Startup);
    }

    #[test]
    fn starting_assigns_everything() {
        let engine = started_engine(GameMode::Interactive);
        assert_eq!(engine.phase(), Phase::IssueOrders);
        assert_eq!(engine.state.players[0].territories.len(), 3);
        assert_eq!(engine.state.players[0].reinforcements, 3);
        assert_eq!(engine.state.players[1].color.as_deref(), Some("green"));
    }

    #[test]
    fn issue_orders_queues_and_deducts_the_pool() {
        let mut engine = started_engine(GameMode::Interactive);
        let mine = first_territory(&engine, 0);
        let mut producer = ScriptedProducer::new()
            .with_orders("alice", &[&format!("deploy {} 2", mine), "deploy Nowhere 1"]);
        engine.run_issue_orders(&mut producer).unwrap();
        assert_eq!(engine.phase(), Phase::OrderExecution);
        assert_eq!(engine.state.players[0].orders.len(), 1);
        assert_eq!(engine.state.players[0].reinforcements, 1);
        assert!(engine.state.log.contains("rejected"));
    }

    #[test]
    fn startup_commands_are_refused_while_issuing() {
        let mut engine = started_engine(GameMode::Interactive);
        let result = engine.issue_order("alice", "loadmap world");
        assert!(matches!(result, Err(GameError::InvalidCommand(ref m)) if m == INVALID_IN_PHASE));
        assert!(matches!(engine.issue_order("alice", "deploy x"), Err(GameError::InvalidCommand(_))));
    }

    #[test]
    fn showmap_works_between_orders() {
        let mut engine = started_engine(GameMode::Interactive);
        engine.issue_order("alice", "showmap").unwrap();
        assert!(engine.state.log.contains("Player alice"));
        assert!(engine.state.players[0].orders.is_empty());

        engine.issue_order("alice", "showmap now").unwrap();
        assert!(engine.state.log.contains(crate::command::SHOWMAP_FORMAT));
        assert_eq!(engine.phase(), Phase::IssueOrders);
    }

    #[test]
    fn execution_drains_queues_and_resets_the_turn() {
        let mut engine = started_engine(GameMode::Interactive);
        let mine = first_territory(&engine, 0);
        let theirs = first_territory(&engine, 1);
        let mut producer = ScriptedProducer::new()
            .with_orders("alice", &[&format!("deploy {} 3", mine)])
            .with_orders("bob", &[&format!("deploy {} 3", theirs)]);
        engine.run_issue_orders(&mut producer).unwrap();
        let outcome = engine.run_order_execution().unwrap();
        assert_eq!(outcome, TurnOutcome::AwaitingDecision);
        assert!(!engine.state.any_orders_pending());
        assert!(engine.state.players.iter().all(|p| p.wants_more_orders));
        let id = engine.state.board.territory_id(&mine).unwrap();
        assert_eq!(engine.state.board.get_territory(id).unwrap().armies, Some(3));

        engine.continue_game().unwrap();
        assert_eq!(engine.phase(), Phase::IssueOrders);
        assert_eq!(engine.state.players[0].reinforcements, 3);
    }

    #[test]
    fn tournament_turn_limit_returns_to_startup() {
        let mut engine = started_engine(GameMode::Tournament);
        engine.state.max_turns = 2;
        engine.state.turns_left = 2;
        let mut producer = ScriptedProducer::new();
        engine.run_issue_orders(&mut producer).unwrap();
        assert_eq!(engine.run_order_execution().unwrap(), TurnOutcome::NextTurn);
        assert_eq!(engine.phase(), Phase::IssueOrders);
        engine.run_issue_orders(&mut producer).unwrap();
        assert_eq!(engine.run_order_execution().unwrap(), TurnOutcome::TurnLimitReached);
        assert_eq!(engine.phase(), Phase::Startup);
        assert!(engine.state.winner.is_none());
    }

    #[test]
    fn owning_every_territory_ends_the_game() {
        let mut engine = started_engine(GameMode::Interactive);
        let all: Vec<u32> = engine.state.board.territories.keys().copied().collect();
        engine.state.players[0].territories = all;
        engine.state.players[1].territories.clear();
        let mut producer = ScriptedProducer::new();
        engine.run_issue_orders(&mut producer).unwrap();
        let outcome = engine.run_order_execution().unwrap();
        assert_eq!(outcome, TurnOutcome::GameOver { winner: "alice".to_string() });
        assert_eq!(engine.state.losers, vec!["bob".to_string()]);
        assert!(engine.continue_game().is_err());
    }

    #[test]
    fn a_fully_neutral_map_is_a_draw() {
        let mut engine = started_engine(GameMode::Interactive);
        let all: Vec<u32> = engine.state.board.territories.keys().copied().collect();
        let neutral = engine.state.neutral_index();
        engine.state.players[neutral].territories = all;
        engine.state.players[0].territories.clear();
        engine.state.players[1].territories.clear();
        let mut producer = ScriptedProducer::new();
        engine.run_issue_orders(&mut producer).unwrap();
        assert_eq!(engine.run_order_execution().unwrap(), TurnOutcome::Draw);
        assert_eq!(engine.phase(), Phase::Startup);
        assert!(engine.state.winner.is_none());
        assert!(engine.state.losers.is_empty());
    }
}
