// strategy.rs
use crate::card::CardKind;
use crate::game::GameState;
use crate::order::Order;
use crate::player::{Behavior, Player};
use crate::territory::TerritoryId;
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use std::collections::{HashMap, VecDeque};

/// Supplies order strings to the issue-orders loop. `None` means the player
/// passes this round.
pub trait OrderProducer {
    fn next_order(&mut self, player: &Player, state: &GameState) -> Option<String>;

    fn wants_more_orders(&mut self, player: &Player, state: &GameState) -> bool;
}

/// Replays fixed order strings per player. A player whose script runs dry
/// stops asking for more orders.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProducer {
    scripts: HashMap<String, VecDeque<String>>,
}

impl ScriptedProducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(mut self, player: &str, orders: &[&str]) -> Self {
        self.push_orders(player, orders);
        self
    }

    pub fn push_orders(&mut self, player: &str, orders: &[&str]) {
        self.scripts
            .entry(player.to_ascii_lowercase())
            .or_default()
            .extend(orders.iter().map(|o| o.to_string()));
    }

    fn script(&mut self, player: &Player) -> Option<&mut VecDeque<String>> {
        self.scripts.get_mut(&player.name.to_ascii_lowercase())
    }
}

impl OrderProducer for ScriptedProducer {
    fn next_order(&mut self, player: &Player, _state: &GameState) -> Option<String> {
        self.script(player)?.pop_front()
    }

    fn wants_more_orders(&mut self, player: &Player, _state: &GameState) -> bool {
        self.script(player).map_or(false, |s| !s.is_empty())
    }
}

/// Computer players. Picks orders according to each player's `Behavior`;
/// human and neutral players never get an order from it.
pub struct StrategyProducer {
    rng: ThreadRng,
}

impl Default for StrategyProducer {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyProducer {
    pub fn new() -> Self {
        Self { rng: thread_rng() }
    }

    fn aggressive(&mut self, player: &Player, state: &GameState) -> Option<String> {
        let strongest = *player
            .territories
            .iter()
            .max_by_key(|t| planned_armies(player, state, **t))?;
        let strongest_name = state.board.territory_name(strongest);

        if player.reinforcements > 0 {
            return Some(format!("deploy {} {}", strongest_name, player.reinforcements));
        }

        let enemies = enemy_neighbours(player, state, strongest);
        if let Some(target) = enemies.choose(&mut self.rng) {
            if playable(player, CardKind::Bomb) && self.rng.gen_bool(0.5) {
                return Some(format!("bomb {}", state.board.territory_name(*target)));
            }
        }

        let armies = planned_armies(player, state, strongest);
        if armies <= 1 {
            return None;
        }
        let target = match enemies.choose(&mut self.rng) {
            Some(target) => *target,
            None => *neighbours(state, strongest).choose(&mut self.rng)?,
        };
        Some(format!(
            "advance {} {} {}",
            strongest_name,
            state.board.territory_name(target),
            armies - 1
        ))
    }

    fn benevolent(&mut self, player: &Player, state: &GameState) -> Option<String> {
        let weakest = *player
            .territories
            .iter()
            .min_by_key(|t| planned_armies(player, state, **t))?;

        if player.reinforcements > 0 {
            return Some(format!(
                "deploy {} {}",
                state.board.territory_name(weakest),
                player.reinforcements
            ));
        }

        if playable(player, CardKind::Negotiate) {
            let others: Vec<&Player> = state
                .active_players()
                .filter(|p| !p.has_name(&player.name))
                .collect();
            if let Some(other) = others.choose(&mut self.rng) {
                return Some(format!("negotiate {}", other.name));
            }
        }

        // Shift armies from the strongest holding towards its weakest friendly neighbour.
        let strongest = *player
            .territories
            .iter()
            .max_by_key(|t| planned_armies(player, state, **t))?;
        let armies = planned_armies(player, state, strongest);
        let target = neighbours(state, strongest)
            .into_iter()
            .filter(|t| player.owns(*t))
            .min_by_key(|t| planned_armies(player, state, *t))?;
        if armies < 3 {
            return None;
        }
        Some(format!(
            "advance {} {} {}",
            state.board.territory_name(strongest),
            state.board.territory_name(target),
            armies / 2
        ))
    }

    fn random(&mut self, player: &Player, state: &GameState) -> Option<String> {
        let territory = *player.territories.choose(&mut self.rng)?;
        let name = state.board.territory_name(territory);

        if player.reinforcements > 0 {
            let armies = self.rng.gen_range(1..=player.reinforcements);
            return Some(format!("deploy {} {}", name, armies));
        }

        let playable_cards: Vec<CardKind> = CardKind::ALL
            .iter()
            .copied()
            .filter(|c| playable(player, *c))
            .collect();
        if let Some(card) = playable_cards.choose(&mut self.rng) {
            if self.rng.gen_bool(0.3) {
                return self.card_order(*card, player, state, territory);
            }
        }

        let armies = planned_armies(player, state, territory);
        if armies <= 1 {
            return None;
        }
        let target = *neighbours(state, territory).choose(&mut self.rng)?;
        Some(format!(
            "advance {} {} {}",
            name,
            state.board.territory_name(target),
            self.rng.gen_range(1..armies)
        ))
    }

    fn card_order(
        &mut self,
        card: CardKind,
        player: &Player,
        state: &GameState,
        territory: TerritoryId,
    ) -> Option<String> {
        match card {
            CardKind::Bomb => {
                let target = *enemy_neighbours(player, state, territory).choose(&mut self.rng)?;
                Some(format!("bomb {}", state.board.territory_name(target)))
            }
            CardKind::Blockade => Some(format!("blockade {}", state.board.territory_name(territory))),
            CardKind::Airlift => {
                let target = *player.territories.choose(&mut self.rng)?;
                let armies = planned_armies(player, state, territory);
                if target == territory || armies == 0 {
                    return None;
                }
                Some(format!(
                    "airlift {} {} {}",
                    state.board.territory_name(territory),
                    state.board.territory_name(target),
                    armies
                ))
            }
            CardKind::Negotiate => {
                let other = state
                    .active_players()
                    .filter(|p| !p.has_name(&player.name))
                    .map(|p| p.name.clone())
                    .collect::<Vec<_>>()
                    .choose(&mut self.rng)?
                    .clone();
                Some(format!("negotiate {}", other))
            }
        }
    }
}

impl OrderProducer for StrategyProducer {
    fn next_order(&mut self, player: &Player, state: &GameState) -> Option<String> {
        match player.behavior {
            Behavior::Aggressive => self.aggressive(player, state),
            Behavior::Benevolent => self.benevolent(player, state),
            Behavior::Random => self.random(player, state),
            Behavior::Human | Behavior::Neutral => None,
        }
    }

    fn wants_more_orders(&mut self, player: &Player, _state: &GameState) -> bool {
        match player.behavior {
            Behavior::Human | Behavior::Neutral => false,
            _ => player.reinforcements > 0 || self.rng.gen_bool(0.5),
        }
    }
}

/// Armies on the territory once the player's queued deploys have landed.
fn planned_armies(player: &Player, state: &GameState, territory: TerritoryId) -> u32 {
    let on_board = state
        .board
        .get_territory(territory)
        .map_or(0, |t| t.army_count());
    let incoming: u32 = player
        .orders
        .iter()
        .filter_map(|order| match order {
            Order::Deploy(deploy) => state
                .board
                .territory_id(&deploy.territory)
                .filter(|id| *id == territory)
                .map(|_| deploy.armies),
            _ => None,
        })
        .sum();
    on_board + incoming
}

fn neighbours(state: &GameState, territory: TerritoryId) -> Vec<TerritoryId> {
    state
        .board
        .get_territory(territory)
        .map(|t| t.adjacent_territories.iter().copied().collect())
        .unwrap_or_default()
}

fn enemy_neighbours(player: &Player, state: &GameState, territory: TerritoryId) -> Vec<TerritoryId> {
    neighbours(state, territory)
        .into_iter()
        .filter(|t| !player.owns(*t))
        .collect()
}

fn playable(player: &Player, card: CardKind) -> bool {
    player.card_count(card) > player.queued_card_orders(card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn state() -> GameState {
        let mut board = Board::new("strategy");
        board.add_continent("C", 1).unwrap();
        for name in ["A", "B", "C"] {
            board.add_territory(name, "C").unwrap();
        }
        for (from, to) in [("A", "B"), ("B", "A"), ("B", "C"), ("C", "B")] {
            board.add_adjacency(from, to).unwrap();
        }
        board.get_territory_mut(1).unwrap().armies = Some(2);
        board.get_territory_mut(2).unwrap().armies = Some(8);
        board.get_territory_mut(3).unwrap().armies = Some(4);
        let mut state = GameState::new(board);
        state.add_player("aggro", Behavior::Aggressive);
        state.add_player("kind", Behavior::Benevolent);
        state.players[0].territories = vec![1, 2];
        state.players[1].territories = vec![3];
        state
    }

    #[test]
    fn aggressive_deploys_on_its_strongest_territory() {
        let mut state = state();
        state.players[0].reinforcements = 3;
        let mut producer = StrategyProducer::new();
        let order = producer.next_order(&state.players[0], &state);
        assert_eq!(order.as_deref(), Some("deploy B 3"));
    }

    #[test]
    fn aggressive_attacks_from_its_strongest_territory() {
        let state = state();
        let mut producer = StrategyProducer::new();
        let order = producer.next_order(&state.players[0], &state).unwrap();
        assert_eq!(order, "advance B C 7");
    }

    #[test]
    fn benevolent_reinforces_its_weakest_territory() {
        let mut state = state();
        state.players[0].behavior = Behavior::Benevolent;
        state.players[0].reinforcements = 2;
        let mut producer = StrategyProducer::new();
        let order = producer.next_order(&state.players[0], &state);
        assert_eq!(order.as_deref(), Some("deploy A 2"));
    }

    #[test]
    fn planned_armies_include_queued_deploys() {
        let mut state = state();
        let deploy = Order::parse("aggro", "deploy A 5").unwrap();
        state.players[0].issue_order(deploy);
        assert_eq!(planned_armies(&state.players[0], &state, 1), 7);
    }

    #[test]
    fn random_player_only_targets_its_own_or_adjacent_territories() {
        let mut state = state();
        state.players[0].behavior = Behavior::Random;
        let mut producer = StrategyProducer::new();
        for _ in 0..20 {
            if let Some(order) = producer.next_order(&state.players[0], &state) {
                let parsed = Order::parse("aggro", &order).unwrap();
                assert!(matches!(parsed, Order::Advance(_)));
            }
        }
    }

    #[test]
    fn scripted_producer_runs_dry() {
        let state = state();
        let mut producer = ScriptedProducer::new().with_orders("Aggro", &["deploy A 1"]);
        let player = &state.players[0];
        assert!(producer.wants_more_orders(player, &state));
        assert_eq!(producer.next_order(player, &state).as_deref(), Some("deploy A 1"));
        assert!(!producer.wants_more_orders(player, &state));
        assert_eq!(producer.next_order(&state.players[1], &state), None);
    }

    #[test]
    fn humans_are_left_to_the_driver() {
        let mut state = state();
        state.players[0].behavior = Behavior::Human;
        let mut producer = StrategyProducer::new();
        assert!(producer.next_order(&state.players[0], &state).is_none());
        assert!(!producer.wants_more_orders(&state.players[0], &state));
    }
}
