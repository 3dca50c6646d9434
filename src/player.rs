// player.rs
use crate::card::CardKind;
use crate::continent::ContinentId;
use crate::order::Order;
use crate::territory::TerritoryId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

pub const NEUTRAL_PLAYER: &str = "Neutral";

/// Who produces a player's order strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Behavior {
    Human,
    Aggressive,
    Benevolent,
    Random,
    Neutral,
}

impl Behavior {
    /// Strategies a tournament may field.
    pub const COMPUTER: [Behavior; 3] = [Behavior::Aggressive, Behavior::Benevolent, Behavior::Random];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "human" => Some(Behavior::Human),
            "aggressive" => Some(Behavior::Aggressive),
            "benevolent" => Some(Behavior::Benevolent),
            "random" => Some(Behavior::Random),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Behavior::Human => "Human",
            Behavior::Aggressive => "Aggressive",
            Behavior::Benevolent => "Benevolent",
            Behavior::Random => "Random",
            Behavior::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub name: String,
    pub color: Option<String>,
    pub behavior: Behavior,
    pub territories: Vec<TerritoryId>,
    /// Derived from `territories`; only valid after `GameState::recompute_continents`.
    pub continents: Vec<ContinentId>,
    pub reinforcements: u32,
    pub cards: Vec<CardKind>,
    pub wants_more_orders: bool,
    pub orders: VecDeque<Order>,
    pub negotiated_with: BTreeSet<String>,
    pub card_granted_this_turn: bool,
}

impl Player {
    pub fn new(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            color: None,
            behavior,
            territories: Vec::new(),
            continents: Vec::new(),
            reinforcements: 0,
            cards: Vec::new(),
            wants_more_orders: behavior != Behavior::Neutral,
            orders: VecDeque::new(),
            negotiated_with: BTreeSet::new(),
            card_granted_this_turn: false,
        }
    }

    pub fn neutral() -> Self {
        Self::new(NEUTRAL_PLAYER, Behavior::Neutral)
    }

    pub fn is_neutral(&self) -> bool {
        self.behavior == Behavior::Neutral
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn owns(&self, territory: TerritoryId) -> bool {
        self.territories.contains(&territory)
    }

    pub fn add_territory(&mut self, territory: TerritoryId) {
        if !self.owns(territory) {
            self.territories.push(territory);
        }
    }

    pub fn remove_territory(&mut self, territory: TerritoryId) {
        self.territories.retain(|t| *t != territory);
    }

    pub fn issue_order(&mut self, order: Order) {
        self.orders.push_back(order);
    }

    pub fn next_order(&mut self) -> Option<Order> {
        self.orders.pop_front()
    }

    pub fn has_pending_orders(&self) -> bool {
        !self.orders.is_empty()
    }

    pub fn card_count(&self, kind: CardKind) -> usize {
        self.cards.iter().filter(|c| **c == kind).count()
    }

    /// Queued orders that will spend a card of `kind`.
    pub fn queued_card_orders(&self, kind: CardKind) -> usize {
        self.orders
            .iter()
            .filter(|o| o.card_kind() == Some(kind))
            .count()
    }

    pub fn remove_card(&mut self, kind: CardKind) -> bool {
        match self.cards.iter().position(|c| *c == kind) {
            Some(index) => {
                self.cards.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn has_negotiated_with(&self, name: &str) -> bool {
        self.negotiated_with
            .iter()
            .any(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn add_negotiation(&mut self, name: &str) {
        self.negotiated_with.insert(name.to_string());
    }

    /// Per-turn reset run after every order-execution phase.
    pub fn reset_for_new_turn(&mut self) {
        self.wants_more_orders = !self.is_neutral();
        self.card_granted_this_turn = false;
        self.negotiated_with.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn territories_are_not_duplicated() {
        let mut player = Player::new("alice", Behavior::Human);
        player.add_territory(3);
        player.add_territory(3);
        player.add_territory(1);
        assert_eq!(player.territories, vec![3, 1]);
        player.remove_territory(3);
        assert_eq!(player.territories, vec![1]);
    }

    #[test]
    fn neutral_never_wants_orders() {
        let mut neutral = Player::neutral();
        assert!(!neutral.wants_more_orders);
        neutral.reset_for_new_turn();
        assert!(!neutral.wants_more_orders);
    }

    #[test]
    fn reset_clears_pacts_and_card_flag() {
        let mut player = Player::new("bob", Behavior::Aggressive);
        player.add_negotiation("alice");
        player.card_granted_this_turn = true;
        player.wants_more_orders = false;
        assert!(player.has_negotiated_with("ALICE"));
        player.reset_for_new_turn();
        assert!(player.negotiated_with.is_empty());
        assert!(!player.card_granted_this_turn);
        assert!(player.wants_more_orders);
    }

    #[test]
    fn removing_a_card_takes_one_copy() {
        let mut player = Player::new("carol", Behavior::Human);
        player.cards = vec![CardKind::Bomb, CardKind::Airlift, CardKind::Bomb];
        assert!(player.remove_card(CardKind::Bomb));
        assert_eq!(player.card_count(CardKind::Bomb), 1);
        assert!(!player.remove_card(CardKind::Blockade));
    }

    #[test]
    fn behavior_names_parse_ignoring_case() {
        assert_eq!(Behavior::from_name("AGGRESSIVE"), Some(Behavior::Aggressive));
        assert_eq!(Behavior::from_name("cheater"), None);
        assert_eq!(Behavior::Benevolent.to_string(), "Benevolent");
    }
}
