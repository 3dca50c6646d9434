// card.rs
use crate::game::GameState;
use crate::order::{ensure_owned, issuer_index, territory_of, OrderAction};
use crate::player::Player;
use rand::prelude::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardKind {
    Bomb,
    Blockade,
    Airlift,
    Negotiate,
}

impl CardKind {
    pub const ALL: [CardKind; 4] = [
        CardKind::Bomb,
        CardKind::Blockade,
        CardKind::Airlift,
        CardKind::Negotiate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CardKind::Bomb => "bomb",
            CardKind::Blockade => "blockade",
            CardKind::Airlift => "airlift",
            CardKind::Negotiate => "negotiate",
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Player {
    /// Draws a random card unless one was already granted this turn.
    pub fn grant_random_card(&mut self) -> Option<CardKind> {
        if self.card_granted_this_turn {
            return None;
        }
        let card = *CardKind::ALL.choose(&mut thread_rng())?;
        self.cards.push(card);
        self.card_granted_this_turn = true;
        Some(card)
    }
}

/// A card may back an order only if it is not already spoken for by an
/// order waiting in the queue.
fn check_card_in_hand(state: &GameState, issuer: &str, kind: CardKind) -> Result<(), String> {
    let player = &state.players[issuer_index(state, issuer)?];
    if player.card_count(kind) > player.queued_card_orders(kind) {
        Ok(())
    } else {
        Err(format!("Player {} does not hold a {} card", issuer, kind))
    }
}

fn spend_card(state: &mut GameState, issuer: &str, kind: CardKind) {
    if let Some(player) = state.player_mut(issuer) {
        player.remove_card(kind);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bomb {
    pub issuer: String,
    pub territory: String,
    pub log: String,
}

impl Bomb {
    pub fn new(issuer: &str, territory: &str) -> Self {
        Self {
            issuer: issuer.to_string(),
            territory: territory.to_string(),
            log: String::new(),
        }
    }
}

impl OrderAction for Bomb {
    fn issuer(&self) -> &str {
        &self.issuer
    }

    fn check_order_validity(&self, state: &GameState) -> Result<(), String> {
        territory_of(state, &self.territory)?;
        check_card_in_hand(state, &self.issuer, CardKind::Bomb)
    }

    fn validate(&self, state: &GameState) -> Result<(), String> {
        let territory = territory_of(state, &self.territory)?;
        if ensure_owned(state, &self.issuer, territory).is_ok() {
            return Err("You are not allowed to use the bomb on your own territory!".to_string());
        }
        if state.owner_of(territory).is_none() {
            return Err(format!("{} has no owner to bomb", self.territory));
        }
        Ok(())
    }

    fn execute(&mut self, state: &mut GameState) {
        let territory = match self.validate(state).and_then(|_| territory_of(state, &self.territory)) {
            Ok(territory) => territory,
            Err(reason) => {
                self.log = format!("Bomb order of player {} is invalid: {}", self.issuer, reason);
                return;
            }
        };

        if let Some(owner) = state.owner_of(territory) {
            if owner.has_negotiated_with(&self.issuer) {
                self.log = format!(
                    "Bomb order cannot be executed as player {} negotiated terms with player {}",
                    owner.name, self.issuer
                );
                return;
            }
        }

        let armies = match state.board.get_territory_mut(territory) {
            Some(target) => {
                let halved = target.army_count() / 2;
                target.set_armies(halved);
                halved
            }
            None => 0,
        };
        spend_card(state, &self.issuer, CardKind::Bomb);
        self.log = format!(
            "Player {} bombed {}, leaving {} armies",
            self.issuer, self.territory, armies
        );
    }

    fn describe(&self) -> String {
        format!("Bomb order issued by player {} on {}", self.issuer, self.territory)
    }

    fn execution_log(&self) -> &str {
        &self.log
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Blockade {
    pub issuer: String,
    pub territory: String,
    pub log: String,
}

impl Blockade {
    pub fn new(issuer: &str, territory: &str) -> Self {
        Self {
            issuer: issuer.to_string(),
            territory: territory.to_string(),
            log: String::new(),
        }
    }
}

impl OrderAction for Blockade {
    fn issuer(&self) -> &str {
        &self.issuer
    }

    fn check_order_validity(&self, state: &GameState) -> Result<(), String> {
        territory_of(state, &self.territory)?;
        check_card_in_hand(state, &self.issuer, CardKind::Blockade)
    }

    fn validate(&self, state: &GameState) -> Result<(), String> {
        let territory = territory_of(state, &self.territory)?;
        ensure_owned(state, &self.issuer, territory)
    }

    fn execute(&mut self, state: &mut GameState) {
        let (territory, issuer) = match self
            .validate(state)
            .and_then(|_| territory_of(state, &self.territory))
            .and_then(|t| Ok((t, issuer_index(state, &self.issuer)?)))
        {
            Ok(resolved) => resolved,
            Err(reason) => {
                self.log = format!(
                    "Blockade order of player {} is invalid: {}",
                    self.issuer, reason
                );
                return;
            }
        };

        // An empty territory still triples from one army.
        let armies = match state.board.get_territory_mut(territory) {
            Some(target) => {
                let tripled = target.army_count().max(1) * 3;
                target.set_armies(tripled);
                tripled
            }
            None => 0,
        };

        let neutral = state.neutral_index();
        state.transfer_territory(territory, neutral);
        spend_card(state, &self.issuer, CardKind::Blockade);
        state.recompute_continents(issuer);
        state.recompute_continents(neutral);
        self.log = format!(
            "Player {} blockaded {}: {} armies now held by the neutral player",
            self.issuer, self.territory, armies
        );
    }

    fn describe(&self) -> String {
        format!(
            "Blockade order issued by player {} on {}",
            self.issuer, self.territory
        )
    }

    fn execution_log(&self) -> &str {
        &self.log
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Airlift {
    pub issuer: String,
    pub source: String,
    pub target: String,
    pub armies: u32,
    pub log: String,
}

impl Airlift {
    pub fn new(issuer: &str, source: &str, target: &str, armies: u32) -> Self {
        Self {
            issuer: issuer.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            armies,
            log: String::new(),
        }
    }
}

impl OrderAction for Airlift {
    fn issuer(&self) -> &str {
        &self.issuer
    }

    fn check_order_validity(&self, state: &GameState) -> Result<(), String> {
        territory_of(state, &self.source)?;
        territory_of(state, &self.target)?;
        if self.armies == 0 {
            return Err("An airlift must move at least one army".to_string());
        }
        check_card_in_hand(state, &self.issuer, CardKind::Airlift)
    }

    fn validate(&self, state: &GameState) -> Result<(), String> {
        let source = territory_of(state, &self.source)?;
        let target = territory_of(state, &self.target)?;
        ensure_owned(state, &self.issuer, source)?;
        ensure_owned(state, &self.issuer, target)?;
        let available = state
            .board
            .get_territory(source)
            .map_or(0, |t| t.army_count());
        if self.armies > available {
            return Err(format!(
                "{} only holds {} armies, {} requested",
                self.source, available, self.armies
            ));
        }
        Ok(())
    }

    fn execute(&mut self, state: &mut GameState) {
        let (source, target) = match self.validate(state).and_then(|_| {
            Ok((
                territory_of(state, &self.source)?,
                territory_of(state, &self.target)?,
            ))
        }) {
            Ok(resolved) => resolved,
            Err(reason) => {
                self.log = format!(
                    "Airlift order of player {} is invalid: {}",
                    self.issuer, reason
                );
                return;
            }
        };

        if let Some(territory) = state.board.get_territory_mut(source) {
            territory.remove_armies(self.armies);
        }
        if let Some(territory) = state.board.get_territory_mut(target) {
            territory.add_armies(self.armies);
        }
        spend_card(state, &self.issuer, CardKind::Airlift);
        self.log = format!(
            "Player {} airlifted {} armies from {} to {}",
            self.issuer, self.armies, self.source, self.target
        );
    }

    fn describe(&self) -> String {
        format!(
            "Airlift order issued by player {}: {} armies from {} to {}",
            self.issuer, self.armies, self.source, self.target
        )
    }

    fn execution_log(&self) -> &str {
        &self.log
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Negotiate {
    pub issuer: String,
    pub player: String,
    pub log: String,
}

impl Negotiate {
    pub fn new(issuer: &str, player: &str) -> Self {
        Self {
            issuer: issuer.to_string(),
            player: player.to_string(),
            log: String::new(),
        }
    }
}

impl OrderAction for Negotiate {
    fn issuer(&self) -> &str {
        &self.issuer
    }

    fn check_order_validity(&self, state: &GameState) -> Result<(), String> {
        self.validate(state)?;
        check_card_in_hand(state, &self.issuer, CardKind::Negotiate)
    }

    fn validate(&self, state: &GameState) -> Result<(), String> {
        match state.player(&self.player) {
            Some(_) => Ok(()),
            None => Err(format!("Player {} does not exist", self.player)),
        }
    }

    fn execute(&mut self, state: &mut GameState) {
        if let Err(reason) = self.validate(state) {
            self.log = format!(
                "Negotiate order of player {} is invalid: {}",
                self.issuer, reason
            );
            return;
        }

        if let Some(target) = state.player_mut(&self.player) {
            target.add_negotiation(&self.issuer);
        }
        if let Some(issuer) = state.player_mut(&self.issuer) {
            issuer.add_negotiation(&self.player);
        }
        spend_card(state, &self.issuer, CardKind::Negotiate);
        self.log = format!(
            "Player {} and player {} agreed not to attack each other this turn",
            self.issuer, self.player
        );
    }

    fn describe(&self) -> String {
        format!(
            "Negotiate order issued by player {} with player {}",
            self.issuer, self.player
        )
    }

    fn execution_log(&self) -> &str {
        &self.log
    }
}
