// deploy.rs
use crate::game::GameState;
use crate::order::{ensure_owned, issuer_index, territory_of, OrderAction};
use serde::{Deserialize, Serialize};

/// Places armies from the issuer's reinforcement pool on one of its territories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Deploy {
    pub issuer: String,
    pub territory: String,
    pub armies: u32,
    pub log: String,
}

impl Deploy {
    pub fn new(issuer: &str, territory: &str, armies: u32) -> Self {
        Self {
            issuer: issuer.to_string(),
            territory: territory.to_string(),
            armies,
            log: String::new(),
        }
    }
}

impl OrderAction for Deploy {
    fn issuer(&self) -> &str {
        &self.issuer
    }

    fn check_order_validity(&self, state: &GameState) -> Result<(), String> {
        territory_of(state, &self.territory)?;
        if self.armies == 0 {
            return Err("A deploy order must place at least one army".to_string());
        }
        let index = issuer_index(state, &self.issuer)?;
        if self.armies > state.players[index].reinforcements {
            return Err(
                "The deploy order exceeds the player's available unallocated armies and cannot be executed"
                    .to_string(),
            );
        }
        Ok(())
    }

    fn validate(&self, state: &GameState) -> Result<(), String> {
        let territory = territory_of(state, &self.territory)?;
        ensure_owned(state, &self.issuer, territory)
    }

    fn execute(&mut self, state: &mut GameState) {
        let territory = match self.validate(state).and_then(|_| territory_of(state, &self.territory)) {
            Ok(territory) => territory,
            Err(reason) => {
                // Armies taken at issue time go back to the pool.
                if let Some(player) = state.player_mut(&self.issuer) {
                    player.reinforcements += self.armies;
                }
                self.log = format!(
                    "Deploy order of player {} is invalid: {}. {} armies returned to the reinforcement pool",
                    self.issuer, reason, self.armies
                );
                return;
            }
        };

        let armies = match state.board.get_territory_mut(territory) {
            Some(target) => {
                target.add_armies(self.armies);
                target.army_count()
            }
            None => 0,
        };
        self.log = format!(
            "Player {} deployed {} armies to {}, which now holds {}",
            self.issuer, self.armies, self.territory, armies
        );
    }

    fn describe(&self) -> String {
        format!(
            "Deploy order issued by player {}: {} armies to {}",
            self.issuer, self.armies, self.territory
        )
    }

    fn execution_log(&self) -> &str {
        &self.log
    }
}
