// advance.rs
use crate::game::GameState;
use crate::order::{ensure_owned, issuer_index, territory_of, OrderAction};
use crate::territory::TerritoryId;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

pub const ATTACKER_STRENGTH: f64 = 0.6;
pub const DEFENDER_STRENGTH: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleOutcome {
    pub attackers_left: u32,
    pub defenders_left: u32,
}

/// Resolves one battle. Armies beyond the smaller side survive untouched;
/// each of the `min(attacking, defending)` engaged pairs rolls one unit per
/// side (1..=9 scaled by the side's strength, rounded) and the attacker's
/// unit only wins on a strictly higher value.
pub fn resolve_battle<R: Rng + ?Sized>(attacking: u32, defending: u32, rng: &mut R) -> BattleOutcome {
    let engaged = attacking.min(defending);
    let mut attackers_left = attacking.saturating_sub(defending);
    let mut defenders_left = defending.saturating_sub(attacking);

    for _ in 0..engaged {
        let attack = combat_unit(ATTACKER_STRENGTH, rng);
        let defence = combat_unit(DEFENDER_STRENGTH, rng);
        if attack > defence {
            attackers_left += 1;
        } else {
            defenders_left += 1;
        }
    }

    BattleOutcome {
        attackers_left,
        defenders_left,
    }
}

fn combat_unit<R: Rng + ?Sized>(strength: f64, rng: &mut R) -> u32 {
    (rng.gen_range(1..=9) as f64 * strength).round() as u32
}

/// Moves armies to an adjacent territory, attacking it when it belongs to
/// someone else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Advance {
    pub issuer: String,
    pub source: String,
    pub target: String,
    pub armies: u32,
    pub log: String,
}

impl Advance {
    pub fn new(issuer: &str, source: &str, target: &str, armies: u32) -> Self {
        Self {
            issuer: issuer.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            armies,
            log: String::new(),
        }
    }

    fn endpoints(&self, state: &GameState) -> Result<(TerritoryId, TerritoryId), String> {
        Ok((
            territory_of(state, &self.source)?,
            territory_of(state, &self.target)?,
        ))
    }

    fn conquer(
        &mut self,
        state: &mut GameState,
        issuer: usize,
        target: TerritoryId,
        armies: u32,
    ) {
        if let Some(territory) = state.board.get_territory_mut(target) {
            territory.set_armies(armies);
        }
        state.transfer_territory(target, issuer);
        let card = state.players[issuer].grant_random_card();
        self.log = match card {
            Some(card) => format!(
                "Player {} conquered {} with {} armies and received a {} card",
                self.issuer, self.target, armies, card
            ),
            None => format!(
                "Player {} conquered {} with {} armies",
                self.issuer, self.target, armies
            ),
        };
    }
}

impl OrderAction for Advance {
    fn issuer(&self) -> &str {
        &self.issuer
    }

    fn check_order_validity(&self, state: &GameState) -> Result<(), String> {
        let (source, target) = self.endpoints(state)?;
        if self.armies == 0 {
            return Err("An advance order must move at least one army".to_string());
        }
        if !state.board.are_adjacent(source, target) {
            return Err(format!("{} is not adjacent to {}", self.target, self.source));
        }
        Ok(())
    }

    fn validate(&self, state: &GameState) -> Result<(), String> {
        let (source, _) = self.endpoints(state)?;
        ensure_owned(state, &self.issuer, source)?;
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
        if self.armies == available {
            return Err(format!(
                "At least one army must stay behind on {}",
                self.source
            ));
        }
        Ok(())
    }

    fn execute(&mut self, state: &mut GameState) {
        let (source, target, issuer) = match self
            .validate(state)
            .and_then(|_| self.endpoints(state))
            .and_then(|(s, t)| Ok((s, t, issuer_index(state, &self.issuer)?)))
        {
            Ok(resolved) => resolved,
            Err(reason) => {
                self.log = format!(
                    "Advance order of player {} is invalid: {}",
                    self.issuer, reason
                );
                return;
            }
        };

        let defender = state.owner_index(target);
        if defender == Some(issuer) {
            if let Some(territory) = state.board.get_territory_mut(source) {
                territory.remove_armies(self.armies);
            }
            if let Some(territory) = state.board.get_territory_mut(target) {
                territory.add_armies(self.armies);
            }
            self.log = format!(
                "Player {} moved {} armies from {} to {}",
                self.issuer, self.armies, self.source, self.target
            );
            return;
        }

        if let Some(defender) = defender {
            if state.players[defender].has_negotiated_with(&self.issuer) {
                self.log = format!(
                    "Advance order cannot be executed as player {} negotiated terms with player {}",
                    state.players[defender].name, self.issuer
                );
                return;
            }
        }

        if let Some(territory) = state.board.get_territory_mut(source) {
            territory.remove_armies(self.armies);
        }

        let defending = state.board.get_territory(target).and_then(|t| t.armies);
        match (defender, defending) {
            (Some(defender), Some(defending)) => {
                let outcome = resolve_battle(self.armies, defending, &mut thread_rng());
                if outcome.defenders_left == 0 {
                    self.conquer(state, issuer, target, outcome.attackers_left);
                } else {
                    if let Some(territory) = state.board.get_territory_mut(target) {
                        territory.set_armies(outcome.defenders_left);
                    }
                    if let Some(territory) = state.board.get_territory_mut(source) {
                        territory.add_armies(outcome.attackers_left);
                    }
                    self.log = format!(
                        "Player {} attacked {} with {} armies: {} defenders held, {} attackers returned to {}",
                        self.issuer,
                        self.target,
                        self.armies,
                        outcome.defenders_left,
                        outcome.attackers_left,
                        self.source
                    );
                }
                state.recompute_continents(defender);
            }
            (defender, _) => {
                self.conquer(state, issuer, target, self.armies);
                if let Some(defender) = defender {
                    state.recompute_continents(defender);
                }
            }
        }
        state.recompute_continents(issuer);
    }

    fn describe(&self) -> String {
        format!(
            "Advance order issued by player {}: {} armies from {} to {}",
            self.issuer, self.armies, self.source, self.target
        )
    }

    fn execution_log(&self) -> &str {
        &self.log
    }
}
