// order.rs
use crate::advance::Advance;
use crate::card::{Airlift, Blockade, Bomb, CardKind, Negotiate};
use crate::command::{
    ADVANCE_FORMAT, AIRLIFT_FORMAT, BLOCKADE_FORMAT, BOMB_FORMAT, DEPLOY_FORMAT, NEGOTIATE_FORMAT,
};
use crate::deploy::Deploy;
use crate::error::{GameError, Result};
use crate::game::GameState;
use crate::player::Player;
use crate::territory::TerritoryId;
use serde::{Deserialize, Serialize};

pub const ORDER_COMMANDS: [&str; 6] = ["deploy", "advance", "bomb", "blockade", "airlift", "negotiate"];

/// Shared contract of every order kind.
pub trait OrderAction {
    fn issuer(&self) -> &str;

    /// Cheap structural check run when the order is issued: named entities
    /// exist, quantities make sense, cards are in hand.
    fn check_order_validity(&self, state: &GameState) -> std::result::Result<(), String>;

    /// Business rules checked at execution time. `Err` carries the reason.
    fn validate(&self, state: &GameState) -> std::result::Result<(), String>;

    fn is_valid(&self, state: &GameState) -> bool {
        self.validate(state).is_ok()
    }

    /// Applies the order, or leaves the state untouched when it is invalid.
    /// Either way `execution_log` describes what happened.
    fn execute(&mut self, state: &mut GameState);

    fn describe(&self) -> String;

    fn execution_log(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Order {
    Deploy(Deploy),
    Advance(Advance),
    Bomb(Bomb),
    Blockade(Blockade),
    Airlift(Airlift),
    Negotiate(Negotiate),
}

macro_rules! each_order {
    ($order:expr, $inner:ident => $body:expr) => {
        match $order {
            Order::Deploy($inner) => $body,
            Order::Advance($inner) => $body,
            Order::Bomb($inner) => $body,
            Order::Blockade($inner) => $body,
            Order::Airlift($inner) => $body,
            Order::Negotiate($inner) => $body,
        }
    };
}

impl OrderAction for Order {
    fn issuer(&self) -> &str {
        each_order!(self, order => order.issuer())
    }

    fn check_order_validity(&self, state: &GameState) -> std::result::Result<(), String> {
        each_order!(self, order => order.check_order_validity(state))
    }

    fn validate(&self, state: &GameState) -> std::result::Result<(), String> {
        each_order!(self, order => order.validate(state))
    }

    fn execute(&mut self, state: &mut GameState) {
        each_order!(self, order => order.execute(state))
    }

    fn describe(&self) -> String {
        each_order!(self, order => order.describe())
    }

    fn execution_log(&self) -> &str {
        each_order!(self, order => order.execution_log())
    }
}

impl Order {
    pub fn is_order_command(root: &str) -> bool {
        ORDER_COMMANDS.contains(&root.to_ascii_lowercase().as_str())
    }

    /// Parses one order string for `issuer`. Only syntax is checked here;
    /// see `check_order_validity` for the structural checks.
    pub fn parse(issuer: &str, command: &str) -> Result<Order> {
        let tokens: Vec<&str> = command.split_whitespace().collect();
        let root = tokens
            .first()
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_default();

        let order = match root.as_str() {
            "deploy" => {
                expect_arity(&tokens, 3, DEPLOY_FORMAT)?;
                Order::Deploy(Deploy::new(
                    issuer,
                    tokens[1],
                    parse_armies(tokens[2], DEPLOY_FORMAT)?,
                ))
            }
            "advance" => {
                expect_arity(&tokens, 4, ADVANCE_FORMAT)?;
                Order::Advance(Advance::new(
                    issuer,
                    tokens[1],
                    tokens[2],
                    parse_armies(tokens[3], ADVANCE_FORMAT)?,
                ))
            }
            "bomb" => {
                expect_arity(&tokens, 2, BOMB_FORMAT)?;
                Order::Bomb(Bomb::new(issuer, tokens[1]))
            }
            "blockade" => {
                expect_arity(&tokens, 2, BLOCKADE_FORMAT)?;
                Order::Blockade(Blockade::new(issuer, tokens[1]))
            }
            "airlift" => {
                expect_arity(&tokens, 4, AIRLIFT_FORMAT)?;
                Order::Airlift(Airlift::new(
                    issuer,
                    tokens[1],
                    tokens[2],
                    parse_armies(tokens[3], AIRLIFT_FORMAT)?,
                ))
            }
            "negotiate" => {
                expect_arity(&tokens, 2, NEGOTIATE_FORMAT)?;
                Order::Negotiate(Negotiate::new(issuer, tokens[1]))
            }
            _ => return Err(GameError::command(format!("Unknown order: {}", command.trim()))),
        };
        Ok(order)
    }

    pub fn card_kind(&self) -> Option<CardKind> {
        match self {
            Order::Bomb(_) => Some(CardKind::Bomb),
            Order::Blockade(_) => Some(CardKind::Blockade),
            Order::Airlift(_) => Some(CardKind::Airlift),
            Order::Negotiate(_) => Some(CardKind::Negotiate),
            Order::Deploy(_) | Order::Advance(_) => None,
        }
    }

    /// Bookkeeping done when the order joins the issuer's queue.
    pub fn reserve(&self, player: &mut Player) {
        if let Order::Deploy(deploy) = self {
            player.reinforcements = player.reinforcements.saturating_sub(deploy.armies);
        }
    }
}

fn expect_arity(tokens: &[&str], arity: usize, format: &str) -> Result<()> {
    if tokens.len() != arity {
        return Err(GameError::command(format));
    }
    Ok(())
}

fn parse_armies(token: &str, format: &str) -> Result<u32> {
    token
        .parse::<u32>()
        .map_err(|_| GameError::command(format))
}

/// Resolves a territory name for order checks.
pub(crate) fn territory_of(state: &GameState, name: &str) -> std::result::Result<TerritoryId, String> {
    state
        .board
        .territory_id(name)
        .ok_or_else(|| format!("Territory {} does not exist on the map", name))
}

pub(crate) fn issuer_index(state: &GameState, issuer: &str) -> std::result::Result<usize, String> {
    state
        .player_index(issuer)
        .ok_or_else(|| format!("Player {} is not part of the game", issuer))
}

pub(crate) fn ensure_owned(
    state: &GameState,
    issuer: &str,
    territory: TerritoryId,
) -> std::result::Result<(), String> {
    let index = issuer_index(state, issuer)?;
    if state.players[index].owns(territory) {
        Ok(())
    } else {
        Err(format!(
            "Territory {} is not owned by player {}",
            state.board.territory_name(territory),
            issuer
        ))
    }
}
