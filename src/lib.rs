// lib.rs
pub mod advance;
pub mod board;
pub mod card;
pub mod command;
pub mod continent;
pub mod deploy;
pub mod engine;
pub mod error;
pub mod game;
pub mod game_config;
pub mod log;
pub mod order;
pub mod player;
pub mod startup;
pub mod strategy;
pub mod territory;
pub mod tournament;
pub mod turn_phase;
