// territory.rs
use crate::continent::ContinentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type TerritoryId = u32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: String,
    pub continent: ContinentId,
    /// `None` until the first order touches the territory.
    pub armies: Option<u32>,
    /// Outgoing edges only; B in A's set does not put A in B's.
    pub adjacent_territories: BTreeSet<TerritoryId>,
}

impl Territory {
    pub fn new(id: TerritoryId, name: &str, continent: ContinentId) -> Self {
        Self {
            id,
            name: name.to_string(),
            continent,
            armies: None,
            adjacent_territories: BTreeSet::new(),
        }
    }

    pub fn add_adjacent(&mut self, adjacent: TerritoryId) {
        self.adjacent_territories.insert(adjacent);
    }

    pub fn remove_adjacent(&mut self, adjacent: TerritoryId) -> bool {
        self.adjacent_territories.remove(&adjacent)
    }

    pub fn is_adjacent(&self, territory: TerritoryId) -> bool {
        self.adjacent_territories.contains(&territory)
    }

    pub fn army_count(&self) -> u32 {
        self.armies.unwrap_or(0)
    }

    pub fn add_armies(&mut self, num_armies: u32) {
        self.armies = Some(self.army_count() + num_armies);
    }

    pub fn remove_armies(&mut self, num_armies: u32) {
        self.armies = Some(self.army_count().saturating_sub(num_armies));
    }

    pub fn set_armies(&mut self, armies: u32) {
        self.armies = Some(armies);
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}
