// continent.rs
use crate::territory::TerritoryId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type ContinentId = u32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Continent {
    pub id: ContinentId,
    pub name: String,
    pub bonus_armies: u32,
    pub territories: BTreeSet<TerritoryId>,
}

impl Continent {
    pub fn new(id: ContinentId, name: &str, bonus_armies: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            bonus_armies,
            territories: BTreeSet::new(),
        }
    }

    pub fn add_territory(&mut self, territory: TerritoryId) {
        self.territories.insert(territory);
    }

    pub fn remove_territory(&mut self, territory: TerritoryId) {
        self.territories.remove(&territory);
    }

    pub fn get_bonus(&self) -> u32 {
        self.bonus_armies
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// True when every member territory is in `owned`.
    pub fn is_controlled_by(&self, owned: &[TerritoryId]) -> bool {
        !self.territories.is_empty() && self.territories.iter().all(|t| owned.contains(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_requires_every_member() {
        let mut continent = Continent::new(1, "Oceania", 2);
        continent.add_territory(10);
        continent.add_territory(11);
        assert!(!continent.is_controlled_by(&[10]));
        assert!(continent.is_controlled_by(&[11, 10, 3]));
    }

    #[test]
    fn empty_continent_is_never_controlled() {
        let continent = Continent::new(1, "Nowhere", 5);
        assert!(!continent.is_controlled_by(&[1, 2, 3]));
    }
}
