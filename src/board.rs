// board.rs
use crate::continent::{Continent, ContinentId};
use crate::error::{GameError, Result};
use crate::territory::{Territory, TerritoryId};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// The territory graph. Territories and continents are keyed by id; names are
/// unique ignoring ASCII case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Board {
    pub name: String,
    pub territories: BTreeMap<TerritoryId, Territory>,
    pub continents: BTreeMap<ContinentId, Continent>,
}

impl Board {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            territories: BTreeMap::new(),
            continents: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.territories.is_empty() && self.continents.is_empty()
    }

    pub fn get_territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(&id)
    }

    pub fn get_territory_mut(&mut self, id: TerritoryId) -> Option<&mut Territory> {
        self.territories.get_mut(&id)
    }

    pub fn find_territory(&self, name: &str) -> Option<&Territory> {
        self.territories.values().find(|t| t.has_name(name))
    }

    pub fn territory_id(&self, name: &str) -> Option<TerritoryId> {
        self.find_territory(name).map(|t| t.id)
    }

    pub fn territory_name(&self, id: TerritoryId) -> &str {
        self.territories
            .get(&id)
            .map(|t| t.name.as_str())
            .unwrap_or("<unknown>")
    }

    pub fn get_continent(&self, id: ContinentId) -> Option<&Continent> {
        self.continents.get(&id)
    }

    pub fn find_continent(&self, name: &str) -> Option<&Continent> {
        self.continents.values().find(|c| c.has_name(name))
    }

    pub fn are_adjacent(&self, from: TerritoryId, to: TerritoryId) -> bool {
        self.territories
            .get(&from)
            .map_or(false, |t| t.is_adjacent(to))
    }

    pub fn add_continent(&mut self, name: &str, bonus_armies: u32) -> Result<ContinentId> {
        if self.find_continent(name).is_some() {
            return Err(GameError::map(format!(
                "Continent {} cannot be added! It already exists!",
                name
            )));
        }
        if bonus_armies == 0 {
            return Err(GameError::map(format!(
                "Continent {} must have a positive control value",
                name
            )));
        }
        let id = self.continents.keys().max().map_or(1, |max| max + 1);
        self.continents
            .insert(id, Continent::new(id, name, bonus_armies));
        Ok(id)
    }

    /// Removes the continent together with every territory it holds.
    pub fn remove_continent(&mut self, name: &str) -> Result<()> {
        let continent = self
            .find_continent(name)
            .cloned()
            .ok_or_else(|| GameError::map(format!("No such continent exists: {}", name)))?;

        for territory in &continent.territories {
            self.purge_territory(*territory);
        }
        self.continents.remove(&continent.id);
        Ok(())
    }

    pub fn add_territory(&mut self, name: &str, continent_name: &str) -> Result<TerritoryId> {
        if self.find_territory(name).is_some() {
            return Err(GameError::map(format!(
                "Territory with name {} already exists!",
                name
            )));
        }
        let continent_id = self.find_continent(continent_name).map(|c| c.id).ok_or_else(|| {
            GameError::map(format!(
                "Cannot add territory {} to continent {} that doesn't exist!",
                name, continent_name
            ))
        })?;

        let id = self.territories.keys().max().map_or(1, |max| max + 1);
        self.territories
            .insert(id, Territory::new(id, name, continent_id));
        if let Some(continent) = self.continents.get_mut(&continent_id) {
            continent.add_territory(id);
        }
        Ok(id)
    }

    pub fn remove_territory(&mut self, name: &str) -> Result<()> {
        let id = self
            .territory_id(name)
            .ok_or_else(|| GameError::map(format!("Territory {} does not exist!", name)))?;
        self.purge_territory(id);
        Ok(())
    }

    // Strips the territory from its continent and from every adjacency set.
    fn purge_territory(&mut self, id: TerritoryId) {
        if let Some(territory) = self.territories.remove(&id) {
            if let Some(continent) = self.continents.get_mut(&territory.continent) {
                continent.remove_territory(id);
            }
        }
        for territory in self.territories.values_mut() {
            territory.remove_adjacent(id);
        }
    }

    fn neighbour_pair(&self, from: &str, to: &str) -> Result<(TerritoryId, TerritoryId)> {
        match (self.territory_id(from), self.territory_id(to)) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(GameError::map(format!(
                "Invalid neighbour pair {} {}! Either of the territories doesn't exist!",
                from, to
            ))),
        }
    }

    /// Adds the edge `from -> to` only.
    pub fn add_adjacency(&mut self, from: &str, to: &str) -> Result<()> {
        let (a, b) = self.neighbour_pair(from, to)?;
        if let Some(territory) = self.territories.get_mut(&a) {
            territory.add_adjacent(b);
        }
        Ok(())
    }

    pub fn remove_adjacency(&mut self, from: &str, to: &str) -> Result<()> {
        let (a, b) = self.neighbour_pair(from, to)?;
        let removed = self
            .territories
            .get_mut(&a)
            .map_or(false, |t| t.remove_adjacent(b));
        if !removed {
            return Err(GameError::map(format!(
                "{} is not a neighbour of {}",
                to, from
            )));
        }
        Ok(())
    }

    /// Checks, in order and stopping at the first failure: something exists,
    /// every territory has a neighbour, every continent is connected through
    /// its own edges, and the whole graph is connected.
    pub fn validate(&self) -> Result<()> {
        self.check_for_empty_elements()?;
        self.check_continent_connectivity()?;
        self.check_map_connectivity()
    }

    fn check_for_empty_elements(&self) -> Result<()> {
        if self.continents.is_empty() {
            return Err(GameError::map("Map must possess at least one continent!"));
        }
        if self.territories.is_empty() {
            return Err(GameError::map("Map must possess at least one territory!"));
        }
        if let Some(lonely) = self
            .territories
            .values()
            .find(|t| t.adjacent_territories.is_empty())
        {
            return Err(GameError::map(format!(
                "{} does not possess any neighbour, hence isn't reachable!",
                lonely.name
            )));
        }
        Ok(())
    }

    fn check_continent_connectivity(&self) -> Result<()> {
        for continent in self.continents.values() {
            let start = match continent.territories.iter().next() {
                Some(start) => *start,
                None => {
                    return Err(GameError::map(format!(
                        "{} has no territories, it must possess at least 1 territory",
                        continent.name
                    )))
                }
            };

            let reached = self.reachable_from(start, |t| t.continent == continent.id);
            if let Some(missing) = continent.territories.iter().find(|t| !reached.contains(*t)) {
                return Err(GameError::map(format!(
                    "{} in continent {} is not reachable",
                    self.territory_name(*missing),
                    continent.name
                )));
            }
        }
        Ok(())
    }

    fn check_map_connectivity(&self) -> Result<()> {
        let start = match self.territories.keys().next() {
            Some(start) => *start,
            None => return Ok(()),
        };
        let reached = self.reachable_from(start, |_| true);
        if let Some(missing) = self.territories.values().find(|t| !reached.contains(&t.id)) {
            return Err(GameError::map(format!(
                "{} territory is not reachable",
                missing.name
            )));
        }
        Ok(())
    }

    /// Iterative depth-first search following outgoing edges into territories
    /// accepted by `allowed`.
    pub fn reachable_from<F>(&self, start: TerritoryId, allowed: F) -> HashSet<TerritoryId>
    where
        F: Fn(&Territory) -> bool,
    {
        let mut visited = HashSet::new();
        let mut stack = vec![start];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(territory) = self.territories.get(&current) {
                for adjacent in &territory.adjacent_territories {
                    if visited.contains(adjacent) {
                        continue;
                    }
                    if let Some(next) = self.territories.get(adjacent) {
                        if allowed(next) {
                            stack.push(*adjacent);
                        }
                    }
                }
            }
        }

        visited
    }

    /// One line per continent, then one per territory with its neighbours.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for continent in self.continents.values() {
            lines.push(format!(
                "Continent {} (bonus {}): {}",
                continent.name,
                continent.bonus_armies,
                continent
                    .territories
                    .iter()
                    .map(|t| self.territory_name(*t))
                    .join(", ")
            ));
        }
        for territory in self.territories.values() {
            lines.push(format!(
                "{} [{}] -> {}",
                territory.name,
                territory
                    .armies
                    .map_or("-".to_string(), |a| a.to_string()),
                territory
                    .adjacent_territories
                    .iter()
                    .map(|t| self.territory_name(*t))
                    .join(", ")
            ));
        }
        lines
    }
}
