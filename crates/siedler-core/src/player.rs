//! Player state: faction, resources and owned structures.

use crate::inventory::{Inventory, Resource};
use crate::lattice::Point;
use crate::structure::{Site, Structure, StructureKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A player's colour for the whole game, handed out in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Faction {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Faction {
    pub const ALL: [Faction; 4] = [Faction::Red, Faction::Blue, Faction::Green, Faction::Yellow];

    /// One-letter tag used in structure labels
    pub const fn tag(&self) -> char {
        match self {
            Faction::Red => 'r',
            Faction::Blue => 'b',
            Faction::Green => 'g',
            Faction::Yellow => 'y',
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Faction::Red => "Red",
            Faction::Blue => "Blue",
            Faction::Green => "Green",
            Faction::Yellow => "Yellow",
        };
        f.write_str(name)
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    faction: Faction,
    inventory: Inventory,
    structures: Vec<Structure>,
}

impl Player {
    /// Create a player with an empty hand and nothing built
    pub fn new(faction: Faction) -> Self {
        Self {
            faction,
            inventory: Inventory::new(),
            structures: Vec::new(),
        }
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Structures currently owned, in build order
    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    /// Total resource units in hand
    pub fn total_resources(&self) -> u32 {
        self.inventory.total()
    }

    /// Sum of the scores of every owned structure
    pub fn score(&self) -> u32 {
        self.structures.iter().map(Structure::score).sum()
    }

    /// Number of owned structures of a kind
    pub fn count_of(&self, kind: StructureKind) -> usize {
        self.structures.iter().filter(|s| s.kind == kind).count()
    }

    /// Whether another structure of `kind` may still be built
    pub fn has_stock_left(&self, kind: StructureKind) -> bool {
        self.count_of(kind) < kind.stock_cap()
    }

    pub(crate) fn add_structure(&mut self, structure: Structure) {
        self.structures.push(structure);
    }

    /// Remove the settlement standing on `corner`, if this player owns one
    pub(crate) fn remove_settlement_at(&mut self, corner: Point) -> Option<Structure> {
        let index = self
            .structures
            .iter()
            .position(|s| s.kind == StructureKind::Settlement && s.site == Site::Corner(corner))?;
        Some(self.structures.remove(index))
    }

    /// Discard half the hand (rounded down) when it holds more than `limit`
    /// units. Each unit is drawn uniformly from the kinds still held.
    pub(crate) fn discard_half<R: Rng>(&mut self, limit: u32, rng: &mut R) -> Inventory {
        let total = self.inventory.total();
        if total <= limit {
            return Inventory::new();
        }
        self.inventory.take_random_by_kind(total / 2, rng)
    }

    /// Take one random unit from `victim` into this player's hand
    pub(crate) fn steal_from<R: Rng>(&mut self, victim: &mut Player, rng: &mut R) -> Option<Resource> {
        let resource = victim.inventory.take_random_unit(rng)?;
        self.inventory.increase(resource, 1);
        Some(resource)
    }
}
