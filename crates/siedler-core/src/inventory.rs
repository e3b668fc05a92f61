//! Resource accounting shared by the bank and every player.
//!
//! This module contains:
//! - The `Resource` kinds produced by lands and consumed by building costs
//! - `Inventory`, a per-resource counter with atomic batch operations
//!
//! Every multi-resource decrease is validated in full before a single count is
//! touched, so a rejected batch never leaves a ledger half-applied.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Tradeable commodity produced by lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// Produced by fields
    Grain,
    /// Produced by pastures
    Wool,
    /// Produced by forests
    Lumber,
    /// Produced by mountains
    Ore,
    /// Produced by hills
    Brick,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Grain,
        Resource::Wool,
        Resource::Lumber,
        Resource::Ore,
        Resource::Brick,
    ];
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Grain => "Grain",
            Resource::Wool => "Wool",
            Resource::Lumber => "Lumber",
            Resource::Ore => "Ore",
            Resource::Brick => "Brick",
        };
        f.write_str(name)
    }
}

/// Rejected ledger operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum InventoryError {
    #[error("not enough {resource}: requested {requested}, available {available}")]
    Insufficient {
        resource: Resource,
        requested: u32,
        available: u32,
    },
}

/// A count for every resource kind. No kind is ever absent; an untouched kind
/// simply reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub grain: u32,
    pub wool: u32,
    pub lumber: u32,
    pub ore: u32,
    pub brick: u32,
}

impl Inventory {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an inventory holding `amount` of every resource
    pub fn filled(amount: u32) -> Self {
        Self::with_amounts(amount, amount, amount, amount, amount)
    }

    /// Create an inventory with specific amounts
    pub fn with_amounts(grain: u32, wool: u32, lumber: u32, ore: u32, brick: u32) -> Self {
        Self {
            grain,
            wool,
            lumber,
            ore,
            brick,
        }
    }

    /// Create an inventory holding a single resource kind
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut inventory = Self::new();
        inventory.increase(resource, amount);
        inventory
    }

    /// Count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Grain => self.grain,
            Resource::Wool => self.wool,
            Resource::Lumber => self.lumber,
            Resource::Ore => self.ore,
            Resource::Brick => self.brick,
        }
    }

    fn slot_mut(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Grain => &mut self.grain,
            Resource::Wool => &mut self.wool,
            Resource::Lumber => &mut self.lumber,
            Resource::Ore => &mut self.ore,
            Resource::Brick => &mut self.brick,
        }
    }

    /// Total number of resource units
    pub fn total(&self) -> u32 {
        Resource::ALL.iter().map(|r| self.get(*r)).sum()
    }

    /// Check if the inventory holds nothing
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Iterate over `(resource, count)` pairs in `Resource::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL.iter().map(move |r| (*r, self.get(*r)))
    }

    /// Resource kinds with a non-zero count
    pub fn available_kinds(&self) -> Vec<Resource> {
        self.iter().filter(|(_, n)| *n > 0).map(|(r, _)| r).collect()
    }

    /// Non-zero counts as a map
    pub fn to_map(&self) -> BTreeMap<Resource, u32> {
        self.iter().filter(|(_, n)| *n > 0).collect()
    }

    /// Add units of one resource. Adding zero is a no-op.
    pub fn increase(&mut self, resource: Resource, amount: u32) {
        *self.slot_mut(resource) += amount;
    }

    /// Add every count of `other` to this inventory
    pub fn increase_all(&mut self, other: &Inventory) {
        for (resource, amount) in other.iter() {
            self.increase(resource, amount);
        }
    }

    /// Check if every count of `bundle` is covered
    pub fn contains(&self, bundle: &Inventory) -> bool {
        self.iter().all(|(r, n)| n >= bundle.get(r))
    }

    /// Check the bundle against this inventory, reporting the first shortfall
    fn check(&self, bundle: &Inventory) -> Result<(), InventoryError> {
        for (resource, requested) in bundle.iter() {
            let available = self.get(resource);
            if requested > available {
                return Err(InventoryError::Insufficient {
                    resource,
                    requested,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Remove units of one resource, failing without change if not enough
    pub fn decrease(&mut self, resource: Resource, amount: u32) -> Result<(), InventoryError> {
        self.decrease_all(&Inventory::single(resource, amount))
    }

    /// Remove a whole bundle. Nothing changes unless every count is covered.
    pub fn decrease_all(&mut self, bundle: &Inventory) -> Result<(), InventoryError> {
        self.check(bundle)?;
        for (resource, amount) in bundle.iter() {
            *self.slot_mut(resource) -= amount;
        }
        Ok(())
    }

    /// Move a bundle from this inventory into `to`, all or nothing
    pub fn transfer_to(&mut self, to: &mut Inventory, bundle: &Inventory) -> Result<(), InventoryError> {
        self.decrease_all(bundle)?;
        to.increase_all(bundle);
        Ok(())
    }

    /// Remove one unit picked uniformly among all held units
    pub fn take_random_unit<R: Rng>(&mut self, rng: &mut R) -> Option<Resource> {
        let units: Vec<Resource> = self
            .iter()
            .flat_map(|(r, n)| std::iter::repeat(r).take(n as usize))
            .collect();
        let resource = *units.choose(rng)?;
        *self.slot_mut(resource) -= 1;
        Some(resource)
    }

    /// Remove `count` units one at a time, each drawn uniformly from the kinds
    /// still held. Stops early only if the inventory runs dry.
    pub fn take_random_by_kind<R: Rng>(&mut self, count: u32, rng: &mut R) -> Inventory {
        let mut removed = Inventory::new();
        for _ in 0..count {
            let Some(resource) = self.available_kinds().choose(rng).copied() else {
                break;
            };
            *self.slot_mut(resource) -= 1;
            removed.increase(resource, 1);
        }
        removed
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(r, n)| format!("{r}: {n}")).collect();
        write!(f, "{}", parts.join(", "))
    }
}
