//! Buildable structures and their fixed catalog constants.

use crate::inventory::Inventory;
use crate::lattice::{Edge, Point};
use crate::player::Faction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of structure a player can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// 1 VP, 1 resource per adjacent production
    Settlement,
    /// 2 VP, 2 resources per adjacent production
    City,
    /// Connects corners, no VP
    Road,
}

impl StructureKind {
    pub const ALL: [StructureKind; 3] = [
        StructureKind::Settlement,
        StructureKind::City,
        StructureKind::Road,
    ];

    /// Victory points granted while standing on the board
    pub const fn score(&self) -> u32 {
        match self {
            StructureKind::Settlement => 1,
            StructureKind::City => 2,
            StructureKind::Road => 0,
        }
    }

    /// Units paid per production event on an adjacent field
    pub const fn resource_multiplier(&self) -> u32 {
        match self {
            StructureKind::Settlement => 1,
            StructureKind::City => 2,
            StructureKind::Road => 0,
        }
    }

    /// How many of this kind a single player may own
    pub const fn stock_cap(&self) -> usize {
        match self {
            StructureKind::Settlement => 5,
            StructureKind::City => 4,
            StructureKind::Road => 15,
        }
    }

    /// Short display tag
    pub const fn tag(&self) -> char {
        match self {
            StructureKind::Settlement => 'S',
            StructureKind::City => 'C',
            StructureKind::Road => 'R',
        }
    }

    /// Resources paid to the bank to build one
    pub fn cost(&self) -> Inventory {
        match self {
            // grain, wool, lumber, ore, brick
            StructureKind::Settlement => Inventory::with_amounts(1, 1, 1, 0, 1),
            StructureKind::City => Inventory::with_amounts(2, 0, 0, 3, 0),
            StructureKind::Road => Inventory::with_amounts(0, 0, 1, 0, 1),
        }
    }
}

/// Where a structure stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Site {
    Corner(Point),
    Edge(Edge),
}

/// A placed structure: its kind, owner and site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Structure {
    pub kind: StructureKind,
    pub owner: Faction,
    pub site: Site,
}

impl Structure {
    pub const fn settlement(owner: Faction, corner: Point) -> Self {
        Self {
            kind: StructureKind::Settlement,
            owner,
            site: Site::Corner(corner),
        }
    }

    pub const fn city(owner: Faction, corner: Point) -> Self {
        Self {
            kind: StructureKind::City,
            owner,
            site: Site::Corner(corner),
        }
    }

    pub const fn road(owner: Faction, edge: Edge) -> Self {
        Self {
            kind: StructureKind::Road,
            owner,
            site: Site::Edge(edge),
        }
    }

    pub const fn score(&self) -> u32 {
        self.kind.score()
    }

    pub const fn resource_multiplier(&self) -> u32 {
        self.kind.resource_multiplier()
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.owner.tag(), self.kind.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Resource;

    #[test]
    fn test_catalog_constants() {
        assert_eq!(StructureKind::Settlement.score(), 1);
        assert_eq!(StructureKind::City.score(), 2);
        assert_eq!(StructureKind::Road.score(), 0);

        assert_eq!(StructureKind::Settlement.resource_multiplier(), 1);
        assert_eq!(StructureKind::City.resource_multiplier(), 2);
        assert_eq!(StructureKind::Road.resource_multiplier(), 0);

        assert_eq!(StructureKind::Settlement.stock_cap(), 5);
        assert_eq!(StructureKind::City.stock_cap(), 4);
        assert_eq!(StructureKind::Road.stock_cap(), 15);
    }

    #[test]
    fn test_building_costs() {
        let settlement = StructureKind::Settlement.cost();
        assert_eq!(settlement.total(), 4);
        assert_eq!(settlement.get(Resource::Ore), 0);

        let city = StructureKind::City.cost();
        assert_eq!(city.get(Resource::Ore), 3);
        assert_eq!(city.get(Resource::Grain), 2);

        let road = StructureKind::Road.cost();
        assert_eq!(road.get(Resource::Brick), 1);
        assert_eq!(road.get(Resource::Lumber), 1);
        assert_eq!(road.total(), 2);
    }

    #[test]
    fn test_display_tag() {
        let city = Structure::city(Faction::Blue, Point::new(5, 9));
        assert_eq!(city.to_string(), "bC");
        let road = Structure::road(Faction::Red, Edge::new(Point::new(5, 9), Point::new(6, 10)));
        assert_eq!(road.to_string(), "rR");
    }
}
