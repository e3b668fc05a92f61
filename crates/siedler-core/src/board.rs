//! Game board: the fixed field layout, the thief and corner/edge occupancy.
//!
//! This module contains:
//! - Land types and the resource each produces
//! - The standard 19-field island framed by water
//! - Building legality checks (distance rule, road connectivity)
//! - Unchecked placement, used by the game once a check has passed
//!
//! Predicates never fail loudly: a coordinate the lattice rejects simply makes
//! the answer `false` or empty.

use crate::config::{INITIAL_THIEF_POSITION, MAX_X_COORDINATE, MAX_Y_COORDINATE};
use crate::inventory::Resource;
use crate::lattice::{Edge, HexLattice, LatticeError, Point};
use crate::player::Faction;
use crate::structure::{Structure, StructureKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Terrain of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Land {
    Forest,
    Pasture,
    Fields,
    Mountain,
    Hills,
    /// Frames the island, never produces and never holds the thief
    Water,
    /// No production; the thief starts here
    Desert,
}

impl Land {
    /// The resource this land produces, if any
    pub const fn resource(&self) -> Option<Resource> {
        match self {
            Land::Forest => Some(Resource::Lumber),
            Land::Pasture => Some(Resource::Wool),
            Land::Fields => Some(Resource::Grain),
            Land::Mountain => Some(Resource::Ore),
            Land::Hills => Some(Resource::Brick),
            Land::Water | Land::Desert => None,
        }
    }
}

/// A single field on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Centre coordinate
    pub position: Point,
    pub land: Land,
    /// Dice total that triggers production (None for water and desert)
    pub dice_value: Option<u8>,
    /// Whether the thief currently stands here
    pub occupied_by_thief: bool,
}

impl Field {
    pub fn new(position: Point, land: Land, dice_value: Option<u8>) -> Self {
        Self {
            position,
            land,
            dice_value,
            occupied_by_thief: false,
        }
    }

    pub fn resource(&self) -> Option<Resource> {
        self.land.resource()
    }
}

/// Land fields of the standard island: centre, land, dice value.
pub const STANDARD_LAND: [((i32, i32), Land, Option<u8>); 19] = [
    ((5, 5), Land::Forest, Some(6)),
    ((7, 5), Land::Pasture, Some(3)),
    ((9, 5), Land::Pasture, Some(12)),
    ((4, 8), Land::Fields, Some(2)),
    ((6, 8), Land::Mountain, Some(4)),
    ((8, 8), Land::Fields, Some(5)),
    ((10, 8), Land::Forest, Some(10)),
    ((3, 11), Land::Forest, Some(5)),
    ((5, 11), Land::Hills, Some(9)),
    ((7, 11), Land::Desert, None),
    ((9, 11), Land::Mountain, Some(9)),
    ((11, 11), Land::Fields, Some(8)),
    ((4, 14), Land::Fields, Some(10)),
    ((6, 14), Land::Mountain, Some(11)),
    ((8, 14), Land::Forest, Some(6)),
    ((10, 14), Land::Pasture, Some(3)),
    ((5, 17), Land::Pasture, Some(8)),
    ((7, 17), Land::Hills, Some(4)),
    ((9, 17), Land::Hills, Some(11)),
];

/// Water ring around the island.
pub const STANDARD_WATER: [(i32, i32); 18] = [
    (4, 2),
    (6, 2),
    (8, 2),
    (10, 2),
    (3, 5),
    (11, 5),
    (2, 8),
    (12, 8),
    (1, 11),
    (13, 11),
    (2, 14),
    (12, 14),
    (3, 17),
    (11, 17),
    (4, 20),
    (6, 20),
    (8, 20),
    (10, 20),
];

/// The complete game board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    lattice: HexLattice,
    /// All fields indexed by centre
    fields: BTreeMap<Point, Field>,
    /// Settlements and cities on corners
    corners: BTreeMap<Point, Structure>,
    /// Roads on edges
    roads: BTreeMap<Edge, Structure>,
    thief_position: Point,
}

impl Board {
    /// Create a board from a field list. The thief starts on `thief_position`,
    /// which must be one of the fields.
    pub fn new(
        fields: impl IntoIterator<Item = Field>,
        thief_position: Point,
    ) -> Result<Self, LatticeError> {
        let mut lattice = HexLattice::new(MAX_X_COORDINATE, MAX_Y_COORDINATE);
        let mut by_position = BTreeMap::new();
        for field in fields {
            lattice.add_field(field.position)?;
            by_position.insert(field.position, field);
        }
        if !by_position.contains_key(&thief_position) {
            return Err(LatticeError::UnknownField(thief_position));
        }
        Ok(Self::assemble(lattice, by_position, thief_position))
    }

    /// The standard island
    pub fn standard() -> Self {
        let land = STANDARD_LAND
            .iter()
            .map(|&((x, y), land, dice)| Field::new(Point::new(x, y), land, dice));
        let water = STANDARD_WATER
            .iter()
            .map(|&(x, y)| Field::new(Point::new(x, y), Land::Water, None));

        let board = Self::new(land.chain(water), INITIAL_THIEF_POSITION);
        debug_assert!(board.is_ok(), "standard layout rejected: {board:?}");
        // both tables hold distinct, in-bounds field centres and the desert
        board.unwrap_or_else(|_| {
            let lattice = HexLattice::new(MAX_X_COORDINATE, MAX_Y_COORDINATE);
            Self::assemble(lattice, BTreeMap::new(), INITIAL_THIEF_POSITION)
        })
    }

    fn assemble(lattice: HexLattice, mut fields: BTreeMap<Point, Field>, thief_position: Point) -> Self {
        if let Some(field) = fields.get_mut(&thief_position) {
            field.occupied_by_thief = true;
        }
        Self {
            lattice,
            fields,
            corners: BTreeMap::new(),
            roads: BTreeMap::new(),
            thief_position,
        }
    }

    // ==================== Queries ====================

    pub fn lattice(&self) -> &HexLattice {
        &self.lattice
    }

    pub fn field(&self, position: Point) -> Option<&Field> {
        self.fields.get(&position)
    }

    /// All fields in coordinate order, water included
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Every field except water
    pub fn land_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values().filter(|f| f.land != Land::Water)
    }

    /// Fields producing on dice total `value`
    pub fn fields_for_dice_value(&self, value: u8) -> Vec<&Field> {
        self.fields
            .values()
            .filter(|f| f.dice_value == Some(value))
            .collect()
    }

    /// Resource-producing lands touching `corner`; empty for anything that is
    /// not a corner of the board
    pub fn lands_of_corner(&self, corner: Point) -> Vec<Land> {
        if !self.lattice.has_corner(corner) {
            return Vec::new();
        }
        self.lattice
            .fields_of_corner(corner)
            .unwrap_or_default()
            .iter()
            .filter_map(|p| self.fields.get(p))
            .map(|f| f.land)
            .filter(|land| land.resource().is_some())
            .collect()
    }

    /// Structure standing on a corner
    pub fn structure_at(&self, corner: Point) -> Option<&Structure> {
        self.corners.get(&corner)
    }

    /// Road lying on the edge between `a` and `b`
    pub fn road_at(&self, a: Point, b: Point) -> Option<&Structure> {
        self.roads.get(&Edge::new(a, b))
    }

    /// Settlements and cities on the corners of a field
    pub fn structures_of_field(&self, field: Point) -> Vec<&Structure> {
        field
            .corners_of_field()
            .iter()
            .filter_map(|c| self.corners.get(c))
            .collect()
    }

    pub fn thief_position(&self) -> Point {
        self.thief_position
    }

    /// Every placed settlement and city
    pub fn placed_structures(&self) -> impl Iterator<Item = (&Point, &Structure)> {
        self.corners.iter()
    }

    /// Every placed road
    pub fn placed_roads(&self) -> impl Iterator<Item = (&Edge, &Structure)> {
        self.roads.iter()
    }

    // ==================== Validation Methods ====================

    fn neighbours(&self, corner: Point) -> Vec<Point> {
        self.lattice.neighbour_corners(corner).unwrap_or_default()
    }

    /// Check the distance rule: no structure on any neighbouring corner
    pub fn satisfies_distance_rule(&self, corner: Point) -> bool {
        self.neighbours(corner)
            .iter()
            .all(|n| !self.corners.contains_key(n))
    }

    /// Whether a road of `faction` touches `corner`
    fn has_road_at(&self, corner: Point, faction: Faction) -> bool {
        self.neighbours(corner).iter().any(|n| {
            self.roads
                .get(&Edge::new(corner, *n))
                .is_some_and(|road| road.owner == faction)
        })
    }

    /// Check if `faction` may put a settlement on `corner`. Outside the
    /// initiation phase one of its roads must lead there.
    pub fn can_place_settlement(&self, corner: Point, initiation_phase: bool, faction: Faction) -> bool {
        self.lattice.has_corner(corner)
            && !self.lands_of_corner(corner).is_empty()
            && !self.corners.contains_key(&corner)
            && self.satisfies_distance_rule(corner)
            && (initiation_phase || self.has_road_at(corner, faction))
    }

    /// Check if `faction` owns a settlement on `corner` to upgrade
    pub fn can_place_city(&self, corner: Point, faction: Faction) -> bool {
        self.corners
            .get(&corner)
            .is_some_and(|s| s.kind == StructureKind::Settlement && s.owner == faction)
    }

    /// Check if `faction` may build a road from `a` to `b`
    pub fn can_place_road(&self, a: Point, b: Point, faction: Faction) -> bool {
        let Ok(edge) = self.lattice.edge(a, b) else {
            return false;
        };
        if !self.lattice.has_edge(a, b) || self.roads.contains_key(&edge) {
            return false;
        }
        if self.lands_of_corner(a).is_empty() && self.lands_of_corner(b).is_empty() {
            return false;
        }
        edge.endpoints().iter().any(|&end| {
            self.corners.get(&end).is_some_and(|s| s.owner == faction) || self.has_road_at(end, faction)
        })
    }

    /// The thief may stand on any land field, including the one it is on
    pub fn can_place_thief_on(&self, field: Point) -> bool {
        self.fields.get(&field).is_some_and(|f| f.land != Land::Water)
    }

    /// Factions other than `excluding` with a structure on the thief's field
    pub fn faced_factions_adjacent_to_thief(&self, excluding: Faction) -> BTreeSet<Faction> {
        self.structures_of_field(self.thief_position)
            .iter()
            .map(|s| s.owner)
            .filter(|f| *f != excluding)
            .collect()
    }

    // ==================== Mutation Methods ====================

    /// Put a settlement or city on a corner, replacing what was there
    /// (assumes validation already done)
    pub fn place_structure(&mut self, corner: Point, structure: Structure) {
        self.corners.insert(corner, structure);
    }

    /// Place a road (assumes validation already done)
    pub fn place_road(&mut self, edge: Edge, road: Structure) {
        self.roads.insert(edge, road);
    }

    /// Move the thief, keeping the occupancy flags in step
    pub fn move_thief(&mut self, new_location: Point) {
        if !self.fields.contains_key(&new_location) {
            return;
        }
        if let Some(field) = self.fields.get_mut(&self.thief_position) {
            field.occupied_by_thief = false;
        }
        if let Some(field) = self.fields.get_mut(&new_location) {
            field.occupied_by_thief = true;
        }
        self.thief_position = new_location;
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_standard_board_has_19_land_fields() {
        let board = Board::standard();
        assert_eq!(board.land_fields().count(), 19);
        assert_eq!(board.fields().count(), 37);
    }

    #[test]
    fn test_thief_starts_on_desert() {
        let board = Board::standard();
        let field = board.field(board.thief_position()).unwrap();
        assert_eq!(field.land, Land::Desert);
        assert!(field.occupied_by_thief);
        assert_eq!(field.dice_value, None);
        assert_eq!(board.fields().filter(|f| f.occupied_by_thief).count(), 1);
    }

    #[test]
    fn test_standard_board_has_correct_land_counts() {
        let board = Board::standard();
        let mut counts: HashMap<Land, usize> = HashMap::new();
        for field in board.land_fields() {
            *counts.entry(field.land).or_insert(0) += 1;
        }
        assert_eq!(counts.get(&Land::Forest), Some(&4));
        assert_eq!(counts.get(&Land::Pasture), Some(&4));
        assert_eq!(counts.get(&Land::Fields), Some(&4));
        assert_eq!(counts.get(&Land::Mountain), Some(&3));
        assert_eq!(counts.get(&Land::Hills), Some(&3));
        assert_eq!(counts.get(&Land::Desert), Some(&1));
    }

    #[test]
    fn test_standard_board_has_correct_number_distribution() {
        let board = Board::standard();
        let mut counts: HashMap<u8, usize> = HashMap::new();
        for value in board.fields().filter_map(|f| f.dice_value) {
            *counts.entry(value).or_insert(0) += 1;
        }
        assert_eq!(counts.get(&2), Some(&1), "Should have one 2");
        assert_eq!(counts.get(&7), None, "Should have no 7");
        assert_eq!(counts.get(&12), Some(&1), "Should have one 12");
        for value in [3, 4, 5, 6, 8, 9, 10, 11] {
            assert_eq!(counts.get(&value), Some(&2), "Should have two {value}s");
        }
    }

    #[test]
    fn test_no_adjacent_6_and_8() {
        let board = Board::standard();
        let hot: Vec<&Field> = board
            .fields()
            .filter(|f| matches!(f.dice_value, Some(6) | Some(8)))
            .collect();

        for a in &hot {
            for b in &hot {
                if a.position == b.position {
                    continue;
                }
                let shared = a
                    .position
                    .corners_of_field()
                    .iter()
                    .any(|c| b.position.corners_of_field().contains(c));
                assert!(
                    !shared,
                    "Found adjacent 6/8 at {} and {}",
                    a.position, b.position
                );
            }
        }
    }

    #[test]
    fn test_fields_for_dice_value() {
        let board = Board::standard();
        let positions: Vec<Point> = board.fields_for_dice_value(4).iter().map(|f| f.position).collect();
        assert_eq!(positions, vec![p(6, 8), p(7, 17)]);
        assert!(board.fields_for_dice_value(7).is_empty());
    }

    #[test]
    fn test_lands_of_corner() {
        let board = Board::standard();
        let mut lands = board.lands_of_corner(p(9, 15));
        lands.sort_by_key(|l| format!("{l:?}"));
        assert_eq!(lands, vec![Land::Forest, Land::Hills, Land::Pasture]);

        // coast: one land, two water
        assert_eq!(board.lands_of_corner(p(2, 12)), vec![Land::Forest]);
        // only water around
        assert!(board.lands_of_corner(p(3, 3)).is_empty());
        // not a corner at all
        assert!(board.lands_of_corner(p(0, 0)).is_empty());
        assert!(board.lands_of_corner(p(5, 5)).is_empty());
        assert!(board.lands_of_corner(p(-3, 40)).is_empty());
    }

    #[test]
    fn test_settlement_positions() {
        let board = Board::standard();
        for corner in [p(5, 9), p(6, 12), p(6, 6), p(4, 12)] {
            assert!(board.can_place_settlement(corner, true, Faction::Red), "{corner}");
        }
        for corner in [p(0, 0), p(3, 3), p(14, 12), p(5, 5)] {
            assert!(!board.can_place_settlement(corner, true, Faction::Red), "{corner}");
        }
    }

    #[test]
    fn test_settlement_needs_road_outside_initiation() {
        let mut board = Board::standard();
        assert!(!board.can_place_settlement(p(7, 7), false, Faction::Red));

        let edge = Edge::new(p(6, 6), p(7, 7));
        board.place_road(edge, Structure::road(Faction::Red, edge));

        assert!(board.can_place_settlement(p(7, 7), false, Faction::Red));
        assert!(!board.can_place_settlement(p(7, 7), false, Faction::Blue));
    }

    #[test]
    fn test_distance_rule() {
        let mut board = Board::standard();
        let corner = p(5, 9);
        assert!(board.satisfies_distance_rule(corner));

        board.place_structure(corner, Structure::settlement(Faction::Red, corner));

        for neighbour in board.lattice().neighbour_corners(corner).unwrap() {
            assert!(!board.satisfies_distance_rule(neighbour));
            assert!(!board.can_place_settlement(neighbour, true, Faction::Blue));
        }
        assert!(!board.can_place_settlement(corner, true, Faction::Blue));
    }

    #[test]
    fn test_city_requires_own_settlement() {
        let mut board = Board::standard();
        let corner = p(5, 9);
        assert!(!board.can_place_city(corner, Faction::Red));

        board.place_structure(corner, Structure::settlement(Faction::Red, corner));
        assert!(board.can_place_city(corner, Faction::Red));
        assert!(!board.can_place_city(corner, Faction::Blue));

        board.place_structure(corner, Structure::city(Faction::Red, corner));
        assert!(!board.can_place_city(corner, Faction::Red));
    }

    #[test]
    fn test_road_connectivity() {
        let mut board = Board::standard();
        let settlement = p(5, 9);
        board.place_structure(settlement, Structure::settlement(Faction::Red, settlement));

        // from the settlement
        assert!(board.can_place_road(settlement, p(6, 10), Faction::Red));
        assert!(board.can_place_road(p(6, 10), settlement, Faction::Red));
        assert!(!board.can_place_road(settlement, p(6, 10), Faction::Blue));
        // not connected yet
        assert!(!board.can_place_road(p(6, 10), p(7, 9), Faction::Red));

        let edge = Edge::new(settlement, p(6, 10));
        board.place_road(edge, Structure::road(Faction::Red, edge));

        // occupied now
        assert!(!board.can_place_road(p(6, 10), settlement, Faction::Red));
        // extends the road
        assert!(board.can_place_road(p(6, 10), p(7, 9), Faction::Red));
        assert!(board.can_place_road(p(6, 10), p(6, 12), Faction::Red));
    }

    #[test]
    fn test_malformed_roads_are_rejected() {
        let mut board = Board::standard();
        let corner = p(6, 10);
        board.place_structure(corner, Structure::settlement(Faction::Red, corner));

        assert!(!board.can_place_road(corner, corner, Faction::Red));
        assert!(!board.can_place_road(corner, p(9, 15), Faction::Red));
        assert!(!board.can_place_road(corner, p(9, 9), Faction::Red));
        assert!(!board.can_place_road(corner, p(0, 0), Faction::Red));
        assert!(!board.can_place_road(corner, p(-1, 9), Faction::Red));
    }

    #[test]
    fn test_road_between_water_corners_is_rejected() {
        let mut board = Board::standard();
        let corner = p(3, 3);
        board.place_structure(corner, Structure::settlement(Faction::Red, corner));
        assert!(board.lattice().has_edge(p(3, 1), p(3, 3)));
        assert!(!board.can_place_road(p(3, 1), p(3, 3), Faction::Red));
    }

    #[test]
    fn test_thief_placement() {
        let mut board = Board::standard();
        assert!(!board.can_place_thief_on(p(4, 2)), "water");
        assert!(!board.can_place_thief_on(p(5, 9)), "corner, not a field");
        assert!(board.can_place_thief_on(INITIAL_THIEF_POSITION), "desert");
        assert!(board.can_place_thief_on(p(11, 11)));

        board.move_thief(p(11, 11));

        assert_eq!(board.thief_position(), p(11, 11));
        assert!(board.field(p(11, 11)).unwrap().occupied_by_thief);
        assert!(!board.field(INITIAL_THIEF_POSITION).unwrap().occupied_by_thief);
        assert_eq!(board.fields().filter(|f| f.occupied_by_thief).count(), 1);

        // staying put keeps exactly one occupied field
        assert!(board.can_place_thief_on(p(11, 11)));
        board.move_thief(p(11, 11));
        assert_eq!(board.fields().filter(|f| f.occupied_by_thief).count(), 1);
    }

    #[test]
    fn test_faced_factions_adjacent_to_thief() {
        let mut board = Board::standard();
        board.place_structure(p(5, 9), Structure::settlement(Faction::Red, p(5, 9)));
        board.place_structure(p(6, 6), Structure::city(Faction::Blue, p(6, 6)));
        board.move_thief(p(6, 8));

        let faced = board.faced_factions_adjacent_to_thief(Faction::Red);
        assert_eq!(faced.into_iter().collect::<Vec<_>>(), vec![Faction::Blue]);
        assert!(board.faced_factions_adjacent_to_thief(Faction::Green).len() == 2);
    }

    #[test]
    fn test_board_from_custom_fields() {
        let fields = vec![
            Field::new(p(6, 8), Land::Mountain, Some(4)),
            Field::new(p(4, 8), Land::Desert, None),
        ];
        let board = Board::new(fields, p(4, 8)).unwrap();
        assert_eq!(board.thief_position(), p(4, 8));
        assert_eq!(board.fields_for_dice_value(4).len(), 1);

        let duplicate = vec![
            Field::new(p(6, 8), Land::Mountain, Some(4)),
            Field::new(p(6, 8), Land::Hills, Some(5)),
        ];
        assert_eq!(
            Board::new(duplicate, p(6, 8)),
            Err(LatticeError::DuplicateField(p(6, 8)))
        );
    }

    #[test]
    fn test_board_rejects_thief_off_the_fields() {
        let fields = vec![Field::new(p(6, 8), Land::Mountain, Some(4))];
        assert_eq!(
            Board::new(fields.clone(), p(0, 0)),
            Err(LatticeError::UnknownField(p(0, 0)))
        );
        assert_eq!(
            Board::new(fields, p(4, 8)),
            Err(LatticeError::UnknownField(p(4, 8)))
        );
    }

    #[test]
    fn test_standard_layout_builds_through_new() {
        let land = STANDARD_LAND
            .iter()
            .map(|&((x, y), land, dice)| Field::new(p(x, y), land, dice));
        let water = STANDARD_WATER
            .iter()
            .map(|&(x, y)| Field::new(p(x, y), Land::Water, None));

        let board = Board::new(land.chain(water), INITIAL_THIEF_POSITION).unwrap();
        assert_eq!(board, Board::standard());
    }

    #[test]
    fn test_reciprocity_on_standard_board() {
        let board = Board::standard();
        let lattice = board.lattice();
        let fields: Vec<Point> = lattice.fields().collect();
        assert_eq!(fields.len(), 37);

        for field in &fields {
            for corner in lattice.corners_of_field(*field) {
                assert!(lattice.has_corner(corner), "{corner} of {field}");
                let touching = lattice.fields_of_corner(corner).unwrap();
                assert!(touching.contains(field), "{field} missing from {corner}");
            }
        }

        let corners = lattice.corners();
        assert_eq!(corners.len(), 96);
        for corner in corners {
            let touching = lattice.fields_of_corner(corner).unwrap();
            assert!((1..=3).contains(&touching.len()), "{corner}");
            for field in touching {
                assert!(lattice.has_field(field));
                assert!(lattice.corners_of_field(field).contains(&corner), "{corner} not on {field}");
            }
        }
    }
}
