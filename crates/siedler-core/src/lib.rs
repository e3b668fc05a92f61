//! Siedler - a hex-grid settlement building game engine
//!
//! This crate provides the core game logic for Siedler, including:
//! - A sparse hex lattice of fields, corners and edges
//! - The standard board with its lands, dice numbers and the thief
//! - Resource inventories for players and the bank
//! - Game state machine with full rule enforcement
//!
//! # Architecture
//!
//! The engine is a library with no I/O of its own. A driver creates a
//! [`SiedlerGame`] and calls its operations; every rule violation comes back
//! as a [`GameError`] and leaves the game untouched. All random decisions are
//! drawn from an injected generator, so a seeded game replays exactly.
//!
//! # Modules
//!
//! - [`lattice`]: Coordinate system for fields, corners and edges
//! - [`board`]: Game board with lands, structures and the thief
//! - [`inventory`]: Resource bundles and transfers
//! - [`structure`]: Settlements, cities and roads
//! - [`player`]: Player state
//! - [`config`]: Rule constants and per-game settings
//! - [`game`]: Game state machine

pub mod board;
pub mod config;
pub mod game;
pub mod inventory;
pub mod lattice;
pub mod player;
pub mod structure;

// Re-export commonly used types
pub use board::{Board, Field, Land};
pub use config::{ConfigError, GameConfig};
pub use game::{DiceResult, GameError, GamePhase, SiedlerGame};
pub use inventory::{Inventory, InventoryError, Resource};
pub use lattice::{Edge, HexLattice, LatticeError, Point};
pub use player::{Faction, Player};
pub use structure::{Site, Structure, StructureKind};
