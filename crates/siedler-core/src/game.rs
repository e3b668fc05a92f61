//! Core game state machine.
//!
//! This module contains `SiedlerGame` and all rule enforcement: the snake-order
//! initial placement, dice resolution, building, bank trades, the thief and the
//! victory check.
//!
//! Every rule violation comes back as an `Err(GameError)` and leaves the game
//! exactly as it was; nothing is ever half-applied.

use crate::board::Board;
use crate::config::{
    ConfigError, GameConfig, FOUR_TO_ONE_TRADE_OFFER, FOUR_TO_ONE_TRADE_WANT,
    INITIAL_RESOURCE_CARDS_BANK, MAX_CARDS_IN_HAND_NO_DROP, THIEF_DICE_NUMBER,
};
use crate::inventory::{Inventory, InventoryError, Resource};
use crate::lattice::{Edge, Point};
use crate::player::{Faction, Player};
use crate::structure::{Structure, StructureKind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// First settlement and road, in seating order, no payout
    InitForward,
    /// Second settlement and road, in reverse order, with payout
    InitBackward,
    /// Regular turns: roll, then build and trade, then end the turn
    TurnLoop,
    /// A player reached the winning score
    GameOver { winner: Faction },
}

/// What the current player places next during the initiation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetupStep {
    Settlement,
    /// Road touching the settlement just placed
    Road { settlement: Point },
}

/// Rule violations. The game state is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Invalid action for current phase")]
    WrongPhase,

    #[error("Invalid placement location")]
    InvalidPlacement,

    #[error("No {0:?} pieces remaining")]
    StockExhausted(StructureKind),

    #[error("Cannot afford this: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Bank has no {0} left")]
    BankInsufficient(Resource),

    #[error("Invalid trade")]
    InvalidTrade,

    #[error("Dice total {0} is impossible")]
    InvalidDiceValue(u8),

    #[error("Thief cannot be placed on {0}")]
    InvalidThiefPosition(Point),

    #[error("Game is over")]
    GameOver,
}

/// Outcome of a dice roll.
///
/// For a payout, `affected_resources` holds what each faction received. When
/// the thief was rolled it holds what each faction had to discard. Every
/// faction in the game has an entry, empty if nothing changed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceResult {
    pub affected_resources: BTreeMap<Faction, BTreeMap<Resource, u32>>,
    pub thief_executed: bool,
}

impl DiceResult {
    /// Units gained (or discarded) by one faction
    pub fn total_for(&self, faction: Faction) -> u32 {
        self.affected_resources
            .get(&faction)
            .map(|m| m.values().sum())
            .unwrap_or(0)
    }
}

/// The complete game state
#[derive(Debug, Clone)]
pub struct SiedlerGame<R = StdRng> {
    board: Board,
    players: Vec<Player>,
    bank: Inventory,
    /// Index into `players`
    current: usize,
    phase: GamePhase,
    setup_step: SetupStep,
    winning_score: u32,
    rng: R,
}

impl SiedlerGame<StdRng> {
    /// Create a game seeded from `config.seed`, or from entropy when unset
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> SiedlerGame<R> {
    /// Create a game drawing every random decision from `rng`
    pub fn with_rng(config: GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let players: Vec<Player> = Faction::ALL
            .iter()
            .take(config.player_count as usize)
            .map(|f| Player::new(*f))
            .collect();

        info!(
            players = players.len(),
            winning_score = config.winning_score,
            "Game created"
        );

        Ok(Self {
            board: Board::standard(),
            players,
            bank: Inventory::filled(INITIAL_RESOURCE_CARDS_BANK),
            current: 0,
            phase: GamePhase::InitForward,
            setup_step: SetupStep::Settlement,
            winning_score: config.winning_score,
            rng,
        })
    }

    // ==================== Queries ====================

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn bank(&self) -> &Inventory {
        &self.bank
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Factions in seating order
    pub fn player_factions(&self) -> Vec<Faction> {
        self.players.iter().map(Player::faction).collect()
    }

    pub fn player(&self, faction: Faction) -> Option<&Player> {
        self.players.iter().find(|p| p.faction() == faction)
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    pub fn current_faction(&self) -> Faction {
        self.current_player().faction()
    }

    pub fn winning_score(&self) -> u32 {
        self.winning_score
    }

    /// Units held by the bank and every player together
    pub fn total_resources(&self) -> u32 {
        self.bank.total() + self.players.iter().map(Player::total_resources).sum::<u32>()
    }

    /// The current player, if their score has reached the winning score
    pub fn winner(&self) -> Option<Faction> {
        let player = self.current_player();
        (player.score() >= self.winning_score).then(|| player.faction())
    }

    // ==================== Initiation Phase ====================

    /// Place the current player's settlement of this setup round. In the
    /// backward round it pays one unit per adjacent producing land.
    pub fn place_initial_settlement(&mut self, corner: Point) -> Result<(), GameError> {
        if !matches!(self.phase, GamePhase::InitForward | GamePhase::InitBackward)
            || self.setup_step != SetupStep::Settlement
        {
            return Err(self.reject(GameError::WrongPhase, "place_initial_settlement"));
        }
        let faction = self.current_faction();
        if !self.board.can_place_settlement(corner, true, faction) {
            return Err(self.reject(GameError::InvalidPlacement, "place_initial_settlement"));
        }

        let settlement = Structure::settlement(faction, corner);
        self.board.place_structure(corner, settlement);
        self.players[self.current].add_structure(settlement);

        if self.phase == GamePhase::InitBackward {
            let lands = self.board.lands_of_corner(corner);
            let player = &mut self.players[self.current];
            for resource in lands.iter().filter_map(|l| l.resource()) {
                let unit = Inventory::single(resource, 1);
                if let Err(error) = self.bank.transfer_to(player.inventory_mut(), &unit) {
                    debug!(?faction, %resource, %error, "Initial payout skipped");
                }
            }
        }

        info!(?faction, %corner, phase = ?self.phase, "Initial settlement placed");
        self.setup_step = SetupStep::Road { settlement: corner };
        Ok(())
    }

    /// Place the road that must follow the settlement just placed, then hand
    /// over to the next player in snake order
    pub fn place_initial_road(&mut self, start: Point, end: Point) -> Result<(), GameError> {
        let SetupStep::Road { settlement } = self.setup_step else {
            return Err(self.reject(GameError::WrongPhase, "place_initial_road"));
        };
        if !matches!(self.phase, GamePhase::InitForward | GamePhase::InitBackward) {
            return Err(self.reject(GameError::WrongPhase, "place_initial_road"));
        }
        let faction = self.current_faction();
        let edge = Edge::new(start, end);
        if !edge.touches(settlement) || !self.board.can_place_road(start, end, faction) {
            return Err(self.reject(GameError::InvalidPlacement, "place_initial_road"));
        }

        let road = Structure::road(faction, edge);
        self.board.place_road(edge, road);
        self.players[self.current].add_structure(road);
        info!(?faction, %edge, "Initial road placed");

        self.advance_setup_phase();
        Ok(())
    }

    /// Snake order: 0, 1, .., n-1, n-1, .., 1, 0
    fn advance_setup_phase(&mut self) {
        let last = self.players.len() - 1;
        self.setup_step = SetupStep::Settlement;
        match self.phase {
            GamePhase::InitForward if self.current == last => {
                // same player opens the backward round
                self.phase = GamePhase::InitBackward;
                info!("Backward placement round started");
            }
            GamePhase::InitForward => self.switch_to_next_player(),
            GamePhase::InitBackward if self.current == 0 => {
                self.phase = GamePhase::TurnLoop;
                info!(faction = ?self.current_faction(), "Initiation phase ended");
            }
            GamePhase::InitBackward => self.switch_to_previous_player(),
            _ => {}
        }
    }

    fn switch_to_next_player(&mut self) {
        self.current = (self.current + 1) % self.players.len();
    }

    fn switch_to_previous_player(&mut self) {
        self.current = (self.current + self.players.len() - 1) % self.players.len();
    }

    // ==================== Turn Loop ====================

    /// Roll two six-sided dice from the game's random source and resolve them
    pub fn roll_dice(&mut self) -> Result<(u8, DiceResult), GameError> {
        self.ensure_turn_loop("roll_dice")?;
        let total = self.rng.gen_range(1..=6u8) + self.rng.gen_range(1..=6u8);
        let result = self.process_dice_roll(total)?;
        Ok((total, result))
    }

    /// Resolve a dice total: the thief on 7, production on anything else
    pub fn process_dice_roll(&mut self, value: u8) -> Result<DiceResult, GameError> {
        self.ensure_turn_loop("process_dice_roll")?;
        if !(2..=12).contains(&value) {
            return Err(self.reject(GameError::InvalidDiceValue(value), "process_dice_roll"));
        }

        debug!(faction = ?self.current_faction(), value, "Dice rolled");
        if value == THIEF_DICE_NUMBER {
            Ok(self.execute_thief())
        } else {
            Ok(self.payout_resources(value))
        }
    }

    fn empty_result(&self) -> BTreeMap<Faction, BTreeMap<Resource, u32>> {
        self.players
            .iter()
            .map(|p| (p.faction(), BTreeMap::new()))
            .collect()
    }

    /// Pay every field triggered by `value` unless the thief sits on it or the
    /// bank cannot cover all of its structures
    fn payout_resources(&mut self, value: u8) -> DiceResult {
        let mut affected = self.empty_result();

        let triggered: Vec<(Point, Resource)> = self
            .board
            .fields_for_dice_value(value)
            .into_iter()
            .filter(|f| !f.occupied_by_thief)
            .filter_map(|f| f.resource().map(|r| (f.position, r)))
            .collect();

        for (field, resource) in triggered {
            let structures: Vec<Structure> =
                self.board.structures_of_field(field).into_iter().copied().collect();
            let needed: u32 = structures.iter().map(Structure::resource_multiplier).sum();
            if self.bank.get(resource) < needed {
                debug!(
                    %field,
                    %resource,
                    needed,
                    available = self.bank.get(resource),
                    "Payout skipped"
                );
                continue;
            }

            for structure in structures {
                let amount = structure.resource_multiplier();
                let owner = self.players.iter_mut().find(|p| p.faction() == structure.owner);
                let Some(player) = owner else {
                    continue;
                };
                let bundle = Inventory::single(resource, amount);
                if self.bank.transfer_to(player.inventory_mut(), &bundle).is_ok() {
                    *affected
                        .entry(structure.owner)
                        .or_default()
                        .entry(resource)
                        .or_insert(0) += amount;
                }
            }
        }

        debug!(value, ?affected, "Resources paid out");
        DiceResult {
            affected_resources: affected,
            thief_executed: false,
        }
    }

    /// Every player over the hand limit returns half their hand to the bank
    fn execute_thief(&mut self) -> DiceResult {
        let mut affected = self.empty_result();

        for player in &mut self.players {
            let discarded = player.discard_half(MAX_CARDS_IN_HAND_NO_DROP, &mut self.rng);
            if discarded.is_empty() {
                continue;
            }
            debug!(faction = ?player.faction(), discarded = discarded.total(), "Thief discard");
            self.bank.increase_all(&discarded);
            affected.insert(player.faction(), discarded.to_map());
        }

        DiceResult {
            affected_resources: affected,
            thief_executed: true,
        }
    }

    /// Move the thief to `field` and steal one random unit from a random
    /// other faction with a structure there. Returns the victim and the
    /// stolen resource, or `None` when nobody could be robbed.
    pub fn place_thief_and_steal_card(
        &mut self,
        field: Point,
    ) -> Result<Option<(Faction, Resource)>, GameError> {
        self.ensure_turn_loop("place_thief_and_steal_card")?;
        if !self.board.can_place_thief_on(field) {
            let error = GameError::InvalidThiefPosition(field);
            return Err(self.reject(error, "place_thief_and_steal_card"));
        }

        self.board.move_thief(field);
        let faction = self.current_faction();
        debug!(?faction, %field, "Thief moved");

        let victims: Vec<usize> = self
            .board
            .faced_factions_adjacent_to_thief(faction)
            .into_iter()
            .filter_map(|f| self.players.iter().position(|p| p.faction() == f))
            .filter(|&i| self.players[i].total_resources() > 0)
            .collect();

        let Some(&victim) = victims.choose(&mut self.rng) else {
            return Ok(None);
        };
        let (robber, robbed) = pair_mut(&mut self.players, self.current, victim);
        let victim_faction = robbed.faction();
        let Some(resource) = robber.steal_from(robbed, &mut self.rng) else {
            return Ok(None);
        };

        debug!(?faction, victim = ?victim_faction, %resource, "Resource stolen");
        Ok(Some((victim_faction, resource)))
    }

    /// Check the stock cap, then move the cost bundle to the bank in one step
    fn pay_for(&mut self, kind: StructureKind) -> Result<(), GameError> {
        let player = &mut self.players[self.current];
        if !player.has_stock_left(kind) {
            return Err(GameError::StockExhausted(kind));
        }
        player.inventory_mut().transfer_to(&mut self.bank, &kind.cost())?;
        Ok(())
    }

    pub fn build_settlement(&mut self, corner: Point) -> Result<(), GameError> {
        self.ensure_turn_loop("build_settlement")?;
        let faction = self.current_faction();
        if !self.board.can_place_settlement(corner, false, faction) {
            return Err(self.reject(GameError::InvalidPlacement, "build_settlement"));
        }
        if let Err(error) = self.pay_for(StructureKind::Settlement) {
            return Err(self.reject(error, "build_settlement"));
        }

        let settlement = Structure::settlement(faction, corner);
        self.board.place_structure(corner, settlement);
        self.players[self.current].add_structure(settlement);
        info!(?faction, %corner, "Settlement built");

        self.check_win_condition();
        Ok(())
    }

    /// Upgrade one of the current player's settlements
    pub fn build_city(&mut self, corner: Point) -> Result<(), GameError> {
        self.ensure_turn_loop("build_city")?;
        let faction = self.current_faction();
        if !self.board.can_place_city(corner, faction) {
            return Err(self.reject(GameError::InvalidPlacement, "build_city"));
        }
        if let Err(error) = self.pay_for(StructureKind::City) {
            return Err(self.reject(error, "build_city"));
        }

        let city = Structure::city(faction, corner);
        let player = &mut self.players[self.current];
        player.remove_settlement_at(corner);
        player.add_structure(city);
        self.board.place_structure(corner, city);
        info!(?faction, %corner, "City built");

        self.check_win_condition();
        Ok(())
    }

    pub fn build_road(&mut self, start: Point, end: Point) -> Result<(), GameError> {
        self.ensure_turn_loop("build_road")?;
        let faction = self.current_faction();
        if !self.board.can_place_road(start, end, faction) {
            return Err(self.reject(GameError::InvalidPlacement, "build_road"));
        }
        if let Err(error) = self.pay_for(StructureKind::Road) {
            return Err(self.reject(error, "build_road"));
        }

        let edge = Edge::new(start, end);
        let road = Structure::road(faction, edge);
        self.board.place_road(edge, road);
        self.players[self.current].add_structure(road);
        info!(?faction, %edge, "Road built");
        Ok(())
    }

    /// Give the bank four of `offer` for one of `want`
    pub fn trade_with_bank_four_to_one(
        &mut self,
        offer: Resource,
        want: Resource,
    ) -> Result<(), GameError> {
        self.ensure_turn_loop("trade_with_bank_four_to_one")?;
        if offer == want {
            return Err(self.reject(GameError::InvalidTrade, "trade_with_bank_four_to_one"));
        }

        let given = Inventory::single(offer, FOUR_TO_ONE_TRADE_OFFER);
        let received = Inventory::single(want, FOUR_TO_ONE_TRADE_WANT);
        if !self.bank.contains(&received) {
            let error = GameError::BankInsufficient(want);
            return Err(self.reject(error, "trade_with_bank_four_to_one"));
        }
        let available = self.current_player().inventory().get(offer);
        if available < FOUR_TO_ONE_TRADE_OFFER {
            let error = InventoryError::Insufficient {
                resource: offer,
                requested: FOUR_TO_ONE_TRADE_OFFER,
                available,
            };
            return Err(self.reject(error.into(), "trade_with_bank_four_to_one"));
        }

        // both sides are covered, so neither transfer can fail
        let player = &mut self.players[self.current];
        player.inventory_mut().transfer_to(&mut self.bank, &given)?;
        self.bank.transfer_to(player.inventory_mut(), &received)?;

        debug!(faction = ?player.faction(), %offer, %want, "Traded with bank");
        Ok(())
    }

    /// Hand the turn to the next player
    pub fn end_turn(&mut self) -> Result<(), GameError> {
        self.ensure_turn_loop("end_turn")?;
        self.switch_to_next_player();
        debug!(faction = ?self.current_faction(), "Turn started");
        Ok(())
    }

    // ==================== Helper Methods ====================

    fn ensure_turn_loop(&self, action: &'static str) -> Result<(), GameError> {
        match self.phase {
            GamePhase::TurnLoop => Ok(()),
            GamePhase::GameOver { .. } => Err(self.reject(GameError::GameOver, action)),
            _ => Err(self.reject(GameError::WrongPhase, action)),
        }
    }

    fn reject(&self, error: GameError, action: &'static str) -> GameError {
        debug!(faction = ?self.current_faction(), action, %error, "Action rejected");
        error
    }

    fn check_win_condition(&mut self) {
        if let Some(winner) = self.winner() {
            self.phase = GamePhase::GameOver { winner };
            info!(?winner, score = self.current_player().score(), "Game won");
        }
    }
}

/// Two distinct players borrowed mutably at once
fn pair_mut(players: &mut [Player], first: usize, second: usize) -> (&mut Player, &mut Player) {
    debug_assert_ne!(first, second);
    if first < second {
        let (left, right) = players.split_at_mut(second);
        (&mut left[first], &mut right[0])
    } else {
        let (left, right) = players.split_at_mut(first);
        (&mut right[0], &mut left[second])
    }
}
