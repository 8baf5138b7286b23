//! Game state.
//!
//! ## Ownership
//!
//! `State` owns everything by value. Board cells live in an `im::Vector`, so
//! `clone()` is O(1) and the first write to a cloned board copies only the
//! touched chunk. Two clones never share mutable data, which is what lets
//! search workers own their states without locks.
//!
//! ## Mutation
//!
//! Every field has a read-only accessor. The only mutators are `pub(crate)`
//! and are called by the rule resolver; they keep the per-player unit totals
//! and the artefact counter in step with the board.

use std::hash::{Hash, Hasher};

use im::Vector;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use super::config::BoardConfig;
use super::hex::{BoardLayout, CellId, Direction};
use super::outcome::GameOutcome;
use super::player::{PlayerId, PlayerMap};
use super::satellite::SatelliteRing;
use super::unit::{Stack, UnitKind};

/// Contents of one hex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    units: PlayerMap<Stack>,
    artefact: bool,
}

impl Cell {
    /// A player's stack on this cell.
    #[inline]
    #[must_use]
    pub fn units(&self, player: PlayerId) -> Stack {
        self.units[player]
    }

    #[inline]
    #[must_use]
    pub fn has_artefact(&self) -> bool {
        self.artefact
    }

    /// No units of either player and no artefact.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.artefact && self.units.iter().all(|(_, s)| s.is_empty())
    }

    /// Does `player` have any units here?
    #[inline]
    #[must_use]
    pub fn occupied_by(&self, player: PlayerId) -> bool {
        !self.units[player].is_empty()
    }
}

/// Turn phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    SelectSatellite,
    SelectDirection,
    SpendCharge,
    /// Entered and left inside a single resolver call; never observed.
    AutomaticSpread,
    Terminal,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::SelectSatellite,
        Phase::SelectDirection,
        Phase::SpendCharge,
        Phase::AutomaticSpread,
        Phase::Terminal,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Whose turn it is and how far into it they are.
///
/// `charges_remaining > 0` only while `phase == SpendCharge`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnContext {
    phase: Phase,
    active_player: PlayerId,
    selected_satellite: Option<u8>,
    selected_direction: Option<Direction>,
    committed_charges: u8,
    charges_remaining: u8,
    turn_number: u32,
}

impl TurnContext {
    fn opening() -> Self {
        Self {
            phase: Phase::SelectSatellite,
            active_player: PlayerId::FIRST,
            selected_satellite: None,
            selected_direction: None,
            committed_charges: 0,
            charges_remaining: 0,
            turn_number: 1,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.active_player
    }

    #[must_use]
    pub fn selected_satellite(&self) -> Option<usize> {
        self.selected_satellite.map(usize::from)
    }

    #[must_use]
    pub fn selected_direction(&self) -> Option<Direction> {
        self.selected_direction
    }

    /// Charges taken from the selected satellite this turn.
    #[must_use]
    pub fn committed_charges(&self) -> u8 {
        self.committed_charges
    }

    #[must_use]
    pub fn charges_remaining(&self) -> u8 {
        self.charges_remaining
    }

    /// Full-turn counter, starting at 1; advances when play returns to the
    /// first player.
    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }
}

/// Complete game state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    seed: u64,
    cells: Vector<Cell>,
    ring: SatelliteRing,
    turn: TurnContext,
    scores: PlayerMap<u16>,
    unit_totals: PlayerMap<u8>,
    artefacts_remaining: u8,
    outcome: Option<GameOutcome>,
}

impl State {
    /// Opening position. The board setup must already be validated against
    /// `layout`.
    pub(crate) fn new(seed: u64, layout: &BoardLayout, board: &BoardConfig) -> Self {
        let mut cells: Vec<Cell> = vec![Cell::default(); layout.cell_count()];
        let mut unit_totals = PlayerMap::with_value(0u8);
        let mut artefacts_remaining = 0u8;

        for &coord in &board.artefacts {
            if let Some(id) = layout.cell_id(coord) {
                cells[id.index()].artefact = true;
                artefacts_remaining += 1;
            }
        }
        for placement in &board.initial_units {
            if let Some(id) = layout.cell_id(placement.coord) {
                cells[id.index()].units[placement.player].add(placement.unit, placement.count);
                unit_totals[placement.player] += placement.count;
            }
        }

        Self {
            seed,
            cells: cells.into_iter().collect(),
            ring: SatelliteRing::shuffled(seed),
            turn: TurnContext::opening(),
            scores: PlayerMap::with_value(0),
            unit_totals,
            artefacts_remaining,
            outcome: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The seed the ring order was drawn from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn ring(&self) -> &SatelliteRing {
        &self.ring
    }

    #[must_use]
    pub fn turn(&self) -> &TurnContext {
        &self.turn
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.turn.phase
    }

    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.turn.active_player
    }

    #[must_use]
    pub fn charges_remaining(&self) -> u8 {
        self.turn.charges_remaining
    }

    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn.turn_number
    }

    /// # Panics
    ///
    /// Panics if `id` is not a cell of this board.
    #[inline]
    #[must_use]
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    /// Iterate over (CellId, &Cell) pairs.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (CellId(i as u16), c))
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn score(&self, player: PlayerId) -> u16 {
        self.scores[player]
    }

    #[must_use]
    pub fn scores(&self) -> PlayerMap<u16> {
        self.scores
    }

    /// Units (bots + tanks) a player has on the board.
    #[must_use]
    pub fn unit_total(&self, player: PlayerId) -> u8 {
        self.unit_totals[player]
    }

    #[must_use]
    pub fn artefacts_remaining(&self) -> u8 {
        self.artefacts_remaining
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.turn.phase == Phase::Terminal
    }

    /// 64-bit FxHash of the full position, for transposition tables.
    #[must_use]
    pub fn state_key(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }

    // =========================================================================
    // Resolver-only mutators
    // =========================================================================

    pub(crate) fn ring_mut(&mut self) -> &mut SatelliteRing {
        &mut self.ring
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.turn.phase = phase;
    }

    /// Record a selection: the committed charges wait for a direction (or
    /// go straight to spending for placement satellites).
    pub(crate) fn commit(&mut self, slot: u8, charges: u8) {
        self.turn.selected_satellite = Some(slot);
        self.turn.committed_charges = charges;
        self.turn.charges_remaining = 0;
    }

    /// Enter `SpendCharge` with the committed charges available.
    pub(crate) fn begin_spending(&mut self, direction: Option<Direction>) {
        self.turn.selected_direction = direction;
        self.turn.charges_remaining = self.turn.committed_charges;
        self.turn.phase = Phase::SpendCharge;
    }

    pub(crate) fn consume_charge(&mut self) {
        self.turn.charges_remaining = self.turn.charges_remaining.saturating_sub(1);
    }

    /// Clear the selection without passing the turn.
    pub(crate) fn clear_selection(&mut self) {
        self.turn = TurnContext {
            phase: self.turn.phase,
            active_player: self.turn.active_player,
            turn_number: self.turn.turn_number,
            ..TurnContext::opening()
        };
    }

    /// Clear the selection and hand the turn to the opponent.
    pub(crate) fn pass_turn(&mut self) {
        let next = self.turn.active_player.opponent();
        if next == PlayerId::FIRST {
            self.turn.turn_number += 1;
        }
        self.turn = TurnContext {
            phase: Phase::SelectSatellite,
            active_player: next,
            turn_number: self.turn.turn_number,
            ..TurnContext::opening()
        };
    }

    pub(crate) fn finish(&mut self, outcome: GameOutcome) {
        self.turn.phase = Phase::Terminal;
        self.turn.charges_remaining = 0;
        self.outcome = Some(outcome);
    }

    pub(crate) fn add_units(&mut self, id: CellId, player: PlayerId, kind: UnitKind, count: u8) {
        if let Some(cell) = self.cells.get_mut(id.index()) {
            cell.units[player].add(kind, count);
            self.unit_totals[player] += count;
        }
    }

    /// Remove up to `count` units; returns how many were removed.
    pub(crate) fn remove_units(&mut self, id: CellId, player: PlayerId, kind: UnitKind, count: u8) -> u8 {
        let removed = match self.cells.get_mut(id.index()) {
            Some(cell) => cell.units[player].remove(kind, count),
            None => 0,
        };
        self.unit_totals[player] -= removed;
        removed
    }

    /// Take the artefact off a cell. Returns false if there was none.
    pub(crate) fn capture_artefact(&mut self, id: CellId) -> bool {
        match self.cells.get_mut(id.index()) {
            Some(cell) if cell.artefact => {
                cell.artefact = false;
                self.artefacts_remaining -= 1;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn add_score(&mut self, player: PlayerId, points: u16) {
        self.scores[player] += points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hex::HexCoord;

    fn opening(seed: u64) -> (BoardLayout, State) {
        let board = BoardConfig::standard();
        let layout = BoardLayout::from_config(&board).unwrap();
        let state = State::new(seed, &layout, &board);
        (layout, state)
    }

    #[test]
    fn test_opening_position() {
        let (layout, state) = opening(1);
        assert_eq!(state.cell_count(), 85);
        assert_eq!(state.phase(), Phase::SelectSatellite);
        assert_eq!(state.active_player(), PlayerId::FIRST);
        assert_eq!(state.turn_number(), 1);
        assert_eq!(state.artefacts_remaining(), 6);
        assert_eq!(state.unit_total(PlayerId::FIRST), 4);
        assert_eq!(state.unit_total(PlayerId::SECOND), 4);

        let p1_bots = layout.cell_id(HexCoord::new(0, 3)).unwrap();
        assert_eq!(state.cell(p1_bots).units(PlayerId::FIRST), Stack::of(UnitKind::Bot, 2));
        let artefact = layout.cell_id(HexCoord::new(4, 4)).unwrap();
        assert!(state.cell(artefact).has_artefact());
    }

    #[test]
    fn test_clone_is_independent() {
        let (layout, state) = opening(3);
        let cell = layout.cell_id(HexCoord::new(4, 0)).unwrap();

        let mut copy = state.clone();
        copy.add_units(cell, PlayerId::FIRST, UnitKind::Tank, 1);

        assert!(state.cell(cell).is_empty());
        assert_eq!(copy.cell(cell).units(PlayerId::FIRST).tanks, 1);
        assert_ne!(state, copy);
        assert_ne!(state.state_key(), copy.state_key());
    }

    #[test]
    fn test_unit_totals_track_board() {
        let (layout, mut state) = opening(3);
        let cell = layout.cell_id(HexCoord::new(0, 3)).unwrap();
        assert_eq!(state.remove_units(cell, PlayerId::FIRST, UnitKind::Bot, 5), 2);
        assert_eq!(state.unit_total(PlayerId::FIRST), 2);
    }

    #[test]
    fn test_capture_artefact() {
        let (layout, mut state) = opening(3);
        let cell = layout.cell_id(HexCoord::new(2, 1)).unwrap();
        assert!(state.capture_artefact(cell));
        assert!(!state.capture_artefact(cell));
        assert_eq!(state.artefacts_remaining(), 5);
    }

    #[test]
    fn test_pass_turn_counts_full_turns() {
        let (_, mut state) = opening(3);
        state.commit(0, 1);
        state.pass_turn();
        assert_eq!(state.active_player(), PlayerId::SECOND);
        assert_eq!(state.turn_number(), 1);
        assert_eq!(state.turn().selected_satellite(), None);

        state.pass_turn();
        assert_eq!(state.active_player(), PlayerId::FIRST);
        assert_eq!(state.turn_number(), 2);
    }

    #[test]
    fn test_same_seed_same_state() {
        let (_, a) = opening(77);
        let (_, b) = opening(77);
        assert_eq!(a, b);
        assert_eq!(a.state_key(), b.state_key());
    }

    #[test]
    fn test_serialization() {
        let (_, state) = opening(9);
        let bytes = bincode::serialize(&state).unwrap();
        let restored: State = bincode::deserialize(&bytes).unwrap();
        assert_eq!(state, restored);
    }
}
