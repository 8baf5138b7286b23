//! The satellite ring.
//!
//! Six slots in a fixed cyclic order, each with a kind and a charge count.
//! The order is drawn once from the game seed; afterwards only charge counts
//! change. The total charge on the ring is conserved: charges taken by a
//! selection are always spread back at turn end.

use serde::{Deserialize, Serialize};

use super::config::SpreadDirection;
use super::rng::GameRng;
use super::unit::UnitKind;

/// Number of slots on the ring.
pub const RING_SIZE: usize = 6;

/// What a satellite's charges buy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SatelliteKind {
    MoveTank,
    MoveBot,
    AddTank,
    AddBot,
}

impl SatelliteKind {
    pub const ALL: [SatelliteKind; 4] = [
        SatelliteKind::MoveTank,
        SatelliteKind::MoveBot,
        SatelliteKind::AddTank,
        SatelliteKind::AddBot,
    ];

    /// Movement kinds need a direction before charges can be spent.
    #[must_use]
    pub const fn is_movement(self) -> bool {
        matches!(self, SatelliteKind::MoveTank | SatelliteKind::MoveBot)
    }

    /// The unit type this satellite moves or places.
    #[must_use]
    pub const fn unit(self) -> UnitKind {
        match self {
            SatelliteKind::MoveTank | SatelliteKind::AddTank => UnitKind::Tank,
            SatelliteKind::MoveBot | SatelliteKind::AddBot => UnitKind::Bot,
        }
    }

    /// Charges a slot of this kind holds when the game starts.
    #[must_use]
    pub const fn initial_charge(self) -> u8 {
        if self.is_movement() {
            2
        } else {
            0
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for SatelliteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SatelliteKind::MoveTank => "move-tank",
            SatelliteKind::MoveBot => "move-bot",
            SatelliteKind::AddTank => "add-tank",
            SatelliteKind::AddBot => "add-bot",
        };
        f.write_str(name)
    }
}

/// One ring slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Satellite {
    pub kind: SatelliteKind,
    pub charge: u8,
}

/// The cyclic sequence of six satellites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SatelliteRing {
    slots: [Satellite; RING_SIZE],
}

impl SatelliteRing {
    /// Kinds in canonical (unshuffled) order.
    pub const CANONICAL: [SatelliteKind; RING_SIZE] = [
        SatelliteKind::MoveTank,
        SatelliteKind::MoveTank,
        SatelliteKind::MoveBot,
        SatelliteKind::MoveBot,
        SatelliteKind::AddTank,
        SatelliteKind::AddBot,
    ];

    /// Build a ring from an explicit kind order with starting charges.
    #[must_use]
    pub fn from_kinds(kinds: [SatelliteKind; RING_SIZE]) -> Self {
        Self {
            slots: kinds.map(|kind| Satellite { kind, charge: kind.initial_charge() }),
        }
    }

    /// The ring order for a game seed.
    ///
    /// Fisher-Yates over the canonical order, driven by the seed's `"ring"`
    /// stream. Two games with the same seed always get the same ring.
    #[must_use]
    pub fn shuffled(seed: u64) -> Self {
        let mut kinds = Self::CANONICAL;
        GameRng::new(seed).for_context("ring").shuffle(&mut kinds);
        Self::from_kinds(kinds)
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&Satellite> {
        self.slots.get(slot)
    }

    #[must_use]
    pub fn slots(&self) -> &[Satellite; RING_SIZE] {
        &self.slots
    }

    #[must_use]
    pub fn kinds(&self) -> [SatelliteKind; RING_SIZE] {
        self.slots.map(|s| s.kind)
    }

    #[must_use]
    pub fn total_charge(&self) -> u32 {
        self.slots.iter().map(|s| u32::from(s.charge)).sum()
    }

    /// The slot one step away in the given spread direction.
    #[must_use]
    pub const fn next_slot(slot: usize, direction: SpreadDirection) -> usize {
        match direction {
            SpreadDirection::Clockwise => (slot + 1) % RING_SIZE,
            SpreadDirection::CounterClockwise => (slot + RING_SIZE - 1) % RING_SIZE,
        }
    }

    /// Remove `charges` from a slot. Returns false without changing anything
    /// if the slot holds fewer.
    pub(crate) fn take(&mut self, slot: usize, charges: u8) -> bool {
        match self.slots.get_mut(slot) {
            Some(sat) if sat.charge >= charges => {
                sat.charge -= charges;
                true
            }
            _ => false,
        }
    }

    /// Hand `amount` charges out one at a time to successive slots after
    /// `from`, wrapping around the ring (past `from` itself if needed).
    pub(crate) fn spread(&mut self, from: usize, amount: u8, direction: SpreadDirection) {
        let mut slot = from;
        for _ in 0..amount {
            slot = Self::next_slot(slot, direction);
            self.slots[slot].charge += 1;
        }
    }
}
