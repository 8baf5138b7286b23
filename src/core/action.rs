//! The phase-tagged action grammar.
//!
//! Every action spends at most one charge. Multi-step movement, repeated
//! shots and multiple placements are sequences of `Spend` actions; there is no
//! compound action.

use serde::{Deserialize, Serialize};

use super::hex::{CellId, Direction};

/// Dense integer id of an action; see `rules::ActionCodec` for the layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub u32);

impl ActionId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One charge's worth of effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Spend {
    /// Move `count` units of the selected satellite's type from `from` one
    /// step in the selected direction.
    MoveOneStep { from: CellId, count: u8 },
    /// Place one bot.
    AddBot(CellId),
    /// Place one tank.
    AddTank(CellId),
    /// Fire at `target`. The firing stack is the cell one step from the
    /// target against the selected direction.
    TankShoot(CellId),
}

/// A decoded action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Take `charges` from ring slot `slot`.
    SelectSatellite { slot: u8, charges: u8 },
    /// Fix the direction for a movement satellite.
    SelectDirection(Direction),
    /// Spend one committed charge.
    Spend(Spend),
}

impl Action {
    #[must_use]
    pub const fn select(slot: u8, charges: u8) -> Self {
        Action::SelectSatellite { slot, charges }
    }

    #[must_use]
    pub const fn move_step(from: CellId, count: u8) -> Self {
        Action::Spend(Spend::MoveOneStep { from, count })
    }

    #[must_use]
    pub const fn is_spend(&self) -> bool {
        matches!(self, Action::Spend(_))
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::SelectSatellite { slot, charges } => {
                write!(f, "select(slot={slot}, charges={charges})")
            }
            Action::SelectDirection(dir) => write!(f, "direction({dir})"),
            Action::Spend(Spend::MoveOneStep { from, count }) => {
                write!(f, "move({}, count={count})", from.0)
            }
            Action::Spend(Spend::AddBot(cell)) => write!(f, "add-bot({})", cell.0),
            Action::Spend(Spend::AddTank(cell)) => write!(f, "add-tank({})", cell.0),
            Action::Spend(Spend::TankShoot(cell)) => write!(f, "shoot({})", cell.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Action::select(2, 1).to_string(), "select(slot=2, charges=1)");
        assert_eq!(Action::SelectDirection(Direction::SouthEast).to_string(), "direction(SE)");
        assert_eq!(Action::move_step(CellId(7), 3).to_string(), "move(7, count=3)");
        assert_eq!(Action::Spend(Spend::TankShoot(CellId(40))).to_string(), "shoot(40)");
    }

    #[test]
    fn test_is_spend() {
        assert!(Action::Spend(Spend::AddBot(CellId(0))).is_spend());
        assert!(!Action::select(0, 1).is_spend());
    }

    #[test]
    fn test_serialization() {
        let action = Action::move_step(CellId(12), 2);
        let json = serde_json::to_string(&action).unwrap();
        let deserialized: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(action, deserialized);
    }
}
