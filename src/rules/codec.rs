//! Bidirectional mapping between `Action` and dense `ActionId`s.
//!
//! ## Layout
//!
//! Contiguous blocks, in this order:
//!
//! | Block            | Size                  | Standard board |
//! |------------------|-----------------------|----------------|
//! | SelectSatellite  | `6 * max_commit`      | 48             |
//! | SelectDirection  | `6`                   | 6              |
//! | MoveOneStep      | `cells * unit_cap`    | 1700           |
//! | AddBot           | `cells`               | 85             |
//! | AddTank          | `cells`               | 85             |
//! | TankShoot        | `cells`               | 85             |
//!
//! `max_commit` is the ring's total charge, the most a single slot can
//! ever hold. The codec is pure structure: it knows the board size and the
//! bounds of each field, nothing about legality.

use serde::{Deserialize, Serialize};

use crate::core::{Action, ActionId, CellId, Direction, Spend, RING_SIZE};

use super::error::EngineError;

const DIRECTIONS: u32 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCodec {
    cells: u32,
    unit_cap: u32,
    max_commit: u32,
}

impl ActionCodec {
    /// # Panics
    ///
    /// Panics if any dimension is zero.
    #[must_use]
    pub fn new(cells: usize, unit_cap: u8, max_commit: u8) -> Self {
        assert!(cells > 0 && unit_cap > 0 && max_commit > 0, "codec dimensions must be positive");
        Self {
            cells: cells as u32,
            unit_cap: u32::from(unit_cap),
            max_commit: u32::from(max_commit),
        }
    }

    fn select_base(&self) -> u32 {
        0
    }

    fn direction_base(&self) -> u32 {
        self.select_base() + RING_SIZE as u32 * self.max_commit
    }

    fn move_base(&self) -> u32 {
        self.direction_base() + DIRECTIONS
    }

    fn add_bot_base(&self) -> u32 {
        self.move_base() + self.cells * self.unit_cap
    }

    fn add_tank_base(&self) -> u32 {
        self.add_bot_base() + self.cells
    }

    fn shoot_base(&self) -> u32 {
        self.add_tank_base() + self.cells
    }

    /// Number of ids.
    #[must_use]
    pub fn size(&self) -> usize {
        (self.shoot_base() + self.cells) as usize
    }

    #[must_use]
    pub fn max_commit(&self) -> u8 {
        self.max_commit as u8
    }

    pub fn encode(&self, action: &Action) -> Result<ActionId, EngineError> {
        let unencodable = || EngineError::Unencodable { action: *action };
        let cell_ok = |cell: CellId| u32::from(cell.0) < self.cells;

        let id = match *action {
            Action::SelectSatellite { slot, charges } => {
                let (slot, charges) = (u32::from(slot), u32::from(charges));
                if slot as usize >= RING_SIZE || charges == 0 || charges > self.max_commit {
                    return Err(unencodable());
                }
                self.select_base() + slot * self.max_commit + (charges - 1)
            }
            Action::SelectDirection(dir) => self.direction_base() + dir.index() as u32,
            Action::Spend(Spend::MoveOneStep { from, count }) => {
                let count = u32::from(count);
                if !cell_ok(from) || count == 0 || count > self.unit_cap {
                    return Err(unencodable());
                }
                self.move_base() + u32::from(from.0) * self.unit_cap + (count - 1)
            }
            Action::Spend(Spend::AddBot(cell)) if cell_ok(cell) => self.add_bot_base() + u32::from(cell.0),
            Action::Spend(Spend::AddTank(cell)) if cell_ok(cell) => self.add_tank_base() + u32::from(cell.0),
            Action::Spend(Spend::TankShoot(cell)) if cell_ok(cell) => self.shoot_base() + u32::from(cell.0),
            Action::Spend(_) => return Err(unencodable()),
        };
        Ok(ActionId(id))
    }

    pub fn decode(&self, id: ActionId) -> Result<Action, EngineError> {
        let raw = id.raw();
        let cell = |offset: u32| CellId(offset as u16);

        let action = if raw < self.direction_base() {
            let offset = raw - self.select_base();
            Action::SelectSatellite {
                slot: (offset / self.max_commit) as u8,
                charges: (offset % self.max_commit + 1) as u8,
            }
        } else if raw < self.move_base() {
            match Direction::from_index((raw - self.direction_base()) as usize) {
                Some(dir) => Action::SelectDirection(dir),
                None => return Err(self.out_of_range(id)),
            }
        } else if raw < self.add_bot_base() {
            let offset = raw - self.move_base();
            Action::Spend(Spend::MoveOneStep {
                from: cell(offset / self.unit_cap),
                count: (offset % self.unit_cap + 1) as u8,
            })
        } else if raw < self.add_tank_base() {
            Action::Spend(Spend::AddBot(cell(raw - self.add_bot_base())))
        } else if raw < self.shoot_base() {
            Action::Spend(Spend::AddTank(cell(raw - self.add_tank_base())))
        } else if (raw as usize) < self.size() {
            Action::Spend(Spend::TankShoot(cell(raw - self.shoot_base())))
        } else {
            return Err(self.out_of_range(id));
        };
        Ok(action)
    }

    fn out_of_range(&self, id: ActionId) -> EngineError {
        EngineError::InvalidActionId { id, size: self.size() as u32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> ActionCodec {
        ActionCodec::new(85, 20, 8)
    }

    #[test]
    fn test_standard_size() {
        assert_eq!(standard().size(), 48 + 6 + 1700 + 85 * 3);
        assert_eq!(standard().size(), 2009);
    }

    #[test]
    fn test_block_boundaries() {
        let codec = standard();
        assert_eq!(codec.decode(ActionId(0)).unwrap(), Action::select(0, 1));
        assert_eq!(codec.decode(ActionId(47)).unwrap(), Action::select(5, 8));
        assert_eq!(codec.decode(ActionId(48)).unwrap(), Action::SelectDirection(Direction::East));
        assert_eq!(codec.decode(ActionId(54)).unwrap(), Action::move_step(CellId(0), 1));
        assert_eq!(codec.decode(ActionId(1753)).unwrap(), Action::move_step(CellId(84), 20));
        assert_eq!(codec.decode(ActionId(1754)).unwrap(), Action::Spend(Spend::AddBot(CellId(0))));
        assert_eq!(codec.decode(ActionId(2008)).unwrap(), Action::Spend(Spend::TankShoot(CellId(84))));
    }

    #[test]
    fn test_decode_out_of_range() {
        let err = standard().decode(ActionId(2009)).unwrap_err();
        assert_eq!(err, EngineError::InvalidActionId { id: ActionId(2009), size: 2009 });
    }

    #[test]
    fn test_every_id_round_trips() {
        let codec = standard();
        for raw in 0..codec.size() as u32 {
            let action = codec.decode(ActionId(raw)).unwrap();
            assert_eq!(codec.encode(&action).unwrap(), ActionId(raw), "{action}");
        }
    }

    #[test]
    fn test_encode_rejects_out_of_bounds_fields() {
        let codec = standard();
        assert!(codec.encode(&Action::select(6, 1)).is_err());
        assert!(codec.encode(&Action::select(0, 0)).is_err());
        assert!(codec.encode(&Action::select(0, 9)).is_err());
        assert!(codec.encode(&Action::move_step(CellId(85), 1)).is_err());
        assert!(codec.encode(&Action::move_step(CellId(3), 21)).is_err());
        assert!(codec.encode(&Action::Spend(Spend::AddTank(CellId(85)))).is_err());
    }
}
