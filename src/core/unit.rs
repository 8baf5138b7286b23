//! Unit kinds and per-cell stacks.

use serde::{Deserialize, Serialize};

/// The two unit types on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Capture artefacts; cannot attack.
    Bot,
    /// Shoot adjacent enemies; cannot enter artefact hexes.
    Tank,
}

impl UnitKind {
    /// The other unit type.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            UnitKind::Bot => UnitKind::Tank,
            UnitKind::Tank => UnitKind::Bot,
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitKind::Bot => write!(f, "bot"),
            UnitKind::Tank => write!(f, "tank"),
        }
    }
}

/// One player's units on one cell.
///
/// The rules never let a player hold both types on the same cell, but the
/// representation does not depend on that.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stack {
    pub bots: u8,
    pub tanks: u8,
}

impl Stack {
    /// An empty stack.
    pub const EMPTY: Stack = Stack { bots: 0, tanks: 0 };

    /// A stack of `count` units of one kind.
    #[must_use]
    pub const fn of(kind: UnitKind, count: u8) -> Self {
        match kind {
            UnitKind::Bot => Stack { bots: count, tanks: 0 },
            UnitKind::Tank => Stack { bots: 0, tanks: count },
        }
    }

    #[must_use]
    pub const fn get(&self, kind: UnitKind) -> u8 {
        match kind {
            UnitKind::Bot => self.bots,
            UnitKind::Tank => self.tanks,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u8 {
        self.bots + self.tanks
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bots == 0 && self.tanks == 0
    }

    pub(crate) fn add(&mut self, kind: UnitKind, count: u8) {
        match kind {
            UnitKind::Bot => self.bots += count,
            UnitKind::Tank => self.tanks += count,
        }
    }

    /// Remove up to `count` units, returning how many were removed.
    pub(crate) fn remove(&mut self, kind: UnitKind, count: u8) -> u8 {
        let slot = match kind {
            UnitKind::Bot => &mut self.bots,
            UnitKind::Tank => &mut self.tanks,
        };
        let removed = count.min(*slot);
        *slot -= removed;
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_add_remove() {
        let mut stack = Stack::of(UnitKind::Tank, 3);
        assert_eq!(stack.get(UnitKind::Tank), 3);
        assert_eq!(stack.get(UnitKind::Bot), 0);

        stack.add(UnitKind::Tank, 2);
        assert_eq!(stack.total(), 5);

        assert_eq!(stack.remove(UnitKind::Tank, 7), 5);
        assert!(stack.is_empty());
        assert_eq!(stack.remove(UnitKind::Bot, 1), 0);
    }

    #[test]
    fn test_unit_kind_other() {
        assert_eq!(UnitKind::Bot.other(), UnitKind::Tank);
        assert_eq!(UnitKind::Tank.other(), UnitKind::Bot);
    }
}
