//! Game configuration.
//!
//! - `BoardConfig`: board dimensions, starting hexes, artefacts, initial units
//! - `RulesConfig`: unit cap, win score, turn limit and the rule variants
//! - `GameConfig`: both, validated together
//!
//! Defaults reproduce the standard Satellites setup. All types are serde
//! structs so a configuration can be stored next to a game record.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hex::{BoardLayout, HexCoord};
use super::player::{PlayerId, PlayerMap};
use super::unit::UnitKind;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid board dimensions: radius {radius}, top width {top_width}")]
    InvalidDimensions { radius: u8, top_width: u8 },

    #[error("cell ({row}, {col}) is not on the board")]
    CellOutOfBounds { row: u8, col: u8 },

    #[error("cell ({row}, {col}) is listed more than once")]
    DuplicateCell { row: u8, col: u8 },

    #[error("cell ({row}, {col}) holds conflicting setup: {reason}")]
    ConflictingSetup { row: u8, col: u8, reason: &'static str },

    #[error("{player} starts with {units} units, above the cap of {cap}")]
    InitialUnitsExceedCap { player: PlayerId, units: u32, cap: u8 },

    #[error("invalid rule `{field}`: {reason}")]
    InvalidRule { field: &'static str, reason: &'static str },
}

/// Order in which spread charges walk the ring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpreadDirection {
    /// Increasing slot index.
    #[default]
    Clockwise,
    /// Decreasing slot index.
    CounterClockwise,
}

/// How a tank shot compares stack sizes against an enemy tank stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TankDuel {
    /// Defender destroyed when `attacker >= defender`.
    #[default]
    AttackerWinsTies,
    /// Defender destroyed only when `attacker > defender`.
    StrictlyLarger,
}

impl TankDuel {
    #[must_use]
    pub const fn attacker_wins(self, attacker: u8, defender: u8) -> bool {
        match self {
            TankDuel::AttackerWinsTies => attacker >= defender,
            TankDuel::StrictlyLarger => attacker > defender,
        }
    }
}

/// Where ADD_BOT may place a bot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotPlacement {
    /// On an existing own bot stack, or an empty own starting hex.
    #[default]
    StartHexesOrOwnStacks,
    /// On any own bot stack or any empty hex that is not an opponent start.
    AnyEmptyOrOwnStack,
}

/// Numeric rule parameters and rule variants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Maximum units (bots + tanks) a player may have on the board.
    pub unit_cap: u8,

    /// Score that ends the game immediately.
    pub win_score: u16,

    /// The game ends when the first player's turn number `max_turns` ends
    /// (0 = no limit).
    pub max_turns: u32,

    pub tank_duel: TankDuel,

    pub bot_placement: BotPlacement,

    pub spread_direction: SpreadDirection,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            unit_cap: 20,
            win_score: 9,
            max_turns: 100,
            tank_duel: TankDuel::default(),
            bot_placement: BotPlacement::default(),
            spread_direction: SpreadDirection::default(),
        }
    }
}

impl RulesConfig {
    #[must_use]
    pub fn with_unit_cap(mut self, cap: u8) -> Self {
        self.unit_cap = cap;
        self
    }

    #[must_use]
    pub fn with_win_score(mut self, score: u16) -> Self {
        self.win_score = score;
        self
    }

    #[must_use]
    pub fn with_max_turns(mut self, turns: u32) -> Self {
        self.max_turns = turns;
        self
    }

    #[must_use]
    pub fn with_tank_duel(mut self, duel: TankDuel) -> Self {
        self.tank_duel = duel;
        self
    }

    #[must_use]
    pub fn with_bot_placement(mut self, placement: BotPlacement) -> Self {
        self.bot_placement = placement;
        self
    }

    #[must_use]
    pub fn with_spread_direction(mut self, direction: SpreadDirection) -> Self {
        self.spread_direction = direction;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit_cap == 0 {
            return Err(ConfigError::InvalidRule { field: "unit_cap", reason: "must be positive" });
        }
        if self.win_score == 0 {
            return Err(ConfigError::InvalidRule { field: "win_score", reason: "must be positive" });
        }
        Ok(())
    }
}

/// Units present on a cell when the game starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub player: PlayerId,
    pub coord: HexCoord,
    pub unit: UnitKind,
    pub count: u8,
}

impl Placement {
    #[must_use]
    pub const fn new(player: PlayerId, row: u8, col: u8, unit: UnitKind, count: u8) -> Self {
        Self { player, coord: HexCoord::new(row, col), unit, count }
    }
}

/// Board shape and starting setup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Rows above (and below) the middle row.
    pub radius: u8,

    /// Cells in the first and last rows.
    pub top_width: u8,

    /// Starting hexes per player.
    pub start_hexes: PlayerMap<Vec<HexCoord>>,

    /// Artefact cells at game start.
    pub artefacts: Vec<HexCoord>,

    /// Initial units.
    pub initial_units: Vec<Placement>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl BoardConfig {
    /// The standard 85-cell board.
    #[must_use]
    pub fn standard() -> Self {
        let p1 = PlayerId::FIRST;
        let p2 = PlayerId::SECOND;
        Self {
            radius: 4,
            top_width: 8,
            start_hexes: PlayerMap::from_array([
                vec![HexCoord::new(0, 3), HexCoord::new(0, 4)],
                vec![HexCoord::new(8, 3), HexCoord::new(8, 4)],
            ]),
            artefacts: vec![
                HexCoord::new(2, 1),
                HexCoord::new(2, 8),
                HexCoord::new(4, 4),
                HexCoord::new(4, 7),
                HexCoord::new(6, 1),
                HexCoord::new(6, 8),
            ],
            initial_units: vec![
                Placement::new(p1, 0, 3, UnitKind::Bot, 2),
                Placement::new(p1, 0, 4, UnitKind::Tank, 2),
                Placement::new(p2, 8, 3, UnitKind::Bot, 2),
                Placement::new(p2, 8, 4, UnitKind::Tank, 2),
            ],
        }
    }

    /// Same board and starting hexes with no artefacts and no units.
    /// Handy for building positions piece by piece.
    #[must_use]
    pub fn empty() -> Self {
        Self { artefacts: Vec::new(), initial_units: Vec::new(), ..Self::standard() }
    }

    #[must_use]
    pub fn with_artefacts(mut self, artefacts: Vec<HexCoord>) -> Self {
        self.artefacts = artefacts;
        self
    }

    #[must_use]
    pub fn with_units(mut self, units: Vec<Placement>) -> Self {
        self.initial_units = units;
        self
    }

    /// Check the setup against a laid-out board.
    pub fn validate(&self, layout: &BoardLayout, rules: &RulesConfig) -> Result<(), ConfigError> {
        let cells = layout.cell_count();
        let mut artefact = vec![false; cells];
        let mut owner: Vec<Option<(PlayerId, UnitKind)>> = vec![None; cells];
        let mut totals = PlayerMap::with_value(0u32);

        for &coord in &self.artefacts {
            let id = layout
                .cell_id(coord)
                .ok_or(ConfigError::CellOutOfBounds { row: coord.row, col: coord.col })?;
            if artefact[id.index()] {
                return Err(ConfigError::DuplicateCell { row: coord.row, col: coord.col });
            }
            if layout.start_owner(id).is_some() {
                return Err(ConfigError::ConflictingSetup {
                    row: coord.row,
                    col: coord.col,
                    reason: "artefact on a starting hex",
                });
            }
            artefact[id.index()] = true;
        }

        for placement in &self.initial_units {
            let HexCoord { row, col } = placement.coord;
            let id = layout
                .cell_id(placement.coord)
                .ok_or(ConfigError::CellOutOfBounds { row, col })?;
            if artefact[id.index()] {
                return Err(ConfigError::ConflictingSetup { row, col, reason: "units on an artefact" });
            }
            if layout.start_owner(id) == Some(placement.player.opponent()) {
                return Err(ConfigError::ConflictingSetup {
                    row,
                    col,
                    reason: "units on an opponent starting hex",
                });
            }
            match owner[id.index()] {
                Some((p, _)) if p != placement.player => {
                    return Err(ConfigError::ConflictingSetup { row, col, reason: "units of both players" });
                }
                Some((_, kind)) if kind != placement.unit => {
                    return Err(ConfigError::ConflictingSetup { row, col, reason: "mixed unit types" });
                }
                _ => owner[id.index()] = Some((placement.player, placement.unit)),
            }
            totals[placement.player] += u32::from(placement.count);
        }

        for (player, &units) in totals.iter() {
            if units > u32::from(rules.unit_cap) {
                return Err(ConfigError::InitialUnitsExceedCap { player, units, cap: rules.unit_cap });
            }
        }

        Ok(())
    }
}

/// Complete game configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub board: BoardConfig,
    pub rules: RulesConfig,
}

impl GameConfig {
    #[must_use]
    pub fn new(board: BoardConfig, rules: RulesConfig) -> Self {
        Self { board, rules }
    }

    #[must_use]
    pub fn with_rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_board(mut self, board: BoardConfig) -> Self {
        self.board = board;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> BoardLayout {
        BoardLayout::from_config(&BoardConfig::standard()).unwrap()
    }

    #[test]
    fn test_default_rules() {
        let rules = RulesConfig::default();
        assert_eq!(rules.unit_cap, 20);
        assert_eq!(rules.win_score, 9);
        assert_eq!(rules.max_turns, 100);
        assert_eq!(rules.tank_duel, TankDuel::AttackerWinsTies);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let rules = RulesConfig::default()
            .with_unit_cap(5)
            .with_win_score(3)
            .with_tank_duel(TankDuel::StrictlyLarger);
        assert_eq!(rules.unit_cap, 5);
        assert_eq!(rules.win_score, 3);
        assert!(!rules.tank_duel.attacker_wins(2, 2));
        assert!(TankDuel::AttackerWinsTies.attacker_wins(2, 2));
    }

    #[test]
    fn test_invalid_rules() {
        let rules = RulesConfig::default().with_unit_cap(0);
        assert!(matches!(rules.validate(), Err(ConfigError::InvalidRule { field: "unit_cap", .. })));
    }

    #[test]
    fn test_standard_board_validates() {
        let board = BoardConfig::standard();
        assert!(board.validate(&layout(), &RulesConfig::default()).is_ok());
    }

    #[test]
    fn test_units_on_artefact_rejected() {
        let board = BoardConfig::empty()
            .with_artefacts(vec![HexCoord::new(4, 4)])
            .with_units(vec![Placement::new(PlayerId::FIRST, 4, 4, UnitKind::Bot, 1)]);
        assert!(matches!(
            board.validate(&layout(), &RulesConfig::default()),
            Err(ConfigError::ConflictingSetup { .. })
        ));
    }

    #[test]
    fn test_units_above_cap_rejected() {
        let board = BoardConfig::empty()
            .with_units(vec![Placement::new(PlayerId::FIRST, 4, 4, UnitKind::Tank, 21)]);
        assert!(matches!(
            board.validate(&layout(), &RulesConfig::default()),
            Err(ConfigError::InitialUnitsExceedCap { units: 21, .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let board = BoardConfig::empty().with_artefacts(vec![HexCoord::new(0, 9)]);
        assert_eq!(
            board.validate(&layout(), &RulesConfig::default()),
            Err(ConfigError::CellOutOfBounds { row: 0, col: 9 })
        );
    }

    #[test]
    fn test_serialization() {
        let config = GameConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
