//! Hex board geometry.
//!
//! ## Layout
//!
//! The board is a hexagon of `2R + 1` rows. Row `r` holds
//! `top_width + min(r, 2R - r)` cells, so the standard board (`R = 4`,
//! `top_width = 8`) has rows of 8, 9, 10, 11, 12, 11, 10, 9, 8 cells.
//!
//! Cells are addressed three ways:
//!
//! - `CellId`: dense row-major index, used everywhere on the hot path
//! - `HexCoord`: `(row, col)` as printed on the board
//! - axial `(q, r)` with `q = col - min(row, R)`, used for directions and
//!   distance
//!
//! ## Directions
//!
//! The six axial steps, in ring order:
//!
//! | Direction | dq | dr |
//! |-----------|----|----|
//! | East      | +1 |  0 |
//! | NorthEast | +1 | -1 |
//! | NorthWest |  0 | -1 |
//! | West      | -1 |  0 |
//! | SouthWest | -1 | +1 |
//! | SouthEast |  0 | +1 |
//!
//! `d.opposite()` is `d` rotated by three steps.

use serde::{Deserialize, Serialize};

use super::config::{BoardConfig, ConfigError};
use super::player::{PlayerId, PlayerMap};

/// Dense cell index, row-major from the top-left cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u16);

impl CellId {
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cell({})", self.0)
    }
}

/// Human-facing `(row, col)` coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub row: u8,
    pub col: u8,
}

impl HexCoord {
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the six hex directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl Direction {
    /// All directions in ring order.
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::West,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::ALL[(self as usize + 3) % 6]
    }

    /// Axial `(dq, dr)` step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (0, -1),
            Direction::West => (-1, 0),
            Direction::SouthWest => (-1, 1),
            Direction::SouthEast => (0, 1),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::East => "E",
            Direction::NorthEast => "NE",
            Direction::NorthWest => "NW",
            Direction::West => "W",
            Direction::SouthWest => "SW",
            Direction::SouthEast => "SE",
        };
        f.write_str(name)
    }
}

/// Precomputed board geometry: cell coordinates, the neighbour table and the
/// starting-hex ownership of every cell.
///
/// Built once per engine and shared read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardLayout {
    radius: u8,
    top_width: u8,
    row_offsets: Vec<u16>,
    coords: Vec<HexCoord>,
    neighbors: Vec<[Option<CellId>; 6]>,
    start_owner: Vec<Option<PlayerId>>,
    start_hexes: PlayerMap<Vec<CellId>>,
}

impl BoardLayout {
    /// Build the layout described by a board configuration.
    pub fn from_config(config: &BoardConfig) -> Result<Self, ConfigError> {
        let mut layout = Self::geometry(config.radius, config.top_width)?;

        for (player, hexes) in config.start_hexes.iter() {
            for &coord in hexes {
                let id = layout
                    .cell_id(coord)
                    .ok_or(ConfigError::CellOutOfBounds { row: coord.row, col: coord.col })?;
                if layout.start_owner[id.index()].is_some() {
                    return Err(ConfigError::DuplicateCell { row: coord.row, col: coord.col });
                }
                layout.start_owner[id.index()] = Some(player);
                layout.start_hexes[player].push(id);
            }
        }

        Ok(layout)
    }

    /// Pure geometry with no starting hexes.
    pub fn geometry(radius: u8, top_width: u8) -> Result<Self, ConfigError> {
        if radius == 0 || top_width == 0 || u32::from(top_width) + u32::from(radius) > 64 {
            return Err(ConfigError::InvalidDimensions { radius, top_width });
        }

        let rows = 2 * usize::from(radius) + 1;
        let mut row_offsets = Vec::with_capacity(rows + 1);
        let mut coords = Vec::new();
        row_offsets.push(0u16);
        for row in 0..rows {
            let width = Self::width_of(radius, top_width, row);
            for col in 0..width {
                coords.push(HexCoord::new(row as u8, col as u8));
            }
            row_offsets.push(coords.len() as u16);
        }

        let cell_count = coords.len();
        let mut layout = Self {
            radius,
            top_width,
            row_offsets,
            coords,
            neighbors: vec![[None; 6]; cell_count],
            start_owner: vec![None; cell_count],
            start_hexes: PlayerMap::default(),
        };

        for index in 0..cell_count {
            let (q, r) = layout.axial(CellId(index as u16));
            for dir in Direction::ALL {
                let (dq, dr) = dir.delta();
                layout.neighbors[index][dir.index()] = layout.from_axial(q + dq, r + dr);
            }
        }

        Ok(layout)
    }

    fn width_of(radius: u8, top_width: u8, row: usize) -> usize {
        let r = usize::from(radius);
        usize::from(top_width) + row.min(2 * r - row)
    }

    #[must_use]
    pub fn radius(&self) -> u8 {
        self.radius
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.row_offsets.len() - 1
    }

    /// Width of the widest (middle) row.
    #[must_use]
    pub fn max_width(&self) -> usize {
        usize::from(self.top_width) + usize::from(self.radius)
    }

    #[must_use]
    pub fn row_width(&self, row: usize) -> usize {
        Self::width_of(self.radius, self.top_width, row)
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.coords.len()
    }

    /// Iterate over every cell id.
    pub fn cells(&self) -> impl Iterator<Item = CellId> {
        (0..self.coords.len() as u16).map(CellId)
    }

    #[must_use]
    pub fn cell_id(&self, coord: HexCoord) -> Option<CellId> {
        let row = usize::from(coord.row);
        if row >= self.rows() || usize::from(coord.col) >= self.row_width(row) {
            return None;
        }
        Some(CellId(self.row_offsets[row] + u16::from(coord.col)))
    }

    /// # Panics
    ///
    /// Panics if `id` is not a cell of this board.
    #[must_use]
    pub fn coord(&self, id: CellId) -> HexCoord {
        self.coords[id.index()]
    }

    /// Axial `(q, r)` of a cell.
    #[must_use]
    pub fn axial(&self, id: CellId) -> (i32, i32) {
        let HexCoord { row, col } = self.coord(id);
        let shift = row.min(self.radius);
        (i32::from(col) - i32::from(shift), i32::from(row))
    }

    fn from_axial(&self, q: i32, r: i32) -> Option<CellId> {
        if r < 0 || r as usize >= self.rows() {
            return None;
        }
        let col = q + r.min(i32::from(self.radius));
        if col < 0 || col as usize >= self.row_width(r as usize) {
            return None;
        }
        Some(CellId(self.row_offsets[r as usize] + col as u16))
    }

    /// The adjacent cell in a direction, if it is on the board.
    #[inline]
    #[must_use]
    pub fn neighbor(&self, id: CellId, dir: Direction) -> Option<CellId> {
        self.neighbors[id.index()][dir.index()]
    }

    /// All on-board neighbours of a cell.
    pub fn neighbors(&self, id: CellId) -> impl Iterator<Item = CellId> + '_ {
        self.neighbors[id.index()].iter().flatten().copied()
    }

    /// Hex (axial) distance between two cells.
    #[must_use]
    pub fn distance(&self, a: CellId, b: CellId) -> u32 {
        let (aq, ar) = self.axial(a);
        let (bq, br) = self.axial(b);
        let dq = aq - bq;
        let dr = ar - br;
        ((dq.abs() + dr.abs() + (dq + dr).abs()) / 2) as u32
    }

    /// The player whose starting hex this is, if any.
    #[inline]
    #[must_use]
    pub fn start_owner(&self, id: CellId) -> Option<PlayerId> {
        self.start_owner[id.index()]
    }

    /// Starting hexes of a player.
    #[must_use]
    pub fn start_hexes(&self, player: PlayerId) -> &[CellId] {
        &self.start_hexes[player]
    }
}
