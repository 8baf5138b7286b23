//! Observation encoding for neural network input.
//!
//! ## Layout
//!
//! `SatellitesEncoder` produces `[PLANES, rows, max_width]` planes. Cell
//! `(row, col)` of the board lands at `[_, row, col]`, so rows narrower than
//! `max_width` leave their tail columns zero. Global features are broadcast
//! over on-board positions only.
//!
//! | Planes  | Contents                                                 |
//! |---------|----------------------------------------------------------|
//! | 0-3     | P1 bots, P1 tanks, P2 bots, P2 tanks (count / unit cap)  |
//! | 4       | artefact                                                 |
//! | 5-6     | P1, P2 starting hexes                                    |
//! | 7       | on-board mask                                            |
//! | 8-37    | per slot: kind one-hot (4) + charge / total charge       |
//! | 38-39   | P1, P2 score / win score                                 |
//! | 40      | active player (1 when P2)                                |
//! | 41-45   | phase one-hot                                            |
//! | 46-52   | selected slot one-hot, 52 = none                         |
//! | 53-59   | selected direction one-hot, 59 = none                    |
//! | 60      | charges remaining / total charge                         |
//! | 61      | turn number / max turns                                  |

use std::sync::Arc;

use crate::core::{
    BoardLayout, CellId, Direction, PlayerId, RulesConfig, SatelliteKind, SatelliteRing, State,
    RING_SIZE,
};
use crate::nn::traits::EncodedState;

/// Encodes a game state into a fixed-shape tensor.
pub trait StateEncoder<S>: Send + Sync {
    fn encode(&self, state: &S) -> EncodedState;

    fn output_shape(&self) -> Vec<usize>;

    /// Length of the policy vector paired with this encoding.
    fn action_space_size(&self) -> usize;
}

const UNIT_PLANES: usize = 0;
const ARTEFACT_PLANE: usize = 4;
const START_PLANES: usize = 5;
const BOARD_PLANE: usize = 7;
const RING_PLANES: usize = 8;
const PLANES_PER_SLOT: usize = 5;
const SCORE_PLANES: usize = RING_PLANES + RING_SIZE * PLANES_PER_SLOT;
const ACTIVE_PLANE: usize = SCORE_PLANES + 2;
const PHASE_PLANES: usize = ACTIVE_PLANE + 1;
const SLOT_PLANES: usize = PHASE_PLANES + 5;
const DIRECTION_PLANES: usize = SLOT_PLANES + RING_SIZE + 1;
const REMAINING_PLANE: usize = DIRECTION_PLANES + 6 + 1;
const TURN_PLANE: usize = REMAINING_PLANE + 1;

/// Number of observation planes.
pub const PLANES: usize = TURN_PLANE + 1;

/// The standard Satellites observation encoder.
#[derive(Clone, Debug)]
pub struct SatellitesEncoder {
    layout: Arc<BoardLayout>,
    unit_cap: f32,
    win_score: f32,
    max_turns: f32,
    total_charge: f32,
    action_space: usize,
}

impl SatellitesEncoder {
    pub fn new(layout: Arc<BoardLayout>, rules: &RulesConfig, action_space: usize) -> Self {
        let total_charge = SatelliteRing::from_kinds(SatelliteRing::CANONICAL).total_charge();
        Self {
            layout,
            unit_cap: f32::from(rules.unit_cap),
            win_score: f32::from(rules.win_score),
            max_turns: rules.max_turns as f32,
            total_charge: total_charge as f32,
            action_space,
        }
    }

    fn plane_size(&self) -> usize {
        self.layout.rows() * self.layout.max_width()
    }

    fn offset(&self, plane: usize, cell: CellId) -> usize {
        let coord = self.layout.coord(cell);
        plane * self.plane_size() + usize::from(coord.row) * self.layout.max_width() + usize::from(coord.col)
    }

    /// Write `value` on every on-board position of `plane`.
    fn broadcast(&self, tensor: &mut [f32], plane: usize, value: f32) {
        if value == 0.0 {
            return;
        }
        for cell in self.layout.cells() {
            tensor[self.offset(plane, cell)] = value;
        }
    }

    fn ratio(value: f32, scale: f32) -> f32 {
        if scale > 0.0 {
            value / scale
        } else {
            0.0
        }
    }
}

impl StateEncoder<State> for SatellitesEncoder {
    fn encode(&self, state: &State) -> EncodedState {
        let mut tensor = vec![0.0f32; PLANES * self.plane_size()];

        for (id, cell) in state.cells() {
            for player in PlayerId::both() {
                let stack = cell.units(player);
                let base = UNIT_PLANES + player.index() * 2;
                tensor[self.offset(base, id)] = f32::from(stack.bots) / self.unit_cap;
                tensor[self.offset(base + 1, id)] = f32::from(stack.tanks) / self.unit_cap;
            }
            if cell.has_artefact() {
                tensor[self.offset(ARTEFACT_PLANE, id)] = 1.0;
            }
            if let Some(owner) = self.layout.start_owner(id) {
                tensor[self.offset(START_PLANES + owner.index(), id)] = 1.0;
            }
            tensor[self.offset(BOARD_PLANE, id)] = 1.0;
        }

        for (slot, sat) in state.ring().slots().iter().enumerate() {
            let base = RING_PLANES + slot * PLANES_PER_SLOT;
            self.broadcast(&mut tensor, base + sat.kind.index(), 1.0);
            let charge = Self::ratio(f32::from(sat.charge), self.total_charge);
            self.broadcast(&mut tensor, base + SatelliteKind::ALL.len(), charge);
        }

        for player in PlayerId::both() {
            let score = Self::ratio(f32::from(state.score(player)), self.win_score);
            self.broadcast(&mut tensor, SCORE_PLANES + player.index(), score);
        }

        let turn = state.turn();
        if turn.active_player() == PlayerId::SECOND {
            self.broadcast(&mut tensor, ACTIVE_PLANE, 1.0);
        }
        self.broadcast(&mut tensor, PHASE_PLANES + turn.phase().index(), 1.0);
        let slot = turn.selected_satellite().unwrap_or(RING_SIZE);
        self.broadcast(&mut tensor, SLOT_PLANES + slot, 1.0);
        let dir = turn.selected_direction().map_or(Direction::ALL.len(), Direction::index);
        self.broadcast(&mut tensor, DIRECTION_PLANES + dir, 1.0);

        let remaining = Self::ratio(f32::from(turn.charges_remaining()), self.total_charge);
        self.broadcast(&mut tensor, REMAINING_PLANE, remaining);
        let progress = Self::ratio(turn.turn_number() as f32, self.max_turns);
        self.broadcast(&mut tensor, TURN_PLANE, progress);

        EncodedState::new(tensor, self.output_shape())
    }

    fn output_shape(&self) -> Vec<usize> {
        vec![PLANES, self.layout.rows(), self.layout.max_width()]
    }

    fn action_space_size(&self) -> usize {
        self.action_space
    }
}
