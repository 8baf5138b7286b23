//! Board features the heuristic evaluator is built from.
//!
//! `BoardView` answers geometric questions about one state (distances to
//! artefacts, tank threats, adjacency) and `PositionFeatures` collects the
//! per-player counts that `HeuristicEvaluator::evaluate_position` weighs.

use smallvec::SmallVec;

use crate::core::{BoardLayout, CellId, Phase, PlayerId, SatelliteKind, State};

/// Distance used when a player has no bots at all.
pub const NO_BOTS: u32 = 99;

/// A state seen through its board layout.
#[derive(Clone, Debug)]
pub struct BoardView<'a> {
    layout: &'a BoardLayout,
    state: &'a State,
    artefacts: SmallVec<[CellId; 8]>,
}

impl<'a> BoardView<'a> {
    pub fn new(layout: &'a BoardLayout, state: &'a State) -> Self {
        let artefacts = state
            .cells()
            .filter(|(_, cell)| cell.has_artefact())
            .map(|(id, _)| id)
            .collect();
        Self { layout, state, artefacts }
    }

    #[must_use]
    pub fn layout(&self) -> &'a BoardLayout {
        self.layout
    }

    #[must_use]
    pub fn state(&self) -> &'a State {
        self.state
    }

    /// Cells still holding an artefact.
    #[must_use]
    pub fn artefacts(&self) -> &[CellId] {
        &self.artefacts
    }

    /// Distance from `cell` to the closest artefact, `None` if none are left.
    #[must_use]
    pub fn nearest_artefact(&self, cell: CellId) -> Option<u32> {
        self.artefacts.iter().map(|&a| self.layout.distance(cell, a)).min()
    }

    /// Distance from `player`'s closest bot stack to `target`.
    #[must_use]
    pub fn min_bot_distance(&self, player: PlayerId, target: CellId) -> u32 {
        self.state
            .cells()
            .filter(|(_, cell)| cell.units(player).bots > 0)
            .map(|(id, _)| self.layout.distance(id, target))
            .min()
            .unwrap_or(NO_BOTS)
    }

    /// Closest approach of any of `player`'s bot stacks to any artefact.
    #[must_use]
    pub fn best_bot_approach(&self, player: PlayerId) -> u32 {
        self.state
            .cells()
            .filter(|(_, cell)| cell.units(player).bots > 0)
            .filter_map(|(id, _)| self.nearest_artefact(id))
            .min()
            .unwrap_or(NO_BOTS)
    }

    /// Enemy tanks (summed over stacks) next to `cell`.
    #[must_use]
    pub fn adjacent_enemy_tanks(&self, player: PlayerId, cell: CellId) -> u32 {
        let enemy = player.opponent();
        self.layout
            .neighbors(cell)
            .map(|n| u32::from(self.state.cell(n).units(enemy).tanks))
            .sum()
    }

    /// Enemy tank stack sizes next to `cell`.
    pub fn adjacent_enemy_tank_stacks(&self, player: PlayerId, cell: CellId) -> impl Iterator<Item = u8> + '_ {
        let enemy = player.opponent();
        self.layout
            .neighbors(cell)
            .map(move |n| self.state.cell(n).units(enemy).tanks)
            .filter(|&t| t > 0)
    }

    /// Enemy bot stacks next to `cell` that could be shot from it.
    #[must_use]
    pub fn adjacent_enemy_bot_stacks(&self, player: PlayerId, cell: CellId) -> u32 {
        let enemy = player.opponent();
        self.layout
            .neighbors(cell)
            .filter(|&n| self.layout.start_owner(n) != Some(enemy))
            .filter(|&n| self.state.cell(n).units(enemy).bots > 0)
            .count() as u32
    }

    /// Could `player`'s units on `cell` be shot next turn? Units on their
    /// owner's starting hexes never can.
    #[must_use]
    pub fn is_threatened(&self, player: PlayerId, cell: CellId) -> bool {
        self.layout.start_owner(cell) != Some(player) && self.adjacent_enemy_tanks(player, cell) > 0
    }
}

/// Raw per-player counts. Weighting happens in the evaluator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PositionFeatures {
    pub score: f64,
    /// Within two points of the win score.
    pub near_win: bool,
    /// Artefacts an own bot stack is adjacent to.
    pub capture_next: u32,
    /// Sum over artefacts of the distance lead of the closest own bot,
    /// clamped to `[-1, 1]` per artefact.
    pub race: f64,
    /// Own bots standing next to enemy tanks.
    pub threatened_bots: u32,
    pub tanks: u32,
    /// Own tank stacks within two steps of an artefact.
    pub tanks_near_artefact: u32,
    /// Own bot stacks next to an artefact and not threatened.
    pub safe_bots_near_artefact: u32,
    /// Enemy bot stacks near an artefact with an own tank stack beside them.
    pub lane_blocks: u32,
    /// Charges the player can act with right now, weighted by satellite kind.
    pub tempo: f64,
    /// The player is about to select and some satellite holds four or more
    /// charges.
    pub power_turn: bool,
}

impl PositionFeatures {
    /// Features of `player`. `kind_bonus` weights a charge of each satellite
    /// kind for the tempo term.
    pub fn compute(
        view: &BoardView<'_>,
        player: PlayerId,
        win_score: u16,
        kind_bonus: impl Fn(SatelliteKind) -> f64,
    ) -> Self {
        let state = view.state();
        let layout = view.layout();
        let enemy = player.opponent();
        let mut features = Self {
            score: f64::from(state.score(player)),
            near_win: state.score(player).saturating_add(2) >= win_score,
            ..Self::default()
        };

        for &artefact in view.artefacts() {
            let own = view.min_bot_distance(player, artefact);
            let theirs = view.min_bot_distance(enemy, artefact);
            if own == 1 {
                features.capture_next += 1;
            }
            if own != NO_BOTS || theirs != NO_BOTS {
                let lead = (f64::from(theirs.min(NO_BOTS)) - f64::from(own.min(NO_BOTS))) / 3.0;
                features.race += lead.clamp(-1.0, 1.0);
            }
        }

        for (id, cell) in state.cells() {
            let units = cell.units(player);
            if units.bots > 0 {
                let threatened = view.is_threatened(player, id);
                if threatened {
                    features.threatened_bots += u32::from(units.bots);
                } else if view.nearest_artefact(id) == Some(1) {
                    features.safe_bots_near_artefact += 1;
                }
            }
            if units.tanks > 0 {
                features.tanks += u32::from(units.tanks);
                if view.nearest_artefact(id).is_some_and(|d| d <= 2) {
                    features.tanks_near_artefact += 1;
                }
                features.lane_blocks += layout
                    .neighbors(id)
                    .filter(|&n| state.cell(n).units(enemy).bots > 0)
                    .filter(|&n| view.nearest_artefact(n).is_some_and(|d| d <= 2))
                    .count() as u32;
            }
        }

        if state.active_player() == player {
            let ring = state.ring();
            match state.phase() {
                Phase::SelectSatellite => {
                    features.tempo = ring
                        .slots()
                        .iter()
                        .map(|sat| f64::from(sat.charge) * kind_bonus(sat.kind))
                        .fold(0.0, f64::max);
                    features.power_turn = ring.slots().iter().any(|sat| sat.charge >= 4);
                }
                Phase::SelectDirection | Phase::SpendCharge => {
                    let kind = state.turn().selected_satellite().and_then(|slot| ring.get(slot));
                    let charges = state.charges_remaining().max(state.turn().committed_charges());
                    if let Some(sat) = kind {
                        features.tempo = f64::from(charges) * kind_bonus(sat.kind);
                    }
                }
                Phase::AutomaticSpread | Phase::Terminal => {}
            }
        }

        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoardConfig, GameConfig, HexCoord, Placement, RulesConfig, UnitKind};
    use crate::rules::SatellitesEngine;

    const P1: PlayerId = PlayerId::FIRST;
    const P2: PlayerId = PlayerId::SECOND;

    fn engine(units: Vec<Placement>, artefacts: Vec<HexCoord>) -> SatellitesEngine {
        let board = BoardConfig::empty().with_units(units).with_artefacts(artefacts);
        SatellitesEngine::new(GameConfig::new(board, RulesConfig::default())).unwrap()
    }

    fn at(engine: &SatellitesEngine, row: u8, col: u8) -> CellId {
        engine.layout().cell_id(HexCoord::new(row, col)).unwrap()
    }

    #[test]
    fn test_distances() {
        let engine = engine(
            vec![Placement::new(P1, 3, 3, UnitKind::Bot, 2)],
            vec![HexCoord::new(4, 4), HexCoord::new(6, 8)],
        );
        let state = engine.new_game(1);
        let view = BoardView::new(engine.layout(), &state);

        assert_eq!(view.artefacts().len(), 2);
        assert_eq!(view.nearest_artefact(at(&engine, 3, 3)), Some(1));
        assert_eq!(view.min_bot_distance(P1, at(&engine, 4, 4)), 1);
        assert_eq!(view.min_bot_distance(P2, at(&engine, 4, 4)), NO_BOTS);
        assert_eq!(view.best_bot_approach(P1), 1);
    }

    #[test]
    fn test_no_artefacts() {
        let engine = engine(vec![Placement::new(P1, 3, 3, UnitKind::Bot, 1)], vec![]);
        let state = engine.new_game(1);
        let view = BoardView::new(engine.layout(), &state);
        assert_eq!(view.nearest_artefact(at(&engine, 3, 3)), None);
        assert_eq!(view.best_bot_approach(P1), NO_BOTS);
    }

    #[test]
    fn test_threats() {
        let engine = engine(
            vec![
                Placement::new(P1, 4, 4, UnitKind::Bot, 3),
                Placement::new(P2, 4, 5, UnitKind::Tank, 2),
                Placement::new(P1, 0, 3, UnitKind::Bot, 1),
                Placement::new(P2, 1, 3, UnitKind::Tank, 1),
            ],
            vec![HexCoord::new(6, 1)],
        );
        let state = engine.new_game(1);
        let view = BoardView::new(engine.layout(), &state);

        assert_eq!(view.adjacent_enemy_tanks(P1, at(&engine, 4, 4)), 2);
        assert!(view.is_threatened(P1, at(&engine, 4, 4)));
        // Own starting hex.
        assert!(!view.is_threatened(P1, at(&engine, 0, 3)));
        assert_eq!(view.adjacent_enemy_bot_stacks(P2, at(&engine, 4, 5)), 1);
        assert_eq!(view.adjacent_enemy_tank_stacks(P1, at(&engine, 4, 4)).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_position_features() {
        let engine = engine(
            vec![
                Placement::new(P1, 3, 3, UnitKind::Bot, 2),
                Placement::new(P1, 5, 3, UnitKind::Tank, 1),
                Placement::new(P2, 5, 2, UnitKind::Bot, 1),
            ],
            vec![HexCoord::new(4, 4), HexCoord::new(6, 1)],
        );
        let state = engine.new_game(1);
        let view = BoardView::new(engine.layout(), &state);
        let p1 = PositionFeatures::compute(&view, P1, 9, |_| 1.0);
        let p2 = PositionFeatures::compute(&view, P2, 9, |_| 1.0);

        assert_eq!(p1.capture_next, 1);
        assert_eq!(p1.safe_bots_near_artefact, 1);
        assert_eq!(p1.threatened_bots, 0);
        assert_eq!(p1.tanks, 1);
        assert_eq!(p1.tanks_near_artefact, 1);
        assert_eq!(p1.lane_blocks, 1);
        assert_eq!(p2.threatened_bots, 1);
        assert!(!p1.near_win);

        // P1 to move at the opening: tempo is the best satellite's charge.
        assert_eq!(p1.tempo, 2.0);
        assert_eq!(p2.tempo, 0.0);
        assert!(!p1.power_turn);
    }

    #[test]
    fn test_race_is_antisymmetric() {
        let engine = engine(
            vec![
                Placement::new(P1, 2, 3, UnitKind::Bot, 1),
                Placement::new(P2, 6, 3, UnitKind::Bot, 1),
            ],
            vec![HexCoord::new(2, 1), HexCoord::new(6, 8)],
        );
        let state = engine.new_game(1);
        let view = BoardView::new(engine.layout(), &state);
        let p1 = PositionFeatures::compute(&view, P1, 9, |_| 1.0);
        let p2 = PositionFeatures::compute(&view, P2, 9, |_| 1.0);
        assert!((p1.race + p2.race).abs() < 1e-12);
    }
}
