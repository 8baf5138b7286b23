//! Weighted heuristic evaluator.

use crate::core::{Action, ActionId, CellId, Direction, PlayerId, PlayerMap, SatelliteKind, Spend, State, UnitKind};
use crate::mcts::{Evaluation, Evaluator};
use crate::rules::{EngineError, SatellitesEngine};

use super::features::{BoardView, PositionFeatures, NO_BOTS};
use super::weights::HeuristicWeights;

/// Priors from a softmax over per-action scores, value from the position
/// evaluation difference.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeuristicEvaluator {
    weights: HeuristicWeights,
}

impl HeuristicEvaluator {
    pub fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut HeuristicWeights {
        &mut self.weights
    }

    fn kind_bonus(&self, kind: SatelliteKind) -> f64 {
        match kind {
            SatelliteKind::MoveBot => self.weights.sat_move_bot_bonus,
            SatelliteKind::MoveTank => self.weights.sat_move_tank_bonus,
            SatelliteKind::AddTank => self.weights.sat_add_tank_bonus,
            SatelliteKind::AddBot => self.weights.sat_add_bot_bonus,
        }
    }

    fn race_weight(&self, artefacts_remaining: u8) -> f64 {
        match artefacts_remaining {
            5.. => self.weights.race_early,
            3..=4 => self.weights.race_mid,
            _ => self.weights.race_late,
        }
    }

    /// How good `state` looks for `player`, in weight units. Only the
    /// player's own features count; compare two players by difference.
    #[must_use]
    pub fn evaluate_position(&self, engine: &SatellitesEngine, state: &State, player: PlayerId) -> f64 {
        let view = BoardView::new(engine.layout(), state);
        let win_score = engine.config().rules.win_score;
        let f = PositionFeatures::compute(&view, player, win_score, |kind| self.kind_bonus(kind));
        let w = &self.weights;

        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        w.score_diff * f.score
            + w.near_win * flag(f.near_win)
            + w.cap_next * f64::from(f.capture_next)
            + self.race_weight(state.artefacts_remaining()) * f.race
            - w.bot_tank_threat * f64::from(f.threatened_bots)
            + w.tank_dominance * f64::from(f.tanks)
            + w.tanks_near_artefact * f64::from(f.tanks_near_artefact)
            + w.eval_safe_bot_near_artefact * f64::from(f.safe_bots_near_artefact)
            + w.lane_block * f64::from(f.lane_blocks)
            + w.sat_charge * f.tempo
            + w.gifted_power_turn * flag(f.power_turn)
    }

    /// Value in `[-1, 1]` per player.
    #[must_use]
    pub fn value(&self, engine: &SatellitesEngine, state: &State) -> PlayerMap<f64> {
        if let Some(outcome) = state.outcome() {
            return outcome.result.returns();
        }
        let diff = self.evaluate_position(engine, state, PlayerId::FIRST)
            - self.evaluate_position(engine, state, PlayerId::SECOND);
        let scale = if self.weights.value_scale > 0.0 { self.weights.value_scale } else { 1.0 };
        let v = (diff / scale).tanh();
        PlayerMap::from_array([v, -v])
    }

    /// Preference for `action` by the player to move. Higher is better; the
    /// scale is the per-action weights'.
    #[must_use]
    pub fn score_action(&self, engine: &SatellitesEngine, state: &State, action: &Action) -> f64 {
        let view = BoardView::new(engine.layout(), state);
        let player = state.active_player();
        let selected = state
            .turn()
            .selected_satellite()
            .and_then(|slot| state.ring().get(slot))
            .map(|sat| sat.kind);

        match *action {
            Action::SelectSatellite { slot, charges } => state
                .ring()
                .get(usize::from(slot))
                .map_or(0.0, |sat| f64::from(charges) * self.kind_bonus(sat.kind)),
            Action::SelectDirection(dir) => selected
                .map_or(0.0, |kind| self.score_direction(engine, &view, player, kind.unit(), dir)),
            Action::Spend(spend) => match (spend, state.turn().selected_direction()) {
                (Spend::MoveOneStep { from, count }, Some(dir)) => {
                    let unit = selected.map_or(UnitKind::Bot, SatelliteKind::unit);
                    engine
                        .layout()
                        .neighbor(from, dir)
                        .map_or(0.0, |dest| self.score_move(engine, &view, player, unit, from, dest, count))
                }
                (Spend::TankShoot(target), Some(dir)) => engine
                    .layout()
                    .neighbor(target, dir.opposite())
                    .map_or(0.0, |firing| self.score_shot(engine, &view, player, firing, target)),
                (Spend::AddTank(cell), _) => self.score_add_tank(&view, player, cell),
                (Spend::AddBot(cell), _) => self.score_add_bot(&view, player, cell),
                _ => 0.0,
            },
        }
    }

    /// Best spend available after picking `dir`.
    fn score_direction(
        &self,
        engine: &SatellitesEngine,
        view: &BoardView<'_>,
        player: PlayerId,
        unit: UnitKind,
        dir: Direction,
    ) -> f64 {
        let state = view.state();
        let enemy = player.opponent();
        let mut best = f64::NEG_INFINITY;

        for (from, cell) in state.cells() {
            let count = cell.units(player).get(unit);
            if count == 0 {
                continue;
            }
            let Some(dest) = view.layout().neighbor(from, dir) else {
                continue;
            };
            let target = state.cell(dest);
            if target.occupied_by(enemy) {
                if unit == UnitKind::Tank {
                    best = best.max(self.score_shot(engine, view, player, from, dest));
                }
            } else if !(unit == UnitKind::Tank && target.has_artefact()) {
                best = best.max(self.score_move(engine, view, player, unit, from, dest, count));
            }
        }

        if best.is_finite() {
            best
        } else {
            0.0
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn score_move(
        &self,
        engine: &SatellitesEngine,
        view: &BoardView<'_>,
        player: PlayerId,
        unit: UnitKind,
        from: CellId,
        dest: CellId,
        count: u8,
    ) -> f64 {
        let w = &self.weights;
        let n = f64::from(count);
        let near_dest = view.nearest_artefact(dest);

        match unit {
            UnitKind::Bot => {
                let mut score = 0.0;
                if view.state().cell(dest).has_artefact() {
                    score += w.move_bot_capture * (1.0 + w.move_bot_capture_stack_scale * (n - 1.0));
                }
                if let (Some(before), Some(after)) = (view.nearest_artefact(from), near_dest) {
                    score += w.move_bot_dist_delta * (f64::from(before) - f64::from(after)) * n;
                }
                if view.is_threatened(player, dest) {
                    score -= w.move_bot_tank_threat_penalty * n;
                } else if near_dest == Some(1) {
                    score += w.move_bot_safe_approach;
                }
                score
            }
            UnitKind::Tank => {
                let duel = engine.config().rules.tank_duel;
                let mut score = w.move_tank_adj_enemy_bot * f64::from(view.adjacent_enemy_bot_stacks(player, dest));
                for theirs in view.adjacent_enemy_tank_stacks(player, dest) {
                    if duel.attacker_wins(count, theirs) {
                        score += w.move_tank_vs_tank_win;
                    } else {
                        score -= w.move_tank_vs_tank_lose;
                    }
                }
                if near_dest.is_some_and(|d| d <= 2) {
                    score += w.move_tank_near_artefact;
                }
                score
            }
        }
    }

    fn score_shot(
        &self,
        engine: &SatellitesEngine,
        view: &BoardView<'_>,
        player: PlayerId,
        firing: CellId,
        target: CellId,
    ) -> f64 {
        let state = view.state();
        let attackers = state.cell(firing).units(player).tanks;
        let defenders = state.cell(target).units(player.opponent());
        let mut score = self.weights.shoot_enemy_bot * f64::from(defenders.bots);
        if defenders.tanks > 0 && engine.config().rules.tank_duel.attacker_wins(attackers, defenders.tanks) {
            score += self.weights.shoot_enemy_tank * f64::from(defenders.tanks);
        }
        score
    }

    fn score_add_tank(&self, view: &BoardView<'_>, player: PlayerId, cell: CellId) -> f64 {
        let w = &self.weights;
        let mut score = w.add_tank_near_enemy_bot * f64::from(view.adjacent_enemy_bot_stacks(player, cell));
        if view.nearest_artefact(cell).is_some_and(|d| d <= 2) {
            score += w.add_tank_near_artefact;
        }
        score
    }

    fn score_add_bot(&self, view: &BoardView<'_>, player: PlayerId, cell: CellId) -> f64 {
        let w = &self.weights;
        let current = view.best_bot_approach(player);
        let mut score = 0.0;

        if let Some(d) = view.nearest_artefact(cell) {
            if current == NO_BOTS || d < current {
                score += w.add_bot_dist_gain * f64::from(current.min(d + 3) - d);
            }
            if d == 1 && view.state().cell(cell).units(player).bots > 0 {
                score += w.add_bot_stack_near_artefact;
            }
        }
        if view.is_threatened(player, cell) {
            score -= w.add_bot_tank_threat_penalty;
        }
        score
    }

    /// Softmax of action scores at `prior_temperature`, aligned with
    /// `legal`.
    pub fn priors(&self, engine: &SatellitesEngine, state: &State, legal: &[ActionId]) -> Result<Vec<f32>, EngineError> {
        let scores = legal
            .iter()
            .map(|&id| {
                let action = engine.codec().decode(id)?;
                Ok(self.score_action(engine, state, &action))
            })
            .collect::<Result<Vec<f64>, EngineError>>()?;

        let temperature = self.weights.prior_temperature.max(1e-3);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| ((s - max) / temperature).exp()).collect();
        let sum: f64 = exps.iter().sum();
        if sum > 0.0 && sum.is_finite() {
            Ok(exps.into_iter().map(|e| (e / sum) as f32).collect())
        } else {
            Ok(Evaluation::uniform(legal.len(), PlayerMap::with_value(0.0)).priors)
        }
    }
}

impl Evaluator<SatellitesEngine> for HeuristicEvaluator {
    fn evaluate(&self, engine: &SatellitesEngine, state: &State, legal: &[ActionId]) -> Result<Evaluation, EngineError> {
        Ok(Evaluation {
            priors: self.priors(engine, state, legal)?,
            value: self.value(engine, state),
        })
    }
}
