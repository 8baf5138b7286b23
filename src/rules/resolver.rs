//! Rule resolution: the only code that mutates a `State`.
//!
//! ## Turn flow
//!
//! 1. `SelectSatellite`: take `k` charges from a slot.
//! 2. `SelectDirection` (movement satellites only).
//! 3. `SpendCharge`: one effect per action, `k` times at most.
//! 4. `AutomaticSpread`: the `k` committed charges go back to the ring, one
//!    per slot, starting after the selected slot. The turn passes.
//!
//! Whenever a selection or a spend leaves the player with nothing legal to
//! spend, the remaining charges are forfeited and the spread runs at once,
//! so callers never see a phase with no legal action.
//!
//! ## Termination
//!
//! Checked after every step:
//!
//! - a player at `win_score` or above wins
//! - capturing the last artefact ends the game; higher score wins, ties go
//!   to the capturing player
//! - a turn of the first player ending while `turn_number >= max_turns` is
//!   the last one: higher score wins, ties are a draw

use crate::core::{
    Action, ActionId, CellId, Direction, EndReason, GameOutcome, GameResult, Phase, PlayerId, Spend,
    State, UnitKind,
};

use super::error::EngineError;
use super::satellites::SatellitesEngine;

impl SatellitesEngine {
    /// Apply one action id.
    ///
    /// Fails with `GameAlreadyOver` on terminal states, `InvalidActionId` for
    /// ids outside the action space and `IllegalAction` for ids not in the
    /// legal mask. The input state is never modified.
    pub fn apply_action(&self, state: &State, id: ActionId) -> Result<State, EngineError> {
        if state.is_terminal() {
            return Err(EngineError::GameAlreadyOver);
        }
        let action = self.codec().decode(id)?;
        if !self.is_legal(state, &action) {
            return Err(EngineError::IllegalAction { id, action });
        }

        let mut next = state.clone();
        self.resolve(&mut next, action);
        Ok(next)
    }

    fn resolve(&self, state: &mut State, action: Action) {
        match action {
            Action::SelectSatellite { slot, charges } => self.resolve_select(state, slot, charges),
            Action::SelectDirection(dir) => state.begin_spending(Some(dir)),
            Action::Spend(spend) => self.resolve_spend(state, spend),
        }
    }

    fn resolve_select(&self, state: &mut State, slot: u8, charges: u8) {
        let taken = state.ring_mut().take(usize::from(slot), charges);
        debug_assert!(taken, "selection passed legality but slot {slot} lacks {charges} charges");
        state.commit(slot, charges);

        let Some(kind) = self.selected_kind(state) else {
            return;
        };
        let can_act = if kind.is_movement() {
            state.set_phase(Phase::SelectDirection);
            Direction::ALL.iter().any(|&dir| self.has_spend(state, kind, Some(dir)))
        } else {
            state.begin_spending(None);
            self.has_spend(state, kind, None)
        };

        if !can_act {
            log::trace!("{} has no use for {kind}; forfeiting {charges}", state.active_player());
            self.spread_and_pass(state);
        }
    }

    fn resolve_spend(&self, state: &mut State, spend: Spend) {
        let player = state.active_player();
        let dir = state.turn().selected_direction();
        let Some(kind) = self.selected_kind(state) else {
            return;
        };

        let mut captured = false;
        match spend {
            Spend::MoveOneStep { from, count } => {
                let unit = kind.unit();
                let Some(dest) = dir.and_then(|d| self.layout().neighbor(from, d)) else {
                    return;
                };
                let moved = state.remove_units(from, player, unit, count);
                state.add_units(dest, player, unit, moved);
                if unit == UnitKind::Bot && state.capture_artefact(dest) {
                    state.add_score(player, u16::from(moved));
                    captured = true;
                    log::debug!("{player} captured artefact at {} with {moved} bots", self.layout().coord(dest));
                }
                log::trace!("{player} moved {moved} {unit} {from} -> {dest}");
            }
            Spend::AddBot(cell) => state.add_units(cell, player, UnitKind::Bot, 1),
            Spend::AddTank(cell) => state.add_units(cell, player, UnitKind::Tank, 1),
            Spend::TankShoot(target) => {
                if let Some(dir) = dir {
                    self.resolve_shot(state, player, dir, target);
                }
            }
        }
        debug_assert!(
            state.unit_total(player) <= self.config().rules.unit_cap,
            "{player} exceeded the unit cap"
        );

        state.consume_charge();
        if self.check_termination(state, captured) {
            return;
        }
        if state.charges_remaining() == 0 || !self.has_spend(state, kind, dir) {
            self.spread_and_pass(state);
        }
    }

    fn resolve_shot(&self, state: &mut State, player: PlayerId, dir: Direction, target: CellId) {
        let enemy = player.opponent();
        let attackers = self
            .layout()
            .neighbor(target, dir.opposite())
            .map_or(0, |firing| state.cell(firing).units(player).tanks);
        let defenders = state.cell(target).units(enemy);

        if defenders.bots > 0 {
            state.remove_units(target, enemy, UnitKind::Bot, defenders.bots);
        }
        if defenders.tanks > 0 && self.config().rules.tank_duel.attacker_wins(attackers, defenders.tanks) {
            state.remove_units(target, enemy, UnitKind::Tank, defenders.tanks);
        }
        log::trace!(
            "{player} shot {target} with {attackers} tanks against {} bots / {} tanks",
            defenders.bots,
            defenders.tanks
        );
    }

    /// Score threshold and artefact exhaustion. Returns true if the game ended.
    fn check_termination(&self, state: &mut State, captured: bool) -> bool {
        let mover = state.active_player();
        let win_score = self.config().rules.win_score;

        let winner = [mover, mover.opponent()]
            .into_iter()
            .find(|&p| state.score(p) >= win_score);
        let outcome = if let Some(winner) = winner {
            Some(GameOutcome {
                result: GameResult::Winner(winner),
                reason: EndReason::ScoreThreshold,
                scores: state.scores(),
            })
        } else if captured && state.artefacts_remaining() == 0 {
            Some(GameOutcome::by_score(state.scores(), EndReason::ArtefactsExhausted, Some(mover)))
        } else {
            None
        };

        match outcome {
            Some(outcome) => {
                log::debug!("game over: {:?} ({:?}), scores {:?}", outcome.result, outcome.reason, outcome.scores);
                state.finish(outcome);
                true
            }
            None => false,
        }
    }

    /// Run the automatic spread, then either end the game on the turn limit
    /// or pass the turn.
    fn spread_and_pass(&self, state: &mut State) {
        state.set_phase(Phase::AutomaticSpread);
        let rules = &self.config().rules;

        if let Some(slot) = state.turn().selected_satellite() {
            let amount = state.turn().committed_charges();
            state.ring_mut().spread(slot, amount, rules.spread_direction);
        }

        if rules.max_turns > 0 && state.turn_number() >= rules.max_turns {
            state.clear_selection();
            let outcome = GameOutcome::by_score(state.scores(), EndReason::TurnLimit, None);
            log::debug!("turn limit reached: {:?}, scores {:?}", outcome.result, outcome.scores);
            state.finish(outcome);
        } else {
            state.pass_turn();
        }
    }
}
