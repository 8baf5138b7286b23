//! Legality and masking.
//!
//! Every rule constraint on what may be done lives here. The resolver trusts
//! that an action passed `is_legal` and only applies effects.
//!
//! Enumeration and single-action checks share the same predicates, so the
//! mask and `is_legal` can never disagree.

use std::ops::ControlFlow;

use crate::core::{
    Action, BotPlacement, CellId, Direction, Phase, PlayerId, SatelliteKind, Spend, State, UnitKind,
};

use super::mask::ActionMask;
use super::satellites::SatellitesEngine;

impl SatellitesEngine {
    /// The legal action ids for the current phase.
    ///
    /// Empty only for terminal states: every other observable phase has at
    /// least one legal action, because the resolver moves on by itself
    /// whenever a selection or spend leaves nothing to do.
    #[must_use]
    pub fn legal_actions(&self, state: &State) -> ActionMask {
        let mut mask = ActionMask::new(self.codec().size());
        let _ = self.for_each_legal(state, &mut |action| {
            if let Ok(id) = self.codec().encode(&action) {
                mask.insert(id);
            }
            ControlFlow::Continue(())
        });
        debug_assert!(
            state.is_terminal() || !mask.is_empty(),
            "no legal action in phase {:?}",
            state.phase()
        );
        mask
    }

    /// The legal actions, decoded, in enumeration order.
    #[must_use]
    pub fn legal_action_list(&self, state: &State) -> Vec<Action> {
        let mut actions = Vec::new();
        let _ = self.for_each_legal(state, &mut |action| {
            actions.push(action);
            ControlFlow::Continue(())
        });
        actions
    }

    /// Would `action` be accepted by `apply_action` in this state?
    #[must_use]
    pub fn is_legal(&self, state: &State, action: &Action) -> bool {
        let player = state.active_player();
        match (state.phase(), *action) {
            (Phase::SelectSatellite, Action::SelectSatellite { slot, charges }) => state
                .ring()
                .get(usize::from(slot))
                .is_some_and(|sat| charges >= 1 && charges <= sat.charge),
            (Phase::SelectDirection, Action::SelectDirection(dir)) => self
                .selected_kind(state)
                .is_some_and(|kind| kind.is_movement() && self.has_spend(state, kind, Some(dir))),
            (Phase::SpendCharge, Action::Spend(spend)) if state.charges_remaining() > 0 => {
                let Some(kind) = self.selected_kind(state) else {
                    return false;
                };
                let dir = state.turn().selected_direction();
                match (kind, spend, dir) {
                    (SatelliteKind::MoveTank | SatelliteKind::MoveBot, Spend::MoveOneStep { from, count }, Some(dir)) => {
                        self.move_is_legal(state, player, kind.unit(), dir, from, count)
                    }
                    (SatelliteKind::MoveTank, Spend::TankShoot(target), Some(dir)) => {
                        self.shot_is_legal(state, player, dir, target)
                    }
                    (SatelliteKind::AddTank, Spend::AddTank(cell), _) => self.add_tank_is_legal(state, player, cell),
                    (SatelliteKind::AddBot, Spend::AddBot(cell), _) => self.add_bot_is_legal(state, player, cell),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Kind of the satellite selected this turn.
    pub(crate) fn selected_kind(&self, state: &State) -> Option<SatelliteKind> {
        let slot = state.turn().selected_satellite()?;
        state.ring().get(slot).map(|sat| sat.kind)
    }

    /// Is at least one spend available for `kind` (in `dir`, for movement)?
    pub(crate) fn has_spend(&self, state: &State, kind: SatelliteKind, dir: Option<Direction>) -> bool {
        self.for_each_spend(state, kind, dir, &mut |_| ControlFlow::Break(()))
            .is_break()
    }

    fn for_each_legal(
        &self,
        state: &State,
        f: &mut impl FnMut(Action) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        match state.phase() {
            Phase::SelectSatellite => {
                for (slot, sat) in state.ring().slots().iter().enumerate() {
                    for charges in 1..=sat.charge {
                        f(Action::select(slot as u8, charges))?;
                    }
                }
                ControlFlow::Continue(())
            }
            Phase::SelectDirection => {
                let Some(kind) = self.selected_kind(state) else {
                    return ControlFlow::Continue(());
                };
                for dir in Direction::ALL {
                    if self.has_spend(state, kind, Some(dir)) {
                        f(Action::SelectDirection(dir))?;
                    }
                }
                ControlFlow::Continue(())
            }
            Phase::SpendCharge if state.charges_remaining() > 0 => match self.selected_kind(state) {
                Some(kind) => self.for_each_spend(state, kind, state.turn().selected_direction(), f),
                None => ControlFlow::Continue(()),
            },
            _ => ControlFlow::Continue(()),
        }
    }

    fn for_each_spend(
        &self,
        state: &State,
        kind: SatelliteKind,
        dir: Option<Direction>,
        f: &mut impl FnMut(Action) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        let player = state.active_player();
        let layout = self.layout();

        match (kind, dir) {
            (SatelliteKind::MoveTank | SatelliteKind::MoveBot, Some(dir)) => {
                let unit = kind.unit();
                for (from, cell) in state.cells() {
                    let available = cell.units(player).get(unit);
                    if available == 0 {
                        continue;
                    }
                    let Some(dest) = layout.neighbor(from, dir) else {
                        continue;
                    };
                    if self.can_enter(state, player, unit, dest) {
                        for count in 1..=available {
                            f(Action::move_step(from, count))?;
                        }
                    }
                    if unit == UnitKind::Tank && self.can_target(state, player, dest) {
                        f(Action::Spend(Spend::TankShoot(dest)))?;
                    }
                }
            }
            (SatelliteKind::AddTank, _) => {
                for cell in layout.cells() {
                    if self.add_tank_is_legal(state, player, cell) {
                        f(Action::Spend(Spend::AddTank(cell)))?;
                    }
                }
            }
            (SatelliteKind::AddBot, _) => {
                for cell in layout.cells() {
                    if self.add_bot_is_legal(state, player, cell) {
                        f(Action::Spend(Spend::AddBot(cell)))?;
                    }
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    /// Can `unit`s of `player` step onto `dest`?
    ///
    /// Never an opponent starting hex, never a hex with enemy units, never
    /// onto own units of the other type, and tanks never onto artefacts.
    fn can_enter(&self, state: &State, player: PlayerId, unit: UnitKind, dest: CellId) -> bool {
        if self.layout().start_owner(dest) == Some(player.opponent()) {
            return false;
        }
        let cell = state.cell(dest);
        !cell.occupied_by(player.opponent())
            && cell.units(player).get(unit.other()) == 0
            && !(unit == UnitKind::Tank && cell.has_artefact())
    }

    /// Is `target` a valid shot target: enemy units outside the enemy's
    /// starting hexes.
    fn can_target(&self, state: &State, player: PlayerId, target: CellId) -> bool {
        self.layout().start_owner(target) != Some(player.opponent())
            && state.cell(target).occupied_by(player.opponent())
    }

    fn move_is_legal(
        &self,
        state: &State,
        player: PlayerId,
        unit: UnitKind,
        dir: Direction,
        from: CellId,
        count: u8,
    ) -> bool {
        count >= 1
            && state.cell(from).units(player).get(unit) >= count
            && self
                .layout()
                .neighbor(from, dir)
                .is_some_and(|dest| self.can_enter(state, player, unit, dest))
    }

    fn shot_is_legal(&self, state: &State, player: PlayerId, dir: Direction, target: CellId) -> bool {
        self.layout()
            .neighbor(target, dir.opposite())
            .is_some_and(|firing| state.cell(firing).units(player).tanks > 0)
            && self.can_target(state, player, target)
    }

    fn below_cap(&self, state: &State, player: PlayerId) -> bool {
        state.unit_total(player) < self.config().rules.unit_cap
    }

    fn add_tank_is_legal(&self, state: &State, player: PlayerId, cell_id: CellId) -> bool {
        let cell = state.cell(cell_id);
        self.below_cap(state, player)
            && self.layout().start_owner(cell_id).is_none()
            && !cell.has_artefact()
            && !cell.occupied_by(player.opponent())
            && cell.units(player).bots == 0
    }

    fn add_bot_is_legal(&self, state: &State, player: PlayerId, cell_id: CellId) -> bool {
        let cell = state.cell(cell_id);
        let own = cell.units(player);
        if !self.below_cap(state, player)
            || cell.has_artefact()
            || cell.occupied_by(player.opponent())
            || own.tanks > 0
        {
            return false;
        }
        let start = self.layout().start_owner(cell_id);
        match self.config().rules.bot_placement {
            BotPlacement::StartHexesOrOwnStacks => own.bots > 0 || start == Some(player),
            BotPlacement::AnyEmptyOrOwnStack => start != Some(player.opponent()),
        }
    }
}
