//! Rules engine integration tests on the standard board.

use satellites::core::{
    Action, ActionId, BoardConfig, Direction, EndReason, GameConfig, GameResult, HexCoord, Phase,
    Placement, PlayerId, RulesConfig, SatelliteKind, Spend, State, UnitKind,
};
use satellites::nn::PLANES;
use satellites::rules::{EngineError, SatellitesEngine};

const P1: PlayerId = PlayerId::FIRST;
const P2: PlayerId = PlayerId::SECOND;

fn standard() -> SatellitesEngine {
    SatellitesEngine::new(GameConfig::default()).unwrap()
}

fn at(engine: &SatellitesEngine, row: u8, col: u8) -> satellites::core::CellId {
    engine.layout().cell_id(HexCoord::new(row, col)).unwrap()
}

fn slot_of(state: &State, kind: SatelliteKind) -> u8 {
    state.ring().kinds().iter().position(|k| *k == kind).unwrap() as u8
}

fn apply(engine: &SatellitesEngine, state: &State, action: Action) -> State {
    engine.apply(state, &action).unwrap()
}

// =============================================================================
// Setup
// =============================================================================

#[test]
fn test_standard_setup() {
    let engine = standard();
    let state = engine.new_game(1);

    assert_eq!(engine.layout().cell_count(), 85);
    assert_eq!(engine.action_space_size(), 2009);
    assert_eq!(state.artefacts_remaining(), 6);
    assert_eq!(state.ring().total_charge(), 8);
    assert_eq!(state.phase(), Phase::SelectSatellite);
    assert_eq!(state.active_player(), P1);
    assert_eq!(state.turn_number(), 1);

    assert_eq!(state.cell(at(&engine, 0, 3)).units(P1).bots, 2);
    assert_eq!(state.cell(at(&engine, 0, 4)).units(P1).tanks, 2);
    assert_eq!(state.cell(at(&engine, 8, 3)).units(P2).bots, 2);
    assert_eq!(state.cell(at(&engine, 8, 4)).units(P2).tanks, 2);
    for (row, col) in [(2, 1), (2, 8), (4, 4), (4, 7), (6, 1), (6, 8)] {
        assert!(state.cell(at(&engine, row, col)).has_artefact());
    }
}

#[test]
fn test_same_seed_same_game() {
    let engine = standard();
    assert_eq!(engine.new_game(77), engine.new_game(77));
    assert_eq!(engine.new_game(77).state_key(), engine.new_game(77).state_key());
}

#[test]
fn test_opening_offers_only_selections() {
    let engine = standard();
    let state = engine.new_game(3);
    let actions = engine.legal_action_list(&state);

    // Four movement satellites with two charges each.
    assert_eq!(actions.len(), 8);
    assert!(actions.iter().all(|a| matches!(a, Action::SelectSatellite { .. })));
    assert_eq!(engine.legal_actions(&state).count(), 8);
}

// =============================================================================
// Turn flow
// =============================================================================

#[test]
fn test_movement_turn() {
    let engine = standard();
    let state = engine.new_game(9);
    let slot = slot_of(&state, SatelliteKind::MoveBot);

    let state = apply(&engine, &state, Action::select(slot, 2));
    assert_eq!(state.phase(), Phase::SelectDirection);
    assert_eq!(state.ring().total_charge(), 6);

    let dirs: Vec<Action> = engine.legal_action_list(&state);
    assert_eq!(
        dirs,
        vec![
            Action::SelectDirection(Direction::West),
            Action::SelectDirection(Direction::SouthWest),
            Action::SelectDirection(Direction::SouthEast),
        ]
    );

    let state = apply(&engine, &state, Action::SelectDirection(Direction::SouthEast));
    assert_eq!(state.phase(), Phase::SpendCharge);
    assert_eq!(state.charges_remaining(), 2);

    let state = apply(&engine, &state, Action::move_step(at(&engine, 0, 3), 2));
    assert_eq!(state.cell(at(&engine, 1, 4)).units(P1).bots, 2);
    assert_eq!(state.charges_remaining(), 1);

    let state = apply(&engine, &state, Action::move_step(at(&engine, 1, 4), 1));
    assert_eq!(state.cell(at(&engine, 2, 5)).units(P1).bots, 1);

    // Turn over: charges spread back and P2 is up.
    assert_eq!(state.phase(), Phase::SelectSatellite);
    assert_eq!(state.active_player(), P2);
    assert_eq!(state.ring().total_charge(), 8);
    assert_eq!(state.ring().slots()[usize::from(slot)].charge, 0);
}

#[test]
fn test_spread_goes_to_following_slots() {
    let engine = standard();
    let state = engine.new_game(21);
    let slot = usize::from(slot_of(&state, SatelliteKind::MoveTank));
    let before = *state.ring();

    let state = apply(&engine, &state, Action::select(slot as u8, 2));
    let state = apply(&engine, &state, Action::SelectDirection(Direction::SouthEast));
    let state = apply(&engine, &state, Action::move_step(at(&engine, 0, 4), 2));
    let state = apply(&engine, &state, Action::move_step(at(&engine, 1, 5), 2));

    let after = state.ring();
    for offset in 0..6 {
        let s = (slot + offset) % 6;
        let expected = match offset {
            0 => 0,
            1 | 2 => before.slots()[s].charge + 1,
            _ => before.slots()[s].charge,
        };
        assert_eq!(after.slots()[s].charge, expected, "slot {s}");
    }
}

#[test]
fn test_add_satellite_places_units() {
    let engine = standard();
    let mut state = engine.new_game(4);

    // Charge the add-bot satellite by spreading into it.
    let add_bot = usize::from(slot_of(&state, SatelliteKind::AddBot));
    while state.ring().slots()[add_bot].charge == 0 {
        let action = engine.legal_actions(&state).iter().next().unwrap();
        state = engine.apply_action(&state, action).unwrap();
        assert!(!state.is_terminal());
    }
    while state.phase() != Phase::SelectSatellite {
        let action = engine.legal_actions(&state).iter().next().unwrap();
        state = engine.apply_action(&state, action).unwrap();
    }

    let player = state.active_player();
    let before = state.unit_total(player);
    let state = apply(&engine, &state, Action::select(add_bot as u8, 1));
    let spends = engine.legal_action_list(&state);
    assert!(!spends.is_empty());
    assert!(spends.iter().all(|a| matches!(a, Action::Spend(Spend::AddBot(_)))));

    let next = engine.apply(&state, &spends[0]).unwrap();
    assert_eq!(next.unit_total(player), before + 1);
    assert_eq!(next.active_player(), player.opponent());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_invalid_and_illegal_ids() {
    let engine = standard();
    let state = engine.new_game(2);

    assert!(matches!(
        engine.apply_action(&state, ActionId(2009)),
        Err(EngineError::InvalidActionId { size: 2009, .. })
    ));
    assert!(matches!(
        engine.apply_action(&state, ActionId(48)),
        Err(EngineError::IllegalAction { action: Action::SelectDirection(Direction::East), .. })
    ));
    assert_eq!(state, engine.new_game(2));
}

#[test]
fn test_codec_agrees_with_mask() {
    let engine = standard();
    let mut state = engine.new_game(13);
    for _ in 0..200 {
        if state.is_terminal() {
            break;
        }
        let mask = engine.legal_actions(&state);
        for id in mask.iter() {
            let action = engine.codec().decode(id).unwrap();
            assert_eq!(engine.codec().encode(&action).unwrap(), id);
            assert!(engine.is_legal(&state, &action));
        }
        let ids: Vec<ActionId> = mask.iter().collect();
        state = engine.apply_action(&state, ids[ids.len() - 1]).unwrap();
    }
}

// =============================================================================
// Game end
// =============================================================================

#[test]
fn test_playout_ends_and_rejects_further_actions() {
    let engine = standard();
    let mut state = engine.new_game(31);
    let mut steps = 0;
    while !engine.is_terminal(&state) {
        let ids: Vec<ActionId> = engine.legal_actions(&state).iter().collect();
        state = engine.apply_action(&state, ids[steps % ids.len()]).unwrap();
        steps += 1;
    }

    let outcome = engine.result(&state).unwrap();
    let returns = engine.returns(&state);
    assert_eq!(returns[P1] + returns[P2], 0.0);
    if let GameResult::Winner(p) = outcome.result {
        assert_eq!(returns[p], 1.0);
    }
    assert!(engine.legal_actions(&state).is_empty());
    assert_eq!(engine.apply_action(&state, ActionId(0)), Err(EngineError::GameAlreadyOver));
}

#[test]
fn test_turn_limit() {
    let rules = RulesConfig::default().with_max_turns(2);
    let engine = SatellitesEngine::new(GameConfig::default().with_rules(rules)).unwrap();
    let mut state = engine.new_game(8);
    let mut hand_offs = 0;
    while !state.is_terminal() {
        let mover = state.active_player();
        let action = engine.legal_actions(&state).iter().next().unwrap();
        state = engine.apply_action(&state, action).unwrap();
        if state.active_player() != mover {
            hand_offs += 1;
        }
    }
    // P1, P2, P1: the limit is checked as the first player's second turn ends.
    assert_eq!(hand_offs, 2);
    assert_eq!(state.active_player(), P1);
    assert_eq!(state.turn_number(), 2);

    let outcome = state.outcome().unwrap();
    assert_eq!(outcome.reason, EndReason::TurnLimit);
    assert_eq!(outcome.result, GameResult::Draw);
}

#[test]
fn test_capture_of_last_artefact() {
    let board = BoardConfig::empty()
        .with_units(vec![Placement::new(P1, 3, 3, UnitKind::Bot, 1)])
        .with_artefacts(vec![HexCoord::new(4, 4)]);
    let engine = SatellitesEngine::new(GameConfig::new(board, RulesConfig::default())).unwrap();
    let state = engine.new_game(6);

    let state = apply(&engine, &state, Action::select(slot_of(&state, SatelliteKind::MoveBot), 1));
    let state = apply(&engine, &state, Action::SelectDirection(Direction::SouthEast));
    let state = apply(&engine, &state, Action::move_step(at(&engine, 3, 3), 1));

    let outcome = state.outcome().unwrap();
    assert_eq!(outcome.reason, EndReason::ArtefactsExhausted);
    assert_eq!(outcome.result, GameResult::Winner(P1));
    assert_eq!(state.score(P1), 1);
}

// =============================================================================
// Observation
// =============================================================================

#[test]
fn test_observation_shape() {
    let engine = standard();
    let encoded = engine.observation_tensor(&engine.new_game(1));
    assert_eq!(encoded.shape, vec![PLANES, 9, 12]);
    assert_eq!(encoded.len(), PLANES * 9 * 12);
}
