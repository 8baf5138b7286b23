//! PUCT search integration tests on the standard game.

use std::time::Duration;

use satellites::core::{ActionId, GameConfig, RulesConfig, State};
use satellites::heuristics::{HeuristicEvaluator, HeuristicWeights};
use satellites::mcts::{PuctConfig, PuctSearch, RolloutEvaluator, SearchError, UniformEvaluator};
use satellites::replay::GameRecord;
use satellites::rules::SatellitesEngine;

fn engine() -> SatellitesEngine {
    SatellitesEngine::new(GameConfig::default()).unwrap()
}

fn heuristic_search(engine: &SatellitesEngine, config: PuctConfig) -> PuctSearch<SatellitesEngine, HeuristicEvaluator> {
    PuctSearch::new(engine.clone(), HeuristicEvaluator::default(), config)
}

// =============================================================================
// Basic Search Tests
// =============================================================================

#[test]
fn test_heuristic_search_returns_legal_action() {
    let engine = engine();
    let state = engine.new_game(42);
    let mut search = heuristic_search(&engine, PuctConfig::default().with_simulations(200));

    let action = search.search(&state).unwrap();
    assert!(engine.legal_actions(&state).contains(action));

    let visits: u32 = search.action_visits().iter().map(|(_, n)| n).sum();
    assert!(visits > 0);
    assert!(visits <= search.stats().simulations);
}

#[test]
fn test_rollout_evaluator_search() {
    let engine = engine();
    let state = engine.new_game(5);
    let config = PuctConfig::default().with_simulations(16);
    let mut search = PuctSearch::new(engine.clone(), RolloutEvaluator::default(), config);
    let action = search.search(&state).unwrap();
    assert!(engine.legal_actions(&state).contains(action));
}

#[test]
fn test_search_mid_turn() {
    let engine = engine();
    let mut state = engine.new_game(12);
    // Select, so the root is a direction choice.
    let select = engine.legal_actions(&state).iter().next().unwrap();
    state = engine.apply_action(&state, select).unwrap();

    let mut search = heuristic_search(&engine, PuctConfig::default().with_simulations(64));
    let action = search.search(&state).unwrap();
    assert!(engine.legal_actions(&state).contains(action));
}

// =============================================================================
// Determinism Tests
// =============================================================================

#[test]
fn test_single_thread_search_is_deterministic() {
    let engine = engine();
    let state = engine.new_game(99);
    let config = PuctConfig::default().with_simulations(150).with_seed(7);

    let mut a = heuristic_search(&engine, config.clone());
    let mut b = heuristic_search(&engine, config);
    assert_eq!(a.search(&state).unwrap(), b.search(&state).unwrap());
    assert_eq!(a.action_visits(), b.action_visits());
}

#[test]
fn test_temperature_sampling_is_seeded() {
    let engine = engine();
    let state = engine.new_game(3);
    let config = PuctConfig::default().with_simulations(64).with_temperature(1.0).with_seed(11);

    let pick = |config: PuctConfig| {
        let mut search = PuctSearch::new(engine.clone(), UniformEvaluator, config);
        (0..4).map(|_| search.search(&state).unwrap()).collect::<Vec<ActionId>>()
    };
    assert_eq!(pick(config.clone()), pick(config));
}

// =============================================================================
// Parallel and Budget Tests
// =============================================================================

#[test]
fn test_parallel_search() {
    let engine = engine();
    let state = engine.new_game(8);
    let mut search = heuristic_search(&engine, PuctConfig::default().with_simulations(400).with_threads(4));

    let action = search.search(&state).unwrap();
    assert!(engine.legal_actions(&state).contains(action));
    assert_eq!(search.stats().simulations, 400);
    assert!(search.stats().nodes > 1);
}

#[test]
fn test_time_limit_stops_search() {
    let engine = engine();
    let state = engine.new_game(8);
    let config = PuctConfig::default()
        .with_simulations(u32::MAX)
        .with_time_limit(Duration::from_millis(50));
    let mut search = heuristic_search(&engine, config);

    let action = search.search(&state).unwrap();
    assert!(engine.legal_actions(&state).contains(action));
    assert!(search.stats().simulations > 0);
}

// =============================================================================
// Policy and Errors
// =============================================================================

#[test]
fn test_visit_policy_over_action_space() {
    let engine = engine();
    let state = engine.new_game(21);
    let mut search = heuristic_search(&engine, PuctConfig::default().with_simulations(100));
    let action = search.search(&state).unwrap();

    let greedy = search.visit_policy(0.0);
    assert_eq!(greedy.len(), 2009);
    assert_eq!(greedy[action.index()], 1.0);

    let soft = search.visit_policy(1.0);
    assert!((soft.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    let mask = engine.legal_actions(&state);
    for (i, p) in soft.iter().enumerate() {
        if *p > 0.0 {
            assert!(mask.contains(ActionId(i as u32)));
        }
    }
}

#[test]
fn test_terminal_root() {
    let engine = engine();
    let mut state = engine.new_game(1);
    while !engine.is_terminal(&state) {
        let action = engine.legal_actions(&state).iter().next().unwrap();
        state = engine.apply_action(&state, action).unwrap();
    }
    let mut search = heuristic_search(&engine, PuctConfig::default().with_simulations(8));
    assert_eq!(search.search(&state), Err(SearchError::TerminalRoot));
}

#[test]
fn test_invalid_config() {
    let engine = engine();
    let state = engine.new_game(1);
    let mut search = heuristic_search(&engine, PuctConfig::default().with_threads(0));
    assert!(matches!(search.search(&state), Err(SearchError::InvalidConfig(_))));
}

// =============================================================================
// Self-play
// =============================================================================

fn self_play(engine: &SatellitesEngine, seed: u64, weights: HeuristicWeights) -> (GameRecord, State) {
    let mut search = PuctSearch::new(
        engine.clone(),
        HeuristicEvaluator::new(weights),
        PuctConfig::default().with_simulations(24).with_seed(seed),
    );
    let mut record = GameRecord::new(seed);
    let mut state = engine.new_game(seed);
    while !engine.is_terminal(&state) {
        let action = search.search(&state).unwrap();
        state = engine.apply_action(&state, action).unwrap();
        record.record(action);
    }
    (record, state)
}

#[test]
fn test_self_play_game_replays() {
    let rules = RulesConfig::default().with_max_turns(12);
    let engine = SatellitesEngine::new(GameConfig::default().with_rules(rules)).unwrap();

    let (record, state) = self_play(&engine, 2024, HeuristicWeights::default());
    assert!(state.is_terminal());
    assert_eq!(record.final_state(&engine).unwrap(), state);

    let restored = GameRecord::from_bytes(&record.to_bytes().unwrap()).unwrap();
    assert_eq!(restored.replay(&engine).unwrap().last(), Some(&state));
}
