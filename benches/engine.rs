use criterion::{black_box, criterion_group, criterion_main, Criterion};

use satellites::core::{ActionId, GameConfig, State};
use satellites::heuristics::HeuristicEvaluator;
use satellites::mcts::{PuctConfig, PuctSearch};
use satellites::rules::SatellitesEngine;

/// A mid-game position: 40 plies of deterministic play from seed 7.
fn midgame(engine: &SatellitesEngine) -> State {
    let mut state = engine.new_game(7);
    for ply in 0..40 {
        if state.is_terminal() {
            break;
        }
        let ids: Vec<ActionId> = engine.legal_actions(&state).iter().collect();
        state = engine.apply_action(&state, ids[(ply * 7) % ids.len()]).unwrap();
    }
    state
}

fn bench_engine(c: &mut Criterion) {
    let engine = SatellitesEngine::new(GameConfig::default()).unwrap();
    let state = midgame(&engine);
    let first = engine.legal_actions(&state).iter().next().unwrap();

    c.bench_function("legal_mask", |b| b.iter(|| engine.legal_actions(black_box(&state))));
    c.bench_function("apply_action", |b| b.iter(|| engine.apply_action(black_box(&state), first)));
    c.bench_function("state_clone", |b| b.iter(|| black_box(&state).clone()));
    c.bench_function("observation_tensor", |b| b.iter(|| engine.observation_tensor(black_box(&state))));
}

fn bench_search(c: &mut Criterion) {
    let engine = SatellitesEngine::new(GameConfig::default()).unwrap();
    let state = midgame(&engine);
    let config = PuctConfig::default().with_simulations(200);

    c.bench_function("puct_200_sims", |b| {
        b.iter(|| {
            let mut search = PuctSearch::new(engine.clone(), HeuristicEvaluator::default(), config.clone());
            search.search(black_box(&state))
        })
    });
}

criterion_group!(benches, bench_engine, bench_search);
criterion_main!(benches);
