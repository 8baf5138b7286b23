//! Core game types: players, RNG, hex geometry, satellites, configuration,
//! actions and the state model.
//!
//! Nothing in this module knows the rules. Legality and resolution live in
//! `rules`; this module only holds the data they work on.

pub mod action;
pub mod config;
pub mod hex;
pub mod outcome;
pub mod player;
pub mod rng;
pub mod satellite;
pub mod state;
pub mod unit;

pub use action::{Action, ActionId, Spend};
pub use config::{
    BoardConfig, BotPlacement, ConfigError, GameConfig, Placement, RulesConfig, SpreadDirection,
    TankDuel,
};
pub use hex::{BoardLayout, CellId, Direction, HexCoord};
pub use outcome::{EndReason, GameOutcome, GameResult};
pub use player::{PlayerId, PlayerMap, PLAYER_COUNT};
pub use rng::GameRng;
pub use satellite::{Satellite, SatelliteKind, SatelliteRing, RING_SIZE};
pub use state::{Cell, Phase, State, TurnContext};
pub use unit::{Stack, UnitKind};
