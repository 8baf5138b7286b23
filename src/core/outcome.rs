//! Game results.

use serde::{Deserialize, Serialize};

use super::player::{PlayerId, PlayerMap};

/// Result of a completed game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Winner(PlayerId),
    Draw,
}

impl GameResult {
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, GameResult::Winner(p) if *p == player)
    }

    /// `+1` for the winner, `-1` for the loser, `0` for both on a draw.
    #[must_use]
    pub fn returns(&self) -> PlayerMap<f64> {
        match self {
            GameResult::Winner(winner) => {
                PlayerMap::new(|p| if p == *winner { 1.0 } else { -1.0 })
            }
            GameResult::Draw => PlayerMap::with_value(0.0),
        }
    }
}

/// Why the game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// A player reached the win score.
    ScoreThreshold,
    /// The last artefact was captured.
    ArtefactsExhausted,
    /// The turn limit ran out.
    TurnLimit,
}

/// Final result together with the scores it was decided on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameOutcome {
    pub result: GameResult,
    pub reason: EndReason,
    pub scores: PlayerMap<u16>,
}

impl GameOutcome {
    /// Decide by score, giving ties to `tie_break` (or a draw when `None`).
    #[must_use]
    pub fn by_score(scores: PlayerMap<u16>, reason: EndReason, tie_break: Option<PlayerId>) -> Self {
        let first = scores[PlayerId::FIRST];
        let second = scores[PlayerId::SECOND];
        let result = match first.cmp(&second) {
            std::cmp::Ordering::Greater => GameResult::Winner(PlayerId::FIRST),
            std::cmp::Ordering::Less => GameResult::Winner(PlayerId::SECOND),
            std::cmp::Ordering::Equal => tie_break.map_or(GameResult::Draw, GameResult::Winner),
        };
        Self { result, reason, scores }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns() {
        let win = GameResult::Winner(PlayerId::SECOND).returns();
        assert_eq!(win.as_array(), &[-1.0, 1.0]);
        assert_eq!(GameResult::Draw.returns().as_array(), &[0.0, 0.0]);
    }

    #[test]
    fn test_by_score() {
        let scores = PlayerMap::from_array([4, 2]);
        let outcome = GameOutcome::by_score(scores, EndReason::TurnLimit, None);
        assert_eq!(outcome.result, GameResult::Winner(PlayerId::FIRST));

        let tied = PlayerMap::from_array([3, 3]);
        assert_eq!(GameOutcome::by_score(tied, EndReason::TurnLimit, None).result, GameResult::Draw);
        assert_eq!(
            GameOutcome::by_score(tied, EndReason::ArtefactsExhausted, Some(PlayerId::SECOND)).result,
            GameResult::Winner(PlayerId::SECOND)
        );
    }

    #[test]
    fn test_is_winner() {
        let result = GameResult::Winner(PlayerId::FIRST);
        assert!(result.is_winner(PlayerId::FIRST));
        assert!(!result.is_winner(PlayerId::SECOND));
        assert!(!GameResult::Draw.is_winner(PlayerId::FIRST));
    }
}
