//! Built-in bots.
//!
//! A bot sees only its published game-state payload and the board size
//! every client is told up front.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::{Coord, Direction, GameStatePayload};

/// How a bot picks its next move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Any direction that is not visibly blocked.
    Random,
    /// Step towards the nearest visible coin, preferring higher tiers on
    /// ties. Falls back to random when no coin is in sight.
    Greedy,
}

/// Directions whose target is on the board and not visibly blocked.
#[must_use]
pub fn open_directions(payload: &GameStatePayload, width: i16, height: i16) -> Vec<Direction> {
    let at = payload.current_position;
    Direction::ALL
        .into_iter()
        .filter(|d| {
            let target = at.step(*d);
            (0..height).contains(&target.row)
                && (0..width).contains(&target.col)
                && !payload.is_blocked(target)
        })
        .collect()
}

/// Nearest visible coin; the higher tier wins a distance tie.
fn nearest_coin(payload: &GameStatePayload) -> Option<Coord> {
    let at = payload.current_position;
    payload
        .coins()
        .min_by_key(|(coord, tier)| (coord.manhattan(at), std::cmp::Reverse(*tier), *coord))
        .map(|(coord, _)| coord)
}

/// Pick the next move for a bot.
///
/// A boxed-in bot still returns a direction; the server rejects it and the
/// bot stays put for the round.
pub fn choose_direction<R: Rng + ?Sized>(
    strategy: Strategy,
    payload: &GameStatePayload,
    width: i16,
    height: i16,
    rng: &mut R,
) -> Direction {
    let open = open_directions(payload, width, height);
    let fallback = |rng: &mut R| match open.choose(rng) {
        Some(direction) => *direction,
        None => Direction::ALL[rng.gen_range(0..Direction::ALL.len())],
    };

    match strategy {
        Strategy::Random => fallback(rng),
        Strategy::Greedy => {
            let Some(goal) = nearest_coin(payload) else {
                return fallback(rng);
            };
            let at = payload.current_position;
            let closer: Vec<Direction> = open
                .iter()
                .copied()
                .filter(|d| at.step(*d).manhattan(goal) < at.manhattan(goal))
                .collect();
            closer.choose(rng).copied().unwrap_or_else(|| fallback(rng))
        }
    }
}
