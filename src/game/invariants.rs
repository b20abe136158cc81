//! Game invariants - sanity checks that detect bugs.
//!
//! A correctly resolved round never violates these. The session checks
//! them on a scratch copy of the state before committing a round, so a
//! violation abandons the round instead of corrupting the lobby.

use std::collections::HashMap;

use thiserror::Error;

use crate::game::GameState;

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invariant violation: {message}")]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl InvariantViolation {
    fn new(message: String) -> Self {
        Self { message }
    }
}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let board = state.board();

    let mut occupied = HashMap::new();
    for player in state.players() {
        let at = player.position;

        if !board.in_bounds(at) {
            violations.push(InvariantViolation::new(format!(
                "Player {} is outside the board at {at:?}",
                player.name
            )));
        }
        if board.is_wall(at) {
            violations.push(InvariantViolation::new(format!(
                "Player {} stands on a wall at {at:?}",
                player.name
            )));
        }
        if let Some(tier) = board.coin_at(at) {
            violations.push(InvariantViolation::new(format!(
                "Player {} stands on an uncollected {tier:?} coin at {at:?}",
                player.name
            )));
        }
        if let Some(other) = occupied.insert(at, player.name.as_str()) {
            violations.push(InvariantViolation::new(format!(
                "Players {other} and {} share cell {at:?}",
                player.name
            )));
        }

        let teams: Vec<_> = state
            .teams()
            .iter()
            .filter(|t| t.has_member(&player.name))
            .collect();
        match teams.as_slice() {
            [team] if team.name == player.team => {}
            [] => violations.push(InvariantViolation::new(format!(
                "Player {} is on no team",
                player.name
            ))),
            _ => violations.push(InvariantViolation::new(format!(
                "Player {} team membership is inconsistent ({} teams list them, record says {})",
                player.name,
                teams.len(),
                player.team
            ))),
        }
    }

    for team in state.teams() {
        for member in &team.members {
            if state.player(member).is_none() {
                violations.push(InvariantViolation::new(format!(
                    "Team {} lists unknown player {member}",
                    team.name
                )));
            }
        }
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(state: &GameState) {
    let violations = check_invariants(state);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_state: &GameState) {}
