//! Round resolution.
//!
//! Moves are applied one at a time in buffer order. Each move sees the
//! positions left behind by every move before it, so an earlier mover can
//! claim a contested cell and block a later one.

use thiserror::Error;

use crate::game::{CoinTier, Coord, Direction, GameState, PendingMove, PlayerName, TeamName};

/// Why a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Target cell is outside the board.
    OutOfBounds,
    /// Target cell is a wall.
    Wall,
    /// Target cell holds another player.
    Occupied,
    /// The player already moved this round.
    AlreadyMoved,
}

/// Result of one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The player moved.
    Moved {
        /// Cell the player left.
        from: Coord,
        /// Cell the player entered.
        to: Coord,
        /// Coin collected on entering, if any.
        coin: Option<CoinTier>,
    },
    /// The move was refused and the player stayed put.
    Rejected {
        /// Cell the player stays on.
        at: Coord,
        /// Cell the player tried to enter.
        target: Coord,
        /// Reason for refusal.
        reason: Rejection,
    },
}

impl MoveOutcome {
    /// Check if the move was applied.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }

    /// Coin collected by this move, if any.
    #[must_use]
    pub const fn coin(&self) -> Option<CoinTier> {
        match self {
            MoveOutcome::Moved { coin, .. } => *coin,
            MoveOutcome::Rejected { .. } => None,
        }
    }
}

/// One processed entry of the round buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMove {
    /// Moving player.
    pub player: PlayerName,
    /// Requested direction.
    pub direction: Direction,
    /// What happened.
    pub outcome: MoveOutcome,
}

/// Summary of a resolved round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    /// Round number (1-based).
    pub round: u32,
    /// Moves in the order they were applied.
    pub moves: Vec<ResolvedMove>,
    /// True if the last coin was collected this round.
    pub game_over: bool,
}

impl RoundReport {
    /// Number of moves that were applied.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.moves.iter().filter(|m| m.outcome.is_accepted()).count()
    }

    /// Number of moves that were refused.
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.moves.len() - self.accepted()
    }

    /// Coins collected this round, in collection order.
    pub fn coins_collected(&self) -> impl Iterator<Item = (&str, CoinTier)> {
        self.moves
            .iter()
            .filter_map(|m| m.outcome.coin().map(|tier| (m.player.as_str(), tier)))
    }
}

/// A round buffer that cannot be applied to the game state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The buffer names a player who is not in the game.
    #[error("round buffer references unknown player {0:?}")]
    UnknownPlayer(PlayerName),
    /// A player's team is missing from the game.
    #[error("player {player:?} belongs to missing team {team:?}")]
    MissingTeam {
        /// Player whose team was looked up.
        player: PlayerName,
        /// Team that could not be found.
        team: TeamName,
    },
}

/// Resolve one round of moves against the game state.
///
/// Every player named in `moves` is checked before anything is applied, so
/// an unknown player leaves the state untouched.
///
/// # Errors
///
/// Returns [`ResolveError::UnknownPlayer`] if a move names a player who is
/// not in the game, and [`ResolveError::MissingTeam`] if a scoring player's
/// team cannot be found. The state may be partially updated in the second
/// case; callers that need atomicity resolve on a copy.
pub fn resolve_round<'a, I>(state: &mut GameState, moves: I) -> Result<RoundReport, ResolveError>
where
    I: IntoIterator<Item = &'a PendingMove>,
{
    let mut ordered = Vec::new();
    for pending in moves {
        let index = state
            .player_index(&pending.player)
            .ok_or_else(|| ResolveError::UnknownPlayer(pending.player.clone()))?;
        ordered.push((index, pending.direction));
    }

    for player in &mut state.players {
        player.has_moved = false;
    }

    let mut resolved = Vec::with_capacity(ordered.len());
    for (index, direction) in ordered {
        let outcome = apply_move(state, index, direction)?;
        let player = state.players[index].name.clone();
        tracing::debug!(player = %player, %direction, ?outcome, "move resolved");
        resolved.push(ResolvedMove {
            player,
            direction,
            outcome,
        });
    }

    state.round += 1;

    Ok(RoundReport {
        round: state.round,
        moves: resolved,
        game_over: state.board.all_coins_collected(),
    })
}

/// Apply a single move for the player at `index`.
fn apply_move(
    state: &mut GameState,
    index: usize,
    direction: Direction,
) -> Result<MoveOutcome, ResolveError> {
    let from = state.players[index].position;
    let target = from.step(direction);

    let refusal = if state.players[index].has_moved {
        Some(Rejection::AlreadyMoved)
    } else if !state.board.in_bounds(target) {
        Some(Rejection::OutOfBounds)
    } else if state.board.is_wall(target) {
        Some(Rejection::Wall)
    } else if state.is_occupied(target) {
        Some(Rejection::Occupied)
    } else {
        None
    };

    state.players[index].has_moved = true;

    if let Some(reason) = refusal {
        return Ok(MoveOutcome::Rejected {
            at: from,
            target,
            reason,
        });
    }

    state.players[index].position = target;

    let coin = state.board.remove_coin(target);
    if let Some(tier) = coin {
        let player = &state.players[index];
        let (name, team) = (player.name.clone(), player.team.clone());
        state
            .team_mut(&team)
            .ok_or(ResolveError::MissingTeam {
                player: name,
                team: team.clone(),
            })?
            .award(tier);
    }

    Ok(MoveOutcome::Moved {
        from,
        to: target,
        coin,
    })
}
