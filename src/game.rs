//! Game layer for gridcoin.
//!
//! Implements the rules of one game:
//! - Board with walls and tiered coins
//! - Players grouped into scoring teams
//! - Arrival-ordered round buffer
//! - Sequential move resolution with coin collection
//! - Egocentric 5x5 view projection

mod board;
mod direction;
mod invariants;
mod player;
mod resolve;
mod round;
mod state;
mod view;

pub use board::{Board, CoinTier, Coord, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use direction::{Direction, ParseDirectionError};
pub use invariants::{assert_invariants, check_invariants, InvariantViolation};
pub use player::{Player, PlayerName, Team, TeamName};
pub use resolve::{resolve_round, MoveOutcome, Rejection, ResolveError, ResolvedMove, RoundReport};
pub use round::{PendingMove, RoundBuffer, Submission};
pub use state::{GameState, Placement, SetupError};
pub use view::{
    project_all, project_view, Cell, GameStatePayload, PlayerView, VIEW_RADIUS, VIEW_SIZE,
};
