//! Game state management.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::game::{Board, Coord, Player, PlayerName, Team, TeamName};

/// Starting cell and team for one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Player name.
    pub player: PlayerName,
    /// Team the player joins.
    pub team: TeamName,
    /// Starting cell.
    pub position: Coord,
}

impl Placement {
    /// Create a new placement.
    #[must_use]
    pub fn new(player: impl Into<PlayerName>, team: impl Into<TeamName>, position: Coord) -> Self {
        Self {
            player: player.into(),
            team: team.into(),
            position,
        }
    }
}

/// Reasons a set of placements cannot form a valid game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// No players were placed.
    #[error("a game needs at least one player")]
    NoPlayers,
    /// Two placements share a player name.
    #[error("player {0:?} is placed more than once")]
    DuplicatePlayer(PlayerName),
    /// A start cell is outside the board.
    #[error("player {player:?} starts outside the board at {position:?}")]
    OutOfBounds {
        /// Offending player.
        player: PlayerName,
        /// Offending cell.
        position: Coord,
    },
    /// A start cell is a wall.
    #[error("player {player:?} starts on a wall at {position:?}")]
    OnWall {
        /// Offending player.
        player: PlayerName,
        /// Offending cell.
        position: Coord,
    },
    /// A start cell holds a coin.
    #[error("player {player:?} starts on a coin at {position:?}")]
    OnCoin {
        /// Offending player.
        player: PlayerName,
        /// Offending cell.
        position: Coord,
    },
    /// Two players start on the same cell.
    #[error("player {player:?} starts on occupied cell {position:?}")]
    Occupied {
        /// Offending player.
        player: PlayerName,
        /// Offending cell.
        position: Coord,
    },
}

/// Complete state of one game: board, teams and players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    /// The board.
    pub(crate) board: Board,
    /// Players in registration order.
    pub(crate) players: Vec<Player>,
    /// Teams in order of first registration.
    pub(crate) teams: Vec<Team>,
    /// Number of rounds resolved so far.
    pub(crate) round: u32,
}

impl GameState {
    /// Create a new game from a prepared board and player placements.
    ///
    /// Teams are created in order of first appearance. Coins are only ever
    /// collected by moving onto them, so no player may start on one.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no players, a name repeats, or a start
    /// cell is off the board, a wall, a coin, or shared.
    pub fn new(board: Board, placements: Vec<Placement>) -> Result<Self, SetupError> {
        if placements.is_empty() {
            return Err(SetupError::NoPlayers);
        }

        let mut players: Vec<Player> = Vec::with_capacity(placements.len());
        let mut teams: Vec<Team> = Vec::new();

        for placement in placements {
            let Placement {
                player,
                team,
                position,
            } = placement;

            if players.iter().any(|p| p.name == player) {
                return Err(SetupError::DuplicatePlayer(player));
            }
            if !board.in_bounds(position) {
                return Err(SetupError::OutOfBounds { player, position });
            }
            if board.is_wall(position) {
                return Err(SetupError::OnWall { player, position });
            }
            if board.coin_at(position).is_some() {
                return Err(SetupError::OnCoin { player, position });
            }
            if players.iter().any(|p| p.position == position) {
                return Err(SetupError::Occupied { player, position });
            }

            match teams.iter_mut().find(|t| t.name == team) {
                Some(existing) => existing.add_member(player.clone()),
                None => {
                    let mut new_team = Team::new(team.clone());
                    new_team.add_member(player.clone());
                    teams.push(new_team);
                }
            }
            players.push(Player::new(player, team, position));
        }

        Ok(Self {
            board,
            players,
            teams,
            round: 0,
        })
    }

    /// The board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// All players in registration order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// All teams in order of first registration.
    #[must_use]
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Number of rounds resolved so far.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Number of players in the game.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by name.
    #[must_use]
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    /// Index of a player in registration order.
    #[must_use]
    pub(crate) fn player_index(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.name == name)
    }

    /// Get a team by name.
    #[must_use]
    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == name)
    }

    /// Get a mutable team by name.
    #[must_use]
    pub(crate) fn team_mut(&mut self, name: &str) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.name == name)
    }

    /// The player standing on a cell, if any.
    #[must_use]
    pub fn occupant(&self, coord: Coord) -> Option<&Player> {
        self.players.iter().find(|p| p.position == coord)
    }

    /// Check if any player stands on a cell.
    #[must_use]
    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.occupant(coord).is_some()
    }

    /// Current score of every team.
    #[must_use]
    pub fn scores(&self) -> BTreeMap<TeamName, u32> {
        self.teams
            .iter()
            .map(|t| (t.name.clone(), t.score()))
            .collect()
    }

    /// Sum of all team scores.
    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.teams.iter().map(Team::score).sum()
    }

    /// Check if the game is over (every coin collected).
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.board.all_coins_collected()
    }

    /// Team with the strictly highest score, or `None` on a tie.
    #[must_use]
    pub fn leader(&self) -> Option<&Team> {
        let best = self.teams.iter().map(Team::score).max()?;
        let mut leaders = self.teams.iter().filter(|t| t.score() == best);
        let leader = leaders.next()?;
        if leaders.next().is_some() {
            None
        } else {
            Some(leader)
        }
    }
}
