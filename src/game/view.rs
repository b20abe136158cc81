//! Egocentric 5x5 views.
//!
//! A view is a pure read of the game state centered on one player. It is
//! rebuilt for every player after each round and converted to the wire
//! payload published on the player's `game_state` topic.

use serde::{Deserialize, Serialize};

use crate::game::{CoinTier, Coord, GameState, Player, PlayerName};

/// Cells visible in each direction from the observer.
pub const VIEW_RADIUS: i16 = 2;

/// Side length of a view.
pub const VIEW_SIZE: usize = 5;

/// Classification of one cell in a view.
///
/// When several apply, the first in declaration order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    /// The observing player.
    Own,
    /// A player on the observer's team.
    Teammate,
    /// A player on any other team.
    Enemy,
    /// A wall.
    Wall,
    /// A coin of the given tier.
    Coin(CoinTier),
    /// Outside the board.
    OutOfBounds,
    /// Free board cell.
    Empty,
}

/// One player's window onto the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    /// Observing player.
    pub player: PlayerName,
    /// Observer's position, the center of the window.
    pub center: Coord,
    /// Names of every other member of the observer's team.
    pub teammate_names: Vec<PlayerName>,
    /// Cells indexed `[row][col]`, observer at `[2][2]`.
    cells: [[Cell; VIEW_SIZE]; VIEW_SIZE],
}

impl PlayerView {
    /// Cell at a `(row, col)` offset from the center, each in `-2..=2`.
    #[must_use]
    pub fn at(&self, d_row: i16, d_col: i16) -> Option<Cell> {
        let row = usize::try_from(d_row.checked_add(VIEW_RADIUS)?).ok()?;
        let col = usize::try_from(d_col.checked_add(VIEW_RADIUS)?).ok()?;
        self.cells.get(row)?.get(col).copied()
    }

    /// Rows of the window from top to bottom.
    #[must_use]
    pub fn rows(&self) -> &[[Cell; VIEW_SIZE]; VIEW_SIZE] {
        &self.cells
    }

    /// Iterate over every cell with its absolute board coordinate.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Cell)> + '_ {
        let origin = self.center.offset(-VIEW_RADIUS, -VIEW_RADIUS);
        self.cells.iter().zip(0i16..).flat_map(move |(row, r)| {
            row.iter()
                .zip(0i16..)
                .map(move |(cell, c)| (origin.offset(r, c), *cell))
        })
    }

    /// Absolute coordinates of every cell matching a predicate.
    fn positions(&self, wanted: impl Fn(Cell) -> bool) -> Vec<Coord> {
        self.iter()
            .filter(|(_, cell)| wanted(*cell))
            .map(|(coord, _)| coord)
            .collect()
    }

    /// Convert to the wire payload.
    #[must_use]
    pub fn to_payload(&self) -> GameStatePayload {
        GameStatePayload {
            teammate_names: self.teammate_names.clone(),
            teammate_positions: self.positions(|c| c == Cell::Teammate),
            enemy_positions: self.positions(|c| c == Cell::Enemy),
            current_position: self.center,
            coin1: self.positions(|c| c == Cell::Coin(CoinTier::One)),
            coin2: self.positions(|c| c == Cell::Coin(CoinTier::Two)),
            coin3: self.positions(|c| c == Cell::Coin(CoinTier::Three)),
            walls: self.positions(|c| c == Cell::Wall),
        }
    }
}

/// Per-player state as published on the bus.
///
/// Every list holds absolute `[row, col]` coordinates of cells inside the
/// player's 5x5 window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatePayload {
    /// Every other member of the player's team, visible or not.
    pub teammate_names: Vec<PlayerName>,
    /// Visible teammates.
    pub teammate_positions: Vec<Coord>,
    /// Visible players from other teams.
    pub enemy_positions: Vec<Coord>,
    /// The player's own position.
    pub current_position: Coord,
    /// Visible tier 1 coins.
    pub coin1: Vec<Coord>,
    /// Visible tier 2 coins.
    pub coin2: Vec<Coord>,
    /// Visible tier 3 coins.
    pub coin3: Vec<Coord>,
    /// Visible walls.
    pub walls: Vec<Coord>,
}

impl GameStatePayload {
    /// Visible coins of every tier.
    pub fn coins(&self) -> impl Iterator<Item = (Coord, CoinTier)> + '_ {
        let tiers = [
            (&self.coin1, CoinTier::One),
            (&self.coin2, CoinTier::Two),
            (&self.coin3, CoinTier::Three),
        ];
        tiers
            .into_iter()
            .flat_map(|(cells, tier)| cells.iter().map(move |c| (*c, tier)))
    }

    /// Check if a visible cell blocks movement (wall or any player).
    #[must_use]
    pub fn is_blocked(&self, coord: Coord) -> bool {
        self.walls.contains(&coord)
            || self.teammate_positions.contains(&coord)
            || self.enemy_positions.contains(&coord)
    }
}

/// Classify one absolute cell from the observer's point of view.
fn classify(state: &GameState, observer: &Player, coord: Coord) -> Cell {
    if coord == observer.position {
        return Cell::Own;
    }
    if let Some(other) = state.occupant(coord) {
        return if other.team == observer.team {
            Cell::Teammate
        } else {
            Cell::Enemy
        };
    }
    let board = state.board();
    if board.is_wall(coord) {
        Cell::Wall
    } else if let Some(tier) = board.coin_at(coord) {
        Cell::Coin(tier)
    } else if !board.in_bounds(coord) {
        Cell::OutOfBounds
    } else {
        Cell::Empty
    }
}

/// Build the view for one player.
///
/// Returns `None` if the player is not in the game.
#[must_use]
pub fn project_view(state: &GameState, player: &str) -> Option<PlayerView> {
    let observer = state.player(player)?;
    let center = observer.position;

    let mut cells = [[Cell::Empty; VIEW_SIZE]; VIEW_SIZE];
    for (row, d_row) in cells.iter_mut().zip(-VIEW_RADIUS..=VIEW_RADIUS) {
        for (cell, d_col) in row.iter_mut().zip(-VIEW_RADIUS..=VIEW_RADIUS) {
            *cell = classify(state, observer, center.offset(d_row, d_col));
        }
    }

    let teammate_names = state
        .team(&observer.team)
        .map(|team| {
            team.members
                .iter()
                .filter(|m| **m != observer.name)
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    Some(PlayerView {
        player: observer.name.clone(),
        center,
        teammate_names,
        cells,
    })
}

/// Build the view for every player, in registration order.
#[must_use]
pub fn project_all(state: &GameState) -> Vec<PlayerView> {
    state
        .players()
        .iter()
        .filter_map(|p| project_view(state, &p.name))
        .collect()
}
