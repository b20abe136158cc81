//! Board geometry: bounds, walls and coins.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::game::Direction;

/// Default board width (columns).
pub const DEFAULT_WIDTH: i16 = 10;

/// Default board height (rows).
pub const DEFAULT_HEIGHT: i16 = 10;

/// A cell on the board in `(row, col)` order.
///
/// Coordinates are signed so that a step off the edge of the board is still
/// representable and can be rejected by a bounds check. On the wire a
/// coordinate is a two-element array `[row, col]`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "[i16; 2]", into = "[i16; 2]")]
pub struct Coord {
    /// Row index, growing downwards.
    pub row: i16,
    /// Column index, growing to the right.
    pub col: i16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(row: i16, col: i16) -> Self {
        Self { row, col }
    }

    /// Coordinate shifted by the given row and column deltas.
    #[must_use]
    pub const fn offset(self, d_row: i16, d_col: i16) -> Self {
        Self {
            row: self.row.saturating_add(d_row),
            col: self.col.saturating_add(d_col),
        }
    }

    /// The neighbouring cell in the given direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (d_row, d_col) = direction.displacement();
        self.offset(d_row, d_col)
    }

    /// Manhattan distance to another coordinate.
    #[must_use]
    pub const fn manhattan(self, other: Coord) -> u32 {
        self.row.abs_diff(other.row) as u32 + self.col.abs_diff(other.col) as u32
    }
}

impl From<[i16; 2]> for Coord {
    fn from([row, col]: [i16; 2]) -> Self {
        Self::new(row, col)
    }
}

impl From<Coord> for [i16; 2] {
    fn from(coord: Coord) -> Self {
        [coord.row, coord.col]
    }
}

/// Value class of a coin. The tier is also its score contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CoinTier {
    /// Worth one point.
    One = 1,
    /// Worth two points.
    Two = 2,
    /// Worth three points.
    Three = 3,
}

impl CoinTier {
    /// All tiers in ascending value order.
    pub const ALL: [CoinTier; 3] = [CoinTier::One, CoinTier::Two, CoinTier::Three];

    /// Points awarded for collecting a coin of this tier.
    #[must_use]
    pub const fn value(self) -> u32 {
        self as u32
    }

    /// Look up a tier by its point value.
    #[must_use]
    pub const fn from_value(value: u32) -> Option<Self> {
        match value {
            1 => Some(CoinTier::One),
            2 => Some(CoinTier::Two),
            3 => Some(CoinTier::Three),
            _ => None,
        }
    }
}

/// The playing field.
///
/// Walls are fixed once a game starts; the only mutation available during
/// play is [`Board::remove_coin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Number of columns.
    width: i16,
    /// Number of rows.
    height: i16,
    /// Impassable cells.
    walls: BTreeSet<Coord>,
    /// Remaining coins, grouped by tier.
    coins: BTreeMap<CoinTier, BTreeSet<Coord>>,
}

impl Board {
    /// Create an empty board.
    ///
    /// Returns `None` if either dimension is not positive.
    #[must_use]
    pub fn new(width: i16, height: i16) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }

        Some(Self {
            width,
            height,
            walls: BTreeSet::new(),
            coins: BTreeMap::new(),
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> i16 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> i16 {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub fn area(&self) -> usize {
        usize::from(self.width.unsigned_abs()) * usize::from(self.height.unsigned_abs())
    }

    /// Check if a coordinate lies within `[0, height) x [0, width)`.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.row >= 0 && coord.row < self.height && coord.col >= 0 && coord.col < self.width
    }

    /// Check if a coordinate is a wall. Cells off the board are not walls.
    #[must_use]
    pub fn is_wall(&self, coord: Coord) -> bool {
        self.walls.contains(&coord)
    }

    /// Tier of the coin at the given cell, if any.
    #[must_use]
    pub fn coin_at(&self, coord: Coord) -> Option<CoinTier> {
        self.coins
            .iter()
            .find(|(_, cells)| cells.contains(&coord))
            .map(|(tier, _)| *tier)
    }

    /// Add a wall.
    ///
    /// Returns `false` if the cell is off the board or already holds a coin.
    pub fn add_wall(&mut self, coord: Coord) -> bool {
        if !self.in_bounds(coord) || self.coin_at(coord).is_some() {
            return false;
        }
        self.walls.insert(coord);
        true
    }

    /// Place a coin.
    ///
    /// Returns `false` if the cell is off the board, a wall, or already
    /// holds a coin.
    pub fn place_coin(&mut self, coord: Coord, tier: CoinTier) -> bool {
        if !self.in_bounds(coord) || self.is_wall(coord) || self.coin_at(coord).is_some() {
            return false;
        }
        self.coins.entry(tier).or_default().insert(coord);
        true
    }

    /// Remove the coin at the given cell and return its tier.
    ///
    /// Removing an absent coin is a no-op that returns `None`.
    pub fn remove_coin(&mut self, coord: Coord) -> Option<CoinTier> {
        let tier = self.coin_at(coord)?;
        if let Some(cells) = self.coins.get_mut(&tier) {
            cells.remove(&coord);
            if cells.is_empty() {
                self.coins.remove(&tier);
            }
        }
        Some(tier)
    }

    /// True once every coin of every tier has been collected.
    #[must_use]
    pub fn all_coins_collected(&self) -> bool {
        self.coins.values().all(BTreeSet::is_empty)
    }

    /// Number of coins still on the board.
    #[must_use]
    pub fn coin_count(&self) -> usize {
        self.coins.values().map(BTreeSet::len).sum()
    }

    /// Sum of the values of all coins still on the board.
    #[must_use]
    pub fn coin_value(&self) -> u32 {
        self.coins()
            .map(|(_, tier)| tier.value())
            .sum()
    }

    /// Iterate over wall cells in row-major order.
    pub fn walls(&self) -> impl Iterator<Item = Coord> + '_ {
        self.walls.iter().copied()
    }

    /// Iterate over the remaining coins of one tier.
    pub fn coins_of(&self, tier: CoinTier) -> impl Iterator<Item = Coord> + '_ {
        self.coins.get(&tier).into_iter().flatten().copied()
    }

    /// Iterate over all remaining coins with their tier.
    pub fn coins(&self) -> impl Iterator<Item = (Coord, CoinTier)> + '_ {
        self.coins
            .iter()
            .flat_map(|(tier, cells)| cells.iter().map(move |coord| (*coord, *tier)))
    }

    /// Iterate over every in-bounds cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Coord> + use<> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |row| (0..width).map(move |col| Coord::new(row, col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_zero_size() {
        assert!(Board::new(0, 10).is_none());
        assert!(Board::new(10, -1).is_none());
    }

    #[test]
    fn test_board_bounds() {
        let board = Board::new(10, 10).unwrap();
        assert!(board.in_bounds(Coord::new(0, 0)));
        assert!(board.in_bounds(Coord::new(9, 9)));
        assert!(!board.in_bounds(Coord::new(10, 0)));
        assert!(!board.in_bounds(Coord::new(0, 10)));
        assert!(!board.in_bounds(Coord::new(-1, 3)));
        assert!(!board.in_bounds(Coord::new(3, -1)));
    }

    #[test]
    fn test_walls() {
        let mut board = Board::new(10, 10).unwrap();
        assert!(board.add_wall(Coord::new(4, 4)));
        assert!(board.is_wall(Coord::new(4, 4)));
        assert!(!board.is_wall(Coord::new(4, 5)));
        assert!(!board.add_wall(Coord::new(10, 4)));
    }

    #[test]
    fn test_coin_placement_and_lookup() {
        let mut board = Board::new(10, 10).unwrap();
        board.add_wall(Coord::new(1, 1));
        assert!(board.place_coin(Coord::new(2, 2), CoinTier::Two));
        assert!(!board.place_coin(Coord::new(2, 2), CoinTier::One));
        assert!(!board.place_coin(Coord::new(1, 1), CoinTier::One));
        assert_eq!(board.coin_at(Coord::new(2, 2)), Some(CoinTier::Two));
        assert_eq!(board.coin_at(Coord::new(3, 3)), None);
        assert_eq!(board.coin_count(), 1);
        assert_eq!(board.coin_value(), 2);
    }

    #[test]
    fn test_remove_coin_is_idempotent() {
        let mut board = Board::new(10, 10).unwrap();
        board.place_coin(Coord::new(5, 5), CoinTier::Three);
        board.place_coin(Coord::new(6, 6), CoinTier::One);

        assert_eq!(board.remove_coin(Coord::new(5, 5)), Some(CoinTier::Three));
        let once = board.clone();
        assert_eq!(board.remove_coin(Coord::new(5, 5)), None);
        assert_eq!(board, once);
    }

    #[test]
    fn test_all_coins_collected() {
        let mut board = Board::new(10, 10).unwrap();
        assert!(board.all_coins_collected());

        board.place_coin(Coord::new(0, 0), CoinTier::One);
        assert!(!board.all_coins_collected());

        board.remove_coin(Coord::new(0, 0));
        assert!(board.all_coins_collected());
        assert_eq!(board.coins_of(CoinTier::One).count(), 0);
    }

    #[test]
    fn test_coord_wire_format() {
        let json = serde_json::to_string(&Coord::new(6, 4)).unwrap();
        assert_eq!(json, "[6,4]");
        let back: Coord = serde_json::from_str("[8,6]").unwrap();
        assert_eq!(back, Coord::new(8, 6));
    }

    #[test]
    fn test_coord_step() {
        let c = Coord::new(2, 2);
        assert_eq!(c.step(Direction::Up), Coord::new(1, 2));
        assert_eq!(c.step(Direction::Down), Coord::new(3, 2));
        assert_eq!(c.step(Direction::Left), Coord::new(2, 1));
        assert_eq!(c.step(Direction::Right), Coord::new(2, 3));
        assert_eq!(Coord::new(0, 0).step(Direction::Up), Coord::new(-1, 0));
    }

    #[test]
    fn test_cells_row_major() {
        let board = Board::new(3, 2).unwrap();
        let cells: Vec<_> = board.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Coord::new(0, 0));
        assert_eq!(cells[3], Coord::new(1, 0));
        assert_eq!(board.area(), 6);
    }
}
