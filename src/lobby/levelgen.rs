//! Deterministic level generation.
//!
//! Walls, coins and start cells are drawn from one shuffled list of board
//! cells, so they never overlap. Layouts whose open cells are split by
//! walls are redrawn a bounded number of times.

use std::collections::{BTreeSet, VecDeque};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::config::{LevelConfig, MAX_CELLS};
use crate::game::{Board, CoinTier, Coord, Direction, Placement, PlayerName, SetupError, TeamName};

/// Redraws allowed before a disconnected layout is accepted.
const MAX_ATTEMPTS: u32 = 32;

/// Error type for level generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    /// Width or height is not positive.
    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: i16,
        /// Requested height.
        height: i16,
    },
    /// The board has more cells than a lobby may generate.
    #[error("board of {width}x{height} exceeds {max} cells", max = MAX_CELLS)]
    Oversized {
        /// Requested width.
        width: i16,
        /// Requested height.
        height: i16,
    },
    /// Nobody registered before START.
    #[error("cannot start a game with no players")]
    NoPlayers,
    /// The level places no coins, so it would be over before it began.
    #[error("level must place at least one coin")]
    NoCoins,
    /// Walls, coins and players do not fit on the board.
    #[error("level needs {needed} cells but the board only has {available}")]
    NotEnoughCells {
        /// Walls plus coins plus players.
        needed: usize,
        /// Cells on the board.
        available: usize,
    },
    /// The generated placements were rejected.
    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Generate a board and one start cell per roster entry.
///
/// The same config, seed and roster always produce the same level.
///
/// # Errors
///
/// Returns an error if the board is empty or oversized, the roster is
/// empty, no coins are requested, or the requested walls, coins and
/// players need more cells than the board has.
pub fn generate_level(
    config: &LevelConfig,
    seed: u64,
    roster: &[(PlayerName, TeamName)],
) -> Result<(Board, Vec<Placement>), LevelError> {
    let empty = Board::new(config.width, config.height).ok_or(LevelError::InvalidDimensions {
        width: config.width,
        height: config.height,
    })?;
    if config.cell_count() > MAX_CELLS {
        return Err(LevelError::Oversized {
            width: config.width,
            height: config.height,
        });
    }
    if roster.is_empty() {
        return Err(LevelError::NoPlayers);
    }
    if config.total_coins() == 0 {
        return Err(LevelError::NoCoins);
    }

    let walls = usize::from(config.walls);
    let needed = walls + config.total_coins() + roster.len();
    let available = empty.area();
    if needed > available {
        return Err(LevelError::NotEnoughCells { needed, available });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut cells: Vec<Coord> = empty.cells().collect();

    let mut attempt = 1;
    let mut board = loop {
        cells.shuffle(&mut rng);
        let mut board = empty.clone();
        for &coord in &cells[..walls] {
            board.add_wall(coord);
        }
        if is_connected(&board) {
            break board;
        }
        if attempt == MAX_ATTEMPTS {
            tracing::warn!(seed, "no connected layout found, keeping last attempt");
            break board;
        }
        attempt += 1;
    };

    let mut free = cells[walls..].iter().copied();
    for tier in CoinTier::ALL {
        for coord in free.by_ref().take(usize::from(config.coins_of(tier))) {
            board.place_coin(coord, tier);
        }
    }

    let placements = roster
        .iter()
        .zip(free)
        .map(|((player, team), coord)| Placement::new(player.clone(), team.clone(), coord))
        .collect();

    Ok((board, placements))
}

/// Check that every open cell is reachable from every other.
fn is_connected(board: &Board) -> bool {
    let open: BTreeSet<Coord> = board.cells().filter(|c| !board.is_wall(*c)).collect();
    let Some(&start) = open.iter().next() else {
        return true;
    };

    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(at) = queue.pop_front() {
        for direction in Direction::ALL {
            let next = at.step(direction);
            if open.contains(&next) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen.len() == open.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;

    fn roster(n: usize) -> Vec<(PlayerName, TeamName)> {
        (0..n)
            .map(|i| (format!("Player{i}"), format!("Team{}", i % 2)))
            .collect()
    }

    #[test]
    fn test_level_determinism() {
        let config = LevelConfig::default();
        let a = generate_level(&config, 12345, &roster(4)).unwrap();
        let b = generate_level(&config, 12345, &roster(4)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_level_different_seeds() {
        let config = LevelConfig::default();
        let a = generate_level(&config, 1, &roster(4)).unwrap();
        let b = generate_level(&config, 2, &roster(4)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_level_counts() {
        let config = LevelConfig::default();
        let (board, placements) = generate_level(&config, 7, &roster(4)).unwrap();
        assert_eq!(board.walls().count(), 7);
        assert_eq!(board.coins_of(CoinTier::One).count(), 3);
        assert_eq!(board.coins_of(CoinTier::Two).count(), 2);
        assert_eq!(board.coins_of(CoinTier::Three).count(), 1);
        assert_eq!(placements.len(), 4);

        for p in &placements {
            assert!(!board.is_wall(p.position));
            assert!(board.coin_at(p.position).is_none());
        }
        assert!(GameState::new(board, placements).is_ok());
    }

    #[test]
    fn test_level_is_connected() {
        let config = LevelConfig::default();
        for seed in 0..20 {
            let (board, _) = generate_level(&config, seed, &roster(2)).unwrap();
            assert!(is_connected(&board), "seed {seed}");
        }
    }

    #[test]
    fn test_level_errors() {
        let config = LevelConfig::default();
        assert_eq!(generate_level(&config, 0, &[]), Err(LevelError::NoPlayers));

        let tiny = LevelConfig {
            width: 2,
            height: 2,
            ..LevelConfig::default()
        };
        assert!(matches!(
            generate_level(&tiny, 0, &roster(1)),
            Err(LevelError::NotEnoughCells { available: 4, .. })
        ));

        let flat = LevelConfig {
            height: 0,
            ..LevelConfig::default()
        };
        assert!(matches!(
            generate_level(&flat, 0, &roster(1)),
            Err(LevelError::InvalidDimensions { .. })
        ));

        let huge = LevelConfig {
            width: i16::MAX,
            height: i16::MAX,
            ..LevelConfig::default()
        };
        assert_eq!(
            generate_level(&huge, 0, &roster(1)),
            Err(LevelError::Oversized {
                width: i16::MAX,
                height: i16::MAX
            })
        );

        let coinless = LevelConfig {
            coins: [0, 0, 0],
            ..LevelConfig::default()
        };
        assert_eq!(generate_level(&coinless, 0, &roster(2)), Err(LevelError::NoCoins));
    }

    #[test]
    fn test_connectivity_check() {
        let mut board = Board::new(3, 3).unwrap();
        assert!(is_connected(&board));
        for row in 0..3 {
            board.add_wall(Coord::new(row, 1));
        }
        assert!(!is_connected(&board));
    }
}
