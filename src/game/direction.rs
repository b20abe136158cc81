//! Movement directions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four moves a player can request each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Row - 1.
    Up,
    /// Row + 1.
    Down,
    /// Column - 1.
    Left,
    /// Column + 1.
    Right,
}

impl Direction {
    /// All directions in wire order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// `(row, col)` displacement of this move.
    #[must_use]
    pub const fn displacement(self) -> (i16, i16) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Wire name of this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A direction string that is not one of `UP`, `DOWN`, `LEFT`, `RIGHT`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown direction {0:?} (expected UP, DOWN, LEFT or RIGHT)")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UP" => Ok(Direction::Up),
            "DOWN" => Ok(Direction::Down),
            "LEFT" => Ok(Direction::Left),
            "RIGHT" => Ok(Direction::Right),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_wire_names() {
        for direction in Direction::ALL {
            assert_eq!(direction.as_str().parse::<Direction>().unwrap(), direction);
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("up".parse::<Direction>().is_err());
        assert!("UP ".parse::<Direction>().is_err());
        assert!("NORTH".parse::<Direction>().is_err());
    }

    #[test]
    fn test_displacements() {
        assert_eq!(Direction::Up.displacement(), (-1, 0));
        assert_eq!(Direction::Down.displacement(), (1, 0));
        assert_eq!(Direction::Left.displacement(), (0, -1));
        assert_eq!(Direction::Right.displacement(), (0, 1));
    }
}
