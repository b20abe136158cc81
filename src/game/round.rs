//! Per-round move buffer.
//!
//! Moves are kept in an explicit arrival-ordered queue. The resolver walks
//! the queue front to back, so the player whose first submission arrived
//! earliest gets the first claim on a contested cell.

use crate::game::{Direction, PlayerName};

/// A move waiting for the round to fill up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    /// Submitting player.
    pub player: PlayerName,
    /// Requested direction.
    pub direction: Direction,
}

/// What happened to a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// First move from this player this round; appended to the queue.
    Queued,
    /// The player already had a pending move; its direction was replaced
    /// and its queue position kept.
    Replaced {
        /// The direction that was overwritten.
        previous: Direction,
    },
}

/// Arrival-ordered queue holding at most one move per player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundBuffer {
    /// Moves in order of first arrival.
    queue: Vec<PendingMove>,
}

impl RoundBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a move. A repeat submission overwrites the pending direction.
    pub fn submit(&mut self, player: impl Into<PlayerName>, direction: Direction) -> Submission {
        let player = player.into();
        if let Some(pending) = self.queue.iter_mut().find(|m| m.player == player) {
            let previous = pending.direction;
            pending.direction = direction;
            return Submission::Replaced { previous };
        }
        self.queue.push(PendingMove { player, direction });
        Submission::Queued
    }

    /// Number of players with a pending move.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if no moves are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Check if a player already has a pending move.
    #[must_use]
    pub fn contains(&self, player: &str) -> bool {
        self.queue.iter().any(|m| m.player == player)
    }

    /// Pending moves in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingMove> {
        self.queue.iter()
    }

    /// Drop every pending move.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<'a> IntoIterator for &'a RoundBuffer {
    type Item = &'a PendingMove;
    type IntoIter = std::slice::Iter<'a, PendingMove>;

    fn into_iter(self) -> Self::IntoIter {
        self.queue.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrival_order_is_kept() {
        let mut buffer = RoundBuffer::new();
        buffer.submit("b", Direction::Up);
        buffer.submit("a", Direction::Down);
        buffer.submit("c", Direction::Left);

        let order: Vec<_> = buffer.iter().map(|m| m.player.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_resubmission_overwrites_in_place() {
        let mut buffer = RoundBuffer::new();
        assert_eq!(buffer.submit("a", Direction::Up), Submission::Queued);
        buffer.submit("b", Direction::Up);
        assert_eq!(
            buffer.submit("a", Direction::Right),
            Submission::Replaced {
                previous: Direction::Up
            }
        );

        assert_eq!(buffer.len(), 2);
        let first = buffer.iter().next().unwrap();
        assert_eq!(first.player, "a");
        assert_eq!(first.direction, Direction::Right);
    }

    #[test]
    fn test_clear() {
        let mut buffer = RoundBuffer::new();
        buffer.submit("a", Direction::Up);
        assert!(buffer.contains("a"));
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(!buffer.contains("a"));
    }
}
