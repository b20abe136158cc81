//! Player and team records.

use crate::game::{CoinTier, Coord};

/// Name of a player, unique within a lobby.
pub type PlayerName = String;

/// Name of a team, unique within a lobby.
pub type TeamName = String;

/// State for a single player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Unique name of this player.
    pub name: PlayerName,
    /// Team this player belongs to.
    pub team: TeamName,
    /// Current cell.
    pub position: Coord,
    /// Set while a round is being resolved once the player's move has been
    /// processed. Cleared at the start of every round.
    pub has_moved: bool,
}

impl Player {
    /// Create a new player at the given position.
    #[must_use]
    pub fn new(name: impl Into<PlayerName>, team: impl Into<TeamName>, position: Coord) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
            position,
            has_moved: false,
        }
    }

    /// Check if this player is on the given team.
    #[must_use]
    pub fn is_on_team(&self, team: &str) -> bool {
        self.team == team
    }
}

/// A team and its running score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Unique name of this team.
    pub name: TeamName,
    /// Members in registration order.
    pub members: Vec<PlayerName>,
    /// Points collected so far. Never decreases.
    score: u32,
}

impl Team {
    /// Create an empty team with a zero score.
    #[must_use]
    pub fn new(name: impl Into<TeamName>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            score: 0,
        }
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Add a member if not already present.
    pub fn add_member(&mut self, player: impl Into<PlayerName>) {
        let player = player.into();
        if !self.members.contains(&player) {
            self.members.push(player);
        }
    }

    /// Check if a player is on this team.
    #[must_use]
    pub fn has_member(&self, player: &str) -> bool {
        self.members.iter().any(|m| m == player)
    }

    /// Credit the team with a collected coin.
    pub fn award(&mut self, tier: CoinTier) {
        self.score = self.score.saturating_add(tier.value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let player = Player::new("Player1", "ATeam", Coord::new(5, 5));
        assert_eq!(player.name, "Player1");
        assert!(player.is_on_team("ATeam"));
        assert!(!player.is_on_team("BTeam"));
        assert!(!player.has_moved);
    }

    #[test]
    fn test_team_members_are_unique() {
        let mut team = Team::new("ATeam");
        team.add_member("Player1");
        team.add_member("Player2");
        team.add_member("Player1");
        assert_eq!(team.members, vec!["Player1", "Player2"]);
        assert!(team.has_member("Player2"));
    }

    #[test]
    fn test_team_award() {
        let mut team = Team::new("ATeam");
        assert_eq!(team.score(), 0);
        team.award(CoinTier::Three);
        team.award(CoinTier::One);
        assert_eq!(team.score(), 4);
    }
}
