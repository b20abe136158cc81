//! Lobby registry: owns every session and routes commands to them.

use std::collections::HashMap;

use crate::config::LevelConfig;
use crate::lobby::{lobby_hash, Command, LobbyName, Outbound, Session, LOBBY_NOT_FOUND};

/// All lobbies handled by one worker.
///
/// Lobbies are created on first registration and dropped as soon as they
/// finish, so a later command for a finished lobby gets a not-found
/// notice.
#[derive(Debug, Clone, Default)]
pub struct LobbyRegistry {
    sessions: HashMap<LobbyName, Session>,
    level: LevelConfig,
}

impl LobbyRegistry {
    /// Create an empty registry that builds every level from `level`.
    #[must_use]
    pub fn new(level: LevelConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            level,
        }
    }

    /// Apply one command and return everything it publishes.
    pub fn handle(&mut self, command: Command) -> Vec<Outbound> {
        match command {
            Command::NewPlayer {
                lobby,
                team,
                player,
            } => {
                let session = self.sessions.entry(lobby).or_insert_with_key(|name| {
                    tracing::info!(lobby = %name, "lobby created");
                    Session::new(name.clone())
                });
                session.register(&team, &player)
            }
            Command::Start { lobby } => {
                let seed = self.seed_for(&lobby);
                let level = self.level;
                self.with_session(&lobby, |session| session.start(&level, seed))
            }
            Command::Stop { lobby } => self.with_session(&lobby, Session::stop),
            Command::Move {
                lobby,
                player,
                direction,
            } => self.with_session(&lobby, |session| session.submit_move(&player, direction)),
        }
    }

    /// Run `f` on an existing session, dropping it if it finishes.
    fn with_session(
        &mut self,
        lobby: &str,
        f: impl FnOnce(&mut Session) -> Vec<Outbound>,
    ) -> Vec<Outbound> {
        let Some(session) = self.sessions.get_mut(lobby) else {
            tracing::warn!(lobby, "command for unknown lobby");
            return vec![Outbound::error(lobby, LOBBY_NOT_FOUND)];
        };

        let out = f(session);
        if session.is_finished() {
            self.sessions.remove(lobby);
            tracing::info!(lobby, remaining = self.sessions.len(), "lobby released");
        }
        out
    }

    /// Seed for a lobby's level: the configured seed mixed with the lobby
    /// name, or fresh entropy.
    fn seed_for(&self, lobby: &str) -> u64 {
        match self.level.seed {
            Some(seed) => seed ^ lobby_hash(lobby),
            None => rand::random(),
        }
    }

    /// Look up a live session.
    #[must_use]
    pub fn session(&self, lobby: &str) -> Option<&Session> {
        self.sessions.get(lobby)
    }

    /// Number of live lobbies.
    #[must_use]
    pub fn lobby_count(&self) -> usize {
        self.sessions.len()
    }
}
