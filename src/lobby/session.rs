//! One lobby's lifecycle.

use crate::config::LevelConfig;
use crate::game::{
    check_invariants, project_all, resolve_round, Direction, GameState, PlayerName, RoundBuffer,
    Submission, TeamName,
};
use crate::lobby::{
    generate_level, LevelError, LobbyName, Outbound, ALREADY_STARTED, GAME_OVER_COINS,
    GAME_OVER_STOPPED, GAME_STARTED,
};

/// Public view of a session's lifecycle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Accepting registrations.
    Assembling,
    /// Playing rounds.
    Active,
    /// Over. No further commands have any effect.
    Finished,
}

#[derive(Debug, Clone)]
enum Stage {
    Assembling {
        roster: Vec<(PlayerName, TeamName)>,
    },
    Active {
        state: GameState,
        buffer: RoundBuffer,
    },
    Finished,
}

/// A lobby: its roster while assembling, then its game and round buffer.
///
/// Every method returns the publications it produced. A session never
/// panics on bad input and never leaves its game half-updated.
#[derive(Debug, Clone)]
pub struct Session {
    name: LobbyName,
    stage: Stage,
}

impl Session {
    /// Create an empty lobby in the assembling phase.
    #[must_use]
    pub fn new(name: impl Into<LobbyName>) -> Self {
        Self {
            name: name.into(),
            stage: Stage::Assembling { roster: Vec::new() },
        }
    }

    /// Lobby name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self.stage {
            Stage::Assembling { .. } => Phase::Assembling,
            Stage::Active { .. } => Phase::Active,
            Stage::Finished => Phase::Finished,
        }
    }

    /// Check if the session has reached its terminal phase.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.stage, Stage::Finished)
    }

    /// The running game, while active.
    #[must_use]
    pub const fn state(&self) -> Option<&GameState> {
        match &self.stage {
            Stage::Active { state, .. } => Some(state),
            _ => None,
        }
    }

    /// Registered players and their teams, while assembling.
    #[must_use]
    pub fn roster(&self) -> &[(PlayerName, TeamName)] {
        match &self.stage {
            Stage::Assembling { roster } => roster,
            _ => &[],
        }
    }

    /// Number of moves waiting for the round to fill.
    #[must_use]
    pub fn pending_moves(&self) -> usize {
        match &self.stage {
            Stage::Active { buffer, .. } => buffer.len(),
            _ => 0,
        }
    }

    /// Register a player onto a team.
    pub fn register(&mut self, team: &str, player: &str) -> Vec<Outbound> {
        let Stage::Assembling { roster } = &mut self.stage else {
            tracing::warn!(lobby = %self.name, player, "registration after start");
            return vec![Outbound::error(&self.name, ALREADY_STARTED)];
        };

        if roster.iter().any(|(name, _)| name == player) {
            tracing::warn!(lobby = %self.name, player, "duplicate registration");
            return vec![Outbound::error(
                &self.name,
                format!("Player {player} is already registered"),
            )];
        }

        roster.push((player.to_string(), team.to_string()));
        tracing::info!(lobby = %self.name, team, player, "player registered");
        Vec::new()
    }

    /// Generate the level and begin play.
    ///
    /// On success publishes a start notice, every player's view and the
    /// initial scores. A failed start leaves the lobby assembling.
    pub fn start(&mut self, level: &LevelConfig, seed: u64) -> Vec<Outbound> {
        let Stage::Assembling { roster } = &self.stage else {
            tracing::warn!(lobby = %self.name, "start after start");
            return vec![Outbound::error(&self.name, ALREADY_STARTED)];
        };

        let state = match build_game(level, seed, roster) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(lobby = %self.name, error = %e, "start failed");
                return vec![Outbound::error(&self.name, e)];
            }
        };

        tracing::info!(
            lobby = %self.name,
            players = state.player_count(),
            teams = state.teams().len(),
            seed,
            "game started"
        );

        let mut out = vec![Outbound::notice(&self.name, GAME_STARTED)];
        out.extend(round_publications(&self.name, &state));
        self.stage = Stage::Active {
            state,
            buffer: RoundBuffer::new(),
        };
        out
    }

    /// End the game immediately, discarding any partial round.
    pub fn stop(&mut self) -> Vec<Outbound> {
        tracing::info!(lobby = %self.name, phase = ?self.phase(), "game stopped");
        self.stage = Stage::Finished;
        vec![Outbound::notice(&self.name, GAME_OVER_STOPPED)]
    }

    /// Buffer a move, resolving the round once every player has one.
    pub fn submit_move(&mut self, player: &str, direction: Direction) -> Vec<Outbound> {
        let Stage::Active { state, buffer } = &mut self.stage else {
            tracing::warn!(lobby = %self.name, player, "move outside an active game");
            return vec![Outbound::error(&self.name, "Game has not started")];
        };

        if state.player(player).is_none() {
            tracing::warn!(lobby = %self.name, player, "move from unknown player");
            return vec![Outbound::error(
                &self.name,
                format!("Player {player} is not in this game"),
            )];
        }

        if let Submission::Replaced { previous } = buffer.submit(player, direction) {
            tracing::debug!(lobby = %self.name, player, %previous, %direction, "move replaced");
        }

        if buffer.len() < state.player_count() {
            return Vec::new();
        }
        self.play_round()
    }

    /// Resolve the buffered round on a scratch copy and commit it.
    ///
    /// A resolution error or broken invariant abandons the round: the
    /// committed state is untouched, the buffer is cleared and the lobby
    /// gets an error notice.
    fn play_round(&mut self) -> Vec<Outbound> {
        let Stage::Active { state, buffer } = &mut self.stage else {
            return Vec::new();
        };

        let mut scratch = state.clone();
        let result = resolve_round(&mut scratch, &*buffer);
        buffer.clear();

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(lobby = %self.name, error = %e, "round abandoned");
                return vec![Outbound::error(&self.name, e)];
            }
        };

        let violations = check_invariants(&scratch);
        if let Some(first) = violations.first() {
            tracing::error!(
                lobby = %self.name,
                count = violations.len(),
                error = %first,
                "round abandoned"
            );
            return vec![Outbound::error(&self.name, first)];
        }

        *state = scratch;
        tracing::debug!(
            lobby = %self.name,
            round = report.round,
            accepted = report.accepted(),
            rejected = report.rejected(),
            "round resolved"
        );

        let mut out = round_publications(&self.name, state);
        if report.game_over {
            tracing::info!(lobby = %self.name, round = report.round, scores = ?state.scores(), "game over");
            out.push(Outbound::notice(&self.name, GAME_OVER_COINS));
            self.stage = Stage::Finished;
        }
        out
    }
}

/// Every player's view in registration order, then the team scores.
fn round_publications(lobby: &str, state: &GameState) -> Vec<Outbound> {
    let mut out: Vec<Outbound> = project_all(state)
        .into_iter()
        .map(|view| Outbound::GameState {
            lobby: lobby.to_string(),
            payload: view.to_payload(),
            player: view.player,
        })
        .collect();
    out.push(Outbound::Scores {
        lobby: lobby.to_string(),
        scores: state.scores(),
    });
    out
}

fn build_game(
    level: &LevelConfig,
    seed: u64,
    roster: &[(PlayerName, TeamName)],
) -> Result<GameState, LevelError> {
    let (board, placements) = generate_level(level, seed, roster)?;
    Ok(GameState::new(board, placements)?)
}
