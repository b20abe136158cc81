//! Self-play simulation.
//!
//! Provides a pure function interface: `(seed, spec) -> SimulationResult`
//!
//! A simulated lobby runs through the same path a live one does: bots
//! publish encoded commands, the transport decodes them, a
//! [`LobbyRegistry`] handles them, and bots read the encoded results back.
//! Independent lobbies run in parallel with rayon.

mod bots;

pub use bots::{choose_direction, open_directions, Strategy};

use std::collections::{BTreeMap, HashMap};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::config::LevelConfig;
use crate::game::{GameStatePayload, PlayerName, TeamName};
use crate::lobby::{
    Command, LobbyRegistry, ERROR_PREFIX, GAME_OVER_COINS, GAME_OVER_STOPPED, GAME_STARTED,
};
use crate::transport::{
    decode, encode_command, game_state_topic, lobby_topic, publish_all, scores_topic, DecodeError,
    EncodeError, PublishError, RecordingPublisher,
};

/// Shape of a simulated lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationSpec {
    /// Number of teams.
    pub teams: u8,
    /// Players on each team.
    pub players_per_team: u8,
    /// Round cap; the lobby is stopped once it is reached.
    pub max_rounds: u32,
    /// The first `greedy_teams` teams play greedy, the rest random.
    pub greedy_teams: u8,
    /// Level to generate. Its seed is replaced by the game seed.
    pub level: LevelConfig,
}

impl Default for SimulationSpec {
    fn default() -> Self {
        Self {
            teams: 2,
            players_per_team: 2,
            max_rounds: 200,
            greedy_teams: 1,
            level: LevelConfig::default(),
        }
    }
}

/// How a simulated game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    /// Every coin was collected.
    AllCoinsCollected,
    /// The round cap was hit and the lobby stopped.
    RoundLimit,
}

/// Result of one simulated game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationResult {
    /// Game seed.
    pub seed: u64,
    /// Rounds resolved.
    pub rounds: u32,
    /// How the game ended.
    pub ending: Ending,
    /// Final score of every team.
    pub scores: BTreeMap<TeamName, u32>,
    /// Team with the strictly highest score, if any.
    pub winner: Option<TeamName>,
    /// Strategy each team played.
    pub strategies: BTreeMap<TeamName, Strategy>,
    /// Messages published by the server.
    pub publications: usize,
}

/// A simulated game that could not be played to the end.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The simulation asks for no players.
    #[error("simulation needs at least one team with one player")]
    NoPlayers,
    /// The server refused to start the lobby.
    #[error("lobby failed to start: {0}")]
    StartFailed(String),
    /// The server published an error notice mid-game.
    #[error("server reported: {0}")]
    ServerError(String),
    /// A player never received a view.
    #[error("no game state received for {0}")]
    MissingView(PlayerName),
    /// A round did not resolve after every player moved.
    #[error("round {0} did not resolve")]
    Stalled(u32),
    /// A bot command failed to encode.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// A bot command failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A server result failed to publish.
    #[error(transparent)]
    Publish(#[from] PublishError),
    /// A published payload was not valid JSON.
    #[error("unreadable payload: {0}")]
    Payload(#[from] serde_json::Error),
}

struct Bot {
    name: PlayerName,
    strategy: Strategy,
}

/// What the bots have read off the bus so far.
#[derive(Default)]
struct Observed {
    views: HashMap<PlayerName, GameStatePayload>,
    scores: BTreeMap<TeamName, u32>,
    resolved: bool,
    finished: Option<Ending>,
    error: Option<String>,
}

/// One lobby plus the bus it publishes on.
struct Harness {
    lobby: String,
    registry: LobbyRegistry,
    bus: RecordingPublisher,
    published: usize,
}

impl Harness {
    /// Publish a command as a client would and let the server handle it.
    fn send(&mut self, command: &Command) -> Result<(), SimulationError> {
        let wire = encode_command(command)?;
        let decoded = decode(&wire.topic, wire.payload.as_bytes())?;
        let out = self.registry.handle(decoded);
        self.published += publish_all(&mut self.bus, &out)?;
        Ok(())
    }

    /// Read everything published since the last call.
    fn observe(&mut self, bots: &[Bot], seen: &mut Observed) -> Result<(), SimulationError> {
        let notices = lobby_topic(&self.lobby);
        let scores = scores_topic(&self.lobby);

        for publication in self.bus.take() {
            if publication.topic == scores {
                seen.scores = serde_json::from_str(&publication.payload)?;
                seen.resolved = true;
            } else if publication.topic == notices {
                match publication.payload.as_str() {
                    GAME_OVER_COINS => seen.finished = Some(Ending::AllCoinsCollected),
                    GAME_OVER_STOPPED => seen.finished = Some(Ending::RoundLimit),
                    GAME_STARTED => {}
                    text => {
                        if let Some(error) = text.strip_prefix(ERROR_PREFIX) {
                            seen.error = Some(error.to_string());
                        }
                    }
                }
            } else if let Some(bot) = bots
                .iter()
                .find(|b| publication.topic == game_state_topic(&self.lobby, &b.name))
            {
                let view = serde_json::from_str(&publication.payload)?;
                seen.views.insert(bot.name.clone(), view);
            }
        }
        Ok(())
    }
}

/// Play one lobby to the end with built-in bots.
///
/// The same seed and settings always produce the same result.
///
/// # Errors
///
/// Returns an error if the lobby cannot start, the server reports an
/// error, or a round fails to resolve.
pub fn simulate_lobby(seed: u64, spec: &SimulationSpec) -> Result<SimulationResult, SimulationError> {
    if spec.teams == 0 || spec.players_per_team == 0 {
        return Err(SimulationError::NoPlayers);
    }

    let lobby = format!("sim{seed:016x}");
    let level = LevelConfig {
        seed: Some(seed),
        ..spec.level
    };
    let mut harness = Harness {
        lobby: lobby.clone(),
        registry: LobbyRegistry::new(level),
        bus: RecordingPublisher::new(),
        published: 0,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut bots = Vec::new();
    let mut strategies = BTreeMap::new();
    for t in 0..spec.teams {
        let team = format!("Team{t}");
        let strategy = if t < spec.greedy_teams {
            Strategy::Greedy
        } else {
            Strategy::Random
        };
        strategies.insert(team.clone(), strategy);
        for p in 0..spec.players_per_team {
            let name = format!("T{t}P{p}");
            harness.send(&Command::NewPlayer {
                lobby: lobby.clone(),
                team: team.clone(),
                player: name.clone(),
            })?;
            bots.push(Bot { name, strategy });
        }
    }

    let mut seen = Observed::default();
    harness.send(&Command::Start {
        lobby: lobby.clone(),
    })?;
    harness.observe(&bots, &mut seen)?;
    if let Some(error) = seen.error.take() {
        return Err(SimulationError::StartFailed(error));
    }

    let mut rounds = 0;
    while seen.finished.is_none() && rounds < spec.max_rounds {
        seen.resolved = false;
        for bot in &bots {
            let view = seen
                .views
                .get(&bot.name)
                .ok_or_else(|| SimulationError::MissingView(bot.name.clone()))?;
            let direction =
                choose_direction(bot.strategy, view, level.width, level.height, &mut rng);
            harness.send(&Command::Move {
                lobby: lobby.clone(),
                player: bot.name.clone(),
                direction,
            })?;
        }
        harness.observe(&bots, &mut seen)?;
        if let Some(error) = seen.error.take() {
            return Err(SimulationError::ServerError(error));
        }
        if !seen.resolved {
            return Err(SimulationError::Stalled(rounds + 1));
        }
        rounds += 1;
    }

    if seen.finished.is_none() {
        harness.send(&Command::Stop {
            lobby: lobby.clone(),
        })?;
        harness.observe(&bots, &mut seen)?;
    }

    let ending = seen.finished.unwrap_or(Ending::RoundLimit);
    let winner = leader(&seen.scores);
    tracing::debug!(seed, rounds, ?ending, ?winner, "simulation finished");

    Ok(SimulationResult {
        seed,
        rounds,
        ending,
        scores: seen.scores,
        winner,
        strategies,
        publications: harness.published,
    })
}

/// Team with the strictly highest score.
fn leader(scores: &BTreeMap<TeamName, u32>) -> Option<TeamName> {
    let best = scores.values().max()?;
    let mut leaders = scores.iter().filter(|(_, s)| *s == best);
    let (name, _) = leaders.next()?;
    leaders.next().is_none().then(|| name.clone())
}

/// Play `games` independent lobbies in parallel, seeded
/// `base_seed, base_seed + 1, ...`. Results are in seed order.
#[must_use]
pub fn simulate_many(
    base_seed: u64,
    games: u64,
    spec: &SimulationSpec,
) -> Vec<Result<SimulationResult, SimulationError>> {
    (0..games)
        .into_par_iter()
        .map(|i| simulate_lobby(base_seed.wrapping_add(i), spec))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_determinism() {
        let spec = SimulationSpec::default();
        let a = simulate_lobby(42, &spec).unwrap();
        let b = simulate_lobby(42, &spec).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_simulation_scores_match_coins() {
        let spec = SimulationSpec::default();
        let result = simulate_lobby(7, &spec).unwrap();
        let total: u32 = result.scores.values().sum();
        assert!(total <= 3 + 2 * 2 + 3);
        if result.ending == Ending::AllCoinsCollected {
            assert_eq!(total, 10);
        } else {
            assert_eq!(result.rounds, spec.max_rounds);
        }
        assert_eq!(result.scores.len(), 2);
    }

    #[test]
    fn test_round_cap_stops_lobby() {
        let spec = SimulationSpec {
            max_rounds: 1,
            level: LevelConfig {
                width: 20,
                height: 20,
                ..LevelConfig::default()
            },
            ..SimulationSpec::default()
        };
        let result = simulate_lobby(3, &spec).unwrap();
        assert_eq!(result.rounds, 1);
        assert_eq!(result.ending, Ending::RoundLimit);
    }

    #[test]
    fn test_start_failure_is_reported() {
        let spec = SimulationSpec {
            level: LevelConfig {
                width: 2,
                height: 2,
                ..LevelConfig::default()
            },
            ..SimulationSpec::default()
        };
        assert!(matches!(
            simulate_lobby(1, &spec),
            Err(SimulationError::StartFailed(_))
        ));
        assert!(matches!(
            simulate_lobby(
                1,
                &SimulationSpec {
                    teams: 0,
                    ..SimulationSpec::default()
                }
            ),
            Err(SimulationError::NoPlayers)
        ));
    }

    #[test]
    fn test_simulate_many_in_seed_order() {
        let spec = SimulationSpec {
            max_rounds: 20,
            ..SimulationSpec::default()
        };
        let results = simulate_many(100, 4, &spec);
        let seeds: Vec<u64> = results.iter().map(|r| r.as_ref().unwrap().seed).collect();
        assert_eq!(seeds, vec![100, 101, 102, 103]);
    }

    #[test]
    fn test_leader() {
        let scores = BTreeMap::from([("a".to_string(), 3), ("b".to_string(), 1)]);
        assert_eq!(leader(&scores), Some("a".to_string()));
        let tied = BTreeMap::from([("a".to_string(), 2), ("b".to_string(), 2)]);
        assert_eq!(leader(&tied), None);
    }
}
