//! Topic layout and payload codecs.
//!
//! Inbound:
//! - `new_game`: `{"lobby_name", "team_name", "player_name"}`
//! - `games/{lobby}/start`: `START` or `STOP`
//! - `games/{lobby}/{player}/move`: `UP`, `DOWN`, `LEFT` or `RIGHT`
//!
//! Outbound:
//! - `games/{lobby}/{player}/game_state`: JSON view
//! - `games/{lobby}/scores`: JSON object of team scores
//! - `games/{lobby}/lobby`: plain text notice

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{Direction, ParseDirectionError};
use crate::lobby::{Command, Outbound};

/// Topic for player registration.
pub const NEW_GAME_TOPIC: &str = "new_game";

/// Payload that starts a lobby.
pub const START_PAYLOAD: &str = "START";

/// Payload that stops a lobby.
pub const STOP_PAYLOAD: &str = "STOP";

/// Longest accepted lobby, team or player name, in characters.
pub const MAX_NAME_LEN: usize = 20;

/// A topic and its payload, as carried on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    /// Topic string.
    pub topic: String,
    /// Payload text.
    pub payload: String,
}

impl Publication {
    /// Create a publication.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Why a name was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NameError {
    /// Zero length.
    #[error("name is empty")]
    Empty,
    /// More than [`MAX_NAME_LEN`] characters.
    #[error("name is {0} characters long, at most {MAX_NAME_LEN} allowed")]
    TooLong(usize),
    /// Contains a topic separator or wildcard.
    #[error("name contains reserved character {0:?}")]
    Reserved(char),
}

/// Check a lobby, team or player name.
///
/// # Errors
///
/// Returns an error if the name is empty, longer than [`MAX_NAME_LEN`]
/// characters, or contains `/`, `+` or `#`.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    let len = name.chars().count();
    if len == 0 {
        return Err(NameError::Empty);
    }
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong(len));
    }
    if let Some(c) = name.chars().find(|c| matches!(c, '/' | '+' | '#')) {
        return Err(NameError::Reserved(c));
    }
    Ok(())
}

/// A malformed inbound message.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The topic is not one the server listens on.
    #[error("unknown topic {0:?}")]
    UnknownTopic(String),
    /// The payload is not UTF-8.
    #[error("payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    /// The registration payload is not the expected JSON.
    #[error("invalid registration payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// A lobby, team or player name was refused.
    #[error("invalid {field} name: {source}")]
    InvalidName {
        /// Which name.
        field: &'static str,
        /// Why.
        source: NameError,
    },
    /// A move payload is not a direction.
    #[error(transparent)]
    InvalidDirection(#[from] ParseDirectionError),
    /// A start topic payload is neither START nor STOP.
    #[error("invalid start payload {0:?}")]
    InvalidStart(String),
}

/// Failure to serialize an outbound payload.
#[derive(Debug, Error)]
#[error("failed to encode payload: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

#[derive(Debug, Serialize, Deserialize)]
struct NewPlayerPayload {
    lobby_name: String,
    team_name: String,
    player_name: String,
}

fn checked(field: &'static str, name: &str) -> Result<String, DecodeError> {
    validate_name(name).map_err(|source| DecodeError::InvalidName { field, source })?;
    Ok(name.to_string())
}

/// Decode one inbound bus message.
///
/// # Errors
///
/// Returns an error for an unknown topic, a non UTF-8 payload, bad JSON,
/// an invalid name, or an unrecognised move or start payload.
pub fn decode(topic: &str, payload: &[u8]) -> Result<Command, DecodeError> {
    let parts: Vec<&str> = topic.split('/').collect();
    match parts.as_slice() {
        [NEW_GAME_TOPIC] => {
            let body: NewPlayerPayload = serde_json::from_slice(payload)?;
            Ok(Command::NewPlayer {
                lobby: checked("lobby", &body.lobby_name)?,
                team: checked("team", &body.team_name)?,
                player: checked("player", &body.player_name)?,
            })
        }
        ["games", lobby, "start"] => {
            let lobby = checked("lobby", lobby)?;
            match std::str::from_utf8(payload)? {
                START_PAYLOAD => Ok(Command::Start { lobby }),
                STOP_PAYLOAD => Ok(Command::Stop { lobby }),
                other => Err(DecodeError::InvalidStart(other.to_string())),
            }
        }
        ["games", lobby, player, "move"] => {
            let direction: Direction = std::str::from_utf8(payload)?.parse()?;
            Ok(Command::Move {
                lobby: checked("lobby", lobby)?,
                player: checked("player", player)?,
                direction,
            })
        }
        _ => Err(DecodeError::UnknownTopic(topic.to_string())),
    }
}

/// Topic of one player's view.
#[must_use]
pub fn game_state_topic(lobby: &str, player: &str) -> String {
    format!("games/{lobby}/{player}/game_state")
}

/// Topic of a lobby's scores.
#[must_use]
pub fn scores_topic(lobby: &str) -> String {
    format!("games/{lobby}/scores")
}

/// Topic of a lobby's notices.
#[must_use]
pub fn lobby_topic(lobby: &str) -> String {
    format!("games/{lobby}/lobby")
}

/// Topic a player publishes moves on.
#[must_use]
pub fn move_topic(lobby: &str, player: &str) -> String {
    format!("games/{lobby}/{player}/move")
}

/// Topic that starts or stops a lobby.
#[must_use]
pub fn start_topic(lobby: &str) -> String {
    format!("games/{lobby}/start")
}

/// Encode a server result for publishing.
///
/// # Errors
///
/// Returns an error if a JSON payload cannot be serialized.
pub fn encode(outbound: &Outbound) -> Result<Publication, EncodeError> {
    Ok(match outbound {
        Outbound::GameState {
            lobby,
            player,
            payload,
        } => Publication::new(
            game_state_topic(lobby, player),
            serde_json::to_string(payload)?,
        ),
        Outbound::Scores { lobby, scores } => {
            Publication::new(scores_topic(lobby), serde_json::to_string(scores)?)
        }
        Outbound::Notice { lobby, text } => Publication::new(lobby_topic(lobby), text.clone()),
    })
}

/// Encode a command the way a client would publish it.
///
/// # Errors
///
/// Returns an error if the registration JSON cannot be serialized.
pub fn encode_command(command: &Command) -> Result<Publication, EncodeError> {
    Ok(match command {
        Command::NewPlayer {
            lobby,
            team,
            player,
        } => Publication::new(
            NEW_GAME_TOPIC,
            serde_json::to_string(&NewPlayerPayload {
                lobby_name: lobby.clone(),
                team_name: team.clone(),
                player_name: player.clone(),
            })?,
        ),
        Command::Move {
            lobby,
            player,
            direction,
        } => Publication::new(move_topic(lobby, player), direction.as_str()),
        Command::Start { lobby } => Publication::new(start_topic(lobby), START_PAYLOAD),
        Command::Stop { lobby } => Publication::new(start_topic(lobby), STOP_PAYLOAD),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::game::{Coord, GameStatePayload};

    #[test]
    fn test_decode_new_player() {
        let payload = br#"{"lobby_name":"TestLobby","team_name":"ATeam","player_name":"Player1"}"#;
        let command = decode(NEW_GAME_TOPIC, payload).unwrap();
        assert_eq!(
            command,
            Command::NewPlayer {
                lobby: "TestLobby".into(),
                team: "ATeam".into(),
                player: "Player1".into(),
            }
        );
    }

    #[test]
    fn test_decode_start_stop() {
        assert_eq!(
            decode("games/L/start", b"START").unwrap(),
            Command::Start { lobby: "L".into() }
        );
        assert_eq!(
            decode("games/L/start", b"STOP").unwrap(),
            Command::Stop { lobby: "L".into() }
        );
        assert!(matches!(
            decode("games/L/start", b"start"),
            Err(DecodeError::InvalidStart(_))
        ));
    }

    #[test]
    fn test_decode_move_is_strict() {
        assert_eq!(
            decode("games/L/Player1/move", b"LEFT").unwrap(),
            Command::Move {
                lobby: "L".into(),
                player: "Player1".into(),
                direction: Direction::Left,
            }
        );
        assert!(matches!(
            decode("games/L/Player1/move", b"left"),
            Err(DecodeError::InvalidDirection(_))
        ));
        assert!(matches!(
            decode("games/L/Player1/move", b"UP "),
            Err(DecodeError::InvalidDirection(_))
        ));
        assert!(matches!(
            decode("games/L/Player1/move", &[0xff, 0xfe]),
            Err(DecodeError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_names() {
        let long = r#"{"lobby_name":"L","team_name":"T","player_name":"ThisNameIsFarTooLong!"}"#;
        assert!(matches!(
            decode(NEW_GAME_TOPIC, long.as_bytes()),
            Err(DecodeError::InvalidName {
                field: "player",
                source: NameError::TooLong(21)
            })
        ));

        let empty = r#"{"lobby_name":"","team_name":"T","player_name":"P"}"#;
        assert!(matches!(
            decode(NEW_GAME_TOPIC, empty.as_bytes()),
            Err(DecodeError::InvalidName { field: "lobby", .. })
        ));
        assert!(matches!(
            decode("games//start", b"START"),
            Err(DecodeError::InvalidName { .. })
        ));
        assert!(matches!(
            decode(NEW_GAME_TOPIC, br#"{"lobby_name":"L"}"#),
            Err(DecodeError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_decode_unknown_topic() {
        for topic in ["", "games", "games/L", "games/L/P/game_state", "other/L/start"] {
            assert!(
                matches!(decode(topic, b"START"), Err(DecodeError::UnknownTopic(_))),
                "topic {topic:?}"
            );
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Player1").is_ok());
        assert!(validate_name("ééééééééééééééééééé").is_ok());
        assert_eq!(validate_name("a/b"), Err(NameError::Reserved('/')));
        assert_eq!(validate_name("#"), Err(NameError::Reserved('#')));
        assert_eq!(validate_name(""), Err(NameError::Empty));
    }

    #[test]
    fn test_encode_outbound() {
        let notice = encode(&Outbound::error("L", "Lobby name not found.")).unwrap();
        assert_eq!(notice.topic, "games/L/lobby");
        assert_eq!(notice.payload, "Error: Lobby name not found.");

        let scores = BTreeMap::from([("ATeam".to_string(), 3), ("BTeam".to_string(), 0)]);
        let published = encode(&Outbound::Scores {
            lobby: "L".into(),
            scores,
        })
        .unwrap();
        assert_eq!(published.topic, "games/L/scores");
        assert_eq!(published.payload, r#"{"ATeam":3,"BTeam":0}"#);

        let state = encode(&Outbound::GameState {
            lobby: "L".into(),
            player: "P".into(),
            payload: GameStatePayload {
                current_position: Coord::new(1, 2),
                ..GameStatePayload::default()
            },
        })
        .unwrap();
        assert_eq!(state.topic, "games/L/P/game_state");
        assert!(state.payload.contains(r#""currentPosition":[1,2]"#));
    }

    #[test]
    fn test_encoded_commands_decode() {
        let commands = [
            Command::NewPlayer {
                lobby: "L".into(),
                team: "T".into(),
                player: "P".into(),
            },
            Command::Move {
                lobby: "L".into(),
                player: "P".into(),
                direction: Direction::Down,
            },
            Command::Start { lobby: "L".into() },
            Command::Stop { lobby: "L".into() },
        ];
        for command in commands {
            let p = encode_command(&command).unwrap();
            assert_eq!(decode(&p.topic, p.payload.as_bytes()).unwrap(), command);
        }
    }
}
