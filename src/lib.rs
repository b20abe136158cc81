// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Gridcoin: an authoritative server for a round-based team coin game.
//!
//! Players join teams in named lobbies, submit one move per round, and
//! race to collect tiered coins on a walled grid. The server resolves every
//! round in arrival order and streams each player a 5x5 view of the board.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Transport (topics, payloads)      │
//! ├─────────────────────────────────────┤
//! │   Dispatcher (lobby worker pool)    │
//! ├─────────────────────────────────────┤
//! │   Lobby (registry, session, levels) │
//! ├─────────────────────────────────────┤
//! │   Game (board, resolver, views)     │
//! └─────────────────────────────────────┘
//! ```

pub mod config;
pub mod dispatch;
pub mod game;
pub mod lobby;
pub mod simulation;
pub mod transport;

pub use config::{ConfigError, LevelConfig, ServerConfig};
pub use dispatch::{DispatchError, Dispatcher};

// Re-export key game types at crate root for convenience
pub use game::{Board, CoinTier, Coord, Direction, GameState, GameStatePayload, Player, Team};
pub use lobby::{Command, LobbyRegistry, Outbound};
