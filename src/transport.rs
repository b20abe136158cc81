//! Bus boundary.
//!
//! Inbound messages are decoded once into [`Command`](crate::lobby::Command)
//! values; anything malformed is a [`DecodeError`] and never reaches a
//! lobby. Outbound results are encoded into [`Publication`]s and handed to
//! a [`Publisher`].

mod publisher;
mod topic;

pub use publisher::{publish_all, JsonLinesPublisher, PublishError, Publisher, RecordingPublisher};
pub use topic::{
    decode, encode, encode_command, game_state_topic, lobby_topic, move_topic, scores_topic,
    start_topic, validate_name, DecodeError, EncodeError, NameError, Publication, MAX_NAME_LEN,
    NEW_GAME_TOPIC, START_PAYLOAD, STOP_PAYLOAD,
};
