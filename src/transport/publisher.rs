//! Publishing seam between the server and the bus.

use std::io::Write;

use thiserror::Error;

use crate::lobby::Outbound;
use crate::transport::{encode, EncodeError, Publication};

/// Failure to hand a publication to the bus.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The payload could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// The bus line could not be serialized.
    #[error("failed to serialize bus line: {0}")]
    Json(#[from] serde_json::Error),
    /// The underlying writer failed.
    #[error("failed to write bus line: {0}")]
    Io(#[from] std::io::Error),
}

/// Sink for outbound publications.
pub trait Publisher {
    /// Publish one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be delivered.
    fn publish(&mut self, publication: &Publication) -> Result<(), PublishError>;
}

/// Encode and publish a batch of results in order.
///
/// Returns the number of messages published.
///
/// # Errors
///
/// Stops at the first encoding or delivery failure.
pub fn publish_all<'a, P, I>(publisher: &mut P, outbound: I) -> Result<usize, PublishError>
where
    P: Publisher + ?Sized,
    I: IntoIterator<Item = &'a Outbound>,
{
    let mut count = 0;
    for out in outbound {
        publisher.publish(&encode(out)?)?;
        count += 1;
    }
    Ok(count)
}

/// Writes each publication as one JSON line `{"topic": ..., "payload": ...}`.
#[derive(Debug)]
pub struct JsonLinesPublisher<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesPublisher<W> {
    /// Wrap a writer.
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Publisher for JsonLinesPublisher<W> {
    fn publish(&mut self, publication: &Publication) -> Result<(), PublishError> {
        serde_json::to_writer(&mut self.out, publication)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Keeps every publication in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    published: Vec<Publication>,
}

impl RecordingPublisher {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, in order.
    #[must_use]
    pub fn published(&self) -> &[Publication] {
        &self.published
    }

    /// Payloads published on one topic, in order.
    pub fn payloads_on<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.published
            .iter()
            .filter(move |p| p.topic == topic)
            .map(|p| p.payload.as_str())
    }

    /// Drain the recording.
    pub fn take(&mut self) -> Vec<Publication> {
        std::mem::take(&mut self.published)
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&mut self, publication: &Publication) -> Result<(), PublishError> {
        self.published.push(publication.clone());
        Ok(())
    }
}
