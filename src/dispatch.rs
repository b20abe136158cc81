//! Worker pool that runs lobbies in parallel.
//!
//! Each worker thread owns a [`LobbyRegistry`] shard. A command is routed
//! to the worker picked by hashing its lobby name, so one lobby's commands
//! are always handled by the same thread in arrival order while different
//! lobbies proceed independently. Every worker publishes onto one shared
//! outbound channel.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use thiserror::Error;

use crate::config::LevelConfig;
use crate::lobby::{lobby_hash, Command, LobbyRegistry, Outbound};

/// Worker pool failure.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A pool needs at least one worker.
    #[error("dispatcher needs at least one worker")]
    NoWorkers,
    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    /// The worker for this lobby has exited.
    #[error("worker {0} is no longer accepting commands")]
    Disconnected(usize),
    /// A worker thread panicked.
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
}

/// Handle to a running worker pool.
#[derive(Debug)]
pub struct Dispatcher {
    senders: Vec<Sender<Command>>,
    workers: Vec<JoinHandle<()>>,
    outbound: Receiver<Outbound>,
}

impl Dispatcher {
    /// Start `workers` threads, each with an empty registry.
    ///
    /// # Errors
    ///
    /// Returns an error if `workers` is zero or a thread cannot be spawned.
    pub fn spawn(level: LevelConfig, workers: usize) -> Result<Self, DispatchError> {
        if workers == 0 {
            return Err(DispatchError::NoWorkers);
        }

        let (out_tx, outbound) = unbounded();
        let mut senders = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for index in 0..workers {
            let (tx, rx) = unbounded::<Command>();
            let out_tx = out_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("lobby-worker-{index}"))
                .spawn(move || run_worker(index, level, &rx, &out_tx))?;
            senders.push(tx);
            handles.push(handle);
        }

        tracing::info!(workers, "dispatcher started");
        Ok(Self {
            senders,
            workers: handles,
            outbound,
        })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.senders.len()
    }

    /// Index of the worker that owns a lobby.
    // The remainder is below the worker count, which fits in usize.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn worker_for(&self, lobby: &str) -> usize {
        (lobby_hash(lobby) % self.senders.len() as u64) as usize
    }

    /// Queue a command on its lobby's worker.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Disconnected`] if that worker has exited.
    pub fn dispatch(&self, command: Command) -> Result<(), DispatchError> {
        let index = self.worker_for(command.lobby());
        self.senders[index]
            .send(command)
            .map_err(|_| DispatchError::Disconnected(index))
    }

    /// Queue a command, dropping it with a warning if its worker has exited.
    ///
    /// Returns whether the command was queued. Other lobbies are unaffected
    /// either way.
    #[must_use]
    pub fn offer(&self, command: Command) -> bool {
        match self.dispatch(command) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "dropping command");
                false
            }
        }
    }

    /// Receiver for everything the workers publish.
    ///
    /// The channel disconnects once [`Dispatcher::shutdown`] has joined
    /// every worker and all queued publications have been received.
    #[must_use]
    pub fn outbound(&self) -> Receiver<Outbound> {
        self.outbound.clone()
    }

    /// Stop accepting commands, let workers drain their queues, and join
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::WorkerPanicked`] for the first worker that
    /// panicked. The remaining workers are still joined.
    pub fn shutdown(self) -> Result<(), DispatchError> {
        drop(self.senders);

        let mut result = Ok(());
        for (index, handle) in self.workers.into_iter().enumerate() {
            if handle.join().is_err() {
                tracing::error!(worker = index, "worker panicked");
                if result.is_ok() {
                    result = Err(DispatchError::WorkerPanicked(index));
                }
            }
        }
        tracing::info!("dispatcher stopped");
        result
    }
}

fn run_worker(index: usize, level: LevelConfig, rx: &Receiver<Command>, out: &Sender<Outbound>) {
    let mut registry = LobbyRegistry::new(level);
    for command in rx {
        for publication in registry.handle(command) {
            if out.send(publication).is_err() {
                tracing::warn!(worker = index, "outbound channel closed, worker exiting");
                return;
            }
        }
    }
    tracing::debug!(worker = index, lobbies = registry.lobby_count(), "worker drained");
}
