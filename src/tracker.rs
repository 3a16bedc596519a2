//! # Session Tracker
//!
//! Runs a [`SessionEngine`] inside its own tokio task so that every call is
//! serialized through one owner.
//!
//! - Lifecycle calls (`start`, `pause`, `resume`, `finish`) are request/reply.
//! - `ingest` is fire-and-forget over an unbounded channel, so the location
//!   provider never waits on the engine.
//! - A periodic interval publishes [`SessionSnapshot`]s on a `watch` channel
//!   for display. Missed ticks are skipped, not replayed.

use std::time::Duration;

use log::{debug, info};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::clock::Clock;
use crate::engine::{SessionEngine, SessionSnapshot};
use crate::error::{Result, SessionError};
use crate::{ActivityCategory, LocationSample, Record, SessionId};

enum Command {
    Start {
        category: ActivityCategory,
        reply: oneshot::Sender<Result<SessionId>>,
    },
    Pause {
        reply: oneshot::Sender<Result<()>>,
    },
    Resume {
        reply: oneshot::Sender<Result<()>>,
    },
    Ingest(LocationSample),
    Finish {
        reply: oneshot::Sender<Result<Record>>,
    },
}

/// Cloneable handle to a running session tracker.
///
/// The task stops once every handle has been dropped.
#[derive(Clone)]
pub struct TrackerHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Option<SessionSnapshot>>,
}

impl TrackerHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .map_err(|_| SessionError::TrackerStopped)?;
        response.await.map_err(|_| SessionError::TrackerStopped)?
    }

    pub async fn start(&self, category: ActivityCategory) -> Result<SessionId> {
        self.request(|reply| Command::Start { category, reply }).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| Command::Pause { reply }).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.request(|reply| Command::Resume { reply }).await
    }

    /// Queue a sample without waiting for it to be processed.
    ///
    /// Lifecycle errors for queued samples (e.g. ingest while idle) are logged
    /// by the task and otherwise dropped.
    pub fn ingest(&self, sample: LocationSample) -> Result<()> {
        self.commands
            .send(Command::Ingest(sample))
            .map_err(|_| SessionError::TrackerStopped)
    }

    /// Finish the session and return its record. The engine is idle afterwards.
    pub async fn finish(&self) -> Result<Record> {
        self.request(|reply| Command::Finish { reply }).await
    }

    /// Latest published snapshot, `None` while idle.
    pub fn latest(&self) -> Option<SessionSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// A receiver that wakes on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionSnapshot>> {
        self.snapshots.clone()
    }
}

/// Move `engine` into a new task and return a handle to it.
///
/// The join handle yields the engine back once all handles are dropped.
/// Must be called from within a tokio runtime.
pub fn spawn_tracker<C>(mut engine: SessionEngine<C>) -> (TrackerHandle, JoinHandle<SessionEngine<C>>)
where
    C: Clock + 'static,
{
    let (commands, mut inbox) = mpsc::unbounded_channel();
    let (publisher, snapshots) = watch::channel(engine.snapshot());
    let tick_every = Duration::from_millis(engine.config().tick_interval_ms);

    let task = tokio::spawn(async move {
        let mut interval = time::interval(tick_every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("[SessionTracker] Running, tick every {:?}", tick_every);

        loop {
            tokio::select! {
                command = inbox.recv() => {
                    let Some(command) = command else { break };
                    handle_command(&mut engine, command);
                    publisher.send_replace(engine.snapshot());
                }
                _ = interval.tick() => {
                    if engine.state().is_in_progress() {
                        publisher.send_replace(engine.tick());
                    }
                }
            }
        }

        info!("[SessionTracker] All handles dropped, stopping");
        engine
    });

    (TrackerHandle { commands, snapshots }, task)
}

fn handle_command<C: Clock>(engine: &mut SessionEngine<C>, command: Command) {
    // A dropped reply receiver just means the caller stopped waiting
    match command {
        Command::Start { category, reply } => {
            let _ = reply.send(engine.start(category));
        }
        Command::Pause { reply } => {
            let _ = reply.send(engine.pause());
        }
        Command::Resume { reply } => {
            let _ = reply.send(engine.resume());
        }
        Command::Ingest(sample) => {
            if let Err(e) = engine.ingest(sample) {
                debug!("[SessionTracker] Ignored queued sample: {}", e);
            }
        }
        Command::Finish { reply } => {
            let result = engine.finish().and_then(|_| engine.take_record());
            let _ = reply.send(result);
        }
    }
}
