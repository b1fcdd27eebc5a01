//! Single-owner session loop.
//!
//! A [`Session`] runs one tokio task that owns the [`Controller`]. Inputs
//! arrive as commands over an mpsc channel; effect clears come back from
//! short-lived timer tasks over a second channel. Both are processed one at
//! a time, so the controller never sees concurrent access. Timer tasks only
//! carry a [`PendingClear`] back; the token check in the scheduler makes a
//! clear that raced a newer activation harmless.
//!
//! Every change to the render state is published on a `watch` channel.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::controller::{Controller, InputEvent, Outcome, RenderState};
use crate::effects::PendingClear;
use crate::error::SessionError;
use crate::observability::{Event, EventEmitter, StopReason};

const COMMAND_BUFFER: usize = 32;

enum Command {
    Input {
        input: InputEvent,
        reply: oneshot::Sender<RenderState>,
    },
    Snapshot {
        reply: oneshot::Sender<RenderState>,
    },
}

/// Cloneable handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<RenderState>,
    cancel: CancellationToken,
    session_id: Arc<str>,
}

impl SessionHandle {
    /// Sends one input and waits for the state after it was processed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] once the loop has stopped.
    pub async fn dispatch(&self, input: InputEvent) -> Result<RenderState, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Input { input, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::ReplyDropped("input"))
    }

    /// Fetches the current render state through the loop, after anything
    /// already queued ahead of it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] once the loop has stopped.
    pub async fn snapshot(&self) -> Result<RenderState, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot { reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::ReplyDropped("snapshot"))
    }

    /// Subscribes to render-state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RenderState> {
        self.snapshots.clone()
    }

    /// Last published render state, without a round trip.
    #[must_use]
    pub fn latest(&self) -> RenderState {
        self.snapshots.borrow().clone()
    }

    /// Random id of this session.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Stops the loop and every armed timer.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// The event loop owning a [`Controller`].
pub struct Session {
    controller: Controller,
    emitter: Arc<EventEmitter>,
    session_id: Arc<str>,
    commands: mpsc::Receiver<Command>,
    expiry_tx: mpsc::UnboundedSender<PendingClear>,
    expiry_rx: mpsc::UnboundedReceiver<PendingClear>,
    snapshots: watch::Sender<RenderState>,
    cancel: CancellationToken,
    timers: CancellationToken,
}

impl Session {
    /// Spawns the loop on the current runtime.
    ///
    /// The loop stops when `cancel` fires or when every handle is dropped;
    /// the join handle yields the reason.
    #[must_use]
    pub fn spawn(
        controller: Controller,
        emitter: Arc<EventEmitter>,
        cancel: CancellationToken,
    ) -> (SessionHandle, JoinHandle<StopReason>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (expiry_tx, expiry_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let session_id: Arc<str> = uuid::Uuid::new_v4().to_string().into();

        let session = Self {
            controller,
            emitter,
            session_id: Arc::clone(&session_id),
            commands: command_rx,
            expiry_tx,
            expiry_rx,
            snapshots: snapshot_tx,
            timers: cancel.child_token(),
            cancel: cancel.clone(),
        };

        let handle = SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            cancel,
            session_id,
        };

        (handle, tokio::spawn(session.run()))
    }

    async fn run(mut self) -> StopReason {
        info!(session_id = %self.session_id, "session started");
        self.emitter.emit(Event::SessionStarted {
            timestamp: Utc::now(),
            session_id: self.session_id.to_string(),
        });

        let reason = loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break StopReason::Cancelled,
                Some(pending) = self.expiry_rx.recv() => self.on_expiry(&pending),
                command = self.commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break StopReason::Completed,
                },
            }
        };

        self.timers.cancel();
        let final_stage = self.controller.stage();
        info!(session_id = %self.session_id, %reason, %final_stage, "session stopped");
        self.emitter.emit(Event::SessionStopped {
            timestamp: Utc::now(),
            reason,
            final_stage,
        });
        reason
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Input { input, reply } => {
                let outcome = self.controller.handle(&input);
                self.record(&input, &outcome);
                for pending in outcome.clears {
                    self.arm(pending);
                }
                let state = self.publish();
                let _ = reply.send(state);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.controller.snapshot());
            }
        }
    }

    fn on_expiry(&mut self, pending: &PendingClear) {
        if self.controller.expire(pending) {
            debug!(effect = %pending.target, "effect cleared");
            self.emitter.emit(Event::EffectCleared {
                timestamp: Utc::now(),
                effect: pending.target.to_string(),
            });
            self.publish();
        }
    }

    fn record(&self, input: &InputEvent, outcome: &Outcome) {
        let now = Utc::now();
        let Some(transition) = &outcome.transition else {
            if !matches!(input, InputEvent::Resize { .. }) {
                self.emitter.emit(Event::InputIgnored {
                    timestamp: now,
                    input: input.to_string(),
                    stage: self.controller.stage(),
                });
            }
            return;
        };

        if transition.changed_stage() {
            self.emitter.emit(Event::StageEntered {
                timestamp: now,
                from: transition.from,
                to: transition.to,
                reason: transition.reason.clone(),
            });
        }
        if let Some(id) = &transition.removed_decoy {
            self.emitter.emit(Event::DecoyRemoved {
                timestamp: now,
                button_id: id.to_string(),
            });
        }
        for pending in &outcome.clears {
            self.emitter.emit(Event::EffectFired {
                timestamp: now,
                effect: pending.target.to_string(),
                duration_ms: u64::try_from(pending.after.as_millis()).unwrap_or(u64::MAX),
            });
        }
    }

    /// Spawns a timer task that hands `pending` back once it is due.
    fn arm(&self, pending: PendingClear) {
        let tx = self.expiry_tx.clone();
        let timers = self.timers.clone();
        let Some(deadline) = tokio::time::Instant::now().checked_add(pending.after) else {
            warn!(
                effect = %pending.target,
                after = ?pending.after,
                "clear deadline out of range, effect stays until replaced"
            );
            return;
        };
        tokio::spawn(async move {
            tokio::select! {
                () = timers.cancelled() => {}
                () = tokio::time::sleep_until(deadline) => {
                    let _ = tx.send(pending);
                }
            }
        });
    }

    /// Publishes the current state if it changed and returns it.
    fn publish(&self) -> RenderState {
        let state = self.controller.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state.clone();
                true
            }
        });
        state
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("session_id", &self.session_id)
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}
