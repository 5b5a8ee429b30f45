use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use ciclo_core::confession::Confession;
use ciclo_core::goal::Goal;
use ciclo_sync::gateway::{ProfilePatch, SyncGateway};
use ciclo_sync::session::SessionState;

// ---------------------------------------------------------------------------
// SaveOp
// ---------------------------------------------------------------------------

/// One pending persistence task. Produced by optimistic mutations and
/// consumed by the queue worker.
#[derive(Debug, Clone)]
pub enum SaveOp {
    Profile(ProfilePatch),
    Goal(Goal),
    Confession(Confession),
    PilarProgress {
        pilar_id: u32,
        completed: bool,
        unlocked: bool,
    },
    Interaction {
        action_type: String,
    },
}

impl SaveOp {
    pub fn kind(&self) -> &'static str {
        match self {
            SaveOp::Profile(_) => "profile",
            SaveOp::Goal(_) => "goal",
            SaveOp::Confession(_) => "confession",
            SaveOp::PilarProgress { .. } => "pilar_progress",
            SaveOp::Interaction { .. } => "interaction",
        }
    }
}

// ---------------------------------------------------------------------------
// SaveQueue
// ---------------------------------------------------------------------------

/// Fire-and-forget persistence queue.
///
/// The UI path applies every mutation to local state synchronously and
/// enqueues the save here; it never waits for the network. The worker
/// drains ops in order against the gateway under whatever session is
/// current at drain time. A failed save is logged and dropped — no
/// retry, no surfacing. Ops arriving while signed out are dropped too
/// (their state was already torn down).
#[derive(Debug, Clone)]
pub struct SaveQueue {
    tx: mpsc::UnboundedSender<SaveOp>,
}

impl SaveQueue {
    /// Spawn the worker and hand back the enqueue side.
    pub fn spawn(gateway: SyncGateway, session_rx: watch::Receiver<SessionState>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<SaveOp>();

        tokio::spawn(async move {
            while let Some(op) = rx.recv().await {
                let session = match &*session_rx.borrow() {
                    SessionState::SignedIn(s) => s.clone(),
                    _ => {
                        debug!(op = op.kind(), "dropping save, no session");
                        continue;
                    }
                };

                let result = match &op {
                    SaveOp::Profile(patch) => gateway.save_profile(&session, patch).await,
                    SaveOp::Goal(goal) => gateway.save_goal(&session, goal).await,
                    SaveOp::Confession(c) => gateway.save_confession(&session, c).await,
                    SaveOp::PilarProgress {
                        pilar_id,
                        completed,
                        unlocked,
                    } => {
                        gateway
                            .save_pilar_progress(&session, *pilar_id, *completed, *unlocked)
                            .await
                    }
                    SaveOp::Interaction { action_type } => {
                        gateway.log_interaction(&session, action_type).await
                    }
                };

                if let Err(e) = result {
                    warn!(op = op.kind(), error = %e, "save failed, dropping");
                }
            }
        });

        Self { tx }
    }

    pub fn enqueue(&self, op: SaveOp) {
        if self.tx.send(op).is_err() {
            warn!("save queue worker is gone, dropping op");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
