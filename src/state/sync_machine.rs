use thiserror::Error;

/// Phases a synchronization controller goes through for one player identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No identity bound yet, or the controller was disposed.
    Idle,
    /// The first snapshot for the identity is being fetched.
    Loading,
    /// A snapshot is installed; polling and enrichment may be running.
    Syncing,
    /// The initial load or a manual refresh failed. Only re-initializing leaves this phase.
    Error,
}

/// Events driving [`SyncPhase`] transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    /// Bind (or re-bind) the controller to an identity.
    Initialize,
    /// A fetched snapshot was installed.
    SnapshotApplied,
    /// The initial load or a manual refresh failed.
    FetchFailed,
    /// Drop every piece of state and stop background work.
    Dispose,
}

/// Error returned when an event cannot be applied to the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the machine was in when the event was received.
    pub from: SyncPhase,
    /// The rejected event.
    pub event: SyncEvent,
}

/// Phase tracker with a version that increments on every identity binding.
///
/// The version doubles as the epoch stamped on every request, so any answer carrying
/// an older epoch belongs to a previous identity (or a disposed controller).
#[derive(Debug, Clone)]
pub struct SyncStateMachine {
    phase: SyncPhase,
    epoch: u64,
}

impl Default for SyncStateMachine {
    fn default() -> Self {
        Self {
            phase: SyncPhase::Idle,
            epoch: 0,
        }
    }
}

impl SyncStateMachine {
    /// Machine in [`SyncPhase::Idle`] at epoch zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Identity generation, bumped on every initialize and dispose.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Apply `event`, returning the new phase.
    pub fn apply(&mut self, event: SyncEvent) -> Result<SyncPhase, InvalidTransition> {
        let next = next_phase(self.phase, event).ok_or(InvalidTransition {
            from: self.phase,
            event,
        })?;

        if matches!(event, SyncEvent::Initialize | SyncEvent::Dispose) {
            self.epoch += 1;
        }
        self.phase = next;
        Ok(next)
    }
}

fn next_phase(from: SyncPhase, event: SyncEvent) -> Option<SyncPhase> {
    use SyncEvent::*;
    use SyncPhase::*;

    match (from, event) {
        (_, Initialize) => Some(Loading),
        (_, Dispose) => Some(Idle),
        (Loading | Syncing, SnapshotApplied) => Some(Syncing),
        (Loading | Syncing, FetchFailed) => Some(Error),
        _ => None,
    }
}
