//! Match history synchronization: initial load, bounded polling, throttled manual
//! refreshes and build enrichment for one player identity at a time.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, info, warn};

use crate::{
    config::SyncConfig,
    dao::{
        match_store::MatchStore,
        models::{BuildRecord, MatchRecord, PlayerIdentity},
        storage::StoreResult,
    },
    services::enrichment::{fetch_builds, pending_match_ids},
    state::{
        EnrichmentMap, MatchCollection, RefreshGate, RefreshThrottle, SyncEvent, SyncPhase,
        SyncSnapshot, SyncStateMachine,
    },
};

/// Result of a manual refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A fetch was issued.
    Accepted,
    /// The cooldown since the last accepted refresh has not elapsed yet.
    Throttled {
        /// Whole seconds until the next refresh is accepted.
        seconds_remaining: u64,
    },
    /// No snapshot is installed (idle, loading or failed); nothing to refresh.
    NotReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchOrigin {
    Initial,
    Manual,
    Poll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollControl {
    Continue,
    Stop,
}

/// Stamp carried by every match fetch.
#[derive(Debug, Clone, Copy)]
struct Ticket {
    epoch: u64,
    seq: u64,
}

struct ControllerState {
    machine: SyncStateMachine,
    identity: Option<PlayerIdentity>,
    matches: Arc<MatchCollection>,
    enrichment: Arc<EnrichmentMap>,
    in_flight: HashSet<String>,
    is_loading: bool,
    error: Option<String>,
    throttle: RefreshThrottle,
    next_seq: u64,
    applied_seq: u64,
    pending_manual: Option<u64>,
    poll: Option<JoinHandle<()>>,
}

impl ControllerState {
    fn new(refresh_cooldown: Duration) -> Self {
        Self {
            machine: SyncStateMachine::new(),
            identity: None,
            matches: Arc::default(),
            enrichment: Arc::default(),
            in_flight: HashSet::new(),
            is_loading: false,
            error: None,
            throttle: RefreshThrottle::new(refresh_cooldown),
            next_seq: 0,
            applied_seq: 0,
            pending_manual: None,
            poll: None,
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_seq += 1;
        Ticket {
            epoch: self.machine.epoch(),
            seq: self.next_seq,
        }
    }

    /// Forget everything bound to the previous identity. Sequence numbers keep growing.
    fn reset(&mut self, identity: Option<PlayerIdentity>) {
        self.identity = identity;
        self.matches = Arc::default();
        self.enrichment = Arc::default();
        self.in_flight.clear();
        self.is_loading = false;
        self.error = None;
        self.throttle.reset();
        self.applied_seq = self.next_seq;
        self.pending_manual = None;
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poll.take() {
            handle.abort();
        }
    }

    fn snapshot(&self, refresh_cooldown: Duration) -> SyncSnapshot {
        SyncSnapshot {
            identity: self.identity.clone(),
            phase: self.machine.phase(),
            matches: Arc::clone(&self.matches),
            enrichment: Arc::clone(&self.enrichment),
            is_loading: self.is_loading,
            error: self.error.clone(),
            last_refresh_at: self.throttle.last_accepted(),
            refresh_cooldown,
        }
    }
}

struct Inner {
    store: Arc<dyn MatchStore>,
    config: SyncConfig,
    state: Mutex<ControllerState>,
    snapshots: watch::Sender<SyncSnapshot>,
}

/// Keeps a player's match history in sync with the backend and enriches it with builds.
///
/// The controller is bound to at most one identity at a time. Callers read state through
/// [`MatchSyncController::snapshot`] or [`MatchSyncController::subscribe`] and drive it with
/// [`initialize`](MatchSyncController::initialize),
/// [`request_manual_refresh`](MatchSyncController::request_manual_refresh) and
/// [`dispose`](MatchSyncController::dispose). All three must be called from within a Tokio
/// runtime since they spawn the fetches they issue.
pub struct MatchSyncController {
    inner: Arc<Inner>,
}

impl MatchSyncController {
    /// Create an idle controller backed by `store`.
    pub fn new(store: Arc<dyn MatchStore>, config: SyncConfig) -> Self {
        let (snapshots, _rx) = watch::channel(SyncSnapshot::idle(config.refresh_cooldown));
        let state = ControllerState::new(config.refresh_cooldown);
        Self {
            inner: Arc::new(Inner {
                store,
                config,
                state: Mutex::new(state),
                snapshots,
            }),
        }
    }

    /// Subscribe to every published state change.
    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// Latest published state.
    pub fn snapshot(&self) -> SyncSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// Manual refresh gate computed at the time of the call.
    pub fn refresh_gate(&self) -> RefreshGate {
        self.snapshot().refresh_gate(Instant::now())
    }

    /// Bind the controller to `identity` and start loading its matches.
    ///
    /// Any state, pending poll and in-flight answer belonging to a previous identity is
    /// discarded.
    pub fn initialize(&self, identity: PlayerIdentity) {
        let ticket = {
            let mut state = self.inner.lock();
            state.stop_polling();
            if let Err(err) = state.machine.apply(SyncEvent::Initialize) {
                warn!(error = %err, "initialize rejected");
                return;
            }
            state.reset(Some(identity.clone()));
            state.is_loading = true;
            let ticket = state.issue_ticket();
            self.inner.publish(&state);
            ticket
        };

        info!(puuid = %identity, "loading match history");
        self.inner.spawn_fetch(identity, ticket, FetchOrigin::Initial);
    }

    /// Re-fetch the match history on the user's behalf, at most once per cooldown.
    ///
    /// The poll schedule is left untouched.
    pub fn request_manual_refresh(&self) -> RefreshOutcome {
        let (identity, ticket) = {
            let mut state = self.inner.lock();
            if state.machine.phase() != SyncPhase::Syncing {
                return RefreshOutcome::NotReady;
            }
            let Some(identity) = state.identity.clone() else {
                return RefreshOutcome::NotReady;
            };

            let now = Instant::now();
            if !state.throttle.try_accept(now) {
                let seconds_remaining = state.throttle.gate(now).seconds_remaining;
                debug!(puuid = %identity, seconds_remaining, "manual refresh throttled");
                return RefreshOutcome::Throttled { seconds_remaining };
            }

            let ticket = state.issue_ticket();
            state.pending_manual = Some(ticket.seq);
            state.is_loading = true;
            self.inner.publish(&state);
            (identity, ticket)
        };

        info!(puuid = %identity, "manual refresh accepted");
        self.inner.spawn_fetch(identity, ticket, FetchOrigin::Manual);
        RefreshOutcome::Accepted
    }

    /// Stop polling and drop all state. Answers still in flight are ignored when they land.
    pub fn dispose(&self) {
        let mut state = self.inner.lock();
        state.stop_polling();
        if state.machine.phase() == SyncPhase::Idle && state.identity.is_none() {
            return;
        }
        if let Err(err) = state.machine.apply(SyncEvent::Dispose) {
            warn!(error = %err, "dispose rejected");
            return;
        }
        state.reset(None);
        self.inner.publish(&state);
        debug!("match sync controller disposed");
    }
}

impl Drop for MatchSyncController {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ControllerState) {
        self.snapshots
            .send_replace(state.snapshot(self.config.refresh_cooldown));
    }

    fn spawn_fetch(self: &Arc<Self>, identity: PlayerIdentity, ticket: Ticket, origin: FetchOrigin) {
        let inner = Arc::clone(self);
        let lookup = self.store.fetch_matches(&identity);
        tokio::spawn(async move {
            let result = lookup.await;
            inner.apply_fetch(&identity, ticket, origin, result);
        });
    }

    /// Install the outcome of a match fetch unless it is stale, returning whether polling
    /// should go on.
    fn apply_fetch(
        self: &Arc<Self>,
        identity: &PlayerIdentity,
        ticket: Ticket,
        origin: FetchOrigin,
        result: StoreResult<Vec<MatchRecord>>,
    ) -> PollControl {
        let mut state = self.lock();
        if state.machine.epoch() != ticket.epoch {
            debug!(puuid = %identity, ?origin, "discarding answer for a previous identity");
            return PollControl::Stop;
        }

        let settles_manual = state.pending_manual == Some(ticket.seq);
        if settles_manual {
            state.pending_manual = None;
            state.is_loading = false;
        }

        if ticket.seq <= state.applied_seq {
            debug!(puuid = %identity, ?origin, seq = ticket.seq, "discarding out-of-order answer");
            if settles_manual {
                self.publish(&state);
            }
            return self.poll_verdict(&mut state, origin);
        }

        match result {
            Ok(records) => {
                if let Err(err) = state.machine.apply(SyncEvent::SnapshotApplied) {
                    warn!(puuid = %identity, error = %err, "ignoring fetched matches");
                    return PollControl::Stop;
                }
                state.applied_seq = ticket.seq;

                let fetched = MatchCollection::from_records(records);
                let changed = origin != FetchOrigin::Poll || state.matches.differs_from(&fetched);
                if changed {
                    info!(puuid = %identity, ?origin, count = fetched.len(), "match history updated");
                    state.matches = Arc::new(fetched);
                    self.trigger_enrichment(&mut state);
                }
                if origin != FetchOrigin::Poll {
                    state.error = None;
                }
                if origin == FetchOrigin::Initial {
                    state.is_loading = false;
                }

                let verdict = self.poll_verdict(&mut state, origin);
                if verdict == PollControl::Continue && state.poll.is_none() {
                    self.start_polling(&mut state);
                }
                if changed || origin != FetchOrigin::Poll {
                    self.publish(&state);
                }
                verdict
            }
            Err(err) if origin == FetchOrigin::Poll => {
                warn!(puuid = %identity, error = %err, "poll tick failed; retrying on next tick");
                PollControl::Continue
            }
            Err(err) => {
                warn!(puuid = %identity, ?origin, error = %err, "failed to load match history");
                if let Err(invalid) = state.machine.apply(SyncEvent::FetchFailed) {
                    warn!(puuid = %identity, error = %invalid, "ignoring fetch failure");
                    return PollControl::Stop;
                }
                state.applied_seq = ticket.seq;
                state.error = Some(err.to_string());
                state.is_loading = false;
                state.stop_polling();
                self.publish(&state);
                PollControl::Stop
            }
        }
    }

    /// Decide whether polling goes on once the current collection is known.
    fn poll_verdict(&self, state: &mut ControllerState, origin: FetchOrigin) -> PollControl {
        if state.matches.len() < self.config.target_match_count {
            return PollControl::Continue;
        }

        if state.poll.is_some() {
            info!(
                count = state.matches.len(),
                target = self.config.target_match_count,
                "match target reached; polling stopped"
            );
        }
        match origin {
            // The poll task exits on its own; aborting it here would cancel the caller.
            FetchOrigin::Poll => drop(state.poll.take()),
            FetchOrigin::Initial | FetchOrigin::Manual => state.stop_polling(),
        }
        PollControl::Stop
    }

    fn start_polling(self: &Arc<Self>, state: &mut ControllerState) {
        let epoch = state.machine.epoch();
        let period = self.config.poll_interval;
        let first_tick = Instant::now() + period;
        debug!(epoch, period_ms = period.as_millis() as u64, "polling armed");
        state.poll = Some(tokio::spawn(run_poll_loop(
            Arc::downgrade(self),
            epoch,
            first_tick,
            period,
        )));
    }

    /// Issue a poll fetch for `epoch`, or `None` when polling is no longer wanted.
    fn begin_poll_tick(&self, epoch: u64) -> Option<(PlayerIdentity, Ticket)> {
        let mut state = self.lock();
        if state.machine.epoch() != epoch {
            return None;
        }
        if state.machine.phase() != SyncPhase::Syncing
            || state.matches.len() >= self.config.target_match_count
        {
            state.poll.take();
            return None;
        }
        let identity = state.identity.clone()?;
        Some((identity, state.issue_ticket()))
    }

    /// Look up builds for every match that has none yet.
    fn trigger_enrichment(self: &Arc<Self>, state: &mut ControllerState) {
        let pending = pending_match_ids(&state.matches, &state.enrichment, &state.in_flight);
        if pending.is_empty() {
            return;
        }
        let Some(identity) = state.identity.clone() else {
            return;
        };

        state.in_flight.extend(pending.iter().cloned());
        let epoch = state.machine.epoch();
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let resolved = fetch_builds(inner.store.as_ref(), &identity, &pending).await;
            inner.apply_enrichment(epoch, &pending, resolved);
        });
    }

    fn apply_enrichment(
        &self,
        epoch: u64,
        requested: &[String],
        resolved: HashMap<String, BuildRecord>,
    ) {
        let mut state = self.lock();
        if state.machine.epoch() != epoch {
            debug!("discarding builds resolved for a previous identity");
            return;
        }
        for match_id in requested {
            state.in_flight.remove(match_id);
        }
        if resolved.is_empty() {
            return;
        }

        debug!(
            requested = requested.len(),
            resolved = resolved.len(),
            "builds resolved"
        );
        state.enrichment = Arc::new(state.enrichment.merged_with(resolved));
        self.publish(&state);
    }
}

async fn run_poll_loop(inner: Weak<Inner>, epoch: u64, first_tick: Instant, period: Duration) {
    let mut ticker = interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        let Some((identity, ticket)) = inner.begin_poll_tick(epoch) else {
            break;
        };

        let result = inner.store.fetch_matches(&identity).await;
        if inner.apply_fetch(&identity, ticket, FetchOrigin::Poll, result) == PollControl::Stop {
            break;
        }
    }
}
