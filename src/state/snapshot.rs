use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::time::Instant;

use crate::{
    dao::models::{BuildRecord, PlayerIdentity},
    dto::MatchView,
    state::{
        collection::MatchCollection,
        sync_machine::SyncPhase,
        throttle::{RefreshGate, gate_at},
    },
};

/// Builds resolved so far, keyed by `match_id`.
///
/// Entries are only ever added; a missing key means "not available yet", never "failed".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentMap {
    builds: HashMap<String, BuildRecord>,
}

impl EnrichmentMap {
    /// Map with no build resolved.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build resolved for `match_id`.
    pub fn get(&self, match_id: &str) -> Option<&BuildRecord> {
        self.builds.get(match_id)
    }

    /// Whether a build was resolved for `match_id`.
    pub fn contains(&self, match_id: &str) -> bool {
        self.builds.contains_key(match_id)
    }

    /// Number of resolved builds.
    pub fn len(&self) -> usize {
        self.builds.len()
    }

    /// Whether no build was resolved yet.
    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }

    /// Ids of the matches with a resolved build, in no particular order.
    pub fn match_ids(&self) -> impl Iterator<Item = &str> {
        self.builds.keys().map(String::as_str)
    }

    /// Union of `self` and `resolved`; existing entries are kept as they are.
    pub fn merged_with(&self, resolved: HashMap<String, BuildRecord>) -> Self {
        let mut builds = self.builds.clone();
        for (match_id, build) in resolved {
            builds.entry(match_id).or_insert(build);
        }
        Self { builds }
    }
}

/// Read-only view of a controller's state, published on every change.
#[derive(Debug, Clone)]
pub struct SyncSnapshot {
    /// Player the state belongs to, `None` when idle.
    pub identity: Option<PlayerIdentity>,
    /// Current controller phase.
    pub phase: SyncPhase,
    /// Replaced as a whole whenever a fetched snapshot is applied.
    pub matches: Arc<MatchCollection>,
    /// Builds resolved for the current matches.
    pub enrichment: Arc<EnrichmentMap>,
    /// Set while the initial load or a manual refresh is in flight.
    pub is_loading: bool,
    /// Human readable failure of the initial load or the last manual refresh.
    pub error: Option<String>,
    /// When the last manual refresh was accepted.
    pub last_refresh_at: Option<Instant>,
    /// Minimum delay between two accepted manual refreshes.
    pub refresh_cooldown: Duration,
}

impl SyncSnapshot {
    pub(crate) fn idle(refresh_cooldown: Duration) -> Self {
        Self {
            identity: None,
            phase: SyncPhase::Idle,
            matches: Arc::default(),
            enrichment: Arc::default(),
            is_loading: false,
            error: None,
            last_refresh_at: None,
            refresh_cooldown,
        }
    }

    /// Manual refresh gate as seen at `now`.
    pub fn refresh_gate(&self, now: Instant) -> RefreshGate {
        gate_at(self.last_refresh_at, self.refresh_cooldown, now)
    }

    /// Matches paired with their build, in match order.
    pub fn views(&self) -> Vec<MatchView> {
        self.matches
            .iter()
            .map(|record| MatchView::new(record.clone(), self.enrichment.get(&record.match_id).cloned()))
            .collect()
    }
}
