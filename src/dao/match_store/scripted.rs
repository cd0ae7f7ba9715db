//! In-memory [`MatchStore`] replaying scripted backend answers for tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use futures::future::BoxFuture;
use tokio::sync::Notify;

use crate::dao::{
    match_store::MatchStore,
    models::{
        AdviceResult, AnalyzeMatchRequest, BuildRecord, MatchRecord, PlayerIdentity,
        RankInfoEntry,
    },
    storage::{StoreError, StoreResult},
};

/// Scripted answer to one `fetch_matches` call.
#[derive(Clone)]
pub(crate) enum MatchReply {
    Records(Vec<MatchRecord>),
    Fail(String),
    /// Answer with the records once the gate is notified.
    Gated(Arc<Notify>, Vec<MatchRecord>),
}

/// Scripted answer to every `fetch_build` call for one match.
#[derive(Clone)]
pub(crate) enum BuildReply {
    Ready(BuildRecord),
    Fail,
    /// Answer with the build once the gate is notified.
    Gated(Arc<Notify>, BuildRecord),
}

#[derive(Default)]
struct Script {
    matches: HashMap<PlayerIdentity, VecDeque<MatchReply>>,
    builds: HashMap<String, BuildReply>,
    ranks: HashMap<PlayerIdentity, Vec<RankInfoEntry>>,
    advice: Option<AdviceResult>,
    match_calls: HashMap<PlayerIdentity, usize>,
    build_calls: HashMap<String, usize>,
    submitted: Vec<AnalyzeMatchRequest>,
}

#[derive(Default)]
pub(crate) struct ScriptedMatchStore {
    script: Mutex<Script>,
}

impl ScriptedMatchStore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue answers for `identity`; the last one keeps being replayed once the queue drains.
    pub(crate) fn push_matches(&self, identity: &PlayerIdentity, reply: MatchReply) {
        self.script
            .lock()
            .unwrap()
            .matches
            .entry(identity.clone())
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn set_build(&self, match_id: &str, reply: BuildReply) {
        self.script
            .lock()
            .unwrap()
            .builds
            .insert(match_id.to_string(), reply);
    }

    pub(crate) fn set_ranks(&self, identity: &PlayerIdentity, entries: Vec<RankInfoEntry>) {
        self.script
            .lock()
            .unwrap()
            .ranks
            .insert(identity.clone(), entries);
    }

    pub(crate) fn set_advice(&self, advice: AdviceResult) {
        self.script.lock().unwrap().advice = Some(advice);
    }

    pub(crate) fn match_calls(&self, identity: &PlayerIdentity) -> usize {
        let script = self.script.lock().unwrap();
        script.match_calls.get(identity).copied().unwrap_or(0)
    }

    pub(crate) fn build_calls(&self, match_id: &str) -> usize {
        let script = self.script.lock().unwrap();
        script.build_calls.get(match_id).copied().unwrap_or(0)
    }

    pub(crate) fn submitted(&self) -> Vec<AnalyzeMatchRequest> {
        self.script.lock().unwrap().submitted.clone()
    }

    fn next_matches(&self, identity: &PlayerIdentity) -> Option<MatchReply> {
        let mut script = self.script.lock().unwrap();
        *script.match_calls.entry(identity.clone()).or_default() += 1;
        let queue = script.matches.get_mut(identity)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl MatchStore for ScriptedMatchStore {
    fn fetch_matches(
        &self,
        identity: &PlayerIdentity,
    ) -> BoxFuture<'static, StoreResult<Vec<MatchRecord>>> {
        let reply = self.next_matches(identity);
        Box::pin(async move {
            match reply {
                Some(MatchReply::Records(records)) => Ok(records),
                Some(MatchReply::Fail(message)) => Err(StoreError::rejected(message)),
                Some(MatchReply::Gated(gate, records)) => {
                    gate.notified().await;
                    Ok(records)
                }
                None => Err(StoreError::rejected("Failed to fetch match history")),
            }
        })
    }

    fn fetch_build(
        &self,
        match_id: &str,
        _identity: &PlayerIdentity,
    ) -> BoxFuture<'static, StoreResult<Option<BuildRecord>>> {
        let reply = {
            let mut script = self.script.lock().unwrap();
            *script.build_calls.entry(match_id.to_string()).or_default() += 1;
            script.builds.get(match_id).cloned()
        };
        Box::pin(async move {
            match reply {
                Some(BuildReply::Ready(build)) => Ok(Some(build)),
                Some(BuildReply::Fail) => Err(StoreError::rejected("Failed to fetch build")),
                Some(BuildReply::Gated(gate, build)) => {
                    gate.notified().await;
                    Ok(Some(build))
                }
                None => Ok(None),
            }
        })
    }

    fn fetch_rank(
        &self,
        identity: &PlayerIdentity,
        _region: &str,
    ) -> BoxFuture<'static, StoreResult<Vec<RankInfoEntry>>> {
        let entries = self.script.lock().unwrap().ranks.get(identity).cloned();
        Box::pin(async move {
            entries.ok_or_else(|| StoreError::rejected("Failed to fetch rank info"))
        })
    }

    fn submit_match_for_analysis(
        &self,
        request: AnalyzeMatchRequest,
    ) -> BoxFuture<'static, StoreResult<AdviceResult>> {
        let advice = {
            let mut script = self.script.lock().unwrap();
            script.submitted.push(request);
            script.advice.clone()
        };
        Box::pin(async move { advice.ok_or_else(|| StoreError::rejected("analysis failed")) })
    }
}
