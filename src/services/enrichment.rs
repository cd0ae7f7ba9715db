use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use tracing::debug;

use crate::{
    dao::{
        match_store::MatchStore,
        models::{BuildRecord, PlayerIdentity},
    },
    state::{EnrichmentMap, MatchCollection},
};

/// Match ids of `matches` that have neither a build nor a lookup in flight.
pub fn pending_match_ids(
    matches: &MatchCollection,
    enrichment: &EnrichmentMap,
    in_flight: &HashSet<String>,
) -> Vec<String> {
    matches
        .match_ids()
        .filter(|id| !enrichment.contains(id) && !in_flight.contains(*id))
        .map(str::to_string)
        .collect()
}

/// Look up the build of every match in `match_ids` concurrently.
///
/// Only resolved builds are returned. A build that does not exist yet or a failed lookup
/// leaves its match out of the result and never affects the other lookups.
pub async fn fetch_builds(
    store: &dyn MatchStore,
    identity: &PlayerIdentity,
    match_ids: &[String],
) -> HashMap<String, BuildRecord> {
    let lookups = match_ids.iter().map(|match_id| {
        let lookup = store.fetch_build(match_id, identity);
        async move { (match_id, lookup.await) }
    });

    let mut resolved = HashMap::new();
    for (match_id, outcome) in join_all(lookups).await {
        match outcome {
            Ok(Some(build)) => {
                resolved.insert(match_id.clone(), build);
            }
            Ok(None) => debug!(%match_id, "build not available yet"),
            Err(err) => debug!(%match_id, error = %err, "build lookup failed"),
        }
    }
    resolved
}
