/// reqwest-backed store talking to the backend and the analyzer.
#[cfg(feature = "http-store")]
pub mod http;
#[cfg(test)]
pub(crate) mod scripted;

use crate::dao::models::{
    AdviceResult, AnalyzeMatchRequest, BuildRecord, MatchRecord, PlayerIdentity, RankInfoEntry,
};
use crate::dao::storage::StoreResult;
use futures::future::BoxFuture;

/// Abstraction over the backend holding a player's cached matches and the data derived from them.
///
/// Every call is a single attempt; retries and timeouts belong to the implementation's transport.
pub trait MatchStore: Send + Sync {
    /// Snapshot of the cached matches, most recent first.
    fn fetch_matches(&self, identity: &PlayerIdentity)
    -> BoxFuture<'static, StoreResult<Vec<MatchRecord>>>;
    /// Build of `identity` in `match_id`, `None` while it has not been computed yet.
    fn fetch_build(
        &self,
        match_id: &str,
        identity: &PlayerIdentity,
    ) -> BoxFuture<'static, StoreResult<Option<BuildRecord>>>;
    fn fetch_rank(
        &self,
        identity: &PlayerIdentity,
        region: &str,
    ) -> BoxFuture<'static, StoreResult<Vec<RankInfoEntry>>>;
    fn submit_match_for_analysis(
        &self,
        request: AnalyzeMatchRequest,
    ) -> BoxFuture<'static, StoreResult<AdviceResult>>;
}
