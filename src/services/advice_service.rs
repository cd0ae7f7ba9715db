use tracing::info;

use crate::{
    dao::{
        match_store::MatchStore,
        models::{AdviceResult, AnalyzeMatchRequest},
    },
    dto::MatchView,
    error::ServiceError,
    services::rank_service::UNRANKED,
};

/// Build the analyzer payload for a match; a missing build is sent as no items.
pub fn analysis_request(view: &MatchView, player_rank: &str) -> AnalyzeMatchRequest {
    let player_rank = match player_rank.trim() {
        "" => UNRANKED.to_string(),
        rank => rank.to_string(),
    };

    AnalyzeMatchRequest {
        record: view.record.clone(),
        build_item_names: view
            .build
            .as_ref()
            .map(|build| build.item_names())
            .unwrap_or_default(),
        player_rank,
    }
}

/// Ask the analyzer for advice on one match. Runs once per call, outside of any polling.
pub async fn request_advice(
    store: &dyn MatchStore,
    view: &MatchView,
    player_rank: &str,
) -> Result<AdviceResult, ServiceError> {
    let request = analysis_request(view, player_rank);
    let advice = store.submit_match_for_analysis(request).await?;
    info!(match_id = %view.record.match_id, label = %advice.label, "match analysis received");
    Ok(advice)
}
