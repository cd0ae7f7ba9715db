use tracing::debug;

use crate::{
    dao::{
        match_store::MatchStore,
        models::{PlayerIdentity, QueueType, RankInfoEntry},
    },
    error::ServiceError,
};

/// Label used when the player has no ranked standing.
pub const UNRANKED: &str = "UNRANKED";

/// Fetch the player's ranked entries, solo queue first.
pub async fn load_ranks(
    store: &dyn MatchStore,
    identity: &PlayerIdentity,
    region: &str,
) -> Result<Vec<RankInfoEntry>, ServiceError> {
    let region = region.trim();
    if region.is_empty() {
        return Err(ServiceError::InvalidInput("region must not be empty".into()));
    }

    let mut entries = store.fetch_rank(identity, region).await?;
    sort_solo_first(&mut entries);
    debug!(puuid = %identity, region, count = entries.len(), "rank entries loaded");
    Ok(entries)
}

/// Move solo queue entries in front, keeping the backend order otherwise.
pub fn sort_solo_first(entries: &mut [RankInfoEntry]) {
    entries.sort_by_key(|entry| entry.queue_type != QueueType::RankedSolo);
}

/// Rank sent along with match analysis: solo queue, then flex, then [`UNRANKED`].
pub fn player_rank_label(entries: &[RankInfoEntry]) -> String {
    [QueueType::RankedSolo, QueueType::RankedFlex]
        .iter()
        .find_map(|queue| entries.iter().find(|entry| entry.queue_type == *queue))
        .map(RankInfoEntry::label)
        .unwrap_or_else(|| UNRANKED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::match_store::scripted::ScriptedMatchStore;

    fn entry(queue_type: QueueType, tier: &str) -> RankInfoEntry {
        RankInfoEntry {
            puuid: "player-1".into(),
            queue_type,
            tier: tier.into(),
            player_rank: "II".into(),
            league_points: 50,
            wins: 10,
            losses: 10,
        }
    }

    #[tokio::test]
    async fn solo_queue_comes_first() {
        let player = PlayerIdentity::from("player-1");
        let store = ScriptedMatchStore::new();
        store.set_ranks(
            &player,
            vec![
                entry(QueueType::RankedFlex, "SILVER"),
                entry(QueueType::Other, "IRON"),
                entry(QueueType::RankedSolo, "GOLD"),
            ],
        );

        let entries = load_ranks(store.as_ref(), &player, "euw1").await.unwrap();
        let tiers: Vec<_> = entries.iter().map(|e| e.tier.as_str()).collect();
        assert_eq!(tiers, ["GOLD", "SILVER", "IRON"]);
    }

    #[tokio::test]
    async fn blank_region_is_rejected() {
        let store = ScriptedMatchStore::new();
        let err = load_ranks(store.as_ref(), &PlayerIdentity::from("player-1"), "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn backend_failure_is_reported() {
        let store = ScriptedMatchStore::new();
        let err = load_ranks(store.as_ref(), &PlayerIdentity::from("player-1"), "euw1")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch rank info");
    }

    #[test]
    fn rank_label_prefers_solo_then_flex() {
        assert_eq!(
            player_rank_label(&[
                entry(QueueType::RankedFlex, "SILVER"),
                entry(QueueType::RankedSolo, "GOLD")
            ]),
            "GOLD II"
        );
        assert_eq!(
            player_rank_label(&[entry(QueueType::RankedFlex, "SILVER")]),
            "SILVER II"
        );
        assert_eq!(player_rank_label(&[entry(QueueType::Other, "IRON")]), UNRANKED);
    }
}
