use serde::Serialize;

use crate::dao::models::{BuildRecord, MatchRecord};

use super::format_epoch_millis;

/// A match paired with its build once enrichment resolved it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    /// Match statistics, serialized as top-level fields.
    #[serde(flatten)]
    pub record: MatchRecord,
    /// `None` means "no build data", whether it is still pending or failed to load.
    pub build: Option<BuildRecord>,
}

impl MatchView {
    /// Pair `record` with its build, if known.
    pub fn new(record: MatchRecord, build: Option<BuildRecord>) -> Self {
        Self { record, build }
    }

    /// Lane minions plus neutral monsters.
    pub fn total_cs(&self) -> u32 {
        self.record.total_minions_killed + self.record.neutral_minions_killed
    }

    /// Game length as `"31m 5s"`.
    pub fn formatted_duration(&self) -> String {
        let seconds = self.record.game_duration;
        format!("{}m {}s", seconds / 60, seconds % 60)
    }

    /// Display name of the lane played, see [`position_name`].
    pub fn position_name(&self) -> String {
        position_name(&self.record.team_position)
    }

    /// `k/d/a` line as shown on a match card.
    pub fn kda_line(&self) -> String {
        format!(
            "{}/{}/{}",
            self.record.kills, self.record.deaths, self.record.assists
        )
    }

    /// Game start as an RFC 3339 UTC timestamp.
    pub fn started_at(&self) -> String {
        format_epoch_millis(self.record.game_start_timestamp)
    }
}

/// Normalize the lane reported by the game API into a display name.
pub fn position_name(position: &str) -> String {
    match position.to_ascii_lowercase().as_str() {
        "top" => "Top".into(),
        "jungle" => "Jungle".into(),
        "mid" | "middle" => "Mid".into(),
        "bottom" | "adc" => "ADC".into(),
        "utility" | "support" => "Support".into(),
        "" => "Unknown".into(),
        _ => position.to_string(),
    }
}
