use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

/// Stable key identifying a player across every backend request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerIdentity(Arc<str>);

impl PlayerIdentity {
    /// Wrap a raw `puuid`.
    pub fn new(puuid: impl Into<Arc<str>>) -> Self {
        Self(puuid.into())
    }

    /// Raw `puuid` value as sent to the backend.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerIdentity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlayerIdentity {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// One completed game as cached by the backend, seen from a single player's side.
///
/// Finished matches are never edited upstream, so records are treated as values
/// identified solely by [`MatchRecord::match_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Identifier unique within the player's history.
    #[serde(alias = "metadata.matchId", alias = "match_id")]
    pub match_id: String,
    /// Player the statistics belong to.
    pub puuid: String,
    /// Champion played.
    pub champion_name: String,
    /// Champion identifier as reported by the game API.
    pub champion_id: String,
    /// Role reported by the game client.
    #[serde(default)]
    pub role: String,
    /// Lane assigned by matchmaking (`TOP`, `JUNGLE`, `MIDDLE`, ...).
    #[serde(default)]
    pub team_position: String,
    /// Whether the player's team won.
    pub win: bool,
    /// Champion kills.
    pub kills: u32,
    /// Deaths.
    pub deaths: u32,
    /// Kill assists.
    pub assists: u32,
    /// Gold earned over the game.
    pub gold_earned: u32,
    /// Gold spent over the game.
    pub gold_spent: u32,
    /// Lane minions killed.
    pub total_minions_killed: u32,
    /// Jungle monsters killed.
    pub neutral_minions_killed: u32,
    /// Damage dealt to enemy champions.
    pub damage_dealt_to_champions: u32,
    /// Damage taken from every source.
    pub total_damage_taken: u32,
    /// Vision score.
    pub vision_score: u32,
    /// Wards placed.
    pub wards_placed: u32,
    /// Enemy wards destroyed.
    pub wards_killed: u32,
    /// Turrets destroyed or assisted on.
    pub turret_takedowns: u32,
    /// Inhibitors destroyed or assisted on.
    pub inhibitor_takedowns: u32,
    /// Game start as milliseconds since the Unix epoch.
    pub game_start_timestamp: i64,
    /// Game length in seconds.
    pub game_duration: u32,
    /// Game mode (`CLASSIC`, `ARAM`, ...).
    pub game_mode: String,
    /// Matchmaking queue identifier.
    pub queue_id: u32,
    /// Creep score per minute, precomputed by the backend.
    pub cs_per_min: f64,
    /// Kill/death/assist ratio, precomputed by the backend.
    pub kda: f64,
}

/// Reference to an item held in a build slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    /// Item identifier in the static data.
    pub id: u32,
    /// Display name.
    pub name: String,
    #[serde(default)]
    /// Item description, possibly empty.
    pub description: String,
    #[serde(default)]
    /// Full purchase cost.
    pub total_gold: u32,
}

/// Items a player held at the end of a match, keyed by `(match_id, puuid)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRecord {
    /// Match the build was held in.
    #[serde(alias = "metadata.matchId", alias = "match_id")]
    pub match_id: String,
    /// Player holding the build.
    pub puuid: String,
    /// Ordered item slots, at most [`BuildRecord::MAX_SLOTS`].
    pub items: Vec<ItemRef>,
    /// Static data version the item references were resolved against.
    pub ddragon_version: String,
}

impl BuildRecord {
    /// Inventory size of a player: six item slots plus the trinket.
    pub const MAX_SLOTS: usize = 7;

    /// Drop any slot beyond [`BuildRecord::MAX_SLOTS`], returning how many were removed.
    pub fn truncate_slots(&mut self) -> usize {
        let excess = self.items.len().saturating_sub(Self::MAX_SLOTS);
        self.items.truncate(Self::MAX_SLOTS);
        excess
    }

    /// Item names in slot order.
    pub fn item_names(&self) -> Vec<String> {
        self.items.iter().map(|item| item.name.clone()).collect()
    }
}

/// Ranked queue a [`RankInfoEntry`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueType {
    /// Solo/duo ranked queue.
    #[serde(rename = "RANKED_SOLO_5x5")]
    RankedSolo,
    /// Flex ranked queue.
    #[serde(rename = "RANKED_FLEX_SR")]
    RankedFlex,
    /// Any queue this client does not know about.
    #[serde(other)]
    Other,
}

/// Ranked standing of a player in one queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankInfoEntry {
    /// Player the standing belongs to.
    pub puuid: String,
    /// Queue the standing applies to.
    pub queue_type: QueueType,
    /// Tier name (`GOLD`, `DIAMOND`, ...).
    pub tier: String,
    /// Division inside the tier (`I` to `IV`).
    #[serde(rename = "player_rank")]
    pub player_rank: String,
    /// League points inside the division.
    pub league_points: i32,
    /// Ranked wins this season.
    pub wins: u32,
    /// Ranked losses this season.
    pub losses: u32,
}

impl RankInfoEntry {
    /// Human readable rank such as `GOLD II`.
    pub fn label(&self) -> String {
        format!("{} {}", self.tier, self.player_rank).trim().to_string()
    }

    /// Share of games won, `None` when no game was played.
    pub fn win_rate(&self) -> Option<f64> {
        let total = u64::from(self.wins) + u64::from(self.losses);
        (total > 0).then(|| f64::from(self.wins) / total as f64)
    }
}

/// Payload sent to the match analyzer: the match statistics flattened together with
/// the build item names and the player's rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMatchRequest {
    /// Match statistics, sent as top-level fields.
    #[serde(flatten)]
    pub record: MatchRecord,
    /// Item names of the build, empty when unknown.
    pub build_item_names: Vec<String>,
    /// Rank label such as `GOLD II`, or `UNRANKED`.
    pub player_rank: String,
}

/// Advice computed by the match analyzer for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceResult {
    /// Short archetype label assigned to the performance.
    pub label: String,
    /// What the label means for this match.
    pub description: String,
    /// General description of the archetype.
    pub archetype_description: String,
    /// Free-form improvement advice.
    pub advice: String,
}
