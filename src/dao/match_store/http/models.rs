use serde::Deserialize;

/// Error envelope returned by the backend on non-success responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    /// Human readable reason, when the backend gave one.
    #[serde(default)]
    pub error: Option<String>,
}

/// Message used when a match history request fails without explanation.
pub const MATCHES_FAILED: &str = "Failed to fetch match history";
/// Message used when a build request fails without explanation.
pub const BUILD_FAILED: &str = "Failed to fetch build";
/// Message used when a rank request fails without explanation.
pub const RANK_FAILED: &str = "Failed to fetch rank info";
/// Message used when the analyzer fails without explanation.
pub const ANALYSIS_FAILED: &str = "Failed to analyze match";
