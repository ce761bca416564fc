//! Provider wire types: serde shapes for the league data endpoints and the
//! local season snapshot. Mapped to the domain types in client.rs.
use serde::Deserialize;

/// Local snapshot / embedded fallback: everything in one document.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct SeasonResponse {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub teams: Vec<WireTeam>,
    #[serde(default)]
    pub rounds: Vec<WireRound>,
    #[serde(default)]
    pub standings: Vec<WireStanding>,
}

// ---------------------------------------------------------------------------
// Teams  (GET /teams)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireTeam {
    pub id: String,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub logo_url: Option<String>,
    pub colors: Option<WireColors>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireColors {
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

// ---------------------------------------------------------------------------
// Rounds  (GET /rounds)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireRound {
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub ended: bool,
    #[serde(default)]
    pub matches: Vec<WireMatch>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireMatch {
    pub id: String,
    pub date: Option<String>, // ISO 8601
    pub status: Option<String>,
    pub home_team_id: String,
    pub away_team_id: String,
    pub home_score: Option<u16>,
    pub away_score: Option<u16>,
    #[serde(rename = "homeScore1T")]
    pub home_score_1t: Option<u16>,
    #[serde(rename = "awayScore1T")]
    pub away_score_1t: Option<u16>,
    #[serde(rename = "homeScore2T")]
    pub home_score_2t: Option<u16>,
    #[serde(rename = "awayScore2T")]
    pub away_score_2t: Option<u16>,
    #[serde(rename = "homeScoreP")]
    pub home_score_p: Option<u16>,
    #[serde(rename = "awayScoreP")]
    pub away_score_p: Option<u16>,
    pub metadata: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Standings  (GET /standings)
// ---------------------------------------------------------------------------

/// Only identity fields are read; counters are recomputed locally.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireStanding {
    pub team_id: String,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub logo_url: Option<String>,
}
