use crate::wire::{SeasonResponse, WireMatch, WireRound, WireStanding, WireTeam};
use crate::{Match, MatchStatus, Round, Season, Standing, Team, TeamColors, TeamDirectory};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const SEASON_JSON_ENV: &str = "LIGATUI_SEASON_JSON";
const API_URL_ENV: &str = "LIGATUI_API_URL";
const FALLBACK_SEASON_JSON: &str = include_str!("../sample_season.json");

/// League data provider: local snapshot, HTTP endpoints or the embedded sample.
#[derive(Debug, Clone)]
pub struct LigaApi {
    client: Client,
    base_url: Option<String>,
    snapshot_path: Option<PathBuf>,
    timeout: Duration,
}

impl Default for LigaApi {
    fn default() -> Self {
        Self {
            client: build_client(),
            base_url: non_empty_env(API_URL_ENV).map(|url| url.trim_end_matches('/').to_owned()),
            snapshot_path: non_empty_env(SEASON_JSON_ENV).map(PathBuf::from),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl LigaApi {
    /// Provider configured from `LIGATUI_SEASON_JSON` / `LIGATUI_API_URL`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider talking to a specific HTTP endpoint, ignoring the environment.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: build_client(),
            base_url: Some(base_url.trim_end_matches('/').to_owned()),
            snapshot_path: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Provider that only ever serves the embedded sample season.
    pub fn offline() -> Self {
        Self {
            client: build_client(),
            base_url: None,
            snapshot_path: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Load the season to simulate.
    ///
    /// Fallback chain:
    /// 1) `LIGATUI_SEASON_JSON`: local `{teams, rounds, standings}` snapshot.
    /// 2) `LIGATUI_API_URL`: `/teams`, `/rounds` and `/standings` endpoints.
    /// 3) Embedded sample season, the offline fallback.
    pub async fn fetch_season(&self) -> ApiResult<Season> {
        if let Some(path) = &self.snapshot_path {
            let content = std::fs::read_to_string(path).map_err(|e| {
                ApiError::NotFound(format!("could not read {}: {e}", path.display()))
            })?;
            let raw: SeasonResponse = serde_json::from_str(&content).map_err(|e| {
                ApiError::Other(format!("invalid season json at {}: {e}", path.display()))
            })?;
            let fallback_id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(slug)
                .unwrap_or_else(|| "local".to_owned());
            return Ok(map_season(raw, &fallback_id));
        }

        let mut last_error: Option<ApiError> = None;
        if let Some(base_url) = &self.base_url {
            match self.fetch_remote_season(base_url).await {
                Ok(season) => return Ok(season),
                Err(e) => {
                    warn!("league provider failed, using embedded season: {e}");
                    last_error = Some(e);
                }
            }
        }

        match sample_season() {
            Ok(season) => Ok(season),
            Err(e) => Err(last_error.unwrap_or(e)),
        }
    }

    pub async fn fetch_teams(&self) -> ApiResult<TeamDirectory> {
        let url = self.endpoint("teams")?;
        let raw: Vec<WireTeam> = self.get(&url).await?;
        Ok(map_teams(raw))
    }

    pub async fn fetch_rounds(&self) -> ApiResult<Vec<Round>> {
        let url = self.endpoint("rounds")?;
        let raw: Vec<WireRound> = self.get(&url).await?;
        Ok(raw.into_iter().map(map_round).collect())
    }

    pub async fn fetch_standings(&self) -> ApiResult<Vec<Standing>> {
        let url = self.endpoint("standings")?;
        let raw: Vec<WireStanding> = self.get(&url).await?;
        Ok(raw.into_iter().map(map_standing).collect())
    }

    async fn fetch_remote_season(&self, base_url: &str) -> ApiResult<Season> {
        let teams = self.fetch_teams().await?;
        let rounds = self.fetch_rounds().await?;
        let seed_standings = self.fetch_standings().await?;
        if rounds.is_empty() {
            return Err(ApiError::NotFound(format!("no rounds published at {base_url}")));
        }
        debug!(
            "loaded {} teams, {} rounds from {base_url}",
            teams.len(),
            rounds.len()
        );
        Ok(Season {
            id: slug(base_url),
            name: base_url.to_owned(),
            teams,
            rounds,
            seed_standings,
        })
    }

    fn endpoint(&self, path: &str) -> ApiResult<String> {
        self.base_url
            .as_deref()
            .map(|base| format!("{base}/{path}"))
            .ok_or_else(|| ApiError::Other(format!("{API_URL_ENV} is not set")))
    }

    async fn get<T: Default + serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) => {
                if e.status().map(|s| s.is_client_error()).unwrap_or(false) {
                    Ok(T::default())
                } else {
                    Err(ApiError::Api(e, url.to_owned()))
                }
            }
        }
    }
}

fn build_client() -> Client {
    Client::builder()
        .user_agent("ligatui/0.1 (terminal league simulator)")
        .build()
        .unwrap_or_default()
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// The season bundled with the binary.
pub fn sample_season() -> ApiResult<Season> {
    let raw: SeasonResponse = serde_json::from_str(FALLBACK_SEASON_JSON)
        .map_err(|e| ApiError::Other(format!("invalid embedded season json: {e}")))?;
    Ok(map_season(raw, "sample"))
}

/// Lowercase, dash-separated identifier usable as a storage key.
fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_owned()
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_season(raw: SeasonResponse, fallback_id: &str) -> Season {
    let id = raw
        .id
        .as_deref()
        .map(slug)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| fallback_id.to_owned());
    Season {
        name: raw.name.unwrap_or_else(|| id.clone()),
        id,
        teams: map_teams(raw.teams),
        rounds: raw.rounds.into_iter().map(map_round).collect(),
        seed_standings: raw.standings.into_iter().map(map_standing).collect(),
    }
}

fn map_teams(raw: Vec<WireTeam>) -> TeamDirectory {
    raw.into_iter()
        .map(|t| {
            let team = map_team(t);
            (team.id.clone(), team)
        })
        .collect()
}

fn map_team(t: WireTeam) -> Team {
    let name = t.name.unwrap_or_else(|| t.id.clone());
    let colors = t.colors.unwrap_or_default();
    Team {
        short_name: t.short_name.unwrap_or_else(|| name.clone()),
        name,
        colors: TeamColors {
            primary: colors.primary,
            secondary: colors.secondary,
        },
        logo_url: t.logo_url,
        id: t.id,
    }
}

fn map_round(r: WireRound) -> Round {
    let matches = r.matches.into_iter().map(|m| map_match(m, &r.id)).collect();
    Round {
        name: r.name.unwrap_or_else(|| format!("Round {}", r.id)),
        id: r.id,
        ended: r.ended,
        matches,
    }
}

fn map_match(m: WireMatch, round_id: &str) -> Match {
    let played = m.home_score.is_some() && m.away_score.is_some();
    Match {
        status: parse_status(m.status.as_deref(), played),
        date: m.date.as_deref().and_then(parse_date),
        id: m.id,
        round_id: round_id.to_owned(),
        home_team_id: m.home_team_id,
        away_team_id: m.away_team_id,
        home_score: m.home_score,
        away_score: m.away_score,
        home_score_1t: m.home_score_1t,
        away_score_1t: m.away_score_1t,
        home_score_2t: m.home_score_2t,
        away_score_2t: m.away_score_2t,
        home_score_p: m.home_score_p,
        away_score_p: m.away_score_p,
        metadata: m.metadata,
    }
}

fn map_standing(s: WireStanding) -> Standing {
    let name = s.name.unwrap_or_else(|| format!("Team {}", s.team_id));
    Standing {
        short_name: s.short_name.unwrap_or_else(|| name.clone()),
        name,
        logo_url: s.logo_url,
        team_id: s.team_id,
        ..Standing::default()
    }
}

/// Providers disagree on status vocabulary; anything unknown falls back to
/// whether the scoreline is complete.
fn parse_status(raw: Option<&str>, played: bool) -> MatchStatus {
    let fallback = if played {
        MatchStatus::Finished
    } else {
        MatchStatus::Scheduled
    };
    let Some(raw) = raw else {
        return fallback;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "scheduled" | "not_started" | "ns" | "tbd" => MatchStatus::Scheduled,
        "live" | "in_progress" | "1t" | "2t" | "ht" | "halftime" => MatchStatus::Live,
        "finished" | "ended" | "ft" | "aet" | "pen" => MatchStatus::Finished,
        "postponed" | "cancelled" | "canceled" | "suspended" => MatchStatus::Postponed,
        _ => fallback,
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn embedded_season_parses() {
        let season = sample_season().expect("embedded season should parse");
        assert_eq!(season.id, "liga-costa-2025");
        assert!(season.teams.len() >= 7);
        assert!(!season.rounds.is_empty());
        assert!(season.rounds.iter().any(|r| !r.ended));
    }

    #[test]
    fn embedded_season_ranks_every_team() {
        let season = sample_season().unwrap();
        let table = season.standings();
        assert_eq!(table.len(), season.teams.len());
        assert!(table.iter().all(|s| season.teams.contains_key(&s.team_id)));
    }

    #[test]
    fn status_strings_are_normalised() {
        assert_eq!(parse_status(Some("FT"), true), MatchStatus::Finished);
        assert_eq!(parse_status(Some("live"), false), MatchStatus::Live);
        assert_eq!(parse_status(Some("Postponed"), false), MatchStatus::Postponed);
        assert_eq!(parse_status(Some("scheduled"), false), MatchStatus::Scheduled);
    }

    #[test]
    fn unknown_status_falls_back_to_scoreline() {
        assert_eq!(parse_status(Some("weird"), true), MatchStatus::Finished);
        assert_eq!(parse_status(None, false), MatchStatus::Scheduled);
    }

    #[test]
    fn dates_are_converted_to_utc() {
        let dt = parse_date("2025-03-08T18:30:00-03:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 3, 8, 21, 30, 0).unwrap());
        assert!(parse_date("next saturday").is_none());
    }

    #[test]
    fn match_keeps_period_and_penalty_scores() {
        let raw: WireMatch = serde_json::from_str(
            r#"{
                "id": "m7", "status": "finished",
                "homeTeamId": "nor", "awayTeamId": "sur",
                "homeScore": 1, "awayScore": 1,
                "homeScore1T": 0, "awayScore1T": 1,
                "homeScore2T": 1, "awayScore2T": 0,
                "homeScoreP": 4, "awayScoreP": 3,
                "metadata": {"stadium": "Estadio do Norte"}
            }"#,
        )
        .unwrap();
        let m = map_match(raw, "r3");
        assert_eq!(m.round_id, "r3");
        assert_eq!((m.home_score_1t, m.away_score_1t), (Some(0), Some(1)));
        assert_eq!((m.home_score_p, m.away_score_p), (Some(4), Some(3)));
        assert_eq!(m.status, MatchStatus::Finished);
        assert!(m.metadata.is_some());
    }

    #[test]
    fn team_names_fall_back_to_id() {
        let team = map_team(WireTeam {
            id: "rio".into(),
            ..Default::default()
        });
        assert_eq!(team.name, "rio");
        assert_eq!(team.short_name, "rio");
        assert!(team.colors.primary.is_none());
    }

    #[test]
    fn slug_is_storage_safe() {
        assert_eq!(slug("http://127.0.0.1:8080/liga/"), "http-127-0-0-1-8080-liga");
        assert_eq!(slug("Liga Costa 2025"), "liga-costa-2025");
    }
}
