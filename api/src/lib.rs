pub mod client;
pub mod playoff;
pub mod standings;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use playoff::{BracketError, Scoreline, generate_playoff_bracket, update_playoff_bracket};
pub use standings::calculate_standings;

/// Team reference data keyed by team id.
pub type TeamDirectory = HashMap<String, Team>;

// ---------------------------------------------------------------------------
// Domain types, independent of the provider wire format
// ---------------------------------------------------------------------------

/// One simulated competition: reference data, the regular season and the
/// standings snapshot the provider shipped with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Season {
    pub id: String,
    pub name: String,
    pub teams: TeamDirectory,
    pub rounds: Vec<Round>,
    /// Provider standings. Only used for identity/logo lookup; the numbers are
    /// always recomputed from `rounds`.
    pub seed_standings: Vec<Standing>,
}

impl Season {
    /// Find a match by ID across all rounds.
    pub fn find_match(&self, match_id: &str) -> Option<&Match> {
        self.rounds
            .iter()
            .flat_map(|r| r.matches.iter())
            .find(|m| m.id == match_id)
    }

    pub fn find_match_mut(&mut self, match_id: &str) -> Option<&mut Match> {
        for round in &mut self.rounds {
            for m in &mut round.matches {
                if m.id == match_id {
                    return Some(m);
                }
            }
        }
        None
    }

    /// Overwrite the regulation score of a league match. Returns false when the
    /// id is unknown.
    pub fn set_match_score(
        &mut self,
        match_id: &str,
        home: Option<u16>,
        away: Option<u16>,
    ) -> bool {
        let Some(m) = self.find_match_mut(match_id) else {
            return false;
        };
        m.home_score = home;
        m.away_score = away;
        m.status = if m.is_played() {
            MatchStatus::Finished
        } else {
            MatchStatus::Scheduled
        };
        true
    }

    /// Ranked table for the current state of `rounds`.
    pub fn standings(&self) -> Vec<Standing> {
        calculate_standings(&self.rounds, &self.teams, &self.seed_standings)
    }

    pub fn team_name(&self, team_id: &str) -> String {
        self.teams
            .get(team_id)
            .map(|t| t.short_name.clone())
            .unwrap_or_else(|| team_id.to_owned())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,       // "Norte Futebol Clube"
    pub short_name: String, // "Norte"
    pub colors: TeamColors,
    pub logo_url: Option<String>,
}

/// Hex colours ("#1d4e89") used to theme a team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamColors {
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Round {
    pub id: String,
    pub name: String,
    pub ended: bool,
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub round_id: String,
    pub date: Option<DateTime<Utc>>,
    pub status: MatchStatus,
    pub home_team_id: String,
    pub away_team_id: String,
    pub home_score: Option<u16>,
    pub away_score: Option<u16>,
    pub home_score_1t: Option<u16>,
    pub away_score_1t: Option<u16>,
    pub home_score_2t: Option<u16>,
    pub away_score_2t: Option<u16>,
    pub home_score_p: Option<u16>,
    pub away_score_p: Option<u16>,
    pub metadata: Option<serde_json::Value>,
}

impl Match {
    /// A match counts towards the table once both regulation scores are known.
    pub fn is_played(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Finished,
    Postponed,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "SCH",
            MatchStatus::Live => "LIVE",
            MatchStatus::Finished => "FT",
            MatchStatus::Postponed => "PPD",
        }
    }
}

/// A team's aggregated record in the league table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub team_id: String,
    pub name: String,
    pub short_name: String,
    pub logo_url: Option<String>,
    pub points: u32,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub position_legend: Option<PositionLegend>,
}

/// Where a table position leads once the regular season ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionLegend {
    /// First place skips the quarterfinals.
    Semifinal,
    Quarterfinal,
}

impl PositionLegend {
    pub fn label(&self) -> &'static str {
        match self {
            PositionLegend::Semifinal => "semifinal bye",
            PositionLegend::Quarterfinal => "quarterfinal",
        }
    }
}

// ---------------------------------------------------------------------------
// Playoff bracket
// ---------------------------------------------------------------------------

/// Bracket depth. Ordered from earliest to latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlayoffStage {
    Quarterfinal,
    Semifinal,
    Final,
}

impl PlayoffStage {
    pub fn label(&self) -> &'static str {
        match self {
            PlayoffStage::Quarterfinal => "Quarterfinals",
            PlayoffStage::Semifinal => "Semifinals",
            PlayoffStage::Final => "Final",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            PlayoffStage::Quarterfinal => Some(PlayoffStage::Semifinal),
            PlayoffStage::Semifinal => Some(PlayoffStage::Final),
            PlayoffStage::Final => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffMatch {
    pub id: String, // "qf1", "sf2", "final"
    pub stage: PlayoffStage,
    pub match_number: u8,
    pub order: u8,
    pub home_team_id: Option<String>, // None = slot not decided yet
    pub away_team_id: Option<String>,
    pub home_score: Option<u16>,
    pub away_score: Option<u16>,
    pub home_score_p: Option<u16>,
    pub away_score_p: Option<u16>,
    pub winner_id: Option<String>,
    /// Match the winner moves on to. None only for the final.
    pub next_match_id: Option<String>,
}

impl PlayoffMatch {
    pub fn new(
        id: &str,
        stage: PlayoffStage,
        match_number: u8,
        order: u8,
        next: Option<&str>,
    ) -> Self {
        Self {
            id: id.to_owned(),
            stage,
            match_number,
            order,
            home_team_id: None,
            away_team_id: None,
            home_score: None,
            away_score: None,
            home_score_p: None,
            away_score_p: None,
            winner_id: None,
            next_match_id: next.map(str::to_owned),
        }
    }

    pub fn has_team(&self, team_id: &str) -> bool {
        self.home_team_id.as_deref() == Some(team_id)
            || self.away_team_id.as_deref() == Some(team_id)
    }

    /// Winner implied by the entered scores: regulation first, then penalties
    /// on a level scoreline. None while the result is incomplete.
    pub fn decided_winner(&self) -> Option<String> {
        let (home, away) = (self.home_score?, self.away_score?);
        let home_wins = if home != away {
            home > away
        } else {
            let (home_p, away_p) = (self.home_score_p?, self.away_score_p?);
            if home_p == away_p {
                return None;
            }
            home_p > away_p
        };
        if home_wins {
            self.home_team_id.clone()
        } else {
            self.away_team_id.clone()
        }
    }

    /// Level regulation scoreline still waiting for a shootout result.
    pub fn shootout_pending(&self) -> bool {
        matches!((self.home_score, self.away_score), (Some(h), Some(a)) if h == a)
            && self.winner_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffBracket {
    pub quarterfinals: Vec<PlayoffMatch>,
    pub semifinals: Vec<PlayoffMatch>,
    #[serde(rename = "final")]
    pub final_match: PlayoffMatch,
}

impl PlayoffBracket {
    /// All matches in display order: quarterfinals, semifinals, final.
    pub fn matches(&self) -> impl Iterator<Item = &PlayoffMatch> {
        self.quarterfinals
            .iter()
            .chain(self.semifinals.iter())
            .chain(std::iter::once(&self.final_match))
    }

    pub fn find_match(&self, match_id: &str) -> Option<&PlayoffMatch> {
        self.matches().find(|m| m.id == match_id)
    }

    pub fn find_match_mut(&mut self, match_id: &str) -> Option<&mut PlayoffMatch> {
        self.quarterfinals
            .iter_mut()
            .chain(self.semifinals.iter_mut())
            .chain(std::iter::once(&mut self.final_match))
            .find(|m| m.id == match_id)
    }

    pub fn champion(&self) -> Option<&str> {
        self.final_match.winner_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_run_quarterfinal_to_final() {
        let stages: Vec<PlayoffStage> =
            std::iter::successors(Some(PlayoffStage::Quarterfinal), |s| s.next()).collect();
        assert_eq!(
            stages,
            vec![PlayoffStage::Quarterfinal, PlayoffStage::Semifinal, PlayoffStage::Final]
        );
        assert_eq!(PlayoffStage::Final.next(), None);
    }

    #[test]
    fn legend_labels_name_the_playoff_route() {
        assert_eq!(PositionLegend::Semifinal.label(), "semifinal bye");
        assert_eq!(PositionLegend::Quarterfinal.label(), "quarterfinal");
    }
}
