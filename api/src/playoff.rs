use crate::standings::PLAYOFF_SPOTS;
use crate::{PlayoffBracket, PlayoffMatch, PlayoffStage, Standing, TeamDirectory};
use log::{debug, info, warn};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketError {
    /// Input can't produce a bracket (too few teams in the table).
    Validation(String),
    /// Referenced playoff match is not part of the bracket.
    NotFound(String),
}

impl fmt::Display for BracketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketError::Validation(msg) => write!(f, "Invalid bracket input: {msg}"),
            BracketError::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for BracketError {}

/// Result entered for a playoff match. `None` clears the corresponding score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scoreline {
    pub home: Option<u16>,
    pub away: Option<u16>,
    pub home_penalties: Option<u16>,
    pub away_penalties: Option<u16>,
}

impl Scoreline {
    pub fn regulation(home: u16, away: u16) -> Self {
        Self {
            home: Some(home),
            away: Some(away),
            ..Self::default()
        }
    }

    pub fn with_penalties(self, home: u16, away: u16) -> Self {
        Self {
            home_penalties: Some(home),
            away_penalties: Some(away),
            ..self
        }
    }

    pub fn cleared() -> Self {
        Self::default()
    }

    /// Scores currently entered on `m`.
    pub fn of(m: &PlayoffMatch) -> Self {
        Self {
            home: m.home_score,
            away: m.away_score,
            home_penalties: m.home_score_p,
            away_penalties: m.away_score_p,
        }
    }
}

// ---------------------------------------------------------------------------
// Routing table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotRule {
    Fixed(Slot),
    /// qf2 and qf3 both feed sf2; whoever resolves first takes the home slot.
    FirstEmpty,
}

/// Where each match's winner goes. The final is terminal and has no entry.
const ROUTES: [(&str, &str, SlotRule); 5] = [
    ("qf1", "sf1", SlotRule::Fixed(Slot::Away)),
    ("qf2", "sf2", SlotRule::FirstEmpty),
    ("qf3", "sf2", SlotRule::FirstEmpty),
    ("sf1", "final", SlotRule::Fixed(Slot::Home)),
    ("sf2", "final", SlotRule::Fixed(Slot::Away)),
];

fn route(source_id: &str) -> Option<(&'static str, SlotRule)> {
    ROUTES
        .iter()
        .find(|(source, _, _)| *source == source_id)
        .map(|&(_, target, rule)| (target, rule))
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Build the initial bracket from a ranked table.
///
/// Seeding is fixed: 4v5, 3v6 and 2v7 in the quarterfinals, first place waits
/// in sf1's home slot. Everything else starts empty.
pub fn generate_playoff_bracket(
    standings: &[Standing],
    teams: &TeamDirectory,
) -> Result<PlayoffBracket, BracketError> {
    if standings.len() < PLAYOFF_SPOTS {
        return Err(BracketError::Validation(format!(
            "seeding needs at least {PLAYOFF_SPOTS} teams in the table, got {}",
            standings.len()
        )));
    }

    // 1-based table position → team id.
    // The directory is only consulted to flag ids it doesn't know.
    let seed = |position: usize| -> String {
        let team_id = &standings[position - 1].team_id;
        if !teams.contains_key(team_id) {
            debug!("seed {position} ({team_id}) is not in the team directory");
        }
        team_id.clone()
    };

    let quarterfinals = vec![
        seeded("qf1", PlayoffStage::Quarterfinal, 1, 1, Some(seed(4)), Some(seed(5))),
        seeded("qf2", PlayoffStage::Quarterfinal, 2, 2, Some(seed(3)), Some(seed(6))),
        seeded("qf3", PlayoffStage::Quarterfinal, 3, 3, Some(seed(2)), Some(seed(7))),
    ];
    let semifinals = vec![
        seeded("sf1", PlayoffStage::Semifinal, 1, 4, Some(seed(1)), None),
        seeded("sf2", PlayoffStage::Semifinal, 2, 5, None, None),
    ];
    let final_match = seeded("final", PlayoffStage::Final, 1, 6, None, None);

    info!(
        "seeded playoffs from {} standings, {} has the bye",
        standings.len(),
        standings[0].team_id
    );
    Ok(PlayoffBracket {
        quarterfinals,
        semifinals,
        final_match,
    })
}

fn seeded(
    id: &str,
    stage: PlayoffStage,
    match_number: u8,
    order: u8,
    home: Option<String>,
    away: Option<String>,
) -> PlayoffMatch {
    let next = route(id).map(|(target, _)| target);
    let mut m = PlayoffMatch::new(id, stage, match_number, order, next);
    m.home_team_id = home;
    m.away_team_id = away;
    m
}

// ---------------------------------------------------------------------------
// Propagation
// ---------------------------------------------------------------------------

/// Enter a result for one playoff match and return the updated bracket.
///
/// The input bracket is never modified. When the winner changes, the old
/// winner is pulled out of the next match and the new one moved in. The next
/// match keeps its own scores but loses its winner; a semifinal losing its
/// winner this way also pulls that team back out of the final.
pub fn update_playoff_bracket(
    bracket: &PlayoffBracket,
    match_id: &str,
    scoreline: Scoreline,
) -> Result<PlayoffBracket, BracketError> {
    let mut updated = bracket.clone();
    let m = updated
        .find_match_mut(match_id)
        .ok_or_else(|| BracketError::NotFound(format!("playoff match {match_id}")))?;

    let previous_winner = m.winner_id.clone();
    let next_match_id = m.next_match_id.clone();

    m.home_score = scoreline.home;
    m.away_score = scoreline.away;
    m.home_score_p = scoreline.home_penalties;
    m.away_score_p = scoreline.away_penalties;
    m.winner_id = m.decided_winner();
    let new_winner = m.winner_id.clone();

    if previous_winner == new_winner {
        debug!("{match_id}: winner unchanged ({new_winner:?})");
        return Ok(updated);
    }

    let Some(target_id) = next_match_id else {
        match new_winner.as_deref() {
            Some(champion) => info!("{champion} wins the final"),
            None => info!("final is undecided again"),
        }
        return Ok(updated);
    };

    let target_stage = updated.find_match(&target_id).map(|t| t.stage);
    let cleared = advance(
        &mut updated,
        match_id,
        &target_id,
        previous_winner.as_deref(),
        new_winner.as_deref(),
    );

    // Second and last step: quarterfinal → semifinal → final.
    if let Some(stale) = cleared
        && target_stage == Some(PlayoffStage::Semifinal)
    {
        debug!("{target_id} lost its winner {stale}, rolling back the final");
        advance(&mut updated, &target_id, "final", Some(&stale), None);
    }

    Ok(updated)
}

/// Move `source_id`'s winner into `target_id`: roll `previous` back out, put
/// `new` in. Returns the winner the target had to give up when its line-up
/// changed.
fn advance(
    bracket: &mut PlayoffBracket,
    source_id: &str,
    target_id: &str,
    previous: Option<&str>,
    new: Option<&str>,
) -> Option<String> {
    let Some(target) = bracket.find_match_mut(target_id) else {
        warn!("{source_id} feeds unknown match {target_id}");
        return None;
    };
    let before = (target.home_team_id.clone(), target.away_team_id.clone());

    if let Some(previous) = previous {
        if target.home_team_id.as_deref() == Some(previous) {
            target.home_team_id = None;
        }
        if target.away_team_id.as_deref() == Some(previous) {
            target.away_team_id = None;
        }
    }

    if let Some(new) = new
        && !target.has_team(new)
    {
        insert_winner(target, source_id, new);
    }

    if before.0 == target.home_team_id && before.1 == target.away_team_id {
        return None;
    }
    debug!(
        "{target_id} now {:?} v {:?}",
        target.home_team_id, target.away_team_id
    );
    target.winner_id.take()
}

fn insert_winner(target: &mut PlayoffMatch, source_id: &str, team_id: &str) {
    let slot = if target.home_team_id.is_none() {
        Some(Slot::Home)
    } else if target.away_team_id.is_none() {
        Some(Slot::Away)
    } else {
        match route(source_id) {
            Some((_, SlotRule::Fixed(slot))) => {
                warn!("{} is full, routing {source_id} winner to {slot:?}", target.id);
                Some(slot)
            }
            _ => None,
        }
    };

    match slot {
        Some(Slot::Home) => target.home_team_id = Some(team_id.to_owned()),
        Some(Slot::Away) => target.away_team_id = Some(team_id.to_owned()),
        None => warn!("no slot left in {} for {team_id} from {source_id}", target.id),
    }
}
