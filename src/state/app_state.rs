use crate::app::MenuItem;
use liga_api::{
    BracketError, Match, PlayoffBracket, Round, Scoreline, Season, Standing,
    generate_playoff_bracket, update_playoff_bracket,
};

/// Which side of a match a score key applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

/// Apply a ±1 step to a score that may not be entered yet. Unentered scores
/// start from zero and nothing goes below zero.
pub fn step_score(score: Option<u16>, delta: i8) -> u16 {
    let base = score.unwrap_or(0);
    if delta >= 0 {
        base.saturating_add(delta.unsigned_abs().into())
    } else {
        base.saturating_sub(delta.unsigned_abs().into())
    }
}

// ---------------------------------------------------------------------------
// League season state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SeasonState {
    /// Season with the session's edits applied.
    pub season: Option<Season>,
    /// Rounds exactly as loaded, used to reset the simulation.
    pristine_rounds: Vec<Round>,
    /// Ranked table for the current scores.
    pub standings: Vec<Standing>,
    pub selected_round: usize,
    pub selected_match: usize,
}

impl SeasonState {
    /// Store a freshly loaded season and jump to the first round that still
    /// has something to play.
    pub fn load(&mut self, season: Season) {
        self.pristine_rounds = season.rounds.clone();
        self.selected_round = first_open_round(&season.rounds);
        self.selected_match = 0;
        self.season = Some(season);
        self.recompute();
    }

    pub fn recompute(&mut self) {
        self.standings = self.season.as_ref().map(Season::standings).unwrap_or_default();
    }

    /// Throw away every league edit.
    pub fn restore_pristine(&mut self) {
        if let Some(season) = &mut self.season {
            season.rounds = self.pristine_rounds.clone();
        }
        self.recompute();
    }

    pub fn season_id(&self) -> Option<&str> {
        self.season.as_ref().map(|s| s.id.as_str())
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.season.as_ref()?.rounds.get(self.selected_round)
    }

    pub fn selected(&self) -> Option<&Match> {
        self.current_round()?.matches.get(self.selected_match)
    }

    pub fn navigate_round_next(&mut self) {
        let rounds = self.season.as_ref().map(|s| s.rounds.len()).unwrap_or(0);
        if self.selected_round + 1 < rounds {
            self.selected_round += 1;
            self.selected_match = 0;
        }
    }

    pub fn navigate_round_prev(&mut self) {
        if self.selected_round > 0 {
            self.selected_round -= 1;
            self.selected_match = 0;
        }
    }

    pub fn navigate_match_down(&mut self) {
        let max = self
            .current_round()
            .map(|r| r.matches.len().saturating_sub(1))
            .unwrap_or(0);
        if self.selected_match < max {
            self.selected_match += 1;
        }
    }

    pub fn navigate_match_up(&mut self) {
        self.selected_match = self.selected_match.saturating_sub(1);
    }

    /// Step one side of the selected match. Returns the edited match id and
    /// its new score, or None when nothing changed.
    pub fn adjust_selected(
        &mut self,
        side: Side,
        delta: i8,
    ) -> Option<(String, Option<u16>, Option<u16>)> {
        let m = self.selected()?;
        if !m.is_played() && delta < 0 {
            return None;
        }
        let mut home = m.home_score.unwrap_or(0);
        let mut away = m.away_score.unwrap_or(0);
        match side {
            Side::Home => home = step_score(Some(home), delta),
            Side::Away => away = step_score(Some(away), delta),
        }
        if m.home_score == Some(home) && m.away_score == Some(away) {
            return None;
        }
        let match_id = m.id.clone();
        self.write_score(&match_id, Some(home), Some(away))
    }

    /// Mark the selected match as unplayed again.
    pub fn clear_selected(&mut self) -> Option<(String, Option<u16>, Option<u16>)> {
        let m = self.selected()?;
        if !m.is_played() {
            return None;
        }
        let match_id = m.id.clone();
        self.write_score(&match_id, None, None)
    }

    fn write_score(
        &mut self,
        match_id: &str,
        home: Option<u16>,
        away: Option<u16>,
    ) -> Option<(String, Option<u16>, Option<u16>)> {
        let season = self.season.as_mut()?;
        if !season.set_match_score(match_id, home, away) {
            return None;
        }
        self.recompute();
        Some((match_id.to_owned(), home, away))
    }
}

fn first_open_round(rounds: &[Round]) -> usize {
    rounds
        .iter()
        .position(|r| r.matches.iter().any(|m| !m.is_played()))
        .unwrap_or_else(|| rounds.len().saturating_sub(1))
}

// ---------------------------------------------------------------------------
// Playoff bracket state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct PlayoffState {
    pub bracket: Option<PlayoffBracket>,
    /// Why the bracket could not be seeded, shown in place of the bracket.
    pub seeding_error: Option<String>,
    /// Index into `PlayoffBracket::matches()` order.
    pub selected: usize,
}

impl PlayoffState {
    /// Seed a fresh bracket from the current table.
    pub fn seed(&mut self, season: &Season, standings: &[Standing]) {
        match generate_playoff_bracket(standings, &season.teams) {
            Ok(bracket) => {
                self.bracket = Some(bracket);
                self.seeding_error = None;
            }
            Err(e) => {
                self.bracket = None;
                self.seeding_error = Some(e.to_string());
            }
        }
        self.selected = 0;
    }

    pub fn restore(&mut self, bracket: PlayoffBracket) {
        self.bracket = Some(bracket);
        self.seeding_error = None;
        self.selected = 0;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn selected_match_id(&self) -> Option<String> {
        self.bracket
            .as_ref()?
            .matches()
            .nth(self.selected)
            .map(|m| m.id.clone())
    }

    pub fn navigate_down(&mut self) {
        let count = self.bracket.as_ref().map(|b| b.matches().count()).unwrap_or(0);
        if self.selected + 1 < count {
            self.selected += 1;
        }
    }

    pub fn navigate_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Scoreline for the selected match after stepping one field.
    /// Regulation steps start from 0–0; penalty steps need a level regulation
    /// score first.
    pub fn stepped_scoreline(&self, side: Side, penalties: bool, delta: i8) -> Option<Scoreline> {
        let bracket = self.bracket.as_ref()?;
        let m = bracket.matches().nth(self.selected)?;
        let current = Scoreline::of(m);
        let mut next = current;
        if penalties {
            if !matches!((m.home_score, m.away_score), (Some(h), Some(a)) if h == a) {
                return None;
            }
            let home_p = current.home_penalties.unwrap_or(0);
            let away_p = current.away_penalties.unwrap_or(0);
            next.home_penalties = Some(home_p);
            next.away_penalties = Some(away_p);
            match side {
                Side::Home => next.home_penalties = Some(step_score(Some(home_p), delta)),
                Side::Away => next.away_penalties = Some(step_score(Some(away_p), delta)),
            }
        } else {
            if current.home.is_none() && delta < 0 {
                return None;
            }
            let (home, away) = (current.home.unwrap_or(0), current.away.unwrap_or(0));
            next.home = Some(home);
            next.away = Some(away);
            match side {
                Side::Home => next.home = Some(step_score(Some(home), delta)),
                Side::Away => next.away = Some(step_score(Some(away), delta)),
            }
            // A decisive scoreline makes any shootout moot.
            if next.home != next.away {
                next.home_penalties = None;
                next.away_penalties = None;
            }
        }
        (next != current).then_some(next)
    }

    /// Run `scoreline` through the bracket engine and keep the result.
    pub fn apply(&mut self, match_id: &str, scoreline: Scoreline) -> Result<(), BracketError> {
        let Some(bracket) = self.bracket.as_ref() else {
            return Err(BracketError::Validation("no playoff bracket seeded".into()));
        };
        self.bracket = Some(update_playoff_bracket(bracket, match_id, scoreline)?);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Top-level state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub season: SeasonState,
    pub playoffs: PlayoffState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liga_api::PlayoffStage;
    use liga_api::client::sample_season;

    fn loaded() -> SeasonState {
        let mut state = SeasonState::default();
        state.load(sample_season().unwrap());
        state
    }

    fn seeded() -> PlayoffState {
        let season = sample_season().unwrap();
        let mut playoffs = PlayoffState::default();
        playoffs.seed(&season, &season.standings());
        playoffs
    }

    #[test]
    fn step_score_never_goes_negative() {
        assert_eq!(step_score(None, 1), 1);
        assert_eq!(step_score(None, -1), 0);
        assert_eq!(step_score(Some(0), -1), 0);
        assert_eq!(step_score(Some(4), -1), 3);
        assert_eq!(step_score(Some(u16::MAX), 1), u16::MAX);
    }

    #[test]
    fn load_selects_first_round_with_open_matches() {
        let state = loaded();
        let round = state.current_round().unwrap();
        assert_eq!(round.id, "r5");
        assert_eq!(state.standings.len(), 8);
    }

    #[test]
    fn editing_unplayed_match_starts_from_nil_nil() {
        let mut state = loaded();
        let before = state.selected().unwrap().clone();
        assert!(!before.is_played());

        assert_eq!(state.adjust_selected(Side::Away, -1), None, "nothing to decrement");

        let (id, home, away) = state.adjust_selected(Side::Home, 1).unwrap();
        assert_eq!(id, before.id);
        assert_eq!((home, away), (Some(1), Some(0)));
        assert!(state.selected().unwrap().is_played());
    }

    #[test]
    fn league_edit_recomputes_table() {
        let mut state = loaded();
        let m = state.selected().unwrap().clone();
        let played_before = state
            .standings
            .iter()
            .find(|s| s.team_id == m.home_team_id)
            .unwrap()
            .played;

        state.adjust_selected(Side::Home, 1);

        let home = state.standings.iter().find(|s| s.team_id == m.home_team_id).unwrap();
        assert_eq!(home.played, played_before + 1);
    }

    #[test]
    fn clear_and_restore_pristine() {
        let mut state = loaded();
        state.adjust_selected(Side::Home, 1);
        assert!(state.clear_selected().is_some());
        assert!(!state.selected().unwrap().is_played());
        assert_eq!(state.clear_selected(), None);

        state.adjust_selected(Side::Away, 1);
        state.restore_pristine();
        assert!(!state.selected().unwrap().is_played());
    }

    #[test]
    fn round_navigation_is_bounded() {
        let mut state = loaded();
        state.navigate_round_next();
        assert_eq!(state.current_round().unwrap().id, "r5");
        for _ in 0..10 {
            state.navigate_round_prev();
        }
        assert_eq!(state.current_round().unwrap().id, "r1");
        state.navigate_match_down();
        state.navigate_match_down();
        assert_eq!(state.selected_match, 2);
        for _ in 0..10 {
            state.navigate_match_down();
        }
        assert_eq!(state.selected_match, 3);
    }

    #[test]
    fn seeding_needs_enough_teams() {
        let season = sample_season().unwrap();
        let mut playoffs = PlayoffState::default();
        let short_table: Vec<Standing> = season.standings().into_iter().take(5).collect();
        playoffs.seed(&season, &short_table);
        assert!(playoffs.bracket.is_none());
        assert!(playoffs.seeding_error.as_deref().unwrap().contains("got 5"));

        playoffs.seed(&season, &season.standings());
        assert!(playoffs.bracket.is_some());
        assert_eq!(playoffs.seeding_error, None);
    }

    #[test]
    fn penalties_need_level_regulation_score() {
        let mut playoffs = seeded();
        assert_eq!(playoffs.selected_match_id().as_deref(), Some("qf1"));
        assert_eq!(playoffs.stepped_scoreline(Side::Home, true, 1), None);

        let level = playoffs.stepped_scoreline(Side::Home, false, 1).unwrap();
        playoffs.apply("qf1", level).unwrap();
        let level = playoffs.stepped_scoreline(Side::Away, false, 1).unwrap();
        playoffs.apply("qf1", level).unwrap();

        let shootout = playoffs.stepped_scoreline(Side::Home, true, 1).unwrap();
        assert_eq!(shootout, Scoreline::regulation(1, 1).with_penalties(1, 0));
        playoffs.apply("qf1", shootout).unwrap();

        let bracket = playoffs.bracket.as_ref().unwrap();
        let qf1 = bracket.find_match("qf1").unwrap();
        assert!(qf1.winner_id.is_some());
        assert_eq!(bracket.find_match("sf1").unwrap().away_team_id, qf1.winner_id);
    }

    #[test]
    fn decisive_score_drops_penalties() {
        let mut playoffs = seeded();
        playoffs
            .apply("qf1", Scoreline::regulation(1, 1).with_penalties(5, 4))
            .unwrap();
        let next = playoffs.stepped_scoreline(Side::Home, false, 1).unwrap();
        assert_eq!(next, Scoreline::regulation(2, 1));
    }

    #[test]
    fn playoff_selection_walks_all_matches() {
        let mut playoffs = seeded();
        for _ in 0..10 {
            playoffs.navigate_down();
        }
        assert_eq!(playoffs.selected_match_id().as_deref(), Some("final"));
        let bracket = playoffs.bracket.as_ref().unwrap();
        assert_eq!(bracket.find_match("final").unwrap().stage, PlayoffStage::Final);
        playoffs.navigate_up();
        assert_eq!(playoffs.selected_match_id().as_deref(), Some("sf2"));
    }

    #[test]
    fn apply_without_bracket_is_an_error() {
        let mut playoffs = PlayoffState::default();
        let err = playoffs.apply("qf1", Scoreline::regulation(1, 0)).unwrap_err();
        assert!(matches!(err, BracketError::Validation(_)));
    }
}
