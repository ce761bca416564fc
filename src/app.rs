use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, Side};
use crate::state::session::{FileStore, ScoreEdit, SessionStore, SimulatedSession};
use liga_api::{Scoreline, Season};
use log::{debug, info, warn};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Standings,
    Fixtures,
    Playoffs,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    session: SimulatedSession,
    store: Box<dyn SessionStore>,
}

impl App {
    pub fn new() -> Self {
        let settings = AppSettings::load();
        let app = Self::with_store(settings, Box::new(FileStore::default_location()));

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    pub fn with_store(settings: AppSettings, store: Box<dyn SessionStore>) -> Self {
        Self {
            settings,
            state: AppState::new(),
            session: SimulatedSession::default(),
            store,
        }
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    /// Install a loaded season, replay the saved session on top of it and
    /// restore or seed the bracket.
    pub fn on_season_loaded(&mut self, season: Season) {
        self.state.last_error = None;
        let mut session = self.load_session(&season.id);

        self.state.season.load(season);
        if let Some(current) = self.state.season.season.as_mut() {
            session.apply_scores(current);
        }
        self.state.season.recompute();

        match session.bracket.clone() {
            Some(bracket) => {
                debug!("restored playoff bracket for {}", session.season_id);
                self.state.playoffs.restore(bracket);
            }
            None => {
                self.state.playoffs.clear();
                if let Some(season) = self.state.season.season.as_ref() {
                    self.state.playoffs.seed(season, &self.state.season.standings);
                }
                session.bracket = self.state.playoffs.bracket.clone();
            }
        }

        info!(
            "session {}: {} league edits replayed",
            session.season_id,
            session.scores.len()
        );
        self.session = session;
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // League fixtures
    // -----------------------------------------------------------------------

    pub fn fixtures_next_round(&mut self) {
        self.state.season.navigate_round_next();
    }

    pub fn fixtures_prev_round(&mut self) {
        self.state.season.navigate_round_prev();
    }

    pub fn fixtures_match_down(&mut self) {
        self.state.season.navigate_match_down();
    }

    pub fn fixtures_match_up(&mut self) {
        self.state.season.navigate_match_up();
    }

    pub fn adjust_league_score(&mut self, side: Side, delta: i8) {
        if let Some((match_id, home, away)) = self.state.season.adjust_selected(side, delta) {
            self.record_league_edit(match_id, home, away);
        }
    }

    pub fn clear_league_score(&mut self) {
        if let Some((match_id, home, away)) = self.state.season.clear_selected() {
            self.record_league_edit(match_id, home, away);
        }
    }

    fn record_league_edit(&mut self, match_id: String, home: Option<u16>, away: Option<u16>) {
        debug!("league edit {match_id}: {home:?}-{away:?}");
        self.session.scores.insert(match_id, ScoreEdit { home, away });
        self.persist();
    }

    // -----------------------------------------------------------------------
    // Playoffs
    // -----------------------------------------------------------------------

    pub fn playoffs_match_down(&mut self) {
        self.state.playoffs.navigate_down();
    }

    pub fn playoffs_match_up(&mut self) {
        self.state.playoffs.navigate_up();
    }

    pub fn adjust_playoff_score(&mut self, side: Side, penalties: bool, delta: i8) {
        let Some(match_id) = self.state.playoffs.selected_match_id() else {
            return;
        };
        let Some(scoreline) = self.state.playoffs.stepped_scoreline(side, penalties, delta) else {
            return;
        };
        self.apply_playoff_scoreline(&match_id, scoreline);
    }

    pub fn clear_playoff_score(&mut self) {
        let Some(match_id) = self.state.playoffs.selected_match_id() else {
            return;
        };
        self.apply_playoff_scoreline(&match_id, Scoreline::cleared());
    }

    fn apply_playoff_scoreline(&mut self, match_id: &str, scoreline: Scoreline) {
        match self.state.playoffs.apply(match_id, scoreline) {
            Ok(()) => {
                self.state.last_error = None;
                self.session.bracket = self.state.playoffs.bracket.clone();
                self.persist();
            }
            Err(e) => {
                warn!("playoff update for {match_id} rejected: {e}");
                self.on_error(e.to_string());
            }
        }
    }

    /// Throw the bracket away and seed it again from the current table.
    pub fn reseed_bracket(&mut self) {
        let Some(season) = self.state.season.season.as_ref() else {
            return;
        };
        self.state.playoffs.seed(season, &self.state.season.standings);
        self.session.bracket = self.state.playoffs.bracket.clone();
        self.persist();
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Forget every edit: delete the saved session, restore the loaded
    /// scores and seed a new bracket from them.
    pub fn reset_simulation(&mut self) {
        let Some(season_id) = self.state.season.season_id().map(str::to_owned) else {
            return;
        };
        if let Err(e) = self.store.remove(&season_id) {
            warn!("could not remove session {season_id}: {e}");
            self.on_error(e);
        }
        self.state.season.restore_pristine();
        if let Some(season) = self.state.season.season.as_ref() {
            self.state.playoffs.seed(season, &self.state.season.standings);
        }
        self.session = SimulatedSession::new(season_id);
        self.session.bracket = self.state.playoffs.bracket.clone();
        info!("simulation reset for {}", self.session.season_id);
    }

    pub fn league_edit_count(&self) -> usize {
        self.session.scores.len()
    }

    fn load_session(&self, season_id: &str) -> SimulatedSession {
        let Some(blob) = self.store.load(season_id) else {
            return SimulatedSession::new(season_id);
        };
        match SimulatedSession::from_blob(&blob) {
            Ok(session) if session.season_id == season_id => session,
            Ok(session) => {
                warn!(
                    "saved session belongs to {}, expected {season_id}; starting fresh",
                    session.season_id
                );
                SimulatedSession::new(season_id)
            }
            Err(e) => {
                warn!("{e}; starting fresh");
                SimulatedSession::new(season_id)
            }
        }
    }

    fn persist(&mut self) {
        if self.session.season_id.is_empty() {
            return;
        }
        let key = self.session.season_id.clone();
        let result = if self.session.is_empty() {
            self.store.remove(&key)
        } else {
            self.session
                .to_blob()
                .and_then(|blob| self.store.save(&key, &blob))
        };
        if let Err(e) = result {
            warn!("could not save session {key}: {e}");
            self.on_error(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::session::MemoryStore;
    use liga_api::client::sample_season;

    fn app() -> App {
        let mut app = App::with_store(AppSettings::default(), Box::new(MemoryStore::default()));
        app.on_season_loaded(sample_season().unwrap());
        app
    }

    fn saved(app: &App) -> SimulatedSession {
        let blob = app.store.load(&app.session.season_id).expect("session saved");
        SimulatedSession::from_blob(&blob).unwrap()
    }

    #[test]
    fn loading_seeds_bracket_without_writing() {
        let app = app();
        assert!(app.state.playoffs.bracket.is_some());
        assert_eq!(app.state.playoffs.seeding_error, None);
        assert_eq!(app.store.load("liga-costa-2025"), None);
    }

    #[test]
    fn league_edit_is_saved_and_replayed_on_reload() {
        let mut app = app();
        let match_id = app.state.season.selected().unwrap().id.clone();
        app.adjust_league_score(Side::Home, 1);
        app.adjust_league_score(Side::Home, 1);
        app.adjust_league_score(Side::Away, 1);

        let session = saved(&app);
        assert_eq!(session.scores[&match_id], ScoreEdit { home: Some(2), away: Some(1) });
        assert!(session.bracket.is_some());

        // Reload: fresh data from the provider, edits come back from the store.
        app.on_season_loaded(sample_season().unwrap());
        let m = app.state.season.season.as_ref().unwrap().find_match(&match_id).unwrap();
        assert_eq!((m.home_score, m.away_score), (Some(2), Some(1)));
        assert_eq!(app.league_edit_count(), 1);
    }

    #[test]
    fn playoff_edit_is_saved_and_restored() {
        let mut app = app();
        app.adjust_playoff_score(Side::Home, false, 1);
        let bracket = app.state.playoffs.bracket.as_ref().unwrap();
        let winner = bracket.find_match("qf1").unwrap().winner_id.clone();
        assert!(winner.is_some());

        app.on_season_loaded(sample_season().unwrap());
        let bracket = app.state.playoffs.bracket.as_ref().unwrap();
        assert_eq!(bracket.find_match("sf1").unwrap().away_team_id, winner);
    }

    #[test]
    fn rejected_playoff_update_sets_error() {
        let mut app = app();
        app.apply_playoff_scoreline("qf9", Scoreline::regulation(1, 0));
        assert!(app.state.last_error.as_deref().unwrap().contains("qf9"));
    }

    #[test]
    fn reset_drops_session_and_restores_scores() {
        let mut app = app();
        let match_id = app.state.season.selected().unwrap().id.clone();
        app.adjust_league_score(Side::Away, 1);
        app.adjust_playoff_score(Side::Home, false, 1);

        app.reset_simulation();

        assert_eq!(app.store.load("liga-costa-2025"), None);
        assert_eq!(app.league_edit_count(), 0);
        let m = app.state.season.season.as_ref().unwrap().find_match(&match_id).unwrap();
        assert!(!m.is_played());
        let qf1 = app.state.playoffs.bracket.as_ref().unwrap().find_match("qf1").unwrap().clone();
        assert_eq!(qf1.home_score, None);
    }

    #[test]
    fn session_for_another_season_is_ignored() {
        let mut store = MemoryStore::default();
        let mut foreign = SimulatedSession::new("other-league");
        foreign.scores.insert("m17".into(), ScoreEdit { home: Some(9), away: Some(0) });
        store.save("liga-costa-2025", &foreign.to_blob().unwrap()).unwrap();

        let mut app = App::with_store(AppSettings::default(), Box::new(store));
        app.on_season_loaded(sample_season().unwrap());

        assert_eq!(app.league_edit_count(), 0);
        let m17 = app.state.season.season.as_ref().unwrap().find_match("m17").unwrap();
        assert!(!m17.is_played());
    }

    #[test]
    fn help_returns_to_previous_tab() {
        let mut app = app();
        app.update_tab(MenuItem::Playoffs);
        app.update_tab(MenuItem::Help);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::Playoffs);
    }
}
