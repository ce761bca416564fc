use crate::app::{App, MenuItem};
use crate::state::app_state::Side;
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Standings),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Fixtures),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Playoffs),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Fixtures: navigation and league score entry
        (MenuItem::Fixtures, Char('l') | KeyCode::Right, _) => guard.fixtures_next_round(),
        (MenuItem::Fixtures, Char('h') | KeyCode::Left, _) => guard.fixtures_prev_round(),
        (MenuItem::Fixtures, Char('j') | KeyCode::Down, _) => guard.fixtures_match_down(),
        (MenuItem::Fixtures, Char('k') | KeyCode::Up, _) => guard.fixtures_match_up(),
        (MenuItem::Fixtures, Char('a'), _) => guard.adjust_league_score(Side::Home, 1),
        (MenuItem::Fixtures, Char('z'), _) => guard.adjust_league_score(Side::Home, -1),
        (MenuItem::Fixtures, Char('s'), _) => guard.adjust_league_score(Side::Away, 1),
        (MenuItem::Fixtures, Char('x'), _) => guard.adjust_league_score(Side::Away, -1),
        (MenuItem::Fixtures, KeyCode::Backspace | KeyCode::Delete, _) => guard.clear_league_score(),

        // Playoffs: navigation, regulation and shootout entry
        (MenuItem::Playoffs, Char('j') | KeyCode::Down, _) => guard.playoffs_match_down(),
        (MenuItem::Playoffs, Char('k') | KeyCode::Up, _) => guard.playoffs_match_up(),
        (MenuItem::Playoffs, Char('a'), _) => guard.adjust_playoff_score(Side::Home, false, 1),
        (MenuItem::Playoffs, Char('z'), _) => guard.adjust_playoff_score(Side::Home, false, -1),
        (MenuItem::Playoffs, Char('s'), _) => guard.adjust_playoff_score(Side::Away, false, 1),
        (MenuItem::Playoffs, Char('x'), _) => guard.adjust_playoff_score(Side::Away, false, -1),
        (MenuItem::Playoffs, Char('p'), _) => guard.adjust_playoff_score(Side::Home, true, 1),
        (MenuItem::Playoffs, Char('P'), _) => guard.adjust_playoff_score(Side::Home, true, -1),
        (MenuItem::Playoffs, Char('o'), _) => guard.adjust_playoff_score(Side::Away, true, 1),
        (MenuItem::Playoffs, Char('O'), _) => guard.adjust_playoff_score(Side::Away, true, -1),
        (MenuItem::Playoffs, KeyCode::Backspace | KeyCode::Delete, _) => {
            guard.clear_playoff_score()
        }
        (MenuItem::Playoffs, Char('g'), _) => guard.reseed_bracket(),

        // Global
        (_, Char('R'), _) => guard.reset_simulation(),
        (_, Char('r'), _) => {
            drop(guard);
            let _ = network_requests.send(NetworkRequest::LoadSeason).await;
        }
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }
}
