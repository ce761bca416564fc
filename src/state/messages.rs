use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use liga_api::Season;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadSeason,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    SeasonLoaded { season: Box<Season> },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
