use crate::state::messages::{NetworkRequest, NetworkResponse};
use liga_api::client::{ApiError, LigaApi};
use log::{debug, error, info};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

pub struct NetworkWorker {
    client: LigaApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
}

impl NetworkWorker {
    pub fn new(
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self { client: LigaApi::new(), requests, responses }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let spinner = self.spawn_spinner();

            let result = match request {
                NetworkRequest::LoadSeason => self.handle_load_season().await,
            };

            // Wait for the spinner task to be gone so no stale frame lands after the final state.
            spinner.abort();
            let _ = spinner.await;
            self.send_loading_state(LoadingState {
                is_loading: false,
                spinner_char: if result.is_ok() { ' ' } else { ERROR_CHAR },
            })
            .await;

            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_season(&self) -> Result<NetworkResponse, ApiError> {
        debug!("loading season");
        let season = self.client.fetch_season().await?;
        info!(
            "season {} loaded: {} teams, {} rounds",
            season.id,
            season.teams.len(),
            season.rounds.len()
        );
        Ok(NetworkResponse::SeasonLoaded { season: Box::new(season) })
    }

    fn spawn_spinner(&self) -> JoinHandle<()> {
        let responses = self.responses.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            for spinner_char in SPINNER_CHARS.iter().copied().cycle() {
                interval.tick().await;
                let loading_state = LoadingState { is_loading: true, spinner_char };
                if responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await
                    .is_err()
                {
                    break;
                }
            }
        })
    }

    async fn send_loading_state(&self, loading_state: LoadingState) {
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;
    }
}
