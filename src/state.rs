use crate::config::Config;
use crate::quiz::QuizGenerator;
use crate::sessions::SessionStore;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Built once at startup around the shared inference backend.
    pub generator: QuizGenerator,
    pub sessions: SessionStore,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for QuizGenerator {
    fn from_ref(state: &AppState) -> Self {
        state.generator.clone()
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
