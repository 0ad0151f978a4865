use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, store::QuizStore, utils::gemini::QuizGenerator};

/// Collaborators injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QuizStore>,
    /// `None` when no API credential was configured at startup.
    pub generator: Option<Arc<dyn QuizGenerator>>,
    pub config: Config,
}

impl FromRef<AppState> for Arc<dyn QuizStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Option<Arc<dyn QuizGenerator>> {
    fn from_ref(state: &AppState) -> Self {
        state.generator.clone()
    }
}
