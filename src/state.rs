use crate::config::Config;
use crate::services::feed::FeedService;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub feeds: FeedService,
    pub config: Config,
}

impl FromRef<AppState> for FeedService {
    fn from_ref(state: &AppState) -> Self {
        state.feeds.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
