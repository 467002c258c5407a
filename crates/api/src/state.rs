use std::sync::Arc;

use gigboard_core::bidding::ProjectBiddingService;
use gigboard_db::{DbPool, PgProjectStore};

use crate::config::ServerConfig;
use crate::oauth::yandex::YandexClient;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Everything here is built once in `main` (or a test harness) and cloned
/// cheaply per request.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    /// Project bidding rules over the PostgreSQL store.
    pub bidding: Arc<ProjectBiddingService<PgProjectStore>>,
    pub yandex: Arc<YandexClient>,
}

impl AppState {
    pub fn new(pool: DbPool, config: ServerConfig) -> Self {
        let bidding = ProjectBiddingService::new(PgProjectStore::new(pool.clone()));
        let yandex = YandexClient::new(config.yandex.clone());
        Self {
            pool,
            config: Arc::new(config),
            bidding: Arc::new(bidding),
            yandex: Arc::new(yandex),
        }
    }
}
