use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use tokio::sync::broadcast::{self, Sender};

use crate::{
    backend::{
        DbPool,
        auth::{AuthService, SqliteAuthService},
        store::{DocumentStore, SqliteDocumentStore},
    },
    msg::Msg,
    settings::{Settings, SettingsError},
};

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn AuthService>,
    pub settings: Arc<Settings>,
    pub key: Key,
    pub tx: Sender<Msg>,
}

impl AppState {
    /// State backed by the SQLite adapters.
    pub fn new(pool: DbPool, settings: Settings) -> Result<Self, SettingsError> {
        let key = settings.cookie_key()?;
        let (tx, _) = broadcast::channel::<Msg>(1000);

        Ok(Self {
            store: Arc::new(SqliteDocumentStore::new(pool.clone())),
            auth: Arc::new(SqliteAuthService::new(pool)),
            settings: Arc::new(settings),
            key,
            tx,
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}
