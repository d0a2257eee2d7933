use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = db::connect(&config.db).await?;
        Ok(Self::from_parts(db, Arc::new(config)))
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        Self { db, config, keys }
    }

    /// State backed by a pool that never connects until used. Requests that
    /// are rejected before reaching storage can be exercised with it.
    #[cfg(test)]
    pub fn fake() -> Self {
        use std::time::Duration;

        let config = AppConfig::from_lookup(|key| match key {
            "SECRET_KEY" => Some("test-secret".to_string()),
            _ => None,
        })
        .expect("test config");

        let db = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy(&config.db.url)
            .expect("lazy pool ok");

        Self::from_parts(db, Arc::new(config))
    }
}
