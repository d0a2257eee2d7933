mod app;
mod auth;
mod config;
mod currencies;
mod db;
mod error;
mod extract;
mod expenses;
mod state;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "expense_tracker=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    if config.uses_default_secret() {
        tracing::warn!("using the default SECRET_KEY; set a secure SECRET_KEY in production");
    }

    let state = AppState::init(config).await?;

    tracing::info!("creating database tables");
    db::ensure_schema(&state.db).await?;

    let config = state.config.clone();
    app::serve(app::build_app(state), &config).await
}
